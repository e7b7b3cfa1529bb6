//! Horizontal class merging: folding sibling classes into one.

use rustc_hash::{FxHashMap, FxHashSet};

use fold_diagnostic::{InternalError, InternalResult};
use fold_hierarchy::{AppInfo, InstantiationInfo, KeepInfo, ProgramUses};
use fold_ir::{
    CompilerOptions, FieldDef, FieldRef, ItemFactory, MethodDef, MethodRef, MethodSignature, Name, Program,
    TypeRef,
};
use fold_lens::{LensBuilder, LensLayer, MethodTarget};

use crate::tree_fixer::{append_unused_arguments, TreeFixer};
use crate::{
    ClassMergerMode, FinalizedMergeGroup, MergeKind, MergedClasses, PolicyContext, PolicyExecutor,
    PolicyScheduler,
};

pub struct HorizontalMergeResult {
    pub merged_classes: MergedClasses,
    pub layer: LensLayer,
}

/// Select groups with the policy pipeline for `mode` and merge them.
pub fn merge_horizontally(
    program: &mut Program,
    factory: &ItemFactory,
    keep: &KeepInfo,
    options: &CompilerOptions,
    vertically_merged: &MergedClasses,
    mode: ClassMergerMode,
) -> InternalResult<HorizontalMergeResult> {
    let groups = {
        let app = AppInfo::new(program, factory);
        let uses = ProgramUses::collect(program, options.threads);
        let instantiation = InstantiationInfo::new(&app, &uses, keep);
        let context = PolicyContext {
            app: &app,
            keep,
            instantiation: &instantiation,
            options,
            vertically_merged,
        };
        let policies = PolicyScheduler::horizontal_policies(&context, mode);
        PolicyExecutor::new(&app).run(PolicyScheduler::initial_groups(&app), policies)?
    };
    HorizontalClassMerger::new(factory, mode).run(program, groups)
}

/// What one group contributes to its target.
struct GroupPlan {
    target: TypeRef,
    methods: Vec<MovedMethod>,
    static_fields: Vec<FieldDef>,
    interfaces: Vec<TypeRef>,
    make_public: bool,
    /// Merged instance field: (every contributor synthetic, any non-final).
    field_flags: FxHashMap<FieldRef, (bool, bool)>,
}

struct MovedMethod {
    definition: MethodDef,
    reference: MethodRef,
    context: TypeRef,
    extra_parameters: usize,
}

pub struct HorizontalClassMerger<'a> {
    factory: &'a ItemFactory,
    mode: ClassMergerMode,
}

impl<'a> HorizontalClassMerger<'a> {
    pub fn new(factory: &'a ItemFactory, mode: ClassMergerMode) -> Self {
        HorizontalClassMerger { factory, mode }
    }

    pub fn run(&self, program: &mut Program, groups: Vec<FinalizedMergeGroup>) -> InternalResult<HorizontalMergeResult> {
        let factory = self.factory;
        let mut merged_classes = MergedClasses::new(MergeKind::Horizontal);
        let mut builder = LensBuilder::new(match self.mode {
            ClassMergerMode::Initial => "horizontal-initial",
            ClassMergerMode::Final => "horizontal-final",
        });

        for group in &groups {
            let target = self.definition(program, group.target())?;
            for source in group.sources() {
                merged_classes.add(*source, group.target(), group.is_interface_group())?;
                builder.map_type(*source, group.target(), target.is_interface());
            }
            for (from, to) in group.instance_field_map() {
                builder.map_field(*from, *to);
            }
        }

        let mut plans = Vec::with_capacity(groups.len());
        for group in &groups {
            plans.push(self.plan_group(program, group, &mut builder)?);
        }

        let layer = builder.build();
        let fixer = TreeFixer::new(factory, &layer);
        let sources: FxHashSet<TypeRef> = groups.iter().flat_map(|g| g.sources().iter().copied()).collect();
        program.retain_classes(|class| !sources.contains(&class.ty));
        fixer.fix_program(program);

        for plan in plans {
            let target = program
                .definition_for_mut(plan.target)
                .ok_or_else(|| InternalError::new("merge target vanished").at(factory.descriptor(plan.target)))?;
            for moved in plan.methods {
                let mut definition = moved.definition;
                fixer.fix_method(&mut definition, moved.reference, moved.context);
                if moved.extra_parameters > 0 {
                    append_unused_arguments(&mut definition, factory, moved.extra_parameters);
                }
                target.add_method(definition)?;
            }
            target.fields.extend(plan.static_fields);
            for field in &mut target.fields {
                if let Some(&(all_synthetic, any_non_final)) = plan.field_flags.get(&field.reference) {
                    if !all_synthetic {
                        field.access = field.access.demote_from_synthetic();
                    }
                    if any_non_final {
                        field.access = field.access.demote_from_final();
                    }
                }
            }
            for interface in plan.interfaces {
                let interface = layer.lookup_type(factory, interface);
                if interface != target.ty
                    && Some(interface) != target.super_type
                    && !target.interfaces.contains(&interface)
                {
                    target.interfaces.push(interface);
                }
            }
            if plan.make_public {
                target.access = target.access.promote_to_public();
            }
            tracing::debug!(
                target = factory.descriptor(plan.target),
                sources = merged_classes.sources_for(plan.target).len(),
                "merged classes horizontally"
            );
        }

        Ok(HorizontalMergeResult { merged_classes, layer })
    }

    fn definition<'p>(&self, program: &'p Program, ty: TypeRef) -> InternalResult<&'p fold_ir::ClassDef> {
        program
            .definition_for(ty)
            .ok_or_else(|| InternalError::new("merge group class has no definition").at(self.factory.descriptor(ty)))
    }

    fn plan_group(
        &self,
        program: &Program,
        group: &FinalizedMergeGroup,
        builder: &mut LensBuilder,
    ) -> InternalResult<GroupPlan> {
        let factory = self.factory;
        let target = self.definition(program, group.target())?;
        let mut taken_methods: FxHashSet<MethodSignature> = target
            .methods
            .iter()
            .map(|m| builder.layer().rewrite_definition(factory, &m.reference).signature())
            .collect();
        let mut taken_fields: FxHashSet<(Name, TypeRef)> = target
            .fields
            .iter()
            .map(|f| {
                let field = builder.layer().lookup_field(factory, &f.reference);
                (field.name, field.ty)
            })
            .collect();

        let mut plan = GroupPlan {
            target: group.target(),
            methods: Vec::new(),
            static_fields: Vec::new(),
            interfaces: Vec::new(),
            make_public: false,
            field_flags: FxHashMap::default(),
        };
        for field in target.instance_fields() {
            let merged = builder.layer().lookup_field(factory, &field.reference);
            plan.field_flags.insert(
                merged,
                (field.access.is_synthetic(), !field.access.is_final()),
            );
        }

        for &source in group.sources() {
            let class = self.definition(program, source)?;
            plan.make_public |= class.is_public();
            plan.interfaces.extend(class.interfaces.iter().copied());

            for method in &class.methods {
                let (reference, extra_parameters) =
                    self.place_method(method, source, &taken_methods, builder)?;
                taken_methods.insert(reference.signature());
                plan.methods.push(MovedMethod {
                    definition: method.clone(),
                    reference,
                    context: source,
                    extra_parameters,
                });
            }

            for field in &class.fields {
                if field.is_static() {
                    let mut moved = builder.layer().lookup_field(factory, &field.reference);
                    if taken_fields.contains(&(moved.name, moved.ty)) {
                        let name = factory.fresh_name(moved.name, factory.simple_name(source), |n| {
                            taken_fields.contains(&(n, moved.ty))
                        });
                        moved = FieldRef { name, ..moved };
                        builder.map_field(field.reference, moved);
                    }
                    taken_fields.insert((moved.name, moved.ty));
                    plan.static_fields.push(FieldDef {
                        reference: moved,
                        ..field.clone()
                    });
                } else {
                    let Some(merged) = group.instance_field_map().get(&field.reference) else {
                        return Err(InternalError::new("instance field missing from the group field map")
                            .at(factory.field_to_string(&field.reference)));
                    };
                    let entry = plan.field_flags.entry(*merged).or_insert((true, false));
                    entry.0 &= field.access.is_synthetic();
                    entry.1 |= !field.access.is_final();
                }
            }
        }
        Ok(plan)
    }

    /// Where `method` of `source` lands in the target, and how many padding
    /// parameters it needs.
    fn place_method(
        &self,
        method: &MethodDef,
        source: TypeRef,
        taken: &FxHashSet<MethodSignature>,
        builder: &mut LensBuilder,
    ) -> InternalResult<(MethodRef, usize)> {
        let factory = self.factory;
        let mapped = builder.layer().rewrite_definition(factory, &method.reference);
        if !taken.contains(&mapped.signature()) {
            return Ok((mapped, 0));
        }
        if method.is_instance_initializer() {
            if self.mode == ClassMergerMode::Final {
                return Err(InternalError::new("constructor collision in the final merge round")
                    .at(factory.method_to_string(&method.reference)));
            }
            let mut extra = 0;
            let mut padded = mapped;
            while taken.contains(&padded.signature()) {
                extra += 1;
                padded = mapped.with_proto(factory.append_params(mapped.proto, factory.object_type, extra));
            }
            builder.map_method(method.reference, MethodTarget::to(padded).with_extra_nulls(extra));
            return Ok((padded, extra));
        }
        if method.is_virtual() || method.is_class_initializer() {
            return Err(InternalError::new("method collision in merged class")
                .at(factory.method_to_string(&method.reference)));
        }
        let name = factory.fresh_name(mapped.name, factory.simple_name(source), |n| {
            taken.contains(&MethodSignature {
                name: n,
                proto: mapped.proto,
            })
        });
        let renamed = mapped.with_name(name);
        builder.map_method(method.reference, MethodTarget::to(renamed));
        Ok((renamed, 0))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
