//! Vertical class merging: folding a class into its only subtype.
//!
//! One round picks (source, target) pairs where no class is both, records
//! every type mapping, then plans members with the full type map in place:
//!
//! - direct methods and constructors move, renamed or padded on collision;
//! - abstract methods shadowed by the target disappear, the rest move;
//! - other virtual methods move as private implementations (static with the
//!   receiver first when the source is an interface), `super` calls from the
//!   target are redirected to them, and a bridge with the original signature
//!   is staged when the target does not shadow the method;
//! - fields move, renamed on collision.
//!
//! Bridges are frozen once the round's layer is built.

use rustc_hash::FxHashSet;

use fold_diagnostic::{InternalError, InternalResult};
use fold_hierarchy::{AppInfo, InstantiationInfo, KeepInfo, ProgramUses};
use fold_ir::{
    AccessFlags, ClassDef, CompilerOptions, FieldDef, FieldRef, InvokeKind, ItemFactory, MethodDef,
    MethodRef, MethodSignature, Name, Program, SyntheticItems, SyntheticKind, TypeRef,
};
use fold_lens::{LensBuilder, LensLayer, MethodTarget};

use crate::bridge::TentativeBridge;
use crate::policies::NoKeepRules;
use crate::tree_fixer::{append_unused_arguments, TreeFixer};
use crate::{MergeKind, MergedClasses};

pub struct VerticalMergeResult {
    pub merged_classes: MergedClasses,
    pub layer: LensLayer,
}

struct MovedMethod {
    definition: MethodDef,
    reference: MethodRef,
    extra_parameters: usize,
}

struct PairPlan {
    source: TypeRef,
    target: TypeRef,
    methods: Vec<MovedMethod>,
    fields: Vec<FieldDef>,
    bridges: Vec<TentativeBridge>,
    super_type: Option<TypeRef>,
    interfaces: Vec<TypeRef>,
    make_public: bool,
}

pub struct VerticalClassMerger<'a> {
    factory: &'a ItemFactory,
    keep: &'a KeepInfo,
    options: &'a CompilerOptions,
}

impl<'a> VerticalClassMerger<'a> {
    pub fn new(factory: &'a ItemFactory, keep: &'a KeepInfo, options: &'a CompilerOptions) -> Self {
        VerticalClassMerger {
            factory,
            keep,
            options,
        }
    }

    /// Run one round, recording staged bridges in `synthetics`.
    pub fn run(&self, program: &mut Program, synthetics: &mut SyntheticItems) -> InternalResult<VerticalMergeResult> {
        let factory = self.factory;
        let pairs = self.select_pairs(program);
        let mut merged_classes = MergedClasses::new(MergeKind::Vertical);
        let mut builder = LensBuilder::new("vertical");

        for &(source, target) in &pairs {
            let source_class = self.definition(program, source)?;
            let target_class = self.definition(program, target)?;
            merged_classes.add(source, target, source_class.is_interface())?;
            builder.map_type(source, target, target_class.is_interface());
            if !source_class.is_interface() {
                if let Some(super_type) = source_class.super_type {
                    builder.record_merged_super_type(source, super_type);
                }
            }
        }

        let mut plans = Vec::with_capacity(pairs.len());
        for &(source, target) in &pairs {
            plans.push(self.plan_pair(program, source, target, &mut builder)?);
        }

        let layer = builder.build();
        let fixer = TreeFixer::new(factory, &layer);
        let mut bridges = Vec::new();
        for plan in &mut plans {
            for bridge in std::mem::take(&mut plan.bridges) {
                bridges.push((plan.target, bridge.freeze(&layer, factory)?));
            }
            let target = program
                .definition_for_mut(plan.target)
                .ok_or_else(|| missing_class(factory, plan.target))?;
            target.super_type = plan.super_type;
            target.interfaces = std::mem::take(&mut plan.interfaces);
            if plan.make_public {
                target.access = target.access.promote_to_public();
            }
        }

        let sources: FxHashSet<TypeRef> = pairs.iter().map(|(source, _)| *source).collect();
        program.retain_classes(|class| !sources.contains(&class.ty));
        fixer.fix_program(program);

        for plan in plans {
            let target = program
                .definition_for_mut(plan.target)
                .ok_or_else(|| missing_class(factory, plan.target))?;
            for moved in plan.methods {
                let mut definition = moved.definition;
                fixer.fix_method(&mut definition, moved.reference, plan.source);
                if moved.extra_parameters > 0 {
                    append_unused_arguments(&mut definition, factory, moved.extra_parameters);
                }
                target.add_method(definition)?;
            }
            target.fields.extend(plan.fields);
            tracing::debug!(
                source = factory.descriptor(plan.source),
                target = factory.descriptor(plan.target),
                "merged class into subtype"
            );
        }
        for (holder, bridge) in bridges {
            let target = program
                .definition_for_mut(holder)
                .ok_or_else(|| missing_class(factory, holder))?;
            target.add_method(bridge.lower(factory))?;
            synthetics.record(SyntheticKind::VerticalMergeBridge, bridge.method());
            tracing::trace!(bridge = %factory.method_to_string(&bridge.method()), "lowered merge bridge");
        }

        Ok(VerticalMergeResult { merged_classes, layer })
    }

    fn definition<'p>(&self, program: &'p Program, ty: TypeRef) -> InternalResult<&'p ClassDef> {
        program
            .definition_for(ty)
            .ok_or_else(|| missing_class(self.factory, ty))
    }

    /// Mergeable (source, target) pairs in descriptor order of the source.
    /// A target takes at most one source per round.
    fn select_pairs(&self, program: &Program) -> Vec<(TypeRef, TypeRef)> {
        let factory = self.factory;
        let app = AppInfo::new(program, factory);
        let uses = ProgramUses::collect(program, self.options.threads);
        let instantiation = InstantiationInfo::new(&app, &uses, self.keep);
        let blocked = NoKeepRules::new(&app, self.keep, self.options);

        let mut classes: Vec<&ClassDef> = program.program_classes().collect();
        classes.sort_by_key(|class| factory.descriptor(class.ty));
        let mut sources = FxHashSet::default();
        let mut targets = FxHashSet::default();
        let mut pairs = Vec::new();
        for class in classes {
            if blocked.is_blocked(class.ty) || instantiation.is_directly_instantiated(class.ty) {
                continue;
            }
            let Some(target) = self.merge_target(&app, class) else {
                continue;
            };
            // One source per target, and no class on both sides.
            if sources.contains(&target) || targets.contains(&target) || targets.contains(&class.ty) {
                continue;
            }
            sources.insert(class.ty);
            targets.insert(target);
            pairs.push((class.ty, target));
        }
        pairs
    }

    fn merge_target(&self, app: &AppInfo<'_>, source: &ClassDef) -> Option<TypeRef> {
        let factory = self.factory;
        if source.has_class_initializer() {
            return None;
        }
        let [target] = app.immediate_subtypes(source.ty) else {
            return None;
        };
        let target = app.definition_for(*target).filter(|c| c.is_program())?;
        if target.is_interface() && !source.is_interface() {
            return None;
        }
        let has_package_private_members = source
            .methods
            .iter()
            .map(|m| m.access)
            .chain(source.fields.iter().map(|f| f.access))
            .any(AccessFlags::is_package_private);
        if !app.is_same_package(source.ty, target.ty) && (has_package_private_members || !target.is_public()) {
            return None;
        }
        // An unshadowed abstract method cannot land in a concrete class.
        if !target.is_abstract() {
            let map = |ty: TypeRef| {
                if factory.base_type(ty) == source.ty {
                    factory.with_base_type(ty, target.ty)
                } else {
                    ty
                }
            };
            let unshadowed_abstract = source.virtual_methods().filter(|m| m.is_abstract()).any(|m| {
                let signature = MethodSignature {
                    name: m.reference.name,
                    proto: factory.map_proto_types(m.reference.proto, &map),
                };
                target.lookup_method(signature).is_none()
            });
            if unshadowed_abstract {
                return None;
            }
        }
        Some(target.ty)
    }

    fn plan_pair(
        &self,
        program: &Program,
        source: TypeRef,
        target: TypeRef,
        builder: &mut LensBuilder,
    ) -> InternalResult<PairPlan> {
        let factory = self.factory;
        let source_class = self.definition(program, source)?;
        let target_class = self.definition(program, target)?;
        let target_is_interface = target_class.is_interface();
        let suffix = factory.simple_name(source);

        let mut taken_methods: FxHashSet<MethodSignature> = target_class
            .methods
            .iter()
            .map(|m| builder.layer().rewrite_definition(factory, &m.reference).signature())
            .collect();
        let mut taken_fields: FxHashSet<(Name, TypeRef)> = target_class
            .fields
            .iter()
            .map(|f| {
                let field = builder.layer().lookup_field(factory, &f.reference);
                (field.name, field.ty)
            })
            .collect();

        let (super_type, interfaces) = if source_class.is_interface() {
            let mut interfaces = Vec::new();
            for ty in &target_class.interfaces {
                if *ty == source {
                    interfaces.extend(source_class.interfaces.iter().copied());
                } else {
                    interfaces.push(*ty);
                }
            }
            (target_class.super_type, interfaces)
        } else {
            let mut interfaces = target_class.interfaces.clone();
            interfaces.extend(source_class.interfaces.iter().copied());
            (source_class.super_type, interfaces)
        };
        let mut plan = PairPlan {
            source,
            target,
            methods: Vec::new(),
            fields: Vec::new(),
            bridges: Vec::new(),
            super_type,
            interfaces,
            make_public: source_class.is_public() && !target_class.is_public(),
        };

        for method in &source_class.methods {
            let mapped = builder.layer().rewrite_definition(factory, &method.reference);
            if method.is_instance_initializer() || method.is_private() || method.is_static() {
                let mut moved = mapped;
                let mut extra = 0;
                if taken_methods.contains(&mapped.signature()) {
                    if method.is_instance_initializer() {
                        while taken_methods.contains(&moved.signature()) {
                            extra += 1;
                            moved = mapped.with_proto(factory.append_params(mapped.proto, factory.object_type, extra));
                        }
                    } else {
                        moved = mapped.with_name(factory.fresh_name(mapped.name, suffix, |n| {
                            taken_methods.contains(&MethodSignature {
                                name: n,
                                proto: mapped.proto,
                            })
                        }));
                    }
                    let kind = if method.is_static() {
                        InvokeKind::Static
                    } else {
                        InvokeKind::Direct
                    };
                    builder.map_method(
                        method.reference,
                        MethodTarget::to(moved)
                            .with_kind(kind, target_is_interface)
                            .with_extra_nulls(extra),
                    );
                }
                taken_methods.insert(moved.signature());
                plan.methods.push(MovedMethod {
                    definition: method.clone(),
                    reference: moved,
                    extra_parameters: extra,
                });
            } else if method.is_abstract() {
                if !taken_methods.contains(&mapped.signature()) {
                    taken_methods.insert(mapped.signature());
                    plan.methods.push(MovedMethod {
                        definition: method.clone(),
                        reference: mapped,
                        extra_parameters: 0,
                    });
                }
            } else {
                self.plan_virtual_method(
                    method,
                    &mut plan,
                    source_class.is_interface(),
                    target_is_interface,
                    &mut taken_methods,
                    builder,
                );
            }
        }

        for field in &source_class.fields {
            let mut moved = builder.layer().lookup_field(factory, &field.reference);
            if taken_fields.contains(&(moved.name, moved.ty)) {
                let name = factory.fresh_name(moved.name, suffix, |n| taken_fields.contains(&(n, moved.ty)));
                moved = FieldRef { name, ..moved };
                builder.map_field(field.reference, moved);
            }
            taken_fields.insert((moved.name, moved.ty));
            plan.fields.push(FieldDef {
                reference: moved,
                ..field.clone()
            });
        }
        Ok(plan)
    }

    /// Move a non-abstract virtual method as a private implementation and
    /// stage a bridge if the target does not shadow it.
    fn plan_virtual_method(
        &self,
        method: &MethodDef,
        plan: &mut PairPlan,
        source_is_interface: bool,
        target_is_interface: bool,
        taken_methods: &mut FxHashSet<MethodSignature>,
        builder: &mut LensBuilder,
    ) {
        let factory = self.factory;
        let (proto, access, kind) = if source_is_interface {
            (
                factory.prepend_param(method.reference.proto, plan.source),
                method.access.make_private() | AccessFlags::STATIC,
                InvokeKind::Static,
            )
        } else {
            (method.reference.proto, method.access.make_private(), InvokeKind::Direct)
        };
        let proto_out = factory.map_proto_types(proto, |ty| builder.layer().lookup_type(factory, ty));
        let name = factory.fresh_name(method.reference.name, factory.simple_name(plan.source), |n| {
            taken_methods.contains(&MethodSignature {
                name: n,
                proto: proto_out,
            })
        });
        let implementation = MethodRef {
            holder: plan.target,
            name,
            proto,
        };
        let implementation_out = builder.layer().rewrite_definition(factory, &implementation);
        taken_methods.insert(implementation_out.signature());
        builder.map_super_call(
            plan.target,
            method.reference,
            MethodTarget::to(implementation_out).with_kind(kind, target_is_interface),
        );

        let bridge = method.reference.with_holder(plan.target);
        let bridge_out = builder.layer().rewrite_definition(factory, &bridge);
        if !taken_methods.contains(&bridge_out.signature()) {
            taken_methods.insert(bridge_out.signature());
            builder.record_bridge(bridge, implementation);
            plan.bridges.push(TentativeBridge::new(
                bridge,
                method.access.as_bridge(),
                kind,
                target_is_interface,
            ));
        }
        plan.methods.push(MovedMethod {
            definition: MethodDef {
                access,
                ..method.clone()
            },
            reference: implementation_out,
            extra_parameters: 0,
        });
    }
}

fn missing_class(factory: &ItemFactory, ty: TypeRef) -> InternalError {
    InternalError::new("vertically merged class has no definition").at(factory.descriptor(ty))
}
