//! Rebinding of invoke and field references to their resolved holders.
//!
//! References are processed per use kind: virtual invokes with class
//! resolution, interface invokes with interface resolution, then `super`,
//! direct and static invokes with the rule the holder's kind selects, then
//! static and instance field accesses. For each reference:
//!
//! 1. Array and library-held references are skipped.
//! 2. The reference is resolved. A reference that already names its
//!    definition needs nothing.
//! 3. For class-file output, a `super` call that resolved into an interface
//!    other than the referenced holder gets a bridge on the holder's
//!    highest superclass implementing that interface.
//! 4. If some caller could see the member but not its declaring class, a
//!    visibility bridge goes on the most specific visible class between
//!    the referenced holder and the target.
//! 5. A library target is replaced by the first library class on the way
//!    from the referenced holder, which is the lowest holder the runtime is
//!    known to provide.

use std::collections::BTreeMap;

use fold_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode, InternalError, InternalResult};
use fold_hierarchy::{derive_constraint, is_member_visible_from, AppInfo, ContextSet, ProgramUses, ResolvedMethod};
use fold_ir::{
    AccessFlags, ClassDef, CompilerOptions, FieldRef, InvokeKind, ItemFactory, MethodDef, MethodRef, Program,
    SyntheticItems, SyntheticKind, TypeRef,
};
use fold_lens::{LensBuilder, LensLayer, MethodTarget};
use fold_merge::{FrozenBridge, TreeFixer};

use crate::walk;

/// Resolution rule for the references of one invoke kind.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Lookup {
    Class,
    Interface,
    /// Class or interface resolution, chosen by the holder's kind.
    Any,
}

/// Invoke kinds in processing order.
const INVOKE_ORDER: [(InvokeKind, Lookup); 5] = [
    (InvokeKind::Virtual, Lookup::Class),
    (InvokeKind::Interface, Lookup::Interface),
    (InvokeKind::Super, Lookup::Any),
    (InvokeKind::Direct, Lookup::Any),
    (InvokeKind::Static, Lookup::Any),
];

/// Rewrites member references to the holders that declare them.
pub struct MemberRebindingAnalysis<'a> {
    factory: &'a ItemFactory,
    options: &'a CompilerOptions,
}

impl<'a> MemberRebindingAnalysis<'a> {
    pub fn new(factory: &'a ItemFactory, options: &'a CompilerOptions) -> Self {
        MemberRebindingAnalysis { factory, options }
    }

    /// Rebind every reference in `uses`, insert the bridges that requires,
    /// and rewrite the program. Returns the layer describing the rewrite.
    ///
    /// `uses` must have been collected from `program` as it is now.
    /// Abandoned rebindings are reported to `diagnostics` as warnings.
    pub fn run(
        &self,
        program: &mut Program,
        uses: &ProgramUses,
        synthetics: &mut SyntheticItems,
        diagnostics: &mut DiagnosticQueue,
    ) -> InternalResult<LensLayer> {
        let (lens, bridges) = {
            let app = AppInfo::new(program, self.factory);
            let mut rebinder = Rebinder::new(&app, self.options.is_class_file_output());
            for (kind, lookup) in INVOKE_ORDER {
                rebinder.rebind_methods(uses.invokes(kind), kind, lookup)?;
            }
            rebinder.rebind_fields(&uses.field_accesses(true), true);
            rebinder.rebind_fields(&uses.field_accesses(false), false);
            for diagnostic in rebinder.diagnostics.drain(..) {
                diagnostics.push(diagnostic);
            }
            (rebinder.lens, rebinder.bridges)
        };

        let bridge_count = bridges.len();
        for (reference, planned) in bridges {
            let holder = program.definition_for_mut(reference.holder).ok_or_else(|| {
                InternalError::new("bridge holder has no definition").at(self.factory.descriptor(reference.holder))
            })?;
            holder.add_method(planned.definition)?;
            synthetics.record(planned.kind, reference);
            tracing::debug!(
                bridge = %self.factory.method_to_string(&reference),
                kind = ?planned.kind,
                "inserted rebinding bridge"
            );
        }

        let layer = lens.build();
        TreeFixer::new(self.factory, &layer).fix_program(program);
        tracing::debug!(bridges = bridge_count, empty = layer.is_empty(), "member rebinding done");
        Ok(layer)
    }
}

/// A rebinding target: a resolved definition, or a bridge planned earlier in
/// the same run.
#[derive(Copy, Clone, Debug)]
struct Target {
    reference: MethodRef,
    access: AccessFlags,
}

impl From<ResolvedMethod<'_>> for Target {
    fn from(resolved: ResolvedMethod<'_>) -> Self {
        Target {
            reference: resolved.reference(),
            access: resolved.access(),
        }
    }
}

#[derive(Debug)]
struct PlannedBridge {
    kind: SyntheticKind,
    definition: MethodDef,
}

/// State of one rebinding run over an immutable snapshot.
struct Rebinder<'a, 'p> {
    app: &'a AppInfo<'p>,
    factory: &'p ItemFactory,
    class_file_output: bool,
    lens: LensBuilder,
    bridges: BTreeMap<MethodRef, PlannedBridge>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a, 'p> Rebinder<'a, 'p> {
    fn new(app: &'a AppInfo<'p>, class_file_output: bool) -> Self {
        Rebinder {
            app,
            factory: app.factory(),
            class_file_output,
            lens: LensBuilder::new("member-rebinding"),
            bridges: BTreeMap::new(),
            diagnostics: Vec::new(),
        }
    }

    // ── Methods ──

    fn rebind_methods(
        &mut self,
        references: &BTreeMap<MethodRef, ContextSet>,
        kind: InvokeKind,
        lookup: Lookup,
    ) -> InternalResult<()> {
        for (method, contexts) in references {
            let Some(rebound) = self.rebind_method(method, contexts, kind, lookup)? else {
                continue;
            };
            if rebound == *method {
                continue;
            }
            tracing::debug!(
                kind = ?kind,
                from = %self.factory.method_to_string(method),
                to = %self.factory.method_to_string(&rebound),
                "rebound method reference"
            );
            let is_interface = self.app.is_interface(rebound.holder);
            let target = if is_interface == self.app.is_interface(method.holder) {
                MethodTarget::to(rebound)
            } else {
                MethodTarget::to(rebound).with_kind(kind, is_interface)
            };
            self.lens.map_invoke(kind, *method, target);
        }
        Ok(())
    }

    /// The reference `method` should be rewritten to, or `None` to leave it.
    fn rebind_method(
        &mut self,
        method: &MethodRef,
        contexts: &ContextSet,
        kind: InvokeKind,
        lookup: Lookup,
    ) -> InternalResult<Option<MethodRef>> {
        if !self.factory.is_class_type(method.holder) {
            return Ok(None);
        }
        let app = self.app;
        let Some(original) = app.definition_for(method.holder) else {
            return Ok(None);
        };
        if original.is_library() {
            return Ok(None);
        }
        let resolved = match lookup {
            Lookup::Class => app.resolve_method_on_class(method),
            Lookup::Interface => app.resolve_method_on_interface(method),
            Lookup::Any => app.resolve_method(method),
        };
        let Some(resolved) = resolved else {
            return Ok(None);
        };
        if resolved.reference() == *method {
            return Ok(None);
        }
        if resolved.definition.is_private() {
            self.abandon(method, "it resolves to a private method of another class");
            return Ok(None);
        }
        if matches!(kind, InvokeKind::Virtual | InvokeKind::Interface) {
            let rebound = self.valid_method_target(resolved.reference(), method);
            if app.is_interface(rebound.holder) != original.is_interface() {
                tracing::trace!(
                    method = %self.factory.method_to_string(method),
                    "rebinding would change the invoke instruction"
                );
                return Ok(None);
            }
        }

        let mut target = Target::from(resolved);
        if self.needs_interface_super_bridge(original, resolved.holder, kind) {
            if !original.is_program() {
                self.abandon(method, "a super bridge would be needed on a non-program class");
                return Ok(None);
            }
            let holder = walk::interface_bridge_holder(app, original, resolved.holder_type());
            target = self.plan_bridge(holder, target, SyntheticKind::InterfaceSuperBridge);
        }

        if contexts.is_empty() {
            return Err(InternalError::new("bridge context set must be non-empty")
                .at(self.factory.method_to_string(method)));
        }
        if contexts
            .iter()
            .any(|context| self.may_need_visibility_bridge(context.holder, &target))
        {
            match self.visibility_bridge(method, original, target) {
                Some(bridged) => target = bridged,
                None => {
                    tracing::warn!(
                        method = %self.factory.method_to_string(method),
                        "no visible holder for a visibility bridge"
                    );
                    self.diagnostics.push(
                        Diagnostic::warning(ErrorCode::E2002).with_message(format!(
                            "no visibility bridge holder for `{}`",
                            self.factory.method_to_string(method)
                        )),
                    );
                    return Ok(None);
                }
            }
        }
        Ok(Some(self.valid_method_target(target.reference, method)))
    }

    fn needs_interface_super_bridge(&self, original: &ClassDef, target_class: &ClassDef, kind: InvokeKind) -> bool {
        self.class_file_output
            && kind == InvokeKind::Super
            && target_class.ty != original.ty
            && target_class.is_interface()
    }

    /// The target class is hidden from `context` while the member is not.
    fn may_need_visibility_bridge(&self, context: TypeRef, target: &Target) -> bool {
        let Some(holder) = self.app.definition_for(target.reference.holder) else {
            return false;
        };
        let class = derive_constraint(self.app, context, holder.ty, holder.access);
        let member = derive_constraint(self.app, context, holder.ty, target.access);
        class.is_never() && !member.is_never()
    }

    /// `None` when a bridge is needed and no class can hold it.
    fn visibility_bridge(&mut self, method: &MethodRef, original: &ClassDef, target: Target) -> Option<Target> {
        // A public holder may have been referenced from anywhere.
        let package = (!original.is_public()).then(|| self.factory.package_descriptor(method.holder));
        let target_holder = target.reference.holder;
        if package.is_some_and(|package| package == self.factory.package_descriptor(target_holder)) {
            return Some(target);
        }
        let holder = walk::visibility_bridge_holder(self.app, original.ty, target_holder, package)?;
        Some(self.plan_bridge(holder, target, SyntheticKind::VisibilityBridge))
    }

    /// Place a bridge with `target`'s signature on `holder`, or reuse the
    /// method already declared or planned there.
    fn plan_bridge(&mut self, holder: TypeRef, target: Target, kind: SyntheticKind) -> Target {
        let reference = target.reference.with_holder(holder);
        if let Some(planned) = self.bridges.get(&reference) {
            return Target {
                reference,
                access: planned.definition.access,
            };
        }
        if let Some(existing) = self
            .app
            .definition_for(holder)
            .and_then(|class| class.lookup_method(reference.signature()))
        {
            return Target {
                reference,
                access: existing.access,
            };
        }
        let definition = self.lower_bridge(reference, target);
        let access = definition.access;
        tracing::trace!(
            bridge = %self.factory.method_to_string(&reference),
            target = %self.factory.method_to_string(&target.reference),
            kind = ?kind,
            "planned rebinding bridge"
        );
        self.bridges.insert(reference, PlannedBridge { kind, definition });
        Target { reference, access }
    }

    /// A forwarding method, or a plain redeclaration for an abstract target:
    /// calling it fails the same way calling the target would.
    fn lower_bridge(&self, reference: MethodRef, target: Target) -> MethodDef {
        if target.access.is_abstract() {
            return MethodDef {
                reference,
                access: target.access | AccessFlags::SYNTHETIC,
                has_signature: false,
                code: None,
            };
        }
        let invoke_kind = if target.access.is_static() {
            InvokeKind::Static
        } else {
            InvokeKind::Super
        };
        FrozenBridge::forwarding(
            reference,
            target.access.as_bridge(),
            invoke_kind,
            target.reference,
            self.app.is_interface(target.reference.holder),
        )
        .lower(self.factory)
    }

    /// Keep a program target; replace a library target by the first library
    /// class on the way from the referenced holder.
    fn valid_method_target(&self, target: MethodRef, original: &MethodRef) -> MethodRef {
        match self.library_holder_for(target.holder, original.holder) {
            Some(holder) => original.with_holder(holder),
            None => target,
        }
    }

    fn abandon(&mut self, method: &MethodRef, reason: &str) {
        let method = self.factory.method_to_string(method);
        tracing::warn!(method = %method, reason, "member rebinding abandoned");
        self.diagnostics.push(
            Diagnostic::warning(ErrorCode::E2001)
                .with_message(format!("member rebinding abandoned for `{method}`"))
                .with_note(reason),
        );
    }

    // ── Fields ──

    fn rebind_fields(&mut self, accesses: &BTreeMap<FieldRef, ContextSet>, is_static: bool) {
        for (field, contexts) in accesses {
            let Some(rebound) = self.rebind_field(field, contexts, is_static) else {
                continue;
            };
            if rebound == *field {
                continue;
            }
            tracing::debug!(
                from = %self.factory.field_to_string(field),
                to = %self.factory.field_to_string(&rebound),
                "rebound field reference"
            );
            self.lens.map_field(*field, rebound);
        }
    }

    fn rebind_field(&mut self, field: &FieldRef, contexts: &ContextSet, is_static: bool) -> Option<FieldRef> {
        let resolved = self.app.resolve_field(field)?;
        let target = resolved.reference();
        if target == *field || resolved.definition.is_static() != is_static {
            return None;
        }
        let visible = contexts
            .iter()
            .all(|context| is_member_visible_from(self.app, context.holder, resolved.holder, resolved.access()));
        if !visible {
            let field = self.factory.field_to_string(field);
            tracing::warn!(field = %field, "field rebinding abandoned");
            self.diagnostics.push(
                Diagnostic::warning(ErrorCode::E2001)
                    .with_message(format!("member rebinding abandoned for `{field}`"))
                    .with_note("the resolved field is not visible from every access"),
            );
            return None;
        }
        Some(match self.library_holder_for(target.holder, field.holder) {
            Some(holder) => field.with_holder(holder),
            None => target,
        })
    }

    // ── Shared ──

    /// For a library `target` holder, the holder a reference through
    /// `original` should name instead. `None` for any other holder.
    fn library_holder_for(&self, target: TypeRef, original: TypeRef) -> Option<TypeRef> {
        let class = self.app.definition_for(target)?;
        if !class.is_library() {
            return None;
        }
        if class.is_interface() {
            walk::first_library_class_for_interface_target(self.app, original, target)
        } else {
            Some(walk::first_library_class(self.app, target, original))
        }
    }
}
