use rustc_hash::FxHashSet;

use fold_hierarchy::{AppInfo, KeepInfo};
use fold_ir::{ClassDef, CompilerOptions, ItemFactory, MemberRef, TypeRef};

use crate::SingleClassPolicy;

/// Keeps pinned classes out of merging, along with every class whose
/// identity a pinned member's signature depends on. A class owning a member
/// that may not be optimized stays too: merging would move or rename it.
///
/// The blocked set is computed once, up front, over all program classes.
pub struct NoKeepRules {
    dont_merge: FxHashSet<TypeRef>,
}

impl NoKeepRules {
    pub fn new(app: &AppInfo<'_>, keep: &KeepInfo, options: &CompilerOptions) -> Self {
        let factory = app.factory();
        let signature_pins = |has_signature: bool, removal_allowed: bool| {
            has_signature && !options.force_proguard_compatibility && !removal_allowed
        };
        let mut dont_merge = FxHashSet::default();
        for class in app.program().program_classes() {
            let mut pin_holder = keep.is_class_pinned(class.ty)
                || signature_pins(
                    class.has_signature,
                    keep.is_class_signature_removal_allowed(class.ty),
                );
            for method in &class.methods {
                let member = MemberRef::from(method.reference);
                if !keep.is_optimization_allowed(member) {
                    pin_holder = true;
                }
                if keep.is_pinned(member)
                    || signature_pins(method.has_signature, keep.is_signature_removal_allowed(member))
                {
                    pin_holder = true;
                    dont_merge.insert(method.reference.holder);
                    dont_merge.extend(factory.referenced_class_types(method.reference.proto));
                }
            }
            for field in &class.fields {
                let member = MemberRef::from(field.reference);
                if !keep.is_optimization_allowed(member) {
                    pin_holder = true;
                }
                if keep.is_pinned(member)
                    || signature_pins(field.has_signature, keep.is_signature_removal_allowed(member))
                {
                    pin_holder = true;
                    dont_merge.insert(field.reference.holder);
                    let ty = factory.base_type(field.reference.ty);
                    if factory.is_class_type(ty) {
                        dont_merge.insert(ty);
                    }
                }
            }
            if pin_holder {
                dont_merge.insert(class.ty);
            }
        }
        tracing::trace!(count = dont_merge.len(), "computed keep-blocked types");
        NoKeepRules { dont_merge }
    }

    pub fn is_blocked(&self, ty: TypeRef) -> bool {
        self.dont_merge.contains(&ty)
    }

    /// Blocked types, sorted by descriptor.
    pub fn blocked_types(&self, factory: &ItemFactory) -> Vec<TypeRef> {
        let mut types: Vec<_> = self.dont_merge.iter().copied().collect();
        types.sort_by_key(|ty| factory.descriptor(*ty));
        types
    }
}

impl SingleClassPolicy for NoKeepRules {
    fn name(&self) -> &'static str {
        "NoKeepRules"
    }

    fn can_merge(&self, class: &ClassDef) -> bool {
        !self.dont_merge.contains(&class.ty)
    }
}
