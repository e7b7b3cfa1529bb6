//! Keep information: what must survive optimization unchanged.

use rustc_hash::FxHashSet;

use fold_ir::{FieldRef, MemberRef, MethodRef, TypeRef};

/// Keep rules resolved against the program.
///
/// A pinned item keeps its identity: it is not merged, moved, or renamed.
/// Optimization can be disallowed without pinning (the item may not be
/// rewritten but may still be referenced from merged code), and generic
/// signatures can be marked as required.
#[derive(Clone, Default, Debug)]
pub struct KeepInfo {
    pinned_classes: FxHashSet<TypeRef>,
    pinned_members: FxHashSet<MemberRef>,
    no_optimization: FxHashSet<MemberRef>,
    kept_class_signatures: FxHashSet<TypeRef>,
    kept_member_signatures: FxHashSet<MemberRef>,
}

impl KeepInfo {
    /// Nothing is kept.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> KeepInfoBuilder {
        KeepInfoBuilder::default()
    }

    pub fn is_class_pinned(&self, ty: TypeRef) -> bool {
        self.pinned_classes.contains(&ty)
    }

    pub fn is_pinned(&self, member: MemberRef) -> bool {
        self.pinned_members.contains(&member)
    }

    pub fn is_optimization_allowed(&self, member: MemberRef) -> bool {
        !self.is_pinned(member) && !self.no_optimization.contains(&member)
    }

    pub fn is_signature_removal_allowed(&self, member: MemberRef) -> bool {
        !self.kept_member_signatures.contains(&member)
    }

    pub fn is_class_signature_removal_allowed(&self, ty: TypeRef) -> bool {
        !self.kept_class_signatures.contains(&ty)
    }

    /// Pinned classes, for the instantiation analysis.
    pub fn pinned_classes(&self) -> impl Iterator<Item = TypeRef> + '_ {
        self.pinned_classes.iter().copied()
    }
}

#[derive(Default)]
pub struct KeepInfoBuilder {
    info: KeepInfo,
}

impl KeepInfoBuilder {
    #[must_use]
    pub fn pin_class(mut self, ty: TypeRef) -> Self {
        self.info.pinned_classes.insert(ty);
        self
    }

    #[must_use]
    pub fn pin_method(mut self, method: MethodRef) -> Self {
        self.info.pinned_members.insert(method.into());
        self
    }

    #[must_use]
    pub fn pin_field(mut self, field: FieldRef) -> Self {
        self.info.pinned_members.insert(field.into());
        self
    }

    #[must_use]
    pub fn disallow_optimization(mut self, member: MemberRef) -> Self {
        self.info.no_optimization.insert(member);
        self
    }

    #[must_use]
    pub fn keep_class_signature(mut self, ty: TypeRef) -> Self {
        self.info.kept_class_signatures.insert(ty);
        self
    }

    #[must_use]
    pub fn keep_signature(mut self, member: MemberRef) -> Self {
        self.info.kept_member_signatures.insert(member);
        self
    }

    pub fn build(self) -> KeepInfo {
        self.info
    }
}
