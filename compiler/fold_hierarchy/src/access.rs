//! Access constraints between a context class and a class or member.

use fold_ir::{AccessFlags, ClassDef, TypeRef};

use crate::AppInfo;

/// The widest set of contexts that may access an item.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum AccessConstraint {
    /// Not accessible from the context at all.
    Never,
    SameClass,
    SamePackage,
    Subclass,
    Always,
}

impl AccessConstraint {
    pub fn is_never(self) -> bool {
        self == AccessConstraint::Never
    }
}

/// Constraint for accessing an item with `flags` declared on `target_holder`
/// from code in `context`.
///
/// For class visibility pass the class's own flags: a public class is
/// accessible everywhere, any other class only from its package.
pub fn derive_constraint(
    app: &AppInfo<'_>,
    context: TypeRef,
    target_holder: TypeRef,
    flags: AccessFlags,
) -> AccessConstraint {
    if flags.is_public() {
        AccessConstraint::Always
    } else if flags.is_private() {
        if context == target_holder {
            AccessConstraint::SameClass
        } else {
            AccessConstraint::Never
        }
    } else if flags.is_protected() {
        if app.is_same_package(context, target_holder) {
            AccessConstraint::SamePackage
        } else if app.is_subtype(context, target_holder) {
            AccessConstraint::Subclass
        } else {
            AccessConstraint::Never
        }
    } else if app.is_same_package(context, target_holder) {
        AccessConstraint::SamePackage
    } else {
        AccessConstraint::Never
    }
}

/// Both the holder class and the member are accessible from `context`.
pub fn is_member_visible_from(
    app: &AppInfo<'_>,
    context: TypeRef,
    holder: &ClassDef,
    member_flags: AccessFlags,
) -> bool {
    let class = derive_constraint(app, context, holder.ty, holder.access);
    let member = derive_constraint(app, context, holder.ty, member_flags);
    !class.is_never() && !member.is_never()
}
