//! Which types may have instances at runtime.

use rustc_hash::FxHashSet;

use fold_ir::TypeRef;

use crate::{AppInfo, KeepInfo, ProgramUses};

/// A type is *directly* instantiated when some method allocates it, and
/// *indirectly* instantiated when a subtype is. Pinned classes count as
/// directly instantiated: reflection may create them.
#[derive(Clone, Default, Debug)]
pub struct InstantiationInfo {
    direct: FxHashSet<TypeRef>,
    any: FxHashSet<TypeRef>,
}

impl InstantiationInfo {
    pub fn new(app: &AppInfo<'_>, uses: &ProgramUses, keep: &KeepInfo) -> Self {
        let direct: FxHashSet<TypeRef> = uses
            .instantiated_types()
            .chain(keep.pinned_classes())
            .collect();
        let mut any = direct.clone();
        for ty in &direct {
            any.extend(app.all_supertypes(*ty));
        }
        tracing::debug!(direct = direct.len(), total = any.len(), "instantiation info");
        InstantiationInfo { direct, any }
    }

    pub fn is_directly_instantiated(&self, ty: TypeRef) -> bool {
        self.direct.contains(&ty)
    }

    /// Directly or indirectly instantiated.
    pub fn is_instantiated(&self, ty: TypeRef) -> bool {
        self.any.contains(&ty)
    }
}
