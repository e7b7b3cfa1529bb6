use fold_diagnostic::InternalResult;
use fold_hierarchy::AppInfo;
use fold_ir::TypeRef;

use super::{partition_by, relaxed_type};
use crate::{MergeGroup, MultiClassPolicy};

/// Classes merge only if their instance fields have the same relaxed types,
/// counted with multiplicity, so every source field has a target field.
pub struct SameInstanceFields<'a, 'p> {
    app: &'a AppInfo<'p>,
}

impl<'a, 'p> SameInstanceFields<'a, 'p> {
    pub fn new(app: &'a AppInfo<'p>) -> Self {
        SameInstanceFields { app }
    }
}

impl MultiClassPolicy for SameInstanceFields<'_, '_> {
    fn name(&self) -> &'static str {
        "SameInstanceFields"
    }

    fn apply(&mut self, group: MergeGroup) -> InternalResult<Vec<MergeGroup>> {
        let factory = self.app.factory();
        Ok(partition_by(&group, |ty| {
            let mut types: Vec<TypeRef> = self
                .app
                .definition_for(ty)
                .into_iter()
                .flat_map(|class| class.instance_fields())
                .map(|field| relaxed_type(factory, field.reference.ty))
                .collect();
            types.sort_by_key(|ty| factory.descriptor(*ty));
            types
        }))
    }
}
