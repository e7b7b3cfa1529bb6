use fold_diagnostic::InternalResult;
use fold_ir::ItemFactory;

use super::partition_by;
use crate::{MergeGroup, MultiClassPolicy};

pub struct SamePackage<'a> {
    factory: &'a ItemFactory,
}

impl<'a> SamePackage<'a> {
    pub fn new(factory: &'a ItemFactory) -> Self {
        SamePackage { factory }
    }
}

impl MultiClassPolicy for SamePackage<'_> {
    fn name(&self) -> &'static str {
        "SamePackage"
    }

    fn apply(&mut self, group: MergeGroup) -> InternalResult<Vec<MergeGroup>> {
        Ok(partition_by(&group, |ty| self.factory.package_descriptor(ty)))
    }
}
