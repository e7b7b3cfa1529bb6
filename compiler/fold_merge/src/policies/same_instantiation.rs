use fold_diagnostic::InternalResult;
use fold_hierarchy::InstantiationInfo;

use super::partition_by;
use crate::{MergeGroup, MultiClassPolicy};

/// Instantiated and never-instantiated classes are merged separately, so a
/// merge does not make an uninstantiated type look instantiated.
pub struct SameInstantiation<'a> {
    instantiation: &'a InstantiationInfo,
}

impl<'a> SameInstantiation<'a> {
    pub fn new(instantiation: &'a InstantiationInfo) -> Self {
        SameInstantiation { instantiation }
    }
}

impl MultiClassPolicy for SameInstantiation<'_> {
    fn name(&self) -> &'static str {
        "SameInstantiation"
    }

    fn apply(&mut self, group: MergeGroup) -> InternalResult<Vec<MergeGroup>> {
        Ok(partition_by(&group, |ty| self.instantiation.is_instantiated(ty)))
    }
}
