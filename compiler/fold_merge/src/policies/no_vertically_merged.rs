use fold_ir::ClassDef;

use crate::{MergedClasses, SingleClassPolicy};

/// Leaves alone classes involved in vertical merging.
pub struct NoVerticallyMergedClasses<'a> {
    vertically_merged: &'a MergedClasses,
}

impl<'a> NoVerticallyMergedClasses<'a> {
    pub fn new(vertically_merged: &'a MergedClasses) -> Self {
        NoVerticallyMergedClasses { vertically_merged }
    }
}

impl SingleClassPolicy for NoVerticallyMergedClasses<'_> {
    fn name(&self) -> &'static str {
        "NoVerticallyMergedClasses"
    }

    fn can_merge(&self, class: &ClassDef) -> bool {
        !self.vertically_merged.has_been_merged_into_subtype(class.ty)
            && !self.vertically_merged.is_merge_target(class.ty)
    }
}
