use fold_diagnostic::InternalResult;
use fold_hierarchy::AppInfo;

use super::partition_by;
use crate::{MergeGroup, MultiClassPolicy};

/// Classes merge only with siblings sharing their superclass. Interfaces
/// must also share their super-interface list, which rules out merging an
/// interface with one it extends.
pub struct SameParentClass<'a, 'p> {
    app: &'a AppInfo<'p>,
}

impl<'a, 'p> SameParentClass<'a, 'p> {
    pub fn new(app: &'a AppInfo<'p>) -> Self {
        SameParentClass { app }
    }
}

impl MultiClassPolicy for SameParentClass<'_, '_> {
    fn name(&self) -> &'static str {
        "SameParentClass"
    }

    fn apply(&mut self, group: MergeGroup) -> InternalResult<Vec<MergeGroup>> {
        Ok(partition_by(&group, |ty| {
            let class = self.app.definition_for(ty);
            let super_type = class.and_then(|c| c.super_type);
            let interfaces = match class {
                Some(c) if c.is_interface() => {
                    let mut interfaces = c.interfaces.clone();
                    interfaces.sort_unstable();
                    interfaces
                }
                _ => Vec::new(),
            };
            (super_type, interfaces)
        }))
    }
}
