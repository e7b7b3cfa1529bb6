use fold_diagnostic::InternalResult;
use fold_hierarchy::AppInfo;

use super::{compute_instance_field_map, partition_disjoint, unified_proto};
use crate::{MergeGroup, MultiClassPolicy};

/// Final-round constructor handling.
///
/// The final round may only rename, so constructors cannot be told apart
/// by extra parameters. Groups are split until no two classes share a
/// constructor signature, then each part gets its target and field map.
pub struct NoInstanceInitializerMerging<'a, 'p> {
    app: &'a AppInfo<'p>,
}

impl<'a, 'p> NoInstanceInitializerMerging<'a, 'p> {
    pub fn new(app: &'a AppInfo<'p>) -> Self {
        NoInstanceInitializerMerging { app }
    }
}

impl MultiClassPolicy for NoInstanceInitializerMerging<'_, '_> {
    fn name(&self) -> &'static str {
        "NoInstanceInitializerMerging"
    }

    fn apply(&mut self, group: MergeGroup) -> InternalResult<Vec<MergeGroup>> {
        let factory = self.app.factory();
        let parts = partition_disjoint(&group, |ty| {
            self.app
                .definition_for(ty)
                .into_iter()
                .flat_map(|class| class.instance_initializers())
                .map(|init| unified_proto(factory, &group, init.reference.proto))
                .collect()
        });
        let mut finalized = Vec::with_capacity(parts.len());
        for mut part in parts {
            if part.is_trivial() {
                continue;
            }
            let Some(&target) = part.classes().first() else {
                continue;
            };
            part.set_target(target, factory)?;
            let field_map = compute_instance_field_map(self.app, &part, target)?;
            part.finalize(field_map)?;
            finalized.push(part);
        }
        Ok(finalized)
    }

    fn should_skip(&self, groups: &[MergeGroup]) -> bool {
        groups.iter().all(MergeGroup::is_interface_group)
    }
}
