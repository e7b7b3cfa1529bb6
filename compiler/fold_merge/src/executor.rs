//! Running a policy list over candidate groups.

use fold_diagnostic::InternalResult;
use fold_hierarchy::AppInfo;

use crate::{FinalizedMergeGroup, MergeGroup, Policy};

/// Applies policies in order and hands out finalized groups.
pub struct PolicyExecutor<'a, 'p> {
    app: &'a AppInfo<'p>,
}

impl<'a, 'p> PolicyExecutor<'a, 'p> {
    pub fn new(app: &'a AppInfo<'p>) -> Self {
        PolicyExecutor { app }
    }

    /// Trivial groups are dropped after every policy. Every group that
    /// survives the last policy must be finalized.
    pub fn run(
        &self,
        groups: Vec<MergeGroup>,
        policies: Vec<Policy<'_>>,
    ) -> InternalResult<Vec<FinalizedMergeGroup>> {
        let mut groups: Vec<_> = groups.into_iter().filter(|g| !g.is_trivial()).collect();
        for policy in policies {
            if groups.is_empty() {
                break;
            }
            let name = policy.name();
            let before: usize = groups.iter().map(MergeGroup::len).sum();
            groups = match policy {
                Policy::Single(single) => groups
                    .into_iter()
                    .filter_map(|mut group| {
                        group.retain(|ty| {
                            self.app
                                .definition_for(*ty)
                                .is_some_and(|class| single.can_merge(class))
                        });
                        (!group.is_trivial()).then_some(group)
                    })
                    .collect(),
                Policy::Multi(mut multi) => {
                    if multi.should_skip(&groups) {
                        continue;
                    }
                    let mut next = Vec::with_capacity(groups.len());
                    for group in groups {
                        next.extend(
                            multi
                                .apply(group)?
                                .into_iter()
                                .filter(|g| !g.is_trivial()),
                        );
                    }
                    next
                }
            };
            let after: usize = groups.iter().map(MergeGroup::len).sum();
            tracing::debug!(
                policy = name,
                groups = groups.len(),
                removed = before.saturating_sub(after),
                "applied merge policy"
            );
        }
        groups.into_iter().map(FinalizedMergeGroup::try_from).collect()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
