//! The two shapes of merge policy.

use fold_diagnostic::InternalResult;
use fold_ir::ClassDef;

use crate::MergeGroup;

/// A stateless per-class filter.
pub trait SingleClassPolicy {
    fn name(&self) -> &'static str;

    fn can_merge(&self, class: &ClassDef) -> bool;
}

/// A policy over whole groups: it may split a group, annotate it, or drop
/// it by returning nothing.
pub trait MultiClassPolicy {
    fn name(&self) -> &'static str;

    fn apply(&mut self, group: MergeGroup) -> InternalResult<Vec<MergeGroup>>;

    /// Skip this policy for the current groups altogether.
    fn should_skip(&self, _groups: &[MergeGroup]) -> bool {
        false
    }
}

pub enum Policy<'a> {
    Single(Box<dyn SingleClassPolicy + 'a>),
    Multi(Box<dyn MultiClassPolicy + 'a>),
}

impl Policy<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Policy::Single(policy) => policy.name(),
            Policy::Multi(policy) => policy.name(),
        }
    }
}
