//! Class merging for fold.
//!
//! Two mergers live here. The vertical merger folds a class into its only
//! subtype; the horizontal merger folds sibling classes into one of them.
//! Both describe what they did as a [`MergedClasses`] map plus one
//! [`fold_lens::LensLayer`], and both rewrite the program in place through
//! the [`TreeFixer`].
//!
//! # Design
//!
//! Horizontal candidates come out of a policy pipeline. Each
//! [`SingleClassPolicy`] filters classes, each [`MultiClassPolicy`] splits
//! groups further; [`PolicyScheduler`] orders them per mode and
//! [`PolicyExecutor`] runs them. A group can only leave the pipeline as a
//! [`FinalizedMergeGroup`], which always has a target inside the group and
//! an instance field map.
//!
//! Vertical merging stages [`TentativeBridge`]s while names are still being
//! decided and freezes them through the finished layer; only a
//! [`FrozenBridge`] can be lowered to code.

mod bidi;
mod bridge;
mod executor;
mod group;
mod horizontal;
mod merged;
pub mod policies;
mod policy;
mod scheduler;
mod tree_fixer;
mod vertical;

pub use bidi::BidirectionalManyToOneMap;
pub use bridge::{FrozenBridge, TentativeBridge};
pub use executor::PolicyExecutor;
pub use group::{FinalizedMergeGroup, MergeGroup};
pub use horizontal::{merge_horizontally, HorizontalClassMerger, HorizontalMergeResult};
pub use merged::{MergeKind, MergedClasses};
pub use policy::{MultiClassPolicy, Policy, SingleClassPolicy};
pub use scheduler::{ClassMergerMode, PolicyContext, PolicyScheduler};
pub use tree_fixer::TreeFixer;
pub use vertical::{VerticalClassMerger, VerticalMergeResult};
