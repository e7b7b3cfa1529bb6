//! Member rebinding for fold.
//!
//! A reference like `B.m()` names the class the source code happened to
//! mention, not the class that declares `m`. Rebinding rewrites each such
//! reference to the declaring holder found by JVM resolution, so later
//! stages (and the runtime) resolve less.
//!
//! # Design
//!
//! The analysis reads one immutable [`fold_hierarchy::AppInfo`] snapshot
//! and the collected [`fold_hierarchy::ProgramUses`]. Bridges it needs are
//! planned against that snapshot and only added to the program once the
//! whole analysis is done; a planned bridge is reused by every later
//! reference that would place the same bridge. The result is one
//! [`fold_lens::LensLayer`] that maps references per invoke kind, applied
//! to the program with the [`fold_merge::TreeFixer`].
//!
//! A reference is left alone whenever rebinding it could change behavior
//! or produce an illegal access: the target is private to another class,
//! the rebound holder would need a different invoke instruction, or some
//! caller could not see the new holder and no bridge holder exists.

mod analysis;
mod walk;

pub use analysis::MemberRebindingAnalysis;
