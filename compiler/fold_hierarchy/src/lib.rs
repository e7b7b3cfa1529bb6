//! Read-only oracles over a [`Program`](fold_ir::Program) snapshot.
//!
//! - [`AppInfo`]: definitions, the immediate-subtype graph, subtype tests,
//!   and JVM method and field resolution.
//! - [`AccessConstraint`]: visibility of a class or member from a context.
//! - [`KeepInfo`]: which classes and members are pinned by keep rules.
//! - [`ProgramUses`]: every invoke and field access in the program, grouped
//!   by reference, with the methods that perform it.
//! - [`InstantiationInfo`]: which types are (directly or indirectly)
//!   instantiated.
//!
//! # Design
//!
//! Everything here is computed from an immutable snapshot and never mutated
//! afterwards. Stages that change the program build a fresh `AppInfo` for
//! the next stage instead of patching this one. Hierarchy walks use explicit
//! worklists with visited sets, so a malformed (cyclic) hierarchy terminates.

mod access;
mod app_info;
mod instantiation;
mod keep;
mod resolution;
mod uses;

pub use access::{derive_constraint, is_member_visible_from, AccessConstraint};
pub use app_info::AppInfo;
pub use instantiation::InstantiationInfo;
pub use keep::{KeepInfo, KeepInfoBuilder};
pub use resolution::{ResolvedField, ResolvedMethod};
pub use uses::{ContextSet, ProgramUses};
