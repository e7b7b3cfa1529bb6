//! The reference rewrite lens.
//!
//! Every stage that changes the class hierarchy (vertical merging,
//! horizontal merging, member rebinding) describes its edits as one
//! [`LensLayer`]: which types were folded into which, which members were
//! renamed or moved, which `super` calls now run a moved implementation
//! directly. A [`RewriteLens`] is the identity composed with the layers of
//! every stage so far; querying it maps a reference from the input program
//! to the one the output program uses.
//!
//! # Design
//!
//! A layer only stores explicit entries. Anything without one is rewritten
//! structurally: holder and prototype types go through the layer's type
//! map, array types element-wise. That keeps layers proportional to the
//! edit, not to the program.
//!
//! Consumers see layers and lenses through [`ReferenceRewriter`], which is
//! also what [`rewrite_code`] takes: stages rewrite method bodies with their
//! own layer, downstream code rewrites with the composed lens.

mod builder;
mod layer;
mod lens;
mod rewrite;

pub use builder::LensBuilder;
pub use layer::{LensLayer, MethodLookup, MethodTarget};
pub use lens::RewriteLens;
pub use rewrite::{rewrite_code, ReferenceRewriter};
