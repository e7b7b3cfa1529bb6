//! Diagnostics for the fold class-merging pipeline.
//!
//! Two kinds of failure leave the optimizer:
//!
//! - [`InternalError`]: a broken invariant (a cyclic merge map, a group that
//!   reached the end of the policy pipeline without a target, a rewritten
//!   reference whose holder no longer exists). These abort the compilation.
//! - [`Diagnostic`]: a user-facing message with an [`ErrorCode`]. Warnings
//!   (for example an abandoned rebinding) are queued and the pipeline continues;
//!   configuration errors are reported and the compilation stops early.
//!
//! # Design
//!
//! Codes are grouped in phase ranges the same way the rest of the toolchain
//! does it: `E1xxx` configuration, `E2xxx` optimization warnings, `E9xxx`
//! internal compiler errors. [`InternalError::to_diagnostic`] is the single
//! bridge from the first kind to the second.

mod diagnostic;
mod error_code;
mod internal;
mod queue;

pub use diagnostic::{Diagnostic, Severity};
pub use error_code::ErrorCode;
pub use internal::{InternalError, InternalResult};
pub use queue::DiagnosticQueue;
