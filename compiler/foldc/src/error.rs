//! The driver's error type.

use fold_diagnostic::{Diagnostic, InternalError};
use thiserror::Error;

/// Why a compilation produced no output.
#[derive(Clone, Debug, Error)]
pub enum CompileError {
    /// An optimizer invariant was violated.
    #[error(transparent)]
    Internal(#[from] InternalError),
    /// The input or configuration was rejected. Holds at least one error.
    #[error("compilation failed with {} diagnostic(s)", .0.len())]
    Diagnostics(Vec<Diagnostic>),
}

impl CompileError {
    /// Everything to report, an internal error rendered as `E9001`.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            CompileError::Internal(error) => vec![error.to_diagnostic()],
            CompileError::Diagnostics(diagnostics) => diagnostics.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fold_diagnostic::ErrorCode;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_internal_error_reports_e9001() {
        let error = CompileError::from(InternalError::new("unfinalized group").at("Lp/A;"));
        let codes: Vec<ErrorCode> = error.diagnostics().iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![ErrorCode::E9001]);
        assert_eq!(
            error.to_string(),
            "internal compiler error: unfinalized group (at Lp/A;)"
        );
    }

    #[test]
    fn test_diagnostics_are_passed_through() {
        let error = CompileError::Diagnostics(vec![Diagnostic::error(ErrorCode::E1001)]);
        assert_eq!(error.to_string(), "compilation failed with 1 diagnostic(s)");
        assert_eq!(error.diagnostics().len(), 1);
    }
}
