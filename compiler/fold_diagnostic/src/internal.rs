//! Internal compiler errors.

use thiserror::Error;

use crate::{Diagnostic, ErrorCode};

/// Result alias for operations that can only fail on a broken invariant.
pub type InternalResult<T> = Result<T, InternalError>;

/// A violated optimizer invariant.
///
/// `location` names the class or member the failure was detected on, when
/// there is one.
#[derive(Clone, Eq, PartialEq, Debug, Error)]
#[error("internal compiler error: {message}{}", .location.as_ref().map(|l| format!(" (at {l})")).unwrap_or_default())]
pub struct InternalError {
    pub message: String,
    pub location: Option<String>,
}

impl InternalError {
    pub fn new(message: impl Into<String>) -> Self {
        let error = InternalError {
            message: message.into(),
            location: None,
        };
        tracing::error!(message = %error.message, "internal compiler error");
        error
    }

    #[must_use]
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Convert to an `E9001` diagnostic for reporting.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(ErrorCode::E9001).with_message(self.message.clone());
        match &self.location {
            Some(location) => diag.with_note(format!("detected at {location}")),
            None => diag,
        }
    }
}
