//! Error codes for fold diagnostics.

use std::fmt;

/// Diagnostic codes, grouped by phase.
///
/// - `E1xxx`: configuration problems detected before or after analysis
/// - `E2xxx`: optimization warnings (the program is still correct, some
///   optimization opportunity was skipped)
/// - `E9xxx`: internal compiler errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Configuration (E1xxx)
    /// Global synthetics were produced but no consumer was configured
    E1001,
    /// Conflicting compiler options
    E1002,

    // Optimization warnings (E2xxx)
    /// Member rebinding abandoned for a reference
    E2001,
    /// No holder found for a visibility bridge; reference left unbound
    E2002,
    /// Merge group discarded after the final policy round
    E2003,

    // Internal errors (E9xxx)
    /// Internal compiler error
    E9001,
}

impl ErrorCode {
    /// All variants, for exhaustive testing.
    pub const ALL: &[ErrorCode] = &[
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E9001,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E9001 => "E9001",
        }
    }

    /// Check if this is a configuration error (E1xxx range).
    pub fn is_config_error(&self) -> bool {
        matches!(self, ErrorCode::E1001 | ErrorCode::E1002)
    }

    /// Check if this is an optimization warning (E2xxx range).
    pub fn is_optimization_warning(&self) -> bool {
        matches!(self, ErrorCode::E2001 | ErrorCode::E2002 | ErrorCode::E2003)
    }

    /// Check if this is an internal compiler error (E9xxx range).
    pub fn is_internal_error(&self) -> bool {
        matches!(self, ErrorCode::E9001)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse a code string like `"E2001"`. Case-insensitive.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == upper)
            .ok_or(())
    }
}
