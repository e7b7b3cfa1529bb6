//! Collects diagnostics across optimizer stages.

use crate::Diagnostic;

/// Ordered, deduplicating diagnostic buffer.
///
/// Stages push into the queue as they go; the driver drains it once at the
/// end of the compilation. Identical diagnostics (same code and message) are
/// reported once: the rebinding loop may revisit the same reference from
/// several contexts.
#[derive(Default, Debug)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic. Returns `false` if it duplicated one already queued.
    pub fn push(&mut self, diag: Diagnostic) -> bool {
        if self
            .diagnostics
            .iter()
            .any(|d| d.code == diag.code && d.message == diag.message)
        {
            return false;
        }
        if diag.is_error() {
            self.error_count += 1;
        }
        tracing::debug!(code = %diag.code, severity = %diag.severity, "queued diagnostic");
        self.diagnostics.push(diag);
        true
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Take all diagnostics in insertion order.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        self.error_count = 0;
        std::mem::take(&mut self.diagnostics)
    }
}

#[cfg(test)]
mod tests;
