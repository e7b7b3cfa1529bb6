use super::*;
use crate::ErrorCode;
use pretty_assertions::assert_eq;

#[test]
fn test_deduplicates_same_code_and_message() {
    let mut queue = DiagnosticQueue::new();
    let diag = Diagnostic::warning(ErrorCode::E2001).with_message("abandoned `p.A.f`");

    assert!(queue.push(diag.clone()));
    assert!(!queue.push(diag.with_note("second context")));
    assert_eq!(queue.len(), 1);
}

#[test]
fn test_counts_only_errors() {
    let mut queue = DiagnosticQueue::new();
    queue.push(Diagnostic::warning(ErrorCode::E2002).with_message("w"));
    queue.push(Diagnostic::error(ErrorCode::E1001).with_message("e"));

    assert_eq!(queue.error_count(), 1);
    assert!(queue.has_errors());
}

#[test]
fn test_flush_preserves_order_and_resets() {
    let mut queue = DiagnosticQueue::new();
    queue.push(Diagnostic::warning(ErrorCode::E2002).with_message("first"));
    queue.push(Diagnostic::error(ErrorCode::E9001).with_message("second"));

    let flushed = queue.flush();
    let messages: Vec<_> = flushed.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(messages, vec!["first", "second"]);
    assert!(queue.is_empty());
    assert!(!queue.has_errors());
}
