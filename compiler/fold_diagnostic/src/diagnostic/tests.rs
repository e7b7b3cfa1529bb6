use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_builder_sets_fields() {
    let diag = Diagnostic::warning(ErrorCode::E2001)
        .with_message("rebinding abandoned for `p.A.m()V`")
        .with_note("no context can see the resolved target");

    assert!(diag.is_warning());
    assert!(!diag.is_error());
    assert_eq!(diag.notes.len(), 1);
}

#[test]
fn test_display_includes_code_and_notes() {
    let diag = Diagnostic::error(ErrorCode::E1001)
        .with_message("no global synthetics consumer")
        .with_note("configure one for intermediate builds");

    assert_eq!(
        diag.to_string(),
        "error [E1001]: no global synthetics consumer\n  = note: configure one for intermediate builds"
    );
}
