//! Option combinations and per-file mode.

use fold_diagnostic::ErrorCode;
use fold_ir::{AccessFlags, CompilerOptions, ItemFactory, ProgramBuilder};
use foldc::{Compilation, CompileError};
use pretty_assertions::assert_eq;

use crate::common::compile;

#[test]
fn test_rebinding_requires_whole_program_mode() {
    let factory = ItemFactory::new();
    let program = ProgramBuilder::new(&factory).build().unwrap();
    let error = Compilation::new(&factory, CompilerOptions::per_file().with_member_rebinding(true))
        .run(program)
        .unwrap_err();

    let diagnostics = error.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, ErrorCode::E1002);
    assert!(diagnostics[0].message.contains("member rebinding"));
    assert!(matches!(error, CompileError::Diagnostics(_)));
}

#[test]
fn test_per_file_mode_leaves_hierarchies_alone() {
    let factory = ItemFactory::new();
    let mut b = ProgramBuilder::new(&factory);
    let s = b.class("p.S").field("f", "I", AccessFlags::PUBLIC).finish();
    let t = b.class("p.T").extends("p.S").finish();
    let output = compile(&factory, b.build().unwrap(), CompilerOptions::per_file().with_threads(1));

    assert!(output.vertically_merged.is_empty());
    assert!(output.horizontally_merged.is_empty());
    assert!(output.program.contains(s));
    assert!(output.program.contains(t));
}

#[test]
fn test_per_file_mode_merges_field_free_siblings() {
    let factory = ItemFactory::new();
    let mut b = ProgramBuilder::new(&factory);
    let u = b.class("p.U").method("u", "()V", AccessFlags::PUBLIC).finish();
    let v = b.class("p.V").method("v", "()V", AccessFlags::PUBLIC).finish();
    let output = compile(&factory, b.build().unwrap(), CompilerOptions::per_file().with_threads(1));

    assert_eq!(output.horizontally_merged.entries(), vec![(v, u)]);
    assert!(!output.program.contains(v));
    assert_eq!(output.lens.lookup_type(&factory, v), u);
}
