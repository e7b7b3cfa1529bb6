//! Global synthetics of intermediate builds.

use fold_diagnostic::ErrorCode;
use fold_ir::{
    AccessFlags, CollectingSyntheticsConsumer, CompilerOptions, InvokeKind, ItemFactory, Program, ProgramBuilder,
    SyntheticKind,
};
use foldc::{Compilation, CompileError};
use pretty_assertions::assert_eq;

use crate::common::void_method;

/// `A { private m(); invokeM() { m(); } }` and `B extends A { private m() }`:
/// merging A into B needs a bridge for `invokeM`.
fn bridging_program(factory: &ItemFactory) -> Program {
    let mut b = ProgramBuilder::new(factory);
    let a_m = void_method(factory, "p.A", "m");
    b.class("p.A")
        .method("m", "()V", AccessFlags::PRIVATE)
        .method_with("invokeM", "()V", AccessFlags::PUBLIC, |code, args| {
            code.invoke(InvokeKind::Direct, a_m, false, &[args[0]], false);
        })
        .finish();
    b.class("p.B")
        .extends("p.A")
        .method("m", "()V", AccessFlags::PRIVATE)
        .finish();
    b.build().unwrap()
}

fn intermediate() -> CompilerOptions {
    CompilerOptions::whole_program()
        .with_intermediate(true)
        .with_threads(1)
}

#[test]
fn test_intermediate_build_without_consumer_fails() {
    let factory = ItemFactory::new();
    let error = Compilation::new(&factory, intermediate())
        .run(bridging_program(&factory))
        .unwrap_err();

    let CompileError::Diagnostics(diagnostics) = error else {
        panic!("expected diagnostics, got {error:?}");
    };
    let codes: Vec<ErrorCode> = diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E1001]);
}

#[test]
fn test_consumer_receives_every_global_synthetic() {
    let factory = ItemFactory::new();
    let mut consumer = CollectingSyntheticsConsumer::default();
    let output = Compilation::new(&factory, intermediate())
        .with_global_synthetics_consumer(&mut consumer)
        .run(bridging_program(&factory))
        .unwrap();

    assert_eq!(output.synthetics.count(SyntheticKind::VerticalMergeBridge), 1);
    assert_eq!(consumer.accepted.len(), output.synthetics.len());
    assert_eq!(consumer.accepted[0].method, void_method(&factory, "p.B", "invokeM"));
    assert!(consumer.finished);
}

#[test]
fn test_non_intermediate_build_keeps_synthetics_local() {
    let factory = ItemFactory::new();
    let output = Compilation::new(&factory, CompilerOptions::whole_program().with_threads(1))
        .run(bridging_program(&factory))
        .unwrap();

    assert!(!output.synthetics.is_global());
    assert_eq!(output.synthetics.len(), 1);
}
