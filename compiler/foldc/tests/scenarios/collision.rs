//! Vertical merging keeps colliding method signatures apart.

use std::collections::BTreeSet;

use fold_ir::{AccessFlags, CompilerOptions, InvokeKind, ItemFactory, Program, ProgramBuilder};
use pretty_assertions::assert_eq;

use crate::common::{compile, find_method, invokes, void_method};

/// `A { private m(); invokeM() { m(); } }`, `B extends A { private m() { invokeM(); } }`,
/// `C { public m(); }`, `D extends C { public m() { super.m(); } }`.
fn collision_program(factory: &ItemFactory) -> Program {
    let mut b = ProgramBuilder::new(factory);
    let a_m = void_method(factory, "p.A", "m");
    let b_invoke_m = void_method(factory, "p.B", "invokeM");
    let c_m = void_method(factory, "p.C", "m");
    b.class("p.A")
        .method("m", "()V", AccessFlags::PRIVATE)
        .method_with("invokeM", "()V", AccessFlags::PUBLIC, |code, args| {
            code.invoke(InvokeKind::Direct, a_m, false, &[args[0]], false);
        })
        .finish();
    b.class("p.B")
        .extends("p.A")
        .method_with("m", "()V", AccessFlags::PRIVATE, |code, args| {
            code.invoke(InvokeKind::Virtual, b_invoke_m, false, &[args[0]], false);
        })
        .finish();
    b.class("p.C").method("m", "()V", AccessFlags::PUBLIC).finish();
    b.class("p.D")
        .extends("p.C")
        .method_with("m", "()V", AccessFlags::PUBLIC, |code, args| {
            code.invoke(InvokeKind::Super, c_m, false, &[args[0]], false);
        })
        .finish();
    b.build().unwrap()
}

#[test]
fn test_merged_hierarchies_keep_both_m_bodies() {
    let factory = ItemFactory::new();
    let output = compile(
        &factory,
        collision_program(&factory),
        CompilerOptions::whole_program().with_threads(1),
    );
    let program = &output.program;
    let [a, bt, c, d] = ["p.A", "p.B", "p.C", "p.D"].map(|n| factory.class_type(n));

    assert_eq!(output.vertically_merged.target_for(a), Some(bt));
    assert_eq!(output.vertically_merged.target_for(c), Some(d));
    assert_eq!(output.lens.lookup_type(&factory, a), bt);
    assert!(program.contains(bt));
    assert!(program.contains(d));

    for class in program.program_classes() {
        let signatures: BTreeSet<_> = class.methods.iter().map(|m| m.signature()).collect();
        assert_eq!(signatures.len(), class.methods.len(), "duplicate signature in {:?}", class.ty);
    }

    // B's own m still calls invokeM; A's m survives under a fresh name and
    // is what invokeM runs.
    let b_m = find_method(&factory, program, "p.B", "m", "()V").unwrap();
    assert_eq!(
        invokes(b_m),
        vec![(InvokeKind::Virtual, void_method(&factory, "p.B", "invokeM"), false)]
    );
    let invoke_m_impl = find_method(&factory, program, "p.B", "invokeM$A$0", "()V").unwrap();
    assert_eq!(
        invokes(invoke_m_impl),
        vec![(InvokeKind::Direct, void_method(&factory, "p.B", "m$A$0"), false)]
    );

    // D's m runs C's body through a direct call.
    let d_m = find_method(&factory, program, "p.D", "m", "()V").unwrap();
    assert_eq!(
        invokes(d_m),
        vec![(InvokeKind::Direct, void_method(&factory, "p.D", "m$C$0"), false)]
    );
    assert!(find_method(&factory, program, "p.D", "m$C$0", "()V").is_some());
}
