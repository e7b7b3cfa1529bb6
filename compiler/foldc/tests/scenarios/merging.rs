//! Merged-class maps: targets, cycles and keep rules.

use fold_hierarchy::KeepInfo;
use fold_ir::{AccessFlags, CompilerOptions, InvokeKind, ItemFactory, Program, ProgramBuilder};
use fold_merge::MergedClasses;
use foldc::{Compilation, CompilationOutput};
use pretty_assertions::assert_eq;

use crate::common::{find_method, invokes, void_method};

/// `p.A { a() }` and `p.B { b() }`, both created and called from `p.Main`.
fn siblings_program(factory: &ItemFactory) -> Program {
    let mut b = ProgramBuilder::new(factory);
    let a = b.class("p.A").method("a", "()V", AccessFlags::PUBLIC).finish();
    let bt = b.class("p.B").method("b", "()V", AccessFlags::PUBLIC).finish();
    let a_a = void_method(factory, "p.A", "a");
    let b_b = void_method(factory, "p.B", "b");
    b.class("p.Main")
        .method_with("main", "()V", AccessFlags::PUBLIC | AccessFlags::STATIC, |code, _| {
            let first = code.new_instance(a);
            code.invoke(InvokeKind::Virtual, a_a, false, &[first], false);
            let second = code.new_instance(bt);
            code.invoke(InvokeKind::Virtual, b_b, false, &[second], false);
        })
        .finish();
    b.build().unwrap()
}

fn run(factory: &ItemFactory, program: Program, keep: KeepInfo) -> CompilationOutput {
    Compilation::new(factory, CompilerOptions::whole_program().with_threads(1))
        .with_keep_info(keep)
        .run(program)
        .unwrap()
}

/// Every entry points at a class that is still there and is not itself a
/// source.
fn assert_single_hop(merged: &MergedClasses, program: &Program) {
    for (source, target) in merged.entries() {
        assert_ne!(source, target);
        assert_eq!(merged.target_for(target), None);
        assert!(program.contains(target));
        assert!(!program.contains(source));
    }
}

#[test]
fn test_siblings_merge_into_a_member_of_their_group() {
    let factory = ItemFactory::new();
    let output = run(&factory, siblings_program(&factory), KeepInfo::empty());
    let [a, bt] = ["p.A", "p.B"].map(|n| factory.class_type(n));

    let entries = output.horizontally_merged.entries();
    assert_eq!(entries.len(), 1);
    let (source, target) = entries[0];
    assert!([a, bt].contains(&source));
    assert!([a, bt].contains(&target));
    assert_single_hop(&output.horizontally_merged, &output.program);
    assert_eq!(output.lens.lookup_type(&factory, source), target);

    let target_name = if target == a { "p.A" } else { "p.B" };
    let main = find_method(&factory, &output.program, "p.Main", "main", "()V").unwrap();
    let holders: Vec<_> = invokes(main).iter().map(|(_, method, _)| method.holder).collect();
    assert_eq!(holders, vec![target, target]);
    assert!(find_method(&factory, &output.program, target_name, "a", "()V").is_some());
    assert!(find_method(&factory, &output.program, target_name, "b", "()V").is_some());
}

#[test]
fn test_vertical_and_horizontal_maps_stay_single_hop() {
    let factory = ItemFactory::new();
    let mut b = ProgramBuilder::new(&factory);
    b.class("p.S").method("s", "()V", AccessFlags::PUBLIC).finish();
    let t = b.class("p.T").extends("p.S").finish();
    let u = b.class("p.U").method("u", "()V", AccessFlags::PUBLIC).finish();
    b.class("p.Main")
        .method_with("main", "()V", AccessFlags::PUBLIC | AccessFlags::STATIC, |code, _| {
            code.new_instance(t);
            code.new_instance(u);
        })
        .finish();
    let output = run(&factory, b.build().unwrap(), KeepInfo::empty());

    let s = factory.class_type("p.S");
    assert!(output.vertically_merged.is_merge_source(s));
    assert_single_hop(&output.vertically_merged, &output.program);
    assert_single_hop(&output.horizontally_merged, &output.program);
}

#[test]
fn test_class_with_pinned_member_is_never_a_source() {
    let factory = ItemFactory::new();
    let pinned = void_method(&factory, "p.B", "b");
    let keep = KeepInfo::builder().pin_method(pinned).build();
    let output = run(&factory, siblings_program(&factory), keep);
    let bt = factory.class_type("p.B");

    assert!(!output.horizontally_merged.is_merge_source(bt));
    assert!(!output.vertically_merged.is_merge_source(bt));
    assert!(output.program.contains(bt));
    assert!(find_method(&factory, &output.program, "p.B", "b", "()V").is_some());
}

#[test]
fn test_superclass_with_pinned_field_is_not_merged_down() {
    let factory = ItemFactory::new();
    let mut b = ProgramBuilder::new(&factory);
    b.class("p.S").field("f", "I", AccessFlags::PUBLIC).finish();
    b.class("p.T").extends("p.S").finish();
    let program = b.build().unwrap();
    let s = factory.class_type("p.S");
    let keep = KeepInfo::builder()
        .pin_field(factory.create_field(s, "f", factory.int_type))
        .build();
    let output = run(&factory, program, keep);

    assert!(output.vertically_merged.is_empty());
    assert!(!output.horizontally_merged.is_merge_source(s));
    assert!(output.program.contains(s));
}
