//! Member rebinding through the whole pipeline.

use fold_diagnostic::ErrorCode;
use fold_hierarchy::AppInfo;
use fold_ir::{
    AccessFlags, InvokeKind, ItemFactory, MethodRef, OutputFormat, Program, ProgramBuilder, SyntheticKind,
};
use pretty_assertions::assert_eq;

use crate::common::{compile, find_method, invokes, rebinding_only, void_method};

/// A static `main(receiver)` on `caller` that invokes `target` once.
fn add_caller(b: &mut ProgramBuilder<'_>, caller: &str, receiver: &str, kind: InvokeKind, target: MethodRef) {
    let descriptor = format!("({receiver})V");
    b.class(caller)
        .public()
        .method_with("main", &descriptor, AccessFlags::PUBLIC | AccessFlags::STATIC, |code, args| {
            code.invoke(kind, target, false, &[args[0]], false);
        })
        .finish();
}

/// Callers on both sides of a package boundary, reaching methods declared
/// above their receivers.
fn mixed_program(factory: &ItemFactory) -> Program {
    let mut b = ProgramBuilder::new(factory);
    b.class("p.X").method("m", "()V", AccessFlags::PUBLIC).finish();
    b.class("q.Y").public().extends("p.X").finish();
    b.class("p.A").public().method("n", "()V", AccessFlags::PUBLIC).finish();
    b.class("p.B").public().extends("p.A").finish();
    add_caller(&mut b, "r.Main", "Lq/Y;", InvokeKind::Virtual, void_method(factory, "q.Y", "m"));
    add_caller(&mut b, "r.Other", "Lp/B;", InvokeKind::Virtual, void_method(factory, "p.B", "n"));
    add_caller(&mut b, "p.Local", "Lq/Y;", InvokeKind::Virtual, void_method(factory, "q.Y", "m"));
    b.build().unwrap()
}

const CALLERS: [(&str, &str); 3] = [("r.Main", "(Lq/Y;)V"), ("r.Other", "(Lp/B;)V"), ("p.Local", "(Lq/Y;)V")];

#[test]
fn test_every_call_site_still_reaches_its_definition() {
    let factory = ItemFactory::new();
    let input = mixed_program(&factory);
    let before: Vec<MethodRef> = {
        let app = AppInfo::new(&input, &factory);
        CALLERS
            .iter()
            .map(|(caller, descriptor)| {
                let main = find_method(&factory, &input, caller, "main", descriptor).unwrap();
                let (_, method, _) = invokes(main)[0];
                app.resolve_method_on_class(&method).unwrap().reference()
            })
            .collect()
    };

    let output = compile(&factory, input, rebinding_only());
    let app = AppInfo::new(&output.program, &factory);
    for ((caller, descriptor), definition) in CALLERS.iter().zip(before) {
        let main = find_method(&factory, &output.program, caller, "main", descriptor).unwrap();
        let (_, method, _) = invokes(main)[0];
        let resolved = app.resolve_method_on_class(&method).unwrap();
        if resolved.reference() == definition {
            continue;
        }
        // Anything else must be a bridge straight to the old definition.
        assert!(resolved.access().is_bridge(), "{caller} lost its target");
        let (_, forwarded, _) = invokes(resolved.definition)[0];
        assert_eq!(app.resolve_method(&forwarded).unwrap().reference(), definition);
    }
    assert_eq!(output.synthetics.count(SyntheticKind::VisibilityBridge), 1);
}

#[test]
fn test_lens_maps_original_references_to_rebound_ones() {
    let factory = ItemFactory::new();
    let output = compile(&factory, mixed_program(&factory), rebinding_only());
    let lookup = |method: MethodRef, context: &str| {
        output
            .lens
            .lookup_method(
                &factory,
                &method,
                InvokeKind::Virtual,
                false,
                Some(factory.class_type(context)),
            )
            .reference
    };

    assert_eq!(
        lookup(void_method(&factory, "p.B", "n"), "r.Other"),
        void_method(&factory, "p.A", "n")
    );
    // r.Main cannot see p.X, so its reference has to stay on the bridge holder.
    assert_eq!(
        lookup(void_method(&factory, "q.Y", "m"), "r.Main"),
        void_method(&factory, "q.Y", "m")
    );
}

#[test]
fn test_interface_super_bridge_lands_in_class_file_output() {
    let factory = ItemFactory::new();
    let mut b = ProgramBuilder::new(&factory);
    b.interface("p.J").public().method("m", "()V", AccessFlags::PUBLIC).finish();
    b.interface("p.I").public().implements("p.J").finish();
    b.class("p.A").public().implements("p.I").finish();
    let a_m = void_method(&factory, "p.A", "m");
    b.class("p.B")
        .public()
        .extends("p.A")
        .method_with("x", "()V", AccessFlags::PUBLIC, |code, args| {
            code.invoke(InvokeKind::Super, a_m, false, &[args[0]], false);
        })
        .finish();
    let output = compile(
        &factory,
        b.build().unwrap(),
        rebinding_only().with_output(OutputFormat::ClassFile),
    );

    assert_eq!(output.synthetics.count(SyntheticKind::InterfaceSuperBridge), 1);
    let bridge = find_method(&factory, &output.program, "p.A", "m", "()V").unwrap();
    assert_eq!(
        invokes(bridge),
        vec![(InvokeKind::Super, void_method(&factory, "p.J", "m"), true)]
    );
    assert!(output.diagnostics.is_empty());
}

#[test]
fn test_abandoned_rebinding_surfaces_as_warning() {
    let factory = ItemFactory::new();
    let mut b = ProgramBuilder::new(&factory);
    b.class("p.A").method("m", "()V", AccessFlags::PRIVATE).finish();
    b.class("p.B").extends("p.A").finish();
    add_caller(&mut b, "p.Main", "Lp/B;", InvokeKind::Virtual, void_method(&factory, "p.B", "m"));
    let output = compile(&factory, b.build().unwrap(), rebinding_only());

    let codes: Vec<ErrorCode> = output.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E2001]);
    assert!(output.lens.is_identity());
}

#[test]
fn test_recompiling_rebound_output_changes_nothing() {
    let factory = ItemFactory::new();
    let options = rebinding_only().with_output(OutputFormat::ClassFile);
    let first = compile(&factory, mixed_program(&factory), options.clone());
    assert!(!first.lens.is_identity());

    let second = compile(&factory, first.program, options);
    assert!(second.lens.is_identity());
    assert!(second.synthetics.is_empty());
}
