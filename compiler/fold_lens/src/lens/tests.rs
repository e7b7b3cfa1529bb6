use super::*;
use crate::{LensBuilder, MethodTarget};
use fold_ir::{AccessFlags, ProgramBuilder};
use pretty_assertions::assert_eq;

#[test]
fn test_identity_lens() {
    let factory = ItemFactory::new();
    let a = factory.class_type("p.A");
    let m = factory.create_method(a, "m", factory.create_proto(factory.void_type, []));
    let lens = RewriteLens::default();

    assert!(lens.is_identity());
    assert_eq!(lens.lookup_type(&factory, a), a);
    let lookup = lens.lookup_method(&factory, &m, InvokeKind::Static, false, None);
    assert_eq!(lookup, MethodLookup::unchanged(m, InvokeKind::Static, false));
}

#[test]
fn test_empty_layers_are_not_composed() {
    let lens = RewriteLens::Identity.compose(LensBuilder::new("noop").build());
    assert!(lens.is_identity());
}

#[test]
fn test_layers_compose_in_order() {
    let factory = ItemFactory::new();
    let a = factory.class_type("p.A");
    let b = factory.class_type("p.B");
    let c = factory.class_type("p.C");

    let mut first = LensBuilder::new("vertical");
    first.map_type(a, b, false);
    let mut second = LensBuilder::new("horizontal");
    second.map_type(b, c, false);
    let lens = RewriteLens::Identity
        .compose(first.build())
        .compose(second.build());

    assert_eq!(lens.layers().len(), 2);
    assert_eq!(lens.layers()[0].name(), "vertical");
    assert_eq!(lens.lookup_type(&factory, a), c);
    let field = factory.create_field(a, "f", a);
    assert_eq!(
        factory.field_to_string(&lens.lookup_field(&factory, &field)),
        "p.C.f:Lp/C;"
    );
}

#[test]
fn test_extra_null_arguments_accumulate() {
    let factory = ItemFactory::new();
    let a = factory.class_type("p.A");
    let b = factory.class_type("p.B");
    let c = factory.class_type("p.C");
    let init = factory.parse_proto("()V").unwrap();
    let one = factory.parse_proto("(Ljava/lang/Object;)V").unwrap();
    let two = factory
        .parse_proto("(Ljava/lang/Object;Ljava/lang/Object;)V")
        .unwrap();

    let mut first = LensBuilder::new("first");
    first.map_type(a, b, false);
    first.map_method(
        factory.create_method(a, "<init>", init),
        MethodTarget::to(factory.create_method(b, "<init>", one)).with_extra_nulls(1),
    );
    let mut second = LensBuilder::new("second");
    second.map_type(b, c, false);
    second.map_method(
        factory.create_method(b, "<init>", one),
        MethodTarget::to(factory.create_method(c, "<init>", two)).with_extra_nulls(1),
    );
    let lens = RewriteLens::Identity
        .compose(first.build())
        .compose(second.build());

    let lookup = lens.lookup_method(
        &factory,
        &factory.create_method(a, "<init>", init),
        InvokeKind::Direct,
        false,
        None,
    );
    assert_eq!(lookup.reference, factory.create_method(c, "<init>", two));
    assert_eq!(lookup.extra_null_arguments, 2);
}

#[test]
fn test_super_redirect_sees_context_of_its_own_layer() {
    let factory = ItemFactory::new();
    let a = factory.class_type("p.A");
    let b = factory.class_type("p.B");
    let d = factory.class_type("p.D");
    let e = factory.class_type("p.E");
    let void = factory.create_proto(factory.void_type, []);
    let m = factory.create_method(b, "m", void);
    let moved = factory.create_method(e, "m$B", void);

    // First D -> E, then B folded into E with a redirect keyed on E.
    let mut first = LensBuilder::new("first");
    first.map_type(d, e, false);
    let mut second = LensBuilder::new("second");
    second.map_type(b, e, false);
    second.map_super_call(e, m, MethodTarget::to(moved).with_kind(InvokeKind::Direct, false));
    let lens = RewriteLens::Identity
        .compose(first.build())
        .compose(second.build());

    let lookup = lens.lookup_method(&factory, &m, InvokeKind::Super, false, Some(d));
    assert_eq!(lookup.reference, moved);
    assert_eq!(lookup.kind, InvokeKind::Direct);
    let unrelated = lens.lookup_method(&factory, &m, InvokeKind::Super, false, Some(a));
    assert_eq!(unrelated.reference, m.with_holder(e));
}

#[test]
fn test_verify_holders_rejects_pruned_targets() {
    let factory = ItemFactory::new();
    let mut pb = ProgramBuilder::new(&factory);
    let b = pb.class("p.B").method("m", "()V", AccessFlags::PUBLIC).finish();
    let program = pb.build().unwrap();
    let a = factory.class_type("p.A");
    let gone = factory.class_type("p.Gone");
    let void = factory.create_proto(factory.void_type, []);

    let mut ok = LensBuilder::new("ok");
    ok.map_type(a, b, false);
    let lens = RewriteLens::Identity.compose(ok.build());
    assert_eq!(lens.verify_holders(&factory, &program), Ok(()));

    let mut bad = LensBuilder::new("bad");
    bad.map_method(
        factory.create_method(b, "m", void),
        MethodTarget::to(factory.create_method(gone, "m", void)),
    );
    let err = lens
        .compose(bad.build())
        .verify_holders(&factory, &program)
        .unwrap_err();
    assert!(err.message.contains("pruned holder `p.Gone`"), "{err}");
}

#[test]
fn test_verify_holders_follows_later_layers() {
    let factory = ItemFactory::new();
    let mut pb = ProgramBuilder::new(&factory);
    let c = pb.class("p.C").finish();
    let program = pb.build().unwrap();
    let a = factory.class_type("p.A");
    let b = factory.class_type("p.B");

    // B is gone from the program, but everything mapped to it moves on to C.
    let mut first = LensBuilder::new("first");
    first.map_type(a, b, false);
    let mut second = LensBuilder::new("second");
    second.map_type(b, c, false);
    let lens = RewriteLens::Identity
        .compose(first.build())
        .compose(second.build());
    assert_eq!(lens.verify_holders(&factory, &program), Ok(()));
}
