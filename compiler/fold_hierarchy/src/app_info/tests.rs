use super::*;
use fold_ir::{AccessFlags, ProgramBuilder};
use pretty_assertions::assert_eq;

fn hierarchy(factory: &ItemFactory) -> Program {
    let mut b = ProgramBuilder::new(factory);
    b.interface("p.I").public().finish();
    b.interface("p.J").public().implements("p.I").finish();
    b.class("p.A").public().implements("p.J").finish();
    b.class("p.B").extends("p.A").finish();
    b.class("q.C").extends("p.B").finish();
    b.class("p.Other").field("f", "I", AccessFlags::PUBLIC).finish();
    b.build().unwrap()
}

#[test]
fn test_is_subtype_through_interfaces() {
    let factory = ItemFactory::new();
    let program = hierarchy(&factory);
    let app = AppInfo::new(&program, &factory);
    let c = factory.class_type("q.C");

    assert!(app.is_subtype(c, factory.class_type("p.I")));
    assert!(app.is_subtype(c, c));
    assert!(app.is_subtype(c, factory.object_type));
    assert!(!app.is_subtype(factory.class_type("p.A"), c));
    assert!(!app.is_subtype(c, factory.class_type("p.Other")));
    assert!(!app.is_strict_subtype(c, c));
}

#[test]
fn test_all_supertypes_breadth_first() {
    let factory = ItemFactory::new();
    let program = hierarchy(&factory);
    let app = AppInfo::new(&program, &factory);

    let supers = app.all_supertypes(factory.class_type("p.B"));
    assert_eq!(
        supers,
        vec![
            factory.class_type("p.A"),
            factory.object_type,
            factory.class_type("p.J"),
            factory.class_type("p.I"),
        ]
    );
}

#[test]
fn test_subtypes() {
    let factory = ItemFactory::new();
    let program = hierarchy(&factory);
    let app = AppInfo::new(&program, &factory);

    assert_eq!(
        app.all_subtypes(factory.class_type("p.J")),
        vec![
            factory.class_type("p.A"),
            factory.class_type("p.B"),
            factory.class_type("q.C"),
        ]
    );
    assert_eq!(app.immediate_subtypes(factory.class_type("q.C")), &[]);
}

#[test]
fn test_superclass_chain_and_packages() {
    let factory = ItemFactory::new();
    let program = hierarchy(&factory);
    let app = AppInfo::new(&program, &factory);
    let c = factory.class_type("q.C");

    assert_eq!(
        app.superclass_chain(c),
        vec![
            c,
            factory.class_type("p.B"),
            factory.class_type("p.A"),
            factory.object_type,
        ]
    );
    assert!(!app.is_same_package(c, factory.class_type("p.B")));
    assert!(app.is_library_class(factory.object_type));
    assert!(app.is_program_class(c));
}
