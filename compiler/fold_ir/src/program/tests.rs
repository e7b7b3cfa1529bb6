use super::*;
use crate::ItemFactory;
use pretty_assertions::assert_eq;

fn class(factory: &ItemFactory, name: &str) -> ClassDef {
    ClassDef {
        ty: factory.class_type(name),
        super_type: Some(factory.object_type),
        interfaces: Vec::new(),
        access: AccessFlags::PUBLIC,
        kind: ClassKind::Program,
        has_signature: false,
        methods: Vec::new(),
        fields: Vec::new(),
    }
}

fn method(factory: &ItemFactory, holder: TypeRef, name: &str, access: AccessFlags) -> MethodDef {
    MethodDef {
        reference: factory.create_method(holder, name, factory.create_proto(factory.void_type, [])),
        access,
        has_signature: false,
        code: None,
    }
}

#[test]
fn test_duplicate_class_is_rejected() {
    let factory = ItemFactory::new();
    let mut program = Program::new();
    program.add_class(class(&factory, "p.A")).unwrap();
    assert!(program.add_class(class(&factory, "p.A")).is_err());
    assert_eq!(program.len(), 1);
}

#[test]
fn test_duplicate_method_signature_is_rejected() {
    let factory = ItemFactory::new();
    let mut a = class(&factory, "p.A");
    a.add_method(method(&factory, a.ty, "m", AccessFlags::PUBLIC)).unwrap();
    assert!(a.add_method(method(&factory, a.ty, "m", AccessFlags::PRIVATE)).is_err());
}

#[test]
fn test_virtual_and_direct_partition() {
    let factory = ItemFactory::new();
    let mut a = class(&factory, "p.A");
    let ty = a.ty;
    a.add_method(method(&factory, ty, "v", AccessFlags::PUBLIC)).unwrap();
    a.add_method(method(&factory, ty, "p", AccessFlags::PRIVATE)).unwrap();
    a.add_method(method(&factory, ty, "s", AccessFlags::STATIC)).unwrap();
    a.add_method(method(&factory, ty, "<init>", AccessFlags::CONSTRUCTOR)).unwrap();

    let virtuals: Vec<_> = a.virtual_methods().map(|m| factory.name(m.reference.name)).collect();
    let directs: Vec<_> = a.direct_methods().map(|m| factory.name(m.reference.name)).collect();
    assert_eq!(virtuals, vec!["v"]);
    assert_eq!(directs, vec!["p", "s", "<init>"]);
    assert_eq!(a.instance_initializers().count(), 1);
    assert!(!a.has_class_initializer());
}

#[test]
fn test_retain_rebuilds_index() {
    let factory = ItemFactory::new();
    let mut program = Program::new();
    program.add_class(class(&factory, "p.A")).unwrap();
    program.add_class(class(&factory, "p.B")).unwrap();
    let b = factory.class_type("p.B");

    program.retain_classes(|c| c.ty == b);

    assert_eq!(program.len(), 1);
    assert!(program.definition_for(b).is_some());
    assert!(!program.contains(factory.class_type("p.A")));
}
