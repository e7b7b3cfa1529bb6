use super::*;
use crate::{Instruction, InvokeKind};
use pretty_assertions::assert_eq;

#[test]
fn test_object_is_preinstalled() {
    let factory = ItemFactory::new();
    let program = ProgramBuilder::new(&factory).build().unwrap();
    let object = program.definition_for(factory.object_type).unwrap();
    assert!(object.is_library());
    assert_eq!(object.super_type, None);
    assert_eq!(object.instance_initializers().count(), 1);
}

#[test]
fn test_class_with_members() {
    let factory = ItemFactory::new();
    let mut b = ProgramBuilder::new(&factory);
    b.interface("p.I")
        .public()
        .method("run", "()V", AccessFlags::PUBLIC | AccessFlags::ABSTRACT)
        .finish();
    let a = b
        .class("p.A")
        .public()
        .implements("p.I")
        .field("count", "I", AccessFlags::PRIVATE)
        .method("run", "()V", AccessFlags::PUBLIC)
        .finish();
    let program = b.build().unwrap();

    let def = program.definition_for(a).unwrap();
    assert_eq!(def.interfaces, vec![factory.class_type("p.I")]);
    assert_eq!(def.instance_fields().count(), 1);
    let run = def.virtual_methods().next().unwrap();
    assert!(run.code.is_some());

    let iface = program.definition_for(factory.class_type("p.I")).unwrap();
    assert!(iface.is_interface());
    assert!(iface.methods[0].code.is_none());
}

#[test]
fn test_method_with_receives_arguments() {
    let factory = ItemFactory::new();
    let a = factory.class_type("p.A");
    let target = factory.create_method(a, "target", factory.parse_proto("(I)V").unwrap());

    let mut b = ProgramBuilder::new(&factory);
    b.class("p.A")
        .method("target", "(I)V", AccessFlags::PUBLIC)
        .method_with("caller", "(I)V", AccessFlags::PUBLIC, |code, args| {
            code.invoke(InvokeKind::Virtual, target, false, args, false);
        })
        .finish();
    let program = b.build().unwrap();

    let caller = program
        .definition_for(a)
        .unwrap()
        .methods
        .iter()
        .find(|m| factory.name(m.reference.name) == "caller")
        .unwrap();
    let code = caller.code.as_ref().unwrap();
    assert_eq!(code.instructions.len(), 4);
    assert!(matches!(code.instructions[3], Instruction::Return { value: None }));
}

#[test]
fn test_malformed_descriptor_surfaces_from_build() {
    let factory = ItemFactory::new();
    let mut b = ProgramBuilder::new(&factory);
    b.class("p.A").method("m", "(Q)V", AccessFlags::PUBLIC).finish();
    assert!(matches!(b.build(), Err(BuildError::Descriptor(_))));
}

#[test]
fn test_duplicate_class_surfaces_from_build() {
    let factory = ItemFactory::new();
    let mut b = ProgramBuilder::new(&factory);
    b.class("p.A").finish();
    b.class("p.A").finish();
    assert!(matches!(b.build(), Err(BuildError::Internal(_))));
}
