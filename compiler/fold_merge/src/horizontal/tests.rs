use std::collections::BTreeMap;

use super::*;
use fold_ir::{AccessFlags, Instruction, InvokeKind, ProgramBuilder, Value};
use pretty_assertions::assert_eq;

use crate::MergeGroup;

fn finalized(
    factory: &ItemFactory,
    classes: &[TypeRef],
    field_map: BTreeMap<FieldRef, FieldRef>,
) -> FinalizedMergeGroup {
    let mut group = MergeGroup::new(classes.to_vec(), false);
    group.set_target(classes[0], factory).unwrap();
    group.finalize(field_map).unwrap();
    FinalizedMergeGroup::try_from(group).unwrap()
}

/// `p.A` and `p.B` with no-arg constructors, and `p.Main.main` creating a B.
fn constructor_program(factory: &ItemFactory) -> Program {
    let mut b = ProgramBuilder::new(factory);
    b.class("p.A").constructor("()V", AccessFlags::PUBLIC).finish();
    let bt = b.class("p.B").constructor("()V", AccessFlags::PUBLIC).finish();
    let init = factory.create_method(bt, "<init>", factory.parse_proto("()V").unwrap());
    b.class("p.Main")
        .method_with("main", "()V", AccessFlags::PUBLIC | AccessFlags::STATIC, |code, _| {
            let obj = code.new_instance(bt);
            code.invoke(InvokeKind::Direct, init, false, &[obj], false);
        })
        .finish();
    b.build().unwrap()
}

fn main_code(factory: &ItemFactory, program: &Program) -> Vec<Instruction> {
    let main = program.definition_for(factory.class_type("p.Main")).unwrap();
    main.methods[0].code.clone().unwrap().instructions
}

#[test]
fn test_colliding_constructor_gets_padding_parameter() {
    let factory = ItemFactory::new();
    let mut program = constructor_program(&factory);
    let a = factory.class_type("p.A");
    let bt = factory.class_type("p.B");

    let result = HorizontalClassMerger::new(&factory, ClassMergerMode::Initial)
        .run(&mut program, vec![finalized(&factory, &[a, bt], BTreeMap::new())])
        .unwrap();
    assert_eq!(result.merged_classes.target_for(bt), Some(a));
    assert_eq!(result.layer.lookup_type(&factory, bt), a);
    assert!(!program.contains(bt));

    let target = program.definition_for(a).unwrap();
    let padded_proto = factory.parse_proto("(Ljava/lang/Object;)V").unwrap();
    let padded = target
        .lookup_method(MethodSignature {
            name: factory.init_name,
            proto: padded_proto,
        })
        .unwrap();
    let padded_code = padded.code.clone().unwrap();
    assert_eq!(
        padded_code.instructions[1],
        Instruction::Argument {
            dst: Value::new(padded_code.value_count - 1),
            ty: factory.object_type,
            nullability: fold_ir::Nullability::MaybeNull,
        }
    );

    let padded_init = factory.create_method(a, "<init>", padded_proto);
    assert_eq!(
        main_code(&factory, &program)[..3],
        [
            Instruction::NewInstance {
                dst: Value::new(0),
                ty: a,
            },
            Instruction::ConstNull { dst: Value::new(1) },
            Instruction::Invoke {
                kind: InvokeKind::Direct,
                method: padded_init,
                is_interface: false,
                args: [Value::new(0), Value::new(1)].into_iter().collect(),
                dst: None,
            },
        ]
    );
}

#[test]
fn test_final_round_constructor_collision_is_internal_error() {
    let factory = ItemFactory::new();
    let mut program = constructor_program(&factory);
    let a = factory.class_type("p.A");
    let bt = factory.class_type("p.B");

    let result = HorizontalClassMerger::new(&factory, ClassMergerMode::Final)
        .run(&mut program, vec![finalized(&factory, &[a, bt], BTreeMap::new())]);
    assert!(result.is_err());
}

#[test]
fn test_static_field_and_private_method_are_renamed_on_collision() {
    let factory = ItemFactory::new();
    let mut b = ProgramBuilder::new(&factory);
    let a = b
        .class("p.A")
        .field("count", "I", AccessFlags::STATIC)
        .method("helper", "()V", AccessFlags::PRIVATE)
        .finish();
    let bt = b
        .class("p.B")
        .field("count", "I", AccessFlags::STATIC)
        .method_with("helper", "()V", AccessFlags::PRIVATE, |code, _| {
            let count = factory.create_field(factory.class_type("p.B"), "count", factory.int_type);
            let value = code.static_get(count);
            code.static_put(count, value);
        })
        .finish();
    let mut program = b.build().unwrap();

    HorizontalClassMerger::new(&factory, ClassMergerMode::Initial)
        .run(&mut program, vec![finalized(&factory, &[a, bt], BTreeMap::new())])
        .unwrap();

    let target = program.definition_for(a).unwrap();
    let names: Vec<&str> = target.fields.iter().map(|f| factory.name(f.reference.name)).collect();
    assert_eq!(names, vec!["count", "count$B$0"]);
    let renamed_field = factory.create_field(a, "count$B$0", factory.int_type);

    let void = factory.parse_proto("()V").unwrap();
    let renamed = target
        .lookup_method(MethodSignature {
            name: factory.intern("helper$B$0"),
            proto: void,
        })
        .unwrap();
    let code = renamed.code.clone().unwrap();
    assert_eq!(
        code.instructions[1],
        Instruction::StaticGet {
            dst: Value::new(1),
            field: renamed_field,
        }
    );
}

#[test]
fn test_merged_instance_field_is_relaxed_and_loses_final() {
    let factory = ItemFactory::new();
    let mut b = ProgramBuilder::new(&factory);
    b.class("p.A")
        .field("s", "Ljava/lang/String;", AccessFlags::PRIVATE | AccessFlags::FINAL)
        .finish();
    let bt = b
        .class("p.B")
        .field("t", "Ljava/lang/Thread;", AccessFlags::PRIVATE)
        .finish();
    let t = factory.create_field(bt, "t", factory.create_type("Ljava/lang/Thread;"));
    b.class("p.Main")
        .method_with("read", "(Lp/B;)V", AccessFlags::PUBLIC | AccessFlags::STATIC, |code, args| {
            code.instance_get(t, args[0]);
        })
        .finish();
    let mut program = b.build().unwrap();
    let a = factory.class_type("p.A");

    let result = merge_horizontally(
        &mut program,
        &factory,
        &KeepInfo::empty(),
        &CompilerOptions::whole_program().with_threads(1),
        &MergedClasses::new(MergeKind::Vertical),
        ClassMergerMode::Initial,
    )
    .unwrap();
    assert_eq!(result.merged_classes.entries(), vec![(bt, a)]);

    let target = program.definition_for(a).unwrap();
    assert_eq!(target.fields.len(), 1);
    let merged = target.fields[0].reference;
    assert_eq!(merged.ty, factory.object_type);
    assert!(!target.fields[0].access.is_final());

    let code = main_code(&factory, &program);
    assert_eq!(
        code[1],
        Instruction::InstanceGet {
            dst: Value::new(1),
            field: merged,
            object: Value::new(0),
        }
    );
}

#[test]
fn test_member_without_optimization_keeps_its_class_out_of_groups() {
    let factory = ItemFactory::new();
    let mut b = ProgramBuilder::new(&factory);
    b.class("p.A").method("helper", "()V", AccessFlags::PRIVATE).finish();
    let bt = b.class("p.B").method("helper", "()V", AccessFlags::PRIVATE).finish();
    let mut program = b.build().unwrap();
    let helper = factory.create_method(bt, "helper", factory.parse_proto("()V").unwrap());
    let keep = KeepInfo::builder().disallow_optimization(helper.into()).build();

    let result = merge_horizontally(
        &mut program,
        &factory,
        &keep,
        &CompilerOptions::whole_program().with_threads(1),
        &MergedClasses::new(MergeKind::Vertical),
        ClassMergerMode::Initial,
    )
    .unwrap();
    assert!(result.merged_classes.is_empty());
    assert!(program.contains(bt));
    let target = program.definition_for(factory.class_type("p.A")).unwrap();
    assert_eq!(target.methods.len(), 1);
}
