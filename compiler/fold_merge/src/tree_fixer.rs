//! Applying a finished lens layer to the classes that stay.

use fold_ir::{
    ClassDef, Instruction, ItemFactory, MethodDef, MethodRef, Nullability, Program, TypeRef, Value,
};
use fold_lens::{rewrite_code, LensLayer};

pub struct TreeFixer<'a> {
    factory: &'a ItemFactory,
    layer: &'a LensLayer,
}

impl<'a> TreeFixer<'a> {
    pub fn new(factory: &'a ItemFactory, layer: &'a LensLayer) -> Self {
        TreeFixer { factory, layer }
    }

    /// Rewrite every program class in place. Classes merged away must have
    /// been removed already.
    pub fn fix_program(&self, program: &mut Program) {
        for class in program.classes_mut().filter(|c| c.is_program()) {
            self.fix_class(class);
        }
    }

    pub fn fix_class(&self, class: &mut ClassDef) {
        let layer = self.layer;
        let factory = self.factory;
        let context = class.ty;
        class.super_type = class.super_type.map(|ty| layer.lookup_type(factory, ty));
        let mut interfaces: Vec<TypeRef> = Vec::with_capacity(class.interfaces.len());
        for ty in &class.interfaces {
            let ty = layer.lookup_type(factory, *ty);
            if ty != class.ty && Some(ty) != class.super_type && !interfaces.contains(&ty) {
                interfaces.push(ty);
            }
        }
        class.interfaces = interfaces;
        for method in &mut class.methods {
            let reference = layer.rewrite_definition(factory, &method.reference);
            self.fix_method(method, reference, context);
        }
        for field in &mut class.fields {
            field.reference = layer.lookup_field(factory, &field.reference);
        }
    }

    /// Give `method` its new reference and rewrite its body, which was
    /// written in `context`.
    pub fn fix_method(&self, method: &mut MethodDef, reference: MethodRef, context: TypeRef) {
        method.reference = reference;
        if let Some(code) = method.code.take() {
            method.code = Some(rewrite_code(&code, self.layer, self.factory, context));
        }
    }
}

/// Give a moved constructor `count` unused trailing `java/lang/Object`
/// parameters. The caller has already widened its prototype.
pub(crate) fn append_unused_arguments(method: &mut MethodDef, factory: &ItemFactory, count: usize) {
    let Some(code) = method.code.as_mut() else {
        return;
    };
    let at = code
        .instructions
        .iter()
        .take_while(|insn| matches!(insn, Instruction::Argument { .. }))
        .count();
    let mut arguments = Vec::with_capacity(count);
    for _ in 0..count {
        let dst = Value::new(code.value_count);
        code.value_count += 1;
        arguments.push(Instruction::Argument {
            dst,
            ty: factory.object_type,
            nullability: Nullability::MaybeNull,
        });
    }
    code.instructions.splice(at..at, arguments);
}
