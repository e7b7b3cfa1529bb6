//! Rewriting references and method bodies.

use fold_ir::{Code, FieldRef, Instruction, InvokeKind, ItemFactory, MethodRef, TypeRef};

use crate::{LensLayer, MethodLookup, RewriteLens};

/// Anything that maps references from one namespace to another.
pub trait ReferenceRewriter {
    fn rewrite_type(&self, factory: &ItemFactory, ty: TypeRef) -> TypeRef;

    /// `context` is the holder of the calling method, in the input namespace.
    fn rewrite_method(
        &self,
        factory: &ItemFactory,
        method: &MethodRef,
        kind: InvokeKind,
        is_interface: bool,
        context: Option<TypeRef>,
    ) -> MethodLookup;

    fn rewrite_field(&self, factory: &ItemFactory, field: &FieldRef) -> FieldRef;
}

impl ReferenceRewriter for LensLayer {
    fn rewrite_type(&self, factory: &ItemFactory, ty: TypeRef) -> TypeRef {
        self.lookup_type(factory, ty)
    }

    fn rewrite_method(
        &self,
        factory: &ItemFactory,
        method: &MethodRef,
        kind: InvokeKind,
        is_interface: bool,
        context: Option<TypeRef>,
    ) -> MethodLookup {
        self.lookup_method(factory, method, kind, is_interface, context)
    }

    fn rewrite_field(&self, factory: &ItemFactory, field: &FieldRef) -> FieldRef {
        self.lookup_field(factory, field)
    }
}

impl ReferenceRewriter for RewriteLens {
    fn rewrite_type(&self, factory: &ItemFactory, ty: TypeRef) -> TypeRef {
        self.lookup_type(factory, ty)
    }

    fn rewrite_method(
        &self,
        factory: &ItemFactory,
        method: &MethodRef,
        kind: InvokeKind,
        is_interface: bool,
        context: Option<TypeRef>,
    ) -> MethodLookup {
        self.lookup_method(factory, method, kind, is_interface, context)
    }

    fn rewrite_field(&self, factory: &ItemFactory, field: &FieldRef) -> FieldRef {
        self.lookup_field(factory, field)
    }
}

/// Rewrite every reference in `code`, which belongs to a method of
/// `context`.
///
/// Invokes that must pass extra `null` arguments get fresh constants
/// inserted right before them.
pub fn rewrite_code(
    code: &Code,
    rewriter: &(impl ReferenceRewriter + ?Sized),
    factory: &ItemFactory,
    context: TypeRef,
) -> Code {
    let mut out = Code {
        instructions: Vec::with_capacity(code.instructions.len()),
        value_count: code.value_count,
    };
    let mut padded = Vec::new();
    for insn in &code.instructions {
        let rewritten = match insn {
            Instruction::Argument {
                dst,
                ty,
                nullability,
            } => Instruction::Argument {
                dst: *dst,
                ty: rewriter.rewrite_type(factory, *ty),
                nullability: *nullability,
            },
            Instruction::ConstNull { dst } => Instruction::ConstNull { dst: *dst },
            Instruction::NewInstance { dst, ty } => Instruction::NewInstance {
                dst: *dst,
                ty: rewriter.rewrite_type(factory, *ty),
            },
            Instruction::Invoke {
                kind,
                method,
                is_interface,
                args,
                dst,
            } => {
                let lookup =
                    rewriter.rewrite_method(factory, method, *kind, *is_interface, Some(context));
                if lookup.extra_null_arguments > 0 {
                    padded.push((out.instructions.len(), lookup.extra_null_arguments));
                }
                Instruction::Invoke {
                    kind: lookup.kind,
                    method: lookup.reference,
                    is_interface: lookup.is_interface,
                    args: args.clone(),
                    dst: *dst,
                }
            }
            Instruction::InstanceGet { dst, field, object } => Instruction::InstanceGet {
                dst: *dst,
                field: rewriter.rewrite_field(factory, field),
                object: *object,
            },
            Instruction::InstancePut {
                field,
                object,
                value,
            } => Instruction::InstancePut {
                field: rewriter.rewrite_field(factory, field),
                object: *object,
                value: *value,
            },
            Instruction::StaticGet { dst, field } => Instruction::StaticGet {
                dst: *dst,
                field: rewriter.rewrite_field(factory, field),
            },
            Instruction::StaticPut { field, value } => Instruction::StaticPut {
                field: rewriter.rewrite_field(factory, field),
                value: *value,
            },
            Instruction::Return { value } => Instruction::Return { value: *value },
        };
        out.instructions.push(rewritten);
    }
    // Back to front, so earlier indices stay valid.
    for (at, count) in padded.into_iter().rev() {
        out.append_null_arguments(at, count);
    }
    out
}
