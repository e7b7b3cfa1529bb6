//! Shared helpers for the scenario tests.

use fold_ir::{
    CompilerOptions, Instruction, InvokeKind, ItemFactory, MethodDef, MethodRef, MethodSignature, Program,
};
use foldc::{init_tracing, Compilation, CompilationOutput};

pub fn compile(factory: &ItemFactory, program: Program, options: CompilerOptions) -> CompilationOutput {
    init_tracing();
    Compilation::new(factory, options).run(program).unwrap()
}

/// Whole-program mode with both class mergers off.
pub fn rebinding_only() -> CompilerOptions {
    CompilerOptions::whole_program()
        .with_vertical_class_merging(false)
        .with_horizontal_class_merging(false)
        .with_threads(1)
}

pub fn void_method(factory: &ItemFactory, holder: &str, name: &str) -> MethodRef {
    factory.create_method(
        factory.class_type(holder),
        name,
        factory.create_proto(factory.void_type, []),
    )
}

pub fn find_method<'p>(
    factory: &ItemFactory,
    program: &'p Program,
    holder: &str,
    name: &str,
    descriptor: &str,
) -> Option<&'p MethodDef> {
    program
        .definition_for(factory.class_type(holder))?
        .lookup_method(MethodSignature {
            name: factory.intern(name),
            proto: factory.parse_proto(descriptor).ok()?,
        })
}

/// `(kind, target, is_interface)` of every invoke in `method`, in order.
pub fn invokes(method: &MethodDef) -> Vec<(InvokeKind, MethodRef, bool)> {
    method
        .code
        .iter()
        .flat_map(|code| &code.instructions)
        .filter_map(|insn| match insn {
            Instruction::Invoke {
                kind,
                method,
                is_interface,
                ..
            } => Some((*kind, *method, *is_interface)),
            _ => None,
        })
        .collect()
}
