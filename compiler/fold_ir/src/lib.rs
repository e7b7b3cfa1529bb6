//! Program model for the fold class merger.
//!
//! A compilation sees a snapshot of compiled classes: program classes (which
//! the optimizer may rewrite), classpath classes, and library classes. This
//! crate holds that snapshot and the vocabulary every other stage speaks:
//!
//! - [`ItemFactory`] interns descriptors, names, and prototypes, and hands
//!   out `Copy` handles ([`TypeRef`], [`ProtoId`], [`MethodRef`],
//!   [`FieldRef`]) whose equality is structural.
//! - [`Program`] owns [`ClassDef`]s in insertion order, indexed by type.
//! - [`Code`] is a flat instruction list carrying the member references a
//!   method body makes, enough to rewrite call sites and to express
//!   synthesized forwarding bodies.
//! - [`CompilerOptions`] and [`SyntheticItems`] carry configuration in and
//!   synthesized members out.
//!
//! # Design
//!
//! References never point into a `Program`; they are resolved through it
//! by the hierarchy crate. That keeps stages free to rebuild the program
//! (drop merged classes, move members) without invalidating anything held
//! by the rewrite lens.

mod builder;
mod code;
mod factory;
mod flags;
mod interner;
mod items;
mod name;
mod options;
mod program;
mod synthetic;

pub use builder::{BuildError, ClassBuilder, ProgramBuilder};
pub use code::{Code, CodeBuilder, Instruction, InvokeKind, Nullability, Value};
pub use factory::{DescriptorError, ItemFactory};
pub use flags::AccessFlags;
pub use interner::StringInterner;
pub use items::{FieldRef, MemberRef, MethodRef, MethodSignature, Proto, ProtoId, TypeRef};
pub use name::Name;
pub use options::{CompilerOptions, OutputFormat};
pub use program::{ClassDef, ClassId, ClassKind, FieldDef, MethodDef, Program};
pub use synthetic::{
    CollectingSyntheticsConsumer, GlobalSyntheticsConsumer, SyntheticItems, SyntheticKind,
    SyntheticMethod,
};
