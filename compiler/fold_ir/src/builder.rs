//! Fluent construction of programs for tests and embedders.
//!
//! ```text
//! let mut b = ProgramBuilder::new(&factory);
//! b.class("p.A").public().method("m", "()V", AccessFlags::PUBLIC).finish();
//! let program = b.build()?;
//! ```
//!
//! Descriptor and duplicate-definition errors are recorded on the builder and
//! returned from [`ProgramBuilder::build`], so chains stay infallible.

use thiserror::Error;

use fold_diagnostic::InternalError;

use crate::{
    AccessFlags, ClassDef, ClassKind, CodeBuilder, DescriptorError, FieldDef, ItemFactory,
    MethodDef, Nullability, Program, TypeRef, Value,
};

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
    #[error(transparent)]
    Internal(#[from] InternalError),
}

pub struct ProgramBuilder<'f> {
    factory: &'f ItemFactory,
    program: Program,
    error: Option<BuildError>,
}

impl<'f> ProgramBuilder<'f> {
    /// Start a program that already contains the `java.lang.Object` library
    /// class with a public no-arg constructor, `hashCode`, and `toString`.
    pub fn new(factory: &'f ItemFactory) -> Self {
        let mut builder = ProgramBuilder {
            factory,
            program: Program::new(),
            error: None,
        };
        builder
            .library_class("java.lang.Object")
            .public()
            .no_super()
            .constructor("()V", AccessFlags::PUBLIC)
            .method("hashCode", "()I", AccessFlags::PUBLIC)
            .method("toString", "()Ljava/lang/String;", AccessFlags::PUBLIC)
            .finish();
        builder
    }

    pub fn factory(&self) -> &'f ItemFactory {
        self.factory
    }

    fn start(&mut self, name: &str, kind: ClassKind, access: AccessFlags) -> ClassBuilder<'_, 'f> {
        let ty = self.factory.class_type(name);
        let super_type = Some(self.factory.object_type);
        ClassBuilder {
            owner: self,
            def: ClassDef {
                ty,
                super_type,
                interfaces: Vec::new(),
                access,
                kind,
                has_signature: false,
                methods: Vec::new(),
                fields: Vec::new(),
            },
        }
    }

    /// A package-private program class extending `java.lang.Object`.
    pub fn class(&mut self, name: &str) -> ClassBuilder<'_, 'f> {
        self.start(name, ClassKind::Program, AccessFlags::empty())
    }

    pub fn interface(&mut self, name: &str) -> ClassBuilder<'_, 'f> {
        self.start(
            name,
            ClassKind::Program,
            AccessFlags::INTERFACE | AccessFlags::ABSTRACT,
        )
    }

    pub fn library_class(&mut self, name: &str) -> ClassBuilder<'_, 'f> {
        self.start(name, ClassKind::Library, AccessFlags::empty())
    }

    pub fn library_interface(&mut self, name: &str) -> ClassBuilder<'_, 'f> {
        self.start(
            name,
            ClassKind::Library,
            AccessFlags::INTERFACE | AccessFlags::ABSTRACT,
        )
    }

    pub fn classpath_class(&mut self, name: &str) -> ClassBuilder<'_, 'f> {
        self.start(name, ClassKind::Classpath, AccessFlags::empty())
    }

    fn record(&mut self, error: impl Into<BuildError>) {
        if self.error.is_none() {
            self.error = Some(error.into());
        }
    }

    pub fn build(self) -> Result<Program, BuildError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.program),
        }
    }
}

pub struct ClassBuilder<'b, 'f> {
    owner: &'b mut ProgramBuilder<'f>,
    def: ClassDef,
}

impl ClassBuilder<'_, '_> {
    #[must_use]
    pub fn public(mut self) -> Self {
        self.def.access |= AccessFlags::PUBLIC;
        self
    }

    #[must_use]
    pub fn set_abstract(mut self) -> Self {
        self.def.access |= AccessFlags::ABSTRACT;
        self
    }

    #[must_use]
    pub fn set_final(mut self) -> Self {
        self.def.access |= AccessFlags::FINAL;
        self
    }

    #[must_use]
    pub fn access(mut self, access: AccessFlags) -> Self {
        self.def.access = access;
        self
    }

    #[must_use]
    pub fn extends(mut self, name: &str) -> Self {
        self.def.super_type = Some(self.owner.factory.class_type(name));
        self
    }

    #[must_use]
    fn no_super(mut self) -> Self {
        self.def.super_type = None;
        self
    }

    #[must_use]
    pub fn implements(mut self, name: &str) -> Self {
        let ty = self.owner.factory.class_type(name);
        self.def.interfaces.push(ty);
        self
    }

    #[must_use]
    pub fn with_signature(mut self) -> Self {
        self.def.has_signature = true;
        self
    }

    #[must_use]
    pub fn field(self, name: &str, descriptor: &str, access: AccessFlags) -> Self {
        self.field_def(name, descriptor, access, false)
    }

    #[must_use]
    pub fn generic_field(self, name: &str, descriptor: &str, access: AccessFlags) -> Self {
        self.field_def(name, descriptor, access, true)
    }

    fn field_def(mut self, name: &str, descriptor: &str, access: AccessFlags, has_signature: bool) -> Self {
        match self.owner.factory.parse_type(descriptor) {
            Ok(ty) => {
                let reference = self.owner.factory.create_field(self.def.ty, name, ty);
                self.def.fields.push(FieldDef {
                    reference,
                    access,
                    has_signature,
                });
            }
            Err(error) => self.owner.record(error),
        }
        self
    }

    /// A method with a default body that only returns. Abstract and native
    /// methods get no body.
    #[must_use]
    pub fn method(self, name: &str, descriptor: &str, access: AccessFlags) -> Self {
        let needs_body = !access.is_abstract() && !access.contains(AccessFlags::NATIVE);
        self.method_def(name, descriptor, access, false, needs_body, |code, _| {
            code.return_void();
        })
    }

    /// A method whose body is emitted by `body`. Argument instructions are
    /// already in place; `body` receives their values, receiver first.
    #[must_use]
    pub fn method_with(
        self,
        name: &str,
        descriptor: &str,
        access: AccessFlags,
        body: impl FnOnce(&mut CodeBuilder, &[Value]),
    ) -> Self {
        self.method_def(name, descriptor, access, false, true, body)
    }

    #[must_use]
    pub fn generic_method(self, name: &str, descriptor: &str, access: AccessFlags) -> Self {
        self.method_def(name, descriptor, access, true, !access.is_abstract(), |code, _| {
            code.return_void();
        })
    }

    #[must_use]
    pub fn constructor(self, descriptor: &str, access: AccessFlags) -> Self {
        self.method("<init>", descriptor, access | AccessFlags::CONSTRUCTOR)
    }

    #[must_use]
    pub fn constructor_with(
        self,
        descriptor: &str,
        access: AccessFlags,
        body: impl FnOnce(&mut CodeBuilder, &[Value]),
    ) -> Self {
        self.method_with("<init>", descriptor, access | AccessFlags::CONSTRUCTOR, body)
    }

    fn method_def(
        mut self,
        name: &str,
        descriptor: &str,
        access: AccessFlags,
        has_signature: bool,
        has_code: bool,
        body: impl FnOnce(&mut CodeBuilder, &[Value]),
    ) -> Self {
        let factory = self.owner.factory;
        let proto = match factory.parse_proto(descriptor) {
            Ok(proto) => proto,
            Err(error) => {
                self.owner.record(error);
                return self;
            }
        };
        let reference = factory.create_method(self.def.ty, name, proto);
        let code = has_code.then(|| {
            let mut code = CodeBuilder::new();
            let mut args = Vec::new();
            if !access.is_static() {
                args.push(code.argument(self.def.ty, Nullability::NotNull));
            }
            for param in &factory.proto(proto).params {
                args.push(code.argument(*param, Nullability::MaybeNull));
            }
            body(&mut code, &args);
            code.build()
        });
        let code = code.map(|mut code| {
            let returns = code
                .instructions
                .iter()
                .any(|i| matches!(i, crate::Instruction::Return { .. }));
            if !returns {
                code.instructions.push(crate::Instruction::Return { value: None });
            }
            code
        });
        let method = MethodDef {
            reference,
            access,
            has_signature,
            code,
        };
        if let Err(error) = self.def.add_method(method) {
            self.owner.record(error);
        }
        self
    }

    /// Add the class to the program and return its type.
    pub fn finish(self) -> TypeRef {
        let ty = self.def.ty;
        if let Err(error) = self.owner.program.add_class(self.def) {
            self.owner.record(error);
        }
        ty
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
