//! Class, method, and field definitions and the [`Program`] that owns them.

use rustc_hash::FxHashMap;

use fold_diagnostic::{InternalError, InternalResult};

use crate::{AccessFlags, Code, FieldRef, MethodRef, MethodSignature, TypeRef};

/// Dense class index into a [`Program`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(transparent)]
pub struct ClassId(u32);

impl ClassId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        ClassId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Where a class definition comes from.
///
/// Only program classes are rewritten. Classpath classes are visible to the
/// compilation but not part of the output; library classes belong to the
/// runtime.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ClassKind {
    Program,
    Classpath,
    Library,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct MethodDef {
    pub reference: MethodRef,
    pub access: AccessFlags,
    /// Carries a generic signature attribute.
    pub has_signature: bool,
    pub code: Option<Code>,
}

impl MethodDef {
    pub fn signature(&self) -> MethodSignature {
        self.reference.signature()
    }

    pub fn is_static(&self) -> bool {
        self.access.is_static()
    }

    pub fn is_private(&self) -> bool {
        self.access.is_private()
    }

    pub fn is_abstract(&self) -> bool {
        self.access.is_abstract()
    }

    pub fn is_instance_initializer(&self) -> bool {
        self.access.is_constructor() && !self.access.is_static()
    }

    pub fn is_class_initializer(&self) -> bool {
        self.access.is_constructor() && self.access.is_static()
    }

    /// Dispatched through the vtable: not static, private, or an initializer.
    pub fn is_virtual(&self) -> bool {
        !self.access.is_static() && !self.access.is_private() && !self.access.is_constructor()
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FieldDef {
    pub reference: FieldRef,
    pub access: AccessFlags,
    pub has_signature: bool,
}

impl FieldDef {
    pub fn is_static(&self) -> bool {
        self.access.is_static()
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ClassDef {
    pub ty: TypeRef,
    /// `None` only for `java.lang.Object`.
    pub super_type: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub access: AccessFlags,
    pub kind: ClassKind,
    pub has_signature: bool,
    pub methods: Vec<MethodDef>,
    pub fields: Vec<FieldDef>,
}

impl ClassDef {
    pub fn is_interface(&self) -> bool {
        self.access.is_interface()
    }

    pub fn is_abstract(&self) -> bool {
        self.access.is_abstract()
    }

    pub fn is_public(&self) -> bool {
        self.access.is_public()
    }

    pub fn is_program(&self) -> bool {
        self.kind == ClassKind::Program
    }

    pub fn is_library(&self) -> bool {
        self.kind == ClassKind::Library
    }

    pub fn lookup_method(&self, signature: MethodSignature) -> Option<&MethodDef> {
        self.methods.iter().find(|m| m.signature() == signature)
    }

    pub fn lookup_method_mut(&mut self, signature: MethodSignature) -> Option<&mut MethodDef> {
        self.methods.iter_mut().find(|m| m.signature() == signature)
    }

    /// Field lookup by name and type; the holder is ignored.
    pub fn lookup_field(&self, field: &FieldRef) -> Option<&FieldDef> {
        self.fields
            .iter()
            .find(|f| f.reference.name == field.name && f.reference.ty == field.ty)
    }

    pub fn virtual_methods(&self) -> impl Iterator<Item = &MethodDef> {
        self.methods.iter().filter(|m| m.is_virtual())
    }

    pub fn direct_methods(&self) -> impl Iterator<Item = &MethodDef> {
        self.methods.iter().filter(|m| !m.is_virtual())
    }

    pub fn instance_initializers(&self) -> impl Iterator<Item = &MethodDef> {
        self.methods.iter().filter(|m| m.is_instance_initializer())
    }

    pub fn instance_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| !f.is_static())
    }

    pub fn static_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.is_static())
    }

    pub fn has_class_initializer(&self) -> bool {
        self.methods.iter().any(MethodDef::is_class_initializer)
    }

    /// Add a method, rejecting a duplicate signature.
    pub fn add_method(&mut self, method: MethodDef) -> InternalResult<()> {
        if self.lookup_method(method.signature()).is_some() {
            return Err(InternalError::new("duplicate method signature in class")
                .at(format!("{:?}", method.reference)));
        }
        self.methods.push(method);
        Ok(())
    }

    pub fn remove_method(&mut self, signature: MethodSignature) -> Option<MethodDef> {
        let index = self.methods.iter().position(|m| m.signature() == signature)?;
        Some(self.methods.remove(index))
    }

    /// Supertype edges: superclass first, then interfaces in declaration order.
    pub fn supertypes(&self) -> impl Iterator<Item = TypeRef> + '_ {
        self.super_type.into_iter().chain(self.interfaces.iter().copied())
    }
}

/// All class definitions known to a compilation.
///
/// Definitions are kept in insertion order; every stage that iterates the
/// program sees the same order.
#[derive(Clone, Default, Debug)]
pub struct Program {
    classes: Vec<ClassDef>,
    index: FxHashMap<TypeRef, ClassId>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(&mut self, class: ClassDef) -> InternalResult<ClassId> {
        if self.index.contains_key(&class.ty) {
            return Err(InternalError::new("class defined twice").at(format!("{:?}", class.ty)));
        }
        let id = match u32::try_from(self.classes.len()) {
            Ok(index) => ClassId::new(index),
            Err(_) => return Err(InternalError::new("class table exceeded u32 capacity")),
        };
        self.index.insert(class.ty, id);
        self.classes.push(class);
        Ok(id)
    }

    pub fn definition_for(&self, ty: TypeRef) -> Option<&ClassDef> {
        self.index.get(&ty).map(|id| &self.classes[id.index()])
    }

    pub fn definition_for_mut(&mut self, ty: TypeRef) -> Option<&mut ClassDef> {
        let id = *self.index.get(&ty)?;
        Some(&mut self.classes[id.index()])
    }

    pub fn class(&self, id: ClassId) -> &ClassDef {
        &self.classes[id.index()]
    }

    pub fn contains(&self, ty: TypeRef) -> bool {
        self.index.contains_key(&ty)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDef> {
        self.classes.iter()
    }

    pub fn classes_mut(&mut self) -> impl Iterator<Item = &mut ClassDef> {
        self.classes.iter_mut()
    }

    pub fn program_classes(&self) -> impl Iterator<Item = &ClassDef> {
        self.classes.iter().filter(|c| c.is_program())
    }

    /// Drop classes rejected by `keep`, preserving order.
    pub fn retain_classes(&mut self, mut keep: impl FnMut(&ClassDef) -> bool) {
        self.classes.retain(|c| keep(c));
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (i, class) in self.classes.iter().enumerate() {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "length was checked against u32 on insertion"
            )]
            self.index.insert(class.ty, ClassId::new(i as u32));
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
