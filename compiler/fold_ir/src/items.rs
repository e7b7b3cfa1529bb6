//! Item references: types, prototypes, methods, fields.
//!
//! All references are small `Copy` handles into an
//! [`ItemFactory`](crate::ItemFactory). Two references are equal iff they
//! name the same item, so they serve directly as map keys in the merge and
//! rebinding tables.

use smallvec::SmallVec;

use crate::Name;

/// A JVM type, identified by its interned descriptor (`Lp/A;`, `I`, `[J`).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(transparent)]
pub struct TypeRef(Name);

impl TypeRef {
    #[inline]
    pub const fn from_descriptor(descriptor: Name) -> Self {
        TypeRef(descriptor)
    }

    #[inline]
    pub const fn descriptor(self) -> Name {
        self.0
    }
}

/// Interned method prototype.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(transparent)]
pub struct ProtoId(u32);

impl ProtoId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        ProtoId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Return type and parameter types of a method.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Proto {
    pub return_type: TypeRef,
    pub params: SmallVec<[TypeRef; 4]>,
}

impl Proto {
    pub fn new(return_type: TypeRef, params: impl IntoIterator<Item = TypeRef>) -> Self {
        Proto {
            return_type,
            params: params.into_iter().collect(),
        }
    }

    /// All types mentioned by the prototype, return type first.
    pub fn types(&self) -> impl Iterator<Item = TypeRef> + '_ {
        std::iter::once(self.return_type).chain(self.params.iter().copied())
    }
}

/// Name and prototype of a method, ignoring the holder.
///
/// Two methods in one class may not share a signature.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct MethodSignature {
    pub name: Name,
    pub proto: ProtoId,
}

/// A symbolic method reference (holder, name, prototype).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct MethodRef {
    pub holder: TypeRef,
    pub name: Name,
    pub proto: ProtoId,
}

impl MethodRef {
    pub fn signature(&self) -> MethodSignature {
        MethodSignature {
            name: self.name,
            proto: self.proto,
        }
    }

    #[must_use]
    pub fn with_holder(self, holder: TypeRef) -> Self {
        MethodRef { holder, ..self }
    }

    #[must_use]
    pub fn with_name(self, name: Name) -> Self {
        MethodRef { name, ..self }
    }

    #[must_use]
    pub fn with_proto(self, proto: ProtoId) -> Self {
        MethodRef { proto, ..self }
    }
}

/// A symbolic field reference (holder, name, type).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct FieldRef {
    pub holder: TypeRef,
    pub name: Name,
    pub ty: TypeRef,
}

impl FieldRef {
    #[must_use]
    pub fn with_holder(self, holder: TypeRef) -> Self {
        FieldRef { holder, ..self }
    }

    #[must_use]
    pub fn with_type(self, ty: TypeRef) -> Self {
        FieldRef { ty, ..self }
    }
}

/// Either kind of member reference.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum MemberRef {
    Method(MethodRef),
    Field(FieldRef),
}

impl MemberRef {
    pub fn holder(&self) -> TypeRef {
        match self {
            MemberRef::Method(m) => m.holder,
            MemberRef::Field(f) => f.holder,
        }
    }
}

impl From<MethodRef> for MemberRef {
    fn from(method: MethodRef) -> Self {
        MemberRef::Method(method)
    }
}

impl From<FieldRef> for MemberRef {
    fn from(field: FieldRef) -> Self {
        MemberRef::Field(field)
    }
}
