//! The [`ItemFactory`]: interning and descriptor arithmetic for items.
//!
//! Every [`TypeRef`], [`ProtoId`], [`MethodRef`], and [`FieldRef`] in a
//! compilation is created here. The factory is shared (`&ItemFactory`) by all
//! stages; interning is internally synchronized so the parallel uses scan can
//! read while single-threaded stages create new items.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{FieldRef, MethodRef, Name, Proto, ProtoId, StringInterner, TypeRef};

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum DescriptorError {
    #[error("malformed descriptor `{descriptor}` at byte {position}")]
    Malformed { descriptor: String, position: usize },
}

#[derive(Default)]
struct ProtoTable {
    protos: Vec<Proto>,
    index: FxHashMap<Proto, ProtoId>,
}

/// Creates and describes items.
pub struct ItemFactory {
    interner: StringInterner,
    protos: RwLock<ProtoTable>,
    pub object_type: TypeRef,
    pub void_type: TypeRef,
    pub int_type: TypeRef,
    pub boolean_type: TypeRef,
    pub init_name: Name,
    pub clinit_name: Name,
}

impl ItemFactory {
    pub fn new() -> Self {
        let interner = StringInterner::new();
        let object_type = TypeRef::from_descriptor(interner.intern("Ljava/lang/Object;"));
        let void_type = TypeRef::from_descriptor(interner.intern("V"));
        let int_type = TypeRef::from_descriptor(interner.intern("I"));
        let boolean_type = TypeRef::from_descriptor(interner.intern("Z"));
        let init_name = interner.intern("<init>");
        let clinit_name = interner.intern("<clinit>");
        ItemFactory {
            interner,
            protos: RwLock::new(ProtoTable::default()),
            object_type,
            void_type,
            int_type,
            boolean_type,
            init_name,
            clinit_name,
        }
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub fn intern(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    pub fn name(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    // ── Types ──

    /// Intern a descriptor without validating it.
    pub fn create_type(&self, descriptor: &str) -> TypeRef {
        TypeRef::from_descriptor(self.interner.intern(descriptor))
    }

    /// Class type from a binary name, `p.A` or `p/A`.
    pub fn class_type(&self, binary_name: &str) -> TypeRef {
        self.create_type(&format!("L{};", binary_name.replace('.', "/")))
    }

    /// Intern a field descriptor, rejecting malformed input.
    pub fn parse_type(&self, descriptor: &str) -> Result<TypeRef, DescriptorError> {
        match parse_field_descriptor(descriptor, 0) {
            Some(end) if end == descriptor.len() => Ok(self.create_type(descriptor)),
            _ => Err(DescriptorError::Malformed {
                descriptor: descriptor.to_owned(),
                position: 0,
            }),
        }
    }

    pub fn descriptor(&self, ty: TypeRef) -> &'static str {
        self.interner.lookup(ty.descriptor())
    }

    pub fn is_class_type(&self, ty: TypeRef) -> bool {
        self.descriptor(ty).starts_with('L')
    }

    pub fn is_array_type(&self, ty: TypeRef) -> bool {
        self.descriptor(ty).starts_with('[')
    }

    pub fn is_reference_type(&self, ty: TypeRef) -> bool {
        self.is_class_type(ty) || self.is_array_type(ty)
    }

    pub fn is_void(&self, ty: TypeRef) -> bool {
        ty == self.void_type
    }

    pub fn array_dimensions(&self, ty: TypeRef) -> usize {
        self.descriptor(ty).bytes().take_while(|b| *b == b'[').count()
    }

    /// Element type with all array dimensions stripped.
    pub fn base_type(&self, ty: TypeRef) -> TypeRef {
        let dims = self.array_dimensions(ty);
        if dims == 0 {
            return ty;
        }
        self.create_type(&self.descriptor(ty)[dims..])
    }

    /// Replace the base type, keeping array dimensions.
    pub fn with_base_type(&self, ty: TypeRef, base: TypeRef) -> TypeRef {
        let dims = self.array_dimensions(ty);
        if dims == 0 {
            return base;
        }
        self.create_type(&format!("{}{}", "[".repeat(dims), self.descriptor(base)))
    }

    /// `p/q` for `Lp/q/A;`. Empty for the default package and non-class types.
    pub fn package_descriptor(&self, ty: TypeRef) -> &'static str {
        let descriptor = self.descriptor(ty);
        if !descriptor.starts_with('L') {
            return "";
        }
        match descriptor.rfind('/') {
            Some(slash) => &descriptor[1..slash],
            None => "",
        }
    }

    /// `A` for `Lp/q/A;`.
    pub fn simple_name(&self, ty: TypeRef) -> &'static str {
        let descriptor = self.descriptor(ty);
        let body = descriptor
            .strip_prefix('L')
            .and_then(|d| d.strip_suffix(';'))
            .unwrap_or(descriptor);
        match body.rfind('/') {
            Some(slash) => &body[slash + 1..],
            None => body,
        }
    }

    /// Java source notation: `p.A`, `int`, `p.A[]`.
    pub fn type_to_source(&self, ty: TypeRef) -> String {
        let dims = self.array_dimensions(ty);
        let base = &self.descriptor(ty)[dims..];
        let mut out = match base {
            "V" => "void".to_owned(),
            "Z" => "boolean".to_owned(),
            "B" => "byte".to_owned(),
            "C" => "char".to_owned(),
            "S" => "short".to_owned(),
            "I" => "int".to_owned(),
            "J" => "long".to_owned(),
            "F" => "float".to_owned(),
            "D" => "double".to_owned(),
            class => class
                .trim_start_matches('L')
                .trim_end_matches(';')
                .replace('/', "."),
        };
        for _ in 0..dims {
            out.push_str("[]");
        }
        out
    }

    // ── Prototypes ──

    pub fn create_proto(
        &self,
        return_type: TypeRef,
        params: impl IntoIterator<Item = TypeRef>,
    ) -> ProtoId {
        let proto = Proto::new(return_type, params);
        if let Some(&id) = self.protos.read().index.get(&proto) {
            return id;
        }
        let mut table = self.protos.write();
        if let Some(&id) = table.index.get(&proto) {
            return id;
        }
        let id = match u32::try_from(table.protos.len()) {
            Ok(index) => ProtoId::new(index),
            Err(_) => panic!("prototype table exceeded u32 capacity"),
        };
        table.protos.push(proto.clone());
        table.index.insert(proto, id);
        id
    }

    /// Intern a method descriptor such as `(ILp/A;)V`.
    pub fn parse_proto(&self, descriptor: &str) -> Result<ProtoId, DescriptorError> {
        let malformed = |position| DescriptorError::Malformed {
            descriptor: descriptor.to_owned(),
            position,
        };
        if !descriptor.starts_with('(') {
            return Err(malformed(0));
        }
        let mut params = Vec::new();
        let mut pos = 1;
        while descriptor.as_bytes().get(pos) != Some(&b')') {
            let end = parse_field_descriptor(descriptor, pos).ok_or_else(|| malformed(pos))?;
            params.push(self.create_type(&descriptor[pos..end]));
            pos = end;
        }
        pos += 1;
        let return_type = if &descriptor[pos..] == "V" {
            self.void_type
        } else {
            match parse_field_descriptor(descriptor, pos) {
                Some(end) if end == descriptor.len() => self.create_type(&descriptor[pos..]),
                _ => return Err(malformed(pos)),
            }
        };
        Ok(self.create_proto(return_type, params))
    }

    pub fn proto(&self, id: ProtoId) -> Proto {
        self.protos.read().protos[id.index()].clone()
    }

    pub fn return_type(&self, id: ProtoId) -> TypeRef {
        self.protos.read().protos[id.index()].return_type
    }

    pub fn param_count(&self, id: ProtoId) -> usize {
        self.protos.read().protos[id.index()].params.len()
    }

    pub fn proto_descriptor(&self, id: ProtoId) -> String {
        let proto = self.proto(id);
        let mut out = String::from("(");
        for param in &proto.params {
            out.push_str(self.descriptor(*param));
        }
        out.push(')');
        out.push_str(self.descriptor(proto.return_type));
        out
    }

    /// Rewrite every type in a prototype.
    pub fn map_proto_types(&self, id: ProtoId, mut f: impl FnMut(TypeRef) -> TypeRef) -> ProtoId {
        let proto = self.proto(id);
        let return_type = f(proto.return_type);
        let params: Vec<_> = proto.params.iter().map(|p| f(*p)).collect();
        self.create_proto(return_type, params)
    }

    /// Prototype with `ty` inserted as the first parameter.
    pub fn prepend_param(&self, id: ProtoId, ty: TypeRef) -> ProtoId {
        let proto = self.proto(id);
        self.create_proto(
            proto.return_type,
            std::iter::once(ty).chain(proto.params.iter().copied()),
        )
    }

    /// Prototype with `count` trailing parameters of type `ty` appended.
    pub fn append_params(&self, id: ProtoId, ty: TypeRef, count: usize) -> ProtoId {
        let proto = self.proto(id);
        self.create_proto(
            proto.return_type,
            proto
                .params
                .iter()
                .copied()
                .chain(std::iter::repeat(ty).take(count)),
        )
    }

    /// Class types mentioned by a prototype, array dimensions stripped.
    pub fn referenced_class_types(&self, id: ProtoId) -> Vec<TypeRef> {
        self.proto(id)
            .types()
            .map(|ty| self.base_type(ty))
            .filter(|ty| self.is_class_type(*ty))
            .collect()
    }

    // ── Members ──

    pub fn create_method(&self, holder: TypeRef, name: &str, proto: ProtoId) -> MethodRef {
        MethodRef {
            holder,
            name: self.intern(name),
            proto,
        }
    }

    pub fn create_field(&self, holder: TypeRef, name: &str, ty: TypeRef) -> FieldRef {
        FieldRef {
            holder,
            name: self.intern(name),
            ty,
        }
    }

    pub fn is_instance_initializer(&self, method: &MethodRef) -> bool {
        method.name == self.init_name
    }

    /// First `base$suffix$N` name for which `is_taken` is false.
    pub fn fresh_name(&self, base: Name, suffix: &str, mut is_taken: impl FnMut(Name) -> bool) -> Name {
        let base = self.name(base);
        (0..)
            .map(|n| self.intern(&format!("{base}${suffix}${n}")))
            .find(|candidate| !is_taken(*candidate))
            .unwrap_or(Name::EMPTY)
    }

    /// `p.A.m(I)V`
    pub fn method_to_string(&self, method: &MethodRef) -> String {
        format!(
            "{}.{}{}",
            self.type_to_source(method.holder),
            self.name(method.name),
            self.proto_descriptor(method.proto)
        )
    }

    /// `p.A.f:I`
    pub fn field_to_string(&self, field: &FieldRef) -> String {
        format!(
            "{}.{}:{}",
            self.type_to_source(field.holder),
            self.name(field.name),
            self.descriptor(field.ty)
        )
    }
}

impl Default for ItemFactory {
    fn default() -> Self {
        Self::new()
    }
}

/// End offset of the field descriptor starting at `start`.
fn parse_field_descriptor(descriptor: &str, start: usize) -> Option<usize> {
    let bytes = descriptor.as_bytes();
    let mut pos = start;
    while bytes.get(pos) == Some(&b'[') {
        pos += 1;
    }
    match bytes.get(pos)? {
        b'Z' | b'B' | b'C' | b'S' | b'I' | b'J' | b'F' | b'D' => Some(pos + 1),
        b'L' => {
            let semi = descriptor[pos..].find(';')?;
            // `L;` has no class name.
            (semi > 1).then_some(pos + semi + 1)
        }
        _ => None,
    }
}
