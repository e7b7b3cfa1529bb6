//! One stage's worth of reference rewrites.

use fold_ir::{FieldRef, InvokeKind, ItemFactory, MethodRef, TypeRef};
use rustc_hash::FxHashMap;

/// A method reference after rewriting, with how call sites must invoke it.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct MethodLookup {
    pub reference: MethodRef,
    pub kind: InvokeKind,
    /// Interface bit of the rewritten constant-pool entry.
    pub is_interface: bool,
    /// Trailing `null` arguments call sites must pass.
    pub extra_null_arguments: usize,
}

impl MethodLookup {
    pub fn unchanged(reference: MethodRef, kind: InvokeKind, is_interface: bool) -> Self {
        MethodLookup {
            reference,
            kind,
            is_interface,
            extra_null_arguments: 0,
        }
    }
}

/// Explicit destination of a method in a layer.
///
/// `kind` and `is_interface` are `None` when the call site keeps its own.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct MethodTarget {
    pub reference: MethodRef,
    pub kind: Option<InvokeKind>,
    pub is_interface: Option<bool>,
    pub extra_null_arguments: usize,
}

impl MethodTarget {
    pub fn to(reference: MethodRef) -> Self {
        MethodTarget {
            reference,
            kind: None,
            is_interface: None,
            extra_null_arguments: 0,
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: InvokeKind, is_interface: bool) -> Self {
        self.kind = Some(kind);
        self.is_interface = Some(is_interface);
        self
    }

    #[must_use]
    pub fn with_extra_nulls(mut self, count: usize) -> Self {
        self.extra_null_arguments = count;
        self
    }

    fn apply(&self, kind: InvokeKind, is_interface: bool) -> MethodLookup {
        MethodLookup {
            reference: self.reference,
            kind: self.kind.unwrap_or(kind),
            is_interface: self.is_interface.unwrap_or(is_interface),
            extra_null_arguments: self.extra_null_arguments,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) struct TypeTarget {
    pub(crate) ty: TypeRef,
    pub(crate) is_interface: bool,
}

/// The rewrites of one stage, from its input namespace to its output.
///
/// Built with [`LensBuilder`](crate::LensBuilder). References without an
/// explicit entry are rewritten structurally through the type map.
#[derive(Clone, Debug, Default)]
pub struct LensLayer {
    pub(crate) name: &'static str,
    pub(crate) types: FxHashMap<TypeRef, TypeTarget>,
    pub(crate) methods: FxHashMap<MethodRef, MethodTarget>,
    pub(crate) invoke_methods: FxHashMap<(InvokeKind, MethodRef), MethodTarget>,
    /// Keyed by the caller's holder in the output namespace.
    pub(crate) super_redirects: FxHashMap<(TypeRef, MethodRef), MethodTarget>,
    /// Superclass of each vertically merged class.
    pub(crate) merged_super_types: FxHashMap<TypeRef, TypeRef>,
    pub(crate) fields: FxHashMap<FieldRef, FieldRef>,
    /// Vertical-merge bridge signature to the implementation it forwards to.
    pub(crate) bridges: FxHashMap<MethodRef, MethodRef>,
}

impl LensLayer {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
            && self.methods.is_empty()
            && self.invoke_methods.is_empty()
            && self.super_redirects.is_empty()
            && self.fields.is_empty()
    }

    /// Merged-away types and where they went, in no particular order.
    pub fn type_mappings(&self) -> impl Iterator<Item = (TypeRef, TypeRef)> + '_ {
        self.types.iter().map(|(source, target)| (*source, target.ty))
    }

    pub fn lookup_type(&self, factory: &ItemFactory, ty: TypeRef) -> TypeRef {
        if let Some(target) = self.types.get(&ty) {
            return target.ty;
        }
        if factory.is_array_type(ty) {
            let base = factory.base_type(ty);
            if let Some(target) = self.types.get(&base) {
                return factory.with_base_type(ty, target.ty);
            }
        }
        ty
    }

    /// The reference with holder and prototype mapped through the type map.
    ///
    /// This is also how definitions outside merged classes are renamed.
    pub fn rewrite_definition(&self, factory: &ItemFactory, method: &MethodRef) -> MethodRef {
        if self.types.is_empty() {
            return *method;
        }
        MethodRef {
            holder: self.lookup_type(factory, method.holder),
            name: method.name,
            proto: factory.map_proto_types(method.proto, |ty| self.lookup_type(factory, ty)),
        }
    }

    /// Rewrite a call site. `context` is the holder of the calling method in
    /// this layer's input namespace.
    pub fn lookup_method(
        &self,
        factory: &ItemFactory,
        method: &MethodRef,
        kind: InvokeKind,
        is_interface: bool,
        context: Option<TypeRef>,
    ) -> MethodLookup {
        let context_out = context.map(|ty| self.lookup_type(factory, ty));
        if kind == InvokeKind::Super {
            if let Some(target) = context_out.and_then(|ctx| self.super_redirects.get(&(ctx, *method))) {
                return target.apply(kind, is_interface);
            }
        }
        if let Some(target) = self.invoke_methods.get(&(kind, *method)) {
            return target.apply(kind, is_interface);
        }
        if let Some(target) = self.methods.get(method) {
            return target.apply(kind, is_interface);
        }

        let mut reference = self.rewrite_definition(factory, method);
        let mut kind = kind;
        let mut is_interface = is_interface;
        if let Some(target) = self.types.get(&method.holder) {
            if is_interface && !target.is_interface {
                is_interface = false;
                if kind == InvokeKind::Interface {
                    kind = InvokeKind::Virtual;
                }
            }
        }
        // A super call into a class that was folded into the caller would
        // now name the caller itself; it has to name the folded class's
        // superclass instead.
        if kind == InvokeKind::Super
            && context_out == Some(reference.holder)
            && context != Some(method.holder)
        {
            if let Some(&super_type) = self.merged_super_types.get(&method.holder) {
                reference.holder = self.lookup_type(factory, super_type);
            }
        }
        MethodLookup {
            reference,
            kind,
            is_interface,
            extra_null_arguments: 0,
        }
    }

    pub fn lookup_field(&self, factory: &ItemFactory, field: &FieldRef) -> FieldRef {
        if let Some(target) = self.fields.get(field) {
            return *target;
        }
        FieldRef {
            holder: self.lookup_type(factory, field.holder),
            name: field.name,
            ty: self.lookup_type(factory, field.ty),
        }
    }

    /// Final signature of a bridge staged while this layer was built.
    pub fn next_bridge_signature(&self, factory: &ItemFactory, bridge: &MethodRef) -> MethodRef {
        self.rewrite_definition(factory, bridge)
    }

    /// Final signature of the method a staged bridge forwards to, or `None`
    /// if no bridge was recorded under that signature.
    pub fn next_implementation_signature(
        &self,
        factory: &ItemFactory,
        bridge: &MethodRef,
    ) -> Option<MethodRef> {
        self.bridges
            .get(bridge)
            .map(|implementation| self.rewrite_definition(factory, implementation))
    }

    /// Every explicit method destination, for holder verification.
    pub(crate) fn method_targets(&self) -> impl Iterator<Item = &MethodTarget> {
        self.methods
            .values()
            .chain(self.invoke_methods.values())
            .chain(self.super_redirects.values())
    }
}
