//! Forwarding bridges, staged tentatively and frozen once signatures settle.
//!
//! A [`TentativeBridge`] is created while a merge round is still deciding
//! names, so it only knows its own signature in the round's input
//! namespace. [`TentativeBridge::freeze`] resolves that signature and the
//! forwarding target through the round's finished lens layer and returns a
//! [`FrozenBridge`]. Only a frozen bridge can be lowered to code.

use fold_diagnostic::{InternalError, InternalResult};
use fold_ir::{AccessFlags, CodeBuilder, InvokeKind, ItemFactory, MethodDef, MethodRef, Nullability};
use fold_lens::LensLayer;

/// A bridge whose signatures may still change.
///
/// Has no equality or hash: its identity is not settled until frozen.
#[derive(Debug)]
pub struct TentativeBridge {
    signature: MethodRef,
    access: AccessFlags,
    invoke_kind: InvokeKind,
    is_interface: bool,
}

impl TentativeBridge {
    pub fn new(signature: MethodRef, access: AccessFlags, invoke_kind: InvokeKind, is_interface: bool) -> Self {
        TentativeBridge {
            signature,
            access,
            invoke_kind,
            is_interface,
        }
    }

    pub fn freeze(self, layer: &LensLayer, factory: &ItemFactory) -> InternalResult<FrozenBridge> {
        let target = layer
            .next_implementation_signature(factory, &self.signature)
            .ok_or_else(|| {
                InternalError::new("tentative bridge has no recorded implementation")
                    .at(factory.method_to_string(&self.signature))
            })?;
        Ok(FrozenBridge {
            method: layer.next_bridge_signature(factory, &self.signature),
            access: self.access,
            invoke_kind: self.invoke_kind,
            target,
            is_interface: self.is_interface,
        })
    }
}

/// A bridge with final signatures: `method` forwards to `target`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FrozenBridge {
    method: MethodRef,
    access: AccessFlags,
    invoke_kind: InvokeKind,
    target: MethodRef,
    is_interface: bool,
}

impl FrozenBridge {
    /// A bridge whose signatures are known at creation.
    pub fn forwarding(
        method: MethodRef,
        access: AccessFlags,
        invoke_kind: InvokeKind,
        target: MethodRef,
        is_interface: bool,
    ) -> Self {
        FrozenBridge {
            method,
            access,
            invoke_kind,
            target,
            is_interface,
        }
    }

    pub fn method(&self) -> MethodRef {
        self.method
    }

    pub fn target(&self) -> MethodRef {
        self.target
    }

    pub fn invoke_kind(&self) -> InvokeKind {
        self.invoke_kind
    }

    /// Load every argument, invoke the target once, return its result.
    ///
    /// The receiver is known non-null; other arguments may be null.
    pub fn lower(&self, factory: &ItemFactory) -> MethodDef {
        let proto = factory.proto(self.method.proto);
        let mut code = CodeBuilder::new();
        let mut args = Vec::with_capacity(proto.params.len() + 1);
        if !self.access.is_static() {
            args.push(code.argument(self.method.holder, Nullability::NotNull));
        }
        for param in &proto.params {
            args.push(code.argument(*param, Nullability::MaybeNull));
        }
        let returns_value = !factory.is_void(proto.return_type);
        let result = code.invoke(self.invoke_kind, self.target, self.is_interface, &args, returns_value);
        match result {
            Some(value) => code.return_value(value),
            None => code.return_void(),
        }
        MethodDef {
            reference: self.method,
            access: self.access,
            has_signature: false,
            code: Some(code.build()),
        }
    }
}
