//! Incremental construction of a [`LensLayer`].

use fold_ir::{FieldRef, InvokeKind, MethodRef, TypeRef};

use crate::layer::{LensLayer, MethodTarget, TypeTarget};

/// Append-only builder for one stage's layer.
///
/// Identity entries are dropped on insertion so an untouched stage builds an
/// empty layer.
#[derive(Debug, Default)]
pub struct LensBuilder {
    layer: LensLayer,
}

impl LensBuilder {
    pub fn new(name: &'static str) -> Self {
        LensBuilder {
            layer: LensLayer {
                name,
                ..LensLayer::default()
            },
        }
    }

    /// The layer built so far, for lookups while the stage is still running.
    pub fn layer(&self) -> &LensLayer {
        &self.layer
    }

    pub fn is_empty(&self) -> bool {
        self.layer.is_empty()
    }

    pub fn map_type(&mut self, source: TypeRef, target: TypeRef, target_is_interface: bool) {
        if source != target {
            self.layer.types.insert(
                source,
                TypeTarget {
                    ty: target,
                    is_interface: target_is_interface,
                },
            );
        }
    }

    /// Rename a method for every call site and invoke kind.
    pub fn map_method(&mut self, from: MethodRef, to: MethodTarget) {
        if !is_identity(&from, &to) {
            self.layer.methods.insert(from, to);
        }
    }

    /// Rename a method only where it is invoked with `kind`.
    pub fn map_invoke(&mut self, kind: InvokeKind, from: MethodRef, to: MethodTarget) {
        if !is_identity(&from, &to) {
            self.layer.invoke_methods.insert((kind, from), to);
        }
    }

    /// Redirect `invoke-super from` issued by methods of `context`, given in
    /// the output namespace.
    pub fn map_super_call(&mut self, context: TypeRef, from: MethodRef, to: MethodTarget) {
        self.layer.super_redirects.insert((context, from), to);
    }

    pub fn record_merged_super_type(&mut self, source: TypeRef, super_type: TypeRef) {
        self.layer.merged_super_types.insert(source, super_type);
    }

    pub fn map_field(&mut self, from: FieldRef, to: FieldRef) {
        if from != to {
            self.layer.fields.insert(from, to);
        }
    }

    /// Record that the bridge staged under `bridge` forwards to
    /// `implementation`. Both are given in the input namespace.
    pub fn record_bridge(&mut self, bridge: MethodRef, implementation: MethodRef) {
        self.layer.bridges.insert(bridge, implementation);
    }

    pub fn build(self) -> LensLayer {
        let layer = self.layer;
        tracing::debug!(
            layer = layer.name,
            types = layer.types.len(),
            methods = layer.methods.len() + layer.invoke_methods.len(),
            super_redirects = layer.super_redirects.len(),
            fields = layer.fields.len(),
            bridges = layer.bridges.len(),
            "built lens layer"
        );
        layer
    }
}

fn is_identity(from: &MethodRef, to: &MethodTarget) -> bool {
    *from == to.reference
        && to.kind.is_none()
        && to.is_interface.is_none()
        && to.extra_null_arguments == 0
}
