//! The composed lens.

use std::sync::Arc;

use fold_diagnostic::{InternalError, InternalResult};
use fold_ir::{FieldRef, InvokeKind, ItemFactory, MethodRef, Program, TypeRef};

use crate::{LensLayer, MethodLookup};

/// The identity, or a previous lens with one more layer on top.
///
/// Lookups take references from the original program and return the ones
/// the current program uses.
#[derive(Clone, Debug, Default)]
pub enum RewriteLens {
    #[default]
    Identity,
    Layered {
        previous: Arc<RewriteLens>,
        layer: Arc<LensLayer>,
    },
}

impl RewriteLens {
    #[must_use]
    pub fn compose(self, layer: LensLayer) -> RewriteLens {
        self.compose_shared(Arc::new(layer))
    }

    #[must_use]
    pub fn compose_shared(self, layer: Arc<LensLayer>) -> RewriteLens {
        if layer.is_empty() {
            return self;
        }
        RewriteLens::Layered {
            previous: Arc::new(self),
            layer,
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, RewriteLens::Identity)
    }

    /// Layers oldest first.
    pub fn layers(&self) -> Vec<&LensLayer> {
        let mut layers = Vec::new();
        let mut current = self;
        while let RewriteLens::Layered { previous, layer } = current {
            layers.push(layer.as_ref());
            current = previous;
        }
        layers.reverse();
        layers
    }

    pub fn lookup_type(&self, factory: &ItemFactory, ty: TypeRef) -> TypeRef {
        self.layers()
            .into_iter()
            .fold(ty, |ty, layer| layer.lookup_type(factory, ty))
    }

    /// `context` is the caller's holder in the original program.
    pub fn lookup_method(
        &self,
        factory: &ItemFactory,
        method: &MethodRef,
        kind: InvokeKind,
        is_interface: bool,
        context: Option<TypeRef>,
    ) -> MethodLookup {
        let mut lookup = MethodLookup::unchanged(*method, kind, is_interface);
        let mut context = context;
        for layer in self.layers() {
            let next = layer.lookup_method(
                factory,
                &lookup.reference,
                lookup.kind,
                lookup.is_interface,
                context,
            );
            lookup = MethodLookup {
                extra_null_arguments: lookup.extra_null_arguments + next.extra_null_arguments,
                ..next
            };
            context = context.map(|ty| layer.lookup_type(factory, ty));
        }
        lookup
    }

    pub fn lookup_field(&self, factory: &ItemFactory, field: &FieldRef) -> FieldRef {
        self.layers()
            .into_iter()
            .fold(*field, |field, layer| layer.lookup_field(factory, &field))
    }

    /// Check that no explicit target of any layer, carried through the
    /// layers after it, lands on a class missing from `program`.
    pub fn verify_holders(&self, factory: &ItemFactory, program: &Program) -> InternalResult<()> {
        let layers = self.layers();
        for (index, layer) in layers.iter().enumerate() {
            let later = &layers[index + 1..];
            let check = |holder: TypeRef, what: &dyn Fn() -> String| {
                let holder = factory.base_type(holder);
                if factory.is_class_type(holder) && !program.contains(holder) {
                    return Err(InternalError::new(format!(
                        "lens layer `{}` maps {} to pruned holder `{}`",
                        layer.name(),
                        what(),
                        factory.type_to_source(holder),
                    ))
                    .at(factory.descriptor(holder)));
                }
                Ok(())
            };

            for (source, target) in layer.type_mappings() {
                let target = later
                    .iter()
                    .fold(target, |ty, next| next.lookup_type(factory, ty));
                check(target, &|| format!("type `{}`", factory.type_to_source(source)))?;
            }
            for target in layer.method_targets() {
                let mut lookup = MethodLookup::unchanged(
                    target.reference,
                    target.kind.unwrap_or(InvokeKind::Virtual),
                    target.is_interface.unwrap_or(false),
                );
                for next in later {
                    lookup = next.lookup_method(
                        factory,
                        &lookup.reference,
                        lookup.kind,
                        lookup.is_interface,
                        None,
                    );
                }
                check(lookup.reference.holder, &|| {
                    format!("method `{}`", factory.method_to_string(&target.reference))
                })?;
            }
            for target in layer.fields.values() {
                let field = later
                    .iter()
                    .fold(*target, |field, next| next.lookup_field(factory, &field));
                check(field.holder, &|| {
                    format!("field `{}`", factory.field_to_string(target))
                })?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
