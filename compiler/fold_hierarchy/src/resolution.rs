//! Method and field resolution (JVMS 5.4.3.2 to 5.4.3.4) and virtual
//! dispatch lookup.
//!
//! Resolution answers "which definition does this symbolic reference name",
//! independent of the receiver's runtime type. Missing classes make
//! resolution fail rather than error: the optimizer treats an unresolvable
//! reference as one it must not touch.

use rustc_hash::FxHashSet;

use fold_ir::{AccessFlags, ClassDef, FieldDef, FieldRef, MethodDef, MethodRef, MethodSignature, TypeRef};

use crate::{AppInfo, InstantiationInfo};

/// A resolved method definition and the class declaring it.
#[derive(Copy, Clone, Debug)]
pub struct ResolvedMethod<'p> {
    pub holder: &'p ClassDef,
    pub definition: &'p MethodDef,
}

impl ResolvedMethod<'_> {
    pub fn reference(&self) -> MethodRef {
        self.definition.reference
    }

    pub fn holder_type(&self) -> TypeRef {
        self.holder.ty
    }

    pub fn access(&self) -> AccessFlags {
        self.definition.access
    }

    pub fn is_interface_holder(&self) -> bool {
        self.holder.is_interface()
    }
}

impl PartialEq for ResolvedMethod<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.definition.reference == other.definition.reference
    }
}

impl Eq for ResolvedMethod<'_> {}

#[derive(Copy, Clone, Debug)]
pub struct ResolvedField<'p> {
    pub holder: &'p ClassDef,
    pub definition: &'p FieldDef,
}

impl ResolvedField<'_> {
    pub fn reference(&self) -> FieldRef {
        self.definition.reference
    }

    pub fn access(&self) -> AccessFlags {
        self.definition.access
    }
}

impl PartialEq for ResolvedField<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.definition.reference == other.definition.reference
    }
}

impl Eq for ResolvedField<'_> {}

impl<'p> AppInfo<'p> {
    /// Resolve with the rule the holder's kind selects. Used for `super`,
    /// direct, and static references.
    pub fn resolve_method(&self, method: &MethodRef) -> Option<ResolvedMethod<'p>> {
        let holder = self.definition_for(method.holder)?;
        if holder.is_interface() {
            self.resolve_method_on_interface(method)
        } else {
            self.resolve_method_on_class(method)
        }
    }

    /// Class method resolution. Fails if the holder is an interface.
    pub fn resolve_method_on_class(&self, method: &MethodRef) -> Option<ResolvedMethod<'p>> {
        let holder = self.definition_for(method.holder)?;
        if holder.is_interface() {
            return None;
        }
        let signature = method.signature();
        for ty in self.superclass_chain(method.holder) {
            let Some(class) = self.definition_for(ty) else {
                break;
            };
            if let Some(definition) = class.lookup_method(signature) {
                return Some(ResolvedMethod {
                    holder: class,
                    definition,
                });
            }
        }
        self.resolve_maximally_specific(method.holder, signature)
    }

    /// Interface method resolution. Fails if the holder is a class.
    pub fn resolve_method_on_interface(&self, method: &MethodRef) -> Option<ResolvedMethod<'p>> {
        let holder = self.definition_for(method.holder)?;
        if !holder.is_interface() {
            return None;
        }
        let signature = method.signature();
        if let Some(definition) = holder.lookup_method(signature) {
            return Some(ResolvedMethod { holder, definition });
        }
        if let Some(object) = self.definition_for(self.factory().object_type) {
            if let Some(definition) = object
                .lookup_method(signature)
                .filter(|m| m.access.is_public() && !m.is_static())
            {
                return Some(ResolvedMethod {
                    holder: object,
                    definition,
                });
            }
        }
        self.resolve_maximally_specific(method.holder, signature)
    }

    /// Among the superinterface methods of `ty` with `signature`, keep the
    /// maximally specific ones. A unique non-abstract candidate wins; several
    /// non-abstract candidates conflict and resolution fails; otherwise the
    /// first abstract candidate is chosen.
    fn resolve_maximally_specific(
        &self,
        ty: TypeRef,
        signature: MethodSignature,
    ) -> Option<ResolvedMethod<'p>> {
        let candidates: Vec<ResolvedMethod<'p>> = self
            .all_supertypes(ty)
            .into_iter()
            .filter_map(|sup| self.definition_for(sup))
            .filter(|class| class.is_interface())
            .filter_map(|class| {
                class
                    .lookup_method(signature)
                    .filter(|m| !m.is_private() && !m.is_static())
                    .map(|definition| ResolvedMethod {
                        holder: class,
                        definition,
                    })
            })
            .collect();
        let maximal: Vec<_> = candidates
            .iter()
            .filter(|c| {
                !candidates
                    .iter()
                    .any(|other| self.is_strict_subtype(other.holder.ty, c.holder.ty))
            })
            .copied()
            .collect();
        let mut concrete = maximal.iter().filter(|c| !c.definition.is_abstract());
        match (concrete.next(), concrete.next()) {
            (Some(only), None) => Some(*only),
            (Some(_), Some(_)) => None,
            (None, _) => maximal.first().copied(),
        }
    }

    /// Field resolution: the holder, then superinterfaces depth-first in
    /// declaration order, then the superclass.
    pub fn resolve_field(&self, field: &FieldRef) -> Option<ResolvedField<'p>> {
        let mut visited = FxHashSet::default();
        let mut stack = vec![field.holder];
        while let Some(ty) = stack.pop() {
            if !visited.insert(ty) {
                continue;
            }
            let Some(class) = self.definition_for(ty) else {
                continue;
            };
            if let Some(definition) = class.lookup_field(field) {
                return Some(ResolvedField {
                    holder: class,
                    definition,
                });
            }
            // Interfaces pop before the superclass.
            if let Some(super_type) = class.super_type {
                stack.push(super_type);
            }
            stack.extend(class.interfaces.iter().rev().copied());
        }
        None
    }

    /// Definitions a virtual or interface call through `method` may reach at
    /// runtime when the receiver's static type is `caller_type`: for
    /// `caller_type` and each of its subtypes that is a directly instantiated
    /// concrete class, the method selected by dispatch.
    ///
    /// A `caller_type` that is not a subtype of the holder starts the search
    /// at the holder.
    pub fn lookup_virtual_dispatch_targets(
        &self,
        method: &MethodRef,
        caller_type: TypeRef,
        instantiation: &InstantiationInfo,
    ) -> Vec<ResolvedMethod<'p>> {
        let Some(resolved) = self.resolve_method(method) else {
            return Vec::new();
        };
        if !resolved.definition.is_virtual() {
            return vec![resolved];
        }
        let bound = if self.is_subtype(caller_type, method.holder) {
            caller_type
        } else {
            method.holder
        };
        let signature = method.signature();
        let mut targets: Vec<ResolvedMethod<'p>> = Vec::new();
        for ty in std::iter::once(bound).chain(self.all_subtypes(bound)) {
            let Some(class) = self.definition_for(ty) else {
                continue;
            };
            if class.is_interface() || class.is_abstract() || !instantiation.is_directly_instantiated(ty) {
                continue;
            }
            if let Some(target) = self.select_virtual_target(ty, signature) {
                if !targets.contains(&target) {
                    targets.push(target);
                }
            }
        }
        targets
    }

    /// Method selection (JVMS 5.4.6) for a receiver of exactly type `ty`.
    fn select_virtual_target(
        &self,
        ty: TypeRef,
        signature: MethodSignature,
    ) -> Option<ResolvedMethod<'p>> {
        for class_ty in self.superclass_chain(ty) {
            let class = self.definition_for(class_ty)?;
            if let Some(definition) = class.lookup_method(signature).filter(|m| m.is_virtual()) {
                return (!definition.is_abstract()).then_some(ResolvedMethod {
                    holder: class,
                    definition,
                });
            }
        }
        self.resolve_maximally_specific(ty, signature)
            .filter(|m| !m.definition.is_abstract())
    }
}
