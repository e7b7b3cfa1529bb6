use rustc_hash::FxHashSet;

use fold_diagnostic::InternalResult;
use fold_hierarchy::AppInfo;
use fold_ir::{MethodSignature, TypeRef};

use super::{partition_disjoint, unified_proto};
use crate::{MergeGroup, MultiClassPolicy};

/// Merged classes must not change dispatch.
///
/// A class overriding a method it inherits from outside the group would
/// take over that method for every other class of the group, so it is
/// removed. The remaining classes are split so no two of them declare the
/// same non-constructor signature once the group's types are unified.
pub struct NoMethodCollisions<'a, 'p> {
    app: &'a AppInfo<'p>,
}

impl<'a, 'p> NoMethodCollisions<'a, 'p> {
    pub fn new(app: &'a AppInfo<'p>) -> Self {
        NoMethodCollisions { app }
    }

    fn signatures(&self, group: &MergeGroup, ty: TypeRef, virtual_only: bool) -> Vec<MethodSignature> {
        let factory = self.app.factory();
        let Some(class) = self.app.definition_for(ty) else {
            return Vec::new();
        };
        class
            .methods
            .iter()
            .filter(|m| !m.is_instance_initializer() && (!virtual_only || m.is_virtual()))
            .map(|m| MethodSignature {
                name: m.reference.name,
                proto: unified_proto(factory, group, m.reference.proto),
            })
            .collect()
    }

    /// Virtual signatures every class of the group can see from outside it:
    /// declared up the superclass chains, or default methods of interfaces.
    fn inherited_signatures(&self, group: &MergeGroup) -> FxHashSet<MethodSignature> {
        let factory = self.app.factory();
        let mut inherited = FxHashSet::default();
        for ty in group.classes() {
            for super_type in self.app.all_supertypes(*ty) {
                if group.contains(super_type) {
                    continue;
                }
                let Some(class) = self.app.definition_for(super_type) else {
                    continue;
                };
                let from_interface = class.is_interface();
                inherited.extend(
                    class
                        .virtual_methods()
                        .filter(|m| !from_interface || !m.is_abstract())
                        .map(|m| MethodSignature {
                            name: m.reference.name,
                            proto: unified_proto(factory, group, m.reference.proto),
                        }),
                );
            }
        }
        inherited
    }
}

impl MultiClassPolicy for NoMethodCollisions<'_, '_> {
    fn name(&self) -> &'static str {
        "NoMethodCollisions"
    }

    fn apply(&mut self, mut group: MergeGroup) -> InternalResult<Vec<MergeGroup>> {
        let inherited = self.inherited_signatures(&group);
        let overriding: Vec<TypeRef> = group
            .classes()
            .iter()
            .copied()
            .filter(|ty| {
                self.signatures(&group, *ty, true)
                    .iter()
                    .any(|sig| inherited.contains(sig))
            })
            .collect();
        if !overriding.is_empty() {
            tracing::trace!(count = overriding.len(), "dropping overriding classes");
            group.retain(|ty| !overriding.contains(ty));
        }
        Ok(partition_disjoint(&group, |ty| self.signatures(&group, ty, false)))
    }
}
