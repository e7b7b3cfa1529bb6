//! Definitions and the subtype graph.

use rustc_hash::{FxHashMap, FxHashSet};

use fold_ir::{ClassDef, ItemFactory, Program, TypeRef};

/// Hierarchy view over one program snapshot.
pub struct AppInfo<'p> {
    program: &'p Program,
    factory: &'p ItemFactory,
    /// Immediate subtypes, in program order.
    subtypes: FxHashMap<TypeRef, Vec<TypeRef>>,
}

impl<'p> AppInfo<'p> {
    pub fn new(program: &'p Program, factory: &'p ItemFactory) -> Self {
        let mut subtypes: FxHashMap<TypeRef, Vec<TypeRef>> = FxHashMap::default();
        for class in program.classes() {
            for supertype in class.supertypes() {
                subtypes.entry(supertype).or_default().push(class.ty);
            }
        }
        AppInfo {
            program,
            factory,
            subtypes,
        }
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    pub fn factory(&self) -> &'p ItemFactory {
        self.factory
    }

    pub fn definition_for(&self, ty: TypeRef) -> Option<&'p ClassDef> {
        self.program.definition_for(ty)
    }

    pub fn is_program_class(&self, ty: TypeRef) -> bool {
        self.definition_for(ty).is_some_and(ClassDef::is_program)
    }

    pub fn is_library_class(&self, ty: TypeRef) -> bool {
        self.definition_for(ty).is_some_and(ClassDef::is_library)
    }

    pub fn is_interface(&self, ty: TypeRef) -> bool {
        self.definition_for(ty).is_some_and(ClassDef::is_interface)
    }

    pub fn is_same_package(&self, a: TypeRef, b: TypeRef) -> bool {
        self.factory.package_descriptor(a) == self.factory.package_descriptor(b)
    }

    /// Superclass then interfaces. Empty for missing classes.
    pub fn all_immediate_supertypes(&self, ty: TypeRef) -> Vec<TypeRef> {
        self.definition_for(ty)
            .map(|class| class.supertypes().collect())
            .unwrap_or_default()
    }

    pub fn immediate_subtypes(&self, ty: TypeRef) -> &[TypeRef] {
        self.subtypes.get(&ty).map_or(&[], Vec::as_slice)
    }

    /// Reflexive subtype test. Every reference type is a subtype of
    /// `java.lang.Object`.
    pub fn is_subtype(&self, sub: TypeRef, sup: TypeRef) -> bool {
        if sub == sup {
            return true;
        }
        if sup == self.factory.object_type {
            return self.factory.is_reference_type(sub);
        }
        let mut visited = FxHashSet::default();
        let mut worklist = vec![sub];
        while let Some(ty) = worklist.pop() {
            if !visited.insert(ty) {
                continue;
            }
            for supertype in self.all_immediate_supertypes(ty) {
                if supertype == sup {
                    return true;
                }
                worklist.push(supertype);
            }
        }
        false
    }

    pub fn is_strict_subtype(&self, sub: TypeRef, sup: TypeRef) -> bool {
        sub != sup && self.is_subtype(sub, sup)
    }

    /// Transitive supertypes, breadth-first, excluding `ty`.
    pub fn all_supertypes(&self, ty: TypeRef) -> Vec<TypeRef> {
        self.breadth_first(ty, |t| self.all_immediate_supertypes(t))
    }

    /// Transitive subtypes, breadth-first, excluding `ty`.
    pub fn all_subtypes(&self, ty: TypeRef) -> Vec<TypeRef> {
        self.breadth_first(ty, |t| self.immediate_subtypes(t).to_vec())
    }

    fn breadth_first(&self, start: TypeRef, next: impl Fn(TypeRef) -> Vec<TypeRef>) -> Vec<TypeRef> {
        let mut visited = FxHashSet::default();
        visited.insert(start);
        let mut order = Vec::new();
        let mut cursor = 0;
        let mut frontier = next(start);
        loop {
            for ty in frontier.drain(..) {
                if visited.insert(ty) {
                    order.push(ty);
                }
            }
            let Some(&ty) = order.get(cursor) else {
                return order;
            };
            cursor += 1;
            frontier = next(ty);
        }
    }

    /// `ty` followed by its superclasses. Stops after the first type without
    /// a definition.
    pub fn superclass_chain(&self, ty: TypeRef) -> Vec<TypeRef> {
        let mut chain = Vec::new();
        let mut current = Some(ty);
        while let Some(ty) = current {
            if chain.contains(&ty) {
                break;
            }
            chain.push(ty);
            current = self.definition_for(ty).and_then(|class| class.super_type);
        }
        chain
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
