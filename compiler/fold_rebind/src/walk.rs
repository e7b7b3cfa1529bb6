//! Hierarchy walks that pick rebinding holders and bridge holders.
//!
//! Every walk is an explicit worklist with a visited set, so a malformed
//! hierarchy with a cycle still terminates.

use fold_hierarchy::AppInfo;
use fold_ir::{ClassDef, TypeRef};
use rustc_hash::FxHashSet;

/// First library class in the superclass chain of `bottom`, falling back
/// to `top`, the library class the member resolved to.
pub(crate) fn first_library_class(app: &AppInfo<'_>, top: TypeRef, bottom: TypeRef) -> TypeRef {
    app.superclass_chain(bottom)
        .into_iter()
        .find(|ty| app.is_library_class(*ty))
        .unwrap_or(top)
}

/// Depth-first search from `start` over the superclass, then the
/// interfaces, for the class `declaring`.
///
/// Returns the first library class on the path to `declaring`, or
/// `declaring` itself when the path has no library class above it. `None`
/// if `declaring` is not reachable from `start`.
pub(crate) fn first_library_class_for_interface_target(
    app: &AppInfo<'_>,
    start: TypeRef,
    declaring: TypeRef,
) -> Option<TypeRef> {
    let mut visited = FxHashSet::default();
    // Each entry carries the first library class seen above it on its path.
    let mut stack: Vec<(TypeRef, Option<TypeRef>)> = vec![(start, None)];
    while let Some((ty, first_library)) = stack.pop() {
        if ty == declaring {
            return Some(first_library.unwrap_or(ty));
        }
        if !visited.insert(ty) {
            continue;
        }
        let Some(class) = app.definition_for(ty) else {
            continue;
        };
        let first_library = first_library.or(class.is_library().then_some(ty));
        // Interfaces are pushed first so the superclass is explored first.
        stack.extend(class.interfaces.iter().rev().map(|iface| (*iface, first_library)));
        if let Some(super_type) = class.super_type {
            stack.push((super_type, first_library));
        }
    }
    None
}

/// Holder for a bridge that re-exposes a method of `interface` to `super`
/// calls through `class`.
///
/// An interface holds its own bridge. For a class this is the highest
/// program class in its superclass chain that still implements `interface`,
/// not the nearest one: a bridge placed there is inherited by every class
/// below it, so one bridge serves all `super` calls through the chain.
pub(crate) fn interface_bridge_holder(app: &AppInfo<'_>, class: &ClassDef, interface: TypeRef) -> TypeRef {
    if class.is_interface() {
        return class.ty;
    }
    let mut holder = class.ty;
    for ty in app.superclass_chain(class.ty).into_iter().skip(1) {
        if !app.is_program_class(ty) || !app.is_subtype(ty, interface) {
            break;
        }
        holder = ty;
    }
    holder
}

/// Holder for a bridge that re-exposes a member of `target` referenced
/// through `original`.
///
/// Walks from `original` toward `target`, through the superclass when it
/// leads there, otherwise through the first interface that does. Of the
/// classes passed (never `target` itself, and stopping at the first
/// non-program class), returns the one closest to `target` that is a
/// program class and visible: public, or declared in `package`. With
/// `package` set to `None` only public classes qualify.
pub(crate) fn visibility_bridge_holder(
    app: &AppInfo<'_>,
    original: TypeRef,
    target: TypeRef,
    package: Option<&str>,
) -> Option<TypeRef> {
    let factory = app.factory();
    let mut path: Vec<&ClassDef> = Vec::new();
    let mut visited = FxHashSet::default();
    let mut current = Some(original);
    while let Some(ty) = current {
        if ty == target || !visited.insert(ty) {
            break;
        }
        let Some(class) = app.definition_for(ty) else {
            break;
        };
        if class.is_library() {
            break;
        }
        path.push(class);
        current = class
            .super_type
            .filter(|super_type| app.is_subtype(*super_type, target))
            .or_else(|| {
                class
                    .interfaces
                    .iter()
                    .copied()
                    .find(|iface| app.is_subtype(*iface, target))
            });
    }
    path.into_iter()
        .rev()
        .find(|class| {
            class.is_program()
                && (class.is_public() || package == Some(factory.package_descriptor(class.ty)))
        })
        .map(|class| class.ty)
}
