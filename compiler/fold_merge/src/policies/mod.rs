//! The horizontal merge policies.
//!
//! Single-class policies filter classes out of every group. Multi-class
//! policies split groups so that every resulting group is safe to merge
//! along one more axis. [`PolicyScheduler`](crate::PolicyScheduler) decides
//! which run, and in which order.

mod finalize;
mod no_instance_fields;
mod no_instance_initializer_merging;
mod no_keep_rules;
mod no_method_collisions;
mod no_vertically_merged;
mod only_program;
mod same_instance_fields;
mod same_instantiation;
mod same_package;
mod same_parent;

use std::collections::{BTreeMap, BTreeSet};

use fold_ir::{ItemFactory, ProtoId, TypeRef};

use crate::MergeGroup;

pub(crate) use finalize::compute_instance_field_map;
pub use finalize::FinalizeMergeGroup;
pub use no_instance_fields::NoInstanceFields;
pub use no_instance_initializer_merging::NoInstanceInitializerMerging;
pub use no_keep_rules::NoKeepRules;
pub use no_method_collisions::NoMethodCollisions;
pub use no_vertically_merged::NoVerticallyMergedClasses;
pub use only_program::OnlyProgramClasses;
pub use same_instance_fields::SameInstanceFields;
pub use same_instantiation::SameInstantiation;
pub use same_package::SamePackage;
pub use same_parent::SameParentClass;

/// Split `group` by `key`, keeping group order inside every part.
fn partition_by<K: Ord>(group: &MergeGroup, mut key: impl FnMut(TypeRef) -> K) -> Vec<MergeGroup> {
    let mut parts: BTreeMap<K, Vec<TypeRef>> = BTreeMap::new();
    for ty in group.classes() {
        parts.entry(key(*ty)).or_default().push(*ty);
    }
    parts
        .into_values()
        .map(|classes| MergeGroup::split_from(group, classes))
        .collect()
}

/// Greedily split `group` so no two classes in a part share a key. A class
/// lands in the first part none of whose classes has any of its keys.
fn partition_disjoint<K: Ord + Clone>(
    group: &MergeGroup,
    mut keys: impl FnMut(TypeRef) -> Vec<K>,
) -> Vec<MergeGroup> {
    let mut parts: Vec<(Vec<TypeRef>, BTreeSet<K>)> = Vec::new();
    for ty in group.classes() {
        let class_keys = keys(*ty);
        let slot = parts
            .iter()
            .position(|(_, taken)| class_keys.iter().all(|k| !taken.contains(k)));
        let (classes, taken) = match slot {
            Some(index) => &mut parts[index],
            None => {
                parts.push((Vec::new(), BTreeSet::new()));
                let last = parts.len() - 1;
                &mut parts[last]
            }
        };
        classes.push(*ty);
        taken.extend(class_keys);
    }
    parts
        .into_iter()
        .map(|(classes, _)| MergeGroup::split_from(group, classes))
        .collect()
}

/// Reference types are interchangeable once fields are merged.
pub(crate) fn relaxed_type(factory: &ItemFactory, ty: TypeRef) -> TypeRef {
    if factory.is_reference_type(ty) {
        factory.object_type
    } else {
        ty
    }
}

/// `proto` with every class of `group` replaced by the group's first class,
/// which is what it looks like once the group is merged.
fn unified_proto(factory: &ItemFactory, group: &MergeGroup, proto: ProtoId) -> ProtoId {
    let Some(&representative) = group.classes().first() else {
        return proto;
    };
    factory.map_proto_types(proto, |ty| {
        let base = factory.base_type(ty);
        if group.contains(base) {
            factory.with_base_type(ty, representative)
        } else {
            ty
        }
    })
}
