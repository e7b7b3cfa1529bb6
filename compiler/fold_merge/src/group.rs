//! Merge groups.
//!
//! A [`MergeGroup`] is what the policies work on. Only a group that has a
//! target inside it and a computed field map can become a
//! [`FinalizedMergeGroup`], which is the only shape the mergers accept.

use std::collections::BTreeMap;

use fold_diagnostic::{InternalError, InternalResult};
use fold_ir::{FieldRef, ItemFactory, TypeRef};

/// Candidate classes for one horizontal merge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeGroup {
    classes: Vec<TypeRef>,
    target: Option<TypeRef>,
    instance_field_map: BTreeMap<FieldRef, FieldRef>,
    is_interface_group: bool,
    finalized: bool,
}

impl MergeGroup {
    pub fn new(classes: Vec<TypeRef>, is_interface_group: bool) -> Self {
        MergeGroup {
            classes,
            target: None,
            instance_field_map: BTreeMap::new(),
            is_interface_group,
            finalized: false,
        }
    }

    /// A group holding `classes` that inherits the metadata of `parent`.
    ///
    /// The parent's target carries over only if it is one of `classes`.
    pub fn split_from(parent: &MergeGroup, classes: Vec<TypeRef>) -> Self {
        let mut group = MergeGroup::new(classes, parent.is_interface_group);
        if let Some(target) = parent.target.filter(|t| group.contains(*t)) {
            group.target = Some(target);
        }
        group
    }

    pub fn classes(&self) -> &[TypeRef] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Fewer than two classes: nothing to merge.
    pub fn is_trivial(&self) -> bool {
        self.classes.len() < 2
    }

    pub fn contains(&self, ty: TypeRef) -> bool {
        self.classes.contains(&ty)
    }

    pub fn retain(&mut self, keep: impl FnMut(&TypeRef) -> bool) {
        self.classes.retain(keep);
        if self.target.is_some_and(|t| !self.classes.contains(&t)) {
            self.target = None;
            self.finalized = false;
        }
    }

    pub fn is_interface_group(&self) -> bool {
        self.is_interface_group
    }

    pub fn target(&self) -> Option<TypeRef> {
        self.target
    }

    pub fn set_target(&mut self, target: TypeRef, factory: &ItemFactory) -> InternalResult<()> {
        if !self.contains(target) {
            return Err(InternalError::new("merge target is not a member of its group")
                .at(factory.descriptor(target)));
        }
        self.target = Some(target);
        Ok(())
    }

    pub fn instance_field_map(&self) -> &BTreeMap<FieldRef, FieldRef> {
        &self.instance_field_map
    }

    /// Record the field map and mark the group finalized. Requires a target.
    pub fn finalize(&mut self, instance_field_map: BTreeMap<FieldRef, FieldRef>) -> InternalResult<()> {
        if self.target.is_none() {
            return Err(InternalError::new("finalizing a merge group without a target"));
        }
        self.instance_field_map = instance_field_map;
        self.finalized = true;
        Ok(())
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}

/// A group ready to be merged: `target` is one of the group's classes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinalizedMergeGroup {
    target: TypeRef,
    sources: Vec<TypeRef>,
    instance_field_map: BTreeMap<FieldRef, FieldRef>,
    is_interface_group: bool,
}

impl FinalizedMergeGroup {
    pub fn target(&self) -> TypeRef {
        self.target
    }

    /// The group's classes other than the target, in group order.
    pub fn sources(&self) -> &[TypeRef] {
        &self.sources
    }

    /// Source and target instance fields to the field each becomes.
    pub fn instance_field_map(&self) -> &BTreeMap<FieldRef, FieldRef> {
        &self.instance_field_map
    }

    pub fn is_interface_group(&self) -> bool {
        self.is_interface_group
    }
}

impl TryFrom<MergeGroup> for FinalizedMergeGroup {
    type Error = InternalError;

    fn try_from(group: MergeGroup) -> InternalResult<Self> {
        if !group.finalized {
            return Err(InternalError::new("merge group left the pipeline unfinalized"));
        }
        let Some(target) = group.target.filter(|t| group.classes.contains(t)) else {
            return Err(InternalError::new("finalized merge group has no member target"));
        };
        let sources = group.classes.into_iter().filter(|c| *c != target).collect();
        Ok(FinalizedMergeGroup {
            target,
            sources,
            instance_field_map: group.instance_field_map,
            is_interface_group: group.is_interface_group,
        })
    }
}
