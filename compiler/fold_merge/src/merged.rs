//! Which classes were folded, and into what.

use rustc_hash::FxHashSet;

use fold_diagnostic::{InternalError, InternalResult};
use fold_ir::{ItemFactory, Program, TypeRef};

use crate::bidi::BidirectionalManyToOneMap;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum MergeKind {
    /// Into the unique subtype.
    Vertical,
    /// Into a sibling.
    Horizontal,
}

/// Merged-away source types and their targets.
#[derive(Clone, Debug)]
pub struct MergedClasses {
    kind: MergeKind,
    map: BidirectionalManyToOneMap<TypeRef>,
    interfaces: FxHashSet<TypeRef>,
}

impl MergedClasses {
    pub fn new(kind: MergeKind) -> Self {
        MergedClasses {
            kind,
            map: BidirectionalManyToOneMap::new(),
            interfaces: FxHashSet::default(),
        }
    }

    pub fn kind(&self) -> MergeKind {
        self.kind
    }

    pub fn add(&mut self, source: TypeRef, target: TypeRef, source_is_interface: bool) -> InternalResult<()> {
        self.map.put(source, target)?;
        if source_is_interface {
            self.interfaces.insert(source);
        }
        Ok(())
    }

    pub fn target_for(&self, ty: TypeRef) -> Option<TypeRef> {
        self.map.get(&ty)
    }

    /// Sources of `target`, in type order.
    pub fn sources_for(&self, target: TypeRef) -> Vec<TypeRef> {
        self.map.keys_for(&target).collect()
    }

    /// The source that stands for `target` when an order is needed.
    pub fn representative_for(&self, target: TypeRef) -> Option<TypeRef> {
        self.map.representative(&target)
    }

    pub fn is_merge_source(&self, ty: TypeRef) -> bool {
        self.map.contains_key(&ty)
    }

    pub fn is_merge_target(&self, ty: TypeRef) -> bool {
        self.map.contains_value(&ty)
    }

    /// Folded into its unique subtype by vertical merging.
    pub fn has_been_merged_into_subtype(&self, ty: TypeRef) -> bool {
        self.kind == MergeKind::Vertical && self.is_merge_source(ty)
    }

    /// Merged-away interfaces, sorted.
    pub fn merged_interfaces(&self) -> Vec<TypeRef> {
        let mut interfaces: Vec<_> = self.interfaces.iter().copied().collect();
        interfaces.sort_unstable();
        interfaces
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// `(source, target)` pairs sorted by source.
    pub fn entries(&self) -> Vec<(TypeRef, TypeRef)> {
        self.map.entries()
    }

    /// Drop every entry whose target is no longer in `program`.
    pub fn prune(&mut self, program: &Program) {
        for target in self.map.values() {
            if !program.contains(target) {
                for source in self.map.remove_value(&target) {
                    self.interfaces.remove(&source);
                }
            }
        }
    }

    /// A fresh map with every target passed through `next`, for when a later
    /// pass folds a target away.
    pub fn rewrite_targets(&self, next: impl Fn(TypeRef) -> Option<TypeRef>) -> InternalResult<MergedClasses> {
        let mut rewritten = MergedClasses::new(self.kind);
        for (source, target) in self.entries() {
            let target = next(target).unwrap_or(target);
            rewritten.add(source, target, self.interfaces.contains(&source))?;
        }
        for target in self.map.values() {
            let Some(representative) = self.map.representative(&target) else {
                continue;
            };
            let target = next(target).unwrap_or(target);
            if rewritten.map.representative(&target) != Some(representative) {
                rewritten.map.set_representative(target, representative)?;
            }
        }
        Ok(rewritten)
    }

    /// `self` followed by `later`, as one map of the same kind.
    pub fn followed_by(&self, later: &MergedClasses) -> InternalResult<MergedClasses> {
        let mut combined = self.rewrite_targets(|target| later.target_for(target))?;
        for (source, target) in later.entries() {
            combined.add(source, target, later.interfaces.contains(&source))?;
        }
        Ok(combined)
    }

    /// Every source is gone from `program`, and no class left there still
    /// implements a merged-away interface.
    pub fn verify_all_sources_pruned(&self, factory: &ItemFactory, program: &Program) -> InternalResult<()> {
        for (source, _) in self.entries() {
            if program.contains(source) {
                return Err(InternalError::new(format!(
                    "merged class `{}` is still in the program",
                    factory.type_to_source(source)
                ))
                .at(factory.descriptor(source)));
            }
        }
        let interfaces = self.merged_interfaces();
        for class in program.program_classes() {
            if let Some(stale) = class.interfaces.iter().find(|ty| interfaces.binary_search(ty).is_ok()) {
                return Err(InternalError::new(format!(
                    "`{}` still implements merged interface `{}`",
                    factory.type_to_source(class.ty),
                    factory.type_to_source(*stale)
                ))
                .at(factory.descriptor(class.ty)));
            }
        }
        Ok(())
    }
}
