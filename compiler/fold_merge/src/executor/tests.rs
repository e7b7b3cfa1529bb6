use std::collections::BTreeMap;

use super::*;
use fold_diagnostic::InternalResult;
use fold_ir::{ClassDef, ItemFactory, Program, ProgramBuilder, TypeRef};
use pretty_assertions::assert_eq;

use crate::{MultiClassPolicy, SingleClassPolicy};

fn three_classes(factory: &ItemFactory) -> Program {
    let mut b = ProgramBuilder::new(factory);
    b.class("p.A").finish();
    b.class("p.B").finish();
    b.class("p.C").finish();
    b.build().unwrap()
}

struct Reject(TypeRef);

impl SingleClassPolicy for Reject {
    fn name(&self) -> &'static str {
        "Reject"
    }

    fn can_merge(&self, class: &ClassDef) -> bool {
        class.ty != self.0
    }
}

/// Finalizes every group with its first class as target.
struct Finalize<'f>(&'f ItemFactory);

impl MultiClassPolicy for Finalize<'_> {
    fn name(&self) -> &'static str {
        "Finalize"
    }

    fn apply(&mut self, mut group: MergeGroup) -> InternalResult<Vec<MergeGroup>> {
        let target = group.classes()[0];
        group.set_target(target, self.0)?;
        group.finalize(BTreeMap::new())?;
        Ok(vec![group])
    }
}

/// Splits every group into singletons.
struct Shatter;

impl MultiClassPolicy for Shatter {
    fn name(&self) -> &'static str {
        "Shatter"
    }

    fn apply(&mut self, group: MergeGroup) -> InternalResult<Vec<MergeGroup>> {
        Ok(group
            .classes()
            .iter()
            .map(|ty| MergeGroup::split_from(&group, vec![*ty]))
            .collect())
    }
}

struct Skipped;

impl MultiClassPolicy for Skipped {
    fn name(&self) -> &'static str {
        "Skipped"
    }

    fn apply(&mut self, _group: MergeGroup) -> InternalResult<Vec<MergeGroup>> {
        Ok(Vec::new())
    }

    fn should_skip(&self, _groups: &[MergeGroup]) -> bool {
        true
    }
}

#[test]
fn test_single_policy_filters_members() {
    let factory = ItemFactory::new();
    let program = three_classes(&factory);
    let app = AppInfo::new(&program, &factory);
    let [a, b, c] = ["p.A", "p.B", "p.C"].map(|n| factory.class_type(n));

    let groups = PolicyExecutor::new(&app)
        .run(
            vec![MergeGroup::new(vec![a, b, c], false)],
            vec![
                Policy::Single(Box::new(Reject(a))),
                Policy::Multi(Box::new(Finalize(&factory))),
            ],
        )
        .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].target(), b);
    assert_eq!(groups[0].sources(), &[c]);
}

#[test]
fn test_trivial_groups_are_dropped() {
    let factory = ItemFactory::new();
    let program = three_classes(&factory);
    let app = AppInfo::new(&program, &factory);
    let [a, b, c] = ["p.A", "p.B", "p.C"].map(|n| factory.class_type(n));

    let groups = PolicyExecutor::new(&app)
        .run(
            vec![MergeGroup::new(vec![a, b, c], false), MergeGroup::new(vec![a], false)],
            vec![
                Policy::Multi(Box::new(Shatter)),
                // Never reached: nothing survives the split.
                Policy::Multi(Box::new(Finalize(&factory))),
            ],
        )
        .unwrap();
    assert!(groups.is_empty());
}

#[test]
fn test_skipped_policy_leaves_groups_alone() {
    let factory = ItemFactory::new();
    let program = three_classes(&factory);
    let app = AppInfo::new(&program, &factory);
    let [a, b] = ["p.A", "p.B"].map(|n| factory.class_type(n));

    let groups = PolicyExecutor::new(&app)
        .run(
            vec![MergeGroup::new(vec![a, b], false)],
            vec![
                Policy::Multi(Box::new(Skipped)),
                Policy::Multi(Box::new(Finalize(&factory))),
            ],
        )
        .unwrap();
    assert_eq!(groups.len(), 1);
}

#[test]
fn test_unfinalized_output_is_internal_error() {
    let factory = ItemFactory::new();
    let program = three_classes(&factory);
    let app = AppInfo::new(&program, &factory);
    let [a, b] = ["p.A", "p.B"].map(|n| factory.class_type(n));

    let result = PolicyExecutor::new(&app).run(
        vec![MergeGroup::new(vec![a, b], false)],
        vec![Policy::Single(Box::new(Reject(factory.object_type)))],
    );
    assert!(result.is_err());
}
