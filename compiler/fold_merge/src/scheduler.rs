//! Which policies run, in which order.

use fold_hierarchy::{AppInfo, InstantiationInfo, KeepInfo};
use fold_ir::{ClassDef, CompilerOptions};

use crate::policies::{
    FinalizeMergeGroup, NoInstanceFields, NoInstanceInitializerMerging, NoKeepRules,
    NoMethodCollisions, NoVerticallyMergedClasses, OnlyProgramClasses, SameInstanceFields,
    SameInstantiation, SamePackage, SameParentClass,
};
use crate::{MergeGroup, MergedClasses, Policy};

/// Round of horizontal merging.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ClassMergerMode {
    /// Before member rebinding. Constructors may gain padding parameters.
    Initial,
    /// After member rebinding. Only renaming is allowed.
    Final,
}

/// Everything the policies consult.
pub struct PolicyContext<'a, 'p> {
    pub app: &'a AppInfo<'p>,
    pub keep: &'a KeepInfo,
    pub instantiation: &'a InstantiationInfo,
    pub options: &'a CompilerOptions,
    pub vertically_merged: &'a MergedClasses,
}

pub struct PolicyScheduler;

impl PolicyScheduler {
    pub fn horizontal_policies<'a>(
        context: &PolicyContext<'a, '_>,
        mode: ClassMergerMode,
    ) -> Vec<Policy<'a>> {
        let app = context.app;
        let factory = app.factory();
        let whole_program = context.options.whole_program;
        let mut policies: Vec<Policy<'a>> = vec![
            Policy::Single(Box::new(OnlyProgramClasses)),
            Policy::Single(Box::new(NoKeepRules::new(app, context.keep, context.options))),
        ];
        if whole_program {
            if mode == ClassMergerMode::Initial {
                policies.push(Policy::Single(Box::new(NoVerticallyMergedClasses::new(
                    context.vertically_merged,
                ))));
            }
            policies.push(Policy::Multi(Box::new(SameInstantiation::new(
                context.instantiation,
            ))));
        } else {
            policies.push(Policy::Single(Box::new(NoInstanceFields)));
        }
        policies.push(Policy::Multi(Box::new(SameParentClass::new(app))));
        policies.push(Policy::Multi(Box::new(SamePackage::new(factory))));
        if whole_program {
            policies.push(Policy::Multi(Box::new(SameInstanceFields::new(app))));
        }
        policies.push(Policy::Multi(Box::new(NoMethodCollisions::new(app))));
        if whole_program && mode == ClassMergerMode::Final {
            policies.push(Policy::Multi(Box::new(NoInstanceInitializerMerging::new(app))));
        }
        policies.push(Policy::Multi(Box::new(FinalizeMergeGroup::new(
            app,
            mode,
            whole_program,
        ))));
        policies
    }

    /// One group of all program classes and one of all program interfaces,
    /// each sorted by descriptor.
    pub fn initial_groups(app: &AppInfo<'_>) -> Vec<MergeGroup> {
        let factory = app.factory();
        let mut classes: Vec<&ClassDef> = app.program().program_classes().collect();
        classes.sort_by_key(|class| factory.descriptor(class.ty));
        let (interfaces, classes): (Vec<&ClassDef>, Vec<&ClassDef>) =
            classes.into_iter().partition(|class| class.is_interface());
        vec![
            MergeGroup::new(classes.iter().map(|c| c.ty).collect(), false),
            MergeGroup::new(interfaces.iter().map(|c| c.ty).collect(), true),
        ]
    }
}
