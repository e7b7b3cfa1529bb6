//! Pipeline orchestration.

use std::collections::BTreeSet;

use fold_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use fold_hierarchy::{KeepInfo, ProgramUses};
use fold_ir::{CompilerOptions, GlobalSyntheticsConsumer, ItemFactory, Program, SyntheticItems, TypeRef};
use fold_lens::{LensLayer, RewriteLens};
use fold_merge::{merge_horizontally, ClassMergerMode, MergeKind, MergedClasses, VerticalClassMerger};
use fold_rebind::MemberRebindingAnalysis;

use crate::CompileError;

/// One run of the optimizer over a program.
///
/// ```ignore
/// let output = Compilation::new(&factory, CompilerOptions::whole_program())
///     .with_keep_info(keep)
///     .run(program)?;
/// ```
pub struct Compilation<'a> {
    factory: &'a ItemFactory,
    options: CompilerOptions,
    keep: KeepInfo,
    consumer: Option<&'a mut dyn GlobalSyntheticsConsumer>,
}

/// Everything a compilation produces.
#[derive(Debug)]
pub struct CompilationOutput {
    pub program: Program,
    /// Maps references of the input program to the output program.
    pub lens: RewriteLens,
    pub vertically_merged: MergedClasses,
    /// Both horizontal rounds, as one map.
    pub horizontally_merged: MergedClasses,
    pub synthetics: SyntheticItems,
    /// Warnings; errors end the compilation instead.
    pub diagnostics: Vec<Diagnostic>,
}

/// State threaded through the stages.
struct Pipeline<'a> {
    factory: &'a ItemFactory,
    options: &'a CompilerOptions,
    keep: &'a KeepInfo,
    lens: RewriteLens,
    vertically_merged: MergedClasses,
    horizontally_merged: MergedClasses,
    synthetics: SyntheticItems,
    diagnostics: DiagnosticQueue,
}

impl<'a> Compilation<'a> {
    pub fn new(factory: &'a ItemFactory, options: CompilerOptions) -> Self {
        Compilation {
            factory,
            options,
            keep: KeepInfo::empty(),
            consumer: None,
        }
    }

    #[must_use]
    pub fn with_keep_info(mut self, keep: KeepInfo) -> Self {
        self.keep = keep;
        self
    }

    /// Receiver for synthesized members of an intermediate build.
    #[must_use]
    pub fn with_global_synthetics_consumer(mut self, consumer: &'a mut dyn GlobalSyntheticsConsumer) -> Self {
        self.consumer = Some(consumer);
        self
    }

    pub fn run(self, mut program: Program) -> Result<CompilationOutput, CompileError> {
        let _span = tracing::debug_span!(
            "compilation",
            whole_program = self.options.whole_program,
            classes = program.len()
        )
        .entered();
        check_options(&self.options)?;

        let mut pipeline = Pipeline {
            factory: self.factory,
            options: &self.options,
            keep: &self.keep,
            lens: RewriteLens::Identity,
            vertically_merged: MergedClasses::new(MergeKind::Vertical),
            horizontally_merged: MergedClasses::new(MergeKind::Horizontal),
            synthetics: SyntheticItems::new(self.options.intermediate),
            diagnostics: DiagnosticQueue::new(),
        };
        if self.options.whole_program {
            pipeline.vertical(&mut program)?;
            pipeline.horizontal(&mut program, ClassMergerMode::Initial)?;
            pipeline.rebind(&mut program)?;
            pipeline.horizontal(&mut program, ClassMergerMode::Final)?;
        } else {
            pipeline.horizontal(&mut program, ClassMergerMode::Initial)?;
        }
        pipeline.verify(&program)?;

        let Pipeline {
            lens,
            vertically_merged,
            horizontally_merged,
            synthetics,
            mut diagnostics,
            ..
        } = pipeline;
        {
            let _span = tracing::debug_span!("commit_synthetics", items = synthetics.len()).entered();
            if let Err(diagnostic) = synthetics.commit(&program, self.factory, self.consumer) {
                diagnostics.push(diagnostic);
            }
        }
        if diagnostics.has_errors() {
            return Err(CompileError::Diagnostics(diagnostics.flush()));
        }
        Ok(CompilationOutput {
            program,
            lens,
            vertically_merged,
            horizontally_merged,
            synthetics,
            diagnostics: diagnostics.flush(),
        })
    }
}

/// Stages that need whole-program knowledge cannot run per file.
fn check_options(options: &CompilerOptions) -> Result<(), CompileError> {
    if options.whole_program {
        return Ok(());
    }
    let mut conflicts = Vec::new();
    if options.enable_vertical_class_merging {
        conflicts.push("vertical class merging");
    }
    if options.enable_member_rebinding {
        conflicts.push("member rebinding");
    }
    if conflicts.is_empty() {
        return Ok(());
    }
    Err(CompileError::Diagnostics(vec![Diagnostic::error(ErrorCode::E1002)
        .with_message(format!("{} requires whole-program mode", conflicts.join(" and ")))]))
}

/// One event per merge target, naming the source that stands for its group.
fn log_merge_targets(factory: &ItemFactory, merged: &MergedClasses) {
    let targets: BTreeSet<TypeRef> = merged.entries().into_iter().map(|(_, target)| target).collect();
    for target in targets {
        tracing::debug!(
            kind = ?merged.kind(),
            target = factory.descriptor(target),
            representative = ?merged.representative_for(target).map(|ty| factory.descriptor(ty)),
            sources = merged.sources_for(target).len(),
            "merge target"
        );
    }
}

impl Pipeline<'_> {
    fn vertical(&mut self, program: &mut Program) -> Result<(), CompileError> {
        if !self.options.enable_vertical_class_merging {
            return Ok(());
        }
        let _span = tracing::debug_span!("vertical_class_merging").entered();
        let result =
            VerticalClassMerger::new(self.factory, self.keep, self.options).run(program, &mut self.synthetics)?;
        tracing::debug!(merged = result.merged_classes.len(), "vertical class merging done");
        log_merge_targets(self.factory, &result.merged_classes);
        self.vertically_merged = result.merged_classes;
        self.push_layer(result.layer);
        Ok(())
    }

    fn horizontal(&mut self, program: &mut Program, mode: ClassMergerMode) -> Result<(), CompileError> {
        if !self.options.enable_horizontal_class_merging {
            return Ok(());
        }
        let _span = tracing::debug_span!("horizontal_class_merging", mode = ?mode).entered();
        let result = merge_horizontally(
            program,
            self.factory,
            self.keep,
            self.options,
            &self.vertically_merged,
            mode,
        )?;
        tracing::debug!(merged = result.merged_classes.len(), "horizontal class merging done");
        log_merge_targets(self.factory, &result.merged_classes);
        let merged = result.merged_classes;
        self.vertically_merged = self
            .vertically_merged
            .rewrite_targets(|target| merged.target_for(target))?;
        self.horizontally_merged = self.horizontally_merged.followed_by(&merged)?;
        // Earlier synthetics may have moved into a merge target.
        let layer = result.layer;
        let factory = self.factory;
        self.synthetics
            .rewrite(|method| layer.rewrite_definition(factory, &method));
        self.push_layer(layer);
        Ok(())
    }

    fn rebind(&mut self, program: &mut Program) -> Result<(), CompileError> {
        if !self.options.enable_member_rebinding {
            return Ok(());
        }
        let _span = tracing::debug_span!("member_rebinding").entered();
        let uses = ProgramUses::collect(program, self.options.threads);
        let layer = MemberRebindingAnalysis::new(self.factory, self.options).run(
            program,
            &uses,
            &mut self.synthetics,
            &mut self.diagnostics,
        )?;
        self.push_layer(layer);
        Ok(())
    }

    fn verify(&self, program: &Program) -> Result<(), CompileError> {
        let _span = tracing::debug_span!("verify").entered();
        self.vertically_merged
            .verify_all_sources_pruned(self.factory, program)?;
        self.horizontally_merged
            .verify_all_sources_pruned(self.factory, program)?;
        self.lens.verify_holders(self.factory, program)?;
        Ok(())
    }

    fn push_layer(&mut self, layer: LensLayer) {
        let lens = std::mem::take(&mut self.lens);
        self.lens = lens.compose(layer);
    }
}
