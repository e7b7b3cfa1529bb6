//! Registry of members synthesized by the optimizer.

use fold_diagnostic::{Diagnostic, ErrorCode};

use crate::{ItemFactory, MethodRef, Program};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SyntheticKind {
    /// Forwards an inherited signature to a method moved down by vertical merging.
    VerticalMergeBridge,
    /// Re-exposes a default method on a class so `super` calls name an
    /// immediate supertype.
    InterfaceSuperBridge,
    /// Re-exposes a member through a holder visible to every caller.
    VisibilityBridge,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SyntheticMethod {
    pub kind: SyntheticKind,
    pub method: MethodRef,
}

/// Receives global synthetics in intermediate builds.
pub trait GlobalSyntheticsConsumer {
    fn accept(&mut self, item: &SyntheticMethod, program: &Program);

    fn finished(&mut self) {}
}

/// Consumer that keeps everything it is given.
#[derive(Default, Debug)]
pub struct CollectingSyntheticsConsumer {
    pub accepted: Vec<SyntheticMethod>,
    pub finished: bool,
}

impl GlobalSyntheticsConsumer for CollectingSyntheticsConsumer {
    fn accept(&mut self, item: &SyntheticMethod, _program: &Program) {
        self.accepted.push(*item);
    }

    fn finished(&mut self) {
        self.finished = true;
    }
}

#[derive(Clone, Default, Debug)]
pub struct SyntheticItems {
    items: Vec<SyntheticMethod>,
    global: bool,
}

impl SyntheticItems {
    /// `global` is set for intermediate builds.
    pub fn new(global: bool) -> Self {
        SyntheticItems {
            items: Vec::new(),
            global,
        }
    }

    pub fn record(&mut self, kind: SyntheticKind, method: MethodRef) {
        tracing::trace!(?kind, ?method, "recorded synthetic");
        self.items.push(SyntheticMethod { kind, method });
    }

    pub fn is_global(&self) -> bool {
        self.global
    }

    pub fn items(&self) -> &[SyntheticMethod] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn count(&self, kind: SyntheticKind) -> usize {
        self.items.iter().filter(|i| i.kind == kind).count()
    }

    /// Rewrite recorded references after a later stage renamed them.
    pub fn rewrite(&mut self, mut f: impl FnMut(MethodRef) -> MethodRef) {
        for item in &mut self.items {
            item.method = f(item.method);
        }
    }

    /// Hand global synthetics to `consumer`. Returns the number delivered.
    ///
    /// Global synthetics without a consumer would be silently lost, so that
    /// case is an `E1001` error.
    pub fn commit(
        &self,
        program: &Program,
        factory: &ItemFactory,
        consumer: Option<&mut dyn GlobalSyntheticsConsumer>,
    ) -> Result<usize, Diagnostic> {
        if !self.global || self.items.is_empty() {
            return Ok(0);
        }
        let Some(consumer) = consumer else {
            let mut diag = Diagnostic::error(ErrorCode::E1001).with_message(format!(
                "{} global synthetic member(s) produced but no global synthetics consumer is configured",
                self.items.len()
            ));
            if let Some(first) = self.items.first() {
                diag = diag.with_note(format!(
                    "first synthetic: `{}`",
                    factory.method_to_string(&first.method)
                ));
            }
            return Err(diag);
        };
        for item in &self.items {
            consumer.accept(item, program);
        }
        consumer.finished();
        Ok(self.items.len())
    }
}
