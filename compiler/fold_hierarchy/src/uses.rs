//! Whole-program use-site collection.
//!
//! One parallel pass over every program method records, per invoke kind and
//! per field access kind, which methods use which reference. The concurrent
//! accumulators are frozen into ordered maps before anything reads them, so
//! every later stage iterates uses in the same order on every run.

use std::collections::{BTreeMap, BTreeSet};
use std::hash::Hash;

use dashmap::{DashMap, DashSet};
use rayon::prelude::*;

use fold_ir::{ClassDef, FieldRef, Instruction, InvokeKind, MethodRef, Program, TypeRef};

/// Methods that use a reference.
pub type ContextSet = BTreeSet<MethodRef>;

#[derive(Clone, Default, Debug)]
pub struct ProgramUses {
    invokes: [BTreeMap<MethodRef, ContextSet>; 5],
    instance_field_reads: BTreeMap<FieldRef, ContextSet>,
    instance_field_writes: BTreeMap<FieldRef, ContextSet>,
    static_field_reads: BTreeMap<FieldRef, ContextSet>,
    static_field_writes: BTreeMap<FieldRef, ContextSet>,
    instantiated: BTreeSet<TypeRef>,
}

fn kind_index(kind: InvokeKind) -> usize {
    match kind {
        InvokeKind::Virtual => 0,
        InvokeKind::Interface => 1,
        InvokeKind::Super => 2,
        InvokeKind::Direct => 3,
        InvokeKind::Static => 4,
    }
}

#[derive(Default)]
struct ConcurrentUses {
    invokes: [DashMap<MethodRef, DashSet<MethodRef>>; 5],
    instance_field_reads: DashMap<FieldRef, DashSet<MethodRef>>,
    instance_field_writes: DashMap<FieldRef, DashSet<MethodRef>>,
    static_field_reads: DashMap<FieldRef, DashSet<MethodRef>>,
    static_field_writes: DashMap<FieldRef, DashSet<MethodRef>>,
    instantiated: DashSet<TypeRef>,
}

impl ConcurrentUses {
    fn scan_class(&self, class: &ClassDef) {
        for method in &class.methods {
            let Some(code) = &method.code else {
                continue;
            };
            let context = method.reference;
            for insn in &code.instructions {
                match insn {
                    Instruction::Invoke { kind, method, .. } => {
                        self.invokes[kind_index(*kind)]
                            .entry(*method)
                            .or_default()
                            .insert(context);
                    }
                    Instruction::InstanceGet { field, .. } => {
                        self.instance_field_reads.entry(*field).or_default().insert(context);
                    }
                    Instruction::InstancePut { field, .. } => {
                        self.instance_field_writes.entry(*field).or_default().insert(context);
                    }
                    Instruction::StaticGet { field, .. } => {
                        self.static_field_reads.entry(*field).or_default().insert(context);
                    }
                    Instruction::StaticPut { field, .. } => {
                        self.static_field_writes.entry(*field).or_default().insert(context);
                    }
                    Instruction::NewInstance { ty, .. } => {
                        self.instantiated.insert(*ty);
                    }
                    Instruction::Argument { .. }
                    | Instruction::ConstNull { .. }
                    | Instruction::Return { .. } => {}
                }
            }
        }
    }

    fn freeze(self) -> ProgramUses {
        let [virtual_, interface, super_, direct, static_] = self.invokes;
        ProgramUses {
            invokes: [
                freeze_map(virtual_),
                freeze_map(interface),
                freeze_map(super_),
                freeze_map(direct),
                freeze_map(static_),
            ],
            instance_field_reads: freeze_map(self.instance_field_reads),
            instance_field_writes: freeze_map(self.instance_field_writes),
            static_field_reads: freeze_map(self.static_field_reads),
            static_field_writes: freeze_map(self.static_field_writes),
            instantiated: self.instantiated.into_iter().collect(),
        }
    }
}

fn freeze_map<K: Ord + Eq + Hash>(map: DashMap<K, DashSet<MethodRef>>) -> BTreeMap<K, ContextSet> {
    map.into_iter()
        .map(|(key, contexts)| (key, contexts.into_iter().collect()))
        .collect()
}

impl ProgramUses {
    /// Scan every program method. `threads` sizes a scoped worker pool;
    /// `None` uses the global pool.
    pub fn collect(program: &Program, threads: Option<usize>) -> Self {
        let classes: Vec<&ClassDef> = program.program_classes().collect();
        let acc = ConcurrentUses::default();
        let scan = || classes.par_iter().for_each(|class| acc.scan_class(class));

        match threads {
            Some(threads) => {
                let pooled = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build_scoped(rayon::ThreadBuilder::run, |pool| pool.install(scan));
                if let Err(e) = pooled {
                    tracing::warn!("failed to create thread pool ({e}), scanning sequentially");
                    for class in &classes {
                        acc.scan_class(class);
                    }
                }
            }
            None => scan(),
        }

        let uses = acc.freeze();
        tracing::debug!(
            classes = classes.len(),
            virtual_invokes = uses.invokes(InvokeKind::Virtual).len(),
            interface_invokes = uses.invokes(InvokeKind::Interface).len(),
            super_invokes = uses.invokes(InvokeKind::Super).len(),
            instantiated = uses.instantiated.len(),
            "collected program uses"
        );
        uses
    }

    pub fn invokes(&self, kind: InvokeKind) -> &BTreeMap<MethodRef, ContextSet> {
        &self.invokes[kind_index(kind)]
    }

    pub fn instance_field_reads(&self) -> &BTreeMap<FieldRef, ContextSet> {
        &self.instance_field_reads
    }

    pub fn instance_field_writes(&self) -> &BTreeMap<FieldRef, ContextSet> {
        &self.instance_field_writes
    }

    pub fn static_field_reads(&self) -> &BTreeMap<FieldRef, ContextSet> {
        &self.static_field_reads
    }

    pub fn static_field_writes(&self) -> &BTreeMap<FieldRef, ContextSet> {
        &self.static_field_writes
    }

    /// Reads and writes of static (or instance) fields, contexts unioned.
    pub fn field_accesses(&self, is_static: bool) -> BTreeMap<FieldRef, ContextSet> {
        let (reads, writes) = if is_static {
            (&self.static_field_reads, &self.static_field_writes)
        } else {
            (&self.instance_field_reads, &self.instance_field_writes)
        };
        let mut merged = reads.clone();
        for (field, contexts) in writes {
            merged.entry(*field).or_default().extend(contexts.iter().copied());
        }
        merged
    }

    pub fn instantiated_types(&self) -> impl Iterator<Item = TypeRef> + '_ {
        self.instantiated.iter().copied()
    }
}
