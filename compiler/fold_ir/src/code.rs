//! Method bodies: a flat, register-style instruction list.
//!
//! The optimizer only needs to see and rewrite member references, so the IR
//! carries exactly the instructions that mention types, methods, or fields,
//! plus enough scaffolding (arguments, constants, returns) to express
//! synthesized forwarding bodies.

use smallvec::SmallVec;

use crate::{FieldRef, MethodRef, TypeRef};

/// SSA value produced by an instruction.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(transparent)]
pub struct Value(u32);

impl Value {
    #[inline]
    pub const fn new(index: u32) -> Self {
        Value(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Invocation kind, as in `invoke-*` / `invoke*` instructions.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum InvokeKind {
    Virtual,
    Interface,
    Super,
    /// Non-virtual call to a private or initializer method.
    Direct,
    Static,
}

impl InvokeKind {
    pub const ALL: [InvokeKind; 5] = [
        InvokeKind::Virtual,
        InvokeKind::Interface,
        InvokeKind::Super,
        InvokeKind::Direct,
        InvokeKind::Static,
    ];

    pub fn has_receiver(self) -> bool {
        !matches!(self, InvokeKind::Static)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Nullability {
    NotNull,
    MaybeNull,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Instruction {
    Argument {
        dst: Value,
        ty: TypeRef,
        nullability: Nullability,
    },
    ConstNull {
        dst: Value,
    },
    NewInstance {
        dst: Value,
        ty: TypeRef,
    },
    /// `is_interface` is the interface bit of the constant-pool entry. It must
    /// agree with the holder's kind for the call to verify.
    Invoke {
        kind: InvokeKind,
        method: MethodRef,
        is_interface: bool,
        args: SmallVec<[Value; 4]>,
        dst: Option<Value>,
    },
    InstanceGet {
        dst: Value,
        field: FieldRef,
        object: Value,
    },
    InstancePut {
        field: FieldRef,
        object: Value,
        value: Value,
    },
    StaticGet {
        dst: Value,
        field: FieldRef,
    },
    StaticPut {
        field: FieldRef,
        value: Value,
    },
    Return {
        value: Option<Value>,
    },
}

impl Instruction {
    pub fn invoked_method(&self) -> Option<&MethodRef> {
        match self {
            Instruction::Invoke { method, .. } => Some(method),
            _ => None,
        }
    }

    pub fn accessed_field(&self) -> Option<&FieldRef> {
        match self {
            Instruction::InstanceGet { field, .. }
            | Instruction::InstancePut { field, .. }
            | Instruction::StaticGet { field, .. }
            | Instruction::StaticPut { field, .. } => Some(field),
            _ => None,
        }
    }

    pub fn is_static_field_access(&self) -> bool {
        matches!(
            self,
            Instruction::StaticGet { .. } | Instruction::StaticPut { .. }
        )
    }
}

/// A method body.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Code {
    pub instructions: Vec<Instruction>,
    pub value_count: u32,
}

impl Code {
    pub fn invokes(&self) -> impl Iterator<Item = (InvokeKind, &MethodRef)> {
        self.instructions.iter().filter_map(|insn| match insn {
            Instruction::Invoke { kind, method, .. } => Some((*kind, method)),
            _ => None,
        })
    }

    pub fn field_accesses(&self) -> impl Iterator<Item = (&FieldRef, bool)> {
        self.instructions.iter().filter_map(|insn| {
            insn.accessed_field()
                .map(|field| (field, insn.is_static_field_access()))
        })
    }

    /// Pass `count` fresh null constants as trailing arguments to the invoke
    /// at `at`. The constants are inserted right before it.
    pub fn append_null_arguments(&mut self, at: usize, count: usize) {
        if count == 0 {
            return;
        }
        let mut nulls = SmallVec::<[Value; 4]>::new();
        let mut inserted = Vec::with_capacity(count);
        for _ in 0..count {
            let dst = Value::new(self.value_count);
            self.value_count += 1;
            nulls.push(dst);
            inserted.push(Instruction::ConstNull { dst });
        }
        if let Some(Instruction::Invoke { args, .. }) = self.instructions.get_mut(at) {
            args.extend(nulls);
        }
        self.instructions.splice(at..at, inserted);
    }
}

/// Incremental construction of a [`Code`] body.
#[derive(Default)]
pub struct CodeBuilder {
    instructions: Vec<Instruction>,
    next_value: u32,
}

impl CodeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh(&mut self) -> Value {
        let value = Value::new(self.next_value);
        self.next_value += 1;
        value
    }

    pub fn argument(&mut self, ty: TypeRef, nullability: Nullability) -> Value {
        let dst = self.fresh();
        self.instructions.push(Instruction::Argument {
            dst,
            ty,
            nullability,
        });
        dst
    }

    pub fn const_null(&mut self) -> Value {
        let dst = self.fresh();
        self.instructions.push(Instruction::ConstNull { dst });
        dst
    }

    pub fn new_instance(&mut self, ty: TypeRef) -> Value {
        let dst = self.fresh();
        self.instructions.push(Instruction::NewInstance { dst, ty });
        dst
    }

    /// Emit an invoke. A result value is allocated when `has_result` is set.
    pub fn invoke(
        &mut self,
        kind: InvokeKind,
        method: MethodRef,
        is_interface: bool,
        args: &[Value],
        has_result: bool,
    ) -> Option<Value> {
        let dst = has_result.then(|| self.fresh());
        self.instructions.push(Instruction::Invoke {
            kind,
            method,
            is_interface,
            args: args.iter().copied().collect(),
            dst,
        });
        dst
    }

    pub fn instance_get(&mut self, field: FieldRef, object: Value) -> Value {
        let dst = self.fresh();
        self.instructions
            .push(Instruction::InstanceGet { dst, field, object });
        dst
    }

    pub fn instance_put(&mut self, field: FieldRef, object: Value, value: Value) {
        self.instructions.push(Instruction::InstancePut {
            field,
            object,
            value,
        });
    }

    pub fn static_get(&mut self, field: FieldRef) -> Value {
        let dst = self.fresh();
        self.instructions.push(Instruction::StaticGet { dst, field });
        dst
    }

    pub fn static_put(&mut self, field: FieldRef, value: Value) {
        self.instructions.push(Instruction::StaticPut { field, value });
    }

    pub fn return_value(&mut self, value: Value) {
        self.instructions.push(Instruction::Return { value: Some(value) });
    }

    pub fn return_void(&mut self) {
        self.instructions.push(Instruction::Return { value: None });
    }

    pub fn build(self) -> Code {
        Code {
            instructions: self.instructions,
            value_count: self.next_value,
        }
    }
}
