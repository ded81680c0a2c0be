//! IR data model.
//!
//! Instructions live in per-block vectors and values refer to
//! instruction results by `(block id, instruction index)`, so references
//! stay valid when block or instruction vectors grow. Basic blocks are
//! addressed by [`BlockId`] everywhere; ids are assigned in creation
//! order and never move.

use crate::string_interning::StringId;
use rustc_hash::FxHashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum IrTypeKind {
    Void,
    Bool,
    S8,
    U8,
    S16,
    U16,
    S32,
    U32,
    S64,
    U64,
    Usize,
    F32,
    F64,
    /// An untyped pointer (`ptr`, c-strings)
    RawPtr,
    Pointer(TypeId),
    FixedArray {
        element: TypeId,
        length: u64,
    },
    FuncPointer,
    /// A named composite; layout is resolved by the back-end
    Structure(StringId),
}

/// Interns IR types so equal shapes share one id.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    kinds: Vec<IrTypeKind>,
    interner: FxHashMap<IrTypeKind, TypeId>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        TypeRegistry::default()
    }

    pub fn register(&mut self, kind: IrTypeKind) -> TypeId {
        if let Some(&existing) = self.interner.get(&kind) {
            return existing;
        }

        let id = TypeId(self.kinds.len() as u32);
        self.kinds.push(kind.clone());
        self.interner.insert(kind, id);
        id
    }

    pub fn kind(&self, id: TypeId) -> &IrTypeKind {
        &self.kinds[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum IrLiteral {
    Bool(bool),
    Usize(u64),
    S64(i64),
    F64(f64),
    CStr(Box<str>),
    NullPointer,
    /// A static struct value
    Struct {
        values: Vec<IrValue>,
        is_mutable: bool,
    },
    /// A static array value
    Array(Vec<IrValue>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum IrValue {
    Literal {
        literal: IrLiteral,
        ir_type: TypeId,
    },
    /// The result slot of an already-emitted instruction
    Result {
        block: BlockId,
        instruction: u32,
        ir_type: TypeId,
    },
    /// An incoming function parameter
    Argument {
        index: u32,
        ir_type: TypeId,
    },
    /// An anonymous module-level global
    AnonGlobal {
        id: usize,
        ir_type: TypeId,
    },
}

impl IrValue {
    pub fn ir_type(&self) -> TypeId {
        match self {
            IrValue::Literal { ir_type, .. }
            | IrValue::Result { ir_type, .. }
            | IrValue::Argument { ir_type, .. }
            | IrValue::AnonGlobal { ir_type, .. } => *ir_type,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulus,
    BitAnd,
    BitOr,
    BitXor,
    LShift,
    RShift,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Equals,
    NotEquals,
    LessThan,
    GreaterThan,
    LessThanOrEq,
    GreaterThanOrEq,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IrUnaryOp {
    Negate,
    Not,
    BitComplement,
}

#[derive(Clone, Debug, PartialEq)]
pub enum InstructionKind {
    /// Address of a local variable slot
    VarPtr { variable_id: usize },
    /// Address of a module global
    GlobalVarPtr { global_id: usize },
    Load {
        value: IrValue,
    },
    Store {
        value: IrValue,
        destination: IrValue,
    },
    /// Address of a named field behind a composite pointer
    MemberPtr {
        base: IrValue,
        field: StringId,
    },
    /// Unconditional jump
    Break { target: BlockId },
    ConditionalBreak {
        condition: IrValue,
        true_target: BlockId,
        false_target: BlockId,
    },
    Call {
        name: StringId,
        args: Vec<IrValue>,
    },
    Arithmetic {
        op: ArithmeticOp,
        left: IrValue,
        right: IrValue,
    },
    Compare {
        op: CompareOp,
        left: IrValue,
        right: IrValue,
    },
    Unary {
        op: IrUnaryOp,
        value: IrValue,
    },
    Phi {
        incoming: Vec<(BlockId, IrValue)>,
    },
    Return {
        value: Option<IrValue>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    pub kind: InstructionKind,
    /// Type of the value this instruction produces; Void-typed
    /// instructions produce none
    pub result_type: TypeId,
}

#[derive(Clone, Debug)]
pub struct BasicBlock {
    pub id: BlockId,
    pub instructions: Vec<Instruction>,
}

impl BasicBlock {
    pub fn new(id: BlockId) -> Self {
        Self {
            id,
            instructions: Vec::new(),
        }
    }

    pub fn is_terminated(&self) -> bool {
        matches!(
            self.instructions.last().map(|instruction| &instruction.kind),
            Some(
                InstructionKind::Break { .. }
                    | InstructionKind::ConditionalBreak { .. }
                    | InstructionKind::Return { .. }
            )
        )
    }
}

#[derive(Clone, Debug)]
pub struct IrFunction {
    pub name: StringId,
    pub basicblocks: Vec<BasicBlock>,
    pub return_type: TypeId,
    pub variable_count: usize,
    pub export_name: Option<StringId>,
    pub is_entry: bool,
}

#[derive(Clone, Debug)]
pub struct AnonGlobal {
    pub ir_type: TypeId,
    pub is_constant: bool,
    pub initializer: Option<IrValue>,
}

#[derive(Debug, Default)]
pub struct IrModule {
    pub funcs: Vec<IrFunction>,
    pub anon_globals: Vec<AnonGlobal>,
    pub types: TypeRegistry,
}

impl IrModule {
    pub fn new() -> Self {
        IrModule::default()
    }

    /// Build a static struct value from already-built member values.
    pub fn build_static_struct(
        &mut self,
        ir_type: TypeId,
        values: Vec<IrValue>,
        make_mutable: bool,
    ) -> IrValue {
        IrValue::Literal {
            literal: IrLiteral::Struct {
                values,
                is_mutable: make_mutable,
            },
            ir_type,
        }
    }

    /// Build a static array value from already-built element values.
    pub fn build_static_array(&mut self, ir_type: TypeId, values: Vec<IrValue>) -> IrValue {
        IrValue::Literal {
            literal: IrLiteral::Array(values),
            ir_type,
        }
    }

    /// Allocate an anonymous module global and return a stable
    /// reference to it.
    pub fn build_anon_global(&mut self, ir_type: TypeId, is_constant: bool) -> IrValue {
        let id = self.anon_globals.len();
        self.anon_globals.push(AnonGlobal {
            ir_type,
            is_constant,
            initializer: None,
        });

        IrValue::AnonGlobal { id, ir_type }
    }

    /// Register the initializer of an anonymous global built earlier.
    pub fn build_anon_global_initializer(&mut self, anon_global: &IrValue, initializer: IrValue) {
        if let IrValue::AnonGlobal { id, .. } = anon_global {
            self.anon_globals[*id].initializer = Some(initializer);
        }
    }
}
