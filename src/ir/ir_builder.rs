//! The IR builder.
//!
//! Holds the per-function building state: the basic-block list, the
//! current block cursor, the labeled loop stack, the bridge variable
//! scopes, and the shared-type memos. Blocks are always addressed by id;
//! `build_basicblock` may grow the block vector, so holding anything
//! else across it would be wrong by construction.

use crate::ast::ast::{Ast, FunctionTraits};
use crate::ast::ast_types::{AstType, TypeElement};
use crate::diagnostics::compiler_errors::CompilerError;
use crate::ir::bridge::{BridgeScopeTree, BridgeVariable, BridgeVariableTraits};
use crate::ir::ir_nodes::{
    BasicBlock, BlockId, Instruction, InstructionKind, IrLiteral, IrModule, IrTypeKind, IrValue,
    TypeId,
};
use crate::ir::sf_cache::{SpecialFunctionCache, Trilean};
use crate::string_interning::{StringId, StringTable};
use crate::tokens::tokens::SourceLocation;

/// One entry of the loop stack: where `break` and `continue` land while
/// the loop's body is being lowered.
#[derive(Clone, Copy, Debug)]
pub struct LoopLabel {
    pub label: Option<StringId>,
    pub break_block_id: Option<BlockId>,
    pub continue_block_id: Option<BlockId>,
}

pub struct IrBuilder<'a> {
    pub basicblocks: Vec<BasicBlock>,
    pub current_block_id: BlockId,

    block_stack: Vec<LoopLabel>,

    pub module: &'a mut IrModule,
    pub ast: &'a Ast,
    pub string_table: &'a mut StringTable,
    pub sf_cache: &'a mut SpecialFunctionCache,

    pub var_scopes: BridgeScopeTree,
    pub next_var_id: usize,

    // Shared-type memos; repeated accessors hand back the same id
    shared_funcptr: Option<TypeId>,
    shared_usize: Option<TypeId>,
    shared_usize_ptr: Option<TypeId>,
    shared_bool: Option<TypeId>,
}

impl<'a> IrBuilder<'a> {
    pub fn new(
        module: &'a mut IrModule,
        ast: &'a Ast,
        string_table: &'a mut StringTable,
        sf_cache: &'a mut SpecialFunctionCache,
    ) -> Self {
        let mut builder = Self {
            basicblocks: Vec::new(),
            current_block_id: BlockId(0),
            block_stack: Vec::new(),
            module,
            ast,
            string_table,
            sf_cache,
            var_scopes: BridgeScopeTree::new(),
            next_var_id: 0,
            shared_funcptr: None,
            shared_usize: None,
            shared_usize_ptr: None,
            shared_bool: None,
        };

        // Block 0 is the function entry
        let entry = builder.build_basicblock();
        builder.use_basicblock(entry);
        builder
    }

    // ---------------
    // Block plumbing
    // ---------------

    /// Append a new basic block and return its id. Ids are assigned in
    /// creation order.
    pub fn build_basicblock(&mut self) -> BlockId {
        let id = BlockId(self.basicblocks.len() as u32);
        self.basicblocks.push(BasicBlock::new(id));
        id
    }

    /// Point instruction emission at an existing block.
    pub fn use_basicblock(&mut self, id: BlockId) {
        self.current_block_id = id;
    }

    pub fn current_block(&self) -> &BasicBlock {
        &self.basicblocks[self.current_block_id.0 as usize]
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.basicblocks[id.0 as usize]
    }

    /// Append an instruction to the current block.
    pub fn push_instruction(&mut self, kind: InstructionKind, result_type: TypeId) {
        self.basicblocks[self.current_block_id.0 as usize]
            .instructions
            .push(Instruction { kind, result_type });
    }

    /// A value referencing the result slot of the instruction emitted
    /// last into the current block.
    pub fn value_from_prev_instruction(&mut self) -> IrValue {
        let block = &self.basicblocks[self.current_block_id.0 as usize];
        let instruction = block.instructions.len() - 1;

        IrValue::Result {
            block: self.current_block_id,
            instruction: instruction as u32,
            ir_type: block.instructions[instruction].result_type,
        }
    }

    // ----------------------
    // Instruction builders
    // ----------------------

    pub fn build_varptr(&mut self, ptr_type: TypeId, variable_id: usize) -> IrValue {
        self.push_instruction(InstructionKind::VarPtr { variable_id }, ptr_type);
        self.value_from_prev_instruction()
    }

    pub fn build_gvarptr(&mut self, ptr_type: TypeId, global_id: usize) -> IrValue {
        self.push_instruction(InstructionKind::GlobalVarPtr { global_id }, ptr_type);
        self.value_from_prev_instruction()
    }

    /// Load through a pointer value.
    pub fn build_load(&mut self, value: IrValue) -> Result<IrValue, CompilerError> {
        let pointee = match self.module.types.kind(value.ir_type()) {
            IrTypeKind::Pointer(inner) => Some(*inner),
            IrTypeKind::RawPtr => None,
            _ => {
                return Err(CompilerError::new_internal_error(
                    "Cannot load through a non-pointer value",
                    SourceLocation::NONE,
                ));
            }
        };

        let result_type = match pointee {
            Some(inner) => inner,
            // Loads through untyped pointers stay untyped
            None => self.module.types.register(IrTypeKind::RawPtr),
        };

        self.push_instruction(InstructionKind::Load { value }, result_type);
        Ok(self.value_from_prev_instruction())
    }

    pub fn build_store(&mut self, value: IrValue, destination: IrValue) {
        let void = self.module.types.register(IrTypeKind::Void);
        self.push_instruction(InstructionKind::Store { value, destination }, void);
    }

    /// Unconditional jump to a block id.
    pub fn build_break(&mut self, target: BlockId) {
        let void = self.module.types.register(IrTypeKind::Void);
        self.push_instruction(InstructionKind::Break { target }, void);
    }

    pub fn build_cond_break(
        &mut self,
        condition: IrValue,
        true_target: BlockId,
        false_target: BlockId,
    ) {
        let void = self.module.types.register(IrTypeKind::Void);
        self.push_instruction(
            InstructionKind::ConditionalBreak {
                condition,
                true_target,
                false_target,
            },
            void,
        );
    }

    pub fn build_call(&mut self, name: StringId, args: Vec<IrValue>, result_type: TypeId) -> IrValue {
        self.push_instruction(InstructionKind::Call { name, args }, result_type);
        self.value_from_prev_instruction()
    }

    pub fn build_ret(&mut self, value: Option<IrValue>) {
        let void = self.module.types.register(IrTypeKind::Void);
        self.push_instruction(InstructionKind::Return { value }, void);
    }

    // ----------------
    // Literal helpers
    // ----------------

    pub fn build_literal_usize(&mut self, value: u64) -> IrValue {
        let usize_type = self.usize_type();
        IrValue::Literal {
            literal: IrLiteral::Usize(value),
            ir_type: usize_type,
        }
    }

    pub fn build_literal_cstr(&mut self, value: &str) -> IrValue {
        let u8_type = self.module.types.register(IrTypeKind::U8);
        let cstring_type = self.module.types.register(IrTypeKind::Pointer(u8_type));
        IrValue::Literal {
            literal: IrLiteral::CStr(value.into()),
            ir_type: cstring_type,
        }
    }

    pub fn build_bool(&mut self, value: bool) -> IrValue {
        let bool_type = self.bool_type();
        IrValue::Literal {
            literal: IrLiteral::Bool(value),
            ir_type: bool_type,
        }
    }

    pub fn build_null_pointer(&mut self) -> IrValue {
        let raw_ptr = self.module.types.register(IrTypeKind::RawPtr);
        IrValue::Literal {
            literal: IrLiteral::NullPointer,
            ir_type: raw_ptr,
        }
    }

    pub fn build_null_pointer_of_type(&mut self, ir_type: TypeId) -> IrValue {
        IrValue::Literal {
            literal: IrLiteral::NullPointer,
            ir_type,
        }
    }

    // -------------
    // Shared types
    // -------------

    pub fn funcptr_type(&mut self) -> TypeId {
        match self.shared_funcptr {
            Some(existing) => existing,
            None => {
                let id = self.module.types.register(IrTypeKind::FuncPointer);
                self.shared_funcptr = Some(id);
                id
            }
        }
    }

    pub fn usize_type(&mut self) -> TypeId {
        match self.shared_usize {
            Some(existing) => existing,
            None => {
                let id = self.module.types.register(IrTypeKind::Usize);
                self.shared_usize = Some(id);
                id
            }
        }
    }

    pub fn usize_ptr_type(&mut self) -> TypeId {
        match self.shared_usize_ptr {
            Some(existing) => existing,
            None => {
                let usize_type = self.usize_type();
                let id = self.module.types.register(IrTypeKind::Pointer(usize_type));
                self.shared_usize_ptr = Some(id);
                id
            }
        }
    }

    pub fn bool_type(&mut self) -> TypeId {
        match self.shared_bool {
            Some(existing) => existing,
            None => {
                let id = self.module.types.register(IrTypeKind::Bool);
                self.shared_bool = Some(id);
                id
            }
        }
    }

    // -------------------------
    // Labeled break/continue
    // -------------------------

    /// Make room for one more loop-stack entry.
    pub fn prepare_for_new_label(&mut self) {
        self.block_stack.reserve(1);
    }

    /// Push the targets `break` and `continue` resolve to while the
    /// loop body is lowered.
    pub fn push_loop_label(
        &mut self,
        label: Option<StringId>,
        break_block_id: Option<BlockId>,
        continue_block_id: Option<BlockId>,
    ) {
        self.prepare_for_new_label();
        self.block_stack.push(LoopLabel {
            label,
            break_block_id,
            continue_block_id,
        });
    }

    pub fn pop_loop_label(&mut self) {
        self.block_stack.pop();
    }

    pub fn innermost_break_target(&self) -> Option<BlockId> {
        self.block_stack
            .iter()
            .rev()
            .find_map(|entry| entry.break_block_id)
    }

    pub fn innermost_continue_target(&self) -> Option<BlockId> {
        self.block_stack
            .iter()
            .rev()
            .find_map(|entry| entry.continue_block_id)
    }

    /// Break/continue targets of the nearest enclosing loop carrying
    /// the given label.
    pub fn labeled_targets(&self, label: StringId) -> Option<&LoopLabel> {
        self.block_stack
            .iter()
            .rev()
            .find(|entry| entry.label == Some(label))
    }

    // -----------------
    // Variable scopes
    // -----------------

    pub fn open_var_scope(&mut self) {
        self.var_scopes.open_scope();
    }

    pub fn close_var_scope(&mut self) {
        self.var_scopes.close_scope();
    }

    /// Bind a name in the current scope and hand out the next
    /// sequential local id.
    pub fn add_variable(
        &mut self,
        name: StringId,
        ast_type: &AstType,
        ir_type: TypeId,
        traits: BridgeVariableTraits,
    ) -> usize {
        let id = self.next_var_id;
        self.next_var_id += 1;

        self.var_scopes.add_variable(BridgeVariable {
            name,
            ast_type: ast_type.clone(),
            ir_type,
            id,
            traits,
        });

        id
    }

    // ----------------------------
    // Special-function resolution
    // ----------------------------

    pub fn has_pass(&mut self, query: &AstType) -> bool {
        let cached = self.sf_cache.locate_or_insert(query).has_pass;
        match cached {
            Trilean::Yes => true,
            Trilean::No => false,
            Trilean::Unknown => {
                let answer = self.scan_for_management(query, "__pass__", false);
                self.sf_cache.locate_or_insert(query).has_pass = Trilean::from_bool(answer);
                answer
            }
        }
    }

    pub fn has_defer(&mut self, query: &AstType) -> bool {
        let cached = self.sf_cache.locate_or_insert(query).has_defer;
        match cached {
            Trilean::Yes => true,
            Trilean::No => false,
            Trilean::Unknown => {
                let answer = self.scan_for_management(query, "__defer__", true);
                self.sf_cache.locate_or_insert(query).has_defer = Trilean::from_bool(answer);
                answer
            }
        }
    }

    pub fn has_assign(&mut self, query: &AstType) -> bool {
        let cached = self.sf_cache.locate_or_insert(query).has_assign;
        match cached {
            Trilean::Yes => true,
            Trilean::No => false,
            Trilean::Unknown => {
                let answer = self.scan_for_management(query, "__assign__", true);
                self.sf_cache.locate_or_insert(query).has_assign = Trilean::from_bool(answer);
                answer
            }
        }
    }

    /// Whether a concrete management function of the given name exists
    /// for the queried type. `by_pointer` selects whether the first
    /// argument is `*T` (defer, assign) or `T` itself (pass).
    fn scan_for_management(&self, query: &AstType, name: &str, by_pointer: bool) -> bool {
        let Some(name_id) = self.string_table.get_existing(name) else {
            return false;
        };

        self.ast.funcs.iter().any(|func| {
            func.name == name_id
                && !func.traits.contains(FunctionTraits::POLYMORPHIC)
                && !func.args.is_empty()
                && if by_pointer {
                    func.args[0].ast_type.is_pointer_to(query)
                } else {
                    func.args[0].ast_type == *query
                }
        })
    }

    // ----------------
    // Type resolution
    // ----------------

    /// Map an AST type onto an interned IR type.
    pub fn resolve_ast_type(&mut self, ast_type: &AstType) -> Result<TypeId, CompilerError> {
        self.resolve_type_elements(&ast_type.elements, ast_type.source)
    }

    fn resolve_type_elements(
        &mut self,
        elements: &[TypeElement],
        source: SourceLocation,
    ) -> Result<TypeId, CompilerError> {
        let Some(first) = elements.first() else {
            return Err(CompilerError::new_internal_error(
                "Cannot lower unresolved type",
                source,
            ));
        };

        match first {
            TypeElement::Pointer => {
                let inner = self.resolve_type_elements(&elements[1..], source)?;
                Ok(self.module.types.register(IrTypeKind::Pointer(inner)))
            }

            TypeElement::FixedArray(length) => {
                let element = self.resolve_type_elements(&elements[1..], source)?;
                Ok(self.module.types.register(IrTypeKind::FixedArray {
                    element,
                    length: *length,
                }))
            }

            TypeElement::Base(name) => self.resolve_base_type(*name, source),

            TypeElement::FuncPointer(_) => Ok(self.funcptr_type()),

            TypeElement::VarFixedArray(_) => Err(CompilerError::new(
                "Array lengths must be known before IR generation",
                source,
                crate::diagnostics::compiler_errors::ErrorType::IrTransformation,
            )),

            TypeElement::Polymorph { .. }
            | TypeElement::Polycount(_)
            | TypeElement::GenericBase { .. } => Err(CompilerError::new(
                "Cannot lower a polymorphic type; it must be substituted first",
                source,
                crate::diagnostics::compiler_errors::ErrorType::IrTransformation,
            )),
        }
    }

    fn resolve_base_type(
        &mut self,
        name: StringId,
        source: SourceLocation,
    ) -> Result<TypeId, CompilerError> {
        let kind = match self.string_table.resolve(name) {
            "void" => IrTypeKind::Void,
            "bool" => IrTypeKind::Bool,
            "byte" => IrTypeKind::S8,
            "ubyte" => IrTypeKind::U8,
            "short" => IrTypeKind::S16,
            "ushort" => IrTypeKind::U16,
            "int" => IrTypeKind::S32,
            "uint" => IrTypeKind::U32,
            "long" => IrTypeKind::S64,
            "ulong" => IrTypeKind::U64,
            "usize" => IrTypeKind::Usize,
            "float" => IrTypeKind::F32,
            "double" => IrTypeKind::F64,
            "ptr" => IrTypeKind::RawPtr,
            "cstring" => {
                let u8_type = self.module.types.register(IrTypeKind::U8);
                IrTypeKind::Pointer(u8_type)
            }

            _ => {
                if self.ast.find_composite(name).is_some() {
                    IrTypeKind::Structure(name)
                } else if self.ast.enums.iter().any(|e| e.name == name) {
                    IrTypeKind::U64
                } else if let Some(alias) = self
                    .ast
                    .type_aliases
                    .iter()
                    .find(|alias| alias.name == name)
                {
                    let aliased = alias.ast_type.clone();
                    return self.resolve_ast_type(&aliased);
                } else {
                    let type_name = self.string_table.resolve(name).to_string();
                    return Err(CompilerError::new(
                        format!("Undeclared type '{type_name}'"),
                        source,
                        crate::diagnostics::compiler_errors::ErrorType::IrTransformation,
                    ));
                }
            }
        };

        Ok(self.module.types.register(kind))
    }
}
