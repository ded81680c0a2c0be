//! AST function bodies -> IR.
//!
//! Per-function lifecycle: entry block, root bridge scope, parameter
//! varptr/store prologue, statement walk, terminator repair, scope
//! close. Foreign and polymorphic functions are skipped; polymorphic
//! bodies are only lowered once a later pass substitutes them.

use crate::ast::ast::{ArgTypeTrait, Ast, AstFunction, FunctionTraits};
use crate::ast::ast_types::{AstType, TypeElement};
use crate::ast::expressions::{BinaryOp, Expr, ExprKind, UnaryOp};
use crate::ast::statements::{Stmt, StmtKind};
use crate::diagnostics::compiler_errors::{CompilerError, CompilerMessages};
use crate::ir::bridge::BridgeVariableTraits;
use crate::ir::ir_builder::IrBuilder;
use crate::ir::ir_nodes::{
    ArithmeticOp, BlockId, CompareOp, InstructionKind, IrFunction, IrLiteral, IrModule,
    IrTypeKind, IrUnaryOp, IrValue,
};
use crate::ir::sf_cache::SpecialFunctionCache;
use crate::ir_log;
use crate::return_ir_transformation_error;
use crate::string_interning::StringTable;

/// Lower every non-foreign, non-polymorphic function of an AST.
pub fn build_ir(ast: &Ast, string_table: &mut StringTable) -> Result<IrModule, CompilerMessages> {
    let mut module = IrModule::new();
    let mut sf_cache = SpecialFunctionCache::new();

    for func in &ast.funcs {
        if func
            .traits
            .intersects(FunctionTraits::FOREIGN | FunctionTraits::POLYMORPHIC)
        {
            continue;
        }

        match lower_function(&mut module, ast, string_table, &mut sf_cache, func) {
            Ok(ir_func) => module.funcs.push(ir_func),
            Err(error) => return Err(CompilerMessages::from_error(error)),
        }
    }

    Ok(module)
}

pub fn lower_function(
    module: &mut IrModule,
    ast: &Ast,
    string_table: &mut StringTable,
    sf_cache: &mut SpecialFunctionCache,
    func: &AstFunction,
) -> Result<IrFunction, CompilerError> {
    let mut builder = IrBuilder::new(module, ast, string_table, sf_cache);

    // Parameter prologue: every argument gets a local slot holding the
    // incoming value
    for (index, arg) in func.args.iter().enumerate() {
        let Some(name) = arg.name else {
            return Err(CompilerError::new_internal_error(
                "Cannot lower a function with unnamed arguments",
                arg.source,
            ));
        };

        let ir_type = builder.resolve_ast_type(&arg.ast_type)?;

        let mut traits = BridgeVariableTraits::empty();
        if arg.type_trait == ArgTypeTrait::Pod {
            traits |= BridgeVariableTraits::POD;
        }

        let variable_id = builder.add_variable(name, &arg.ast_type, ir_type, traits);

        let ptr_type = builder.module.types.register(IrTypeKind::Pointer(ir_type));
        let ptr = builder.build_varptr(ptr_type, variable_id);
        builder.build_store(
            IrValue::Argument {
                index: index as u32,
                ir_type,
            },
            ptr,
        );
    }

    lower_stmts(&mut builder, &func.statements)?;

    let return_type = builder.resolve_ast_type(&func.return_type)?;

    if !builder.current_block().is_terminated() {
        // Falling off the end: destruction still runs, and void
        // functions get their return repaired
        emit_visible_variable_defers(&mut builder)?;

        if matches!(builder.module.types.kind(return_type), IrTypeKind::Void) {
            builder.build_ret(None);
        } else {
            let name = builder.string_table.resolve(func.name).to_string();
            return_ir_transformation_error!(
                format!("Function '{name}' must return a value"),
                func.end_source
            );
        }
    }

    ir_log!("Lowered function ", builder.string_table.resolve(func.name));

    let variable_count = builder.next_var_id;
    Ok(IrFunction {
        name: func.name,
        basicblocks: builder.basicblocks,
        return_type,
        variable_count,
        export_name: func.export_name,
        is_entry: func.is_entry,
    })
}

fn lower_stmts(builder: &mut IrBuilder, stmts: &[Stmt]) -> Result<(), CompilerError> {
    for stmt in stmts {
        // Statements behind a terminator are unreachable (defer copies
        // spliced after a return); emitting them would trail the jump
        if builder.current_block().is_terminated() {
            break;
        }

        lower_stmt(builder, stmt)?;
    }

    Ok(())
}

fn lower_stmt(builder: &mut IrBuilder, stmt: &Stmt) -> Result<(), CompilerError> {
    match &stmt.kind {
        StmtKind::Declare {
            name,
            ast_type,
            value,
            is_undef,
            is_pod,
        } => {
            let ir_type = builder.resolve_ast_type(ast_type)?;

            let mut traits = BridgeVariableTraits::empty();
            if *is_undef {
                traits |= BridgeVariableTraits::UNDEF;
            }
            if *is_pod {
                traits |= BridgeVariableTraits::POD;
            }

            let variable_id = builder.add_variable(*name, ast_type, ir_type, traits);

            if let Some(init) = value {
                let init_value = lower_expr(builder, init)?;
                let ptr_type = builder.module.types.register(IrTypeKind::Pointer(ir_type));
                let ptr = builder.build_varptr(ptr_type, variable_id);
                builder.build_store(init_value, ptr);
            }
        }

        StmtKind::Assign { target, value } => {
            let (destination, target_ast) = lower_address(builder, target)?;
            let assigned = lower_expr(builder, value)?;

            // Whole-value assignment goes through __assign__ when the
            // target's type declares one
            let use_assign = match &target_ast {
                Some(ast_type) => builder.has_assign(ast_type),
                None => false,
            };

            if use_assign {
                let assign_name = builder.string_table.intern("__assign__");
                let void = builder.module.types.register(IrTypeKind::Void);
                builder.build_call(assign_name, vec![destination, assigned], void);
            } else {
                builder.build_store(assigned, destination);
            }
        }

        StmtKind::Call(expr) => {
            lower_expr(builder, expr)?;
        }

        StmtKind::Return { value, unwind } => {
            // Deferred statements recorded at parse time run first,
            // then managed variables are destroyed
            lower_stmts(builder, unwind)?;
            emit_visible_variable_defers(builder)?;

            let returned = match value {
                Some(expr) => Some(lower_expr(builder, expr)?),
                None => None,
            };

            builder.build_ret(returned);
        }

        StmtKind::Conditional {
            condition,
            invert,
            then_block,
            else_block,
        } => {
            let cond = lower_expr(builder, condition)?;

            let then_id = builder.build_basicblock();
            let (else_id, end_id) = if else_block.is_some() {
                let else_id = builder.build_basicblock();
                (else_id, builder.build_basicblock())
            } else {
                let end_id = builder.build_basicblock();
                (end_id, end_id)
            };

            let (true_target, false_target) = if *invert {
                (else_id, then_id)
            } else {
                (then_id, else_id)
            };
            builder.build_cond_break(cond, true_target, false_target);

            builder.use_basicblock(then_id);
            builder.open_var_scope();
            lower_stmts(builder, then_block)?;
            finish_scoped_block(builder, end_id)?;

            if let Some(else_stmts) = else_block {
                builder.use_basicblock(else_id);
                builder.open_var_scope();
                lower_stmts(builder, else_stmts)?;
                finish_scoped_block(builder, end_id)?;
            }

            builder.use_basicblock(end_id);
        }

        StmtKind::WhileLoop {
            label,
            condition,
            invert,
            statements,
        } => {
            if condition.is_literal_true() && !*invert {
                lower_constant_loop(builder, *label, statements)?;
            } else {
                lower_conditional_loop(builder, *label, condition, *invert, statements)?;
            }
        }

        StmtKind::Break { label } => {
            let target = resolve_break_target(builder, *label, stmt, "break")?;
            builder.build_break(target);
        }

        StmtKind::Continue { label } => {
            let target = resolve_continue_target(builder, *label, stmt)?;
            builder.build_break(target);
        }
    }

    Ok(())
}

/// `while true { ... }`: no test block is emitted. The body block is the
/// loop header and jumps back to itself; `break` is the only way out.
fn lower_constant_loop(
    builder: &mut IrBuilder,
    label: Option<crate::string_interning::StringId>,
    statements: &[Stmt],
) -> Result<(), CompilerError> {
    let body_id = builder.build_basicblock();
    let end_id = builder.build_basicblock();

    builder.build_break(body_id);
    builder.use_basicblock(body_id);

    builder.push_loop_label(label, Some(end_id), Some(body_id));
    builder.open_var_scope();
    lower_stmts(builder, statements)?;
    finish_scoped_block(builder, body_id)?;
    builder.pop_loop_label();

    builder.use_basicblock(end_id);
    Ok(())
}

/// `while cond { ... }` / `until cond { ... }`: test block, body block,
/// end block. `continue` re-enters the test.
fn lower_conditional_loop(
    builder: &mut IrBuilder,
    label: Option<crate::string_interning::StringId>,
    condition: &Expr,
    invert: bool,
    statements: &[Stmt],
) -> Result<(), CompilerError> {
    let test_id = builder.build_basicblock();
    let body_id = builder.build_basicblock();
    let end_id = builder.build_basicblock();

    builder.build_break(test_id);

    builder.use_basicblock(test_id);
    let cond = lower_expr(builder, condition)?;
    let (true_target, false_target) = if invert {
        (end_id, body_id)
    } else {
        (body_id, end_id)
    };
    builder.build_cond_break(cond, true_target, false_target);

    builder.use_basicblock(body_id);
    builder.push_loop_label(label, Some(end_id), Some(test_id));
    builder.open_var_scope();
    lower_stmts(builder, statements)?;
    finish_scoped_block(builder, test_id)?;
    builder.pop_loop_label();

    builder.use_basicblock(end_id);
    Ok(())
}

fn resolve_break_target(
    builder: &mut IrBuilder,
    label: Option<crate::string_interning::StringId>,
    stmt: &Stmt,
    what: &str,
) -> Result<BlockId, CompilerError> {
    let target = match label {
        Some(label) => match builder.labeled_targets(label) {
            Some(entry) => entry.break_block_id,
            None => {
                let label_name = builder.string_table.resolve(label).to_string();
                return_ir_transformation_error!(
                    format!("Undeclared loop label '{label_name}'"),
                    stmt.source
                );
            }
        },
        None => builder.innermost_break_target(),
    };

    match target {
        Some(block_id) => Ok(block_id),
        None => {
            return_ir_transformation_error!(
                format!("Cannot '{what}' outside of a loop"),
                stmt.source
            );
        }
    }
}

fn resolve_continue_target(
    builder: &mut IrBuilder,
    label: Option<crate::string_interning::StringId>,
    stmt: &Stmt,
) -> Result<BlockId, CompilerError> {
    let target = match label {
        Some(label) => match builder.labeled_targets(label) {
            Some(entry) => entry.continue_block_id,
            None => {
                let label_name = builder.string_table.resolve(label).to_string();
                return_ir_transformation_error!(
                    format!("Undeclared loop label '{label_name}'"),
                    stmt.source
                );
            }
        },
        None => builder.innermost_continue_target(),
    };

    match target {
        Some(block_id) => Ok(block_id),
        None => {
            return_ir_transformation_error!("Cannot 'continue' outside of a loop", stmt.source);
        }
    }
}

/// Close out a scoped block: if control can still fall out of it, run
/// the scope's managed-variable destruction and jump to `exit_target`.
fn finish_scoped_block(builder: &mut IrBuilder, exit_target: BlockId) -> Result<(), CompilerError> {
    if !builder.current_block().is_terminated() {
        emit_current_scope_defers(builder)?;
        builder.build_break(exit_target);
    }

    builder.close_var_scope();
    Ok(())
}

/// `__defer__` calls for the current scope's variables, reverse
/// declaration order.
fn emit_current_scope_defers(builder: &mut IrBuilder) -> Result<(), CompilerError> {
    let variables: Vec<_> = builder
        .var_scopes
        .current_scope_variables()
        .iter()
        .rev()
        .cloned()
        .collect();

    emit_defer_calls(builder, &variables)
}

/// `__defer__` calls for every visible variable, innermost scope first.
/// Runs before each `return` and before the repaired fall-off return.
fn emit_visible_variable_defers(builder: &mut IrBuilder) -> Result<(), CompilerError> {
    let variables = builder.var_scopes.all_visible_variables();
    emit_defer_calls(builder, &variables)
}

fn emit_defer_calls(
    builder: &mut IrBuilder,
    variables: &[crate::ir::bridge::BridgeVariable],
) -> Result<(), CompilerError> {
    for variable in variables {
        if variable.traits.contains(BridgeVariableTraits::POD) {
            continue;
        }

        if !builder.has_defer(&variable.ast_type) {
            continue;
        }

        let defer_name = builder.string_table.intern("__defer__");
        let ptr_type = builder
            .module
            .types
            .register(IrTypeKind::Pointer(variable.ir_type));
        let ptr = builder.build_varptr(ptr_type, variable.id);
        let void = builder.module.types.register(IrTypeKind::Void);
        builder.build_call(defer_name, vec![ptr], void);
    }

    Ok(())
}

// ------------
// Expressions
// ------------

fn lower_expr(builder: &mut IrBuilder, expr: &Expr) -> Result<IrValue, CompilerError> {
    match &expr.kind {
        ExprKind::IntLiteral(value) => {
            let s64 = builder.module.types.register(IrTypeKind::S64);
            Ok(IrValue::Literal {
                literal: IrLiteral::S64(*value),
                ir_type: s64,
            })
        }

        ExprKind::FloatLiteral(value) => {
            let f64_type = builder.module.types.register(IrTypeKind::F64);
            Ok(IrValue::Literal {
                literal: IrLiteral::F64(*value),
                ir_type: f64_type,
            })
        }

        ExprKind::BoolLiteral(value) => Ok(builder.build_bool(*value)),

        ExprKind::StrLiteral(content) | ExprKind::CStrLiteral(content) => {
            Ok(builder.build_literal_cstr(content))
        }

        ExprKind::NullLiteral => Ok(builder.build_null_pointer()),

        ExprKind::Variable(_) | ExprKind::Member { .. } => {
            let (ptr, _) = lower_address(builder, expr)?;
            builder.build_load(ptr)
        }

        ExprKind::Polycount(_) => {
            return_ir_transformation_error!(
                "Count variables cannot be used as runtime values",
                expr.source
            );
        }

        ExprKind::Call { name, args } => lower_call(builder, *name, args, expr),

        ExprKind::AddressOf(inner) => {
            let (ptr, _) = lower_address(builder, inner)?;
            Ok(ptr)
        }

        ExprKind::Dereference(inner) => {
            let pointer = lower_expr(builder, inner)?;
            builder.build_load(pointer)
        }

        ExprKind::Unary { op, value } => {
            let operand = lower_expr(builder, value)?;

            let (ir_op, result_type) = match op {
                UnaryOp::Negate => (IrUnaryOp::Negate, operand.ir_type()),
                UnaryOp::Not => (IrUnaryOp::Not, builder.bool_type()),
                UnaryOp::BitComplement => (IrUnaryOp::BitComplement, operand.ir_type()),
            };

            builder.push_instruction(
                InstructionKind::Unary {
                    op: ir_op,
                    value: operand,
                },
                result_type,
            );
            Ok(builder.value_from_prev_instruction())
        }

        ExprKind::Binary { op, left, right } => lower_binary(builder, *op, left, right),
    }
}

fn lower_call(
    builder: &mut IrBuilder,
    name: crate::string_interning::StringId,
    args: &[Expr],
    expr: &Expr,
) -> Result<IrValue, CompilerError> {
    // Overload resolution proper belongs to the semantic pass; here the
    // first function of the name supplies the shape
    let Some(callee) = builder.ast.funcs.iter().find(|func| func.name == name) else {
        let func_name = builder.string_table.resolve(name).to_string();
        return_ir_transformation_error!(
            format!("Undeclared function '{func_name}'"),
            expr.source
        );
    };

    let callee_return = callee.return_type.clone();
    let callee_args: Vec<(AstType, ArgTypeTrait)> = callee
        .args
        .iter()
        .map(|arg| (arg.ast_type.clone(), arg.type_trait))
        .collect();

    let mut values = Vec::with_capacity(args.len());

    for (index, arg) in args.iter().enumerate() {
        let mut value = lower_expr(builder, arg)?;

        // Values of types with a __pass__ get routed through it,
        // unless the parameter is POD
        if let Some((param_type, param_trait)) = callee_args.get(index) {
            if *param_trait != ArgTypeTrait::Pod
                && !param_type.contains_polymorph()
                && builder.has_pass(param_type)
            {
                let pass_name = builder.string_table.intern("__pass__");
                let value_type = value.ir_type();
                value = builder.build_call(pass_name, vec![value], value_type);
            }
        }

        values.push(value);
    }

    let return_type = builder.resolve_ast_type(&callee_return)?;
    Ok(builder.build_call(name, values, return_type))
}

fn lower_binary(
    builder: &mut IrBuilder,
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
) -> Result<IrValue, CompilerError> {
    // Logical operators short-circuit through a phi
    if matches!(op, BinaryOp::And | BinaryOp::Or) {
        let lhs = lower_expr(builder, left)?;
        let lhs_block = builder.current_block_id;

        let rhs_id = builder.build_basicblock();
        let end_id = builder.build_basicblock();

        let is_and = op == BinaryOp::And;
        if is_and {
            builder.build_cond_break(lhs, rhs_id, end_id);
        } else {
            builder.build_cond_break(lhs, end_id, rhs_id);
        }

        builder.use_basicblock(rhs_id);
        let rhs = lower_expr(builder, right)?;
        let rhs_block = builder.current_block_id;
        builder.build_break(end_id);

        builder.use_basicblock(end_id);
        // The short-circuit edge produces the operator's absorbing value
        let shortcut = builder.build_bool(!is_and);
        let bool_type = builder.bool_type();
        builder.push_instruction(
            InstructionKind::Phi {
                incoming: vec![(lhs_block, shortcut), (rhs_block, rhs)],
            },
            bool_type,
        );
        return Ok(builder.value_from_prev_instruction());
    }

    let lhs = lower_expr(builder, left)?;
    let rhs = lower_expr(builder, right)?;

    if let Some(compare_op) = to_compare_op(op) {
        let bool_type = builder.bool_type();
        builder.push_instruction(
            InstructionKind::Compare {
                op: compare_op,
                left: lhs,
                right: rhs,
            },
            bool_type,
        );
        return Ok(builder.value_from_prev_instruction());
    }

    let arithmetic_op = match op {
        BinaryOp::Add => ArithmeticOp::Add,
        BinaryOp::Subtract => ArithmeticOp::Subtract,
        BinaryOp::Multiply => ArithmeticOp::Multiply,
        BinaryOp::Divide => ArithmeticOp::Divide,
        BinaryOp::Modulus => ArithmeticOp::Modulus,
        BinaryOp::BitAnd => ArithmeticOp::BitAnd,
        BinaryOp::BitOr => ArithmeticOp::BitOr,
        BinaryOp::BitXor => ArithmeticOp::BitXor,
        BinaryOp::BitLShift => ArithmeticOp::LShift,
        BinaryOp::BitRShift => ArithmeticOp::RShift,
        _ => unreachable!("comparisons and logical operators are handled above"),
    };

    let result_type = lhs.ir_type();
    builder.push_instruction(
        InstructionKind::Arithmetic {
            op: arithmetic_op,
            left: lhs,
            right: rhs,
        },
        result_type,
    );
    Ok(builder.value_from_prev_instruction())
}

fn to_compare_op(op: BinaryOp) -> Option<CompareOp> {
    let compare_op = match op {
        BinaryOp::Equals => CompareOp::Equals,
        BinaryOp::NotEquals => CompareOp::NotEquals,
        BinaryOp::LessThan => CompareOp::LessThan,
        BinaryOp::GreaterThan => CompareOp::GreaterThan,
        BinaryOp::LessThanOrEq => CompareOp::LessThanOrEq,
        BinaryOp::GreaterThanOrEq => CompareOp::GreaterThanOrEq,
        _ => return None,
    };

    Some(compare_op)
}

/// Lower an expression to the address of its storage. The second return
/// is the AST type of the addressed value, when it is known and
/// management functions apply to it.
fn lower_address(
    builder: &mut IrBuilder,
    expr: &Expr,
) -> Result<(IrValue, Option<AstType>), CompilerError> {
    match &expr.kind {
        ExprKind::Variable(name) => {
            if let Some(variable) = builder.var_scopes.find_variable(*name) {
                let variable_id = variable.id;
                let ir_type = variable.ir_type;
                let is_pod = variable.traits.contains(BridgeVariableTraits::POD);
                let ast_type = variable.ast_type.clone();

                let ptr_type = builder.module.types.register(IrTypeKind::Pointer(ir_type));
                let ptr = builder.build_varptr(ptr_type, variable_id);

                // POD suppresses management functions on this storage
                let management_type = if is_pod { None } else { Some(ast_type) };
                return Ok((ptr, management_type));
            }

            if let Some(global_index) = builder
                .ast
                .globals
                .iter()
                .position(|global| global.name == *name)
            {
                let global_type = builder.ast.globals[global_index].ast_type.clone();
                let ir_type = builder.resolve_ast_type(&global_type)?;
                let ptr_type = builder.module.types.register(IrTypeKind::Pointer(ir_type));
                let ptr = builder.build_gvarptr(ptr_type, global_index);
                return Ok((ptr, Some(global_type)));
            }

            let variable_name = builder.string_table.resolve(*name).to_string();
            return_ir_transformation_error!(
                format!("Undeclared variable '{variable_name}'"),
                expr.source
            );
        }

        ExprKind::Member { value, field } => {
            let (base_ptr, base_ast) = lower_address(builder, value)?;

            let Some(base_ast) = base_ast else {
                return_ir_transformation_error!(
                    "Cannot resolve member access on a value of unknown type",
                    expr.source
                );
            };

            // Pointers to composites are stepped through automatically
            let (composite_name, base_value) = match base_ast.elements.as_slice() {
                [TypeElement::Base(name)] => (*name, base_ptr),
                [TypeElement::Pointer, TypeElement::Base(name)] => {
                    (*name, builder.build_load(base_ptr)?)
                }
                _ => {
                    return_ir_transformation_error!(
                        "Cannot access a member of a non-composite value",
                        expr.source
                    );
                }
            };

            let Some(composite) = builder.ast.find_composite(composite_name) else {
                let type_name = builder.string_table.resolve(composite_name).to_string();
                return_ir_transformation_error!(
                    format!("'{type_name}' is not a composite type"),
                    expr.source
                );
            };

            let Some(field_decl) = composite
                .fields
                .iter()
                .find(|composite_field| composite_field.name == *field)
            else {
                let type_name = builder.string_table.resolve(composite_name).to_string();
                let field_name = builder.string_table.resolve(*field).to_string();
                return_ir_transformation_error!(
                    format!("'{type_name}' has no field named '{field_name}'"),
                    expr.source
                );
            };

            let field_ast = field_decl.ast_type.clone();
            let field_ir = builder.resolve_ast_type(&field_ast)?;
            let ptr_type = builder.module.types.register(IrTypeKind::Pointer(field_ir));

            builder.push_instruction(
                InstructionKind::MemberPtr {
                    base: base_value,
                    field: *field,
                },
                ptr_type,
            );
            let ptr = builder.value_from_prev_instruction();

            Ok((ptr, Some(field_ast)))
        }

        ExprKind::Dereference(inner) => {
            let pointer = lower_expr(builder, inner)?;
            Ok((pointer, None))
        }

        _ => {
            return_ir_transformation_error!(
                "Cannot take the address of this expression",
                expr.source
            );
        }
    }
}
