//! Function declarations.
//!
//! Covers regular and foreign declarations, declaration prefixes,
//! implicit `this` insertion inside composite domains, argument lists
//! with type backfilling and default-value inheritance, both variable
//! arity forms, prototype enforcement for reserved management functions,
//! polymorphic indexing, and function aliases.

use crate::ast::ast::{
    ArgTypeTrait, AstArgument, AstFunction, Flow, FuncId, FunctionAlias, FunctionTraits,
    GroupHint, PolymorphicIndexEntry,
};
use crate::ast::ast_types::{AstType, TypeElement, collapse_polycount_var_fixed_arrays};
use crate::diagnostics::compiler_errors::CompilerError;
use crate::parse_log;
use crate::parser::parse_ctx::ParseContext;
use crate::parser::parse_expr::parse_expr;
use crate::parser::parse_stmt::parse_braced_block;
use crate::parser::parse_type::parse_type;
use crate::settings::{ARGUMENT_CAPACITY_GUESS, FUNC_ALIAS_CAPACITY_GUESS, MAX_FUNC_ID};
use crate::string_interning::StringId;
use crate::tokens::token_data::TokenKind;
use crate::tokens::tokens::SourceLocation;
use crate::{return_limit_error, return_rule_error, return_syntax_error,
    return_wellformedness_error};

// Reserved two-argument operator functions. Must stay sorted; looked up
// by binary search.
const MATH_MANAGEMENT_FUNCS: [&str; 11] = [
    "__add__",
    "__divide__",
    "__equals__",
    "__greater_than__",
    "__greater_than_or_equal__",
    "__less_than__",
    "__less_than_or_equal__",
    "__modulus__",
    "__multiply__",
    "__not_equals__",
    "__subtract__",
];

#[derive(Clone, Copy, Debug, Default)]
pub struct FunctionPrefixes {
    pub is_stdcall: bool,
    pub is_verbatim: bool,
    pub is_implicit: bool,
    pub is_external: bool,
}

pub struct FunctionHead {
    pub name: StringId,
    pub source: SourceLocation,
    pub is_foreign: bool,
    pub is_entry: bool,
    pub prefixes: FunctionPrefixes,
    pub export_name: Option<StringId>,
}

pub fn parse_func(ctx: &mut ParseContext) -> Result<(), CompilerError> {
    let source = ctx.peek_source();

    if ctx.peek() == TokenKind::Func && ctx.tokens.peek_kind(1) == TokenKind::Alias {
        // Parse function alias instead of regular function
        return parse_func_alias(ctx);
    }

    if ctx.ast.funcs.len() >= MAX_FUNC_ID {
        return_limit_error!("Maximum number of AST functions reached", source);
    }

    let head = parse_func_head(ctx)?;

    if head.is_foreign && ctx.composite_association.is_some() {
        return_rule_error!("Cannot declare foreign function within struct domain", source);
    }

    let func_id = FuncId(ctx.ast.funcs.len() as u32);
    let mut func = create_func_template(ctx, head);

    if !ctx.next_builtin_traits.is_empty() {
        func.traits |= ctx.next_builtin_traits;
        ctx.next_builtin_traits = FunctionTraits::empty();
    }

    parse_func_arguments(ctx, &mut func)?;
    ctx.ignore_newlines("Expected '{' after function head")?;

    let beginning_token = ctx.peek();

    if !func.traits.contains(FunctionTraits::FOREIGN)
        && (beginning_token == TokenKind::OpenBrace || beginning_token == TokenKind::Assign)
    {
        let void = ctx.string_table.intern("void");
        func.return_type = AstType::base(void, SourceLocation::NONE);
    } else {
        func.return_type = parse_type(ctx)?;
    }

    // The count element rewrite runs once arguments and return type are
    // both known
    for arg in &mut func.args {
        collapse_polycount_var_fixed_arrays(&mut arg.ast_type);
    }
    collapse_polycount_var_fixed_arrays(&mut func.return_type);

    enforce_management_prototypes(ctx, &mut func, source)?;

    if func.is_polymorphic() {
        // Ensure this isn't a foreign function
        if func.traits.contains(FunctionTraits::FOREIGN) {
            return_rule_error!("Cannot declare polymorphic foreign functions", source);
        }

        // Remember the function as polymorphic
        func.traits |= FunctionTraits::POLYMORPHIC;
        ctx.ast.polymorphic_funcs.push(PolymorphicIndexEntry {
            name: func.name,
            func_id,
            is_beginning_of_group: GroupHint::Uncalculated,
        });

        if func.is_method(ctx.string_table) {
            ctx.ast.polymorphic_methods.push(PolymorphicIndexEntry {
                name: func.name,
                func_id,
                is_beginning_of_group: GroupHint::Uncalculated,
            });
        }
    }

    parse_func_body(ctx, &mut func)?;

    parse_log!("Parsed function ", ctx.string_table.resolve(func.name));
    ctx.ast.funcs.push(func);
    Ok(())
}

pub fn parse_func_head(ctx: &mut ParseContext) -> Result<FunctionHead, CompilerError> {
    let source = ctx.peek_source();
    let prefixes = parse_func_prefixes(ctx);

    let keyword = ctx.peek();
    ctx.advance();

    let is_foreign = keyword == TokenKind::Foreign;

    if keyword != TokenKind::Func && !is_foreign {
        return_syntax_error!(
            "Expected 'func' or 'foreign' keyword after function prefixes",
            ctx.tokens.previous_location()
        );
    }

    let custom_export_name = ctx.eat_string();

    let mut name = if ctx.config.colon_colon && ctx.prename.is_some() {
        ctx.prename.take().unwrap()
    } else {
        let message_on_failure = if is_foreign {
            "Expected function name after 'foreign' keyword"
        } else {
            "Expected function name after 'func' keyword"
        };

        ctx.take_word(message_on_failure)?
    };

    if ctx.composite_association.is_none() {
        name = ctx.prepend_namespace(name);
    }

    let export_name = custom_export_name.or(if prefixes.is_external {
        Some(name)
    } else {
        None
    });

    let is_entry = name.eq_str(ctx.string_table, &ctx.config.entry_point);

    Ok(FunctionHead {
        name,
        source,
        is_foreign,
        is_entry,
        prefixes,
        export_name,
    })
}

fn parse_func_prefixes(ctx: &mut ParseContext) -> FunctionPrefixes {
    let mut prefixes = FunctionPrefixes::default();

    loop {
        match ctx.peek() {
            TokenKind::StdCall => prefixes.is_stdcall = true,
            TokenKind::Verbatim => prefixes.is_verbatim = true,
            TokenKind::Implicit => prefixes.is_implicit = true,
            TokenKind::External => prefixes.is_external = true,
            _ => return prefixes,
        }

        ctx.advance();
    }
}

fn create_func_template(ctx: &ParseContext, head: FunctionHead) -> AstFunction {
    let mut traits = FunctionTraits::empty();

    if head.is_foreign {
        traits |= FunctionTraits::FOREIGN;
    }
    if head.prefixes.is_stdcall {
        traits |= FunctionTraits::STDCALL;
    }
    if head.prefixes.is_verbatim {
        traits |= FunctionTraits::VERBATIM;
    }
    if head.prefixes.is_implicit {
        traits |= FunctionTraits::IMPLICIT;
    }
    if head.prefixes.is_external {
        traits |= FunctionTraits::EXTERNAL;
    }

    // Management traits come straight from the reserved name
    if head.name.eq_str(ctx.string_table, "__defer__") {
        traits |= FunctionTraits::DEFER;
    } else if head.name.eq_str(ctx.string_table, "__pass__") {
        traits |= FunctionTraits::PASS;
    }

    AstFunction {
        name: head.name,
        source: head.source,
        end_source: head.source,
        return_type: AstType::unresolved(),
        args: Vec::new(),
        statements: Vec::new(),
        traits,
        export_name: head.export_name,
        variadic_arg_name: None,
        variadic_source: SourceLocation::NONE,
        is_entry: head.is_entry,
    }
}

pub fn parse_func_body(
    ctx: &mut ParseContext,
    func: &mut AstFunction,
) -> Result<(), CompilerError> {
    if func.traits.contains(FunctionTraits::FOREIGN) {
        func.end_source = ctx.peek_source();
        return Ok(());
    }

    ctx.ignore_newlines("Expected function body")?;

    if ctx.peek() == TokenKind::Assign {
        if func.return_type.is_void(ctx.string_table) {
            return_rule_error!(
                "Cannot return 'void' from single line function",
                ctx.peek_source()
            );
        }

        ctx.advance();
        ctx.ignore_newlines("Expected function body")?;

        let return_expression = parse_expr(ctx)?;
        let return_source = return_expression.source;

        func.statements = vec![crate::ast::statements::Stmt::new(
            crate::ast::statements::StmtKind::Return {
                value: Some(return_expression),
                unwind: Vec::new(),
            },
            return_source,
        )];

        func.end_source = ctx.peek_source();
        return Ok(());
    }

    if ctx.peek() != TokenKind::OpenBrace {
        return_syntax_error!("Expected '{' after function prototype", ctx.peek_source());
    }

    func.statements = parse_braced_block(ctx, None, None)?;
    func.end_source = ctx.peek_source();
    Ok(())
}

pub fn parse_func_arguments(
    ctx: &mut ParseContext,
    func: &mut AstFunction,
) -> Result<(), CompilerError> {
    ctx.ignore_newlines("Expected '(' after function name")?;

    if let Some(association) = ctx.composite_association.clone() {
        if func.traits.contains(FunctionTraits::FOREIGN) {
            return_rule_error!(
                "Cannot declare foreign function inside of struct domain",
                func.source
            );
        }

        let this_type = if association.generics.is_empty() {
            // Insert 'this *AssociatedStruct' as first argument
            AstType::base_ptr(association.name, SourceLocation::NONE)
        } else {
            // Insert 'this *<$A, $B, ...> AssociatedStruct'
            let generics = association
                .generics
                .iter()
                .map(|generic| AstType::polymorph(*generic, SourceLocation::NONE))
                .collect();

            AstType {
                elements: vec![
                    TypeElement::Pointer,
                    TypeElement::GenericBase {
                        name: association.name,
                        generics,
                    },
                ],
                source: SourceLocation::NONE,
            }
        };

        func.args.push(AstArgument {
            name: Some(ctx.string_table.intern("this")),
            ast_type: this_type,
            source: association.source,
            flow: Flow::In,
            type_trait: ArgTypeTrait::None,
            default: None,
        });
    }

    // Allow for no argument list
    if ctx.peek() != TokenKind::OpenParen {
        return Ok(());
    }
    ctx.advance();

    func.args.reserve(ARGUMENT_CAPACITY_GUESS);

    // Polymorphic prerequisites are legal only inside the argument list
    ctx.allow_polymorphic_prereqs = true;
    let result = parse_func_argument_list(ctx, func);
    ctx.allow_polymorphic_prereqs = false;
    result?;

    ctx.advance(); // skip over ')'
    Ok(())
}

fn parse_func_argument_list(
    ctx: &mut ParseContext,
    func: &mut AstFunction,
) -> Result<(), CompilerError> {
    let mut backfill: usize = 0;

    while ctx.peek() != TokenKind::CloseParen {
        if let Err(e) = ctx.ignore_newlines("Expected function argument") {
            free_unbackfilled_arguments(func, backfill);
            return Err(e);
        }

        let is_solid = parse_func_argument(ctx, func, &mut backfill)?;
        if !is_solid {
            continue;
        }

        let takes_variable_arity = func
            .traits
            .intersects(FunctionTraits::VARARG | FunctionTraits::VARIADIC);

        if let Err(e) = ctx.ignore_newlines("Expected type after ',' in argument list") {
            free_unbackfilled_arguments(func, backfill);
            return Err(e);
        }

        if ctx.peek() == TokenKind::Comma && !takes_variable_arity {
            ctx.advance();

            if ctx.peek() == TokenKind::CloseParen {
                free_unbackfilled_arguments(func, backfill);
                return_syntax_error!(
                    "Expected type after ',' in argument list",
                    ctx.peek_source()
                );
            }
        } else if ctx.peek() != TokenKind::CloseParen {
            let error_message = if takes_variable_arity {
                "Expected ')' after variadic argument"
            } else {
                "Expected ',' after argument type"
            };

            free_unbackfilled_arguments(func, backfill);
            return_syntax_error!(error_message, ctx.peek_source());
        }
    }

    if backfill != 0 {
        free_unbackfilled_arguments(func, backfill);
        return_syntax_error!(
            "Expected argument type before end of argument list",
            ctx.peek_source()
        );
    }

    Ok(())
}

/// Parse one argument entry. Returns whether the argument was "solid":
/// fully typed, closing any pending backfill group. Ellipsis markers and
/// name-only entries waiting for a shared type are not solid.
fn parse_func_argument(
    ctx: &mut ParseContext,
    func: &mut AstFunction,
    backfill: &mut usize,
) -> Result<bool, CompilerError> {
    let flow = match ctx.peek() {
        TokenKind::In => {
            ctx.advance();
            Flow::In
        }
        TokenKind::Out => {
            ctx.advance();
            Flow::Out
        }
        TokenKind::InOut => {
            ctx.advance();
            Flow::InOut
        }
        _ => Flow::In,
    };

    let arg_source = ctx.peek_source();

    if ctx.peek() == TokenKind::Ellipsis {
        // Lone ellipsis, used for c-style varargs
        if *backfill != 0 {
            free_unbackfilled_arguments(func, *backfill);
            return_syntax_error!(
                "Expected type for previous arguments before ellipsis",
                ctx.peek_source()
            );
        }

        ctx.advance();
        func.traits |= FunctionTraits::VARARG;
        return Ok(false);
    }

    // Argument name
    let name = if func.traits.contains(FunctionTraits::FOREIGN) {
        // Foreign declarations may omit argument names, so a lone word
        // is only a name if what follows can't end the argument
        let mut lookahead = ctx.tokens.index;
        let mut is_argument_name = false;

        if ctx.peek() == TokenKind::Word {
            lookahead += 1;
            while ctx.tokens.kind_at(lookahead) == TokenKind::Newline {
                lookahead += 1;
            }
            let after = ctx.tokens.kind_at(lookahead);
            if after != TokenKind::Comma && after != TokenKind::CloseParen {
                is_argument_name = true;
            }
        }

        if is_argument_name {
            let no_name_seen_yet = func.args.iter().all(|arg| arg.name.is_none());

            if no_name_seen_yet
                && !func.args.is_empty()
                && func.args[func.args.len() - 1].ast_type.is_base()
            {
                // The previous lone word was committed as a type; it
                // could just as well have been a name
                let previous = &func.args[func.args.len() - 1];
                let previous_source = previous.source;
                let printed = previous.ast_type.to_source(ctx.string_table);

                free_unbackfilled_arguments(func, *backfill);
                return_syntax_error!(
                    format!(
                        "'{printed}' is ambiguous, did you mean '{printed} Type' (as a parameter name) or '_ {printed}' (as a type name)?"
                    ),
                    previous_source
                );
            }

            Some(ctx.take_word(
                "INTERNAL ERROR: Expected argument name while parsing foreign declaration",
            )?)
        } else {
            None
        }
    } else {
        // Otherwise argument names are required
        match ctx.take_word("Expected argument name before argument type") {
            Ok(word) => Some(word),
            Err(e) => {
                free_unbackfilled_arguments(func, *backfill);
                return Err(e);
            }
        }
    };

    if ctx.peek() == TokenKind::Ellipsis {
        // Ellipsis as the type, used for the native variadic argument
        if func.traits.contains(FunctionTraits::FOREIGN) {
            free_unbackfilled_arguments(func, *backfill);
            return_rule_error!(
                "Foreign functions cannot have named variadic arguments",
                ctx.tokens.previous_location()
            );
        }

        if *backfill != 0 {
            free_unbackfilled_arguments(func, *backfill);
            return_syntax_error!(
                "Expected type for previous arguments before ellipsis",
                ctx.peek_source()
            );
        }

        ctx.advance();
        func.traits |= FunctionTraits::VARIADIC;

        // The variadic name lives outside the argument slots
        func.variadic_arg_name = name;
        func.variadic_source = arg_source;
        return Ok(false);
    }

    func.args.push(AstArgument {
        name,
        ast_type: AstType::unresolved(),
        source: arg_source,
        flow,
        type_trait: ArgTypeTrait::None,
        default: None,
    });
    let arg_index = func.args.len() - 1;

    let early_steps = ctx
        .ignore_newlines("Expected type")
        .and_then(|_| parse_default_value_if_applicable(ctx, func, arg_index))
        .and_then(|_| ctx.ignore_newlines("Expected type"));

    if let Err(e) = early_steps {
        discard_argument_and_unbackfilled(func, *backfill);
        return Err(e);
    }

    if !func.traits.contains(FunctionTraits::FOREIGN) && ctx.peek() == TokenKind::Comma {
        ctx.advance();

        if ctx.peek() == TokenKind::CloseParen {
            discard_argument_and_unbackfilled(func, *backfill);
            return_syntax_error!("Expected type after ',' in argument list", ctx.peek_source());
        }

        // This argument waits for a later shared type
        *backfill += 1;
        return Ok(false);
    }

    if ctx.peek() == TokenKind::Pod {
        func.args[arg_index].type_trait = ArgTypeTrait::Pod;
        ctx.advance();
    }

    let typed_steps = ctx
        .ignore_newlines("Expected type")
        .and_then(|_| {
            let parsed = parse_type(ctx)?;
            func.args[arg_index].ast_type = parsed;
            Ok(())
        })
        .and_then(|_| ctx.ignore_newlines("Expected type"))
        .and_then(|_| parse_default_value_if_applicable(ctx, func, arg_index));

    if let Err(e) = typed_steps {
        discard_argument_and_unbackfilled(func, *backfill);
        return Err(e);
    }

    backfill_arguments(func, backfill);
    Ok(true)
}

fn parse_default_value_if_applicable(
    ctx: &mut ParseContext,
    func: &mut AstFunction,
    arg_index: usize,
) -> Result<(), CompilerError> {
    // my_argument float = 0.0
    //                   ^

    if ctx.peek() != TokenKind::Assign {
        return Ok(());
    }

    if func.args[arg_index].default.is_some() {
        return_rule_error!(
            "Function argument already has default value",
            func.args[arg_index].source
        );
    }

    ctx.advance();
    func.args[arg_index].default = Some(parse_expr(ctx)?);
    Ok(())
}

/// Resolve a pending backfill group against the just-typed "master"
/// argument (the rightmost of the group). Each pending argument clones
/// the master's type and type trait. Default values are inherited
/// right-to-left until the first pending argument that already has one.
fn backfill_arguments(func: &mut AstFunction, backfill: &mut usize) {
    let master_index = func.args.len() - 1;
    let master_type = func.args[master_index].ast_type.clone();
    let master_trait = func.args[master_index].type_trait;
    let master_default = func.args[master_index].default.clone();

    let mut backfill_default_values = true;

    for offset in 1..=*backfill {
        let arg_index = master_index - offset;

        func.args[arg_index].ast_type = master_type.clone();
        func.args[arg_index].type_trait = master_trait;

        // Backfill default values only until an argument has its own
        if backfill_default_values {
            match (&master_default, &func.args[arg_index].default) {
                (Some(default), None) => {
                    func.args[arg_index].default = Some(default.clone());
                }
                _ => backfill_default_values = false,
            }
        }
    }

    *backfill = 0;
}

/// Drop pending arguments whose shared type never arrived. Runs on the
/// failure paths so a half-built function never keeps unresolved slots.
fn free_unbackfilled_arguments(func: &mut AstFunction, backfill: usize) {
    func.args.truncate(func.args.len() - backfill);
}

fn discard_argument_and_unbackfilled(func: &mut AstFunction, backfill: usize) {
    func.args.pop();
    free_unbackfilled_arguments(func, backfill);
}

/// Reserved double-underscore functions must match their fixed
/// prototypes exactly; anything else is fatal.
fn enforce_management_prototypes(
    ctx: &mut ParseContext,
    func: &mut AstFunction,
    source: SourceLocation,
) -> Result<(), CompilerError> {
    let table = &*ctx.string_table;
    let arg_named_this =
        |func: &AstFunction, index: usize| match func.args.get(index).and_then(|arg| arg.name) {
            Some(name) => name.eq_str(table, "this"),
            None => false,
        };

    if func.traits == FunctionTraits::DEFER
        && (!func.return_type.is_void(table)
            || func.arity() != 1
            || !arg_named_this(func, 0)
            || !(func.args[0].ast_type.is_base_ptr()
                || func.args[0].ast_type.is_polymorph_ptr()
                || func.args[0].ast_type.is_generic_base_ptr())
            || func.args[0].type_trait != ArgTypeTrait::None)
    {
        return_wellformedness_error!(
            "Management method __defer__ must be declared as 'func __defer__(this *T) void'",
            source
        );
    }

    if func.traits == FunctionTraits::PASS
        && (!(func.return_type.is_base()
            || func.return_type.is_polymorph()
            || func.return_type.is_generic_base()
            || func.return_type.is_fixed_array())
            || func.arity() != 1
            || func.return_type != func.args[0].ast_type
            || func.args[0].type_trait != ArgTypeTrait::Pod)
    {
        return_wellformedness_error!(
            "Management function __pass__ must be declared as 'func __pass__(value POD T) T'",
            source
        );
    }

    if func.name.eq_str(table, "__assign__")
        && (!func.traits.is_empty()
            || !func.return_type.is_void(table)
            || func.arity() != 2
            || !arg_named_this(func, 0)
            || !(func.args[0].ast_type.is_base_ptr()
                || func.args[0].ast_type.is_polymorph_ptr()
                || func.args[0].ast_type.is_generic_base_ptr())
            || !func.args[0].ast_type.is_pointer_to(&func.args[1].ast_type)
            || func.args[0].type_trait != ArgTypeTrait::None)
    {
        return_wellformedness_error!(
            "Management method __assign__ must be declared like 'func __assign__(this *T, other T) void'",
            source
        );
    }

    if func.name.eq_str(table, "__access__")
        && (!func.traits.is_empty()
            || func.arity() != 2
            || !func.args[0].ast_type.is_pointer()
            || !func.return_type.is_pointer()
            || !arg_named_this(func, 0)
            || func.args[0].type_trait != ArgTypeTrait::None)
    {
        return_wellformedness_error!(
            "Management method __access__ must be declared like '__access__(this *T, index $Key) *$Value'",
            source
        );
    }

    if func.name.eq_str(table, "__array__")
        && (!func.traits.is_empty()
            || func.arity() != 1
            || !func.args[0].ast_type.is_pointer()
            || !func.return_type.is_pointer()
            || !arg_named_this(func, 0)
            || func.args[0].type_trait != ArgTypeTrait::None)
    {
        return_wellformedness_error!(
            "Management method __array__ must be declared like '__array__(this *T) *$ArrayElementType'",
            source
        );
    }

    if func.name.eq_str(table, "__length__")
        && (!func.traits.is_empty()
            || func.arity() != 1
            || !func.args[0].ast_type.is_pointer()
            || !func.return_type.is_base_of(table, "usize")
            || !arg_named_this(func, 0)
            || func.args[0].type_trait != ArgTypeTrait::None)
    {
        return_wellformedness_error!(
            "Management method __length__ must be declared like '__length__(this *T) usize'",
            source
        );
    }

    if func.name.eq_str(table, "__variadic_array__") {
        if ctx.ast.common.variadic_array_return.is_some() {
            return_wellformedness_error!(
                "The function __variadic_array__ can only be defined once",
                source
            );
        }

        if func.return_type.is_void(table) {
            return_wellformedness_error!(
                "The function __variadic_array__ must return a value",
                source
            );
        }

        if !func.traits.is_empty()
            || func.arity() != 4
            || !func.args[0].ast_type.is_base_of(table, "ptr")
            || !func.args[1].ast_type.is_base_of(table, "usize")
            || !func.args[2].ast_type.is_base_of(table, "usize")
            || !func.args[3].ast_type.is_base_of(table, "ptr")
            || func.args.iter().any(|arg| arg.type_trait != ArgTypeTrait::None)
        {
            return_wellformedness_error!(
                "Special function __variadic_array__ must be declared like:\n'__variadic_array__(pointer ptr, bytes usize, length usize, maybe_types ptr) ReturnType'",
                source
            );
        }

        ctx.ast.common.variadic_array_return = Some(Box::new(func.return_type.clone()));
        ctx.ast.common.variadic_array_source = func.source;
    }

    if func.name.eq_str(table, "__initializer_list__") {
        if func.return_type.is_void(table) {
            return_wellformedness_error!(
                "The function __initializer_list__ must return a value",
                source
            );
        }

        if !func.traits.is_empty()
            || func.arity() != 2
            || !func.args[1].ast_type.is_base_of(table, "usize")
            || func.args.iter().any(|arg| arg.type_trait != ArgTypeTrait::None)
        {
            return_wellformedness_error!(
                "Special function __initializer_list__ must be declared like:\n'__initializer_list__(array *$T, length usize) <$T> ReturnType'",
                source
            );
        }

        if ctx.ast.common.initializer_list_return.is_none() {
            ctx.ast.common.initializer_list_return = Some(Box::new(func.return_type.clone()));
            ctx.ast.common.initializer_list_source = func.source;
        }
    }

    let name_str = ctx.string_table.resolve(func.name);
    if MATH_MANAGEMENT_FUNCS.binary_search(&name_str).is_ok() {
        // Enforce math management function prototype.
        // The returned type is up to the user; the first argument
        // cannot be a pointer.
        let name_owned = name_str.to_string();

        if func.arity() != 2 {
            return_wellformedness_error!(
                format!("Management method {name_owned} must take two arguments"),
                source
            );
        }

        if func.args[0].ast_type.is_pointer() {
            return_wellformedness_error!(
                format!(
                    "Management method {name_owned} cannot have a pointer as the first argument"
                ),
                source
            );
        }
    }

    Ok(())
}

pub fn parse_func_alias(ctx: &mut ParseContext) -> Result<(), CompilerError> {
    // func alias myAlias(...) => otherFunction
    //  ^

    let source = ctx.peek_source();
    ctx.advance(); // 'func'

    ctx.eat(TokenKind::Alias, "Expected 'alias' keyword for function alias")?;

    let from = if ctx.config.colon_colon && ctx.prename.is_some() {
        ctx.prename.take().unwrap()
    } else {
        ctx.take_word("Expected function alias name")?
    };

    let from = ctx.prepend_namespace(from);

    let (arg_types, required_traits, match_first_of_name) = parse_func_alias_args(ctx)?;

    ctx.eat(
        TokenKind::StrongArrow,
        "Expected '=>' after argument types for function alias",
    )?;

    let to = ctx.take_word("Expected function alias destination name")?;

    if ctx.ast.func_aliases.len() >= MAX_FUNC_ID {
        return_limit_error!("Maximum number of AST function aliases reached", source);
    }

    if ctx.ast.func_aliases.is_empty() {
        ctx.ast.func_aliases.reserve(FUNC_ALIAS_CAPACITY_GUESS);
    }

    ctx.ast.func_aliases.push(FunctionAlias {
        from,
        to,
        arg_types,
        required_traits,
        source,
        match_first_of_name,
    });

    Ok(())
}

fn parse_func_alias_args(
    ctx: &mut ParseContext,
) -> Result<(Vec<AstType>, FunctionTraits, bool), CompilerError> {
    // func alias myAlias(...) => otherFunction
    //                   ^

    let mut arg_types: Vec<AstType> = Vec::new();
    let mut required_traits = FunctionTraits::empty();

    // Without an argument-type list the alias matches the first
    // function of the target name
    if ctx.peek() != TokenKind::OpenParen {
        return Ok((arg_types, required_traits, true));
    }
    ctx.advance();

    while ctx.peek() != TokenKind::CloseParen {
        ctx.ignore_newlines("Expected argument type for function alias")?;

        match ctx.peek() {
            TokenKind::Ellipsis => {
                // '...'
                required_traits |= FunctionTraits::VARARG;
                ctx.advance();
            }
            TokenKind::Range => {
                // '..'
                required_traits |= FunctionTraits::VARIADIC;
                ctx.advance();
            }
            _ => {
                arg_types.push(parse_type(ctx)?);
            }
        }

        ctx.ignore_newlines("Expected argument type for function alias")?;

        if ctx.peek() == TokenKind::Comma {
            if required_traits.intersects(FunctionTraits::VARARG | FunctionTraits::VARIADIC) {
                return_syntax_error!("Expected ')' after variadic argument", ctx.peek_source());
            }

            ctx.advance();

            if ctx.peek() == TokenKind::CloseParen {
                return_syntax_error!(
                    "Expected type after ',' in argument types",
                    ctx.peek_source()
                );
            }
        } else if ctx.peek() != TokenKind::CloseParen {
            let takes_variable_arity =
                required_traits.intersects(FunctionTraits::VARARG | FunctionTraits::VARIADIC);

            let error_message = if takes_variable_arity {
                "Expected ')' after variadic argument"
            } else {
                "Expected ',' after argument type"
            };

            return_syntax_error!(error_message, ctx.peek_source());
        }
    }

    ctx.eat(
        TokenKind::CloseParen,
        "Expected ')' after function alias argument types",
    )?;

    // The list form always matches a specific overload
    Ok((arg_types, required_traits, false))
}
