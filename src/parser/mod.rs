//! Token stream -> AST reduction.
//!
//! The entry point is [`parse`]. Top-level dispatch hands each
//! declaration off to the matching production; any fatal error aborts
//! the whole reduction, leaving the cursor wherever the failure was.

pub mod parse_composite;
pub mod parse_ctx;
pub mod parse_expr;
pub mod parse_func;
pub mod parse_stmt;
pub mod parse_type;

#[cfg(test)]
mod tests;

use crate::ast::ast::{Ast, FunctionTraits, GlobalVariable};
use crate::diagnostics::compiler_errors::{CompilerError, CompilerMessages};
use crate::parser::parse_composite::{parse_composite, parse_enum, parse_type_alias};
use crate::parser::parse_ctx::ParseContext;
use crate::parser::parse_expr::parse_expr;
use crate::parser::parse_func::parse_func;
use crate::parser::parse_type::parse_type;
use crate::return_syntax_error;
use crate::settings::Config;
use crate::string_interning::StringTable;
use crate::tokens::token_data::TokenKind;
use crate::tokens::tokens::{TokenData, TokenList};

/// Reduce one token stream into an AST.
pub fn parse(
    tokens: &mut TokenList,
    config: &Config,
    string_table: &mut StringTable,
) -> Result<Ast, CompilerMessages> {
    let mut ast = Ast::new();
    let mut ctx = ParseContext::new(tokens, &mut ast, config, string_table);

    match parse_top_level(&mut ctx) {
        Ok(()) => Ok(ast),
        Err(error) => Err(CompilerMessages::from_error(error)),
    }
}

fn parse_top_level(ctx: &mut ParseContext) -> Result<(), CompilerError> {
    loop {
        while matches!(ctx.peek(), TokenKind::Newline | TokenKind::Semicolon) {
            ctx.advance();
        }

        match ctx.peek() {
            TokenKind::None => return Ok(()),

            TokenKind::Func
            | TokenKind::Foreign
            | TokenKind::StdCall
            | TokenKind::Verbatim
            | TokenKind::Implicit
            | TokenKind::External => parse_func(ctx)?,

            TokenKind::Struct | TokenKind::Union | TokenKind::Record => {
                parse_composite(ctx, false)?
            }

            TokenKind::Packed => {
                ctx.advance();

                if !matches!(
                    ctx.peek(),
                    TokenKind::Struct | TokenKind::Union | TokenKind::Record
                ) {
                    return_syntax_error!(
                        "Expected 'struct', 'union' or 'record' after 'packed'",
                        ctx.peek_source()
                    );
                }

                parse_composite(ctx, true)?
            }

            TokenKind::Enum => parse_enum(ctx)?,

            TokenKind::Alias => parse_type_alias(ctx)?,

            TokenKind::Global => {
                ctx.advance();
                parse_global(ctx, false)?
            }

            TokenKind::ThreadLocal => {
                ctx.advance();
                ctx.eat(TokenKind::Global, "Expected 'global' after 'thread_local'")?;
                parse_global(ctx, true)?
            }

            TokenKind::Namespace => {
                ctx.advance();
                let namespace = ctx.take_word("Expected namespace name")?;
                ctx.namespace = Some(namespace);
            }

            TokenKind::Import => {
                ctx.advance();

                let TokenData::Str(path) = ctx.tokens.current_data() else {
                    return_syntax_error!(
                        "Expected import path string after 'import'",
                        ctx.peek_source()
                    );
                };
                ctx.ast.imports.push(path.clone());
                ctx.advance();
            }

            TokenKind::Pragma => parse_pragma(ctx)?,

            TokenKind::Word => {
                // `Name :: func ...` stashes the name for the head parse
                if ctx.config.colon_colon && ctx.tokens.peek_kind(1) == TokenKind::DoubleColon {
                    let prename = ctx.take_word("Expected declaration name")?;
                    ctx.advance(); // '::'

                    if !matches!(
                        ctx.peek(),
                        TokenKind::Func
                            | TokenKind::Foreign
                            | TokenKind::StdCall
                            | TokenKind::Verbatim
                            | TokenKind::Implicit
                            | TokenKind::External
                    ) {
                        return_syntax_error!(
                            "Expected function declaration after '::'",
                            ctx.peek_source()
                        );
                    }

                    ctx.prename = Some(prename);
                    parse_func(ctx)?;
                } else {
                    // Bare `name Type [= value]` declares a global
                    parse_global(ctx, false)?;
                }
            }

            _ => {
                return_syntax_error!(
                    format!("Unexpected '{}' at top level", ctx.peek().name()),
                    ctx.peek_source()
                );
            }
        }
    }
}

fn parse_global(ctx: &mut ParseContext, is_thread_local: bool) -> Result<(), CompilerError> {
    let source = ctx.peek_source();

    let name = ctx.take_word("Expected global variable name")?;
    let name = ctx.prepend_namespace(name);

    let ast_type = parse_type(ctx)?;

    let initial = if ctx.peek() == TokenKind::Assign {
        ctx.advance();
        Some(parse_expr(ctx)?)
    } else {
        None
    };

    ctx.ast.globals.push(GlobalVariable {
        name,
        ast_type,
        initial,
        is_thread_local,
        source,
    });
    Ok(())
}

fn parse_pragma(ctx: &mut ParseContext) -> Result<(), CompilerError> {
    ctx.advance(); // 'pragma'

    let source = ctx.peek_source();
    let directive = ctx.take_word("Expected pragma directive")?;

    if directive.eq_str(ctx.string_table, "builtin") {
        // The next declaration is part of the language runtime
        ctx.next_builtin_traits |= FunctionTraits::BUILTIN;
        return Ok(());
    }

    let directive_name = ctx.string_table.resolve(directive).to_string();
    return_syntax_error!(format!("Unrecognized pragma '{directive_name}'"), source);
}
