//! Statement parsing.
//!
//! Each braced block gets its own defer scope. Deferred statements are
//! spliced back into the statement list at every exit from their scope:
//! in reverse order at the end of the block, and onto the unwind list of
//! every `return` that crosses them.

use crate::ast::expressions::ExprKind;
use crate::ast::statements::{Stmt, StmtKind};
use crate::diagnostics::compiler_errors::CompilerError;
use crate::parser::parse_ctx::ParseContext;
use crate::parser::parse_expr::parse_expr;
use crate::parser::parse_type::parse_type;
use crate::return_syntax_error;
use crate::settings::STATEMENT_CAPACITY_GUESS;
use crate::string_interning::StringId;
use crate::tokens::token_data::TokenKind;

pub struct DeferScope<'p> {
    pub parent: Option<&'p DeferScope<'p>>,
    pub label: Option<StringId>,
    pub statements: Vec<Stmt>,
}

impl<'p> DeferScope<'p> {
    pub fn new(parent: Option<&'p DeferScope<'p>>, label: Option<StringId>) -> Self {
        Self {
            parent,
            label,
            statements: Vec::new(),
        }
    }

    /// Deferred statements of this scope and every enclosing one,
    /// innermost first, each scope's list reversed. This is what a
    /// `return` must run before leaving the function.
    pub fn collect_full_unwind(&self) -> Vec<Stmt> {
        let mut unwind = Vec::new();
        let mut scope = Some(self);

        while let Some(current) = scope {
            unwind.extend(current.statements.iter().rev().cloned());
            scope = current.parent;
        }

        unwind
    }
}

/// Parse `{ ... }` into a statement list, running this block's deferred
/// statements (in reverse) at its end.
pub fn parse_braced_block(
    ctx: &mut ParseContext,
    parent: Option<&DeferScope>,
    label: Option<StringId>,
) -> Result<Vec<Stmt>, CompilerError> {
    ctx.eat(TokenKind::OpenBrace, "Expected '{' to begin block")?;

    let mut stmts = Vec::with_capacity(STATEMENT_CAPACITY_GUESS);
    let mut defer_scope = DeferScope::new(parent, label);

    parse_stmts(ctx, &mut stmts, &mut defer_scope)?;

    ctx.eat(TokenKind::CloseBrace, "Expected '}' to close block")?;

    stmts.extend(defer_scope.statements.into_iter().rev());
    Ok(stmts)
}

/// Parse statements until the closing brace of the current block.
/// The brace itself is left for the caller.
pub fn parse_stmts(
    ctx: &mut ParseContext,
    stmts: &mut Vec<Stmt>,
    defer_scope: &mut DeferScope,
) -> Result<(), CompilerError> {
    loop {
        while ctx.peek() == TokenKind::Newline || ctx.peek() == TokenKind::Semicolon {
            ctx.advance();
        }

        match ctx.peek() {
            TokenKind::CloseBrace => return Ok(()),
            TokenKind::None => {
                return_syntax_error!("Expected '}' before end of stream", ctx.peek_source());
            }
            _ => parse_stmt(ctx, stmts, defer_scope)?,
        }
    }
}

fn parse_stmt(
    ctx: &mut ParseContext,
    stmts: &mut Vec<Stmt>,
    defer_scope: &mut DeferScope,
) -> Result<(), CompilerError> {
    let source = ctx.peek_source();

    match ctx.peek() {
        TokenKind::Return => {
            ctx.advance();

            let value = match ctx.peek() {
                TokenKind::Newline | TokenKind::CloseBrace | TokenKind::None => None,
                _ => Some(parse_expr(ctx)?),
            };

            stmts.push(Stmt::new(
                StmtKind::Return {
                    value,
                    unwind: defer_scope.collect_full_unwind(),
                },
                source,
            ));
        }

        TokenKind::If | TokenKind::Unless => {
            let invert = ctx.peek() == TokenKind::Unless;
            ctx.advance();

            let condition = parse_expr(ctx)?;
            ctx.ignore_newlines("Expected '{' after condition")?;

            let then_block = parse_braced_block(ctx, Some(&*defer_scope), None)?;
            let else_block = parse_else_block(ctx, defer_scope)?;

            stmts.push(Stmt::new(
                StmtKind::Conditional {
                    condition,
                    invert,
                    then_block,
                    else_block,
                },
                source,
            ));
        }

        TokenKind::While | TokenKind::Until => {
            let invert = ctx.peek() == TokenKind::Until;
            ctx.advance();

            // `while retry: cond { }` names the loop for break/continue
            let label = if ctx.peek() == TokenKind::Word
                && ctx.tokens.peek_kind(1) == TokenKind::Colon
            {
                let label = ctx.take_word("Expected loop label")?;
                ctx.advance(); // ':'
                Some(label)
            } else {
                None
            };

            let condition = parse_expr(ctx)?;
            ctx.ignore_newlines("Expected '{' after loop condition")?;

            let statements = parse_braced_block(ctx, Some(&*defer_scope), label)?;

            stmts.push(Stmt::new(
                StmtKind::WhileLoop {
                    label,
                    condition,
                    invert,
                    statements,
                },
                source,
            ));
        }

        TokenKind::Break => {
            ctx.advance();
            let label = take_optional_label(ctx)?;
            stmts.push(Stmt::new(StmtKind::Break { label }, source));
        }

        TokenKind::Continue => {
            ctx.advance();
            let label = take_optional_label(ctx)?;
            stmts.push(Stmt::new(StmtKind::Continue { label }, source));
        }

        TokenKind::Defer => {
            ctx.advance();

            // The deferred statement lands in the defer scope, not in
            // the statement list; it reappears at scope exits
            let mut deferred = Vec::with_capacity(1);
            parse_stmt(ctx, &mut deferred, &mut DeferScope::new(None, None))?;
            defer_scope.statements.extend(deferred);
        }

        TokenKind::Word => parse_word_stmt(ctx, stmts)?,

        TokenKind::Multiply => {
            // `*pointer = value`
            let target = parse_expr(ctx)?;
            ctx.eat(TokenKind::Assign, "Expected '=' after dereference target")?;
            let value = parse_expr(ctx)?;
            stmts.push(Stmt::new(StmtKind::Assign { target, value }, source));
        }

        _ => {
            return_syntax_error!(
                format!("Unexpected '{}' in statement position", ctx.peek().name()),
                source
            );
        }
    }

    Ok(())
}

fn parse_else_block(
    ctx: &mut ParseContext,
    defer_scope: &mut DeferScope,
) -> Result<Option<Vec<Stmt>>, CompilerError> {
    // 'else' may sit on the next line
    let mut lookahead = ctx.tokens.index;
    while ctx.tokens.kind_at(lookahead) == TokenKind::Newline {
        lookahead += 1;
    }

    if ctx.tokens.kind_at(lookahead) != TokenKind::Else {
        return Ok(None);
    }

    while ctx.peek() == TokenKind::Newline {
        ctx.advance();
    }
    ctx.advance(); // 'else'

    // `else if ...` chains nest as a single-statement else block
    if matches!(ctx.peek(), TokenKind::If | TokenKind::Unless) {
        let mut chained = Vec::with_capacity(1);
        parse_stmt(ctx, &mut chained, defer_scope)?;
        return Ok(Some(chained));
    }

    ctx.ignore_newlines("Expected '{' after 'else'")?;
    Ok(Some(parse_braced_block(ctx, Some(&*defer_scope), None)?))
}

fn take_optional_label(ctx: &mut ParseContext) -> Result<Option<StringId>, CompilerError> {
    if ctx.peek() == TokenKind::Word {
        return Ok(Some(ctx.take_word("Expected loop label")?));
    }

    Ok(None)
}

/// Statements that open with a word: calls, assignments, declarations.
fn parse_word_stmt(ctx: &mut ParseContext, stmts: &mut Vec<Stmt>) -> Result<(), CompilerError> {
    let source = ctx.peek_source();

    match ctx.tokens.peek_kind(1) {
        TokenKind::OpenParen => {
            let call = parse_expr(ctx)?;
            stmts.push(Stmt::new(StmtKind::Call(call), source));
        }

        TokenKind::Assign => {
            let name = ctx.take_word("Expected assignment target")?;
            ctx.advance(); // '='
            let value = parse_expr(ctx)?;
            stmts.push(Stmt::new(
                StmtKind::Assign {
                    target: crate::ast::expressions::Expr::new(ExprKind::Variable(name), source),
                    value,
                },
                source,
            ));
        }

        TokenKind::Dot => {
            // Member chain: either an assignment target or nothing we
            // can lower as a statement
            let target = parse_expr(ctx)?;

            if ctx.peek() == TokenKind::Assign {
                ctx.advance();
                let value = parse_expr(ctx)?;
                stmts.push(Stmt::new(StmtKind::Assign { target, value }, source));
            } else {
                return_syntax_error!("Expected '=' after member access", ctx.peek_source());
            }
        }

        _ => {
            // Local declaration: `name Type`, optionally `= value` or
            // `= undef`
            let name = ctx.take_word("Expected statement")?;

            let is_pod = if ctx.peek() == TokenKind::Pod {
                ctx.advance();
                true
            } else {
                false
            };

            let ast_type = parse_type(ctx)?;

            let mut value = None;
            let mut is_undef = false;

            if ctx.peek() == TokenKind::Assign {
                ctx.advance();

                if ctx.peek() == TokenKind::Undef {
                    ctx.advance();
                    is_undef = true;
                } else {
                    value = Some(parse_expr(ctx)?);
                }
            }

            stmts.push(Stmt::new(
                StmtKind::Declare {
                    name,
                    ast_type,
                    value,
                    is_undef,
                    is_pod,
                },
                source,
            ));
        }
    }

    Ok(())
}
