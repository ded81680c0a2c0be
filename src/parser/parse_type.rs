//! The type parser.
//!
//! Types are read outside-in: prefix elements (`*`, `[N]`, `<...>`) pile
//! up until a terminal element (base name, polymorph, generic base, or
//! function pointer) closes the sequence.

use crate::ast::ast_types::{AstType, FuncPointerShape, TypeElement};
use crate::ast::expressions::ExprKind;
use crate::diagnostics::compiler_errors::CompilerError;
use crate::parser::parse_ctx::ParseContext;
use crate::parser::parse_expr::parse_expr;
use crate::return_syntax_error;
use crate::tokens::token_data::TokenKind;
use crate::tokens::tokens::TokenData;

pub fn parse_type(ctx: &mut ParseContext) -> Result<AstType, CompilerError> {
    let source = ctx.peek_source();
    let mut elements: Vec<TypeElement> = Vec::with_capacity(2);

    loop {
        match ctx.peek() {
            TokenKind::Multiply => {
                elements.push(TypeElement::Pointer);
                ctx.advance();
            }

            TokenKind::OpenBracket => {
                ctx.advance();
                ctx.ignore_newlines("Expected array length")?;

                let length = parse_expr(ctx)?;

                ctx.ignore_newlines("Expected ']' after array length")?;
                ctx.eat(TokenKind::CloseBracket, "Expected ']' after array length")?;

                // Literal counts go straight to fixed arrays; anything
                // else stays an expression until the collapse pass
                match length.kind {
                    ExprKind::IntLiteral(value) if value >= 0 => {
                        elements.push(TypeElement::FixedArray(value as u64));
                    }
                    _ => elements.push(TypeElement::VarFixedArray(Box::new(length))),
                }
            }

            TokenKind::LessThan => {
                elements.push(parse_generic_base(ctx)?);
                break;
            }

            TokenKind::Polymorph => {
                elements.push(parse_polymorph(ctx)?);
                break;
            }

            TokenKind::Word => {
                let name = ctx.take_word("Expected type name")?;
                elements.push(TypeElement::Base(name));
                break;
            }

            TokenKind::Func | TokenKind::FuncPtr => {
                elements.push(parse_func_pointer(ctx)?);
                break;
            }

            _ => {
                return_syntax_error!(
                    format!("Expected type, found '{}'", ctx.peek().name()),
                    ctx.peek_source()
                );
            }
        }
    }

    Ok(AstType { elements, source })
}

/// `<$A, $B> StructName`
fn parse_generic_base(ctx: &mut ParseContext) -> Result<TypeElement, CompilerError> {
    ctx.eat(TokenKind::LessThan, "Expected '<' to begin type parameters")?;

    let mut generics = Vec::with_capacity(2);

    loop {
        ctx.ignore_newlines("Expected type parameter")?;
        generics.push(parse_type(ctx)?);
        ctx.ignore_newlines("Expected '>' after type parameters")?;

        match ctx.peek() {
            TokenKind::Comma => {
                ctx.advance();
            }
            TokenKind::GreaterThan => break,
            _ => {
                return_syntax_error!("Expected ',' or '>' after type parameter", ctx.peek_source());
            }
        }
    }

    ctx.eat(TokenKind::GreaterThan, "Expected '>' after type parameters")?;

    let name = ctx.take_word("Expected type name after type parameters")?;

    Ok(TypeElement::GenericBase { name, generics })
}

/// `$T`, `$~T`, or `$T~Likeness` where prerequisites are allowed
fn parse_polymorph(ctx: &mut ParseContext) -> Result<TypeElement, CompilerError> {
    let source = ctx.peek_source();

    let TokenData::Word(raw_name) = ctx.tokens.current_data() else {
        return Err(CompilerError::new_internal_error(
            "Polymorph token is missing its name payload",
            source,
        ));
    };
    let raw_name = *raw_name;
    ctx.advance();

    // Lexers encode `$~T` by prefixing the name with '~'
    let raw = ctx.string_table.resolve(raw_name).to_string();
    let (allow_auto_conversion, name) = match raw.strip_prefix('~') {
        Some(stripped) => (true, ctx.string_table.intern(stripped)),
        None => (false, raw_name),
    };

    let mut prerequisite = None;

    if ctx.peek() == TokenKind::BitComplement {
        if !ctx.allow_polymorphic_prereqs {
            return_syntax_error!(
                "Polymorphic prerequisites are only allowed on function arguments",
                ctx.peek_source()
            );
        }

        ctx.advance();
        prerequisite = Some(ctx.take_word("Expected prerequisite name after '~'")?);
    }

    Ok(TypeElement::Polymorph {
        name,
        allow_auto_conversion,
        prerequisite,
    })
}

/// `func(int, int) int`, with an optional trailing `...`
fn parse_func_pointer(ctx: &mut ParseContext) -> Result<TypeElement, CompilerError> {
    ctx.advance(); // func / funcptr
    ctx.eat(TokenKind::OpenParen, "Expected '(' after 'func' in type")?;

    let mut arg_types = Vec::new();
    let mut is_vararg = false;

    while ctx.peek() != TokenKind::CloseParen {
        ctx.ignore_newlines("Expected argument type in function pointer type")?;

        if ctx.peek() == TokenKind::Ellipsis {
            ctx.advance();
            is_vararg = true;

            ctx.ignore_newlines("Expected ')' after '...'")?;
            if ctx.peek() != TokenKind::CloseParen {
                return_syntax_error!("Expected ')' after '...'", ctx.peek_source());
            }
            break;
        }

        arg_types.push(parse_type(ctx)?);
        ctx.ignore_newlines("Expected ')' after function pointer argument types")?;

        match ctx.peek() {
            TokenKind::Comma => ctx.advance(),
            TokenKind::CloseParen => break,
            _ => {
                return_syntax_error!("Expected ',' after argument type", ctx.peek_source());
            }
        }
    }

    ctx.eat(
        TokenKind::CloseParen,
        "Expected ')' after function pointer argument types",
    )?;

    let return_type = parse_type(ctx)?;

    Ok(TypeElement::FuncPointer(Box::new(FuncPointerShape {
        arg_types,
        return_type,
        is_vararg,
    })))
}
