//! Composite (struct / union / record) and enum declarations.
//!
//! A composite may carry a braced domain block after its field list;
//! functions declared there become its methods and receive an implicit
//! `this` first argument (see `parse_func`).

use crate::ast::ast::{Composite, CompositeField, CompositeKind, EnumDefinition, TypeAlias};
use crate::diagnostics::compiler_errors::CompilerError;
use crate::parser::parse_ctx::{CompositeAssociation, ParseContext};
use crate::parser::parse_func::parse_func;
use crate::parser::parse_type::parse_type;
use crate::return_syntax_error;
use crate::string_interning::StringId;
use crate::tokens::token_data::TokenKind;
use crate::tokens::tokens::TokenData;

pub fn parse_composite(ctx: &mut ParseContext, is_packed: bool) -> Result<(), CompilerError> {
    let source = ctx.peek_source();

    let kind = match ctx.peek() {
        TokenKind::Struct => CompositeKind::Struct,
        TokenKind::Union => CompositeKind::Union,
        TokenKind::Record => CompositeKind::Record,
        _ => {
            return_syntax_error!("Expected composite keyword", source);
        }
    };
    ctx.advance();

    // Formal type parameters: `struct <$A, $B> Name (...)`
    let generics = if ctx.peek() == TokenKind::LessThan {
        parse_composite_generics(ctx)?
    } else {
        Vec::new()
    };

    let name = ctx.take_word("Expected composite name")?;
    let name = ctx.prepend_namespace(name);

    ctx.ignore_newlines("Expected '(' after composite name")?;
    ctx.eat(TokenKind::OpenParen, "Expected '(' after composite name")?;

    let fields = parse_composite_fields(ctx)?;

    ctx.ast.composites.push(Composite {
        name,
        kind,
        fields,
        generics: generics.clone(),
        is_packed,
        source,
    });

    // Optional domain block with the composite's methods
    let mut lookahead = ctx.tokens.index;
    while ctx.tokens.kind_at(lookahead) == TokenKind::Newline {
        lookahead += 1;
    }

    if ctx.tokens.kind_at(lookahead) == TokenKind::OpenBrace {
        while ctx.peek() == TokenKind::Newline {
            ctx.advance();
        }
        ctx.advance(); // '{'

        ctx.composite_association = Some(CompositeAssociation {
            name,
            generics,
            source,
        });
        let result = parse_composite_domain(ctx);
        ctx.composite_association = None;
        result?;
    }

    Ok(())
}

fn parse_composite_generics(ctx: &mut ParseContext) -> Result<Vec<StringId>, CompilerError> {
    ctx.advance(); // '<'

    let mut generics = Vec::with_capacity(2);

    loop {
        ctx.ignore_newlines("Expected type parameter")?;

        if ctx.peek() != TokenKind::Polymorph {
            return_syntax_error!(
                "Expected '$' type parameter in composite type parameters",
                ctx.peek_source()
            );
        }

        let TokenData::Word(generic) = ctx.tokens.current_data() else {
            return Err(CompilerError::new_internal_error(
                "Polymorph token is missing its name payload",
                ctx.peek_source(),
            ));
        };
        generics.push(*generic);
        ctx.advance();

        match ctx.peek() {
            TokenKind::Comma => ctx.advance(),
            TokenKind::GreaterThan => {
                ctx.advance();
                return Ok(generics);
            }
            _ => {
                return_syntax_error!("Expected ',' or '>' after type parameter", ctx.peek_source());
            }
        }
    }
}

/// Field lists support the same shared-type grouping as argument lists:
/// `x, y, z int` gives all three fields the type `int`.
fn parse_composite_fields(ctx: &mut ParseContext) -> Result<Vec<CompositeField>, CompilerError> {
    let mut fields: Vec<CompositeField> = Vec::new();
    let mut pending: Vec<(StringId, crate::tokens::tokens::SourceLocation)> = Vec::new();

    while ctx.peek() != TokenKind::CloseParen {
        ctx.ignore_newlines("Expected composite field")?;

        let field_source = ctx.peek_source();
        let field_name = ctx.take_word("Expected field name")?;

        if ctx.peek() == TokenKind::Comma {
            ctx.advance();
            pending.push((field_name, field_source));
            continue;
        }

        let ast_type = parse_type(ctx)?;

        for (pending_name, pending_source) in pending.drain(..) {
            fields.push(CompositeField {
                name: pending_name,
                ast_type: ast_type.clone(),
                source: pending_source,
            });
        }

        fields.push(CompositeField {
            name: field_name,
            ast_type,
            source: field_source,
        });

        ctx.ignore_newlines("Expected ')' after composite fields")?;

        match ctx.peek() {
            TokenKind::Comma => {
                ctx.advance();

                ctx.ignore_newlines("Expected field after ','")?;
                if ctx.peek() == TokenKind::CloseParen {
                    return_syntax_error!("Expected field after ','", ctx.peek_source());
                }
            }
            TokenKind::CloseParen => break,
            _ => {
                return_syntax_error!("Expected ',' after field type", ctx.peek_source());
            }
        }
    }

    if !pending.is_empty() {
        return_syntax_error!(
            "Expected field type before end of field list",
            ctx.peek_source()
        );
    }

    ctx.eat(TokenKind::CloseParen, "Expected ')' after composite fields")?;
    Ok(fields)
}

fn parse_composite_domain(ctx: &mut ParseContext) -> Result<(), CompilerError> {
    loop {
        while ctx.peek() == TokenKind::Newline {
            ctx.advance();
        }

        match ctx.peek() {
            TokenKind::CloseBrace => {
                ctx.advance();
                return Ok(());
            }

            TokenKind::Func
            | TokenKind::Foreign
            | TokenKind::StdCall
            | TokenKind::Verbatim
            | TokenKind::Implicit
            | TokenKind::External => parse_func(ctx)?,

            TokenKind::None => {
                return_syntax_error!(
                    "Expected '}' to close composite domain",
                    ctx.peek_source()
                );
            }

            _ => {
                return_syntax_error!(
                    format!(
                        "Unexpected '{}' inside composite domain",
                        ctx.peek().name()
                    ),
                    ctx.peek_source()
                );
            }
        }
    }
}

pub fn parse_enum(ctx: &mut ParseContext) -> Result<(), CompilerError> {
    let source = ctx.peek_source();
    ctx.advance(); // 'enum'

    let name = ctx.take_word("Expected enum name")?;
    let name = ctx.prepend_namespace(name);

    ctx.ignore_newlines("Expected '(' after enum name")?;
    ctx.eat(TokenKind::OpenParen, "Expected '(' after enum name")?;

    let mut variants = Vec::new();

    while ctx.peek() != TokenKind::CloseParen {
        ctx.ignore_newlines("Expected enum variant")?;
        variants.push(ctx.take_word("Expected enum variant name")?);
        ctx.ignore_newlines("Expected ')' after enum variants")?;

        match ctx.peek() {
            TokenKind::Comma => {
                ctx.advance();
            }
            TokenKind::CloseParen => break,
            _ => {
                return_syntax_error!("Expected ',' after enum variant", ctx.peek_source());
            }
        }
    }

    ctx.eat(TokenKind::CloseParen, "Expected ')' after enum variants")?;

    ctx.ast.enums.push(EnumDefinition {
        name,
        variants,
        source,
    });
    Ok(())
}

/// `alias Name = Type`
pub fn parse_type_alias(ctx: &mut ParseContext) -> Result<(), CompilerError> {
    let source = ctx.peek_source();
    ctx.advance(); // 'alias'

    let name = ctx.take_word("Expected alias name")?;
    let name = ctx.prepend_namespace(name);

    ctx.eat(TokenKind::Assign, "Expected '=' after alias name")?;

    let ast_type = parse_type(ctx)?;

    ctx.ast.type_aliases.push(TypeAlias {
        name,
        ast_type,
        source,
    });
    Ok(())
}
