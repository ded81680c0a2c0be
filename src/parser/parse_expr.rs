//! Expression parsing by precedence climbing.

use crate::ast::expressions::{BinaryOp, Expr, ExprKind, UnaryOp};
use crate::diagnostics::compiler_errors::CompilerError;
use crate::parser::parse_ctx::ParseContext;
use crate::return_syntax_error;
use crate::tokens::token_data::TokenKind;
use crate::tokens::tokens::TokenData;

pub fn parse_expr(ctx: &mut ParseContext) -> Result<Expr, CompilerError> {
    let primary = parse_primary(ctx)?;
    parse_op_expr(ctx, primary, 0)
}

fn parse_op_expr(
    ctx: &mut ParseContext,
    mut lhs: Expr,
    min_precedence: u8,
) -> Result<Expr, CompilerError> {
    while let Some(op) = token_to_binary_op(ctx.peek()) {
        if op.precedence() < min_precedence {
            break;
        }

        let source = ctx.peek_source();
        ctx.advance();
        ctx.ignore_newlines("Expected operand after operator")?;

        let mut rhs = parse_primary(ctx)?;

        // Fold in any tighter-binding operators on the right first
        while let Some(next_op) = token_to_binary_op(ctx.peek()) {
            if next_op.precedence() <= op.precedence() {
                break;
            }
            rhs = parse_op_expr(ctx, rhs, op.precedence() + 1)?;
        }

        lhs = Expr::new(
            ExprKind::Binary {
                op,
                left: Box::new(lhs),
                right: Box::new(rhs),
            },
            source,
        );
    }

    Ok(lhs)
}

fn parse_primary(ctx: &mut ParseContext) -> Result<Expr, CompilerError> {
    let source = ctx.peek_source();

    let mut value = match ctx.peek() {
        TokenKind::GenericInt
        | TokenKind::ByteLiteral
        | TokenKind::UbyteLiteral
        | TokenKind::ShortLiteral
        | TokenKind::UshortLiteral
        | TokenKind::IntLiteral
        | TokenKind::UintLiteral
        | TokenKind::LongLiteral
        | TokenKind::UlongLiteral
        | TokenKind::UsizeLiteral => {
            let TokenData::Int(literal) = ctx.tokens.current_data() else {
                return Err(CompilerError::new_internal_error(
                    "Integer literal token is missing its value payload",
                    source,
                ));
            };
            let literal = *literal;
            ctx.advance();
            Expr::new(ExprKind::IntLiteral(literal), source)
        }

        TokenKind::GenericFloat | TokenKind::FloatLiteral | TokenKind::DoubleLiteral => {
            let TokenData::Float(literal) = ctx.tokens.current_data() else {
                return Err(CompilerError::new_internal_error(
                    "Float literal token is missing its value payload",
                    source,
                ));
            };
            let literal = *literal;
            ctx.advance();
            Expr::new(ExprKind::FloatLiteral(literal), source)
        }

        TokenKind::True => {
            ctx.advance();
            Expr::new(ExprKind::BoolLiteral(true), source)
        }

        TokenKind::False => {
            ctx.advance();
            Expr::new(ExprKind::BoolLiteral(false), source)
        }

        TokenKind::Null => {
            ctx.advance();
            Expr::new(ExprKind::NullLiteral, source)
        }

        TokenKind::String => {
            let TokenData::Str(content) = ctx.tokens.current_data() else {
                return Err(CompilerError::new_internal_error(
                    "String literal token is missing its content payload",
                    source,
                ));
            };
            let content = content.clone();
            ctx.advance();
            Expr::new(ExprKind::StrLiteral(content), source)
        }

        TokenKind::CString => {
            let TokenData::Str(content) = ctx.tokens.current_data() else {
                return Err(CompilerError::new_internal_error(
                    "C-string literal token is missing its content payload",
                    source,
                ));
            };
            let content = content.clone();
            ctx.advance();
            Expr::new(ExprKind::CStrLiteral(content), source)
        }

        TokenKind::Polycount => {
            let TokenData::Word(name) = ctx.tokens.current_data() else {
                return Err(CompilerError::new_internal_error(
                    "Count variable token is missing its name payload",
                    source,
                ));
            };
            let name = *name;
            ctx.advance();
            Expr::new(ExprKind::Polycount(name), source)
        }

        TokenKind::Word => {
            let name = ctx.take_word("Expected expression")?;

            if ctx.peek() == TokenKind::OpenParen {
                let args = parse_call_args(ctx)?;
                Expr::new(ExprKind::Call { name, args }, source)
            } else {
                Expr::new(ExprKind::Variable(name), source)
            }
        }

        TokenKind::OpenParen => {
            ctx.advance();
            ctx.ignore_newlines("Expected expression after '('")?;
            let inner = parse_expr(ctx)?;
            ctx.ignore_newlines("Expected ')' after expression")?;
            ctx.eat(TokenKind::CloseParen, "Expected ')' after expression")?;
            inner
        }

        TokenKind::Subtract => {
            ctx.advance();
            let operand = parse_primary(ctx)?;
            Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Negate,
                    value: Box::new(operand),
                },
                source,
            )
        }

        TokenKind::Not => {
            ctx.advance();
            let operand = parse_primary(ctx)?;
            Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Not,
                    value: Box::new(operand),
                },
                source,
            )
        }

        TokenKind::BitComplement => {
            ctx.advance();
            let operand = parse_primary(ctx)?;
            Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::BitComplement,
                    value: Box::new(operand),
                },
                source,
            )
        }

        TokenKind::Ampersand => {
            ctx.advance();
            let operand = parse_primary(ctx)?;
            Expr::new(ExprKind::AddressOf(Box::new(operand)), source)
        }

        TokenKind::Multiply => {
            ctx.advance();
            let operand = parse_primary(ctx)?;
            Expr::new(ExprKind::Dereference(Box::new(operand)), source)
        }

        _ => {
            return_syntax_error!(
                format!("Expected expression, found '{}'", ctx.peek().name()),
                source
            );
        }
    };

    // Postfix member access
    while ctx.peek() == TokenKind::Dot {
        let dot_source = ctx.peek_source();
        ctx.advance();
        let field = ctx.take_word("Expected member name after '.'")?;
        value = Expr::new(
            ExprKind::Member {
                value: Box::new(value),
                field,
            },
            dot_source,
        );
    }

    Ok(value)
}

fn parse_call_args(ctx: &mut ParseContext) -> Result<Vec<Expr>, CompilerError> {
    ctx.eat(TokenKind::OpenParen, "Expected '(' to begin call arguments")?;

    let mut args = Vec::new();

    while ctx.peek() != TokenKind::CloseParen {
        ctx.ignore_newlines("Expected call argument")?;
        args.push(parse_expr(ctx)?);
        ctx.ignore_newlines("Expected ')' after call arguments")?;

        match ctx.peek() {
            TokenKind::Comma => {
                ctx.advance();
                ctx.ignore_newlines("Expected call argument after ','")?;

                if ctx.peek() == TokenKind::CloseParen {
                    return_syntax_error!("Expected argument after ','", ctx.peek_source());
                }
            }
            TokenKind::CloseParen => break,
            _ => {
                return_syntax_error!("Expected ',' or ')' after call argument", ctx.peek_source());
            }
        }
    }

    ctx.eat(TokenKind::CloseParen, "Expected ')' after call arguments")?;
    Ok(args)
}

fn token_to_binary_op(kind: TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::Add => BinaryOp::Add,
        TokenKind::Subtract => BinaryOp::Subtract,
        TokenKind::Multiply => BinaryOp::Multiply,
        TokenKind::Divide => BinaryOp::Divide,
        TokenKind::Modulus => BinaryOp::Modulus,
        TokenKind::Equals => BinaryOp::Equals,
        TokenKind::NotEquals => BinaryOp::NotEquals,
        TokenKind::LessThan => BinaryOp::LessThan,
        TokenKind::GreaterThan => BinaryOp::GreaterThan,
        TokenKind::LessThanOrEq => BinaryOp::LessThanOrEq,
        TokenKind::GreaterThanOrEq => BinaryOp::GreaterThanOrEq,
        TokenKind::LogicalAnd | TokenKind::And => BinaryOp::And,
        TokenKind::LogicalOr | TokenKind::Or => BinaryOp::Or,
        TokenKind::Ampersand => BinaryOp::BitAnd,
        TokenKind::BitOr => BinaryOp::BitOr,
        TokenKind::BitXor => BinaryOp::BitXor,
        TokenKind::BitLShift => BinaryOp::BitLShift,
        TokenKind::BitRShift => BinaryOp::BitRShift,
        _ => return None,
    };

    Some(op)
}
