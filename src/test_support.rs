//! Shared test helpers.
//!
//! The front-end consumes token streams produced by an external lexer,
//! so tests carry a small one of their own. It covers exactly the
//! surface the tests exercise and panics on anything else.

use crate::ast::ast::Ast;
use crate::diagnostics::compiler_errors::CompilerMessages;
use crate::ir::ir_nodes::IrModule;
use crate::parser::parse;
use crate::settings::Config;
use crate::string_interning::StringTable;
use crate::tokens::token_data::TokenKind;
use crate::tokens::tokens::{SourceLocation, Token, TokenData, TokenList};

pub fn lex(source: &str, table: &mut StringTable) -> TokenList {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0usize;

    let is_word_byte =
        |b: u8| b.is_ascii_alphanumeric() || b == b'_';

    while i < bytes.len() {
        let location = SourceLocation::new(0, i as u32);
        let c = bytes[i];

        match c {
            b' ' | b'\t' | b'\r' => i += 1,

            b'\n' => {
                tokens.push(Token::id_only(TokenKind::Newline, location));
                i += 1;
            }

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                let start = i;
                while i < bytes.len() && is_word_byte(bytes[i]) {
                    i += 1;
                }
                let word = &source[start..i];

                match TokenKind::from_keyword(word) {
                    Some(keyword) => tokens.push(Token::id_only(keyword, location)),
                    None => tokens.push(Token::new(
                        TokenKind::Word,
                        TokenData::Word(table.intern(word)),
                        location,
                    )),
                }
            }

            b'0'..=b'9' => {
                let start = i;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }

                let is_float = i + 1 < bytes.len()
                    && bytes[i] == b'.'
                    && bytes[i + 1].is_ascii_digit();

                if is_float {
                    i += 1;
                    while i < bytes.len() && bytes[i].is_ascii_digit() {
                        i += 1;
                    }
                    let value: f64 = source[start..i].parse().unwrap();
                    tokens.push(Token::new(
                        TokenKind::GenericFloat,
                        TokenData::Float(value),
                        location,
                    ));
                } else {
                    let value: i64 = source[start..i].parse().unwrap();
                    tokens.push(Token::new(
                        TokenKind::GenericInt,
                        TokenData::Int(value),
                        location,
                    ));
                }
            }

            b'"' | b'\'' => {
                let quote = c;
                let start = i + 1;
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    i += 1;
                }
                let content: Box<str> = source[start..i].into();
                i += 1; // closing quote

                let kind = if quote == b'"' {
                    TokenKind::String
                } else {
                    TokenKind::CString
                };
                tokens.push(Token::new(kind, TokenData::Str(content), location));
            }

            b'$' => {
                i += 1;

                let is_count = i < bytes.len() && bytes[i] == b'#';
                if is_count {
                    i += 1;
                }

                // `$~T` keeps the marker on the front of the name
                let start = if !is_count && i < bytes.len() && bytes[i] == b'~' {
                    i += 1;
                    i - 1
                } else {
                    i
                };

                while i < bytes.len() && is_word_byte(bytes[i]) {
                    i += 1;
                }

                let kind = if is_count {
                    TokenKind::Polycount
                } else {
                    TokenKind::Polymorph
                };
                tokens.push(Token::new(
                    kind,
                    TokenData::Word(table.intern(&source[start..i])),
                    location,
                ));
            }

            b'.' => {
                let dots = bytes[i..].iter().take_while(|&&b| b == b'.').count();
                match dots {
                    1 => tokens.push(Token::id_only(TokenKind::Dot, location)),
                    2 => tokens.push(Token::id_only(TokenKind::Range, location)),
                    _ => tokens.push(Token::id_only(TokenKind::Ellipsis, location)),
                }
                i += dots.min(3);
            }

            b':' => {
                if bytes.get(i + 1) == Some(&b':') {
                    tokens.push(Token::id_only(TokenKind::DoubleColon, location));
                    i += 2;
                } else {
                    tokens.push(Token::id_only(TokenKind::Colon, location));
                    i += 1;
                }
            }

            b'=' => match bytes.get(i + 1) {
                Some(b'>') => {
                    tokens.push(Token::id_only(TokenKind::StrongArrow, location));
                    i += 2;
                }
                Some(b'=') => {
                    tokens.push(Token::id_only(TokenKind::Equals, location));
                    i += 2;
                }
                _ => {
                    tokens.push(Token::id_only(TokenKind::Assign, location));
                    i += 1;
                }
            },

            b'!' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    tokens.push(Token::id_only(TokenKind::NotEquals, location));
                    i += 2;
                } else {
                    tokens.push(Token::id_only(TokenKind::Not, location));
                    i += 1;
                }
            }

            b'<' => match bytes.get(i + 1) {
                Some(b'=') => {
                    tokens.push(Token::id_only(TokenKind::LessThanOrEq, location));
                    i += 2;
                }
                Some(b'<') => {
                    tokens.push(Token::id_only(TokenKind::BitLShift, location));
                    i += 2;
                }
                _ => {
                    tokens.push(Token::id_only(TokenKind::LessThan, location));
                    i += 1;
                }
            },

            b'>' => match bytes.get(i + 1) {
                Some(b'=') => {
                    tokens.push(Token::id_only(TokenKind::GreaterThanOrEq, location));
                    i += 2;
                }
                Some(b'>') => {
                    tokens.push(Token::id_only(TokenKind::BitRShift, location));
                    i += 2;
                }
                _ => {
                    tokens.push(Token::id_only(TokenKind::GreaterThan, location));
                    i += 1;
                }
            },

            b'&' => {
                if bytes.get(i + 1) == Some(&b'&') {
                    tokens.push(Token::id_only(TokenKind::LogicalAnd, location));
                    i += 2;
                } else {
                    tokens.push(Token::id_only(TokenKind::Ampersand, location));
                    i += 1;
                }
            }

            b'|' => {
                if bytes.get(i + 1) == Some(&b'|') {
                    tokens.push(Token::id_only(TokenKind::LogicalOr, location));
                    i += 2;
                } else {
                    tokens.push(Token::id_only(TokenKind::BitOr, location));
                    i += 1;
                }
            }

            _ => {
                let kind = match c {
                    b'+' => TokenKind::Add,
                    b'-' => TokenKind::Subtract,
                    b'*' => TokenKind::Multiply,
                    b'/' => TokenKind::Divide,
                    b'%' => TokenKind::Modulus,
                    b'(' => TokenKind::OpenParen,
                    b')' => TokenKind::CloseParen,
                    b'{' => TokenKind::OpenBrace,
                    b'}' => TokenKind::CloseBrace,
                    b'[' => TokenKind::OpenBracket,
                    b']' => TokenKind::CloseBracket,
                    b',' => TokenKind::Comma,
                    b'^' => TokenKind::BitXor,
                    b'~' => TokenKind::BitComplement,
                    b';' => TokenKind::Semicolon,
                    b'#' => TokenKind::Meta,
                    b'?' => TokenKind::Maybe,
                    _ => panic!("test lexer cannot handle '{}'", c as char),
                };
                tokens.push(Token::id_only(kind, location));
                i += 1;
            }
        }
    }

    TokenList::new(tokens)
}

pub fn parse_source(source: &str) -> (Result<Ast, CompilerMessages>, StringTable) {
    parse_source_with_config(source, &Config::default())
}

pub fn parse_source_with_config(
    source: &str,
    config: &Config,
) -> (Result<Ast, CompilerMessages>, StringTable) {
    let mut table = StringTable::new();
    let mut tokens = lex(source, &mut table);
    let result = parse(&mut tokens, config, &mut table);
    (result, table)
}

/// Parse, expecting success, and panic with the diagnostics otherwise.
pub fn parse_source_ok(source: &str) -> (Ast, StringTable) {
    let (result, table) = parse_source(source);
    match result {
        Ok(ast) => (ast, table),
        Err(messages) => panic!("expected source to parse: {:?}", messages.errors),
    }
}

/// First error message of a parse expected to fail.
pub fn parse_source_err(source: &str) -> String {
    let (result, _) = parse_source(source);
    match result {
        Ok(_) => panic!("expected source to fail parsing"),
        Err(messages) => messages.errors[0].msg.clone(),
    }
}

/// Parse and lower, expecting both to succeed.
pub fn build_ir_source(source: &str) -> (IrModule, Ast, StringTable) {
    let (ast, mut table) = parse_source_ok(source);
    let module = match crate::ir::lower::build_ir(&ast, &mut table) {
        Ok(module) => module,
        Err(messages) => panic!("expected IR lowering to succeed: {:?}", messages.errors),
    };
    (module, ast, table)
}
