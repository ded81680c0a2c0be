//! Front-end core of the Ember compiler: token streams in, AST and IR
//! out. Lexing, type checking, code emission, and the driver all live
//! elsewhere and talk to this crate through its library API.

pub mod ast;
pub mod diagnostics;
pub mod ir;
pub mod parser;
pub mod settings;
pub mod string_interning;
pub mod tokens;

#[cfg(test)]
pub(crate) mod test_support;

use crate::ast::ast::Ast;
use crate::diagnostics::compiler_errors::CompilerMessages;
use crate::ir::ir_nodes::IrModule;
use crate::ir::lower::build_ir;
use crate::parser::parse;
use crate::settings::Config;
use crate::string_interning::StringTable;
use crate::tokens::tokens::TokenList;

/// One front-end instance per translation unit. No state is shared
/// between instances, so a driver may run one per thread.
pub struct Frontend<'a> {
    pub config: &'a Config,
    pub string_table: StringTable,
}

impl<'a> Frontend<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            string_table: StringTable::new(),
        }
    }

    /// Reuse an interner that the lexer already filled.
    pub fn with_string_table(config: &'a Config, string_table: StringTable) -> Self {
        Self {
            config,
            string_table,
        }
    }

    /// -----------------------------
    /// PARSING
    /// -----------------------------
    /// Reduce one lexed token stream into an AST. On any fatal
    /// diagnostic the stream's cursor state is unspecified and parsing
    /// must not be resumed.
    pub fn tokens_to_ast(&mut self, tokens: &mut TokenList) -> Result<Ast, CompilerMessages> {
        parse(tokens, self.config, &mut self.string_table)
    }

    /// -----------------------------
    /// IR GENERATION
    /// -----------------------------
    /// Lower every concrete function body of an AST into basic blocks
    /// of instructions. The AST is only borrowed; polymorphic and
    /// foreign functions are left for later passes.
    pub fn ast_to_ir(&mut self, ast: &Ast) -> Result<IrModule, CompilerMessages> {
        build_ir(ast, &mut self.string_table)
    }
}
