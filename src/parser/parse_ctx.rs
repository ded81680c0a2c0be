use crate::ast::ast::{Ast, FunctionTraits};
use crate::diagnostics::compiler_errors::CompilerError;
use crate::settings::Config;
use crate::string_interning::{StringId, StringTable};
use crate::tokens::token_data::TokenKind;
use crate::tokens::tokens::{SourceLocation, TokenData, TokenList};

/// The composite whose domain block is currently being parsed.
/// Functions declared inside it get an implicit `this` first argument.
#[derive(Clone, Debug)]
pub struct CompositeAssociation {
    pub name: StringId,
    pub generics: Vec<StringId>,
    pub source: SourceLocation,
}

/// All the state a single reduction over one token stream needs.
///
/// The cursor only moves forward. When any production fails the cursor is
/// left wherever the failure happened; callers must stop parsing.
pub struct ParseContext<'a> {
    pub tokens: &'a mut TokenList,
    pub ast: &'a mut Ast,
    pub config: &'a Config,
    pub string_table: &'a mut StringTable,

    pub composite_association: Option<CompositeAssociation>,

    /// A declaration name stashed by the `Name :: func` form, consumed
    /// by the next head parse instead of reading a name token
    pub prename: Option<StringId>,

    /// Traits a pragma has requested for the next declaration
    pub next_builtin_traits: FunctionTraits,

    /// Whether `$T~Likeness` prerequisites are currently legal.
    /// Only true while a function argument list is being parsed.
    pub allow_polymorphic_prereqs: bool,

    /// Currently open namespace, prefixed onto top-level names
    pub namespace: Option<StringId>,
}

impl<'a> ParseContext<'a> {
    pub fn new(
        tokens: &'a mut TokenList,
        ast: &'a mut Ast,
        config: &'a Config,
        string_table: &'a mut StringTable,
    ) -> Self {
        Self {
            tokens,
            ast,
            config,
            string_table,
            composite_association: None,
            prename: None,
            next_builtin_traits: FunctionTraits::empty(),
            allow_polymorphic_prereqs: false,
            namespace: None,
        }
    }

    #[inline]
    pub fn peek(&self) -> TokenKind {
        self.tokens.current_kind()
    }

    #[inline]
    pub fn peek_source(&self) -> SourceLocation {
        self.tokens.current_location()
    }

    #[inline]
    pub fn advance(&mut self) {
        self.tokens.advance();
    }

    /// Consume one token of the given kind or fail with `message`.
    pub fn eat(&mut self, kind: TokenKind, message: &str) -> Result<(), CompilerError> {
        if self.peek() != kind {
            return Err(CompilerError::new_syntax_error(
                message,
                self.peek_source(),
            ));
        }

        self.advance();
        Ok(())
    }

    /// Consume a word token and return its interned name,
    /// or fail with `message`.
    pub fn take_word(&mut self, message: &str) -> Result<StringId, CompilerError> {
        if self.peek() != TokenKind::Word {
            return Err(CompilerError::new_syntax_error(
                message,
                self.peek_source(),
            ));
        }

        let Some(word) = self.tokens.current_word() else {
            return Err(CompilerError::new_internal_error(
                "Word token is missing its text payload",
                self.peek_source(),
            ));
        };

        self.advance();
        Ok(word)
    }

    /// Consume a string literal if one is next. Returns None otherwise.
    pub fn eat_string(&mut self) -> Option<StringId> {
        if self.peek() != TokenKind::String {
            return None;
        }

        let interned = match self.tokens.current_data() {
            TokenData::Str(content) => {
                let content = content.to_string();
                self.string_table.intern(&content)
            }
            _ => return None,
        };

        self.advance();
        Some(interned)
    }

    /// Skip newline tokens. Running off the end of the stream while
    /// skipping is fatal: something was expected after the newlines.
    pub fn ignore_newlines(&mut self, message: &str) -> Result<(), CompilerError> {
        while self.peek() == TokenKind::Newline {
            self.advance();
        }

        if self.peek() == TokenKind::None {
            return Err(CompilerError::new_syntax_error(
                message,
                self.peek_source(),
            ));
        }

        Ok(())
    }

    /// Qualify a top-level name with the open namespace, if any.
    pub fn prepend_namespace(&mut self, name: StringId) -> StringId {
        match self.namespace {
            Some(namespace) => {
                let qualified = format!(
                    "{}::{}",
                    self.string_table.resolve(namespace),
                    self.string_table.resolve(name)
                );
                self.string_table.intern(&qualified)
            }
            None => name,
        }
    }
}
