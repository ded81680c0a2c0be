use crate::ast::ast_types::AstType;
use crate::ast::expressions::Expr;
use crate::string_interning::StringId;
use crate::tokens::tokens::SourceLocation;

#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub source: SourceLocation,
}

impl Stmt {
    pub fn new(kind: StmtKind, source: SourceLocation) -> Self {
        Self { kind, source }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    /// `name Type`, `name Type = value`, `name Type = undef`
    Declare {
        name: StringId,
        ast_type: AstType,
        value: Option<Expr>,
        /// `= undef` skips zero-initialization
        is_undef: bool,
        /// `POD` declarations opt out of management functions
        is_pod: bool,
    },

    /// `target = value` where target is a variable, member chain,
    /// or dereference
    Assign {
        target: Expr,
        value: Expr,
    },

    /// A call in statement position
    Call(Expr),

    /// `return` / `return value`. Deferred statements of every scope
    /// being exited are recorded on the statement at parse time.
    Return {
        value: Option<Expr>,
        unwind: Vec<Stmt>,
    },

    /// `if cond { }` / `unless cond { }` (+ optional else). `invert`
    /// distinguishes the two spellings.
    Conditional {
        condition: Expr,
        invert: bool,
        then_block: Vec<Stmt>,
        else_block: Option<Vec<Stmt>>,
    },

    /// `while cond { }` / `until cond { }`, optionally labeled:
    /// `while retry: cond { }`
    WhileLoop {
        label: Option<StringId>,
        condition: Expr,
        invert: bool,
        statements: Vec<Stmt>,
    },

    Break {
        label: Option<StringId>,
    },

    Continue {
        label: Option<StringId>,
    },
}
