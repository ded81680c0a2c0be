//! The fixed token catalogue.
//!
//! Token kinds, keyword spellings, and payload-format tags are a closed,
//! generated-style table shared between the external lexer and the parser.
//! The variant order is load-bearing: kinds in
//! `BEGINNING_OF_KEYWORD_TOKENS..=MAX_LEX_TOKEN` line up 1:1, in order,
//! with [`KEYWORD_SPELLINGS`], which is ASCII-sorted so lexers can binary
//! search it.

/// How a lexer encodes the extra payload of a token kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtraDataFormat {
    /// The kind alone is the whole token
    IdOnly,
    /// Null-terminated text (words, polymorph names)
    CString,
    /// Length-prefixed text (string literals may contain NUL)
    LenString,
    /// An opaque in-memory record (numeric literal values)
    Memory,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TokenKind {
    /// Absence of a token; terminates every token stream
    None = 0,
    Word,
    String,
    CString,
    Add,
    Subtract,
    Multiply,
    Divide,
    Assign,
    Equals,
    NotEquals,
    LessThan,
    GreaterThan,
    LessThanOrEq,
    GreaterThanOrEq,
    Not,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    Newline,

    // Suffixed numeric literals carry their value as an opaque payload
    ByteLiteral,
    UbyteLiteral,
    ShortLiteral,
    UshortLiteral,
    IntLiteral,
    UintLiteral,
    LongLiteral,
    UlongLiteral,
    UsizeLiteral,
    FloatLiteral,
    DoubleLiteral,

    Dot,
    /// `&` serves both address-of and bitwise-and roles
    Ampersand,
    Comma,
    OpenBracket,
    CloseBracket,
    Modulus,

    // Unsuffixed literals; the checker picks their width later
    GenericInt,
    GenericFloat,

    AddAssign,
    SubtractAssign,
    MultiplyAssign,
    DivideAssign,
    ModulusAssign,
    BitAndAssign,
    BitOrAssign,
    BitXorAssign,
    BitLShiftAssign,
    BitRShiftAssign,
    BitLgcLShiftAssign,
    BitLgcRShiftAssign,
    Ellipsis,
    LogicalAnd,
    LogicalOr,
    Semicolon,
    Colon,
    BitOr,
    BitXor,
    BitLShift,
    BitRShift,
    BitComplement,
    BitLgcLShift,
    BitLgcRShift,
    DoubleColon,
    Meta,
    Polymorph,
    Maybe,
    Increment,
    Decrement,
    Toggle,
    StrongArrow,
    Range,
    Gives,
    Polycount,

    // Keyword tokens. Everything from here to the end of the enum must
    // stay in ASCII order of its spelling; see KEYWORD_SPELLINGS.
    Pod,
    Alias,
    AlignOf,
    And,
    As,
    Asm,
    At,
    Break,
    Case,
    Cast,
    Const,
    Constructor,
    Continue,
    Def,
    Default,
    Defer,
    Define,
    Delete,
    Each,
    Else,
    Embed,
    Enum,
    Exhaustive,
    External,
    Fallthrough,
    False,
    For,
    Foreign,
    Func,
    FuncPtr,
    Global,
    If,
    Implicit,
    Import,
    In,
    InOut,
    Namespace,
    New,
    Null,
    Or,
    Out,
    Packed,
    Pragma,
    Private,
    Public,
    Record,
    Repeat,
    Return,
    SizeOf,
    Static,
    StdCall,
    Struct,
    Switch,
    ThreadLocal,
    True,
    TypeInfo,
    TypeNameOf,
    Undef,
    Union,
    Unless,
    Until,
    Using,
    VaArg,
    VaCopy,
    VaEnd,
    VaStart,
    Verbatim,
    While,
}

pub const BEGINNING_OF_KEYWORD_TOKENS: u16 = TokenKind::Pod as u16;
pub const MAX_LEX_TOKEN: u16 = TokenKind::While as u16;

/// Keyword spellings, ASCII-sorted, parallel to the keyword range of
/// [`TokenKind`].
pub const KEYWORD_SPELLINGS: [&str; KEYWORD_COUNT] = [
    "POD",
    "alias",
    "alignof",
    "and",
    "as",
    "asm",
    "at",
    "break",
    "case",
    "cast",
    "const",
    "constructor",
    "continue",
    "def",
    "default",
    "defer",
    "define",
    "delete",
    "each",
    "else",
    "embed",
    "enum",
    "exhaustive",
    "external",
    "fallthrough",
    "false",
    "for",
    "foreign",
    "func",
    "funcptr",
    "global",
    "if",
    "implicit",
    "import",
    "in",
    "inout",
    "namespace",
    "new",
    "null",
    "or",
    "out",
    "packed",
    "pragma",
    "private",
    "public",
    "record",
    "repeat",
    "return",
    "sizeof",
    "static",
    "stdcall",
    "struct",
    "switch",
    "thread_local",
    "true",
    "typeinfo",
    "typenameof",
    "undef",
    "union",
    "unless",
    "until",
    "using",
    "va_arg",
    "va_copy",
    "va_end",
    "va_start",
    "verbatim",
    "while",
];

pub const KEYWORD_COUNT: usize = (MAX_LEX_TOKEN - BEGINNING_OF_KEYWORD_TOKENS + 1) as usize;

const KEYWORD_KINDS: [TokenKind; KEYWORD_COUNT] = [
    TokenKind::Pod,
    TokenKind::Alias,
    TokenKind::AlignOf,
    TokenKind::And,
    TokenKind::As,
    TokenKind::Asm,
    TokenKind::At,
    TokenKind::Break,
    TokenKind::Case,
    TokenKind::Cast,
    TokenKind::Const,
    TokenKind::Constructor,
    TokenKind::Continue,
    TokenKind::Def,
    TokenKind::Default,
    TokenKind::Defer,
    TokenKind::Define,
    TokenKind::Delete,
    TokenKind::Each,
    TokenKind::Else,
    TokenKind::Embed,
    TokenKind::Enum,
    TokenKind::Exhaustive,
    TokenKind::External,
    TokenKind::Fallthrough,
    TokenKind::False,
    TokenKind::For,
    TokenKind::Foreign,
    TokenKind::Func,
    TokenKind::FuncPtr,
    TokenKind::Global,
    TokenKind::If,
    TokenKind::Implicit,
    TokenKind::Import,
    TokenKind::In,
    TokenKind::InOut,
    TokenKind::Namespace,
    TokenKind::New,
    TokenKind::Null,
    TokenKind::Or,
    TokenKind::Out,
    TokenKind::Packed,
    TokenKind::Pragma,
    TokenKind::Private,
    TokenKind::Public,
    TokenKind::Record,
    TokenKind::Repeat,
    TokenKind::Return,
    TokenKind::SizeOf,
    TokenKind::Static,
    TokenKind::StdCall,
    TokenKind::Struct,
    TokenKind::Switch,
    TokenKind::ThreadLocal,
    TokenKind::True,
    TokenKind::TypeInfo,
    TokenKind::TypeNameOf,
    TokenKind::Undef,
    TokenKind::Union,
    TokenKind::Unless,
    TokenKind::Until,
    TokenKind::Using,
    TokenKind::VaArg,
    TokenKind::VaCopy,
    TokenKind::VaEnd,
    TokenKind::VaStart,
    TokenKind::Verbatim,
    TokenKind::While,
];

impl TokenKind {
    /// Look up the token kind for a keyword spelling.
    /// Returns None for words that aren't keywords.
    pub fn from_keyword(word: &str) -> Option<TokenKind> {
        KEYWORD_SPELLINGS
            .binary_search(&word)
            .ok()
            .map(|index| KEYWORD_KINDS[index])
    }

    pub fn is_keyword(self) -> bool {
        let id = self as u16;
        (BEGINNING_OF_KEYWORD_TOKENS..=MAX_LEX_TOKEN).contains(&id)
    }

    /// How the lexer encodes this kind's extra payload.
    pub fn extra_format(self) -> ExtraDataFormat {
        match self {
            TokenKind::Word | TokenKind::CString | TokenKind::Polymorph | TokenKind::Polycount => {
                ExtraDataFormat::CString
            }

            TokenKind::String => ExtraDataFormat::LenString,

            TokenKind::GenericInt
            | TokenKind::GenericFloat
            | TokenKind::ByteLiteral
            | TokenKind::UbyteLiteral
            | TokenKind::ShortLiteral
            | TokenKind::UshortLiteral
            | TokenKind::IntLiteral
            | TokenKind::UintLiteral
            | TokenKind::LongLiteral
            | TokenKind::UlongLiteral
            | TokenKind::UsizeLiteral
            | TokenKind::FloatLiteral
            | TokenKind::DoubleLiteral => ExtraDataFormat::Memory,

            _ => ExtraDataFormat::IdOnly,
        }
    }

    /// Human readable name, used by diagnostics.
    pub fn name(self) -> &'static str {
        let id = self as u16;
        if id >= BEGINNING_OF_KEYWORD_TOKENS && id <= MAX_LEX_TOKEN {
            return KEYWORD_SPELLINGS[(id - BEGINNING_OF_KEYWORD_TOKENS) as usize];
        }

        match self {
            TokenKind::None => "end of stream",
            TokenKind::Word => "identifier",
            TokenKind::String => "string literal",
            TokenKind::CString => "c-string literal",
            TokenKind::Add => "+",
            TokenKind::Subtract => "-",
            TokenKind::Multiply => "*",
            TokenKind::Divide => "/",
            TokenKind::Assign => "=",
            TokenKind::Equals => "==",
            TokenKind::NotEquals => "!=",
            TokenKind::LessThan => "<",
            TokenKind::GreaterThan => ">",
            TokenKind::LessThanOrEq => "<=",
            TokenKind::GreaterThanOrEq => ">=",
            TokenKind::Not => "!",
            TokenKind::OpenParen => "(",
            TokenKind::CloseParen => ")",
            TokenKind::OpenBrace => "{",
            TokenKind::CloseBrace => "}",
            TokenKind::Newline => "newline",
            TokenKind::ByteLiteral => "byte literal",
            TokenKind::UbyteLiteral => "ubyte literal",
            TokenKind::ShortLiteral => "short literal",
            TokenKind::UshortLiteral => "ushort literal",
            TokenKind::IntLiteral => "int literal",
            TokenKind::UintLiteral => "uint literal",
            TokenKind::LongLiteral => "long literal",
            TokenKind::UlongLiteral => "ulong literal",
            TokenKind::UsizeLiteral => "usize literal",
            TokenKind::FloatLiteral => "float literal",
            TokenKind::DoubleLiteral => "double literal",
            TokenKind::Dot => ".",
            TokenKind::Ampersand => "&",
            TokenKind::Comma => ",",
            TokenKind::OpenBracket => "[",
            TokenKind::CloseBracket => "]",
            TokenKind::Modulus => "%",
            TokenKind::GenericInt => "integer literal",
            TokenKind::GenericFloat => "float literal",
            TokenKind::AddAssign => "+=",
            TokenKind::SubtractAssign => "-=",
            TokenKind::MultiplyAssign => "*=",
            TokenKind::DivideAssign => "/=",
            TokenKind::ModulusAssign => "%=",
            TokenKind::BitAndAssign => "&=",
            TokenKind::BitOrAssign => "|=",
            TokenKind::BitXorAssign => "^=",
            TokenKind::BitLShiftAssign => "<<=",
            TokenKind::BitRShiftAssign => ">>=",
            TokenKind::BitLgcLShiftAssign => "<<<=",
            TokenKind::BitLgcRShiftAssign => ">>>=",
            TokenKind::Ellipsis => "...",
            TokenKind::LogicalAnd => "&&",
            TokenKind::LogicalOr => "||",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::BitOr => "|",
            TokenKind::BitXor => "^",
            TokenKind::BitLShift => "<<",
            TokenKind::BitRShift => ">>",
            TokenKind::BitComplement => "~",
            TokenKind::BitLgcLShift => "<<<",
            TokenKind::BitLgcRShift => ">>>",
            TokenKind::DoubleColon => "::",
            TokenKind::Meta => "#",
            TokenKind::Polymorph => "polymorphic type variable",
            TokenKind::Maybe => "?",
            TokenKind::Increment => "++",
            TokenKind::Decrement => "--",
            TokenKind::Toggle => "!!",
            TokenKind::StrongArrow => "=>",
            TokenKind::Range => "..",
            TokenKind::Gives => "~>",
            TokenKind::Polycount => "polymorphic count variable",
            _ => unreachable!("keyword kinds are handled through the spelling table"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_spellings_are_sorted_for_binary_search() {
        for pair in KEYWORD_SPELLINGS.windows(2) {
            assert!(
                pair[0] < pair[1],
                "keyword table out of order: '{}' before '{}'",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn keyword_kinds_line_up_with_the_keyword_token_range() {
        for (index, kind) in KEYWORD_KINDS.iter().enumerate() {
            assert_eq!(
                *kind as u16,
                BEGINNING_OF_KEYWORD_TOKENS + index as u16,
                "'{}' does not line up with its token id",
                KEYWORD_SPELLINGS[index]
            );
        }
        assert_eq!(KEYWORD_KINDS[KEYWORD_COUNT - 1] as u16, MAX_LEX_TOKEN);
    }

    #[test]
    fn every_keyword_spelling_resolves_to_its_kind() {
        for (index, spelling) in KEYWORD_SPELLINGS.iter().enumerate() {
            assert_eq!(TokenKind::from_keyword(spelling), Some(KEYWORD_KINDS[index]));
        }
        assert_eq!(TokenKind::from_keyword("not_a_keyword"), None);
        assert_eq!(TokenKind::from_keyword("pod"), None); // case sensitive
    }

    #[test]
    fn payload_formats_match_the_catalogue() {
        assert_eq!(TokenKind::Word.extra_format(), ExtraDataFormat::CString);
        assert_eq!(TokenKind::String.extra_format(), ExtraDataFormat::LenString);
        assert_eq!(TokenKind::GenericInt.extra_format(), ExtraDataFormat::Memory);
        assert_eq!(TokenKind::OpenParen.extra_format(), ExtraDataFormat::IdOnly);
        assert_eq!(TokenKind::While.extra_format(), ExtraDataFormat::IdOnly);
    }
}
