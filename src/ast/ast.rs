//! The AST root and its function, composite, alias, and global records.

use crate::ast::ast_types::AstType;
use crate::ast::expressions::Expr;
use crate::ast::statements::Stmt;
use crate::string_interning::{StringId, StringTable};
use crate::tokens::tokens::SourceLocation;
use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct FunctionTraits: u32 {
        const FOREIGN     = 1 << 0;
        /// C-style `...` variable arity
        const VARARG      = 1 << 1;
        /// Native `name ...` variable arity
        const VARIADIC    = 1 << 2;
        const STDCALL     = 1 << 3;
        const VERBATIM    = 1 << 4;
        const IMPLICIT    = 1 << 5;
        const EXTERNAL    = 1 << 6;
        /// Set automatically for functions named `__defer__`
        const DEFER       = 1 << 7;
        /// Set automatically for functions named `__pass__`
        const PASS        = 1 << 8;
        const POLYMORPHIC = 1 << 9;
        /// Marked by `pragma builtin` on the following declaration
        const BUILTIN     = 1 << 10;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Flow {
    #[default]
    In,
    Out,
    InOut,
}

impl Flow {
    pub fn keyword(self) -> &'static str {
        match self {
            Flow::In => "in",
            Flow::Out => "out",
            Flow::InOut => "inout",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ArgTypeTrait {
    #[default]
    None,
    /// Plain-old-data: suppresses management-function invocation
    Pod,
}

#[derive(Clone, Debug)]
pub struct AstArgument {
    /// Foreign declarations may leave arguments unnamed
    pub name: Option<StringId>,
    pub ast_type: AstType,
    pub source: SourceLocation,
    pub flow: Flow,
    pub type_trait: ArgTypeTrait,
    pub default: Option<Expr>,
}

/// Identifies a function inside one AST. Bounded by
/// [`crate::settings::MAX_FUNC_ID`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FuncId(pub u32);

#[derive(Clone, Debug)]
pub struct AstFunction {
    pub name: StringId,
    pub source: SourceLocation,
    pub end_source: SourceLocation,
    pub return_type: AstType,
    pub args: Vec<AstArgument>,
    pub statements: Vec<Stmt>,
    pub traits: FunctionTraits,
    /// Symbol name for linkage, when exported
    pub export_name: Option<StringId>,
    /// Name of the `name ...` variadic argument. That argument does not
    /// occupy an argument slot.
    pub variadic_arg_name: Option<StringId>,
    pub variadic_source: SourceLocation,
    /// Whether this function's name matches the configured entry point
    pub is_entry: bool,
}

impl AstFunction {
    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// A function is polymorphic when any argument type or the return
    /// type mentions a type or count variable.
    pub fn is_polymorphic(&self) -> bool {
        self.return_type.contains_polymorph()
            || self.args.iter().any(|arg| arg.ast_type.contains_polymorph())
    }

    /// A method is a function whose first argument is named `this`
    pub fn is_method(&self, string_table: &StringTable) -> bool {
        match self.args.first().and_then(|arg| arg.name) {
            Some(name) => name.eq_str(string_table, "this"),
            None => false,
        }
    }

    /// Print the signature back out as parseable source text.
    pub fn signature_to_source(&self, table: &StringTable) -> String {
        let mut printed = String::new();

        if self.traits.contains(FunctionTraits::STDCALL) {
            printed.push_str("stdcall ");
        }
        if self.traits.contains(FunctionTraits::VERBATIM) {
            printed.push_str("verbatim ");
        }
        if self.traits.contains(FunctionTraits::IMPLICIT) {
            printed.push_str("implicit ");
        }

        if self.traits.contains(FunctionTraits::FOREIGN) {
            printed.push_str("foreign ");
        } else {
            printed.push_str("func ");
        }

        printed.push_str(table.resolve(self.name));
        printed.push('(');

        let mut printed_args: Vec<String> = self
            .args
            .iter()
            .map(|arg| {
                let mut printed_arg = String::new();

                if arg.flow != Flow::In {
                    printed_arg.push_str(arg.flow.keyword());
                    printed_arg.push(' ');
                }
                if let Some(name) = arg.name {
                    printed_arg.push_str(table.resolve(name));
                    printed_arg.push(' ');
                }
                if arg.type_trait == ArgTypeTrait::Pod {
                    printed_arg.push_str("POD ");
                }

                printed_arg.push_str(&arg.ast_type.to_source(table));

                if let Some(default) = &arg.default {
                    printed_arg.push_str(" = ");
                    printed_arg.push_str(&default.to_source(table));
                }

                printed_arg
            })
            .collect();

        if let Some(variadic_name) = self.variadic_arg_name {
            printed_args.push(format!("{} ...", table.resolve(variadic_name)));
        } else if self.traits.contains(FunctionTraits::VARARG) {
            printed_args.push(String::from("..."));
        }

        printed.push_str(&printed_args.join(", "));
        printed.push_str(") ");
        printed.push_str(&self.return_type.to_source(table));

        printed
    }
}

/// Hint for the later overload-grouping pass over the polymorphic
/// indices. Freshly parsed entries are always uncalculated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GroupHint {
    #[default]
    Uncalculated,
    Beginning,
    NotBeginning,
}

#[derive(Clone, Debug)]
pub struct PolymorphicIndexEntry {
    pub name: StringId,
    pub func_id: FuncId,
    pub is_beginning_of_group: GroupHint,
}

#[derive(Clone, Debug)]
pub struct FunctionAlias {
    pub from: StringId,
    pub to: StringId,
    /// Empty when `match_first_of_name` is set
    pub arg_types: Vec<AstType>,
    /// VARARG/VARIADIC markers the target overload must carry
    pub required_traits: FunctionTraits,
    pub source: SourceLocation,
    /// Set when the alias was declared without an argument-type list;
    /// it then matches the first function of the target name.
    pub match_first_of_name: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompositeKind {
    Struct,
    Union,
    Record,
}

#[derive(Clone, Debug)]
pub struct CompositeField {
    pub name: StringId,
    pub ast_type: AstType,
    pub source: SourceLocation,
}

#[derive(Clone, Debug)]
pub struct Composite {
    pub name: StringId,
    pub kind: CompositeKind,
    pub fields: Vec<CompositeField>,
    /// `$A, $B, ...` formal parameter names for polymorphic composites
    pub generics: Vec<StringId>,
    pub is_packed: bool,
    pub source: SourceLocation,
}

impl Composite {
    pub fn is_polymorphic(&self) -> bool {
        !self.generics.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct EnumDefinition {
    pub name: StringId,
    pub variants: Vec<StringId>,
    pub source: SourceLocation,
}

#[derive(Clone, Debug)]
pub struct GlobalVariable {
    pub name: StringId,
    pub ast_type: AstType,
    pub initial: Option<Expr>,
    pub is_thread_local: bool,
    pub source: SourceLocation,
}

#[derive(Clone, Debug)]
pub struct TypeAlias {
    pub name: StringId,
    pub ast_type: AstType,
    pub source: SourceLocation,
}

/// Return-type metadata recorded by the singleton special functions.
#[derive(Clone, Debug, Default)]
pub struct CommonMetadata {
    pub variadic_array_return: Option<Box<AstType>>,
    pub variadic_array_source: SourceLocation,
    pub initializer_list_return: Option<Box<AstType>>,
    pub initializer_list_source: SourceLocation,
}

#[derive(Debug, Default)]
pub struct Ast {
    pub funcs: Vec<AstFunction>,
    pub func_aliases: Vec<FunctionAlias>,
    pub composites: Vec<Composite>,
    pub enums: Vec<EnumDefinition>,
    pub globals: Vec<GlobalVariable>,
    pub type_aliases: Vec<TypeAlias>,
    pub imports: Vec<Box<str>>,

    /// Index of polymorphic functions, in declaration order
    pub polymorphic_funcs: Vec<PolymorphicIndexEntry>,
    /// Index of polymorphic functions whose first argument is `this`
    pub polymorphic_methods: Vec<PolymorphicIndexEntry>,

    pub common: CommonMetadata,
}

impl Ast {
    pub fn new() -> Ast {
        Ast::default()
    }

    pub fn func(&self, id: FuncId) -> &AstFunction {
        &self.funcs[id.0 as usize]
    }

    pub fn find_composite(&self, name: StringId) -> Option<&Composite> {
        self.composites
            .iter()
            .find(|composite| composite.name == name)
    }
}
