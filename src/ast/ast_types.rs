//! AST types.
//!
//! A type is an ordered sequence of elements read outside-in:
//! `*[8] int` is `[Pointer, FixedArray(8), Base("int")]`. A well-formed
//! type has at least one element and its innermost element is never an
//! indirection.

use crate::ast::expressions::{Expr, ExprKind};
use crate::string_interning::{StringId, StringTable};
use crate::tokens::tokens::SourceLocation;
use std::hash::{Hash, Hasher};

#[derive(Clone, Debug, Default)]
pub struct AstType {
    pub elements: Vec<TypeElement>,
    pub source: SourceLocation,
}

// Identity is structural: where a type was written never matters
impl PartialEq for AstType {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypeElement {
    /// A named type: `int`, `MyStruct`
    Base(StringId),

    /// One level of indirection over the rest of the sequence
    Pointer,

    /// `[N]` with a literal count
    FixedArray(u64),

    /// `[expr]` where the count is an expression. Counts that turn out
    /// to be `$#N` are collapsed to [`TypeElement::Polycount`] after
    /// parsing so the type carrier is expression-free.
    VarFixedArray(Box<Expr>),

    /// A `$#N` count variable
    Polycount(StringId),

    /// A `$T` type variable
    Polymorph {
        name: StringId,
        allow_auto_conversion: bool,
        /// `$T~Likeness` restricts what the variable may bind to.
        /// Only permitted where the parse context allows prerequisites.
        prerequisite: Option<StringId>,
    },

    /// `<$A, $B> StructName`
    GenericBase {
        name: StringId,
        generics: Vec<AstType>,
    },

    /// `func(int, int) int`
    FuncPointer(Box<FuncPointerShape>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct FuncPointerShape {
    pub arg_types: Vec<AstType>,
    pub return_type: AstType,
    pub is_vararg: bool,
}

impl AstType {
    /// The unresolved sentinel: zero elements. Used for arguments whose
    /// type has not been backfilled yet and for failure paths.
    pub fn unresolved() -> AstType {
        AstType::default()
    }

    pub fn is_unresolved(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn base(name: StringId, source: SourceLocation) -> AstType {
        AstType {
            elements: vec![TypeElement::Base(name)],
            source,
        }
    }

    pub fn base_ptr(name: StringId, source: SourceLocation) -> AstType {
        AstType {
            elements: vec![TypeElement::Pointer, TypeElement::Base(name)],
            source,
        }
    }

    pub fn polymorph(name: StringId, source: SourceLocation) -> AstType {
        AstType {
            elements: vec![TypeElement::Polymorph {
                name,
                allow_auto_conversion: false,
                prerequisite: None,
            }],
            source,
        }
    }

    pub fn is_base(&self) -> bool {
        matches!(self.elements.as_slice(), [TypeElement::Base(_)])
    }

    pub fn is_base_of(&self, table: &StringTable, name: &str) -> bool {
        matches!(self.elements.as_slice(), [TypeElement::Base(id)] if id.eq_str(table, name))
    }

    pub fn is_void(&self, table: &StringTable) -> bool {
        self.is_base_of(table, "void")
    }

    pub fn is_base_ptr(&self) -> bool {
        matches!(
            self.elements.as_slice(),
            [TypeElement::Pointer, TypeElement::Base(_)]
        )
    }

    pub fn is_polymorph(&self) -> bool {
        matches!(self.elements.as_slice(), [TypeElement::Polymorph { .. }])
    }

    pub fn is_polymorph_ptr(&self) -> bool {
        matches!(
            self.elements.as_slice(),
            [TypeElement::Pointer, TypeElement::Polymorph { .. }]
        )
    }

    pub fn is_generic_base(&self) -> bool {
        matches!(self.elements.as_slice(), [TypeElement::GenericBase { .. }])
    }

    pub fn is_generic_base_ptr(&self) -> bool {
        matches!(
            self.elements.as_slice(),
            [TypeElement::Pointer, TypeElement::GenericBase { .. }]
        )
    }

    pub fn is_fixed_array(&self) -> bool {
        matches!(self.elements.first(), Some(TypeElement::FixedArray(_)))
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self.elements.first(), Some(TypeElement::Pointer))
    }

    /// True when `self` is exactly one pointer level over `other`
    pub fn is_pointer_to(&self, other: &AstType) -> bool {
        self.elements.first() == Some(&TypeElement::Pointer)
            && self.elements[1..] == other.elements[..]
    }

    /// The pointee of a single-level pointer type
    pub fn dereferenced(&self) -> Option<AstType> {
        if !self.is_pointer() {
            return None;
        }

        Some(AstType {
            elements: self.elements[1..].to_vec(),
            source: self.source,
        })
    }

    /// Whether any element mentions a type or count variable.
    /// Functions whose signature answers true are polymorphic.
    pub fn contains_polymorph(&self) -> bool {
        self.elements.iter().any(|element| match element {
            TypeElement::Polymorph { .. } | TypeElement::Polycount(_) => true,
            TypeElement::VarFixedArray(length) => {
                matches!(length.kind, ExprKind::Polycount(_))
            }
            TypeElement::GenericBase { generics, .. } => {
                generics.iter().any(AstType::contains_polymorph)
            }
            TypeElement::FuncPointer(shape) => {
                shape.return_type.contains_polymorph()
                    || shape.arg_types.iter().any(AstType::contains_polymorph)
            }
            _ => false,
        })
    }

    /// Structural hash, independent of source locations.
    pub fn structural_hash(&self) -> u64 {
        let mut hasher = rustc_hash::FxHasher::default();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Print the type back out as parseable source text.
    pub fn to_source(&self, table: &StringTable) -> String {
        let mut printed = String::new();

        for element in &self.elements {
            match element {
                TypeElement::Base(name) => printed.push_str(table.resolve(*name)),
                TypeElement::Pointer => printed.push('*'),
                TypeElement::FixedArray(length) => printed.push_str(&format!("[{length}] ")),
                TypeElement::VarFixedArray(length) => {
                    printed.push_str(&format!("[{}] ", length.to_source(table)));
                }
                TypeElement::Polycount(name) => {
                    printed.push_str(&format!("$#{}", table.resolve(*name)));
                }
                TypeElement::Polymorph {
                    name,
                    allow_auto_conversion,
                    prerequisite,
                } => {
                    printed.push('$');
                    if *allow_auto_conversion {
                        printed.push('~');
                    }
                    printed.push_str(table.resolve(*name));
                    if let Some(prereq) = prerequisite {
                        printed.push('~');
                        printed.push_str(table.resolve(*prereq));
                    }
                }
                TypeElement::GenericBase { name, generics } => {
                    let printed_generics: Vec<String> = generics
                        .iter()
                        .map(|generic| generic.to_source(table))
                        .collect();
                    printed.push('<');
                    printed.push_str(&printed_generics.join(", "));
                    printed.push_str("> ");
                    printed.push_str(table.resolve(*name));
                }
                TypeElement::FuncPointer(shape) => {
                    let mut printed_args: Vec<String> = shape
                        .arg_types
                        .iter()
                        .map(|arg| arg.to_source(table))
                        .collect();
                    if shape.is_vararg {
                        printed_args.push(String::from("..."));
                    }
                    printed.push_str(&format!(
                        "func({}) {}",
                        printed_args.join(", "),
                        shape.return_type.to_source(table)
                    ));
                }
            }
        }

        printed
    }
}

// Source locations are excluded so equal shapes hash equally
// no matter where they were written.
impl Hash for AstType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.elements.len());
        for element in &self.elements {
            element.hash(state);
        }
    }
}

impl Hash for TypeElement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            TypeElement::Base(name) => {
                state.write_u8(0);
                state.write_u32(name.as_u32());
            }
            TypeElement::Pointer => state.write_u8(1),
            TypeElement::FixedArray(length) => {
                state.write_u8(2);
                state.write_u64(*length);
            }
            TypeElement::VarFixedArray(length) => {
                state.write_u8(3);
                length.structural_hash(state);
            }
            TypeElement::Polycount(name) => {
                state.write_u8(4);
                state.write_u32(name.as_u32());
            }
            TypeElement::Polymorph {
                name,
                allow_auto_conversion,
                prerequisite,
            } => {
                state.write_u8(5);
                state.write_u32(name.as_u32());
                state.write_u8(*allow_auto_conversion as u8);
                match prerequisite {
                    Some(prereq) => state.write_u32(prereq.as_u32()),
                    None => state.write_u32(u32::MAX),
                }
            }
            TypeElement::GenericBase { name, generics } => {
                state.write_u8(6);
                state.write_u32(name.as_u32());
                state.write_usize(generics.len());
                for generic in generics {
                    generic.hash(state);
                }
            }
            TypeElement::FuncPointer(shape) => {
                state.write_u8(7);
                state.write_u8(shape.is_vararg as u8);
                state.write_usize(shape.arg_types.len());
                for arg in &shape.arg_types {
                    arg.hash(state);
                }
                shape.return_type.hash(state);
            }
        }
    }
}

/// Collapse every `[expr]` element whose count is a `$#N` expression
/// into a dedicated count element, so downstream consumers never see
/// expressions inside type carriers.
pub fn collapse_polycount_var_fixed_arrays(ast_type: &mut AstType) {
    for element in &mut ast_type.elements {
        match element {
            TypeElement::VarFixedArray(length) => {
                if let ExprKind::Polycount(name) = length.kind {
                    *element = TypeElement::Polycount(name);
                }
            }
            TypeElement::GenericBase { generics, .. } => {
                for generic in generics {
                    collapse_polycount_var_fixed_arrays(generic);
                }
            }
            TypeElement::FuncPointer(shape) => {
                collapse_polycount_var_fixed_arrays(&mut shape.return_type);
                for arg in &mut shape.arg_types {
                    collapse_polycount_var_fixed_arrays(arg);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::string_interning::StringTable;

    #[test]
    fn pointer_to_relates_a_pointer_and_its_pointee() {
        let mut table = StringTable::new();
        let foo = table.intern("Foo");

        let value = AstType::base(foo, SourceLocation::NONE);
        let pointer = AstType::base_ptr(foo, SourceLocation::NONE);

        assert!(pointer.is_pointer_to(&value));
        assert!(!value.is_pointer_to(&pointer));
        assert_eq!(pointer.dereferenced(), Some(value));
    }

    #[test]
    fn structural_hash_ignores_source_locations() {
        let mut table = StringTable::new();
        let int = table.intern("int");

        let here = AstType::base(int, SourceLocation::new(0, 10));
        let there = AstType::base(int, SourceLocation::new(3, 900));

        assert_eq!(here.structural_hash(), there.structural_hash());
        assert_eq!(here, there); // equality is structural too
    }

    #[test]
    fn polycount_lengths_collapse_to_count_elements() {
        let mut table = StringTable::new();
        let n = table.intern("N");
        let int = table.intern("int");

        let mut ast_type = AstType {
            elements: vec![
                TypeElement::VarFixedArray(Box::new(Expr::new(
                    ExprKind::Polycount(n),
                    SourceLocation::NONE,
                ))),
                TypeElement::Base(int),
            ],
            source: SourceLocation::NONE,
        };

        collapse_polycount_var_fixed_arrays(&mut ast_type);

        assert_eq!(ast_type.elements[0], TypeElement::Polycount(n));
        assert!(ast_type.contains_polymorph());
    }

    #[test]
    fn literal_length_arrays_do_not_collapse() {
        let mut table = StringTable::new();
        let int = table.intern("int");

        let mut ast_type = AstType {
            elements: vec![
                TypeElement::VarFixedArray(Box::new(Expr::new(
                    ExprKind::IntLiteral(8),
                    SourceLocation::NONE,
                ))),
                TypeElement::Base(int),
            ],
            source: SourceLocation::NONE,
        };

        collapse_polycount_var_fixed_arrays(&mut ast_type);

        assert!(matches!(
            ast_type.elements[0],
            TypeElement::VarFixedArray(_)
        ));
        assert!(!ast_type.contains_polymorph());
    }
}
