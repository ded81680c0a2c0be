mod parse_func_tests;

use crate::ast::ast::{Ast, AstFunction};
use crate::string_interning::StringTable;

pub(crate) fn func_named<'a>(
    ast: &'a Ast,
    table: &StringTable,
    name: &str,
) -> &'a AstFunction {
    ast.funcs
        .iter()
        .find(|func| func.name.eq_str(table, name))
        .unwrap_or_else(|| panic!("no function named '{name}' was parsed"))
}
