use super::func_named;
use crate::ast::ast::{ArgTypeTrait, Flow, FunctionTraits, GroupHint};
use crate::ast::ast_types::TypeElement;
use crate::ast::expressions::ExprKind;
use crate::settings::Config;
use crate::test_support::{parse_source_err, parse_source_ok, parse_source_with_config};

fn default_int(arg: &crate::ast::ast::AstArgument) -> Option<i64> {
    match &arg.default {
        Some(expr) => match expr.kind {
            ExprKind::IntLiteral(value) => Some(value),
            _ => None,
        },
        None => None,
    }
}

#[test]
fn backfilled_arguments_share_the_rightmost_type_and_default() {
    let (ast, table) = parse_source_ok("func f(a, b, c int = 7) void {}\n");
    let func = func_named(&ast, &table, "f");

    assert_eq!(func.arity(), 3);
    assert_eq!(func.args.len(), func.arity());

    for arg in &func.args {
        assert!(arg.ast_type.is_base_of(&table, "int"));
        assert_eq!(arg.flow, Flow::In);
        assert_eq!(default_int(arg), Some(7));
    }
}

#[test]
fn an_existing_default_stops_default_inheritance() {
    let (ast, table) = parse_source_ok("func f(a = 9, b, c int = 7) void {}\n");
    let func = func_named(&ast, &table, "f");

    assert_eq!(func.arity(), 3);
    assert_eq!(default_int(&func.args[0]), Some(9));
    assert_eq!(default_int(&func.args[1]), Some(7));
    assert_eq!(default_int(&func.args[2]), Some(7));
}

#[test]
fn backfilled_types_are_independent_clones() {
    let (ast, table) = parse_source_ok("func f(a, b *Foo) void {}\n");
    let func = func_named(&ast, &table, "f");

    assert_eq!(func.args[0].ast_type, func.args[1].ast_type);
    assert!(func.args[0].ast_type.is_base_ptr());
}

#[test]
fn unfinished_backfill_group_is_fatal() {
    let message = parse_source_err("func f(a, b) void {}\n");
    assert!(message.contains("Expected argument type"), "{message}");
}

#[test]
fn flows_and_pod_traits_are_recorded_per_argument() {
    let (ast, table) = parse_source_ok("func f(a int, out b *int, inout c POD int) void {}\n");
    let func = func_named(&ast, &table, "f");

    assert_eq!(func.args[0].flow, Flow::In);
    assert_eq!(func.args[1].flow, Flow::Out);
    assert_eq!(func.args[2].flow, Flow::InOut);
    assert_eq!(func.args[0].type_trait, ArgTypeTrait::None);
    assert_eq!(func.args[2].type_trait, ArgTypeTrait::Pod);
}

// ----------------------
// Foreign declarations
// ----------------------

#[test]
fn foreign_argument_without_name_is_a_bare_type() {
    let (ast, table) = parse_source_ok("foreign puts(cstring) int\n");
    let func = func_named(&ast, &table, "puts");

    assert!(func.traits.contains(FunctionTraits::FOREIGN));
    assert!(func.statements.is_empty());
    assert_eq!(func.arity(), 1);
    assert_eq!(func.args[0].name, None);
    assert!(func.args[0].ast_type.is_base_of(&table, "cstring"));
}

#[test]
fn foreign_argument_with_name_keeps_the_name() {
    let (ast, table) = parse_source_ok("foreign puts(msg cstring) int\n");
    let func = func_named(&ast, &table, "puts");

    assert_eq!(func.arity(), 1);
    assert!(func.args[0].name.is_some());
    assert!(func.args[0].ast_type.is_base_of(&table, "cstring"));
}

#[test]
fn lone_foreign_word_argument_is_a_type_not_a_name() {
    let (ast, table) = parse_source_ok("foreign puts(msg) int\n");
    let func = func_named(&ast, &table, "puts");

    assert_eq!(func.args[0].name, None);
    assert!(func.args[0].ast_type.is_base_of(&table, "msg"));
}

#[test]
fn mixing_bare_types_and_names_diagnoses_the_ambiguity() {
    let message = parse_source_err("foreign f(ptr, len usize) void\n");
    assert!(message.contains("'ptr' is ambiguous"), "{message}");
    assert!(message.contains("'ptr Type'"), "{message}");
    assert!(message.contains("'_ ptr'"), "{message}");
}

#[test]
fn foreign_functions_cannot_be_polymorphic() {
    let message = parse_source_err("foreign bar($T) void\n");
    assert_eq!(message, "Cannot declare polymorphic foreign functions");
}

// ----------------
// Variable arity
// ----------------

#[test]
fn named_ellipsis_becomes_the_variadic_argument() {
    let (ast, table) = parse_source_ok("func f(items ...) void {}\n");
    let func = func_named(&ast, &table, "f");

    assert_eq!(func.arity(), 0);
    assert!(func.traits.contains(FunctionTraits::VARIADIC));
    assert!(!func.traits.contains(FunctionTraits::VARARG));
    assert!(
        func.variadic_arg_name
            .is_some_and(|name| name.eq_str(&table, "items"))
    );
}

#[test]
fn lone_ellipsis_sets_the_vararg_trait() {
    let (ast, table) = parse_source_ok("foreign printf(fmt cstring, ...) int\n");
    let func = func_named(&ast, &table, "printf");

    assert_eq!(func.arity(), 1);
    assert!(func.traits.contains(FunctionTraits::VARARG));
    assert!(func.variadic_arg_name.is_none());
}

#[test]
fn arguments_after_the_variadic_marker_are_fatal() {
    assert!(
        crate::test_support::parse_source("func f(items ..., x int) void {}\n")
            .0
            .is_err()
    );
}

#[test]
fn foreign_functions_reject_named_variadic_arguments() {
    let message = parse_source_err("foreign f(items ...) void\n");
    assert!(message.contains("cannot have named variadic"), "{message}");
}

// ---------------------
// Heads and prefixes
// ---------------------

#[test]
fn omitted_return_type_defaults_to_void() {
    let (ast, table) = parse_source_ok("func f {}\n");
    let func = func_named(&ast, &table, "f");

    assert_eq!(func.arity(), 0);
    assert!(func.return_type.is_void(&table));
}

#[test]
fn external_prefix_exports_under_the_function_name() {
    let (ast, table) = parse_source_ok("external func f {}\n");
    let func = func_named(&ast, &table, "f");

    assert!(func.traits.contains(FunctionTraits::EXTERNAL));
    assert!(func.export_name.is_some_and(|name| name.eq_str(&table, "f")));
}

#[test]
fn string_between_keyword_and_name_overrides_the_export_name() {
    let (ast, table) = parse_source_ok("external func \"real_puts\" puts2 {}\n");
    let func = func_named(&ast, &table, "puts2");

    assert!(
        func.export_name
            .is_some_and(|name| name.eq_str(&table, "real_puts"))
    );
}

#[test]
fn prefixes_combine_in_any_order() {
    let (ast, table) = parse_source_ok("stdcall verbatim func f {}\n");
    let func = func_named(&ast, &table, "f");

    assert!(func.traits.contains(FunctionTraits::STDCALL));
    assert!(func.traits.contains(FunctionTraits::VERBATIM));
}

#[test]
fn entry_point_function_is_marked() {
    let (ast, table) = parse_source_ok("func helper {}\nfunc main {}\n");

    assert!(!func_named(&ast, &table, "helper").is_entry);
    assert!(func_named(&ast, &table, "main").is_entry);
}

#[test]
fn single_line_body_of_void_function_is_fatal() {
    let message = parse_source_err("func f = 5\n");
    assert_eq!(message, "Cannot return 'void' from single line function");
}

#[test]
fn single_line_body_becomes_a_return_statement() {
    let (ast, table) = parse_source_ok("func f() int = 5\n");
    let func = func_named(&ast, &table, "f");

    assert_eq!(func.statements.len(), 1);
    assert!(matches!(
        func.statements[0].kind,
        crate::ast::statements::StmtKind::Return { value: Some(_), .. }
    ));
}

#[test]
fn qualified_declarations_consume_the_stashed_prename() {
    let config = Config {
        colon_colon: true,
        ..Config::default()
    };

    let (result, table) =
        parse_source_with_config("length :: func() usize = 0\n", &config);
    let ast = result.expect("qualified declaration should parse");

    assert_eq!(ast.funcs.len(), 1);
    assert!(ast.funcs[0].name.eq_str(&table, "length"));
}

#[test]
fn namespace_prefixes_top_level_names() {
    let (ast, table) = parse_source_ok("namespace math\nfunc add {}\n");
    assert!(ast.funcs[0].name.eq_str(&table, "math::add"));
}

#[test]
fn pragma_builtin_marks_the_next_function() {
    let (ast, table) = parse_source_ok("pragma builtin\nfunc f {}\nfunc g {}\n");

    assert!(func_named(&ast, &table, "f").traits.contains(FunctionTraits::BUILTIN));
    assert!(!func_named(&ast, &table, "g").traits.contains(FunctionTraits::BUILTIN));
}

// ----------------------
// Management functions
// ----------------------

#[test]
fn well_formed_defer_is_accepted() {
    let (ast, table) = parse_source_ok("func __defer__(this *Foo) void {}\n");
    let func = func_named(&ast, &table, "__defer__");
    assert!(func.traits.contains(FunctionTraits::DEFER));
}

#[test]
fn defer_with_wrong_return_type_reports_the_prototype() {
    let message = parse_source_err("func __defer__(this *Foo) int {}\n");
    assert!(
        message.contains("__defer__ must be declared as 'func __defer__(this *T) void'"),
        "{message}"
    );
}

#[test]
fn defer_requires_a_this_argument() {
    let message = parse_source_err("func __defer__(value *Foo) void {}\n");
    assert!(message.contains("__defer__"), "{message}");
}

#[test]
fn well_formed_pass_is_accepted() {
    let (ast, table) = parse_source_ok("func __pass__(value POD Foo) Foo = value\n");
    let func = func_named(&ast, &table, "__pass__");
    assert!(func.traits.contains(FunctionTraits::PASS));
}

#[test]
fn pass_requires_matching_argument_and_return_types() {
    let message = parse_source_err("func __pass__(value POD Foo) Bar = value\n");
    assert!(
        message.contains("__pass__ must be declared as 'func __pass__(value POD T) T'"),
        "{message}"
    );
}

#[test]
fn pass_requires_the_pod_trait() {
    let message = parse_source_err("func __pass__(value Foo) Foo = value\n");
    assert!(message.contains("__pass__"), "{message}");
}

#[test]
fn well_formed_assign_is_accepted() {
    parse_source_ok("func __assign__(this *Foo, other Foo) void {}\n");
}

#[test]
fn assign_second_argument_must_be_the_pointee_of_the_first() {
    let message = parse_source_err("func __assign__(this *Foo, other int) void {}\n");
    assert!(
        message.contains("__assign__ must be declared like"),
        "{message}"
    );
}

#[test]
fn length_must_return_usize() {
    parse_source_ok("func __length__(this *Foo) usize = 0\n");

    let message = parse_source_err("func __length__(this *Foo) int = 0\n");
    assert!(message.contains("__length__"), "{message}");
}

#[test]
fn access_requires_pointer_argument_and_return() {
    parse_source_ok("func __access__(this *Foo, index $Key) *$Value = null\n");

    let message = parse_source_err("func __access__(this Foo, index $Key) *$Value = null\n");
    assert!(message.contains("__access__"), "{message}");
}

#[test]
fn array_requires_pointer_argument_and_return() {
    parse_source_ok("func __array__(this *Foo) *$Element = null\n");

    let message = parse_source_err("func __array__(this *Foo) usize = 0\n");
    assert!(message.contains("__array__"), "{message}");
}

#[test]
fn variadic_array_is_recorded_and_singleton() {
    let source = "func __variadic_array__(pointer ptr, bytes usize, length usize, maybe_types ptr) int = 0\n";
    let (ast, _) = parse_source_ok(source);
    assert!(ast.common.variadic_array_return.is_some());

    let doubled = format!("{source}{source}");
    let message = parse_source_err(&doubled);
    assert!(message.contains("can only be defined once"), "{message}");
}

#[test]
fn variadic_array_prototype_is_enforced() {
    let message =
        parse_source_err("func __variadic_array__(pointer ptr, bytes usize) int = 0\n");
    assert!(message.contains("__variadic_array__"), "{message}");
}

#[test]
fn initializer_list_is_recorded() {
    let (ast, _) =
        parse_source_ok("func __initializer_list__(array *$T, length usize) <$T> List = null\n");
    assert!(ast.common.initializer_list_return.is_some());
}

#[test]
fn math_management_functions_take_exactly_two_non_pointer_arguments() {
    parse_source_ok("func __add__(a Vec, b Vec) Vec = a\n");

    let one_arg = parse_source_err("func __add__(a Vec) Vec = a\n");
    assert!(one_arg.contains("must take two arguments"), "{one_arg}");

    let pointer_first = parse_source_err("func __multiply__(a *Vec, b Vec) Vec = b\n");
    assert!(
        pointer_first.contains("cannot have a pointer as the first argument"),
        "{pointer_first}"
    );
}

// --------------
// Polymorphism
// --------------

#[test]
fn polymorphic_functions_are_indexed() {
    let (ast, table) = parse_source_ok("func pick(a $T, b $T) $T = a\n");
    let func = func_named(&ast, &table, "pick");

    assert!(func.traits.contains(FunctionTraits::POLYMORPHIC));
    assert_eq!(ast.polymorphic_funcs.len(), 1);
    assert!(ast.polymorphic_methods.is_empty());
    assert_eq!(
        ast.polymorphic_funcs[0].is_beginning_of_group,
        GroupHint::Uncalculated
    );
}

#[test]
fn polymorphic_functions_with_this_are_also_methods() {
    let (ast, _) = parse_source_ok("func reset(this *Foo, value $T) void {}\n");

    assert_eq!(ast.polymorphic_funcs.len(), 1);
    assert_eq!(ast.polymorphic_methods.len(), 1);
}

// ---------------------
// Composite domains
// ---------------------

#[test]
fn domain_functions_get_an_implicit_this_pointer() {
    let source = "\
struct List (length usize, capacity usize) {
    func clear() void {}
}
";
    let (ast, table) = parse_source_ok(source);
    let func = func_named(&ast, &table, "clear");

    assert_eq!(func.arity(), 1);
    let this_arg = &func.args[0];
    assert!(this_arg.name.is_some_and(|name| name.eq_str(&table, "this")));
    assert_eq!(this_arg.flow, Flow::In);
    assert_eq!(this_arg.type_trait, ArgTypeTrait::None);
    assert!(this_arg.ast_type.is_base_ptr());
    assert_eq!(this_arg.ast_type.to_source(&table), "*List");
}

#[test]
fn polymorphic_domains_insert_a_generic_this_pointer() {
    let source = "\
struct <$T> Box (value $T) {
    func get(fallback $T) $T = fallback
}
";
    let (ast, table) = parse_source_ok(source);
    let func = func_named(&ast, &table, "get");

    assert_eq!(func.arity(), 2);
    match func.args[0].ast_type.elements.as_slice() {
        [TypeElement::Pointer, TypeElement::GenericBase { name, generics }] => {
            assert!(name.eq_str(&table, "Box"));
            assert_eq!(generics.len(), 1);
            assert!(generics[0].is_polymorph());
        }
        other => panic!("unexpected this type shape: {other:?}"),
    }

    // Methods on polymorphic composites land in both indices
    assert_eq!(ast.polymorphic_funcs.len(), 1);
    assert_eq!(ast.polymorphic_methods.len(), 1);
}

#[test]
fn foreign_declarations_are_rejected_inside_domains() {
    let source = "\
struct List (length usize) {
    foreign free(ptr) void
}
";
    let message = parse_source_err(source);
    assert!(message.contains("foreign function"), "{message}");
}

// -----------------
// Function aliases
// -----------------

#[test]
fn alias_without_argument_types_matches_the_first_of_name() {
    let (ast, table) = parse_source_ok("func alias p => puts\n");

    assert_eq!(ast.func_aliases.len(), 1);
    let alias = &ast.func_aliases[0];
    assert!(alias.from.eq_str(&table, "p"));
    assert!(alias.to.eq_str(&table, "puts"));
    assert!(alias.match_first_of_name);
    assert!(alias.arg_types.is_empty());
}

#[test]
fn alias_with_argument_types_matches_a_specific_overload() {
    let (ast, table) = parse_source_ok("func alias myPuts(cstring) => puts\n");

    let alias = &ast.func_aliases[0];
    assert!(!alias.match_first_of_name);
    assert_eq!(alias.arg_types.len(), 1);
    assert!(alias.arg_types[0].is_base_of(&table, "cstring"));
}

#[test]
fn alias_trait_markers_require_matching_arity_traits() {
    let (ast, _) = parse_source_ok("func alias v(int, ...) => f\nfunc alias w(..) => g\n");

    assert!(ast.func_aliases[0]
        .required_traits
        .contains(FunctionTraits::VARARG));
    assert!(ast.func_aliases[1]
        .required_traits
        .contains(FunctionTraits::VARIADIC));
}

#[test]
fn alias_rejects_arguments_after_variadic_markers() {
    let message = parse_source_err("func alias v(..., int) => f\n");
    assert!(message.contains("Expected ')' after variadic argument"), "{message}");
}

// ------------------------------
// Signature printing round trip
// ------------------------------

#[test]
fn printed_signatures_reparse_to_the_same_shape() {
    let source = "func f(a int, out b *double, c POD [4] double = 1.5, inout d $T) $T {}\n";
    let (ast, table) = parse_source_ok(source);
    let func = func_named(&ast, &table, "f");

    let printed = format!("{} {{}}\n", func.signature_to_source(&table));
    let (reparsed_ast, reparsed_table) = parse_source_ok(&printed);
    let reparsed = func_named(&reparsed_ast, &reparsed_table, "f");

    assert_eq!(func.arity(), reparsed.arity());
    assert_eq!(
        func.return_type.to_source(&table),
        reparsed.return_type.to_source(&reparsed_table)
    );

    for (original, round_tripped) in func.args.iter().zip(reparsed.args.iter()) {
        assert_eq!(original.flow, round_tripped.flow);
        assert_eq!(original.type_trait, round_tripped.type_trait);
        assert_eq!(
            original.ast_type.to_source(&table),
            round_tripped.ast_type.to_source(&reparsed_table)
        );
    }
}

#[test]
fn variadic_signatures_survive_the_round_trip() {
    let source = "func f(count int, items ...) void {}\n";
    let (ast, table) = parse_source_ok(source);
    let func = func_named(&ast, &table, "f");

    let printed = format!("{} {{}}\n", func.signature_to_source(&table));
    let (reparsed_ast, reparsed_table) = parse_source_ok(&printed);
    let reparsed = func_named(&reparsed_ast, &reparsed_table, "f");

    assert_eq!(reparsed.arity(), 1);
    assert!(reparsed.traits.contains(FunctionTraits::VARIADIC));
    assert!(
        reparsed
            .variadic_arg_name
            .is_some_and(|name| name.eq_str(&reparsed_table, "items"))
    );
}
