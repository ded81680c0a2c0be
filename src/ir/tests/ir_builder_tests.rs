use crate::ast::ast::Ast;
use crate::ir::ir_builder::IrBuilder;
use crate::ir::ir_nodes::{BlockId, InstructionKind, IrModule, IrValue};
use crate::ir::sf_cache::SpecialFunctionCache;
use crate::string_interning::StringTable;

fn with_builder<T>(run: impl FnOnce(&mut IrBuilder) -> T) -> T {
    let mut module = IrModule::new();
    let ast = Ast::new();
    let mut table = StringTable::new();
    let mut cache = SpecialFunctionCache::new();

    let mut builder = IrBuilder::new(&mut module, &ast, &mut table, &mut cache);
    run(&mut builder)
}

#[test]
fn block_ids_follow_creation_order() {
    with_builder(|builder| {
        // Block 0 is the entry block created by the builder itself
        assert_eq!(builder.basicblocks.len(), 1);
        assert_eq!(builder.build_basicblock(), BlockId(1));
        assert_eq!(builder.build_basicblock(), BlockId(2));
        assert_eq!(builder.basicblocks[2].id, BlockId(2));
    });
}

#[test]
fn instruction_count_is_stable_across_block_creation() {
    with_builder(|builder| {
        let usize_ptr = builder.usize_ptr_type();

        builder.build_varptr(usize_ptr, 0);
        let second = builder.build_basicblock();
        builder.build_varptr(usize_ptr, 1);
        builder.build_basicblock();
        builder.build_varptr(usize_ptr, 2);

        // Exactly the three emitted instructions, no matter how many
        // blocks were created in between
        assert_eq!(builder.block(BlockId(0)).instructions.len(), 3);
        assert!(builder.block(second).instructions.is_empty());
    });
}

#[test]
fn values_reference_results_by_block_and_index() {
    with_builder(|builder| {
        let usize_ptr = builder.usize_ptr_type();

        builder.build_varptr(usize_ptr, 0);
        let value = builder.build_varptr(usize_ptr, 7);

        match value {
            IrValue::Result {
                block,
                instruction,
                ir_type,
            } => {
                assert_eq!(block, BlockId(0));
                assert_eq!(instruction, 1);
                assert_eq!(ir_type, usize_ptr);
            }
            other => panic!("expected a result value, got {other:?}"),
        }
    });
}

#[test]
fn shared_type_accessors_memoize() {
    with_builder(|builder| {
        assert_eq!(builder.usize_type(), builder.usize_type());
        assert_eq!(builder.usize_ptr_type(), builder.usize_ptr_type());
        assert_eq!(builder.funcptr_type(), builder.funcptr_type());
        assert_eq!(builder.bool_type(), builder.bool_type());
        assert_ne!(builder.usize_type(), builder.usize_ptr_type());
    });
}

#[test]
fn loop_stack_resolves_labels_innermost_first() {
    with_builder(|builder| {
        let mut table = StringTable::new();
        let outer = table.intern("outer");
        let inner = table.intern("inner");

        let outer_break = builder.build_basicblock();
        let outer_continue = builder.build_basicblock();
        let inner_break = builder.build_basicblock();
        let inner_continue = builder.build_basicblock();

        builder.prepare_for_new_label();
        builder.push_loop_label(Some(outer), Some(outer_break), Some(outer_continue));
        builder.push_loop_label(Some(inner), Some(inner_break), Some(inner_continue));

        assert_eq!(builder.innermost_break_target(), Some(inner_break));
        assert_eq!(builder.innermost_continue_target(), Some(inner_continue));
        assert_eq!(
            builder.labeled_targets(outer).unwrap().break_block_id,
            Some(outer_break)
        );

        builder.pop_loop_label();
        assert_eq!(builder.innermost_break_target(), Some(outer_break));

        builder.pop_loop_label();
        assert_eq!(builder.innermost_break_target(), None);
        assert!(builder.labeled_targets(inner).is_none());
    });
}

#[test]
fn break_and_cond_break_record_their_targets() {
    with_builder(|builder| {
        let target = builder.build_basicblock();
        let other = builder.build_basicblock();

        builder.build_break(target);
        let condition = builder.build_bool(true);
        builder.use_basicblock(target);
        builder.build_cond_break(condition, other, target);

        assert!(matches!(
            builder.block(BlockId(0)).instructions[0].kind,
            InstructionKind::Break { target: t } if t == target
        ));
        assert!(matches!(
            builder.block(target).instructions[0].kind,
            InstructionKind::ConditionalBreak { true_target, false_target, .. }
                if true_target == other && false_target == target
        ));
    });
}

#[test]
fn anonymous_globals_keep_stable_references_and_initializers() {
    let mut module = IrModule::new();
    let usize_type = module
        .types
        .register(crate::ir::ir_nodes::IrTypeKind::Usize);

    let first = module.build_anon_global(usize_type, true);
    let second = module.build_anon_global(usize_type, false);
    assert_ne!(first, second);

    let initializer = IrValue::Literal {
        literal: crate::ir::ir_nodes::IrLiteral::Usize(42),
        ir_type: usize_type,
    };
    module.build_anon_global_initializer(&second, initializer.clone());

    assert!(module.anon_globals[0].initializer.is_none());
    assert!(module.anon_globals[0].is_constant);
    assert_eq!(module.anon_globals[1].initializer, Some(initializer));
}

#[test]
fn static_structs_and_arrays_wrap_their_member_values() {
    let mut module = IrModule::new();
    let usize_type = module
        .types
        .register(crate::ir::ir_nodes::IrTypeKind::Usize);

    let member = IrValue::Literal {
        literal: crate::ir::ir_nodes::IrLiteral::Usize(1),
        ir_type: usize_type,
    };

    let built_struct = module.build_static_struct(usize_type, vec![member.clone()], true);
    match built_struct {
        IrValue::Literal {
            literal:
                crate::ir::ir_nodes::IrLiteral::Struct {
                    ref values,
                    is_mutable,
                },
            ..
        } => {
            assert_eq!(values.len(), 1);
            assert!(is_mutable);
        }
        other => panic!("expected a struct literal, got {other:?}"),
    }

    let built_array = module.build_static_array(usize_type, vec![member.clone(), member]);
    assert!(matches!(
        built_array,
        IrValue::Literal {
            literal: crate::ir::ir_nodes::IrLiteral::Array(ref values),
            ..
        } if values.len() == 2
    ));
}

#[test]
fn literal_helpers_carry_their_types() {
    use crate::ir::ir_nodes::{IrLiteral, IrTypeKind};

    with_builder(|builder| {
        let count = builder.build_literal_usize(12);
        assert_eq!(count.ir_type(), builder.usize_type());

        let yes = builder.build_bool(true);
        assert_eq!(yes.ir_type(), builder.bool_type());

        let message = builder.build_literal_cstr("hello");
        assert!(matches!(
            builder.module.types.kind(message.ir_type()),
            IrTypeKind::Pointer(_)
        ));

        let untyped_null = builder.build_null_pointer();
        assert!(matches!(
            builder.module.types.kind(untyped_null.ir_type()),
            IrTypeKind::RawPtr
        ));

        let typed_null = builder.build_null_pointer_of_type(message.ir_type());
        assert!(matches!(
            typed_null,
            IrValue::Literal {
                literal: IrLiteral::NullPointer,
                ..
            }
        ));
        assert_eq!(typed_null.ir_type(), message.ir_type());
    });
}

#[test]
fn type_registry_interns_equal_shapes() {
    let mut module = IrModule::new();
    use crate::ir::ir_nodes::IrTypeKind;

    let a = module.types.register(IrTypeKind::S64);
    let b = module.types.register(IrTypeKind::S64);
    let ptr_a = module.types.register(IrTypeKind::Pointer(a));
    let ptr_b = module.types.register(IrTypeKind::Pointer(b));

    assert_eq!(a, b);
    assert_eq!(ptr_a, ptr_b);
    assert_eq!(module.types.len(), 2);
}
