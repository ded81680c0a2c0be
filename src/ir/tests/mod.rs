mod ir_builder_tests;
