pub mod compiler_errors;
pub mod dev_logging;
pub mod display_messages;
