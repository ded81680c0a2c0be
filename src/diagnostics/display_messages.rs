use crate::diagnostics::compiler_errors::{CompilerError, CompilerMessages, ErrorType};
use saying::say;

pub fn print_compiler_messages(messages: &CompilerMessages) {
    for err in &messages.errors {
        print_formatted_error(err);
    }

    for warning in &messages.warnings {
        say!(Yellow "Warning: ", warning.msg.as_str());
    }
}

pub fn print_formatted_error(e: &CompilerError) {
    match e.error_type {
        ErrorType::Syntax => {
            say!(Red "Syntax Error");
        }
        ErrorType::WellFormedness => {
            say!(Red "Invalid Declaration");
        }
        ErrorType::Rule => {
            say!(Red "Rule");
        }
        ErrorType::Limit => {
            say!(Red "Limit Reached");
        }
        ErrorType::IrTransformation => {
            say!(Red "IR Generation Error");
        }
        ErrorType::Config => {
            say!(Yellow "Project Config Error");
            say!(e.msg.as_str());
            return;
        }
        ErrorType::Compiler => {
            say!(Red "Compiler Bug (not your fault, please report this)");
        }
    }

    if !e.location.is_none() {
        say!(
            Dark Magenta "Stream ",
            Bright { e.location.origin },
            Dark Magenta " offset ",
            Bright { e.location.offset }
        );
    }

    say!(e.msg.as_str());
}
