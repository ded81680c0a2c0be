//! Unified error handling for the front-end.
//!
//! Every fatal condition in the parser and IR builder is reported as a
//! [`CompilerError`]: an owned message, the source location it points at,
//! a category tag, and optional structured metadata for tooling.
//!
//! There are no warnings in the core; [`CompilerMessages`] still carries a
//! warning list so outer layers (drivers, later passes) can aggregate into
//! the same value.
//!
//! Errors are created through the category macros:
//! - [`return_syntax_error!`] — unexpected token, missing delimiter
//! - [`return_wellformedness_error!`] — management-function prototype
//!   violations, duplicate singleton definitions
//! - [`return_rule_error!`] — semantic context violations
//! - [`return_limit_error!`] — fixed capacity exceeded
//! - [`return_compiler_error!`] — internal invariant broken
//! - [`return_ir_transformation_error!`] — AST to IR lowering failures

use crate::tokens::tokens::SourceLocation;
use std::collections::HashMap;

// The final set of errors and warnings emitted from the front-end
#[derive(Debug, Default)]
pub struct CompilerMessages {
    pub errors: Vec<CompilerError>,
    pub warnings: Vec<CompilerWarning>,
}

impl CompilerMessages {
    pub fn new() -> Self {
        CompilerMessages {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn from_error(error: CompilerError) -> Self {
        CompilerMessages {
            errors: vec![error],
            warnings: Vec::new(),
        }
    }
}

/// Warnings never originate in the core, but tooling built on top of it
/// reports through the same aggregate.
#[derive(Debug, Clone)]
pub struct CompilerWarning {
    pub msg: String,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    /// Malformed code that doesn't follow the grammar
    Syntax,

    /// A reserved-name function declared with the wrong prototype,
    /// or a singleton special function defined twice
    WellFormedness,

    /// Valid grammar in an invalid context (foreign inside a struct
    /// domain, void-returning single-line function, ...)
    Rule,

    /// A fixed capacity was exceeded
    Limit,

    /// Internal front-end bug, not the user's fault
    Compiler,

    /// Failure while lowering AST to IR
    IrTransformation,

    /// Project configuration problems
    Config,
}

// This is for creating more structured and detailed error messages
// without parsing them back out of the message text
#[derive(Debug, Eq, Hash, PartialEq, Clone)]
pub enum ErrorMetaDataKey {
    CompilationStage,
    FunctionName,
    VariableName,

    // Optional suggestions
    PrimarySuggestion,
    ExpectedPrototype,

    // Type information
    ExpectedType,
    FoundType,
}

#[derive(Debug, Clone)]
pub struct CompilerError {
    pub msg: String,
    pub location: SourceLocation,
    pub error_type: ErrorType,
    pub metadata: HashMap<ErrorMetaDataKey, &'static str>,
}

impl CompilerError {
    pub fn new(msg: impl Into<String>, location: SourceLocation, error_type: ErrorType) -> Self {
        CompilerError {
            msg: msg.into(),
            location,
            error_type,
            metadata: HashMap::new(),
        }
    }

    pub fn new_syntax_error(msg: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(msg, location, ErrorType::Syntax)
    }

    pub fn new_rule_error(msg: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(msg, location, ErrorType::Rule)
    }

    pub fn new_wellformedness_error(msg: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(msg, location, ErrorType::WellFormedness)
    }

    pub fn new_config_error(msg: impl Into<String>) -> Self {
        Self::new(msg, SourceLocation::NONE, ErrorType::Config)
    }

    pub fn new_internal_error(msg: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(
            format!("INTERNAL ERROR: {}", msg.into()),
            location,
            ErrorType::Compiler,
        )
    }

    pub fn with_metadata_entry(mut self, key: ErrorMetaDataKey, value: &'static str) -> Self {
        self.metadata.insert(key, value);
        self
    }
}

/// Returns a new CompilerError for grammar violations.
///
/// Usage:
/// `return_syntax_error!("Expected ')' after argument type", location)`;
#[macro_export]
macro_rules! return_syntax_error {
    ($msg:expr, $loc:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {
        return Err($crate::diagnostics::compiler_errors::CompilerError {
            msg: $msg.into(),
            location: $loc,
            error_type: $crate::diagnostics::compiler_errors::ErrorType::Syntax,
            metadata: {
                let mut map = std::collections::HashMap::new();
                $( map.insert($crate::diagnostics::compiler_errors::ErrorMetaDataKey::$key, $value); )*
                map
            },
        })
    };
    ($msg:expr, $loc:expr) => {
        return Err($crate::diagnostics::compiler_errors::CompilerError::new_syntax_error(
            $msg, $loc,
        ))
    };
}

/// Returns a new CompilerError for a reserved-name function declared with
/// the wrong shape. The message should restate the required prototype.
#[macro_export]
macro_rules! return_wellformedness_error {
    ($msg:expr, $loc:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {
        return Err($crate::diagnostics::compiler_errors::CompilerError {
            msg: $msg.into(),
            location: $loc,
            error_type: $crate::diagnostics::compiler_errors::ErrorType::WellFormedness,
            metadata: {
                let mut map = std::collections::HashMap::new();
                $( map.insert($crate::diagnostics::compiler_errors::ErrorMetaDataKey::$key, $value); )*
                map
            },
        })
    };
    ($msg:expr, $loc:expr) => {
        return Err($crate::diagnostics::compiler_errors::CompilerError::new_wellformedness_error(
            $msg, $loc,
        ))
    };
}

/// Returns a new CompilerError for valid grammar used in an invalid context.
#[macro_export]
macro_rules! return_rule_error {
    ($msg:expr, $loc:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {
        return Err($crate::diagnostics::compiler_errors::CompilerError {
            msg: $msg.into(),
            location: $loc,
            error_type: $crate::diagnostics::compiler_errors::ErrorType::Rule,
            metadata: {
                let mut map = std::collections::HashMap::new();
                $( map.insert($crate::diagnostics::compiler_errors::ErrorMetaDataKey::$key, $value); )*
                map
            },
        })
    };
    ($msg:expr, $loc:expr) => {
        return Err($crate::diagnostics::compiler_errors::CompilerError::new_rule_error(
            $msg, $loc,
        ))
    };
}

/// Returns a new CompilerError for an exceeded fixed capacity.
#[macro_export]
macro_rules! return_limit_error {
    ($msg:expr, $loc:expr) => {
        return Err($crate::diagnostics::compiler_errors::CompilerError::new(
            $msg,
            $loc,
            $crate::diagnostics::compiler_errors::ErrorType::Limit,
        ))
    };
}

/// Returns a new CompilerError for a broken internal invariant.
/// The message is prefixed with "INTERNAL ERROR".
#[macro_export]
macro_rules! return_compiler_error {
    ($msg:expr, $loc:expr) => {
        return Err($crate::diagnostics::compiler_errors::CompilerError::new_internal_error(
            $msg, $loc,
        ))
    };
}

/// Returns a new CompilerError for failures while lowering AST to IR.
#[macro_export]
macro_rules! return_ir_transformation_error {
    ($msg:expr, $loc:expr) => {
        return Err($crate::diagnostics::compiler_errors::CompilerError::new(
            $msg,
            $loc,
            $crate::diagnostics::compiler_errors::ErrorType::IrTransformation,
        ))
    };
}
