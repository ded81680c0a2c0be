use crate::diagnostics::compiler_errors::CompilerError;
use serde::Deserialize;

pub const EMBER_FILE_EXTENSION: &str = "em";
pub const DEFAULT_ENTRY_POINT: &str = "main";

// Hard cap on function and function-alias ids.
// Ids above this cannot be represented in call metadata downstream.
pub const MAX_FUNC_ID: usize = 0x00FF_FFFF;

// Bucket count of the special-function cache. Power of two so the
// structural hash can be masked instead of divided.
pub const SF_CACHE_SIZE: usize = 1024;

// These are guesses about how much should be initially allocated for
// the argument and statement vecs of a function being parsed.
// Just heuristics based on what small real programs tend to look like.
// Should be recalculated at a later point.
pub const ARGUMENT_CAPACITY_GUESS: usize = 4;
pub const STATEMENT_CAPACITY_GUESS: usize = 16;
pub const FUNC_ALIAS_CAPACITY_GUESS: usize = 8;
pub const MINIMUM_STRING_TABLE_CAPACITY: usize = 64;

/// Options that change how the front-end behaves for a whole project.
/// The driver usually loads these from the project's TOML manifest,
/// but builders can construct them directly.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name of the function treated as the program entry point
    pub entry_point: String,

    /// Allows `Name :: func ...` qualified declarations
    pub colon_colon: bool,

    /// Pre-lexed package token streams are a deprecated input format.
    /// When false (the default), streams containing them are rejected.
    pub accept_prelexed_packages: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            entry_point: String::from(DEFAULT_ENTRY_POINT),
            colon_colon: false,
            accept_prelexed_packages: false,
        }
    }
}

impl Config {
    pub fn from_toml_str(source: &str) -> Result<Config, CompilerError> {
        toml::from_str(source).map_err(|e| {
            CompilerError::new_config_error(format!("Failed to read project config: {e}"))
        })
    }
}
