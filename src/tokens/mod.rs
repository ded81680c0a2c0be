pub mod token_data;
pub mod tokens;
