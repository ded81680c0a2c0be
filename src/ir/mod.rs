pub mod bridge;
pub mod ir_builder;
pub mod ir_nodes;
pub mod lower;
pub mod sf_cache;

#[cfg(test)]
mod tests;
