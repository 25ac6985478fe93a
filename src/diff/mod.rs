//! Diff module - N-way structural differences between value trees.

mod objects;
mod tree;


pub use objects::*;
pub use tree::*;
