//! Value module - In-memory representation of plain data trees.
//!
//! This module provides the value model, its classification into scalars and
//! collections, and the equality and copy primitives every other module
//! builds on.

mod equals;
mod value;

pub use equals::*;
pub use value::*;
