//! Field path module - Dotted path addressing into nested trees.
//!
//! Paths are dot-separated segments. This module converts trees to their
//! dotted form and reads, writes and deletes values at a path.

mod access;
mod dotted;
mod path;

pub use access::*;
pub use dotted::*;
pub use path::*;
