//! Merge module - Deep merge of value trees with an optional per-field customizer.

mod merger;


pub use merger::*;
