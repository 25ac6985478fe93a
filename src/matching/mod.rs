//! Matching module - Equality queries over dotted and structured documents.

mod matcher;

pub use matcher::*;
