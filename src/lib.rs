//! # objtools
//!
//! Structural operations on plain data trees: the kind of nested maps, lists
//! and scalars that JSON and YAML documents decode into.
//!
//! The library classifies values into scalars and collections and builds on
//! that to provide deep equality, deep copy, dotted path addressing, query
//! matching, customizable deep merge, N-way diffing and in-place
//! synchronization with change tracking.
//!
//! ## Modules
//!
//! - [`value`] - The value model, classification, equality and copy
//! - [`fieldpath`] - Dotted paths: collapse, get, set and delete
//! - [`matching`] - Equality queries against documents
//! - [`merge`] - Deep merge with a per-field customizer
//! - [`diff`] - N-way structural differences
//! - [`sync`] - In-place synchronization with change notification
//! - [`error`] - Errors from the serialization and file boundary

pub mod diff;
pub mod error;
pub mod fieldpath;
pub mod matching;
pub mod merge;
pub mod sync;
pub mod value;

pub use diff::{diff_objects, dotted_diff, DiffTree};
pub use error::{Error, Result};
pub use fieldpath::{
    collapse_to_dotted, collapse_to_dotted_with, delete_path, get_path, get_path_mut, set_path,
    CollapseOptions, Path,
};
pub use matching::{match_dotted_object, match_object};
pub use merge::{merge, merge_with, Customizer, Merger};
pub use sync::{sync_object, SyncOptions};
pub use value::{
    deep_copy, deep_equals, from_file, from_json, from_yaml, is_scalar, scalar_equals, to_json,
    to_json_pretty, to_yaml, Callable, Map, Shape, Value,
};
