//! Sync module - In-place synchronization of value trees with change tracking.

mod syncer;


pub use syncer::*;
