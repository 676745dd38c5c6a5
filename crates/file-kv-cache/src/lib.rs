//! File-backed bounded key-value cache with FIFO/LRU eviction
//!
//! Provides an ordered associative container that enforces a capacity bound
//! with deterministic front-of-order eviction, persists its full state
//! (entries plus configuration) to a single file, and restores itself on
//! next use. Persistence is explicit: nothing touches disk until `save`.

mod cache;
mod error;
mod persist;
mod store;
mod types;

pub use cache::{BoundedCache, Iter};
pub use error::{CacheError, Result};
pub use persist::{load_image, save_image};
pub use store::{open_or_create, FileCache};
pub use types::{CacheConfig, ReconcilePolicy, RecencyMode};
