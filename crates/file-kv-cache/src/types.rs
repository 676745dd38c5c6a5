//! Configuration types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Policy governing whether reads affect eviction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecencyMode {
    /// Reads never change order; entries keep their first-insertion position.
    Fifo,
    /// Reading an existing key promotes it to the newest position.
    Lru,
}

impl fmt::Display for RecencyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecencyMode::Fifo => write!(f, "fifo"),
            RecencyMode::Lru => write!(f, "lru"),
        }
    }
}

/// Capacity and recency configuration for a cache instance.
///
/// A negative capacity means unbounded; a non-negative capacity bounds the
/// number of stored entries. Immutable on a live cache except through
/// `resize` or factory reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    pub capacity: i64,
    pub recency_mode: RecencyMode,
}

impl CacheConfig {
    pub fn new(capacity: i64, recency_mode: RecencyMode) -> Self {
        Self {
            capacity,
            recency_mode,
        }
    }

    /// The effective entry bound, or `None` when unbounded.
    pub fn bound(&self) -> Option<usize> {
        if self.capacity < 0 {
            None
        } else {
            Some(self.capacity as usize)
        }
    }
}

impl Default for CacheConfig {
    /// Unbounded, LRU.
    fn default() -> Self {
        Self {
            capacity: -1,
            recency_mode: RecencyMode::Lru,
        }
    }
}

/// Rule for resolving a freshly loaded cache's stored configuration against
/// configuration supplied by the current caller.
///
/// Reconciliation is all-or-nothing: either every saved field is kept or
/// every supplied field is applied. Partial merges are never performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilePolicy {
    /// Keep the configuration stored in the image.
    PreferSaved,
    /// Replace the stored configuration wholesale with the supplied one.
    PreferSupplied,
}
