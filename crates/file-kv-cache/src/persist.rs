//! Reading and writing the on-disk cache image
//!
//! The image is a JSON document holding the configuration plus the entries
//! as an ordered array of `[key, value]` pairs, front (next victim) first.
//! Restoring replays the entries in order, so a reloaded cache evicts
//! exactly as the original would have at the moment it was saved.

use crate::cache::BoundedCache;
use crate::error::{CacheError, Result};
use crate::types::CacheConfig;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::hash::Hash;
use std::io;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

#[derive(Serialize)]
struct CacheImageRef<'a, K, V> {
    config: CacheConfig,
    entries: Vec<(&'a K, &'a V)>,
}

#[derive(Deserialize)]
struct CacheImage<K, V> {
    config: CacheConfig,
    entries: Vec<(K, V)>,
}

/// Serialize the full cache state to `path`, replacing any existing file.
///
/// The image is written to a temporary file in the destination directory
/// and renamed over the target, so a crash mid-write never leaves a
/// truncated image behind.
pub fn save_image<K, V>(cache: &BoundedCache<K, V>, path: &Path) -> Result<()>
where
    K: Eq + Hash + Clone + Serialize,
    V: Serialize,
{
    let image = CacheImageRef {
        config: cache.config(),
        entries: cache.iter().collect(),
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer(&mut tmp, &image).map_err(io::Error::from)?;
    tmp.persist(path).map_err(|err| CacheError::Io(err.error))?;

    debug!(path = %path.display(), entries = cache.len(), "Saved cache image");
    Ok(())
}

/// Reconstruct a cache from the image at `path`.
///
/// I/O failures (including a missing file) surface as `Io`; a file that
/// does not deserialize into the expected shape surfaces as `CorruptImage`.
/// The file is never modified or deleted on failure.
pub fn load_image<K, V>(path: &Path) -> Result<BoundedCache<K, V>>
where
    K: Eq + Hash + Clone + DeserializeOwned,
    V: DeserializeOwned,
{
    let bytes = fs::read(path)?;
    let image: CacheImage<K, V> = serde_json::from_slice(&bytes)?;

    let mut cache = BoundedCache::new(image.config);
    for (key, value) in image.entries {
        cache.insert(key, value);
    }

    debug!(path = %path.display(), entries = cache.len(), "Loaded cache image");
    Ok(cache)
}
