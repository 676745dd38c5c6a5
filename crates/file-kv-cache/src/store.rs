//! File-backed cache handle and the open-or-create factory

use crate::cache::{BoundedCache, Iter};
use crate::error::Result;
use crate::persist::{load_image, save_image};
use crate::types::{CacheConfig, ReconcilePolicy};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A bounded ordered cache tied to the file that persists it.
///
/// All operations are in-memory; nothing touches the backing file until an
/// explicit [`save`](FileCache::save). Two handles opened from the same
/// image are fully independent until one saves and the other reloads.
pub struct FileCache<K, V> {
    cache: BoundedCache<K, V>,
    path: PathBuf,
}

impl<K, V> FileCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> CacheConfig {
        self.cache.config()
    }

    /// Look up a key, promoting it under LRU. See [`BoundedCache::get`].
    pub fn get(&mut self, key: &K) -> Result<&V> {
        self.cache.get(key)
    }

    /// Insert or overwrite a key. See [`BoundedCache::insert`].
    pub fn insert(&mut self, key: K, value: V) {
        self.cache.insert(key, value)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.cache.contains(key)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Change the capacity, evicting down to the new bound.
    pub fn resize(&mut self, new_capacity: i64) {
        self.cache.resize(new_capacity)
    }

    /// Drop all entries, keeping the configuration and backing path.
    pub fn clear(&mut self) {
        self.cache.clear()
    }

    /// Entries front-to-back in eviction order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.cache.iter()
    }
}

impl<K, V> FileCache<K, V>
where
    K: Eq + Hash + Clone + Serialize,
    V: Serialize,
{
    /// Persist the full cache state to the backing file.
    pub fn save(&self) -> Result<()> {
        save_image(&self.cache, &self.path)
    }
}

/// Open the cache persisted at `path`, or create and persist a fresh one.
///
/// When no image exists the supplied `config` is used and the new cache is
/// saved immediately, so the file exists once this call returns. When an
/// image exists it is loaded, and `policy` decides whose configuration
/// wins: [`ReconcilePolicy::PreferSaved`] returns the loaded cache
/// unchanged, while [`ReconcilePolicy::PreferSupplied`] replaces the whole
/// stored configuration with `config` and resizes so the capacity bound
/// holds before any further operation.
///
/// `verbose` prints a one-line creation notice to stdout; it is cosmetic
/// and never affects the result.
pub fn open_or_create<K, V>(
    path: impl AsRef<Path>,
    config: CacheConfig,
    policy: ReconcilePolicy,
    verbose: bool,
) -> Result<FileCache<K, V>>
where
    K: Eq + Hash + Clone + Serialize + DeserializeOwned,
    V: Serialize + DeserializeOwned,
{
    let path = path.as_ref();

    if !path.exists() {
        if verbose {
            println!(
                "Making cache file: {} with capacity={}, mode={}",
                path.display(),
                config.capacity,
                config.recency_mode
            );
        }
        info!(
            path = %path.display(),
            capacity = config.capacity,
            mode = %config.recency_mode,
            "Creating cache file"
        );
        let store = FileCache {
            cache: BoundedCache::new(config),
            path: path.to_path_buf(),
        };
        store.save()?;
        return Ok(store);
    }

    let mut cache = load_image(path)?;
    if policy == ReconcilePolicy::PreferSupplied {
        cache.set_recency_mode(config.recency_mode);
        cache.resize(config.capacity);
        debug!(
            capacity = config.capacity,
            mode = %config.recency_mode,
            "Applied supplied configuration over saved image"
        );
    }

    Ok(FileCache {
        cache,
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecencyMode;
    use tempfile::tempdir;

    type Store = FileCache<String, i32>;

    fn open(
        path: &Path,
        capacity: i64,
        mode: RecencyMode,
        policy: ReconcilePolicy,
    ) -> Store {
        open_or_create(path, CacheConfig::new(capacity, mode), policy, false).unwrap()
    }

    #[test]
    fn test_create_writes_file_immediately() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let store = open(&path, 5, RecencyMode::Lru, ReconcilePolicy::PreferSaved);
        assert!(path.exists());
        assert!(store.is_empty());
        assert_eq!(store.config().capacity, 5);
    }

    #[test]
    fn test_reopen_prefers_saved_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");

        open(&path, 5, RecencyMode::Lru, ReconcilePolicy::PreferSaved);
        let reopened = open(&path, -1, RecencyMode::Fifo, ReconcilePolicy::PreferSaved);
        assert_eq!(reopened.config().capacity, 5);
        assert_eq!(reopened.config().recency_mode, RecencyMode::Lru);
    }

    #[test]
    fn test_resize_survives_save_and_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut store = open(&path, -1, RecencyMode::Lru, ReconcilePolicy::PreferSaved);
        store.resize(10);
        store.save().unwrap();

        let reopened = open(&path, -1, RecencyMode::Lru, ReconcilePolicy::PreferSaved);
        assert_eq!(reopened.config().capacity, 10);
    }

    #[test]
    fn test_prefer_supplied_replaces_config_and_trims() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut store = open(&path, -1, RecencyMode::Fifo, ReconcilePolicy::PreferSaved);
        for (key, value) in [("a", 1), ("b", 2), ("c", 3), ("d", 4), ("e", 5)] {
            store.insert(key.to_string(), value);
        }
        store.save().unwrap();

        let reopened = open(&path, 2, RecencyMode::Lru, ReconcilePolicy::PreferSupplied);
        assert_eq!(reopened.config().capacity, 2);
        assert_eq!(reopened.config().recency_mode, RecencyMode::Lru);

        // Trimmed from the front down to the new bound before any use
        assert_eq!(reopened.len(), 2);
        assert!(!reopened.contains(&"a".to_string()));
        assert!(!reopened.contains(&"b".to_string()));
        assert!(!reopened.contains(&"c".to_string()));
        assert!(reopened.contains(&"d".to_string()));
        assert!(reopened.contains(&"e".to_string()));
    }

    #[test]
    fn test_handles_are_isolated_until_resave() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut first = open(&path, 3, RecencyMode::Fifo, ReconcilePolicy::PreferSaved);
        first.insert("a".to_string(), 1);
        first.insert("b".to_string(), 2);
        first.insert("c".to_string(), 3);
        assert_eq!(*first.get(&"a".to_string()).unwrap(), 1);
        first.save().unwrap();

        let mut second = open(&path, -1, RecencyMode::Lru, ReconcilePolicy::PreferSaved);
        assert!(second.contains(&"a".to_string()));
        assert!(second.contains(&"b".to_string()));
        assert!(second.contains(&"c".to_string()));

        second.insert("d".to_string(), 4);
        assert!(!second.contains(&"a".to_string()));
        assert!(second.contains(&"d".to_string()));

        // The first handle never sees the second's mutation
        assert!(first.contains(&"a".to_string()));
        assert!(!first.contains(&"d".to_string()));
    }

    #[test]
    fn test_downsize_then_insert_boundary() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut store = open(&path, 3, RecencyMode::Lru, ReconcilePolicy::PreferSaved);
        store.insert("a".to_string(), 1);
        store.insert("b".to_string(), 2);
        store.insert("c".to_string(), 3);
        assert_eq!(store.len(), 3);

        store.resize(1);
        assert_eq!(store.len(), 1);

        store.insert("d".to_string(), 4);
        assert_eq!(store.len(), 1);
        assert!(store.contains(&"d".to_string()));
        assert!(!store.contains(&"c".to_string()));
    }

    #[test]
    fn test_open_missing_parent_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("cache.json");

        let result: Result<Store> = open_or_create(
            &path,
            CacheConfig::default(),
            ReconcilePolicy::PreferSaved,
            false,
        );
        assert!(matches!(result, Err(crate::error::CacheError::Io(_))));
    }
}
