use std::collections::HashMap;
use std::hash::Hash;

use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq)]
pub enum LoadState<V> {
    Absent,
    Loading,
    Loaded(V),
    Failed(String),
}

/// Per-key load bookkeeping for lazily fetched tables. The cache only tracks
/// state; callers run the actual load and report back through [`LoadCache::finish`].
#[derive(Debug)]
pub struct LoadCache<K, V> {
    entries: HashMap<K, LoadState<V>>,
    /// Returned by [`LoadCache::state`] for keys without an entry.
    absent: LoadState<V>,
}

impl<K, V> Default for LoadCache<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            absent: LoadState::Absent,
        }
    }
}

impl<K, V> LoadCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, key: &K) -> &LoadState<V> {
        self.entries.get(key).unwrap_or(&self.absent)
    }

    /// Marks `key` as loading. Returns `false` when a load is already in
    /// flight, has succeeded, or previously failed (use [`LoadCache::retry`]).
    pub fn begin(&mut self, key: K) -> bool {
        if !matches!(self.state(&key), LoadState::Absent) {
            return false;
        }
        debug!(?key, "load started");
        self.entries.insert(key, LoadState::Loading);
        true
    }

    pub fn finish(&mut self, key: K, result: Result<V, String>) {
        let state = match result {
            Ok(value) => {
                debug!(?key, "load finished");
                LoadState::Loaded(value)
            }
            Err(error) => {
                warn!(?key, %error, "load failed");
                LoadState::Failed(error)
            }
        };
        self.entries.insert(key, state);
    }

    pub fn insert_loaded(&mut self, key: K, value: V) {
        self.entries.insert(key, LoadState::Loaded(value));
    }

    pub fn loaded(&self, key: &K) -> Option<&V> {
        match self.state(key) {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    /// Moves a failed key back to loading; other states are left alone.
    pub fn retry(&mut self, key: &K) -> bool {
        let Some(state) = self.entries.get_mut(key) else {
            return false;
        };
        if matches!(state, LoadState::Failed(_)) {
            debug!(?key, "load retried");
            *state = LoadState::Loading;
            true
        } else {
            false
        }
    }

    /// Forgets `key` so the next [`LoadCache::begin`] starts a fresh load.
    pub fn invalidate(&mut self, key: &K) {
        if self.entries.remove(key).is_some() {
            debug!(?key, "load invalidated");
        }
    }

    pub fn loaded_entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().filter_map(|(key, state)| match state {
            LoadState::Loaded(value) => Some((key, value)),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_only_starts_absent_keys() {
        let mut cache: LoadCache<String, u32> = LoadCache::new();
        let key = "ja".to_owned();
        assert_eq!(cache.state(&key), &LoadState::Absent);
        assert!(cache.begin(key.clone()));
        assert!(!cache.begin(key.clone()));
        assert_eq!(cache.state(&key), &LoadState::Loading);

        cache.finish(key.clone(), Ok(7));
        assert_eq!(cache.loaded(&key), Some(&7));
        assert!(!cache.begin(key));
    }

    #[test]
    fn failures_need_an_explicit_retry() {
        let mut cache: LoadCache<&str, u32> = LoadCache::new();
        assert!(cache.begin("en"));
        cache.finish("en", Err("network down".to_owned()));
        assert_eq!(cache.state(&"en"), &LoadState::Failed("network down".to_owned()));
        assert!(!cache.begin("en"));

        assert!(cache.retry(&"en"));
        assert_eq!(cache.state(&"en"), &LoadState::Loading);
        assert!(!cache.retry(&"en"));
        cache.finish("en", Ok(1));
        assert_eq!(cache.loaded(&"en"), Some(&1));
    }

    #[test]
    fn loaded_entries_skip_pending_and_failed_keys() {
        let mut cache: LoadCache<&str, u32> = LoadCache::new();
        cache.insert_loaded("fi", 3);
        assert!(cache.begin("sv"));
        assert!(cache.begin("da"));
        cache.finish("da", Err("bad header".to_owned()));

        let loaded = cache.loaded_entries().collect::<Vec<_>>();
        assert_eq!(loaded, vec![(&"fi", &3)]);
    }

    #[test]
    fn invalidation_allows_a_fresh_load() {
        let mut cache: LoadCache<&str, u32> = LoadCache::new();
        cache.insert_loaded("fi", 3);
        assert!(!cache.begin("fi"));

        cache.invalidate(&"fi");
        assert_eq!(cache.state(&"fi"), &LoadState::Absent);
        assert!(cache.begin("fi"));
        assert_eq!(cache.state(&"fi"), &LoadState::Loading);
    }

    #[test]
    fn separate_caches_do_not_share_state() {
        let mut first: LoadCache<&str, u32> = LoadCache::new();
        let second: LoadCache<&str, u32> = LoadCache::new();
        first.insert_loaded("ko", 9);
        assert_eq!(second.state(&"ko"), &LoadState::Absent);
    }
}
