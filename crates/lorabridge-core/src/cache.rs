//! Persisted announcement cache.
//!
//! Home Assistant needs exactly one retained discovery config per entity;
//! this cache remembers which config topics have already been announced so
//! the bridge never re-publishes a config, across restarts included.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::warn;

/// Set of already-announced discovery config topics, mirrored to a JSON file.
///
/// The file is a JSON object mapping config topic strings to `true` and is
/// rewritten in full on every new announcement. Entries are never evicted:
/// once a topic is announced it stays announced, even if a later frame would
/// classify the entity differently.
#[derive(Debug)]
pub struct AnnouncementCache {
    path: Option<PathBuf>,
    announced: HashMap<String, bool>,
}

impl AnnouncementCache {
    /// Load the cache from `path`.
    ///
    /// A missing, unreadable, or corrupt file yields an empty cache; cache
    /// trouble must never block startup.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let announced = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(map) => map,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        "announcement cache corrupt, starting empty: {}", e
                    );
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    "failed to read announcement cache, starting empty: {}", e
                );
                HashMap::new()
            }
        };
        Self {
            path: Some(path),
            announced,
        }
    }

    /// Cache with no backing file. Nothing survives a restart.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            announced: HashMap::new(),
        }
    }

    /// Whether a discovery config has already been published for `topic`.
    pub fn is_announced(&self, topic: &str) -> bool {
        self.announced.get(topic).copied().unwrap_or(false)
    }

    /// Record that `topic` has been announced and flush the backing file.
    ///
    /// Idempotent: marking an already-announced topic is a no-op. A flush
    /// failure is logged and the in-memory mark stands; the worst case is a
    /// re-announcement after a future restart.
    pub fn mark_announced(&mut self, topic: &str) {
        if self.announced.insert(topic.to_string(), true).is_some() {
            return;
        }
        self.flush();
    }

    /// Number of announced topics.
    pub fn len(&self) -> usize {
        self.announced.len()
    }

    /// Whether no topic has been announced yet.
    pub fn is_empty(&self) -> bool {
        self.announced.is_empty()
    }

    fn flush(&self) {
        let Some(path) = &self.path else {
            return;
        };
        let result = serde_json::to_vec_pretty(&self.announced)
            .map_err(std::io::Error::other)
            .and_then(|bytes| std::fs::write(path, bytes));
        if let Err(e) = result {
            warn!(path = %path.display(), "failed to save announcement cache: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_and_query() {
        let mut cache = AnnouncementCache::in_memory();
        assert!(!cache.is_announced("homeassistant/sensor/d1/level/config"));

        cache.mark_announced("homeassistant/sensor/d1/level/config");
        assert!(cache.is_announced("homeassistant/sensor/d1/level/config"));
        assert!(!cache.is_announced("homeassistant/sensor/d1/other/config"));
    }

    #[test]
    fn test_mark_is_idempotent() {
        let mut cache = AnnouncementCache::in_memory();
        cache.mark_announced("topic/x");
        cache.mark_announced("topic/x");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_persists_across_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut cache = AnnouncementCache::load(&path);
        assert!(cache.is_empty());
        cache.mark_announced("topic/x");
        drop(cache);

        let reloaded = AnnouncementCache::load(&path);
        assert!(reloaded.is_announced("topic/x"));
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn test_persisted_format_is_topic_to_true() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut cache = AnnouncementCache::load(&path);
        cache.mark_announced("homeassistant/binary_sensor/d1/is_open/config");

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["homeassistant/binary_sensor/d1/is_open/config"], true);
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, b"not json {").unwrap();

        let cache = AnnouncementCache::load(&path);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AnnouncementCache::load(dir.path().join("absent.json"));
        assert!(cache.is_empty());
    }
}
