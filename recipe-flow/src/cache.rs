use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry as Slot;
use std::sync::Arc;

/// How recipe names are turned into cache keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyMode {
    /// Trimmed and lower-cased, so "Pad Thai " and "pad thai" share an entry
    #[default]
    Normalized,
    /// The name exactly as given
    Exact,
}

impl KeyMode {
    pub fn key(&self, name: &str) -> String {
        match self {
            KeyMode::Normalized => name.trim().to_lowercase(),
            KeyMode::Exact => name.to_string(),
        }
    }
}

/// Trait for remembering generated images by recipe name
#[async_trait]
pub trait ImageCache: Send + Sync {
    async fn get(&self, name: &str) -> Option<String>;
    async fn put(&self, name: &str, url: String);
    async fn has_attempted(&self, name: &str) -> bool;
    /// Mark `name` as attempted. Returns true only for the caller that set the mark.
    async fn mark_attempted(&self, name: &str) -> bool;
    async fn len(&self) -> usize;
}

#[derive(Debug, Default)]
struct Entry {
    url: Option<String>,
}

/// In-memory implementation of ImageCache
///
/// Entries live as long as the cache; there is no eviction.
#[derive(Debug, Clone, Default)]
pub struct InMemoryImageCache {
    entries: Arc<DashMap<String, Entry>>,
    mode: KeyMode,
}

impl InMemoryImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: KeyMode) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            mode,
        }
    }

    pub fn mode(&self) -> KeyMode {
        self.mode
    }
}

#[async_trait]
impl ImageCache for InMemoryImageCache {
    async fn get(&self, name: &str) -> Option<String> {
        self.entries
            .get(&self.mode.key(name))
            .and_then(|entry| entry.url.clone())
    }

    async fn put(&self, name: &str, url: String) {
        self.entries.entry(self.mode.key(name)).or_default().url = Some(url);
    }

    async fn has_attempted(&self, name: &str) -> bool {
        self.entries.contains_key(&self.mode.key(name))
    }

    async fn mark_attempted(&self, name: &str) -> bool {
        match self.entries.entry(self.mode.key(name)) {
            Slot::Occupied(_) => false,
            Slot::Vacant(slot) => {
                slot.insert(Entry::default());
                true
            }
        }
    }

    async fn len(&self) -> usize {
        self.entries.iter().filter(|entry| entry.url.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_normalized_keys_share_entries() {
        let cache = InMemoryImageCache::new();
        cache.put("  Pad Thai ", "https://img.example/pt.png".to_string()).await;

        assert_eq!(
            cache.get("pad thai").await.as_deref(),
            Some("https://img.example/pt.png")
        );
        assert!(cache.has_attempted("PAD THAI").await);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_exact_keys_are_distinct() {
        let cache = InMemoryImageCache::with_mode(KeyMode::Exact);
        cache.put("Pad Thai", "https://img.example/pt.png".to_string()).await;

        assert!(cache.get("pad thai").await.is_none());
        assert!(cache.get("Pad Thai").await.is_some());
    }

    #[tokio::test]
    async fn test_mark_attempted_claims_once() {
        let cache = InMemoryImageCache::new();

        assert!(!cache.has_attempted("ramen").await);
        assert!(cache.mark_attempted("ramen").await);
        assert!(!cache.mark_attempted("Ramen").await);
        assert!(cache.has_attempted("ramen").await);
        assert!(cache.get("ramen").await.is_none());
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let cache = InMemoryImageCache::new();
        let shared = cache.clone();
        shared.put("tacos", "https://img.example/t.png".to_string()).await;
        assert!(cache.get("tacos").await.is_some());
    }
}
