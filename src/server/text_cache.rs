//! # Text Clipboard Cache
//!
//! Bounded LRU store for text snippets. Two limits apply at once: the number
//! of entries and the total byte size of the stored values. Inserting past
//! either limit evicts the least recently used entries first.
//!
//! The underlying [`LruCache`] is unbounded; both limits are enforced here so
//! eviction can account for value sizes.

use lru::LruCache;
use thiserror::Error;

use crate::common::messages::TextItem;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("item size exceeds maximum limit")]
    ItemSizeExceeded,
}

pub struct TextCache {
    max_size: u64,
    max_items: usize,
    current_size: u64,
    entries: LruCache<String, String>,
}

impl TextCache {
    pub fn new(max_size: u64, max_items: usize) -> Self {
        Self {
            max_size,
            max_items: max_items.max(1),
            current_size: 0,
            entries: LruCache::unbounded(),
        }
    }

    /// Insert or replace `key`, evicting least recently used entries until
    /// both limits hold. The entry ends up most recently used.
    pub fn put(&mut self, key: &str, value: &str) -> Result<(), CacheError> {
        let size = value.len() as u64;
        if size > self.max_size {
            return Err(CacheError::ItemSizeExceeded);
        }

        if let Some(old) = self.entries.put(key.to_string(), value.to_string()) {
            self.current_size -= old.len() as u64;
        }
        self.current_size += size;

        // `key` is now the most recent entry, so it is popped last.
        while self.entries.len() > 1
            && (self.entries.len() > self.max_items || self.current_size > self.max_size)
        {
            match self.entries.pop_lru() {
                Some((_, evicted)) => self.current_size -= evicted.len() as u64,
                None => break,
            }
        }
        Ok(())
    }

    /// Look up `key` and mark it most recently used.
    pub fn get(&mut self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    pub fn delete(&mut self, key: &str) -> bool {
        match self.entries.pop(key) {
            Some(value) => {
                self.current_size -= value.len() as u64;
                true
            }
            None => false,
        }
    }

    /// All entries, most recently used first.
    pub fn items(&self) -> Vec<TextItem> {
        self.entries
            .iter()
            .map(|(key, value)| TextItem {
                key: key.clone(),
                value: value.clone(),
                size: value.len() as u64,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.current_size = 0;
    }

    pub fn total_size(&self) -> u64 {
        self.current_size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(cache: &TextCache) -> Vec<String> {
        cache.items().into_iter().map(|i| i.key).collect()
    }

    #[test]
    fn test_put_and_get() {
        let mut cache = TextCache::new(1024, 10);
        cache.put("a", "hello").unwrap();
        assert_eq!(cache.get("a").as_deref(), Some("hello"));
        assert_eq!(cache.get("missing"), None);
        assert_eq!(cache.total_size(), 5);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_items_most_recent_first() {
        let mut cache = TextCache::new(1024, 10);
        cache.put("a", "1").unwrap();
        cache.put("b", "2").unwrap();
        cache.put("c", "3").unwrap();
        assert_eq!(keys(&cache), vec!["c", "b", "a"]);

        cache.get("a");
        assert_eq!(keys(&cache), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_evicts_by_count() {
        let mut cache = TextCache::new(1024, 2);
        cache.put("a", "1").unwrap();
        cache.put("b", "2").unwrap();
        cache.get("a");
        cache.put("c", "3").unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("b"), None);
        assert!(cache.get("a").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_evicts_by_memory() {
        let mut cache = TextCache::new(10, 100);
        cache.put("a", "aaaa").unwrap();
        cache.put("b", "bbbb").unwrap();
        cache.put("c", "cccc").unwrap();

        assert_eq!(keys(&cache), vec!["c", "b"]);
        assert_eq!(cache.total_size(), 8);
    }

    #[test]
    fn test_rejects_oversized_item() {
        let mut cache = TextCache::new(4, 10);
        cache.put("a", "ok").unwrap();
        assert_eq!(cache.put("b", "too long"), Err(CacheError::ItemSizeExceeded));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_update_existing_key() {
        let mut cache = TextCache::new(100, 10);
        cache.put("a", "one").unwrap();
        cache.put("b", "two").unwrap();
        cache.put("a", "three").unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.total_size(), 8);
        assert_eq!(keys(&cache), vec!["a", "b"]);
        assert_eq!(cache.get("a").as_deref(), Some("three"));
    }

    #[test]
    fn test_delete_and_clear() {
        let mut cache = TextCache::new(100, 10);
        cache.put("a", "one").unwrap();
        cache.put("b", "two").unwrap();

        assert!(cache.delete("a"));
        assert!(!cache.delete("a"));
        assert_eq!(cache.total_size(), 3);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.total_size(), 0);
        assert!(cache.items().is_empty());
    }
}
