use super::Embedder;
use crate::error::Result;
use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use tracing::debug;

const MAX_TEXT_PREVIEW_LENGTH: usize = 30;

/// Wraps an [`Embedder`] with an LRU cache keyed by whitespace-normalized text.
pub struct CachingEmbedder<E> {
    inner: E,
    cache: Mutex<LruCache<String, Vec<f64>>>,
}

fn cache_key(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl<E: Embedder> CachingEmbedder<E> {
    pub fn new(inner: E, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.lock().len()
    }
}

#[async_trait]
impl<E: Embedder> Embedder for CachingEmbedder<E> {
    async fn embed(&self, text: &str) -> Result<Vec<f64>> {
        let key = cache_key(text);

        let cached = self.cache.lock().get(&key).cloned();
        if let Some(hit) = cached {
            debug!(
                "Cache hit for text embedding: {}",
                key.chars().take(MAX_TEXT_PREVIEW_LENGTH).collect::<String>()
            );
            return Ok(hit);
        }

        let embedding = self.inner.embed(&key).await?;
        self.cache.lock().put(key, embedding.clone());
        Ok(embedding)
    }
}
