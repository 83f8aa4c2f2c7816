use crate::{
    error::{ApiError, Result},
    ml::{GenerationRequest, TextGenerator},
    models::{ChatTurn, UserProfile},
};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const MAX_CACHE_ENTRIES: NonZeroUsize = match NonZeroUsize::new(1000) {
    Some(n) => n,
    None => panic!("cache capacity must be non-zero"),
};

const PARAPHRASE_INSTRUCTION: &str = "\
You rewrite shopping requests for a catalog of eco-friendly products.
Restate the user's request as a short product description, using the words a catalog listing would use.
Prefer terms from these product categories: {categories}.
Respond with the description only.";

const PROFILE_QUERY_INSTRUCTION: &str = "\
You are EcoGenie, a friendly and helpful AI assistant passionate about sustainability.
Based on the user profile below, write one short search query describing sustainable products that would suit this user's lifestyle and habits.
Respond with the query only.

user_profile: {user_profile}";

/// Cache entry for paraphrased queries
struct CacheEntry {
    paraphrase: String,
    timestamp: Instant,
}

/// Rewrites free-form queries and user profiles into catalog vocabulary.
#[derive(Clone)]
pub struct QueryTransformer {
    generator: Arc<dyn TextGenerator>,
    model: String,
    vocabulary: Vec<String>,
    cache: Arc<Mutex<LruCache<String, CacheEntry>>>,
    cache_ttl: Duration,
}

fn tidy_reply(reply: &str) -> Result<String> {
    let tidy = reply.trim().trim_matches('"').trim();
    if tidy.is_empty() {
        return Err(ApiError::UpstreamService(
            "text generator returned an empty query".to_string(),
        ));
    }
    Ok(tidy.to_string())
}

impl QueryTransformer {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        model: impl Into<String>,
        vocabulary: Vec<String>,
        cache_ttl_seconds: u64,
    ) -> Self {
        Self {
            generator,
            model: model.into(),
            vocabulary,
            cache: Arc::new(Mutex::new(LruCache::new(MAX_CACHE_ENTRIES))),
            cache_ttl: Duration::from_secs(cache_ttl_seconds),
        }
    }

    /// Paraphrase using the configured category vocabulary.
    pub async fn paraphrase_query(&self, text: &str) -> Result<String> {
        self.paraphrase(text, &self.vocabulary).await
    }

    /// Paraphrase `text` into catalog-aligned wording, steering towards `vocabulary`.
    pub async fn paraphrase(&self, text: &str, vocabulary: &[String]) -> Result<String> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ApiError::InvalidInput("Query cannot be empty".to_string()));
        }

        let key = format!("{}\u{1f}{}", vocabulary.join("|"), text);
        if let Some(hit) = self.cached(&key) {
            debug!("Cache HIT for paraphrase: '{}'", text);
            return Ok(hit);
        }

        let request = GenerationRequest::new(self.model.clone(), vec![ChatTurn::user(text)])
            .with_system_instruction(
                PARAPHRASE_INSTRUCTION.replace("{categories}", &vocabulary.join(", ")),
            );
        let paraphrase = tidy_reply(&self.generator.generate(request).await?)?;
        info!("Paraphrased query '{}' -> '{}'", text, paraphrase);

        self.store(key, &paraphrase);
        Ok(paraphrase)
    }

    /// Write a product search query tailored to the given profile.
    pub async fn query_from_profile(&self, profile: &UserProfile) -> Result<String> {
        let profile_text = profile.effective_text()?;
        let request = GenerationRequest::new(
            self.model.clone(),
            vec![ChatTurn::user("Suggest products for me.")],
        )
        .with_system_instruction(
            PROFILE_QUERY_INSTRUCTION.replace("{user_profile}", &profile_text),
        );

        let query = tidy_reply(&self.generator.generate(request).await?)?;
        info!("Generated profile query: '{}'", query);
        Ok(query)
    }

    fn cached(&self, key: &str) -> Option<String> {
        let mut cache = self.cache.lock();
        let hit = cache
            .get(key)
            .map(|entry| (entry.timestamp.elapsed() < self.cache_ttl, entry.paraphrase.clone()));
        match hit {
            Some((true, paraphrase)) => Some(paraphrase),
            Some((false, _)) => {
                cache.pop(key);
                None
            }
            None => None,
        }
    }

    /// Least recently used entries are evicted once the cache is full.
    fn store(&self, key: String, paraphrase: &str) {
        let evicted = self.cache.lock().push(
            key.clone(),
            CacheEntry {
                paraphrase: paraphrase.to_string(),
                timestamp: Instant::now(),
            },
        );
        if let Some((old_key, _)) = evicted.filter(|(old_key, _)| *old_key != key) {
            debug!("Evicted paraphrase cache entry: '{}'", old_key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeGenerator;

    fn transformer(generator: Arc<FakeGenerator>, ttl: u64) -> QueryTransformer {
        QueryTransformer::new(
            generator,
            "gemini-2.0-flash",
            vec!["Reusable Bags".to_string(), "Personal Care".to_string()],
            ttl,
        )
    }

    #[tokio::test]
    async fn test_paraphrase_sends_vocabulary() {
        let generator = Arc::new(FakeGenerator::replying(&["  \"Reusable cotton tote bag\" \n"]));
        let transformer = transformer(generator.clone(), 60);

        let result = transformer.paraphrase_query("something to carry groceries").await.unwrap();
        assert_eq!(result, "Reusable cotton tote bag");

        let request = generator.last_request().unwrap();
        assert_eq!(request.model, "gemini-2.0-flash");
        assert_eq!(request.contents, vec![ChatTurn::user("something to carry groceries")]);
        assert!(request
            .system_instruction
            .unwrap()
            .contains("Reusable Bags, Personal Care"));
    }

    #[tokio::test]
    async fn test_paraphrase_is_cached() {
        let generator = Arc::new(FakeGenerator::replying(&["first", "second"]));
        let transformer = transformer(generator.clone(), 60);

        let a = transformer.paraphrase_query("shampoo").await.unwrap();
        let b = transformer.paraphrase_query("  shampoo ").await.unwrap();

        assert_eq!(a, "first");
        assert_eq!(b, "first");
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_disables_cache() {
        let generator = Arc::new(FakeGenerator::replying(&["first", "second"]));
        let transformer = transformer(generator.clone(), 0);

        transformer.paraphrase_query("shampoo").await.unwrap();
        let again = transformer.paraphrase_query("shampoo").await.unwrap();

        assert_eq!(again, "second");
        assert_eq!(generator.call_count(), 2);
    }

    #[test]
    fn test_cache_size_is_bounded() {
        let transformer = transformer(Arc::new(FakeGenerator::replying(&["unused"])), 3600);

        for i in 0..5000 {
            transformer.store(format!("query {}", i), "paraphrase");
        }

        assert_eq!(transformer.cache.lock().len(), MAX_CACHE_ENTRIES.get());
        assert_eq!(transformer.cached("query 4999").as_deref(), Some("paraphrase"));
        assert!(transformer.cached("query 0").is_none());
    }

    #[tokio::test]
    async fn test_empty_query_rejected_without_upstream_call() {
        let generator = Arc::new(FakeGenerator::replying(&["unused"]));
        let transformer = transformer(generator.clone(), 60);

        assert!(matches!(
            transformer.paraphrase_query("   ").await,
            Err(ApiError::InvalidInput(_))
        ));
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_propagates() {
        let transformer = transformer(Arc::new(FakeGenerator::failing()), 60);
        assert!(matches!(
            transformer.paraphrase_query("soap").await,
            Err(ApiError::UpstreamService(_))
        ));
    }

    #[tokio::test]
    async fn test_blank_reply_is_upstream_error() {
        let transformer = transformer(Arc::new(FakeGenerator::replying(&["  \"\" "])), 60);
        assert!(matches!(
            transformer.paraphrase_query("soap").await,
            Err(ApiError::UpstreamService(_))
        ));
    }

    #[tokio::test]
    async fn test_query_from_profile_embeds_profile_text() {
        let generator = Arc::new(FakeGenerator::replying(&["bamboo kitchen utensils"]));
        let transformer = transformer(generator.clone(), 60);
        let profile = UserProfile::from_summary("Cooks at home daily, wants less plastic.");

        let query = transformer.query_from_profile(&profile).await.unwrap();
        assert_eq!(query, "bamboo kitchen utensils");

        let instruction = generator.last_request().unwrap().system_instruction.unwrap();
        assert!(instruction.contains("user_profile: Cooks at home daily, wants less plastic."));
    }

    #[tokio::test]
    async fn test_query_from_empty_profile_fails_locally() {
        let generator = Arc::new(FakeGenerator::replying(&["unused"]));
        let transformer = transformer(generator.clone(), 60);

        assert!(transformer
            .query_from_profile(&UserProfile::default())
            .await
            .is_err());
        assert_eq!(generator.call_count(), 0);
    }
}
