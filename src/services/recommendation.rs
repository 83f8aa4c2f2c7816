use crate::{
    catalog::{Catalog, CatalogHandle},
    error::{ApiError, Result},
    ml::Embedder,
    models::{CleanProduct, UserProfile},
    services::{query_transformer::QueryTransformer, ranking, sanitizer},
};
use std::{future::Future, sync::Arc, time::Duration};
use tracing::{debug, error, info};

/// The product search pipeline: paraphrase, embed, rank, clean.
#[derive(Clone)]
pub struct RecommendationService {
    catalog: CatalogHandle,
    transformer: QueryTransformer,
    embedder: Arc<dyn Embedder>,
    upstream_timeout: Duration,
}

impl RecommendationService {
    pub fn new(
        catalog: CatalogHandle,
        transformer: QueryTransformer,
        embedder: Arc<dyn Embedder>,
        upstream_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            transformer,
            embedder,
            upstream_timeout,
        }
    }

    pub fn catalog(&self) -> &CatalogHandle {
        &self.catalog
    }

    /// Products matching a free-text query, best first, paged by `start` and `count`.
    pub async fn get_products(
        &self,
        query: &str,
        start: usize,
        count: usize,
    ) -> Result<Vec<CleanProduct>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ApiError::InvalidInput("Query field is required.".to_string()));
        }

        let catalog = self.catalog.snapshot();
        let embedding = self
            .with_deadline(async {
                let paraphrased = self.transformer.paraphrase_query(query).await?;
                self.embed_for(&catalog, &paraphrased).await
            })
            .await?;

        self.rank_and_clean(&catalog, &embedding, start, count)
    }

    /// Products suited to a user profile. The profile is first turned into a query.
    pub async fn recommend_for_profile(
        &self,
        profile: &UserProfile,
        start: usize,
        count: usize,
    ) -> Result<Vec<CleanProduct>> {
        let catalog = self.catalog.snapshot();
        let embedding = self
            .with_deadline(async {
                let generated = self.transformer.query_from_profile(profile).await?;
                let paraphrased = self.transformer.paraphrase_query(&generated).await?;
                self.embed_for(&catalog, &paraphrased).await
            })
            .await?;

        self.rank_and_clean(&catalog, &embedding, start, count)
    }

    async fn with_deadline<T>(&self, work: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.upstream_timeout, work).await {
            Ok(result) => result,
            Err(_) => {
                error!(
                    "Upstream calls exceeded the {:?} deadline",
                    self.upstream_timeout
                );
                Err(ApiError::Timeout(self.upstream_timeout.as_secs()))
            }
        }
    }

    async fn embed_for(&self, catalog: &Catalog, text: &str) -> Result<Vec<f64>> {
        let embedding = self.embedder.embed(text).await?;
        if embedding.len() != catalog.dimension() {
            error!(
                "Embedding service returned {} dimensions, catalog has {}",
                embedding.len(),
                catalog.dimension()
            );
            return Err(ApiError::DimensionMismatch {
                expected: catalog.dimension(),
                got: embedding.len(),
            });
        }
        Ok(embedding)
    }

    fn rank_and_clean(
        &self,
        catalog: &Catalog,
        embedding: &[f64],
        start: usize,
        count: usize,
    ) -> Result<Vec<CleanProduct>> {
        let ranked = ranking::rank(embedding, catalog, start, count)?;
        if let Some(top) = ranked.first() {
            debug!("Top match at position {} with score {:.4}", top.position, top.score);
        }
        info!(
            "Returning {} products (start {}, count {})",
            ranked.len(),
            start,
            count
        );

        Ok(ranked.iter().map(|r| sanitizer::clean(r.product)).collect())
    }
}
