//! The in-memory product catalog.
//!
//! A [`Catalog`] is immutable once built. [`CatalogHandle`] shares the current
//! catalog between requests and swaps whole catalogs on reload, so a request
//! that took a snapshot keeps ranking against the same rows until it finishes.

pub mod embedding;
mod loader;

use crate::{
    error::{ApiError, Result},
    models::Product,
};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{info, warn};

#[derive(Debug)]
pub struct Catalog {
    products: Vec<Product>,
    dimension: usize,
    source: Option<PathBuf>,
    loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogStats {
    pub products: usize,
    pub rankable_products: usize,
    pub dimension: usize,
    pub source: Option<String>,
    pub loaded_at: String,
}

impl Catalog {
    /// Load and validate a catalog from a product CSV.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let products = loader::read_products(path)?;
        let mut catalog = Self::from_products(products)?;
        catalog.source = Some(path.to_path_buf());

        let excluded = catalog.len() - catalog.rankable_count();
        info!(
            "Loaded catalog from {}: {} products, dimension {}",
            path.display(),
            catalog.len(),
            catalog.dimension
        );
        if excluded > 0 {
            warn!(
                "{} products have non-finite embeddings and will never be ranked",
                excluded
            );
        }

        Ok(catalog)
    }

    /// Build a catalog from already-decoded products. All embeddings must share one length.
    pub fn from_products(products: Vec<Product>) -> Result<Self> {
        let dimension = products
            .first()
            .map(Product::dimension)
            .ok_or_else(|| ApiError::CatalogLoad("catalog contains no products".to_string()))?;

        if dimension == 0 {
            return Err(ApiError::CatalogLoad(
                "row 1: embedding has no elements".to_string(),
            ));
        }

        if let Some((i, product)) = products
            .iter()
            .enumerate()
            .find(|(_, p)| p.dimension() != dimension)
        {
            return Err(ApiError::CatalogLoad(format!(
                "row {}: embedding has {} elements, expected {}",
                i + 1,
                product.dimension(),
                dimension
            )));
        }

        Ok(Self {
            products,
            dimension,
            source: None,
            loaded_at: Utc::now(),
        })
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, position: usize) -> Option<&Product> {
        self.products.get(position)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn rankable_count(&self) -> usize {
        self.products.iter().filter(|p| p.is_rankable()).count()
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            products: self.len(),
            rankable_products: self.rankable_count(),
            dimension: self.dimension,
            source: self.source.as_ref().map(|p| p.display().to_string()),
            loaded_at: self.loaded_at.to_rfc3339(),
        }
    }
}

/// Shared, swappable reference to the current catalog.
#[derive(Debug, Clone)]
pub struct CatalogHandle {
    current: Arc<RwLock<Arc<Catalog>>>,
}

impl CatalogHandle {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(catalog))),
        }
    }

    /// The catalog as of now. Later swaps do not affect the returned snapshot.
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.current.read().clone()
    }

    /// Install a new catalog, returning the one it replaced.
    pub fn replace(&self, catalog: Catalog) -> Arc<Catalog> {
        let current = Arc::new(catalog);
        let previous = std::mem::replace(&mut *self.current.write(), Arc::clone(&current));

        if previous.dimension() != current.dimension() {
            warn!(
                "Catalog dimension changed from {} to {}",
                previous.dimension(),
                current.dimension()
            );
        }
        info!(
            "Catalog replaced: {} -> {} products",
            previous.len(),
            current.len()
        );
        previous
    }
}
