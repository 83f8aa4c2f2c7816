use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Placeholder emitted for any product field that is absent or not a number.
pub const NOT_AVAILABLE: &str = "Not available";

/// A catalog row. Identity is the row position in the catalog it was loaded into.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub title: Option<String>,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub image_link: Option<String>,
    pub site_link: Option<String>,
    pub categories: Vec<String>,
    pub embedding: Array1<f64>,
}

impl Product {
    /// A product is rankable only if every embedding entry is finite.
    pub fn is_rankable(&self) -> bool {
        self.embedding.iter().all(|v| v.is_finite())
    }

    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }

    #[cfg(test)]
    pub fn fixture(title: &str, embedding: Vec<f64>) -> Self {
        Self {
            title: Some(title.to_string()),
            brand: Some(format!("{} Co.", title)),
            description: Some(format!("{} description", title)),
            image_link: Some(format!("https://img.example/{}.png", title)),
            site_link: Some(format!("https://shop.example/{}", title)),
            categories: Vec::new(),
            embedding: Array1::from(embedding),
        }
    }
}

/// The public projection of a product, with every field guaranteed present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanProduct {
    pub title: String,
    pub brand: String,
    pub description: String,
    #[serde(rename = "image-link")]
    pub image_link: String,
    #[serde(rename = "site-link")]
    pub site_link: String,
}
