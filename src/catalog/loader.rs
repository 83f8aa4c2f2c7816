use super::embedding::decode_embedding;
use crate::{
    error::{ApiError, Result},
    models::Product,
};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ProductCsvRecord {
    title: Option<String>,
    brand: Option<String>,
    description: Option<String>,
    #[serde(rename = "image-link", alias = "image_link")]
    image_link: Option<String>,
    #[serde(rename = "site-link", alias = "site_link")]
    site_link: Option<String>,
    #[serde(alias = "category", alias = "tags")]
    categories: Option<String>,
    embedding: Option<String>,
}

fn split_categories(categories: Option<String>) -> Vec<String> {
    categories
        .map(|c| {
            c.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Read every row of a product CSV, decoding embeddings strictly.
///
/// Row numbers in errors are 1-based and count data rows only.
pub(super) fn read_products(path: &Path) -> Result<Vec<Product>> {
    if !path.is_file() {
        return Err(ApiError::CatalogLoad(format!(
            "catalog file not found: {}",
            path.display()
        )));
    }

    let mut reader = ReaderBuilder::new()
        .trim(Trim::Headers)
        .from_path(path)?;

    let mut products = Vec::new();
    for (i, record) in reader.deserialize::<ProductCsvRecord>().enumerate() {
        let row = i + 1;
        let record = record.map_err(|e| ApiError::CatalogLoad(format!("row {}: {}", row, e)))?;

        let raw_embedding = record
            .embedding
            .ok_or_else(|| ApiError::CatalogLoad(format!("row {}: missing embedding", row)))?;
        let embedding = decode_embedding(&raw_embedding)
            .map_err(|e| ApiError::CatalogLoad(format!("row {}: {}", row, e)))?;

        products.push(Product {
            title: record.title,
            brand: record.brand,
            description: record.description,
            image_link: record.image_link,
            site_link: record.site_link,
            categories: split_categories(record.categories),
            embedding,
        });
    }

    debug!("Read {} product rows from {}", products.len(), path.display());
    Ok(products)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_reads_rows_and_optional_columns() {
        let file = write_csv(
            ",title,brand,description,image-link,site-link,categories,embedding\n\
             0,Steel Bottle,Klean,Keeps drinks cold,https://i/1.png,https://s/1,\"Reusable Bottles & Cups, Kitchen\",\"[1.0, 0.0]\"\n\
             1,Soap Bar,,Plastic-free soap,,https://s/2,,\"[0.0, 1.0]\"\n",
        );

        let products = read_products(file.path()).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].title.as_deref(), Some("Steel Bottle"));
        assert_eq!(
            products[0].categories,
            vec!["Reusable Bottles & Cups".to_string(), "Kitchen".to_string()]
        );
        assert_eq!(products[1].brand, None);
        assert_eq!(products[1].image_link, None);
        assert!(products[1].categories.is_empty());
        assert_eq!(products[1].embedding.to_vec(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_accepts_underscore_headers() {
        let file = write_csv(
            "title,brand,description,image_link,site_link,embedding\n\
             A,B,C,https://i/a,https://s/a,\"[0.5]\"\n",
        );
        let products = read_products(file.path()).unwrap();
        assert_eq!(products[0].image_link.as_deref(), Some("https://i/a"));
        assert_eq!(products[0].site_link.as_deref(), Some("https://s/a"));
    }

    #[test]
    fn test_missing_embedding_names_row() {
        let file = write_csv(
            "title,brand,description,image-link,site-link,embedding\n\
             A,B,C,D,E,\"[0.5]\"\n\
             F,G,H,I,J,\n",
        );
        match read_products(file.path()) {
            Err(ApiError::CatalogLoad(msg)) => assert!(msg.contains("row 2"), "{}", msg),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_bad_embedding_fails() {
        let file = write_csv(
            "title,brand,description,image-link,site-link,embedding\n\
             A,B,C,D,E,\"0.5, 0.2\"\n",
        );
        assert!(matches!(
            read_products(file.path()),
            Err(ApiError::CatalogLoad(_))
        ));
    }

    #[test]
    fn test_missing_file_fails() {
        let err = read_products(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, ApiError::CatalogLoad(_)));
    }
}
