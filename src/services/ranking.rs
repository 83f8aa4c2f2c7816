//! Exhaustive dot-product ranking over a [`Catalog`].
//!
//! Scores are raw dot products, not cosine similarity, so embedding magnitude
//! influences order. Products whose stored embedding contains a NaN or an
//! infinity are skipped entirely, and so are products whose score overflows
//! to a non-finite value.

use crate::{
    catalog::Catalog,
    error::{ApiError, Result},
    models::Product,
};
use ndarray::ArrayView1;
use rayon::prelude::*;

/// Below this size the scan runs on the calling thread.
const PARALLEL_SCAN_THRESHOLD: usize = 4096;

#[derive(Debug, Clone, Copy)]
pub struct ScoredProduct<'a> {
    /// Row position in the catalog.
    pub position: usize,
    pub score: f64,
    pub product: &'a Product,
}

fn score(query: &ArrayView1<'_, f64>, position: usize, product: &Product) -> Option<(usize, f64)> {
    if !product.is_rankable() {
        return None;
    }
    let score = query.dot(&product.embedding);
    score.is_finite().then_some((position, score))
}

/// Rank the catalog against `query` and return the `[offset, offset + limit)` window.
///
/// Ties keep catalog order. Paging past the end yields an empty vector.
pub fn rank<'a>(
    query: &[f64],
    catalog: &'a Catalog,
    offset: usize,
    limit: usize,
) -> Result<Vec<ScoredProduct<'a>>> {
    if query.len() != catalog.dimension() {
        return Err(ApiError::DimensionMismatch {
            expected: catalog.dimension(),
            got: query.len(),
        });
    }
    if query.iter().any(|v| !v.is_finite()) {
        return Err(ApiError::InvalidInput(
            "query embedding contains a non-finite value".to_string(),
        ));
    }

    let query = ArrayView1::from(query);
    let products = catalog.products();

    let mut scored: Vec<(usize, f64)> = if products.len() >= PARALLEL_SCAN_THRESHOLD {
        products
            .par_iter()
            .enumerate()
            .filter_map(|(i, p)| score(&query, i, p))
            .collect()
    } else {
        products
            .iter()
            .enumerate()
            .filter_map(|(i, p)| score(&query, i, p))
            .collect()
    };

    // Stable: equal scores stay in catalog order. Every score is finite here.
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    Ok(scored
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(|(position, score)| ScoredProduct {
            position,
            score,
            product: &products[position],
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(embeddings: Vec<Vec<f64>>) -> Catalog {
        Catalog::from_products(
            embeddings
                .into_iter()
                .enumerate()
                .map(|(i, e)| Product::fixture(&format!("p{}", i), e))
                .collect(),
        )
        .unwrap()
    }

    fn positions(results: &[ScoredProduct<'_>]) -> Vec<usize> {
        results.iter().map(|r| r.position).collect()
    }

    #[test]
    fn test_reference_ordering() {
        let catalog = catalog(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.9, 0.1]]);
        let results = rank(&[1.0, 0.0], &catalog, 0, 10).unwrap();

        assert_eq!(positions(&results), vec![0, 2, 1]);
        assert_eq!(results[0].score, 1.0);
        assert!((results[1].score - 0.9).abs() < 1e-12);
        assert_eq!(results[2].score, 0.0);
    }

    #[test]
    fn test_scores_non_increasing() {
        let catalog = catalog(vec![
            vec![0.3, -0.2, 0.9],
            vec![-1.0, 0.5, 0.0],
            vec![0.7, 0.7, 0.1],
            vec![0.0, 0.0, 0.0],
            vec![2.0, -3.0, 1.0],
        ]);
        let results = rank(&[0.5, 0.25, -0.75], &catalog, 0, 10).unwrap();

        assert_eq!(results.len(), 5);
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let catalog = catalog(vec![
            vec![0.5, 0.5],
            vec![1.0, 0.0],
            vec![0.5, 0.5],
            vec![0.5, 0.5],
        ]);
        let results = rank(&[1.0, 1.0], &catalog, 0, 10).unwrap();
        assert_eq!(positions(&results), vec![0, 1, 2, 3]);

        let results = rank(&[1.0, 0.0], &catalog, 0, 10).unwrap();
        assert_eq!(positions(&results), vec![1, 0, 2, 3]);
    }

    #[test]
    fn test_magnitude_affects_order() {
        let catalog = catalog(vec![vec![1.0, 0.0], vec![3.0, 3.0]]);
        let results = rank(&[1.0, 0.0], &catalog, 0, 10).unwrap();
        assert_eq!(positions(&results), vec![1, 0]);
    }

    #[test]
    fn test_non_finite_rows_never_ranked() {
        let catalog = catalog(vec![
            vec![1.0, 0.0],
            vec![f64::NAN, 100.0],
            vec![0.0, 1.0],
            vec![f64::INFINITY, 0.0],
        ]);

        for query in [[1.0, 0.0], [0.0, 1.0], [-1.0, -1.0], [0.0, 0.0]] {
            let results = rank(&query, &catalog, 0, 10).unwrap();
            let found = positions(&results);
            assert!(!found.contains(&1));
            assert!(!found.contains(&3));
            assert_eq!(found.len(), 2);
        }
    }

    #[test]
    fn test_overflowing_scores_never_ranked() {
        let catalog = catalog(vec![
            vec![1e308, 1e308],
            vec![1.0, 0.0],
            vec![-1e308, 1e308],
            vec![2.0, 0.0],
            vec![1e308, -1e308],
            vec![0.5, 0.0],
        ]);
        let results = rank(&[1e308, 1e308], &catalog, 0, 10).unwrap();

        assert_eq!(positions(&results), vec![1, 5]);
        assert!(results.iter().all(|r| r.score.is_finite()));
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_page_size_formula() {
        let catalog = catalog((0..7).map(|i| vec![i as f64, 1.0]).collect());
        let n = catalog.len();

        for offset in 0..10 {
            for limit in 0..10 {
                let results = rank(&[1.0, 0.5], &catalog, offset, limit).unwrap();
                assert_eq!(results.len(), limit.min(n.saturating_sub(offset)));
            }
        }
    }

    #[test]
    fn test_pages_are_contiguous_slices() {
        let catalog = catalog((0..6).map(|i| vec![(i * 7 % 5) as f64]).collect());
        let all = positions(&rank(&[1.0], &catalog, 0, 6).unwrap());
        let page = positions(&rank(&[1.0], &catalog, 2, 3).unwrap());
        assert_eq!(page, all[2..5].to_vec());
    }

    #[test]
    fn test_offset_past_end_is_empty() {
        let catalog = catalog(vec![vec![1.0], vec![2.0]]);
        assert!(rank(&[1.0], &catalog, 2, 20).unwrap().is_empty());
        assert!(rank(&[1.0], &catalog, usize::MAX, usize::MAX).unwrap().is_empty());
    }

    #[test]
    fn test_fifteen_rows_default_page() {
        let catalog = catalog((0..15).map(|i| vec![i as f64, 0.0]).collect());
        assert_eq!(rank(&[1.0, 0.0], &catalog, 0, 20).unwrap().len(), 15);
    }

    #[test]
    fn test_dimension_mismatch() {
        let catalog = catalog(vec![vec![1.0, 0.0]]);
        match rank(&[1.0, 0.0, 0.0], &catalog, 0, 1) {
            Err(ApiError::DimensionMismatch { expected, got }) => {
                assert_eq!(expected, 2);
                assert_eq!(got, 3);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_nan_query_rejected() {
        let catalog = catalog(vec![vec![1.0, 0.0]]);
        assert!(matches!(
            rank(&[f64::NAN, 0.0], &catalog, 0, 1),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_parallel_scan_matches_sequential_order() {
        let rows = PARALLEL_SCAN_THRESHOLD + 10;
        let catalog = catalog((0..rows).map(|i| vec![(i % 13) as f64, 1.0]).collect());
        let results = rank(&[1.0, 0.0], &catalog, 0, rows).unwrap();

        assert_eq!(results.len(), rows);
        assert!(results.windows(2).all(|w| {
            w[0].score > w[1].score || (w[0].score == w[1].score && w[0].position < w[1].position)
        }));
    }
}
