use std::cmp::Ordering;
use std::sync::Arc;

use thiserror::Error;

use super::cache::SimilarityCache;
use super::interaction::InteractionMatrix;
use super::similarity::SimilarityMatrix;
use super::store::Dataset;
use crate::models::{round_score, Product, ProductId, Recommendation};

/// Error types for the recommender
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecommendError {
    #[error("Product {0} not found")]
    ProductNotFound(ProductId),
}

/// Item-to-item recommender over a loaded dataset.
///
/// Without a cache the similarity matrix is rebuilt from the purchase
/// events on every query.
pub struct Recommender<'a> {
    dataset: &'a Dataset,
    cache: Option<&'a SimilarityCache>,
}

impl<'a> Recommender<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self {
            dataset,
            cache: None,
        }
    }

    /// Reuses similarity matrices through `cache`
    pub fn with_cache(mut self, cache: &'a SimilarityCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Catalog metadata for a product
    pub fn product_info(&self, product_id: ProductId) -> Result<&'a Product, RecommendError> {
        self.dataset
            .get_product(product_id)
            .ok_or(RecommendError::ProductNotFound(product_id))
    }

    /// Similarity matrix for the current purchase events
    pub fn similarity(&self) -> Arc<SimilarityMatrix> {
        match self.cache {
            Some(cache) => cache.get_or_compute(self.dataset),
            None => Arc::new(SimilarityMatrix::compute(&InteractionMatrix::build(
                self.dataset.events(),
            ))),
        }
    }

    /// Returns up to `n` products most often bought alongside `product_id`.
    ///
    /// Entries are ordered by descending similarity, ties broken by
    /// ascending product id. A catalog product that was never purchased
    /// yields an empty list; a product missing from the catalog is an error.
    pub fn recommend(
        &self,
        product_id: ProductId,
        n: usize,
    ) -> Result<Vec<Recommendation>, RecommendError> {
        self.product_info(product_id)?;

        let similarity = self.similarity();
        let Some(row) = similarity.row(product_id) else {
            tracing::debug!(product_id, "Product has no purchase history");
            return Ok(Vec::new());
        };

        // candidates without a catalog entry are dropped after the cut
        let recommendations: Vec<Recommendation> = rank(row, product_id)
            .into_iter()
            .take(n)
            .filter_map(|(candidate, score)| {
                self.dataset
                    .get_product(candidate)
                    .map(|product| Recommendation::from_product(product, score))
            })
            .collect();

        Ok(recommendations)
    }
}

/// Drops `exclude` and orders by score descending, then id ascending.
///
/// Scores are compared at the returned precision, so values that differ
/// only by floating-point error tie.
fn rank(mut row: Vec<(ProductId, f64)>, exclude: ProductId) -> Vec<(ProductId, f64)> {
    row.retain(|(id, _)| *id != exclude);
    row.sort_by(|(id_a, score_a), (id_b, score_b)| {
        round_score(*score_b)
            .partial_cmp(&round_score(*score_a))
            .unwrap_or(Ordering::Equal)
            .then_with(|| id_a.cmp(id_b))
    });
    row
}
