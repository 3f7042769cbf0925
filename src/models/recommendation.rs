use serde::Serialize;

use super::{Product, ProductId};

/// Decimal places kept in returned similarity scores
pub const SCORE_PRECISION: i32 = 3;

/// A recommended product joined with its catalog metadata
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendation {
    pub product_id: ProductId,
    pub product_name: String,
    pub category: String,
    pub price: f64,
    pub similarity_score: f64,
}

impl Recommendation {
    /// Builds an entry from a catalog product and its raw similarity score
    pub fn from_product(product: &Product, score: f64) -> Self {
        Self {
            product_id: product.product_id,
            product_name: product.product_name.clone(),
            category: product.category.clone(),
            price: product.price,
            similarity_score: round_score(score),
        }
    }
}

/// Rounds a score to [`SCORE_PRECISION`] decimal places
pub fn round_score(score: f64) -> f64 {
    let factor = 10f64.powi(SCORE_PRECISION);
    (score * factor).round() / factor
}
