use serde::{Deserialize, Serialize};

/// Catalog key for a product
pub type ProductId = i64;

/// A catalog entry, immutable once loaded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub product_id: ProductId,
    pub product_name: String,
    pub category: String,
    /// Unit price, never negative
    pub price: f64,
}

impl Product {
    /// Creates a new product
    pub fn new(
        product_id: ProductId,
        product_name: impl Into<String>,
        category: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            product_id,
            product_name: product_name.into(),
            category: category.into(),
            price,
        }
    }
}
