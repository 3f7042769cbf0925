use ndarray::Array2;

use super::interaction::InteractionMatrix;
use crate::models::ProductId;

/// Symmetric product × product cosine similarity matrix.
///
/// Indexed by the column order of the [`InteractionMatrix`] it was built
/// from (ascending product id).
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    products: Vec<ProductId>,
    scores: Array2<f64>,
}

impl SimilarityMatrix {
    /// Computes cosine similarity between every pair of product columns.
    ///
    /// Each unordered pair is computed once and mirrored. A pair involving a
    /// zero vector scores 0.
    pub fn compute(matrix: &InteractionMatrix) -> Self {
        let n = matrix.products().len();
        let norms: Vec<f64> = (0..n).map(|i| norm(matrix.column(i))).collect();

        let mut scores = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            for j in i..n {
                let score = cosine(matrix.column(i), norms[i], matrix.column(j), norms[j]);
                scores[[i, j]] = score;
                scores[[j, i]] = score;
            }
        }

        tracing::debug!(products = n, "Computed similarity matrix");

        Self {
            products: matrix.products().to_vec(),
            scores,
        }
    }

    pub fn products(&self) -> &[ProductId] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    fn index_of(&self, product_id: ProductId) -> Option<usize> {
        self.products.binary_search(&product_id).ok()
    }

    /// Similarity between two products, if both have columns
    pub fn get(&self, a: ProductId, b: ProductId) -> Option<f64> {
        let (i, j) = (self.index_of(a)?, self.index_of(b)?);
        Some(self.scores[[i, j]])
    }

    /// The full similarity row of a product, self included, in column order
    pub fn row(&self, product_id: ProductId) -> Option<Vec<(ProductId, f64)>> {
        let i = self.index_of(product_id)?;
        Some(
            self.products
                .iter()
                .copied()
                .zip(self.scores.row(i).iter().copied())
                .collect(),
        )
    }
}

fn norm(column: &[(usize, u32)]) -> f64 {
    column
        .iter()
        .map(|(_, count)| f64::from(*count).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Dot product of two sparse columns whose rows are ascending
fn dot(a: &[(usize, u32)], b: &[(usize, u32)]) -> f64 {
    let (mut i, mut j) = (0, 0);
    let mut sum = 0.0;
    while i < a.len() && j < b.len() {
        let ((row_a, count_a), (row_b, count_b)) = (a[i], b[j]);
        if row_a == row_b {
            sum += f64::from(count_a) * f64::from(count_b);
            i += 1;
            j += 1;
        } else if row_a < row_b {
            i += 1;
        } else {
            j += 1;
        }
    }
    sum
}

fn cosine(a: &[(usize, u32)], norm_a: f64, b: &[(usize, u32)], norm_b: f64) -> f64 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot(a, b) / (norm_a * norm_b)).clamp(0.0, 1.0)
}
