use std::collections::{BTreeMap, HashMap};

use crate::models::{ProductId, PurchaseEvent, UserId};

/// Sparse user × product purchase-count matrix.
///
/// Rows are the distinct user ids and columns the distinct product ids
/// found in the purchase events, both ascending. The column order is the
/// index space of the [`SimilarityMatrix`](super::similarity::SimilarityMatrix)
/// built from it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionMatrix {
    users: Vec<UserId>,
    products: Vec<ProductId>,
    /// Nonzero cells of each column as `(row, count)`, rows ascending
    columns: Vec<Vec<(usize, u32)>>,
}

impl InteractionMatrix {
    /// Counts purchase events per (user, product) pair
    pub fn build(events: &[PurchaseEvent]) -> Self {
        let mut counts: BTreeMap<(ProductId, UserId), u32> = BTreeMap::new();
        for event in events {
            *counts.entry((event.product_id, event.user_id)).or_insert(0) += 1;
        }

        let mut users: Vec<UserId> = events.iter().map(|e| e.user_id).collect();
        users.sort_unstable();
        users.dedup();

        let row_of: HashMap<UserId, usize> =
            users.iter().enumerate().map(|(row, id)| (*id, row)).collect();

        let mut products: Vec<ProductId> = Vec::new();
        let mut columns: Vec<Vec<(usize, u32)>> = Vec::new();
        for ((product_id, user_id), count) in counts {
            if products.last() != Some(&product_id) {
                products.push(product_id);
                columns.push(Vec::new());
            }
            if let (Some(column), Some(&row)) = (columns.last_mut(), row_of.get(&user_id)) {
                column.push((row, count));
            }
        }

        tracing::debug!(
            users = users.len(),
            products = products.len(),
            "Built interaction matrix"
        );

        Self {
            users,
            products,
            columns,
        }
    }

    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    pub fn products(&self) -> &[ProductId] {
        &self.products
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.users.len(), self.products.len())
    }

    /// True when there are no product columns
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Column position of a product, if it was ever purchased
    pub fn column_index(&self, product_id: ProductId) -> Option<usize> {
        self.products.binary_search(&product_id).ok()
    }

    /// Nonzero `(row, count)` cells of a column
    pub fn column(&self, index: usize) -> &[(usize, u32)] {
        self.columns.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of times `user_id` bought `product_id`
    pub fn count(&self, user_id: UserId, product_id: ProductId) -> u32 {
        let (Some(col), Ok(row)) = (
            self.column_index(product_id),
            self.users.binary_search(&user_id),
        ) else {
            return 0;
        };

        self.columns[col]
            .iter()
            .find(|(r, _)| *r == row)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }
}
