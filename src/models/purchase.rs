use serde::{Deserialize, Serialize};

use super::ProductId;

/// Identifier of a purchasing user
pub type UserId = i64;

/// A single purchase fact. Repeated purchases are separate events.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PurchaseEvent {
    pub user_id: UserId,
    pub product_id: ProductId,
}

impl PurchaseEvent {
    pub fn new(user_id: UserId, product_id: ProductId) -> Self {
        Self {
            user_id,
            product_id,
        }
    }
}
