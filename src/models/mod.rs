mod product;
mod purchase;
mod recommendation;

pub use product::{Product, ProductId};
pub use purchase::{PurchaseEvent, UserId};
pub use recommendation::{round_score, Recommendation, SCORE_PRECISION};
