//! Item-to-item product recommendations from co-purchase history.
//!
//! Purchase events are aggregated into a user × product count matrix, from
//! which a product × product cosine similarity matrix is derived. The most
//! similar products to a queried product are served over a small JSON API.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
