use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::request_id::RequestId;
use crate::models::{Product, ProductId, Recommendation};
use crate::services::{DatasetStats, Recommender};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    pub n: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub dataset_loaded: bool,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub success: bool,
    pub product: Product,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub success: bool,
    pub stats: DatasetStats,
}

fn parse_product_id(path: Result<Path<ProductId>, PathRejection>) -> AppResult<ProductId> {
    path.map(|Path(id)| id)
        .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))
}

// Handlers

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let inner = state.inner.read().await;
    Json(HealthResponse {
        status: "healthy",
        dataset_loaded: inner.dataset.is_some(),
    })
}

/// List the catalog in ascending id order
pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    let inner = state.inner.read().await;
    let dataset = inner.dataset.as_ref().ok_or(AppError::DatasetUnavailable)?;
    Ok(Json(dataset.products().cloned().collect()))
}

/// Get a single product's catalog metadata
pub async fn get_product(
    State(state): State<AppState>,
    path: Result<Path<ProductId>, PathRejection>,
) -> AppResult<Json<Product>> {
    let product_id = parse_product_id(path)?;

    let inner = state.inner.read().await;
    let dataset = inner.dataset.as_ref().ok_or(AppError::DatasetUnavailable)?;
    let product = Recommender::new(dataset).product_info(product_id)?;

    Ok(Json(product.clone()))
}

/// Products most often bought together with the given product
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    path: Result<Path<ProductId>, PathRejection>,
    query: Result<Query<RecommendQuery>, QueryRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    let product_id = parse_product_id(path)?;
    let Query(query) = query.map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;

    let n = query.n.unwrap_or(state.config.default_recommendations);
    if n > state.config.max_recommendations {
        return Err(AppError::InvalidInput(format!(
            "n must be at most {}",
            state.config.max_recommendations
        )));
    }

    tracing::info!(
        request_id = %request_id,
        product_id,
        n,
        "Processing recommendation request"
    );

    let inner = state.inner.read().await;
    let dataset = inner.dataset.as_ref().ok_or(AppError::DatasetUnavailable)?;

    let mut recommender = Recommender::new(dataset);
    if state.config.similarity_cache {
        recommender = recommender.with_cache(&inner.cache);
    }

    let product = recommender.product_info(product_id)?.clone();
    let recommendations = recommender.recommend(product_id, n)?;

    tracing::info!(
        request_id = %request_id,
        product_id,
        count = recommendations.len(),
        "Recommendations computed"
    );

    Ok(Json(RecommendationResponse {
        success: true,
        product,
        recommendations,
    }))
}

/// Reload the catalog and purchase events from the configured source
pub async fn reload(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<ReloadResponse>> {
    tracing::info!(request_id = %request_id, "Processing reload request");

    let stats = state.reload().await?;
    Ok(Json(ReloadResponse {
        success: true,
        stats,
    }))
}
