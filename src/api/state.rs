use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::error::AppResult;
use crate::services::{Dataset, DatasetSource, DatasetStats, SimilarityCache};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<RwLock<AppStateInner>>,
    pub config: Arc<Config>,
    source: Arc<dyn DatasetSource>,
}

/// Inner state, replaced only by a reload
pub struct AppStateInner {
    /// `None` until a load succeeds
    pub dataset: Option<Dataset>,
    pub cache: SimilarityCache,
}

impl AppState {
    /// Creates a state with no dataset loaded yet
    pub fn new(config: Config, source: Arc<dyn DatasetSource>) -> Self {
        Self::build(config, source, None)
    }

    /// Creates a state around an already loaded dataset
    pub fn with_dataset(config: Config, source: Arc<dyn DatasetSource>, dataset: Dataset) -> Self {
        Self::build(config, source, Some(dataset))
    }

    fn build(config: Config, source: Arc<dyn DatasetSource>, dataset: Option<Dataset>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(AppStateInner {
                dataset,
                cache: SimilarityCache::new(),
            })),
            config: Arc::new(config),
            source,
        }
    }

    /// Loads the dataset from the configured source and swaps it in.
    ///
    /// Loading happens before the write lock is taken, so queries keep
    /// running against the previous dataset until the swap; on failure the
    /// previous dataset stays in place.
    pub async fn reload(&self) -> AppResult<DatasetStats> {
        tracing::info!(source = %self.source.describe(), "Loading dataset");

        let dataset = match self.source.load().await {
            Ok(dataset) => dataset,
            Err(e) => {
                tracing::error!(error = %e, "Dataset load failed");
                return Err(e.into());
            }
        };
        let stats = dataset.stats();

        let mut inner = self.inner.write().await;
        inner.dataset = Some(dataset);
        inner.cache.clear();

        Ok(stats)
    }
}
