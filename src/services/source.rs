use std::path::{Path, PathBuf};

use super::store::{Dataset, LoadError};

/// Where the catalog and purchase events come from
///
/// Implementations must either return a complete [`Dataset`] or an error,
/// never partially loaded data.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DatasetSource: Send + Sync {
    /// Loads both datasets
    async fn load(&self) -> Result<Dataset, LoadError>;

    /// Source description for logging
    fn describe(&self) -> String;
}

/// Reads the catalog and purchase events from two CSV files
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    products_path: PathBuf,
    purchases_path: PathBuf,
}

impl CsvFileSource {
    pub fn new(products_path: impl Into<PathBuf>, purchases_path: impl Into<PathBuf>) -> Self {
        Self {
            products_path: products_path.into(),
            purchases_path: purchases_path.into(),
        }
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>, LoadError> {
    tokio::fs::read(path).await.map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[async_trait::async_trait]
impl DatasetSource for CsvFileSource {
    #[tracing::instrument(skip(self), fields(source = %self.describe()))]
    async fn load(&self) -> Result<Dataset, LoadError> {
        let products = read_file(&self.products_path).await?;
        let purchases = read_file(&self.purchases_path).await?;

        Dataset::from_readers(products.as_slice(), purchases.as_slice())
    }

    fn describe(&self) -> String {
        format!(
            "csv(products={}, purchases={})",
            self.products_path.display(),
            self.purchases_path.display()
        )
    }
}
