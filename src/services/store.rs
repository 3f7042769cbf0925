use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use xxhash_rust::xxh3::Xxh3;

use crate::models::{Product, ProductId, PurchaseEvent};

const PRODUCT_COLUMNS: [&str; 4] = ["product_id", "product_name", "category", "price"];
const PURCHASE_COLUMNS: [&str; 2] = ["user_id", "product_id"];

/// Errors raised while loading the catalog or the purchase events
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{dataset} data is missing required column `{column}`")]
    MissingColumn {
        dataset: &'static str,
        column: &'static str,
    },
    #[error("malformed {dataset} data: {message}")]
    Parse {
        dataset: &'static str,
        message: String,
    },
    #[error("product {product_id} has an invalid price ({price})")]
    InvalidPrice { product_id: ProductId, price: f64 },
    #[error("product {0} appears more than once in the catalog")]
    DuplicateProduct(ProductId),
}

/// Summary of a loaded dataset, reported in logs and by the reload endpoint
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DatasetStats {
    pub products: usize,
    pub purchases: usize,
    pub users: usize,
    pub purchased_products: usize,
    /// Purchase events whose product id has no catalog entry
    pub orphaned_purchases: usize,
    pub fingerprint: String,
    pub loaded_at: DateTime<Utc>,
}

/// The loaded catalog and purchase history.
///
/// Read-only once constructed. A `Dataset` only exists when both sources
/// loaded successfully, so callers never observe partially loaded data.
#[derive(Debug, Clone)]
pub struct Dataset {
    products: BTreeMap<ProductId, Product>,
    events: Vec<PurchaseEvent>,
    fingerprint: u64,
    loaded_at: DateTime<Utc>,
}

impl Dataset {
    /// Builds a dataset from already parsed records
    pub fn new(products: Vec<Product>, events: Vec<PurchaseEvent>) -> Result<Self, LoadError> {
        let mut catalog = BTreeMap::new();
        for product in products {
            if !product.price.is_finite() || product.price < 0.0 {
                return Err(LoadError::InvalidPrice {
                    product_id: product.product_id,
                    price: product.price,
                });
            }
            let id = product.product_id;
            if catalog.insert(id, product).is_some() {
                return Err(LoadError::DuplicateProduct(id));
            }
        }

        let fingerprint = fingerprint_events(&events);

        Ok(Self {
            products: catalog,
            events,
            fingerprint,
            loaded_at: Utc::now(),
        })
    }

    /// Parses the catalog and purchase CSV sources.
    ///
    /// Header names and field values are trimmed before use. Both sources
    /// must carry a header row with the required columns; extra columns
    /// are ignored.
    pub fn from_readers<C: Read, P: Read>(catalog: C, purchases: P) -> Result<Self, LoadError> {
        let products: Vec<Product> = read_records("products", catalog, &PRODUCT_COLUMNS)?;
        let events: Vec<PurchaseEvent> = read_records("purchases", purchases, &PURCHASE_COLUMNS)?;

        let dataset = Self::new(products, events)?;
        let stats = dataset.stats();

        tracing::info!(
            products = stats.products,
            purchases = stats.purchases,
            users = stats.users,
            fingerprint = %stats.fingerprint,
            "Dataset loaded"
        );
        if stats.orphaned_purchases > 0 {
            tracing::warn!(
                orphaned = stats.orphaned_purchases,
                "Purchase events reference products missing from the catalog"
            );
        }

        Ok(dataset)
    }

    /// Looks up a catalog entry
    pub fn get_product(&self, product_id: ProductId) -> Option<&Product> {
        self.products.get(&product_id)
    }

    /// Catalog entries in ascending id order
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    pub fn events(&self) -> &[PurchaseEvent] {
        &self.events
    }

    /// Content hash of the purchase events, in event order
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub fn stats(&self) -> DatasetStats {
        let users: BTreeSet<_> = self.events.iter().map(|e| e.user_id).collect();
        let purchased: BTreeSet<_> = self.events.iter().map(|e| e.product_id).collect();
        let orphaned_purchases = self
            .events
            .iter()
            .filter(|e| !self.products.contains_key(&e.product_id))
            .count();

        DatasetStats {
            products: self.products.len(),
            purchases: self.events.len(),
            users: users.len(),
            purchased_products: purchased.len(),
            orphaned_purchases,
            fingerprint: format!("{:016x}", self.fingerprint),
            loaded_at: self.loaded_at,
        }
    }
}

fn read_records<T, R>(
    dataset: &'static str,
    reader: R,
    required: &[&'static str],
) -> Result<Vec<T>, LoadError>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| LoadError::Parse {
            dataset,
            message: e.to_string(),
        })?
        .clone();

    tracing::debug!(dataset, columns = ?headers.iter().collect::<Vec<_>>(), "Read CSV header");

    if let Some(column) = required.iter().find(|c| !headers.iter().any(|h| h == **c)) {
        return Err(LoadError::MissingColumn {
            dataset,
            column: *column,
        });
    }

    reader
        .deserialize::<T>()
        .map(|record| {
            record.map_err(|e| LoadError::Parse {
                dataset,
                message: e.to_string(),
            })
        })
        .collect()
}

fn fingerprint_events(events: &[PurchaseEvent]) -> u64 {
    let mut hasher = Xxh3::new();
    for event in events {
        hasher.update(&event.user_id.to_le_bytes());
        hasher.update(&event.product_id.to_le_bytes());
    }
    hasher.digest()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCTS_CSV: &str = "product_id,product_name,category,price
1,Phone,Electronics,799.0
2,Case,Accessories,19.99
3,Charger,Accessories,29.5
";

    const PURCHASES_CSV: &str = "user_id,product_id
1,1
1,2
2,1
2,3
";

    fn load(products: &str, purchases: &str) -> Result<Dataset, LoadError> {
        Dataset::from_readers(products.as_bytes(), purchases.as_bytes())
    }

    #[test]
    fn test_load_sample_data() {
        let dataset = load(PRODUCTS_CSV, PURCHASES_CSV).unwrap();

        assert_eq!(dataset.products().count(), 3);
        assert_eq!(dataset.events().len(), 4);

        let phone = dataset.get_product(1).unwrap();
        assert_eq!(phone.product_name, "Phone");
        assert_eq!(phone.category, "Electronics");
        assert_eq!(phone.price, 799.0);
    }

    #[test]
    fn test_header_whitespace_is_trimmed() {
        let products = " product_id , product_name,category ,price\n7, Lamp ,Home,12\n";
        let purchases = "user_id ,  product_id\n4,7\n";

        let dataset = load(products, purchases).unwrap();
        let lamp = dataset.get_product(7).unwrap();
        assert_eq!(lamp.product_name, "Lamp");
        assert_eq!(dataset.events(), &[PurchaseEvent::new(4, 7)]);
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let products = "product_id,product_name,category,price,stock\n1,Phone,Electronics,10,4\n";
        let purchases = "user_id,product_id,timestamp\n1,1,2024-01-01\n";

        let dataset = load(products, purchases).unwrap();
        assert!(dataset.get_product(1).is_some());
        assert_eq!(dataset.events().len(), 1);
    }

    #[test]
    fn test_missing_column() {
        let purchases = "user_id,item\n1,1\n";

        let err = load(PRODUCTS_CSV, purchases).unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingColumn {
                dataset: "purchases",
                column: "product_id"
            }
        ));
    }

    #[test]
    fn test_empty_source_is_a_load_error() {
        let err = load("", PURCHASES_CSV).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { dataset: "products", .. }));
    }

    #[test]
    fn test_header_only_sources_load_empty() {
        let dataset = load("product_id,product_name,category,price\n", "user_id,product_id\n").unwrap();

        assert_eq!(dataset.products().count(), 0);
        assert!(dataset.events().is_empty());
    }

    #[test]
    fn test_malformed_record() {
        let purchases = "user_id,product_id\n1,abc\n";

        let err = load(PRODUCTS_CSV, purchases).unwrap_err();
        assert!(matches!(err, LoadError::Parse { dataset: "purchases", .. }));
    }

    #[test]
    fn test_negative_price_rejected() {
        let products = "product_id,product_name,category,price\n1,Phone,Electronics,-1\n";

        let err = load(products, PURCHASES_CSV).unwrap_err();
        assert!(matches!(err, LoadError::InvalidPrice { product_id: 1, .. }));
    }

    #[test]
    fn test_non_finite_price_rejected() {
        for price in ["NaN", "inf", "-inf"] {
            let products = format!("product_id,product_name,category,price\n1,Phone,Electronics,{price}\n");

            let err = load(&products, PURCHASES_CSV).unwrap_err();
            assert!(
                matches!(err, LoadError::InvalidPrice { product_id: 1, .. }),
                "price {price} was accepted"
            );
        }
    }

    #[test]
    fn test_duplicate_product_rejected() {
        let products = "product_id,product_name,category,price\n1,Phone,A,1\n1,Other,B,2\n";

        let err = load(products, PURCHASES_CSV).unwrap_err();
        assert!(matches!(err, LoadError::DuplicateProduct(1)));
    }

    #[test]
    fn test_get_product_missing_id() {
        let dataset = load(PRODUCTS_CSV, PURCHASES_CSV).unwrap();
        assert!(dataset.get_product(99).is_none());
    }

    #[test]
    fn test_stats_counts_orphans() {
        let purchases = "user_id,product_id\n1,1\n1,1\n2,42\n";
        let dataset = load(PRODUCTS_CSV, purchases).unwrap();

        let stats = dataset.stats();
        assert_eq!(stats.products, 3);
        assert_eq!(stats.purchases, 3);
        assert_eq!(stats.users, 2);
        assert_eq!(stats.purchased_products, 2);
        assert_eq!(stats.orphaned_purchases, 1);
        assert_eq!(stats.fingerprint.len(), 16);
    }

    #[test]
    fn test_fingerprint_tracks_event_content() {
        let a = load(PRODUCTS_CSV, PURCHASES_CSV).unwrap();
        let b = load(PRODUCTS_CSV, PURCHASES_CSV).unwrap();
        let c = load(PRODUCTS_CSV, "user_id,product_id\n1,1\n").unwrap();

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}
