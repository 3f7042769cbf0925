pub mod cache;
pub mod interaction;
pub mod recommender;
pub mod similarity;
pub mod source;
pub mod store;

pub use cache::SimilarityCache;
pub use interaction::InteractionMatrix;
pub use recommender::{RecommendError, Recommender};
pub use similarity::SimilarityMatrix;
pub use source::{CsvFileSource, DatasetSource};
pub use store::{Dataset, DatasetStats, LoadError};
