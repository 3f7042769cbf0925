use std::sync::{Arc, Mutex};

use super::interaction::InteractionMatrix;
use super::similarity::SimilarityMatrix;
use super::store::Dataset;

/// Memo of the last similarity matrix, keyed by the purchase-event fingerprint.
///
/// Queries against an unchanged dataset reuse the matrix; a dataset with a
/// different fingerprint recomputes and replaces it.
#[derive(Debug, Default)]
pub struct SimilarityCache {
    entry: Mutex<Option<(u64, Arc<SimilarityMatrix>)>>,
}

impl SimilarityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached matrix for `dataset`, computing it on a miss
    pub fn get_or_compute(&self, dataset: &Dataset) -> Arc<SimilarityMatrix> {
        let fingerprint = dataset.fingerprint();
        let mut entry = match self.entry.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some((cached, matrix)) = entry.as_ref() {
            if *cached == fingerprint {
                tracing::debug!(fingerprint = %format!("{:016x}", fingerprint), "Similarity cache hit");
                return Arc::clone(matrix);
            }
        }

        tracing::debug!(fingerprint = %format!("{:016x}", fingerprint), "Similarity cache miss");
        let matrix = Arc::new(SimilarityMatrix::compute(&InteractionMatrix::build(
            dataset.events(),
        )));
        *entry = Some((fingerprint, Arc::clone(&matrix)));
        matrix
    }

    /// Drops the cached matrix
    pub fn clear(&self) {
        match self.entry.lock() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }
}
