//! The dataset store interface and its in-memory implementation.

use super::error::StoreError;
use super::types::{Dataset, DatasetKind, ValidityWindow};
use parking_lot::RwLock;
use std::collections::HashSet;

/// Append-only collection of datasets.
///
/// Datasets are never updated in place: saving the same dataset twice stores two rows.
pub trait DatasetStore: Send + Sync {
    /// Datasets of `kind` whose product IRI is in `products`, in insertion order.
    fn find(&self, kind: DatasetKind, products: &HashSet<String>) -> Result<Vec<Dataset>, StoreError>;

    /// Validates and appends `dataset`, returning its row id.
    fn save(&self, dataset: Dataset) -> Result<u64, StoreError>;

    /// Deletes every dataset.
    fn reset(&self) -> Result<(), StoreError>;

    fn len(&self) -> Result<usize, StoreError>;

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Like [`DatasetStore::find`], keeping only datasets valid at some point in `window`.
    fn find_valid(
        &self,
        kind: DatasetKind,
        products: &HashSet<String>,
        window: &ValidityWindow,
    ) -> Result<Vec<Dataset>, StoreError> {
        Ok(self
            .find(kind, products)?
            .into_iter()
            .filter(|d| d.validity().overlaps(window))
            .collect())
    }
}

pub(crate) fn matches(dataset: &Dataset, kind: DatasetKind, products: &HashSet<String>) -> bool {
    dataset.kind() == kind && dataset.product().is_some_and(|p| products.contains(p.iri()))
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<Dataset>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DatasetStore for MemoryStore {
    fn find(&self, kind: DatasetKind, products: &HashSet<String>) -> Result<Vec<Dataset>, StoreError> {
        Ok(self.rows.read().iter().filter(|d| matches(d, kind, products)).cloned().collect())
    }

    fn save(&self, mut dataset: Dataset) -> Result<u64, StoreError> {
        dataset.validate()?;
        // Stored columns always carry their IRIs.
        dataset.restore_column_iris();
        let mut rows = self.rows.write();
        rows.push(dataset);
        Ok(rows.len() as u64)
    }

    fn reset(&self) -> Result<(), StoreError> {
        self.rows.write().clear();
        Ok(())
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.rows.read().len())
    }
}
