//! File-backed dataset store: one JSON document per line.

use super::error::StoreError;
use super::registry::{matches, DatasetStore};
use super::types::{Dataset, DatasetKind};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

pub const DATASETS_FILENAME: &str = "datasets.jsonl";

/// Append-only store under a data directory.
///
/// Every `find` re-reads the file, so several processes may share a directory as long as
/// only one of them writes.
#[derive(Debug)]
pub struct JsonLinesStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesStore {
    /// Opens (creating if needed) the store in `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| StoreError::Io { path: dir.to_path_buf(), source })?;
        let path = dir.join(DATASETS_FILENAME);
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| StoreError::Io { path: path.clone(), source })?;
        tracing::debug!("Opened dataset store at {}", path.display());
        Ok(Self { path, write_lock: Mutex::new(()) })
    }

    pub fn from_settings(settings: &crate::config::Settings) -> Result<Self, StoreError> {
        Self::open(&settings.data_dir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io { path: self.path.clone(), source }
    }

    /// Number of non-blank lines, read without parsing them.
    fn count_rows(&self) -> Result<usize, StoreError> {
        let file = File::open(&self.path).map_err(|e| self.io_error(e))?;
        let mut count = 0;
        for line in BufReader::new(file).lines() {
            if !line.map_err(|e| self.io_error(e))?.trim().is_empty() {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Streams every stored dataset to `visit`, stopping at the first corrupt line.
    fn scan(&self, mut visit: impl FnMut(Dataset)) -> Result<usize, StoreError> {
        let file = File::open(&self.path).map_err(|e| self.io_error(e))?;
        let mut count = 0;
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| self.io_error(e))?;
            if line.trim().is_empty() {
                continue;
            }
            let dataset: Dataset = serde_json::from_str(&line).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                line: index + 1,
                source,
            })?;
            visit(dataset);
            count += 1;
        }
        Ok(count)
    }
}

impl DatasetStore for JsonLinesStore {
    fn find(&self, kind: DatasetKind, products: &HashSet<String>) -> Result<Vec<Dataset>, StoreError> {
        let mut found = Vec::new();
        self.scan(|dataset| {
            if matches(&dataset, kind, products) {
                found.push(dataset);
            }
        })?;
        tracing::debug!("Found {} {:?} datasets in {}", found.len(), kind, self.path.display());
        Ok(found)
    }

    fn save(&self, mut dataset: Dataset) -> Result<u64, StoreError> {
        dataset.validate()?;
        dataset.restore_column_iris();
        let mut line = serde_json::to_string(&dataset)
            .map_err(|source| StoreError::Serialize { name: dataset.name().to_string(), source })?;
        line.push('\n');

        let _guard = self.write_lock.lock();
        let existing = self.count_rows()?;
        let mut file = OpenOptions::new().append(true).open(&self.path).map_err(|e| self.io_error(e))?;
        file.write_all(line.as_bytes()).map_err(|e| self.io_error(e))?;
        file.flush().map_err(|e| self.io_error(e))?;
        tracing::info!("Saved dataset `{}` to {}", dataset.name(), self.path.display());
        Ok(existing as u64 + 1)
    }

    fn reset(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        File::create(&self.path).map_err(|e| self.io_error(e))?;
        tracing::warn!("Deleted all datasets in {}", self.path.display());
        Ok(())
    }

    fn len(&self) -> Result<usize, StoreError> {
        self.scan(|_| {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::fixtures::{dataset, window, CAPACITY, YEAR};
    use std::collections::HashMap;

    const PEM: &str = "https://vocab.sentier.dev/products/pem-electrolyzer";

    fn pem() -> HashSet<String> {
        HashSet::from([PEM.to_string()])
    }

    #[test]
    fn test_datasets_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = JsonLinesStore::open(dir.path()).unwrap();
            assert_eq!(store.save(dataset("pem bom", DatasetKind::Bom, PEM)).unwrap(), 1);
            assert_eq!(store.save(dataset("pem bom", DatasetKind::Bom, PEM)).unwrap(), 2);
        }
        let store = JsonLinesStore::open(dir.path()).unwrap();
        let found = store.find(DatasetKind::Bom, &pem()).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0], dataset("pem bom", DatasetKind::Bom, PEM));
        assert!(store.find(DatasetKind::Composition, &pem()).unwrap().is_empty());
    }

    #[test]
    fn test_reset_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLinesStore::open(dir.path().join("nested")).unwrap();
        store.save(dataset("pem bom", DatasetKind::Bom, PEM)).unwrap();
        store.reset().unwrap();
        assert_eq!(store.len().unwrap(), 0);
        assert!(store.path().exists());
    }

    #[test]
    fn test_saved_columns_keep_iris() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLinesStore::open(dir.path()).unwrap();
        let mut ds = dataset("pem bom", DatasetKind::Bom, PEM);
        ds.apply_aliases(&HashMap::from([(CAPACITY.to_string(), "cf".to_string())]));
        store.save(ds).unwrap();

        let found = store.find_valid(DatasetKind::Bom, &pem(), &window(2020, 2021)).unwrap();
        assert_eq!(found[0].table().column_labels(), vec![YEAR, CAPACITY]);
    }

    #[test]
    fn test_corrupt_line_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLinesStore::open(dir.path()).unwrap();
        store.save(dataset("pem bom", DatasetKind::Bom, PEM)).unwrap();
        let mut file = OpenOptions::new().append(true).open(store.path()).unwrap();
        writeln!(file, "{{not json").unwrap();

        match store.find(DatasetKind::Bom, &pem()).unwrap_err() {
            StoreError::Corrupt { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_save_counts_rows_without_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLinesStore::open(dir.path()).unwrap();
        store.save(dataset("pem bom", DatasetKind::Bom, PEM)).unwrap();
        let mut file = OpenOptions::new().append(true).open(store.path()).unwrap();
        writeln!(file, "{{not json").unwrap();

        assert_eq!(store.save(dataset("pem bom", DatasetKind::Bom, PEM)).unwrap(), 3);
    }

    #[test]
    fn test_invalid_record_is_reported_as_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLinesStore::open(dir.path()).unwrap();
        let mut value = serde_json::to_value(dataset("pem bom", DatasetKind::Bom, PEM)).unwrap();
        value["columns"].as_array_mut().unwrap().pop();
        let mut file = OpenOptions::new().append(true).open(store.path()).unwrap();
        writeln!(file, "{value}").unwrap();

        match store.find(DatasetKind::Bom, &pem()).unwrap_err() {
            StoreError::Corrupt { line, .. } => assert_eq!(line, 1),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
