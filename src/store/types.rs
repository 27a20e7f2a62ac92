//! Cached datasets and their descriptors.

use super::error::StoreError;
use super::metadata::DatasetMetadata;
use super::table::DataTable;
use crate::vocab::{validate_iri, VocabTerm};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// What a dataset is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DatasetKind {
    /// Model input parameters and supporting data, often measured values or technical
    /// specifications covering many models or instances.
    #[default]
    Parameters,
    /// Broad data about society and economy, including future scenarios and prices.
    Broad,
    /// Bill of materials, energy and services for a component or assembly, always
    /// relative to a given output.
    Bom,
    /// Composition of goods and wastes related to a given output.
    Composition,
}

impl DatasetKind {
    pub fn description(&self) -> &'static str {
        match self {
            DatasetKind::Parameters => "Model input parameters",
            DatasetKind::Broad => "Broad data about society and economy",
            DatasetKind::Bom => "Bill of materials, energy, and services",
            DatasetKind::Composition => "Composition of goods and wastes",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Describes one column of a dataset's table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// What the column measures.
    pub iri: String,
    /// Unit of the values.
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assembly: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl ColumnDescriptor {
    pub fn new(iri: impl Into<String>, unit: impl Into<String>) -> Self {
        Self { iri: iri.into(), unit: unit.into(), assembly: None, comment: None }
    }

    pub fn with_assembly(mut self, assembly: impl Into<String>) -> Self {
        self.assembly = Some(assembly.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Inclusive date range a dataset is valid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct ValidityWindow {
    valid_from: NaiveDate,
    valid_to: NaiveDate,
}

#[derive(Deserialize)]
struct RawWindow {
    valid_from: NaiveDate,
    valid_to: NaiveDate,
}

impl TryFrom<RawWindow> for ValidityWindow {
    type Error = StoreError;

    fn try_from(raw: RawWindow) -> Result<Self, Self::Error> {
        ValidityWindow::new(raw.valid_from, raw.valid_to)
    }
}

impl ValidityWindow {
    pub fn new(valid_from: NaiveDate, valid_to: NaiveDate) -> Result<Self, StoreError> {
        if valid_from > valid_to {
            return Err(StoreError::InvalidWindow { valid_from, valid_to });
        }
        Ok(Self { valid_from, valid_to })
    }

    pub fn valid_from(&self) -> NaiveDate {
        self.valid_from
    }

    pub fn valid_to(&self) -> NaiveDate {
        self.valid_to
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.valid_from <= date && date <= self.valid_to
    }

    pub fn overlaps(&self, other: &ValidityWindow) -> bool {
        self.valid_from <= other.valid_to && other.valid_from <= self.valid_to
    }
}

/// Column relabelling applied by [`Dataset::apply_aliases`], kept so it can be undone.
#[derive(Debug, Clone, Default, PartialEq)]
struct AliasState {
    /// alias -> original label
    restore: HashMap<String, String>,
}

/// A named, versioned table cached in the local store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDataset")]
pub struct Dataset {
    name: String,
    table: DataTable,
    kind: DatasetKind,
    product: Option<VocabTerm>,
    location: VocabTerm,
    validity: ValidityWindow,
    columns: Vec<ColumnDescriptor>,
    metadata: serde_json::Value,
    version: u32,
    #[serde(skip)]
    aliases: Option<AliasState>,
}

#[derive(Deserialize)]
struct RawDataset {
    name: String,
    table: DataTable,
    kind: DatasetKind,
    product: Option<VocabTerm>,
    location: VocabTerm,
    validity: ValidityWindow,
    columns: Vec<ColumnDescriptor>,
    metadata: serde_json::Value,
    version: u32,
}

impl TryFrom<RawDataset> for Dataset {
    type Error = StoreError;

    fn try_from(raw: RawDataset) -> Result<Self, Self::Error> {
        let dataset = Dataset {
            name: raw.name,
            table: raw.table,
            kind: raw.kind,
            product: raw.product,
            location: raw.location,
            validity: raw.validity,
            columns: raw.columns,
            metadata: raw.metadata,
            version: raw.version,
            aliases: None,
        };
        dataset.validate()?;
        Ok(dataset)
    }
}

impl Dataset {
    pub fn builder(name: impl Into<String>, kind: DatasetKind, table: DataTable) -> DatasetBuilder {
        DatasetBuilder {
            name: name.into(),
            kind,
            table,
            product: None,
            location: VocabTerm::world(),
            validity: None,
            columns: Vec::new(),
            metadata: serde_json::Value::Object(Default::default()),
            version: 1,
        }
    }

    /// Checks the invariants a stored dataset must satisfy.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.name.trim().is_empty() {
            return Err(StoreError::invalid(&self.name, "name is empty"));
        }
        if self.columns.len() != self.table.n_columns() {
            return Err(StoreError::invalid(
                &self.name,
                format!("{} column descriptors for {} table columns", self.columns.len(), self.table.n_columns()),
            ));
        }
        for descriptor in &self.columns {
            validate_iri(&descriptor.iri)?;
            validate_iri(&descriptor.unit)?;
        }
        if !self.metadata.is_object() {
            return Err(StoreError::invalid(&self.name, "metadata must be a JSON object"));
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &DataTable {
        &self.table
    }

    pub fn into_table(self) -> DataTable {
        self.table
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    pub fn product(&self) -> Option<&VocabTerm> {
        self.product.as_ref()
    }

    pub fn location(&self) -> &VocabTerm {
        &self.location
    }

    pub fn validity(&self) -> ValidityWindow {
        self.validity
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn metadata(&self) -> &serde_json::Value {
        &self.metadata
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Descriptor of the column currently labelled `label`. Descriptors are matched
    /// by position, so this still works after relabelling.
    pub fn column_descriptor(&self, label: &str) -> Option<&ColumnDescriptor> {
        self.table.position(label).and_then(|i| self.columns.get(i))
    }

    pub fn is_aliased(&self) -> bool {
        self.aliases.is_some()
    }

    /// Renames columns whose label is a key of `aliases` (IRI -> alias).
    ///
    /// Returns how many columns were renamed. Only the labels present at call time are
    /// looked up: applying a second, different map after the first finds the aliases,
    /// not the IRIs, and renames nothing it does not mention.
    pub fn apply_aliases(&mut self, aliases: &HashMap<String, String>) -> usize {
        let mut state = self.aliases.take().unwrap_or_default();
        let mut renamed = 0;
        let labels: Vec<String> = self.table.column_labels().into_iter().map(str::to_string).collect();
        for label in labels {
            let Some(alias) = aliases.get(&label) else { continue };
            if alias == &label {
                continue;
            }
            if self.table.rename(&label, alias) {
                let original = state.restore.remove(&label).unwrap_or(label);
                state.restore.insert(alias.clone(), original);
                renamed += 1;
            } else {
                tracing::warn!(dataset = %self.name, "Alias `{alias}` for column `{label}` clashes with an existing column");
            }
        }
        self.aliases = Some(state);
        renamed
    }

    /// Undoes every [`Dataset::apply_aliases`] call. Returns how many columns changed.
    pub fn restore_column_iris(&mut self) -> usize {
        let Some(state) = self.aliases.take() else { return 0 };
        tracing::debug!("Restoring {} column names for dataset {}", state.restore.len(), self.name);
        state
            .restore
            .iter()
            .filter(|(alias, original)| self.table.rename(alias, original))
            .count()
    }
}

pub struct DatasetBuilder {
    name: String,
    kind: DatasetKind,
    table: DataTable,
    product: Option<VocabTerm>,
    location: VocabTerm,
    validity: Option<ValidityWindow>,
    columns: Vec<ColumnDescriptor>,
    metadata: serde_json::Value,
    version: u32,
}

impl DatasetBuilder {
    pub fn product(mut self, product: VocabTerm) -> Self {
        self.product = Some(product);
        self
    }

    pub fn location(mut self, location: VocabTerm) -> Self {
        self.location = location;
        self
    }

    pub fn validity(mut self, window: ValidityWindow) -> Self {
        self.validity = Some(window);
        self
    }

    pub fn columns(mut self, columns: Vec<ColumnDescriptor>) -> Self {
        self.columns = columns;
        self
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn package(self, package: &DatasetMetadata) -> Self {
        let value = package.to_value();
        self.metadata(value)
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn build(self) -> Result<Dataset, StoreError> {
        let validity = self
            .validity
            .ok_or_else(|| StoreError::invalid(&self.name, "validity window is required"))?;
        let dataset = Dataset {
            name: self.name,
            table: self.table,
            kind: self.kind,
            product: self.product,
            location: self.location,
            validity,
            columns: self.columns,
            metadata: self.metadata,
            version: self.version,
            aliases: None,
        };
        dataset.validate()?;
        Ok(dataset)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::store::table::Column;

    fn table() -> DataTable {
        DataTable::new(vec![Column::new(YEAR, [2020.0]), Column::new(CAPACITY, [0.5])]).unwrap()
    }

    #[test]
    fn test_descriptor_count_must_match_columns() {
        let err = Dataset::builder("short", DatasetKind::Parameters, table())
            .validity(window(2020, 2021))
            .columns(vec![ColumnDescriptor::new(YEAR, YR)])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("1 column descriptors for 2 table columns"), "{err}");
    }

    #[test]
    fn test_validity_window_is_required_and_ordered() {
        let missing = Dataset::builder("x", DatasetKind::Bom, table())
            .columns(vec![ColumnDescriptor::new(YEAR, YR), ColumnDescriptor::new(CAPACITY, NUM)])
            .build();
        assert!(missing.is_err());

        let from = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let err = ValidityWindow::new(from, to).unwrap_err();
        assert!(matches!(err, StoreError::InvalidWindow { valid_from, .. } if valid_from == from), "{err:?}");
        assert!(ValidityWindow::new(to, to).is_ok());
    }

    #[test]
    fn test_deserialization_validates() {
        let ds = dataset("pem", DatasetKind::Bom, "https://vocab.sentier.dev/products/pem");
        let mut value = serde_json::to_value(&ds).unwrap();
        assert_eq!(serde_json::from_value::<Dataset>(value.clone()).unwrap(), ds);

        value["columns"].as_array_mut().unwrap().pop();
        let err = serde_json::from_value::<Dataset>(value).unwrap_err();
        assert!(err.to_string().contains("1 column descriptors for 2 table columns"), "{err}");
    }

    #[test]
    fn test_descriptor_iris_are_checked() {
        let err = Dataset::builder("x", DatasetKind::Bom, table())
            .validity(window(2020, 2021))
            .columns(vec![ColumnDescriptor::new(YEAR, "years"), ColumnDescriptor::new(CAPACITY, NUM)])
            .build()
            .unwrap_err();
        assert!(matches!(err, StoreError::Vocab(_)), "{err:?}");
    }

    #[test]
    fn test_defaults() {
        let ds = dataset("bom", DatasetKind::Bom, "https://vocab.sentier.dev/products/pem");
        assert_eq!(ds.location(), &VocabTerm::world());
        assert_eq!(ds.version(), 1);
        assert!(ds.metadata().is_object());
    }

    #[test]
    fn test_window_overlap() {
        let w = window(2018, 2028);
        assert!(w.overlaps(&window(2020, 2035)));
        assert!(w.overlaps(&window(2028, 2030)));
        assert!(!w.overlaps(&window(2029, 2030)));
        assert!(w.contains(NaiveDate::from_ymd_opt(2018, 1, 1).unwrap()));
    }

    #[test]
    fn test_aliases_apply_and_restore() {
        let mut ds = dataset("params", DatasetKind::Parameters, "https://vocab.sentier.dev/products/pem");
        let aliases = HashMap::from([
            (CAPACITY.to_string(), "capacity_factor".to_string()),
            ("https://example.com/not-here".to_string(), "ghost".to_string()),
        ]);

        assert_eq!(ds.apply_aliases(&aliases), 1);
        assert!(ds.is_aliased());
        assert_eq!(ds.table().column_labels(), vec![YEAR, "capacity_factor"]);
        assert_eq!(ds.column_descriptor("capacity_factor").unwrap().iri, CAPACITY);

        // Same map again: nothing left to rename.
        assert_eq!(ds.apply_aliases(&aliases), 0);

        // A different map no longer sees the IRI.
        let other = HashMap::from([(CAPACITY.to_string(), "cf".to_string())]);
        assert_eq!(ds.apply_aliases(&other), 0);
        assert_eq!(ds.table().column_labels(), vec![YEAR, "capacity_factor"]);

        assert_eq!(ds.restore_column_iris(), 1);
        assert_eq!(ds.table().column_labels(), vec![YEAR, CAPACITY]);
        assert!(!ds.is_aliased());
    }

    #[test]
    fn test_kind_serialization() {
        assert_eq!(serde_json::to_value(DatasetKind::Bom).unwrap(), "BOM");
        assert_eq!(serde_json::from_str::<DatasetKind>("\"COMPOSITION\"").unwrap(), DatasetKind::Composition);
        assert_eq!(DatasetKind::Parameters.to_string(), "Model input parameters");
    }
}
