//! A small columnar table: labelled columns of equal length.

use super::error::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Cell::Null, Into::into)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str("null"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub label: String,
    pub values: Vec<Cell>,
}

impl Column {
    pub fn new(label: impl Into<String>, values: impl IntoIterator<Item = impl Into<Cell>>) -> Self {
        Self { label: label.into(), values: values.into_iter().map(Into::into).collect() }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Column>", into = "Vec<Column>")]
pub struct DataTable {
    columns: Vec<Column>,
}

impl TryFrom<Vec<Column>> for DataTable {
    type Error = StoreError;

    fn try_from(columns: Vec<Column>) -> Result<Self, Self::Error> {
        DataTable::new(columns)
    }
}

impl From<DataTable> for Vec<Column> {
    fn from(table: DataTable) -> Self {
        table.columns
    }
}

impl DataTable {
    /// Builds a table, checking that labels are unique and columns equally long.
    pub fn new(columns: Vec<Column>) -> Result<Self, StoreError> {
        let mut labels = HashSet::new();
        for column in &columns {
            if !labels.insert(column.label.as_str()) {
                return Err(StoreError::InvalidTable(format!("duplicate column label `{}`", column.label)));
            }
        }
        if let Some(first) = columns.first() {
            let rows = first.values.len();
            if let Some(bad) = columns.iter().find(|c| c.values.len() != rows) {
                return Err(StoreError::InvalidTable(format!(
                    "column `{}` has {} rows, expected {rows}",
                    bad.label,
                    bad.values.len()
                )));
            }
        }
        Ok(Self { columns })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a table from row-major data.
    pub fn from_rows(labels: &[&str], rows: Vec<Vec<Cell>>) -> Result<Self, StoreError> {
        let mut columns: Vec<Column> = labels.iter().map(|l| Column { label: l.to_string(), values: Vec::with_capacity(rows.len()) }).collect();
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != labels.len() {
                return Err(StoreError::InvalidTable(format!("row {i} has {} cells, expected {}", row.len(), labels.len())));
            }
            for (column, cell) in columns.iter_mut().zip(row) {
                column.values.push(cell);
            }
        }
        Self::new(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_labels(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.label.as_str()).collect()
    }

    pub fn column(&self, label: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.label == label)
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.label == label)
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Cells of row `index`, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&Cell>> {
        (index < self.n_rows()).then(|| self.columns.iter().map(|c| &c.values[index]).collect())
    }

    /// Renames column `from` to `to`. Returns false if `from` is absent or `to` is
    /// already used by another column.
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        if from == to {
            return self.position(from).is_some();
        }
        if self.position(to).is_some() {
            return false;
        }
        match self.columns.iter_mut().find(|c| c.label == from) {
            Some(column) => {
                column.label = to.to_string();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataTable {
        DataTable::from_rows(
            &["year", "capacity"],
            vec![vec![2020.0.into(), 1.5.into()], vec![2021.0.into(), Cell::Null]],
        )
        .unwrap()
    }

    #[test]
    fn test_shape() {
        let table = sample();
        assert_eq!(table.n_columns(), 2);
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.column_labels(), vec!["year", "capacity"]);
        assert_eq!(table.row(1).unwrap(), vec![&Cell::Number(2021.0), &Cell::Null]);
        assert!(table.row(2).is_none());
    }

    #[test]
    fn test_rejects_ragged_and_duplicate_columns() {
        let ragged = DataTable::new(vec![Column::new("a", [1.0, 2.0]), Column::new("b", [1.0])]);
        assert!(matches!(ragged, Err(StoreError::InvalidTable(_))));

        let dup = DataTable::new(vec![Column::new("a", [1.0]), Column::new("a", [2.0])]);
        assert!(matches!(dup, Err(StoreError::InvalidTable(_))));

        let short_row = DataTable::from_rows(&["a", "b"], vec![vec![1.0.into()]]);
        assert!(short_row.is_err());
    }

    #[test]
    fn test_rename() {
        let mut table = sample();
        assert!(table.rename("capacity", "cap"));
        assert!(!table.rename("capacity", "cap2"));
        assert!(!table.rename("cap", "year"));
        assert_eq!(table.column_labels(), vec!["year", "cap"]);
    }

    #[test]
    fn test_serde_as_column_list() {
        let table = sample();
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json[1]["label"], "capacity");
        assert!(json[1]["values"][1].is_null());
        let back: DataTable = serde_json::from_value(json).unwrap();
        assert_eq!(back, table);

        let ragged = serde_json::json!([{"label": "a", "values": [1]}, {"label": "b", "values": []}]);
        assert!(serde_json::from_value::<DataTable>(ragged).is_err());
    }
}
