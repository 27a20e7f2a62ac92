//! Outer-join folding of dataset tables.

use super::error::MergeError;
use crate::store::{Cell, Column, DataTable, Dataset};

/// Folds the tables of `datasets` left to right with an outer join on shared labels.
///
/// No datasets give an empty table and a single dataset gives its table unchanged.
/// The fold is order dependent: each step keeps the accumulated table's columns and
/// rows first.
pub fn merge_datasets_to_tables(datasets: &[Dataset]) -> Result<DataTable, MergeError> {
    let tables: Vec<&DataTable> = datasets.iter().map(Dataset::table).collect();
    merge_tables(&tables)
}

pub fn merge_tables(tables: &[&DataTable]) -> Result<DataTable, MergeError> {
    let Some((first, rest)) = tables.split_first() else {
        return Ok(DataTable::empty());
    };
    let mut merged = (*first).clone();
    for table in rest {
        merged = outer_join(&merged, table)?;
    }
    tracing::debug!("Merged {} tables into {} rows", tables.len(), merged.n_rows());
    Ok(merged)
}

/// Outer join on every label `left` and `right` share.
pub fn outer_join(left: &DataTable, right: &DataTable) -> Result<DataTable, MergeError> {
    let keys: Vec<&str> = left.column_labels().into_iter().filter(|l| right.position(l).is_some()).collect();
    if keys.is_empty() {
        return Err(MergeError::NoSharedColumns {
            left: left.column_labels().into_iter().map(str::to_string).collect(),
            right: right.column_labels().into_iter().map(str::to_string).collect(),
        });
    }
    let left_keys: Vec<usize> = keys.iter().filter_map(|k| left.position(k)).collect();
    let right_keys: Vec<usize> = keys.iter().filter_map(|k| right.position(k)).collect();
    let right_extra: Vec<usize> = (0..right.n_columns()).filter(|i| !right_keys.contains(i)).collect();

    let key_of = |table: &DataTable, positions: &[usize], row: usize| -> Vec<Cell> {
        positions.iter().map(|&c| table.columns()[c].values[row].clone()).collect()
    };
    let right_row_keys: Vec<Vec<Cell>> = (0..right.n_rows()).map(|r| key_of(right, &right_keys, r)).collect();

    let mut out: Vec<Vec<Cell>> = vec![Vec::new(); left.n_columns() + right_extra.len()];
    let mut push_row = |left_row: Option<usize>, right_row: Option<usize>| {
        for (c, column) in left.columns().iter().enumerate() {
            let cell = match (left_row, right_row) {
                (Some(l), _) => column.values[l].clone(),
                // Unmatched right rows still fill the key columns.
                (None, Some(r)) => match left_keys.iter().position(|&k| k == c) {
                    Some(k) => right.columns()[right_keys[k]].values[r].clone(),
                    None => Cell::Null,
                },
                (None, None) => Cell::Null,
            };
            out[c].push(cell);
        }
        for (offset, &c) in right_extra.iter().enumerate() {
            let cell = right_row.map(|r| right.columns()[c].values[r].clone()).unwrap_or_default();
            out[left.n_columns() + offset].push(cell);
        }
    };

    let mut matched = vec![false; right.n_rows()];
    for l in 0..left.n_rows() {
        let key = key_of(left, &left_keys, l);
        let mut any = false;
        for (r, right_key) in right_row_keys.iter().enumerate() {
            if *right_key == key {
                push_row(Some(l), Some(r));
                matched[r] = true;
                any = true;
            }
        }
        if !any {
            push_row(Some(l), None);
        }
    }
    for (r, was_matched) in matched.iter().enumerate() {
        if !was_matched {
            push_row(None, Some(r));
        }
    }

    let labels = left
        .column_labels()
        .into_iter()
        .chain(right_extra.iter().map(|&c| right.columns()[c].label.as_str()));
    let columns = labels.zip(out).map(|(label, values)| Column::new(label, values)).collect();
    Ok(DataTable::new(columns)?)
}
