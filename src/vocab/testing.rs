//! Scripted endpoint for unit tests.

use super::error::VocabError;
use super::sparql::{BindingRow, BindingValue, SparqlEndpoint};
use parking_lot::Mutex;

/// Answers a query with the rows of the first rule whose needles all occur in the
/// query text, or with no rows. Records every query it sees.
#[derive(Default)]
pub(crate) struct ScriptedEndpoint {
    rules: Vec<(Vec<String>, Vec<BindingRow>)>,
    seen: Mutex<Vec<String>>,
}

impl ScriptedEndpoint {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on(mut self, needles: &[&str], rows: Vec<BindingRow>) -> Self {
        self.rules.push((needles.iter().map(|s| s.to_string()).collect(), rows));
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.seen.lock().len()
    }
}

impl SparqlEndpoint for ScriptedEndpoint {
    fn execute_query(&self, query: &str) -> Result<Vec<BindingRow>, VocabError> {
        self.seen.lock().push(query.to_string());
        let rows = self
            .rules
            .iter()
            .find(|(needles, _)| needles.iter().all(|n| query.contains(n.as_str())))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default();
        Ok(rows)
    }

    fn location(&self) -> &str {
        "scripted endpoint"
    }
}

pub(crate) fn row(bindings: &[(&str, BindingValue)]) -> BindingRow {
    bindings.iter().map(|(var, value)| (var.to_string(), value.clone())).collect()
}

/// Rows in the `?s ?o` shape returned by hierarchy queries.
pub(crate) fn hierarchy_rows(edges: &[(&str, &str)]) -> Vec<BindingRow> {
    edges
        .iter()
        .map(|(s, o)| row(&[("s", BindingValue::uri(*s)), ("o", BindingValue::uri(*o))]))
        .collect()
}
