//! The remote query boundary and the SPARQL JSON results format.
//!
//! The core only needs "run this query, give me binding rows". Everything about the
//! transport lives behind [`SparqlEndpoint`].

use super::error::VocabError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One `{type, value, xml:lang, datatype}` object from a result binding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingValue {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub term_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
}

impl BindingValue {
    pub fn uri(value: impl Into<String>) -> Self {
        Self { term_type: Some("uri".into()), value: Some(value.into()), ..Default::default() }
    }

    pub fn literal(value: impl Into<String>, language: Option<&str>) -> Self {
        Self {
            term_type: Some("literal".into()),
            value: Some(value.into()),
            language: language.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            term_type: Some("literal".into()),
            value: Some(value.into()),
            datatype: Some(datatype.into()),
            ..Default::default()
        }
    }
}

/// Variable name (without `?`) to bound value.
pub type BindingRow = HashMap<String, BindingValue>;

/// Executes query text against a remote triple store.
pub trait SparqlEndpoint: Send + Sync {
    fn execute_query(&self, query: &str) -> Result<Vec<BindingRow>, VocabError>;

    /// Where queries go, for log messages.
    fn location(&self) -> &str {
        "sparql endpoint"
    }
}

/// A converted binding value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RdfTerm {
    Iri(String),
    Literal {
        value: String,
        language: Option<String>,
        datatype: Option<String>,
    },
}

impl RdfTerm {
    /// Lexical value for literals, the IRI otherwise.
    pub fn value(&self) -> &str {
        match self {
            RdfTerm::Iri(iri) => iri,
            RdfTerm::Literal { value, .. } => value,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, RdfTerm::Literal { .. })
    }
}

/// Converts a binding object into an [`RdfTerm`].
///
/// `literal` becomes a literal carrying language and datatype. Any other type,
/// including a missing one, is read as an IRI. A missing `value` is an error.
pub fn convert_binding(obj: &BindingValue) -> Result<RdfTerm, VocabError> {
    let Some(value) = &obj.value else {
        let err = VocabError::MalformedResponse(format!("Missing 'value' key in object: {obj:?}"));
        tracing::error!("{err}");
        return Err(err);
    };

    match obj.term_type.as_deref() {
        Some("literal") => Ok(RdfTerm::Literal {
            value: value.clone(),
            language: obj.language.clone(),
            datatype: obj.datatype.clone(),
        }),
        _ => Ok(RdfTerm::Iri(value.clone())),
    }
}

/// Looks up `?var` in a row and returns its raw value string.
pub fn binding_value<'a>(row: &'a BindingRow, var: &str) -> Result<&'a str, VocabError> {
    let obj = row
        .get(var)
        .ok_or_else(|| VocabError::MalformedResponse(format!("Missing variable '?{var}' in binding row")))?;
    obj.value
        .as_deref()
        .ok_or_else(|| VocabError::MalformedResponse(format!("Missing 'value' key in object: {obj:?}")))
}

#[derive(Deserialize)]
struct ResultsDocument {
    results: ResultsBlock,
}

#[derive(Deserialize)]
struct ResultsBlock {
    bindings: Vec<BindingRow>,
}

/// Parses a `application/sparql-results+json` document into its binding rows.
pub fn parse_results_json(text: &str) -> Result<Vec<BindingRow>, VocabError> {
    let doc: ResultsDocument = serde_json::from_str(text)
        .map_err(|e| VocabError::MalformedResponse(format!("Invalid SPARQL results document: {e}")))?;
    Ok(doc.results.bindings)
}
