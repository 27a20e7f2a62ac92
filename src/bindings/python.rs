//! The `_core` extension module.

use crate::config::Settings;
use crate::hierarchy::resolve_closure;
use crate::logging::init_logging;
use crate::units::{ConversionError, UnitConverter};
use crate::vocab::{HttpEndpoint, TermKind, VocabError, VocabTerm, Vocabulary};
use pyo3::exceptions::{PyKeyError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use std::sync::Arc;

fn vocab_err(e: VocabError) -> PyErr {
    match e {
        VocabError::Transport(_) | VocabError::Http { .. } => PyRuntimeError::new_err(e.to_string()),
        _ => PyValueError::new_err(e.to_string()),
    }
}

fn conversion_err(e: ConversionError) -> PyErr {
    match e {
        ConversionError::Vocab(inner) => vocab_err(inner),
        e if e.is_lookup_miss() => PyKeyError::new_err(e.to_string()),
        e => PyValueError::new_err(e.to_string()),
    }
}

fn term(kind: &str, iri: &str) -> PyResult<VocabTerm> {
    let kind: TermKind = kind.parse().map_err(vocab_err)?;
    VocabTerm::new(kind, iri).map_err(vocab_err)
}

#[pyfunction]
pub fn rust_core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Breadth-first closure of `start` over `(from, to)` edges.
#[pyfunction]
#[pyo3(signature = (edges, start, include_start = true))]
pub fn resolve_hierarchy(edges: Vec<(String, String)>, start: &str, include_start: bool) -> Vec<String> {
    resolve_closure(&edges, start, include_start)
}

/// Installs stdout logging configured from the environment.
#[pyfunction]
pub fn setup_logging() -> bool {
    init_logging(&Settings::from_env())
}

#[pyclass(name = "_Vocabulary", frozen)]
pub struct PyVocabulary {
    vocabulary: Arc<Vocabulary>,
    converter: UnitConverter,
}

#[pymethods]
impl PyVocabulary {
    #[new]
    #[pyo3(signature = (endpoint = None))]
    pub fn new(endpoint: Option<String>) -> PyResult<Self> {
        let mut settings = Settings::from_env();
        if let Some(endpoint) = endpoint {
            settings.endpoint = endpoint;
        }
        let http = HttpEndpoint::from_settings(&settings).map_err(vocab_err)?;
        let vocabulary = Arc::new(Vocabulary::with_settings(Arc::new(http), &settings));
        let converter = UnitConverter::with_settings(vocabulary.clone(), &settings);
        Ok(Self { vocabulary, converter })
    }

    #[pyo3(signature = (kind, iri, include_self = false))]
    pub fn broader(&self, kind: &str, iri: &str, include_self: bool) -> PyResult<Vec<String>> {
        self.vocabulary.broader_iris(&term(kind, iri)?, include_self).map_err(vocab_err)
    }

    #[pyo3(signature = (kind, iri, include_self = false))]
    pub fn narrower(&self, kind: &str, iri: &str, include_self: bool) -> PyResult<Vec<String>> {
        self.vocabulary.narrower_iris(&term(kind, iri)?, include_self).map_err(vocab_err)
    }

    pub fn display(&self, kind: &str, iri: &str) -> PyResult<String> {
        self.vocabulary.display(&term(kind, iri)?).map_err(vocab_err)
    }

    pub fn conversion_factor(&self, from_unit: &str, to_unit: &str) -> PyResult<f64> {
        let from = VocabTerm::unit(from_unit).map_err(vocab_err)?;
        let to = VocabTerm::unit(to_unit).map_err(vocab_err)?;
        self.converter.get_conversion_factor(&from, &to).map_err(conversion_err)
    }

    pub fn __repr__(&self) -> String {
        format!("{:?}", self.vocabulary)
    }
}
