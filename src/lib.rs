//! Vocabulary-aware dataset tooling for life cycle assessment models.
//!
//! Models declare the vocabulary terms they need and provide. This crate resolves
//! those terms against the sentier.dev SKOS vocabularies, converts between QUDT
//! units, and retrieves cached datasets for a term and its broader and narrower
//! neighbours.

pub mod cache;
pub mod config;
pub mod hierarchy;
pub mod logging;
pub mod model;
pub mod store;
pub mod units;
pub mod vocab;

#[cfg(feature = "python")]
pub mod bindings;

pub use config::Settings;
pub use hierarchy::resolve_closure;
pub use model::{Demand, Flow, Model, ModelBase, ModelError, RunConfig};
pub use store::{Dataset, DatasetKind, DatasetStore, JsonLinesStore, MemoryStore};
pub use units::UnitConverter;
pub use vocab::{TermKind, VocabTerm, Vocabulary};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// The `_core` Python module.
#[cfg(feature = "python")]
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    use bindings::python;

    m.add_function(wrap_pyfunction!(python::rust_core_version, m)?)?;
    m.add_function(wrap_pyfunction!(python::resolve_hierarchy, m)?)?;
    m.add_function(wrap_pyfunction!(python::setup_logging, m)?)?;
    m.add_class::<python::PyVocabulary>()?;
    Ok(())
}
