//! Vocabulary terms and the remote taxonomy service.
//!
//! [`VocabTerm`] is a plain value (kind + IRI). Everything that needs the network goes
//! through [`Vocabulary`], which owns the endpoint and the label cache.
pub mod client;
pub mod error;
pub mod http;
pub(crate) mod queries;
pub mod sparql;
pub mod term;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{Triple, Vocabulary, DEFAULT_TRIPLE_LIMIT};
pub use error::VocabError;
pub use http::HttpEndpoint;
pub use sparql::{convert_binding, BindingRow, BindingValue, RdfTerm, SparqlEndpoint};
pub use term::{validate_iri, TermKind, TriplePosition, VocabTerm, WORLD_GEONAME};
