//! Error types for vocabulary lookups.
use super::term::TermKind;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VocabError {
    /// The term's kind has no vocabulary graph to query.
    #[error("{kind} terms are not bound to a vocabulary graph")]
    MissingGraph { kind: TermKind },
    #[error("Unknown term kind `{0}`")]
    UnknownKind(String),
    #[error("Invalid IRI `{iri}`: {reason}")]
    InvalidIri { iri: String, reason: String },
    /// A binding in the query response did not have the expected shape.
    #[error("Malformed query response: {0}")]
    MalformedResponse(String),
    #[error("Query transport failed: {0}")]
    Transport(String),
    #[error("Endpoint {endpoint} answered with HTTP {status}")]
    Http { endpoint: String, status: u16 },
}
