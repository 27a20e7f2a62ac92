//! Error types for model declaration, retrieval and merging.
use super::arguments::ArgumentError;
use crate::store::StoreError;
use crate::vocab::VocabError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Alias declarations must be a list of {{term, alias}} objects, found {0}")]
    WrongContainer(String),
    #[error("Declaration {entry} does not hold a vocabulary term: {reason}")]
    NotATerm { entry: usize, reason: String },
    #[error("Alias `{alias}` is declared more than once")]
    DuplicateAlias { alias: String },
    #[error("Term <{iri}> is declared more than once")]
    DuplicateTerm { iri: String },
    #[error("`{alias}` is not a valid alias name")]
    InvalidAlias { alias: String },
    #[error("Alias `{alias}` is already bound to {existing}, cannot bind it to <{requested}>")]
    AliasCollision { alias: String, existing: String, requested: String },
    #[error("Unknown alias `{0}`")]
    UnknownAlias(String),
    #[error("Data validity check failed: {0}")]
    DataValidity(String),
    #[error(transparent)]
    Argument(#[from] ArgumentError),
    #[error(transparent)]
    Vocab(#[from] VocabError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Merge(#[from] MergeError),
}

impl ModelError {
    /// True for the errors raised while checking needs/provides declarations.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ModelError::WrongContainer(_)
                | ModelError::NotATerm { .. }
                | ModelError::DuplicateAlias { .. }
                | ModelError::DuplicateTerm { .. }
                | ModelError::InvalidAlias { .. }
                | ModelError::AliasCollision { .. }
        )
    }
}

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("Tables share no column to join on (left: {left:?}, right: {right:?})")]
    NoSharedColumns { left: Vec<String>, right: Vec<String> },
    #[error(transparent)]
    Table(#[from] StoreError),
}
