use crate::vocab::{TermKind, VocabError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("`{iri}` is a {kind} term, not a unit")]
    NotAUnit { iri: String, kind: TermKind },
    #[error("IRI `{iri}` not in units graph")]
    UnitNotFound { iri: String },
    #[error("Quantity kind `{iri}` has no units in the units graph")]
    QuantityKindNotFound { iri: String },
    #[error("Units `{from}` and `{to}` have no common quantity kinds")]
    NoCommonQuantityKind { from: String, to: String },
    #[error("No conversion multiplier for `{unit}` under quantity kinds {quantity_kinds:?}")]
    MissingMultiplier { unit: String, quantity_kinds: Vec<String> },
    #[error("Conversion multiplier for `{unit}` is zero")]
    ZeroMultiplier { unit: String },
    #[error(transparent)]
    Vocab(#[from] VocabError),
}

impl ConversionError {
    /// True for "the vocabulary does not know this" failures, which callers may
    /// choose to skip instead of aborting.
    pub fn is_lookup_miss(&self) -> bool {
        matches!(
            self,
            ConversionError::UnitNotFound { .. }
                | ConversionError::QuantityKindNotFound { .. }
                | ConversionError::NoCommonQuantityKind { .. }
                | ConversionError::MissingMultiplier { .. }
        )
    }
}
