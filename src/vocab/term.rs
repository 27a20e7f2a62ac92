//! Typed vocabulary identifiers.

use super::error::VocabError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use url::Url;

/// GeoNames IRI of the whole world, the default spatial context.
pub const WORLD_GEONAME: &str = "https://sws.geonames.org/6295630/";

/// The vocabulary a term belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TermKind {
    Product,
    Unit,
    ModelTerm,
    Flow,
    Geoname,
}

impl TermKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TermKind::Product => "product",
            TermKind::Unit => "unit",
            TermKind::ModelTerm => "model-term",
            TermKind::Flow => "flow",
            TermKind::Geoname => "geoname",
        }
    }

    /// Named graph holding this vocabulary. GeoNames is external and has none.
    pub fn graph_url(&self) -> Option<&'static str> {
        match self {
            TermKind::Product => Some("https://vocab.sentier.dev/products/"),
            TermKind::Unit => Some("https://vocab.sentier.dev/units/"),
            TermKind::ModelTerm => Some("https://vocab.sentier.dev/model-terms/"),
            TermKind::Flow => Some("https://vocab.sentier.dev/flows/"),
            TermKind::Geoname => None,
        }
    }

    /// Model terms are a flat list, not a SKOS hierarchy.
    pub fn has_hierarchy(&self) -> bool {
        !matches!(self, TermKind::ModelTerm)
    }
}

impl fmt::Display for TermKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TermKind {
    type Err = VocabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [TermKind::Product, TermKind::Unit, TermKind::ModelTerm, TermKind::Flow, TermKind::Geoname]
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| VocabError::UnknownKind(s.to_string()))
    }
}

/// Position of the queried IRI inside a triple pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TriplePosition {
    #[default]
    Subject,
    Predicate,
    Object,
}

impl TriplePosition {
    pub fn variable(&self) -> &'static str {
        match self {
            TriplePosition::Subject => "s",
            TriplePosition::Predicate => "p",
            TriplePosition::Object => "o",
        }
    }
}

/// Checks that `iri` is an absolute IRI without embedded whitespace.
pub fn validate_iri(iri: &str) -> Result<(), VocabError> {
    let invalid = |reason: &str| VocabError::InvalidIri { iri: iri.to_string(), reason: reason.to_string() };
    if iri.is_empty() {
        return Err(invalid("empty string"));
    }
    if iri.chars().any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '"' | '{' | '}')) {
        return Err(invalid("contains characters not allowed in an IRI"));
    }
    Url::parse(iri).map_err(|e| invalid(&e.to_string()))?;
    Ok(())
}

/// An IRI from one of the sentier.dev vocabularies.
///
/// Equality, ordering and hashing only look at the IRI, so the same identifier used
/// under two kinds compares equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawTerm")]
pub struct VocabTerm {
    kind: TermKind,
    iri: String,
}

#[derive(Deserialize)]
struct RawTerm {
    kind: TermKind,
    iri: String,
}

impl TryFrom<RawTerm> for VocabTerm {
    type Error = VocabError;

    fn try_from(raw: RawTerm) -> Result<Self, Self::Error> {
        VocabTerm::new(raw.kind, raw.iri)
    }
}

impl VocabTerm {
    pub fn new(kind: TermKind, iri: impl Into<String>) -> Result<Self, VocabError> {
        let iri = iri.into();
        validate_iri(&iri)?;
        Ok(Self { kind, iri })
    }

    pub fn product(iri: impl Into<String>) -> Result<Self, VocabError> {
        Self::new(TermKind::Product, iri)
    }

    pub fn unit(iri: impl Into<String>) -> Result<Self, VocabError> {
        Self::new(TermKind::Unit, iri)
    }

    pub fn model_term(iri: impl Into<String>) -> Result<Self, VocabError> {
        Self::new(TermKind::ModelTerm, iri)
    }

    pub fn flow(iri: impl Into<String>) -> Result<Self, VocabError> {
        Self::new(TermKind::Flow, iri)
    }

    pub fn geoname(iri: impl Into<String>) -> Result<Self, VocabError> {
        Self::new(TermKind::Geoname, iri)
    }

    pub fn world() -> Self {
        Self { kind: TermKind::Geoname, iri: WORLD_GEONAME.to_string() }
    }

    /// Re-wraps an IRI with this term's kind. Used for hierarchy results, which come
    /// from the same graph and so need no validation.
    pub(crate) fn sibling(&self, iri: String) -> Self {
        Self { kind: self.kind, iri }
    }

    pub fn kind(&self) -> TermKind {
        self.kind
    }

    pub fn iri(&self) -> &str {
        &self.iri
    }

    pub fn graph_url(&self) -> Option<&'static str> {
        self.kind.graph_url()
    }

    /// Graph URL, or a configuration error for kinds without one.
    pub(crate) fn require_graph(&self) -> Result<&'static str, VocabError> {
        self.graph_url().ok_or_else(|| {
            let err = VocabError::MissingGraph { kind: self.kind };
            tracing::error!(iri = %self.iri, "{err}");
            err
        })
    }
}

impl PartialEq for VocabTerm {
    fn eq(&self, other: &Self) -> bool {
        self.iri == other.iri
    }
}

impl Eq for VocabTerm {}

impl Hash for VocabTerm {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.iri.hash(state);
    }
}

impl PartialOrd for VocabTerm {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VocabTerm {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.iri.cmp(&other.iri)
    }
}

impl fmt::Display for VocabTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.iri)
    }
}

impl AsRef<str> for VocabTerm {
    fn as_ref(&self) -> &str {
        &self.iri
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    #[rstest]
    #[case("https://vocab.sentier.dev/products/electrolyzer")]
    #[case("http://openenergy-platform.org/ontology/oeo/OEO_00010379")]
    #[case("urn:uuid:6e8bc430-9c3a-11d9-9669-0800200c9a66")]
    #[case("https://sws.geonames.org/6255148/")]
    fn test_valid_iris(#[case] iri: &str) {
        assert!(VocabTerm::product(iri).is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("electrolyzer")]
    #[case("https://example.com/with space")]
    #[case("https://example.com/<x>")]
    fn test_invalid_iris(#[case] iri: &str) {
        let err = VocabTerm::product(iri).unwrap_err();
        assert!(matches!(err, VocabError::InvalidIri { .. }), "{err:?}");
    }

    #[rstest]
    #[case(TermKind::Product)]
    #[case(TermKind::ModelTerm)]
    #[case(TermKind::Geoname)]
    fn test_kind_from_str(#[case] kind: TermKind) {
        assert_eq!(kind.as_str().parse::<TermKind>().unwrap(), kind);
        assert!(matches!("Product".parse::<TermKind>(), Err(VocabError::UnknownKind(_))));
    }

    #[test]
    fn test_equality_ignores_kind() {
        let a = VocabTerm::product("https://example.com/x").unwrap();
        let b = VocabTerm::unit("https://example.com/x").unwrap();
        assert_eq!(a, b);

        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[rstest]
    #[case(TermKind::Product, Some("https://vocab.sentier.dev/products/"), true)]
    #[case(TermKind::Unit, Some("https://vocab.sentier.dev/units/"), true)]
    #[case(TermKind::ModelTerm, Some("https://vocab.sentier.dev/model-terms/"), false)]
    #[case(TermKind::Flow, Some("https://vocab.sentier.dev/flows/"), true)]
    #[case(TermKind::Geoname, None, true)]
    fn test_kind_bindings(#[case] kind: TermKind, #[case] graph: Option<&str>, #[case] hierarchy: bool) {
        assert_eq!(kind.graph_url(), graph);
        assert_eq!(kind.has_hierarchy(), hierarchy);
    }

    #[test]
    fn test_serde_shape_and_validation() {
        let term = VocabTerm::model_term("https://vocab.sentier.dev/model-terms/electrolyser/capacity_factor").unwrap();
        let json = serde_json::to_value(&term).unwrap();
        assert_eq!(json["kind"], "model-term");

        let back: VocabTerm = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind(), TermKind::ModelTerm);

        let bad = serde_json::from_str::<VocabTerm>(r#"{"kind": "product", "iri": "not an iri"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_world_default() {
        let world = VocabTerm::world();
        assert_eq!(world.kind(), TermKind::Geoname);
        assert_eq!(world.iri(), WORLD_GEONAME);
        assert!(world.require_graph().is_err());
    }
}
