//! Lookups against the remote vocabulary service.

use super::error::VocabError;
use super::http::HttpEndpoint;
use super::queries;
use super::sparql::{binding_value, convert_binding, RdfTerm, SparqlEndpoint};
use super::term::{TermKind, TriplePosition, VocabTerm};
use crate::cache::BoundedCache;
use crate::config::Settings;
use crate::hierarchy::{resolve_closure, HierarchyEdge};
use std::sync::Arc;

pub const DEFAULT_TRIPLE_LIMIT: usize = 25;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    pub subject: RdfTerm,
    pub predicate: RdfTerm,
    pub object: RdfTerm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Broader,
    Narrower,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LabelKey {
    iri: String,
    kind: TermKind,
    graph: Option<&'static str>,
    language: String,
}

/// Client for the sentier.dev vocabularies.
///
/// Owns the query endpoint and the label cache. Cheap to share behind an `Arc`.
pub struct Vocabulary {
    endpoint: Arc<dyn SparqlEndpoint>,
    language: String,
    fallback_language: String,
    labels: BoundedCache<LabelKey, String>,
}

impl Vocabulary {
    /// English labels, default cache size.
    pub fn new(endpoint: Arc<dyn SparqlEndpoint>) -> Self {
        Self::with_settings(endpoint, &Settings::default())
    }

    pub fn with_settings(endpoint: Arc<dyn SparqlEndpoint>, settings: &Settings) -> Self {
        Self {
            endpoint,
            language: settings.language_prefix(),
            fallback_language: settings.fallback_language.chars().take(2).collect::<String>().to_lowercase(),
            labels: BoundedCache::new(settings.label_cache_size),
        }
    }

    /// Talks to `settings.endpoint` over HTTP.
    pub fn from_settings(settings: &Settings) -> Result<Self, VocabError> {
        let endpoint = HttpEndpoint::from_settings(settings)?;
        Ok(Self::with_settings(Arc::new(endpoint), settings))
    }

    pub fn endpoint(&self) -> &Arc<dyn SparqlEndpoint> {
        &self.endpoint
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Triples from the term's graph where the term sits at `position`.
    ///
    /// `limit: None` asks for every triple.
    pub fn triples(&self, term: &VocabTerm, position: TriplePosition, limit: Option<usize>) -> Result<Vec<Triple>, VocabError> {
        let graph = term.require_graph()?;
        let query = queries::triples(graph, term.iri(), position, limit);
        let rows = self.run(&query)?;
        tracing::info!("Retrieved {} triples from {}", rows.len(), self.endpoint.location());

        rows.iter()
            .map(|row| -> Result<Triple, VocabError> {
                let part = |var: &str| {
                    row.get(var)
                        .ok_or_else(|| VocabError::MalformedResponse(format!("Missing variable '?{var}' in binding row")))
                        .and_then(convert_binding)
                };
                Ok(Triple { subject: part("s")?, predicate: part("p")?, object: part("o")? })
            })
            .collect()
    }

    /// Every triple for the term, without a limit.
    pub fn graph(&self, term: &VocabTerm, position: TriplePosition) -> Result<Vec<Triple>, VocabError> {
        self.triples(term, position, None)
    }

    /// Terms above `term`, nearest first.
    pub fn broader(&self, term: &VocabTerm, include_self: bool) -> Result<Vec<VocabTerm>, VocabError> {
        Ok(self.closure(term, Direction::Broader, include_self)?.into_iter().map(|iri| term.sibling(iri)).collect())
    }

    /// Same as [`Vocabulary::broader`] but returns bare IRIs.
    pub fn broader_iris(&self, term: &VocabTerm, include_self: bool) -> Result<Vec<String>, VocabError> {
        self.closure(term, Direction::Broader, include_self)
    }

    /// Terms below `term`, nearest first.
    pub fn narrower(&self, term: &VocabTerm, include_self: bool) -> Result<Vec<VocabTerm>, VocabError> {
        Ok(self.closure(term, Direction::Narrower, include_self)?.into_iter().map(|iri| term.sibling(iri)).collect())
    }

    pub fn narrower_iris(&self, term: &VocabTerm, include_self: bool) -> Result<Vec<String>, VocabError> {
        self.closure(term, Direction::Narrower, include_self)
    }

    fn closure(&self, term: &VocabTerm, direction: Direction, include_self: bool) -> Result<Vec<String>, VocabError> {
        if !term.kind().has_hierarchy() {
            return Ok(if include_self { vec![term.iri().to_string()] } else { Vec::new() });
        }

        let graph = term.require_graph()?;
        let query = match direction {
            Direction::Broader => queries::broader(graph, term.iri()),
            Direction::Narrower => queries::narrower(graph, term.iri()),
        };
        let edges = self
            .run(&query)?
            .iter()
            .map(|row| -> Result<HierarchyEdge, VocabError> {
                Ok((binding_value(row, "s")?.to_string(), binding_value(row, "o")?.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        tracing::info!("Retrieved {} hierarchy edges from {}", edges.len(), self.endpoint.location());

        Ok(resolve_closure(&edges, term.iri(), include_self))
    }

    /// Human-readable `<iri>: label (kind)` string.
    ///
    /// Tries the configured language, then the fallback language, then renders a
    /// "Missing label" placeholder. Results are cached.
    pub fn display(&self, term: &VocabTerm) -> Result<String, VocabError> {
        let key = LabelKey {
            iri: term.iri().to_string(),
            kind: term.kind(),
            graph: term.graph_url(),
            language: self.language.clone(),
        };
        self.labels.get_or_try_insert(key, |key| -> Result<String, VocabError> {
            let Some(graph) = key.graph else {
                return Ok(missing_label(&key.iri, key.kind));
            };
            let mut label = self.pref_label(graph, &key.iri, &key.language)?;
            if label.is_none() && self.fallback_language != key.language {
                label = self.pref_label(graph, &key.iri, &self.fallback_language)?;
            }
            Ok(match label {
                Some(label) => format!("<{}>: {} ({})", key.iri, label, key.kind),
                None => missing_label(&key.iri, key.kind),
            })
        })
    }

    fn pref_label(&self, graph: &str, iri: &str, language: &str) -> Result<Option<String>, VocabError> {
        let rows = self.run(&queries::pref_label(graph, iri, language))?;
        match rows.first() {
            Some(row) => Ok(Some(binding_value(row, "label")?.to_string())),
            None => Ok(None),
        }
    }

    pub(crate) fn run(&self, query: &str) -> Result<Vec<super::sparql::BindingRow>, VocabError> {
        tracing::debug!("Executing query:\n{query}");
        self.endpoint.execute_query(query)
    }
}

impl std::fmt::Debug for Vocabulary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vocabulary")
            .field("endpoint", &self.endpoint.location())
            .field("language", &self.language)
            .field("cached_labels", &self.labels.len())
            .finish()
    }
}

fn missing_label(iri: &str, kind: TermKind) -> String {
    format!("<{iri}>: Missing label ({kind})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::sparql::BindingValue;
    use crate::vocab::testing::{hierarchy_rows, row, ScriptedEndpoint};

    const ELECTROLYZER: &str = "https://vocab.sentier.dev/products/electrolyzer";
    const PEM: &str = "https://vocab.sentier.dev/products/pem-electrolyzer";
    const AEC: &str = "https://vocab.sentier.dev/products/aec-electrolyzer";

    fn vocabulary(endpoint: ScriptedEndpoint) -> (Vocabulary, Arc<ScriptedEndpoint>) {
        let endpoint = Arc::new(endpoint);
        (Vocabulary::new(endpoint.clone()), endpoint)
    }

    fn electrolyzer_taxonomy() -> ScriptedEndpoint {
        ScriptedEndpoint::new()
            .on(&["skos:narrower+", &format!("<{ELECTROLYZER}>")], hierarchy_rows(&[(ELECTROLYZER, PEM), (ELECTROLYZER, AEC)]))
            .on(&["skos:broader+", &format!("<{PEM}>")], hierarchy_rows(&[(PEM, ELECTROLYZER)]))
    }

    #[test]
    fn test_narrower_in_breadth_first_order() {
        let (vocab, _) = vocabulary(electrolyzer_taxonomy());
        let term = VocabTerm::product(ELECTROLYZER).unwrap();

        assert_eq!(vocab.narrower_iris(&term, false).unwrap(), vec![PEM, AEC]);
        assert_eq!(vocab.narrower_iris(&term, true).unwrap(), vec![ELECTROLYZER, PEM, AEC]);

        let terms = vocab.narrower(&term, false).unwrap();
        assert!(terms.iter().all(|t| t.kind() == TermKind::Product));
        assert_eq!(terms[0].iri(), PEM);
    }

    #[test]
    fn test_broader() {
        let (vocab, _) = vocabulary(electrolyzer_taxonomy());
        let pem = VocabTerm::product(PEM).unwrap();
        assert_eq!(vocab.broader_iris(&pem, false).unwrap(), vec![ELECTROLYZER]);
        assert!(vocab.narrower_iris(&pem, false).unwrap().is_empty());
    }

    #[test]
    fn test_model_terms_skip_the_remote_service() {
        let (vocab, endpoint) = vocabulary(ScriptedEndpoint::new());
        let term = VocabTerm::model_term("https://vocab.sentier.dev/model-terms/electrolyser/capacity_factor").unwrap();

        assert!(vocab.broader(&term, false).unwrap().is_empty());
        assert!(vocab.narrower_iris(&term, false).unwrap().is_empty());
        assert_eq!(vocab.narrower(&term, true).unwrap(), vec![term.clone()]);
        assert_eq!(vocab.broader_iris(&term, true).unwrap(), vec![term.iri().to_string()]);
        assert_eq!(endpoint.calls(), 0);
    }

    #[test]
    fn test_geonames_have_no_graph() {
        let (vocab, endpoint) = vocabulary(ScriptedEndpoint::new());
        let world = VocabTerm::world();
        assert!(matches!(vocab.triples(&world, TriplePosition::Subject, Some(25)), Err(VocabError::MissingGraph { .. })));
        assert!(matches!(vocab.broader_iris(&world, false), Err(VocabError::MissingGraph { .. })));
        assert_eq!(
            vocab.display(&world).unwrap(),
            "<https://sws.geonames.org/6295630/>: Missing label (geoname)"
        );
        assert_eq!(endpoint.calls(), 0);
    }

    #[test]
    fn test_triples_conversion() {
        let endpoint = ScriptedEndpoint::new().on(
            &["VALUES ?s", "LIMIT 25"],
            vec![row(&[
                ("s", BindingValue::uri(ELECTROLYZER)),
                ("p", BindingValue::uri("http://www.w3.org/2004/02/skos/core#prefLabel")),
                ("o", BindingValue::literal("electrolyzer", Some("en"))),
            ])],
        );
        let (vocab, _) = vocabulary(endpoint);
        let term = VocabTerm::product(ELECTROLYZER).unwrap();

        let triples = vocab.triples(&term, TriplePosition::Subject, Some(DEFAULT_TRIPLE_LIMIT)).unwrap();
        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].subject, RdfTerm::Iri(ELECTROLYZER.into()));
        assert!(triples[0].object.is_literal());

        // Unbounded queries carry no LIMIT clause and so do not match the rule above.
        assert!(vocab.graph(&term, TriplePosition::Subject).unwrap().is_empty());
    }

    #[test]
    fn test_triples_missing_value_is_malformed() {
        let endpoint = ScriptedEndpoint::new().on(
            &["VALUES ?s"],
            vec![row(&[
                ("s", BindingValue::uri(ELECTROLYZER)),
                ("p", BindingValue { term_type: Some("uri".into()), ..Default::default() }),
                ("o", BindingValue::uri(PEM)),
            ])],
        );
        let (vocab, _) = vocabulary(endpoint);
        let term = VocabTerm::product(ELECTROLYZER).unwrap();
        assert!(matches!(vocab.triples(&term, TriplePosition::Subject, None), Err(VocabError::MalformedResponse(_))));
    }

    #[test]
    fn test_display_falls_back_to_english_and_caches() {
        let endpoint = ScriptedEndpoint::new()
            .on(&["skos:prefLabel", "'en'"], vec![row(&[("label", BindingValue::literal("electrolyzer", Some("en")))])]);
        let endpoint = Arc::new(endpoint);
        let settings = Settings { language: "de".into(), ..Settings::default() };
        let vocab = Vocabulary::with_settings(endpoint.clone(), &settings);
        let term = VocabTerm::product(ELECTROLYZER).unwrap();

        let label = vocab.display(&term).unwrap();
        assert_eq!(label, format!("<{ELECTROLYZER}>: electrolyzer (product)"));
        assert_eq!(endpoint.calls(), 2); // German miss, English hit

        assert_eq!(vocab.display(&term).unwrap(), label);
        assert_eq!(endpoint.calls(), 2);
    }

    #[test]
    fn test_display_missing_label() {
        let (vocab, endpoint) = vocabulary(ScriptedEndpoint::new());
        let term = VocabTerm::unit("https://vocab.sentier.dev/units/unit/KiloW").unwrap();
        assert_eq!(
            vocab.display(&term).unwrap(),
            "<https://vocab.sentier.dev/units/unit/KiloW>: Missing label (unit)"
        );
        // Language and fallback are both English: one query.
        assert_eq!(endpoint.calls(), 1);
    }
}
