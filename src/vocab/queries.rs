//! SPARQL text for the lookups the crate performs.

use super::term::TriplePosition;

const SKOS: &str = "PREFIX skos: <http://www.w3.org/2004/02/skos/core#>";
const QUDT: &str = "PREFIX qudt: <http://qudt.org/schema/qudt/>";

pub(crate) fn triples(graph: &str, iri: &str, position: TriplePosition, limit: Option<usize>) -> String {
    let mut query = format!(
        "SELECT ?s ?p ?o\nFROM <{graph}>\nWHERE {{\n    VALUES ?{var} {{ <{iri}> }}\n    ?s ?p ?o\n}}\n",
        var = position.variable()
    );
    if let Some(limit) = limit {
        query.push_str(&format!("LIMIT {limit}\n"));
    }
    query
}

/// Rows bind `?s` (broader) and `?o` (narrower) for everything below `iri`.
pub(crate) fn narrower(graph: &str, iri: &str) -> String {
    format!(
        "{SKOS}\nSELECT ?o ?s\nFROM <{graph}>\nWHERE {{\n    <{iri}> skos:narrower+ ?o .\n    ?o skos:broader ?s .\n}}\n"
    )
}

/// Rows bind `?s` (narrower) and `?o` (broader) for everything above `iri`.
pub(crate) fn broader(graph: &str, iri: &str) -> String {
    format!(
        "{SKOS}\nSELECT ?o ?s\nFROM <{graph}>\nWHERE {{\n    <{iri}> skos:broader+ ?o .\n    ?o skos:narrower ?s .\n}}\n"
    )
}

pub(crate) fn pref_label(graph: &str, iri: &str, language: &str) -> String {
    format!(
        "{SKOS}\nSELECT ?label\nFROM <{graph}>\nWHERE {{\n    <{iri}> skos:prefLabel ?label .\n    FILTER (strstarts(lang(?label), '{language}'))\n}}\n"
    )
}

pub(crate) fn quantity_kinds_for_unit(units_graph: &str, unit: &str) -> String {
    format!(
        "{SKOS}\n{QUDT}\nSELECT ?quantitykind\nFROM <{units_graph}>\nWHERE {{\n    ?quantitykind skos:inScheme <{units_graph}> .\n    <{unit}> qudt:hasQuantityKind ?quantitykind\n}}\n"
    )
}

pub(crate) fn units_for_quantity_kind(units_graph: &str, quantity_kind: &str) -> String {
    format!(
        "{SKOS}\n{QUDT}\nSELECT ?unit ?conversion\nFROM <{units_graph}>\nWHERE {{\n    ?unit qudt:hasQuantityKind <{quantity_kind}> .\n    <{quantity_kind}> skos:narrowerTransitive ?unit .\n    ?unit a skos:Concept .\n    ?unit qudt:conversionMultiplier ?conversion .\n}}\n"
    )
}
