//! Needs/provides declarations and the per-model alias table.

use super::error::ModelError;
use crate::store::DataTable;
use crate::vocab::VocabTerm;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Names a model owns itself; aliases may not shadow them.
pub const RESERVED_NAMES: [&str; 4] = ["demand", "run_config", "needs", "provides"];

fn is_identifier(alias: &str) -> bool {
    let mut chars = alias.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_alphabetic()) && chars.all(|c| c == '_' || c.is_alphanumeric())
}

/// Vocabulary terms declared by a model, each with a local alias.
///
/// Both directions are injective: no alias and no term appears twice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasMap {
    entries: Vec<(VocabTerm, String)>,
}

impl AliasMap {
    pub fn new(entries: Vec<(VocabTerm, String)>) -> Result<Self, ModelError> {
        let mut aliases = HashSet::new();
        let mut terms = HashSet::new();
        for (term, alias) in &entries {
            if !is_identifier(alias) {
                return Err(ModelError::InvalidAlias { alias: alias.clone() });
            }
            if !aliases.insert(alias.as_str()) {
                return Err(ModelError::DuplicateAlias { alias: alias.clone() });
            }
            if !terms.insert(term.iri()) {
                return Err(ModelError::DuplicateTerm { iri: term.iri().to_string() });
            }
        }
        Ok(Self { entries })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Reads `[{"term": {"kind": .., "iri": ..}, "alias": ..}, ..]`.
    pub fn from_json(value: &Value) -> Result<Self, ModelError> {
        let Value::Array(items) = value else {
            return Err(ModelError::WrongContainer(json_type(value).to_string()));
        };
        let entries = items
            .iter()
            .enumerate()
            .map(|(entry, item)| -> Result<(VocabTerm, String), ModelError> {
                let not_a_term = |reason: String| ModelError::NotATerm { entry, reason };
                let term_value = item.get("term").ok_or_else(|| not_a_term("missing `term`".into()))?;
                if !term_value.is_object() {
                    return Err(not_a_term(format!("`term` is a {}", json_type(term_value))));
                }
                let term: VocabTerm =
                    serde_json::from_value(term_value.clone()).map_err(|e| not_a_term(e.to_string()))?;
                let alias = item
                    .get("alias")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ModelError::InvalidAlias { alias: item.get("alias").map(Value::to_string).unwrap_or_default() })?;
                Ok((term, alias.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&VocabTerm, &str)> {
        self.entries.iter().map(|(term, alias)| (term, alias.as_str()))
    }

    pub fn terms(&self) -> impl Iterator<Item = &VocabTerm> {
        self.entries.iter().map(|(term, _)| term)
    }

    pub fn alias_for(&self, term: &VocabTerm) -> Option<&str> {
        self.entries.iter().find(|(t, _)| t == term).map(|(_, alias)| alias.as_str())
    }

    /// IRI -> alias, the mapping used to relabel dataset columns.
    pub fn iri_map(&self) -> HashMap<String, String> {
        self.iter().map(|(term, alias)| (term.iri().to_string(), alias.to_string())).collect()
    }
}

/// Checks needs and provides against each other before anything is installed.
///
/// Aliases may not be reserved names, and an alias used in both maps must name the same
/// term in each.
pub fn check_declarations(needs: &AliasMap, provides: &AliasMap) -> Result<(), ModelError> {
    for (term, alias) in needs.iter().chain(provides.iter()) {
        if RESERVED_NAMES.contains(&alias) {
            tracing::warn!("Alias `{alias}` for <{}> shadows a model field", term.iri());
            return Err(ModelError::AliasCollision {
                alias: alias.to_string(),
                existing: "a model field".to_string(),
                requested: term.iri().to_string(),
            });
        }
    }
    for (provided, alias) in provides.iter() {
        if let Some((needed, _)) = needs.iter().find(|(_, a)| *a == alias) {
            if needed.iri() != provided.iri() {
                tracing::warn!("Alias `{alias}` names <{}> in needs and <{}> in provides", needed.iri(), provided.iri());
                return Err(ModelError::AliasCollision {
                    alias: alias.to_string(),
                    existing: format!("<{}>", needed.iri()),
                    requested: provided.iri().to_string(),
                });
            }
        }
    }
    Ok(())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// What an alias currently holds. Freshly installed aliases hold their term.
#[derive(Debug, Clone, PartialEq)]
pub enum AliasValue {
    Term(VocabTerm),
    Scalar(f64),
    Text(String),
    Table(DataTable),
}

impl From<f64> for AliasValue {
    fn from(value: f64) -> Self {
        AliasValue::Scalar(value)
    }
}

impl From<DataTable> for AliasValue {
    fn from(table: DataTable) -> Self {
        AliasValue::Table(table)
    }
}

impl From<String> for AliasValue {
    fn from(text: String) -> Self {
        AliasValue::Text(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Slot {
    term: VocabTerm,
    value: AliasValue,
}

/// Alias -> (term, value) table owned by a model.
///
/// Installing an alias that is reserved or already bound to another term fails with
/// [`ModelError::AliasCollision`]. Installing the same binding twice is a no-op.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasTable {
    slots: BTreeMap<String, Slot>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&mut self, alias: &str, term: &VocabTerm) -> Result<(), ModelError> {
        if RESERVED_NAMES.contains(&alias) {
            tracing::warn!("Alias `{alias}` for <{}> shadows a model field", term.iri());
            return Err(ModelError::AliasCollision {
                alias: alias.to_string(),
                existing: "a model field".to_string(),
                requested: term.iri().to_string(),
            });
        }
        match self.slots.get(alias) {
            Some(slot) if slot.term.iri() == term.iri() => Ok(()),
            Some(slot) => {
                tracing::warn!("Alias `{alias}` is bound to <{}>, refusing <{}>", slot.term.iri(), term.iri());
                Err(ModelError::AliasCollision {
                    alias: alias.to_string(),
                    existing: format!("<{}>", slot.term.iri()),
                    requested: term.iri().to_string(),
                })
            }
            None => {
                self.slots.insert(alias.to_string(), Slot { term: term.clone(), value: AliasValue::Term(term.clone()) });
                Ok(())
            }
        }
    }

    pub fn install_all(&mut self, map: &AliasMap) -> Result<(), ModelError> {
        map.iter().try_for_each(|(term, alias)| self.install(alias, term))
    }

    pub fn get(&self, alias: &str) -> Result<&AliasValue, ModelError> {
        self.slots.get(alias).map(|slot| &slot.value).ok_or_else(|| ModelError::UnknownAlias(alias.to_string()))
    }

    /// Replaces the value held by an installed alias, returning the previous one.
    pub fn set(&mut self, alias: &str, value: impl Into<AliasValue>) -> Result<AliasValue, ModelError> {
        let slot = self.slots.get_mut(alias).ok_or_else(|| ModelError::UnknownAlias(alias.to_string()))?;
        Ok(std::mem::replace(&mut slot.value, value.into()))
    }

    pub fn term(&self, alias: &str) -> Option<&VocabTerm> {
        self.slots.get(alias).map(|slot| &slot.term)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.slots.contains_key(alias)
    }

    /// Installed aliases in sorted order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
