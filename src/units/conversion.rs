use super::error::ConversionError;
use crate::cache::BoundedCache;
use crate::config::Settings;
use crate::vocab::sparql::binding_value;
use crate::vocab::{queries, TermKind, VocabError, VocabTerm, Vocabulary};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

pub type QuantityKinds = Arc<BTreeSet<String>>;
pub type MultiplierTable = Arc<HashMap<String, f64>>;

/// Resolves unit-to-unit conversion factors from the units vocabulary.
///
/// Quantity kinds per unit, multiplier tables per quantity kind and final factors are
/// each memoised in their own LRU cache.
pub struct UnitConverter {
    vocabulary: Arc<Vocabulary>,
    quantity_kinds: BoundedCache<String, QuantityKinds>,
    multipliers: BoundedCache<String, MultiplierTable>,
    factors: BoundedCache<(String, String), f64>,
}

impl UnitConverter {
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self::with_settings(vocabulary, &Settings::default())
    }

    pub fn with_settings(vocabulary: Arc<Vocabulary>, settings: &Settings) -> Self {
        Self {
            vocabulary,
            quantity_kinds: BoundedCache::new(settings.lookup_cache_size),
            multipliers: BoundedCache::new(settings.lookup_cache_size),
            factors: BoundedCache::new(settings.conversion_cache_size),
        }
    }

    /// Number to multiply a quantity in `from` by to express it in `to`.
    ///
    /// When the units share several quantity kinds their multiplier tables are merged in
    /// IRI order and later tables win on conflicting units.
    pub fn get_conversion_factor(&self, from: &VocabTerm, to: &VocabTerm) -> Result<f64, ConversionError> {
        require_unit(from)?;
        require_unit(to)?;
        let key = (from.iri().to_string(), to.iri().to_string());
        self.factors.get_or_try_insert(key, |(from, to)| self.compute_factor(from, to))
    }

    fn compute_factor(&self, from: &str, to: &str) -> Result<f64, ConversionError> {
        let from_kinds = self.quantity_kinds_for_unit(from)?;
        let to_kinds = self.quantity_kinds_for_unit(to)?;
        let common: Vec<String> = from_kinds.intersection(&to_kinds).cloned().collect();
        if common.is_empty() {
            return Err(ConversionError::NoCommonQuantityKind { from: from.to_string(), to: to.to_string() });
        }
        tracing::debug!("Found common quantity kinds for {from} to {to}: {common:?}");

        let mut merged: HashMap<String, f64> = HashMap::new();
        for quantity_kind in &common {
            let table = self.units_for_quantity_kind(quantity_kind)?;
            merged.extend(table.iter().map(|(unit, multiplier)| (unit.clone(), *multiplier)));
        }

        let multiplier = |unit: &str| {
            merged.get(unit).copied().ok_or_else(|| ConversionError::MissingMultiplier {
                unit: unit.to_string(),
                quantity_kinds: common.clone(),
            })
        };
        let numerator = multiplier(from)?;
        let denominator = multiplier(to)?;
        if denominator == 0.0 {
            return Err(ConversionError::ZeroMultiplier { unit: to.to_string() });
        }
        Ok(numerator / denominator)
    }

    /// Quantity kinds classifying `unit`.
    pub fn quantity_kinds_for_unit(&self, unit: &str) -> Result<QuantityKinds, ConversionError> {
        self.quantity_kinds.get_or_try_insert(unit.to_string(), |unit| -> Result<QuantityKinds, ConversionError> {
            let query = queries::quantity_kinds_for_unit(units_graph()?, unit);
            let rows = self.vocabulary.run(&query)?;
            if rows.is_empty() {
                return Err(ConversionError::UnitNotFound { iri: unit.clone() });
            }
            let kinds = rows
                .iter()
                .map(|row| binding_value(row, "quantitykind").map(str::to_string))
                .collect::<Result<BTreeSet<_>, _>>()?;
            Ok(Arc::new(kinds))
        })
    }

    /// Every unit under `quantity_kind` with its multiplier relative to the base unit.
    pub fn units_for_quantity_kind(&self, quantity_kind: &str) -> Result<MultiplierTable, ConversionError> {
        self.multipliers.get_or_try_insert(quantity_kind.to_string(), |quantity_kind| -> Result<MultiplierTable, ConversionError> {
            let query = queries::units_for_quantity_kind(units_graph()?, quantity_kind);
            let rows = self.vocabulary.run(&query)?;
            if rows.is_empty() {
                return Err(ConversionError::QuantityKindNotFound { iri: quantity_kind.clone() });
            }
            let mut table = HashMap::with_capacity(rows.len());
            for row in &rows {
                let unit = binding_value(row, "unit")?;
                let raw = binding_value(row, "conversion")?;
                let multiplier: f64 = raw.trim().parse().map_err(|_| {
                    VocabError::MalformedResponse(format!("Conversion multiplier `{raw}` for `{unit}` is not a number"))
                })?;
                table.insert(unit.to_string(), multiplier);
            }
            Ok(Arc::new(table))
        })
    }
}

fn require_unit(term: &VocabTerm) -> Result<(), ConversionError> {
    if term.kind() == TermKind::Unit {
        Ok(())
    } else {
        Err(ConversionError::NotAUnit { iri: term.iri().to_string(), kind: term.kind() })
    }
}

fn units_graph() -> Result<&'static str, VocabError> {
    TermKind::Unit.graph_url().ok_or(VocabError::MissingGraph { kind: TermKind::Unit })
}
