//! The base every model is built on: declarations, aliases and data retrieval.

use super::aliases::{check_declarations, AliasMap, AliasTable, AliasValue};
use super::arguments::{Demand, Flow, RunConfig};
use super::error::ModelError;
use crate::store::{Dataset, DatasetKind, StoreError, ValidityWindow};
use crate::vocab::VocabTerm;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// How far construction has progressed. A [`ModelBase`] that exists is always `Aliased`;
/// the earlier stages are only observable through errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ModelStage {
    Constructed,
    Validated,
    Aliased,
}

/// Datasets found for one retrieval, kept apart by how they matched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelData {
    #[serde(rename = "exactMatch")]
    pub exact_match: Vec<Dataset>,
    pub broader: Vec<Dataset>,
    pub narrower: Vec<Dataset>,
}

impl ModelData {
    pub fn len(&self) -> usize {
        self.exact_match.len() + self.broader.len() + self.narrower.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn buckets_mut(&mut self) -> [&mut Vec<Dataset>; 3] {
        [&mut self.exact_match, &mut self.broader, &mut self.narrower]
    }
}

pub struct ModelBase {
    demand: Demand,
    run_config: RunConfig,
    needs: AliasMap,
    provides: AliasMap,
    aliases: AliasTable,
    window: ValidityWindow,
    stage: ModelStage,
}

impl ModelBase {
    /// Builds a model base, defaulting the demand's dates around today.
    pub fn new(demand: Demand, run_config: RunConfig, needs: AliasMap, provides: AliasMap) -> Result<Self, ModelError> {
        Self::new_at(demand, run_config, needs, provides, Local::now().date_naive())
    }

    /// Same as [`ModelBase::new`] with an explicit "today".
    pub fn new_at(
        demand: Demand,
        run_config: RunConfig,
        needs: AliasMap,
        provides: AliasMap,
        today: NaiveDate,
    ) -> Result<Self, ModelError> {
        let (valid_from, valid_to) = demand.dates_or_default(today);
        let mut base = Self {
            window: ValidityWindow::new(valid_from, valid_to)?,
            demand: demand.with_default_window(today),
            run_config,
            needs,
            provides,
            aliases: AliasTable::new(),
            stage: ModelStage::Constructed,
        };
        base.validate()?;
        base.install_aliases()?;
        tracing::debug!("Model for {} ready with {} aliases", base.demand, base.aliases.len());
        Ok(base)
    }

    fn validate(&mut self) -> Result<(), ModelError> {
        check_declarations(&self.needs, &self.provides)?;
        self.stage = ModelStage::Validated;
        Ok(())
    }

    fn install_aliases(&mut self) -> Result<(), ModelError> {
        self.aliases.install_all(&self.needs)?;
        self.aliases.install_all(&self.provides)?;
        self.stage = ModelStage::Aliased;
        Ok(())
    }

    pub fn stage(&self) -> ModelStage {
        self.stage
    }

    pub fn demand(&self) -> &Demand {
        &self.demand
    }

    pub fn run_config(&self) -> &RunConfig {
        &self.run_config
    }

    pub fn needs(&self) -> &AliasMap {
        &self.needs
    }

    pub fn provides(&self) -> &AliasMap {
        &self.provides
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn get(&self, alias: &str) -> Result<&AliasValue, ModelError> {
        self.aliases.get(alias)
    }

    pub fn set(&mut self, alias: &str, value: impl Into<AliasValue>) -> Result<AliasValue, ModelError> {
        self.aliases.set(alias, value)
    }

    /// Combined IRI -> alias map. Where a term is both needed and provided under
    /// different aliases, the `needs` alias is used.
    pub fn alias_iri_map(&self) -> HashMap<String, String> {
        let mut map = self.provides.iri_map();
        map.extend(self.needs.iri_map());
        map
    }

    /// The demand's validity window.
    pub fn demand_window(&self) -> ValidityWindow {
        self.window
    }

    /// Datasets of `kind` for `product`, its broader terms and its narrower terms.
    pub fn get_model_data(&self, product: &VocabTerm, kind: DatasetKind) -> Result<ModelData, ModelError> {
        self.retrieve(&[product], kind, None)
    }

    /// [`ModelBase::get_model_data`] keeping only datasets whose validity overlaps `window`.
    pub fn get_model_data_within(
        &self,
        product: &VocabTerm,
        kind: DatasetKind,
        window: &ValidityWindow,
    ) -> Result<ModelData, ModelError> {
        self.retrieve(&[product], kind, Some(window))
    }

    /// Retrieval for every declared need at once.
    pub fn get_needs_data(&self, kind: DatasetKind) -> Result<ModelData, ModelError> {
        let needs: Vec<&VocabTerm> = self.needs.terms().collect();
        self.retrieve(&needs, kind, None)
    }

    fn retrieve(
        &self,
        products: &[&VocabTerm],
        kind: DatasetKind,
        window: Option<&ValidityWindow>,
    ) -> Result<ModelData, ModelError> {
        let vocabulary = &self.run_config.vocabulary;
        let exact: Vec<String> = products.iter().map(|p| p.iri().to_string()).collect();
        let mut broader = Vec::new();
        let mut narrower = Vec::new();
        for product in products {
            extend_unique(&mut broader, vocabulary.broader_iris(product, false)?);
            extend_unique(&mut narrower, vocabulary.narrower_iris(product, false)?);
        }

        let store = &self.run_config.data_source;
        // Buckets follow the closure order, nearest terms first.
        let find = |order: &[String]| -> Result<Vec<Dataset>, StoreError> {
            let set: HashSet<String> = order.iter().cloned().collect();
            let mut found = match window {
                Some(window) => store.find_valid(kind, &set, window)?,
                None => store.find(kind, &set)?,
            };
            let rank: HashMap<&str, usize> = order.iter().enumerate().map(|(i, iri)| (iri.as_str(), i)).collect();
            found.sort_by_key(|d| d.product().and_then(|p| rank.get(p.iri()).copied()).unwrap_or(usize::MAX));
            Ok(found)
        };
        let mut data = ModelData { exact_match: find(&exact)?, broader: find(&broader)?, narrower: find(&narrower)? };
        tracing::info!(
            "Found {} exact, {} broader and {} narrower {:?} datasets",
            data.exact_match.len(),
            data.broader.len(),
            data.narrower.len(),
            kind
        );

        let aliases = self.alias_iri_map();
        for bucket in data.buckets_mut() {
            for dataset in bucket.iter_mut() {
                dataset.apply_aliases(&aliases);
            }
        }
        Ok(data)
    }
}

fn extend_unique(order: &mut Vec<String>, iris: Vec<String>) {
    for iri in iris {
        if !order.contains(&iri) {
            order.push(iri);
        }
    }
}

impl std::fmt::Debug for ModelBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBase")
            .field("demand", &self.demand)
            .field("stage", &self.stage)
            .field("aliases", &self.aliases.aliases().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// A concrete model. Implementors own a [`ModelBase`] and provide the run itself.
pub trait Model {
    fn base(&self) -> &ModelBase;

    /// Checks on retrieved data before running. Accepts everything by default.
    fn data_validity_checks(&self) -> Result<(), ModelError> {
        Ok(())
    }

    fn run(&mut self) -> Result<(Vec<Demand>, Vec<Flow>), ModelError>;

    /// Runs the validity checks, then the model.
    fn execute(&mut self) -> Result<(Vec<Demand>, Vec<Flow>), ModelError> {
        self.data_validity_checks()?;
        let (demands, flows) = self.run()?;
        tracing::info!("Model run produced {} demands and {} flows", demands.len(), flows.len());
        Ok((demands, flows))
    }
}
