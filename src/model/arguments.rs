//! Inputs and outputs of a model run.

use crate::store::DatasetStore;
use crate::vocab::{TermKind, VocabError, VocabTerm, Vocabulary};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArgumentError {
    #[error("Quantity `{0}` is not a finite number")]
    InvalidQuantity(String),
    #[error("`{field}` must be a {expected} term, got a {found} term")]
    WrongKind { field: &'static str, expected: TermKind, found: TermKind },
    #[error("Begin date {begin} is after end date {end}")]
    InvalidDates { begin: NaiveDate, end: NaiveDate },
    #[error(transparent)]
    Vocab(#[from] VocabError),
}

fn check_kind(field: &'static str, term: &VocabTerm, expected: TermKind) -> Result<(), ArgumentError> {
    if term.kind() != expected {
        return Err(ArgumentError::WrongKind { field, expected, found: term.kind() });
    }
    Ok(())
}

fn check_quantity(quantity: f64) -> Result<f64, ArgumentError> {
    if !quantity.is_finite() {
        return Err(ArgumentError::InvalidQuantity(quantity.to_string()));
    }
    Ok(quantity)
}

pub(crate) fn parse_quantity(text: &str) -> Result<f64, ArgumentError> {
    let quantity = text
        .trim()
        .parse::<f64>()
        .map_err(|_| ArgumentError::InvalidQuantity(text.to_string()))?;
    check_quantity(quantity).map_err(|_| ArgumentError::InvalidQuantity(text.to_string()))
}

/// Jan 1 five years back and Jan 1 four years ahead of `today`.
pub fn default_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let jan_first = |year: i32| NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(today);
    (jan_first(today.year() - 5), jan_first(today.year() + 4))
}

/// Fields shared by demands and flows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exchange {
    quantity: f64,
    unit: VocabTerm,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<Vec<String>>,
    spatial_context: VocabTerm,
    #[serde(skip_serializing_if = "Option::is_none")]
    begin_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<NaiveDate>,
}

impl Exchange {
    fn new(quantity: f64, unit: VocabTerm) -> Result<Self, ArgumentError> {
        check_kind("unit", &unit, TermKind::Unit)?;
        Ok(Self {
            quantity: check_quantity(quantity)?,
            unit,
            properties: None,
            spatial_context: VocabTerm::world(),
            begin_date: None,
            end_date: None,
        })
    }

    fn set_spatial_context(&mut self, location: VocabTerm) -> Result<(), ArgumentError> {
        check_kind("spatial_context", &location, TermKind::Geoname)?;
        self.spatial_context = location;
        Ok(())
    }

    fn set_dates(&mut self, begin: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), ArgumentError> {
        if let (Some(begin), Some(end)) = (begin, end) {
            if begin > end {
                return Err(ArgumentError::InvalidDates { begin, end });
            }
        }
        self.begin_date = begin;
        self.end_date = end;
        Ok(())
    }

    /// The explicit dates, with gaps filled from the default window around `today`.
    pub fn dates_or_default(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let (default_begin, default_end) = default_window(today);
        // Explicit dates are kept; a lone explicit date drags the defaulted one past it.
        match (self.begin_date, self.end_date) {
            (Some(begin), Some(end)) => (begin, end),
            (Some(begin), None) => (begin, default_end.max(begin)),
            (None, Some(end)) => (default_begin.min(end), end),
            (None, None) => (default_begin, default_end),
        }
    }

    fn fill_default_window(&mut self, today: NaiveDate) {
        let (begin, end) = self.dates_or_default(today);
        self.begin_date = Some(begin);
        self.end_date = Some(end);
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn unit(&self) -> &VocabTerm {
        &self.unit
    }

    pub fn properties(&self) -> Option<&[String]> {
        self.properties.as_deref()
    }

    pub fn spatial_context(&self) -> &VocabTerm {
        &self.spatial_context
    }

    pub fn begin_date(&self) -> Option<NaiveDate> {
        self.begin_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }
}

macro_rules! exchange_builders {
    ($ty:ident) => {
        impl $ty {
            pub fn with_properties(mut self, properties: Vec<String>) -> Self {
                self.exchange.properties = Some(properties);
                self
            }

            pub fn with_spatial_context(mut self, location: VocabTerm) -> Result<Self, ArgumentError> {
                self.exchange.set_spatial_context(location)?;
                Ok(self)
            }

            pub fn with_dates(mut self, begin: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, ArgumentError> {
                self.exchange.set_dates(begin, end)?;
                Ok(self)
            }

            /// Fills missing dates with the default window around `today`.
            pub fn with_default_window(mut self, today: NaiveDate) -> Self {
                self.exchange.fill_default_window(today);
                self
            }
        }

        impl std::ops::Deref for $ty {
            type Target = Exchange;

            fn deref(&self) -> &Exchange {
                &self.exchange
            }
        }
    };
}

/// What a model is asked to produce.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Demand {
    product: VocabTerm,
    #[serde(flatten)]
    exchange: Exchange,
}

impl Demand {
    pub fn new(product: VocabTerm, quantity: f64, unit: VocabTerm) -> Result<Self, ArgumentError> {
        check_kind("product", &product, TermKind::Product)?;
        Ok(Self { product, exchange: Exchange::new(quantity, unit)? })
    }

    /// Like [`Demand::new`] with the quantity given as text.
    pub fn try_new(product: VocabTerm, quantity: &str, unit: VocabTerm) -> Result<Self, ArgumentError> {
        Self::new(product, parse_quantity(quantity)?, unit)
    }

    pub fn product(&self) -> &VocabTerm {
        &self.product
    }
}

exchange_builders!(Demand);

impl fmt::Display for Demand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> of <{}>", self.exchange.quantity, self.exchange.unit.iri(), self.product.iri())
    }
}

/// An exchange a model reports back besides its demands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flow {
    flow: VocabTerm,
    #[serde(flatten)]
    exchange: Exchange,
}

impl Flow {
    pub fn new(flow: VocabTerm, quantity: f64, unit: VocabTerm) -> Result<Self, ArgumentError> {
        check_kind("flow", &flow, TermKind::Flow)?;
        Ok(Self { flow, exchange: Exchange::new(quantity, unit)? })
    }

    pub fn try_new(flow: VocabTerm, quantity: &str, unit: VocabTerm) -> Result<Self, ArgumentError> {
        Self::new(flow, parse_quantity(quantity)?, unit)
    }

    pub fn flow(&self) -> &VocabTerm {
        &self.flow
    }
}

exchange_builders!(Flow);

/// How a model run is carried out and where its data comes from.
#[derive(Clone)]
pub struct RunConfig {
    pub num_samples: usize,
    pub data_source: Arc<dyn DatasetStore>,
    pub vocabulary: Arc<Vocabulary>,
}

impl RunConfig {
    pub const DEFAULT_NUM_SAMPLES: usize = 1000;

    pub fn new(data_source: Arc<dyn DatasetStore>, vocabulary: Arc<Vocabulary>) -> Self {
        Self { num_samples: Self::DEFAULT_NUM_SAMPLES, data_source, vocabulary }
    }

    pub fn with_num_samples(mut self, num_samples: usize) -> Self {
        self.num_samples = num_samples;
        self
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("num_samples", &self.num_samples)
            .field("vocabulary", &self.vocabulary)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const PEM: &str = "https://vocab.sentier.dev/products/pem-electrolyzer";
    const KG: &str = "https://vocab.sentier.dev/units/unit/KiloGM";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn demand() -> Demand {
        Demand::new(VocabTerm::product(PEM).unwrap(), 2.0, VocabTerm::unit(KG).unwrap()).unwrap()
    }

    #[rstest]
    #[case("1.5", 1.5)]
    #[case(" 42 ", 42.0)]
    #[case("1e3", 1000.0)]
    fn test_quantity_parsing(#[case] text: &str, #[case] expected: f64) {
        let d = Demand::try_new(VocabTerm::product(PEM).unwrap(), text, VocabTerm::unit(KG).unwrap()).unwrap();
        assert_eq!(d.quantity(), expected);
    }

    #[rstest]
    #[case("two")]
    #[case("")]
    #[case("NaN")]
    #[case("inf")]
    fn test_bad_quantities(#[case] text: &str) {
        let err = Demand::try_new(VocabTerm::product(PEM).unwrap(), text, VocabTerm::unit(KG).unwrap()).unwrap_err();
        assert_eq!(err, ArgumentError::InvalidQuantity(text.to_string()));
    }

    #[test]
    fn test_term_kinds_are_checked() {
        let unit = VocabTerm::unit(KG).unwrap();
        let err = Demand::new(unit.clone(), 1.0, unit.clone()).unwrap_err();
        assert!(matches!(err, ArgumentError::WrongKind { field: "product", .. }));

        let err = Demand::new(VocabTerm::product(PEM).unwrap(), 1.0, VocabTerm::product(PEM).unwrap()).unwrap_err();
        assert!(matches!(err, ArgumentError::WrongKind { field: "unit", .. }));

        assert!(demand().with_spatial_context(unit).is_err());
        assert!(Flow::new(VocabTerm::product(PEM).unwrap(), 1.0, VocabTerm::unit(KG).unwrap()).is_err());
    }

    #[test]
    fn test_defaults() {
        let d = demand();
        assert_eq!(d.spatial_context(), &VocabTerm::world());
        assert!(d.properties().is_none());
        assert!(d.begin_date().is_none());
    }

    #[test]
    fn test_default_window() {
        let d = demand().with_default_window(date(2024, 6, 15));
        assert_eq!(d.begin_date(), Some(date(2019, 1, 1)));
        assert_eq!(d.end_date(), Some(date(2028, 1, 1)));

        let explicit = demand()
            .with_dates(Some(date(2022, 3, 1)), None)
            .unwrap()
            .with_default_window(date(2024, 6, 15));
        assert_eq!(explicit.begin_date(), Some(date(2022, 3, 1)));
        assert_eq!(explicit.end_date(), Some(date(2028, 1, 1)));
    }

    #[rstest]
    #[case(Some(date(2035, 1, 1)), None, date(2035, 1, 1), date(2035, 1, 1))]
    #[case(None, Some(date(2015, 1, 1)), date(2015, 1, 1), date(2015, 1, 1))]
    #[case(None, Some(date(2021, 6, 1)), date(2019, 1, 1), date(2021, 6, 1))]
    #[case(Some(date(2010, 1, 1)), Some(date(2012, 1, 1)), date(2010, 1, 1), date(2012, 1, 1))]
    fn test_explicit_dates_are_kept(
        #[case] begin: Option<NaiveDate>,
        #[case] end: Option<NaiveDate>,
        #[case] expected_begin: NaiveDate,
        #[case] expected_end: NaiveDate,
    ) {
        let d = demand().with_dates(begin, end).unwrap().with_default_window(date(2024, 6, 15));
        assert_eq!(d.begin_date(), Some(expected_begin));
        assert_eq!(d.end_date(), Some(expected_end));
    }

    #[test]
    fn test_dates_must_be_ordered() {
        let err = demand().with_dates(Some(date(2030, 1, 1)), Some(date(2020, 1, 1))).unwrap_err();
        assert!(matches!(err, ArgumentError::InvalidDates { .. }));
    }

    #[test]
    fn test_serializes_flat() {
        let value = serde_json::to_value(demand()).unwrap();
        assert_eq!(value["product"]["iri"], PEM);
        assert_eq!(value["quantity"], 2.0);
        assert_eq!(value["spatial_context"]["iri"], crate::vocab::WORLD_GEONAME);
        assert!(value.get("begin_date").is_none());
    }
}
