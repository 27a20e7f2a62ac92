//! Conversion factors between unit terms, pivoting on shared QUDT quantity kinds.
pub mod conversion;
mod error;

pub use conversion::UnitConverter;
pub use error::ConversionError;
