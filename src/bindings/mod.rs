//! Foreign-language entry points.
pub mod python;
