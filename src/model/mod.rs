//! Model declarations, alias handling and dataset retrieval.

pub mod aliases;
pub mod arguments;
pub mod base;
mod error;
pub mod merge;

pub use aliases::{check_declarations, AliasMap, AliasTable, AliasValue, RESERVED_NAMES};
pub use arguments::{ArgumentError, Demand, Exchange, Flow, RunConfig};
pub use base::{Model, ModelBase, ModelData, ModelStage};
pub use error::{MergeError, ModelError};
pub use merge::{merge_datasets_to_tables, merge_tables};
