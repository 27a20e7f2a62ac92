//! Local cache of datasets keyed by kind and product.

mod error;
pub mod metadata;
pub mod persistence;
pub mod registry;
pub mod table;
pub mod types;

pub use error::StoreError;
pub use metadata::{Contributor, DatasetMetadata, License};
pub use persistence::JsonLinesStore;
pub use registry::{DatasetStore, MemoryStore};
pub use table::{Cell, Column, DataTable};
pub use types::{ColumnDescriptor, Dataset, DatasetBuilder, DatasetKind, ValidityWindow};
