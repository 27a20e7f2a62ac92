//! Breadth-first closure over taxonomy edges.
//!
//! Taxonomy queries return flat `(from, to)` pairs. This module turns them into an
//! ordered list of reachable terms, nearest first, which callers use as a priority order.
pub mod resolver;

pub use resolver::{resolve_closure, HierarchyEdge};
