//! gexplore : merge and display sourmash gather results.
//!
//! Gather results (csv or parquet) from one or more runs are merged into one table, which can be
//! written to a parquet file, have its columns listed, or be displayed query by query with
//! the best matches ranked by f_unique_weighted.

pub mod columns;
pub mod concat;
pub mod errors;
pub mod format;
pub mod report;
pub mod table;
pub mod utils;

pub use errors::{ExploreError, Result};
