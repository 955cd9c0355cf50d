//! errors met while loading, merging and displaying gather tables.

use std::path::PathBuf;

use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExploreError {
    /// a source or destination file is neither csv nor parquet
    #[error("unsupported file format (expecting .csv or .parquet) : {0}")]
    UnsupportedFormat(String),

    /// a column appears in two sources with types that cannot be unified
    #[error("schema mismatch on column '{column}' : {left} vs {right}")]
    SchemaMismatch {
        column: String,
        left: DataType,
        right: DataType,
    },

    #[error("no source file given")]
    NoSources,

    /// a column needed by the gather report is absent from the merged schema
    #[error("missing column in gather results : {0}")]
    MissingColumn(String),

    #[error("i/o error on {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// writing to the report output failed
    #[error("cannot write output")]
    Output(#[from] std::io::Error),

    #[error(transparent)]
    Arrow(#[from] ArrowError),

    #[error(transparent)]
    Parquet(#[from] ParquetError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ExploreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExploreError::Io {
            path: path.into(),
            source,
        }
    }
} // end of impl ExploreError

pub type Result<T> = std::result::Result<T, ExploreError>;
