//! This file contains detection of the format of gather result files.
//! The format is chosen only from the file name suffix, contents are never sniffed.

use std::path::Path;

use strum_macros::Display;

use crate::errors::{ExploreError, Result};

/// The two tabular formats we can read. Parquet is also the format we write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SourceFormat {
    #[strum(serialize = "csv")]
    Csv,
    #[strum(serialize = "parquet")]
    Parquet,
}

impl SourceFormat {
    /// returns the format of a file from its suffix.
    /// Anything else than .csv or .parquet is a fatal error carrying the file name.
    pub fn from_path(path: &Path) -> Result<Self> {
        let filename = path.to_string_lossy();
        if filename.ends_with(".csv") {
            Ok(SourceFormat::Csv)
        } else if filename.ends_with(".parquet") {
            Ok(SourceFormat::Parquet)
        } else {
            log::error!("unsupported file suffix : {}", filename);
            Err(ExploreError::UnsupportedFormat(filename.into_owned()))
        }
    }
} // end of impl SourceFormat

/// check we are asked to write a parquet file
pub fn check_parquet_destination(path: &Path) -> Result<()> {
    match SourceFormat::from_path(path)? {
        SourceFormat::Parquet => Ok(()),
        SourceFormat::Csv => Err(ExploreError::UnsupportedFormat(
            path.to_string_lossy().into_owned(),
        )),
    }
} // end of check_parquet_destination

// end of mod tests
