//! structures related to processing parameters


use std::path::PathBuf;

use serde::Serialize;

use crate::errors::Result;

/// default number of matches considered for each query
pub const DEFAULT_DISPLAY_NUM_RESULTS: usize = 3;

/// default minimal f_unique_weighted of a displayed match
pub const DEFAULT_THRESHOLD: f64 = 0.01;

//===========================================================

/// parameters of the ranked display of gather results
#[derive(Clone, Debug, Serialize)]
pub struct DisplayParams {
    /// number of best matches kept by query before thresholding
    display_num_results: usize,
    /// minimal f_unique_weighted of a printed match
    threshold: f64,
    /// print only matches whose name contains this string
    match_filter: Option<String>,
}

impl Default for DisplayParams {
    fn default() -> Self {
        DisplayParams {
            display_num_results: DEFAULT_DISPLAY_NUM_RESULTS,
            threshold: DEFAULT_THRESHOLD,
            match_filter: None,
        }
    }
} // end of default for DisplayParams

impl DisplayParams {
    pub fn new(display_num_results: usize, threshold: f64, match_filter: Option<String>) -> Self {
        DisplayParams {
            display_num_results,
            threshold,
            match_filter,
        }
    }

    pub fn get_display_num_results(&self) -> usize {
        self.display_num_results
    }

    pub fn get_threshold(&self) -> f64 {
        self.threshold
    }

    pub fn get_match_filter(&self) -> Option<&str> {
        self.match_filter.as_deref()
    }

    /// returns true if the match is to be printed with respect to the name filter
    pub fn accept_match(&self, match_name: &str) -> bool {
        match &self.match_filter {
            Some(filter) => match_name.contains(filter.as_str()),
            None => true,
        }
    }

    /// a NaN threshold would silently print nothing, an infinite one too.
    pub fn is_valid(&self) -> bool {
        self.threshold.is_finite()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
} // end of impl DisplayParams

//===========================================================

/// parameters of the column listing
#[derive(Clone, Debug, Default, Serialize)]
pub struct ColumnsParams {
    /// keep only column names containing this string
    filter: Option<String>,
}

impl ColumnsParams {
    pub fn new(filter: Option<String>) -> Self {
        ColumnsParams { filter }
    }

    pub fn get_filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }
} // end of impl ColumnsParams

//===========================================================

/// parameters of the concatenation into a parquet file
#[derive(Clone, Debug, Serialize)]
pub struct ConcatParams {
    output: PathBuf,
}

impl ConcatParams {
    pub fn new(output: PathBuf) -> Self {
        ConcatParams { output }
    }

    pub fn get_output(&self) -> &PathBuf {
        &self.output
    }
} // end of impl ConcatParams

// end of mod tests
