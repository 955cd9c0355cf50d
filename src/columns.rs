//! listing of the columns of merged gather files

use std::io::Write;

use crate::errors::Result;
use crate::table::LazyTable;
use crate::utils::parameters::ColumnsParams;

/// Keeps names containing the filter, in their order. No filter keeps everything.
pub fn filter_columns(names: &[String], filter: Option<&str>) -> Vec<String> {
    match filter {
        Some(filter) => names.iter().filter(|name| name.contains(filter)).cloned().collect(),
        None => names.to_vec(),
    }
} // end of filter_columns

/// Prints the (filtered) column names of the merged schema as a json array.
/// Only schemas are read, not rows. Returns the names printed.
pub fn display_columns<W: Write>(table: &LazyTable, params: &ColumnsParams, out: &mut W) -> Result<Vec<String>> {
    writeln!(out, "** showing columns for given CSV(s)")?;
    let mut columns = table.column_names();
    if let Some(filter) = params.get_filter() {
        writeln!(out, "** filtering on substr matches to '{}'", filter)?;
        columns = filter_columns(&columns, Some(filter));
    }
    log::debug!("nb columns displayed : {}", columns.len());
    writeln!(out, "{}", serde_json::to_string(&columns)?)?;
    Ok(columns)
} // end of display_columns

// end of mod tests
