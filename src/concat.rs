//! concatenation of gather files into one parquet file.
//!
//! Batches are streamed from the sources to the writer, so memory stays bounded
//! whatever the number of files.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::errors::{ExploreError, Result};
use crate::table::LazyTable;
use crate::utils::files::check_parquet_destination;
use crate::utils::parameters::ConcatParams;

// streams all batches in file, returns the number of rows written
fn stream_batches(table: &LazyTable, file: &mut File) -> Result<usize> {
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, table.get_schema().clone(), Some(props))?;
    let mut nb_rows = 0;
    for batch in table.batches() {
        let batch = batch?;
        nb_rows += batch.num_rows();
        writer.write(&batch)?;
        log::trace!("written batch, nb rows so far : {}", nb_rows);
    }
    writer.close()?;
    Ok(nb_rows)
} // end of stream_batches

/// Writes the table in a parquet file. Returns the number of rows written.
///
/// Rows go to a temporary file next to the output, renamed to output once all sources are read.
/// So output may be one of the sources, and an existing output is left untouched on failure.
pub fn write_parquet(table: &LazyTable, output: &Path) -> Result<usize> {
    check_parquet_destination(output)?;
    let dir = match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".gexplore-")
        .suffix(".parquet")
        .tempfile_in(dir)
        .map_err(|e| ExploreError::io(dir, e))?;
    log::debug!("writing rows in temporary file {:?}", tmp.path());
    match stream_batches(table, tmp.as_file_mut()) {
        Ok(nb_rows) => {
            tmp.persist(output).map_err(|e| ExploreError::io(output, e.error))?;
            log::info!("parquet file {:?} written, nb rows : {}", output, nb_rows);
            Ok(nb_rows)
        }
        Err(e) => {
            log::error!("writing {:?} failed, removing temporary file {:?}", output, tmp.path());
            if let Err(close_err) = tmp.close() {
                log::warn!("cannot remove temporary file : {}", close_err);
            }
            Err(e)
        }
    }
} // end of write_parquet

/// The concat command. The destination is checked before anything is printed.
pub fn concat<W: Write>(table: &LazyTable, params: &ConcatParams, out: &mut W) -> Result<usize> {
    let output = params.get_output();
    check_parquet_destination(output)?;
    writeln!(out, "** loading {} CSVs", table.get_sources().len())?;
    writeln!(out, "** writing parquet file '{}'", output.display())?;
    write_parquet(table, output)
} // end of concat
