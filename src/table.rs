//! Loading and merging of gather result files.
//!
//! Loading is done in two phases:
//! - [LazyTable::scan] builds a plan: it checks the format of every source and resolves its schema
//!   (csv type inference, parquet footer) without reading any row. The merged schema is the union of
//!   the sources schemas.
//! - [LazyTable::batches] or [LazyTable::collect] execute the plan, source after source in the given order.
//!
//! So an unsupported file or an incompatible schema is reported before anything is printed or written.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{new_null_array, ArrayRef};
use arrow::compute::cast;
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::errors::{ExploreError, Result};
use crate::utils::files::SourceFormat;

/// number of rows decoded at once from a source
pub const BATCH_SIZE: usize = 8192;

/// A source file in the plan, with its own schema.
#[derive(Debug, Clone)]
pub struct SourceScan {
    path: PathBuf,
    format: SourceFormat,
    schema: SchemaRef,
}

impl SourceScan {
    /// detect format and resolve schema of one file
    pub fn new(path: &Path) -> Result<Self> {
        let format = SourceFormat::from_path(path)?;
        let schema = match format {
            SourceFormat::Csv => {
                let mut file = File::open(path).map_err(|e| ExploreError::io(path, e))?;
                // we infer on the whole file, a float appearing late in an integer looking column must not fail decoding
                let (schema, nb_read) = Format::default().with_header(true).infer_schema(&mut file, None)?;
                log::trace!("csv schema inferred from {} records of {:?}", nb_read, path);
                Arc::new(schema)
            }
            SourceFormat::Parquet => {
                let file = File::open(path).map_err(|e| ExploreError::io(path, e))?;
                let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
                builder.schema().clone()
            }
        };
        log::debug!("source {:?}, format {}, nb columns {}", path, format, schema.fields().len());
        Ok(SourceScan {
            path: path.to_path_buf(),
            format,
            schema,
        })
    }

    pub fn get_path(&self) -> &Path {
        &self.path
    }

    pub fn get_format(&self) -> SourceFormat {
        self.format
    }

    pub fn get_schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// opens the file and returns an iterator over its record batches, in file order.
    fn open(&self) -> Result<Box<dyn Iterator<Item = Result<RecordBatch>>>> {
        log::info!("reading {} file {:?}", self.format, self.path);
        let file = File::open(&self.path).map_err(|e| ExploreError::io(&self.path, e))?;
        match self.format {
            SourceFormat::Csv => {
                let reader = ReaderBuilder::new(self.schema.clone())
                    .with_header(true)
                    .with_batch_size(BATCH_SIZE)
                    .build(file)?;
                Ok(Box::new(reader.map(|b| b.map_err(ExploreError::from))))
            }
            SourceFormat::Parquet => {
                let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
                    .with_batch_size(BATCH_SIZE)
                    .build()?;
                Ok(Box::new(reader.map(|b| b.map_err(ExploreError::from))))
            }
        }
    } // end of open
} // end of impl SourceScan

//==========================================================================================

/// unify the type of a column seen in two sources
fn unify_types(column: &str, left: &DataType, right: &DataType) -> Result<DataType> {
    if left == right {
        return Ok(left.clone());
    }
    let is_string = |t: &DataType| matches!(t, DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View);
    let unified = match (left, right) {
        (DataType::Null, other) | (other, DataType::Null) => other.clone(),
        (l, r) if is_string(l) && is_string(r) => DataType::Utf8,
        (l, r) if l.is_integer() && r.is_integer() => DataType::Int64,
        (l, r) if l.is_numeric() && r.is_numeric() => DataType::Float64,
        _ => {
            return Err(ExploreError::SchemaMismatch {
                column: column.to_string(),
                left: left.clone(),
                right: right.clone(),
            })
        }
    };
    log::debug!("column {} : unifying {} and {} into {}", column, left, right, unified);
    Ok(unified)
} // end of unify_types

/// Union of schemas. Columns are ordered by first appearance, all are nullable
/// as a column missing in a source is filled with nulls.
pub fn union_schemas<'a, I>(schemas: I) -> Result<Schema>
where
    I: IntoIterator<Item = &'a SchemaRef>,
{
    let mut fields: Vec<(String, DataType)> = Vec::new();
    for schema in schemas {
        for field in schema.fields() {
            match fields.iter_mut().find(|(name, _)| name == field.name()) {
                Some((name, data_type)) => {
                    *data_type = unify_types(name, data_type, field.data_type())?;
                }
                None => fields.push((field.name().clone(), field.data_type().clone())),
            }
        }
    }
    Ok(Schema::new(
        fields
            .into_iter()
            .map(|(name, data_type)| Field::new(name, data_type, true))
            .collect::<Vec<Field>>(),
    ))
} // end of union_schemas

/// cast and reorder columns of a batch to the merged schema, null filling missing columns.
pub fn conform_batch(batch: &RecordBatch, schema: &SchemaRef) -> Result<RecordBatch> {
    let columns = schema
        .fields()
        .iter()
        .map(|field| match batch.column_by_name(field.name()) {
            Some(column) if column.data_type() == field.data_type() => Ok(column.clone()),
            Some(column) => Ok(cast(column, field.data_type())?),
            None => Ok(new_null_array(field.data_type(), batch.num_rows())),
        })
        .collect::<Result<Vec<ArrayRef>>>()?;
    Ok(RecordBatch::try_new(schema.clone(), columns)?)
} // end of conform_batch

//==========================================================================================

/// The plan of a merge : the sources in order and the merged schema.
pub struct LazyTable {
    sources: Vec<SourceScan>,
    schema: SchemaRef,
}

impl LazyTable {
    /// builds the plan. Fails on an empty list, an unsupported suffix, an unreadable file
    /// or an incompatible schema, before any row is read.
    pub fn scan<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        if paths.is_empty() {
            return Err(ExploreError::NoSources);
        }
        // check all suffixes before opening anything
        for path in paths {
            SourceFormat::from_path(path.as_ref())?;
        }
        let sources = paths
            .iter()
            .map(|p| SourceScan::new(p.as_ref()))
            .collect::<Result<Vec<SourceScan>>>()?;
        let schema = Arc::new(union_schemas(sources.iter().map(|s| s.get_schema()))?);
        log::info!("scanned {} sources, merged schema has {} columns", sources.len(), schema.fields().len());
        Ok(LazyTable { sources, schema })
    }

    pub fn get_schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn get_sources(&self) -> &[SourceScan] {
        &self.sources
    }

    /// column names in schema order
    pub fn column_names(&self) -> Vec<String> {
        self.schema.fields().iter().map(|f| f.name().clone()).collect()
    }

    /// Iterates over batches conforming to the merged schema, sources being opened one at a time
    /// when the previous one is exhausted.
    pub fn batches(&self) -> impl Iterator<Item = Result<RecordBatch>> + '_ {
        self.sources
            .iter()
            .flat_map(move |source| -> Box<dyn Iterator<Item = Result<RecordBatch>>> {
                match source.open() {
                    Ok(batches) => {
                        let schema = self.schema.clone();
                        Box::new(batches.map(move |b| b.and_then(|b| conform_batch(&b, &schema))))
                    }
                    Err(e) => Box::new(std::iter::once(Err(e))),
                }
            })
    } // end of batches

    /// reads everything
    pub fn collect(&self) -> Result<MergedTable> {
        let batches = self.batches().collect::<Result<Vec<RecordBatch>>>()?;
        let table = MergedTable {
            schema: self.schema.clone(),
            batches,
        };
        log::info!("merged table, nb rows : {}", table.num_rows());
        Ok(table)
    }
} // end of impl LazyTable

//==========================================================================================

/// All rows of all sources, in source order then file order.
#[derive(Debug, Clone)]
pub struct MergedTable {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl MergedTable {
    /// builds a table from batches, conforming them to the union of their schemas
    pub fn from_batches(batches: Vec<RecordBatch>) -> Result<Self> {
        let schemas: Vec<SchemaRef> = batches.iter().map(|b| b.schema()).collect();
        let schema = Arc::new(union_schemas(schemas.iter())?);
        let batches = batches
            .iter()
            .map(|b| conform_batch(b, &schema))
            .collect::<Result<Vec<RecordBatch>>>()?;
        Ok(MergedTable { schema, batches })
    }

    pub fn get_schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn get_batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(|b| b.num_rows()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }
} // end of impl MergedTable

// end of mod tests
