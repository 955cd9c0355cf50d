//! contains the ranked display of gather results.
//!
//! For each query we keep the best matches (by f_unique_weighted), report how much of the query
//! they assign, and print those above a threshold with a running coverage.
//!

use std::cmp::Ordering;
use std::io::Write;

use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Schema};
use fxhash::FxHashMap;
use rayon::prelude::*;
use strum_macros::Display;

use crate::errors::{ExploreError, Result};
use crate::format::{display_name, format_bp, percent};
use crate::table::MergedTable;
use crate::utils::parameters::DisplayParams;

/// the column whose presence identifies gather results
pub const F_UNIQUE_WEIGHTED: &str = "f_unique_weighted";
pub const QUERY_NAME: &str = "query_name";
pub const MATCH_NAME: &str = "match_name";
/// match column of older gather output
pub const OLD_MATCH_NAME: &str = "name";
pub const INTERSECT_BP: &str = "intersect_bp";

/// true if the schema has what the ranked gather report needs to be chosen.
pub fn supports_ranked_report(schema: &Schema) -> bool {
    schema.column_with_name(F_UNIQUE_WEIGHTED).is_some()
}

/// The shapes of result tables we know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ReportKind {
    /// gather output, ranked by f_unique_weighted
    #[strum(serialize = "gather")]
    Gather,
    #[strum(serialize = "unrecognized")]
    Unrecognized,
}

impl ReportKind {
    pub fn detect(schema: &Schema) -> Self {
        if supports_ranked_report(schema) {
            ReportKind::Gather
        } else {
            ReportKind::Unrecognized
        }
    }
} // end of impl ReportKind

//====================================================================

/// A match of a query, as read from a gather table
#[derive(Debug, Clone, PartialEq)]
pub struct GatherRow {
    query_name: String,
    match_name: String,
    /// fraction of the query uniquely assigned to this match, weighted by abundance
    f_unique_weighted: f64,
    /// shared base pairs between query and match. None if missing in the table.
    intersect_bp: Option<f64>,
}

impl GatherRow {
    pub fn new(query_name: &str, match_name: &str, f_unique_weighted: f64, intersect_bp: Option<f64>) -> Self {
        GatherRow {
            query_name: query_name.to_string(),
            match_name: match_name.to_string(),
            f_unique_weighted,
            intersect_bp,
        }
    }

    pub fn get_query_name(&self) -> &str {
        &self.query_name
    }

    pub fn get_match_name(&self) -> &str {
        &self.match_name
    }

    pub fn get_f_unique_weighted(&self) -> f64 {
        self.f_unique_weighted
    }

    pub fn get_intersect_bp(&self) -> Option<f64> {
        self.intersect_bp
    }
} // end of impl GatherRow

/// finds a column or fails with MissingColumn
fn column_index(schema: &Schema, name: &str) -> Result<usize> {
    schema
        .index_of(name)
        .map_err(|_| ExploreError::MissingColumn(name.to_string()))
}

/// Extracts gather rows from the merged table, in table order.
/// Rows without query name or without a usable f_unique_weighted cannot be ranked and are skipped.
pub fn gather_rows(table: &MergedTable) -> Result<Vec<GatherRow>> {
    let schema = table.get_schema();
    let query_idx = column_index(schema, QUERY_NAME)?;
    let match_idx = match schema.index_of(MATCH_NAME) {
        Ok(idx) => idx,
        Err(_) => {
            log::info!("no column {}, using column {} for match names", MATCH_NAME, OLD_MATCH_NAME);
            column_index(schema, OLD_MATCH_NAME).map_err(|_| ExploreError::MissingColumn(MATCH_NAME.to_string()))?
        }
    };
    let f_idx = column_index(schema, F_UNIQUE_WEIGHTED)?;
    let bp_idx = column_index(schema, INTERSECT_BP)?;
    //
    let mut rows = Vec::<GatherRow>::with_capacity(table.num_rows());
    let mut nb_skipped = 0;
    for batch in table.get_batches() {
        let queries = cast(batch.column(query_idx), &DataType::Utf8)?;
        let queries = queries.as_string::<i32>();
        let matches = cast(batch.column(match_idx), &DataType::Utf8)?;
        let matches = matches.as_string::<i32>();
        let fractions = cast(batch.column(f_idx), &DataType::Float64)?;
        let fractions = fractions.as_primitive::<Float64Type>();
        let bps = cast(batch.column(bp_idx), &DataType::Float64)?;
        let bps = bps.as_primitive::<Float64Type>();
        for i in 0..batch.num_rows() {
            if queries.is_null(i) || fractions.is_null(i) || fractions.value(i).is_nan() {
                nb_skipped += 1;
                continue;
            }
            let match_name = if matches.is_null(i) { "" } else { matches.value(i) };
            let intersect_bp = if bps.is_null(i) { None } else { Some(bps.value(i)) };
            rows.push(GatherRow::new(queries.value(i), match_name, fractions.value(i), intersect_bp));
        }
    }
    if nb_skipped > 0 {
        log::warn!("skipped {} rows without query name or f_unique_weighted", nb_skipped);
    }
    log::debug!("gather_rows, nb rows : {}", rows.len());
    Ok(rows)
} // end of gather_rows

//====================================================================

/// All rows of one query, in table order.
#[derive(Debug)]
pub struct QueryGroup<'a> {
    query_name: &'a str,
    rows: Vec<&'a GatherRow>,
}

impl<'a> QueryGroup<'a> {
    pub fn get_query_name(&self) -> &'a str {
        self.query_name
    }

    pub fn get_rows(&self) -> &[&'a GatherRow] {
        &self.rows
    }

    /// Sort (stable, so equal values keep table order), cap at display_num_results, then threshold.
    /// The assigned total and the number of matches are taken before the threshold.
    pub fn rank(&self, params: &DisplayParams) -> RankedGroup<'a> {
        let mut capped = self.rows.clone();
        capped.sort_by(|a, b| {
            b.f_unique_weighted
                .partial_cmp(&a.f_unique_weighted)
                .unwrap_or(Ordering::Equal)
        });
        capped.truncate(params.get_display_num_results());
        let total: f64 = capped.iter().map(|r| r.f_unique_weighted).sum();
        let threshold = params.get_threshold();
        let ranked = capped
            .iter()
            .filter(|r| r.f_unique_weighted >= threshold)
            .enumerate()
            .map(|(i, row)| RankedMatch { rank: i + 1, row: *row })
            .collect();
        RankedGroup {
            query_name: self.query_name,
            nb_capped: capped.len(),
            total,
            ranked,
        }
    } // end of rank
} // end of impl QueryGroup

/// Groups rows by query name. Groups come in order of first appearance of their query.
pub fn group_by_query(rows: &[GatherRow]) -> Vec<QueryGroup<'_>> {
    let mut index: FxHashMap<&str, usize> = FxHashMap::default();
    let mut groups = Vec::<QueryGroup>::new();
    for row in rows {
        let rank = *index.entry(row.query_name.as_str()).or_insert_with(|| {
            groups.push(QueryGroup {
                query_name: row.query_name.as_str(),
                rows: Vec::new(),
            });
            groups.len() - 1
        });
        groups[rank].rows.push(row);
    }
    log::debug!("group_by_query, nb queries : {}", groups.len());
    groups
} // end of group_by_query

//====================================================================

/// a match surviving cap and threshold, with its rank (from 1)
#[derive(Debug, Clone, Copy)]
pub struct RankedMatch<'a> {
    rank: usize,
    row: &'a GatherRow,
}

impl<'a> RankedMatch<'a> {
    pub fn get_rank(&self) -> usize {
        self.rank
    }

    pub fn get_row(&self) -> &'a GatherRow {
        self.row
    }
}

/// The capped and thresholded matches of one query.
#[derive(Debug)]
pub struct RankedGroup<'a> {
    query_name: &'a str,
    /// nb of matches kept by the cap, before threshold
    nb_capped: usize,
    /// sum of f_unique_weighted over the capped matches
    total: f64,
    ranked: Vec<RankedMatch<'a>>,
}

impl<'a> RankedGroup<'a> {
    pub fn get_query_name(&self) -> &'a str {
        self.query_name
    }

    pub fn get_nb_capped(&self) -> usize {
        self.nb_capped
    }

    /// fraction of the query assigned by the capped matches
    pub fn get_total(&self) -> f64 {
        self.total
    }

    pub fn get_ranked(&self) -> &[RankedMatch<'a>] {
        &self.ranked
    }

    /// dump the group. The match name filter only gates printing, ranks are not renumbered
    /// and the coverage accumulates over printed matches only.
    /// Nothing at all is written if no match is printed. Returns the number of printed matches.
    pub fn dump<W: Write>(&self, params: &DisplayParams, out: &mut W) -> std::io::Result<usize> {
        let mut nb_printed = 0;
        let mut sum_sofar = 0.;
        for ranked in &self.ranked {
            let row = ranked.row;
            if !params.accept_match(&row.match_name) {
                continue;
            }
            if nb_printed == 0 {
                writeln!(
                    out,
                    "\nQuery: {} ({} assigned in {} matches)",
                    display_name(self.query_name),
                    percent(self.total),
                    self.nb_capped
                )?;
            }
            sum_sofar += row.f_unique_weighted;
            let intersect_bp = match row.intersect_bp {
                Some(bp) => format_bp(bp),
                None => String::from("???"),
            };
            writeln!(
                out,
                "  {}: {} - {} ({}) - {}",
                ranked.rank,
                display_name(&row.match_name),
                percent(row.f_unique_weighted),
                percent(sum_sofar),
                intersect_bp
            )?;
            nb_printed += 1;
        }
        if nb_printed > 0 {
            writeln!(out)?;
        } else {
            log::trace!("nothing to display for query {}", self.query_name);
        }
        Ok(nb_printed)
    } // end of dump
} // end of impl RankedGroup

//====================================================================

/// Ranks and dumps every query. Queries are processed in parallel, each in its own buffer,
/// buffers are then written in query order.
/// Returns the number of queries for which something was printed.
pub fn display_gather<W: Write>(rows: &[GatherRow], params: &DisplayParams, out: &mut W) -> Result<usize> {
    let groups = group_by_query(rows);
    let dumped = groups
        .par_iter()
        .map(|group| -> std::io::Result<(Vec<u8>, usize)> {
            let ranked = group.rank(params);
            let mut buffer = Vec::<u8>::new();
            let nb_printed = ranked.dump(params, &mut buffer)?;
            Ok((buffer, nb_printed))
        })
        .collect::<std::io::Result<Vec<(Vec<u8>, usize)>>>()?;
    //
    let mut nb_displayed = 0;
    for (buffer, nb_printed) in dumped {
        out.write_all(&buffer)?;
        if nb_printed > 0 {
            nb_displayed += 1;
        }
    }
    log::info!("displayed {} queries out of {}", nb_displayed, groups.len());
    Ok(nb_displayed)
} // end of display_gather

/// Detects the kind of results in the table and displays it.
/// Tables that are not gather results give no output.
pub fn display<W: Write>(table: &MergedTable, params: &DisplayParams, out: &mut W) -> Result<ReportKind> {
    let kind = ReportKind::detect(table.get_schema());
    match kind {
        ReportKind::Gather => {
            // fail on missing columns before printing anything
            let rows = gather_rows(table)?;
            writeln!(out, "** displaying gather results for given CSVs")?;
            if table.is_empty() {
                log::warn!("empty table, no gather result to display");
                return Ok(kind);
            }
            display_gather(&rows, params, out)?;
        }
        ReportKind::Unrecognized => {
            log::warn!("no column {}, not gather results, nothing to display", F_UNIQUE_WEIGHTED);
        }
    }
    Ok(kind)
} // end of display

// end of mod tests
