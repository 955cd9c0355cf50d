//! loading, merging, concatenation and display on real files

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use gexplore::columns::display_columns;
use gexplore::concat::concat;
use gexplore::report::{display, ReportKind};
use gexplore::table::LazyTable;
use gexplore::utils::{ColumnsParams, ConcatParams, DisplayParams};
use gexplore::ExploreError;

const RUN1: &str = "\
intersect_bp,f_orig_query,f_match,f_unique_to_query,f_unique_weighted,query_name,match_name
1000,0.5,0.9,0.5,0.5,SRR606249,GCF_000005845.2 Escherichia coli str. K-12 substr. MG1655
2500000,0.3,0.8,0.3,0.3,SRR606249,GCF_000006945.2 Salmonella enterica
10,0.05,0.1,0.05,0.05,SRR606249,GCF_000009045.1 Bacillus subtilis
";

const RUN2: &str = "\
intersect_bp,f_orig_query,f_match,f_unique_to_query,f_unique_weighted,query_name,match_name
40000,0.2,0.5,0.2,0.25,SRR5650070,GCF_000195955.2 Mycobacterium tuberculosis
30000,0.1,0.5,0.1,0.004,SRR5650070,GCF_000008865.2 Escherichia coli O157
";

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

fn render(sources: &[PathBuf], params: &DisplayParams) -> String {
    let table = LazyTable::scan(sources).unwrap().collect().unwrap();
    let mut out = Vec::<u8>::new();
    let kind = display(&table, params, &mut out).unwrap();
    assert_eq!(kind, ReportKind::Gather);
    String::from_utf8(out).unwrap()
}

#[test]
fn display_two_runs() {
    let dir = tempfile::tempdir().unwrap();
    let run1 = write_file(dir.path(), "run1.csv", RUN1);
    let run2 = write_file(dir.path(), "run2.csv", RUN2);
    let out = render(&[run1, run2], &DisplayParams::default());
    let expected = "** displaying gather results for given CSVs\n\
                    \n\
                    Query: SRR606249 (85.0% assigned in 3 matches)\n\
                    \x20 1: GCF_000005845.2 Escherichia coli str.... - 50.0% (50.0%) - 1000 bp\n\
                    \x20 2: GCF_000006945.2 Salmonella enterica - 30.0% (80.0%) - 2.5 Mbp\n\
                    \x20 3: GCF_000009045.1 Bacillus subtilis - 5.0% (85.0%) - 10 bp\n\
                    \n\
                    \n\
                    Query: SRR5650070 (25.4% assigned in 2 matches)\n\
                    \x20 1: GCF_000195955.2 Mycobacterium tubercu... - 25.0% (25.0%) - 40.0 kbp\n\
                    \n";
    assert_eq!(out, expected);
}

#[test]
fn match_filter_applies_across_queries() {
    let dir = tempfile::tempdir().unwrap();
    let run1 = write_file(dir.path(), "run1.csv", RUN1);
    let run2 = write_file(dir.path(), "run2.csv", RUN2);
    let params = DisplayParams::new(3, 0.001, Some(String::from("Escherichia")));
    let out = render(&[run1, run2], &params);
    assert!(out.contains("  1: GCF_000005845.2 Escherichia coli str.... - 50.0% (50.0%) - 1000 bp"));
    // rank 2 of the second query is kept, coverage restarts for it
    assert!(out.contains("Query: SRR5650070 (25.4% assigned in 2 matches)"));
    assert!(out.contains("  2: GCF_000008865.2 Escherichia coli O157 - 0.4% (0.4%) - 30.0 kbp"));
    assert!(!out.contains("Salmonella"));
}

#[test]
fn parquet_and_csv_give_the_same_report() {
    let dir = tempfile::tempdir().unwrap();
    let run1 = write_file(dir.path(), "run1.csv", RUN1);
    let merged = dir.path().join("run1.parquet");
    let table = LazyTable::scan(&[run1.clone()]).unwrap();
    let mut log = Vec::<u8>::new();
    let nb_rows = concat(&table, &ConcatParams::new(merged.clone()), &mut log).unwrap();
    assert_eq!(nb_rows, 3);
    let log = String::from_utf8(log).unwrap();
    assert!(log.starts_with("** loading 1 CSVs\n** writing parquet file '"));
    //
    let params = DisplayParams::default();
    assert_eq!(render(&[run1], &params), render(&[merged], &params));
}

#[test]
fn concat_merges_schemas() {
    let dir = tempfile::tempdir().unwrap();
    let run1 = write_file(dir.path(), "run1.csv", RUN1);
    let other = write_file(dir.path(), "other.csv", "query_name,match_name,f_unique_weighted,note\nQ,M,0.5,x\n");
    let merged = dir.path().join("merged.parquet");
    let table = LazyTable::scan(&[run1, other]).unwrap();
    let nb_rows = concat(&table, &ConcatParams::new(merged.clone()), &mut Vec::<u8>::new()).unwrap();
    assert_eq!(nb_rows, 4);
    let reloaded = LazyTable::scan(&[merged]).unwrap();
    assert_eq!(reloaded.column_names().last().unwrap(), "note");
    assert_eq!(reloaded.collect().unwrap().num_rows(), 4);
}

#[test]
fn concat_refuses_non_parquet_output() {
    let dir = tempfile::tempdir().unwrap();
    let run1 = write_file(dir.path(), "run1.csv", RUN1);
    let table = LazyTable::scan(&[run1]).unwrap();
    let output = dir.path().join("merged.csv");
    let mut log = Vec::<u8>::new();
    let res = concat(&table, &ConcatParams::new(output.clone()), &mut log);
    assert!(matches!(res, Err(ExploreError::UnsupportedFormat(_))));
    assert!(log.is_empty());
    assert!(!output.exists());
}

#[test]
fn concat_output_may_be_one_of_the_sources() {
    let dir = tempfile::tempdir().unwrap();
    let a_csv = write_file(dir.path(), "a.csv", RUN1);
    let a_parquet = dir.path().join("a.parquet");
    let table = LazyTable::scan(&[a_csv.clone()]).unwrap();
    concat(&table, &ConcatParams::new(a_parquet.clone()), &mut Vec::<u8>::new()).unwrap();
    //
    let table = LazyTable::scan(&[a_parquet.clone(), a_csv]).unwrap();
    let nb_rows = concat(&table, &ConcatParams::new(a_parquet.clone()), &mut Vec::<u8>::new()).unwrap();
    assert_eq!(nb_rows, 6);
    assert_eq!(LazyTable::scan(&[a_parquet]).unwrap().collect().unwrap().num_rows(), 6);
    // no temporary file left behind
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
}

#[test]
fn failed_concat_keeps_existing_output() {
    let dir = tempfile::tempdir().unwrap();
    let run1 = write_file(dir.path(), "run1.csv", RUN1);
    let run2 = write_file(dir.path(), "run2.csv", RUN2);
    let merged = dir.path().join("merged.parquet");
    let table = LazyTable::scan(&[run1.clone()]).unwrap();
    concat(&table, &ConcatParams::new(merged.clone()), &mut Vec::<u8>::new()).unwrap();
    let before = std::fs::read(&merged).unwrap();
    // run2 disappears between scan and read
    let table = LazyTable::scan(&[run1, run2.clone()]).unwrap();
    std::fs::remove_file(&run2).unwrap();
    let res = concat(&table, &ConcatParams::new(merged.clone()), &mut Vec::<u8>::new());
    assert!(matches!(res, Err(ExploreError::Io { .. })));
    assert_eq!(std::fs::read(&merged).unwrap(), before);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
}

#[test]
fn incompatible_sources_fail_at_scan() {
    let dir = tempfile::tempdir().unwrap();
    let run1 = write_file(dir.path(), "run1.csv", RUN1);
    let bad = write_file(dir.path(), "bad.csv", "intersect_bp,query_name\nlots,Q\n");
    assert!(matches!(
        LazyTable::scan(&[run1, bad]),
        Err(ExploreError::SchemaMismatch { .. })
    ));
}

#[test]
fn columns_listing() {
    let dir = tempfile::tempdir().unwrap();
    let run1 = write_file(dir.path(), "run1.csv", RUN1);
    let table = LazyTable::scan(&[run1]).unwrap();
    let mut out = Vec::<u8>::new();
    let columns = display_columns(&table, &ColumnsParams::new(Some(String::from("f_unique"))), &mut out).unwrap();
    assert_eq!(columns, vec!["f_unique_to_query", "f_unique_weighted"]);
    let out = String::from_utf8(out).unwrap();
    assert_eq!(
        out,
        "** showing columns for given CSV(s)\n\
         ** filtering on substr matches to 'f_unique'\n\
         [\"f_unique_to_query\",\"f_unique_weighted\"]\n"
    );
}

#[test]
fn non_gather_tables_display_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let search = write_file(dir.path(), "search.csv", "similarity,query_name,match_name\n0.9,Q,M\n");
    let table = LazyTable::scan(&[search]).unwrap().collect().unwrap();
    let mut out = Vec::<u8>::new();
    assert_eq!(display(&table, &DisplayParams::default(), &mut out).unwrap(), ReportKind::Unrecognized);
    assert!(out.is_empty());
}
