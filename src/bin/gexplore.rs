//! gexplore : explore gather results
//!
//! gexplore concat  file1.csv [file2.parquet ...] --output [-o] merged.parquet
//!
//!     merges all files into one parquet file. The schema of the output is the union of the input schemas.
//!
//! gexplore columns file1.csv [...] \[--filter [-l] substr\]
//!
//!     prints the column names of the merged files, keeping names containing substr if asked.
//!
//! gexplore display file1.csv [...] \[--filter [-l] substr\] \[--display-num-results [-n] nb\] \[--threshold [-t] f\]
//!
//!     For gather results (files with a f_unique_weighted column), displays for each query the nb (default 3)
//!     best matches with f_unique_weighted at least f (default 0.01), keeping only match names containing substr.
//!
//! Files must be .csv or .parquet files. Logging is driven by RUST_LOG.

use clap::{value_parser, Arg, ArgMatches, Command};

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::SystemTime;

use anyhow::Context;
use cpu_time::ProcessTime;
// for logging (debug mostly, switched at compile time in cargo.toml)
use env_logger::Builder;

use gexplore::columns::display_columns;
use gexplore::concat::concat;
use gexplore::report::display;
use gexplore::table::LazyTable;
use gexplore::utils::*;

// install a logger facility
pub fn init_log() -> u64 {
    Builder::from_default_env().init();
    log::debug!("logger initialized");
    1
}

fn get_sources(matches: &ArgMatches) -> Vec<PathBuf> {
    matches
        .get_many::<PathBuf>("gather_csvs")
        .map(|v| v.cloned().collect())
        .unwrap_or_default()
}

fn sources_arg() -> Arg {
    Arg::new("gather_csvs")
        .value_name("FILES")
        .help("gather results, csv or parquet files")
        .required(true)
        .num_args(1..)
        .value_parser(value_parser!(PathBuf))
}

fn filter_arg(help: &'static str) -> Arg {
    Arg::new("filter")
        .short('l')
        .long("filter")
        .value_name("SUBSTR")
        .help(help)
        .required(false)
}

#[doc(hidden)]
fn run_concat(matches: &ArgMatches) -> anyhow::Result<()> {
    log::debug!("in run_concat");
    let sources = get_sources(matches);
    let output = matches
        .get_one::<PathBuf>("output")
        .cloned()
        .context("--output is mandatory")?;
    let params = ConcatParams::new(output);
    log::info!("concat parameters : {}", serde_json::to_string(&params)?);
    // check the destination before scanning, so nothing is read for a bad output name
    check_parquet_destination(params.get_output())?;
    let table = LazyTable::scan(&sources).context("cannot load gather files")?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let nb_rows = concat(&table, &params, &mut out)
        .with_context(|| format!("cannot write {:?}", params.get_output()))?;
    log::info!("concat wrote {} rows", nb_rows);
    Ok(())
} // end of run_concat

#[doc(hidden)]
fn run_columns(matches: &ArgMatches) -> anyhow::Result<()> {
    log::debug!("in run_columns");
    let sources = get_sources(matches);
    let params = ColumnsParams::new(matches.get_one::<String>("filter").cloned());
    let table = LazyTable::scan(&sources).context("cannot load gather files")?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    display_columns(&table, &params, &mut out)?;
    Ok(())
} // end of run_columns

#[doc(hidden)]
fn run_display(matches: &ArgMatches) -> anyhow::Result<()> {
    log::debug!("in run_display");
    let sources = get_sources(matches);
    let display_num_results = *matches
        .get_one::<usize>("display_num_results")
        .unwrap_or(&DEFAULT_DISPLAY_NUM_RESULTS);
    let threshold = *matches.get_one::<f64>("threshold").unwrap_or(&DEFAULT_THRESHOLD);
    let params = DisplayParams::new(display_num_results, threshold, matches.get_one::<String>("filter").cloned());
    if !params.is_valid() {
        anyhow::bail!("threshold must be a finite number, got {}", threshold);
    }
    log::info!("display parameters : {}", params.to_json()?);
    //
    let table = LazyTable::scan(&sources)
        .context("cannot load gather files")?
        .collect()
        .context("cannot read gather files")?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let kind = display(&table, &params, &mut out)?;
    out.flush()?;
    log::info!("displayed results of kind : {}", kind);
    Ok(())
} // end of run_display

//============================================================================================

fn main() {
    let _ = init_log();

    let concat_cmd = Command::new("concat")
        .about("concatenate CSVs into parquet")
        .arg(sources_arg())
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("parquet file to write")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        );

    let display_cmd = Command::new("display")
        .about("display CSVs")
        .arg(sources_arg())
        .arg(filter_arg("filter matches on substring"))
        .arg(
            Arg::new("display_num_results")
                .short('n')
                .long("display-num-results")
                .value_name("NB")
                .help("display this many results")
                .default_value("3")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("threshold")
                .short('t')
                .long("threshold")
                .value_name("FRACTION")
                .help("filter at this threshold")
                .default_value("0.01")
                .value_parser(value_parser!(f64)),
        );

    let columns_cmd = Command::new("columns")
        .about("display columns")
        .arg(sources_arg())
        .arg(filter_arg("filter on substring"));

    //
    // the global command
    //
    let matches = Command::new("gexplore")
        .version("0.1.0")
        .about("Merge and display sourmash gather results")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(concat_cmd)
        .subcommand(display_cmd)
        .subcommand(columns_cmd)
        .get_matches();

    let start_t = SystemTime::now();
    let cpu_start = ProcessTime::now();
    //
    let res = match matches.subcommand() {
        Some(("concat", sub_m)) => run_concat(sub_m),
        Some(("columns", sub_m)) => run_columns(sub_m),
        Some(("display", sub_m)) => run_display(sub_m),
        _ => unreachable!("subcommand is required"),
    };
    //
    let cpu_time = cpu_start.elapsed();
    if let Ok(elapsed) = start_t.elapsed() {
        log::info!("sys time(ms) {:?} cpu time(ms) {:?}", elapsed.as_millis(), cpu_time.as_millis());
    }
    if let Err(e) = res {
        log::error!("{:#}", e);
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
} // end of main
