use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, error::ErrorKind};
use tracing_subscriber::EnvFilter;

use crate::config::MatcherConfig;
use crate::constants::logging::DEFAULT_DIRECTIVES;
use crate::heuristics::{format_ratio_percent, format_u128_with_commas};
use crate::pipeline::{MatchReport, find_leads};
use crate::store::JsonFileStore;

#[derive(Debug, Parser)]
#[command(
    name = "filament-match",
    disable_help_subcommand = true,
    about = "Rank missing-person files against unidentified-remains cases",
    long_about = "Load unidentified_cases.json and missing_persons.json from a data directory, \
score every UHR x MP pair that survives the timeline, sex, geography and age filters, \
and emit the highest-scoring leads as JSON."
)]
struct FindLeadsCli {
    #[arg(
        long = "data-dir",
        value_name = "DIR",
        help = "Directory holding unidentified_cases.json and missing_persons.json"
    )]
    data_dir: PathBuf,
    #[arg(
        long,
        value_name = "PATH",
        help = "Optional JSON matcher config; omitted fields keep their defaults"
    )]
    config: Option<PathBuf>,
    #[arg(
        long = "min-score",
        value_parser = parse_unit_f64,
        help = "Minimum composite score for a lead, in [0, 1]"
    )]
    min_score: Option<f64>,
    #[arg(
        long,
        value_parser = parse_positive_usize,
        help = "Maximum number of leads to return"
    )]
    limit: Option<usize>,
    #[arg(long, help = "Score on the calling thread instead of fanning out")]
    sequential: bool,
    #[arg(
        long,
        value_parser = parse_positive_usize,
        help = "Worker count (defaults to available parallelism)"
    )]
    workers: Option<usize>,
    #[arg(
        long,
        value_name = "PATH",
        help = "Write leads to this file instead of stdout"
    )]
    output: Option<PathBuf>,
}

/// Log filter from `RUST_LOG`-style directives, falling back to `warn`.
///
/// Directives are used as given; bare levels such as `debug` are honoured.
pub fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|raw| !raw.trim().is_empty())
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Entry point for the `filament-match` binary.
///
/// `args_iter` excludes the program name.
pub fn run_find_leads<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    run_find_leads_with(args_iter, &mut io::stdout().lock(), &mut io::stderr().lock())
}

/// `run_find_leads` with explicit output streams.
///
/// Without `--output`, `stdout` carries only the JSON leads and the run
/// summary goes to `stderr`. With `--output`, the summary goes to `stdout`.
pub fn run_find_leads_with<I, O, E>(
    args_iter: I,
    stdout: &mut O,
    stderr: &mut E,
) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
    O: Write,
    E: Write,
{
    let Some(cli) =
        parse_cli::<FindLeadsCli, _>(std::iter::once("filament-match".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    let mut config = match &cli.config {
        Some(path) => MatcherConfig::from_json_file(path)?,
        None => MatcherConfig::default(),
    };
    if let Some(min_score) = cli.min_score {
        config.run.min_score = min_score;
    }
    if let Some(limit) = cli.limit {
        config.run.limit = limit;
    }
    if cli.sequential {
        config.run.parallel = false;
    }
    if let Some(workers) = cli.workers {
        config.run.worker_count = Some(workers);
    }

    let store = JsonFileStore::new(&cli.data_dir);
    let report = find_leads(&store, &config)?;

    let rendered = serde_json::to_string_pretty(&report.leads)?;
    match &cli.output {
        Some(path) => {
            fs::write(path, rendered)?;
            write_summary(stdout, &report)?;
            writeln!(stdout, "leads written to {}", path.display())?;
        }
        None => {
            writeln!(stdout, "{rendered}")?;
            write_summary(stderr, &report)?;
        }
    }
    Ok(())
}

fn write_summary(out: &mut impl Write, report: &MatchReport) -> io::Result<()> {
    let summary = &report.summary;
    writeln!(out, "=== lead search summary ===")?;
    writeln!(
        out,
        "records            : {} unidentified, {} missing",
        summary.unidentified_records, summary.missing_records
    )?;
    writeln!(
        out,
        "records scored     : {} ({} skipped)",
        summary.records_scored, summary.records_skipped
    )?;
    writeln!(
        out,
        "pair space         : {}",
        format_u128_with_commas(summary.pair_space.total_pairs)
    )?;
    writeln!(
        out,
        "candidate pairs    : {} (pruned {})",
        format_u128_with_commas(summary.pair_space.candidate_pairs),
        format_ratio_percent(summary.pair_space.pruning_ratio())
    )?;
    writeln!(
        out,
        "qualifying pairs   : {}",
        format_u128_with_commas(summary.pair_space.qualifying_pairs)
    )?;
    writeln!(out, "leads returned     : {}", summary.leads_returned)?;
    writeln!(out, "elapsed            : {:.2?}", summary.elapsed)?;

    if let Some(scores) = report.score_summary() {
        writeln!(
            out,
            "scores             : min={:.3} max={:.3} mean={:.3}",
            scores.min, scores.max, scores.mean
        )?;
    }
    if let Some(concentration) = report.concentration() {
        writeln!(
            out,
            "leads per UHR case : min={} max={} mean={:.2} across {} cases (max share {})",
            concentration.min,
            concentration.max,
            concentration.mean,
            concentration.cases,
            format_ratio_percent(concentration.max_share)
        )?;
    }
    match report.top_lead() {
        Some(lead) => {
            writeln!(out, "--- top lead ---")?;
            writeln!(out, "uhr case : {}", lead.uhr_case)?;
            writeln!(out, "mp file  : {} ({})", lead.mp_file, lead.mp_name)?;
            writeln!(out, "score    : {:.3}", lead.rounded_score())?;
            if !lead.shared_features.is_empty() {
                writeln!(out, "features : {}", lead.shared_features.join(", "))?;
            }
        }
        None => writeln!(out, "no leads met the minimum score")?,
    }
    Ok(())
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    let parsed = raw
        .parse::<usize>()
        .map_err(|_| format!("Could not parse '{}' as a positive integer", raw))?;
    if parsed == 0 {
        return Err("value must be greater than zero".to_string());
    }
    Ok(parsed)
}

fn parse_unit_f64(raw: &str) -> Result<f64, String> {
    let parsed = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("Could not parse '{}' as a number", raw))?;
    if !(0.0..=1.0).contains(&parsed) {
        return Err(format!("score must be within [0, 1], got {parsed}"));
    }
    Ok(parsed)
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}
