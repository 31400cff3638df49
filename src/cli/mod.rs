//! kdd-clean CLI Module
//!
//! Command-line interface for cleaning step logs and inspecting tables.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::preprocessing::{
    null_report, CleaningConfig, CleaningPipeline, CleaningReport, DecodePolicy, EncodingScope,
    NullFilter, SectionAlignment,
};
use crate::utils::{DataLoader, DataSaver};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "kdd-clean")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Clean KDD Cup Algebra step logs")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean a raw step-log export
    Clean {
        /// Raw tab-separated export
        #[arg(short, long)]
        data: PathBuf,

        /// Output file for the cleaned table
        #[arg(short, long)]
        output: PathBuf,

        /// Hold-out export cleaned with the same unit mapping
        #[arg(long, requires = "holdout_output")]
        holdout: Option<PathBuf>,

        /// Output file for the cleaned hold-out table
        #[arg(long, requires = "holdout")]
        holdout_output: Option<PathBuf>,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Undecodable text handling (reject, substitute, drop)
        #[arg(long)]
        decode_policy: Option<String>,

        /// Null the first section, matching older cleaned files
        #[arg(long)]
        legacy_section_shift: bool,

        /// Fit the unit mapping on primary and hold-out together
        #[arg(long)]
        joint_encoding: bool,

        /// Keep only steps attempted more than once
        #[arg(long)]
        drop_single_attempt: bool,

        /// Write the unit mapping as JSON
        #[arg(long)]
        unit_map: Option<PathBuf>,
    },

    /// Show shape, types and null counts of a table
    Info {
        /// Input file
        #[arg(short, long)]
        data: PathBuf,

        /// List every column, not only those with nulls
        #[arg(long)]
        all: bool,

        /// Read with the cleaned column types instead of the raw ones
        #[arg(long)]
        cleaned: bool,
    },
}

/// Flags of the `clean` command
pub struct CleanArgs<'a> {
    pub data: &'a Path,
    pub output: &'a Path,
    pub holdout: Option<(&'a Path, &'a Path)>,
    pub config: Option<&'a Path>,
    pub decode_policy: Option<&'a str>,
    pub legacy_section_shift: bool,
    pub joint_encoding: bool,
    pub drop_single_attempt: bool,
    pub unit_map: Option<&'a Path>,
}

/// Parse a decode policy name
pub fn parse_decode_policy(name: &str) -> anyhow::Result<DecodePolicy> {
    match name.to_ascii_lowercase().as_str() {
        "reject" => Ok(DecodePolicy::Reject),
        "substitute" => Ok(DecodePolicy::Substitute),
        "drop" => Ok(DecodePolicy::Drop),
        other => anyhow::bail!("Unknown decode policy: {} (expected reject, substitute or drop)", other),
    }
}

/// Configuration file values with command-line flags applied on top
pub fn resolve_config(args: &CleanArgs<'_>) -> anyhow::Result<CleaningConfig> {
    let mut config = match args.config {
        Some(path) => CleaningConfig::from_json_file(path)?,
        None => CleaningConfig::default(),
    };

    if let Some(name) = args.decode_policy {
        config = config.with_decode_policy(parse_decode_policy(name)?);
    }
    if args.legacy_section_shift {
        config = config.with_section_alignment(SectionAlignment::LegacyShifted);
    }
    if args.joint_encoding {
        config = config.with_encoding_scope(EncodingScope::Joint);
    }
    if args.drop_single_attempt {
        config = config.with_drop_single_attempt_steps(true);
    }
    Ok(config)
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_clean(args: &CleanArgs<'_>) -> anyhow::Result<()> {
    section("Clean");

    let config = resolve_config(args)?;
    let loader = DataLoader::new().with_separator(config.separator);
    let separator = config.separator;

    step_run("Loading data");
    let raw = loader.load_raw(args.data)?;
    step_done(&format!("{} rows × {} cols", raw.height(), raw.width()));

    let holdout_raw = match args.holdout {
        Some((path, _)) => {
            step_run("Loading hold-out");
            let df = loader.load_raw(path)?;
            step_done(&format!("{} rows × {} cols", df.height(), df.width()));
            Some(df)
        }
        None => None,
    };

    step_run("Cleaning");
    let start = Instant::now();
    let mut pipeline = CleaningPipeline::with_config(config);
    let (mut cleaned, holdout_clean) = match &holdout_raw {
        Some(holdout) => {
            let (primary, holdout) = pipeline.run_with_holdout(&raw, holdout)?;
            (primary, Some(holdout))
        }
        None => (pipeline.run(&raw)?, None),
    };
    step_done(&format!("{:?}", start.elapsed()));

    step_run(&format!("Saving → {}", args.output.display()));
    DataSaver::save_delimited(&mut cleaned, args.output, separator)?;
    step_done(&format!("{} rows × {} cols", cleaned.height(), cleaned.width()));

    if let (Some(mut holdout), Some((_, out))) = (holdout_clean, args.holdout) {
        step_run(&format!("Saving → {}", out.display()));
        DataSaver::save_delimited(&mut holdout, out, separator)?;
        step_done(&format!("{} rows × {} cols", holdout.height(), holdout.width()));
    }

    if let Some(path) = args.unit_map {
        step_run(&format!("Saving unit mapping → {}", path.display()));
        pipeline.save_unit_mapping(path)?;
        step_done("");
    }

    if let Some(report) = pipeline.report() {
        print_report(report);
    }

    println!();
    Ok(())
}

fn print_report(report: &CleaningReport) {
    section("Summary");
    println!("  {:<16} {}", muted("Rows in"), report.rows_in);
    println!("  {:<16} {}", muted("Rows out"), report.rows_out);
    if let Some(rows) = report.holdout_rows {
        println!("  {:<16} {}", muted("Hold-out rows"), rows);
    }
    println!("  {:<16} {}", muted("Units"), report.units);
    println!("  {:<16} {} → {}", muted("Nulls"), report.nulls_before, report.nulls_after);
    println!("  {:<16} {:.3}s", muted("Time"), report.total_secs);

    let mut slowest: Vec<_> = report.stages.iter().collect();
    slowest.sort_by(|a, b| b.secs.total_cmp(&a.secs));
    println!();
    for stage in slowest.into_iter().take(5) {
        println!("  {:<32} {}", muted(&stage.stage), dim(&format!("{:.4}s", stage.secs)));
    }
}

pub fn cmd_info(data_path: &Path, all: bool, cleaned: bool) -> anyhow::Result<()> {
    section("Data Info");

    let loader = DataLoader::new();
    let df = if cleaned {
        loader.load_cleaned(data_path)?
    } else {
        loader.load_raw(data_path)?
    };

    println!("  {:<12} {}", muted("File"), data_path.display());
    println!("  {:<12} {}", muted("Rows"), df.height());
    println!("  {:<12} {}", muted("Columns"), df.width());
    println!("  {:<12} {:.2} MB", muted("Memory"), df.estimated_size() as f64 / 1024.0 / 1024.0);
    println!();

    let filter = if all { NullFilter::All } else { NullFilter::OnlyNull };
    let report = null_report(&df, filter);

    if report.per_column.is_empty() {
        println!("  {} no nulls", ok("✓"));
        println!();
        return Ok(());
    }

    println!("  {:<32} {:<10} {:>8} {:>9}", muted("Column"), muted("Type"), muted("Nulls"), muted("Complete"));
    println!("  {}", dim(&"─".repeat(62)));

    for entry in &report.per_column {
        println!(
            "  {:<32} {:<10} {:>8} {:>8.1}%",
            entry.column,
            entry.dtype.truecolor(140, 140, 140),
            entry.null_count,
            entry.completeness * 100.0
        );
    }

    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> CleanArgs<'static> {
        CleanArgs {
            data: Path::new("in.tsv"),
            output: Path::new("out.tsv"),
            holdout: None,
            config: None,
            decode_policy: None,
            legacy_section_shift: false,
            joint_encoding: false,
            drop_single_attempt: false,
            unit_map: None,
        }
    }

    #[test]
    fn test_parse_decode_policy() {
        assert_eq!(parse_decode_policy("Reject").unwrap(), DecodePolicy::Reject);
        assert_eq!(parse_decode_policy("drop").unwrap(), DecodePolicy::Drop);
        assert!(parse_decode_policy("ignore").is_err());
    }

    #[test]
    fn test_flags_override_defaults() {
        let mut flags = args();
        flags.decode_policy = Some("substitute");
        flags.legacy_section_shift = true;
        flags.joint_encoding = true;

        let config = resolve_config(&flags).unwrap();
        assert_eq!(config.decode_policy, DecodePolicy::Substitute);
        assert_eq!(config.section_alignment, SectionAlignment::LegacyShifted);
        assert_eq!(config.encoding_scope, EncodingScope::Joint);
        assert!(!config.drop_single_attempt_steps);
    }

    #[test]
    fn test_cli_parses_clean() {
        let cli = Cli::try_parse_from([
            "kdd-clean", "clean", "-d", "a.tsv", "-o", "b.tsv", "--holdout", "h.tsv",
            "--holdout-output", "ho.tsv", "--drop-single-attempt",
        ])
        .unwrap();
        match cli.command {
            Commands::Clean { holdout, drop_single_attempt, .. } => {
                assert_eq!(holdout, Some(PathBuf::from("h.tsv")));
                assert!(drop_single_attempt);
            }
            _ => panic!("expected clean"),
        }
    }

    #[test]
    fn test_holdout_requires_output() {
        let parsed = Cli::try_parse_from(["kdd-clean", "clean", "-d", "a.tsv", "-o", "b.tsv", "--holdout", "h.tsv"]);
        assert!(parsed.is_err());
    }
}
