//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::analysis::RangePreset;
use crate::models::Granularity;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// na-kasem-analytics - sales analytics for the NA Kasem CRM
///
/// Reads the dashboard's sales-note and client exports and produces
/// KPIs, regional/product/client breakdowns and a revenue timeline as a
/// Markdown or JSON report.
///
/// Examples:
///   na-kasem-analytics --notes notes.json --clients clients.json
///   na-kasem-analytics --notes notes.json --range quarter --format json
///   na-kasem-analytics --notes notes.json --from 2024-03-01 --to 2024-03-31 --granularity week
///   na-kasem-analytics --notes notes.json --prompt insights.txt --question "אילו מוצרים לקדם?"
///   na-kasem-analytics --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Sales notes export (JSON array)
    ///
    /// Defaults to the `[data] notes` entry of the config file, or notes.json.
    #[arg(short, long, value_name = "FILE", env = "NA_KASEM_NOTES")]
    pub notes: Option<PathBuf>,

    /// Client directory export (JSON array or object keyed by client)
    #[arg(short = 'C', long, value_name = "FILE", env = "NA_KASEM_CLIENTS")]
    pub clients: Option<PathBuf>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .na-kasem.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// First day of the range (YYYY-MM-DD, inclusive)
    #[arg(long, value_name = "DATE", requires = "to", conflicts_with = "range")]
    pub from: Option<NaiveDate>,

    /// Last day of the range (YYYY-MM-DD, inclusive)
    #[arg(long, value_name = "DATE", requires = "from", conflicts_with = "range")]
    pub to: Option<NaiveDate>,

    /// Named range ending on the reference day
    #[arg(long, value_name = "RANGE")]
    pub range: Option<RangePreset>,

    /// Reference day for ranges, forecasts and at-risk clients (default: today)
    #[arg(long, value_name = "DATE")]
    pub today: Option<NaiveDate>,

    /// Timeline granularity (day, week, month)
    ///
    /// Unrecognized values fall back to day. Unset picks one from the range
    /// length.
    #[arg(short, long, value_name = "UNIT")]
    pub granularity: Option<String>,

    /// Number of rows in product and client rankings
    #[arg(long, value_name = "COUNT")]
    pub top: Option<usize>,

    /// Locale used to order timeline labels
    #[arg(long, value_name = "LOCALE")]
    pub locale: Option<String>,

    /// Also write an AI insight prompt to this file ("-" for stdout)
    #[arg(long, value_name = "FILE")]
    pub prompt: Option<PathBuf>,

    /// Business question to build a question prompt for (requires --prompt)
    #[arg(long, value_name = "TEXT", requires = "prompt")]
    pub question: Option<String>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .na-kasem.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.top == Some(0) {
            return Err("--top must be at least 1".to_string());
        }

        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(format!("--from ({}) is after --to ({})", from, to));
            }
        }

        if let Some(ref notes) = self.notes {
            if !notes.is_file() {
                return Err(format!("Notes file does not exist: {}", notes.display()));
            }
        }

        if let Some(ref clients) = self.clients {
            if !clients.is_file() {
                return Err(format!("Clients file does not exist: {}", clients.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `--quiet` wins over a config file that asks for verbose output.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// The granularity flag, if it names a recognized unit.
    pub fn recognized_granularity(&self) -> Option<Granularity> {
        self.granularity.as_deref().and_then(Granularity::recognize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["na-kasem-analytics"];
        argv.extend_from_slice(args);
        Args::parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.format, OutputFormat::Markdown);
        assert!(args.range.is_none());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_parse_range_and_dates() {
        let args = parse(&["--range", "quarter", "--today", "2024-03-20"]);
        assert_eq!(args.range, Some(RangePreset::Quarter));
        assert_eq!(args.today, NaiveDate::from_ymd_opt(2024, 3, 20));

        let args = parse(&["--from", "2024-03-01", "--to", "2024-03-31"]);
        assert_eq!(args.from, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_range_conflicts_with_bounds() {
        let result = Args::try_parse_from([
            "na-kasem-analytics",
            "--range",
            "week",
            "--from",
            "2024-03-01",
            "--to",
            "2024-03-31",
        ]);
        assert!(result.is_err());

        let result = Args::try_parse_from(["na-kasem-analytics", "--from", "2024-03-01"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_inverted_range() {
        let args = parse(&["--from", "2024-03-31", "--to", "2024-03-01"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = parse(&[]);
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());

        let args = parse(&["--top", "0"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_unrecognized_granularity() {
        let args = parse(&["--granularity", "hourly"]);
        assert_eq!(args.recognized_granularity(), None);

        let args = parse(&["-g", "week"]);
        assert_eq!(args.recognized_granularity(), Some(Granularity::Week));
    }

    #[test]
    fn test_log_level() {
        let mut args = parse(&[]);
        assert_eq!(args.log_level(false), tracing::Level::INFO);
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }
}
