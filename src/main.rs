//! na-kasem-analytics - sales analytics for the NA Kasem CRM
//!
//! A CLI that loads the dashboard's sales-note and client exports and
//! writes a sales report (Markdown or JSON), optionally with a prompt for
//! AI-generated insights.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad arguments, unreadable exports, write failure)

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, Utc};
use na_kasem_analytics::analysis::{self, AnalysisOptions};
use na_kasem_analytics::cli::{Args, OutputFormat};
use na_kasem_analytics::config::{Config, CONFIG_FILE_NAME};
use na_kasem_analytics::models::{DateRange, ReportMetadata, SalesReport};
use na_kasem_analytics::{data, insights, report};
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(args.log_level(config.general.verbose));

    info!("na-kasem-analytics v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args, config) {
        error!("Report failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default config file.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to set export paths, ranking size and timeline granularity.");
    Ok(())
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load exports, run the analysis and write the report.
fn run(args: Args, config: Config) -> Result<()> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let range = resolve_range(&args, &config, today);

    if args.granularity.is_some() && args.recognized_granularity().is_none() {
        warn!(
            "Unrecognized granularity {:?}, using day",
            args.granularity.as_deref().unwrap_or_default()
        );
    }

    let notes = data::load_notes(&config.data.notes)
        .context("Failed to load sales notes")?;
    let clients = match config.data.clients {
        Some(ref path) => data::load_clients(path).context("Failed to load client directory")?,
        None => {
            debug!("No client directory configured");
            Vec::new()
        }
    };

    let options = AnalysisOptions {
        range,
        granularity: config.analysis.granularity,
        top_n: config.analysis.top_n,
        today,
        locale: config.analysis.locale.clone(),
    };

    let snapshot = analysis::analyze(&notes, &clients, &options);

    let metadata = ReportMetadata {
        generated_at: Utc::now(),
        today,
        notes_source: config.data.notes.display().to_string(),
        notes_loaded: notes.len(),
        notes_in_range: snapshot.summary.order_count,
        clients_loaded: clients.len(),
        locale: options.locale.clone(),
    };
    let sales_report = SalesReport { metadata, snapshot };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&sales_report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&sales_report),
    };

    let output_path = Path::new(&config.general.output);
    report::write_report(&output, output_path)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    if let Some(ref prompt_path) = args.prompt {
        write_prompt(&sales_report, args.question.as_deref(), prompt_path)?;
    }

    if !args.quiet {
        let summary = &sales_report.snapshot.summary;
        println!("\n📊 Sales Summary ({}):", sales_report.snapshot.range);
        println!("   Revenue: {}", report::format_currency(summary.total_revenue));
        println!(
            "   Orders: {} | Avg. order: {}",
            summary.order_count,
            report::format_currency(summary.avg_order_value)
        );
        if let Some(ref comparison) = sales_report.snapshot.comparison {
            println!("   Change vs. previous period: {}", comparison.growth);
        }
        println!("\n✅ Report saved to: {}", output_path.display());
    }

    Ok(())
}

/// Explicit --from/--to wins, then a preset from the CLI or config, else all dates.
fn resolve_range(args: &Args, config: &Config, today: NaiveDate) -> DateRange {
    if let (Some(from), Some(to)) = (args.from, args.to) {
        return DateRange::between_days(from, to);
    }

    match config.analysis.range {
        Some(preset) => {
            info!("Using range preset {} ({})", preset, preset.label());
            preset.resolve(today)
        }
        None => DateRange::default(),
    }
}

/// Write the insight (or question) prompt to a file, or stdout for "-".
fn write_prompt(sales_report: &SalesReport, question: Option<&str>, path: &Path) -> Result<()> {
    let prompt = match question.and_then(|q| insights::build_question_prompt(&sales_report.snapshot, q)) {
        Some(prompt) => prompt,
        None => insights::build_insight_prompt(&sales_report.snapshot),
    };

    if path == Path::new("-") {
        println!("{}", prompt);
        return Ok(());
    }

    std::fs::write(path, prompt)
        .with_context(|| format!("Failed to write prompt to {}", path.display()))?;
    info!("Prompt written to {}", path.display());
    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is set up, so problems go to stderr.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(config) => Ok(config.unwrap_or_default()),
        Err(e) => {
            eprintln!("⚠️  Failed to load {}: {:#}", CONFIG_FILE_NAME, e);
            Ok(Config::default())
        }
    }
}
