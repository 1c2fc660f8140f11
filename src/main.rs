//! CLI entry point for `mailnorm`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use mailnorm::archive::Archive;
use mailnorm::config::{self, Config, ParseMode};
use mailnorm::corpus::{query, CorpusStore, FileCorpusStore, Quarantine};
use mailnorm::export::{self, ExportFormat};
use mailnorm::parser::date::{Clock, DateResolver};
use mailnorm::parser::{normalize_message, Patterns};
use mailnorm::pipeline::{self, ListReport, ListResult, RunContext};

#[derive(Parser)]
#[command(
    name = "mailnorm",
    version,
    about = "Normalize mailing-list archives into per-list corpora"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (overrides $MAILNORM_CONFIG)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize and reconcile mailing lists
    Run {
        /// Re-ingestion mode
        #[arg(long, value_enum)]
        mode: Option<ParseMode>,
        /// Worker count (0 = number of CPUs)
        #[arg(short, long)]
        jobs: Option<usize>,
        /// List to process (repeatable; default: all)
        #[arg(short, long = "list", value_name = "LIST")]
        lists: Vec<String>,
        /// Source archive directory
        #[arg(long, value_name = "DIR")]
        input: Option<PathBuf>,
        /// Output directory for corpora and quarantine
        #[arg(long, value_name = "DIR")]
        output: Option<PathBuf>,
        /// Process lists one at a time on the main thread
        #[arg(long)]
        sequential: bool,
        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Normalize a single message file and show the result
    Inspect {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Show statistics of a list's corpus
    Stats {
        list: String,
        /// Output directory holding the corpora
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
        /// Source archive directory, compared against the corpus
        #[arg(long, value_name = "DIR")]
        input: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Export a list's corpus
    Export {
        list: String,
        #[arg(short, long, value_enum, default_value = "jsonl")]
        format: ExportFormat,
        #[arg(short, long)]
        output: PathBuf,
        /// Output directory holding the corpora
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match cli.config.as_deref() {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    };

    // Configure logging: stderr + optional log file
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Run {
            mode,
            jobs,
            lists,
            input,
            output,
            sequential,
            json,
        } => {
            let mut config = config;
            if let Some(mode) = mode {
                config.parse.mode = mode;
            }
            if let Some(jobs) = jobs {
                config.parse.parallelism = jobs;
            }
            if !lists.is_empty() {
                config.parse.lists = lists;
            }
            if let Some(input) = input {
                config.paths.input_dir = input;
            }
            if let Some(output) = output {
                config.paths.output_dir = output;
            }
            cmd_run(&config, sequential, json)
        }
        Commands::Inspect { file, json } => cmd_inspect(&config, &file, json),
        Commands::Stats {
            list,
            output_dir,
            input,
            json,
        } => {
            let dir = output_dir.unwrap_or_else(|| config.paths.output_dir.clone());
            let input = input.unwrap_or_else(|| config.paths.input_dir.clone());
            cmd_stats(&dir, &input, &list, json)
        }
        Commands::Export {
            list,
            format,
            output,
            output_dir,
        } => {
            let dir = output_dir.unwrap_or_else(|| config.paths.output_dir.clone());
            cmd_export(&dir, &list, format, &output)
        }
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    // Try to set up file logging
    let log_dir = config::log_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "mailnorm.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "mailnorm", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

/// Normalize and reconcile every selected list.
fn cmd_run(config: &Config, sequential: bool, json: bool) -> anyhow::Result<()> {
    let archive = Archive::new(&config.paths.input_dir);
    let lists = archive.select_lists(&config.parse.lists)?;

    let ctx = RunContext {
        clock: Clock::system(config.parse.future_grace_days),
        patterns: Arc::new(Patterns::new()),
        mode: config.parse.mode,
        archive,
        output_dir: config.paths.output_dir.clone(),
        store: Arc::new(FileCorpusStore::new(&config.paths.output_dir)),
        date_memo_size: config.parse.date_memo_size,
    };

    let pb = ProgressBar::new(lists.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Lists [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let progress = |done: usize, _total: usize| pb.set_position(done as u64);
    let results = if sequential {
        pipeline::run_sequential(&ctx, &lists, &progress)
    } else {
        pipeline::run_parallel(&ctx, &lists, config.parse.parallelism, &progress)?
    };
    pb.finish_and_clear();
    let elapsed = start.elapsed();

    if json {
        print_run_json(&results, ctx.mode, elapsed)?;
    } else {
        print_run_table(&results, ctx.mode, elapsed);
    }

    let failed = results.iter().filter(|r| r.is_err()).count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} list(s) failed", results.len());
    }
    Ok(())
}

/// Normalize one message file and print the record.
fn cmd_inspect(config: &Config, file: &Path, json: bool) -> anyhow::Result<()> {
    let raw = std::fs::read(file).map_err(|e| mailnorm::error::Error::io(file, e))?;
    let patterns = Patterns::new();
    let clock = Clock::system(config.parse.future_grace_days);
    let mut dates = DateResolver::new(&patterns.dates, clock, config.parse.date_memo_size);
    let message = normalize_message(&raw, &patterns, &mut dates)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&message)?);
        return Ok(());
    }

    let record = &message.record;
    let date = record
        .date
        .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "unknown".to_string());

    println!();
    println!("  {:<16} {}", "Message-ID", record.message_id);
    println!("  {:<16} {}", "Date", date);
    println!("  {:<16} {}", "From", record.from);
    println!("  {:<16} {}", "To", record.to.join(", "));
    if !record.cc.is_empty() {
        println!("  {:<16} {}", "Cc", record.cc.join(", "));
    }
    println!("  {:<16} {}", "Subject", record.subject);
    if !record.in_reply_to.is_empty() {
        println!("  {:<16} {}", "In-Reply-To", record.in_reply_to);
    }
    if !record.mailing_list.is_empty() {
        println!("  {:<16} {}", "Mailing list", record.mailing_list);
    }
    println!("  {:<16} {}", "Headers", record.headers.len());
    println!(
        "  {:<16} {} / {} / {} lines",
        "Body segments",
        message.segments.before.lines().count(),
        message.segments.trailers.lines().count(),
        message.segments.after.lines().count()
    );

    if !record.attributions.is_empty() {
        println!();
        println!("  Attributions:");
        for attribution in &record.attributions {
            println!("    {:<16} {}", attribution.kind, attribution.identification);
        }
    }
    if !record.patches.is_empty() {
        println!();
        println!("  Patches: {}", record.patches.len());
        for (i, patch) in record.patches.iter().enumerate() {
            println!("    #{:<3} {} lines", i + 1, patch.lines().count());
        }
    }
    println!();
    Ok(())
}

/// Show statistics for a list's corpus.
fn cmd_stats(output_dir: &Path, input_dir: &Path, list: &str, json: bool) -> anyhow::Result<()> {
    use humansize::{format_size, BINARY};

    let store = FileCorpusStore::new(output_dir);
    let path = store.path_for(list);
    if !path.exists() {
        anyhow::bail!("No corpus for list '{list}': {}", path.display());
    }
    let file_size = std::fs::metadata(&path)?.len();
    let records = store.load(list)?;
    let stats = query::stats(&records, 10);

    let quarantine = Quarantine::for_list(output_dir, list);
    let coverage = match query::coverage(&Archive::new(input_dir), &quarantine, list, records.len()) {
        Ok(coverage) => Some(coverage),
        Err(e) => {
            tracing::warn!(list, error = %e, "Cannot compare with the source archive");
            None
        }
    };

    if json {
        let value = serde_json::json!({
            "list": list,
            "corpus": path.to_string_lossy(),
            "corpus_size": file_size,
            "stats": stats,
            "coverage": coverage,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!();
    println!("  {:<20} {}", "List", list);
    println!("  {:<20} {}", "Corpus", path.display());
    println!("  {:<20} {}", "Corpus size", format_size(file_size, BINARY));
    println!("  {:<20} {}", "Records", stats.records);
    if let Some(coverage) = &coverage {
        println!("  {:<20} {}", "Source messages", coverage.source_messages);
        println!("  {:<20} {}", "Quarantined", coverage.quarantined);
        println!("  {:<20} {}", "Missing", coverage.missing);
    }
    if let (Some(min), Some(max)) = (stats.oldest, stats.newest) {
        println!(
            "  {:<20} {} to {}",
            "Date range",
            min.format("%Y-%m-%d"),
            max.format("%Y-%m-%d")
        );
    }
    println!("  {:<20} {}", "Unknown dates", stats.undated);
    println!(
        "  {:<20} {} ({:.1}%)",
        "With patches",
        stats.with_patches,
        if stats.records == 0 {
            0.0
        } else {
            stats.with_patches as f64 / stats.records as f64 * 100.0
        }
    );

    if !stats.top_senders.is_empty() {
        println!();
        println!("  Top senders:");
        for (sender, count) in &stats.top_senders {
            println!("    {count:>6}  {sender}");
        }
    }
    if !stats.attribution_kinds.is_empty() {
        println!();
        println!("  Attributions:");
        for (kind, count) in &stats.attribution_kinds {
            println!("    {count:>6}  {kind}");
        }
    }
    println!();
    Ok(())
}

/// Export a list's corpus.
fn cmd_export(output_dir: &Path, list: &str, format: ExportFormat, output: &Path) -> anyhow::Result<()> {
    let store = FileCorpusStore::new(output_dir);
    let records = store.load(list)?;
    export::export_records(&records, format, output)?;
    println!("Exported {} record(s) to {}", records.len(), output.display());
    Ok(())
}

/// Print the run summary as a table.
fn print_run_table(results: &[ListResult], mode: ParseMode, elapsed: std::time::Duration) {
    println!();
    println!(
        "  {:<28} {:>7} {:>7} {:>8} {:>7} {:>10}",
        "List", "New", "Skipped", "Replaced", "Failed", "Unreadable"
    );
    for result in results {
        match result {
            Ok(r) => println!(
                "  {:<28} {:>7} {:>7} {:>8} {:>7} {:>10}",
                r.list, r.new, r.skipped, r.replaced, r.failed, r.unreadable
            ),
            Err(failure) => println!("  {:<28} ERROR: {}", failure.list, failure.source),
        }
    }

    let totals = totals(results);
    println!();
    println!(
        "  {:<28} {:>7} {:>7} {:>8} {:>7} {:>10}",
        "Total", totals.new, totals.skipped, totals.replaced, totals.failed, totals.unreadable
    );
    println!("  Mode: {mode}, elapsed: {elapsed:.2?}");
    println!();
}

/// Print the run summary as JSON.
fn print_run_json(
    results: &[ListResult],
    mode: ParseMode,
    elapsed: std::time::Duration,
) -> anyhow::Result<()> {
    let lists: Vec<serde_json::Value> = results
        .iter()
        .map(|result| match result {
            Ok(report) => serde_json::json!({ "ok": true, "report": report }),
            Err(failure) => serde_json::json!({
                "ok": false,
                "list": failure.list,
                "error": failure.source.to_string(),
            }),
        })
        .collect();

    let summary = serde_json::json!({
        "mode": mode,
        "elapsed_ms": elapsed.as_millis(),
        "totals": totals(results),
        "lists": lists,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn totals(results: &[ListResult]) -> ListReport {
    results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .fold(ListReport::default(), |mut acc, r| {
            acc.new += r.new;
            acc.skipped += r.skipped;
            acc.replaced += r.replaced;
            acc.failed += r.failed;
            acc.unreadable += r.unreadable;
            acc
        })
}
