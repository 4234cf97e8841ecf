//! Command-line front end for the encounter analyzer.
//!
//! `vigil analyze` runs one pass over a combat log and prints the report;
//! `vigil check-profile` parses a profile document and prints lint notes.
//! Diagnostics go to stderr so the report (or its JSON form) stays clean
//! on stdout.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::EnvFilter;

use vigil_core::profile::{load_profile, read_config};
use vigil_core::session::AnalysisSession;
use vigil_types::EncounterReport;
use vigil_types::formatting::{format_compact, format_duration_ms, format_pct};

#[derive(Parser)]
#[command(version, about = "Combat log encounter analyzer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one encounter log and print the report
    Analyze {
        /// Path to the JSON-lines combat log
        #[arg(short, long)]
        log: PathBuf,

        /// Path to the analysis profile (TOML)
        #[arg(short, long)]
        profile: PathBuf,

        /// Entity id of the tracked actor
        #[arg(short, long)]
        actor: i64,

        /// Restrict status rows to instances applied by this source
        #[arg(short, long)]
        source: Option<i64>,

        /// Emit the report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Parse a profile document and print lint notes
    CheckProfile {
        /// Path to the profile (TOML)
        #[arg(short, long)]
        profile: PathBuf,
    },
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Analyze {
            log,
            profile,
            actor,
            source,
            json,
        } => run_analyze(&log, &profile, actor, source, json),
        Commands::CheckProfile { profile } => run_check(&profile),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_analyze(
    log: &Path,
    profile_path: &Path,
    actor: i64,
    source: Option<i64>,
    json: bool,
) -> Result<(), String> {
    let profile = load_profile(profile_path).map_err(|e| e.to_string())?;
    let mut session = AnalysisSession::new(profile, actor);

    let file = File::open(log).map_err(|e| format!("opening {}: {e}", log.display()))?;
    session
        .ingest(BufReader::new(file))
        .map_err(|e| e.to_string())?;
    session.finish();

    let report = session.report_filtered(source);
    if json {
        let rendered = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        println!("{rendered}");
    } else {
        print_report(&report);
    }
    Ok(())
}

fn run_check(path: &Path) -> Result<(), String> {
    let config = read_config(path).map_err(|e| e.to_string())?;
    println!(
        "{}: {} statuses, {} invulns, {} windows",
        path.display(),
        config.statuses.len(),
        config.invulns.len(),
        config.windows.len()
    );

    let notes = config.lint();
    if notes.is_empty() {
        println!("no issues found");
    }
    for note in notes {
        println!("note: {note}");
    }
    Ok(())
}

fn print_report(report: &EncounterReport) {
    let meta = &report.encounter;
    if meta.started_at.is_empty() {
        println!("No recognized events in log.");
        return;
    }

    println!(
        "Encounter {} to {}, {}",
        meta.started_at,
        meta.ended_at.as_deref().unwrap_or("?"),
        format_duration_ms(meta.duration_ms)
    );
    println!(
        "{} events processed, {} ignored, {} lines skipped",
        format_compact(meta.events_processed as i64),
        meta.events_ignored,
        meta.lines_skipped
    );

    if !report.statuses.is_empty() {
        println!();
        println!(
            "{:<24} {:>9} {:>7} {:>6} {:>7} {:>9}",
            "Status", "Uptime", "Pct", "Apps", "Stacks", "Weighted"
        );
        for row in &report.statuses {
            println!(
                "{:<24} {:>9} {:>7} {:>6} {:>7} {:>9}",
                row.name,
                format_duration_ms(row.uptime_ms),
                format_pct(row.uptime_pct),
                row.applications,
                row.max_stacks,
                format_duration_ms(row.weighted_uptime_ms)
            );
        }
    }

    if !report.windows.is_empty() {
        println!();
        println!(
            "{:<16} {:>9} {:>9} {:>6} {:>11} {:>10}",
            "Window", "Opened", "Closed", "Casts", "Qualifying", "Shortfall"
        );
        for window in &report.windows {
            println!(
                "{:<16} {:>9} {:>9} {:>6} {:>11} {:>10}",
                window.rule,
                format_duration_ms(window.opened_ms),
                format_duration_ms(window.closed_ms),
                window.casts,
                format!("{}/{}", window.qualifying_count, window.expected_count),
                window.shortfall
            );
        }
    }

    if !report.tallies.is_empty() {
        println!();
        for tally in &report.tallies {
            println!(
                "{}: {} gate violations, {} missed actions",
                tally.rule, tally.gate_violations, tally.missed_actions
            );
        }
    }
}
