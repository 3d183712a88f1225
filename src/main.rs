//! CLI entry point for the course pass analyzer.
//!
//! Provides subcommands for matching roll numbers between the authorization
//! and batch results files, computing pass percentages over entitled courses,
//! and producing the grade-sorted contact report.

use anyhow::Result;
use clap::{Parser, Subcommand};
use course_pass_analyzer::analyzers::analyzer::{
    MATCHED_COURSES_FILE, MATCHING_STUDENTS_FILE, run_all, run_grade_report, run_pass_analysis,
    run_roster,
};
use course_pass_analyzer::config::AnalyzerConfig;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "course_pass_analyzer")]
#[command(about = "Pass percentage analysis over entitled courses", long_about = None)]
struct Cli {
    /// JSON file overriding grade tables and column names
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find authorized roll numbers present in the batch results file
    MatchRolls {
        /// Authorization CSV (rollNo, courseIds)
        #[arg(long, default_value = "Auth_rows_latest.csv")]
        auth: PathBuf,

        /// Full batch results CSV
        #[arg(long)]
        batch: PathBuf,

        /// Directory to write results to
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,
    },
    /// Compute pass percentages over courses that are both entitled and taken
    Analyze {
        /// Authorization CSV (rollNo, courseIds)
        #[arg(long, default_value = "Auth_rows_latest.csv")]
        auth: PathBuf,

        /// Results CSV (Registration no, sem4_courses)
        #[arg(long, default_value = MATCHING_STUDENTS_FILE)]
        results: PathBuf,

        /// Directory to write results to
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,
    },
    /// Sort matched courses by grade with student details and write the grade report
    Report {
        /// Matched courses CSV written by `analyze`
        #[arg(long, default_value = MATCHED_COURSES_FILE)]
        matched: PathBuf,

        /// Student details CSV keyed by registration number
        #[arg(long, default_value = "purchased_students_details.csv")]
        details: PathBuf,

        /// Directory to write results to
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,
    },
    /// Run roster matching, pass analysis, and the grade report in sequence
    Run {
        #[arg(long, default_value = "Auth_rows_latest.csv")]
        auth: PathBuf,

        #[arg(long)]
        batch: PathBuf,

        #[arg(long, default_value = "purchased_students_details.csv")]
        details: PathBuf,

        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,
    },
}

const DEFAULT_LOG_FILE: &str = "logs/course_pass_analyzer.log";

/// Splits a log file path into the rolling appender's directory and file
/// name prefix.
fn log_file_location(log_file_path: &str) -> (PathBuf, OsString) {
    let path = Path::new(log_file_path);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let name = path
        .file_name()
        .unwrap_or(OsStr::new("course_pass_analyzer.log"));
    (dir.to_path_buf(), name.to_os_string())
}

/// Installs a colored stderr layer (`RUST_LOG`, default info) and a daily
/// rolling JSON file layer (`RUST_LOG_JSON`, default debug).
///
/// The returned guard flushes the file writer on drop.
fn init_logging() -> Result<WorkerGuard> {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let (log_dir, log_file_name) = log_file_location(&log_file_path);

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(log_dir, log_file_name));

    let console = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_file = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(file_writer)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(console)
        .with(json_file)
        .try_init()?;

    Ok(guard)
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = init_logging()?;

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!(error = %e, "Run failed");
        return Err(e);
    }

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = AnalyzerConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::MatchRolls {
            auth,
            batch,
            output_dir,
        } => {
            run_roster(&config, &auth, &batch, &output_dir)?;
        }
        Commands::Analyze {
            auth,
            results,
            output_dir,
        } => {
            run_pass_analysis(&config, &auth, &results, &output_dir)?;
        }
        Commands::Report {
            matched,
            details,
            output_dir,
        } => {
            run_grade_report(&config, &matched, &details, &output_dir)?;
        }
        Commands::Run {
            auth,
            batch,
            details,
            output_dir,
        } => {
            let (analysis, groups) = run_all(&config, &auth, &batch, &details, &output_dir)?;
            info!(
                total = analysis.overall().total(),
                pass_percentage = %format!("{:.2}", analysis.overall().pass_percentage()),
                buckets = groups.buckets.len(),
                high_achievers = groups.high_achievers.len(),
                "All stages complete"
            );
        }
    }

    info!("Finished");
    Ok(())
}
