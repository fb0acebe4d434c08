//! CLI entry point for the grade report service.
//!
//! Every subcommand is routed through the same handlers the HTTP surface
//! uses and prints the JSON response body to stdout.

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use grade_report::{
    api::dispatch, config::Config, course_stats::CancelToken, output::write_response,
    service::ReportService,
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "grade_report")]
#[command(about = "Student and course grade reports", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: Config,

    /// Indent the JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the student store is reachable
    Health,
    /// Look up a single student
    Student {
        #[arg(value_name = "ID")]
        id: String,
    },
    /// A student together with all of their grades
    StudentGrades {
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Highest, lowest and average grade for every course
    CourseGrades,
    /// Dispatch an arbitrary route path, e.g. `/student/1/grades`
    Get {
        #[arg(value_name = "PATH")]
        path: String,
    },
}

impl Commands {
    fn path(&self) -> String {
        match self {
            Commands::Health => "/health".to_string(),
            Commands::Student { id } => format!("/student/{id}"),
            Commands::StudentGrades { id } => format!("/student/{id}/grades"),
            Commands::CourseGrades => "/course/all/grades".to_string(),
            Commands::Get { path } => path.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/grade_report.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("grade_report.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    info!(
        grades = %cli.config.grades_path.display(),
        students = %cli.config.students_path.display(),
        chunk_size = cli.config.chunk_size,
        "Configuration loaded"
    );

    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling at the next chunk boundary");
            on_interrupt.cancel();
        }
    });

    let service = ReportService::from_config(&cli.config).with_cancel(cancel);
    let path = cli.command.path();
    let response = dispatch(&service, &path).await;

    write_response(std::io::stdout().lock(), &response, cli.pretty)?;

    if response.status >= 500 {
        bail!("{path} failed with status {}", response.status);
    }
    Ok(())
}
