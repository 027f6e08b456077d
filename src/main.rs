//! srtrans - SRT subtitle translation with JSON progress on stdout
//!
//! Stdout carries only the newline-delimited JSON status stream. Logs go to a
//! rolling file and, with `--verbose`, to stderr.

use anyhow::Result;
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use srtrans::cli::{parse_invocation, CliError, Invocation, USAGE};
use srtrans::config::{Config, LoggingConfig};
use srtrans::engine::EngineFactory;
use srtrans::progress::{ProgressEvent, ProgressReporter};
use srtrans::workflow::Workflow;

#[tokio::main]
async fn main() -> ExitCode {
    let mut reporter = ProgressReporter::stdout();

    let invocation = match parse_invocation(std::env::args_os()) {
        Ok(invocation) => invocation,
        Err(CliError::Display(e)) => e.exit(),
        Err(CliError::InvalidArguments) => {
            let _ = reporter.emit(&ProgressEvent::invalid_arguments(USAGE));
            return ExitCode::FAILURE;
        }
    };

    match run(invocation, &mut reporter).await {
        Ok(code) => code,
        Err(e) => {
            let _ = reporter.report_error(format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(
    invocation: Invocation,
    reporter: &mut ProgressReporter<std::io::Stdout>,
) -> Result<ExitCode> {
    let config = Config::load(invocation.config.as_deref())?;
    let _guard = setup_logging(&config.logging, invocation.verbose)?;

    info!("Starting srtrans {}", env!("CARGO_PKG_VERSION"));

    let engine = EngineFactory::create_default(&config)?;
    let mut workflow = Workflow::new(&config, engine);
    let code = ExitCode::from(workflow.execute(&invocation.request, reporter).await);

    info!("srtrans finished");
    Ok(code)
}

/// Setup logging to the log file, and to stderr when verbose
fn setup_logging(config: &LoggingConfig, verbose: bool) -> Result<WorkerGuard> {
    std::fs::create_dir_all(&config.log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&config.log_dir, "srtrans.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Stdout belongs to the progress stream, so the console layer writes to stderr
    let console_layer = verbose.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
    });

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Logging initialized - level: {}, file: {}",
        log_level,
        config.log_dir.join("srtrans.log").display()
    );

    Ok(guard)
}
