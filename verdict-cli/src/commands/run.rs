//! Run command - Execute a test binary through the configured tool

use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, ValueEnum};
use verdict_core::{Config, ProcessExecutor, RunController, TestExecutor};

use crate::render;

/// Exit status for a Ctrl-C that arrives while no run is in flight
const INTERRUPTED: i32 = 130;

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Log lines followed by a pass/fail summary
    #[default]
    Text,
    /// JSON array of `{message, status}` objects
    Json,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Compiled test binary to hand to the test tool
    #[arg(required = true)]
    pub target: PathBuf,

    /// Only print passed/failed entries
    #[arg(short, long)]
    pub summary: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl RunArgs {
    /// Execute the run command
    ///
    /// Exits with failure when any entry is classified as failed.
    pub async fn execute(&self, verbose: bool, config: &Config) -> anyhow::Result<ExitCode> {
        // Resolve to absolute path
        let target = if self.target.is_absolute() {
            self.target.clone()
        } else {
            std::env::current_dir()?.join(&self.target)
        };

        if verbose {
            tracing::info!(
                path = %target.display(),
                tool = %config.tool.path,
                timeout = ?config.tool.timeout,
                "Running tests"
            );
        }

        let controller = Arc::new(RunController::new(ProcessExecutor::from_config(
            &config.tool,
        )));

        let interrupt = {
            let controller = controller.clone();
            tokio::spawn(async move {
                match forward_interrupts(&controller, tokio::signal::ctrl_c).await {
                    Ok(()) => std::process::exit(INTERRUPTED),
                    Err(e) => tracing::warn!(error = %e, "Cannot listen for Ctrl-C"),
                }
            })
        };

        let results = controller.run_or_report(&target).await;
        interrupt.abort();

        let output = match self.format {
            OutputFormat::Text => render::text(&results, self.summary),
            OutputFormat::Json => render::json(&results, self.summary)?,
        };
        println!("{}", output);

        if results.has_failures() {
            Ok(ExitCode::FAILURE)
        } else {
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Cancel the in-flight run every time `next_signal` fires
///
/// Returns once a signal arrives while nothing is running, so the caller
/// can exit instead of dropping the interrupt.
async fn forward_interrupts<E, S, Fut>(
    controller: &RunController<E>,
    mut next_signal: S,
) -> io::Result<()>
where
    E: TestExecutor,
    S: FnMut() -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    loop {
        next_signal().await?;
        if !controller.cancel() {
            return Ok(());
        }
        tracing::warn!("Interrupted, stopping test tool");
    }
}
