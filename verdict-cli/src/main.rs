//! Verdict CLI - Command line interface for Verdict
//!
//! Runs an external test tool against a compiled test binary and prints the
//! classified log and pass/fail summary.

mod commands;
mod render;

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use verdict_core::Config;

use commands::RunArgs;

/// Verdict: run a test tool and classify its output
#[derive(Parser, Debug)]
#[command(name = "verdict")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the test tool (overrides VERDICT_TOOL and the config file)
    #[arg(long, global = true)]
    tool: Option<String>,

    /// Kill the test tool after this many seconds; 0 disables the limit
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Run the tests in a compiled test binary
    #[command(visible_alias = "r")]
    Run(RunArgs),

    /// Show the effective configuration and where each value came from
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    // Environment variables are read by the config layer, not by clap
    let resolved = Config::resolve(cli.tool.clone(), cli.timeout.map(Duration::from_secs))?;
    let config = &resolved.config;

    if cli.verbose {
        tracing::info!(
            tool = %config.tool.path,
            timeout = ?config.tool.timeout,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("verdict {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Run(args)) => {
            return args.execute(cli.verbose, config).await;
        }
        Some(Commands::Config) => {
            let config_file = Config::default_config_path();
            println!(
                "{}",
                commands::config::describe(&resolved, config_file.as_deref())
            );
        }
        None => {
            println!("Verdict - run a test tool and classify its output");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(ExitCode::SUCCESS)
}
