//! Command-line entry point: `term-explore <path-to-file>`.
//!
//! Reads the narrative service credential from `AIPROXY_TOKEN` (or a `.env`
//! file), analyzes the file, and writes `README.md` plus one SVG per
//! visualization into the working directory.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use term_explore::config::{NarrativeConfig, PipelineConfig};
use term_explore::logging::setup::{init_logging, LoggingConfig};
use term_explore::narrative::ChatCompletionClient;
use term_explore::pipeline::Pipeline;
use term_explore::{Result, TermError};

/// Automated exploratory analysis of a delimited data file.
#[derive(Debug, Parser)]
#[command(name = "term-explore", author, version, about, long_about = None)]
struct Cli {
    /// Path to the CSV file to analyze.
    path: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(LoggingConfig::default()) {
        eprintln!("Failed to initialize logging: {e}");
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Analysis aborted");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let narrative = NarrativeConfig::from_env()?;
    let client = ChatCompletionClient::new(narrative)
        .map_err(|e| TermError::configuration(e.to_string()))?;

    let pipeline = Pipeline::new(PipelineConfig::default(), Arc::new(client));
    let outcome = pipeline.run(&cli.path).await?;

    info!(
        report = %outcome.report_path.display(),
        artifacts = outcome.artifacts.len(),
        degraded = outcome.is_degraded(),
        "Done"
    );
    Ok(())
}
