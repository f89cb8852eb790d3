//! ORCESTRA dataset tool - list, inspect, and locate ORCESTRA datasets
//!
//! Fetches each ORCESTRA catalog (from a local cache when it is fresh enough)
//! and prints listings, tables, or single-record summaries.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use orcestra::cli::Cli;
use orcestra::commands;
use orcestra::progress::SpinnerProgress;
use orcestra::transport::HttpTransport;
use orcestra::{FetchOrchestrator, SourceRegistry};

/// Initializes the tracing subscriber on stderr, optionally as JSON
fn init_tracing() {
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("orcestra=info"));

    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let config = cli.fetch_config();

    let transport = match HttpTransport::new(config.request_timeout) {
        Ok(transport) => transport,
        Err(e) => {
            error!(error = %e, "Failed to build HTTP client");
            return ExitCode::FAILURE;
        }
    };

    let registry = SourceRegistry::orcestra(&config, Arc::new(transport));
    let mut orchestrator = FetchOrchestrator::new(registry, cli.force());
    if !cli.no_progress {
        orchestrator = orchestrator.with_progress(Arc::new(SpinnerProgress::new()));
    }

    match commands::run(&cli.command, &mut orchestrator).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
