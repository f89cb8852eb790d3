//! Subcommand execution
//!
//! Each subcommand drives the orchestrator and prints its result to stdout.
//! Diagnostics go through `tracing` (stderr).

use tracing::warn;

use crate::cli::Command;
use crate::error::Result;
use crate::orchestrator::FetchOrchestrator;
use crate::render;

/// Runs a parsed subcommand against the orchestrator
pub async fn run(command: &Command, orchestrator: &mut FetchOrchestrator) -> Result<()> {
    match command {
        Command::List {
            source: Some(source),
            plain,
        } => {
            let names = orchestrator.list_one(source).await?;
            if *plain {
                print!("{}", render::names_plain(None, &names));
            } else {
                print!("{}", render::names_pretty(source, &names));
            }
        }
        Command::List {
            source: None,
            plain,
        } => {
            for (source, names) in orchestrator.list_all().await {
                if *plain {
                    print!("{}", render::names_plain(Some(source.as_str()), &names));
                } else {
                    print!("{}", render::names_pretty(&source, &names));
                }
            }
        }
        Command::Table {
            source: Some(source),
        } => {
            orchestrator.fetch_one(source).await?;
            let manager = orchestrator.registry().get(source)?;
            println!("{}", render::records_table(source, manager.records()));
        }
        Command::Table { source: None } => {
            orchestrator.fetch_all().await;
            for (source, manager) in orchestrator.registry().all() {
                println!("{}", render::records_table(source, manager.records()));
            }
        }
        Command::Show { source, name, json } => {
            orchestrator.fetch_one(source).await?;
            let record = orchestrator.registry().get(source)?.lookup(name)?;
            if *json {
                match serde_json::to_string_pretty(record) {
                    Ok(text) => println!("{text}"),
                    Err(e) => warn!(error = %e, "Failed to encode record as JSON"),
                }
            } else {
                println!("{}", render::record_summary(record));
            }
        }
        Command::Download {
            source,
            names,
            directory,
        } => {
            let paths = orchestrator
                .resolve_download(source, names, directory)
                .await?;
            for path in paths {
                println!("{}", path.display());
            }
        }
        Command::Hydrate => {
            let report = orchestrator.fetch_all().await;
            for source in &report.loaded {
                println!("{source}: cached");
            }
            for failure in &report.failed {
                println!("{}: failed ({})", failure.source_name, failure.error);
            }
        }
    }
    Ok(())
}
