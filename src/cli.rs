//! Command-line interface parsing for the ORCESTRA dataset tool
//!
//! Global flags control caching (`--refresh`, `--cache-dir`, `--max-age-days`)
//! and progress output; subcommands select what to do with the catalog.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{FetchConfig, DEFAULT_MAX_AGE_DAYS};

/// ORCESTRA dataset tool - list, inspect, and locate ORCESTRA datasets
#[derive(Parser, Debug)]
#[command(name = "orcestra")]
#[command(about = "List, inspect, and locate ORCESTRA datasets")]
#[command(version)]
pub struct Cli {
    /// Ignore cached responses and fetch every catalog from the API
    #[arg(long, global = true)]
    pub refresh: bool,

    /// Directory holding cached catalog responses
    #[arg(long, global = true, env = "ORCESTRA_CACHE_DIR", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Number of days a cached response is used before refetching
    #[arg(
        long,
        global = true,
        value_name = "DAYS",
        default_value_t = DEFAULT_MAX_AGE_DAYS,
        value_parser = clap::value_parser!(i64).range(0..)
    )]
    pub max_age_days: i64,

    /// Do not show progress spinners
    #[arg(long, global = true)]
    pub no_progress: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List dataset names of one source, or of every source
    List {
        /// Source to list (e.g. psets); all sources when omitted
        source: Option<String>,

        /// Print one name per line without decoration
        #[arg(long)]
        plain: bool,
    },

    /// Print a table of datasets for one source, or for every source
    Table {
        /// Source to print; all sources when omitted
        source: Option<String>,
    },

    /// Show the details of a single dataset
    Show {
        /// Source the dataset belongs to
        source: String,

        /// Dataset name
        name: String,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve where datasets would be downloaded to
    Download {
        /// Source the datasets belong to
        source: String,

        /// Dataset names
        #[arg(required = true)]
        names: Vec<String>,

        /// Target directory
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        directory: PathBuf,
    },

    /// Refresh every source's cached response
    Hydrate,
}

impl Cli {
    /// Builds the fetch configuration from the global flags
    pub fn fetch_config(&self) -> FetchConfig {
        let config = match &self.cache_dir {
            Some(dir) => FetchConfig::with_cache_dir(dir.clone()),
            None => FetchConfig::default(),
        };
        config.max_age_days(self.max_age_days)
    }

    /// Whether fresh cache snapshots should be bypassed
    pub fn force(&self) -> bool {
        self.refresh || self.command == Command::Hydrate
    }
}
