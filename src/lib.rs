//! ORCESTRA dataset catalog library
//!
//! Fetches the dataset catalogs published by ORCESTRA (pharmacogenomic,
//! radiogenomic, toxicogenomic, xenograft, and clinical ICB sets), caches each
//! catalog's raw response on disk for a configurable number of days, and
//! exposes listing and lookup over the parsed records.
//!
//! The pieces, leaf first:
//!
//! - [`cache`] - per-source snapshot file with a day-based freshness check
//! - [`source`] - one source's fetch/parse/lookup, backed by its cache
//! - [`registry`] - name-keyed collection of sources
//! - [`orchestrator`] - fetches one or all sources concurrently

pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod data;
pub mod error;
pub mod orchestrator;
pub mod progress;
pub mod registry;
pub mod render;
pub mod source;
pub mod transport;

pub use config::FetchConfig;
pub use data::DatasetRecord;
pub use error::{Error, Result};
pub use orchestrator::{FetchOrchestrator, FetchReport};
pub use registry::SourceRegistry;
pub use source::{FetchState, SourceDescriptor, SourceManager};
