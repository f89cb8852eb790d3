//! Error type shared by sources, the registry, and the orchestrator

use thiserror::Error;

use crate::cache::CacheError;
use crate::data::RecordError;
use crate::transport::TransportError;

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to callers of the fetch and lookup operations
#[derive(Debug, Error)]
pub enum Error {
    /// The catalog request for a source failed
    #[error("{source_name}: request to {url} failed: {error}")]
    Network {
        source_name: String,
        url: String,
        #[source]
        error: TransportError,
    },

    /// An element of a source's payload could not be parsed
    #[error("{source_name}: failed to parse record #{index}: {error}")]
    Parse {
        source_name: String,
        index: usize,
        #[source]
        error: RecordError,
    },

    /// A successful response could not be written to the cache
    #[error("{source_name}: failed to cache response: {error}")]
    CacheWrite {
        source_name: String,
        #[source]
        error: CacheError,
    },

    /// No record with the requested name exists in the source
    #[error("{}", not_found_message(.source_name, .name, .suggestions))]
    NotFound {
        source_name: String,
        name: String,
        suggestions: Vec<String>,
    },

    /// No source is registered under the requested name
    #[error("unknown source '{name}'. Available sources: {}", .available.join(", "))]
    UnknownSource { name: String, available: Vec<String> },

    /// The record exists but has no download link
    #[error("dataset '{name}' in {source_name} does not have a download link")]
    MissingDownloadLink { source_name: String, name: String },

    /// The record name cannot be used as a file name inside the target directory
    #[error("dataset name '{name}' in {source_name} is not a valid file name")]
    InvalidDownloadName { source_name: String, name: String },
}

impl Error {
    /// Alternatives worth showing the user, if any
    pub fn suggestions(&self) -> &[String] {
        match self {
            Error::NotFound { suggestions, .. } => suggestions,
            Error::UnknownSource { available, .. } => available,
            _ => &[],
        }
    }
}

fn not_found_message(source_name: &str, name: &str, suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        format!("dataset '{name}' not found in {source_name} and no similar names found")
    } else {
        format!(
            "dataset '{name}' not found in {source_name}. Did you mean: {}?",
            suggestions.join(", ")
        )
    }
}
