//! Cache manager for persisting catalog responses to disk
//!
//! Provides a `CacheManager` that stores a source's raw JSON response together
//! with the local time it was captured, and serves it back while it is still
//! within the freshness window.

use chrono::{DateTime, Duration, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::FetchConfig;

/// Timestamp layout written to the `date` field (local time, no offset)
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Errors that can occur when writing to the cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache directory could not be created
    #[error("failed to create cache directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The entry could not be serialized
    #[error("failed to encode cache entry: {0}")]
    Encode(#[from] serde_json::Error),

    /// The entry could not be written or moved into place
    #[error("failed to write cache file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// On-disk layout of a cache file
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    /// When the response was captured, local time
    date: String,
    /// The response exactly as returned by the endpoint
    data: T,
}

/// A fresh cache hit
#[derive(Debug, Clone)]
pub struct CachedResponse {
    /// The cached payload
    pub data: Vec<Value>,
    /// When the payload was captured
    pub cached_at: NaiveDateTime,
    /// How old the entry was when read
    pub age: Duration,
}

/// Manages the snapshot file for a single source
///
/// Files live under the configured cache directory (`~/.cache/orcestradownloader/`
/// on Linux by default), one per source.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
    /// Full path of this source's cache file
    cache_file: PathBuf,
    /// Freshness window in whole days
    max_age_days: i64,
}

impl CacheManager {
    /// Creates a cache manager for `file_name` inside the configured directory
    pub fn new(config: &FetchConfig, file_name: &str) -> Self {
        Self {
            cache_dir: config.cache_dir.clone(),
            cache_file: config.cache_dir.join(file_name),
            max_age_days: config.max_age_days,
        }
    }

    /// Returns the path of the cache file
    pub fn path(&self) -> &Path {
        &self.cache_file
    }

    /// Reads the cached response if it exists and is still fresh
    ///
    /// Missing, unreadable, malformed, and outdated entries all yield `None`.
    /// Outdated entries are left on disk untouched.
    pub fn read(&self) -> Option<CachedResponse> {
        self.read_at(Local::now().naive_local())
    }

    /// Same as [`read`](Self::read) against an explicit "now"
    pub fn read_at(&self, now: NaiveDateTime) -> Option<CachedResponse> {
        debug!(path = %self.cache_file.display(), "Checking for cached response");

        let content = match fs::read_to_string(&self.cache_file) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %self.cache_file.display(), "Cache file not found");
                return None;
            }
            Err(e) => {
                warn!(path = %self.cache_file.display(), error = %e, "Failed to read cache");
                return None;
            }
        };

        let entry: CacheEntry<Vec<Value>> = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(path = %self.cache_file.display(), error = %e, "Failed to load cache");
                return None;
            }
        };

        let Some(cached_at) = parse_timestamp(&entry.date) else {
            warn!(
                path = %self.cache_file.display(),
                date = %entry.date,
                "Failed to load cache: invalid timestamp"
            );
            return None;
        };

        let age = now - cached_at;
        if !is_fresh(age, self.max_age_days) {
            info!(path = %self.cache_file.display(), "Cache is outdated");
            return None;
        }

        info!("Using cached response from {}", describe_age(age));
        Some(CachedResponse {
            data: entry.data,
            cached_at,
            age,
        })
    }

    /// Replaces the cache file with `data`, stamped with the current local time
    ///
    /// The entry is written to a sibling temporary file and renamed over the
    /// previous one so readers never see a half-written snapshot.
    pub fn write(&self, data: &[Value]) -> Result<(), CacheError> {
        self.write_at(data, Local::now().naive_local())
    }

    /// Same as [`write`](Self::write) with an explicit capture time
    pub fn write_at(&self, data: &[Value], captured_at: NaiveDateTime) -> Result<(), CacheError> {
        fs::create_dir_all(&self.cache_dir).map_err(|source| CacheError::CreateDir {
            path: self.cache_dir.clone(),
            source,
        })?;

        let entry = CacheEntry {
            date: format_timestamp(captured_at),
            data,
        };
        let json = serde_json::to_string(&entry)?;

        let tmp_path = self.cache_file.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|source| CacheError::Write {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &self.cache_file).map_err(|source| CacheError::Write {
            path: self.cache_file.clone(),
            source,
        })?;

        info!(path = %self.cache_file.display(), "Response cached successfully");
        Ok(())
    }
}

/// Whether an entry of the given age is still usable
///
/// Ages are truncated to whole days before comparing, so an entry exactly
/// `max_age_days` old is still fresh.
pub fn is_fresh(age: Duration, max_age_days: i64) -> bool {
    age.num_days() <= max_age_days
}

/// Renders an age at its coarsest whole unit ("3 days ago", "5 hours ago", ...)
pub fn describe_age(age: Duration) -> String {
    let days = age.num_days();
    if days > 0 {
        return format!("{days} days ago");
    }
    let hours = age.num_hours();
    if hours > 0 {
        format!("{hours} hours ago")
    } else {
        format!("{} minutes ago", age.num_minutes())
    }
}

/// Formats a capture time the way cache files store it
pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a stored timestamp; offset-qualified values are converted to local time
fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    value.parse::<NaiveDateTime>().ok().or_else(|| {
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| dt.with_timezone(&Local).naive_local())
    })
}
