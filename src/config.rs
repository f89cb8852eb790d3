//! Runtime configuration shared by every source
//!
//! Holds the cache location, the freshness window, and the HTTP timeout.
//! The CLI builds one of these at startup and hands it down to each
//! `SourceManager` and its cache.

use directories::ProjectDirs;
use std::path::PathBuf;
use std::time::Duration;

/// Number of whole days a cached response stays fresh
pub const DEFAULT_MAX_AGE_DAYS: i64 = 7;

/// Upper bound on a single catalog request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Application name used for the XDG cache directory
const APP_NAME: &str = "orcestradownloader";

/// Configuration for fetching and caching catalog responses
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Directory holding one `<source>.json` snapshot per source
    pub cache_dir: PathBuf,
    /// Maximum age in whole days before a snapshot is ignored
    pub max_age_days: i64,
    /// Timeout applied to each HTTP request
    pub request_timeout: Duration,
}

impl FetchConfig {
    /// Creates a config rooted at a specific cache directory
    pub fn with_cache_dir(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            ..Self::default()
        }
    }

    /// Overrides the freshness window
    pub fn max_age_days(mut self, days: i64) -> Self {
        self.max_age_days = days;
        self
    }

    /// Returns the XDG-compliant cache directory, if one can be determined
    ///
    /// Uses `~/.cache/orcestradownloader/` on Linux.
    pub fn default_cache_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.cache_dir().to_path_buf())
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        let cache_dir = Self::default_cache_dir()
            .unwrap_or_else(|| PathBuf::from(".cache").join(APP_NAME));
        Self {
            cache_dir,
            max_age_days: DEFAULT_MAX_AGE_DAYS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = FetchConfig::default();
        assert_eq!(config.max_age_days, 7);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert!(config.cache_dir.to_string_lossy().contains(APP_NAME));
    }

    #[test]
    fn test_with_cache_dir_keeps_defaults() {
        let config = FetchConfig::with_cache_dir(PathBuf::from("/tmp/orcestra-test"));
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/orcestra-test"));
        assert_eq!(config.max_age_days, DEFAULT_MAX_AGE_DAYS);
    }

    #[test]
    fn test_max_age_override() {
        let config = FetchConfig::with_cache_dir(PathBuf::from("cache")).max_age_days(1);
        assert_eq!(config.max_age_days, 1);
    }
}
