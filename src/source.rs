//! Per-source fetch, parse, and lookup
//!
//! A [`SourceManager`] owns one catalog endpoint: where it lives, where its
//! snapshot is cached, and how its elements are parsed. Fetching serves the
//! cached snapshot while it is fresh and otherwise goes to the network,
//! caching the raw response before parsing it.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::CacheManager;
use crate::config::FetchConfig;
use crate::data::{DatasetRecord, RecordParser};
use crate::error::{Error, Result};
use crate::transport::Transport;

/// Maximum number of "did you mean" suggestions
pub const MAX_SUGGESTIONS: usize = 3;

/// Minimum similarity (0.0 to 1.0) for a name to be suggested
pub const SUGGESTION_CUTOFF: f64 = 0.3;

/// Static description of one catalog source
#[derive(Debug, Clone)]
pub struct SourceDescriptor {
    /// Registry key (e.g. "psets")
    pub name: String,
    /// Endpoint returning the JSON array of records
    pub url: String,
    /// File name of the snapshot inside the cache directory
    pub cache_file: String,
    /// Converts one raw element into a record
    pub parser: RecordParser,
}

impl SourceDescriptor {
    /// Creates a descriptor cached under `<name>.json`
    pub fn new(name: impl Into<String>, url: impl Into<String>, parser: RecordParser) -> Self {
        let name = name.into();
        Self {
            cache_file: format!("{name}.json"),
            url: url.into(),
            name,
            parser,
        }
    }
}

/// Where the current record set came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Cache,
    Network,
}

/// Fetch lifecycle of a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    /// Never fetched
    Idle,
    /// A fetch is in progress
    Fetching,
    /// The last fetch succeeded
    Loaded { origin: Origin },
    /// The last fetch failed; earlier records (if any) are kept
    Failed { message: String },
}

/// Owns a single source and its most recently loaded records
pub struct SourceManager {
    descriptor: SourceDescriptor,
    cache: CacheManager,
    transport: Arc<dyn Transport>,
    records: Vec<DatasetRecord>,
    state: FetchState,
}

impl SourceManager {
    /// Creates a manager with no records loaded yet
    pub fn new(
        descriptor: SourceDescriptor,
        config: &FetchConfig,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let cache = CacheManager::new(config, &descriptor.cache_file);
        Self {
            descriptor,
            cache,
            transport,
            records: Vec::new(),
            state: FetchState::Idle,
        }
    }

    /// Registry key of this source
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    /// Records from the last successful fetch, in catalog order
    pub fn records(&self) -> &[DatasetRecord] {
        &self.records
    }

    /// Record names in catalog order
    pub fn names(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.name.as_str()).collect()
    }

    /// Loads the source's records from the cache or the network
    ///
    /// With `force` unset a fresh cache snapshot is used when available.
    /// Otherwise one request is made; its raw response is cached before
    /// parsing, so a parse failure still leaves a usable snapshot. On failure
    /// the previously loaded records are kept.
    pub async fn fetch_data(&mut self, force: bool) -> Result<()> {
        self.state = FetchState::Fetching;
        match self.load(force).await {
            Ok((records, origin)) => {
                info!(
                    source = %self.descriptor.name,
                    count = records.len(),
                    ?origin,
                    "Loaded records"
                );
                self.records = records;
                self.state = FetchState::Loaded { origin };
                Ok(())
            }
            Err(e) => {
                self.state = FetchState::Failed {
                    message: e.to_string(),
                };
                Err(e)
            }
        }
    }

    async fn load(&self, force: bool) -> Result<(Vec<DatasetRecord>, Origin)> {
        let name = &self.descriptor.name;
        info!(source = %name, url = %self.descriptor.url, force, "Fetching data");

        if !force {
            if let Some(cached) = self.cache.read() {
                let records = self.parse_all(&cached.data)?;
                return Ok((records, Origin::Cache));
            }
        }

        let data = self
            .transport
            .get_json(&self.descriptor.url)
            .await
            .map_err(|error| Error::Network {
                source_name: name.clone(),
                url: self.descriptor.url.clone(),
                error,
            })?;
        info!(source = %name, count = data.len(), "Fetched items from API");

        self.cache.write(&data).map_err(|error| Error::CacheWrite {
            source_name: name.clone(),
            error,
        })?;

        let records = self.parse_all(&data)?;
        Ok((records, Origin::Network))
    }

    fn parse_all(&self, data: &[Value]) -> Result<Vec<DatasetRecord>> {
        data.iter()
            .enumerate()
            .map(|(index, raw)| {
                (self.descriptor.parser)(raw).map_err(|error| Error::Parse {
                    source_name: self.descriptor.name.clone(),
                    index,
                    error,
                })
            })
            .collect()
    }

    /// Finds a record by exact name
    ///
    /// Fails with [`Error::NotFound`] carrying up to three similar names.
    pub fn lookup(&self, name: &str) -> Result<&DatasetRecord> {
        if let Some(record) = self.records.iter().find(|r| r.name == name) {
            return Ok(record);
        }

        let suggestions = similar_names(name, self.names());
        if suggestions.is_empty() {
            warn!(source = %self.descriptor.name, name, "Dataset not found and no similar names found");
        } else {
            debug!(source = %self.descriptor.name, name, ?suggestions, "Dataset not found");
        }
        Err(Error::NotFound {
            source_name: self.descriptor.name.clone(),
            name: name.to_string(),
            suggestions,
        })
    }
}

/// Ranks `candidates` by similarity to `name`
///
/// Returns at most [`MAX_SUGGESTIONS`] names scoring at least
/// [`SUGGESTION_CUTOFF`] by Sørensen-Dice bigram similarity, best first.
/// Ties keep candidate order.
pub fn similar_names<'a>(name: &str, candidates: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut scored: Vec<(f64, &str)> = candidates
        .into_iter()
        .map(|candidate| (strsim::sorensen_dice(name, candidate), candidate))
        .filter(|(score, _)| *score >= SUGGESTION_CUTOFF)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::format_timestamp;
    use crate::data::parse_toxico_set;
    use crate::transport::mock::{MockResponse, MockTransport};
    use chrono::{Duration, Local};
    use serde_json::json;
    use tempfile::TempDir;

    const URL: &str = "https://orcestra.test/api/toxicosets/available";

    fn raw_record(name: &str, link: &str) -> Value {
        json!({
            "name": name,
            "doi": "10.5281/zenodo.1",
            "downloadLink": link,
            "dataset": {
                "name": name,
                "versionInfo": {"version": "1", "publication": []}
            },
            "availableDatatypes": [{"name": "rnaseq"}]
        })
    }

    fn payload(names: &[&str]) -> Vec<Value> {
        names
            .iter()
            .map(|n| raw_record(n, "https://zenodo.org/x"))
            .collect()
    }

    fn create_test_manager() -> (SourceManager, Arc<MockTransport>, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = FetchConfig::with_cache_dir(temp_dir.path().to_path_buf());
        let transport = Arc::new(MockTransport::new());
        let descriptor = SourceDescriptor::new("toxicosets", URL, parse_toxico_set);
        let manager = SourceManager::new(descriptor, &config, transport.clone());
        (manager, transport, temp_dir)
    }

    #[test]
    fn test_descriptor_cache_file_follows_name() {
        let descriptor = SourceDescriptor::new("psets", URL, parse_toxico_set);
        assert_eq!(descriptor.cache_file, "psets.json");
    }

    #[test]
    fn test_new_manager_is_idle_and_empty() {
        let (manager, _transport, _temp_dir) = create_test_manager();
        assert_eq!(manager.state(), &FetchState::Idle);
        assert!(manager.records().is_empty());
        assert_eq!(manager.name(), "toxicosets");
    }

    #[tokio::test]
    async fn test_fetch_goes_to_network_and_caches() {
        let (mut manager, transport, _temp_dir) = create_test_manager();
        transport.push(URL, MockResponse::Ok(payload(&["A", "B"])));

        manager.fetch_data(false).await.expect("Fetch should succeed");

        assert_eq!(manager.names(), vec!["A", "B"]);
        assert_eq!(transport.calls_to(URL), 1);
        assert_eq!(
            manager.state(),
            &FetchState::Loaded {
                origin: Origin::Network
            }
        );
        assert!(manager.cache().path().exists(), "Response should be cached");
    }

    #[tokio::test]
    async fn test_second_fetch_uses_fresh_cache() {
        let (mut manager, transport, _temp_dir) = create_test_manager();
        transport.push(URL, MockResponse::Ok(payload(&["A", "B"])));

        manager.fetch_data(false).await.unwrap();
        manager.fetch_data(false).await.expect("Cached fetch should succeed");

        assert_eq!(transport.calls_to(URL), 1, "Second fetch should not hit the network");
        assert_eq!(manager.names(), vec!["A", "B"]);
        assert_eq!(
            manager.state(),
            &FetchState::Loaded {
                origin: Origin::Cache
            }
        );
    }

    #[tokio::test]
    async fn test_stale_cache_triggers_network() {
        let (mut manager, transport, _temp_dir) = create_test_manager();
        manager
            .cache()
            .write_at(&payload(&["Old"]), Local::now().naive_local() - Duration::days(30))
            .unwrap();
        transport.push(URL, MockResponse::Ok(payload(&["New"])));

        manager.fetch_data(false).await.unwrap();

        assert_eq!(transport.calls_to(URL), 1);
        assert_eq!(manager.names(), vec!["New"]);
    }

    #[tokio::test]
    async fn test_force_refresh_replaces_records_wholesale() {
        let (mut manager, transport, _temp_dir) = create_test_manager();
        transport.push(URL, MockResponse::Ok(payload(&["A", "B", "C"])));
        transport.push(URL, MockResponse::Ok(payload(&["D"])));

        manager.fetch_data(true).await.unwrap();
        manager.fetch_data(true).await.unwrap();

        assert_eq!(transport.calls_to(URL), 2);
        assert_eq!(manager.names(), vec!["D"]);
        assert_eq!(manager.records().len(), 1);
    }

    #[tokio::test]
    async fn test_network_failure_keeps_previous_records_and_cache() {
        let (mut manager, transport, _temp_dir) = create_test_manager();
        transport.push(URL, MockResponse::Ok(payload(&["A"])));
        transport.push(URL, MockResponse::Status(503));

        manager.fetch_data(true).await.unwrap();
        let err = manager.fetch_data(true).await.unwrap_err();

        assert!(matches!(err, Error::Network { .. }));
        assert!(matches!(manager.state(), FetchState::Failed { .. }));
        assert_eq!(manager.names(), vec!["A"], "Previous records should be kept");

        let cached = manager.cache().read().expect("Earlier snapshot should survive");
        assert_eq!(cached.data, payload(&["A"]));
    }

    #[tokio::test]
    async fn test_cache_write_failure_fails_fetch_and_keeps_records() {
        let temp_dir = TempDir::new().unwrap();
        let cache_dir = temp_dir.path().join("cache");
        let config = FetchConfig::with_cache_dir(cache_dir.clone());
        let transport = Arc::new(MockTransport::new());
        let descriptor = SourceDescriptor::new("toxicosets", URL, parse_toxico_set);
        let mut manager = SourceManager::new(descriptor, &config, transport.clone());
        transport.push(URL, MockResponse::Ok(payload(&["A"])));
        transport.push(URL, MockResponse::Ok(payload(&["B"])));

        manager.fetch_data(true).await.unwrap();

        // A regular file where the cache directory should be
        std::fs::remove_dir_all(&cache_dir).unwrap();
        std::fs::write(&cache_dir, "not a directory").unwrap();

        let err = manager.fetch_data(true).await.unwrap_err();

        assert!(matches!(err, Error::CacheWrite { .. }), "got {err:?}");
        assert_eq!(transport.calls_to(URL), 2, "Network call should have succeeded");
        assert!(matches!(manager.state(), FetchState::Failed { .. }));
        assert_eq!(manager.names(), vec!["A"], "Previous records should be kept");
    }

    #[tokio::test]
    async fn test_parse_failure_still_caches_response() {
        let (mut manager, transport, _temp_dir) = create_test_manager();
        let mut data = payload(&["A"]);
        data.push(json!({"not": "a record"}));
        transport.push(URL, MockResponse::Ok(data.clone()));

        let err = manager.fetch_data(false).await.unwrap_err();

        match err {
            Error::Parse { index, .. } => assert_eq!(index, 1),
            other => panic!("Expected parse error, got {other:?}"),
        }
        assert!(manager.records().is_empty(), "No partial record set should be stored");
        let cached = manager.cache().read().expect("Raw response should be cached");
        assert_eq!(cached.data, data);
    }

    #[tokio::test]
    async fn test_fresh_seeded_cache_skips_network() {
        let (mut manager, transport, temp_dir) = create_test_manager();
        let content = json!({
            "date": format_timestamp(Local::now().naive_local()),
            "data": payload(&["Seeded"]),
        });
        std::fs::write(temp_dir.path().join("toxicosets.json"), content.to_string()).unwrap();

        manager.fetch_data(false).await.unwrap();

        assert_eq!(transport.calls_to(URL), 0);
        assert_eq!(manager.names(), vec!["Seeded"]);
    }

    #[tokio::test]
    async fn test_lookup_exact_and_suggestions() {
        let (mut manager, transport, _temp_dir) = create_test_manager();
        transport.push(URL, MockResponse::Ok(payload(&["Foom", "Fop", "Unrelated"])));
        manager.fetch_data(false).await.unwrap();

        assert_eq!(manager.lookup("Fop").unwrap().name, "Fop");

        match manager.lookup("Foo").unwrap_err() {
            Error::NotFound {
                name, suggestions, ..
            } => {
                assert_eq!(name, "Foo");
                assert_eq!(suggestions, vec!["Foom", "Fop"]);
            }
            other => panic!("Expected NotFound, got {other:?}"),
        }

        match manager.lookup("Zzz").unwrap_err() {
            Error::NotFound { suggestions, .. } => assert!(suggestions.is_empty()),
            other => panic!("Expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_similar_names_limits_and_ranks() {
        let candidates = ["GDSC_2019", "GDSC_2020", "GDSC_2018", "GDSC_2017", "CCLE"];
        let suggestions = similar_names("GDSC_2020", candidates);
        assert_eq!(suggestions.len(), MAX_SUGGESTIONS);
        assert_eq!(suggestions[0], "GDSC_2020");
        assert!(!suggestions.contains(&"CCLE".to_string()));
    }

    #[test]
    fn test_similar_names_matches_short_prefix() {
        let candidates = ["GDSC_2020(v2-8.2)", "CCLE_2015", "gCSI_2019"];
        assert_eq!(similar_names("GDSC", candidates), vec!["GDSC_2020(v2-8.2)"]);
    }

    #[test]
    fn test_similar_names_empty_candidates() {
        assert!(similar_names("anything", Vec::<&str>::new()).is_empty());
    }
}
