//! Cross-source fetch coordination
//!
//! The [`FetchOrchestrator`] resolves sources through the registry, fetches
//! one or all of them, and answers listing and download-path questions over
//! the loaded records. Fetching every source runs the per-source fetches
//! concurrently and isolates their failures from one another.

use futures::future::join_all;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

use crate::error::{Error, Result};
use crate::progress::{NoProgress, ProgressSink};
use crate::registry::SourceRegistry;

/// File extension of downloaded dataset objects
pub const DOWNLOAD_EXTENSION: &str = "zip";

/// A source whose fetch failed during [`FetchOrchestrator::fetch_all`]
#[derive(Debug)]
pub struct SourceFailure {
    pub source_name: String,
    pub error: Error,
}

/// Outcome of fetching every source
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Sources that loaded successfully, in name order
    pub loaded: Vec<String>,
    /// Sources whose fetch failed, in name order
    pub failed: Vec<SourceFailure>,
}

impl FetchReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Coordinates fetches across every registered source
pub struct FetchOrchestrator {
    registry: SourceRegistry,
    force: bool,
    progress: Arc<dyn ProgressSink>,
}

impl FetchOrchestrator {
    /// Creates an orchestrator; `force` bypasses fresh cache snapshots
    pub fn new(registry: SourceRegistry, force: bool) -> Self {
        Self {
            registry,
            force,
            progress: Arc::new(NoProgress),
        }
    }

    /// Replaces the progress sink
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn force(&self) -> bool {
        self.force
    }

    /// Registered source names
    pub fn source_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Fetches a single source
    pub async fn fetch_one(&mut self, name: &str) -> Result<()> {
        let force = self.force;
        let manager = self.registry.get_mut(name)?;

        self.progress.started(name);
        let result = manager.fetch_data(force).await;
        self.progress.finished(name, result.is_ok());
        result
    }

    /// Fetches every source concurrently
    ///
    /// Each failure is logged and reported; it neither cancels nor blocks the
    /// other sources, which keep their previous records when they fail.
    pub async fn fetch_all(&mut self) -> FetchReport {
        let force = self.force;
        let progress = self.progress.as_ref();

        let fetches = self.registry.iter_mut().map(|(name, manager)| async move {
            progress.started(name);
            let result = manager.fetch_data(force).await;
            progress.finished(name, result.is_ok());
            if let Err(e) = &result {
                error!(source = %name, error = %e, "Error fetching source");
            }
            (name.clone(), result)
        });

        let mut report = FetchReport::default();
        for (source_name, result) in join_all(fetches).await {
            match result {
                Ok(()) => report.loaded.push(source_name),
                Err(error) => report.failed.push(SourceFailure { source_name, error }),
            }
        }

        info!(
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            "Finished fetching all sources"
        );
        report
    }

    /// Fetches a source and returns its record names in catalog order
    pub async fn list_one(&mut self, name: &str) -> Result<Vec<String>> {
        self.fetch_one(name).await?;
        let manager = self.registry.get(name)?;
        Ok(manager.names().into_iter().map(str::to_string).collect())
    }

    /// Fetches every source and returns record names per source
    ///
    /// Sources that failed to fetch contribute whatever records they held
    /// before (possibly none).
    pub async fn list_all(&mut self) -> BTreeMap<String, Vec<String>> {
        self.fetch_all().await;
        self.registry
            .all()
            .iter()
            .map(|(name, manager)| {
                let names = manager.names().into_iter().map(str::to_string).collect();
                (name.clone(), names)
            })
            .collect()
    }

    /// Resolves where each requested record would be downloaded to
    ///
    /// Every name is looked up first; then each record must carry a
    /// non-empty download link. Paths are `target_dir/<name>.zip`, in the
    /// order requested. Transferring the files is left to the caller.
    pub async fn resolve_download<S: AsRef<str>>(
        &mut self,
        source_name: &str,
        record_names: &[S],
        target_dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        self.fetch_one(source_name).await?;
        let manager = self.registry.get(source_name)?;

        let records = record_names
            .iter()
            .map(|name| manager.lookup(name.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        records
            .into_iter()
            .map(|record| {
                if record.download_link().is_none() {
                    return Err(Error::MissingDownloadLink {
                        source_name: source_name.to_string(),
                        name: record.name.clone(),
                    });
                }
                if !is_plain_file_name(&record.name) {
                    return Err(Error::InvalidDownloadName {
                        source_name: source_name.to_string(),
                        name: record.name.clone(),
                    });
                }
                Ok(target_dir.join(format!("{}.{DOWNLOAD_EXTENSION}", record.name)))
            })
            .collect()
    }
}

/// Whether `name` is a single path component that stays inside its directory
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}
