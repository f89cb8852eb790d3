//! Progress reporting for concurrent source fetches
//!
//! Fetch durations are unknown up front, so each source gets an
//! indeterminate spinner that is cleared once its fetch settles. Reporting is
//! purely observational: sinks never influence fetch outcomes.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Receives start and finish signals for each source fetch
pub trait ProgressSink: Send + Sync {
    /// A fetch for `source` has started
    fn started(&self, source: &str);

    /// The fetch for `source` has settled
    fn finished(&self, source: &str, success: bool);
}

/// Discards all progress signals
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn started(&self, _source: &str) {}

    fn finished(&self, _source: &str, _success: bool) {}
}

/// Renders one transient spinner per in-flight source on stderr
pub struct SpinnerProgress {
    multi: MultiProgress,
    bars: Mutex<HashMap<String, ProgressBar>>,
}

impl SpinnerProgress {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }
}

impl Default for SpinnerProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for SpinnerProgress {
    fn started(&self, source: &str) {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(Self::spinner_style());
        pb.set_message(format!("Fetching {source}..."));
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut bars) = self.bars.lock() {
            bars.insert(source.to_string(), pb);
        }
    }

    fn finished(&self, source: &str, _success: bool) {
        let pb = self.bars.lock().ok().and_then(|mut bars| bars.remove(source));
        if let Some(pb) = pb {
            pb.finish_and_clear();
            self.multi.remove(&pb);
        }
    }
}
