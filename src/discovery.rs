//! Catalog discovery
//!
//! Walks the archive root, recovers (source, metric) identity pairs from
//! relative file paths via the configured identity pattern, enumerates
//! each archive's datasets, and streams discovered pairs eagerly while
//! building the replacement catalog.
//!
//! Events flow through one bounded channel carrying a tagged
//! [`DiscoveryEvent`]; a traversal failure arrives as the terminal
//! `Failed` event and the channel closes exactly once on every path:
//! success, fatal error, cancellation, or consumer hang-up.

use crate::catalog::{metric_full_name, CatalogHandle, MetricCatalog, MetricDescriptor};
use crate::engine::ExecutionEngine;
use crate::error::{ConfigError, DiscoveryError};
use crate::walker::FileWalker;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Identity pattern mapping relative archive paths to (source, metric)
///
/// The pattern must carry exactly the two named capture groups `source`
/// and `metric`; anything else is a configuration error raised before any
/// file is visited.
#[derive(Debug, Clone)]
pub struct IdentityPattern {
    regex: Regex,
}

impl IdentityPattern {
    /// Compile and validate an identity pattern
    pub fn compile(pattern: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(pattern)?;

        let mut has_source = false;
        let mut has_metric = false;
        for name in regex.capture_names().flatten() {
            match name {
                "source" => has_source = true,
                "metric" => has_metric = true,
                other => {
                    return Err(ConfigError::InvalidPatternKeyword(other.to_string()));
                }
            }
        }
        if !has_source {
            return Err(ConfigError::MissingPatternKeyword("source"));
        }
        if !has_metric {
            return Err(ConfigError::MissingPatternKeyword("metric"));
        }

        Ok(Self { regex })
    }

    /// Extract the (source, metric) pair from a relative path
    pub fn identify(&self, relative: &str) -> Option<(String, String)> {
        let captures = self.regex.captures(relative)?;
        let source = captures.name("source")?.as_str().to_string();
        let metric = captures.name("metric")?.as_str().to_string();
        Some((source, metric))
    }
}

/// One discovery stream item
#[derive(Debug)]
pub enum DiscoveryEvent {
    /// A discovered (source, metric full name) pair
    Metric {
        /// Source name extracted from the path
        source: String,
        /// Metric full name (`<metric>/<dataset>`)
        metric: String,
    },

    /// Terminal failure; no further events follow
    Failed(DiscoveryError),
}

/// Handle to a running discovery
///
/// Dropping the handle cancels the worker: the event receiver hangs up
/// and the producer stops at its next send.
#[derive(Debug)]
pub struct Refresh {
    events: mpsc::Receiver<DiscoveryEvent>,
    shutdown: mpsc::Sender<()>,
}

impl Refresh {
    pub(crate) fn new(events: mpsc::Receiver<DiscoveryEvent>, shutdown: mpsc::Sender<()>) -> Self {
        Self { events, shutdown }
    }

    /// Receive the next discovery event; `None` signals end-of-discovery
    pub async fn recv(&mut self) -> Option<DiscoveryEvent> {
        self.events.recv().await
    }

    /// Ask the discovery worker to stop
    ///
    /// The event stream still closes exactly once; events already in
    /// flight may be delivered first.
    pub fn cancel(&self) {
        let _ = self.shutdown.try_send(());
    }
}

pub(crate) struct DiscoveryWorker {
    pub(crate) root: PathBuf,
    pub(crate) pattern: IdentityPattern,
    pub(crate) walker: Arc<dyn FileWalker>,
    pub(crate) engine: Arc<dyn ExecutionEngine>,
    pub(crate) catalog: Arc<CatalogHandle>,
}

impl DiscoveryWorker {
    /// Run the discovery walk
    ///
    /// Streams each discovered pair as soon as its archive is parsed. On
    /// success the fully built catalog replaces the current one before
    /// the event stream closes, so a consumer that drains the stream to
    /// its end always observes the new catalog. An aborted discovery
    /// (fatal walk error, cancellation, consumer hang-up) leaves the
    /// current catalog untouched. The event sender is owned by this call,
    /// so the stream closes exactly once, on return.
    pub(crate) async fn run(self, events: mpsc::Sender<DiscoveryEvent>, mut shutdown: mpsc::Receiver<()>) {
        let entries = match self.walker.walk(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                let _ = events.send(DiscoveryEvent::Failed(e.into())).await;
                return;
            }
        };

        let mut catalog = MetricCatalog::new();

        for entry in entries {
            if shutdown.try_recv().is_ok() {
                info!("discovery cancelled");
                return;
            }

            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    let _ = events.send(DiscoveryEvent::Failed(e.into())).await;
                    return;
                }
            };

            let Some((source, metric)) = self.identify_file(&path) else {
                continue;
            };

            let datasets = match self.engine.dataset_names(&path).await {
                Ok(datasets) => datasets,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable archive");
                    continue;
                }
            };

            for dataset in datasets {
                let full_name = metric_full_name(&metric, &dataset);
                catalog.insert(
                    source.clone(),
                    full_name.clone(),
                    MetricDescriptor::new(&dataset, &path),
                );

                let event = DiscoveryEvent::Metric {
                    source: source.clone(),
                    metric: full_name,
                };
                tokio::select! {
                    _ = shutdown.recv() => {
                        info!("discovery cancelled");
                        return;
                    }
                    sent = events.send(event) => {
                        if sent.is_err() {
                            debug!("discovery consumer hung up");
                            return;
                        }
                    }
                }
            }
        }

        info!(metrics = catalog.len(), "discovery finished");
        self.catalog.replace(catalog);
    }

    fn identify_file(&self, path: &Path) -> Option<(String, String)> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let relative = relative.to_string_lossy();

        match self.pattern.identify(&relative) {
            Some(pair) => Some(pair),
            None => {
                warn!(path = %path.display(), "file does not match pattern");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r"(?P<source>[^/]+)/(?P<metric>.+)\.rrd";

    #[test]
    fn test_compile_valid_pattern() {
        let pattern = IdentityPattern::compile(VALID).unwrap();
        let (source, metric) = pattern.identify("host1/interface/eth0.rrd").unwrap();
        assert_eq!(source, "host1");
        assert_eq!(metric, "interface/eth0");
    }

    #[test]
    fn test_missing_source_keyword_fails() {
        let err = IdentityPattern::compile(r"(?P<metric>.+)\.rrd").unwrap_err();
        assert!(matches!(err, ConfigError::MissingPatternKeyword("source")));
    }

    #[test]
    fn test_missing_metric_keyword_fails() {
        let err = IdentityPattern::compile(r"(?P<source>[^/]+)/.+\.rrd").unwrap_err();
        assert!(matches!(err, ConfigError::MissingPatternKeyword("metric")));
    }

    #[test]
    fn test_foreign_keyword_fails() {
        let err =
            IdentityPattern::compile(r"(?P<source>[^/]+)/(?P<host>[^/]+)/(?P<metric>.+)\.rrd")
                .unwrap_err();
        match err {
            ConfigError::InvalidPatternKeyword(keyword) => assert_eq!(keyword, "host"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_regex_fails() {
        assert!(matches!(
            IdentityPattern::compile(r"(?P<source>[^/]+"),
            Err(ConfigError::Pattern(_))
        ));
    }

    #[test]
    fn test_group_order_does_not_matter() {
        let pattern =
            IdentityPattern::compile(r"(?P<metric>[^/]+)@(?P<source>[^/]+)\.rrd").unwrap();
        let (source, metric) = pattern.identify("load@host1.rrd").unwrap();
        assert_eq!(source, "host1");
        assert_eq!(metric, "load");
    }

    #[test]
    fn test_non_matching_path_yields_none() {
        let pattern = IdentityPattern::compile(VALID).unwrap();
        assert!(pattern.identify("stray-file.txt").is_none());
    }
}
