//! Metric catalog
//!
//! Maps source names to the metrics discovered under them. Built once per
//! refresh, read-only during query execution, and replaced wholesale by
//! the next successful refresh: readers always hold a complete snapshot,
//! never a partially populated catalog.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Location of one dataset inside an archive file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor {
    /// Dataset name inside the archive
    pub dataset: String,

    /// Archive file path
    pub archive_path: PathBuf,
}

impl MetricDescriptor {
    /// Create a new descriptor
    pub fn new(dataset: impl Into<String>, archive_path: impl Into<PathBuf>) -> Self {
        Self {
            dataset: dataset.into(),
            archive_path: archive_path.into(),
        }
    }
}

/// Mapping from source name to metric full name to descriptor
///
/// Metric full names take the shape `<metric>/<dataset>` when an archive
/// exposes multiple datasets.
#[derive(Debug, Default)]
pub struct MetricCatalog {
    sources: HashMap<String, HashMap<String, MetricDescriptor>>,
    count: usize,
}

impl MetricCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a metric entry under a source
    pub fn insert(
        &mut self,
        source: impl Into<String>,
        metric: impl Into<String>,
        descriptor: MetricDescriptor,
    ) {
        let previous = self
            .sources
            .entry(source.into())
            .or_default()
            .insert(metric.into(), descriptor);
        if previous.is_none() {
            self.count += 1;
        }
    }

    /// Resolve a (source, metric) pair to its descriptor
    pub fn resolve(&self, source: &str, metric: &str) -> Option<&MetricDescriptor> {
        self.sources.get(source)?.get(metric)
    }

    /// Total number of metric entries across all sources
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check whether the catalog holds no entries
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterate over source names
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    /// Iterate over (source, metric, descriptor) entries
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, &MetricDescriptor)> {
        self.sources.iter().flat_map(|(source, metrics)| {
            metrics
                .iter()
                .map(move |(metric, desc)| (source.as_str(), metric.as_str(), desc))
        })
    }
}

/// Shared handle to the current catalog snapshot
///
/// Queries take an `Arc` snapshot and keep using it even while a refresh
/// builds the replacement; the swap itself is a single pointer store.
#[derive(Debug, Default)]
pub struct CatalogHandle {
    current: RwLock<Arc<MetricCatalog>>,
}

impl CatalogHandle {
    /// Create a handle holding an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current catalog snapshot
    pub fn current(&self) -> Arc<MetricCatalog> {
        Arc::clone(&self.current.read())
    }

    /// Replace the catalog with a fully built successor
    pub fn replace(&self, catalog: MetricCatalog) {
        *self.current.write() = Arc::new(catalog);
    }
}

/// Helper to build the `<metric>/<dataset>` full name
pub fn metric_full_name(metric: &str, dataset: &str) -> String {
    format!("{}/{}", metric, dataset)
}
