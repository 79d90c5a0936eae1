//! RRD connector
//!
//! Ties the pieces together: discovery fills the metric catalog, queries
//! compile against the current catalog snapshot, run on the execution
//! engine, and merge into per-series results.

use crate::catalog::{CatalogHandle, MetricCatalog};
use crate::config::ConnectorSettings;
use crate::discovery::{DiscoveryWorker, IdentityPattern, Refresh};
use crate::engine::ExecutionEngine;
use crate::error::{ConfigError, Error};
use crate::query::{compile, merge};
use crate::types::{GroupQuery, PlotResult, TimeRange};
use crate::walker::{FileWalker, OsWalker};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

/// Connector exposing a tree of RRD archives as a queryable metric source
pub struct RrdConnector {
    settings: ConnectorSettings,
    engine: Arc<dyn ExecutionEngine>,
    walker: Arc<dyn FileWalker>,
    catalog: Arc<CatalogHandle>,
}

impl std::fmt::Debug for RrdConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RrdConnector")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl RrdConnector {
    /// Create a connector from validated settings
    pub fn new(
        settings: ConnectorSettings,
        engine: Arc<dyn ExecutionEngine>,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            settings,
            engine,
            walker: Arc::new(OsWalker),
            catalog: Arc::new(CatalogHandle::new()),
        })
    }

    /// Swap the file tree walker
    pub fn with_walker(mut self, walker: Arc<dyn FileWalker>) -> Self {
        self.walker = walker;
        self
    }

    /// Connector settings
    pub fn settings(&self) -> &ConnectorSettings {
        &self.settings
    }

    /// Current catalog snapshot
    pub fn catalog(&self) -> Arc<MetricCatalog> {
        self.catalog.current()
    }

    /// Retrieve raw samples and summary statistics for a group query
    pub async fn get_plots(
        &self,
        query: &GroupQuery,
        range: TimeRange,
        step: Duration,
        percentiles: &[f64],
    ) -> Result<HashMap<String, PlotResult>, Error> {
        self.fetch(query, range, step, percentiles, true).await
    }

    /// Retrieve summary statistics only
    ///
    /// Skips the export program entirely; every returned result carries an
    /// empty sample sequence.
    pub async fn get_statistics(
        &self,
        query: &GroupQuery,
        range: TimeRange,
        percentiles: &[f64],
    ) -> Result<HashMap<String, PlotResult>, Error> {
        self.fetch(query, range, Duration::ZERO, percentiles, false)
            .await
    }

    async fn fetch(
        &self,
        query: &GroupQuery,
        range: TimeRange,
        step: Duration,
        percentiles: &[f64],
        with_samples: bool,
    ) -> Result<HashMap<String, PlotResult>, Error> {
        let catalog = self.catalog.current();
        let compiled = compile(query, &catalog, percentiles, with_samples)?;

        let table = if with_samples {
            Some(self.engine.export(&compiled.export, range, step).await?)
        } else {
            None
        };

        // The graph-info program runs even for sample-only calls; the
        // summary statistics are part of every query result.
        let stat_lines = self.engine.graph_info(&compiled.graph, range).await?;

        Ok(merge(table.as_ref(), &stat_lines, &compiled.labels))
    }

    /// Trigger a full catalog rebuild
    ///
    /// Pattern validation failures surface here, before any file is
    /// visited. The returned [`Refresh`] streams discovered (source,
    /// metric) pairs eagerly; on success the fully built catalog replaces
    /// the current one atomically. A failed or cancelled discovery leaves
    /// the current catalog untouched.
    pub fn refresh(&self) -> Result<Refresh, ConfigError> {
        let pattern = IdentityPattern::compile(&self.settings.pattern)?;

        let (events_tx, events_rx) = mpsc::channel(self.settings.discovery_buffer);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let worker = DiscoveryWorker {
            root: self.settings.path.clone(),
            pattern,
            walker: Arc::clone(&self.walker),
            engine: Arc::clone(&self.engine),
            catalog: Arc::clone(&self.catalog),
        };

        info!(root = %self.settings.path.display(), "starting catalog refresh");
        tokio::spawn(worker.run(events_tx, shutdown_rx));

        Ok(Refresh::new(events_rx, shutdown_tx))
    }
}
