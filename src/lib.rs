//! RRD connector - exposes round-robin database archives as a queryable
//! metric source
//!
//! The connector performs two jobs:
//!
//! - **Catalog discovery**: walk an archive directory tree, recover
//!   (source, metric) identity pairs from file paths via a configurable
//!   pattern, enumerate each archive's datasets, and build the metric
//!   catalog while streaming discovered pairs to the caller.
//! - **Query execution**: compile a group query into reverse-Polish
//!   expression programs for the external execution engine, run a raw
//!   sample export alongside a summary-statistics computation, and merge
//!   both into one [`PlotResult`] per logical series.
//!
//! # Architecture
//!
//! ```text
//! Discovery → Metric Catalog → Query Compiler → Executor → Result Merger
//! ```
//!
//! The file tree walker and the execution engine are collaborator traits
//! ([`walker::FileWalker`], [`engine::ExecutionEngine`]); everything that
//! touches the RRD wire format lives behind them.
//!
//! # Example
//!
//! ```rust,no_run
//! use rrd_connector::{ConnectorSettings, GroupQuery, RrdConnector, SeriesRef, TimeRange};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example(engine: Arc<dyn rrd_connector::engine::ExecutionEngine>) -> Result<(), Box<dyn std::error::Error>> {
//! let settings = ConnectorSettings::new(
//!     "/var/lib/collectd/rrd",
//!     r"(?P<source>[^/]+)/(?P<metric>.+)\.rrd",
//! );
//! let connector = RrdConnector::new(settings, engine)?;
//!
//! // Build the catalog, registering metrics as they stream in.
//! let mut refresh = connector.refresh()?;
//! while let Some(event) = refresh.recv().await {
//!     println!("{:?}", event);
//! }
//!
//! // Query an hour of data at one-minute resolution.
//! let query = GroupQuery::new("cpu")
//!     .with_series(SeriesRef::new("user", "host1", "cpu-user/value"));
//! let plots = connector
//!     .get_plots(&query, TimeRange::new(1700000000, 1700003600), Duration::from_secs(60), &[95.0])
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod config;
pub mod connector;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod query;
pub mod types;
pub mod walker;

pub use catalog::{MetricCatalog, MetricDescriptor};
pub use config::ConnectorSettings;
pub use connector::RrdConnector;
pub use discovery::{DiscoveryEvent, IdentityPattern, Refresh};
pub use error::{Error, Result};
pub use types::{GroupOperator, GroupQuery, PlotResult, SeriesRef, TimeRange};
