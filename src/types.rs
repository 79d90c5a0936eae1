//! Core data types used throughout the connector
//!
//! # Key Types
//!
//! - **`TimeRange`**: query time window (unix seconds)
//! - **`GroupQuery`**: a named set of series with optional aggregation
//! - **`SeriesRef`**: one series reference inside a group query
//! - **`GroupOperator`**: aggregation operator applied to a group
//! - **`PlotResult`**: per-series output (samples + named statistics)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Time window for queries (unix seconds, inclusive bounds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Window start (unix seconds)
    pub start: i64,
    /// Window end (unix seconds)
    pub end: i64,
}

impl TimeRange {
    /// Create a new time range
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Check whether a timestamp falls inside the window
    pub fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }

    /// Window span in seconds
    pub fn span_secs(&self) -> i64 {
        self.end - self.start
    }
}

/// Aggregation operator applied to a group of series
///
/// Raw operator codes received from the platform are converted through
/// [`GroupOperator::from_raw`]; inside a typed [`GroupQuery`] an unknown
/// operator cannot exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupOperator {
    /// Every series stands on its own
    #[default]
    None,
    /// Series are summed sample-wise
    Sum,
    /// Series are averaged sample-wise
    Avg,
}

impl GroupOperator {
    /// Convert a raw operator code
    ///
    /// Codes outside {0, 1, 2} fail with
    /// [`QueryError::UnknownOperator`](crate::error::QueryError::UnknownOperator).
    pub fn from_raw(code: u8) -> Result<Self, crate::error::QueryError> {
        match code {
            0 => Ok(GroupOperator::None),
            1 => Ok(GroupOperator::Avg),
            2 => Ok(GroupOperator::Sum),
            other => Err(crate::error::QueryError::UnknownOperator(other)),
        }
    }

    /// Check whether this operator combines series into one output
    pub fn is_aggregate(&self) -> bool {
        !matches!(self, GroupOperator::None)
    }
}

/// One series reference inside a group query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRef {
    /// Display name of the series; labels the output in non-aggregated mode
    pub name: String,

    /// Source the metric belongs to
    pub source: String,

    /// Full metric name (`<metric>/<dataset>`); `None` means the reference
    /// is unresolved and the series is skipped
    pub metric: Option<String>,

    /// Per-series scale factor; `0.0` means no scaling
    #[serde(default)]
    pub scale: f64,
}

impl SeriesRef {
    /// Create a resolved series reference
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
        metric: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            metric: Some(metric.into()),
            scale: 0.0,
        }
    }

    /// Create an unresolved series reference (skipped during compilation)
    pub fn unresolved(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            metric: None,
            scale: 0.0,
        }
    }

    /// Set the per-series scale factor
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

/// A named set of series with optional aggregation and group-level scaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupQuery {
    /// Group name; labels the output in aggregated mode
    pub name: String,

    /// Ordered series references
    pub series: Vec<SeriesRef>,

    /// Aggregation operator
    #[serde(default)]
    pub operator: GroupOperator,

    /// Group-level scale factor; `0.0` means no scaling
    #[serde(default)]
    pub scale: f64,
}

impl GroupQuery {
    /// Create an empty group query
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            series: Vec::new(),
            operator: GroupOperator::None,
            scale: 0.0,
        }
    }

    /// Append a series reference
    pub fn with_series(mut self, series: SeriesRef) -> Self {
        self.series.push(series);
        self
    }

    /// Set the aggregation operator
    pub fn with_operator(mut self, operator: GroupOperator) -> Self {
        self.operator = operator;
        self
    }

    /// Set the group-level scale factor
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

/// Per-series query output
///
/// `samples` is time-ordered with one value per requested step; unknown
/// readings surface as NaN. `statistics` maps statistic keys (`min`,
/// `avg`, `max`, `last`, `95th`, ...) to their computed values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotResult {
    /// Time-ordered sample values
    pub samples: Vec<f64>,

    /// Statistic key to computed value
    pub statistics: HashMap<String, f64>,
}

impl PlotResult {
    /// Create an empty result
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryError;

    #[test]
    fn test_time_range_contains() {
        let range = TimeRange::new(1000, 2000);
        assert!(range.contains(1000));
        assert!(range.contains(1500));
        assert!(range.contains(2000));
        assert!(!range.contains(999));
        assert_eq!(range.span_secs(), 1000);
    }

    #[test]
    fn test_operator_from_raw() {
        assert_eq!(GroupOperator::from_raw(0).unwrap(), GroupOperator::None);
        assert_eq!(GroupOperator::from_raw(1).unwrap(), GroupOperator::Avg);
        assert_eq!(GroupOperator::from_raw(2).unwrap(), GroupOperator::Sum);
        assert_eq!(
            GroupOperator::from_raw(9).unwrap_err(),
            QueryError::UnknownOperator(9)
        );
    }

    #[test]
    fn test_operator_is_aggregate() {
        assert!(!GroupOperator::None.is_aggregate());
        assert!(GroupOperator::Sum.is_aggregate());
        assert!(GroupOperator::Avg.is_aggregate());
    }

    #[test]
    fn test_group_query_builder() {
        let query = GroupQuery::new("cpu")
            .with_series(SeriesRef::new("cpu0", "host1", "cpu0/value").with_scale(0.5))
            .with_series(SeriesRef::unresolved("cpu1", "host1"))
            .with_operator(GroupOperator::Sum)
            .with_scale(2.0);

        assert_eq!(query.series.len(), 2);
        assert_eq!(query.series[0].scale, 0.5);
        assert!(query.series[1].metric.is_none());
        assert_eq!(query.operator, GroupOperator::Sum);
        assert_eq!(query.scale, 2.0);
    }

    #[test]
    fn test_operator_serde_round_trip() {
        let json = serde_json::to_string(&GroupOperator::Avg).unwrap();
        assert_eq!(json, "\"avg\"");
        let back: GroupOperator = serde_json::from_str(&json).unwrap();
        assert_eq!(back, GroupOperator::Avg);

        assert!(serde_json::from_str::<GroupOperator>("\"median\"").is_err());
    }
}
