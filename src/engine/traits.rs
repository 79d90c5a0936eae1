//! Execution engine collaborator trait

use super::program::Program;
use crate::error::EngineError;
use crate::types::TimeRange;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// Row-major numeric table returned by an export program
///
/// `legends` names one column per exported identifier; `rows` holds one
/// value per column per sampling step, in time order. The table owns its
/// buffers, so engine-side resources release when it drops.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportTable {
    /// Column legends, in export order
    pub legends: Vec<String>,
    /// Row-major sample values
    pub rows: Vec<Vec<f64>>,
}

impl ExportTable {
    /// Create a table from legends and rows
    pub fn new(legends: Vec<String>, rows: Vec<Vec<f64>>) -> Self {
        Self { legends, rows }
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Value at (column, row); NaN when the cell is absent
    pub fn value_at(&self, column: usize, row: usize) -> f64 {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .copied()
            .unwrap_or(f64::NAN)
    }
}

/// External time-series execution engine
///
/// Accepts ordered expression programs and evaluates them over a time
/// window. The engine's wire protocol, on-disk format, and expression
/// evaluator live behind this trait; failures propagate verbatim and no
/// retry happens at this layer.
#[async_trait]
pub trait ExecutionEngine: Send + Sync + 'static {
    /// Execute an export program, returning per-step raw samples
    async fn export(
        &self,
        program: &Program,
        range: TimeRange,
        step: Duration,
    ) -> Result<ExportTable, EngineError>;

    /// Execute a graph-info program, returning `label,key,value` lines
    async fn graph_info(
        &self,
        program: &Program,
        range: TimeRange,
    ) -> Result<Vec<String>, EngineError>;

    /// Enumerate the dataset names stored in an archive file
    async fn dataset_names(&self, path: &Path) -> Result<Vec<String>, EngineError>;
}
