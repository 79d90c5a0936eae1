//! Expression programs
//!
//! An ordered list of operations submitted to the execution engine: archive
//! definitions, derived identifiers, summary statistics with their print
//! bindings, and export column markings. Identifiers are ephemeral and
//! scoped to one program.

use super::expr::Expr;
use std::fmt;
use std::path::PathBuf;

/// Consolidation function used when reading stored samples back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Consolidation {
    /// Averaged consolidation
    #[default]
    Average,
}

impl fmt::Display for Consolidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Consolidation::Average => f.write_str("AVERAGE"),
        }
    }
}

/// Summary statistic computed over a derived identifier
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SummaryStat {
    /// Minimum value over the window
    Minimum,
    /// Average value over the window
    Average,
    /// Maximum value over the window
    Maximum,
    /// Last defined value in the window
    Last,
    /// Percentile rank over the window
    Percentile(f64),
}

impl SummaryStat {
    /// Render the statistic definition for `source`
    pub fn render(&self, source: &str) -> String {
        match self {
            SummaryStat::Minimum => format!("{},MINIMUM", source),
            SummaryStat::Average => format!("{},AVERAGE", source),
            SummaryStat::Maximum => format!("{},MAXIMUM", source),
            SummaryStat::Last => format!("{},LAST", source),
            SummaryStat::Percentile(rank) => format!("{},{:.6},PERCENT", source, rank),
        }
    }
}

/// One program operation
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Define an identifier from an archive dataset
    Def {
        /// Identifier being defined
        id: String,
        /// Archive file path
        path: PathBuf,
        /// Dataset name inside the archive
        dataset: String,
        /// Consolidation function
        consolidation: Consolidation,
    },

    /// Derive an identifier from an expression over prior identifiers
    CDef {
        /// Identifier being derived
        id: String,
        /// Defining expression
        expr: Expr,
    },

    /// Compute a summary statistic over a prior identifier
    VDef {
        /// Identifier holding the statistic
        id: String,
        /// Source identifier
        source: String,
        /// Statistic to compute
        stat: SummaryStat,
    },

    /// Bind a computed statistic to a printed output line
    Print {
        /// Statistic identifier to print
        id: String,
        /// Output format, e.g. `cpu,min,%lf`
        format: String,
    },

    /// Mark an identifier as an export column
    Xport {
        /// Identifier to export
        id: String,
        /// Column legend reported back by the engine
        legend: String,
    },
}

/// Ordered expression program
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    steps: Vec<Step>,
}

impl Program {
    /// Create an empty program
    pub fn new() -> Self {
        Self::default()
    }

    /// Define an identifier from an archive dataset
    pub fn def(&mut self, id: impl Into<String>, path: impl Into<PathBuf>, dataset: impl Into<String>) {
        self.steps.push(Step::Def {
            id: id.into(),
            path: path.into(),
            dataset: dataset.into(),
            consolidation: Consolidation::Average,
        });
    }

    /// Derive an identifier from an expression
    pub fn cdef(&mut self, id: impl Into<String>, expr: Expr) {
        self.steps.push(Step::CDef {
            id: id.into(),
            expr,
        });
    }

    /// Compute a summary statistic
    pub fn vdef(&mut self, id: impl Into<String>, source: impl Into<String>, stat: SummaryStat) {
        self.steps.push(Step::VDef {
            id: id.into(),
            source: source.into(),
            stat,
        });
    }

    /// Bind a statistic to a printed output line
    pub fn print(&mut self, id: impl Into<String>, format: impl Into<String>) {
        self.steps.push(Step::Print {
            id: id.into(),
            format: format.into(),
        });
    }

    /// Mark an identifier as an export column
    pub fn xport(&mut self, id: impl Into<String>, legend: impl Into<String>) {
        self.steps.push(Step::Xport {
            id: id.into(),
            legend: legend.into(),
        });
    }

    /// Iterate over the program steps in order
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check whether the program holds no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Render the program to the engine's textual argument form
    pub fn render_args(&self) -> Vec<String> {
        self.steps
            .iter()
            .map(|step| match step {
                Step::Def {
                    id,
                    path,
                    dataset,
                    consolidation,
                } => format!(
                    "DEF:{}={}:{}:{}",
                    id,
                    path.display(),
                    dataset,
                    consolidation
                ),
                Step::CDef { id, expr } => format!("CDEF:{}={}", id, expr.rpn()),
                Step::VDef { id, source, stat } => {
                    format!("VDEF:{}={}", id, stat.render(source))
                }
                Step::Print { id, format } => format!("PRINT:{}:{}", id, format),
                Step::Xport { id, legend } => format!("XPORT:{}:{}", id, legend),
            })
            .collect()
    }
}
