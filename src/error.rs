//! Error types for the connector

use thiserror::Error;

/// Main error type for the connector
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Discovery error
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Query error
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Execution engine error
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors
///
/// Fatal before any work starts: a connector with an invalid pattern or a
/// missing mandatory setting never visits a single file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Mandatory connector setting is absent
    #[error("missing `{0}' mandatory connector setting")]
    MissingSetting(&'static str),

    /// Connector setting has the wrong shape
    #[error("connector setting `{setting}' is invalid: {message}")]
    InvalidSetting {
        /// Setting name
        setting: &'static str,
        /// Description of the problem
        message: String,
    },

    /// Identity pattern failed to compile
    #[error("invalid identity pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Identity pattern carries a named group other than `source`/`metric`
    #[error("invalid pattern keyword `{0}'")]
    InvalidPatternKeyword(String),

    /// Identity pattern lacks one of the two required named groups
    #[error("missing pattern keyword `{0}'")]
    MissingPatternKeyword(&'static str),
}

/// Discovery errors
///
/// Only traversal-level failures are errors; a non-matching file or an
/// unreadable archive is logged and skipped.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Tree walk failed at the I/O level
    #[error("archive tree walk failed: {0}")]
    Walk(#[from] std::io::Error),
}

/// Query compilation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueryError {
    /// Query has no series at all
    #[error("group has no series")]
    EmptyGroup,

    /// Aggregation operator code outside the known set
    #[error("unknown `{0}' operator type")]
    UnknownOperator(u8),
}

/// Execution engine errors
///
/// Propagated verbatim; retries belong to a layer above this crate.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Engine rejected or failed an expression program
    #[error("execution failed: {0}")]
    Execution(String),

    /// Connection to the computation daemon failed
    #[error("daemon unreachable: {0}")]
    Daemon(String),

    /// Archive file could not be opened or parsed
    #[error("archive `{path}': {message}")]
    Archive {
        /// Archive file path
        path: String,
        /// Description of the failure
        message: String,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
