//! Error types for catalogue loading, configuration and batch runs.
//!
//! Check-level anomalies (missing commands, output drift, severity
//! collisions) are not errors: they end up as data on the
//! [`ReportRow`](node_health_core::ReportRow). The types here cover the
//! failures a caller may want to act on.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading an alarm catalogue.
#[derive(Debug, Error)]
pub enum CatalogueError {
    /// The referenced catalogue file does not exist.
    #[error("alarm catalogue not found: {}", path.display())]
    Unavailable { path: PathBuf },

    /// The file exists but could not be read.
    #[error("failed to read alarm catalogue {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No `specificProblem` header row was found.
    #[error("alarm catalogue {} has no specificProblem header row", path.display())]
    MissingHeader { path: PathBuf },
}

/// Errors raised while loading or saving an [`AnalyserConfig`](crate::config::AnalyserConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Semantically invalid configuration (e.g. an unknown check caption).
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised by batch analysis of transcript files.
#[derive(Debug, Error)]
pub enum AnalyseError {
    /// A transcript file could not be read.
    #[error("failed to read transcript {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration failure.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The worker pool for parallel nodes could not be started.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Output serialization failure.
    #[error("failed to render report: {0}")]
    Render(String),
}

/// Convenience alias for results with [`AnalyseError`].
pub type Result<T> = std::result::Result<T, AnalyseError>;
