//! Health-check rule engine for controller-node console transcripts.
//!
//! A transcript is the captured output of an operator's console session
//! against one radio network controller. The engine runs an ordered list of
//! checks over it and produces one [`ReportRow`](node_health_core::ReportRow)
//! per check: a severity plus a short observation.
//!
//! # Pipeline
//!
//! 1. [`transcript`] locates each check's command output block.
//! 2. [`registry`] cuts the block down with the check's block pattern and
//!    splits it into records.
//! 3. [`classify`] applies the check's rule, cross-referencing the alarm
//!    [`catalogue`] where needed.
//! 4. [`session`] folds findings into rows; [`batch`] runs many nodes on a
//!    rayon pool; [`output`] renders the result.
//!
//! # Example
//!
//! ```
//! use node_health_engine::analyse_transcript;
//! use node_health_core::{CheckStatus, Severity};
//!
//! let report = analyse_transcript("RNC01", "RNC01> st tusync\nRNC01> q\n");
//! assert_eq!(report.rows.len(), 17);
//!
//! let sync = report.row("Check Network Synchronization").unwrap();
//! assert_eq!(sync.status, CheckStatus::Evaluated);
//! assert_eq!(sync.severity, Severity::Ok);
//!
//! let alarms = report.row("Check active Alarms").unwrap();
//! assert_eq!(alarms.status, CheckStatus::CommandNotFound);
//! ```

pub mod batch;
pub mod catalogue;
pub mod classify;
pub mod config;
pub mod error;
pub mod output;
pub mod registry;
pub mod session;
pub mod transcript;

pub use batch::{NodeInput, analyse_nodes, read_inputs};
pub use catalogue::{AlarmCatalogue, CatalogueCache};
pub use config::AnalyserConfig;
pub use error::{AnalyseError, CatalogueError, ConfigError, Result};
pub use output::{OutputFormat, format_checks, format_reports};
pub use registry::{Check, CheckRegistry};
pub use session::{NodeReport, ParseSession};
pub use transcript::{BlockLookup, CommandSpec, TranscriptStore};

/// Analyses one transcript with the standard registry and default
/// configuration (catalogues looked up in the working directory).
pub fn analyse_transcript(node_name: &str, text: &str) -> NodeReport {
    let cache = CatalogueCache::new();
    let config = AnalyserConfig::default();
    ParseSession::new(CheckRegistry::standard(), &cache, &config).analyse(node_name, text)
}
