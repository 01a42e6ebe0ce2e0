//! Core types for controller-node health reports.
//!
//! This crate defines the data handed from the analysis engine to whatever
//! renders a report:
//!
//! - [`Severity`]: the five-level scale with monotonic escalation.
//! - [`ReportRow`]: one check evaluated against one node.
//! - [`AlarmTally`]: per-severity counters of the active-alarm check.
//! - [`AlarmRecord`]: one entry of the alarm reference catalogue.
//! - [`CheckStatus`]: how far a check got before producing its row.
//!
//! Validation ([`validate_rows`]) checks the row-list contract before rows
//! are handed to a renderer.
//!
//! # Example
//!
//! ```
//! use node_health_core::*;
//!
//! let mut row = ReportRow::new("Check the M3UA Associations", 5, "RNC01");
//! row.escalate(Severity::Major);
//! row.push_observation("Num of failed M3UA: 1");
//! let row = row.finish();
//!
//! assert_eq!(row.severity, Severity::Major);
//! assert!(validate_rows(&[row]).is_empty());
//! ```

mod types;
mod validate;

pub use types::*;
pub use validate::{RowValidationError, validate_rows};
