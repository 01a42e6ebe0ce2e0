//! Output contract validation for per-node row lists.
//!
//! The renderer places rows by their `order` and prints `date_of` verbatim,
//! so a row list handed over must keep registry order and carry well-formed
//! stamps.
//!
//! # Examples
//!
//! ```
//! use node_health_core::*;
//!
//! let rows = vec![
//!     ReportRow::new("Check active Alarms", 0, "RNC01").finish(),
//!     ReportRow::new("Check Event and System Logs", 1, "RNC01").finish(),
//! ];
//! assert!(validate_rows(&rows).is_empty());
//!
//! // Out of order
//! let swapped = vec![rows[1].clone(), rows[0].clone()];
//! assert!(!validate_rows(&swapped).is_empty());
//! ```

use thiserror::Error;

use crate::ReportRow;

/// Row-list validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowValidationError {
    /// Check caption is empty or whitespace-only.
    #[error("row {0} has an empty check name")]
    EmptyCheckName(usize),
    /// Rows are not in strictly increasing registry order.
    #[error("row order {found} does not follow {previous}")]
    OutOfOrder { previous: usize, found: usize },
    /// `date_of` is neither empty nor six digits.
    #[error("row {order} has malformed date stamp: {date_of}")]
    MalformedDate { order: usize, date_of: String },
    /// Rows of one list name different nodes.
    #[error("row {order} belongs to node {found}, expected {expected}")]
    MixedNodes {
        order: usize,
        expected: String,
        found: String,
    },
}

/// Validates the row list of one node.
pub fn validate_rows(rows: &[ReportRow]) -> Vec<RowValidationError> {
    let mut errors = Vec::new();
    let mut previous: Option<usize> = None;
    let node = rows.first().map(|row| row.node_name.as_str());

    for row in rows {
        if row.check_name.trim().is_empty() {
            errors.push(RowValidationError::EmptyCheckName(row.order));
        }
        if let Some(prev) = previous.filter(|prev| row.order <= *prev) {
            errors.push(RowValidationError::OutOfOrder {
                previous: prev,
                found: row.order,
            });
        }
        previous = Some(row.order);

        if !is_valid_stamp(&row.date_of) {
            errors.push(RowValidationError::MalformedDate {
                order: row.order,
                date_of: row.date_of.clone(),
            });
        }
        if let Some(expected) = node.filter(|expected| row.node_name != *expected) {
            errors.push(RowValidationError::MixedNodes {
                order: row.order,
                expected: expected.to_string(),
                found: row.node_name.clone(),
            });
        }
    }

    errors
}

fn is_valid_stamp(stamp: &str) -> bool {
    stamp.is_empty() || (stamp.len() == 6 && stamp.bytes().all(|b| b.is_ascii_digit()))
}
