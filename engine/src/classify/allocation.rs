//! Link handler and CC/DC/PDR module allocation (`lhstat`).
//!
//! The block holds two tables: link handlers `(handler, status, msg-board)`
//! are the check's records, and the module table `(module, id, state)` is
//! read from the body directly.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use node_health_core::Severity;
use regex::Regex;

use super::{Finding, RuleInput, extract_records};

static MODULE_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^((?:cc|dc|pdr)\w*) +(\d+) +(\w+) *$").expect("static regex must compile")
});

/// Thresholds for the allocation check.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationLimits {
    /// Message-board value of a healthy link handler.
    pub healthy_board: &'static str,
    /// Abnormal link handlers tolerated before the check turns Critical.
    pub abnormal_limit: usize,
    /// Share of idle modules that raises a Warning.
    pub idle_fraction: f64,
}

impl Default for AllocationLimits {
    fn default() -> Self {
        Self {
            healthy_board: "CONNECTED",
            abnormal_limit: 2,
            idle_fraction: 0.5,
        }
    }
}

pub(super) fn evaluate(input: &RuleInput<'_>, limits: &AllocationLimits) -> Finding {
    let mut finding = Finding::new();

    let abnormal = input
        .records
        .iter()
        .filter(|record| !record.field(2).eq_ignore_ascii_case(limits.healthy_board))
        .count();

    let modules = extract_records(&MODULE_ROW, input.body);
    let mut ids = BTreeSet::new();
    let mut duplicates = BTreeSet::new();
    for module in &modules {
        let id = module.field(1);
        if !ids.insert(id) {
            duplicates.insert(id);
        }
    }
    let idle = modules
        .iter()
        .filter(|module| module.field(2).eq_ignore_ascii_case("idle"))
        .count();

    if abnormal > limits.abnormal_limit {
        finding.raise(Severity::Critical);
    } else if abnormal > 0 || !duplicates.is_empty() {
        finding.raise(Severity::Major);
    } else if !modules.is_empty() && idle as f64 / modules.len() as f64 >= limits.idle_fraction {
        finding.raise(Severity::Warning);
    }

    if abnormal > 0 {
        finding.note(format!("Abnormal link handlers: {abnormal}"));
    }
    for id in duplicates {
        finding.note(format!("Duplicate module id: {id}"));
    }
    if !modules.is_empty() {
        finding.note(format!("Idle modules: {idle} of {}", modules.len()));
    }
    finding
}
