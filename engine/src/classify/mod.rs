//! Per-check classification rules.
//!
//! Every rule has the same shape: take the records extracted from one
//! command block, compare them against the rule's thresholds, and return a
//! [`Finding`] (a severity plus observation fragments). Rules are pure; the
//! session folds findings into the row with monotonic escalation, so a rule
//! never has to guard against lowering a severity set earlier.
//!
//! [`CheckKind`] is the tagged union the registry uses to pick a rule. Each
//! variant carries the thresholds it needs.

mod alarms;
mod allocation;
mod associations;
mod availability;
mod backups;
mod clock;
mod database;
mod disabled;
mod ethernet;
mod health;
mod links;
mod logs;
mod pool;
mod release;
mod restart;

pub use allocation::AllocationLimits;
pub use ethernet::{ColumnSpan, column_spans, slice_row};

use chrono::NaiveDate;
use node_health_core::{AlarmTally, Severity};
use regex::Regex;

use crate::catalogue::AlarmCatalogue;

/// Captured fields of one regex match.
///
/// `fields[i]` is capture group `i + 1`; groups that did not participate are
/// `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub matched: String,
    pub fields: Vec<Option<String>>,
}

impl Record {
    pub fn from_captures(caps: &regex::Captures<'_>) -> Self {
        Self {
            matched: caps
                .get(0)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            fields: caps
                .iter()
                .skip(1)
                .map(|group| group.map(|m| m.as_str().to_string()))
                .collect(),
        }
    }

    /// Builds a record from plain field values (all present).
    pub fn from_fields(fields: &[&str]) -> Self {
        Self {
            matched: fields.join(" "),
            fields: fields.iter().map(|f| Some(f.to_string())).collect(),
        }
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.fields.get(idx).and_then(|f| f.as_deref())
    }

    /// Field `idx`, or an empty string when absent.
    pub fn field(&self, idx: usize) -> &str {
        self.get(idx).unwrap_or_default()
    }

    pub fn number(&self, idx: usize) -> Option<u64> {
        self.get(idx).and_then(|f| f.trim().parse().ok())
    }
}

/// Extracts one [`Record`] per match of `pattern` in `body`.
pub fn extract_records(pattern: &Regex, body: &str) -> Vec<Record> {
    pattern
        .captures_iter(body)
        .map(|caps| Record::from_captures(&caps))
        .collect()
}

/// Everything a rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    /// Records extracted from the block body.
    pub records: &'a [Record],
    /// Block body (capture group 1 of the block pattern).
    pub body: &'a str,
    /// Remaining block-pattern captures.
    pub context: &'a Record,
    /// Row severity before this block was evaluated.
    pub prior: Severity,
    /// `YYMMDD` stamp of the command, when known.
    pub date_of: Option<&'a str>,
    /// Report date from the transcript's logging line.
    pub report_date: Option<NaiveDate>,
    pub catalogue: Option<&'a AlarmCatalogue>,
}

impl<'a> RuleInput<'a> {
    /// Input with no context, catalogue or dates; rules fill in the rest.
    pub fn new(records: &'a [Record], body: &'a str, context: &'a Record) -> Self {
        Self {
            records,
            body,
            context,
            prior: Severity::Ok,
            date_of: None,
            report_date: None,
            catalogue: None,
        }
    }

    /// Date the command output refers to: the command stamp, else the
    /// transcript report date.
    pub fn reference_date(&self) -> Option<NaiveDate> {
        self.date_of
            .and_then(parse_stamp)
            .or(self.report_date)
    }
}

/// Parses a `YYMMDD` stamp (20YY).
pub fn parse_stamp(stamp: &str) -> Option<NaiveDate> {
    if stamp.len() != 6 || !stamp.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = stamp[0..2].parse().ok()?;
    let month: u32 = stamp[2..4].parse().ok()?;
    let day: u32 = stamp[4..6].parse().ok()?;
    NaiveDate::from_ymd_opt(2000 + year, month, day)
}

/// Outcome of one rule over one block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Finding {
    pub severity: Severity,
    pub notes: Vec<String>,
    pub tally: Option<AlarmTally>,
    /// Diagnostics that do not affect the severity.
    pub warnings: Vec<String>,
}

impl Finding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Escalates the finding's severity; never lowers it.
    pub fn raise(&mut self, severity: Severity) {
        self.severity = self.severity.escalate(severity);
    }

    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}

/// Which rule a check runs, with its thresholds.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckKind {
    /// Cross-references active alarms with the alarm catalogue.
    AlarmTally,
    /// Event and system log triage (resets, GTP echo, crashes, MAU).
    EventLogTriage,
    /// Spontaneous restarts within `window_days` of the reference date.
    RestartWindow { window_days: i64 },
    /// Core MP clocks compared with the command date.
    ClockDrift,
    /// Disabled M3UA associations by type.
    AssociationCounts,
    /// CC/DC/PDR device pool percentages and disabled/unallocated totals.
    ResourcePool,
    /// Site and unlocked cell availability.
    SiteAvailability,
    /// Disabled RANAP/Iu links.
    LinkDisabled,
    /// Configuration version and upgrade package counts.
    BackupCounts { cv_limit: u64, up_limit: u64 },
    /// Database consistency report.
    DatabaseConsistency { benign_table: &'static str },
    /// Software release tokens against support boundaries.
    SoftwareRelease {
        unsupported_below: &'static str,
        deprecated_below: &'static str,
    },
    /// Ethernet switch port VLAN table.
    EthernetVlan,
    /// Link handler and module allocation.
    DeviceAllocation(AllocationLimits),
    /// Count of disabled managed objects.
    DisabledCount { limit: usize },
    /// Health check result code.
    HealthCheckResult { ok_code: &'static str },
    /// Health check schedule.
    HealthCheckSchedule,
    /// Output is collected but not classified.
    Passive,
}

impl CheckKind {
    /// Runs the rule for this kind.
    pub fn evaluate(&self, input: &RuleInput<'_>) -> Finding {
        match self {
            Self::AlarmTally => alarms::evaluate(input),
            Self::EventLogTriage => logs::evaluate(input),
            Self::RestartWindow { window_days } => restart::evaluate(input, *window_days),
            Self::ClockDrift => clock::evaluate(input),
            Self::AssociationCounts => associations::evaluate(input),
            Self::ResourcePool => pool::evaluate(input),
            Self::SiteAvailability => availability::evaluate(input),
            Self::LinkDisabled => links::evaluate(input),
            Self::BackupCounts { cv_limit, up_limit } => {
                backups::evaluate(input, *cv_limit, *up_limit)
            }
            Self::DatabaseConsistency { benign_table } => database::evaluate(input, benign_table),
            Self::SoftwareRelease {
                unsupported_below,
                deprecated_below,
            } => release::evaluate(input, unsupported_below, deprecated_below),
            Self::EthernetVlan => ethernet::evaluate(input),
            Self::DeviceAllocation(limits) => allocation::evaluate(input, limits),
            Self::DisabledCount { limit } => disabled::evaluate(input, *limit),
            Self::HealthCheckResult { ok_code } => health::evaluate_result(input, ok_code),
            Self::HealthCheckSchedule => health::evaluate_schedule(input),
            Self::Passive => Finding::new(),
        }
    }

    /// Whether the rule cross-references the alarm catalogue.
    pub fn uses_catalogue(&self) -> bool {
        matches!(self, Self::AlarmTally)
    }
}

/// Joins a sorted set of names the way observations list them.
pub(crate) fn join_sorted<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let set = names
        .into_iter()
        .collect::<std::collections::BTreeSet<_>>();
    set.into_iter().collect::<Vec<_>>().join(", ")
}
