//! Report data model for controller-node health assessments.
//!
//! These types are what the analysis engine hands to whatever renders the
//! report. They serialise with [`serde`] so rows can be dumped as JSON or
//! YAML, or written into a workbook by an external collaborator.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Observation used when a check recorded nothing.
pub const DEFAULT_OBSERVATION: &str = "No alarms";

/// Severity of one check result, ordered from most to least severe.
///
/// Severities only ever escalate while a check is being evaluated: use
/// [`escalate`](Severity::escalate) to combine a running severity with a new
/// finding.
///
/// # Examples
///
/// ```
/// use node_health_core::Severity;
///
/// let running = Severity::Minor;
/// assert_eq!(running.escalate(Severity::Critical), Severity::Critical);
/// assert_eq!(running.escalate(Severity::Warning), Severity::Minor);
/// assert_eq!(Severity::Major.to_string(), "Major");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Severity {
    Critical,
    Major,
    Minor,
    Warning,
    /// Nothing found (the default).
    #[default]
    Ok,
}

impl Severity {
    /// All levels, most severe first.
    pub const ALL: [Severity; 5] = [
        Severity::Critical,
        Severity::Major,
        Severity::Minor,
        Severity::Warning,
        Severity::Ok,
    ];

    /// Numeric weight; lower is more severe.
    pub fn rank(self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::Major => 1,
            Self::Minor => 2,
            Self::Warning => 3,
            Self::Ok => 10,
        }
    }

    /// Display label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::Major => "Major",
            Self::Minor => "Minor",
            Self::Warning => "Warning",
            Self::Ok => "Ok",
        }
    }

    /// Parses a label case-insensitively (`"critical"`, `"MAJOR"`, ...).
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|sev| sev.label().eq_ignore_ascii_case(label))
    }

    pub fn is_more_severe_than(self, other: Severity) -> bool {
        self.rank() < other.rank()
    }

    /// Returns the more severe of `self` and `finding`.
    ///
    /// Never relaxes: a finding less severe than the running value is ignored.
    #[must_use]
    pub fn escalate(self, finding: Severity) -> Severity {
        if finding.is_more_severe_than(self) {
            finding
        } else {
            self
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry of the alarm reference catalogue.
///
/// # Examples
///
/// ```
/// use node_health_core::{AlarmRecord, Severity};
///
/// let record = AlarmRecord::new("LinkFailure", "Critical");
/// assert!(record.matches_problem("  linkfailure "));
/// assert_eq!(record.perceived(), Some(Severity::Critical));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AlarmRecord {
    pub specific_problem: String,
    pub event_type: String,
    pub probable_cause: String,
    pub perceived_severity: String,
    pub managed_object: String,
    pub node_type: String,
}

impl AlarmRecord {
    /// Creates a record with only the problem name and severity filled in.
    pub fn new(specific_problem: &str, perceived_severity: &str) -> Self {
        Self {
            specific_problem: specific_problem.trim().to_string(),
            perceived_severity: perceived_severity.trim().to_string(),
            ..Self::default()
        }
    }

    /// Builds a record from the six catalogue columns. Missing trailing
    /// columns become empty strings.
    pub fn from_columns<S: AsRef<str>>(columns: &[S]) -> Self {
        let col = |idx: usize| {
            columns
                .get(idx)
                .map(|c| c.as_ref().trim().to_string())
                .unwrap_or_default()
        };
        Self {
            specific_problem: col(0),
            event_type: col(1),
            probable_cause: col(2),
            perceived_severity: col(3),
            managed_object: col(4),
            node_type: col(5),
        }
    }

    /// Lookup key: trimmed, lower-cased specific problem.
    pub fn key(&self) -> String {
        normalize_problem(&self.specific_problem)
    }

    pub fn matches_problem(&self, problem: &str) -> bool {
        self.key() == normalize_problem(problem)
    }

    /// Catalogue severity as a [`Severity`], when the column names one.
    pub fn perceived(&self) -> Option<Severity> {
        Severity::from_label(&self.perceived_severity)
    }
}

/// Normalises a specific-problem name for catalogue lookups.
pub fn normalize_problem(problem: &str) -> String {
    problem.trim().to_lowercase()
}

/// Per-severity alarm counters filled by the active-alarm check.
///
/// `total()` is always the sum of every bucket, collisions included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AlarmTally {
    pub critical: u32,
    pub major: u32,
    pub minor: u32,
    pub warning: u32,
    /// Alarms whose reported code disagrees with the catalogue severity.
    pub collision: u32,
    /// Specific problems of the critical and major alarms, in encounter order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl AlarmTally {
    pub fn total(&self) -> u32 {
        self.critical + self.major + self.minor + self.warning + self.collision
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Adds another tally's counters and details to this one.
    pub fn merge(&mut self, other: AlarmTally) {
        self.critical += other.critical;
        self.major += other.major;
        self.minor += other.minor;
        self.warning += other.warning;
        self.collision += other.collision;
        self.details.extend(other.details);
    }

    /// Most severe non-empty bucket; collisions never contribute.
    pub fn severity(&self) -> Severity {
        if self.critical > 0 {
            Severity::Critical
        } else if self.major > 0 {
            Severity::Major
        } else if self.minor > 0 {
            Severity::Minor
        } else if self.warning > 0 {
            Severity::Warning
        } else {
            Severity::Ok
        }
    }

    /// Renders `Total N alarms: X critical, Y major` for non-empty buckets.
    ///
    /// Returns `None` when no alarm was counted.
    ///
    /// # Examples
    ///
    /// ```
    /// use node_health_core::AlarmTally;
    ///
    /// let tally = AlarmTally { critical: 1, minor: 2, ..AlarmTally::default() };
    /// assert_eq!(tally.summary().as_deref(), Some("Total 3 alarms: 1 critical, 2 minor"));
    /// ```
    pub fn summary(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let buckets = [
            (self.critical, "critical"),
            (self.major, "major"),
            (self.minor, "minor"),
            (self.warning, "warning"),
            (self.collision, "collision"),
        ];
        let parts = buckets
            .iter()
            .filter(|(count, _)| *count > 0)
            .map(|(count, label)| format!("{count} {label}"))
            .collect::<Vec<_>>();
        Some(format!("Total {} alarms: {}", self.total(), parts.join(", ")))
    }
}

/// How far a check's pipeline got for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    /// The command output was located and the rule ran.
    #[default]
    Evaluated,
    /// The transcript never issued the check's command.
    CommandNotFound,
    /// The command ran but its output did not have the expected shape.
    BlockPatternMismatch,
    /// The check was disabled by configuration.
    Excluded,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Evaluated => write!(f, "evaluated"),
            Self::CommandNotFound => write!(f, "command_not_found"),
            Self::BlockPatternMismatch => write!(f, "block_pattern_mismatch"),
            Self::Excluded => write!(f, "excluded"),
        }
    }
}

/// One result row: a single check evaluated against a single node.
///
/// A row starts at [`Severity::Ok`] with an empty observation. Checks raise
/// its severity with [`escalate`](ReportRow::escalate) and add text with
/// [`push_observation`](ReportRow::push_observation); [`finish`](ReportRow::finish)
/// freezes it.
///
/// # Examples
///
/// ```
/// use node_health_core::{ReportRow, Severity};
///
/// let mut row = ReportRow::new("Check Disabled MOs", 14, "RNC01");
/// row.escalate(Severity::Warning);
/// row.push_observation("Disabled MOs: 23");
/// row.escalate(Severity::Ok);
/// let row = row.finish();
/// assert_eq!(row.severity, Severity::Warning);
/// assert_eq!(row.observation, "Disabled MOs: 23");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    /// Position of the check in the registry.
    pub order: usize,
    pub check_name: String,
    pub severity: Severity,
    /// Observation fragments joined by newlines.
    pub observation: String,
    /// `YYMMDD` stamp taken from the command's own output, or empty.
    pub date_of: String,
    pub node_name: String,
    pub status: CheckStatus,
    #[serde(default, skip_serializing_if = "AlarmTally::is_empty")]
    pub tally: AlarmTally,
    /// Diagnostics that did not change the severity.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ReportRow {
    pub fn new(check_name: &str, order: usize, node_name: &str) -> Self {
        Self {
            order,
            check_name: check_name.to_string(),
            severity: Severity::Ok,
            observation: String::new(),
            date_of: String::new(),
            node_name: node_name.to_string(),
            status: CheckStatus::Evaluated,
            tally: AlarmTally::default(),
            warnings: Vec::new(),
        }
    }

    /// Raises the row severity to `finding` if it is more severe.
    pub fn escalate(&mut self, finding: Severity) {
        self.severity = self.severity.escalate(finding);
    }

    /// Appends one observation fragment on its own line.
    pub fn push_observation(&mut self, fragment: &str) {
        if fragment.is_empty() {
            return;
        }
        if !self.observation.is_empty() {
            self.observation.push('\n');
        }
        self.observation.push_str(fragment);
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Freezes the row, defaulting an empty observation to "No alarms".
    #[must_use]
    pub fn finish(mut self) -> Self {
        if self.observation.is_empty() {
            self.observation = DEFAULT_OBSERVATION.to_string();
        }
        self
    }
}

impl fmt::Display for ReportRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.order,
            self.check_name,
            self.severity,
            self.observation.replace('\n', " | ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_severity_rank_order() {
        let ranks = Severity::ALL.map(Severity::rank);
        assert!(ranks.windows(2).all(|w| w[0] < w[1]));
        assert!(Severity::Critical.is_more_severe_than(Severity::Major));
        assert!(!Severity::Ok.is_more_severe_than(Severity::Warning));
    }

    #[test]
    fn test_tally_merge_keeps_detail_order() {
        let mut tally = AlarmTally {
            critical: 1,
            details: vec!["A".to_string()],
            ..AlarmTally::default()
        };
        tally.merge(AlarmTally {
            major: 2,
            collision: 1,
            details: vec!["B".to_string()],
            ..AlarmTally::default()
        });
        assert_eq!(tally.total(), 4);
        assert_eq!(tally.details, vec!["A", "B"]);
        assert_eq!(tally.severity(), Severity::Critical);
    }

    #[test]
    fn test_severity_labels_roundtrip() {
        for sev in Severity::ALL {
            assert_eq!(Severity::from_label(sev.label()), Some(sev));
            assert_eq!(Severity::from_label(&sev.label().to_uppercase()), Some(sev));
        }
        assert_eq!(Severity::from_label("indeterminate"), None);
        assert_eq!(serde_json::to_string(&Severity::Major).unwrap(), "\"Major\"");
    }

    #[test]
    fn test_alarm_record_from_short_row() {
        let record = AlarmRecord::from_columns(&[" NbapLinkDown ", "x1", "cause"]);
        assert_eq!(record.specific_problem, "NbapLinkDown");
        assert_eq!(record.probable_cause, "cause");
        assert_eq!(record.perceived_severity, "");
        assert_eq!(record.perceived(), None);
        assert_eq!(record.key(), "nbaplinkdown");
    }

    #[test]
    fn test_tally_summary_includes_collisions() {
        let tally = AlarmTally {
            major: 2,
            collision: 1,
            ..AlarmTally::default()
        };
        assert_eq!(tally.total(), 3);
        assert_eq!(tally.severity(), Severity::Major);
        assert_eq!(
            tally.summary().as_deref(),
            Some("Total 3 alarms: 2 major, 1 collision")
        );
    }

    #[test]
    fn test_tally_collision_only_stays_ok() {
        let tally = AlarmTally {
            collision: 2,
            ..AlarmTally::default()
        };
        assert_eq!(tally.severity(), Severity::Ok);
        assert!(tally.summary().is_some());
    }

    #[test]
    fn test_row_finish_defaults_observation() {
        let row = ReportRow::new("Check active Alarms", 0, "RNC01").finish();
        assert_eq!(row.observation, DEFAULT_OBSERVATION);
        assert_eq!(row.severity, Severity::Ok);
    }

    #[test]
    fn test_row_display_is_tab_separated() {
        let mut row = ReportRow::new("Check RANAP and Iu link", 8, "RNC01");
        row.push_observation("a");
        row.push_observation("b");
        assert_eq!(row.to_string(), "8\tCheck RANAP and Iu link\tOk\ta | b");
    }

    #[test]
    fn test_row_serialization_skips_empty_tally() {
        let row = ReportRow::new("Check Disabled MOs", 14, "RNC01").finish();
        let json = serde_json::to_string(&row).unwrap();
        assert!(!json.contains("tally"));
        assert!(!json.contains("warnings"));
        assert!(json.contains("\"status\":\"evaluated\""));
    }

    fn any_severity() -> impl Strategy<Value = Severity> {
        prop::sample::select(Severity::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_escalation_never_relaxes(findings in prop::collection::vec(any_severity(), 0..32)) {
            let mut row = ReportRow::new("check", 0, "node");
            let mut previous = row.severity;
            for finding in findings {
                row.escalate(finding);
                prop_assert!(previous.rank() >= row.severity.rank());
                prop_assert!(row.severity.rank() <= finding.rank());
                previous = row.severity;
            }
        }

        #[test]
        fn prop_tally_total_is_sum(c in 0u32..50, ma in 0u32..50, mi in 0u32..50, w in 0u32..50, col in 0u32..50) {
            let tally = AlarmTally { critical: c, major: ma, minor: mi, warning: w, collision: col, details: Vec::new() };
            prop_assert_eq!(tally.total(), c + ma + mi + w + col);
            let expected = if c > 0 { Severity::Critical }
                else if ma > 0 { Severity::Major }
                else if mi > 0 { Severity::Minor }
                else if w > 0 { Severity::Warning }
                else { Severity::Ok };
            prop_assert_eq!(tally.severity(), expected);
        }
    }
}
