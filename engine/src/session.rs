//! Per-node orchestration: run every registered check over one transcript.

use std::sync::Arc;

use node_health_core::{CheckStatus, ReportRow, Severity};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalogue::{AlarmCatalogue, CatalogueCache};
use crate::classify::RuleInput;
use crate::config::AnalyserConfig;
use crate::registry::{Check, CheckRegistry};
use crate::transcript::{BlockLookup, TranscriptStore};

/// All rows produced for one node, in registry order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeReport {
    pub node_name: String,
    /// `YYYY-MM-DD` from the transcript's `Logging to file` line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_date: Option<String>,
    pub rows: Vec<ReportRow>,
}

impl NodeReport {
    /// Most severe row severity.
    pub fn worst_severity(&self) -> Severity {
        self.rows
            .iter()
            .fold(Severity::Ok, |worst, row| worst.escalate(row.severity))
    }

    pub fn row(&self, check_name: &str) -> Option<&ReportRow> {
        self.rows.iter().find(|row| row.check_name == check_name)
    }
}

/// Runs a registry against transcripts, sharing one catalogue cache.
///
/// A session holds no per-node state; the same session can analyse any
/// number of nodes, sequentially or from several threads.
#[derive(Debug, Clone, Copy)]
pub struct ParseSession<'a> {
    registry: &'a CheckRegistry,
    cache: &'a CatalogueCache,
    config: &'a AnalyserConfig,
}

impl<'a> ParseSession<'a> {
    pub fn new(
        registry: &'a CheckRegistry,
        cache: &'a CatalogueCache,
        config: &'a AnalyserConfig,
    ) -> Self {
        Self {
            registry,
            cache,
            config,
        }
    }

    /// Produces exactly one row per registered check. Nothing a transcript
    /// contains aborts the run; problems end up on the affected row.
    pub fn analyse(&self, node_name: &str, text: &str) -> NodeReport {
        let store = TranscriptStore::new(text);
        let rows = self
            .registry
            .checks()
            .iter()
            .enumerate()
            .map(|(order, check)| self.run_check(order, check, &store, node_name))
            .collect::<Vec<_>>();

        let report = NodeReport {
            node_name: node_name.to_string(),
            log_date: store.log_date_label().map(str::to_string),
            rows,
        };
        info!(
            node = node_name,
            rows = report.rows.len(),
            worst = %report.worst_severity(),
            "Analysed node"
        );
        report
    }

    fn run_check(
        &self,
        order: usize,
        check: &Check,
        store: &TranscriptStore,
        node_name: &str,
    ) -> ReportRow {
        let mut row = ReportRow::new(check.caption, order, node_name);

        if !self.config.is_enabled(check.caption) {
            debug!(check = check.caption, "Check excluded by configuration");
            row.status = CheckStatus::Excluded;
            return row.finish();
        }

        let catalogue = self.resolve_catalogue(check, &mut row);

        let lookup = store.find_blocks(&check.command);
        let BlockLookup::Found(blocks) = lookup else {
            warn!(node = node_name, command = %check.command, "Command not found in transcript");
            row.status = CheckStatus::CommandNotFound;
            row.push_warning(format!("Command not found: {}", check.command));
            return row.finish();
        };

        let report_date = store.report_date();
        for block in blocks {
            if let Some(stamp) = block.date_of() {
                row.date_of = stamp.to_string();
            }
            if block.is_empty() {
                debug!(check = check.caption, line = block.line, "Command printed nothing");
                continue;
            }

            let Some(matched) = check.match_block(block.text) else {
                warn!(
                    node = node_name,
                    check = check.caption,
                    line = block.line,
                    "Command output does not match expected layout"
                );
                row.status = CheckStatus::BlockPatternMismatch;
                row.push_warning(format!(
                    "Unexpected output layout for '{}' at line {}",
                    block.command, block.line
                ));
                continue;
            };

            let records = check.extract(matched.body);
            debug!(check = check.caption, records = records.len(), "Extracted records");

            let mut input = RuleInput::new(&records, matched.body, &matched.context);
            input.prior = row.severity;
            input.date_of = (!row.date_of.is_empty()).then_some(row.date_of.as_str());
            input.report_date = report_date;
            input.catalogue = catalogue.as_deref();

            let finding = check.kind.evaluate(&input);
            row.escalate(finding.severity);
            for note in &finding.notes {
                row.push_observation(note);
            }
            for warning in finding.warnings {
                row.push_warning(warning);
            }
            if let Some(tally) = finding.tally {
                row.tally.merge(tally);
            }
        }

        if let Some(summary) = row.tally.summary() {
            row.push_observation(&summary);
        }
        row.finish()
    }

    fn resolve_catalogue(&self, check: &Check, row: &mut ReportRow) -> Option<Arc<AlarmCatalogue>> {
        let file_name = check.alarm_reference?;
        let path = self.config.reference_path(file_name);
        match self.cache.get(&path) {
            Ok(catalogue) => Some(catalogue),
            Err(err) => {
                warn!(check = check.caption, error = %err, "Alarm catalogue unavailable");
                row.push_warning(err.to_string());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::CheckKind;
    use crate::transcript::CommandSpec;

    fn session_parts() -> (CheckRegistry, CatalogueCache, AnalyserConfig) {
        let checks = vec![
            Check::new(
                "Check Disabled MOs",
                CommandSpec::single("st . dis"),
                r"(?s)(.*)",
                Some(r"(?m)^DISABLED (\S+)$"),
                CheckKind::DisabledCount { limit: 1 },
            )
            .unwrap(),
            Check::new(
                "Check Network Synchronization",
                CommandSpec::alternatives(&["get Synchronization=1", "st tusync"]),
                r"(?s)(.*)",
                None,
                CheckKind::Passive,
            )
            .unwrap(),
            Check::new(
                "Check CV and UP backups",
                CommandSpec::single("cvls"),
                r"(?s)(.*>>> Total: \d+ CVs?, \d+ UPs?.*)",
                Some(r">>> Total: (\d+) CVs?, (\d+) UPs?"),
                CheckKind::BackupCounts {
                    cv_limit: 30,
                    up_limit: 2,
                },
            )
            .unwrap(),
        ];
        (
            CheckRegistry::from_checks(checks),
            CatalogueCache::new(),
            AnalyserConfig::default(),
        )
    }

    const TRANSCRIPT: &str = "\
RNC01> st . dis
240315-10:22:33 10.1.1.1 9.0k RNC_NODE_MODEL stopfile=/tmp/1
DISABLED UtranCell=1
DISABLED UtranCell=2
RNC01> st . dis
240316-10:22:33 10.1.1.1 9.0k RNC_NODE_MODEL stopfile=/tmp/1
DISABLED UtranCell=3
RNC01> st tusync
RNC01> cvls
no listing here
RNC01> q
";

    #[test]
    fn test_one_row_per_check_in_order() {
        let (registry, cache, config) = session_parts();
        let report = ParseSession::new(&registry, &cache, &config).analyse("RNC01", TRANSCRIPT);
        assert_eq!(report.rows.len(), 3);
        assert!(report.rows.iter().enumerate().all(|(i, row)| row.order == i));
        assert!(report.rows.iter().all(|row| row.node_name == "RNC01"));
    }

    #[test]
    fn test_repeated_blocks_fold_into_one_row() {
        let (registry, cache, config) = session_parts();
        let report = ParseSession::new(&registry, &cache, &config).analyse("RNC01", TRANSCRIPT);
        let row = &report.rows[0];
        assert_eq!(row.severity, Severity::Warning);
        assert_eq!(row.observation, "Disabled MOs: 2\nDisabled MOs: 1");
        assert_eq!(row.date_of, "240316");
    }

    #[test]
    fn test_found_but_empty_is_evaluated() {
        let (registry, cache, config) = session_parts();
        let report = ParseSession::new(&registry, &cache, &config).analyse("RNC01", TRANSCRIPT);
        let row = &report.rows[1];
        assert_eq!(row.status, CheckStatus::Evaluated);
        assert_eq!(row.severity, Severity::Ok);
        assert_eq!(row.observation, "No alarms");
        assert!(row.warnings.is_empty());
    }

    #[test]
    fn test_not_found_is_distinguishable() {
        let (registry, cache, config) = session_parts();
        let report = ParseSession::new(&registry, &cache, &config).analyse("RNC01", "RNC01> alt\n");
        let row = &report.rows[1];
        assert_eq!(row.status, CheckStatus::CommandNotFound);
        assert_eq!(row.severity, Severity::Ok);
        assert_eq!(row.observation, "No alarms");
        assert_eq!(
            row.warnings,
            vec!["Command not found: get Synchronization=1 | st tusync"]
        );
    }

    #[test]
    fn test_layout_mismatch_keeps_going() {
        let (registry, cache, config) = session_parts();
        let report = ParseSession::new(&registry, &cache, &config).analyse("RNC01", TRANSCRIPT);
        let row = &report.rows[2];
        assert_eq!(row.status, CheckStatus::BlockPatternMismatch);
        assert_eq!(row.severity, Severity::Ok);
        assert_eq!(row.warnings.len(), 1);
        assert!(row.warnings[0].contains("'cvls'"));
    }

    #[test]
    fn test_excluded_check_still_has_a_row() {
        let (registry, cache, _) = session_parts();
        let config = AnalyserConfig {
            exclude: vec!["Check Disabled MOs".to_string()],
            ..AnalyserConfig::default()
        };
        let report = ParseSession::new(&registry, &cache, &config).analyse("RNC01", TRANSCRIPT);
        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.rows[0].status, CheckStatus::Excluded);
        assert_eq!(report.rows[0].severity, Severity::Ok);
    }

    #[test]
    fn test_repeated_alarm_blocks_share_one_summary() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("alarms.tsv"),
            "specificProblem\teventType\tprobableCause\tperceivedSeverity\n\
             CriticalProblemX\tx\ty\tCritical\n\
             NbapLinkDown\tx\ty\tMajor\n",
        )
        .unwrap();
        let registry = CheckRegistry::from_checks(vec![
            Check::new(
                "Check active Alarms",
                CommandSpec::single("alt"),
                r"(?s)(.*)",
                Some(r"(?m)^(\w) (\S+)$"),
                CheckKind::AlarmTally,
            )
            .unwrap()
            .with_alarm_reference("alarms.tsv"),
        ]);
        let cache = CatalogueCache::new();
        let config = AnalyserConfig {
            reference_dir: dir.path().to_path_buf(),
            ..AnalyserConfig::default()
        };
        let transcript = "RNC01> alt\nc CriticalProblemX\nRNC01> alt\nM NbapLinkDown\nRNC01> q\n";

        let report = ParseSession::new(&registry, &cache, &config).analyse("RNC01", transcript);
        let row = &report.rows[0];
        assert_eq!((row.tally.critical, row.tally.major), (1, 1));
        assert_eq!(row.tally.total(), 2);
        assert_eq!(row.severity, Severity::Critical);
        assert_eq!(row.observation, "Total 2 alarms: 1 critical, 1 major");
        assert_eq!(row.tally.details, vec!["CriticalProblemX", "NbapLinkDown"]);
    }

    #[test]
    fn test_worst_severity() {
        let (registry, cache, config) = session_parts();
        let report = ParseSession::new(&registry, &cache, &config).analyse("RNC01", TRANSCRIPT);
        assert_eq!(report.worst_severity(), Severity::Warning);
        assert!(report.row("Check CV and UP backups").is_some());
    }
}
