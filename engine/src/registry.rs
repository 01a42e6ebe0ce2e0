//! The ordered catalogue of health checks.
//!
//! Each [`Check`] names the console command it reads, how to cut the useful
//! part out of that command's block, how to split that part into records,
//! and which rule ([`CheckKind`]) classifies them. Registry order is report
//! row order.

use std::sync::LazyLock;

use regex::Regex;

use crate::classify::{AllocationLimits, CheckKind, Record, extract_records};
use crate::transcript::CommandSpec;

static STANDARD: LazyLock<CheckRegistry> = LazyLock::new(CheckRegistry::build_standard);

// Header and footer of `st <filter>` listings:
//   Proxy  Adm State     Op. State     MO
//   ==============================================
//     517  1 (UNLOCKED)  0 (DISABLED)  Sctp=1,M3uAssociation=Cs1
//   ==============================================
//   Total: 1 MOs
const ST_BLOCK: &str = r"(?si)Proxy +Adm +State +Op\. +State +MO\n={10,}\n(.*?)={10,}\nTotal: \d+ MOs";

const HEALTH_COMMAND: &str = "get ManagedElement=1 healthCheckResult|healthCheckSchedule";
const HEALTH_BLOCK: &str =
    r"(?si)={10,}\nMO +Attribute +Value\n={10,}\n(.*?)\n?={10,}\nTotal: \d+ Mos";

/// One health check.
#[derive(Debug, Clone)]
pub struct Check {
    pub caption: &'static str,
    pub command: CommandSpec,
    /// Group 1 is the body handed to the rule; later groups are context.
    pub block_pattern: Regex,
    /// Splits the body into records; `None` when the rule reads the body.
    pub record_pattern: Option<Regex>,
    /// File name of the alarm catalogue, resolved against the configured
    /// reference directory.
    pub alarm_reference: Option<&'static str>,
    pub kind: CheckKind,
}

/// Body and context captured from one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockMatch<'t> {
    pub body: &'t str,
    pub context: Record,
}

impl Check {
    /// Builds a check, compiling its patterns.
    ///
    /// # Errors
    ///
    /// Returns the regex error when either pattern does not compile.
    pub fn new(
        caption: &'static str,
        command: CommandSpec,
        block_pattern: &str,
        record_pattern: Option<&str>,
        kind: CheckKind,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            caption,
            command,
            block_pattern: Regex::new(block_pattern)?,
            record_pattern: record_pattern.map(Regex::new).transpose()?,
            alarm_reference: None,
            kind,
        })
    }

    /// Sets the alarm catalogue this check cross-references.
    pub fn with_alarm_reference(mut self, file_name: &'static str) -> Self {
        self.alarm_reference = Some(file_name);
        self
    }

    /// Applies the block pattern. `None` means the output no longer has the
    /// expected layout.
    pub fn match_block<'t>(&self, text: &'t str) -> Option<BlockMatch<'t>> {
        let caps = self.block_pattern.captures(text)?;
        let body = caps.get(1).map_or("", |m| m.as_str());
        let context = Record {
            matched: caps.get(0).map(|m| m.as_str().to_string()).unwrap_or_default(),
            fields: caps
                .iter()
                .skip(2)
                .map(|group| group.map(|m| m.as_str().to_string()))
                .collect(),
        };
        Some(BlockMatch { body, context })
    }

    /// Splits a block body into records.
    pub fn extract(&self, body: &str) -> Vec<Record> {
        self.record_pattern
            .as_ref()
            .map(|pattern| extract_records(pattern, body))
            .unwrap_or_default()
    }
}

/// Immutable, ordered set of checks.
#[derive(Debug, Clone)]
pub struct CheckRegistry {
    checks: Vec<Check>,
}

impl CheckRegistry {
    /// The standard controller-node check list, built once.
    pub fn standard() -> &'static CheckRegistry {
        &STANDARD
    }

    pub fn from_checks(checks: Vec<Check>) -> Self {
        Self { checks }
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    pub fn get(&self, order: usize) -> Option<&Check> {
        self.checks.get(order)
    }

    pub fn find(&self, caption: &str) -> Option<&Check> {
        self.checks.iter().find(|check| check.caption == caption)
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    fn build_standard() -> Self {
        let check = |caption, command, block: &str, record: Option<&str>, kind| {
            Check::new(caption, command, block, record, kind).expect("static regex must compile")
        };
        let single = CommandSpec::single;

        let checks = vec![
            check(
                "Check active Alarms",
                single("alt"),
                r"(?si)={10,}\nDate & Time \(Local\) +S +Specific Problem +MO \(Cause/AdditionalInfo\)\n={10,}\n(.*?)\n?>>> Total: \d+ Alarms \(\d+ Critical, \d+ Major\)",
                Some(r"20\d{2}-\d{2}-\d{2} \d{2}:\d{2}:\d{2} (\w) ((?:\w+ ?)+) +(.*)"),
                CheckKind::AlarmTally,
            )
            .with_alarm_reference("Alarms_and_events.tsv"),
            check(
                "Check Event and System Logs",
                single("lgesmr 7d"),
                r"(?si)={10,}\nTimestamp \(UTC\) +Type +Merged Log Entry\n={10,}\n(.*)",
                Some(
                    r"(?i)[\d-]+ [\d:]+ +\w+ +(?:(?:(?:\w+=\w+),)+(\w+=\w+)|(?:Crash on (\d+), device=(\d+) \w+)) +(.+)",
                ),
                CheckKind::EventLogTriage,
            ),
            check(
                "Check Node Restart and System Downtime",
                single("lgd"),
                r"(?si)={10,}\nTimestamp \(UTC\) +RestartType/Reason +Configuration Version +SwRelease +CPP Downtime +Appl\. Downtime +JVM Downtime\n={10,}\n(.+)\n\nNode uptime since last restart: \d+ \w+ \((?:(\d+) days)?,? ?(?:(\d+) hours)?",
                Some(r"(?i)(\d{4})-(\d{2})-(\d{2}) [\d:]+ Spontaneous"),
                CheckKind::RestartWindow { window_days: 14 },
            ),
            check(
                "Check Date and Time Synchronization",
                single("lh coremp readclock"),
                r"(?si)\d{6}-\d{2}:\d{2}:\d{2} [\w \d./=]+\n(.+)",
                Some(r"\$ lhsh 00\d{2}00 readclock\n\d+: Date: 20(\d{2})-(\d{2})-(\d{2})"),
                CheckKind::ClockDrift,
            ),
            check(
                "Check Network Synchronization",
                CommandSpec::alternatives(&["get Synchronization=1", "st tusync"]),
                r"(?s)(.*)",
                None,
                CheckKind::Passive,
            ),
            check(
                "Check the M3UA Associations",
                single("st m3ua"),
                ST_BLOCK,
                Some(
                    r"(?mi)^ *\d+ +\d+ \(\w+\) +\d+ \(DISABLED\) +(?:\w+=\w+,)*M3uAssociation=(\w{2})\w*",
                ),
                CheckKind::AssociationCounts,
            ),
            check(
                "Check RNC CC, DC and PDR devices",
                single("std"),
                r"(?i)-{10,}\nType +%Up +Total +Enabled\(1\) +Disabled\(0\) +Locked\(L\) +Active\(A\) +Idle\(I\) +Busy\(B\) +Unallocated\n-{10,}\n((?:\w+ +\d+% +\d+ +\d+ +\d+ +\d+ +\d+ +\d+ +\d+ +\d+\n)+)-{10,}\nTOT +\d+% +\d+ +\d+ +\d+ +\d+ +\d+ +\d+ +\d+ +\d",
                Some(
                    r"(?i)(\w+) +(\d+)% +(\d+) +(\d+) +(\d+) +(\d+) +(\d+) +(\d+) +(\d+) +(\d+)",
                ),
                CheckKind::ResourcePool,
            ),
            check(
                "Check IubLink and Utrancell resource Status",
                single("strt"),
                r"(?si)Following \d+ sites are up:\n-{10,}\n[^\n]*\n-{10,}\n.*?-{10,}\n\nFollowing \d+ sites are totally or partially unavailable:\n-{10,}\n[^\n]*\n-{10,}\n.*?-{10,}\n\n((?:[\w ]+: +\d+ of +\d+ (?:\w+ )+\(\d+\.\d+ %\)\n?)*)",
                Some(r"((?:\w+ ?)+): +(\d+) of +(\d+) [\w ]+\(([\d.]+) %\)"),
                CheckKind::SiteAvailability,
            ),
            check(
                "Check RANAP and Iu link",
                single("st ranap"),
                ST_BLOCK,
                Some(r"(?m)^ *\d+ +\d+ \(\w+\) +\d+ \(DISABLED\) +((?:\w+=\w+,?)+)"),
                CheckKind::LinkDisabled,
            ),
            check(
                "Check CV and UP backups",
                single("cvls"),
                r"(?si)(.*>>> Total: \d+ CVs?, \d+ UPs?.*)",
                Some(r"(?i)>>> Total: (\d+) CVs?, (\d+) UPs?"),
                CheckKind::BackupCounts {
                    cv_limit: 30,
                    up_limit: 2,
                },
            ),
            check(
                "Check Database Consistency",
                single("dbc"),
                r"(?si)(Checking database consistency.*)",
                Some(r"(?m)^(.+)$"),
                CheckKind::DatabaseConsistency {
                    benign_table: "UtranRelationCache",
                },
            ),
            check(
                "Check Software Release",
                single("cvcu"),
                r"(?si)(Current UpgradePkg.*)",
                Some(r"\b(W\d{2}[A-Z]?)"),
                CheckKind::SoftwareRelease {
                    unsupported_below: "W12",
                    deprecated_below: "W14",
                },
            ),
            check(
                "Check Ethernet VLAN Configuration",
                single("hget EthernetSwitchPort vlan|priority|map|edge"),
                r"(?s)={10,}\n(Board +[^\n]*\n={10,}\n.*?)\n?={10,}",
                None,
                CheckKind::EthernetVlan,
            ),
            check(
                "Check CC, DC and PDR Allocation",
                single("lhsh 000100 lhstat"),
                r"(?si)(LinkHandler +Status +MsgBoard\n.*)",
                Some(r"(?m)^(lh[\w-]*) +(\w+) +(\w+) *$"),
                CheckKind::DeviceAllocation(AllocationLimits::default()),
            ),
            check(
                "Check Disabled MOs",
                single("st . dis"),
                ST_BLOCK,
                Some(r"(?m)^ *\d+ +\d+ \(\w+\) +\d+ \(DISABLED\) +(\S+)"),
                CheckKind::DisabledCount { limit: 20 },
            ),
            check(
                "Health check result",
                single(HEALTH_COMMAND),
                HEALTH_BLOCK,
                Some(r"(?i)>>> \d+\.(?:healthCheck)?resultCode = (\w+)"),
                CheckKind::HealthCheckResult { ok_code: "0" },
            ),
            check(
                "Health check scheduler",
                single(HEALTH_COMMAND),
                HEALTH_BLOCK,
                Some(r"ManagedElement=\d+ +healthCheckSchedule +t\[(\d+)\]"),
                CheckKind::HealthCheckSchedule,
            ),
        ];

        Self { checks }
    }
}
