//! Ethernet switch port VLAN table.
//!
//! The body is a fixed-width table whose first line is the header:
//!
//! ```text
//! Board     Vlans        Priority PbitMap  DscpMap  Edge
//! ========================================================
//! 000100    101,102      6        0-7      0-63     on
//! 000200    0            6        0-7      0-63     on
//! ```
//!
//! Cells may contain spaces or be blank, so rows are cut at the column
//! offsets of the header words rather than split on whitespace.

use node_health_core::Severity;

use super::{Finding, RuleInput};

/// Character range of one header column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpan {
    pub name: String,
    pub start: usize,
    /// Exclusive end; `None` for the last column, which runs to end of line.
    pub end: Option<usize>,
}

/// Derives column spans from a header line. Each header word starts a span
/// that runs to the start of the next word.
///
/// # Examples
///
/// ```
/// use node_health_engine::classify::{column_spans, slice_row};
///
/// let spans = column_spans("Board  Vlans  Edge");
/// assert_eq!(spans[1].start, 7);
/// assert_eq!(slice_row("000100 101    on", &spans), vec!["000100", "101", "on"]);
/// ```
pub fn column_spans(header: &str) -> Vec<ColumnSpan> {
    let mut starts = Vec::new();
    let mut previous_blank = true;
    for (idx, ch) in header.chars().enumerate() {
        let blank = ch.is_whitespace();
        if !blank && previous_blank {
            starts.push(idx);
        }
        previous_blank = blank;
    }

    let names = header.split_whitespace();
    names
        .zip(starts.iter().enumerate())
        .map(|(name, (i, &start))| ColumnSpan {
            name: name.to_string(),
            start,
            end: starts.get(i + 1).copied(),
        })
        .collect()
}

/// Cuts a row into trimmed cells along `spans`. Short rows yield empty cells.
pub fn slice_row(row: &str, spans: &[ColumnSpan]) -> Vec<String> {
    let chars = row.chars().collect::<Vec<_>>();
    spans
        .iter()
        .map(|span| {
            let start = span.start.min(chars.len());
            let end = span.end.unwrap_or(chars.len()).min(chars.len());
            chars[start..end].iter().collect::<String>().trim().to_string()
        })
        .collect()
}

#[derive(Debug, Default)]
struct PortRow {
    board: String,
    vlans: String,
    priority: String,
    pbit_map: String,
    dscp_map: String,
    edge: String,
}

fn is_separator(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && line.chars().all(|c| c == '=' || c == '-')
}

fn parse_table(body: &str) -> Vec<PortRow> {
    let mut lines = body.lines().filter(|line| !line.trim().is_empty());
    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let spans = column_spans(header);
    let column = |name: &str| {
        spans
            .iter()
            .position(|span| span.name.eq_ignore_ascii_case(name))
    };
    let board = column("Board");
    let vlans = column("Vlans");
    let priority = column("Priority");
    let pbit = column("PbitMap");
    let dscp = column("DscpMap");
    let edge = column("Edge");

    lines
        .filter(|line| !is_separator(line))
        .map(|line| {
            let cells = slice_row(line, &spans);
            let cell = |idx: Option<usize>| {
                idx.and_then(|i| cells.get(i))
                    .cloned()
                    .unwrap_or_default()
            };
            PortRow {
                board: cell(board),
                vlans: cell(vlans),
                priority: cell(priority),
                pbit_map: cell(pbit),
                dscp_map: cell(dscp),
                edge: cell(edge),
            }
        })
        .collect()
}

fn all_equal<'a>(mut values: impl Iterator<Item = &'a str>) -> bool {
    match values.next() {
        Some(first) => values.all(|value| value == first),
        None => true,
    }
}

pub(super) fn evaluate(input: &RuleInput<'_>) -> Finding {
    let mut finding = Finding::new();
    let rows = parse_table(input.body);
    if rows.is_empty() {
        return finding;
    }

    let without_vlans = rows
        .iter()
        .filter(|row| matches!(row.vlans.as_str(), "" | "0" | "-"))
        .map(|row| row.board.as_str())
        .collect::<Vec<_>>();
    let edge_off = rows
        .iter()
        .filter(|row| {
            matches!(
                row.edge.to_lowercase().as_str(),
                "off" | "false" | "disabled"
            )
        })
        .map(|row| row.board.as_str())
        .collect::<Vec<_>>();

    if !without_vlans.is_empty() {
        finding.raise(Severity::Critical);
        finding.note(format!(
            "No VLANs configured on {}",
            super::join_sorted(without_vlans)
        ));
    } else if rows.len() >= 2 && all_equal(rows.iter().map(|row| row.priority.as_str())) {
        finding.raise(Severity::Major);
        finding.note(format!("Identical priority {} on all boards", rows[0].priority));
    } else if !all_equal(rows.iter().map(|row| row.pbit_map.as_str()))
        || !all_equal(rows.iter().map(|row| row.dscp_map.as_str()))
    {
        finding.raise(Severity::Minor);
        finding.note("Mismatched pbit/dscp maps");
    } else if !edge_off.is_empty() {
        finding.raise(Severity::Warning);
        finding.note(format!("Edge is off on {}", super::join_sorted(edge_off)));
    } else {
        finding.note("Ethernet configuration is OK");
    }
    finding
}
