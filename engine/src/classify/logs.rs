//! Event and system log triage.
//!
//! Records are `(mo, crash count, device, text)`. Four independent sub-rules
//! run over the same records and the most severe one wins.

use std::collections::BTreeSet;

use node_health_core::Severity;

use super::{Finding, RuleInput, join_sorted};

const RESET_RESOURCE: &str = "ranap_cninitiatedresetresource";
const GTP_ECHO: &str = "ipethpacketdatarouter_cnnotrespondingtogtpecho";
const NON_LOCAL_MAU: &str = "a non-local mau has been chosen as the active client";

pub(super) fn evaluate(input: &RuleInput<'_>) -> Finding {
    let mut finding = Finding::new();
    text_marker(
        input,
        &mut finding,
        RESET_RESOURCE,
        Severity::Critical,
        "Ranap_CNInitiatedResetResource",
    );
    text_marker(
        input,
        &mut finding,
        GTP_ECHO,
        Severity::Major,
        "IpEthPacketDataRouter_CnNotRespondingToGTPEcho",
    );
    crashes(input, &mut finding);
    text_marker(
        input,
        &mut finding,
        NON_LOCAL_MAU,
        Severity::Warning,
        "A Non-Local MAU Has Been Chosen as the Active Client",
    );
    finding
}

fn text_marker(
    input: &RuleInput<'_>,
    finding: &mut Finding,
    marker: &str,
    severity: Severity,
    label: &str,
) {
    let hits = input
        .records
        .iter()
        .filter(|record| record.field(3).to_lowercase().contains(marker))
        .collect::<Vec<_>>();
    if hits.is_empty() {
        return;
    }
    finding.raise(severity);
    let mos = join_sorted(hits.iter().map(|record| record.field(0)));
    finding.note(format!("{label} {mos} sum: {}", hits.len()));
}

fn crashes(input: &RuleInput<'_>, finding: &mut Finding) {
    let mut previous_device: Option<&str> = None;
    let mut seen = BTreeSet::new();
    let mut sum = 0;

    for record in input.records {
        let Some(count) = record.get(1).filter(|c| !c.is_empty()) else {
            continue;
        };
        let device = record.field(2);
        let n = record.number(1).unwrap_or(0);

        if previous_device.is_some_and(|prev| prev != device) {
            finding.raise(Severity::Critical);
        } else if n > 1 {
            finding.raise(Severity::Major);
        } else if n == 1 {
            finding.raise(Severity::Minor);
        }
        previous_device = Some(device);
        seen.insert(format!("Crash on {count}, device={device}"));
        sum += 1;
    }

    if sum > 0 {
        let crashes = seen.into_iter().collect::<Vec<_>>().join(", ");
        finding.note(format!("{crashes} sum: {sum}"));
    }
}
