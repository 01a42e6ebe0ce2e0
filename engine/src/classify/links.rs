//! Disabled RANAP and Iu links.

use std::sync::LazyLock;

use node_health_core::Severity;
use regex::Regex;

use super::{Finding, RuleInput};

static CORE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)cnoperator=\w+,iulink=(?:1,ranap=\w*cs|2,ranap=\w*ps)")
        .expect("static regex must compile")
});

/// Whether a disabled MO takes down the local RANAP access point or a
/// CS/PS Iu link.
fn is_core_link(mo: &str) -> bool {
    mo.to_lowercase().contains("sccpaplocal=ranaplocal") || CORE_LINK.is_match(mo)
}

pub(super) fn evaluate(input: &RuleInput<'_>) -> Finding {
    let mut finding = Finding::new();
    for record in input.records {
        let mo = record.field(0).trim();
        if is_core_link(mo) {
            finding.raise(Severity::Critical);
            finding.note(format!("Disabled RANAP link: {mo}"));
        }
    }
    if finding.notes.is_empty() {
        finding.note("RANAP is OK");
    }
    finding
}
