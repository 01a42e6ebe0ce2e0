use node_health_core::Severity;

use super::{Finding, RuleInput};

/// Software release tokens (`W12B`, `W13A`, ...) against support bounds.
///
/// Tokens share one fixed shape, so plain string ordering matches release
/// ordering.
pub(super) fn evaluate(
    input: &RuleInput<'_>,
    unsupported_below: &str,
    deprecated_below: &str,
) -> Finding {
    let mut finding = Finding::new();
    let Some(minimum) = input.records.iter().map(|record| record.field(0)).min() else {
        return finding;
    };

    if minimum < unsupported_below {
        finding.raise(Severity::Critical);
    } else if minimum < deprecated_below {
        finding.raise(Severity::Major);
    }
    finding.note(format!("Minimum release: {minimum}"));
    finding
}
