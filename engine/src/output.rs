//! Output formatting for node reports and the check list.

use crate::error::{AnalyseError, Result};
use crate::registry::CheckRegistry;
use crate::session::NodeReport;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

/// Formats node reports in the requested output format.
pub fn format_reports(reports: &[NodeReport], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(reports)
            .map_err(|e| AnalyseError::Render(format!("JSON serialization failed: {e}"))),
        OutputFormat::Yaml => serde_yaml::to_string(reports)
            .map_err(|e| AnalyseError::Render(format!("YAML serialization failed: {e}"))),
        OutputFormat::Table => Ok(reports_to_table(reports)),
    }
}

/// One `# node (date)` header per node followed by tab-separated rows.
fn reports_to_table(reports: &[NodeReport]) -> String {
    let mut out = String::new();

    for report in reports {
        match &report.log_date {
            Some(date) => out.push_str(&format!("# {} ({date})\n", report.node_name)),
            None => out.push_str(&format!("# {}\n", report.node_name)),
        }
        for row in &report.rows {
            out.push_str(&format!("{row}\n"));
            for warning in &row.warnings {
                out.push_str(&format!("\t! {warning}\n"));
            }
        }
        out.push('\n');
    }

    out
}

/// Lists the registry as `order\tcaption\tcommand`.
pub fn format_checks(registry: &CheckRegistry) -> String {
    let mut out = String::new();
    for (order, check) in registry.checks().iter().enumerate() {
        out.push_str(&format!("{order}\t{}\t{}\n", check.caption, check.command));
    }
    out
}
