//! YAML report export

use std::io::Write;

use crate::error::{BudgetError, BudgetResult};
use crate::models::StoredReport;

use super::json::ReportExport;

/// Write a stored report as YAML with a comment header
pub fn export_report_yaml<W: Write>(report: &StoredReport, writer: &mut W) -> BudgetResult<()> {
    let export = ReportExport::new(report);
    let err = |e: std::io::Error| BudgetError::Export(e.to_string());

    writeln!(writer, "# GlobalBudget report export").map_err(err)?;
    writeln!(writer, "# Report: {} ({})", report.id, report.kind).map_err(err)?;
    writeln!(writer, "# Generated: {}", export.exported_at).map_err(err)?;
    writeln!(writer).map_err(err)?;

    serde_yaml::to_writer(&mut *writer, &export).map_err(|e| BudgetError::Export(e.to_string()))
}
