//! JSON report export

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{BudgetError, BudgetResult};
use crate::models::StoredReport;

/// Version of the export document layout
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// A report wrapped with export metadata
#[derive(Debug, Clone, Serialize)]
pub struct ReportExport<'a> {
    pub schema_version: &'static str,
    pub exported_at: DateTime<Utc>,
    pub app_version: &'static str,
    pub report: &'a StoredReport,
}

impl<'a> ReportExport<'a> {
    pub fn new(report: &'a StoredReport) -> Self {
        Self {
            schema_version: EXPORT_SCHEMA_VERSION,
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION"),
            report,
        }
    }
}

/// Write a stored report as pretty-printed JSON
pub fn export_report_json<W: Write>(report: &StoredReport, writer: &mut W) -> BudgetResult<()> {
    serde_json::to_writer_pretty(&mut *writer, &ReportExport::new(report))
        .map_err(|e| BudgetError::Export(e.to_string()))?;
    writeln!(writer).map_err(|e| BudgetError::Export(e.to_string()))
}
