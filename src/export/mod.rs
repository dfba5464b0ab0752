//! Export module for GlobalBudget
//!
//! Stored reports can be rendered as:
//! - CSV: one row per department or transaction, plus a total row
//! - JSON: the full report wrapped with export metadata
//! - YAML: the same document as JSON, human-readable
//!
//! The budget analysis (live department figures and insights) exports as CSV.

pub mod csv;
pub mod json;
pub mod yaml;

use std::fmt;
use std::io::Write;
use std::str::FromStr;

pub use self::csv::{export_budget_analysis_csv, export_report_csv};
pub use self::json::{export_report_json, ReportExport, EXPORT_SCHEMA_VERSION};
pub use self::yaml::export_report_yaml;

use crate::error::{BudgetError, BudgetResult};
use crate::models::StoredReport;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
    Yaml,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Json => "application/json",
            Self::Yaml => "application/yaml",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(BudgetError::Validation(format!(
                "Unsupported export format: {:?} (expected csv, json or yaml)",
                other
            ))),
        }
    }
}

/// Write a stored report in the requested format
pub fn export_report<W: Write>(
    report: &StoredReport,
    format: ExportFormat,
    writer: &mut W,
) -> BudgetResult<()> {
    match format {
        ExportFormat::Csv => export_report_csv(report, writer),
        ExportFormat::Json => export_report_json(report, writer),
        ExportFormat::Yaml => export_report_yaml(report, writer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("yml".parse::<ExportFormat>().unwrap(), ExportFormat::Yaml);
        assert!("xml".parse::<ExportFormat>().unwrap_err().is_validation());
    }

    #[test]
    fn test_format_metadata() {
        assert_eq!(ExportFormat::Json.content_type(), "application/json");
        assert_eq!(ExportFormat::Yaml.extension(), "yaml");
        assert_eq!(ExportFormat::default(), ExportFormat::Csv);
    }
}
