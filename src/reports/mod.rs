//! Report generation
//!
//! Two report types exist, `department-spending` and `transaction-history`.
//! [`ReportGenerator`] validates the request, builds the data from a
//! consistent view of storage and persists the result through a
//! [`ReportStore`](crate::storage::ReportStore).

pub mod department_spending;
pub mod generator;
pub mod transaction_history;

pub use generator::ReportGenerator;

use crate::models::{ReportData, StoredReport};

/// Render a stored report for the terminal
pub fn format_terminal(report: &StoredReport, currency: &str) -> String {
    let mut output = format!(
        "Report {} ({})\nGenerated: {}\n\n",
        report.id,
        report.kind,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let body = match &report.data {
        ReportData::DepartmentSpending(data) => department_spending::format_terminal(data, currency),
        ReportData::TransactionHistory(data) => transaction_history::format_terminal(data, currency),
    };
    output.push_str(&body);
    output
}
