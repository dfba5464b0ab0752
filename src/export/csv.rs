//! CSV exports

use std::io::Write;

use crate::error::{BudgetError, BudgetResult};
use crate::models::{format_percent, ReportData, StoredReport};
use crate::services::AnalyticsSummary;

fn export_err(e: impl std::fmt::Display) -> BudgetError {
    BudgetError::Export(e.to_string())
}

fn writer<W: Write>(out: W) -> csv::Writer<W> {
    // Insight rows have a different width than the table rows.
    csv::WriterBuilder::new().flexible(true).from_writer(out)
}

/// Write a stored report as CSV rows with a trailing total row
pub fn export_report_csv<W: Write>(report: &StoredReport, out: &mut W) -> BudgetResult<()> {
    let mut wtr = writer(out);

    match &report.data {
        ReportData::DepartmentSpending(data) => {
            wtr.write_record(["Department", "Budget", "Spent", "Description", "Manager"])
                .map_err(export_err)?;
            for row in &data.departments {
                wtr.write_record([
                    row.name.clone(),
                    row.budget.to_string(),
                    row.spent.to_string(),
                    row.description.clone().unwrap_or_default(),
                    row.manager.clone().unwrap_or_default(),
                ])
                .map_err(export_err)?;
            }
            wtr.write_record([
                "TOTAL".to_string(),
                data.total_budget.to_string(),
                data.total_spent.to_string(),
                String::new(),
                String::new(),
            ])
            .map_err(export_err)?;
        }
        ReportData::TransactionHistory(data) => {
            wtr.write_record(["Date", "Department", "Description", "Category", "Amount"])
                .map_err(export_err)?;
            for row in &data.transactions {
                wtr.write_record([
                    row.date.to_string(),
                    row.department_name.clone(),
                    row.description.clone(),
                    row.category.clone().unwrap_or_default(),
                    row.amount.to_string(),
                ])
                .map_err(export_err)?;
            }
            let total = data.total_amount.to_string();
            wtr.write_record(["TOTAL", "", "", "", total.as_str()])
                .map_err(export_err)?;
        }
    }

    wtr.flush().map_err(export_err)
}

/// Write the live budget analysis: one row per department, then the insights
pub fn export_budget_analysis_csv<W: Write>(
    summary: &AnalyticsSummary,
    out: &mut W,
) -> BudgetResult<()> {
    let mut wtr = writer(out);

    wtr.write_record(["Department", "Budget", "Spent", "Remaining", "Utilization"])
        .map_err(export_err)?;
    for view in &summary.departments {
        wtr.write_record([
            view.department.name.clone(),
            view.department.budget.to_string(),
            view.spent.to_string(),
            view.remaining.to_string(),
            format_percent(view.utilization),
        ])
        .map_err(export_err)?;
    }

    wtr.write_record([""]).map_err(export_err)?;
    wtr.write_record(["Insights"]).map_err(export_err)?;
    for insight in &summary.insights {
        wtr.write_record([insight.as_str()]).map_err(export_err)?;
    }

    wtr.flush().map_err(export_err)
}
