//! Department spending report
//!
//! Per-department spending within an optional inclusive date window. Spending
//! here is the signed sum of every amount in the window, not the expense-only
//! figure shown by the live department views.

use std::collections::HashMap;

use crate::models::{
    format_amount, Department, DepartmentId, DepartmentSpendingData, DepartmentSpendingParams,
    DepartmentSpendingRow, ReportPeriod, Transaction,
};
use crate::normalize::NumericNormalizer;
use crate::services::aggregation::{AllAmountsWindowedAggregation, DepartmentAggregator};

/// Build the report data
pub fn build(
    aggregator: &DepartmentAggregator,
    normalizer: &NumericNormalizer,
    params: &DepartmentSpendingParams,
    departments: &[Department],
    transactions: &[Transaction],
) -> DepartmentSpendingData {
    let policy = AllAmountsWindowedAggregation {
        start: params.start_date,
        end: params.end_date,
    };

    let mut by_department: HashMap<DepartmentId, Vec<Transaction>> = HashMap::new();
    for txn in transactions {
        by_department.entry(txn.department_id).or_default().push(txn.clone());
    }

    let mut ordered: Vec<&Department> = departments.iter().collect();
    ordered.sort_by(|a, b| a.name.cmp(&b.name));

    let rows: Vec<DepartmentSpendingRow> = ordered
        .into_iter()
        .map(|department| {
            let own = by_department
                .get(&department.id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let totals = aggregator.aggregate(&policy, department, own);
            DepartmentSpendingRow {
                id: department.id,
                name: department.name.clone(),
                budget: totals.budget,
                spent: totals.spent,
                description: department.description.clone(),
                manager: department.manager.clone(),
            }
        })
        .collect();

    let total_budget = normalizer.normalize_or_zero(rows.iter().map(|r| r.budget as i128).sum::<i128>());
    let total_spent = normalizer.normalize_or_zero(rows.iter().map(|r| r.spent as i128).sum::<i128>());

    DepartmentSpendingData {
        departments: rows,
        total_budget,
        total_spent,
        period: ReportPeriod {
            start_date: params.start_date,
            end_date: params.end_date,
        },
    }
}

/// Format the report for terminal display
pub fn format_terminal(data: &DepartmentSpendingData, currency: &str) -> String {
    let mut output = String::new();

    let bound = |d: Option<chrono::NaiveDate>| d.map_or_else(|| "open".to_string(), |d| d.to_string());
    output.push_str(&format!(
        "Department Spending: {} to {}\n",
        bound(data.period.start_date),
        bound(data.period.end_date)
    ));
    output.push_str(&"=".repeat(64));
    output.push('\n');
    output.push_str(&format!(
        "{:<30} {:>16} {:>16}\n",
        "Department", "Budget", "Spent"
    ));
    output.push_str(&"-".repeat(64));
    output.push('\n');

    for row in &data.departments {
        output.push_str(&format!(
            "{:<30} {:>16} {:>16}\n",
            row.name,
            format_amount(row.budget, currency),
            format_amount(row.spent, currency)
        ));
    }

    output.push_str(&"-".repeat(64));
    output.push('\n');
    output.push_str(&format!(
        "{:<30} {:>16} {:>16}\n",
        "TOTAL",
        format_amount(data.total_budget, currency),
        format_amount(data.total_spent, currency)
    ));
    output
}
