//! Department display formatting

use crate::models::{format_amount, format_percent};
use crate::services::{DepartmentView, PortfolioTotals};

/// Format departments with their live figures as a table
pub fn format_department_list(
    views: &[DepartmentView],
    totals: &PortfolioTotals,
    currency: &str,
) -> String {
    if views.is_empty() {
        return "No departments found.\n".to_string();
    }

    let name_width = views
        .iter()
        .map(|v| v.department.name.len())
        .max()
        .unwrap_or(10)
        .max(10);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:>14}  {:>14}  {:>14}  {:>8}\n",
        "Department",
        "Budget",
        "Spent",
        "Remaining",
        "Used",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:->14}  {:->14}  {:->14}  {:->8}\n",
        "",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for view in views {
        let marker = if view.balance < 0 { " !" } else { "" };
        output.push_str(&format!(
            "{:<name_width$}  {:>14}  {:>14}  {:>14}  {:>8}{}\n",
            view.department.name,
            format_amount(view.department.budget, currency),
            format_amount(view.spent, currency),
            format_amount(view.remaining, currency),
            format_percent(view.utilization),
            marker,
            name_width = name_width,
        ));
    }

    output.push_str(&format!(
        "{:-<name_width$}  {:->14}  {:->14}  {:->14}  {:->8}\n",
        "",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:<name_width$}  {:>14}  {:>14}  {:>14}  {:>8}\n",
        "TOTAL",
        format_amount(totals.total_budget, currency),
        format_amount(totals.total_spent, currency),
        format_amount(totals.total_remaining, currency),
        format_percent(totals.utilization),
        name_width = name_width,
    ));

    output
}

/// Format a single department in detail
pub fn format_department_details(view: &DepartmentView, currency: &str) -> String {
    let department = &view.department;
    let mut output = String::new();

    output.push_str(&format!("Department: {}\n", department.name));
    output.push_str(&format!("  ID:          {}\n", department.id));
    if let Some(description) = &department.description {
        output.push_str(&format!("  Description: {}\n", description));
    }
    if let Some(manager) = &department.manager {
        output.push_str(&format!("  Manager:     {}\n", manager));
    }
    output.push_str(&format!(
        "  Budget:      {}\n",
        format_amount(department.budget, currency)
    ));
    output.push_str(&format!("  Spent:       {}\n", format_amount(view.spent, currency)));
    output.push_str(&format!(
        "  Remaining:   {}\n",
        format_amount(view.remaining, currency)
    ));
    output.push_str(&format!("  Utilization: {}\n", format_percent(view.utilization)));
    if view.balance < 0 {
        output.push_str(&format!(
            "  Over budget by {}\n",
            format_amount(-view.balance, currency)
        ));
    }
    output.push_str(&format!(
        "  Created:     {}\n",
        department.created_at.format("%Y-%m-%d %H:%M")
    ));

    output
}
