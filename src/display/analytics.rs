//! Analytics display formatting

use crate::models::{format_amount, format_percent};
use crate::services::AnalyticsSummary;

/// Format the portfolio summary followed by its insights
pub fn format_analytics(summary: &AnalyticsSummary, currency: &str) -> String {
    let totals = &summary.totals;
    let mut output = String::new();

    output.push_str("Budget Analytics\n");
    output.push_str(&"=".repeat(40));
    output.push('\n');
    output.push_str(&format!("Departments:     {}\n", summary.department_count));
    output.push_str(&format!(
        "Total budget:    {}\n",
        format_amount(totals.total_budget, currency)
    ));
    output.push_str(&format!(
        "Total spent:     {}\n",
        format_amount(totals.total_spent, currency)
    ));
    output.push_str(&format!(
        "Total remaining: {}\n",
        format_amount(totals.total_remaining, currency)
    ));
    output.push_str(&format!("Utilization:     {}\n", format_percent(totals.utilization)));

    if !summary.insights.is_empty() {
        output.push_str("\nInsights\n");
        for insight in &summary.insights {
            output.push_str(&format!("  - {}\n", insight));
        }
    }
    output
}
