//! Transaction display formatting

use crate::models::{format_amount, Transaction};
use crate::services::TransactionPage;

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let cut: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// Format one page of transactions as a table
pub fn format_transaction_page(page: &TransactionPage, currency: &str) -> String {
    if page.data.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<12}  {:<12}  {:<16}  {:<28}  {:<14}  {:>12}\n",
        "ID", "Date", "Department", "Description", "Category", "Amount"
    ));
    output.push_str(&format!(
        "{:-<12}  {:-<12}  {:-<16}  {:-<28}  {:-<14}  {:->12}\n",
        "", "", "", "", "", ""
    ));

    for view in &page.data {
        let txn = &view.transaction;
        output.push_str(&format!(
            "{:<12}  {:<12}  {:<16}  {:<28}  {:<14}  {:>12}\n",
            txn.id.short(),
            txn.date.to_string(),
            truncate(&view.department_name, 16),
            truncate(&txn.description, 28),
            truncate(txn.category.as_deref().unwrap_or(""), 14),
            format_amount(txn.amount, currency),
        ));
    }

    let pages = page.total.div_ceil(page.limit.max(1));
    output.push_str(&format!(
        "\nPage {} of {} ({} transactions)\n",
        page.page,
        pages.max(1),
        page.total
    ));
    output
}

/// Format a single transaction in detail
pub fn format_transaction_details(txn: &Transaction, department_name: &str, currency: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!("Transaction: {}\n", txn.id));
    output.push_str(&format!("  Department:  {}\n", department_name));
    output.push_str(&format!("  Kind:        {}\n", txn.kind()));
    output.push_str(&format!("  Amount:      {}\n", format_amount(txn.amount, currency)));
    output.push_str(&format!("  Date:        {}\n", txn.date));
    if !txn.description.is_empty() {
        output.push_str(&format!("  Description: {}\n", txn.description));
    }
    if let Some(category) = &txn.category {
        output.push_str(&format!("  Category:    {}\n", category));
    }
    output
}
