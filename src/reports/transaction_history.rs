//! Transaction history report
//!
//! Transactions matching every given filter, newest date first, with the
//! signed total of their amounts.

use std::collections::HashMap;

use crate::models::{
    format_amount, Department, DepartmentId, Transaction, TransactionHistoryData,
    TransactionHistoryParams, TransactionHistoryRow,
};
use crate::normalize::NumericNormalizer;

fn matches(params: &TransactionHistoryParams, txn: &Transaction) -> bool {
    params.department_id.map_or(true, |id| txn.department_id == id)
        && params
            .category
            .as_deref()
            .map_or(true, |category| txn.in_category(category))
}

/// Build the report data
pub fn build(
    normalizer: &NumericNormalizer,
    params: &TransactionHistoryParams,
    departments: &[Department],
    transactions: &[Transaction],
) -> TransactionHistoryData {
    let names: HashMap<DepartmentId, &str> =
        departments.iter().map(|d| (d.id, d.name.as_str())).collect();

    let mut selected: Vec<&Transaction> = transactions.iter().filter(|t| matches(params, t)).collect();
    selected.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));

    let total: i128 = selected.iter().map(|t| t.amount as i128).sum();

    let rows = selected
        .into_iter()
        .map(|txn| TransactionHistoryRow {
            id: txn.id,
            department_id: txn.department_id,
            department_name: names.get(&txn.department_id).copied().unwrap_or_default().to_string(),
            amount: normalizer.normalize_or_zero(txn.amount),
            description: txn.description.clone(),
            category: txn.category.clone(),
            date: txn.date,
        })
        .collect();

    TransactionHistoryData {
        transactions: rows,
        total_amount: normalizer.normalize_or_zero(total),
        filters: params.clone(),
    }
}

/// Format the report for terminal display
pub fn format_terminal(data: &TransactionHistoryData, currency: &str) -> String {
    let mut output = String::from("Transaction History\n");
    output.push_str(&"=".repeat(80));
    output.push('\n');

    if let Some(category) = &data.filters.category {
        output.push_str(&format!("Category: {}\n", category));
    }
    if let Some(department) = data.filters.department_id {
        output.push_str(&format!("Department: {}\n", department));
    }

    output.push_str(&format!(
        "{:<12} {:<14} {:<26} {:<12} {:>12}\n",
        "Date", "Department", "Description", "Category", "Amount"
    ));
    output.push_str(&"-".repeat(80));
    output.push('\n');

    for row in &data.transactions {
        let description: String = row.description.chars().take(26).collect();
        output.push_str(&format!(
            "{:<12} {:<14} {:<26} {:<12} {:>12}\n",
            row.date.to_string(),
            row.department_name,
            description,
            row.category.as_deref().unwrap_or(""),
            format_amount(row.amount, currency)
        ));
    }

    output.push_str(&"-".repeat(80));
    output.push('\n');
    output.push_str(&format!(
        "{} transactions, total {}\n",
        data.transactions.len(),
        format_amount(data.total_amount, currency)
    ));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_category_filter() {
        let dept = Department::new("sales", 1000);
        let txns = vec![
            Transaction::with_details(dept.id, -50, date(1), "Flight", Some("Travel".into())),
            Transaction::with_details(dept.id, -20, date(2), "Lunch", Some("Food".into())),
        ];
        let params = TransactionHistoryParams {
            department_id: None,
            category: Some("Travel".into()),
        };

        let data = build(&NumericNormalizer::new(), &params, &[dept], &txns);
        assert_eq!(data.transactions.len(), 1);
        assert_eq!(data.total_amount, -50);
        assert_eq!(data.transactions[0].department_name, "SALES");
        assert_eq!(data.filters, params);
    }

    #[test]
    fn test_filters_combine_and_sort_newest_first() {
        let a = Department::new("a", 10);
        let b = Department::new("b", 10);
        let txns = vec![
            Transaction::with_details(a.id, -1, date(1), "", Some("Ops".into())),
            Transaction::with_details(a.id, 9, date(9), "", Some("Ops".into())),
            Transaction::with_details(a.id, -3, date(3), "", Some("Other".into())),
            Transaction::with_details(b.id, -4, date(4), "", Some("Ops".into())),
        ];
        let params = TransactionHistoryParams {
            department_id: Some(a.id),
            category: Some("Ops".into()),
        };

        let data = build(&NumericNormalizer::new(), &params, &[a, b], &txns);
        let amounts: Vec<_> = data.transactions.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![9, -1]);
        assert_eq!(data.total_amount, 8);
    }

    #[test]
    fn test_no_filters_returns_everything() {
        let dept = Department::new("x", 1);
        let txns = vec![Transaction::new(dept.id, -5, date(1))];
        let data = build(
            &NumericNormalizer::new(),
            &TransactionHistoryParams::default(),
            &[],
            &txns,
        );
        assert_eq!(data.transactions.len(), 1);
        assert_eq!(data.transactions[0].department_name, "");
    }

    #[test]
    fn test_terminal_output() {
        let dept = Department::new("sales", 1000);
        let txns = vec![Transaction::with_details(dept.id, -1500, date(1), "Hotel", Some("Travel".into()))];
        let data = build(&NumericNormalizer::new(), &TransactionHistoryParams::default(), &[dept], &txns);
        let text = format_terminal(&data, "$");
        assert!(text.contains("Hotel"));
        assert!(text.contains("-$1,500"));
        assert!(text.contains("1 transactions"));
    }
}
