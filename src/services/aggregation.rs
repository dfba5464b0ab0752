//! Department spending aggregation
//!
//! Two spending policies exist and are kept apart on purpose:
//!
//! - [`ExpenseOnlyAggregation`] backs every live view (department listing,
//!   analytics). Only expenses count, by magnitude.
//! - [`AllAmountsWindowedAggregation`] backs the department-spending report.
//!   Every amount in the date window counts with its sign, so a department
//!   with more income than expenses reports negative spending.
//!
//! Sums are accumulated as `i128` and pass through the normalizer, so an
//! overflowing total degrades to zero instead of panicking.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::models::{Department, Transaction};
use crate::normalize::NumericNormalizer;

/// How `spent` is derived from a department's transactions
pub trait SpentPolicy {
    fn spent(&self, transactions: &[&Transaction]) -> i128;
}

/// Sum of expense magnitudes
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpenseOnlyAggregation;

impl SpentPolicy for ExpenseOnlyAggregation {
    fn spent(&self, transactions: &[&Transaction]) -> i128 {
        transactions
            .iter()
            .filter(|t| t.is_expense())
            .map(|t| -(t.amount as i128))
            .sum()
    }
}

/// Signed sum of every amount dated inside an inclusive window
#[derive(Debug, Clone, Copy, Default)]
pub struct AllAmountsWindowedAggregation {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl SpentPolicy for AllAmountsWindowedAggregation {
    fn spent(&self, transactions: &[&Transaction]) -> i128 {
        transactions
            .iter()
            .filter(|t| t.within(self.start, self.end))
            .map(|t| t.amount as i128)
            .sum()
    }
}

/// Derived figures for one department
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DepartmentTotals {
    pub budget: i64,
    pub spent: i64,
    /// `budget - spent`, floored at zero
    pub remaining: i64,
    /// `budget - spent`, signed; negative means overspent
    pub balance: i64,
    /// Percent of budget spent; zero when the budget is zero
    pub utilization: f64,
}

impl DepartmentTotals {
    pub fn is_overspent(&self) -> bool {
        self.balance < 0
    }
}

/// Portfolio-wide sums
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotals {
    pub total_budget: i64,
    pub total_spent: i64,
    pub total_remaining: i64,
    pub utilization: f64,
}

/// Computes per-department and portfolio totals
#[derive(Debug, Clone, Default)]
pub struct DepartmentAggregator {
    normalizer: NumericNormalizer,
}

impl DepartmentAggregator {
    pub fn new(normalizer: NumericNormalizer) -> Self {
        Self { normalizer }
    }

    /// Totals for `department`; transactions of other departments are ignored
    pub fn aggregate<P: SpentPolicy>(
        &self,
        policy: &P,
        department: &Department,
        transactions: &[Transaction],
    ) -> DepartmentTotals {
        let own: Vec<&Transaction> = transactions
            .iter()
            .filter(|t| t.department_id == department.id)
            .collect();

        let budget = self.normalizer.normalize_or_zero(department.budget);
        let spent = self.normalizer.normalize_or_zero(policy.spent(&own));
        let balance = self
            .normalizer
            .normalize_or_zero(budget as i128 - spent as i128);

        debug!(
            department = %department.name,
            transactions = own.len(),
            budget,
            spent,
            "aggregated department"
        );

        DepartmentTotals {
            budget,
            spent,
            remaining: balance.max(0),
            balance,
            utilization: utilization(spent, budget),
        }
    }

    /// Unweighted sums over per-department totals
    pub fn portfolio(&self, departments: &[DepartmentTotals]) -> PortfolioTotals {
        let sum = |f: fn(&DepartmentTotals) -> i64| -> i64 {
            self.normalizer
                .normalize_or_zero(departments.iter().map(|d| f(d) as i128).sum::<i128>())
        };

        let total_budget = sum(|d| d.budget);
        let total_spent = sum(|d| d.spent);
        let total_remaining = sum(|d| d.remaining);

        PortfolioTotals {
            total_budget,
            total_spent,
            total_remaining,
            utilization: utilization(total_spent, total_budget),
        }
    }
}

/// `spent / budget * 100`, rounded to two decimals; zero for a zero budget
pub fn utilization(spent: i64, budget: i64) -> f64 {
    if budget == 0 {
        return 0.0;
    }
    let percent = spent as f64 / budget as f64 * 100.0;
    (percent * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::MAX_SAFE_INTEGER;
    use proptest::prelude::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn department(budget: i64, amounts: &[(i64, NaiveDate)]) -> (Department, Vec<Transaction>) {
        let dept = Department::new("TEST", budget);
        let txns = amounts
            .iter()
            .map(|(amount, date)| Transaction::new(dept.id, *amount, *date))
            .collect();
        (dept, txns)
    }

    #[test]
    fn test_expense_only_counts_expense_magnitudes() {
        let (dept, txns) = department(
            1000,
            &[(-300, date(1, 1)), (-200, date(1, 2)), (500, date(1, 3))],
        );
        let totals = DepartmentAggregator::default().aggregate(&ExpenseOnlyAggregation, &dept, &txns);

        assert_eq!(totals.spent, 500);
        assert_eq!(totals.remaining, 500);
        assert_eq!(totals.balance, 500);
        assert_eq!(totals.utilization, 50.0);
    }

    #[test]
    fn test_windowed_policy_sums_signed_amounts() {
        let (dept, txns) = department(
            1000,
            &[(-300, date(1, 1)), (-200, date(1, 2)), (500, date(1, 3))],
        );
        let aggregator = DepartmentAggregator::default();

        let all = aggregator.aggregate(&AllAmountsWindowedAggregation::default(), &dept, &txns);
        assert_eq!(all.spent, 0);

        let window = AllAmountsWindowedAggregation {
            start: Some(date(1, 1)),
            end: Some(date(1, 2)),
        };
        assert_eq!(aggregator.aggregate(&window, &dept, &txns).spent, -500);

        let income_only = AllAmountsWindowedAggregation {
            start: Some(date(1, 3)),
            end: None,
        };
        assert_eq!(aggregator.aggregate(&income_only, &dept, &txns).spent, 500);
    }

    #[test]
    fn test_policies_disagree_on_same_data() {
        let (dept, txns) = department(1000, &[(-300, date(1, 1)), (500, date(1, 3))]);
        let aggregator = DepartmentAggregator::default();

        let live = aggregator.aggregate(&ExpenseOnlyAggregation, &dept, &txns);
        let report =
            aggregator.aggregate(&AllAmountsWindowedAggregation::default(), &dept, &txns);

        assert_eq!(live.spent, 300);
        assert_eq!(report.spent, 200);
    }

    #[test]
    fn test_remaining_never_negative_when_overspent() {
        let (dept, txns) = department(100, &[(-250, date(2, 1))]);
        let totals = DepartmentAggregator::default().aggregate(&ExpenseOnlyAggregation, &dept, &txns);

        assert_eq!(totals.spent, 250);
        assert_eq!(totals.remaining, 0);
        assert_eq!(totals.balance, -150);
        assert!(totals.is_overspent());
        assert_eq!(totals.utilization, 250.0);
    }

    #[test]
    fn test_zero_budget_has_zero_utilization() {
        let (dept, txns) = department(0, &[(-10, date(1, 1))]);
        let totals = DepartmentAggregator::default().aggregate(&ExpenseOnlyAggregation, &dept, &txns);
        assert_eq!(totals.utilization, 0.0);
        assert_eq!(totals.remaining, 0);
    }

    #[test]
    fn test_other_departments_ignored() {
        let (dept, mut txns) = department(100, &[(-10, date(1, 1))]);
        let (_, others) = department(100, &[(-90, date(1, 1))]);
        txns.extend(others);

        let totals = DepartmentAggregator::default().aggregate(&ExpenseOnlyAggregation, &dept, &txns);
        assert_eq!(totals.spent, 10);
    }

    #[test]
    fn test_overflowing_sum_degrades_to_zero() {
        let (dept, txns) = department(
            100,
            &[(-MAX_SAFE_INTEGER, date(1, 1)), (-MAX_SAFE_INTEGER, date(1, 2))],
        );
        let totals = DepartmentAggregator::default().aggregate(&ExpenseOnlyAggregation, &dept, &txns);
        assert_eq!(totals.spent, 0);
        assert_eq!(totals.remaining, 100);
    }

    #[test]
    fn test_empty_portfolio_is_all_zero() {
        let totals = DepartmentAggregator::default().portfolio(&[]);
        assert_eq!(totals, PortfolioTotals::default());
        let json = serde_json::to_value(totals).unwrap();
        assert_eq!(json["totalBudget"], 0);
        assert_eq!(json["totalSpent"], 0);
        assert_eq!(json["totalRemaining"], 0);
    }

    #[test]
    fn test_portfolio_sums_clamped_remaining() {
        let aggregator = DepartmentAggregator::default();
        let (a, a_txns) = department(100, &[(-150, date(1, 1))]);
        let (b, b_txns) = department(200, &[(-50, date(1, 1))]);

        let rows = [
            aggregator.aggregate(&ExpenseOnlyAggregation, &a, &a_txns),
            aggregator.aggregate(&ExpenseOnlyAggregation, &b, &b_txns),
        ];
        let totals = aggregator.portfolio(&rows);

        assert_eq!(totals.total_budget, 300);
        assert_eq!(totals.total_spent, 200);
        assert_eq!(totals.total_remaining, 150);
        assert_eq!(totals.utilization, 66.67);
    }

    proptest! {
        #[test]
        fn remaining_is_never_negative(
            budget in 0..=MAX_SAFE_INTEGER,
            amounts in prop::collection::vec(-1_000_000_000i64..=1_000_000_000, 0..20),
        ) {
            let dated: Vec<(i64, NaiveDate)> =
                amounts.iter().map(|a| (*a, date(1, 1))).collect();
            let (dept, txns) = department(budget, &dated);
            let aggregator = DepartmentAggregator::default();

            let live = aggregator.aggregate(&ExpenseOnlyAggregation, &dept, &txns);
            let expected_spent: i64 = amounts.iter().filter(|a| **a < 0).map(|a| -a).sum();
            prop_assert!(live.remaining >= 0);
            prop_assert_eq!(live.spent, expected_spent);
            prop_assert_eq!(live.balance, budget - expected_spent);
            prop_assert_eq!(live.remaining, (budget - expected_spent).max(0));

            let windowed =
                aggregator.aggregate(&AllAmountsWindowedAggregation::default(), &dept, &txns);
            prop_assert!(windowed.remaining >= 0);
            prop_assert_eq!(windowed.remaining, windowed.balance.max(0));
        }
    }
}
