//! Portfolio analytics and textual insights

use serde::Serialize;

use crate::error::BudgetResult;
use crate::models::{format_amount, format_percent};
use crate::storage::Storage;

use super::aggregation::PortfolioTotals;
use super::department::{DepartmentService, DepartmentView};

/// The department with the largest spending
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopSpender {
    pub name: String,
    pub spent: i64,
}

/// Everything the analytics view shows
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    #[serde(flatten)]
    pub totals: PortfolioTotals,
    pub department_count: usize,
    pub departments: Vec<DepartmentView>,
    pub highest_spending: Option<TopSpender>,
    /// Names of departments whose spending exceeds their budget
    pub overspent: Vec<String>,
    pub insights: Vec<String>,
}

pub struct AnalyticsService<'a> {
    storage: &'a Storage,
    currency: String,
}

impl<'a> AnalyticsService<'a> {
    pub fn new(storage: &'a Storage, currency: impl Into<String>) -> Self {
        Self {
            storage,
            currency: currency.into(),
        }
    }

    pub fn summary(&self) -> BudgetResult<AnalyticsSummary> {
        let (departments, totals) = DepartmentService::new(self.storage).overview()?;

        // First of equal spenders wins, in name order.
        let highest_spending = departments
            .iter()
            .filter(|d| d.spent > 0)
            .fold(None::<&DepartmentView>, |best, d| match best {
                Some(b) if b.spent >= d.spent => Some(b),
                _ => Some(d),
            })
            .map(|d| TopSpender {
                name: d.department.name.clone(),
                spent: d.spent,
            });

        let overspent: Vec<String> = departments
            .iter()
            .filter(|d| d.balance < 0)
            .map(|d| d.department.name.clone())
            .collect();

        let mut summary = AnalyticsSummary {
            totals,
            department_count: departments.len(),
            departments,
            highest_spending,
            overspent,
            insights: Vec::new(),
        };
        summary.insights = self.insights(&summary);
        Ok(summary)
    }

    fn insights(&self, summary: &AnalyticsSummary) -> Vec<String> {
        let symbol = self.currency.as_str();
        let mut insights = vec![
            format!(
                "Overall budget utilization is {}",
                format_percent(summary.totals.utilization)
            ),
            format!(
                "Total budget of {} across {} departments",
                format_amount(summary.totals.total_budget, symbol),
                summary.department_count
            ),
            format!(
                "Total spent: {}",
                format_amount(summary.totals.total_spent, symbol)
            ),
        ];

        if let Some(top) = &summary.highest_spending {
            insights.push(format!(
                "Highest spending department: {} ({})",
                top.name,
                format_amount(top.spent, symbol)
            ));
        }

        for view in summary.departments.iter().filter(|d| d.balance < 0) {
            insights.push(format!(
                "{} is over budget by {}",
                view.department.name,
                format_amount(-view.balance, symbol)
            ));
        }

        insights
    }
}
