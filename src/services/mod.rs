//! Service layer for GlobalBudget
//!
//! Business rules on top of storage: validation, cross-entity side effects
//! inside atomic units, and the derived spending figures.

pub mod aggregation;
pub mod analytics;
pub mod department;
pub mod transaction;

pub use aggregation::{
    AllAmountsWindowedAggregation, DepartmentAggregator, DepartmentTotals, ExpenseOnlyAggregation,
    PortfolioTotals, SpentPolicy,
};
pub use analytics::{AnalyticsService, AnalyticsSummary};
pub use department::{DepartmentInput, DepartmentService, DepartmentView};
pub use transaction::{TransactionInput, TransactionPage, TransactionQuery, TransactionService};
