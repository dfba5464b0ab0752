//! Core data models for GlobalBudget
//!
//! Departments, their transactions, and generated reports.

pub mod amount;
pub mod department;
pub mod ids;
pub mod report;
pub mod transaction;

pub use amount::{format_amount, format_percent};
pub use department::{Department, DepartmentValidationError};
pub use ids::{DepartmentId, ReportId, TransactionId};
pub use report::{
    DepartmentSpendingData, DepartmentSpendingParams, DepartmentSpendingRow, ReportData,
    ReportKind, ReportParameters, ReportPeriod, StoredReport, TransactionHistoryData,
    TransactionHistoryParams, TransactionHistoryRow,
};
pub use transaction::{Transaction, TransactionKind, TransactionValidationError};
