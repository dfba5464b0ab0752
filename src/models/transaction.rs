//! Transaction model
//!
//! A signed movement of money against one department. Positive amounts are
//! income, negative amounts are expenses.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{DepartmentId, TransactionId};

/// Direction of a transaction as entered by a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money leaving the department
    #[default]
    Expense,
    /// Money entering the department
    Income,
}

impl TransactionKind {
    /// Turn a positive magnitude into a signed amount
    pub fn signed(self, magnitude: i64) -> i64 {
        match self {
            Self::Expense => -magnitude.abs(),
            Self::Income => magnitude.abs(),
        }
    }

    /// Kind implied by a stored signed amount
    pub fn of(amount: i64) -> Self {
        if amount > 0 {
            Self::Income
        } else {
            Self::Expense
        }
    }

    /// Parse a kind from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "expense" | "outflow" | "debit" => Some(Self::Expense),
            "income" | "inflow" | "credit" => Some(Self::Income),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expense => write!(f, "expense"),
            Self::Income => write!(f, "income"),
        }
    }
}

/// A transaction against a department budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,

    /// Owning department
    pub department_id: DepartmentId,

    /// Signed amount in whole currency units
    pub amount: i64,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Optional spending category
    #[serde(default)]
    pub category: Option<String>,

    /// Date the transaction took effect
    pub date: NaiveDate,

    /// When the transaction was created
    pub created_at: DateTime<Utc>,

    /// When the transaction was last modified
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a new transaction
    pub fn new(department_id: DepartmentId, amount: i64, date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            department_id,
            amount,
            description: String::new(),
            category: None,
            date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a transaction with description and category
    pub fn with_details(
        department_id: DepartmentId,
        amount: i64,
        date: NaiveDate,
        description: impl Into<String>,
        category: Option<String>,
    ) -> Self {
        let mut txn = Self::new(department_id, amount, date);
        txn.description = description.into();
        txn.category = category;
        txn
    }

    /// Income or expense
    pub fn kind(&self) -> TransactionKind {
        TransactionKind::of(self.amount)
    }

    /// Check if this is an expense
    pub fn is_expense(&self) -> bool {
        self.amount < 0
    }

    /// Amount this transaction has added to its department's budget
    pub fn income_contribution(&self) -> i64 {
        self.amount.max(0)
    }

    /// Whether the date falls within an inclusive window; open bounds match
    pub fn within(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
        start.map_or(true, |s| self.date >= s) && end.map_or(true, |e| self.date <= e)
    }

    /// Exact category comparison
    pub fn in_category(&self, category: &str) -> bool {
        self.category.as_deref() == Some(category)
    }

    /// Validate the transaction
    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if self.amount == 0 {
            return Err(TransactionValidationError::ZeroAmount);
        }

        if self.description.len() > 500 {
            return Err(TransactionValidationError::DescriptionTooLong(
                self.description.len(),
            ));
        }

        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.date, self.amount, self.description)
    }
}

/// Validation errors for transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    ZeroAmount,
    DescriptionTooLong(usize),
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroAmount => write!(f, "Transaction amount cannot be zero"),
            Self::DescriptionTooLong(len) => {
                write!(f, "Description too long ({} chars, max 500)", len)
            }
        }
    }
}

impl std::error::Error for TransactionValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_kind_signing() {
        assert_eq!(TransactionKind::Expense.signed(50), -50);
        assert_eq!(TransactionKind::Income.signed(50), 50);
        assert_eq!(TransactionKind::of(-1), TransactionKind::Expense);
        assert_eq!(TransactionKind::of(1), TransactionKind::Income);
        assert_eq!(TransactionKind::parse("INCOME"), Some(TransactionKind::Income));
        assert_eq!(TransactionKind::parse("gift"), None);
    }

    #[test]
    fn test_income_contribution() {
        let dept = DepartmentId::new();
        assert_eq!(Transaction::new(dept, 300, date(2024, 1, 1)).income_contribution(), 300);
        assert_eq!(Transaction::new(dept, -300, date(2024, 1, 1)).income_contribution(), 0);
    }

    #[test]
    fn test_within_window() {
        let txn = Transaction::new(DepartmentId::new(), -10, date(2024, 3, 15));
        assert!(txn.within(None, None));
        assert!(txn.within(Some(date(2024, 3, 15)), Some(date(2024, 3, 15))));
        assert!(!txn.within(Some(date(2024, 3, 16)), None));
        assert!(!txn.within(None, Some(date(2024, 3, 14))));
    }

    #[test]
    fn test_category_match_is_exact() {
        let txn = Transaction::with_details(
            DepartmentId::new(),
            -50,
            date(2024, 1, 1),
            "Flight",
            Some("Travel".into()),
        );
        assert!(txn.in_category("Travel"));
        assert!(!txn.in_category("travel"));
    }

    #[test]
    fn test_validation() {
        let mut txn = Transaction::new(DepartmentId::new(), 0, date(2024, 1, 1));
        assert_eq!(txn.validate(), Err(TransactionValidationError::ZeroAmount));

        txn.amount = -5;
        assert!(txn.validate().is_ok());

        txn.description = "x".repeat(501);
        assert!(matches!(
            txn.validate(),
            Err(TransactionValidationError::DescriptionTooLong(501))
        ));
    }
}
