//! Department model
//!
//! A department owns a budget and a set of transactions. Spending is never
//! stored on the department; it is derived from transactions on every read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::DepartmentId;

/// Maximum department name length
pub const MAX_NAME_LEN: usize = 100;

/// A budget-holding department
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    /// Unique identifier
    pub id: DepartmentId,

    /// Department name, always stored uppercased
    pub name: String,

    /// Allocated budget in whole currency units
    pub budget: i64,

    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,

    /// Responsible manager
    #[serde(default)]
    pub manager: Option<String>,

    /// When the department was created
    pub created_at: DateTime<Utc>,

    /// When the department was last modified
    pub updated_at: DateTime<Utc>,
}

impl Department {
    /// Create a new department; the name is canonicalized
    pub fn new(name: &str, budget: i64) -> Self {
        let now = Utc::now();
        Self {
            id: DepartmentId::new(),
            name: Self::canonical_name(name),
            budget,
            description: None,
            manager: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Trimmed, uppercased form used for storage and uniqueness checks
    pub fn canonical_name(name: &str) -> String {
        name.trim().to_uppercase()
    }

    /// Rename the department
    pub fn rename(&mut self, name: &str) {
        self.name = Self::canonical_name(name);
        self.updated_at = Utc::now();
    }

    /// Add income to the budget
    pub fn credit_income(&mut self, amount: i64) {
        self.budget = self.budget.saturating_add(amount);
        self.updated_at = Utc::now();
    }

    /// Take back income previously credited; the budget floors at zero
    pub fn reverse_income(&mut self, amount: i64) {
        self.budget = self.budget.saturating_sub(amount).max(0);
        self.updated_at = Utc::now();
    }

    /// Validate the stored invariants
    pub fn validate(&self) -> Result<(), DepartmentValidationError> {
        if self.name.trim().is_empty() {
            return Err(DepartmentValidationError::EmptyName);
        }

        if self.name.len() > MAX_NAME_LEN {
            return Err(DepartmentValidationError::NameTooLong(self.name.len()));
        }

        if self.budget < 0 {
            return Err(DepartmentValidationError::NegativeBudget(self.budget));
        }

        Ok(())
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validation errors for departments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepartmentValidationError {
    EmptyName,
    NameTooLong(usize),
    NegativeBudget(i64),
}

impl fmt::Display for DepartmentValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Department name cannot be empty"),
            Self::NameTooLong(len) => write!(
                f,
                "Department name too long ({} chars, max {})",
                len, MAX_NAME_LEN
            ),
            Self::NegativeBudget(budget) => {
                write!(f, "Department budget cannot be negative ({})", budget)
            }
        }
    }
}

impl std::error::Error for DepartmentValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uppercases_name() {
        let dept = Department::new("  finance ", 1000);
        assert_eq!(dept.name, "FINANCE");
        assert_eq!(dept.budget, 1000);
        assert!(dept.description.is_none());
    }

    #[test]
    fn test_income_credit_and_reversal() {
        let mut dept = Department::new("IT", 100);
        dept.credit_income(50);
        assert_eq!(dept.budget, 150);

        dept.reverse_income(400);
        assert_eq!(dept.budget, 0);
    }

    #[test]
    fn test_validation() {
        let mut dept = Department::new("HR", 10);
        assert!(dept.validate().is_ok());

        dept.name = "   ".into();
        assert_eq!(dept.validate(), Err(DepartmentValidationError::EmptyName));

        dept.name = "A".repeat(101);
        assert!(matches!(
            dept.validate(),
            Err(DepartmentValidationError::NameTooLong(101))
        ));

        dept.name = "HR".into();
        dept.budget = -1;
        assert_eq!(
            dept.validate(),
            Err(DepartmentValidationError::NegativeBudget(-1))
        );
    }

    #[test]
    fn test_optional_fields_default_on_load() {
        let dept = Department::new("OPS", 5);
        let mut value = serde_json::to_value(&dept).unwrap();
        value.as_object_mut().unwrap().remove("description");
        value.as_object_mut().unwrap().remove("manager");

        let loaded: Department = serde_json::from_value(value).unwrap();
        assert_eq!(loaded, dept);
    }
}
