//! Department service
//!
//! Validation, uniqueness, cascading delete and the live spending views.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::audit::{AuditEntry, EntityType};
use crate::error::{BudgetError, BudgetResult};
use crate::models::{Department, DepartmentId, Transaction};
use crate::normalize::NumericNormalizer;
use crate::storage::Storage;

use super::aggregation::{
    DepartmentAggregator, DepartmentTotals, ExpenseOnlyAggregation, PortfolioTotals,
};

/// Untyped create/update request
///
/// `name` and `budget` stay as raw JSON so that wrong types surface as
/// validation errors rather than parse failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DepartmentInput {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub budget: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub manager: Option<String>,
}

impl DepartmentInput {
    pub fn new(name: &str, budget: &str) -> Self {
        Self {
            name: Some(Value::String(name.to_string())),
            budget: Some(Value::String(budget.to_string())),
            ..Self::default()
        }
    }
}

/// A department with its live spending figures
#[derive(Debug, Clone, Serialize)]
pub struct DepartmentView {
    #[serde(flatten)]
    pub department: Department,
    pub spent: i64,
    pub remaining: i64,
    pub balance: i64,
    pub utilization: f64,
}

impl DepartmentView {
    fn new(department: Department, totals: DepartmentTotals) -> Self {
        Self {
            department,
            spent: totals.spent,
            remaining: totals.remaining,
            balance: totals.balance,
            utilization: totals.utilization,
        }
    }

    pub fn totals(&self) -> DepartmentTotals {
        DepartmentTotals {
            budget: self.department.budget,
            spent: self.spent,
            remaining: self.remaining,
            balance: self.balance,
            utilization: self.utilization,
        }
    }
}

/// Result of a cascading delete
#[derive(Debug, Clone)]
pub struct DepartmentRemoval {
    pub department: Department,
    pub transactions: Vec<Transaction>,
}

pub struct DepartmentService<'a> {
    storage: &'a Storage,
    normalizer: NumericNormalizer,
    aggregator: DepartmentAggregator,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl<'a> DepartmentService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self::with_normalizer(storage, NumericNormalizer::new())
    }

    pub fn with_normalizer(storage: &'a Storage, normalizer: NumericNormalizer) -> Self {
        Self {
            storage,
            aggregator: DepartmentAggregator::new(normalizer.clone()),
            normalizer,
        }
    }

    fn validated(&self, input: &DepartmentInput) -> BudgetResult<(String, i64)> {
        let name = match &input.name {
            Some(Value::String(name)) if !name.trim().is_empty() => name.clone(),
            _ => {
                return Err(BudgetError::Validation(
                    "Department name must be a non-empty string".into(),
                ))
            }
        };

        let budget = self
            .normalizer
            .positive(input.budget.as_ref())
            .ok_or_else(|| BudgetError::Validation("Budget must be a positive number".into()))?;

        Ok((name, budget))
    }

    /// Create a department
    pub fn create(&self, input: DepartmentInput) -> BudgetResult<Department> {
        let (name, budget) = self.validated(&input)?;

        let mut department = Department::new(&name, budget);
        department.description = non_blank(input.description);
        department.manager = non_blank(input.manager);
        department
            .validate()
            .map_err(|e| BudgetError::Validation(e.to_string()))?;

        self.storage.atomic(|s| {
            if s.departments.name_taken(&department.name, None)? {
                return Err(BudgetError::Duplicate {
                    entity_type: "Department",
                    identifier: department.name.clone(),
                });
            }
            s.departments.upsert(department.clone())
        })?;

        self.storage.record_audit(&[AuditEntry::create(
            EntityType::Department,
            department.id,
            Some(department.name.clone()),
            &department,
        )]);
        info!(department = %department.name, budget = department.budget, "created department");

        Ok(department)
    }

    /// Replace name and budget; description and manager change only when given
    pub fn update(&self, id: DepartmentId, input: DepartmentInput) -> BudgetResult<Department> {
        let (name, budget) = self.validated(&input)?;

        let (before, after) = self.storage.atomic(|s| {
            let before = s
                .departments
                .get(id)?
                .ok_or_else(|| BudgetError::department_not_found(id.to_string()))?;

            if s.departments.name_taken(&name, Some(id))? {
                return Err(BudgetError::Duplicate {
                    entity_type: "Department",
                    identifier: Department::canonical_name(&name),
                });
            }

            let mut department = before.clone();
            department.rename(&name);
            department.budget = budget;
            if input.description.is_some() {
                department.description = non_blank(input.description.clone());
            }
            if input.manager.is_some() {
                department.manager = non_blank(input.manager.clone());
            }
            department
                .validate()
                .map_err(|e| BudgetError::Validation(e.to_string()))?;

            s.departments.upsert(department.clone())?;
            Ok((before, department))
        })?;

        self.storage.record_audit(&[AuditEntry::update(
            EntityType::Department,
            id,
            Some(after.name.clone()),
            &before,
            &after,
        )]);
        info!(department = %after.name, "updated department");

        Ok(after)
    }

    /// Delete a department together with all of its transactions
    pub fn delete(&self, id: DepartmentId) -> BudgetResult<DepartmentRemoval> {
        let removal = self.storage.atomic(|s| {
            let department = s
                .departments
                .delete(id)?
                .ok_or_else(|| BudgetError::department_not_found(id.to_string()))?;
            let transactions = s.transactions.delete_by_department(id)?;
            Ok(DepartmentRemoval {
                department,
                transactions,
            })
        })?;

        let mut entries: Vec<AuditEntry> = removal
            .transactions
            .iter()
            .map(|t| AuditEntry::delete(EntityType::Transaction, t.id, None, t))
            .collect();
        entries.push(AuditEntry::delete(
            EntityType::Department,
            id,
            Some(removal.department.name.clone()),
            &removal.department,
        ));
        self.storage.record_audit(&entries);

        info!(
            department = %removal.department.name,
            transactions = removal.transactions.len(),
            "deleted department"
        );
        Ok(removal)
    }

    pub fn get(&self, id: DepartmentId) -> BudgetResult<Department> {
        self.storage
            .departments
            .get(id)?
            .ok_or_else(|| BudgetError::department_not_found(id.to_string()))
    }

    /// Find by name (case-insensitive) or by id
    pub fn find(&self, identifier: &str) -> BudgetResult<Option<Department>> {
        if let Some(department) = self.storage.departments.get_by_name(identifier)? {
            return Ok(Some(department));
        }
        match identifier.parse::<DepartmentId>() {
            Ok(id) => self.storage.departments.get(id),
            Err(_) => Ok(None),
        }
    }

    /// Like [`find`](Self::find) but missing is an error
    pub fn resolve(&self, identifier: &str) -> BudgetResult<Department> {
        self.find(identifier)?
            .ok_or_else(|| BudgetError::department_not_found(identifier))
    }

    /// One department with live figures
    pub fn view(&self, id: DepartmentId) -> BudgetResult<DepartmentView> {
        self.storage.consistent_read(|s| {
            let department = s
                .departments
                .get(id)?
                .ok_or_else(|| BudgetError::department_not_found(id.to_string()))?;
            let transactions = s.transactions.get_by_department(id)?;
            let totals =
                self.aggregator
                    .aggregate(&ExpenseOnlyAggregation, &department, &transactions);
            Ok(DepartmentView::new(department, totals))
        })
    }

    /// Every department with live figures, ordered by name
    pub fn list(&self) -> BudgetResult<Vec<DepartmentView>> {
        Ok(self.overview()?.0)
    }

    /// Every department with live figures plus portfolio totals
    pub fn overview(&self) -> BudgetResult<(Vec<DepartmentView>, PortfolioTotals)> {
        let (departments, mut groups) = self.storage.consistent_read(|s| {
            Ok((s.departments.get_all()?, s.transactions.group_by_department()?))
        })?;

        let views: Vec<DepartmentView> = departments
            .into_iter()
            .map(|department| {
                let transactions = groups.remove(&department.id).unwrap_or_default();
                let totals =
                    self.aggregator
                        .aggregate(&ExpenseOnlyAggregation, &department, &transactions);
                DepartmentView::new(department, totals)
            })
            .collect();

        let rows: Vec<DepartmentTotals> = views.iter().map(DepartmentView::totals).collect();
        let portfolio = self.aggregator.portfolio(&rows);
        Ok((views, portfolio))
    }

    /// Department names keyed by id, for labelling transactions
    pub fn names(&self) -> BudgetResult<HashMap<DepartmentId, String>> {
        Ok(self
            .storage
            .departments
            .get_all()?
            .into_iter()
            .map(|d| (d.id, d.name))
            .collect())
    }
}
