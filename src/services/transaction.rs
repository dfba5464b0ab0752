//! Transaction service
//!
//! Every mutation runs inside one atomic unit together with its effect on the
//! owning department: income adds to the department budget, and updating or
//! deleting an income transaction takes that contribution back first.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::audit::{AuditEntry, EntityType};
use crate::error::{BudgetError, BudgetResult};
use crate::models::{DepartmentId, Transaction, TransactionId, TransactionKind};
use crate::normalize::{NumericNormalizer, MAX_SAFE_INTEGER};
use crate::storage::Storage;

/// Largest page a caller may request
pub const MAX_PAGE_SIZE: usize = 100;

/// Untyped create/update request
///
/// `amount` is a positive magnitude; the stored sign comes from `kind`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionInput {
    #[serde(default)]
    pub department_id: Option<String>,
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// Listing options
#[derive(Debug, Clone, Default)]
pub struct TransactionQuery {
    /// 1-based page number
    pub page: usize,
    pub limit: usize,
    /// Department id or name
    pub department: Option<String>,
}

/// A transaction labelled with its department's name
#[derive(Debug, Clone, Serialize)]
pub struct TransactionView {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub department_name: String,
}

/// One page of a listing
#[derive(Debug, Clone, Serialize)]
pub struct TransactionPage {
    pub data: Vec<TransactionView>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp
pub fn parse_date(raw: &str) -> BudgetResult<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| BudgetError::Validation(format!("Invalid date: {:?}", raw)))
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub struct TransactionService<'a> {
    storage: &'a Storage,
    normalizer: NumericNormalizer,
}

impl<'a> TransactionService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self::with_normalizer(storage, NumericNormalizer::new())
    }

    pub fn with_normalizer(storage: &'a Storage, normalizer: NumericNormalizer) -> Self {
        Self {
            storage,
            normalizer,
        }
    }

    fn parse_department(raw: Option<&String>) -> BudgetResult<Option<DepartmentId>> {
        match raw.map(|s| s.trim()).filter(|s| !s.is_empty()) {
            None => Ok(None),
            Some(s) => s.parse().map(Some).map_err(|_| {
                BudgetError::Validation(format!("Invalid department_id: {:?}", s))
            }),
        }
    }

    fn parse_kind(raw: Option<&String>) -> BudgetResult<Option<TransactionKind>> {
        match raw {
            None => Ok(None),
            Some(s) => TransactionKind::parse(s).map(Some).ok_or_else(|| {
                BudgetError::Validation(format!(
                    "Invalid kind {:?}; expected \"expense\" or \"income\"",
                    s
                ))
            }),
        }
    }

    fn parse_amount(&self, raw: Option<&Value>) -> BudgetResult<i64> {
        self.normalizer
            .positive(raw)
            .ok_or_else(|| BudgetError::Validation("Amount must be a positive number".into()))
    }

    /// Take back what `txn` added to its department's budget
    fn reverse_contribution(storage: &Storage, txn: &Transaction) -> BudgetResult<()> {
        let contribution = txn.income_contribution();
        if contribution == 0 {
            return Ok(());
        }
        if let Some(mut department) = storage.departments.get(txn.department_id)? {
            department.reverse_income(contribution);
            storage.departments.upsert(department)?;
        }
        Ok(())
    }

    /// Add what `txn` contributes to its department's budget
    fn apply_contribution(storage: &Storage, txn: &Transaction) -> BudgetResult<String> {
        let mut department = storage
            .departments
            .get(txn.department_id)?
            .ok_or_else(|| BudgetError::department_not_found(txn.department_id.to_string()))?;

        let contribution = txn.income_contribution();
        if contribution > 0 {
            let within_range = department
                .budget
                .checked_add(contribution)
                .is_some_and(|total| total <= MAX_SAFE_INTEGER);
            if !within_range {
                return Err(BudgetError::Validation(format!(
                    "Income of {} would push the budget of {} beyond the safe integer range",
                    contribution, department.name
                )));
            }
            department.credit_income(contribution);
            storage.departments.upsert(department.clone())?;
        }
        Ok(department.name)
    }

    /// Record a new transaction
    pub fn create(&self, input: TransactionInput) -> BudgetResult<TransactionView> {
        let department_id = Self::parse_department(input.department_id.as_ref())?
            .ok_or_else(|| BudgetError::Validation("department_id is required".into()))?;
        let magnitude = self.parse_amount(input.amount.as_ref())?;
        let kind = Self::parse_kind(input.kind.as_ref())?.unwrap_or_default();
        let date = match input.date.as_deref() {
            Some(raw) if !raw.trim().is_empty() => parse_date(raw)?,
            _ => Utc::now().date_naive(),
        };

        let txn = Transaction::with_details(
            department_id,
            kind.signed(magnitude),
            date,
            input.description.as_deref().unwrap_or("").trim(),
            non_blank(input.category.as_ref()),
        );
        txn.validate()
            .map_err(|e| BudgetError::Validation(e.to_string()))?;

        let department_name = self.storage.atomic(|s| {
            let name = Self::apply_contribution(s, &txn)?;
            s.transactions.upsert(txn.clone())?;
            Ok(name)
        })?;

        self.storage.record_audit(&[AuditEntry::create(
            EntityType::Transaction,
            txn.id,
            Some(txn.description.clone()),
            &txn,
        )]);
        info!(
            transaction = %txn.id,
            department = %department_name,
            amount = txn.amount,
            "created transaction"
        );

        Ok(TransactionView {
            transaction: txn,
            department_name,
        })
    }

    /// Change a transaction; omitted fields keep their current value
    pub fn update(&self, id: TransactionId, input: TransactionInput) -> BudgetResult<TransactionView> {
        let department_id = Self::parse_department(input.department_id.as_ref())?;
        let magnitude = match &input.amount {
            None | Some(Value::Null) => None,
            Some(raw) => Some(self.parse_amount(Some(raw))?),
        };
        let kind = Self::parse_kind(input.kind.as_ref())?;
        let date = match input.date.as_deref() {
            Some(raw) if !raw.trim().is_empty() => Some(parse_date(raw)?),
            _ => None,
        };

        let (before, after, department_name) = self.storage.atomic(|s| {
            let before = s
                .transactions
                .get(id)?
                .ok_or_else(|| BudgetError::transaction_not_found(id.to_string()))?;

            let mut after = before.clone();
            if let Some(department_id) = department_id {
                after.department_id = department_id;
            }
            let kind = kind.unwrap_or_else(|| before.kind());
            after.amount = kind.signed(magnitude.unwrap_or(before.amount.abs()));
            if let Some(date) = date {
                after.date = date;
            }
            if let Some(description) = &input.description {
                after.description = description.trim().to_string();
            }
            if input.category.is_some() {
                after.category = non_blank(input.category.as_ref());
            }
            after.updated_at = Utc::now();
            after
                .validate()
                .map_err(|e| BudgetError::Validation(e.to_string()))?;

            Self::reverse_contribution(s, &before)?;
            let name = Self::apply_contribution(s, &after)?;
            s.transactions.upsert(after.clone())?;
            Ok((before, after, name))
        })?;

        self.storage.record_audit(&[AuditEntry::update(
            EntityType::Transaction,
            id,
            Some(after.description.clone()),
            &before,
            &after,
        )]);
        info!(transaction = %id, amount = after.amount, "updated transaction");

        Ok(TransactionView {
            transaction: after,
            department_name,
        })
    }

    /// Remove a transaction, reversing any income it contributed
    pub fn delete(&self, id: TransactionId) -> BudgetResult<Transaction> {
        let txn = self.storage.atomic(|s| {
            let txn = s
                .transactions
                .delete(id)?
                .ok_or_else(|| BudgetError::transaction_not_found(id.to_string()))?;
            Self::reverse_contribution(s, &txn)?;
            Ok(txn)
        })?;

        self.storage.record_audit(&[AuditEntry::delete(
            EntityType::Transaction,
            id,
            Some(txn.description.clone()),
            &txn,
        )]);
        info!(transaction = %id, "deleted transaction");

        Ok(txn)
    }

    pub fn get(&self, id: TransactionId) -> BudgetResult<Transaction> {
        self.storage
            .transactions
            .get(id)?
            .ok_or_else(|| BudgetError::transaction_not_found(id.to_string()))
    }

    /// A page of transactions, newest first, labelled with department names
    ///
    /// An unknown department filter yields an empty page.
    pub fn list(&self, query: &TransactionQuery) -> BudgetResult<TransactionPage> {
        let page = query.page.max(1);
        let limit = query.limit.clamp(1, MAX_PAGE_SIZE);

        let (transactions, names) = self.storage.consistent_read(|s| {
            let names: HashMap<DepartmentId, String> = s
                .departments
                .get_all()?
                .into_iter()
                .map(|d| (d.id, d.name))
                .collect();

            let transactions = match query.department.as_deref() {
                None => s.transactions.get_all()?,
                Some(filter) => {
                    let by_name = s.departments.get_by_name(filter)?.map(|d| d.id);
                    match by_name.or_else(|| filter.parse::<DepartmentId>().ok()) {
                        Some(id) => s.transactions.get_by_department(id)?,
                        None => Vec::new(),
                    }
                }
            };
            Ok((transactions, names))
        })?;

        let total = transactions.len();
        let data = transactions
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .map(|transaction| TransactionView {
                department_name: names
                    .get(&transaction.department_id)
                    .cloned()
                    .unwrap_or_default(),
                transaction,
            })
            .collect();

        Ok(TransactionPage {
            data,
            total,
            page,
            limit,
        })
    }
}
