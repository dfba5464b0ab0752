//! Storage layer for GlobalBudget
//!
//! JSON files under `<base>/data/`, loaded into memory at open and written
//! back atomically. [`Storage`] is the single handle shared by services, the
//! HTTP server and the CLI.
//!
//! Writes touching both departments and transactions go through
//! [`Storage::atomic`]; reads that combine them go through
//! [`Storage::consistent_read`]. The two must not be nested.

pub mod departments;
pub mod file_io;
pub mod init;
pub mod reports;
pub mod transactions;

pub use departments::DepartmentRepository;
pub use file_io::{read_json, write_json_atomic};
pub use init::{initialize_storage, seed_sample_data};
pub use reports::{ReportRepository, ReportStore};
pub use transactions::TransactionRepository;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, error, warn};

use crate::audit::{AuditEntry, AuditLogger};
use crate::config::paths::BudgetPaths;
use crate::error::{BudgetError, BudgetResult};

pub(crate) fn read_guard<T>(lock: &RwLock<T>) -> BudgetResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|e| BudgetError::Storage(format!("Failed to acquire read lock: {}", e)))
}

pub(crate) fn write_guard<T>(lock: &RwLock<T>) -> BudgetResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|e| BudgetError::Storage(format!("Failed to acquire write lock: {}", e)))
}

/// Handle to all persisted data
pub struct Storage {
    paths: BudgetPaths,
    gate: RwLock<()>,
    pub departments: DepartmentRepository,
    pub transactions: TransactionRepository,
    pub reports: ReportRepository,
    pub audit: AuditLogger,
}

impl Storage {
    /// Open storage rooted at `paths`, creating directories and loading files
    pub fn open(paths: BudgetPaths) -> BudgetResult<Self> {
        paths.ensure_directories()?;

        let storage = Self {
            departments: DepartmentRepository::new(paths.departments_file()),
            transactions: TransactionRepository::new(paths.transactions_file()),
            reports: ReportRepository::new(paths.reports_file()),
            audit: AuditLogger::new(paths.audit_log()),
            gate: RwLock::new(()),
            paths,
        };

        storage.departments.load()?;
        storage.transactions.load()?;
        storage.reports.load()?;

        debug!(
            base = %storage.paths.base_dir().display(),
            departments = storage.departments.count()?,
            transactions = storage.transactions.count()?,
            reports = storage.reports.count()?,
            "storage opened"
        );

        Ok(storage)
    }

    pub fn paths(&self) -> &BudgetPaths {
        &self.paths
    }

    /// Flush everything to disk; waits for any in-flight atomic unit
    pub fn close(&self) -> BudgetResult<()> {
        let _gate = write_guard(&self.gate)?;
        self.departments.save()?;
        self.transactions.save()?;
        self.reports.flush()?;
        debug!("storage flushed");
        Ok(())
    }

    /// Run `f` as one all-or-nothing unit over departments and transactions
    ///
    /// One unit runs at a time. Both files are written when `f` succeeds; on
    /// any error the in-memory state is rolled back to where it was before
    /// `f` ran and the files are rewritten to match.
    pub fn atomic<T, F>(&self, f: F) -> BudgetResult<T>
    where
        F: FnOnce(&Self) -> BudgetResult<T>,
    {
        let _gate = write_guard(&self.gate)?;

        let departments = self.departments.snapshot()?;
        let transactions = self.transactions.snapshot()?;

        let result = f(self).and_then(|value| {
            self.departments.save()?;
            self.transactions.save()?;
            Ok(value)
        });

        if let Err(err) = &result {
            warn!(error = %err, "atomic unit failed, rolling back");
            self.roll_back(departments, transactions);
        }

        result
    }

    fn roll_back(
        &self,
        departments: departments::Snapshot,
        transactions: transactions::Snapshot,
    ) {
        let restored = self
            .departments
            .restore(departments)
            .and_then(|()| self.transactions.restore(transactions));
        if let Err(e) = restored {
            error!(error = %e, "failed to restore in-memory state");
            return;
        }

        // A failed save may have left one file ahead of the other.
        if let Err(e) = self.departments.save().and_then(|()| self.transactions.save()) {
            error!(error = %e, "failed to rewrite data files after rollback");
        }
    }

    /// Run `f` with no atomic unit in progress
    pub fn consistent_read<T, F>(&self, f: F) -> BudgetResult<T>
    where
        F: FnOnce(&Self) -> BudgetResult<T>,
    {
        let _gate = read_guard(&self.gate)?;
        f(self)
    }

    /// Append audit entries for a committed change
    ///
    /// The change is already durable at this point, so a failed append is
    /// logged rather than surfaced to the caller.
    pub fn record_audit(&self, entries: &[AuditEntry]) {
        if let Err(e) = self.audit.log_batch(entries) {
            error!(error = %e, entries = entries.len(), "failed to append audit log");
        }
    }

    /// Whether `init` has been run against this data directory
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Department, Transaction};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn open() -> (Storage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let paths = BudgetPaths::with_base_dir(temp_dir.path().to_path_buf());
        (Storage::open(paths).unwrap(), temp_dir)
    }

    #[test]
    fn test_open_creates_directories() {
        let (storage, temp_dir) = open();
        assert!(temp_dir.path().join("data").exists());
        assert!(!storage.is_initialized());
        assert_eq!(storage.departments.count().unwrap(), 0);
    }

    #[test]
    fn test_atomic_commit_persists_both_files() {
        let (storage, temp_dir) = open();
        let dept = Department::new("ops", 100);
        let txn = Transaction::new(dept.id, -10, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

        storage
            .atomic(|s| {
                s.departments.upsert(dept.clone())?;
                s.transactions.upsert(txn.clone())
            })
            .unwrap();

        let reopened =
            Storage::open(BudgetPaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();
        assert_eq!(reopened.departments.get(dept.id).unwrap(), Some(dept));
        assert_eq!(reopened.transactions.get(txn.id).unwrap(), Some(txn));
    }

    #[test]
    fn test_atomic_failure_rolls_back() {
        let (storage, temp_dir) = open();
        let dept = Department::new("ops", 100);
        storage
            .atomic(|s| s.departments.upsert(dept.clone()))
            .unwrap();

        let result: BudgetResult<()> = storage.atomic(|s| {
            s.departments.delete(dept.id)?;
            s.transactions.upsert(Transaction::new(
                dept.id,
                -1,
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            ))?;
            Err(BudgetError::Validation("boom".into()))
        });

        assert!(result.is_err());
        assert_eq!(storage.departments.get(dept.id).unwrap(), Some(dept.clone()));
        assert_eq!(storage.transactions.count().unwrap(), 0);

        let reopened =
            Storage::open(BudgetPaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();
        assert_eq!(reopened.departments.count().unwrap(), 1);
        assert_eq!(reopened.transactions.count().unwrap(), 0);
    }

    #[test]
    fn test_consistent_read_returns_value() {
        let (storage, _dir) = open();
        let count = storage
            .consistent_read(|s| s.departments.count())
            .unwrap();
        assert_eq!(count, 0);
    }
}
