//! Transaction repository
//!
//! Persists transactions to `transactions.json`, indexed by department.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::BudgetResult;
use crate::models::{DepartmentId, Transaction, TransactionId};

use super::file_io::{read_json, write_json_atomic};
use super::{read_guard, write_guard};

#[derive(Debug, Default, Serialize, Deserialize)]
struct TransactionData {
    transactions: Vec<Transaction>,
}

/// In-memory copy used to roll back an atomic unit
pub struct Snapshot(HashMap<TransactionId, Transaction>);

pub struct TransactionRepository {
    path: PathBuf,
    data: RwLock<HashMap<TransactionId, Transaction>>,
    /// Index: department_id -> transaction_ids
    by_department: RwLock<HashMap<DepartmentId, Vec<TransactionId>>>,
}

/// Newest first: date, then creation time, then id for a total order
fn newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then(b.created_at.cmp(&a.created_at))
            .then(a.id.cmp(&b.id))
    });
}

impl TransactionRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_department: RwLock::new(HashMap::new()),
        }
    }

    /// Load transactions from disk and rebuild the department index
    pub fn load(&self) -> BudgetResult<()> {
        let file_data: TransactionData = read_json(&self.path)?;
        let map = file_data
            .transactions
            .into_iter()
            .map(|t| (t.id, t))
            .collect();
        self.replace(map)
    }

    pub fn save(&self) -> BudgetResult<()> {
        let transactions = self.get_all()?;
        write_json_atomic(&self.path, &TransactionData { transactions })
    }

    pub fn get(&self, id: TransactionId) -> BudgetResult<Option<Transaction>> {
        Ok(read_guard(&self.data)?.get(&id).cloned())
    }

    /// All transactions, newest first
    pub fn get_all(&self) -> BudgetResult<Vec<Transaction>> {
        let mut transactions: Vec<_> = read_guard(&self.data)?.values().cloned().collect();
        newest_first(&mut transactions);
        Ok(transactions)
    }

    /// A department's transactions, newest first
    pub fn get_by_department(&self, department_id: DepartmentId) -> BudgetResult<Vec<Transaction>> {
        let data = read_guard(&self.data)?;
        let by_department = read_guard(&self.by_department)?;

        let mut transactions: Vec<_> = by_department
            .get(&department_id)
            .map(|ids| ids.iter().filter_map(|id| data.get(id).cloned()).collect())
            .unwrap_or_default();
        newest_first(&mut transactions);
        Ok(transactions)
    }

    /// All transactions grouped by department
    pub fn group_by_department(&self) -> BudgetResult<HashMap<DepartmentId, Vec<Transaction>>> {
        let mut groups: HashMap<DepartmentId, Vec<Transaction>> = HashMap::new();
        for txn in self.get_all()? {
            groups.entry(txn.department_id).or_default().push(txn);
        }
        Ok(groups)
    }

    /// Insert or update a transaction
    pub fn upsert(&self, txn: Transaction) -> BudgetResult<()> {
        let mut data = write_guard(&self.data)?;
        let mut by_department = write_guard(&self.by_department)?;

        if let Some(old) = data.get(&txn.id) {
            if let Some(ids) = by_department.get_mut(&old.department_id) {
                ids.retain(|&id| id != txn.id);
            }
        }
        by_department.entry(txn.department_id).or_default().push(txn.id);
        data.insert(txn.id, txn);
        Ok(())
    }

    /// Remove a transaction, returning it if it existed
    pub fn delete(&self, id: TransactionId) -> BudgetResult<Option<Transaction>> {
        let mut data = write_guard(&self.data)?;
        let mut by_department = write_guard(&self.by_department)?;

        let removed = data.remove(&id);
        if let Some(txn) = &removed {
            if let Some(ids) = by_department.get_mut(&txn.department_id) {
                ids.retain(|&other| other != id);
            }
        }
        Ok(removed)
    }

    /// Remove every transaction of a department, returning what was removed
    pub fn delete_by_department(&self, department_id: DepartmentId) -> BudgetResult<Vec<Transaction>> {
        let mut data = write_guard(&self.data)?;
        let mut by_department = write_guard(&self.by_department)?;

        let ids = by_department.remove(&department_id).unwrap_or_default();
        let mut removed: Vec<_> = ids.iter().filter_map(|id| data.remove(id)).collect();
        newest_first(&mut removed);
        Ok(removed)
    }

    pub fn count(&self) -> BudgetResult<usize> {
        Ok(read_guard(&self.data)?.len())
    }

    pub fn snapshot(&self) -> BudgetResult<Snapshot> {
        Ok(Snapshot(read_guard(&self.data)?.clone()))
    }

    pub fn restore(&self, snapshot: Snapshot) -> BudgetResult<()> {
        self.replace(snapshot.0)
    }

    fn replace(&self, map: HashMap<TransactionId, Transaction>) -> BudgetResult<()> {
        let mut data = write_guard(&self.data)?;
        let mut by_department = write_guard(&self.by_department)?;

        by_department.clear();
        for txn in map.values() {
            by_department.entry(txn.department_id).or_default().push(txn.id);
        }
        *data = map;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn repo() -> (TransactionRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let repo = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        (repo, temp_dir)
    }

    #[test]
    fn test_newest_first_ordering() {
        let (repo, _dir) = repo();
        let dept = DepartmentId::new();
        repo.upsert(Transaction::new(dept, -1, date(5))).unwrap();
        repo.upsert(Transaction::new(dept, -2, date(20))).unwrap();
        repo.upsert(Transaction::new(dept, -3, date(10))).unwrap();

        let amounts: Vec<_> = repo.get_all().unwrap().iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![-2, -3, -1]);
    }

    #[test]
    fn test_department_index_moves_on_update() {
        let (repo, _dir) = repo();
        let a = DepartmentId::new();
        let b = DepartmentId::new();
        let mut txn = Transaction::new(a, -5, date(1));
        repo.upsert(txn.clone()).unwrap();

        txn.department_id = b;
        repo.upsert(txn.clone()).unwrap();

        assert!(repo.get_by_department(a).unwrap().is_empty());
        assert_eq!(repo.get_by_department(b).unwrap(), vec![txn]);
    }

    #[test]
    fn test_delete_by_department() {
        let (repo, _dir) = repo();
        let a = DepartmentId::new();
        let b = DepartmentId::new();
        repo.upsert(Transaction::new(a, -1, date(1))).unwrap();
        repo.upsert(Transaction::new(a, -2, date(2))).unwrap();
        repo.upsert(Transaction::new(b, -3, date(3))).unwrap();

        let removed = repo.delete_by_department(a).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(repo.count().unwrap(), 1);
        assert!(repo.get_by_department(a).unwrap().is_empty());
    }

    #[test]
    fn test_persistence() {
        let (repo, temp_dir) = repo();
        let txn = Transaction::with_details(
            DepartmentId::new(),
            -40,
            date(3),
            "Taxi",
            Some("Travel".into()),
        );
        repo.upsert(txn.clone()).unwrap();
        repo.save().unwrap();

        let reloaded = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        reloaded.load().unwrap();
        assert_eq!(reloaded.get(txn.id).unwrap(), Some(txn.clone()));
        assert_eq!(reloaded.get_by_department(txn.department_id).unwrap().len(), 1);
    }
}
