//! Department repository
//!
//! Persists departments to `departments.json` with a name index for the
//! uniqueness check.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::BudgetResult;
use crate::models::{Department, DepartmentId};

use super::file_io::{read_json, write_json_atomic};
use super::{read_guard, write_guard};

#[derive(Debug, Default, Serialize, Deserialize)]
struct DepartmentData {
    departments: Vec<Department>,
}

/// In-memory copy used to roll back an atomic unit
pub struct Snapshot(HashMap<DepartmentId, Department>);

pub struct DepartmentRepository {
    path: PathBuf,
    data: RwLock<HashMap<DepartmentId, Department>>,
    /// Index: uppercased name -> id
    by_name: RwLock<HashMap<String, DepartmentId>>,
}

impl DepartmentRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_name: RwLock::new(HashMap::new()),
        }
    }

    /// Load departments from disk and rebuild the name index
    pub fn load(&self) -> BudgetResult<()> {
        let file_data: DepartmentData = read_json(&self.path)?;
        let map = file_data
            .departments
            .into_iter()
            .map(|d| (d.id, d))
            .collect();
        self.replace(map)
    }

    /// Write all departments to disk, ordered by name
    pub fn save(&self) -> BudgetResult<()> {
        let departments = self.get_all()?;
        write_json_atomic(&self.path, &DepartmentData { departments })
    }

    pub fn get(&self, id: DepartmentId) -> BudgetResult<Option<Department>> {
        Ok(read_guard(&self.data)?.get(&id).cloned())
    }

    /// Look up by name; the lookup is case-insensitive
    pub fn get_by_name(&self, name: &str) -> BudgetResult<Option<Department>> {
        let key = Department::canonical_name(name);
        let id = read_guard(&self.by_name)?.get(&key).copied();
        match id {
            Some(id) => self.get(id),
            None => Ok(None),
        }
    }

    /// All departments ordered by name
    pub fn get_all(&self) -> BudgetResult<Vec<Department>> {
        let mut departments: Vec<_> = read_guard(&self.data)?.values().cloned().collect();
        departments.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(departments)
    }

    /// Whether another department already uses `name`
    pub fn name_taken(&self, name: &str, except: Option<DepartmentId>) -> BudgetResult<bool> {
        let key = Department::canonical_name(name);
        Ok(read_guard(&self.by_name)?
            .get(&key)
            .is_some_and(|id| Some(*id) != except))
    }

    /// Insert or update a department
    pub fn upsert(&self, department: Department) -> BudgetResult<()> {
        let mut data = write_guard(&self.data)?;
        let mut by_name = write_guard(&self.by_name)?;

        if let Some(old) = data.get(&department.id) {
            by_name.remove(&old.name);
        }
        by_name.insert(department.name.clone(), department.id);
        data.insert(department.id, department);
        Ok(())
    }

    /// Remove a department, returning it if it existed
    pub fn delete(&self, id: DepartmentId) -> BudgetResult<Option<Department>> {
        let mut data = write_guard(&self.data)?;
        let mut by_name = write_guard(&self.by_name)?;

        let removed = data.remove(&id);
        if let Some(dept) = &removed {
            by_name.remove(&dept.name);
        }
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

    fn replace(&self, map: HashMap<DepartmentId, Department>) -> BudgetResult<()> {
        let mut data = write_guard(&self.data)?;
        let mut by_name = write_guard(&self.by_name)?;

        *by_name = map.values().map(|d| (d.name.clone(), d.id)).collect();
        *data = map;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn repo() -> (DepartmentRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let repo = DepartmentRepository::new(temp_dir.path().join("departments.json"));
        (repo, temp_dir)
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let (repo, temp_dir) = repo();
        repo.upsert(Department::new("it", 150)).unwrap();
        repo.upsert(Department::new("finance", 100)).unwrap();
        repo.save().unwrap();

        let reloaded = DepartmentRepository::new(temp_dir.path().join("departments.json"));
        reloaded.load().unwrap();
        let names: Vec<_> = reloaded.get_all().unwrap().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["FINANCE", "IT"]);
    }

    #[test]
    fn test_name_index_follows_renames() {
        let (repo, _dir) = repo();
        let mut dept = Department::new("hr", 10);
        repo.upsert(dept.clone()).unwrap();
        assert!(repo.name_taken("Hr", None).unwrap());
        assert!(!repo.name_taken("hr", Some(dept.id)).unwrap());

        dept.rename("people");
        repo.upsert(dept.clone()).unwrap();
        assert!(repo.get_by_name("hr").unwrap().is_none());
        assert_eq!(repo.get_by_name("people").unwrap().unwrap().id, dept.id);
    }

    #[test]
    fn test_delete() {
        let (repo, _dir) = repo();
        let dept = Department::new("ops", 1);
        repo.upsert(dept.clone()).unwrap();

        assert_eq!(repo.delete(dept.id).unwrap(), Some(dept.clone()));
        assert_eq!(repo.delete(dept.id).unwrap(), None);
        assert!(!repo.name_taken("OPS", None).unwrap());
    }

    #[test]
    fn test_snapshot_restore() {
        let (repo, _dir) = repo();
        let dept = Department::new("ops", 1);
        repo.upsert(dept.clone()).unwrap();

        let snapshot = repo.snapshot().unwrap();
        repo.delete(dept.id).unwrap();
        repo.restore(snapshot).unwrap();

        assert_eq!(repo.get_by_name("ops").unwrap(), Some(dept));
    }
}
