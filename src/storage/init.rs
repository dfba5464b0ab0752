//! First-run setup and sample data

use chrono::Utc;
use tracing::info;

use crate::audit::{AuditEntry, EntityType};
use crate::config::{BudgetPaths, Settings};
use crate::error::BudgetResult;
use crate::models::{Department, Transaction};

use super::Storage;

/// Sample departments: name and budget
const SAMPLE_DEPARTMENTS: [(&str, i64); 3] = [("Finance", 100_000), ("HR", 50_000), ("IT", 150_000)];

/// Expense recorded against every sample department
const SAMPLE_EXPENSE: i64 = 5_000;

/// Prepare a data directory: create it and write default settings if absent
///
/// Returns the settings now in effect.
pub fn initialize_storage(paths: &BudgetPaths) -> BudgetResult<Settings> {
    paths.ensure_directories()?;

    let settings = Settings::load_or_create(paths)?;
    if !paths.settings_file().exists() {
        settings.save(paths)?;
        info!(path = %paths.settings_file().display(), "wrote default settings");
    }

    Ok(settings)
}

/// Insert the sample departments, each with one initial expense
///
/// Departments whose name already exists are left alone. Returns how many
/// departments were created.
pub fn seed_sample_data(storage: &Storage) -> BudgetResult<usize> {
    let created = storage.atomic(|s| {
        let today = Utc::now().date_naive();
        let mut created = Vec::new();

        for (name, budget) in SAMPLE_DEPARTMENTS {
            if s.departments.name_taken(name, None)? {
                continue;
            }

            let department = Department::new(name, budget);
            let expense = Transaction::with_details(
                department.id,
                -SAMPLE_EXPENSE,
                today,
                "Initial expense",
                Some("Expenses".to_string()),
            );

            s.departments.upsert(department.clone())?;
            s.transactions.upsert(expense.clone())?;
            created.push((department, expense));
        }

        Ok(created)
    })?;

    let entries: Vec<AuditEntry> = created
        .iter()
        .flat_map(|(department, expense)| {
            [
                AuditEntry::create(
                    EntityType::Department,
                    department.id,
                    Some(department.name.clone()),
                    department,
                ),
                AuditEntry::create(EntityType::Transaction, expense.id, None, expense),
            ]
        })
        .collect();
    storage.record_audit(&entries);

    info!(count = created.len(), "seeded sample departments");
    Ok(created.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_writes_settings_once() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BudgetPaths::with_base_dir(temp_dir.path().to_path_buf());
        assert!(!paths.is_initialized());

        initialize_storage(&paths).unwrap();
        assert!(paths.is_initialized());
        assert!(paths.data_dir().exists());

        let mut settings = Settings::load_or_create(&paths).unwrap();
        settings.port = 9000;
        settings.save(&paths).unwrap();

        let again = initialize_storage(&paths).unwrap();
        assert_eq!(again.port, 9000);
    }

    #[test]
    fn test_seed_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BudgetPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();

        assert_eq!(seed_sample_data(&storage).unwrap(), 3);
        assert_eq!(seed_sample_data(&storage).unwrap(), 0);

        let names: Vec<_> = storage
            .departments
            .get_all()
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["FINANCE", "HR", "IT"]);
        assert_eq!(storage.transactions.count().unwrap(), 3);

        let finance = storage.departments.get_by_name("finance").unwrap().unwrap();
        let txns = storage.transactions.get_by_department(finance.id).unwrap();
        assert_eq!(txns[0].amount, -5000);
        assert_eq!(txns[0].category.as_deref(), Some("Expenses"));

        assert_eq!(storage.audit.read_all().unwrap().len(), 6);
    }
}
