//! Report generator

use serde_json::Value;
use tracing::info;

use crate::audit::{AuditEntry, EntityType};
use crate::error::BudgetResult;
use crate::models::{ReportData, ReportKind, ReportParameters, StoredReport};
use crate::normalize::NumericNormalizer;
use crate::services::aggregation::DepartmentAggregator;
use crate::storage::{ReportStore, Storage};

use super::{department_spending, transaction_history};

/// Builds reports from storage and persists them
pub struct ReportGenerator<'a> {
    storage: &'a Storage,
    store: &'a dyn ReportStore,
    normalizer: NumericNormalizer,
    aggregator: DepartmentAggregator,
}

impl<'a> ReportGenerator<'a> {
    /// Generator persisting into the storage's own report repository
    pub fn new(storage: &'a Storage) -> Self {
        Self::with_store(storage, &storage.reports)
    }

    /// Generator persisting into another store
    pub fn with_store(storage: &'a Storage, store: &'a dyn ReportStore) -> Self {
        let normalizer = NumericNormalizer::new();
        Self {
            storage,
            store,
            aggregator: DepartmentAggregator::new(normalizer.clone()),
            normalizer,
        }
    }

    /// Replace the normalizer, e.g. to capture rejections
    pub fn with_normalizer(mut self, normalizer: NumericNormalizer) -> Self {
        self.aggregator = DepartmentAggregator::new(normalizer.clone());
        self.normalizer = normalizer;
        self
    }

    /// Generate from an untyped request
    ///
    /// The type name is checked before anything else; an unknown name fails
    /// with `UnsupportedReportType` without touching storage.
    pub fn generate(&self, report_type: &str, parameters: Option<Value>) -> BudgetResult<StoredReport> {
        let kind: ReportKind = report_type.parse()?;
        let parameters = ReportParameters::from_request(kind, parameters)?;
        self.generate_from(parameters)
    }

    /// Generate from typed parameters
    pub fn generate_from(&self, parameters: ReportParameters) -> BudgetResult<StoredReport> {
        parameters.validate()?;

        let data = self.storage.consistent_read(|s| {
            let departments = s.departments.get_all()?;
            let transactions = s.transactions.get_all()?;

            Ok(match &parameters {
                ReportParameters::DepartmentSpending(params) => {
                    ReportData::DepartmentSpending(department_spending::build(
                        &self.aggregator,
                        &self.normalizer,
                        params,
                        &departments,
                        &transactions,
                    ))
                }
                ReportParameters::TransactionHistory(params) => {
                    ReportData::TransactionHistory(transaction_history::build(
                        &self.normalizer,
                        params,
                        &departments,
                        &transactions,
                    ))
                }
            })
        })?;

        let report = self.store.save(&parameters, &data)?;

        self.storage.record_audit(&[AuditEntry::create(
            EntityType::Report,
            report.id,
            Some(report.kind.to_string()),
            &report,
        )]);
        info!(report = %report.id, kind = %report.kind, "generated report");

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BudgetPaths;
    use crate::error::BudgetError;
    use crate::models::{Department, ReportId, Transaction};
    use crate::normalize::{DiagnosticSink, RawAmount, Rejection, MAX_SAFE_INTEGER};
    use chrono::NaiveDate;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = BudgetPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    fn seed(storage: &Storage) -> Department {
        let dept = Department::new("sales", 1000);
        let day = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        storage
            .atomic(|s| {
                s.departments.upsert(dept.clone())?;
                s.transactions.upsert(Transaction::with_details(
                    dept.id,
                    -50,
                    day,
                    "Flight",
                    Some("Travel".into()),
                ))?;
                s.transactions.upsert(Transaction::with_details(
                    dept.id,
                    -20,
                    day,
                    "Lunch",
                    Some("Food".into()),
                ))
            })
            .unwrap();
        dept
    }

    struct FailingStore;

    impl ReportStore for FailingStore {
        fn save(&self, _: &ReportParameters, _: &ReportData) -> BudgetResult<StoredReport> {
            Err(BudgetError::Storage("disk full".into()))
        }
        fn get(&self, id: ReportId) -> BudgetResult<StoredReport> {
            Err(BudgetError::report_not_found(id.to_string()))
        }
        fn list(&self) -> BudgetResult<Vec<StoredReport>> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct CountingSink(Mutex<usize>);

    impl DiagnosticSink for CountingSink {
        fn rejected(&self, _: &RawAmount<'_>, _: Rejection) {
            *self.0.lock().unwrap() += 1;
        }
    }

    #[test]
    fn test_unknown_type_rejected_before_any_work() {
        let (_dir, storage) = create_test_storage();
        let generator = ReportGenerator::with_store(&storage, &FailingStore);

        let err = generator.generate("unknown-type", None).unwrap_err();
        assert!(matches!(err, BudgetError::UnsupportedReportType(_)));
    }

    #[test]
    fn test_transaction_history_by_category() {
        let (_dir, storage) = create_test_storage();
        seed(&storage);
        let generator = ReportGenerator::new(&storage);

        let report = generator
            .generate("transaction-history", Some(json!({"category": "Travel"})))
            .unwrap();
        let ReportData::TransactionHistory(data) = &report.data else {
            panic!("wrong report kind");
        };
        assert_eq!(data.transactions.len(), 1);
        assert_eq!(data.total_amount, -50);

        let fetched = storage.reports.get(report.id).unwrap();
        assert_eq!(fetched, report);
    }

    #[test]
    fn test_department_spending_persisted_and_listed() {
        let (_dir, storage) = create_test_storage();
        seed(&storage);
        let generator = ReportGenerator::new(&storage);

        let report = generator
            .generate(
                "department-spending",
                Some(json!({"startDate": "2024-01-01", "endDate": "2024-12-31"})),
            )
            .unwrap();
        let ReportData::DepartmentSpending(data) = &report.data else {
            panic!("wrong report kind");
        };
        assert_eq!(data.total_budget, 1000);
        assert_eq!(data.total_spent, -70);

        let listed = storage.reports.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, report.id);
    }

    #[test]
    fn test_store_failure_propagates() {
        let (_dir, storage) = create_test_storage();
        seed(&storage);
        let generator = ReportGenerator::with_store(&storage, &FailingStore);

        let err = generator.generate("department-spending", None).unwrap_err();
        assert!(matches!(err, BudgetError::Storage(_)));
        assert_eq!(storage.reports.count().unwrap(), 0);
    }

    #[test]
    fn test_invalid_parameters_are_validation_errors() {
        let (_dir, storage) = create_test_storage();
        let generator = ReportGenerator::new(&storage);

        let err = generator
            .generate(
                "department-spending",
                Some(json!({"startDate": "2024-06-01", "endDate": "2024-01-01"})),
            )
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_overflowing_total_is_reported_and_zeroed() {
        let (_dir, storage) = create_test_storage();
        let dept = Department::new("big", 1);
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        storage
            .atomic(|s| {
                s.departments.upsert(dept.clone())?;
                s.transactions.upsert(Transaction::new(dept.id, MAX_SAFE_INTEGER, day))?;
                s.transactions.upsert(Transaction::new(dept.id, MAX_SAFE_INTEGER, day))
            })
            .unwrap();

        let sink = Arc::new(CountingSink::default());
        let generator = ReportGenerator::new(&storage)
            .with_normalizer(NumericNormalizer::with_sink(sink.clone()));

        let report = generator.generate("transaction-history", None).unwrap();
        let ReportData::TransactionHistory(data) = &report.data else {
            panic!("wrong report kind");
        };
        assert_eq!(data.total_amount, 0);
        assert!(*sink.0.lock().unwrap() >= 1);
    }
}
