//! Report persistence
//!
//! Reports are kept in `reports.json` in insertion order. Each record stores
//! its parameters and data as JSON strings so a record with a damaged payload
//! can still be listed around and reported on individually. A record whose
//! envelope itself no longer parses is kept verbatim so it survives rewrites.

use std::path::PathBuf;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::{BudgetError, BudgetResult};
use crate::models::{ReportData, ReportId, ReportKind, ReportParameters, StoredReport};

use super::file_io::{read_json, write_json_atomic};
use super::{read_guard, write_guard};

/// Persistence seam for generated reports
pub trait ReportStore: Send + Sync {
    /// Persist a new report and return it with its id and timestamp
    fn save(&self, parameters: &ReportParameters, data: &ReportData) -> BudgetResult<StoredReport>;

    /// Fetch one report; `NotFound` when absent, `Serialization` when damaged
    fn get(&self, id: ReportId) -> BudgetResult<StoredReport>;

    /// All readable reports, newest first
    fn list(&self) -> BudgetResult<Vec<StoredReport>>;
}

/// On-disk form of a report
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ReportRecord {
    id: ReportId,
    #[serde(rename = "type")]
    kind: String,
    parameters: String,
    data: String,
    created_at: DateTime<Utc>,
}

impl ReportRecord {
    fn decode(&self) -> BudgetResult<StoredReport> {
        let corrupted = |reason: String| BudgetError::Serialization {
            id: self.id.to_string(),
            reason,
        };

        let kind: ReportKind = self
            .kind
            .parse()
            .map_err(|_| corrupted(format!("unknown report type {:?}", self.kind)))?;
        let parameters = ReportParameters::decode(kind, &self.parameters)
            .map_err(|e| corrupted(format!("parameters: {}", e)))?;
        let data =
            ReportData::decode(kind, &self.data).map_err(|e| corrupted(format!("data: {}", e)))?;

        Ok(StoredReport {
            id: self.id,
            kind,
            parameters,
            data,
            created_at: self.created_at,
        })
    }
}

/// One element of the `reports` array
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ReportEntry {
    Record(ReportRecord),
    /// Anything that does not parse as a record, kept as written
    Damaged(Value),
}

impl ReportEntry {
    /// The id as written, if one can be read at all
    fn raw_id(&self) -> Option<String> {
        match self {
            Self::Record(record) => Some(record.id.to_string()),
            Self::Damaged(value) => value.get("id").and_then(Value::as_str).map(str::to_string),
        }
    }

    fn has_id(&self, id: ReportId) -> bool {
        match self {
            Self::Record(record) => record.id == id,
            Self::Damaged(_) => self
                .raw_id()
                .and_then(|raw| raw.parse::<ReportId>().ok())
                .is_some_and(|raw| raw == id),
        }
    }

    fn decode(&self) -> BudgetResult<StoredReport> {
        match self {
            Self::Record(record) => record.decode(),
            Self::Damaged(_) => Err(BudgetError::Serialization {
                id: self.raw_id().unwrap_or_else(|| "unknown".to_string()),
                reason: "record envelope is malformed".to_string(),
            }),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ReportFile {
    reports: Vec<ReportEntry>,
}

pub struct ReportRepository {
    path: PathBuf,
    entries: RwLock<Vec<ReportEntry>>,
}

impl ReportRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn load(&self) -> BudgetResult<()> {
        let file: ReportFile = read_json(&self.path)?;
        let damaged = file
            .reports
            .iter()
            .filter(|e| matches!(e, ReportEntry::Damaged(_)))
            .count();
        if damaged > 0 {
            warn!(path = %self.path.display(), damaged, "report file holds malformed records");
        }
        *write_guard(&self.entries)? = file.reports;
        Ok(())
    }

    /// Write every entry, damaged ones included, back to disk
    pub fn flush(&self) -> BudgetResult<()> {
        let reports = read_guard(&self.entries)?.clone();
        write_json_atomic(&self.path, &ReportFile { reports })
    }

    pub fn count(&self) -> BudgetResult<usize> {
        Ok(read_guard(&self.entries)?.len())
    }
}

impl ReportStore for ReportRepository {
    fn save(&self, parameters: &ReportParameters, data: &ReportData) -> BudgetResult<StoredReport> {
        let kind = parameters.kind();
        if data.kind() != kind {
            return Err(BudgetError::Validation(format!(
                "Report data of type {} does not match parameters of type {}",
                data.kind(),
                kind
            )));
        }

        let record = ReportRecord {
            id: ReportId::new(),
            kind: kind.as_str().to_string(),
            parameters: parameters.encode()?,
            data: data.encode()?,
            created_at: Utc::now(),
        };

        let mut entries = write_guard(&self.entries)?;
        entries.push(ReportEntry::Record(record.clone()));

        let file = ReportFile {
            reports: entries.clone(),
        };
        if let Err(e) = write_json_atomic(&self.path, &file) {
            entries.pop();
            return Err(e);
        }

        Ok(StoredReport {
            id: record.id,
            kind,
            parameters: parameters.clone(),
            data: data.clone(),
            created_at: record.created_at,
        })
    }

    fn get(&self, id: ReportId) -> BudgetResult<StoredReport> {
        let entries = read_guard(&self.entries)?;
        entries
            .iter()
            .find(|e| e.has_id(id))
            .ok_or_else(|| BudgetError::report_not_found(id.to_string()))?
            .decode()
    }

    fn list(&self) -> BudgetResult<Vec<StoredReport>> {
        let entries = read_guard(&self.entries)?;

        let mut reports: Vec<StoredReport> = entries
            .iter()
            .rev()
            .filter_map(|entry| match entry.decode() {
                Ok(report) => Some(report),
                Err(e) => {
                    warn!(
                        report_id = entry.raw_id().as_deref().unwrap_or("unknown"),
                        error = %e,
                        "skipping unreadable report"
                    );
                    None
                }
            })
            .collect();

        // Stable: equal timestamps keep the newer-inserted record first.
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reports)
    }
}
