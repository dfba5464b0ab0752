//! Report model
//!
//! Reports are typed by [`ReportKind`]. Parameters and data are tagged unions
//! keyed by that kind; on the wire they serialize as the bare inner object so
//! clients see plain `{ startDate, endDate }` or `{ transactions, ... }`.
//! Report payloads use camelCase field names.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::ids::{DepartmentId, ReportId, TransactionId};
use crate::error::{BudgetError, BudgetResult};

/// Supported report types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    /// Per-department spending within an optional date window
    DepartmentSpending,
    /// Filtered transaction listing
    TransactionHistory,
}

impl ReportKind {
    pub const ALL: [ReportKind; 2] = [Self::DepartmentSpending, Self::TransactionHistory];

    /// The wire name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DepartmentSpending => "department-spending",
            Self::TransactionHistory => "transaction-history",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| BudgetError::UnsupportedReportType(s.to_string()))
    }
}

/// Treat absent, null and blank strings as `None`; parse anything else.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s.trim().parse().map(Some).map_err(D::Error::custom),
    }
}

/// Parameters of a department-spending report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSpendingParams {
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl DepartmentSpendingParams {
    pub fn validate(&self) -> BudgetResult<()> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(BudgetError::Validation(format!(
                    "startDate {} is after endDate {}",
                    start, end
                )));
            }
        }
        Ok(())
    }
}

/// Parameters of a transaction-history report; filters are AND-combined
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionHistoryParams {
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub department_id: Option<DepartmentId>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Report parameters keyed by kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportParameters {
    DepartmentSpending(DepartmentSpendingParams),
    TransactionHistory(TransactionHistoryParams),
}

impl ReportParameters {
    pub fn kind(&self) -> ReportKind {
        match self {
            Self::DepartmentSpending(_) => ReportKind::DepartmentSpending,
            Self::TransactionHistory(_) => ReportKind::TransactionHistory,
        }
    }

    /// Build parameters from an untyped request body
    ///
    /// Missing or null parameters mean "no filters". Anything that does not
    /// match the kind's shape is a validation error.
    pub fn from_request(kind: ReportKind, raw: Option<Value>) -> BudgetResult<Self> {
        let raw = match raw {
            None | Some(Value::Null) => Value::Object(Default::default()),
            Some(obj @ Value::Object(_)) => obj,
            Some(_) => {
                return Err(BudgetError::Validation(
                    "Report parameters must be an object".into(),
                ))
            }
        };

        let params = Self::from_value(kind, raw).map_err(|e| {
            BudgetError::Validation(format!("Invalid parameters for {}: {}", kind, e))
        })?;
        params.validate()?;
        Ok(params)
    }

    /// Decode the stored string form
    pub fn decode(kind: ReportKind, text: &str) -> Result<Self, serde_json::Error> {
        Self::from_value(kind, serde_json::from_str(text)?)
    }

    /// Encode to the stored string form
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn validate(&self) -> BudgetResult<()> {
        match self {
            Self::DepartmentSpending(params) => params.validate(),
            Self::TransactionHistory(_) => Ok(()),
        }
    }

    fn from_value(kind: ReportKind, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            ReportKind::DepartmentSpending => {
                Self::DepartmentSpending(serde_json::from_value(value)?)
            }
            ReportKind::TransactionHistory => {
                Self::TransactionHistory(serde_json::from_value(value)?)
            }
        })
    }
}

/// One department line of a department-spending report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSpendingRow {
    pub id: DepartmentId,
    pub name: String,
    pub budget: i64,
    pub spent: i64,
    pub description: Option<String>,
    pub manager: Option<String>,
}

/// The window a department-spending report covers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPeriod {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSpendingData {
    pub departments: Vec<DepartmentSpendingRow>,
    pub total_budget: i64,
    pub total_spent: i64,
    pub period: ReportPeriod,
}

/// One transaction line of a transaction-history report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionHistoryRow {
    pub id: TransactionId,
    pub department_id: DepartmentId,
    pub department_name: String,
    pub amount: i64,
    pub description: String,
    pub category: Option<String>,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionHistoryData {
    pub transactions: Vec<TransactionHistoryRow>,
    pub total_amount: i64,
    pub filters: TransactionHistoryParams,
}

/// Report results keyed by kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportData {
    DepartmentSpending(DepartmentSpendingData),
    TransactionHistory(TransactionHistoryData),
}

impl ReportData {
    pub fn kind(&self) -> ReportKind {
        match self {
            Self::DepartmentSpending(_) => ReportKind::DepartmentSpending,
            Self::TransactionHistory(_) => ReportKind::TransactionHistory,
        }
    }

    /// Decode the stored string form
    pub fn decode(kind: ReportKind, text: &str) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            ReportKind::DepartmentSpending => Self::DepartmentSpending(serde_json::from_str(text)?),
            ReportKind::TransactionHistory => Self::TransactionHistory(serde_json::from_str(text)?),
        })
    }

    /// Encode to the stored string form
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A persisted, immutable report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredReport {
    pub id: ReportId,
    #[serde(rename = "type")]
    pub kind: ReportKind,
    pub parameters: ReportParameters,
    pub data: ReportData,
    pub created_at: DateTime<Utc>,
}
