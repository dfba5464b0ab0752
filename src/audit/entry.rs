//! Audit entry data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Kind of change recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "CREATE"),
            Operation::Update => write!(f, "UPDATE"),
            Operation::Delete => write!(f, "DELETE"),
        }
    }
}

/// Audited entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Department,
    Transaction,
    Report,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityType::Department => write!(f, "Department"),
            EntityType::Transaction => write!(f, "Transaction"),
            EntityType::Report => write!(f, "Report"),
        }
    }
}

/// One line of the audit log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: Operation,
    pub entity_type: EntityType,
    pub entity_id: String,

    /// Display name at the time of the change, when the entity has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<Value>,

    /// Top-level fields that differ between `before` and `after`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changed_fields: Vec<String>,
}

impl AuditEntry {
    fn base(
        operation: Operation,
        entity_type: EntityType,
        entity_id: impl fmt::Display,
        entity_name: Option<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            entity_type,
            entity_id: entity_id.to_string(),
            entity_name,
            before: None,
            after: None,
            changed_fields: Vec::new(),
        }
    }

    pub fn create<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl fmt::Display,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        let mut entry = Self::base(Operation::Create, entity_type, entity_id, entity_name);
        entry.after = serde_json::to_value(entity).ok();
        entry
    }

    pub fn update<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl fmt::Display,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> Self {
        let mut entry = Self::base(Operation::Update, entity_type, entity_id, entity_name);
        entry.before = serde_json::to_value(before).ok();
        entry.after = serde_json::to_value(after).ok();
        entry.changed_fields = changed_fields(entry.before.as_ref(), entry.after.as_ref());
        entry
    }

    pub fn delete<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl fmt::Display,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        let mut entry = Self::base(Operation::Delete, entity_type, entity_id, entity_name);
        entry.before = serde_json::to_value(entity).ok();
        entry
    }

    /// One-line human summary
    pub fn summary(&self) -> String {
        let name = self
            .entity_name
            .as_deref()
            .map(|n| format!(" \"{}\"", n))
            .unwrap_or_default();
        let mut line = format!(
            "{} {} {} {}{}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.operation,
            self.entity_type,
            self.entity_id,
            name
        );
        if !self.changed_fields.is_empty() {
            line.push_str(&format!(" [{}]", self.changed_fields.join(", ")));
        }
        line
    }
}

fn changed_fields(before: Option<&Value>, after: Option<&Value>) -> Vec<String> {
    let (Some(Value::Object(before)), Some(Value::Object(after))) = (before, after) else {
        return Vec::new();
    };

    let mut fields: Vec<String> = before
        .keys()
        .chain(after.keys())
        .filter(|key| *key != "updated_at" && before.get(*key) != after.get(*key))
        .cloned()
        .collect();
    fields.sort();
    fields.dedup();
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_entry() {
        let entry = AuditEntry::create(
            EntityType::Department,
            "abc",
            Some("FINANCE".into()),
            &json!({"name": "FINANCE", "budget": 100}),
        );
        assert_eq!(entry.operation, Operation::Create);
        assert!(entry.before.is_none());
        assert_eq!(entry.after.as_ref().unwrap()["budget"], 100);
    }

    #[test]
    fn test_update_lists_changed_fields() {
        let entry = AuditEntry::update(
            EntityType::Department,
            "abc",
            None,
            &json!({"name": "HR", "budget": 100, "updated_at": "a"}),
            &json!({"name": "HR", "budget": 150, "manager": "Kim", "updated_at": "b"}),
        );
        assert_eq!(entry.changed_fields, vec!["budget", "manager"]);
        assert!(entry.summary().contains("[budget, manager]"));
    }

    #[test]
    fn test_delete_entry_keeps_before() {
        let entry = AuditEntry::delete(EntityType::Transaction, "t1", None, &json!({"amount": -5}));
        assert_eq!(entry.operation, Operation::Delete);
        assert!(entry.after.is_none());
        assert_eq!(entry.before.unwrap()["amount"], -5);
    }

    #[test]
    fn test_jsonl_shape() {
        let entry = AuditEntry::create(EntityType::Report, "r1", None, &json!({}));
        let line = serde_json::to_string(&entry).unwrap();
        assert!(line.contains("\"operation\":\"create\""));
        assert!(line.contains("\"entity_type\":\"report\""));
        assert!(!line.contains("changed_fields"));
    }
}
