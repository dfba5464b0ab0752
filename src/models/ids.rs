//! Strongly-typed ID wrappers
//!
//! Departments, transactions and reports each get their own UUID newtype so a
//! transaction id can never be passed where a department id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Get the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Short human-facing form, e.g. `dep-1a2b3c4d`
            pub fn short(&self) -> String {
                format!("{}{}", $display_prefix, &self.0.simple().to_string()[..8])
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(DepartmentId, "dep-");
define_id!(TransactionId, "txn-");
define_id!(ReportId, "rpt-");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_full_uuid() {
        let id = ReportId::new();
        assert_eq!(id.to_string(), id.as_uuid().to_string());
    }

    #[test]
    fn test_short_form() {
        let id = DepartmentId::new();
        let short = id.short();
        assert!(short.starts_with("dep-"));
        assert_eq!(short.len(), 12);
    }

    #[test]
    fn test_parse_accepts_prefix() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let plain: TransactionId = uuid_str.parse().unwrap();
        let prefixed: TransactionId = format!("txn-{}", uuid_str).parse().unwrap();
        assert_eq!(plain, prefixed);
        assert!("not-an-id".parse::<TransactionId>().is_err());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = DepartmentId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
        let back: DepartmentId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
