//! Audit log
//!
//! Every create, update and delete of a department, transaction or report is
//! appended to `audit.log` as one JSON object per line, with the entity's
//! state before and after the change.

mod entry;
mod logger;

pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
