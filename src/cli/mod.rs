//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod analytics;
pub mod department;
pub mod report;
pub mod transaction;

pub use analytics::{handle_analytics_command, AnalyticsArgs};
pub use department::{handle_department_command, DepartmentCommands};
pub use report::{handle_report_command, ReportCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::BudgetResult;

/// Open `path` for writing, or stdout when no path is given
pub(crate) fn output_writer(path: Option<&Path>) -> BudgetResult<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    })
}

/// Find the single id whose text starts with `prefix`
///
/// Lets users type the short ids shown in tables.
pub(crate) fn match_prefix<T, I>(prefix: &str, candidates: I) -> Option<T>
where
    T: ToString,
    I: IntoIterator<Item = T>,
{
    let prefix = prefix.trim().to_lowercase();
    if prefix.is_empty() {
        return None;
    }
    let mut matches = candidates
        .into_iter()
        .filter(|id| id.to_string().starts_with(&prefix));
    let first = matches.next()?;
    matches.next().is_none().then_some(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_prefix() {
        let ids = ["abc123", "abd456", "xyz789"];
        assert_eq!(match_prefix("abc", ids), Some("abc123"));
        assert_eq!(match_prefix("ab", ids), None);
        assert_eq!(match_prefix("XY", ids), Some("xyz789"));
        assert_eq!(match_prefix("", ids), None);
        assert_eq!(match_prefix("q", ids), None);
    }
}
