//! Display formatting for terminal output
//!
//! Plain-text tables for the CLI. Reports have their own renderers in
//! [`crate::reports`].

pub mod analytics;
pub mod department;
pub mod transaction;

pub use analytics::format_analytics;
pub use department::{format_department_details, format_department_list};
pub use transaction::{format_transaction_details, format_transaction_page};
