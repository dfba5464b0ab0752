//! Configuration module for GlobalBudget
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - Server and logging settings persistence

pub mod paths;
pub mod settings;

pub use paths::{BudgetPaths, DATA_DIR_ENV};
pub use settings::Settings;
