//! GlobalBudget - department budget tracking service
//!
//! Departments carry a budget; transactions record expenses and income
//! against them. Spending figures are always derived from transactions at
//! query time. Stored reports snapshot those figures and can be exported.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `normalize`: Coercion of untyped numeric input into safe integers
//! - `models`: Core data models (departments, transactions, reports)
//! - `storage`: JSON file storage layer with atomic multi-entity units
//! - `audit`: Audit logging system
//! - `services`: Business logic and spending aggregation
//! - `reports`: Report generation
//! - `export`: CSV, JSON and YAML exports
//! - `api`: HTTP API (axum)
//! - `cli` / `display`: Command line front end
//!
//! # Example
//!
//! ```rust,ignore
//! use globalbudget::config::BudgetPaths;
//! use globalbudget::services::DepartmentService;
//! use globalbudget::storage::Storage;
//!
//! let storage = Storage::open(BudgetPaths::new()?)?;
//! let departments = DepartmentService::new(&storage).list()?;
//! ```

pub mod api;
pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{BudgetError, BudgetResult};
