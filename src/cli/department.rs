//! Department CLI commands
//!
//! Implements CLI commands for department management.

use clap::Subcommand;
use serde_json::Value;

use crate::config::Settings;
use crate::display::{format_department_details, format_department_list};
use crate::error::BudgetResult;
use crate::models::format_amount;
use crate::services::{DepartmentInput, DepartmentService};
use crate::storage::Storage;

/// Department subcommands
#[derive(Subcommand)]
pub enum DepartmentCommands {
    /// List departments with budget, spending and utilization
    List,
    /// Show department details
    Show {
        /// Department name or ID
        department: String,
    },
    /// Create a department
    Create {
        /// Department name (stored uppercase)
        name: String,
        /// Budget in whole units (e.g., "50000" or "50,000")
        budget: String,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
        /// Manager
        #[arg(short, long)]
        manager: Option<String>,
    },
    /// Edit a department
    Edit {
        /// Department name or ID
        department: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New budget
        #[arg(short, long)]
        budget: Option<String>,
        /// New description (empty string clears it)
        #[arg(short, long)]
        description: Option<String>,
        /// New manager (empty string clears it)
        #[arg(short, long)]
        manager: Option<String>,
    },
    /// Delete a department and all of its transactions
    Delete {
        /// Department name or ID
        department: String,
    },
}

/// Handle a department command
pub fn handle_department_command(
    storage: &Storage,
    settings: &Settings,
    cmd: DepartmentCommands,
) -> BudgetResult<()> {
    let service = DepartmentService::new(storage);
    let currency = settings.currency_symbol.as_str();

    match cmd {
        DepartmentCommands::List => {
            let (views, totals) = service.overview()?;
            print!("{}", format_department_list(&views, &totals, currency));
        }

        DepartmentCommands::Show { department } => {
            let found = service.resolve(&department)?;
            print!("{}", format_department_details(&service.view(found.id)?, currency));
        }

        DepartmentCommands::Create {
            name,
            budget,
            description,
            manager,
        } => {
            let department = service.create(DepartmentInput {
                description,
                manager,
                ..DepartmentInput::new(&name, &budget)
            })?;

            println!("Created department: {}", department.name);
            println!("  Budget: {}", format_amount(department.budget, currency));
            println!("  ID: {}", department.id);
        }

        DepartmentCommands::Edit {
            department,
            name,
            budget,
            description,
            manager,
        } => {
            let found = service.resolve(&department)?;

            let input = DepartmentInput {
                name: Some(Value::String(name.unwrap_or_else(|| found.name.clone()))),
                budget: Some(match budget {
                    Some(raw) => Value::String(raw),
                    None => Value::from(found.budget),
                }),
                description,
                manager,
            };
            let updated = service.update(found.id, input)?;

            println!("Updated department: {}", updated.name);
            println!("  Budget: {}", format_amount(updated.budget, currency));
        }

        DepartmentCommands::Delete { department } => {
            let found = service.resolve(&department)?;
            let removal = service.delete(found.id)?;

            println!("Deleted department: {}", removal.department.name);
            if !removal.transactions.is_empty() {
                println!("  Removed {} transaction(s)", removal.transactions.len());
            }
        }
    }

    Ok(())
}
