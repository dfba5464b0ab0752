//! Transaction CLI commands

use clap::Subcommand;
use serde_json::Value;

use crate::config::Settings;
use crate::display::{format_transaction_details, format_transaction_page};
use crate::error::{BudgetError, BudgetResult};
use crate::models::TransactionId;
use crate::services::{DepartmentService, TransactionInput, TransactionQuery, TransactionService};
use crate::storage::Storage;

use super::match_prefix;

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// List transactions, newest first
    List {
        /// Only this department (name or ID)
        #[arg(short, long)]
        department: Option<String>,
        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: usize,
        /// Transactions per page
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Record a transaction
    Add {
        /// Department name or ID
        department: String,
        /// Amount as a positive number; the sign comes from --kind
        amount: String,
        /// expense (default) or income
        #[arg(short, long)]
        kind: Option<String>,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
        /// Category
        #[arg(short, long)]
        category: Option<String>,
        /// Transaction date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Edit a transaction; omitted options keep their value
    Edit {
        /// Transaction ID (a unique prefix is enough)
        id: String,
        /// Move to another department (name or ID)
        #[arg(long)]
        department: Option<String>,
        /// New amount as a positive number
        #[arg(short, long)]
        amount: Option<String>,
        /// expense or income
        #[arg(short, long)]
        kind: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
        /// New category (empty string clears it)
        #[arg(short, long)]
        category: Option<String>,
        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete a transaction
    Delete {
        /// Transaction ID (a unique prefix is enough)
        id: String,
    },
}

/// Resolve a full id, a `txn-` short id or a unique prefix
fn resolve_id(storage: &Storage, raw: &str) -> BudgetResult<TransactionId> {
    if let Ok(id) = raw.parse::<TransactionId>() {
        return Ok(id);
    }
    let prefix = raw.trim().strip_prefix("txn-").unwrap_or(raw.trim());
    let ids = storage.transactions.get_all()?.into_iter().map(|t| t.id);
    match_prefix(prefix, ids).ok_or_else(|| BudgetError::transaction_not_found(raw))
}

/// Handle a transaction command
pub fn handle_transaction_command(
    storage: &Storage,
    settings: &Settings,
    cmd: TransactionCommands,
) -> BudgetResult<()> {
    let service = TransactionService::new(storage);
    let departments = DepartmentService::new(storage);
    let currency = settings.currency_symbol.as_str();

    match cmd {
        TransactionCommands::List {
            department,
            page,
            limit,
        } => {
            let page = service.list(&TransactionQuery {
                page,
                limit: limit.unwrap_or(settings.default_page_size),
                department,
            })?;
            print!("{}", format_transaction_page(&page, currency));
        }

        TransactionCommands::Add {
            department,
            amount,
            kind,
            description,
            category,
            date,
        } => {
            let department = departments.resolve(&department)?;
            let view = service.create(TransactionInput {
                department_id: Some(department.id.to_string()),
                amount: Some(Value::String(amount)),
                kind,
                description,
                category,
                date,
            })?;

            println!("Recorded transaction for {}", view.department_name);
            print!(
                "{}",
                format_transaction_details(&view.transaction, &view.department_name, currency)
            );
        }

        TransactionCommands::Edit {
            id,
            department,
            amount,
            kind,
            description,
            category,
            date,
        } => {
            let id = resolve_id(storage, &id)?;
            let department_id = match department {
                Some(d) => Some(departments.resolve(&d)?.id.to_string()),
                None => None,
            };
            let view = service.update(
                id,
                TransactionInput {
                    department_id,
                    amount: amount.map(Value::String),
                    kind,
                    description,
                    category,
                    date,
                },
            )?;

            println!("Updated transaction {}", view.transaction.id.short());
            print!(
                "{}",
                format_transaction_details(&view.transaction, &view.department_name, currency)
            );
        }

        TransactionCommands::Delete { id } => {
            let id = resolve_id(storage, &id)?;
            let deleted = service.delete(id)?;
            println!("Deleted transaction {}", deleted.id.short());
        }
    }

    Ok(())
}
