//! Report CLI commands

use std::io::Write;
use std::path::PathBuf;

use clap::Subcommand;

use crate::config::Settings;
use crate::error::{BudgetError, BudgetResult};
use crate::export::{export_report, ExportFormat};
use crate::models::{
    DepartmentSpendingParams, ReportId, ReportKind, ReportParameters, TransactionHistoryParams,
};
use crate::reports::{format_terminal, ReportGenerator};
use crate::services::transaction::parse_date;
use crate::services::DepartmentService;
use crate::storage::{ReportStore, Storage};

use super::{match_prefix, output_writer};

/// Report subcommands
#[derive(Subcommand)]
pub enum ReportCommands {
    /// Generate and store a report
    Generate {
        /// Report type: department-spending or transaction-history
        report_type: String,
        /// Window start (YYYY-MM-DD), department-spending only
        #[arg(long)]
        start: Option<String>,
        /// Window end (YYYY-MM-DD), department-spending only
        #[arg(long)]
        end: Option<String>,
        /// Department name or ID, transaction-history only
        #[arg(short, long)]
        department: Option<String>,
        /// Category, transaction-history only
        #[arg(short, long)]
        category: Option<String>,
    },
    /// List stored reports, newest first
    List,
    /// Show a stored report
    Show {
        /// Report ID (a unique prefix is enough)
        id: String,
    },
    /// Export a stored report
    Export {
        /// Report ID (a unique prefix is enough)
        id: String,
        /// Output format: csv, json or yaml
        #[arg(short, long, default_value = "csv")]
        format: String,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn resolve_id(storage: &Storage, raw: &str) -> BudgetResult<ReportId> {
    if let Ok(id) = raw.parse::<ReportId>() {
        return Ok(id);
    }
    let prefix = raw.trim().strip_prefix("rpt-").unwrap_or(raw.trim());
    let ids = storage.reports.list()?.into_iter().map(|r| r.id);
    match_prefix(prefix, ids).ok_or_else(|| BudgetError::report_not_found(raw))
}

fn optional_date(raw: Option<String>) -> BudgetResult<Option<chrono::NaiveDate>> {
    raw.as_deref().map(parse_date).transpose()
}

/// Handle a report command
pub fn handle_report_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ReportCommands,
) -> BudgetResult<()> {
    let currency = settings.currency_symbol.as_str();

    match cmd {
        ReportCommands::Generate {
            report_type,
            start,
            end,
            department,
            category,
        } => {
            let kind: ReportKind = report_type.parse()?;
            let parameters = match kind {
                ReportKind::DepartmentSpending => {
                    ReportParameters::DepartmentSpending(DepartmentSpendingParams {
                        start_date: optional_date(start)?,
                        end_date: optional_date(end)?,
                    })
                }
                ReportKind::TransactionHistory => {
                    let department_id = match department {
                        Some(d) => Some(DepartmentService::new(storage).resolve(&d)?.id),
                        None => None,
                    };
                    ReportParameters::TransactionHistory(TransactionHistoryParams {
                        department_id,
                        category: category.filter(|c| !c.trim().is_empty()),
                    })
                }
            };

            let report = ReportGenerator::new(storage).generate_from(parameters)?;
            print!("{}", format_terminal(&report, currency));
            println!();
            println!("Saved as {}", report.id.short());
        }

        ReportCommands::List => {
            let reports = storage.reports.list()?;
            if reports.is_empty() {
                println!("No reports found.");
                return Ok(());
            }
            println!("{:<14}  {:<22}  {}", "ID", "Type", "Created");
            println!("{:-<14}  {:-<22}  {:-<19}", "", "", "");
            for report in reports {
                println!(
                    "{:<14}  {:<22}  {}",
                    report.id.short(),
                    report.kind.as_str(),
                    report.created_at.format("%Y-%m-%d %H:%M:%S")
                );
            }
        }

        ReportCommands::Show { id } => {
            let report = storage.reports.get(resolve_id(storage, &id)?)?;
            print!("{}", format_terminal(&report, currency));
        }

        ReportCommands::Export { id, format, output } => {
            let format: ExportFormat = format.parse()?;
            let report = storage.reports.get(resolve_id(storage, &id)?)?;

            let mut writer = output_writer(output.as_deref())?;
            export_report(&report, format, &mut writer)?;
            writer.flush()?;

            if let Some(path) = output {
                println!("Exported {} to {}", report.id.short(), path.display());
            }
        }
    }

    Ok(())
}
