//! Analytics CLI command

use std::io::Write;
use std::path::PathBuf;

use clap::Args;

use crate::config::Settings;
use crate::display::format_analytics;
use crate::error::BudgetResult;
use crate::export::export_budget_analysis_csv;
use crate::services::AnalyticsService;
use crate::storage::Storage;

use super::output_writer;

#[derive(Args)]
pub struct AnalyticsArgs {
    /// Write the budget analysis as CSV instead of a summary
    #[arg(long)]
    pub csv: bool,
    /// Output file for --csv (stdout when omitted)
    #[arg(short, long, requires = "csv")]
    pub output: Option<PathBuf>,
}

/// Handle the analytics command
pub fn handle_analytics_command(
    storage: &Storage,
    settings: &Settings,
    args: AnalyticsArgs,
) -> BudgetResult<()> {
    let summary = AnalyticsService::new(storage, settings.currency_symbol.as_str()).summary()?;

    if !args.csv {
        print!("{}", format_analytics(&summary, &settings.currency_symbol));
        return Ok(());
    }

    let mut writer = output_writer(args.output.as_deref())?;
    export_budget_analysis_csv(&summary, &mut writer)?;
    writer.flush()?;
    if let Some(path) = args.output {
        println!("Exported budget analysis to {}", path.display());
    }
    Ok(())
}
