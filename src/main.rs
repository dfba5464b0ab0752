use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use globalbudget::api::{self, AppState};
use globalbudget::cli::{
    handle_analytics_command, handle_department_command, handle_report_command,
    handle_transaction_command, AnalyticsArgs, DepartmentCommands, ReportCommands,
    TransactionCommands,
};
use globalbudget::config::{BudgetPaths, Settings, DATA_DIR_ENV};
use globalbudget::logging::init_tracing;
use globalbudget::storage::{initialize_storage, seed_sample_data, Storage};

#[derive(Parser)]
#[command(
    name = "globalbudget",
    version,
    about = "Department budget tracking with spending reports and analytics",
    long_about = "GlobalBudget tracks department budgets and the transactions \
                  recorded against them. It serves a JSON API and offers the \
                  same operations from the command line."
)]
struct Cli {
    /// Data directory (overrides the default location)
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Address to bind (defaults to the configured bind_address)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Initialize the data directory
    Init {
        /// Also create sample departments
        #[arg(long)]
        seed: bool,
    },

    /// Show current configuration and paths
    Config,

    /// Department management commands
    #[command(subcommand, alias = "dept")]
    Department(DepartmentCommands),

    /// Transaction management commands
    #[command(subcommand, alias = "txn")]
    Transaction(TransactionCommands),

    /// Report generation and export
    #[command(subcommand)]
    Report(ReportCommands),

    /// Portfolio summary and insights
    Analytics(AnalyticsArgs),
}

fn run_server(storage: Storage, mut settings: Settings, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        settings.bind_address = host;
    }
    if let Some(port) = port {
        settings.port = port;
    }
    let address = settings.listen_address();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let state = AppState::new(Arc::new(storage), settings);
    runtime
        .block_on(api::serve(state, &address))
        .with_context(|| format!("server on {} failed", address))?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = match cli.data_dir {
        Some(dir) => BudgetPaths::with_base_dir(dir),
        None => BudgetPaths::new()?,
    };
    let settings = Settings::load_or_create(&paths)?;

    // The server logs at the configured level; one-shot commands only warn.
    let directive = match cli.command {
        Some(Commands::Serve { .. }) => settings.log_filter.as_str(),
        _ => "globalbudget=warn",
    };
    init_tracing(directive);

    let storage = Storage::open(paths.clone())
        .with_context(|| format!("failed to open data at {}", paths.base_dir().display()))?;

    match cli.command {
        Some(Commands::Serve { host, port }) => {
            return run_server(storage, settings, host, port);
        }
        Some(Commands::Init { seed }) => {
            println!("Initializing GlobalBudget at: {}", paths.base_dir().display());
            initialize_storage(&paths)?;
            if seed {
                let created = seed_sample_data(&storage)?;
                println!("Created {} sample department(s).", created);
            }
            println!("Initialization complete!");
            println!();
            println!("Run 'globalbudget department list' to see departments.");
            println!("Run 'globalbudget serve' to start the API server.");
        }
        Some(Commands::Config) => {
            println!("GlobalBudget Configuration");
            println!("==========================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Data directory: {}", paths.data_dir().display());
            println!("Settings file:  {}", paths.settings_file().display());
            println!("Audit log:      {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Listen address:    {}", settings.listen_address());
            println!("  Log filter:        {}", settings.log_filter);
            println!("  Default page size: {}", settings.default_page_size);
            println!("  Currency symbol:   {}", settings.currency_symbol);
        }
        Some(Commands::Department(cmd)) => handle_department_command(&storage, &settings, cmd)?,
        Some(Commands::Transaction(cmd)) => handle_transaction_command(&storage, &settings, cmd)?,
        Some(Commands::Report(cmd)) => handle_report_command(&storage, &settings, cmd)?,
        Some(Commands::Analytics(args)) => handle_analytics_command(&storage, &settings, args)?,
        None => {
            println!("GlobalBudget - department budget tracking");
            println!();
            println!("Run 'globalbudget --help' for usage information.");
            println!("Run 'globalbudget serve' to start the API server.");
        }
    }

    storage.close()?;
    Ok(())
}
