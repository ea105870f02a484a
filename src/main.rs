use anyhow::Result;
use clap::{Parser, Subcommand};
use client_count::analyzer::{ClientCountAnalyzer, FilterOptions, FilterSource};
use client_count::config::Config;
use client_count::date_window::MonthSelection;
use client_count::filters::{FilterDimension, FilterSelection};
use client_count::logging;
use std::path::PathBuf;
use std::process;
use tracing::{error, info, Instrument};

#[derive(Parser)]
#[command(name = "client-count")]
#[command(about = "Aggregate and filter a secrets cluster's client activity log")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Billing period totals, per-namespace counts and upgrade warnings
    Summary {
        /// Activity response JSON file
        activity: PathBuf,
        /// Version history JSON file
        #[arg(long)]
        versions: Option<PathBuf>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Per-month client counts, optionally for one namespace or mount
    Months {
        /// Activity response JSON file
        activity: PathBuf,
        /// Namespace label (`root` for the root namespace)
        #[arg(long)]
        namespace: Option<String>,
        /// Mount path within the namespace
        #[arg(long, requires = "namespace")]
        mount: Option<String>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Filter dropdown values, stale selection alerts and search
    Filters {
        /// Per-client export (JSON array or JSON lines)
        #[arg(long, conflicts_with = "activity", required_unless_present = "activity")]
        export: Option<PathBuf>,
        /// Activity response JSON file, filters derived from its mounts
        #[arg(long)]
        activity: Option<PathBuf>,
        /// Selected namespace
        #[arg(long)]
        namespace_path: Option<String>,
        /// Selected mount path
        #[arg(long)]
        mount_path: Option<String>,
        /// Selected mount type
        #[arg(long)]
        mount_type: Option<String>,
        /// Selected month (ISO timestamp)
        #[arg(long)]
        month: Option<String>,
        /// Explicit month options, replacing those derived from the data
        #[arg(long, value_delimiter = ',')]
        months: Option<Vec<String>>,
        /// Search query for a dropdown
        #[arg(long)]
        search: Option<String>,
        /// Dropdown searched by --search
        #[arg(long, default_value = "namespace")]
        dimension: FilterDimension,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Unix start and end boundaries of a calendar month
    Window {
        #[arg(long)]
        year: i32,
        /// Month number, 1-12
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: u32,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    fn json(&self) -> bool {
        match self {
            Commands::Summary { json, .. }
            | Commands::Months { json, .. }
            | Commands::Filters { json, .. }
            | Commands::Window { json, .. } => *json,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let json = cli.command.json();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => handle_error(e, json),
    };
    let log_guard = logging::init_logging(&config);
    if let Some(path) = &config.source {
        info!(config_file = %path.display(), "Loaded configuration from file");
    }

    let run_id = logging::new_run_id();
    let span = tracing::info_span!("client_count", run_id = %run_id);

    let result = run(cli.command, &config).instrument(span).await;
    if let Err(e) = &result {
        error!(error = %format!("{:#}", e), "Command failed");
    }
    // process::exit skips destructors; flush file logs first
    drop(log_guard);

    match result {
        Ok(()) => Ok(()),
        Err(e) => handle_error(e, json),
    }
}

async fn run(command: Commands, config: &Config) -> Result<()> {
    let analyzer = ClientCountAnalyzer::new(config);

    match command {
        Commands::Summary { activity, versions, json } => {
            analyzer.run_summary(&activity, versions.as_deref(), json).await
        }
        Commands::Months { activity, namespace, mount, json } => {
            analyzer
                .run_months(&activity, namespace.as_deref(), mount.as_deref(), json)
                .await
        }
        Commands::Filters {
            export,
            activity,
            namespace_path,
            mount_path,
            mount_type,
            month,
            months,
            search,
            dimension,
            json,
        } => {
            let source = match (export, activity) {
                (Some(export), _) => FilterSource::Export(export),
                (None, Some(activity)) => FilterSource::Activity(activity),
                (None, None) => anyhow::bail!("Either --export or --activity is required"),
            };
            let options = FilterOptions {
                selection: FilterSelection {
                    namespace_path,
                    mount_path,
                    mount_type,
                    month,
                },
                search: search.map(|query| (dimension, query)),
                months,
            };
            analyzer.run_filters(&source, options, json).await
        }
        Commands::Window { year, month, json } => {
            analyzer.run_window(MonthSelection::new(year, month - 1), json)
        }
    }
}

fn handle_error(e: anyhow::Error, json: bool) -> ! {
    if json {
        println!("{}", serde_json::json!({ "error": format!("{:#}", e) }));
    } else {
        eprintln!("Error: {:#}", e);
    }
    process::exit(1);
}
