//! CLI entry point for the YKR job-accessibility tool.
//!
//! Provides subcommands for aggregating travel-time files into per-cell
//! accessibility metrics, reporting their correlation with unemployment, and
//! inspecting the travel-time directory.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use ykr_access::{
    config::AccessibilityConfig,
    grid::GridStore,
    manifest::Manifest,
    pipeline::{AggregateOptions, run_aggregation},
    reporter,
};

#[derive(Parser)]
#[command(name = "ykr_access")]
#[command(about = "Job accessibility versus unemployment on the YKR grid", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Config file shared by every subcommand that reads the grid store.
#[derive(Args)]
struct ConfigArgs {
    /// JSON config file; missing fields use built-in defaults
    #[arg(short, long)]
    config: Option<String>,
}

impl ConfigArgs {
    fn load(&self) -> Result<AccessibilityConfig> {
        match &self.config {
            Some(path) => AccessibilityConfig::load(path),
            None => Ok(AccessibilityConfig::default()),
        }
    }
}

#[derive(Args)]
struct AggregateArgs {
    /// GeoJSON grid store with demographic properties
    #[arg(short, long)]
    grid: String,

    /// Directory tree of per-destination travel-time files
    #[arg(short, long)]
    travel_times: PathBuf,

    /// Directory to write enriched grids to
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Maximum number of travel-time files parsed concurrently
    #[arg(long, default_value_t = 1)]
    concurrency: usize,

    /// Also write the accessibility table as CSV
    #[arg(long, default_value_t = false)]
    csv: bool,

    /// Time budget in minutes (overrides the config file)
    #[arg(long)]
    time_budget: Option<f64>,

    /// Travel-time file delimiter (overrides the config file)
    #[arg(long)]
    delimiter: Option<char>,

    #[command(flatten)]
    config: ConfigArgs,
}

impl AggregateArgs {
    /// The config file with command-line overrides applied.
    fn resolve_config(&self) -> Result<AccessibilityConfig> {
        let mut config = self.config.load()?;
        if let Some(time_budget) = self.time_budget {
            config.time_budget = time_budget;
        }
        if let Some(delimiter) = self.delimiter {
            config.delimiter = delimiter;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compute per-cell accessibility and write full and filtered grids
    Aggregate(AggregateArgs),
    /// Correlate accessibility with unemployment on an enriched grid
    Report {
        /// Enriched GeoJSON grid produced by `aggregate`
        #[arg(short, long)]
        grid: String,

        /// Directory to write the report and plot to
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Aggregate, then report on the filtered grid
    Run(AggregateArgs),
    /// List the travel-time files found for each destination cell
    Manifest {
        /// Directory tree of per-destination travel-time files
        #[arg(short, long)]
        travel_times: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/ykr_access.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("ykr_access.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Aggregate(args) => {
            aggregate(&args).await?;
        }
        Commands::Report {
            grid,
            output_dir,
            config,
        } => {
            let config = config.load()?;
            let filtered = GridStore::load(&grid, &config)?.filtered()?;
            info!(cells = filtered.len(), "Population-filtered grid ready");
            reporter::report(&filtered, &output_dir, None)?;
        }
        Commands::Run(args) => {
            let output = aggregate(&args).await?;
            reporter::report(&output.filtered, &args.output_dir, Some(output.summary))?;
        }
        Commands::Manifest { travel_times } => {
            let manifest = Manifest::from_dir(&travel_times)?;
            for entry in manifest.entries() {
                info!(cell_id = entry.cell_id, path = %entry.path.display(), "Travel-time file");
            }
            info!(total = manifest.len(), "Manifest built");
        }
    }

    Ok(())
}

async fn aggregate(args: &AggregateArgs) -> Result<ykr_access::pipeline::AggregateOutput> {
    let config = args.resolve_config()?;
    let options = AggregateOptions {
        concurrency: args.concurrency,
        write_csv: args.csv,
    };
    info!(
        time_budget = config.time_budget,
        concurrency = options.concurrency,
        "Starting aggregation"
    );
    run_aggregation(&args.grid, &args.travel_times, &args.output_dir, &config, &options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_aggregate_overrides_apply() {
        let cli = Cli::try_parse_from([
            "ykr_access",
            "aggregate",
            "--grid",
            "grid.geojson",
            "--travel-times",
            "tt",
            "--time-budget",
            "15",
            "--delimiter",
            ",",
        ])
        .unwrap();
        let Commands::Aggregate(args) = cli.command else {
            panic!("expected aggregate");
        };

        let config = args.resolve_config().unwrap();

        assert_eq!(config.time_budget, 15.0);
        assert_eq!(config.delimiter, ',');
    }

    #[test]
    fn test_aggregate_rejects_invalid_override() {
        let cli = Cli::try_parse_from([
            "ykr_access",
            "aggregate",
            "--grid",
            "grid.geojson",
            "--travel-times",
            "tt",
            "--time-budget",
            "0",
        ])
        .unwrap();
        let Commands::Aggregate(args) = cli.command else {
            panic!("expected aggregate");
        };

        assert!(args.resolve_config().is_err());
    }

    #[test]
    fn test_report_takes_no_aggregation_overrides() {
        for flag in ["--time-budget", "--delimiter"] {
            let result = Cli::try_parse_from([
                "ykr_access",
                "report",
                "--grid",
                "grid.geojson",
                flag,
                "15",
            ]);
            assert!(result.is_err(), "{flag} accepted by report");
        }

        let cli = Cli::try_parse_from(["ykr_access", "report", "--grid", "grid.geojson"]).unwrap();
        assert!(matches!(cli.command, Commands::Report { .. }));
    }
}
