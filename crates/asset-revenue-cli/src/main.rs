mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use commands::revenue::{RevenueArgs, StressArgs, TimeSeriesArgs};
use commands::risk::{RiskArgs, ScenariosArgs};
use commands::valuation::NpvArgs;

/// Revenue allocation, risk and valuation for generation portfolios
#[derive(Parser)]
#[command(
    name = "arv",
    version,
    about = "Revenue allocation, risk and valuation for generation portfolios",
    long_about = "Splits asset revenue between contracts and the merchant market, \
                  stresses and simulates it, and values the resulting cash flows. \
                  Reads a portfolio (constants, assets, prices) as JSON or YAML \
                  from --input or stdin."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log filter when ARV_LOG is unset (e.g. "info", "asset_revenue_core=debug")
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Revenue breakdown for one asset and period
    Revenue(RevenueArgs),
    /// Portfolio revenue across the analysis window
    Timeseries(TimeSeriesArgs),
    /// Compare named stresses for one asset-year
    Stress(StressArgs),
    /// Generate raw Monte Carlo scenarios
    Scenarios(ScenariosArgs),
    /// P90/P50/P10 revenue-at-risk for one year
    Risk(RiskArgs),
    /// 30-year NPV projection
    Npv(NpvArgs),
    /// Print the defaults applied to missing inputs
    Defaults,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("ARV_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Revenue(args) => commands::revenue::run_revenue(args),
        Commands::Timeseries(args) => commands::revenue::run_time_series(args),
        Commands::Stress(args) => commands::revenue::run_stress(args),
        Commands::Scenarios(args) => commands::risk::run_scenarios(args),
        Commands::Risk(args) => commands::risk::run_risk(args),
        Commands::Npv(args) => commands::valuation::run_npv(args),
        Commands::Defaults => commands::run_defaults(),
        Commands::Version => {
            println!("arv {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
