use clap::Args;
use serde_json::Value;

use asset_revenue_core::defaults;
use asset_revenue_core::monte_carlo::SimulationConfig;

use super::{BasisArg, PortfolioArgs};

/// Simulation controls shared by `scenarios` and `risk`
#[derive(Args)]
pub struct SimulationArgs {
    /// Draws per asset-year
    #[arg(long, default_value_t = defaults::MONTE_CARLO_ITERATIONS)]
    pub iterations: u32,
    /// Seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long, value_enum, default_value_t = BasisArg::Nominal)]
    pub basis: BasisArg,
}

impl SimulationArgs {
    fn config(&self) -> SimulationConfig {
        SimulationConfig {
            iterations: self.iterations,
            seed: self.seed,
            price_basis: self.basis.into(),
        }
    }
}

/// Arguments for raw scenario generation
#[derive(Args)]
pub struct ScenariosArgs {
    #[command(flatten)]
    pub portfolio: PortfolioArgs,
    #[command(flatten)]
    pub simulation: SimulationArgs,
}

/// Arguments for percentile statistics
#[derive(Args)]
pub struct RiskArgs {
    #[command(flatten)]
    pub portfolio: PortfolioArgs,
    #[command(flatten)]
    pub simulation: SimulationArgs,
    /// Year to summarise
    #[arg(long)]
    pub year: i32,
    /// Restrict to one asset
    #[arg(long)]
    pub asset: Option<String>,
}

pub fn run_scenarios(args: ScenariosArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let portfolio = args.portfolio.load("scenario generation")?;
    let result = portfolio.scenarios(&args.simulation.config())?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_risk(args: RiskArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let portfolio = args.portfolio.load("risk statistics")?;
    let result =
        portfolio.risk_statistics(&args.simulation.config(), args.year, args.asset.as_deref())?;
    Ok(serde_json::to_value(result)?)
}
