use clap::{Args, ValueEnum};
use serde_json::Value;

use asset_revenue_core::model::{Granularity, Period};
use asset_revenue_core::scenarios::StressScenario;

use super::{BasisArg, PortfolioArgs};

/// Arguments for a single revenue breakdown
#[derive(Args)]
pub struct RevenueArgs {
    #[command(flatten)]
    pub portfolio: PortfolioArgs,
    /// Asset id
    #[arg(long)]
    pub asset: String,
    /// Year, YYYY-Qn or YYYY-MM
    #[arg(long)]
    pub period: String,
    /// Named stress (base, worst, volume, price)
    #[arg(long, default_value = "base")]
    pub scenario: StressScenario,
    #[arg(long, value_enum, default_value_t = BasisArg::Nominal)]
    pub basis: BasisArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum GranularityArg {
    Yearly,
    Quarterly,
    Monthly,
}

/// Arguments for the portfolio time series
#[derive(Args)]
pub struct TimeSeriesArgs {
    #[command(flatten)]
    pub portfolio: PortfolioArgs,
    /// Override the granularity in the constants
    #[arg(long, value_enum)]
    pub granularity: Option<GranularityArg>,
    #[arg(long, value_enum, default_value_t = BasisArg::Nominal)]
    pub basis: BasisArg,
}

/// Arguments for a stress comparison
#[derive(Args)]
pub struct StressArgs {
    #[command(flatten)]
    pub portfolio: PortfolioArgs,
    /// Asset id
    #[arg(long)]
    pub asset: String,
    #[arg(long)]
    pub year: i32,
    #[arg(long, value_enum, default_value_t = BasisArg::Nominal)]
    pub basis: BasisArg,
}

pub fn run_revenue(args: RevenueArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let portfolio = args.portfolio.load("revenue breakdown")?;
    let period = Period::parse(&args.period)
        .ok_or_else(|| {
            format!(
                "unrecognised period '{}' (expected YYYY, YYYY-Qn or YYYY-MM)",
                args.period
            )
        })?;
    let result =
        portfolio.revenue_breakdown(&args.asset, &period, args.scenario, args.basis.into())?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_time_series(args: TimeSeriesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut portfolio = args.portfolio.load("time series")?;
    if let Some(g) = args.granularity {
        portfolio.constants.granularity = match g {
            GranularityArg::Yearly => Granularity::Yearly,
            GranularityArg::Quarterly => Granularity::Quarterly,
            GranularityArg::Monthly => Granularity::Monthly,
        };
    }
    let result = portfolio.time_series(args.basis.into())?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_stress(args: StressArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let portfolio = args.portfolio.load("stress comparison")?;
    let result = portfolio.stress_comparison(&args.asset, args.year, args.basis.into())?;
    Ok(serde_json::to_value(result)?)
}
