use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use asset_revenue_core::scenarios::StressScenario;
use asset_revenue_core::valuation::NpvOptions;

use super::{BasisArg, PortfolioArgs};

/// Arguments for the NPV projection
#[derive(Args)]
pub struct NpvArgs {
    #[command(flatten)]
    pub portfolio: PortfolioArgs,
    /// Named stress applied to every year's revenue
    #[arg(long, default_value = "base")]
    pub scenario: StressScenario,
    /// Restrict to one asset
    #[arg(long)]
    pub asset: Option<String>,
    /// Override the contract discount rate (decimal, e.g. 0.07)
    #[arg(long)]
    pub contract_rate: Option<Decimal>,
    /// Override the merchant discount rate (decimal, e.g. 0.11)
    #[arg(long)]
    pub merchant_rate: Option<Decimal>,
    #[arg(long, value_enum, default_value_t = BasisArg::Nominal)]
    pub basis: BasisArg,
}

pub fn run_npv(args: NpvArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut portfolio = args.portfolio.load("NPV")?;
    if let Some(rate) = args.contract_rate {
        portfolio.constants.discount_rates.contract = rate;
    }
    if let Some(rate) = args.merchant_rate {
        portfolio.constants.discount_rates.merchant = rate;
    }

    let options = NpvOptions {
        scenario: args.scenario,
        asset_id: args.asset,
        price_basis: args.basis.into(),
    };
    let result = portfolio.npv(&options)?;
    Ok(serde_json::to_value(result)?)
}
