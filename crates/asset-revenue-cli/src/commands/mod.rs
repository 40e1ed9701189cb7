pub mod revenue;
pub mod risk;
pub mod valuation;

use asset_revenue_core::defaults;
use asset_revenue_core::revenue::PriceBasis;
use asset_revenue_core::Portfolio;
use clap::{Args, ValueEnum};
use serde_json::Value;

use crate::input;

/// Where the portfolio document comes from.
#[derive(Args)]
pub struct PortfolioArgs {
    /// Path to a JSON or YAML portfolio file ({constants, assets, prices})
    #[arg(long)]
    pub input: Option<String>,
}

impl PortfolioArgs {
    pub fn load(&self, what: &str) -> Result<Portfolio, Box<dyn std::error::Error>> {
        input::read_input(self.input.as_deref(), what)
    }
}

/// Merchant price terms.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum BasisArg {
    Real,
    #[default]
    Nominal,
}

impl From<BasisArg> for PriceBasis {
    fn from(b: BasisArg) -> Self {
        match b {
            BasisArg::Real => PriceBasis::Real,
            BasisArg::Nominal => PriceBasis::Nominal,
        }
    }
}

pub fn run_defaults() -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(defaults::table())?)
}
