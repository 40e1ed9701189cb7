use serde::{Deserialize, Serialize};
use tracing::warn;

use super::generation::{degradation_factor, period_generation};
use crate::defaults;
use crate::model::{Asset, Constants, Contract, ContractKind, Period};
use crate::pricing::PriceProvider;
use crate::time_value::{escalate_forecast_price, indexation_factor};
use crate::types::{Commodity, Technology};

const MILLION: f64 = 1_000_000.0;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Whether merchant prices stay in real terms or are escalated to nominal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceBasis {
    Real,
    #[default]
    Nominal,
}

/// How one active contract was priced and what it earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractAllocation {
    pub contract_id: String,
    pub kind: ContractKind,
    pub buyer_pct: f64,
    pub indexation_factor: f64,
    /// Effective green price after indexation and floor ($/MWh).
    pub green_price: f64,
    /// Effective black price after indexation and floor ($/MWh). For a
    /// fixed-revenue contract, the indexed annual amount ($M).
    pub black_price: f64,
    /// $M
    pub green_revenue: f64,
    /// $M
    pub black_revenue: f64,
}

/// Contracted and merchant revenue for one asset in one period.
///
/// Revenue figures are in millions of currency; generation is MWh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueBreakdown {
    pub asset_id: String,
    pub period: Period,
    pub generation_mwh: f64,
    pub contracted_green: f64,
    pub contracted_black: f64,
    pub merchant_green: f64,
    pub merchant_black: f64,
    pub total: f64,
    /// Cumulative buyer share across active contracts. May exceed 100.
    pub green_contracted_pct: f64,
    pub black_contracted_pct: f64,
    /// `max(0, 100 - contracted)`
    pub green_merchant_pct: f64,
    pub black_merchant_pct: f64,
    /// Market prices used for the merchant share ($/MWh).
    pub merchant_green_price: f64,
    pub merchant_black_price: f64,
    /// Set when either commodity is contracted beyond 100%.
    pub over_contracted: bool,
    pub contracts: Vec<ContractAllocation>,
}

impl RevenueBreakdown {
    pub fn contracted(&self) -> f64 {
        self.contracted_green + self.contracted_black
    }

    pub fn merchant(&self) -> f64 {
        self.merchant_green + self.merchant_black
    }

    /// Recompute `total` from the four buckets.
    pub(crate) fn retotal(&mut self) {
        self.total = self.contracted_green
            + self.contracted_black
            + self.merchant_green
            + self.merchant_black;
    }
}

// ---------------------------------------------------------------------------
// Price adjustments
// ---------------------------------------------------------------------------

/// Raise a single-commodity price to its floor.
pub fn apply_floor(price: f64, floor: Option<f64>) -> f64 {
    match floor {
        Some(f) if price < f => f,
        _ => price,
    }
}

/// Lift a bundled (green, black) pair so it sums to the floor.
///
/// Both components scale by the same factor, preserving their ratio. A pair
/// that is entirely zero splits the floor evenly.
pub fn apply_bundled_floor(green: f64, black: f64, floor: Option<f64>) -> (f64, f64) {
    let Some(floor) = floor else {
        return (green, black);
    };
    let sum = green + black;
    if sum >= floor {
        return (green, black);
    }
    if sum > 0.0 {
        let scale = floor / sum;
        (green * scale, black * scale)
    } else {
        (floor / 2.0, floor / 2.0)
    }
}

/// Market price for one commodity, escalated when asked for nominal terms.
pub fn merchant_price(
    technology: Technology,
    commodity: Commodity,
    region: &str,
    period: &Period,
    constants: &Constants,
    provider: &dyn PriceProvider,
    basis: PriceBasis,
) -> f64 {
    let real = provider
        .price(technology, commodity, region, period)
        .filter(|p| p.is_finite())
        .unwrap_or(defaults::PRICE);
    match basis {
        PriceBasis::Real => real,
        PriceBasis::Nominal => escalate_forecast_price(
            real,
            constants.escalation_pct,
            period.year,
            constants.reference_year(),
            constants.forecast_start_year,
        ),
    }
}

// ---------------------------------------------------------------------------
// Waterfall
// ---------------------------------------------------------------------------

fn volume_revenue(generation: f64, pct: f64, price: f64) -> f64 {
    generation * pct / 100.0 * price / MILLION
}

fn allocate_contract(
    contract: &Contract,
    asset: &Asset,
    period: &Period,
    generation: f64,
    constants: &Constants,
) -> ContractAllocation {
    let index = indexation_factor(contract.indexation_pct, contract.years_since_start(period.year));
    let pct = contract.buyer_pct;

    let (green_price, black_price, green_revenue, black_revenue) = match contract.kind {
        ContractKind::FixedRevenue => {
            let amount = contract.strike_price * index;
            let degradation = degradation_factor(asset, period.year, constants);
            let revenue = amount * period.fraction() * degradation;
            (0.0, amount, 0.0, revenue)
        }
        ContractKind::Bundled => {
            let (g, b) = apply_bundled_floor(
                contract.green_price * index,
                contract.black_price * index,
                contract.floor_price,
            );
            (g, b, volume_revenue(generation, pct, g), volume_revenue(generation, pct, b))
        }
        ContractKind::Green => {
            let g = apply_floor(contract.strike_price * index, contract.floor_price);
            (g, 0.0, volume_revenue(generation, pct, g), 0.0)
        }
        ContractKind::Black => {
            let b = apply_floor(contract.strike_price * index, contract.floor_price);
            (0.0, b, 0.0, volume_revenue(generation, pct, b))
        }
    };

    ContractAllocation {
        contract_id: contract.id.clone(),
        kind: contract.kind,
        buyer_pct: pct,
        indexation_factor: index,
        green_price,
        black_price,
        green_revenue,
        black_revenue,
    }
}

/// Split one asset's output in `period` between its contracts and the market.
///
/// Never fails: missing prices, capacity factors and contract fields all
/// contribute zero. Contract shares above 100% are kept as given and the
/// merchant share floors at zero.
pub fn calculate_revenue(
    asset: &Asset,
    period: &Period,
    constants: &Constants,
    provider: &dyn PriceProvider,
    basis: PriceBasis,
) -> RevenueBreakdown {
    let generation = period_generation(asset, period, constants);

    let mut contracted_green = 0.0;
    let mut contracted_black = 0.0;
    let mut green_pct = 0.0;
    let mut black_pct = 0.0;
    let mut contracts = Vec::new();

    for contract in asset.active_contracts(period.year) {
        let line = allocate_contract(contract, asset, period, generation, constants);
        match contract.kind {
            ContractKind::Bundled => {
                green_pct += line.buyer_pct;
                black_pct += line.buyer_pct;
            }
            ContractKind::Green => green_pct += line.buyer_pct,
            ContractKind::Black | ContractKind::FixedRevenue => black_pct += line.buyer_pct,
        }
        contracted_green += line.green_revenue;
        contracted_black += line.black_revenue;
        contracts.push(line);
    }

    let over_contracted = green_pct > 100.0 || black_pct > 100.0;
    if over_contracted {
        warn!(
            asset = %asset.id,
            period = %period,
            green_pct,
            black_pct,
            "contracted share exceeds 100%; merchant share floored at zero"
        );
    }

    let green_merchant_pct = (100.0 - green_pct).max(0.0);
    let black_merchant_pct = (100.0 - black_pct).max(0.0);

    let market = |commodity| {
        merchant_price(
            asset.technology,
            commodity,
            &asset.region,
            period,
            constants,
            provider,
            basis,
        )
    };
    let green_price = market(Commodity::Green);
    let black_price = market(Commodity::Black);

    let mut breakdown = RevenueBreakdown {
        asset_id: asset.id.clone(),
        period: *period,
        generation_mwh: generation,
        contracted_green,
        contracted_black,
        merchant_green: volume_revenue(generation, green_merchant_pct, green_price),
        merchant_black: volume_revenue(generation, black_merchant_pct, black_price),
        total: 0.0,
        green_contracted_pct: green_pct,
        black_contracted_pct: black_pct,
        green_merchant_pct,
        black_merchant_pct,
        merchant_green_price: green_price,
        merchant_black_price: black_price,
        over_contracted,
        contracts,
    };
    breakdown.retotal();
    breakdown
}

/// [`calculate_revenue`] for a whole year.
pub fn annual_revenue(
    asset: &Asset,
    year: i32,
    constants: &Constants,
    provider: &dyn PriceProvider,
    basis: PriceBasis,
) -> RevenueBreakdown {
    calculate_revenue(asset, &Period::year(year), constants, provider, basis)
}
