use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

use crate::defaults;
use crate::error::RevenueError;
use crate::model::{Asset, Constants, DiscountRates};
use crate::pricing::PriceProvider;
use crate::revenue::{annual_revenue, PriceBasis};
use crate::scenarios::{apply_stress, StressScenario};
use crate::time_value::{checked_escalation, decimal_escalation, discount_factor};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::RevenueResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Projection options. Discount rates and cost inputs come from `Constants`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NpvOptions {
    #[serde(default)]
    pub scenario: StressScenario,
    /// Restrict the projection to one asset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(default)]
    pub price_basis: PriceBasis,
}

/// One projection year. Amounts in millions of currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpvRow {
    pub year: i32,
    pub year_index: u32,
    pub contract_revenue: Money,
    pub merchant_revenue: Money,
    pub total_revenue: Money,
    pub fixed_costs: Money,
    pub variable_costs: Money,
    /// Non-zero only in the final projection year.
    pub terminal_value: Money,
    /// Revenue less fixed and variable costs; excludes terminal value.
    pub net_cash_flow: Money,
    pub weighted_rate: Rate,
    pub discount_factor: Decimal,
    pub present_value: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpvOutput {
    pub scenario: StressScenario,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    pub rows: Vec<NpvRow>,
    pub total_npv: Money,
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

fn to_money(value: f64) -> Money {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Blend contract and merchant rates by revenue mix. With no revenue the
/// two rates are weighted evenly.
pub fn weighted_discount_rate(rates: &DiscountRates, contract: Money, merchant: Money) -> Rate {
    let total = contract.saturating_add(merchant);
    let weights = if total.is_zero() {
        None
    } else {
        contract.checked_div(total).zip(merchant.checked_div(total))
    };
    let (contract_weight, merchant_weight) = weights.unwrap_or_else(|| {
        let even = to_money(defaults::REVENUE_MIX_FALLBACK_WEIGHT);
        (even, Decimal::ONE - even)
    });
    rates
        .contract
        .saturating_mul(contract_weight)
        .saturating_add(rates.merchant.saturating_mul(merchant_weight))
}

/// Build the yearly cash-flow rows from the analysis start year.
///
/// Each year includes every selected asset commissioned in or before it.
/// Costs escalate from the first projection year; the discount exponent is
/// `year_index + 1` (end-of-year cash flows). Amounts saturate at the
/// `Decimal` bounds rather than overflow.
pub fn project_cash_flows(
    assets: &[&Asset],
    constants: &Constants,
    provider: &dyn PriceProvider,
    options: &NpvOptions,
) -> Vec<NpvRow> {
    let horizon = defaults::NPV_HORIZON_YEARS;
    let last_index = horizon - 1;
    let mut rows = Vec::with_capacity(horizon as usize);

    for year_index in 0..horizon {
        let year = constants.analysis_start_year + year_index as i32;

        let mut contract_revenue = Decimal::ZERO;
        let mut merchant_revenue = Decimal::ZERO;
        let mut fixed_costs = Decimal::ZERO;
        let mut variable_costs = Decimal::ZERO;
        let mut terminal_value = Decimal::ZERO;

        for asset in assets.iter().filter(|a| a.start_year() <= year) {
            let base = annual_revenue(asset, year, constants, provider, options.price_basis);
            let stressed = apply_stress(&base, options.scenario, &constants.risk);
            contract_revenue = contract_revenue.saturating_add(to_money(stressed.contracted()));
            merchant_revenue = merchant_revenue.saturating_add(to_money(stressed.merchant()));

            let costs = constants.costs_for(&asset.id);
            let fixed = costs
                .fixed_cost
                .saturating_mul(decimal_escalation(costs.fixed_cost_escalation, year_index));
            let variable = costs
                .variable_cost_per_mw
                .saturating_mul(to_money(asset.capacity_mw))
                .saturating_mul(decimal_escalation(costs.variable_cost_escalation, year_index));
            fixed_costs = fixed_costs.saturating_add(fixed);
            variable_costs = variable_costs.saturating_add(variable);
            if year_index == last_index {
                terminal_value = terminal_value.saturating_add(costs.terminal_value);
            }
        }

        let total_revenue = contract_revenue.saturating_add(merchant_revenue);
        let net_cash_flow = total_revenue
            .saturating_sub(fixed_costs)
            .saturating_sub(variable_costs);
        let weighted_rate =
            weighted_discount_rate(&constants.discount_rates, contract_revenue, merchant_revenue);
        let df = discount_factor(weighted_rate, year_index + 1);

        rows.push(NpvRow {
            year,
            year_index,
            contract_revenue,
            merchant_revenue,
            total_revenue,
            fixed_costs,
            variable_costs,
            terminal_value,
            net_cash_flow,
            weighted_rate,
            discount_factor: df,
            present_value: net_cash_flow.saturating_add(terminal_value).saturating_mul(df),
        });
    }

    rows
}

/// 30-year NPV projection for the portfolio or a single asset.
pub fn calculate_npv(
    assets: &[Asset],
    constants: &Constants,
    provider: &dyn PriceProvider,
    options: &NpvOptions,
) -> RevenueResult<ComputationOutput<NpvOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let selected: Vec<&Asset> = match &options.asset_id {
        Some(id) => {
            let found: Vec<&Asset> = assets.iter().filter(|a| &a.id == id).collect();
            if found.is_empty() {
                return Err(RevenueError::UnknownAsset(id.clone()));
            }
            found
        }
        None => assets.iter().collect(),
    };

    let last_index = defaults::NPV_HORIZON_YEARS - 1;
    for asset in &selected {
        if !constants.asset_costs.contains_key(&asset.id) {
            warnings.push(format!(
                "No cost parameters for asset '{}'; costs default to zero",
                asset.id
            ));
        }
        let costs = constants.costs_for(&asset.id);
        let escalations = [costs.fixed_cost_escalation, costs.variable_cost_escalation];
        if escalations
            .iter()
            .any(|pct| checked_escalation(*pct, last_index).is_none())
        {
            warnings.push(format!(
                "Cost escalation for asset '{}' exceeds the decimal range; costs saturate",
                asset.id
            ));
        }
    }
    let rates = &constants.discount_rates;
    if rates.contract.is_zero() && rates.merchant.is_zero() {
        warnings.push(
            "Contract and merchant discount rates are both zero; NPV is undiscounted".into(),
        );
    }

    debug!(assets = selected.len(), scenario = %options.scenario, "projecting cash flows");
    let rows = project_cash_flows(&selected, constants, provider, options);
    let total_npv: Money = rows
        .iter()
        .fold(Decimal::ZERO, |acc, r| acc.saturating_add(r.present_value));

    if rows.iter().all(|r| r.total_revenue.is_zero()) {
        warnings.push("No revenue in any projection year".into());
    }
    if let Some(row) = rows.iter().find(|r| r.discount_factor.is_zero()) {
        warnings.push(format!(
            "Discount factor rounds to zero from {}; later cash flows carry no value",
            row.year
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    info!(total_npv = %total_npv, elapsed_us = elapsed, "npv complete");

    let output = NpvOutput {
        scenario: options.scenario,
        asset_id: options.asset_id.clone(),
        rows,
        total_npv,
    };

    Ok(with_metadata(
        "Revenue-mix weighted discounted cash flow (30 years, end-of-year)",
        &serde_json::json!({
            "start_year": constants.analysis_start_year,
            "horizon_years": defaults::NPV_HORIZON_YEARS,
            "contract_rate": rates.contract.to_string(),
            "merchant_rate": rates.merchant.to_string(),
            "scenario": options.scenario,
            "price_basis": options.price_basis,
        }),
        warnings,
        elapsed,
        output,
    ))
}
