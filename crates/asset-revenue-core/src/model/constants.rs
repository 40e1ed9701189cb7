use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::period::Granularity;
use crate::defaults::{self, lenient_decimal, lenient_f64, lenient_opt_f64};
use crate::types::{Money, Rate, Technology};

/// Capacity factor for one (technology, region) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityFactorEntry {
    pub technology: Technology,
    pub region: String,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub annual: Option<f64>,
    /// Q1..Q4; used for quarter-specific requests.
    #[serde(default)]
    pub quarterly: Option<[f64; 4]>,
}

/// Discount rates for the contracted and merchant shares of revenue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscountRates {
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub contract: Rate,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub merchant: Rate,
}

/// ± bounds (percent) for stress and Monte Carlo shocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskBounds {
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub volume_variation: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub green_price_variation: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub black_price_variation: Option<f64>,
    /// Legacy combined price bound, used when a commodity bound is unset.
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub price_variation: Option<f64>,
}

impl RiskBounds {
    pub fn volume(&self) -> f64 {
        self.volume_variation.unwrap_or(defaults::VARIATION_PCT)
    }

    pub fn green_price(&self) -> f64 {
        self.green_price_variation
            .or(self.price_variation)
            .unwrap_or(defaults::VARIATION_PCT)
    }

    pub fn black_price(&self) -> f64 {
        self.black_price_variation
            .or(self.price_variation)
            .unwrap_or(defaults::VARIATION_PCT)
    }
}

/// Project-finance terms carried through to the cost model. Not computed here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancingTerms {
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub gearing: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub interest_rate: Rate,
    #[serde(default)]
    pub tenor_years: u32,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub target_dscr: Decimal,
}

/// Per-asset cost inputs to the NPV projection (millions of currency).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetCosts {
    /// Annual fixed opex.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub fixed_cost: Money,
    /// Percent per year.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub fixed_cost_escalation: Decimal,
    /// Annual variable cost per MW of capacity.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub variable_cost_per_mw: Money,
    /// Percent per year.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub variable_cost_escalation: Decimal,
    /// Received in the final projection year.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub terminal_value: Money,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub capex: Money,
    #[serde(default)]
    pub financing: Option<FinancingTerms>,
}

/// Process-wide calculation parameters, passed explicitly to every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constants {
    pub analysis_start_year: i32,
    pub analysis_end_year: i32,
    #[serde(default)]
    pub granularity: Granularity,
    /// Real-to-nominal escalation, percent per year.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub escalation_pct: f64,
    /// Base year of real prices. Defaults to the analysis start year.
    #[serde(default)]
    pub reference_year: Option<i32>,
    /// First forecast year; earlier years are actuals and never escalated.
    #[serde(default)]
    pub forecast_start_year: Option<i32>,
    #[serde(default)]
    pub capacity_factors: Vec<CapacityFactorEntry>,
    /// Annual degradation defaults, percent.
    #[serde(default)]
    pub degradation_defaults: BTreeMap<Technology, f64>,
    #[serde(default)]
    pub discount_rates: DiscountRates,
    #[serde(default)]
    pub risk: RiskBounds,
    /// Keyed by asset id.
    #[serde(default)]
    pub asset_costs: BTreeMap<String, AssetCosts>,
}

impl Constants {
    /// Minimal constants for the given window; every table empty.
    pub fn new(analysis_start_year: i32, analysis_end_year: i32) -> Self {
        Constants {
            analysis_start_year,
            analysis_end_year,
            granularity: Granularity::default(),
            escalation_pct: defaults::ESCALATION_PCT,
            reference_year: None,
            forecast_start_year: None,
            capacity_factors: Vec::new(),
            degradation_defaults: BTreeMap::new(),
            discount_rates: DiscountRates::default(),
            risk: RiskBounds::default(),
            asset_costs: BTreeMap::new(),
        }
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year.unwrap_or(self.analysis_start_year)
    }

    /// Inclusive analysis years. Empty when the window is inverted.
    pub fn analysis_years(&self) -> std::ops::RangeInclusive<i32> {
        self.analysis_start_year..=self.analysis_end_year
    }

    pub fn capacity_factor_entry(
        &self,
        technology: Technology,
        region: &str,
    ) -> Option<&CapacityFactorEntry> {
        self.capacity_factors
            .iter()
            .find(|e| e.technology == technology && e.region.eq_ignore_ascii_case(region))
    }

    pub fn default_degradation(&self, technology: Technology) -> f64 {
        self.degradation_defaults
            .get(&technology)
            .copied()
            .unwrap_or(defaults::DEGRADATION_PCT)
    }

    pub fn costs_for(&self, asset_id: &str) -> AssetCosts {
        self.asset_costs.get(asset_id).cloned().unwrap_or_default()
    }
}
