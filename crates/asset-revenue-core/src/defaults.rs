//! Central table of fallback values and defensive numeric coercion.
//!
//! The engine never fails on missing or malformed numeric data. Every value
//! that can be absent resolves through a constant defined here, so the same
//! fallback is used by generation, allocation, risk and valuation alike.
//!
//! Coercion rules for deserialized inputs:
//! - numbers pass through unchanged
//! - numeric strings (`"12.5"`, `" 40 "`) are parsed
//! - anything else (text, booleans, arrays, non-finite values) becomes `0`
//!   for required fields and `None` for optional ones, and `None` then
//!   resolves through this table.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Hours in a (non-leap) year; generation is annualised against this.
pub const HOURS_IN_YEAR: f64 = 8760.0;

/// Volume retained after losses, percent. Missing means no adjustment.
pub const VOLUME_LOSS_ADJUSTMENT_PCT: f64 = 100.0;

/// Annual degradation, percent, when neither the asset nor the
/// per-technology table supplies one.
pub const DEGRADATION_PCT: f64 = 0.0;

/// Capacity factor when no override or table entry resolves.
pub const CAPACITY_FACTOR: f64 = 0.0;

/// Unresolved market or contract price.
pub const PRICE: f64 = 0.0;

/// Contract indexation, percent per year.
pub const INDEXATION_PCT: f64 = 0.0;

/// Portfolio-wide real-to-nominal escalation, percent per year.
pub const ESCALATION_PCT: f64 = 0.0;

/// Risk variation bound, percent, when unset.
pub const VARIATION_PCT: f64 = 0.0;

/// Asset life in years; 0 means the asset never retires.
pub const ASSET_LIFE_YEARS: u32 = 0;

/// Monte Carlo draws per (asset, year).
pub const MONTE_CARLO_ITERATIONS: u32 = 1000;

/// Iterations per independently seeded Monte Carlo chunk.
pub const MONTE_CARLO_CHUNK_SIZE: u32 = 100;

/// Equal-width bins in a revenue histogram.
pub const HISTOGRAM_BINS: usize = 20;

/// Length of the NPV projection.
pub const NPV_HORIZON_YEARS: u32 = 30;

/// Weight given to each of contract and merchant discount rates when a
/// year has no revenue to weight by.
pub const REVENUE_MIX_FALLBACK_WEIGHT: f64 = 0.5;

/// One row of the auditable defaults table.
#[derive(Debug, Clone, Serialize)]
pub struct DefaultEntry {
    pub parameter: &'static str,
    pub value: f64,
    pub applies_when: &'static str,
}

/// Every fallback the engine applies, for display and audit.
pub fn table() -> Vec<DefaultEntry> {
    vec![
        entry(
            "volume_loss_adjustment_pct",
            VOLUME_LOSS_ADJUSTMENT_PCT,
            "asset has no volume-loss adjustment",
        ),
        entry(
            "degradation_pct",
            DEGRADATION_PCT,
            "asset and technology table both lack degradation",
        ),
        entry(
            "capacity_factor",
            CAPACITY_FACTOR,
            "no quarterly override and no (technology, region) entry",
        ),
        entry("price", PRICE, "price provider returns nothing or a contract price is unset"),
        entry("indexation_pct", INDEXATION_PCT, "contract has no indexation rate"),
        entry("escalation_pct", ESCALATION_PCT, "constants have no escalation rate"),
        entry("variation_pct", VARIATION_PCT, "risk bound and legacy price variation both unset"),
        entry("asset_life_years", ASSET_LIFE_YEARS as f64, "asset has no life (never retires)"),
        entry(
            "monte_carlo_iterations",
            MONTE_CARLO_ITERATIONS as f64,
            "no iteration count requested",
        ),
        entry("histogram_bins", HISTOGRAM_BINS as f64, "always"),
        entry("npv_horizon_years", NPV_HORIZON_YEARS as f64, "always"),
        entry("revenue_mix_weight", REVENUE_MIX_FALLBACK_WEIGHT, "year total revenue is zero"),
        entry("cost_parameter", 0.0, "asset has no cost entry or a cost field is unset"),
        entry("discount_rate", 0.0, "constants have no contract or merchant discount rate"),
    ]
}

fn entry(parameter: &'static str, value: f64, applies_when: &'static str) -> DefaultEntry {
    DefaultEntry {
        parameter,
        value,
        applies_when,
    }
}

// ---------------------------------------------------------------------------
// Coercion
// ---------------------------------------------------------------------------

/// Interpret a loosely-typed value as a finite number.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|v| v.is_finite())
}

/// `deserialize_with` helper for required numeric fields.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_f64(&value).unwrap_or(0.0))
}

/// `deserialize_with` helper for optional numeric fields.
pub fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_f64))
}

/// Interpret a loosely-typed value as an exact decimal.
pub fn coerce_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n
            .to_string()
            .parse::<Decimal>()
            .ok()
            .or_else(|| n.as_f64().and_then(Decimal::from_f64)),
        Value::String(s) => s.trim().parse::<Decimal>().ok(),
        _ => None,
    }
}

/// `deserialize_with` helper for monetary and rate fields.
pub fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_decimal(&value).unwrap_or(Decimal::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "lenient_f64")]
        required: f64,
        #[serde(default, deserialize_with = "lenient_opt_f64")]
        optional: Option<f64>,
    }

    #[test]
    fn test_numeric_string_is_parsed() {
        let p: Probe = serde_json::from_str(r#"{"required": " 12.5 ", "optional": "3"}"#).unwrap();
        assert_eq!(p.required, 12.5);
        assert_eq!(p.optional, Some(3.0));
    }

    #[test]
    fn test_garbage_coerces_to_zero_or_none() {
        let p: Probe = serde_json::from_str(r#"{"required": "n/a", "optional": true}"#).unwrap();
        assert_eq!(p.required, 0.0);
        assert_eq!(p.optional, None);
    }

    #[test]
    fn test_missing_and_null() {
        let p: Probe = serde_json::from_str(r#"{"optional": null}"#).unwrap();
        assert_eq!(p.required, 0.0);
        assert_eq!(p.optional, None);
    }

    #[test]
    fn test_non_finite_string_rejected() {
        assert_eq!(coerce_f64(&Value::String("inf".into())), None);
        assert_eq!(coerce_f64(&Value::String("NaN".into())), None);
    }

    #[test]
    fn test_decimal_coercion() {
        use rust_decimal_macros::dec;
        assert_eq!(coerce_decimal(&serde_json::json!(0.08)), Some(dec!(0.08)));
        assert_eq!(coerce_decimal(&serde_json::json!("1.5")), Some(dec!(1.5)));
        assert_eq!(coerce_decimal(&serde_json::json!(12)), Some(dec!(12)));
        assert_eq!(coerce_decimal(&serde_json::json!("tbd")), None);
    }

    #[test]
    fn test_table_lists_every_fallback_once() {
        let t = table();
        let mut names: Vec<_> = t.iter().map(|e| e.parameter).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), t.len());
    }
}
