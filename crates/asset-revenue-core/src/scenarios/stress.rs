use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RevenueError;
use crate::model::RiskBounds;
use crate::revenue::RevenueBreakdown;

/// Named deterministic stress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StressScenario {
    #[default]
    Base,
    /// Volume and both prices down.
    Worst,
    /// Volume down across contracted and merchant.
    Volume,
    /// Merchant prices down; contracted prices hold.
    Price,
}

impl StressScenario {
    pub const ALL: [StressScenario; 4] = [
        StressScenario::Base,
        StressScenario::Worst,
        StressScenario::Volume,
        StressScenario::Price,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StressScenario::Base => "base",
            StressScenario::Worst => "worst",
            StressScenario::Volume => "volume",
            StressScenario::Price => "price",
        }
    }
}

impl fmt::Display for StressScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StressScenario {
    type Err = RevenueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "base" => Ok(StressScenario::Base),
            "worst" => Ok(StressScenario::Worst),
            "volume" => Ok(StressScenario::Volume),
            "price" => Ok(StressScenario::Price),
            other => Err(RevenueError::InvalidInput {
                field: "scenario".into(),
                reason: format!(
                    "unknown scenario '{other}' (expected base, worst, volume or price)"
                ),
            }),
        }
    }
}

/// Multipliers a stress applies to volume and to each merchant price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressFactors {
    pub volume: f64,
    pub green_price: f64,
    pub black_price: f64,
}

impl StressFactors {
    pub const IDENTITY: StressFactors = StressFactors {
        volume: 1.0,
        green_price: 1.0,
        black_price: 1.0,
    };
}

pub fn stress_factors(scenario: StressScenario, bounds: &RiskBounds) -> StressFactors {
    let volume_down = 1.0 - bounds.volume() / 100.0;
    let green_down = 1.0 - bounds.green_price() / 100.0;
    let black_down = 1.0 - bounds.black_price() / 100.0;
    match scenario {
        StressScenario::Base => StressFactors::IDENTITY,
        StressScenario::Worst => StressFactors {
            volume: volume_down,
            green_price: green_down,
            black_price: black_down,
        },
        StressScenario::Volume => StressFactors {
            volume: volume_down,
            ..StressFactors::IDENTITY
        },
        StressScenario::Price => StressFactors {
            green_price: green_down,
            black_price: black_down,
            ..StressFactors::IDENTITY
        },
    }
}

/// Scale a breakdown: contracted revenue by volume only, merchant revenue by
/// volume and the matching market price. Contract prices never move.
pub fn apply_factors(base: &RevenueBreakdown, f: StressFactors) -> RevenueBreakdown {
    let mut out = base.clone();
    out.generation_mwh *= f.volume;
    out.contracted_green *= f.volume;
    out.contracted_black *= f.volume;
    out.merchant_green *= f.volume * f.green_price;
    out.merchant_black *= f.volume * f.black_price;
    out.merchant_green_price *= f.green_price;
    out.merchant_black_price *= f.black_price;
    for line in &mut out.contracts {
        line.green_revenue *= f.volume;
        line.black_revenue *= f.volume;
    }
    out.retotal();
    out
}

/// Apply a named stress to a base breakdown.
pub fn apply_stress(
    base: &RevenueBreakdown,
    scenario: StressScenario,
    bounds: &RiskBounds,
) -> RevenueBreakdown {
    apply_factors(base, stress_factors(scenario, bounds))
}

/// One stress evaluated against base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressOutcome {
    pub scenario: StressScenario,
    pub contracted: f64,
    pub merchant: f64,
    pub total: f64,
    pub deviation_from_base: f64,
    pub deviation_pct: f64,
}

/// Evaluate every named stress against `base`.
pub fn compare_stresses(base: &RevenueBreakdown, bounds: &RiskBounds) -> Vec<StressOutcome> {
    StressScenario::ALL
        .iter()
        .map(|&scenario| {
            let stressed = apply_stress(base, scenario, bounds);
            let deviation = stressed.total - base.total;
            StressOutcome {
                scenario,
                contracted: stressed.contracted(),
                merchant: stressed.merchant(),
                total: stressed.total,
                deviation_from_base: deviation,
                deviation_pct: if base.total == 0.0 { 0.0 } else { deviation / base.total },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContractKind, Period};
    use crate::revenue::ContractAllocation;
    use approx::assert_relative_eq;

    fn base() -> RevenueBreakdown {
        RevenueBreakdown {
            asset_id: "A".into(),
            period: Period::year(2030),
            generation_mwh: 200_000.0,
            contracted_green: 2.0,
            contracted_black: 6.0,
            merchant_green: 1.0,
            merchant_black: 4.0,
            total: 13.0,
            green_contracted_pct: 50.0,
            black_contracted_pct: 50.0,
            green_merchant_pct: 50.0,
            black_merchant_pct: 50.0,
            merchant_green_price: 10.0,
            merchant_black_price: 40.0,
            over_contracted: false,
            contracts: vec![ContractAllocation {
                contract_id: "c".into(),
                kind: ContractKind::Bundled,
                buyer_pct: 50.0,
                indexation_factor: 1.0,
                green_price: 20.0,
                black_price: 60.0,
                green_revenue: 2.0,
                black_revenue: 6.0,
            }],
        }
    }

    fn bounds() -> RiskBounds {
        RiskBounds {
            volume_variation: Some(10.0),
            green_price_variation: Some(20.0),
            black_price_variation: Some(30.0),
            price_variation: None,
        }
    }

    #[test]
    fn test_base_is_identity() {
        assert_eq!(apply_stress(&base(), StressScenario::Base, &bounds()), base());
    }

    #[test]
    fn test_volume_scales_every_volume_component() {
        let b = base();
        let s = apply_stress(&b, StressScenario::Volume, &bounds());
        assert_relative_eq!(s.generation_mwh, b.generation_mwh * 0.9, max_relative = 1e-12);
        assert_relative_eq!(s.contracted_green, 1.8, max_relative = 1e-12);
        assert_relative_eq!(s.contracted_black, 5.4, max_relative = 1e-12);
        assert_relative_eq!(s.merchant_green, 0.9, max_relative = 1e-12);
        assert_relative_eq!(s.merchant_black, 3.6, max_relative = 1e-12);
        assert_relative_eq!(s.total, 13.0 * 0.9, max_relative = 1e-12);
        assert_eq!(s.merchant_green_price, b.merchant_green_price);
        assert_eq!(s.merchant_black_price, b.merchant_black_price);
        assert_eq!(s.contracts[0].green_price, 20.0);
        assert_eq!(s.contracts[0].black_price, 60.0);
    }

    #[test]
    fn test_price_moves_merchant_only() {
        let s = apply_stress(&base(), StressScenario::Price, &bounds());
        assert_eq!(s.contracted_green, 2.0);
        assert_eq!(s.contracted_black, 6.0);
        assert_relative_eq!(s.merchant_green, 0.8, max_relative = 1e-12);
        assert_relative_eq!(s.merchant_black, 2.8, max_relative = 1e-12);
        assert_eq!(s.generation_mwh, 200_000.0);
    }

    #[test]
    fn test_worst_compounds_volume_and_price() {
        let s = apply_stress(&base(), StressScenario::Worst, &bounds());
        assert_relative_eq!(s.contracted(), 8.0 * 0.9, max_relative = 1e-12);
        assert_relative_eq!(s.merchant_green, 1.0 * 0.9 * 0.8, max_relative = 1e-12);
        assert_relative_eq!(s.merchant_black, 4.0 * 0.9 * 0.7, max_relative = 1e-12);
    }

    #[test]
    fn test_legacy_price_variation_applies() {
        let b = RiskBounds {
            price_variation: Some(50.0),
            ..RiskBounds::default()
        };
        let s = apply_stress(&base(), StressScenario::Price, &b);
        assert_relative_eq!(s.merchant(), 2.5, max_relative = 1e-12);
    }

    #[test]
    fn test_parse_scenario_names() {
        assert_eq!("Worst".parse::<StressScenario>().unwrap(), StressScenario::Worst);
        assert!("extreme".parse::<StressScenario>().is_err());
    }

    #[test]
    fn test_comparison_orders_and_deviations() {
        let out = compare_stresses(&base(), &bounds());
        assert_eq!(out.len(), 4);
        assert_eq!(out[0].scenario, StressScenario::Base);
        assert_eq!(out[0].deviation_from_base, 0.0);
        let worst = &out[1];
        assert!(worst.total < out[2].total.min(out[3].total));
        assert_relative_eq!(
            worst.deviation_pct,
            worst.deviation_from_base / 13.0,
            max_relative = 1e-12
        );
    }
}
