use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::RevenueError;
use crate::model::{Asset, Constants, Period};
use crate::pricing::PriceCurve;
use crate::revenue::{
    calculate_revenue, portfolio_time_series, PeriodRevenue, PriceBasis, RevenueBreakdown,
};
use crate::scenarios::{apply_stress, compare_stresses, StressOutcome, StressScenario};
use crate::types::{with_metadata_f64, ComputationOutput};
use crate::RevenueResult;

#[cfg(feature = "monte_carlo")]
use crate::monte_carlo::{
    run_monte_carlo, run_risk_analysis, MonteCarloOutput, RiskStatistics, SimulationConfig,
};
#[cfg(feature = "valuation")]
use crate::valuation::{calculate_npv, NpvOptions, NpvOutput};

/// Everything one run needs: parameters, assets and a price table.
///
/// Read-only per query; nothing here is written back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    pub constants: Constants,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub prices: PriceCurve,
}

impl Portfolio {
    pub fn new(constants: Constants, assets: Vec<Asset>, prices: PriceCurve) -> Self {
        Portfolio {
            constants,
            assets,
            prices,
        }
    }

    pub fn asset(&self, id: &str) -> RevenueResult<&Asset> {
        self.assets
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| RevenueError::UnknownAsset(id.to_string()))
    }

    fn check_window(&self) -> RevenueResult<()> {
        if self.constants.analysis_end_year < self.constants.analysis_start_year {
            return Err(RevenueError::InvalidInput {
                field: "analysis_end_year".into(),
                reason: "Analysis window ends before it starts".into(),
            });
        }
        Ok(())
    }

    /// Revenue split for one asset and period, optionally stressed.
    pub fn revenue_breakdown(
        &self,
        asset_id: &str,
        period: &Period,
        scenario: StressScenario,
        basis: PriceBasis,
    ) -> RevenueResult<ComputationOutput<RevenueBreakdown>> {
        let start = Instant::now();
        let asset = self.asset(asset_id)?;
        let mut warnings = Vec::new();

        if !asset.is_operational(period.year) {
            warnings.push(format!("Asset '{asset_id}' is not operating in {}", period.year));
        }

        let base = calculate_revenue(asset, period, &self.constants, &self.prices, basis);
        let breakdown = apply_stress(&base, scenario, &self.constants.risk);
        if breakdown.over_contracted {
            warnings.push(format!(
                "Contracted share exceeds 100% (green {:.1}%, black {:.1}%)",
                breakdown.green_contracted_pct, breakdown.black_contracted_pct
            ));
        }

        Ok(with_metadata_f64(
            "Contract waterfall with residual merchant allocation",
            &serde_json::json!({
                "period": period,
                "scenario": scenario,
                "price_basis": basis,
                "escalation_pct": self.constants.escalation_pct,
            }),
            warnings,
            start.elapsed().as_micros() as u64,
            breakdown,
        ))
    }

    /// Portfolio revenue per period across the analysis window.
    pub fn time_series(
        &self,
        basis: PriceBasis,
    ) -> RevenueResult<ComputationOutput<Vec<PeriodRevenue>>> {
        let start = Instant::now();
        self.check_window()?;
        let series = portfolio_time_series(&self.assets, &self.constants, &self.prices, basis);

        let mut warnings = Vec::new();
        let over: usize = series
            .iter()
            .flat_map(|p| &p.assets)
            .filter(|b| b.over_contracted)
            .count();
        if over > 0 {
            warnings.push(format!("{over} asset-periods are contracted above 100%"));
        }

        Ok(with_metadata_f64(
            "Portfolio revenue time series",
            &serde_json::json!({
                "start_year": self.constants.analysis_start_year,
                "end_year": self.constants.analysis_end_year,
                "granularity": self.constants.granularity,
                "price_basis": basis,
            }),
            warnings,
            start.elapsed().as_micros() as u64,
            series,
        ))
    }

    /// Every named stress for one asset-year, against base.
    pub fn stress_comparison(
        &self,
        asset_id: &str,
        year: i32,
        basis: PriceBasis,
    ) -> RevenueResult<ComputationOutput<Vec<StressOutcome>>> {
        let start = Instant::now();
        let asset = self.asset(asset_id)?;
        let period = Period::year(year);
        let base = calculate_revenue(asset, &period, &self.constants, &self.prices, basis);
        let outcomes = compare_stresses(&base, &self.constants.risk);
        debug!(asset = asset_id, year, "stress comparison");

        Ok(with_metadata_f64(
            "Deterministic volume and merchant price stresses",
            &serde_json::json!({
                "year": year,
                "volume_variation_pct": self.constants.risk.volume(),
                "green_price_variation_pct": self.constants.risk.green_price(),
                "black_price_variation_pct": self.constants.risk.black_price(),
            }),
            Vec::new(),
            start.elapsed().as_micros() as u64,
            outcomes,
        ))
    }

    #[cfg(feature = "monte_carlo")]
    pub fn scenarios(
        &self,
        config: &SimulationConfig,
    ) -> RevenueResult<ComputationOutput<MonteCarloOutput>> {
        run_monte_carlo(&self.assets, &self.constants, &self.prices, config)
    }

    #[cfg(feature = "monte_carlo")]
    pub fn risk_statistics(
        &self,
        config: &SimulationConfig,
        year: i32,
        asset_id: Option<&str>,
    ) -> RevenueResult<ComputationOutput<RiskStatistics>> {
        run_risk_analysis(&self.assets, &self.constants, &self.prices, config, year, asset_id)
    }

    #[cfg(feature = "valuation")]
    pub fn npv(&self, options: &NpvOptions) -> RevenueResult<ComputationOutput<NpvOutput>> {
        calculate_npv(&self.assets, &self.constants, &self.prices, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PriceProvider;
    use crate::types::{Commodity, Technology};

    fn portfolio() -> Portfolio {
        serde_json::from_value(serde_json::json!({
            "constants": {
                "analysis_start_year": 2025,
                "analysis_end_year": 2027,
                "capacity_factors": [{ "technology": "solar", "region": "NSW", "annual": "0.25" }],
                "risk": { "volume_variation": 10, "price_variation": 20 }
            },
            "assets": [{
                "id": "S1", "technology": "solar", "region": "NSW", "capacity_mw": "80",
                "start_date": "2026-03-01"
            }],
            "prices": [
                { "profile": "solar", "commodity": "black", "region": "NSW",
                  "period": "2026", "price": 60 },
                { "profile": "solar", "commodity": "green", "region": "NSW",
                  "period": "2026", "price": 10 }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_loads_with_lenient_numbers() {
        let p = portfolio();
        assert_eq!(p.assets[0].capacity_mw, 80.0);
        let price = p
            .prices
            .price(Technology::Solar, Commodity::Black, "nsw", &Period::year(2026));
        assert_eq!(price, Some(60.0));
    }

    #[test]
    fn test_unknown_asset() {
        let err = portfolio()
            .revenue_breakdown("X", &Period::year(2026), StressScenario::Base, PriceBasis::Real)
            .unwrap_err();
        assert!(matches!(err, RevenueError::UnknownAsset(id) if id == "X"));
    }

    #[test]
    fn test_breakdown_warns_before_commissioning() {
        let out = portfolio()
            .revenue_breakdown("S1", &Period::year(2025), StressScenario::Base, PriceBasis::Real)
            .unwrap();
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_stressed_breakdown_is_lower() {
        let p = portfolio();
        let base = p
            .revenue_breakdown("S1", &Period::year(2026), StressScenario::Base, PriceBasis::Real)
            .unwrap();
        let worst = p
            .revenue_breakdown("S1", &Period::year(2026), StressScenario::Worst, PriceBasis::Real)
            .unwrap();
        assert!(worst.result.total < base.result.total);
    }

    #[test]
    fn test_time_series_skips_pre_commissioning_year() {
        let out = portfolio().time_series(PriceBasis::Real).unwrap();
        assert_eq!(out.result.len(), 3);
        assert!(out.result[0].assets.is_empty());
        assert_eq!(out.result[1].assets.len(), 1);
    }

    #[test]
    fn test_inverted_window_rejected() {
        let mut p = portfolio();
        p.constants.analysis_end_year = 2020;
        assert!(p.time_series(PriceBasis::Real).is_err());
    }

    #[test]
    fn test_stress_comparison_covers_all_scenarios() {
        let out = portfolio().stress_comparison("S1", 2026, PriceBasis::Real).unwrap();
        assert_eq!(out.result.len(), 4);
    }
}
