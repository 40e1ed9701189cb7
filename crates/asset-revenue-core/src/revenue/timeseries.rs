use serde::{Deserialize, Serialize};
use tracing::debug;

use super::allocation::{calculate_revenue, PriceBasis, RevenueBreakdown};
use crate::model::{Asset, Constants, Period};
use crate::pricing::PriceProvider;

/// Portfolio revenue for one period of the analysis window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRevenue {
    pub period: Period,
    pub generation_mwh: f64,
    pub contracted: f64,
    pub merchant: f64,
    pub total: f64,
    pub assets: Vec<RevenueBreakdown>,
}

/// Revenue for every operating asset across the analysis window, at the
/// granularity configured in `constants`.
///
/// Assets outside their operating window contribute nothing to a period.
pub fn portfolio_time_series(
    assets: &[Asset],
    constants: &Constants,
    provider: &dyn PriceProvider,
    basis: PriceBasis,
) -> Vec<PeriodRevenue> {
    let mut series = Vec::new();

    for year in constants.analysis_years() {
        let operating: Vec<&Asset> = assets.iter().filter(|a| a.is_operational(year)).collect();
        for period in constants.granularity.periods(year) {
            let breakdowns: Vec<RevenueBreakdown> = operating
                .iter()
                .map(|a| calculate_revenue(a, &period, constants, provider, basis))
                .collect();
            series.push(PeriodRevenue {
                period,
                generation_mwh: breakdowns.iter().map(|b| b.generation_mwh).sum(),
                contracted: breakdowns.iter().map(RevenueBreakdown::contracted).sum(),
                merchant: breakdowns.iter().map(RevenueBreakdown::merchant).sum(),
                total: breakdowns.iter().map(|b| b.total).sum(),
                assets: breakdowns,
            });
        }
    }

    debug!(
        assets = assets.len(),
        periods = series.len(),
        granularity = ?constants.granularity,
        "built portfolio time series"
    );
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CapacityFactorEntry, Granularity};
    use crate::types::{Commodity, Technology};
    use approx::assert_relative_eq;

    fn asset(id: &str, start: &str, life: u32) -> Asset {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "technology": "wind",
            "region": "VIC",
            "capacity_mw": 50,
            "start_date": start,
            "asset_life_years": life,
        }))
        .unwrap()
    }

    fn constants(granularity: Granularity) -> Constants {
        let mut c = Constants::new(2025, 2027);
        c.granularity = granularity;
        c.capacity_factors.push(CapacityFactorEntry {
            technology: Technology::Wind,
            region: "VIC".into(),
            annual: Some(0.35),
            quarterly: None,
        });
        c
    }

    fn flat(_: Technology, c: Commodity, _: &str, _: &Period) -> Option<f64> {
        Some(if c == Commodity::Green { 30.0 } else { 70.0 })
    }

    #[test]
    fn test_period_count_by_granularity() {
        let assets = vec![asset("W1", "2025-01-01", 0)];
        let series = |g| portfolio_time_series(&assets, &constants(g), &flat, PriceBasis::Real);
        let yearly = series(Granularity::Yearly);
        let quarterly = series(Granularity::Quarterly);
        let monthly = series(Granularity::Monthly);
        assert_eq!(yearly.len(), 3);
        assert_eq!(quarterly.len(), 12);
        assert_eq!(monthly.len(), 36);

        let y: f64 = yearly.iter().map(|p| p.total).sum();
        let m: f64 = monthly.iter().map(|p| p.total).sum();
        assert_relative_eq!(y, m, max_relative = 1e-9);
    }

    #[test]
    fn test_assets_outside_operating_window_excluded() {
        let assets = vec![asset("W1", "2026-06-01", 0), asset("W2", "2020-01-01", 6)];
        let series =
            portfolio_time_series(&assets, &constants(Granularity::None), &flat, PriceBasis::Real);
        let ids: Vec<Vec<&str>> = series
            .iter()
            .map(|p| p.assets.iter().map(|b| b.asset_id.as_str()).collect())
            .collect();
        assert_eq!(ids, vec![vec!["W2"], vec!["W1"], vec!["W1"]]);
    }

    #[test]
    fn test_period_totals_match_asset_sum() {
        let assets = vec![asset("W1", "2025-01-01", 0), asset("W2", "2025-01-01", 0)];
        let constants = constants(Granularity::Quarterly);
        let series = portfolio_time_series(&assets, &constants, &flat, PriceBasis::Real);
        for p in &series {
            assert_relative_eq!(p.total, p.contracted + p.merchant, max_relative = 1e-12);
            let sum: f64 = p.assets.iter().map(|b| b.total).sum();
            assert_relative_eq!(p.total, sum, max_relative = 1e-12);
        }
    }
}
