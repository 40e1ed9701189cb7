use approx::assert_relative_eq;
use asset_revenue_core::model::{Granularity, Period};
use asset_revenue_core::revenue::{annual_revenue, portfolio_time_series, PriceBasis};
use asset_revenue_core::scenarios::{apply_stress, StressScenario};
use asset_revenue_core::time_value::{nominal_to_real, real_to_nominal};
use asset_revenue_core::Portfolio;
use pretty_assertions::assert_eq;

fn reference_portfolio() -> Portfolio {
    serde_json::from_value(serde_json::json!({
        "constants": {
            "analysis_start_year": 2025,
            "analysis_end_year": 2034,
            "escalation_pct": 2.5,
            "forecast_start_year": 2027,
            "capacity_factors": [
                { "technology": "solar", "region": "NSW", "annual": 0.28 },
                { "technology": "wind", "region": "VIC", "quarterly": [0.30, 0.38, 0.42, 0.34] }
            ],
            "risk": {
                "volume_variation": 10, "green_price_variation": 15, "black_price_variation": 25
            }
        },
        "assets": [
            {
                "id": "A", "name": "Asset A", "technology": "solar", "region": "NSW",
                "capacity_mw": 100, "start_date": "2025-01-01",
                "volume_loss_adjustment": 95, "degradation_pct": 0,
                "contracts": [{
                    "id": "A-PPA", "kind": "bundled",
                    "start_date": "2025-01-01", "end_date": "2034-12-31",
                    "buyer_pct": 100, "green_price": 20, "black_price": 40
                }]
            },
            {
                "id": "B", "technology": "wind", "region": "VIC",
                "capacity_mw": 200, "start_date": "2026-07-01", "degradation_pct": "0.4",
                "asset_life_years": 5,
                "contracts": [
                    {
                        "id": "B-green", "kind": "green",
                        "start_date": "2026-07-01", "end_date": "2030-06-30",
                        "buyer_pct": 50, "strike_price": 18, "indexation_pct": 2, "floor_price": 15
                    },
                    {
                        "id": "B-black", "kind": "black",
                        "start_date": "2026-07-01", "end_date": "2028-12-31",
                        "buyer_pct": 70, "strike_price": 65
                    }
                ]
            }
        ],
        "prices": [
            { "profile": "wind", "commodity": "green", "region": "VIC",
              "period": "2027", "price": 12 },
            { "profile": "wind", "commodity": "black", "region": "VIC",
              "period": "2027", "price": 55 },
            { "profile": "wind", "commodity": "black", "region": "VIC",
              "period": "2028-Q1", "price": 60 },
            { "profile": "wind", "commodity": "black", "region": "VIC",
              "period": "2028-Q3", "price": 40 }
        ]
    }))
    .unwrap()
}

#[test]
fn test_reference_bundled_asset() {
    let p = reference_portfolio();
    let r = annual_revenue(p.asset("A").unwrap(), 2025, &p.constants, &p.prices, PriceBasis::Real);

    assert_relative_eq!(r.generation_mwh, 233_016.0, max_relative = 1e-9);
    assert_relative_eq!(r.contracted(), 13.98096, max_relative = 1e-9);
    assert_relative_eq!(r.contracted_green, 233_016.0 * 20.0 / 1e6, max_relative = 1e-9);
    assert_eq!(r.merchant(), 0.0);
    assert_eq!(r.green_merchant_pct, 0.0);
    assert_eq!(r.black_merchant_pct, 0.0);
}

#[test]
fn test_buckets_sum_to_total_everywhere() {
    let p = reference_portfolio();
    for asset in &p.assets {
        for year in p.constants.analysis_years() {
            for basis in [PriceBasis::Real, PriceBasis::Nominal] {
                let r = annual_revenue(asset, year, &p.constants, &p.prices, basis);
                let sum =
                    r.contracted_green + r.contracted_black + r.merchant_green + r.merchant_black;
                assert_relative_eq!(sum, r.total, epsilon = 1e-12);
            }
        }
    }
}

#[test]
fn test_partial_contracting_leaves_merchant_residual() {
    let p = reference_portfolio();
    let b = p.asset("B").unwrap();
    let r = annual_revenue(b, 2027, &p.constants, &p.prices, PriceBasis::Real);

    assert_eq!(r.green_contracted_pct, 50.0);
    assert_eq!(r.black_contracted_pct, 70.0);
    assert_eq!(r.green_merchant_pct, 50.0);
    assert_relative_eq!(r.black_merchant_pct, 30.0, epsilon = 1e-12);
    assert_eq!(r.merchant_green_price, 12.0);
    assert_eq!(r.merchant_black_price, 55.0);
    assert_eq!(r.contracts.len(), 2);
    // One year of 2% indexation on the green strike.
    assert_relative_eq!(r.contracts[0].green_price, 18.0 * 1.02, max_relative = 1e-12);
}

#[test]
fn test_nominal_basis_escalates_forecast_years_only() {
    let p = reference_portfolio();
    let b = p.asset("B").unwrap();

    // 2026 is before the forecast boundary, so no escalation is applied.
    let real = annual_revenue(b, 2026, &p.constants, &p.prices, PriceBasis::Real);
    let nominal = annual_revenue(b, 2026, &p.constants, &p.prices, PriceBasis::Nominal);
    assert_eq!(real.merchant_black_price, nominal.merchant_black_price);

    let real = annual_revenue(b, 2027, &p.constants, &p.prices, PriceBasis::Real);
    let nominal = annual_revenue(b, 2027, &p.constants, &p.prices, PriceBasis::Nominal);
    assert_relative_eq!(
        nominal.merchant_black_price,
        real_to_nominal(real.merchant_black_price, 2.5, 2027, 2025),
        max_relative = 1e-12
    );
    assert_relative_eq!(
        nominal_to_real(nominal.merchant_black_price, 2.5, 2027, 2025),
        real.merchant_black_price,
        max_relative = 1e-12
    );
}

#[test]
fn test_sub_annual_prices_average_into_year() {
    let p = reference_portfolio();
    let b = p.asset("B").unwrap();
    let r = annual_revenue(b, 2028, &p.constants, &p.prices, PriceBasis::Real);
    assert_eq!(r.merchant_black_price, 50.0);
}

#[test]
fn test_quarterly_series_uses_quarter_capacity_factors() {
    let mut p = reference_portfolio();
    p.constants.granularity = Granularity::Quarterly;
    let series = portfolio_time_series(&p.assets, &p.constants, &p.prices, PriceBasis::Real);

    assert_eq!(series.len(), 40);
    assert_eq!(series[0].period, Period::quarter(2025, 1));

    let q = |year: i32, quarter: u8| {
        series
            .iter()
            .find(|s| s.period == Period::quarter(year, quarter))
            .and_then(|s| s.assets.iter().find(|a| a.asset_id == "B"))
            .map(|a| a.generation_mwh)
            .unwrap()
    };
    assert_relative_eq!(q(2027, 3) / q(2027, 1), 0.42 / 0.30, max_relative = 1e-12);
}

#[test]
fn test_series_respects_asset_life() {
    let p = reference_portfolio();
    let series = portfolio_time_series(&p.assets, &p.constants, &p.prices, PriceBasis::Real);
    let has_b = |year: i32| {
        series
            .iter()
            .find(|s| s.period.year == year)
            .map(|s| s.assets.iter().any(|a| a.asset_id == "B"))
            .unwrap()
    };
    assert!(!has_b(2025));
    assert!(has_b(2026));
    assert!(has_b(2030));
    assert!(!has_b(2031));
}

#[test]
fn test_volume_stress_on_reference_asset() {
    let p = reference_portfolio();
    let a = p.asset("A").unwrap();
    let base = annual_revenue(a, 2025, &p.constants, &p.prices, PriceBasis::Real);
    let s = apply_stress(&base, StressScenario::Volume, &p.constants.risk);
    assert_relative_eq!(s.generation_mwh, base.generation_mwh * 0.9, max_relative = 1e-12);
    assert_relative_eq!(s.total, base.total * 0.9, max_relative = 1e-12);
    assert_eq!(s.contracts[0].green_price, base.contracts[0].green_price);
}

#[test]
fn test_facade_breakdown_matches_engine() {
    let p = reference_portfolio();
    let out = p
        .revenue_breakdown("A", &Period::year(2025), StressScenario::Base, PriceBasis::Real)
        .unwrap();
    let a = p.asset("A").unwrap();
    let direct = annual_revenue(a, 2025, &p.constants, &p.prices, PriceBasis::Real);
    assert_eq!(out.result, direct);
    assert_eq!(out.metadata.precision, "ieee754_f64");
}
