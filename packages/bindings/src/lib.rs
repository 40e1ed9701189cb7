use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use asset_revenue_core::model::Period;
use asset_revenue_core::monte_carlo::SimulationConfig;
use asset_revenue_core::revenue::PriceBasis;
use asset_revenue_core::scenarios::StressScenario;
use asset_revenue_core::valuation::NpvOptions;
use asset_revenue_core::Portfolio;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse<T: serde::de::DeserializeOwned>(input_json: &str) -> NapiResult<T> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct BreakdownRequest {
    portfolio: Portfolio,
    asset_id: String,
    period: Period,
    #[serde(default)]
    scenario: StressScenario,
    #[serde(default)]
    price_basis: PriceBasis,
}

#[derive(Deserialize)]
struct SeriesRequest {
    portfolio: Portfolio,
    #[serde(default)]
    price_basis: PriceBasis,
}

#[derive(Deserialize)]
struct StressRequest {
    portfolio: Portfolio,
    asset_id: String,
    year: i32,
    #[serde(default)]
    price_basis: PriceBasis,
}

#[derive(Deserialize)]
struct SimulationRequest {
    portfolio: Portfolio,
    #[serde(default)]
    config: SimulationConfig,
}

#[derive(Deserialize)]
struct StatisticsRequest {
    portfolio: Portfolio,
    #[serde(default)]
    config: SimulationConfig,
    year: i32,
    #[serde(default)]
    asset_id: Option<String>,
}

#[derive(Deserialize)]
struct NpvRequest {
    portfolio: Portfolio,
    #[serde(default)]
    options: NpvOptions,
}

// ---------------------------------------------------------------------------
// Revenue
// ---------------------------------------------------------------------------

#[napi]
pub fn revenue_breakdown(input_json: String) -> NapiResult<String> {
    let req: BreakdownRequest = parse(&input_json)?;
    let output = req
        .portfolio
        .revenue_breakdown(&req.asset_id, &req.period, req.scenario, req.price_basis)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn revenue_time_series(input_json: String) -> NapiResult<String> {
    let req: SeriesRequest = parse(&input_json)?;
    let output = req.portfolio.time_series(req.price_basis).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn stress_comparison(input_json: String) -> NapiResult<String> {
    let req: StressRequest = parse(&input_json)?;
    let output = req
        .portfolio
        .stress_comparison(&req.asset_id, req.year, req.price_basis)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Risk
// ---------------------------------------------------------------------------

#[napi]
pub fn generate_scenarios(input_json: String) -> NapiResult<String> {
    let req: SimulationRequest = parse(&input_json)?;
    let output = req.portfolio.scenarios(&req.config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn percentile_statistics(input_json: String) -> NapiResult<String> {
    let req: StatisticsRequest = parse(&input_json)?;
    let output = req
        .portfolio
        .risk_statistics(&req.config, req.year, req.asset_id.as_deref())
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Valuation
// ---------------------------------------------------------------------------

#[napi]
pub fn npv_table(input_json: String) -> NapiResult<String> {
    let req: NpvRequest = parse(&input_json)?;
    let output = req.portfolio.npv(&req.options).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
