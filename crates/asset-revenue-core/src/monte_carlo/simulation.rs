use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::distribution::Uniform;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info};

use crate::defaults;
use crate::error::RevenueError;
use crate::model::{Asset, Constants, RiskBounds};
use crate::pricing::PriceProvider;
use crate::revenue::{annual_revenue, PriceBasis};
use crate::types::{with_metadata_f64, ComputationOutput};
use crate::RevenueResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Monte Carlo run parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Draws per (asset, year).
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Optional seed for reproducibility.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub price_basis: PriceBasis,
}

fn default_iterations() -> u32 {
    defaults::MONTE_CARLO_ITERATIONS
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            iterations: default_iterations(),
            seed: None,
            price_basis: PriceBasis::default(),
        }
    }
}

/// One randomized outcome for an (asset, year) pair. Shocks are fractions
/// (`-0.12` is a 12% reduction).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub iteration: u32,
    pub asset_id: String,
    pub year: i32,
    pub volume_shock: f64,
    pub green_price_shock: f64,
    pub black_price_shock: f64,
    pub base_revenue: f64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloOutput {
    pub iterations: u32,
    /// Seed actually used; drawn from entropy when none was configured.
    pub seed: u64,
    pub scenarios: Vec<Scenario>,
}

/// Scenarios from a parallel run, with how much of it finished.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioBatch {
    pub scenarios: Vec<Scenario>,
    pub chunks: u32,
    pub completed_chunks: u32,
}

impl ScenarioBatch {
    /// False when cancellation skipped at least one chunk.
    pub fn is_complete(&self) -> bool {
        self.completed_chunks == self.chunks
    }
}

/// Unshocked revenue split for one (asset, year).
#[derive(Debug, Clone, PartialEq)]
struct BaseCase {
    asset_id: String,
    year: i32,
    contracted: f64,
    merchant_green: f64,
    merchant_black: f64,
    total: f64,
}

impl BaseCase {
    /// Contracted revenue moves with volume only; merchant revenue moves
    /// with volume and its own market price.
    fn shocked(&self, volume: f64, green: f64, black: f64) -> f64 {
        let v = 1.0 + volume;
        self.contracted * v
            + self.merchant_green * v * (1.0 + green)
            + self.merchant_black * v * (1.0 + black)
    }
}

/// Base revenues for every (asset, year) in the analysis window, computed
/// once and shared by all iterations. Years outside an asset's operating
/// window carry zero revenue.
#[derive(Debug, Clone)]
pub struct BaseCases {
    cases: Vec<BaseCase>,
}

impl BaseCases {
    pub fn build(
        assets: &[Asset],
        constants: &Constants,
        provider: &dyn PriceProvider,
        basis: PriceBasis,
    ) -> Self {
        let mut cases = Vec::with_capacity(assets.len() * constants.analysis_years().count());
        for asset in assets {
            for year in constants.analysis_years() {
                if !asset.is_operational(year) {
                    cases.push(BaseCase {
                        asset_id: asset.id.clone(),
                        year,
                        contracted: 0.0,
                        merchant_green: 0.0,
                        merchant_black: 0.0,
                        total: 0.0,
                    });
                    continue;
                }
                let r = annual_revenue(asset, year, constants, provider, basis);
                cases.push(BaseCase {
                    asset_id: asset.id.clone(),
                    year,
                    contracted: r.contracted(),
                    merchant_green: r.merchant_green,
                    merchant_black: r.merchant_black,
                    total: r.total,
                });
            }
        }
        BaseCases { cases }
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

fn unit_interval() -> RevenueResult<Uniform> {
    Uniform::new(-1.0, 1.0).map_err(|e| RevenueError::InvalidInput {
        field: "distribution".into(),
        reason: format!("Invalid Uniform parameters: {e}"),
    })
}

fn draw_iterations<R: Rng + ?Sized>(
    bases: &BaseCases,
    bounds: &RiskBounds,
    unit: &Uniform,
    iterations: std::ops::Range<u32>,
    rng: &mut R,
) -> Vec<Scenario> {
    let volume_bound = bounds.volume() / 100.0;
    let green_bound = bounds.green_price() / 100.0;
    let black_bound = bounds.black_price() / 100.0;

    let mut out = Vec::with_capacity(iterations.len() * bases.len());
    for iteration in iterations {
        for case in &bases.cases {
            let volume_shock = unit.sample(rng) * volume_bound;
            let green_price_shock = unit.sample(rng) * green_bound;
            let black_price_shock = unit.sample(rng) * black_bound;
            out.push(Scenario {
                iteration,
                asset_id: case.asset_id.clone(),
                year: case.year,
                volume_shock,
                green_price_shock,
                black_price_shock,
                base_revenue: case.total,
                revenue: case.shocked(volume_shock, green_price_shock, black_price_shock),
            });
        }
    }
    out
}

/// Seed for one chunk, decorrelated from its neighbours.
fn chunk_seed(seed: u64, chunk: u32) -> u64 {
    seed ^ u64::from(chunk).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Draw `iterations` scenarios per (asset, year) from a caller-supplied
/// random source, sequentially.
pub fn generate_scenarios_with_rng<R: Rng + ?Sized>(
    bases: &BaseCases,
    bounds: &RiskBounds,
    iterations: u32,
    rng: &mut R,
) -> RevenueResult<Vec<Scenario>> {
    let unit = unit_interval()?;
    Ok(draw_iterations(bases, bounds, &unit, 0..iterations, rng))
}

/// Draw scenarios in parallel.
///
/// Iterations are split into fixed-size chunks, each with its own `StdRng`
/// seeded from `(seed, chunk)`, so a seeded run gives the same scenarios
/// whatever the thread count. Chunks not yet started when `cancel` is set
/// are skipped and left out of `completed_chunks`.
pub fn generate_scenarios_cancellable(
    bases: &BaseCases,
    bounds: &RiskBounds,
    iterations: u32,
    seed: u64,
    cancel: &AtomicBool,
) -> RevenueResult<ScenarioBatch> {
    let unit = unit_interval()?;
    let chunk = defaults::MONTE_CARLO_CHUNK_SIZE;
    let chunks = iterations.div_ceil(chunk);

    let parts: Vec<Option<Vec<Scenario>>> = (0..chunks)
        .into_par_iter()
        .map(|c| {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }
            let start = c * chunk;
            let end = (start + chunk).min(iterations);
            let mut rng = StdRng::seed_from_u64(chunk_seed(seed, c));
            Some(draw_iterations(bases, bounds, &unit, start..end, &mut rng))
        })
        .collect();

    let completed_chunks = parts.iter().filter(|p| p.is_some()).count() as u32;
    if completed_chunks < chunks {
        debug!(completed_chunks, chunks, "monte carlo cancelled");
    }

    Ok(ScenarioBatch {
        scenarios: parts.into_iter().flatten().flatten().collect(),
        chunks,
        completed_chunks,
    })
}

/// [`generate_scenarios_cancellable`] without cancellation.
pub fn generate_scenarios(
    bases: &BaseCases,
    bounds: &RiskBounds,
    iterations: u32,
    seed: u64,
) -> RevenueResult<Vec<Scenario>> {
    let cancel = AtomicBool::new(false);
    let batch = generate_scenarios_cancellable(bases, bounds, iterations, seed, &cancel)?;
    Ok(batch.scenarios)
}

pub(crate) fn validate_config(
    config: &SimulationConfig,
    constants: &Constants,
) -> RevenueResult<()> {
    if config.iterations == 0 {
        return Err(RevenueError::InvalidInput {
            field: "iterations".into(),
            reason: "Must be at least 1".into(),
        });
    }
    if constants.analysis_end_year < constants.analysis_start_year {
        return Err(RevenueError::InvalidInput {
            field: "analysis_end_year".into(),
            reason: "Analysis window ends before it starts".into(),
        });
    }
    Ok(())
}

/// Resolve the run seed: the configured one, or fresh entropy.
pub(crate) fn resolve_seed(config: &SimulationConfig) -> u64 {
    config.seed.unwrap_or_else(|| StdRng::from_entropy().gen())
}

/// Generate the raw scenario collection for every asset and analysis year.
pub fn run_monte_carlo(
    assets: &[Asset],
    constants: &Constants,
    provider: &dyn PriceProvider,
    config: &SimulationConfig,
) -> RevenueResult<ComputationOutput<MonteCarloOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_config(config, constants)?;

    let bases = BaseCases::build(assets, constants, provider, config.price_basis);
    if bases.is_empty() {
        warnings.push("No assets in the analysis window; scenario set is empty".into());
    }
    debug!(pairs = bases.len(), iterations = config.iterations, "monte carlo base cases built");

    let seed = resolve_seed(config);
    let scenarios = generate_scenarios(&bases, &constants.risk, config.iterations, seed)?;

    let elapsed = start.elapsed().as_micros() as u64;
    info!(scenarios = scenarios.len(), elapsed_us = elapsed, "monte carlo complete");

    let output = MonteCarloOutput {
        iterations: config.iterations,
        seed,
        scenarios,
    };

    Ok(with_metadata_f64(
        "Monte Carlo revenue simulation (uniform volume and price shocks)",
        &serde_json::json!({
            "iterations": config.iterations,
            "seed": seed,
            "seed_source": if config.seed.is_some() { "configured" } else { "entropy" },
            "price_basis": config.price_basis,
            "volume_variation_pct": constants.risk.volume(),
            "green_price_variation_pct": constants.risk.green_price(),
            "black_price_variation_pct": constants.risk.black_price(),
            "assets": assets.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
