use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::info;

use super::simulation::{
    generate_scenarios, resolve_seed, validate_config, BaseCases, Scenario, SimulationConfig,
};
use crate::defaults;
use crate::error::RevenueError;
use crate::model::{Asset, Constants};
use crate::pricing::PriceProvider;
use crate::types::{with_metadata_f64, ComputationOutput};
use crate::RevenueResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A single histogram bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u32,
    pub frequency: f64,
}

/// Shocks behind the combined outcome at one percentile. For a portfolio
/// these are the means across assets for that iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShockSet {
    pub iteration: u32,
    pub volume: f64,
    pub green_price: f64,
    pub black_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileShocks {
    pub p90: ShockSet,
    pub p50: ShockSet,
    pub p10: ShockSet,
}

/// Revenue-at-risk summary for one year.
///
/// Labels follow the "probability of exceeding" convention used in
/// generation finance: `p90` is the adverse outcome (90% of draws earn
/// more), `p10` the favourable one. So `p90 <= p50 <= p10`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskStatistics {
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    pub iterations: u32,
    /// Seed of the simulation behind these figures, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub base_case: f64,
    pub p90: f64,
    pub p50: f64,
    pub p10: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub shocks: PercentileShocks,
    pub histogram: Vec<HistogramBin>,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct IterationTotal {
    revenue: f64,
    base: f64,
    volume: f64,
    green: f64,
    black: f64,
    members: u32,
}

impl IterationTotal {
    fn shocks(&self, iteration: u32) -> ShockSet {
        let n = f64::from(self.members.max(1));
        ShockSet {
            iteration,
            volume: self.volume / n,
            green_price: self.green / n,
            black_price: self.black / n,
        }
    }
}

/// Index into an ascending sample of `n` at fraction `q`, clamped.
fn rank_index(n: usize, q: f64) -> usize {
    ((n as f64 * q).floor() as usize).min(n - 1)
}

/// Build `num_bins` equal-width bins spanning [min, max] of a sorted sample.
///
/// A degenerate sample (min == max) lands entirely in the first bin.
fn build_histogram(sorted: &[f64], num_bins: usize) -> Vec<HistogramBin> {
    let min_val = sorted[0];
    let max_val = sorted[sorted.len() - 1];
    let bin_width = (max_val - min_val) / num_bins as f64;
    let n = sorted.len() as f64;

    let mut bins: Vec<HistogramBin> = (0..num_bins)
        .map(|i| {
            let lower = min_val + i as f64 * bin_width;
            let upper = if i == num_bins - 1 {
                max_val
            } else {
                min_val + (i + 1) as f64 * bin_width
            };
            HistogramBin {
                lower,
                upper,
                count: 0,
                frequency: 0.0,
            }
        })
        .collect();

    for &val in sorted {
        let idx = if bin_width > 0.0 {
            (((val - min_val) / bin_width).floor() as usize).min(num_bins - 1)
        } else {
            0
        };
        bins[idx].count += 1;
    }

    for bin in &mut bins {
        bin.frequency = f64::from(bin.count) / n;
    }

    bins
}

/// Combine scenarios for `year` into one portfolio revenue per iteration and
/// summarise the distribution.
///
/// The i-th draw of each asset is summed with the i-th draw of every other
/// asset. `asset_id` restricts the summary to a single asset.
pub fn percentile_statistics(
    scenarios: &[Scenario],
    year: i32,
    asset_id: Option<&str>,
) -> RevenueResult<RiskStatistics> {
    let mut by_iteration: BTreeMap<u32, IterationTotal> = BTreeMap::new();
    for s in scenarios
        .iter()
        .filter(|s| s.year == year && asset_id.map_or(true, |id| s.asset_id == id))
    {
        let t = by_iteration.entry(s.iteration).or_default();
        t.revenue += s.revenue;
        t.base += s.base_revenue;
        t.volume += s.volume_shock;
        t.green += s.green_price_shock;
        t.black += s.black_price_shock;
        t.members += 1;
    }

    if by_iteration.is_empty() {
        return Err(match asset_id {
            Some(id) if !scenarios.iter().any(|s| s.asset_id == id) => {
                RevenueError::UnknownAsset(id.to_string())
            }
            _ => RevenueError::InsufficientData(format!("No scenarios for year {year}")),
        });
    }

    let base_case = by_iteration.values().next().map_or(0.0, |t| t.base);

    let mut ranked: Vec<(u32, &IterationTotal)> =
        by_iteration.iter().map(|(i, t)| (*i, t)).collect();
    ranked.sort_by(|a, b| {
        a.1.revenue
            .partial_cmp(&b.1.revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let sorted: Vec<f64> = ranked.iter().map(|(_, t)| t.revenue).collect();
    let n = sorted.len();

    let adverse = rank_index(n, 0.10);
    let median = rank_index(n, 0.50);
    let favourable = rank_index(n, 0.90);
    let shocks_at = |idx: usize| ranked[idx].1.shocks(ranked[idx].0);

    let mean = sorted.iter().sum::<f64>() / n as f64;
    let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;

    Ok(RiskStatistics {
        year,
        asset_id: asset_id.map(str::to_string),
        iterations: n as u32,
        seed: None,
        base_case,
        p90: sorted[adverse],
        p50: sorted[median],
        p10: sorted[favourable],
        min: sorted[0],
        max: sorted[n - 1],
        mean,
        std_dev: variance.sqrt(),
        shocks: PercentileShocks {
            p90: shocks_at(adverse),
            p50: shocks_at(median),
            p10: shocks_at(favourable),
        },
        histogram: build_histogram(&sorted, defaults::HISTOGRAM_BINS),
    })
}

/// Simulate and summarise revenue risk for one year.
pub fn run_risk_analysis(
    assets: &[Asset],
    constants: &Constants,
    provider: &dyn PriceProvider,
    config: &SimulationConfig,
    year: i32,
    asset_id: Option<&str>,
) -> RevenueResult<ComputationOutput<RiskStatistics>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_config(config, constants)?;
    if !constants.analysis_years().contains(&year) {
        return Err(RevenueError::InvalidInput {
            field: "year".into(),
            reason: format!(
                "{year} is outside the analysis window {}-{}",
                constants.analysis_start_year, constants.analysis_end_year
            ),
        });
    }

    let selected: Vec<Asset> = match asset_id {
        Some(id) => {
            let found: Vec<Asset> = assets.iter().filter(|a| a.id == id).cloned().collect();
            if found.is_empty() {
                return Err(RevenueError::UnknownAsset(id.to_string()));
            }
            found
        }
        None => assets.to_vec(),
    };

    let mut window = constants.clone();
    window.analysis_start_year = year;
    window.analysis_end_year = year;

    let bases = BaseCases::build(&selected, &window, provider, config.price_basis);
    let seed = resolve_seed(config);
    let scenarios = generate_scenarios(&bases, &constants.risk, config.iterations, seed)?;
    let mut stats = percentile_statistics(&scenarios, year, asset_id)?;
    stats.seed = Some(seed);

    let risk = &constants.risk;
    if risk.volume() == 0.0 && risk.green_price() == 0.0 && risk.black_price() == 0.0 {
        warnings.push(
            "All variation bounds are zero; distribution collapses to the base case".into(),
        );
    }

    let elapsed = start.elapsed().as_micros() as u64;
    info!(year, iterations = config.iterations, elapsed_us = elapsed, "risk analysis complete");

    Ok(with_metadata_f64(
        "Monte Carlo revenue-at-risk (P90 adverse / P50 / P10 favourable)",
        &serde_json::json!({
            "iterations": config.iterations,
            "seed": seed,
            "seed_source": if config.seed.is_some() { "configured" } else { "entropy" },
            "year": year,
            "asset_id": asset_id,
            "histogram_bins": defaults::HISTOGRAM_BINS,
        }),
        warnings,
        elapsed,
        stats,
    ))
}
