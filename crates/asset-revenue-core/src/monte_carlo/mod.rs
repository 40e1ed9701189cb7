pub mod simulation;
pub mod statistics;

pub use simulation::{
    generate_scenarios, generate_scenarios_cancellable, generate_scenarios_with_rng,
    run_monte_carlo, BaseCases, MonteCarloOutput, Scenario, ScenarioBatch, SimulationConfig,
};
pub use statistics::{
    percentile_statistics, run_risk_analysis, HistogramBin, PercentileShocks, RiskStatistics,
    ShockSet,
};
