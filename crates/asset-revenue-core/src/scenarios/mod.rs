pub mod stress;

pub use stress::{
    apply_stress, compare_stresses, stress_factors, StressFactors, StressOutcome, StressScenario,
};
