pub mod npv;

pub use npv::{
    calculate_npv, project_cash_flows, weighted_discount_rate, NpvOptions, NpvOutput, NpvRow,
};
