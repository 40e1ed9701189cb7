pub mod allocation;
pub mod generation;
pub mod timeseries;

pub use allocation::{
    annual_revenue, calculate_revenue, ContractAllocation, PriceBasis, RevenueBreakdown,
};
pub use generation::period_generation;
pub use timeseries::{portfolio_time_series, PeriodRevenue};
