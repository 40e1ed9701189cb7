pub mod defaults;
pub mod error;
pub mod model;
pub mod portfolio;
pub mod pricing;
pub mod revenue;
pub mod scenarios;
pub mod time_value;
pub mod types;

#[cfg(feature = "valuation")]
pub mod valuation;

#[cfg(feature = "monte_carlo")]
pub mod monte_carlo;

pub use error::RevenueError;
pub use portfolio::Portfolio;
pub use types::*;

/// Standard result type for all query operations
pub type RevenueResult<T> = Result<T, RevenueError>;
