pub mod asset;
pub mod constants;
pub mod period;

pub use asset::{Asset, Contract, ContractKind, QuarterlyCapacityFactors};
pub use constants::{
    AssetCosts, CapacityFactorEntry, Constants, DiscountRates, FinancingTerms, RiskBounds,
};
pub use period::{Granularity, Period, SubPeriod};
