pub mod curve;
pub mod provider;

pub use curve::{PriceCurve, PricePoint};
pub use provider::{NoPrices, PriceProvider};
