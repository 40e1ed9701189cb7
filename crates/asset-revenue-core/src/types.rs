use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Valuation-side monetary values (millions of currency).
pub type Money = Decimal;

/// Discount rates expressed as decimals (0.08 = 8%).
pub type Rate = Decimal;

/// Generation technology. Also the price profile a provider is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Technology {
    Solar,
    Wind,
    Storage,
}

impl Technology {
    pub const ALL: [Technology; 3] = [Technology::Solar, Technology::Wind, Technology::Storage];

    pub fn as_str(&self) -> &'static str {
        match self {
            Technology::Solar => "solar",
            Technology::Wind => "wind",
            Technology::Storage => "storage",
        }
    }
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two revenue streams a unit of generation can be sold into:
/// green certificates and black (physical) energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commodity {
    Green,
    Black,
}

impl Commodity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commodity::Green => "green",
            Commodity::Black => "black",
        }
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Wrap a Decimal-valued result with metadata.
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    envelope(methodology, assumptions, warnings, elapsed_us, result, "rust_decimal_128bit")
}

/// Wrap an f64-valued result with metadata.
pub fn with_metadata_f64<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    envelope(methodology, assumptions, warnings, elapsed_us, result, "ieee754_f64")
}

fn envelope<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
    precision: &str,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: precision.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_technology_serde_lowercase() {
        let t: Technology = serde_json::from_str("\"wind\"").unwrap();
        assert_eq!(t, Technology::Wind);
        assert_eq!(serde_json::to_string(&Technology::Solar).unwrap(), "\"solar\"");
    }

    #[test]
    fn test_metadata_precision_labels() {
        let a = with_metadata("m", &serde_json::json!({}), vec![], 0, 1);
        let b = with_metadata_f64("m", &serde_json::json!({}), vec![], 0, 1.0);
        assert_eq!(a.metadata.precision, "rust_decimal_128bit");
        assert_eq!(b.metadata.precision, "ieee754_f64");
    }
}
