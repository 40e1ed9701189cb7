use crate::model::Period;
use crate::types::{Commodity, Technology};

/// Resolves a real (pre-escalation) market price.
///
/// Returning `None` is not an error: unresolved prices contribute zero
/// merchant revenue. Implementations must be side-effect free; the Monte
/// Carlo simulator calls them from several threads.
pub trait PriceProvider: Sync {
    fn price(
        &self,
        technology: Technology,
        commodity: Commodity,
        region: &str,
        period: &Period,
    ) -> Option<f64>;
}

impl<F> PriceProvider for F
where
    F: Fn(Technology, Commodity, &str, &Period) -> Option<f64> + Sync,
{
    fn price(
        &self,
        technology: Technology,
        commodity: Commodity,
        region: &str,
        period: &Period,
    ) -> Option<f64> {
        self(technology, commodity, region, period)
    }
}

/// A provider with no prices; every merchant stream earns zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrices;

impl PriceProvider for NoPrices {
    fn price(&self, _: Technology, _: Commodity, _: &str, _: &Period) -> Option<f64> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(_: Technology, c: Commodity, _: &str, _: &Period) -> Option<f64> {
        match c {
            Commodity::Green => Some(30.0),
            Commodity::Black => Some(70.0),
        }
    }

    #[test]
    fn test_fn_is_a_provider() {
        let p = Period::year(2030);
        assert_eq!(flat.price(Technology::Solar, Commodity::Black, "NSW", &p), Some(70.0));
    }

    #[test]
    fn test_closure_is_a_provider() {
        let base = 55.0;
        let provider = move |_: Technology, _: Commodity, _: &str, p: &Period| {
            Some(base + f64::from(p.year - 2030))
        };
        assert_eq!(
            provider.price(Technology::Wind, Commodity::Green, "SA", &Period::year(2032)),
            Some(57.0)
        );
    }

    #[test]
    fn test_no_prices() {
        assert_eq!(
            NoPrices.price(Technology::Storage, Commodity::Black, "QLD", &Period::year(2030)),
            None
        );
    }
}
