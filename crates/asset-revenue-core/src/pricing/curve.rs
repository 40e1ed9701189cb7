use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::provider::PriceProvider;
use crate::defaults::lenient_opt_f64;
use crate::model::Period;
use crate::types::{Commodity, Technology};

/// One point on a real price curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Generation profile the price applies to.
    pub profile: Technology,
    pub commodity: Commodity,
    pub region: String,
    pub period: Period,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub price: Option<f64>,
}

type CurveKey = (Technology, Commodity, String);

/// Table-backed price provider built from a list of [`PricePoint`]s.
///
/// Lookup order for a request:
/// 1. the exact period
/// 2. the whole year, for a quarter or month request
/// 3. the mean of every sub-annual point in that year
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<PricePoint>", into = "Vec<PricePoint>")]
pub struct PriceCurve {
    curves: HashMap<CurveKey, BTreeMap<Period, f64>>,
}

impl PriceCurve {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        profile: Technology,
        commodity: Commodity,
        region: &str,
        period: Period,
        price: f64,
    ) {
        self.curves
            .entry((profile, commodity, region.to_ascii_uppercase()))
            .or_default()
            .insert(period, price);
    }

    pub fn len(&self) -> usize {
        self.curves.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(
        &self,
        profile: Technology,
        commodity: Commodity,
        region: &str,
        period: &Period,
    ) -> Option<f64> {
        let curve = self
            .curves
            .get(&(profile, commodity, region.to_ascii_uppercase()))?;

        if let Some(p) = curve.get(period) {
            return Some(*p);
        }
        if !period.is_annual() {
            if let Some(p) = curve.get(&Period::year(period.year)) {
                return Some(*p);
            }
        }

        let sub_annual: Vec<f64> = curve
            .range(Period::year(period.year)..Period::year(period.year + 1))
            .filter(|(k, _)| !k.is_annual())
            .map(|(_, v)| *v)
            .collect();
        if sub_annual.is_empty() {
            None
        } else {
            Some(sub_annual.iter().sum::<f64>() / sub_annual.len() as f64)
        }
    }
}

impl PriceProvider for PriceCurve {
    fn price(
        &self,
        technology: Technology,
        commodity: Commodity,
        region: &str,
        period: &Period,
    ) -> Option<f64> {
        self.lookup(technology, commodity, region, period)
    }
}

impl From<Vec<PricePoint>> for PriceCurve {
    fn from(points: Vec<PricePoint>) -> Self {
        let mut curve = PriceCurve::new();
        for p in points {
            if let Some(price) = p.price {
                curve.insert(p.profile, p.commodity, &p.region, p.period, price);
            }
        }
        curve
    }
}

impl From<PriceCurve> for Vec<PricePoint> {
    fn from(curve: PriceCurve) -> Self {
        let mut points: Vec<PricePoint> = curve
            .curves
            .into_iter()
            .flat_map(|((profile, commodity, region), periods)| {
                periods.into_iter().map(move |(period, price)| PricePoint {
                    profile,
                    commodity,
                    region: region.clone(),
                    period,
                    price: Some(price),
                })
            })
            .collect();
        points.sort_by(|a, b| {
            (a.profile, a.commodity, &a.region, a.period)
                .cmp(&(b.profile, b.commodity, &b.region, b.period))
        });
        points
    }
}
