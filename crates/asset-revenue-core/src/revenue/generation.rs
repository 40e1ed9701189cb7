use crate::defaults;
use crate::model::{Asset, Constants, Period};

/// Capacity factor for `asset` in `period`.
///
/// Resolution order:
/// 1. the asset's own override for the requested quarter
/// 2. the mean of the asset's four quarterly overrides, when all four exist
/// 3. the constants table for (technology, region): the quarter entry for a
///    quarter-specific request, else the annual entry, else the mean of the
///    quarterly entries
/// 4. zero
pub fn resolve_capacity_factor(asset: &Asset, period: &Period, constants: &Constants) -> f64 {
    let quarter = period.quarter_of_year();

    if let Some(cf) = quarter.and_then(|q| asset.capacity_factors.get(q)) {
        return cf;
    }
    if let Some(cf) = asset.capacity_factors.annual_average() {
        return cf;
    }

    let Some(entry) = constants.capacity_factor_entry(asset.technology, &asset.region) else {
        return defaults::CAPACITY_FACTOR;
    };
    if let (Some(q), Some(quarterly)) = (quarter, entry.quarterly) {
        return quarterly[usize::from(q - 1)];
    }
    entry
        .annual
        .or_else(|| entry.quarterly.map(|q| q.iter().sum::<f64>() / 4.0))
        .unwrap_or(defaults::CAPACITY_FACTOR)
}

/// Annual degradation rate (percent) for `asset`.
pub fn resolve_degradation_pct(asset: &Asset, constants: &Constants) -> f64 {
    asset
        .degradation_pct
        .unwrap_or_else(|| constants.default_degradation(asset.technology))
}

/// `(1 - degradation/100)^(year - start_year)`.
///
/// Not clamped: for a year before commissioning the exponent is negative and
/// the factor exceeds one. Callers filter by operating window first.
pub fn degradation_factor(asset: &Asset, year: i32, constants: &Constants) -> f64 {
    let rate = resolve_degradation_pct(asset, constants);
    (1.0 - rate / 100.0).powi(year - asset.start_year())
}

/// Energy generated in `period`, MWh.
///
/// `capacity × volume_retained/100 × 8760 × capacity_factor × fraction × degradation`
pub fn period_generation(asset: &Asset, period: &Period, constants: &Constants) -> f64 {
    asset.capacity_mw
        * (asset.volume_retained_pct() / 100.0)
        * defaults::HOURS_IN_YEAR
        * resolve_capacity_factor(asset, period, constants)
        * period.fraction()
        * degradation_factor(asset, period.year, constants)
}
