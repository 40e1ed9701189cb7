use rust_decimal::Decimal;

use crate::types::Rate;

/// `(1 + pct/100)^periods`. Negative periods deflate.
pub fn compound_factor(pct: f64, periods: i32) -> f64 {
    (1.0 + pct / 100.0).powi(periods)
}

/// Contract indexation factor after `years_since_start` years.
pub fn indexation_factor(indexation_pct: f64, years_since_start: i32) -> f64 {
    compound_factor(indexation_pct, years_since_start)
}

/// Convert a real (reference-year) price to nominal terms for `year`.
pub fn real_to_nominal(
    real_price: f64,
    escalation_pct: f64,
    year: i32,
    reference_year: i32,
) -> f64 {
    real_price * compound_factor(escalation_pct, year - reference_year)
}

/// Inverse of [`real_to_nominal`].
pub fn nominal_to_real(
    nominal_price: f64,
    escalation_pct: f64,
    year: i32,
    reference_year: i32,
) -> f64 {
    nominal_price / compound_factor(escalation_pct, year - reference_year)
}

/// Escalate a real price only for forecast years.
///
/// Years before `forecast_start_year` are actuals and are returned as-is.
/// With no boundary every year is treated as a forecast year.
pub fn escalate_forecast_price(
    real_price: f64,
    escalation_pct: f64,
    year: i32,
    reference_year: i32,
    forecast_start_year: Option<i32>,
) -> f64 {
    match forecast_start_year {
        Some(boundary) if year < boundary => real_price,
        _ => real_to_nominal(real_price, escalation_pct, year, reference_year),
    }
}

/// `base^n` via iterative multiplication (avoids `powd` drift). `None` on
/// overflow.
pub fn checked_powi(base: Decimal, n: u32) -> Option<Decimal> {
    let mut result = Decimal::ONE;
    for _ in 0..n {
        result = result.checked_mul(base)?;
    }
    Some(result)
}

/// [`checked_powi`], saturating at the representable bound.
pub fn decimal_powi(base: Decimal, n: u32) -> Decimal {
    checked_powi(base, n).unwrap_or(if base.is_sign_negative() && n % 2 == 1 {
        Decimal::MIN
    } else {
        Decimal::MAX
    })
}

/// Growth factor `(1 + pct/100)^n` for percentage escalations on money.
/// `None` when the factor does not fit in a `Decimal`.
pub fn checked_escalation(pct: Decimal, n: u32) -> Option<Decimal> {
    checked_powi(Decimal::ONE.saturating_add(pct / Decimal::ONE_HUNDRED), n)
}

/// [`checked_escalation`], saturating on overflow.
pub fn decimal_escalation(pct: Decimal, n: u32) -> Decimal {
    decimal_powi(Decimal::ONE.saturating_add(pct / Decimal::ONE_HUNDRED), n)
}

/// End-of-period discount factor `1 / (1 + rate)^periods`.
///
/// Zero when the compounded base collapses to zero (rate of -100%) or grows
/// past the `Decimal` range.
pub fn discount_factor(rate: Rate, periods: u32) -> Decimal {
    match checked_powi(Decimal::ONE.saturating_add(rate), periods) {
        Some(growth) if !growth.is_zero() => Decimal::ONE / growth,
        _ => Decimal::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_compound_factor_zero_periods() {
        assert_eq!(compound_factor(7.0, 0), 1.0);
    }

    #[test]
    fn test_real_to_nominal_known_value() {
        // 50 * 1.025^4 = 55.19064...
        let nominal = real_to_nominal(50.0, 2.5, 2029, 2025);
        assert_relative_eq!(nominal, 50.0 * 1.025_f64.powi(4), epsilon = 1e-12);
    }

    #[test]
    fn test_escalation_round_trip() {
        for year in 2015..2060 {
            let nominal = real_to_nominal(73.4, 3.1, year, 2025);
            let real = nominal_to_real(nominal, 3.1, year, 2025);
            assert_relative_eq!(real, 73.4, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_before_reference_year_deflates() {
        assert!(real_to_nominal(100.0, 2.5, 2020, 2025) < 100.0);
    }

    #[test]
    fn test_actual_years_not_escalated() {
        let p = escalate_forecast_price(80.0, 2.5, 2024, 2020, Some(2025));
        assert_eq!(p, 80.0);
        let p = escalate_forecast_price(80.0, 2.5, 2025, 2020, Some(2025));
        assert_relative_eq!(p, 80.0 * 1.025_f64.powi(5), epsilon = 1e-12);
    }

    #[test]
    fn test_no_boundary_escalates_all_years() {
        let p = escalate_forecast_price(80.0, 2.0, 2021, 2020, None);
        assert_relative_eq!(p, 81.6, epsilon = 1e-12);
    }

    #[test]
    fn test_decimal_powi() {
        assert_eq!(decimal_powi(dec!(1.1), 2), dec!(1.21));
        assert_eq!(decimal_powi(dec!(3), 0), Decimal::ONE);
    }

    #[test]
    fn test_decimal_escalation() {
        assert_eq!(decimal_escalation(dec!(10), 2), dec!(1.21));
    }

    #[test]
    fn test_discount_factor() {
        assert_eq!(discount_factor(dec!(0.25), 1), dec!(0.8));
        assert_eq!(discount_factor(dec!(-1), 3), Decimal::ZERO);
    }

    #[test]
    fn test_powi_overflow_saturates() {
        // 11^28 is past Decimal::MAX (~7.9e28).
        assert!(checked_powi(dec!(11), 27).is_some());
        assert_eq!(checked_powi(dec!(11), 28), None);
        assert_eq!(decimal_powi(dec!(11), 30), Decimal::MAX);
        assert_eq!(decimal_powi(dec!(-11), 29), Decimal::MIN);
    }

    #[test]
    fn test_escalation_overflow() {
        assert_eq!(checked_escalation(dec!(1000), 29), None);
        assert_eq!(decimal_escalation(dec!(1000), 29), Decimal::MAX);
        assert_eq!(checked_escalation(dec!(1000), 1), Some(dec!(11)));
    }

    #[test]
    fn test_discount_factor_past_range_is_zero() {
        // A rate of 10 is 1000%.
        assert_eq!(discount_factor(dec!(10), 30), Decimal::ZERO);
        assert!(discount_factor(dec!(10), 1) > Decimal::ZERO);
    }
}
