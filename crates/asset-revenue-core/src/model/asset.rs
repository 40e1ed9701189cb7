use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::defaults::{self, lenient_f64, lenient_opt_f64};
use crate::types::Technology;

/// Optional per-quarter capacity-factor overrides (fractions, e.g. 0.28).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuarterlyCapacityFactors {
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub q1: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub q2: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub q3: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub q4: Option<f64>,
}

impl QuarterlyCapacityFactors {
    pub fn get(&self, quarter: u8) -> Option<f64> {
        match quarter {
            1 => self.q1,
            2 => self.q2,
            3 => self.q3,
            4 => self.q4,
            _ => None,
        }
    }

    /// Mean of the four quarters, only when all four are present.
    pub fn annual_average(&self) -> Option<f64> {
        match (self.q1, self.q2, self.q3, self.q4) {
            (Some(a), Some(b), Some(c), Some(d)) => Some((a + b + c + d) / 4.0),
            _ => None,
        }
    }
}

/// Contract structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractKind {
    /// Green certificates only.
    Green,
    /// Physical energy only.
    Black,
    /// Green and black sold together with separate prices.
    Bundled,
    /// A fixed annual amount independent of volume.
    #[serde(alias = "fixed", alias = "fixed-revenue")]
    FixedRevenue,
}

/// A sale contract over part of an asset's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub counterparty: String,
    pub kind: ContractKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Share of asset output sold under this contract, 0..=100.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub buyer_pct: f64,
    /// Price per MWh for green/black contracts; annual amount in millions
    /// for fixed-revenue contracts.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub strike_price: f64,
    /// Bundled contracts only.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub green_price: f64,
    /// Bundled contracts only.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub black_price: f64,
    /// Annual compounding indexation, percent.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub indexation_pct: f64,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub floor_price: Option<f64>,
}

impl Contract {
    /// Active iff `year` lies within the contract's start and end years, inclusive.
    pub fn is_active(&self, year: i32) -> bool {
        self.start_date.year() <= year && year <= self.end_date.year()
    }

    pub fn years_since_start(&self, year: i32) -> i32 {
        year - self.start_date.year()
    }
}

/// A generating asset and the contracts it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub technology: Technology,
    pub region: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub capacity_mw: f64,
    pub start_date: NaiveDate,
    /// Operating life in years; 0 means no end of life.
    #[serde(default)]
    pub asset_life_years: u32,
    /// Output retained after losses, percent.
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub volume_loss_adjustment: Option<f64>,
    /// Annual degradation, percent. Falls back to the technology default.
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub degradation_pct: Option<f64>,
    #[serde(default)]
    pub capacity_factors: QuarterlyCapacityFactors,
    #[serde(default)]
    pub contracts: Vec<Contract>,
}

impl Asset {
    pub fn start_year(&self) -> i32 {
        self.start_date.year()
    }

    /// Last operating year, if the asset retires.
    pub fn end_year(&self) -> Option<i32> {
        (self.asset_life_years > 0).then(|| self.start_year() + self.asset_life_years as i32 - 1)
    }

    pub fn is_operational(&self, year: i32) -> bool {
        year >= self.start_year() && self.end_year().map_or(true, |end| year <= end)
    }

    pub fn volume_retained_pct(&self) -> f64 {
        self.volume_loss_adjustment
            .unwrap_or(defaults::VOLUME_LOSS_ADJUSTMENT_PCT)
    }

    pub fn active_contracts(&self, year: i32) -> impl Iterator<Item = &Contract> + '_ {
        self.contracts.iter().filter(move |c| c.is_active(year))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn contract(start: i32, end: i32) -> Contract {
        Contract {
            id: "c1".into(),
            counterparty: String::new(),
            kind: ContractKind::Black,
            start_date: date(start, 7, 1),
            end_date: date(end, 6, 30),
            buyer_pct: 50.0,
            strike_price: 60.0,
            green_price: 0.0,
            black_price: 0.0,
            indexation_pct: 0.0,
            floor_price: None,
        }
    }

    #[test]
    fn test_contract_active_inclusive_by_year() {
        let c = contract(2025, 2030);
        assert!(!c.is_active(2024));
        assert!(c.is_active(2025));
        assert!(c.is_active(2030));
        assert!(!c.is_active(2031));
    }

    #[test]
    fn test_quarterly_average_requires_all_four() {
        let mut q = QuarterlyCapacityFactors {
            q1: Some(0.2),
            q2: Some(0.3),
            q3: Some(0.4),
            q4: None,
        };
        assert_eq!(q.annual_average(), None);
        q.q4 = Some(0.1);
        assert!((q.annual_average().unwrap() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_deserialize_with_coercion_and_aliases() {
        let json = r#"{
            "id": "A",
            "technology": "solar",
            "region": "NSW",
            "capacity_mw": "100",
            "start_date": "2024-01-01",
            "volume_loss_adjustment": "",
            "contracts": [{
                "kind": "fixed-revenue",
                "start_date": "2024-01-01",
                "end_date": "2034-12-31",
                "buyer_pct": "abc",
                "strike_price": 2.5
            }]
        }"#;
        let a: Asset = serde_json::from_str(json).unwrap();
        assert_eq!(a.capacity_mw, 100.0);
        assert_eq!(a.volume_loss_adjustment, None);
        assert_eq!(a.volume_retained_pct(), 100.0);
        assert_eq!(a.contracts[0].kind, ContractKind::FixedRevenue);
        assert_eq!(a.contracts[0].buyer_pct, 0.0);
    }

    #[test]
    fn test_operational_window() {
        let json = r#"{"id":"W","technology":"wind","region":"VIC",
            "start_date":"2026-03-01","asset_life_years":25}"#;
        let a: Asset = serde_json::from_str(json).unwrap();
        assert!(!a.is_operational(2025));
        assert!(a.is_operational(2026));
        assert!(a.is_operational(2050));
        assert!(!a.is_operational(2051));
    }
}
