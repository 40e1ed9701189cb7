use serde::{Deserialize, Serialize};
use std::fmt;

/// The part of a year a calculation covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubPeriod {
    Year,
    /// 1..=4
    Quarter(u8),
    /// 1..=12
    Month(u8),
}

/// A calendar period: a whole year, a quarter, or a month.
///
/// Serialized as its key: `"2030"`, `"2030-Q2"` or `"2030-05"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Period {
    pub year: i32,
    pub sub: SubPeriod,
}

impl Period {
    pub fn year(year: i32) -> Self {
        Period {
            year,
            sub: SubPeriod::Year,
        }
    }

    pub fn quarter(year: i32, quarter: u8) -> Self {
        Period {
            year,
            sub: SubPeriod::Quarter(quarter.clamp(1, 4)),
        }
    }

    pub fn month(year: i32, month: u8) -> Self {
        Period {
            year,
            sub: SubPeriod::Month(month.clamp(1, 12)),
        }
    }

    /// Share of a year this period represents.
    pub fn fraction(&self) -> f64 {
        match self.sub {
            SubPeriod::Year => 1.0,
            SubPeriod::Quarter(_) => 0.25,
            SubPeriod::Month(_) => 1.0 / 12.0,
        }
    }

    /// The quarter this period falls in, if it is shorter than a year.
    pub fn quarter_of_year(&self) -> Option<u8> {
        match self.sub {
            SubPeriod::Year => None,
            SubPeriod::Quarter(q) => Some(q),
            SubPeriod::Month(m) => Some((m - 1) / 3 + 1),
        }
    }

    pub fn is_annual(&self) -> bool {
        self.sub == SubPeriod::Year
    }

    /// Canonical key used by price providers.
    pub fn key(&self) -> String {
        match self.sub {
            SubPeriod::Year => format!("{}", self.year),
            SubPeriod::Quarter(q) => format!("{}-Q{}", self.year, q),
            SubPeriod::Month(m) => format!("{}-{:02}", self.year, m),
        }
    }

    /// Parse a bare year, `YYYY-Qn`, `YYYY-MM`, or a `YYYY-MM-DD` date
    /// (which resolves to its month).
    pub fn parse(key: &str) -> Option<Period> {
        let key = key.trim();
        let mut parts = key.splitn(3, '-');
        let year: i32 = parts.next()?.parse().ok()?;
        match parts.next() {
            None => Some(Period::year(year)),
            Some(sub) => {
                if let Some(q) = sub.strip_prefix('Q').or_else(|| sub.strip_prefix('q')) {
                    let q: u8 = q.parse().ok()?;
                    (1..=4).contains(&q).then(|| Period::quarter(year, q))
                } else {
                    let m: u8 = sub.parse().ok()?;
                    (1..=12).contains(&m).then(|| Period::month(year, m))
                }
            }
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl From<Period> for String {
    fn from(p: Period) -> String {
        p.key()
    }
}

impl TryFrom<String> for Period {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Period::parse(&s).ok_or_else(|| format!("unrecognised period '{s}'"))
    }
}

/// How results are bucketed across the analysis window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One result per year, no sub-annual split.
    #[default]
    None,
    Monthly,
    Quarterly,
    Yearly,
}

impl Granularity {
    /// The periods making up `year` at this granularity.
    pub fn periods(&self, year: i32) -> Vec<Period> {
        match self {
            Granularity::None | Granularity::Yearly => vec![Period::year(year)],
            Granularity::Quarterly => (1..=4).map(|q| Period::quarter(year, q)).collect(),
            Granularity::Monthly => (1..=12).map(|m| Period::month(year, m)).collect(),
        }
    }
}
