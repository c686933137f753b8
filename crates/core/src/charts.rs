//! Reshaping of dashboard aggregates into chart-ready series.
//!
//! The chart primitives themselves live in the rendering layer and only
//! accept plain point arrays; everything here is arithmetic on month keys.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::{RevenueMonth, SubscriberMonth};

/// Number of months shown on the revenue and growth charts.
pub const CHART_MONTHS: u32 = 6;

/// Horizontal spacing between growth chart points.
pub const GROWTH_X_STEP: f64 = 70.0;

/// Growth chart baseline and per-subscriber vertical scale.
const GROWTH_Y_BASE: f64 = 100.0;
const GROWTH_Y_SCALE: f64 = 5.0;

// ---------------------------------------------------------------------------
// Currency
// ---------------------------------------------------------------------------

/// Display currency for revenue figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Ngn,
    Usd,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ngn => "NGN",
            Self::Usd => "USD",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Ngn => "₦",
            Self::Usd => "$",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::Ngn => Self::Usd,
            Self::Usd => Self::Ngn,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NGN" => Ok(Self::Ngn),
            "USD" => Ok(Self::Usd),
            other => Err(CoreError::InvalidInput(format!("unknown currency: {other}"))),
        }
    }
}

/// Reporting window on the finance screen tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FinanceWindow {
    #[default]
    TwelveMonths,
    ThirtyDays,
    SevenDays,
    TwentyFourHours,
}

impl FinanceWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TwelveMonths => "12m",
            Self::ThirtyDays => "30d",
            Self::SevenDays => "7d",
            Self::TwentyFourHours => "24h",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::TwelveMonths => "12 Months",
            Self::ThirtyDays => "30 Days",
            Self::SevenDays => "7 Days",
            Self::TwentyFourHours => "24 Hours",
        }
    }
}

impl fmt::Display for FinanceWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FinanceWindow {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "12m" => Ok(Self::TwelveMonths),
            "30d" => Ok(Self::ThirtyDays),
            "7d" => Ok(Self::SevenDays),
            "24h" => Ok(Self::TwentyFourHours),
            other => Err(CoreError::InvalidInput(format!("unknown window: {other}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Month keys
// ---------------------------------------------------------------------------

/// Parse a `YYYY-MM` key into the first day of that month.
pub fn parse_month_key(key: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(&format!("{key}-01"), "%Y-%m-%d")
        .map_err(|e| CoreError::InvalidInput(format!("bad month key {key:?}: {e}")))
}

pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// The `count` months ending at `latest`, oldest first.
pub fn trailing_months(latest: NaiveDate, count: u32) -> Vec<NaiveDate> {
    (0..count)
        .rev()
        .filter_map(|back| latest.checked_sub_months(Months::new(back)))
        .collect()
}

/// Latest parseable month among `keys`; unparseable keys are skipped.
fn latest_month<'a>(keys: impl Iterator<Item = &'a str>) -> Option<NaiveDate> {
    keys.filter_map(|k| parse_month_key(k).ok()).max()
}

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

/// A point on the revenue line chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenuePoint {
    pub month: String,
    pub year: i32,
    pub usd: f64,
    pub naira: f64,
}

impl RevenuePoint {
    pub fn amount(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Usd => self.usd,
            Currency::Ngn => self.naira,
        }
    }
}

/// A point on the subscriber growth chart, with plot coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthPoint {
    pub month: String,
    pub year: i32,
    pub value: u64,
    pub x: f64,
    pub y: f64,
}

/// Trailing six months of revenue ending at the latest month in `data`.
///
/// Missing months are filled with zero. Empty input yields an empty series.
pub fn revenue_series(data: &[RevenueMonth]) -> Vec<RevenuePoint> {
    let Some(latest) = latest_month(data.iter().map(|m| m.month.as_str())) else {
        return Vec::new();
    };
    let lookup: HashMap<&str, &RevenueMonth> =
        data.iter().map(|m| (m.month.as_str(), m)).collect();

    trailing_months(latest, CHART_MONTHS)
        .into_iter()
        .map(|date| {
            let key = month_key(date);
            let (usd, naira) = lookup
                .get(key.as_str())
                .map(|m| (m.usd, m.naira))
                .unwrap_or((0.0, 0.0));
            RevenuePoint {
                month: date.format("%B").to_string(),
                year: date.year(),
                usd,
                naira,
            }
        })
        .collect()
}

/// Trailing six months of subscriber counts with plot coordinates.
pub fn subscriber_growth_series(data: &[SubscriberMonth]) -> Vec<GrowthPoint> {
    let Some(latest) = latest_month(data.iter().map(|m| m.month.as_str())) else {
        return Vec::new();
    };
    let lookup: HashMap<&str, u64> = data.iter().map(|m| (m.month.as_str(), m.count)).collect();

    trailing_months(latest, CHART_MONTHS)
        .into_iter()
        .enumerate()
        .map(|(i, date)| {
            let value = lookup.get(month_key(date).as_str()).copied().unwrap_or(0);
            GrowthPoint {
                month: date.format("%B").to_string(),
                year: date.year(),
                value,
                x: i as f64 * GROWTH_X_STEP,
                y: GROWTH_Y_BASE - value as f64 * GROWTH_Y_SCALE,
            }
        })
        .collect()
}

/// Donut chart split between subscribers and non-subscribers, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubscriberShare {
    pub subscribers: f64,
    pub non_subscribers: f64,
}

pub fn subscriber_share(total_subscribers: u64, total_users: u64) -> SubscriberShare {
    let subscribers = if total_users == 0 {
        0.0
    } else {
        (total_subscribers as f64 / total_users as f64 * 100.0).clamp(0.0, 100.0)
    };
    SubscriberShare {
        subscribers,
        non_subscribers: 100.0 - subscribers,
    }
}

// ---------------------------------------------------------------------------
// Number formatting
// ---------------------------------------------------------------------------

/// Thousands-separated integer, e.g. `10456` -> `10,456`.
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Compact summary-card figure, e.g. `15000` -> `15K`, `10_700_000` -> `10.7M`.
pub fn format_compact(n: f64) -> String {
    const UNITS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];
    for (scale, suffix) in UNITS {
        if n.abs() >= scale {
            let scaled = (n / scale * 10.0).round() / 10.0;
            return if scaled.fract() == 0.0 {
                format!("{}{suffix}", scaled as i64)
            } else {
                format!("{scaled:.1}{suffix}")
            };
        }
    }
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{n:.1}")
    }
}
