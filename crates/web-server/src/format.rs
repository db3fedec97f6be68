//! Cell formatting for CSV exports.
//!
//! Numbers never carry thousands separators so the files load cleanly into
//! spreadsheets and downstream imports.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// `m/d/Y`, or empty.
pub fn date(value: Option<NaiveDate>) -> String {
    value.map(|d| d.format("%m/%d/%Y").to_string()).unwrap_or_default()
}

/// Plain decimal at `dp` places, half away from zero. Empty when absent.
pub fn decimal(value: Option<Decimal>, dp: u32) -> String {
    value.map(|v| fixed(v, dp)).unwrap_or_default()
}

/// Ratios always render at four places.
pub fn ratio(value: Option<Decimal>) -> String {
    decimal(value, 4)
}

/// `$` plus two places. Empty when absent.
pub fn currency(value: Option<Decimal>) -> String {
    value.map(|v| format!("${}", fixed(v, 2))).unwrap_or_default()
}

/// Currency from raw text. Blank or non-numeric input renders empty.
pub fn currency_text(value: Option<&str>) -> String {
    currency(value.map(str::trim).and_then(|v| v.parse::<Decimal>().ok()))
}

pub fn float(value: Option<f64>, dp: usize) -> String {
    value.map(|v| format!("{v:.dp$}")).unwrap_or_default()
}

pub fn int<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Whole-number cast of a decimal amount, zero when absent.
pub fn whole(value: Option<Decimal>) -> String {
    value
        .and_then(|v| v.trunc().to_i64())
        .unwrap_or(0)
        .to_string()
}

pub fn text(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

fn fixed(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", dp as usize, rounded)
}
