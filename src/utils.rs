// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};

static MDY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").expect("static date pattern"));

/// Parses `MM/DD/YYYY` (leading zeros optional). The error is a reason
/// suitable for a parse error message.
pub fn parse_mdy_date(s: &str) -> Result<NaiveDate, String> {
    if !MDY.is_match(s) {
        return Err("expected MM/DD/YYYY".to_string());
    }
    NaiveDate::parse_from_str(s, "%m/%d/%Y").map_err(|e| e.to_string())
}

pub fn parse_decimal(s: &str) -> Result<Decimal, String> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .map_err(|_| "expected a decimal number".to_string())
}

pub fn month_start(d: NaiveDate) -> NaiveDate {
    d - Days::new(u64::from(d.day0()))
}

pub fn next_month(month: NaiveDate) -> Option<NaiveDate> {
    month_start(month).checked_add_months(Months::new(1))
}

/// "July 2024"
pub fn month_label(month: NaiveDate) -> String {
    month.format("%B %Y").to_string()
}

/// Rounds to exactly two decimal places, half to even, starting from the
/// exact binary value of `v` (so `2.675` rounds to `2.67`). `None` for
/// non-finite or out-of-range input.
pub fn round_money(v: f64) -> Option<Decimal> {
    if !v.is_finite() {
        return None;
    }
    let mut d = Decimal::from_f64_retain(v)?
        .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    d.rescale(2);
    Some(d)
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("{:.2}", d)
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}
