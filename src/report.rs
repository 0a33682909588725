// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use comfy_table::Table;
use serde::Serialize;

use crate::error::Result;
use crate::models::{ForecastResult, MonthlySeries};
use crate::utils::{fmt_money, pretty_table};

pub fn series_table(series: &MonthlySeries) -> Table {
    let rows = series
        .iter()
        .map(|t| vec![t.month.format("%Y-%m").to_string(), fmt_money(&t.amount)])
        .collect();
    pretty_table(&["Month", "Amount"], rows)
}

pub fn forecast_table(result: &ForecastResult) -> Table {
    let detail = &result.forecast_detail;
    let mut rows = vec![
        vec!["Next month".to_string(), result.next_month.clone()],
        vec!["Forecast".to_string(), fmt_money(&result.forecasted_value)],
        vec!["Model".to_string(), detail.model.clone()],
    ];
    for iv in &detail.intervals {
        if let (Some(lo), Some(hi)) = (iv.lower.first(), iv.upper.first()) {
            rows.push(vec![
                format!("{}% interval", iv.level),
                format!("{:.2} .. {:.2}", lo, hi),
            ]);
        }
    }
    pretty_table(&["Field", "Value"], rows)
}

pub fn to_json<T: Serialize>(v: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(v)?)
}
