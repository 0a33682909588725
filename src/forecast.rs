// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! One-step-ahead forecast of a monthly series.

use tracing::info;

use crate::arima::AutoArima;
use crate::error::{Error, Result};
use crate::models::{ForecastDetail, ForecastResult, MonthlySeries};
use crate::utils::{month_label, next_month, round_money};

/// Output of a [`ModelFitter`]: point forecasts for each step ahead and
/// whatever else the fitter reports.
#[derive(Debug, Clone)]
pub struct ModelForecast {
    pub point: Vec<f64>,
    pub detail: ForecastDetail,
}

/// Fits a model to the monthly amounts and forecasts `horizon` months past
/// the last one. The series is never empty.
pub trait ModelFitter {
    fn fit_and_forecast(&self, series: &MonthlySeries, horizon: usize) -> Result<ModelForecast>;
}

/// Forecasts the month after the last entry of `series` with automatic
/// ARIMA.
pub fn forecast_next_month(series: &MonthlySeries) -> Result<ForecastResult> {
    forecast_next_month_with(series, &AutoArima::default())
}

pub fn forecast_next_month_with(
    series: &MonthlySeries,
    fitter: &dyn ModelFitter,
) -> Result<ForecastResult> {
    let last = series
        .last()
        .ok_or_else(|| Error::input("cannot forecast an empty series"))?;
    let month = next_month(last.month).ok_or_else(|| {
        Error::input(format!("no calendar month follows {}", last.month.format("%Y-%m")))
    })?;

    let ModelForecast { point, detail } = fitter.fit_and_forecast(series, 1)?;
    let raw = *point
        .first()
        .ok_or_else(|| Error::model("model returned no forecast"))?;
    let forecasted_value =
        round_money(raw).ok_or_else(|| Error::model(format!("forecast {} is not finite", raw)))?;

    let next_month = month_label(month);
    info!(%next_month, %forecasted_value, model = %detail.model, "forecast ready");
    Ok(ForecastResult {
        next_month,
        forecasted_value,
        forecast_detail: detail,
    })
}
