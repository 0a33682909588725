// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Monthly totals from a transaction file, and a next-month forecast of
//! those totals with automatic ARIMA.
//!
//! ```no_run
//! let series = monthcast::aggregate("transactions.csv", true, b',')?;
//! let result = monthcast::forecast_next_month(&series)?;
//! println!("{}: {}", result.next_month, result.forecasted_value);
//! # Ok::<(), monthcast::Error>(())
//! ```

pub mod aggregate;
pub mod arima;
pub mod error;
pub mod forecast;
pub mod models;
pub mod report;
pub mod utils;

pub use aggregate::{DateParser, LoadOptions, MonthDayYear, aggregate, aggregate_with};
pub use arima::{AutoArima, AutoArimaConfig};
pub use error::{Error, Result, Stage};
pub use forecast::{ModelFitter, ModelForecast, forecast_next_month, forecast_next_month_with};
pub use models::{ForecastDetail, ForecastResult, MonthlySeries, MonthlyTotal, Transaction};
