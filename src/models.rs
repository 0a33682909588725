// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::utils::month_start;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub month: NaiveDate, // always the 1st
    pub amount: Decimal,
}

/// Monthly totals, one entry per month, ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MonthlySeries {
    totals: Vec<MonthlyTotal>,
}

impl MonthlySeries {
    /// Builds a series from arbitrary totals. Months are truncated to the
    /// first day and sorted; a month given twice is rejected.
    pub fn new(totals: Vec<MonthlyTotal>) -> Result<Self> {
        let mut totals: Vec<MonthlyTotal> = totals
            .into_iter()
            .map(|t| MonthlyTotal {
                month: month_start(t.month),
                amount: t.amount,
            })
            .collect();
        totals.sort_by_key(|t| t.month);
        if let Some(w) = totals.windows(2).find(|w| w[0].month == w[1].month) {
            return Err(Error::input(format!(
                "month {} appears more than once",
                w[0].month.format("%Y-%m")
            )));
        }
        Ok(Self { totals })
    }

    // Caller guarantees unique, ascending, first-of-month keys.
    pub(crate) fn from_sorted(totals: Vec<MonthlyTotal>) -> Self {
        Self { totals }
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MonthlyTotal> {
        self.totals.iter()
    }

    pub fn as_slice(&self) -> &[MonthlyTotal] {
        &self.totals
    }

    pub fn months(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.totals.iter().map(|t| t.month)
    }

    pub fn first(&self) -> Option<&MonthlyTotal> {
        self.totals.first()
    }

    pub fn last(&self) -> Option<&MonthlyTotal> {
        self.totals.last()
    }

    /// Sum over all months; `None` on decimal overflow.
    pub fn total(&self) -> Option<Decimal> {
        self.totals
            .iter()
            .try_fold(Decimal::ZERO, |acc, t| acc.checked_add(t.amount))
    }

    /// Amounts as floats for model fitting.
    pub fn values_f64(&self) -> Result<Vec<f64>> {
        self.totals
            .iter()
            .map(|t| {
                t.amount.to_f64().ok_or_else(|| {
                    Error::input(format!(
                        "amount {} for {} is not representable as f64",
                        t.amount,
                        t.month.format("%Y-%m")
                    ))
                })
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a MonthlySeries {
    type Item = &'a MonthlyTotal;
    type IntoIter = std::slice::Iter<'a, MonthlyTotal>;

    fn into_iter(self) -> Self::IntoIter {
        self.totals.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl ArimaOrder {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InformationCriterion {
    #[default]
    Aic,
    Bic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionInterval {
    pub level: f64, // percent, e.g. 95.0
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LjungBox {
    pub statistic: f64,
    pub p_value: f64,
    pub lags: usize,
    pub df: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub order: ArimaOrder,
    pub score: f64,
}

/// Everything the model fitter reports beyond the point forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDetail {
    pub model: String,
    pub order: Option<ArimaOrder>,
    pub ar: Vec<f64>,
    pub ma: Vec<f64>,
    /// Mean for d = 0, drift for d = 1.
    pub intercept: f64,
    pub aic: Option<f64>,
    pub bic: Option<f64>,
    pub criterion: InformationCriterion,
    pub point_forecasts: Vec<f64>,
    pub intervals: Vec<PredictionInterval>,
    pub residuals: Vec<f64>,
    pub ljung_box: Option<LjungBox>,
    pub candidates: Vec<CandidateScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub next_month: String,
    pub forecasted_value: Decimal,
    pub forecast_detail: ForecastDetail,
}
