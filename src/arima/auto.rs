// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Automatic ARIMA over a monthly series, fitted with `anofox_forecast`.

use anofox_forecast::core::TimeSeries;
use anofox_forecast::models::Forecaster;
use anofox_forecast::models::arima::{ARIMA, AutoARIMA, AutoARIMAConfig};
use anofox_forecast::models::baseline::{Naive, RandomWalkWithDrift};
use anofox_forecast::validation::ljung_box;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::forecast::{ModelFitter, ModelForecast};
use crate::models::{
    ArimaOrder, CandidateScore, ForecastDetail, InformationCriterion, LjungBox, MonthlySeries,
    PredictionInterval,
};

/// Fewest months the stepwise/exhaustive order search accepts.
pub const SEARCH_MIN_OBSERVATIONS: usize = 10;

// (p, d, q) tried on series too short for the order search.
const SHORT_ORDERS: [(usize, usize, usize); 6] =
    [(0, 0, 0), (1, 0, 0), (0, 0, 1), (0, 1, 0), (1, 1, 0), (0, 1, 1)];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoArimaConfig {
    pub max_p: usize,
    pub max_q: usize,
    pub max_d: usize,
    pub stepwise: bool,
    pub criterion: InformationCriterion,
    /// Prediction interval levels in percent.
    pub levels: Vec<f64>,
}

impl Default for AutoArimaConfig {
    fn default() -> Self {
        Self {
            max_p: 5,
            max_q: 5,
            max_d: 2,
            stepwise: true,
            criterion: InformationCriterion::Aic,
            levels: vec![80.0, 95.0],
        }
    }
}

impl AutoArimaConfig {
    pub fn with_max_orders(mut self, max_p: usize, max_d: usize, max_q: usize) -> Self {
        self.max_p = max_p;
        self.max_d = max_d;
        self.max_q = max_q;
        self
    }

    pub fn with_criterion(mut self, criterion: InformationCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    pub fn with_levels(mut self, levels: Vec<f64>) -> Self {
        self.levels = levels;
        self
    }

    pub fn exhaustive(mut self) -> Self {
        self.stepwise = false;
        self
    }

    fn search_config(&self) -> AutoARIMAConfig {
        AutoARIMAConfig {
            max_p: self.max_p,
            max_q: self.max_q,
            max_d: self.max_d,
            stepwise: self.stepwise,
            use_aic: self.criterion == InformationCriterion::Aic,
            ..AutoARIMAConfig::default()
        }
    }

    fn admits(&self, (p, d, q): (usize, usize, usize)) -> bool {
        p <= self.max_p && d <= self.max_d && q <= self.max_q
    }
}

/// Picks an ARIMA order by information criterion and forecasts with it.
///
/// Series the criteria cannot rank get a closed-form model instead: a
/// constant series (including a single month) is forecast at its level,
/// an exactly linear one by its drift. Both have zero residual variance.
#[derive(Debug, Clone, Default)]
pub struct AutoArima {
    config: AutoArimaConfig,
}

struct Selection {
    forecaster: Box<dyn Forecaster>,
    // Source of coefficients and criteria; `None` for closed-form models.
    arima: Option<ARIMA>,
    order: ArimaOrder,
    intercept: f64,
    candidates: Vec<CandidateScore>,
}

impl AutoArima {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AutoArimaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AutoArimaConfig {
        &self.config
    }

    fn select(&self, series: &MonthlySeries) -> Result<Selection> {
        if series.is_empty() {
            return Err(Error::input("cannot fit a model to an empty series"));
        }
        let values = series.values_f64()?;
        let n = values.len();
        let ts = time_series(series, values.clone())?;

        if is_constant(&values) {
            let mut level = Naive::new();
            level.fit(&ts)?;
            info!(n, "constant series, forecasting its level");
            return Ok(Selection {
                forecaster: Box::new(level),
                arima: None,
                order: ArimaOrder::new(0, 0, 0),
                intercept: values[0],
                candidates: Vec::new(),
            });
        }

        if is_linear(&values) && self.config.max_d >= 1 {
            let mut walk = RandomWalkWithDrift::new();
            walk.fit(&ts)?;
            let drift = walk
                .drift()
                .ok_or_else(|| Error::model("random walk fitted without a drift"))?;
            info!(n, drift, "linear series, forecasting its drift");
            return Ok(Selection {
                forecaster: Box::new(walk),
                arima: None,
                order: ArimaOrder::new(0, 1, 0),
                intercept: drift,
                candidates: Vec::new(),
            });
        }

        if n < SEARCH_MIN_OBSERVATIONS {
            let (model, candidates) = self.short_search(&ts, n)?;
            Ok(selected(Box::new(model.clone()), model, candidates))
        } else {
            let (search, model, candidates) = self.order_search(&ts)?;
            Ok(selected(Box::new(search), model, candidates))
        }
    }

    fn order_search(&self, ts: &TimeSeries) -> Result<(AutoARIMA, ARIMA, Vec<CandidateScore>)> {
        let mut search = AutoARIMA::with_config(self.config.search_config());
        search.fit(ts)?;
        let (p, d, q) = search
            .selected_order()
            .ok_or_else(|| Error::model("order search selected no model"))?;
        let candidates = search
            .model_scores()
            .iter()
            .map(|(o, score)| CandidateScore {
                order: ArimaOrder::new(o.p, o.d, o.q),
                score: *score,
            })
            .collect();

        // The search keeps its winner private; refitting the same order on
        // the same data reproduces its coefficients.
        let mut model = ARIMA::new(p, d, q);
        model.fit(ts)?;
        Ok((search, model, candidates))
    }

    fn short_search(&self, ts: &TimeSeries, n: usize) -> Result<(ARIMA, Vec<CandidateScore>)> {
        let mut best: Option<(ARIMA, f64)> = None;
        let mut candidates = Vec::new();
        for (p, d, q) in SHORT_ORDERS {
            // more residuals than estimated coefficients
            if !self.config.admits((p, d, q)) || n < d + p.max(q) + p + q + 2 {
                continue;
            }
            let mut model = ARIMA::new(p, d, q);
            if let Err(e) = model.fit(ts) {
                debug!(p, d, q, error = %e, "candidate rejected");
                continue;
            }
            let score = match self.config.criterion {
                InformationCriterion::Aic => model.aic(),
                InformationCriterion::Bic => model.bic(),
            };
            let Some(score) = score.filter(|s| s.is_finite()) else {
                debug!(p, d, q, "candidate has no finite score");
                continue;
            };
            candidates.push(CandidateScore {
                order: ArimaOrder::new(p, d, q),
                score,
            });
            if best.as_ref().is_none_or(|(_, b)| score < *b) {
                best = Some((model, score));
            }
        }
        candidates.sort_by(|a, b| a.score.total_cmp(&b.score));
        let (model, _) = best.ok_or_else(|| {
            Error::model(format!("no low-order ARIMA could be fitted to {} months", n))
        })?;
        Ok((model, candidates))
    }
}

impl ModelFitter for AutoArima {
    fn fit_and_forecast(&self, series: &MonthlySeries, horizon: usize) -> Result<ModelForecast> {
        if horizon == 0 {
            return Err(Error::input("forecast horizon must be at least 1"));
        }
        if let Some(bad) = self.config.levels.iter().find(|&&l| !(l > 0.0 && l < 100.0)) {
            return Err(Error::input(format!("interval level {} is not a percentage", bad)));
        }

        let Selection {
            forecaster,
            arima,
            order,
            intercept,
            candidates,
        } = self.select(series)?;

        let point = forecaster.predict(horizon)?.primary().to_vec();
        if point.len() != horizon {
            return Err(Error::model(format!(
                "{} returned {} forecasts for a horizon of {}",
                describe(order),
                point.len(),
                horizon
            )));
        }
        if let Some(bad) = point.iter().find(|v| !v.is_finite()) {
            return Err(Error::model(format!(
                "{} produced a non-finite forecast {}",
                describe(order),
                bad
            )));
        }

        let mut intervals = Vec::with_capacity(self.config.levels.len());
        for &level in &self.config.levels {
            let bounds = forecaster.predict_with_intervals(horizon, level / 100.0)?;
            let lower = bounds.lower().and_then(|l| l.first());
            let upper = bounds.upper().and_then(|u| u.first());
            if let (Some(lower), Some(upper)) = (lower, upper) {
                intervals.push(PredictionInterval {
                    level,
                    lower: lower.clone(),
                    upper: upper.clone(),
                });
            }
        }

        // ARIMA pads the warm-up with zeros; the baselines leave it NaN.
        let warmup = arima.as_ref().map_or(0, |_| order.p.max(order.q));
        let residuals: Vec<f64> = forecaster
            .residuals()
            .unwrap_or_default()
            .iter()
            .skip(warmup)
            .copied()
            .filter(|r| r.is_finite())
            .collect();
        let lb = ljung_box(&residuals, None, order.p + order.q);
        let ljung_box = lb.statistic.is_finite().then(|| LjungBox {
            statistic: lb.statistic,
            p_value: lb.p_value,
            lags: lb.lags,
            df: lb.df,
        });

        let detail = ForecastDetail {
            model: describe(order),
            order: Some(order),
            ar: arima.as_ref().map(|m| m.ar_coefficients().to_vec()).unwrap_or_default(),
            ma: arima.as_ref().map(|m| m.ma_coefficients().to_vec()).unwrap_or_default(),
            intercept,
            aic: arima.as_ref().and_then(ARIMA::aic),
            bic: arima.as_ref().and_then(ARIMA::bic),
            criterion: self.config.criterion,
            point_forecasts: point.clone(),
            intervals,
            residuals,
            ljung_box,
            candidates,
        };
        Ok(ModelForecast { point, detail })
    }
}

fn selected(
    forecaster: Box<dyn Forecaster>,
    model: ARIMA,
    candidates: Vec<CandidateScore>,
) -> Selection {
    let spec = model.spec();
    let order = ArimaOrder::new(spec.p, spec.d, spec.q);
    info!(
        model = %describe(order),
        candidates = candidates.len(),
        "selected model"
    );
    Selection {
        forecaster,
        intercept: model.intercept(),
        arima: Some(model),
        order,
        candidates,
    }
}

pub fn describe(order: ArimaOrder) -> String {
    let base = format!("ARIMA({},{},{})", order.p, order.d, order.q);
    match order.d {
        0 => format!("{} with non-zero mean", base),
        1 => format!("{} with drift", base),
        _ => format!("{} with constant", base),
    }
}

fn time_series(series: &MonthlySeries, values: Vec<f64>) -> Result<TimeSeries> {
    let stamps = series
        .months()
        .map(|m| m.and_time(NaiveTime::MIN).and_utc())
        .collect();
    Ok(TimeSeries::univariate(stamps, values)?)
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

// Two points are always linear.
fn is_linear(values: &[f64]) -> bool {
    let mut steps = values.windows(2).map(|w| w[1] - w[0]);
    match steps.next() {
        Some(first) => steps.all(|s| s == first),
        None => false,
    }
}
