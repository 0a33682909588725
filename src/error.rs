// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage an [`Error`] originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Parse,
    Aggregate,
    Forecast,
    Report,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Load => "load",
            Stage::Parse => "parse",
            Stage::Aggregate => "aggregate",
            Stage::Forecast => "forecast",
            Stage::Report => "report",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Missing required column '{column}'{}", fmt_line(*line))]
    Schema {
        column: &'static str,
        line: Option<u64>,
    },
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid {field} '{value}' on line {line}: {reason}")]
    Parse {
        line: u64,
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error("Amount total for {month} overflows")]
    Overflow { month: NaiveDate },
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Model fitting failed: {0}")]
    Model(String),
    #[error("Model fitting failed: {0}")]
    Fit(#[from] anofox_forecast::ForecastError),
    #[error("Cannot serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn stage(&self) -> Stage {
        match self {
            Error::Io { .. } | Error::Schema { .. } => Stage::Load,
            Error::Csv(_) | Error::Parse { .. } => Stage::Parse,
            Error::Overflow { .. } => Stage::Aggregate,
            Error::Input(_) | Error::Model(_) | Error::Fit(_) => Stage::Forecast,
            Error::Json(_) => Stage::Report,
        }
    }

    pub(crate) fn input(msg: impl Into<String>) -> Self {
        Error::Input(msg.into())
    }

    pub(crate) fn model(msg: impl Into<String>) -> Self {
        Error::Model(msg.into())
    }
}

fn fmt_line(line: Option<u64>) -> String {
    match line {
        Some(l) => format!(" on line {}", l),
        None => String::new(),
    }
}
