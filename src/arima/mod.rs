// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Non-seasonal ARIMA order selection and forecasting.

mod auto;

pub use auto::{AutoArima, AutoArimaConfig, SEARCH_MIN_OBSERVATIONS, describe};
