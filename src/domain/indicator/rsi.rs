//! RSI (Relative Strength Index) indicator.
//!
//! Uses plain rolling means, not Wilder's smoothing:
//! - gain = mean of positive close deltas over the last n deltas
//! - loss = mean of |negative close deltas| over the last n deltas
//!
//! Formula: RSI = 100 - (100 / (1 + gain / loss))
//! Undefined where loss == 0.
//!
//! Warmup: first n bars undefined (the first bar has no delta).

use crate::domain::error::BacktestError;
use crate::domain::frame::{Column, PriceFrame, RSI_COLUMN};
use crate::domain::indicator::rolling_mean;
use crate::domain::transform::{Params, Transform, period_param};

pub const DEFAULT_PERIOD: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RsiParams {
    pub period: usize,
}

impl RsiParams {
    pub fn from_params(params: &Params) -> Result<Self, BacktestError> {
        Ok(Self {
            period: period_param("rsi", params, "period", DEFAULT_PERIOD)?,
        })
    }
}

pub fn calculate_rsi(closes: &[f64], period: usize) -> Column {
    let mut gains: Column = Vec::with_capacity(closes.len());
    let mut losses: Column = Vec::with_capacity(closes.len());

    for i in 0..closes.len() {
        if i == 0 {
            gains.push(None);
            losses.push(None);
            continue;
        }
        let change = closes[i] - closes[i - 1];
        gains.push(Some(change.max(0.0)));
        losses.push(Some((-change).max(0.0)));
    }

    let avg_gain = rolling_mean(&gains, period);
    let avg_loss = rolling_mean(&losses, period);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(gain, loss)| match (*gain, *loss) {
            (Some(gain), Some(loss)) if loss != 0.0 => Some(100.0 - 100.0 / (1.0 + gain / loss)),
            _ => None,
        })
        .collect()
}

pub struct Rsi;

impl Transform for Rsi {
    fn name(&self) -> &'static str {
        "rsi"
    }

    fn accepted_params(&self) -> &'static [&'static str] {
        &["period"]
    }

    fn apply<'a>(
        &self,
        frame: &PriceFrame<'a>,
        params: &Params,
    ) -> Result<PriceFrame<'a>, BacktestError> {
        let RsiParams { period } = RsiParams::from_params(params)?;
        Ok(frame.with_column(RSI_COLUMN, calculate_rsi(&frame.closes(), period)))
    }
}
