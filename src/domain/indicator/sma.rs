//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]). Warmup: first (n-1) bars undefined.

use crate::domain::error::BacktestError;
use crate::domain::frame::{Column, PriceFrame};
use crate::domain::indicator::rolling_mean;
use crate::domain::transform::{Params, Transform, period_param};

pub const DEFAULT_PERIOD: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmaParams {
    pub period: usize,
}

impl SmaParams {
    pub fn from_params(params: &Params) -> Result<Self, BacktestError> {
        Ok(Self {
            period: period_param("sma", params, "period", DEFAULT_PERIOD)?,
        })
    }
}

pub fn sma_column(period: usize) -> String {
    format!("sma_{period}")
}

pub fn calculate_sma(closes: &[f64], period: usize) -> Column {
    let values: Vec<Option<f64>> = closes.iter().copied().map(Some).collect();
    rolling_mean(&values, period)
}

pub struct Sma;

impl Transform for Sma {
    fn name(&self) -> &'static str {
        "sma"
    }

    fn accepted_params(&self) -> &'static [&'static str] {
        &["period"]
    }

    fn apply<'a>(
        &self,
        frame: &PriceFrame<'a>,
        params: &Params,
    ) -> Result<PriceFrame<'a>, BacktestError> {
        let SmaParams { period } = SmaParams::from_params(params)?;
        let values = calculate_sma(&frame.closes(), period);
        Ok(frame.with_column(sma_column(period), values))
    }
}
