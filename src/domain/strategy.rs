//! Strategy transforms and the discrete trading signal they produce.

use crate::domain::error::BacktestError;
use crate::domain::frame::{Column, PriceFrame, SIGNAL_COLUMN};
use crate::domain::indicator::sma::{self, Sma};
use crate::domain::transform::{Params, Transform, period_param};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Short,
    Flat,
    Long,
}

impl Signal {
    pub fn as_i8(self) -> i8 {
        match self {
            Signal::Short => -1,
            Signal::Flat => 0,
            Signal::Long => 1,
        }
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.as_i8())
    }

    /// Long-only realization: shorts are held flat.
    pub fn long_exposure(self) -> u8 {
        match self {
            Signal::Long => 1,
            Signal::Short | Signal::Flat => 0,
        }
    }
}

/// Reads the `signal` column of a strategy's output.
///
/// Undefined entries read as [`Signal::Flat`]; anything other than -1, 0 or 1
/// is rejected, as is a column that is not one value per bar.
pub fn extract_signals(
    frame: &PriceFrame<'_>,
    strategy: &str,
) -> Result<Vec<Signal>, BacktestError> {
    let column = frame
        .column(SIGNAL_COLUMN)
        .ok_or_else(|| BacktestError::MissingSignal {
            strategy: strategy.to_string(),
        })?;
    if column.len() != frame.len() {
        return Err(BacktestError::ColumnLength {
            transform: strategy.to_string(),
            column: SIGNAL_COLUMN.to_string(),
            expected: frame.len(),
            got: column.len(),
        });
    }

    column
        .iter()
        .enumerate()
        .map(|(index, value)| match *value {
            None => Ok(Signal::Flat),
            Some(v) if v == 1.0 => Ok(Signal::Long),
            Some(v) if v == 0.0 => Ok(Signal::Flat),
            Some(v) if v == -1.0 => Ok(Signal::Short),
            Some(value) => Err(BacktestError::InvalidSignal { index, value }),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmaCrossParams {
    pub fast: usize,
    pub slow: usize,
}

impl SmaCrossParams {
    pub const DEFAULT_FAST: usize = 20;
    pub const DEFAULT_SLOW: usize = 50;

    pub fn from_params(params: &Params) -> Result<Self, BacktestError> {
        Ok(Self {
            fast: period_param("sma_cross", params, "fast", Self::DEFAULT_FAST)?,
            slow: period_param("sma_cross", params, "slow", Self::DEFAULT_SLOW)?,
        })
    }
}

/// +1 where fast > slow, -1 where fast < slow, 0 on ties and undefined bars.
pub fn cross_signal(fast: &Column, slow: &Column) -> Column {
    fast.iter()
        .zip(slow)
        .map(|(f, s)| {
            let signal = match (*f, *s) {
                (Some(f), Some(s)) if f > s => Signal::Long,
                (Some(f), Some(s)) if f < s => Signal::Short,
                _ => Signal::Flat,
            };
            Some(signal.as_f64())
        })
        .collect()
}

/// Moving-average crossover.
pub struct SmaCross;

impl Transform for SmaCross {
    fn name(&self) -> &'static str {
        "sma_cross"
    }

    fn accepted_params(&self) -> &'static [&'static str] {
        &["fast", "slow"]
    }

    fn apply<'a>(
        &self,
        frame: &PriceFrame<'a>,
        params: &Params,
    ) -> Result<PriceFrame<'a>, BacktestError> {
        let SmaCrossParams { fast, slow } = SmaCrossParams::from_params(params)?;

        let frame = Sma.apply(frame, &Params::from([("period".to_string(), fast as f64)]))?;
        let frame = Sma.apply(&frame, &Params::from([("period".to_string(), slow as f64)]))?;

        let missing = |period| BacktestError::Internal {
            message: format!("sma_cross: column {} was not produced", sma::sma_column(period)),
        };
        let fast_col = frame.column(&sma::sma_column(fast)).ok_or_else(|| missing(fast))?;
        let slow_col = frame.column(&sma::sma_column(slow)).ok_or_else(|| missing(slow))?;

        let signal = cross_signal(fast_col, slow_col);
        Ok(frame.with_column(SIGNAL_COLUMN, signal))
    }
}
