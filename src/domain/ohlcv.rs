//! Price bar representation and series checks.

use chrono::NaiveDateTime;

use crate::domain::error::BacktestError;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// (high / close, low / close), or `None` when close is not positive.
    pub fn intrabar_ratios(&self) -> Option<(f64, f64)> {
        if self.close > 0.0 {
            Some((self.high / self.close, self.low / self.close))
        } else {
            None
        }
    }
}

/// Checks the input contract: non-empty, strictly increasing timestamps.
pub fn validate_series(bars: &[PriceBar]) -> Result<(), BacktestError> {
    if bars.is_empty() {
        return Err(BacktestError::EmptySeries);
    }
    for (i, w) in bars.windows(2).enumerate() {
        if w[1].timestamp <= w[0].timestamp {
            return Err(BacktestError::UnorderedSeries { index: i + 1 });
        }
    }
    Ok(())
}
