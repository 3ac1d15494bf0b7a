//! Price data access port trait.

use crate::domain::error::BacktestError;
use crate::domain::ohlcv::PriceBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Bars for `symbol`, ordered by timestamp, restricted to the inclusive
    /// date range when bounds are given.
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, BacktestError>;

    fn list_symbols(&self) -> Result<Vec<String>, BacktestError>;
}
