#![allow(dead_code)]

use backcast::domain::error::BacktestError;
use backcast::domain::frame::{PriceFrame, SIGNAL_COLUMN};
pub use backcast::domain::ohlcv::PriceBar;
use backcast::domain::transform::{Params, Transform};
use backcast::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, BacktestError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(BacktestError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|b| start_date.is_none_or(|s| b.timestamp.date() >= s))
            .filter(|b| end_date.is_none_or(|e| b.timestamp.date() <= e))
            .collect())
    }

    fn list_symbols(&self) -> Result<Vec<String>, BacktestError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

/// Strategy that attaches a fixed signal column, padded with `None`.
pub struct FixedSignal(pub Vec<Option<f64>>);

impl Transform for FixedSignal {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn accepted_params(&self) -> &'static [&'static str] {
        &[]
    }

    fn apply<'a>(
        &self,
        frame: &PriceFrame<'a>,
        _params: &Params,
    ) -> Result<PriceFrame<'a>, BacktestError> {
        let mut signal = self.0.clone();
        signal.resize(frame.len(), None);
        Ok(frame.with_column(SIGNAL_COLUMN, signal))
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0).unwrap()
}

pub fn make_bar(date: &str, close: f64) -> PriceBar {
    PriceBar {
        timestamp: midnight(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000.0,
    }
}

/// One bar per calendar day from `start_date` with the given closes.
pub fn bars_from_closes(start_date: &str, closes: &[f64]) -> Vec<PriceBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            timestamp: midnight(start + chrono::Duration::days(i as i64)),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 1000.0,
        })
        .collect()
}

/// A gently oscillating trend, enough to produce both crossover directions.
pub fn generate_bars(start_date: &str, count: usize, start_price: f64) -> Vec<PriceBar> {
    let closes: Vec<f64> = (0..count)
        .map(|i| start_price + i as f64 * 0.2 + (i as f64 * 0.35).sin() * 4.0)
        .collect();
    bars_from_closes(start_date, &closes)
}

pub fn write_csv(dir: &std::path::Path, symbol: &str, bars: &[PriceBar]) {
    let mut content = String::from("timestamp,open,high,low,close,volume\n");
    for b in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.timestamp.format("%Y-%m-%d %H:%M:%S"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        ));
    }
    std::fs::write(dir.join(format!("{symbol}.csv")), content).unwrap();
}
