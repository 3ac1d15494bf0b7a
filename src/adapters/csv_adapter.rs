//! CSV file data adapter.
//!
//! One file per symbol, `<base>/<SYMBOL>.csv`, with a header row naming
//! `timestamp,open,high,low,close` and optionally `volume` in any order.

use crate::domain::error::BacktestError;
use crate::domain::ohlcv::PriceBar;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];
const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct CsvAdapter {
    base_path: PathBuf,
}

/// Column positions resolved from the header row.
struct Columns {
    timestamp: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self, BacktestError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| BacktestError::Data {
                reason: format!("missing {name} column"),
            })
        };
        Ok(Self {
            timestamp: require("timestamp")?,
            open: require("open")?,
            high: require("high")?,
            low: require("low")?,
            close: require("close")?,
            volume: find("volume"),
        })
    }
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{symbol}.csv"))
    }
}

/// Accepts `%Y-%m-%d %H:%M:%S`, `%Y-%m-%d %H:%M`, or a bare date at midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_field(
    record: &StringRecord,
    index: usize,
    name: &str,
    row: usize,
) -> Result<f64, BacktestError> {
    let raw = record.get(index).ok_or_else(|| BacktestError::Data {
        reason: format!("row {row}: missing {name} value"),
    })?;
    raw.trim().parse().map_err(|e| BacktestError::Data {
        reason: format!("row {row}: invalid {name} value '{raw}': {e}"),
    })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, BacktestError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| BacktestError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| BacktestError::Data {
            reason: format!("CSV header error: {e}"),
        })?;
        let cols = Columns::from_headers(headers)?;

        let mut bars = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let row = i + 1;
            let record = result.map_err(|e| BacktestError::Data {
                reason: format!("CSV parse error: {e}"),
            })?;

            let raw_ts = record.get(cols.timestamp).unwrap_or_default();
            let timestamp = parse_timestamp(raw_ts).ok_or_else(|| BacktestError::Data {
                reason: format!("row {row}: invalid timestamp '{raw_ts}'"),
            })?;

            let date = timestamp.date();
            if start_date.is_some_and(|s| date < s) || end_date.is_some_and(|e| date > e) {
                continue;
            }

            let volume = match cols.volume {
                Some(idx) => parse_field(&record, idx, "volume", row)?,
                None => 0.0,
            };

            bars.push(PriceBar {
                timestamp,
                open: parse_field(&record, cols.open, "open", row)?,
                high: parse_field(&record, cols.high, "high", row)?,
                low: parse_field(&record, cols.low, "low", row)?,
                close: parse_field(&record, cols.close, "close", row)?,
                volume,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        debug!(symbol, bars = bars.len(), path = %path.display(), "loaded csv");
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, BacktestError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| BacktestError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| BacktestError::Data {
                reason: format!("directory entry error: {e}"),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "timestamp,open,high,low,close,volume\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n";
        fs::write(path.join("BHP.csv"), csv_content).unwrap();

        let intraday = "Close,Timestamp,Open,Low,High\n\
            101.5,2024-03-01 09:30,100.0,99.0,102.0\n\
            102.0,2024-03-01 09:35:00,101.5,101.0,102.5\n";
        fs::write(path.join("CBA.csv"), intraday).unwrap();
        fs::write(path.join("notes.txt"), "ignored").unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_bars_returns_sorted_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter.fetch_bars("BHP", None, None).unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(
            bars[0].timestamp,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(0, 0, 0).unwrap()
        );
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].volume, 50000.0);
        assert!(bars.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn fetch_bars_filters_inclusive_range() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let day = NaiveDate::from_ymd_opt(2024, 1, 16).unwrap();
        let bars = adapter.fetch_bars("BHP", Some(day), Some(day)).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 110.0);

        let from = adapter.fetch_bars("BHP", Some(day), None).unwrap();
        assert_eq!(from.len(), 2);
    }

    #[test]
    fn headers_any_order_and_case_without_volume() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter.fetch_bars("CBA", None, None).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 101.5);
        assert_eq!(bars[0].high, 102.0);
        assert_eq!(bars[0].volume, 0.0);
        assert_eq!(bars[1].timestamp.format("%H:%M").to_string(), "09:35");
    }

    #[test]
    fn fetch_bars_errors_for_missing_file() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let err = adapter.fetch_bars("XYZ", None, None).unwrap_err();
        assert!(matches!(err, BacktestError::Data { .. }));
    }

    #[test]
    fn missing_close_column_is_data_error() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("BAD.csv"),
            "timestamp,open,high,low\n2024-01-01,1,1,1\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let err = adapter.fetch_bars("BAD", None, None).unwrap_err();
        assert!(matches!(err, BacktestError::Data { reason } if reason.contains("close")));
    }

    #[test]
    fn bad_number_is_data_error() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("BAD.csv"),
            "timestamp,open,high,low,close\n2024-01-01,1,1,1,abc\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        assert!(adapter.fetch_bars("BAD", None, None).is_err());
    }

    #[test]
    fn parse_timestamp_formats() {
        assert!(parse_timestamp("2024-01-02 03:04:05").is_some());
        assert!(parse_timestamp("2024-01-02 03:04").is_some());
        assert_eq!(
            parse_timestamp("2024-01-02"),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(0, 0, 0)
        );
        assert!(parse_timestamp("02/01/2024").is_none());
    }

    #[test]
    fn list_symbols_returns_csv_stems() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert_eq!(adapter.list_symbols().unwrap(), vec!["BHP", "CBA"]);
    }
}
