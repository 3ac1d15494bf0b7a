//! Serializable result bundle.
//!
//! Series are rounded to 5 decimals and undefined entries serialize as `null`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::frame::{Column, PriceFrame, RSI_COLUMN, SIGNAL_COLUMN};
use crate::domain::metrics::{PerformanceReport, round_to};
use crate::domain::projection::ProjectionBand;
use crate::domain::simulation::Simulation;

pub const SERIES_DECIMALS: i32 = 5;
pub const BAR_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";
pub const PROJECTION_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub dates: Vec<String>,
    pub open: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
    pub close: Vec<Option<f64>>,
    pub indicators: BTreeMap<String, Vec<Option<f64>>>,
    pub rsi: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionData {
    pub dates: Vec<String>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
    pub mid: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityData {
    pub dates: Vec<String>,
    pub equity: Vec<Option<f64>>,
    pub bh_equity: Vec<Option<f64>>,
    pub equity_high: Vec<Option<f64>>,
    pub equity_low: Vec<Option<f64>>,
    pub projection: ProjectionData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    pub chart: ChartData,
    pub equity: EquityData,
    pub performance: PerformanceReport,
}

/// Rounds a defined value; NaN and infinities become `None`.
fn series_value(value: f64) -> Option<f64> {
    value
        .is_finite()
        .then(|| round_to(value, SERIES_DECIMALS))
}

fn series(values: impl IntoIterator<Item = f64>) -> Vec<Option<f64>> {
    values.into_iter().map(series_value).collect()
}

fn column_series(column: &Column) -> Vec<Option<f64>> {
    column.iter().map(|v| v.and_then(series_value)).collect()
}

impl ChartData {
    /// Every derived column except `signal` and `rsi` lands in `indicators`.
    pub fn from_frame(frame: &PriceFrame<'_>) -> Self {
        let bars = frame.bars();
        let indicators = frame
            .columns()
            .filter(|(name, _)| *name != SIGNAL_COLUMN && *name != RSI_COLUMN)
            .map(|(name, col)| (name.to_string(), column_series(col)))
            .collect();
        let rsi = frame.column(RSI_COLUMN).map(column_series).unwrap_or_default();

        ChartData {
            dates: bars
                .iter()
                .map(|b| b.timestamp.format(BAR_DATE_FORMAT).to_string())
                .collect(),
            open: series(bars.iter().map(|b| b.open)),
            high: series(bars.iter().map(|b| b.high)),
            low: series(bars.iter().map(|b| b.low)),
            close: series(bars.iter().map(|b| b.close)),
            indicators,
            rsi,
        }
    }
}

impl EquityData {
    pub fn new(frame: &PriceFrame<'_>, sim: &Simulation, band: ProjectionBand) -> Self {
        EquityData {
            dates: frame
                .bars()
                .iter()
                .map(|b| b.timestamp.format(BAR_DATE_FORMAT).to_string())
                .collect(),
            equity: series(sim.equity.iter().copied()),
            bh_equity: series(sim.bh_equity.iter().copied()),
            equity_high: series(sim.equity_high.iter().copied()),
            equity_low: series(sim.equity_low.iter().copied()),
            projection: ProjectionData {
                dates: band
                    .dates
                    .iter()
                    .map(|d| d.format(PROJECTION_DATE_FORMAT).to_string())
                    .collect(),
                upper: band.upper,
                lower: band.lower,
                mid: band.mid,
            },
        }
    }
}
