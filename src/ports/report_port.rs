//! Report output port trait.

use crate::domain::error::BacktestError;
use crate::domain::report::BacktestReport;

/// Port for writing backtest reports.
pub trait ReportPort {
    /// Writes `report` to `output_path`; `-` means standard output.
    fn write(&self, report: &BacktestReport, output_path: &str) -> Result<(), BacktestError>;
}
