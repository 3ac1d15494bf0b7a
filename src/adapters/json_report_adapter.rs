//! JSON report adapter implementing ReportPort.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use crate::domain::error::BacktestError;
use crate::domain::report::BacktestReport;
use crate::ports::report_port::ReportPort;

/// Output path that selects standard output.
pub const STDOUT_PATH: &str = "-";

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReportAdapter {
    pub pretty: bool,
}

impl JsonReportAdapter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Serializes `report` into `writer` followed by a newline.
    pub fn write_to<W: Write>(
        &self,
        report: &BacktestReport,
        mut writer: W,
    ) -> Result<(), BacktestError> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, report)?;
        } else {
            serde_json::to_writer(&mut writer, report)?;
        }
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(&self, report: &BacktestReport, output_path: &str) -> Result<(), BacktestError> {
        if output_path == STDOUT_PATH {
            let stdout = io::stdout();
            return self.write_to(report, stdout.lock());
        }
        let file = File::create(output_path)?;
        self.write_to(report, BufWriter::new(file))
    }
}
