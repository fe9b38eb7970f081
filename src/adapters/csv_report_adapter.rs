//! Step-record CSV report.

use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::domain::backtest::{BacktestResult, StepRecord};
use crate::domain::error::MacrossError;
use crate::ports::report_port::ReportPort;

/// One CSV row. Undefined averages serialize as empty cells.
#[derive(Debug, Serialize)]
struct StepRow<'a> {
    index: usize,
    timestamp: String,
    phase: &'a str,
    signal: &'a str,
    short_ma: Option<f64>,
    long_ma: Option<f64>,
    position: String,
    cash: f64,
}

impl<'a> From<&'a StepRecord> for StepRow<'a> {
    fn from(r: &'a StepRecord) -> Self {
        StepRow {
            index: r.index,
            timestamp: r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            phase: r.phase.as_str(),
            signal: r.signal.as_str(),
            short_ma: r.short_ma,
            long_ma: r.long_ma,
            position: r.position.to_string(),
            cash: r.cash,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Render the report into any writer.
    pub fn write_to<W: std::io::Write>(
        &self,
        result: &BacktestResult,
        writer: W,
    ) -> Result<(), MacrossError> {
        let mut wtr = csv::Writer::from_writer(writer);
        for record in &result.records {
            wtr.serialize(StepRow::from(record))
                .map_err(|e| MacrossError::Report {
                    reason: format!("failed to write row {}: {}", record.index, e),
                })?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), MacrossError> {
        let file = std::fs::File::create(output_path).map_err(|e| MacrossError::Report {
            reason: format!("failed to create {}: {}", output_path.display(), e),
        })?;
        self.write_to(result, file)?;
        info!(path = %output_path.display(), rows = result.records.len(), "report written");
        Ok(())
    }
}
