//! Reporting ports.
//!
//! [`ReportSink`] observes a replay while it runs; [`ReportPort`] persists a
//! finished result.

use std::path::Path;

use crate::domain::backtest::{BacktestResult, BacktestSummary, StepRecord};
use crate::domain::error::{MacrossError, MalformedBar};
use crate::domain::position::Trade;

/// Caller-owned observer handed to the driver. Every hook defaults to a no-op.
pub trait ReportSink {
    fn on_start(&mut self, _strategy: &str, _bars: usize) {}

    fn on_step(&mut self, _record: &StepRecord) {}

    fn on_trade(&mut self, _trade: &Trade) {}

    fn on_warning(&mut self, _warning: &MalformedBar) {}

    fn on_finish(&mut self, _summary: &BacktestSummary) {}
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ReportSink for NullSink {}

/// Port for writing backtest reports.
pub trait ReportPort {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), MacrossError>;
}
