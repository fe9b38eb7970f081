//! Report sink that turns replay events into `tracing` events.

use tracing::{debug, info, warn};

use crate::domain::backtest::{BacktestSummary, StepRecord};
use crate::domain::error::MalformedBar;
use crate::domain::position::Trade;
use crate::ports::report_port::ReportSink;

/// Logs every step at `debug` and trades, warnings and the summary at
/// `info`/`warn`. Counts what it saw so callers can check it was wired up.
#[derive(Debug, Default)]
pub struct TracingSink {
    pub steps: usize,
    pub trades: usize,
    pub warnings: usize,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportSink for TracingSink {
    fn on_start(&mut self, strategy: &str, bars: usize) {
        info!(strategy, bars, "replay starting");
    }

    fn on_step(&mut self, record: &StepRecord) {
        self.steps += 1;
        debug!(
            index = record.index,
            timestamp = %record.timestamp,
            phase = record.phase.as_str(),
            signal = %record.signal,
            short_ma = ?record.short_ma,
            long_ma = ?record.long_ma,
            position = %record.position,
            cash = record.cash,
            "step"
        );
    }

    fn on_trade(&mut self, trade: &Trade) {
        self.trades += 1;
        info!(
            index = trade.index,
            side = %trade.to,
            price = trade.price,
            commission = trade.commission,
            "trade"
        );
    }

    fn on_warning(&mut self, warning: &MalformedBar) {
        self.warnings += 1;
        warn!(%warning, "malformed bar");
    }

    fn on_finish(&mut self, summary: &BacktestSummary) {
        info!(
            ending_position = %summary.ending_position,
            ending_cash = summary.ending_cash,
            ending_value = summary.ending_value,
            active_steps = summary.total_steps_active,
            "replay complete"
        );
    }
}
