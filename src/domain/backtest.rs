//! Backtest driver and event loop.
//!
//! The driver replays a [`PriceSeries`] one bar at a time. At step `i` the
//! strategy sees bars `[0..=i]` only. While the prefix is shorter than the
//! strategy's warmup the step is `Priming` and always yields
//! `InsufficientData`; afterwards it is `Active` and signals reach the
//! portfolio.

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::domain::error::{MacrossError, MalformedBar};
use crate::domain::portfolio::Portfolio;
use crate::domain::position::{PositionSide, Trade};
use crate::domain::price_series::PriceSeries;
use crate::domain::signal::Signal;
use crate::domain::strategy::Strategy;
use crate::ports::report_port::ReportSink;

/// What to do with a bar that has no usable close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedBarPolicy {
    /// Record a warning, emit `InsufficientData` for the step and continue.
    #[default]
    Skip,
    /// Stop the run with [`MacrossError::MalformedBar`].
    Abort,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_cash: f64,
    pub commission_rate: f64,
    pub malformed_bars: MalformedBarPolicy,
}

impl BacktestConfig {
    pub fn new(
        initial_cash: f64,
        commission_rate: f64,
        malformed_bars: MalformedBarPolicy,
    ) -> Result<Self, MacrossError> {
        // Portfolio owns the range checks.
        Portfolio::new(initial_cash, commission_rate)?;
        Ok(BacktestConfig {
            initial_cash,
            commission_rate,
            malformed_bars,
        })
    }
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_cash: 10_000.0,
            commission_rate: 0.001,
            malformed_bars: MalformedBarPolicy::Skip,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Priming,
    Active,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Priming => "priming",
            Phase::Active => "active",
        }
    }
}

/// One replay step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    pub index: usize,
    pub timestamp: NaiveDateTime,
    pub phase: Phase,
    pub skipped: bool,
    pub signal: Signal,
    pub short_ma: Option<f64>,
    pub long_ma: Option<f64>,
    pub position: PositionSide,
    pub cash: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestSummary {
    pub ending_position: PositionSide,
    pub ending_cash: f64,
    pub total_steps_active: usize,
    pub steps_processed: usize,
    pub initial_cash: f64,
    pub total_commission: f64,
    pub trade_count: usize,
    pub realized_pnl: f64,
    /// Open P&L of the ending position at the last usable close.
    pub unrealized_pnl: f64,
    /// `ending_cash + realized_pnl + unrealized_pnl`.
    pub ending_value: f64,
    pub malformed_bars: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub records: Vec<StepRecord>,
    pub trades: Vec<Trade>,
    pub warnings: Vec<MalformedBar>,
    pub summary: BacktestSummary,
}

impl BacktestResult {
    /// `(index, signal)` for every step, in order.
    pub fn signals(&self) -> Vec<(usize, Signal)> {
        self.records.iter().map(|r| (r.index, r.signal)).collect()
    }

    /// Steps whose signal was Buy or Sell.
    pub fn trade_signals(&self) -> Vec<(usize, Signal)> {
        self.records
            .iter()
            .filter(|r| r.signal.is_trade())
            .map(|r| (r.index, r.signal))
            .collect()
    }
}

pub struct BacktestDriver {
    strategy: Box<dyn Strategy>,
    config: BacktestConfig,
}

impl BacktestDriver {
    pub fn new(strategy: Box<dyn Strategy>, config: BacktestConfig) -> Result<Self, MacrossError> {
        Portfolio::new(config.initial_cash, config.commission_rate)?;
        Ok(BacktestDriver { strategy, config })
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    pub fn strategy_name(&self) -> String {
        self.strategy.name()
    }

    /// Replay `series` from the first bar to the last.
    ///
    /// Each call starts from a fresh portfolio and a re-initialized strategy,
    /// so repeated runs over the same series give identical results.
    pub fn run(
        &mut self,
        series: &PriceSeries,
        sink: &mut dyn ReportSink,
    ) -> Result<BacktestResult, MacrossError> {
        let mut portfolio = Portfolio::new(self.config.initial_cash, self.config.commission_rate)?;
        self.strategy.initialize();

        let name = self.strategy.name();
        let warmup = self.strategy.warmup();
        info!(strategy = %name, bars = series.len(), warmup, "backtest started");
        sink.on_start(&name, series.len());

        let mut records = Vec::with_capacity(series.len());
        let mut warnings = Vec::new();
        let mut total_steps_active = 0;
        let mut last_close = None;

        for (index, bar) in series.bars().iter().enumerate() {
            let prefix_len = index + 1;
            let phase = if prefix_len < warmup {
                Phase::Priming
            } else {
                Phase::Active
            };

            let record = match bar.close_price() {
                None => {
                    let warning = MalformedBar {
                        index,
                        timestamp: bar.timestamp,
                        reason: bar.defect().unwrap_or("unusable bar").to_string(),
                    };
                    if self.config.malformed_bars == MalformedBarPolicy::Abort {
                        return Err(MacrossError::MalformedBar(warning));
                    }
                    warn!(index, timestamp = %bar.timestamp, reason = %warning.reason, "skipping malformed bar");
                    sink.on_warning(&warning);
                    warnings.push(warning);

                    StepRecord {
                        index,
                        timestamp: bar.timestamp,
                        phase,
                        skipped: true,
                        signal: Signal::InsufficientData,
                        short_ma: None,
                        long_ma: None,
                        position: portfolio.position,
                        cash: portfolio.cash,
                    }
                }
                Some(close) => {
                    last_close = Some(close);
                    self.strategy.on_data(series.prefix(prefix_len));
                    let raw = self.strategy.execute()?;

                    let signal = match phase {
                        Phase::Priming => Signal::InsufficientData,
                        Phase::Active => {
                            total_steps_active += 1;
                            raw
                        }
                    };

                    if let Some(trade) = portfolio.apply(signal, index, bar.timestamp, close)? {
                        info!(
                            index,
                            timestamp = %trade.timestamp,
                            from = %trade.from,
                            to = %trade.to,
                            price = trade.price,
                            commission = trade.commission,
                            "trade executed"
                        );
                        sink.on_trade(&trade);
                    }

                    let state = self.strategy.indicators().unwrap_or_default();
                    StepRecord {
                        index,
                        timestamp: bar.timestamp,
                        phase,
                        skipped: false,
                        signal,
                        short_ma: state.short_ma,
                        long_ma: state.long_ma,
                        position: portfolio.position,
                        cash: portfolio.cash,
                    }
                }
            };

            sink.on_step(&record);
            records.push(record);
        }

        let unrealized_pnl = last_close.map_or(0.0, |close| portfolio.unrealized_pnl(close));
        let summary = BacktestSummary {
            ending_position: portfolio.position,
            ending_cash: portfolio.cash,
            total_steps_active,
            steps_processed: records.len(),
            initial_cash: portfolio.initial_cash,
            total_commission: portfolio.total_commission,
            trade_count: portfolio.trade_count(),
            realized_pnl: portfolio.realized_pnl,
            unrealized_pnl,
            ending_value: portfolio.cash + portfolio.realized_pnl + unrealized_pnl,
            malformed_bars: warnings.len(),
        };
        info!(
            steps = summary.steps_processed,
            active = summary.total_steps_active,
            trades = summary.trade_count,
            ending_cash = summary.ending_cash,
            ending_value = summary.ending_value,
            ending_position = %summary.ending_position,
            "backtest finished"
        );
        sink.on_finish(&summary);

        Ok(BacktestResult {
            records,
            trades: portfolio.trades,
            warnings,
            summary,
        })
    }
}
