//! Strategy contract and the moving-average crossover strategy.
//!
//! The driver talks to any strategy through [`Strategy`]: `initialize` once
//! per run, then `on_data` with a growing prefix followed by `execute` at
//! every step.

use tracing::debug;

use crate::domain::error::MacrossError;
use crate::domain::indicator::{AverageKind, IndicatorEngine, IndicatorState};
use crate::domain::ohlcv::PriceBar;
use crate::domain::signal::{CrossoverMode, Signal, detect_crossover};

pub trait Strategy {
    fn name(&self) -> String;

    /// Prefix length below which every signal is `InsufficientData`.
    fn warmup(&self) -> usize;

    /// Reset all cached state.
    fn initialize(&mut self);

    /// Recompute from `prefix`, the bars up to and including the current step.
    fn on_data(&mut self, prefix: &[PriceBar]);

    /// Signal for the current step. Calling this before any `on_data` is a
    /// programming error.
    fn execute(&mut self) -> Result<Signal, MacrossError>;

    /// Indicator values cached by the last `on_data`, if the strategy has any.
    fn indicators(&self) -> Option<IndicatorState> {
        None
    }
}

/// Parameters for [`MovingAverageCrossover`], as supplied by configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyParams {
    pub average: AverageKind,
    pub short_window: usize,
    pub long_window: usize,
    pub crossover: CrossoverMode,
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams {
            average: AverageKind::Simple,
            short_window: 40,
            long_window: 100,
            crossover: CrossoverMode::Strict,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MovingAverageCrossover {
    engine: IndicatorEngine,
    mode: CrossoverMode,
    current: Option<IndicatorState>,
    previous: Option<IndicatorState>,
}

impl MovingAverageCrossover {
    pub fn new(params: &StrategyParams) -> Result<Self, MacrossError> {
        let engine = IndicatorEngine::new(params.average, params.short_window, params.long_window)?;
        Ok(MovingAverageCrossover {
            engine,
            mode: params.crossover,
            current: None,
            previous: None,
        })
    }

    pub fn engine(&self) -> &IndicatorEngine {
        &self.engine
    }
}

impl Strategy for MovingAverageCrossover {
    fn name(&self) -> String {
        format!("{} crossover", self.engine.label())
    }

    fn warmup(&self) -> usize {
        self.engine.long_window()
    }

    fn initialize(&mut self) {
        self.current = None;
        self.previous = None;
        debug!(strategy = %self.name(), "strategy initialized");
    }

    fn on_data(&mut self, prefix: &[PriceBar]) {
        let state = self.engine.compute(prefix);
        debug!(
            bars = prefix.len(),
            short_ma = ?state.short_ma,
            long_ma = ?state.long_ma,
            "indicators updated"
        );
        self.previous = self.current.replace(state);
    }

    fn execute(&mut self) -> Result<Signal, MacrossError> {
        match (&self.previous, &self.current) {
            (_, None) => Err(MacrossError::StrategyMisuse {
                reason: "execute called before on_data".to_string(),
            }),
            (None, Some(_)) => Ok(Signal::InsufficientData),
            (Some(previous), Some(current)) => Ok(detect_crossover(previous, current, self.mode)),
        }
    }

    fn indicators(&self) -> Option<IndicatorState> {
        self.current
    }
}

/// Build the strategy selected by `params`.
pub fn build_strategy(params: &StrategyParams) -> Result<Box<dyn Strategy>, MacrossError> {
    Ok(Box::new(MovingAverageCrossover::new(params)?))
}
