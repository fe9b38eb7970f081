//! Crossover signal classification.
//!
//! A pure function of two consecutive indicator states; the detector keeps
//! no memory of its own.

use crate::domain::indicator::IndicatorState;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
    InsufficientData,
}

impl Signal {
    pub fn is_trade(&self) -> bool {
        matches!(self, Signal::Buy | Signal::Sell)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Buy => "buy",
            Signal::Sell => "sell",
            Signal::Hold => "hold",
            Signal::InsufficientData => "insufficient_data",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an exact tie on the previous step is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrossoverMode {
    /// The previous step must be strictly on the other side.
    #[default]
    Strict,
    /// A previous-step tie also counts as "not yet crossed".
    FromTie,
}

/// Classify the move from `previous` to `current`.
///
/// A tie on the current step is never a cross in either mode.
pub fn detect_crossover(
    previous: &IndicatorState,
    current: &IndicatorState,
    mode: CrossoverMode,
) -> Signal {
    let (Some((prev_short, prev_long)), Some((cur_short, cur_long))) =
        (previous.pair(), current.pair())
    else {
        return Signal::InsufficientData;
    };

    let (was_below, was_above) = match mode {
        CrossoverMode::Strict => (prev_short < prev_long, prev_short > prev_long),
        CrossoverMode::FromTie => (prev_short <= prev_long, prev_short >= prev_long),
    };

    if was_below && cur_short > cur_long {
        Signal::Buy
    } else if was_above && cur_short < cur_long {
        Signal::Sell
    } else {
        Signal::Hold
    }
}
