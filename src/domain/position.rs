//! Position side and executed trades.

use chrono::NaiveDateTime;
use std::fmt;

use super::signal::Signal;

/// Sign of the unit position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionSide {
    Short,
    #[default]
    Flat,
    Long,
}

impl PositionSide {
    /// -1, 0 or +1.
    pub fn sign(&self) -> i8 {
        match self {
            PositionSide::Short => -1,
            PositionSide::Flat => 0,
            PositionSide::Long => 1,
        }
    }

    /// Side a signal moves the position to, if it moves it at all.
    pub fn target(signal: Signal) -> Option<PositionSide> {
        match signal {
            Signal::Buy => Some(PositionSide::Long),
            Signal::Sell => Some(PositionSide::Short),
            Signal::Hold | Signal::InsufficientData => None,
        }
    }
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PositionSide::Short => "short",
            PositionSide::Flat => "flat",
            PositionSide::Long => "long",
        };
        f.write_str(s)
    }
}

/// A notional unit trade executed at a bar's close.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub index: usize,
    pub timestamp: NaiveDateTime,
    pub from: PositionSide,
    pub to: PositionSide,
    pub price: f64,
    pub commission: f64,
}

impl Trade {
    pub fn is_reversal(&self) -> bool {
        self.from != PositionSide::Flat && self.from != self.to
    }
}
