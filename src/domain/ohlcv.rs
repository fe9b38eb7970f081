//! Price bar representation.

use chrono::NaiveDateTime;

/// One bar of market data.
///
/// `close` is optional because a data source may deliver a row whose close
/// cell is empty or unparseable; the backtest driver decides what to do with
/// such bars.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: Option<f64>,
    pub volume: f64,
}

impl PriceBar {
    /// Bar with every price field set to `close`.
    pub fn from_close(timestamp: NaiveDateTime, close: f64) -> Self {
        PriceBar {
            timestamp,
            open: close,
            high: close,
            low: close,
            close: Some(close),
            volume: 0.0,
        }
    }

    /// The close, if present and finite.
    pub fn close_price(&self) -> Option<f64> {
        self.close.filter(|c| c.is_finite())
    }

    pub fn is_malformed(&self) -> bool {
        self.close_price().is_none()
    }

    /// Why this bar cannot be used, if it cannot.
    pub fn defect(&self) -> Option<&'static str> {
        match self.close {
            None => Some("missing close price"),
            Some(c) if !c.is_finite() => Some("non-finite close price"),
            Some(_) => None,
        }
    }
}

/// Finite closes of `bars`, in order, skipping malformed bars.
pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().filter_map(PriceBar::close_price).collect()
}
