//! Rolling moving-average indicators.
//!
//! - `AverageKind`: which moving average to compute
//! - `IndicatorState`: the short/long pair at one step
//! - `IndicatorEngine`: validated window configuration that derives states
//!   from a prefix of bars or from a full close series

pub mod ema;
pub mod sma;

use crate::domain::error::MacrossError;
use crate::domain::ohlcv::{self, PriceBar};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AverageKind {
    #[default]
    Simple,
    Exponential,
}

impl AverageKind {
    /// Average at every index of `closes`; `None` until the window is filled.
    pub fn series(self, closes: &[f64], period: usize) -> Vec<Option<f64>> {
        match self {
            AverageKind::Simple => sma::calculate_sma(closes, period),
            AverageKind::Exponential => ema::calculate_ema(closes, period),
        }
    }

    /// Average at the last index of `closes`.
    pub fn latest(self, closes: &[f64], period: usize) -> Option<f64> {
        match self {
            AverageKind::Simple => sma::trailing_mean(closes, period),
            AverageKind::Exponential => ema::calculate_ema(closes, period).pop().flatten(),
        }
    }
}

impl fmt::Display for AverageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AverageKind::Simple => write!(f, "SMA"),
            AverageKind::Exponential => write!(f, "EMA"),
        }
    }
}

/// Short and long moving average at one step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IndicatorState {
    pub short_ma: Option<f64>,
    pub long_ma: Option<f64>,
}

impl IndicatorState {
    /// Both averages, once the long window is filled.
    pub fn pair(&self) -> Option<(f64, f64)> {
        match (self.short_ma, self.long_ma) {
            (Some(short), Some(long)) => Some((short, long)),
            _ => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        self.pair().is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorEngine {
    kind: AverageKind,
    short_window: usize,
    long_window: usize,
}

impl IndicatorEngine {
    pub fn new(
        kind: AverageKind,
        short_window: usize,
        long_window: usize,
    ) -> Result<Self, MacrossError> {
        if short_window == 0 {
            return Err(MacrossError::invalid_parameter(
                "short_window",
                "must be positive",
            ));
        }
        if long_window == 0 {
            return Err(MacrossError::invalid_parameter(
                "long_window",
                "must be positive",
            ));
        }
        if short_window >= long_window {
            return Err(MacrossError::invalid_parameter(
                "short_window",
                format!(
                    "must be less than long_window ({} >= {})",
                    short_window, long_window
                ),
            ));
        }
        Ok(IndicatorEngine {
            kind,
            short_window,
            long_window,
        })
    }

    pub fn kind(&self) -> AverageKind {
        self.kind
    }

    pub fn short_window(&self) -> usize {
        self.short_window
    }

    pub fn long_window(&self) -> usize {
        self.long_window
    }

    /// State at the last bar of `prefix`. Malformed bars contribute no close.
    pub fn compute(&self, prefix: &[PriceBar]) -> IndicatorState {
        self.compute_closes(&ohlcv::closes(prefix))
    }

    pub fn compute_closes(&self, closes: &[f64]) -> IndicatorState {
        IndicatorState {
            short_ma: self.kind.latest(closes, self.short_window),
            long_ma: self.kind.latest(closes, self.long_window),
        }
    }

    /// State at every index of `closes`.
    pub fn compute_series(&self, closes: &[f64]) -> Vec<IndicatorState> {
        let short = self.kind.series(closes, self.short_window);
        let long = self.kind.series(closes, self.long_window);
        short
            .into_iter()
            .zip(long)
            .map(|(short_ma, long_ma)| IndicatorState { short_ma, long_ma })
            .collect()
    }

    /// e.g. `SMA(5)/SMA(20)`
    pub fn label(&self) -> String {
        format!(
            "{kind}({short})/{kind}({long})",
            kind = self.kind,
            short = self.short_window,
            long = self.long_window
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn rejects_short_not_below_long() {
        let err = IndicatorEngine::new(AverageKind::Simple, 50, 40).unwrap_err();
        assert!(matches!(err, MacrossError::InvalidParameter { ref name, .. } if name == "short_window"));

        let err = IndicatorEngine::new(AverageKind::Simple, 20, 20).unwrap_err();
        assert!(matches!(err, MacrossError::InvalidParameter { .. }));
    }

    #[test]
    fn rejects_zero_windows() {
        assert!(IndicatorEngine::new(AverageKind::Simple, 0, 20).is_err());
        let err = IndicatorEngine::new(AverageKind::Exponential, 5, 0).unwrap_err();
        assert!(matches!(err, MacrossError::InvalidParameter { ref name, .. } if name == "long_window"));
    }

    #[test]
    fn label_names_both_windows() {
        let engine = IndicatorEngine::new(AverageKind::Simple, 5, 20).unwrap();
        assert_eq!(engine.label(), "SMA(5)/SMA(20)");
        let engine = IndicatorEngine::new(AverageKind::Exponential, 12, 26).unwrap();
        assert_eq!(engine.label(), "EMA(12)/EMA(26)");
    }

    #[test]
    fn short_defined_before_long() {
        let engine = IndicatorEngine::new(AverageKind::Simple, 2, 4).unwrap();
        let states = engine.compute_series(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        assert_eq!(states[0], IndicatorState::default());
        assert_eq!(states[1].short_ma, Some(1.5));
        assert_eq!(states[1].long_ma, None);
        assert!(!states[2].is_defined());
        assert!(states[3].is_defined());
        assert_eq!(states[3].pair(), Some((3.5, 2.5)));
        assert_eq!(states[4].pair(), Some((4.5, 3.5)));
    }

    #[test]
    fn compute_matches_last_series_value() {
        let engine = IndicatorEngine::new(AverageKind::Exponential, 3, 5).unwrap();
        let closes = [10.0, 11.0, 9.5, 12.0, 13.0, 12.5, 14.0];
        let series = engine.compute_series(&closes);
        let latest = engine.compute_closes(&closes);

        let (s, l) = latest.pair().unwrap();
        let (es, el) = series.last().unwrap().pair().unwrap();
        assert_abs_diff_eq!(s, es, epsilon = 1e-12);
        assert_abs_diff_eq!(l, el, epsilon = 1e-12);
    }

    #[test]
    fn series_agrees_with_prefix_exactly() {
        let engine = IndicatorEngine::new(AverageKind::Simple, 1, 2).unwrap();
        let closes = [1e16, 1.0, 1.0, 1.0, 1.0];
        let series = engine.compute_series(&closes);

        for (i, state) in series.iter().enumerate() {
            assert_eq!(*state, engine.compute_closes(&closes[..=i]), "index {i}");
        }
        assert_eq!(series[4].pair(), Some((1.0, 1.0)));
    }

    #[test]
    fn compute_ignores_malformed_bars() {
        use chrono::NaiveDate;

        let ts = |d| {
            NaiveDate::from_ymd_opt(2024, 1, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        };
        let mut bars = vec![
            PriceBar::from_close(ts(1), 1.0),
            PriceBar::from_close(ts(2), 100.0),
            PriceBar::from_close(ts(3), 3.0),
            PriceBar::from_close(ts(4), 5.0),
        ];
        bars[1].close = None;

        let engine = IndicatorEngine::new(AverageKind::Simple, 2, 3).unwrap();
        let state = engine.compute(&bars);
        assert_eq!(state.pair(), Some((4.0, 3.0)));
    }
}
