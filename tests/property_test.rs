//! Property tests for replay invariants.
//!
//! Uses proptest to verify:
//! 1. Prefix consistency: the value at step i depends only on closes[0..=i]
//! 2. Signals match the detector applied to consecutive recorded states
//! 3. Series shorter than the long window never trade
//! 4. Reruns are identical
//! 5. Cash only ever moves by commission

mod common;

use approx::relative_eq;
use common::*;
use macross::domain::backtest::{BacktestConfig, BacktestDriver, Phase};
use macross::domain::indicator::{AverageKind, IndicatorEngine, IndicatorState};
use macross::domain::signal::{CrossoverMode, Signal, detect_crossover};
use macross::domain::strategy::{StrategyParams, build_strategy};
use macross::ports::report_port::NullSink;
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_closes(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((10.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0), 0..max_len)
}

fn arb_windows() -> impl Strategy<Value = (usize, usize)> {
    (1usize..10, 1usize..20).prop_map(|(short, extra)| (short, short + extra))
}

fn arb_kind() -> impl Strategy<Value = AverageKind> {
    prop_oneof![Just(AverageKind::Simple), Just(AverageKind::Exponential)]
}

fn arb_mode() -> impl Strategy<Value = CrossoverMode> {
    prop_oneof![Just(CrossoverMode::Strict), Just(CrossoverMode::FromTie)]
}

fn same(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => relative_eq!(x, y, max_relative = 1e-9),
        _ => false,
    }
}

fn run(
    closes: &[f64],
    kind: AverageKind,
    (short_window, long_window): (usize, usize),
    crossover: CrossoverMode,
) -> macross::domain::backtest::BacktestResult {
    let params = StrategyParams {
        average: kind,
        short_window,
        long_window,
        crossover,
    };
    let mut driver =
        BacktestDriver::new(build_strategy(&params).unwrap(), BacktestConfig::default()).unwrap();
    driver.run(&make_series(closes), &mut NullSink).unwrap()
}

proptest! {
    /// The full-series computation agrees with recomputing each prefix.
    #[test]
    fn prefix_consistency(closes in arb_closes(80), kind in arb_kind(), windows in arb_windows()) {
        let engine = IndicatorEngine::new(kind, windows.0, windows.1).unwrap();
        let series = engine.compute_series(&closes);
        prop_assert_eq!(series.len(), closes.len());

        for i in 0..closes.len() {
            let prefix = engine.compute_closes(&closes[..=i]);
            prop_assert!(same(series[i].short_ma, prefix.short_ma));
            prop_assert!(same(series[i].long_ma, prefix.long_ma));
            prop_assert_eq!(prefix.long_ma.is_some(), i + 1 >= windows.1);
        }
    }

    /// Appending bars never changes earlier states.
    #[test]
    fn future_bars_do_not_leak(
        closes in arb_closes(60),
        extra in arb_closes(20),
        kind in arb_kind(),
        windows in arb_windows(),
        mode in arb_mode(),
    ) {
        let short_run = run(&closes, kind, windows, mode);
        let mut longer = closes.clone();
        longer.extend(extra);
        let long_run = run(&longer, kind, windows, mode);

        prop_assert_eq!(&short_run.records[..], &long_run.records[..closes.len()]);
    }

    /// Every signal is the detector applied to the previous and current step.
    #[test]
    fn signals_follow_detector(
        closes in arb_closes(100),
        kind in arb_kind(),
        windows in arb_windows(),
        mode in arb_mode(),
    ) {
        let result = run(&closes, kind, windows, mode);

        for (i, record) in result.records.iter().enumerate() {
            let expected = if record.phase == Phase::Priming || i == 0 {
                Signal::InsufficientData
            } else {
                let prev = &result.records[i - 1];
                detect_crossover(
                    &IndicatorState { short_ma: prev.short_ma, long_ma: prev.long_ma },
                    &IndicatorState { short_ma: record.short_ma, long_ma: record.long_ma },
                    mode,
                )
            };
            prop_assert_eq!(record.signal, expected, "step {}", i);
        }
    }

    /// Fewer bars than the long window: no defined long average, no trades.
    #[test]
    fn short_series_never_trade(kind in arb_kind(), windows in arb_windows(), mode in arb_mode(), seed in arb_closes(40)) {
        let closes: Vec<f64> = seed.into_iter().take(windows.1 - 1).collect();
        let result = run(&closes, kind, windows, mode);

        prop_assert!(result.records.iter().all(|r| r.signal == Signal::InsufficientData));
        prop_assert!(result.records.iter().all(|r| r.long_ma.is_none()));
        prop_assert!(result.trades.is_empty());
    }

    /// Same input, same output.
    #[test]
    fn reruns_are_identical(closes in arb_closes(100), kind in arb_kind(), windows in arb_windows(), mode in arb_mode()) {
        let params = StrategyParams { average: kind, short_window: windows.0, long_window: windows.1, crossover: mode };
        let mut driver = BacktestDriver::new(build_strategy(&params).unwrap(), BacktestConfig::default()).unwrap();
        let series = make_series(&closes);
        let first = driver.run(&series, &mut NullSink).unwrap();
        let second = driver.run(&series, &mut NullSink).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Cash never rises and the deficit is exactly the commission paid.
    #[test]
    fn cash_moves_only_by_commission(closes in arb_closes(100), windows in arb_windows(), mode in arb_mode()) {
        let result = run(&closes, AverageKind::Simple, windows, mode);
        let mut cash = result.summary.initial_cash;
        for record in &result.records {
            prop_assert!(record.cash <= cash);
            cash = record.cash;
        }
        let paid: f64 = result.trades.iter().map(|t| t.commission).sum();
        prop_assert!(relative_eq!(result.summary.initial_cash - paid, result.summary.ending_cash, max_relative = 1e-12));
        prop_assert_eq!(result.summary.trade_count, result.trades.len());
    }
}
