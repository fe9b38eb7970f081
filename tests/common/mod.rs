#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use macross::domain::backtest::{BacktestSummary, StepRecord};
use macross::domain::error::{MacrossError, MalformedBar};
pub use macross::domain::ohlcv::PriceBar;
use macross::domain::position::Trade;
use macross::domain::price_series::PriceSeries;
use macross::ports::data_port::DataPort;
use macross::ports::report_port::ReportSink;

/// In-memory data source.
pub struct MockDataPort {
    pub bars: Vec<PriceBar>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new(bars: Vec<PriceBar>) -> Self {
        Self { bars, error: None }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            bars: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, MacrossError> {
        if let Some(reason) = &self.error {
            return Err(MacrossError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .bars
            .iter()
            .filter(|b| start.is_none_or(|s| b.timestamp.date() >= s))
            .filter(|b| end.is_none_or(|e| b.timestamp.date() <= e))
            .cloned()
            .collect())
    }
}

/// Sink that keeps everything it is handed.
#[derive(Default)]
pub struct RecordingSink {
    pub started: Option<(String, usize)>,
    pub steps: Vec<StepRecord>,
    pub trades: Vec<Trade>,
    pub warnings: Vec<MalformedBar>,
    pub summary: Option<BacktestSummary>,
}

impl ReportSink for RecordingSink {
    fn on_start(&mut self, strategy: &str, bars: usize) {
        self.started = Some((strategy.to_string(), bars));
    }

    fn on_step(&mut self, record: &StepRecord) {
        self.steps.push(record.clone());
    }

    fn on_trade(&mut self, trade: &Trade) {
        self.trades.push(trade.clone());
    }

    fn on_warning(&mut self, warning: &MalformedBar) {
        self.warnings.push(warning.clone());
    }

    fn on_finish(&mut self, summary: &BacktestSummary) {
        self.summary = Some(summary.clone());
    }
}

/// Hourly timestamps from 2024-01-01 00:00.
pub fn ts(i: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::hours(i as i64)
}

pub fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PriceBar::from_close(ts(i), c))
        .collect()
}

pub fn make_series(closes: &[f64]) -> PriceSeries {
    PriceSeries::new(make_bars(closes)).unwrap()
}

/// 100 bars at 100, 20 at 90, 20 at 110.
pub fn regime_change_closes() -> Vec<f64> {
    let mut closes = vec![100.0; 100];
    closes.extend(std::iter::repeat_n(90.0, 20));
    closes.extend(std::iter::repeat_n(110.0, 20));
    closes
}

/// Render closes as a price CSV.
pub fn closes_csv(closes: &[f64]) -> String {
    let mut out = String::from("date,close\n");
    for (i, c) in closes.iter().enumerate() {
        out.push_str(&format!("{},{}\n", ts(i).format("%Y-%m-%d %H:%M:%S"), c));
    }
    out
}
