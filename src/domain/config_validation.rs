//! Configuration validation.
//!
//! Every key is checked before anything runs. Each validator returns the
//! parsed settings so callers never re-read raw strings.

use chrono::NaiveDate;
use std::path::PathBuf;

use crate::domain::backtest::{BacktestConfig, MalformedBarPolicy};
use crate::domain::error::MacrossError;
use crate::domain::indicator::AverageKind;
use crate::domain::signal::CrossoverMode;
use crate::domain::strategy::StrategyParams;
use crate::ports::config_port::ConfigPort;

/// Where price data comes from and which columns to read.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub file_path: Option<PathBuf>,
    pub date_column: String,
    pub price_column: String,
    pub volume_column: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Everything a run needs, validated.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig {
    pub data: DataSettings,
    pub strategy: StrategyParams,
    pub backtest: BacktestConfig,
    pub output_path: Option<PathBuf>,
}

pub fn validate_config(config: &dyn ConfigPort) -> Result<ValidatedConfig, MacrossError> {
    Ok(ValidatedConfig {
        data: validate_data_config(config)?,
        strategy: validate_strategy_config(config)?,
        backtest: validate_backtest_config(config)?,
        output_path: non_empty(config, "report", "output_path").map(PathBuf::from),
    })
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<DataSettings, MacrossError> {
    let start_date = parse_date(config, "start_date")?;
    let end_date = parse_date(config, "end_date")?;
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start > end {
            return Err(invalid("data", "start_date", "start_date must not be after end_date"));
        }
    }

    Ok(DataSettings {
        file_path: non_empty(config, "data", "file_path").map(PathBuf::from),
        date_column: non_empty(config, "data", "date_column").unwrap_or_else(|| "date".into()),
        price_column: non_empty(config, "data", "price_column").unwrap_or_else(|| "close".into()),
        volume_column: non_empty(config, "data", "volume_column")
            .unwrap_or_else(|| "volume".into()),
        start_date,
        end_date,
    })
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<StrategyParams, MacrossError> {
    let defaults = StrategyParams::default();

    let average = match non_empty(config, "strategy", "kind").as_deref() {
        None | Some("sma_crossover") => AverageKind::Simple,
        Some("ema_crossover") => AverageKind::Exponential,
        Some(other) => {
            return Err(invalid(
                "strategy",
                "kind",
                &format!("unknown strategy '{other}', expected sma_crossover or ema_crossover"),
            ));
        }
    };

    let short_window = window(config, "short_window", defaults.short_window)?;
    let long_window = window(config, "long_window", defaults.long_window)?;
    if short_window >= long_window {
        return Err(invalid(
            "strategy",
            "long_window",
            "long_window must be greater than short_window",
        ));
    }

    let crossover = match non_empty(config, "strategy", "crossover").as_deref() {
        None | Some("strict") => CrossoverMode::Strict,
        Some("from_tie") => CrossoverMode::FromTie,
        Some(other) => {
            return Err(invalid(
                "strategy",
                "crossover",
                &format!("unknown mode '{other}', expected strict or from_tie"),
            ));
        }
    };

    Ok(StrategyParams {
        average,
        short_window,
        long_window,
        crossover,
    })
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, MacrossError> {
    let defaults = BacktestConfig::default();

    let initial_cash = config.get_double("backtest", "initial_cash", defaults.initial_cash)?;
    if !initial_cash.is_finite() || initial_cash < 0.0 {
        return Err(invalid(
            "backtest",
            "initial_cash",
            "initial_cash must be non-negative",
        ));
    }

    let commission_rate =
        config.get_double("backtest", "commission_rate", defaults.commission_rate)?;
    if !(0.0..1.0).contains(&commission_rate) {
        return Err(invalid(
            "backtest",
            "commission_rate",
            "commission_rate must be between 0 and 1",
        ));
    }

    let malformed_bars = match non_empty(config, "backtest", "malformed_bars").as_deref() {
        None | Some("skip") => MalformedBarPolicy::Skip,
        Some("abort") => MalformedBarPolicy::Abort,
        Some(other) => {
            return Err(invalid(
                "backtest",
                "malformed_bars",
                &format!("unknown policy '{other}', expected skip or abort"),
            ));
        }
    };

    BacktestConfig::new(initial_cash, commission_rate, malformed_bars)
}

fn window(config: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, MacrossError> {
    let value = config.get_int("strategy", key, default as i64)?;
    if value < 1 {
        return Err(invalid("strategy", key, &format!("{key} must be at least 1")));
    }
    Ok(value as usize)
}

fn parse_date(config: &dyn ConfigPort, key: &str) -> Result<Option<NaiveDate>, MacrossError> {
    match non_empty(config, "data", key) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| invalid("data", key, &format!("invalid {key} format, expected YYYY-MM-DD"))),
    }
}

fn non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn invalid(section: &str, key: &str, reason: &str) -> MacrossError {
    MacrossError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
