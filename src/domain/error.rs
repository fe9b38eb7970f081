//! Domain error types.

use chrono::NaiveDateTime;
use std::fmt;

/// A bar that could not be used for signal purposes.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedBar {
    pub index: usize,
    pub timestamp: NaiveDateTime,
    pub reason: String,
}

impl fmt::Display for MalformedBar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "malformed bar at index {} ({}): {}",
            self.index, self.timestamp, self.reason
        )
    }
}

/// Top-level error type for macross.
#[derive(Debug, thiserror::Error)]
pub enum MacrossError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("strategy misuse: {reason}")]
    StrategyMisuse { reason: String },

    #[error("{0}")]
    MalformedBar(MalformedBar),

    #[error("price series is not strictly ascending at index {index}")]
    UnorderedSeries { index: usize },

    #[error("unfunded trade at index {index}: commission {commission:.4} exceeds cash {cash:.4}")]
    UnfundedTrade {
        index: usize,
        cash: f64,
        commission: f64,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MacrossError {
    pub(crate) fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        MacrossError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&MacrossError> for std::process::ExitCode {
    fn from(err: &MacrossError) -> Self {
        let code: u8 = match err {
            MacrossError::Io(_) | MacrossError::Report { .. } => 1,
            MacrossError::ConfigParse { .. }
            | MacrossError::ConfigMissing { .. }
            | MacrossError::ConfigInvalid { .. }
            | MacrossError::InvalidParameter { .. } => 2,
            MacrossError::Data { .. } | MacrossError::UnorderedSeries { .. } => 3,
            MacrossError::StrategyMisuse { .. } => 4,
            MacrossError::MalformedBar(_) | MacrossError::UnfundedTrade { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
