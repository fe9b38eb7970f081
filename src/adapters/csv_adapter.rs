//! CSV file data adapter.
//!
//! Columns are located by header name. Only the timestamp and close columns
//! are required; `open`, `high` and `low` fall back to the close and volume
//! falls back to zero.

use chrono::{NaiveDate, NaiveDateTime};
use std::path::PathBuf;
use tracing::debug;

use crate::domain::error::MacrossError;
use crate::domain::ohlcv::PriceBar;
use crate::ports::data_port::DataPort;

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Header names of the columns the adapter reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvColumns {
    pub date: String,
    pub price: String,
    pub volume: String,
}

impl Default for CsvColumns {
    fn default() -> Self {
        CsvColumns {
            date: "date".to_string(),
            price: "close".to_string(),
            volume: "volume".to_string(),
        }
    }
}

pub struct CsvAdapter {
    path: PathBuf,
    columns: CsvColumns,
}

struct ColumnIndex {
    date: usize,
    close: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    volume: Option<usize>,
}

impl CsvAdapter {
    pub fn new(path: PathBuf, columns: CsvColumns) -> Self {
        Self { path, columns }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn locate(&self, headers: &csv::StringRecord) -> Result<ColumnIndex, MacrossError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| MacrossError::Data {
                reason: format!("{}: missing column '{}'", self.path.display(), name),
            })
        };
        Ok(ColumnIndex {
            date: require(&self.columns.date)?,
            close: require(&self.columns.price)?,
            open: find("open"),
            high: find("high"),
            low: find("low"),
            volume: find(&self.columns.volume),
        })
    }
}

/// Parse a timestamp cell. A bare date is taken as midnight.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_cell(record: &csv::StringRecord, index: Option<usize>) -> Option<f64> {
    index
        .and_then(|i| record.get(i))
        .and_then(|s| s.trim().parse::<f64>().ok())
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, MacrossError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| MacrossError::Data {
                reason: format!("failed to read {}: {}", self.path.display(), e),
            })?;

        let headers = rdr
            .headers()
            .map_err(|e| MacrossError::Data {
                reason: format!("CSV header error: {}", e),
            })?
            .clone();
        let cols = self.locate(&headers)?;

        let mut bars = Vec::new();
        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| MacrossError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let raw_ts = record.get(cols.date).unwrap_or_default();
            let timestamp = parse_timestamp(raw_ts).ok_or_else(|| MacrossError::Data {
                reason: format!("row {}: invalid timestamp '{}'", row + 1, raw_ts),
            })?;

            let date = timestamp.date();
            if start.is_some_and(|s| date < s) || end.is_some_and(|e| date > e) {
                continue;
            }

            let close = parse_cell(&record, Some(cols.close));
            let fallback = close.unwrap_or(0.0);
            bars.push(PriceBar {
                timestamp,
                open: parse_cell(&record, cols.open).unwrap_or(fallback),
                high: parse_cell(&record, cols.high).unwrap_or(fallback),
                low: parse_cell(&record, cols.low).unwrap_or(fallback),
                close,
                volume: parse_cell(&record, cols.volume).unwrap_or(0.0),
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        debug!(path = %self.path.display(), bars = bars.len(), "loaded price data");
        Ok(bars)
    }
}
