//! Market data port.

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::error::MacrossError;
use crate::domain::ohlcv::PriceBar;

pub trait DataPort {
    /// Bars between `start` and `end` (inclusive, either bound optional),
    /// sorted by timestamp.
    fn fetch_bars(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, MacrossError>;

    /// First and last timestamp plus bar count, or `None` for an empty source.
    fn data_range(&self) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, MacrossError> {
        let bars = self.fetch_bars(None, None)?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.timestamp, last.timestamp, bars.len())),
            _ => None,
        })
    }
}
