//! Ordered, append-only price series.

use crate::domain::error::MacrossError;
use crate::domain::ohlcv::PriceBar;

/// Bars ordered strictly by timestamp. The driver only ever hands out
/// prefixes of this to a strategy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, MacrossError> {
        let mut series = PriceSeries {
            bars: Vec::with_capacity(bars.len()),
        };
        for bar in bars {
            series.push(bar)?;
        }
        Ok(series)
    }

    /// Append a bar; its timestamp must be later than the last one.
    pub fn push(&mut self, bar: PriceBar) -> Result<(), MacrossError> {
        if let Some(last) = self.bars.last() {
            if bar.timestamp <= last.timestamp {
                return Err(MacrossError::UnorderedSeries {
                    index: self.bars.len(),
                });
            }
        }
        self.bars.push(bar);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PriceBar> {
        self.bars.get(index)
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    /// Bars `[0..len)`. `len` is clamped to the series length.
    pub fn prefix(&self, len: usize) -> &[PriceBar] {
        &self.bars[..len.min(self.bars.len())]
    }
}
