//! Portfolio state: cash, commission and the unit position.

use chrono::NaiveDateTime;

use super::error::MacrossError;
use super::position::{PositionSide, Trade};
use super::signal::Signal;

/// Every trade is one unit at the bar's close.
pub const UNIT_SIZE: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub initial_cash: f64,
    pub cash: f64,
    pub commission_rate: f64,
    pub position: PositionSide,
    pub entry_price: Option<f64>,
    pub realized_pnl: f64,
    pub total_commission: f64,
    pub trades: Vec<Trade>,
}

impl Portfolio {
    pub fn new(initial_cash: f64, commission_rate: f64) -> Result<Self, MacrossError> {
        if !initial_cash.is_finite() || initial_cash < 0.0 {
            return Err(MacrossError::invalid_parameter(
                "initial_cash",
                "must be a non-negative number",
            ));
        }
        if !(0.0..1.0).contains(&commission_rate) {
            return Err(MacrossError::invalid_parameter(
                "commission_rate",
                "must be in [0, 1)",
            ));
        }
        Ok(Portfolio {
            initial_cash,
            cash: initial_cash,
            commission_rate,
            position: PositionSide::Flat,
            entry_price: None,
            realized_pnl: 0.0,
            total_commission: 0.0,
            trades: Vec::new(),
        })
    }

    /// Commission charged for one notional trade at `price`.
    pub fn commission_for(&self, price: f64) -> f64 {
        (price * UNIT_SIZE).abs() * self.commission_rate
    }

    /// Move the position according to `signal` at `price`.
    ///
    /// Returns the executed trade, or `None` when the signal leaves the
    /// position unchanged (Hold, InsufficientData, or a repeat of the
    /// current side).
    pub fn apply(
        &mut self,
        signal: Signal,
        index: usize,
        timestamp: NaiveDateTime,
        price: f64,
    ) -> Result<Option<Trade>, MacrossError> {
        let Some(target) = PositionSide::target(signal) else {
            return Ok(None);
        };
        if target == self.position {
            return Ok(None);
        }

        let commission = self.commission_for(price);
        if commission > self.cash {
            return Err(MacrossError::UnfundedTrade {
                index,
                cash: self.cash,
                commission,
            });
        }
        self.cash -= commission;
        self.total_commission += commission;

        if let Some(entry) = self.entry_price {
            self.realized_pnl += f64::from(self.position.sign()) * (price - entry) * UNIT_SIZE;
        }

        let trade = Trade {
            index,
            timestamp,
            from: self.position,
            to: target,
            price,
            commission,
        };
        self.position = target;
        self.entry_price = Some(price);
        self.trades.push(trade.clone());
        Ok(Some(trade))
    }

    /// Open P&L of the unit position at `price`.
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        match self.entry_price {
            Some(entry) => f64::from(self.position.sign()) * (price - entry) * UNIT_SIZE,
            None => 0.0,
        }
    }

    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }
}
