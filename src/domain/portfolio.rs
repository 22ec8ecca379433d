//! Portfolio state and equity tracking.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Flat,
    Long,
}

/// Cash/BTC holdings for a single run.
///
/// Every trade moves the whole balance from one side to the other, so
/// outside a trade at most one of `cash` and `btc_held` is non-zero.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioState {
    pub cash: f64,
    pub btc_held: f64,
    pub position: Position,
}

impl PortfolioState {
    pub fn new(initial_capital: f64) -> Self {
        PortfolioState {
            cash: initial_capital,
            btc_held: 0.0,
            position: Position::Flat,
        }
    }

    pub fn is_long(&self) -> bool {
        self.position == Position::Long
    }

    /// Convert all cash to BTC at `price`. The fee multiplier is applied to
    /// the cash before conversion. Returns false if nothing was bought.
    pub fn buy_all(&mut self, price: f64, fee_mult: f64) -> bool {
        if self.position != Position::Flat || self.cash <= 0.0 {
            return false;
        }
        self.btc_held = self.cash * fee_mult / price;
        self.cash = 0.0;
        self.position = Position::Long;
        true
    }

    /// Convert all BTC to cash at `price`. The fee multiplier is applied to
    /// the proceeds. Returns false if nothing was sold.
    pub fn sell_all(&mut self, price: f64, fee_mult: f64) -> bool {
        if self.position != Position::Long || self.btc_held <= 0.0 {
            return false;
        }
        self.cash = self.btc_held * price * fee_mult;
        self.btc_held = 0.0;
        self.position = Position::Flat;
        true
    }

    /// cash + btc_held * close
    pub fn mark_to_market(&self, close: f64) -> f64 {
        self.cash + self.btc_held * close
    }
}
