use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "BUY"),
            TradeSide::Sell => write!(f, "SELL"),
        }
    }
}

//one executed fill, recorded after commission settles
#[derive(Debug, Clone, Serialize)]
pub struct Trade {
    pub date: NaiveDate,
    pub side: TradeSide,
    pub price: f64,
    pub shares: u64,
    pub amount: f64,
    pub commission: f64,
    pub capital_after: f64,
    pub position_after: u64,
}

//an order the engine refused to fill, kept for the run report
#[derive(Debug, Clone)]
pub struct Rejection {
    pub date: NaiveDate,
    pub reason: RejectReason,
}

#[derive(Debug, Clone)]
pub enum RejectReason {
    //the sized order rounds down to zero shares
    ZeroShares { budget: f64, price: f64 },
    //cost including commission exceeds free capital
    InsufficientCapital { needed: f64, available: f64 },
    //repeat entry while already long, pyramiding disabled
    AlreadyInPosition { position: u64 },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::ZeroShares { budget, price } => write!(
                f,
                "Order rounds to zero shares (budget {:.2} at price {:.2})",
                budget, price
            ),
            RejectReason::InsufficientCapital { needed, available } => write!(
                f,
                "Insufficient capital: need {:.2}, have {:.2}",
                needed, available
            ),
            RejectReason::AlreadyInPosition { position } => write!(
                f,
                "Already holding {} shares and pyramiding is disabled",
                position
            ),
        }
    }
}

//cash and position state, one asset
//invariant: position == 0 exactly when entry_price == 0 and
//highest_close is none; the engine maintains this on every fill
#[derive(Debug, Clone)]
pub struct AccountState {
    pub capital: f64,
    pub position: u64,
    pub entry_price: f64,
    pub highest_close: Option<f64>,
}

impl AccountState {
    pub fn new(initial_capital: f64) -> Self {
        AccountState {
            capital: initial_capital,
            position: 0,
            entry_price: 0.0,
            highest_close: None,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.position == 0
    }

    //mark-to-market equity at the given price
    pub fn equity(&self, price: f64) -> f64 {
        self.capital + self.position as f64 * price
    }

    #[cfg(debug_assertions)]
    pub fn assert_consistent(&self) {
        if self.position == 0 {
            debug_assert_eq!(self.entry_price, 0.0);
            debug_assert!(self.highest_close.is_none());
        } else {
            debug_assert!(self.entry_price > 0.0);
            debug_assert!(self.highest_close.is_some());
        }
        debug_assert!(self.capital >= 0.0);
    }
}
