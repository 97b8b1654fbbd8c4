use crate::data::EnrichedBar;
use crate::engine::account::{AccountState, RejectReason, Rejection, Trade, TradeSide};
use crate::strategy::PositionView;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Sell with no open position on {date}")]
    SellWhileFlat { date: chrono::NaiveDate },
    #[error("Invalid exit fraction {fraction}, must be in (0, 1]")]
    InvalidExitFraction { fraction: f64 },
}

//how the engine turns a buy signal into a share count
//every variant rounds down to whole shares after reserving commission
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizePolicy {
    //spend a fixed fraction of free capital
    CapitalFraction { fraction: f64 },
    //fixed fraction of capital, but never more than a share of the bar's volume
    VolumeCapped { fraction: f64, volume_cap: f64 },
    //risk a fraction of capital against an atr-derived stop distance, with a
    //hard cap as a fraction of capital; fallback_atr_ratio * price stands in
    //when the atr is still undefined
    AtrRisk {
        risk_fraction: f64,
        atr_multiple: f64,
        cap_fraction: f64,
        fallback_atr_ratio: f64,
    },
}

//single generic execution engine: fills at the signal bar's close, charges
//commission on both sides, tracks the high-water mark while in position
//
//sizing and exit fractions are injected per order, so every strategy runs
//through the same fill, bookkeeping and rejection paths
pub struct ExecutionEngine {
    commission_rate: f64,
    account: AccountState,
    trades: Vec<Trade>,
    rejections: Vec<Rejection>,
}

//what a buy attempt came to: a fill or a recorded rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuyOutcome {
    Filled { shares: u64 },
    Rejected,
}

impl ExecutionEngine {
    pub fn new(initial_capital: f64, commission_rate: f64) -> Self {
        ExecutionEngine {
            commission_rate,
            account: AccountState::new(initial_capital),
            trades: Vec::new(),
            rejections: Vec::new(),
        }
    }

    pub fn account(&self) -> &AccountState {
        &self.account
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn rejections(&self) -> &[Rejection] {
        &self.rejections
    }

    //snapshot handed to the strategy before the current close is folded
    //into the high-water mark
    pub fn position_view(&self) -> PositionView {
        PositionView {
            capital: self.account.capital,
            shares: self.account.position,
            entry_price: self.account.entry_price,
            highest_close: self.account.highest_close,
        }
    }

    //folds the bar's close into the high-water mark; call once per bar,
    //after the signal for that bar has been handled
    pub fn observe_close(&mut self, bar: &EnrichedBar) {
        if self.account.position > 0 {
            let close = bar.close();
            self.account.highest_close = Some(match self.account.highest_close {
                Some(hwm) => hwm.max(close),
                None => close,
            });
        }
    }

    fn resolve_shares(&self, bar: &EnrichedBar, policy: SizePolicy) -> (f64, u64) {
        let price = bar.close();
        let unit_cost = price * (1.0 + self.commission_rate);

        match policy {
            SizePolicy::CapitalFraction { fraction } => {
                let budget = self.account.capital * fraction;
                (budget, (budget / unit_cost).floor() as u64)
            }
            SizePolicy::VolumeCapped {
                fraction,
                volume_cap,
            } => {
                let budget = self.account.capital * fraction;
                let by_capital = (budget / unit_cost).floor() as u64;
                let by_volume = (bar.volume() * volume_cap).floor() as u64;
                (budget, by_capital.min(by_volume))
            }
            SizePolicy::AtrRisk {
                risk_fraction,
                atr_multiple,
                cap_fraction,
                fallback_atr_ratio,
            } => {
                let atr = bar
                    .value("atr")
                    .filter(|a| *a > 0.0)
                    .unwrap_or(fallback_atr_ratio * price);
                let risk_budget = self.account.capital * risk_fraction;
                let by_risk = (risk_budget / (atr_multiple * atr)).floor() as u64;
                let cap_budget = self.account.capital * cap_fraction;
                let by_cap = (cap_budget / unit_cost).floor() as u64;
                (cap_budget, by_risk.min(by_cap))
            }
        }
    }

    //attempts a buy at the bar's close under the given sizing policy
    //an order the account cannot absorb is recorded as a rejection, not an
    //error; so is a repeat entry when the strategy does not pyramid
    pub fn buy(
        &mut self,
        bar: &EnrichedBar,
        policy: SizePolicy,
        pyramiding: bool,
    ) -> Result<BuyOutcome, EngineError> {
        if self.account.position > 0 && !pyramiding {
            self.rejections.push(Rejection {
                date: bar.date(),
                reason: RejectReason::AlreadyInPosition {
                    position: self.account.position,
                },
            });
            return Ok(BuyOutcome::Rejected);
        }

        let price = bar.close();
        let (budget, shares) = self.resolve_shares(bar, policy);

        if shares == 0 {
            self.rejections.push(Rejection {
                date: bar.date(),
                reason: RejectReason::ZeroShares { budget, price },
            });
            return Ok(BuyOutcome::Rejected);
        }

        let amount = shares as f64 * price;
        let commission = amount * self.commission_rate;
        let needed = amount + commission;
        if needed > self.account.capital {
            self.rejections.push(Rejection {
                date: bar.date(),
                reason: RejectReason::InsufficientCapital {
                    needed,
                    available: self.account.capital,
                },
            });
            return Ok(BuyOutcome::Rejected);
        }

        let old_position = self.account.position;
        let new_position = old_position + shares;

        //weighted-average entry price across pyramided lots
        self.account.entry_price = if old_position == 0 {
            price
        } else {
            (self.account.entry_price * old_position as f64 + amount) / new_position as f64
        };
        self.account.capital -= needed;
        self.account.position = new_position;
        if self.account.highest_close.is_none() {
            self.account.highest_close = Some(price);
        }

        self.trades.push(Trade {
            date: bar.date(),
            side: TradeSide::Buy,
            price,
            shares,
            amount,
            commission,
            capital_after: self.account.capital,
            position_after: new_position,
        });

        #[cfg(debug_assertions)]
        self.account.assert_consistent();

        Ok(BuyOutcome::Filled { shares })
    }

    //sells the given fraction of the open position at the bar's close
    //fractions that round to zero shares fall back to a single share;
    //a fraction of 1 always unwinds the whole position
    pub fn sell(&mut self, bar: &EnrichedBar, fraction: f64) -> Result<(), EngineError> {
        if self.account.position == 0 {
            return Err(EngineError::SellWhileFlat { date: bar.date() });
        }
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(EngineError::InvalidExitFraction { fraction });
        }

        let shares = if fraction >= 1.0 {
            self.account.position
        } else {
            ((self.account.position as f64 * fraction).floor() as u64).max(1)
        };

        let price = bar.close();
        let amount = shares as f64 * price;
        let commission = amount * self.commission_rate;

        self.account.capital += amount - commission;
        self.account.position -= shares;
        if self.account.position == 0 {
            self.account.entry_price = 0.0;
            self.account.highest_close = None;
        }

        self.trades.push(Trade {
            date: bar.date(),
            side: TradeSide::Sell,
            price,
            shares,
            amount,
            commission,
            capital_after: self.account.capital,
            position_after: self.account.position,
        });

        #[cfg(debug_assertions)]
        self.account.assert_consistent();

        Ok(())
    }

    pub fn into_records(self) -> (Vec<Trade>, Vec<Rejection>, AccountState) {
        (self.trades, self.rejections, self.account)
    }
}
