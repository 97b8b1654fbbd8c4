use crate::engine::{Trade, TradeSide};
use chrono::NaiveDate;
use serde::Serialize;
use statrs::statistics::Statistics;

//performance of one strategy over one run
//a "trade" here is a completed sell: its profit is the sell proceeds net of
//commission minus the proportional cost of the shares it unwound
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceSummary {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub win_rate_pct: f64,
    pub avg_profit_per_trade: f64,
    pub total_profit: f64,
    pub profit_rate_pct: f64,
    pub max_drawdown_pct: f64,
    pub drawdown_window: Option<(NaiveDate, NaiveDate)>,
    pub final_capital: f64,
}

impl PerformanceSummary {
    //aggregates a fill ledger; the run must have ended flat, so the final
    //capital is the cash after the last fill
    pub fn from_trades(trades: &[Trade], initial_capital: f64, start_date: NaiveDate) -> Self {
        let mut open_shares = 0.0_f64;
        let mut open_cost = 0.0_f64;

        let mut profits: Vec<f64> = Vec::new();
        let mut capital_trace = vec![initial_capital];
        let mut trace_dates = vec![start_date];

        for trade in trades {
            match trade.side {
                TradeSide::Buy => {
                    open_shares += trade.shares as f64;
                    open_cost += trade.amount + trade.commission;
                }
                TradeSide::Sell => {
                    let avg_cost = open_cost / open_shares;
                    let cost_sold = avg_cost * trade.shares as f64;
                    let profit = trade.amount - trade.commission - cost_sold;
                    profits.push(profit);

                    open_shares -= trade.shares as f64;
                    open_cost -= cost_sold;

                    //capital is only observable between round trips
                    capital_trace.push(trade.capital_after);
                    trace_dates.push(trade.date);
                }
            }
        }

        let total_trades = profits.len();
        let winning_trades = profits.iter().filter(|p| **p > 0.0).count();
        let total_profit: f64 = profits.iter().sum();
        let avg_profit_per_trade = if total_trades > 0 {
            profits.clone().mean()
        } else {
            0.0
        };
        let win_rate_pct = if total_trades > 0 {
            winning_trades as f64 / total_trades as f64 * 100.0
        } else {
            0.0
        };

        let (max_drawdown_pct, window) = max_drawdown_over(&capital_trace);
        let drawdown_window = window.map(|(peak, trough)| (trace_dates[peak], trace_dates[trough]));

        let final_capital = trades
            .last()
            .map(|t| t.capital_after)
            .unwrap_or(initial_capital);

        PerformanceSummary {
            total_trades,
            winning_trades,
            win_rate_pct,
            avg_profit_per_trade,
            total_profit,
            profit_rate_pct: total_profit / initial_capital * 100.0,
            max_drawdown_pct,
            drawdown_window,
            final_capital,
        }
    }
}

//largest peak-to-trough decline over a capital trace, in percent of the peak
//the window opens where the running peak was last raised and closes at the
//trough that realized the decline
pub fn max_drawdown_over(values: &[f64]) -> (f64, Option<(usize, usize)>) {
    let mut peak = f64::MIN;
    let mut peak_index = 0usize;
    let mut worst = 0.0_f64;
    let mut window = None;

    for (i, value) in values.iter().enumerate() {
        if *value > peak {
            peak = *value;
            peak_index = i;
        } else if peak > 0.0 {
            let drawdown = (peak - value) / peak * 100.0;
            if drawdown > worst {
                worst = drawdown;
                window = Some((peak_index, i));
            }
        }
    }

    (worst, window)
}
