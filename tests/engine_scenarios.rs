use approx::assert_relative_eq;
use barback::config::RunConfig;
use barback::data::{Bar, EnrichedBar};
use barback::engine::{run_strategy, SizePolicy, TradeSide};
use barback::indicators::{ema, rsi, sma};
use barback::metrics::PerformanceSummary;
use barback::strategy::{PositionView, Signal, Strategy};
use chrono::NaiveDate;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

fn bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| {
            Bar::new_unchecked(
                date((i + 1) as u32),
                *close,
                *close,
                *close,
                *close,
                1_000_000.0,
                None,
            )
        })
        .collect()
}

//replays a fixed signal script, one entry per bar from the second bar on,
//buying all-in so the arithmetic stays checkable by hand
struct Scripted {
    script: Vec<Signal>,
    cursor: usize,
}

impl Scripted {
    fn new(script: Vec<Signal>) -> Self {
        Scripted { script, cursor: 0 }
    }
}

impl Strategy for Scripted {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn warmup_bars(&self) -> usize {
        0
    }

    fn enrich(&self, bars: &[Bar]) -> Vec<EnrichedBar> {
        bars.iter().cloned().map(EnrichedBar::new).collect()
    }

    fn generate_signal(
        &mut self,
        _current: &EnrichedBar,
        _previous: &EnrichedBar,
        _position: &PositionView,
    ) -> Signal {
        let signal = self.script.get(self.cursor).copied().unwrap_or(Signal::Hold);
        self.cursor += 1;
        signal
    }

    fn entry_sizing(&self, _current: &EnrichedBar) -> SizePolicy {
        SizePolicy::CapitalFraction { fraction: 1.0 }
    }
}

//enters on the first bar it sees, then exits two percent under the
//post-entry peak
struct TrailingStop;

impl Strategy for TrailingStop {
    fn name(&self) -> &'static str {
        "trailing-stop"
    }

    fn warmup_bars(&self) -> usize {
        0
    }

    fn enrich(&self, bars: &[Bar]) -> Vec<EnrichedBar> {
        bars.iter().cloned().map(EnrichedBar::new).collect()
    }

    fn generate_signal(
        &mut self,
        current: &EnrichedBar,
        _previous: &EnrichedBar,
        position: &PositionView,
    ) -> Signal {
        if !position.in_position() {
            return Signal::Buy;
        }
        if let Some(hwm) = position.highest_close {
            if current.close() <= hwm * 0.98 {
                return Signal::Sell;
            }
        }
        Signal::Hold
    }

    fn entry_sizing(&self, _current: &EnrichedBar) -> SizePolicy {
        SizePolicy::CapitalFraction { fraction: 1.0 }
    }
}

#[test]
fn one_round_trip_with_hand_checked_capital() {
    //ten days rising linearly from 100 to 110, buy on day 2, sell on day 5
    let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64 * (10.0 / 9.0)).collect();
    let series = bars(&closes);
    let config = RunConfig::new(100_000.0, 0.0003).unwrap();

    let mut strategy = Scripted::new(vec![
        Signal::Buy,
        Signal::Hold,
        Signal::Hold,
        Signal::Sell,
        Signal::Hold,
        Signal::Hold,
        Signal::Hold,
        Signal::Hold,
        Signal::Hold,
    ]);
    let run = run_strategy(&mut strategy, &series, &config).unwrap();

    assert_eq!(run.trades.len(), 2);
    assert_eq!(run.trades[0].side, TradeSide::Buy);
    assert_eq!(run.trades[0].date, date(2));
    assert_eq!(run.trades[1].side, TradeSide::Sell);
    assert_eq!(run.trades[1].date, date(5));
    assert_eq!(run.summary.total_trades, 1);
    assert!(run.summary.total_profit > 0.0);

    let buy_price = closes[1];
    let sell_price = closes[4];
    let shares = (100_000.0 / (buy_price * 1.0003)).floor();
    let after_buy = 100_000.0 - shares * buy_price * 1.0003;
    let expected = after_buy + shares * sell_price * 0.9997;
    assert_relative_eq!(run.summary.final_capital, expected, epsilon = 1e-6);
}

#[test]
fn unaffordable_price_is_a_recorded_noop() {
    let series = bars(&[1_000_000.0, 1_000_000.0, 1_000_000.0]);
    let config = RunConfig::new(100.0, 0.0003).unwrap();

    let mut strategy = Scripted::new(vec![Signal::Buy, Signal::Hold]);
    let run = run_strategy(&mut strategy, &series, &config).unwrap();

    assert!(run.trades.is_empty());
    assert_relative_eq!(run.summary.final_capital, 100.0);
    //the refused order stays observable
    assert_eq!(run.rejections.len(), 1);
}

#[test]
fn trailing_stop_measures_from_the_peak() {
    //entry at 100, peak at 110, then a close exactly two percent under the
    //peak; from the entry alone that bar would still be well in profit
    let series = bars(&[100.0, 100.0, 105.0, 110.0, 107.8, 107.8, 107.8]);
    let config = RunConfig::new(100_000.0, 0.0).unwrap();

    let run = run_strategy(&mut TrailingStop, &series, &config).unwrap();

    let sell = run
        .trades
        .iter()
        .find(|t| t.side == TradeSide::Sell)
        .unwrap();
    assert_eq!(sell.date, date(5));
    assert_relative_eq!(sell.price, 107.8);
}

#[test]
fn drawdown_window_tracks_the_deepest_decline() {
    let trace = [
        100_000.0, 110_000.0, 95_000.0, 105_000.0, 90_000.0, 120_000.0,
    ];
    let (dd, window) = barback::metrics::max_drawdown_over(&trace);

    assert_relative_eq!(dd, (110_000.0 - 90_000.0) / 110_000.0 * 100.0, epsilon = 1e-9);
    //the peak at index 1, the trough at index 4, not the later shallower dip
    assert_eq!(window, Some((1, 4)));
}

#[test]
fn commission_conservation_on_a_flat_round_trip() {
    let series = bars(&[100.0, 100.0, 100.0, 100.0]);
    let config = RunConfig::new(100_000.0, 0.0003).unwrap();

    let mut strategy = Scripted::new(vec![Signal::Buy, Signal::Sell, Signal::Hold]);
    let run = run_strategy(&mut strategy, &series, &config).unwrap();

    let commissions: f64 = run.trades.iter().map(|t| t.commission).sum();
    assert!(commissions > 0.0);
    assert_relative_eq!(
        run.summary.final_capital,
        100_000.0 - commissions,
        epsilon = 1e-9
    );
}

#[test]
fn account_invariants_hold_after_every_fill() {
    let series = bars(&[100.0, 101.0, 99.0, 103.0, 102.0, 104.0, 101.0, 105.0]);
    let config = RunConfig::new(100_000.0, 0.0003).unwrap();

    let mut strategy = Scripted::new(vec![
        Signal::Buy,
        Signal::Hold,
        Signal::Sell,
        Signal::Buy,
        Signal::Sell,
        Signal::Buy,
        Signal::Hold,
    ]);
    let run = run_strategy(&mut strategy, &series, &config).unwrap();

    for trade in &run.trades {
        assert!(trade.capital_after >= 0.0);
        assert!(trade.shares > 0);
    }
}

#[test]
fn forced_liquidation_dates_the_final_bar() {
    let series = bars(&[100.0, 100.0, 104.0, 108.0]);
    let config = RunConfig::new(100_000.0, 0.0003).unwrap();

    let mut strategy = Scripted::new(vec![Signal::Buy, Signal::Hold, Signal::Hold]);
    let run = run_strategy(&mut strategy, &series, &config).unwrap();

    let last = run.trades.last().unwrap();
    assert_eq!(last.side, TradeSide::Sell);
    assert_eq!(last.date, series.last().unwrap().date);
    assert_relative_eq!(last.price, 108.0);
    assert_eq!(last.position_after, 0);
}

#[test]
fn indicators_are_pure_functions_of_the_prefix() {
    let closes: Vec<f64> = (0..60)
        .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0)
        .collect();
    let mut altered = closes.clone();
    for value in altered.iter_mut().skip(40) {
        *value += 50.0;
    }

    let full_sma = sma(&closes, 10);
    let altered_sma = sma(&altered, 10);
    let full_ema = ema(&closes, 10);
    let altered_ema = ema(&altered, 10);
    let full_rsi = rsi(&closes, 14);
    let altered_rsi = rsi(&altered, 14);

    //everything strictly before the first altered bar must be untouched
    for i in 0..40 {
        assert_eq!(full_sma[i], altered_sma[i]);
        assert_eq!(full_ema[i], altered_ema[i]);
        assert_eq!(full_rsi[i], altered_rsi[i]);
    }

    let truncated_sma = sma(&closes[..40], 10);
    assert_eq!(&full_sma[..40], &truncated_sma[..]);
}

#[test]
fn aggregation_is_idempotent() {
    let series = bars(&[100.0, 101.0, 99.0, 103.0, 102.0, 104.0]);
    let config = RunConfig::new(100_000.0, 0.0003).unwrap();

    let mut strategy = Scripted::new(vec![
        Signal::Buy,
        Signal::Sell,
        Signal::Buy,
        Signal::Hold,
        Signal::Sell,
    ]);
    let run = run_strategy(&mut strategy, &series, &config).unwrap();

    let first = PerformanceSummary::from_trades(&run.trades, 100_000.0, series[0].date);
    let second = PerformanceSummary::from_trades(&run.trades, 100_000.0, series[0].date);

    assert_eq!(first.total_trades, second.total_trades);
    assert_eq!(first.winning_trades, second.winning_trades);
    assert_eq!(first.total_profit, second.total_profit);
    assert_eq!(first.max_drawdown_pct, second.max_drawdown_pct);
    assert_eq!(first.drawdown_window, second.drawdown_window);
    assert_eq!(first.final_capital, second.final_capital);
}
