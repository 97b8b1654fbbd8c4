//paced accumulation: a sized buy every few bars, trimmed on deep drawdowns

use crate::data::{Bar, EnrichedBar};
use crate::engine::SizePolicy;
use crate::indicators::{closes, ema, pct_change, rolling_std_of, rsi};
use crate::strategy::{PositionView, Signal, Strategy};

const BUY_INTERVAL: usize = 5;
const BASE_FRACTION: f64 = 0.1;
const MAX_FRACTION: f64 = 0.8;
const MIN_FRACTION: f64 = 0.05;
const PARTIAL_EXIT_DRAWDOWN: f64 = 0.05;
const FULL_EXIT_DRAWDOWN: f64 = 0.10;
const PARTIAL_EXIT_FRACTION: f64 = 0.2;

pub struct DcaStrategy {
    bars_since_buy: usize,
    entry_fraction: f64,
    exit_fraction: f64,
}

impl DcaStrategy {
    pub fn new() -> Self {
        DcaStrategy {
            bars_since_buy: BUY_INTERVAL,
            entry_fraction: BASE_FRACTION,
            exit_fraction: 1.0,
        }
    }
}

impl Default for DcaStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for DcaStrategy {
    fn name(&self) -> &'static str {
        "dca"
    }

    fn warmup_bars(&self) -> usize {
        25
    }

    fn enrich(&self, bars: &[Bar]) -> Vec<EnrichedBar> {
        let close = closes(bars);
        let returns = pct_change(&close, 1);

        let mut series = crate::data::EnrichedSeries::new(bars);
        series
            .attach("ema_fast", &ema(&close, 5))
            .attach("ema_slow", &ema(&close, 20))
            .attach("rsi", &rsi(&close, 14))
            .attach("volatility", &rolling_std_of(&returns, 20));
        series.into_bars()
    }

    fn generate_signal(
        &mut self,
        current: &EnrichedBar,
        _previous: &EnrichedBar,
        position: &PositionView,
    ) -> Signal {
        self.bars_since_buy += 1;
        let price = current.close();

        if position.in_position() {
            let ret = position.unrealized_return(price);
            if ret <= -FULL_EXIT_DRAWDOWN {
                self.exit_fraction = 1.0;
                return Signal::Sell;
            }
            //trim on a moderate drawdown, but only once per pacing window
            if ret <= -PARTIAL_EXIT_DRAWDOWN && self.bars_since_buy >= BUY_INTERVAL {
                self.exit_fraction = PARTIAL_EXIT_FRACTION;
                self.bars_since_buy = 0;
                return Signal::Sell;
            }
        }

        if self.bars_since_buy < BUY_INTERVAL {
            return Signal::Hold;
        }

        let inputs = (
            current.value("ema_fast"),
            current.value("ema_slow"),
            current.value("rsi"),
            current.value("volatility"),
        );
        let (Some(fast), Some(slow), Some(r), Some(vol)) = inputs else {
            return Signal::Hold;
        };

        //buy more into weakness, less into froth or churn
        let sentiment = if r < 30.0 {
            1.5
        } else if r > 70.0 {
            0.5
        } else {
            1.0
        };
        let dip = if fast < slow { 1.2 } else { 1.0 };
        let churn = if vol > 0.03 { 0.7 } else { 1.0 };

        self.entry_fraction =
            (BASE_FRACTION * sentiment * dip * churn).clamp(MIN_FRACTION, MAX_FRACTION);
        self.bars_since_buy = 0;
        Signal::Buy
    }

    fn entry_sizing(&self, _current: &EnrichedBar) -> SizePolicy {
        SizePolicy::CapitalFraction {
            fraction: self.entry_fraction,
        }
    }

    fn exit_fraction(&self, _current: &EnrichedBar) -> f64 {
        self.exit_fraction
    }

    fn allows_pyramiding(&self) -> bool {
        true
    }
}
