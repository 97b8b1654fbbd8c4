//ride ema crossovers while the trend is strong, exit on an atr stop

use crate::data::{Bar, EnrichedBar};
use crate::engine::SizePolicy;
use crate::indicators::{adx, atr, closes, ema, macd, rsi};
use crate::strategy::{PositionView, Signal, Strategy};

const ATR_STOP_MULTIPLE: f64 = 2.5;

pub struct TrendFollowingStrategy;

impl TrendFollowingStrategy {
    pub fn new() -> Self {
        TrendFollowingStrategy
    }
}

impl Default for TrendFollowingStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for TrendFollowingStrategy {
    fn name(&self) -> &'static str {
        "trend-following"
    }

    fn warmup_bars(&self) -> usize {
        40
    }

    fn enrich(&self, bars: &[Bar]) -> Vec<EnrichedBar> {
        let close = closes(bars);
        let macd_out = macd(&close, 12, 26, 9);
        let adx_out = adx(bars, 14);

        let mut series = crate::data::EnrichedSeries::new(bars);
        series
            .attach("ema_fast", &ema(&close, 10))
            .attach("ema_slow", &ema(&close, 30))
            .attach("macd_hist", &macd_out.histogram)
            .attach("adx", &adx_out.adx)
            .attach("rsi", &rsi(&close, 14))
            .attach("atr", &atr(bars, 14));
        series.into_bars()
    }

    fn generate_signal(
        &mut self,
        current: &EnrichedBar,
        previous: &EnrichedBar,
        position: &PositionView,
    ) -> Signal {
        let price = current.close();

        if position.in_position() {
            //volatility-scaled stop under the entry
            if let Some(a) = current.value("atr") {
                if price < position.entry_price - ATR_STOP_MULTIPLE * a {
                    return Signal::Sell;
                }
            }

            if let (Some(fast), Some(slow), Some(prev_fast), Some(prev_slow)) = (
                current.value("ema_fast"),
                current.value("ema_slow"),
                previous.value("ema_fast"),
                previous.value("ema_slow"),
            ) {
                if prev_fast >= prev_slow && fast < slow {
                    return Signal::Sell;
                }
            }
            if let Some(hist) = current.value("macd_hist") {
                if hist < 0.0 {
                    return Signal::Sell;
                }
            }
            return Signal::Hold;
        }

        let inputs = (
            current.value("ema_fast"),
            current.value("ema_slow"),
            previous.value("ema_fast"),
            previous.value("ema_slow"),
            current.value("macd_hist"),
            current.value("adx"),
            current.value("rsi"),
        );
        let (Some(fast), Some(slow), Some(prev_fast), Some(prev_slow), Some(hist), Some(a), Some(r)) =
            inputs
        else {
            return Signal::Hold;
        };

        let crossed_up = prev_fast <= prev_slow && fast > slow;
        if crossed_up && hist > 0.0 && a > 20.0 && r > 40.0 && r < 70.0 {
            return Signal::Buy;
        }

        Signal::Hold
    }

    fn entry_sizing(&self, _current: &EnrichedBar) -> SizePolicy {
        SizePolicy::VolumeCapped {
            fraction: 0.7,
            volume_cap: 0.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(close: f64) -> EnrichedBar {
        EnrichedBar::new(Bar::new_unchecked(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            close,
            close,
            close,
            close,
            1000.0,
            None,
        ))
    }

    #[test]
    fn atr_stop_scales_with_volatility() {
        let mut strategy = TrendFollowingStrategy::new();
        let position = PositionView {
            capital: 0.0,
            shares: 100,
            entry_price: 100.0,
            highest_close: Some(100.0),
        };

        //atr 2 puts the stop at 95
        let mut above = bar(95.5);
        above.set("atr", 2.0);
        above.set("macd_hist", 0.1);
        assert_eq!(
            strategy.generate_signal(&above, &bar(96.0), &position),
            Signal::Hold
        );

        let mut below = bar(94.5);
        below.set("atr", 2.0);
        assert_eq!(
            strategy.generate_signal(&below, &bar(95.5), &position),
            Signal::Sell
        );
    }
}
