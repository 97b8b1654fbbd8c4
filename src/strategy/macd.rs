//macd histogram momentum with volume, rsi, adx and short-trend confirmation

use crate::data::{Bar, EnrichedBar};
use crate::indicators::{adx, closes, ema, macd, rsi, volume_ratio};
use crate::strategy::{PositionView, Signal, Strategy};

const STOP_LOSS: f64 = 0.015;
const TAKE_PROFIT: f64 = 0.025;

pub struct MacdStrategy;

impl MacdStrategy {
    pub fn new() -> Self {
        MacdStrategy
    }
}

impl Default for MacdStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for MacdStrategy {
    fn name(&self) -> &'static str {
        "macd"
    }

    fn warmup_bars(&self) -> usize {
        //adx(10) is the slowest to seed
        20
    }

    fn enrich(&self, bars: &[Bar]) -> Vec<EnrichedBar> {
        let close = closes(bars);
        let macd_out = macd(&close, 6, 13, 5);
        let adx_out = adx(bars, 10);

        let mut series = crate::data::EnrichedSeries::new(bars);
        series
            .attach("macd_hist", &macd_out.histogram)
            .attach("vol_ratio", &volume_ratio(bars, 5))
            .attach("rsi", &rsi(&close, 10))
            .attach("adx", &adx_out.adx)
            .attach("ema5", &ema(&close, 5))
            .attach("ema10", &ema(&close, 10));
        series.into_bars()
    }

    fn generate_signal(
        &mut self,
        current: &EnrichedBar,
        previous: &EnrichedBar,
        position: &PositionView,
    ) -> Signal {
        let price = current.close();
        let mut signal = Signal::Hold;

        let inputs = (
            current.value("macd_hist"),
            previous.value("macd_hist"),
            current.value("vol_ratio"),
            current.value("rsi"),
            current.value("adx"),
            current.value("ema5"),
            current.value("ema10"),
        );
        if let (Some(hist), Some(prev_hist), Some(vol), Some(r), Some(a), Some(fast), Some(slow)) =
            inputs
        {
            //histogram flips positive, or keeps accelerating
            let macd_buy = (prev_hist < 0.0 && hist > 0.0) || hist > prev_hist * 1.05;
            if macd_buy && vol > 1.1 && r < 65.0 && a > 15.0 && fast > slow {
                signal = Signal::Buy;
            }

            let macd_sell = (prev_hist > 0.0 && hist < 0.0) || hist < prev_hist * 0.95;
            if macd_sell && vol > 1.1 && r > 35.0 && fast < slow {
                signal = Signal::Sell;
            }
        }

        //risk override outranks the histogram signal
        if position.in_position() {
            let ret = position.unrealized_return(price);
            let stop = if ret > 0.02 {
                (ret - 0.015).max(STOP_LOSS)
            } else {
                STOP_LOSS
            };
            if ret < -stop || ret > TAKE_PROFIT {
                signal = Signal::Sell;
            }
        }

        signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn flat_position() -> PositionView {
        PositionView {
            capital: 100_000.0,
            shares: 0,
            entry_price: 0.0,
            highest_close: None,
        }
    }

    fn long_position(entry: f64, hwm: f64) -> PositionView {
        PositionView {
            capital: 0.0,
            shares: 100,
            entry_price: entry,
            highest_close: Some(hwm),
        }
    }

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

    fn confirmed(mut current: EnrichedBar) -> EnrichedBar {
        current.set("vol_ratio", 1.5);
        current.set("rsi", 50.0);
        current.set("adx", 20.0);
        current.set("ema5", 101.0);
        current.set("ema10", 100.0);
        current
    }

    #[test]
    fn holds_while_indicators_warm_up() {
        let mut strategy = MacdStrategy::new();
        let current = bar(100.0);
        let previous = bar(99.0);
        let signal = strategy.generate_signal(&current, &previous, &flat_position());
        assert_eq!(signal, Signal::Hold);
    }

    #[test]
    fn stop_loss_fires_on_price_alone() {
        //a position under water past the stop sells without any indicators
        let mut strategy = MacdStrategy::new();
        let current = bar(98.0);
        let previous = bar(99.0);
        let signal = strategy.generate_signal(&current, &previous, &long_position(100.0, 100.0));
        assert_eq!(signal, Signal::Sell);
    }

    #[test]
    fn take_profit_fires_on_price_alone() {
        let mut strategy = MacdStrategy::new();
        let current = bar(103.0);
        let previous = bar(102.0);
        let signal = strategy.generate_signal(&current, &previous, &long_position(100.0, 102.0));
        assert_eq!(signal, Signal::Sell);
    }

    #[test]
    fn histogram_flip_with_confirmation_buys() {
        let mut strategy = MacdStrategy::new();

        let mut previous = bar(100.0);
        previous.set("macd_hist", -0.1);

        let mut current = confirmed(bar(101.0));
        current.set("macd_hist", 0.05);

        let signal = strategy.generate_signal(&current, &previous, &flat_position());
        assert_eq!(signal, Signal::Buy);
    }

    #[test]
    fn accelerating_histogram_buys_without_a_flip() {
        let mut strategy = MacdStrategy::new();

        //already positive, growing more than five percent bar over bar
        let mut previous = bar(100.0);
        previous.set("macd_hist", 0.2);

        let mut current = confirmed(bar(101.0));
        current.set("macd_hist", 0.3);

        let signal = strategy.generate_signal(&current, &previous, &flat_position());
        assert_eq!(signal, Signal::Buy);
    }

    #[test]
    fn flip_without_volume_holds() {
        let mut strategy = MacdStrategy::new();

        let mut previous = bar(100.0);
        previous.set("macd_hist", -0.1);

        let mut current = confirmed(bar(101.0));
        current.set("macd_hist", 0.05);
        current.set("vol_ratio", 0.9);

        let signal = strategy.generate_signal(&current, &previous, &flat_position());
        assert_eq!(signal, Signal::Hold);
    }

    #[test]
    fn collapsing_histogram_under_the_trend_sells() {
        let mut strategy = MacdStrategy::new();
        let position = long_position(100.0, 101.0);

        let mut previous = bar(101.0);
        previous.set("macd_hist", 0.3);

        //histogram shrinking past the 5% band, fast ema under the slow
        let mut current = bar(100.0);
        current.set("macd_hist", 0.2);
        current.set("vol_ratio", 1.4);
        current.set("rsi", 55.0);
        current.set("adx", 20.0);
        current.set("ema5", 99.0);
        current.set("ema10", 100.0);

        let signal = strategy.generate_signal(&current, &previous, &position);
        assert_eq!(signal, Signal::Sell);
    }
}
