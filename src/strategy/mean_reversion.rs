//buy stretched declines below the band, exit when enough pressure flips

use crate::data::{Bar, EnrichedBar};
use crate::engine::SizePolicy;
use crate::indicators::{closes, momentum, rolling_std, rsi, sma, volume_ratio};
use crate::strategy::{PositionView, Signal, Strategy};

const TAKE_PROFIT: f64 = 0.05;
const TRAILING_STOP: f64 = 0.02;
const BAND_FACTOR: f64 = 1.5;
const RSI_LOWER: f64 = 25.0;
const RSI_UPPER: f64 = 75.0;

pub struct MeanReversionStrategy;

impl MeanReversionStrategy {
    pub fn new() -> Self {
        MeanReversionStrategy
    }
}

impl Default for MeanReversionStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for MeanReversionStrategy {
    fn name(&self) -> &'static str {
        "mean-reversion"
    }

    fn warmup_bars(&self) -> usize {
        20
    }

    fn enrich(&self, bars: &[Bar]) -> Vec<EnrichedBar> {
        let close = closes(bars);

        let mut series = crate::data::EnrichedSeries::new(bars);
        series
            .attach("sma_short", &sma(&close, 3))
            .attach("sma_mid", &sma(&close, 8))
            .attach("std_dev", &rolling_std(&close, 15))
            .attach("rsi", &rsi(&close, 10))
            .attach("momentum", &momentum(&close, 10))
            .attach("vol_ratio", &volume_ratio(bars, 20));
        series.into_bars()
    }

    fn generate_signal(
        &mut self,
        current: &EnrichedBar,
        previous: &EnrichedBar,
        position: &PositionView,
    ) -> Signal {
        let price = current.close();

        let inputs = (
            current.value("sma_short"),
            previous.value("sma_short"),
            current.value("sma_mid"),
            current.value("std_dev"),
            current.value("rsi"),
            current.value("momentum"),
            previous.value("momentum"),
            current.value("vol_ratio"),
        );
        let (
            Some(short),
            Some(prev_short),
            Some(mid),
            Some(std),
            Some(r),
            Some(mom),
            Some(prev_mom),
            Some(vol),
        ) = inputs
        else {
            //stops stay live through indicator gaps
            if position.in_position() {
                let ret = position.unrealized_return(price);
                if ret > TAKE_PROFIT {
                    return Signal::Sell;
                }
                if let Some(hwm) = position.highest_close {
                    if price < hwm * (1.0 - TRAILING_STOP) {
                        return Signal::Sell;
                    }
                }
            }
            return Signal::Hold;
        };

        if !position.in_position() {
            let below_band = price < mid - BAND_FACTOR * std;
            let oversold = r < RSI_LOWER;
            let momentum_up = mom > prev_mom;
            let ma_support = short > prev_short;

            let score = [below_band, oversold, momentum_up, ma_support]
                .iter()
                .filter(|c| **c)
                .count();
            //thin tape gives unreliable reversion fills
            if score >= 2 && vol > 0.8 {
                return Signal::Buy;
            }
            return Signal::Hold;
        }

        let ret = position.unrealized_return(price);
        if ret > TAKE_PROFIT {
            return Signal::Sell;
        }
        if let Some(hwm) = position.highest_close {
            if price < hwm * (1.0 - TRAILING_STOP) {
                return Signal::Sell;
            }
        }

        let above_band = price > mid + BAND_FACTOR * std;
        let overbought = r > RSI_UPPER;
        let momentum_down = mom < prev_mom;
        let ma_resistance = short < prev_short;

        let score = [above_band, overbought, momentum_down, ma_resistance]
            .iter()
            .filter(|c| **c)
            .count();
        if score >= 2 {
            return Signal::Sell;
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
