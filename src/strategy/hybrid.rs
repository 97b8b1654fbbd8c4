//blended trend, momentum and band signals; conviction scales the entry size

use crate::data::{Bar, EnrichedBar};
use crate::engine::SizePolicy;
use crate::indicators::{
    adx, atr, bollinger, closes, ema, macd, momentum, rsi, sma, volume_ratio,
};
use crate::strategy::{PositionView, Signal, Strategy};

const STOP_LOSS: f64 = 0.03;
const TAKE_PROFIT: f64 = 0.05;
const TRAILING_STOP: f64 = 0.02;
const MIN_VOLUME_RATIO: f64 = 0.8;
const ENTRY_SCORE: usize = 2;
const BASE_FRACTION: f64 = 0.3;
const CONVICTION_STEP: f64 = 0.15;

pub struct HybridStrategy {
    entry_fraction: f64,
}

impl HybridStrategy {
    pub fn new() -> Self {
        HybridStrategy {
            entry_fraction: BASE_FRACTION,
        }
    }
}

impl Default for HybridStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for HybridStrategy {
    fn name(&self) -> &'static str {
        "hybrid"
    }

    fn warmup_bars(&self) -> usize {
        30
    }

    fn enrich(&self, bars: &[Bar]) -> Vec<EnrichedBar> {
        let close = closes(bars);
        let macd_out = macd(&close, 8, 17, 7);
        let bands = bollinger(&close, 15, 1.8);
        let adx_out = adx(bars, 14);

        let mut series = crate::data::EnrichedSeries::new(bars);
        series
            .attach("sma_fast", &sma(&close, 5))
            .attach("ema_mid", &ema(&close, 7))
            .attach("sma_slow", &sma(&close, 15))
            .attach("macd_hist", &macd_out.histogram)
            .attach("rsi", &rsi(&close, 10))
            .attach("bb_lower", &bands.lower)
            .attach("bb_middle", &bands.middle)
            .attach("adx", &adx_out.adx)
            .attach("momentum", &momentum(&close, 10))
            .attach("atr", &atr(bars, 10))
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

        if position.in_position() {
            let ret = position.unrealized_return(price);
            if ret <= -STOP_LOSS || ret >= TAKE_PROFIT {
                return Signal::Sell;
            }
            if let Some(hwm) = position.highest_close {
                if price <= hwm * (1.0 - TRAILING_STOP) {
                    return Signal::Sell;
                }
            }

            if let (Some(hist), Some(prev_hist), Some(r)) = (
                current.value("macd_hist"),
                previous.value("macd_hist"),
                current.value("rsi"),
            ) {
                if hist < prev_hist && r > 70.0 {
                    return Signal::Sell;
                }
            }
            if let Some(slow) = current.value("sma_slow") {
                if price < slow {
                    return Signal::Sell;
                }
            }
            return Signal::Hold;
        }

        let Some(vol) = current.value("vol_ratio") else {
            return Signal::Hold;
        };
        //a dried-up tape disqualifies every setup
        if vol < MIN_VOLUME_RATIO {
            return Signal::Hold;
        }

        let mut score = 0;
        if let (Some(fast), Some(mid), Some(slow)) = (
            current.value("sma_fast"),
            current.value("ema_mid"),
            current.value("sma_slow"),
        ) {
            if fast > mid && mid > slow {
                score += 1;
            }
        }
        if let (Some(hist), Some(prev_hist)) =
            (current.value("macd_hist"), previous.value("macd_hist"))
        {
            if hist > 0.0 && hist > prev_hist {
                score += 1;
            }
        }
        if let (Some(r), Some(prev_r), Some(mom)) = (
            current.value("rsi"),
            previous.value("rsi"),
            current.value("momentum"),
        ) {
            if r > prev_r && r < 55.0 && mom > 0.0 {
                score += 1;
            }
        }
        if let (Some(lower), Some(middle), Some(a)) = (
            current.value("bb_lower"),
            current.value("bb_middle"),
            current.value("adx"),
        ) {
            if price <= lower * 1.03 || (a > 20.0 && price > middle) {
                score += 1;
            }
        }

        if score >= ENTRY_SCORE {
            //conviction beyond the threshold sizes the entry up a step at a time
            self.entry_fraction =
                BASE_FRACTION + CONVICTION_STEP * (score - ENTRY_SCORE) as f64;
            return Signal::Buy;
        }

        Signal::Hold
    }

    fn entry_sizing(&self, _current: &EnrichedBar) -> SizePolicy {
        SizePolicy::VolumeCapped {
            fraction: self.entry_fraction,
            volume_cap: 0.1,
        }
    }
}
