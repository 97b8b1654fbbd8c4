//multi-oscillator swing scoring: act when enough signals line up

use crate::data::{Bar, EnrichedBar};
use crate::engine::SizePolicy;
use crate::indicators::{adx, atr, bollinger, closes, macd, rsi, stochastic, volume_ratio};
use crate::strategy::{PositionView, Signal, Strategy};

const STOP_LOSS: f64 = 0.03;
const TAKE_PROFIT: f64 = 0.05;
const TRAILING_STOP: f64 = 0.02;
const ENTRY_SCORE: usize = 3;
const EXIT_SCORE: usize = 3;

pub struct SwingStrategy;

impl SwingStrategy {
    pub fn new() -> Self {
        SwingStrategy
    }
}

impl Default for SwingStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for SwingStrategy {
    fn name(&self) -> &'static str {
        "swing"
    }

    fn warmup_bars(&self) -> usize {
        30
    }

    fn enrich(&self, bars: &[Bar]) -> Vec<EnrichedBar> {
        let close = closes(bars);
        let macd_out = macd(&close, 5, 10, 9);
        let bands = bollinger(&close, 20, 2.0);
        let kdj = stochastic(bars, 9, 3, 3);
        let adx_out = adx(bars, 14);

        let mut series = crate::data::EnrichedSeries::new(bars);
        series
            .attach("macd_hist", &macd_out.histogram)
            .attach("rsi", &rsi(&close, 14))
            .attach("bb_upper", &bands.upper)
            .attach("bb_middle", &bands.middle)
            .attach("k", &kdj.k)
            .attach("d", &kdj.d)
            .attach("vol_ratio", &volume_ratio(bars, 20))
            .attach("adx", &adx_out.adx)
            .attach("plus_di", &adx_out.plus_di)
            .attach("minus_di", &adx_out.minus_di)
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
            let ret = position.unrealized_return(price);
            if ret <= -STOP_LOSS || ret >= TAKE_PROFIT {
                return Signal::Sell;
            }
            if let Some(hwm) = position.highest_close {
                if price <= hwm * (1.0 - TRAILING_STOP) {
                    return Signal::Sell;
                }
            }

            let mut score = 0;
            if let (Some(hist), Some(prev_hist)) =
                (current.value("macd_hist"), previous.value("macd_hist"))
            {
                if hist < prev_hist && hist < 0.0 {
                    score += 1;
                }
            }
            if let Some(r) = current.value("rsi") {
                if r > 70.0 {
                    score += 1;
                }
            }
            if let Some(upper) = current.value("bb_upper") {
                if price >= upper {
                    score += 1;
                }
            }
            if let (Some(k), Some(d), Some(prev_k), Some(prev_d)) = (
                current.value("k"),
                current.value("d"),
                previous.value("k"),
                previous.value("d"),
            ) {
                if prev_k >= prev_d && k < d {
                    score += 1;
                }
            }
            if let Some(vol) = current.value("vol_ratio") {
                if vol < 0.8 {
                    score += 1;
                }
            }
            if let (Some(p), Some(m)) = (current.value("plus_di"), current.value("minus_di")) {
                if m > p {
                    score += 1;
                }
            }

            if score >= EXIT_SCORE {
                return Signal::Sell;
            }
            return Signal::Hold;
        }

        let mut score = 0;
        if let (Some(hist), Some(prev_hist)) =
            (current.value("macd_hist"), previous.value("macd_hist"))
        {
            if hist > 0.0 && hist > prev_hist {
                score += 1;
            }
        }
        if let (Some(r), Some(prev_r)) = (current.value("rsi"), previous.value("rsi")) {
            if r > prev_r && r < 60.0 {
                score += 1;
            }
        }
        if let (Some(middle), Some(prev_middle)) =
            (current.value("bb_middle"), previous.value("bb_middle"))
        {
            if previous.close() <= prev_middle && price > middle {
                score += 1;
            }
        }
        if let (Some(k), Some(d), Some(prev_k), Some(prev_d)) = (
            current.value("k"),
            current.value("d"),
            previous.value("k"),
            previous.value("d"),
        ) {
            if prev_k <= prev_d && k > d {
                score += 1;
            }
        }
        if let Some(vol) = current.value("vol_ratio") {
            if vol > 1.2 {
                score += 1;
            }
        }
        if let (Some(a), Some(p), Some(m)) = (
            current.value("adx"),
            current.value("plus_di"),
            current.value("minus_di"),
        ) {
            if a > 20.0 && p > m {
                score += 1;
            }
        }

        if score >= ENTRY_SCORE {
            return Signal::Buy;
        }

        Signal::Hold
    }

    fn entry_sizing(&self, _current: &EnrichedBar) -> SizePolicy {
        SizePolicy::AtrRisk {
            risk_fraction: 0.02,
            atr_multiple: 2.0,
            cap_fraction: 0.2,
            fallback_atr_ratio: 0.002,
        }
    }
}
