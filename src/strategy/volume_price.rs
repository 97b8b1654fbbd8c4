//volume surge confirmation of a price advance, with obv trend agreement

use crate::data::{Bar, EnrichedBar};
use crate::engine::SizePolicy;
use crate::indicators::{adx, closes, ema, momentum, obv, ratio, rsi, volumes};
use crate::indicators::moving_average::sma_of;
use crate::strategy::{PositionView, Signal, Strategy};

const STOP_LOSS: f64 = 0.02;
const TAKE_PROFIT: f64 = 0.04;

pub struct VolumePriceStrategy;

impl VolumePriceStrategy {
    pub fn new() -> Self {
        VolumePriceStrategy
    }
}

impl Default for VolumePriceStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for VolumePriceStrategy {
    fn name(&self) -> &'static str {
        "volume-price"
    }

    fn warmup_bars(&self) -> usize {
        30
    }

    fn enrich(&self, bars: &[Bar]) -> Vec<EnrichedBar> {
        let close = closes(bars);
        let vols = volumes(bars);
        let adx_out = adx(bars, 14);

        let obv_series = obv(bars);
        let obv_trend = sma_of(&obv_series, 20);
        //obv relative to its own average, positive when accumulating
        let obv_gap: Vec<Option<f64>> = obv_series
            .iter()
            .zip(&obv_trend)
            .map(|(o, t)| match (o, t) {
                (Some(o), Some(t)) => Some(o - t),
                _ => None,
            })
            .collect();

        let mut series = crate::data::EnrichedSeries::new(bars);
        series
            .attach("vol_ratio", &ratio(&vols, &ema(&vols, 10)))
            .attach("ema_fast", &ema(&close, 5))
            .attach("ema_slow", &ema(&close, 20))
            .attach("obv_gap", &obv_gap)
            .attach("adx", &adx_out.adx)
            .attach("rsi", &rsi(&close, 14))
            .attach("momentum", &momentum(&close, 10));
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

            //distribution: obv falls under its average while price holds up
            if let (Some(gap), Some(prev_gap)) =
                (current.value("obv_gap"), previous.value("obv_gap"))
            {
                if gap < 0.0 && prev_gap >= 0.0 {
                    return Signal::Sell;
                }
            }
            if let (Some(fast), Some(slow)) =
                (current.value("ema_fast"), current.value("ema_slow"))
            {
                if fast < slow {
                    return Signal::Sell;
                }
            }
            return Signal::Hold;
        }

        let inputs = (
            current.value("vol_ratio"),
            current.value("ema_fast"),
            current.value("ema_slow"),
            current.value("obv_gap"),
            current.value("adx"),
            current.value("rsi"),
            current.value("momentum"),
        );
        let (Some(vol), Some(fast), Some(slow), Some(gap), Some(a), Some(r), Some(mom)) = inputs
        else {
            return Signal::Hold;
        };

        if vol > 1.3 && fast > slow && gap > 0.0 && a > 20.0 && r > 40.0 && r < 70.0 && mom > 0.0 {
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
