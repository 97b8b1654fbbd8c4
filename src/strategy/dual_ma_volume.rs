//fast/slow ema crossover confirmed by volume, trend strength and momentum

use crate::data::{Bar, EnrichedBar};
use crate::engine::SizePolicy;
use crate::indicators::{adx, closes, ema, macd, roc, rsi, volume_ratio};
use crate::strategy::{PositionView, Signal, Strategy};

const STOP_LOSS: f64 = 0.02;
const TAKE_PROFIT: f64 = 0.03;

pub struct DualMaVolumeStrategy;

impl DualMaVolumeStrategy {
    pub fn new() -> Self {
        DualMaVolumeStrategy
    }
}

impl Default for DualMaVolumeStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for DualMaVolumeStrategy {
    fn name(&self) -> &'static str {
        "dual-ma-volume"
    }

    fn warmup_bars(&self) -> usize {
        35
    }

    fn enrich(&self, bars: &[Bar]) -> Vec<EnrichedBar> {
        let close = closes(bars);
        let macd_out = macd(&close, 12, 26, 9);
        let adx_out = adx(bars, 14);

        let mut series = crate::data::EnrichedSeries::new(bars);
        series
            .attach("ema_fast", &ema(&close, 3))
            .attach("ema_slow", &ema(&close, 10))
            .attach("vol_ratio", &volume_ratio(bars, 7))
            .attach("adx", &adx_out.adx)
            .attach("roc", &roc(&close, 10))
            .attach("rsi", &rsi(&close, 14))
            .attach("macd_hist", &macd_out.histogram);
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
            current.value("ema_fast"),
            current.value("ema_slow"),
            previous.value("ema_fast"),
            previous.value("ema_slow"),
            current.value("vol_ratio"),
            current.value("adx"),
            current.value("roc"),
            current.value("rsi"),
            current.value("macd_hist"),
            previous.value("macd_hist"),
        );
        if let (
            Some(fast),
            Some(slow),
            Some(prev_fast),
            Some(prev_slow),
            Some(vol),
            Some(a),
            Some(rate),
            Some(r),
            Some(hist),
            Some(prev_hist),
        ) = inputs
        {
            let crossed_up = prev_fast <= prev_slow && fast > slow;
            let crossed_down = prev_fast >= prev_slow && fast < slow;
            if crossed_up
                && vol > 1.1
                && a > 15.0
                && rate > -1.0
                && r < 70.0
                && hist > prev_hist
            {
                signal = Signal::Buy;
            } else if crossed_down && vol > 1.1 && a > 15.0 && r > 30.0 {
                signal = Signal::Sell;
            }
        }

        //hard stop and target outrank the crossover
        if position.in_position() {
            let ret = position.unrealized_return(price);
            if ret < -STOP_LOSS || ret > TAKE_PROFIT {
                signal = Signal::Sell;
            }
        }

        signal
    }

    fn entry_sizing(&self, _current: &EnrichedBar) -> SizePolicy {
        SizePolicy::VolumeCapped {
            fraction: 1.0,
            volume_cap: 0.1,
        }
    }
}
