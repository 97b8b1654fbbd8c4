//new-high breakouts with volume, trend and sanity filters on volatility

use crate::data::{Bar, EnrichedBar};
use crate::engine::SizePolicy;
use crate::indicators::{
    atr, closes, ema, highs, macd, pct_change, rolling_max, rolling_std_of, rsi, volume_ratio,
};
use crate::strategy::{PositionView, Signal, Strategy};

const PRICE_PERIOD: usize = 10;
const BREAKOUT_THRESHOLD: f64 = 1.008;
const VOLUME_CONFIRM: f64 = 1.2;
const MIN_VOLATILITY: f64 = 0.005;
const MAX_VOLATILITY: f64 = 0.05;
const MAX_ATR_RATIO: f64 = 0.05;
const STOP_LOSS: f64 = 0.02;
const TAKE_PROFIT: f64 = 0.03;
const TRAILING_STOP: f64 = 0.015;

pub struct BreakoutStrategy;

impl BreakoutStrategy {
    pub fn new() -> Self {
        BreakoutStrategy
    }
}

impl Default for BreakoutStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for BreakoutStrategy {
    fn name(&self) -> &'static str {
        "breakout"
    }

    fn warmup_bars(&self) -> usize {
        25
    }

    fn enrich(&self, bars: &[Bar]) -> Vec<EnrichedBar> {
        let close = closes(bars);
        let returns = pct_change(&close, 1);
        let macd_out = macd(&close, 8, 17, 9);

        let mut series = crate::data::EnrichedSeries::new(bars);
        series
            .attach("high_band", &rolling_max(&highs(bars), PRICE_PERIOD))
            .attach("vol_ratio", &volume_ratio(bars, PRICE_PERIOD))
            .attach("ema_fast", &ema(&close, 3))
            .attach("ema_slow", &ema(&close, 10))
            .attach("rsi", &rsi(&close, 8))
            .attach("macd_hist", &macd_out.histogram)
            .attach("volatility", &rolling_std_of(&returns, 10))
            .attach("atr", &atr(bars, 10))
            .attach("momentum", &pct_change(&close, 3));
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
            //a failed breakout falls back through the short trend
            if let Some(slow) = current.value("ema_slow") {
                if price < slow {
                    return Signal::Sell;
                }
            }
            return Signal::Hold;
        }

        let inputs = (
            previous.value("high_band"),
            current.value("vol_ratio"),
            current.value("ema_fast"),
            current.value("ema_slow"),
            current.value("rsi"),
            current.value("macd_hist"),
            current.value("volatility"),
            current.value("atr"),
            current.value("momentum"),
        );
        let (
            Some(band),
            Some(vol),
            Some(fast),
            Some(slow),
            Some(r),
            Some(hist),
            Some(sigma),
            Some(a),
            Some(mom),
        ) = inputs
        else {
            return Signal::Hold;
        };

        //the band is yesterday's, so today's bar cannot confirm itself
        let broke_out = price > band * BREAKOUT_THRESHOLD;
        let sane_volatility = sigma >= MIN_VOLATILITY && sigma <= MAX_VOLATILITY;
        let tight_range = a / price < MAX_ATR_RATIO;

        if broke_out
            && vol > VOLUME_CONFIRM
            && fast > slow
            && r < 70.0
            && hist > 0.0
            && sane_volatility
            && tight_range
            && mom > 0.0
        {
            return Signal::Buy;
        }

        Signal::Hold
    }

    fn entry_sizing(&self, _current: &EnrichedBar) -> SizePolicy {
        SizePolicy::VolumeCapped {
            fraction: 0.3,
            volume_cap: 0.1,
        }
    }
}
