//kdj oscillator crosses filtered by trend, volume, adx and macd momentum

use crate::data::{Bar, EnrichedBar};
use crate::indicators::{adx, closes, ema, macd, stochastic, volume_ratio};
use crate::strategy::{PositionView, Signal, Strategy};

const STOP_LOSS: f64 = 0.015;
const TAKE_PROFIT: f64 = 0.025;

pub struct KdjStrategy;

impl KdjStrategy {
    pub fn new() -> Self {
        KdjStrategy
    }
}

impl Default for KdjStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for KdjStrategy {
    fn name(&self) -> &'static str {
        "kdj"
    }

    fn warmup_bars(&self) -> usize {
        //macd(12, 26, 9) signal line is the slowest input
        35
    }

    fn enrich(&self, bars: &[Bar]) -> Vec<EnrichedBar> {
        let close = closes(bars);
        let kdj = stochastic(bars, 5, 2, 2);
        let adx_out = adx(bars, 10);
        let macd_out = macd(&close, 12, 26, 9);

        let mut series = crate::data::EnrichedSeries::new(bars);
        series
            .attach("k", &kdj.k)
            .attach("d", &kdj.d)
            .attach("j", &kdj.j)
            .attach("vol_ratio", &volume_ratio(bars, 5))
            .attach("trend_ma", &ema(&close, 10))
            .attach("adx", &adx_out.adx)
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
            current.value("k"),
            current.value("d"),
            current.value("j"),
            previous.value("k"),
            previous.value("d"),
            previous.value("j"),
            current.value("trend_ma"),
            current.value("vol_ratio"),
            current.value("adx"),
            current.value("macd_hist"),
            previous.value("macd_hist"),
        );
        if let (
            Some(k),
            Some(d),
            Some(j),
            Some(prev_k),
            Some(prev_d),
            Some(prev_j),
            Some(trend),
            Some(vol),
            Some(a),
            Some(hist),
            Some(prev_hist),
        ) = inputs
        {
            let k_cross_buy = prev_k < prev_d && k > d;
            let j_cross_buy = prev_j < prev_k && j > k && j < 20.0;
            if (k_cross_buy || j_cross_buy)
                && k < 40.0
                && price > trend * 0.98
                && vol > 1.1
                && a > 15.0
                && hist > prev_hist
            {
                signal = Signal::Buy;
            }

            let k_cross_sell = prev_k > prev_d && k < d;
            let j_cross_sell = prev_j > prev_k && j < k && j > 80.0;
            if (k_cross_sell || j_cross_sell)
                && k > 60.0
                && price < trend
                && vol > 1.1
                && hist < prev_hist
            {
                signal = Signal::Sell;
            }
        }

        //risk override outranks the oscillator signal
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
