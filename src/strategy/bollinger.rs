//bollinger band mean-touch entries with momentum and band-width filters

use crate::data::{Bar, EnrichedBar};
use crate::indicators::{adx, bollinger, closes, macd, rsi, volume_ratio};
use crate::strategy::{PositionView, Signal, Strategy};

const BAND_PERIOD: usize = 10;
const BAND_WIDTH_FACTOR: f64 = 1.5;
const MIN_BAND_WIDTH: f64 = 0.025;
const STOP_LOSS: f64 = 0.03;
const TAKE_PROFIT: f64 = 0.05;

pub struct BollingerStrategy;

impl BollingerStrategy {
    pub fn new() -> Self {
        BollingerStrategy
    }
}

impl Default for BollingerStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for BollingerStrategy {
    fn name(&self) -> &'static str {
        "bollinger"
    }

    fn warmup_bars(&self) -> usize {
        35
    }

    fn enrich(&self, bars: &[Bar]) -> Vec<EnrichedBar> {
        let close = closes(bars);
        let bands = bollinger(&close, BAND_PERIOD, BAND_WIDTH_FACTOR);
        let macd_out = macd(&close, 12, 26, 9);
        let adx_out = adx(bars, 14);

        //relative band width, defined where the bands are
        let width: Vec<Option<f64>> = bands
            .upper
            .iter()
            .zip(&bands.lower)
            .zip(&bands.middle)
            .map(|((u, l), m)| match (u, l, m) {
                (Some(u), Some(l), Some(m)) if *m != 0.0 => Some((u - l) / m),
                _ => None,
            })
            .collect();

        let mut series = crate::data::EnrichedSeries::new(bars);
        series
            .attach("bb_upper", &bands.upper)
            .attach("bb_lower", &bands.lower)
            .attach("bb_width", &width)
            .attach("rsi", &rsi(&close, 14))
            .attach("macd_hist", &macd_out.histogram)
            .attach("adx", &adx_out.adx)
            .attach("vol_ratio", &volume_ratio(bars, 10));
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

            let inputs = (
                current.value("bb_upper"),
                current.value("rsi"),
                current.value("macd_hist"),
                previous.value("macd_hist"),
                current.value("bb_width"),
                previous.value("bb_width"),
            );
            if let (Some(upper), Some(r), Some(hist), Some(prev_hist), Some(w), Some(prev_w)) =
                inputs
            {
                let at_upper = price >= upper * 0.98;
                if at_upper && r > 60.0 && hist < prev_hist && w < prev_w {
                    return Signal::Sell;
                }
            }
            return Signal::Hold;
        }

        let inputs = (
            current.value("bb_lower"),
            current.value("bb_width"),
            current.value("rsi"),
            current.value("macd_hist"),
            previous.value("macd_hist"),
            current.value("adx"),
            current.value("vol_ratio"),
        );
        let (Some(lower), Some(width), Some(r), Some(hist), Some(prev_hist), Some(a), Some(vol)) =
            inputs
        else {
            return Signal::Hold;
        };

        let at_lower = price <= lower * 1.02;
        //a squeezed band carries no reversion edge
        if at_lower
            && width > MIN_BAND_WIDTH
            && r < 40.0
            && hist > prev_hist
            && a > 15.0
            && vol > 1.1
        {
            return Signal::Buy;
        }

        Signal::Hold
    }
}
