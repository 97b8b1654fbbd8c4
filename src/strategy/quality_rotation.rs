//hold only while a composite quality score stays high: steady volatility,
//balanced momentum, durable uptrend

use crate::data::{Bar, EnrichedBar};
use crate::engine::SizePolicy;
use crate::indicators::{adx, closes, pct_change, rolling_std_of, rsi, sma};
use crate::strategy::{PositionView, Signal, Strategy};

const QUALITY_ENTRY: f64 = 0.7;
const QUALITY_EXIT: f64 = 0.5;
const MIN_LONG_MOMENTUM: f64 = 0.02;
const STOP_LOSS: f64 = 0.03;
const TAKE_PROFIT: f64 = 0.05;

pub struct QualityRotationStrategy;

impl QualityRotationStrategy {
    pub fn new() -> Self {
        QualityRotationStrategy
    }
}

impl Default for QualityRotationStrategy {
    fn default() -> Self {
        Self::new()
    }
}

//highest defined value in each trailing window, none until the window is full
fn rolling_max_of(series: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; series.len()];
    if period == 0 || series.len() < period {
        return out;
    }

    for i in (period - 1)..series.len() {
        let window = &series[i + 1 - period..=i];
        if window.iter().all(Option::is_some) {
            out[i] = window
                .iter()
                .flatten()
                .copied()
                .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))));
        }
    }

    out
}

impl Strategy for QualityRotationStrategy {
    fn name(&self) -> &'static str {
        "quality-rotation"
    }

    fn warmup_bars(&self) -> usize {
        //volatility peak needs 20 bars of a 20-bar return std
        60
    }

    fn enrich(&self, bars: &[Bar]) -> Vec<EnrichedBar> {
        let close = closes(bars);
        let returns = pct_change(&close, 1);
        let volatility = rolling_std_of(&returns, 20);
        let vol_peak = rolling_max_of(&volatility, 20);
        let rsi_series = rsi(&close, 14);
        let long_momentum = pct_change(&close, 60);
        let adx_out = adx(bars, 14);

        //composite quality in [0, 1]: calm volatility, balanced rsi,
        //positive long-horizon drift
        let quality: Vec<Option<f64>> = (0..bars.len())
            .map(|i| {
                let (v, peak, r, m) = (
                    volatility[i]?,
                    vol_peak[i]?,
                    rsi_series[i]?,
                    long_momentum[i]?,
                );
                let stability = if peak > 0.0 {
                    (1.0 - v / peak).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                let balance = 1.0 - (r - 50.0).abs() / 50.0;
                let drift = (m * 5.0).clamp(0.0, 1.0);
                Some((stability + balance + drift) / 3.0)
            })
            .collect();

        let mut series = crate::data::EnrichedSeries::new(bars);
        series
            .attach("quality", &quality)
            .attach("long_momentum", &long_momentum)
            .attach("sma20", &sma(&close, 20))
            .attach("adx", &adx_out.adx);
        series.into_bars()
    }

    fn generate_signal(
        &mut self,
        current: &EnrichedBar,
        _previous: &EnrichedBar,
        position: &PositionView,
    ) -> Signal {
        let price = current.close();

        if position.in_position() {
            let ret = position.unrealized_return(price);
            if ret <= -STOP_LOSS || ret >= TAKE_PROFIT {
                return Signal::Sell;
            }

            if let (Some(q), Some(ma)) = (current.value("quality"), current.value("sma20")) {
                if q < QUALITY_EXIT || price < ma {
                    return Signal::Sell;
                }
            }
            return Signal::Hold;
        }

        let inputs = (
            current.value("quality"),
            current.value("long_momentum"),
            current.value("sma20"),
            current.value("adx"),
        );
        let (Some(q), Some(m), Some(ma), Some(a)) = inputs else {
            return Signal::Hold;
        };

        if q > QUALITY_ENTRY && m > MIN_LONG_MOMENTUM && a > 25.0 && price > ma {
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
