pub mod moving_average;
pub mod oscillator;
pub mod statistic;
pub mod volatility;
pub mod volume;

pub use moving_average::{ema, macd, sma, sma_of, MacdSeries};
pub use oscillator::{momentum, pct_change, roc, rsi, stochastic, StochasticSeries};
pub use statistic::{percentile_rank, rolling_autocorr};
pub use volatility::{
    adx, atr, bollinger, rolling_max, rolling_min, rolling_std, rolling_std_of, AdxSeries,
    BollingerSeries,
};
pub use volume::{obv, volume_ratio};

use crate::data::Bar;

//column extraction helpers shared by the strategies
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

pub fn highs(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.high).collect()
}

pub fn lows(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.low).collect()
}

pub fn volumes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.volume).collect()
}

//elementwise a / b, undefined where b is undefined or zero
pub fn ratio(a: &[f64], b: &[Option<f64>]) -> Vec<Option<f64>> {
    a.iter()
        .zip(b)
        .map(|(x, y)| match y {
            Some(d) if *d != 0.0 => Some(x / d),
            _ => None,
        })
        .collect()
}
