//oscillator family: rsi, stochastic (kdj), roc, momentum, pct_change

use crate::data::Bar;
use crate::indicators::moving_average::sma_of;
use crate::indicators::volatility::{rolling_max, rolling_min};
use crate::indicators::{closes, highs, lows};

//wilder rsi, defined from index = period
//a window with zero average loss has no defined rsi (the divisor vanishes)
pub fn rsi(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() <= period {
        return out;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let change = values[i] - values[i - 1];
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss += -change;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    out[period] = rsi_value(avg_gain, avg_loss);

    for i in (period + 1)..values.len() {
        let change = values[i] - values[i - 1];
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };
        avg_gain = (avg_gain * (period as f64 - 1.0) + gain) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + loss) / period as f64;
        out[i] = rsi_value(avg_gain, avg_loss);
    }

    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        return None;
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

#[derive(Debug, Clone)]
pub struct StochasticSeries {
    pub k: Vec<Option<f64>>,
    pub d: Vec<Option<f64>>,
    pub j: Vec<Option<f64>>,
}

//stochastic oscillator: rsv over rsv_period, k = sma of rsv, d = sma of k,
//j = 3k - 2d
//a flat window (highest high == lowest low) has no defined rsv
pub fn stochastic(
    bars: &[Bar],
    rsv_period: usize,
    k_smooth: usize,
    d_smooth: usize,
) -> StochasticSeries {
    let close = closes(bars);
    let hh = rolling_max(&highs(bars), rsv_period);
    let ll = rolling_min(&lows(bars), rsv_period);

    let rsv: Vec<Option<f64>> = (0..bars.len())
        .map(|i| match (hh[i], ll[i]) {
            (Some(h), Some(l)) if h > l => Some((close[i] - l) / (h - l) * 100.0),
            _ => None,
        })
        .collect();

    let k = sma_of(&rsv, k_smooth);
    let d = sma_of(&k, d_smooth);
    let j: Vec<Option<f64>> = k
        .iter()
        .zip(&d)
        .map(|(k, d)| match (k, d) {
            (Some(k), Some(d)) => Some(3.0 * k - 2.0 * d),
            _ => None,
        })
        .collect();

    StochasticSeries { k, d, j }
}

//rate of change in percent over period bars
pub fn roc(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }

    for i in period..values.len() {
        let base = values[i - period];
        if base != 0.0 {
            out[i] = Some((values[i] - base) / base * 100.0);
        }
    }

    out
}

//raw price difference over period bars
pub fn momentum(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }

    for i in period..values.len() {
        out[i] = Some(values[i] - values[i - period]);
    }

    out
}

//fractional change over period bars
pub fn pct_change(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }

    for i in period..values.len() {
        let base = values[i - period];
        if base != 0.0 {
            out[i] = Some(values[i] / base - 1.0);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn bar(day: u32, high: f64, low: f64, close: f64) -> Bar {
        Bar::new_unchecked(
            NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            close,
            high,
            low,
            close,
            1000.0,
            None,
        )
    }

    #[test]
    fn rsi_all_gains_is_undefined() {
        //monotone rise never loses, so the divisor is zero
        let values: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let out = rsi(&values, 14);
        assert!(out.iter().all(Option::is_none));
    }

    #[test]
    fn rsi_alternating_series_sits_at_fifty() {
        //equal gains and losses balance out
        let values: Vec<f64> = (0..30)
            .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
            .collect();
        let out = rsi(&values, 14);

        let last = out.last().unwrap().unwrap();
        assert!(last > 45.0 && last < 55.0);
    }

    #[test]
    fn rsi_warms_up_for_period_bars() {
        let values: Vec<f64> = (0..20)
            .map(|i| if i % 2 == 0 { 100.0 } else { 99.0 })
            .collect();
        let out = rsi(&values, 14);

        assert!(out[..14].iter().all(Option::is_none));
        assert!(out[14].is_some());
    }

    #[test]
    fn stochastic_close_at_high_pins_k_at_hundred() {
        let bars: Vec<Bar> = (1..=15)
            .map(|i| bar(i, 100.0 + i as f64, 90.0 + i as f64, 100.0 + i as f64))
            .collect();
        let out = stochastic(&bars, 9, 3, 3);

        let k = out.k.last().unwrap().unwrap();
        assert_relative_eq!(k, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn stochastic_flat_window_is_undefined() {
        let bars: Vec<Bar> = (1..=12).map(|i| bar(i, 100.0, 100.0, 100.0)).collect();
        let out = stochastic(&bars, 9, 3, 3);

        assert!(out.k.iter().all(Option::is_none));
        assert!(out.j.iter().all(Option::is_none));
    }

    #[test]
    fn roc_and_pct_change_agree_up_to_scale() {
        let values = vec![100.0, 102.0, 105.0, 103.0, 110.0];
        let r = roc(&values, 2);
        let p = pct_change(&values, 2);

        assert_eq!(r[1], None);
        assert_relative_eq!(r[2].unwrap(), 5.0);
        assert_relative_eq!(p[2].unwrap(), 0.05);
        assert_relative_eq!(r[4].unwrap(), p[4].unwrap() * 100.0);
    }

    #[test]
    fn momentum_is_raw_difference() {
        let values = vec![10.0, 12.0, 9.0, 15.0];
        let out = momentum(&values, 3);

        assert_eq!(out[2], None);
        assert_relative_eq!(out[3].unwrap(), 5.0);
    }
}
