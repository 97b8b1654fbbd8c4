//volatility family: rolling standard deviation, bollinger bands,
//rolling extremes, atr, adx/di

use crate::data::Bar;
use crate::indicators::moving_average::sma;
use statrs::statistics::Statistics;

//rolling population standard deviation, defined from index period-1
pub fn rolling_std(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        out[i] = Some(window.population_std_dev());
    }

    out
}

//rolling population standard deviation over an already-partial series
pub fn rolling_std_of(series: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; series.len()];
    if period == 0 || series.len() < period {
        return out;
    }

    for i in (period - 1)..series.len() {
        let window = &series[i + 1 - period..=i];
        if window.iter().all(Option::is_some) {
            let defined: Vec<f64> = window.iter().flatten().copied().collect();
            out[i] = Some(defined.population_std_dev());
        }
    }

    out
}

#[derive(Debug, Clone)]
pub struct BollingerSeries {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

//bollinger bands: sma middle, bands at k population standard deviations
pub fn bollinger(values: &[f64], period: usize, k: f64) -> BollingerSeries {
    let middle = sma(values, period);
    let std = rolling_std(values, period);

    let upper: Vec<Option<f64>> = middle
        .iter()
        .zip(&std)
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => Some(m + k * s),
            _ => None,
        })
        .collect();
    let lower: Vec<Option<f64>> = middle
        .iter()
        .zip(&std)
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => Some(m - k * s),
            _ => None,
        })
        .collect();

    BollingerSeries {
        upper,
        middle,
        lower,
    }
}

//rolling maximum, defined from index period-1
pub fn rolling_max(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        out[i] = window.iter().copied().fold(None, |acc: Option<f64>, v| {
            Some(acc.map_or(v, |a| a.max(v)))
        });
    }

    out
}

//rolling minimum, defined from index period-1
pub fn rolling_min(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        out[i] = window.iter().copied().fold(None, |acc: Option<f64>, v| {
            Some(acc.map_or(v, |a| a.min(v)))
        });
    }

    out
}

//true range: widest of today's range and the gaps to yesterday's close
fn true_ranges(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.range()
            } else {
                let prev_close = bars[i - 1].close;
                bar.range()
                    .max((bar.high - prev_close).abs())
                    .max((bar.low - prev_close).abs())
            }
        })
        .collect()
}

//average true range with wilder smoothing, defined from index = period
pub fn atr(bars: &[Bar], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; bars.len()];
    if period == 0 || bars.len() <= period {
        return out;
    }

    let tr = true_ranges(bars);
    let seed: f64 = tr[1..=period].iter().sum::<f64>() / period as f64;
    out[period] = Some(seed);

    let mut prev = seed;
    for i in (period + 1)..bars.len() {
        prev = (prev * (period as f64 - 1.0) + tr[i]) / period as f64;
        out[i] = Some(prev);
    }

    out
}

#[derive(Debug, Clone)]
pub struct AdxSeries {
    pub adx: Vec<Option<f64>>,
    pub plus_di: Vec<Option<f64>>,
    pub minus_di: Vec<Option<f64>>,
}

//directional movement system with wilder smoothing
//di is undefined when the smoothed true range is zero, dx when both di vanish,
//and adx needs a further period of defined dx values before it seeds
pub fn adx(bars: &[Bar], period: usize) -> AdxSeries {
    let n = bars.len();
    let mut plus_di = vec![None; n];
    let mut minus_di = vec![None; n];
    let mut adx_out = vec![None; n];
    if period == 0 || n <= period {
        return AdxSeries {
            adx: adx_out,
            plus_di,
            minus_di,
        };
    }

    let tr = true_ranges(bars);
    let mut plus_dm = vec![0.0; n];
    let mut minus_dm = vec![0.0; n];
    for i in 1..n {
        let up = bars[i].high - bars[i - 1].high;
        let down = bars[i - 1].low - bars[i].low;
        if up > down && up > 0.0 {
            plus_dm[i] = up;
        }
        if down > up && down > 0.0 {
            minus_dm[i] = down;
        }
    }

    //wilder running sums seeded over the first period of moves
    let mut smoothed_tr: f64 = tr[1..=period].iter().sum();
    let mut smoothed_plus: f64 = plus_dm[1..=period].iter().sum();
    let mut smoothed_minus: f64 = minus_dm[1..=period].iter().sum();

    let mut dx_sum = 0.0;
    let mut dx_count = 0usize;
    let mut adx_prev: Option<f64> = None;

    for i in period..n {
        if i > period {
            smoothed_tr = smoothed_tr - smoothed_tr / period as f64 + tr[i];
            smoothed_plus = smoothed_plus - smoothed_plus / period as f64 + plus_dm[i];
            smoothed_minus = smoothed_minus - smoothed_minus / period as f64 + minus_dm[i];
        }

        let dx = if smoothed_tr == 0.0 {
            None
        } else {
            let pdi = 100.0 * smoothed_plus / smoothed_tr;
            let mdi = 100.0 * smoothed_minus / smoothed_tr;
            plus_di[i] = Some(pdi);
            minus_di[i] = Some(mdi);
            if pdi + mdi == 0.0 {
                None
            } else {
                Some(100.0 * (pdi - mdi).abs() / (pdi + mdi))
            }
        };

        if let Some(dx) = dx {
            match adx_prev {
                Some(prev) => {
                    let next = (prev * (period as f64 - 1.0) + dx) / period as f64;
                    adx_out[i] = Some(next);
                    adx_prev = Some(next);
                }
                None => {
                    dx_sum += dx;
                    dx_count += 1;
                    if dx_count == period {
                        let seed = dx_sum / period as f64;
                        adx_out[i] = Some(seed);
                        adx_prev = Some(seed);
                    }
                }
            }
        }
    }

    AdxSeries {
        adx: adx_out,
        plus_di,
        minus_di,
    }
}
