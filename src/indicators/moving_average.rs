//moving-average family: sma, ema, macd
//every function returns a series aligned with its input, undefined (none)
//while the look-back window is still filling

use statrs::statistics::Statistics;

//simple moving average, defined from index period-1
pub fn sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        out[i] = Some(window.mean());
    }

    out
}

//simple moving average over an already-partial series
//a slot is defined only when every input in its window is defined
pub fn sma_of(series: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; series.len()];
    if period == 0 || series.len() < period {
        return out;
    }

    for i in (period - 1)..series.len() {
        let window = &series[i + 1 - period..=i];
        if window.iter().all(Option::is_some) {
            let sum: f64 = window.iter().flatten().sum();
            out[i] = Some(sum / period as f64);
        }
    }

    out
}

//exponential moving average seeded with the sma of the first window,
//then alpha = 2 / (period + 1)
pub fn ema(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let seed = values[..period].mean();
    out[period - 1] = Some(seed);

    let mut prev = seed;
    for i in period..values.len() {
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        out[i] = Some(prev);
    }

    out
}

//ema over an already-partial series, restarting the seed after each gap
fn ema_of(series: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; series.len()];
    if period == 0 {
        return out;
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut prev: Option<f64> = None;
    let mut seed_sum = 0.0;
    let mut seed_count = 0usize;

    for (i, slot) in series.iter().enumerate() {
        match slot {
            Some(value) => match prev {
                Some(p) => {
                    let next = alpha * value + (1.0 - alpha) * p;
                    out[i] = Some(next);
                    prev = Some(next);
                }
                None => {
                    seed_sum += value;
                    seed_count += 1;
                    if seed_count == period {
                        let seed = seed_sum / period as f64;
                        out[i] = Some(seed);
                        prev = Some(seed);
                    }
                }
            },
            None => {
                prev = None;
                seed_sum = 0.0;
                seed_count = 0;
            }
        }
    }

    out
}

#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub line: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

//macd line = ema(fast) - ema(slow), signal = ema of the line, histogram = line - signal
pub fn macd(values: &[f64], fast: usize, slow: usize, signal_period: usize) -> MacdSeries {
    let fast_ema = ema(values, fast);
    let slow_ema = ema(values, slow);

    let line: Vec<Option<f64>> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    let signal = ema_of(&line, signal_period);

    let histogram: Vec<Option<f64>> = line
        .iter()
        .zip(&signal)
        .map(|(l, s)| match (l, s) {
            (Some(l), Some(s)) => Some(l - s),
            _ => None,
        })
        .collect();

    MacdSeries {
        line,
        signal,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sma_warms_up_then_tracks_window() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let out = sma(&values, 3);

        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert_relative_eq!(out[2].unwrap(), 2.0);
        assert_relative_eq!(out[3].unwrap(), 3.0);
        assert_relative_eq!(out[4].unwrap(), 4.0);
    }

    #[test]
    fn sma_shorter_than_period_is_all_undefined() {
        let out = sma(&[1.0, 2.0], 5);
        assert!(out.iter().all(Option::is_none));
    }

    #[test]
    fn sma_of_requires_full_window() {
        let series = vec![None, Some(2.0), Some(4.0), Some(6.0)];
        let out = sma_of(&series, 2);

        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert_relative_eq!(out[2].unwrap(), 3.0);
        assert_relative_eq!(out[3].unwrap(), 5.0);
    }

    #[test]
    fn ema_seeds_with_sma() {
        let values = vec![2.0, 4.0, 6.0, 8.0];
        let out = ema(&values, 3);

        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        //seed = mean(2, 4, 6) = 4, alpha = 0.5
        assert_relative_eq!(out[2].unwrap(), 4.0);
        assert_relative_eq!(out[3].unwrap(), 6.0);
    }

    #[test]
    fn ema_of_constant_series_is_flat() {
        let values = vec![5.0; 10];
        let out = ema(&values, 4);
        for slot in &out[3..] {
            assert_relative_eq!(slot.unwrap(), 5.0);
        }
    }

    #[test]
    fn macd_of_constant_series_is_zero() {
        let values = vec![10.0; 40];
        let out = macd(&values, 12, 26, 9);

        assert_eq!(out.line[24], None);
        assert_relative_eq!(out.line[25].unwrap(), 0.0);
        //signal needs its own window of defined line values
        assert_eq!(out.signal[32], None);
        assert_relative_eq!(out.signal[33].unwrap(), 0.0);
        assert_relative_eq!(out.histogram[33].unwrap(), 0.0);
    }

    #[test]
    fn macd_line_positive_in_uptrend() {
        let values: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let out = macd(&values, 12, 26, 9);

        let last = out.line.last().unwrap().unwrap();
        assert!(last > 0.0);
    }
}
