//rolling statistics used by the mean-reversion style strategies

use statrs::statistics::Statistics;

//lag-1 autocorrelation within a rolling window, defined from index period-1
//a window without variance has no defined correlation
pub fn rolling_autocorr(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period < 3 || values.len() < period {
        return out;
    }

    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        let a = &window[..period - 1];
        let b = &window[1..];
        out[i] = pearson(a, b);
    }

    out
}

fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    let mean_a = a.mean();
    let mean_b = b.mean();

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a == 0.0 || var_b == 0.0 {
        return None;
    }
    Some(cov / (var_a * var_b).sqrt())
}

//rank of the latest value within its rolling window, as a fraction in [0, 1]
pub fn percentile_rank(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        let current = values[i];
        let below = window.iter().filter(|v| **v <= current).count();
        out[i] = Some(below as f64 / period as f64);
    }

    out
}
