//volume family: on-balance volume and volume ratios

use crate::data::Bar;
use crate::indicators::moving_average::sma;
use crate::indicators::{ratio, volumes};

//on-balance volume: running sum of volume signed by the close-to-close move
pub fn obv(bars: &[Bar]) -> Vec<Option<f64>> {
    let mut out = vec![None; bars.len()];
    if bars.is_empty() {
        return out;
    }

    let mut running = bars[0].volume;
    out[0] = Some(running);

    for i in 1..bars.len() {
        if bars[i].close > bars[i - 1].close {
            running += bars[i].volume;
        } else if bars[i].close < bars[i - 1].close {
            running -= bars[i].volume;
        }
        out[i] = Some(running);
    }

    out
}

//today's volume relative to its rolling average
//undefined while the average warms up or when the average is zero
pub fn volume_ratio(bars: &[Bar], period: usize) -> Vec<Option<f64>> {
    let vols = volumes(bars);
    let avg = sma(&vols, period);
    ratio(&vols, &avg)
}
