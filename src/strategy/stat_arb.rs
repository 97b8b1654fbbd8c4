//single-asset statistical reversion on the z-score of price against its mean

use crate::data::{Bar, EnrichedBar};
use crate::engine::SizePolicy;
use crate::indicators::moving_average::sma_of;
use crate::indicators::{
    closes, pct_change, percentile_rank, rolling_autocorr, rolling_std, rolling_std_of, sma,
};
use crate::strategy::{PositionView, Signal, Strategy};

const ENTRY_ZSCORE: f64 = -2.0;
const EXIT_ZSCORE: f64 = 2.0;
const STOP_LOSS: f64 = 0.03;
const TAKE_PROFIT: f64 = 0.05;

pub struct StatArbStrategy;

impl StatArbStrategy {
    pub fn new() -> Self {
        StatArbStrategy
    }
}

impl Default for StatArbStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for StatArbStrategy {
    fn name(&self) -> &'static str {
        "stat-arb"
    }

    fn warmup_bars(&self) -> usize {
        //the volatility baseline is a 60-bar mean of a 20-bar return std
        80
    }

    fn enrich(&self, bars: &[Bar]) -> Vec<EnrichedBar> {
        let close = closes(bars);
        let mean = sma(&close, 20);
        let std = rolling_std(&close, 20);

        let zscore: Vec<Option<f64>> = close
            .iter()
            .zip(mean.iter().zip(&std))
            .map(|(c, (m, s))| match (m, s) {
                (Some(m), Some(s)) if *s > 0.0 => Some((c - m) / s),
                _ => None,
            })
            .collect();

        let returns = pct_change(&close, 1);
        let volatility = rolling_std_of(&returns, 20);
        let vol_baseline = sma_of(&volatility, 60);

        let mut series = crate::data::EnrichedSeries::new(bars);
        series
            .attach("zscore", &zscore)
            .attach("long_momentum", &pct_change(&close, 60))
            .attach("volatility", &volatility)
            .attach("vol_baseline", &vol_baseline)
            .attach("autocorr", &rolling_autocorr(&close, 60))
            .attach("percentile", &percentile_rank(&close, 60));
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

            if let (Some(z), Some(pct)) = (current.value("zscore"), current.value("percentile")) {
                //reversion complete or stretched the other way
                if z >= 0.0 || z > EXIT_ZSCORE || pct > 0.7 {
                    return Signal::Sell;
                }
            }
            return Signal::Hold;
        }

        let inputs = (
            current.value("zscore"),
            current.value("long_momentum"),
            current.value("volatility"),
            current.value("vol_baseline"),
            current.value("autocorr"),
            current.value("percentile"),
        );
        let (Some(z), Some(momentum), Some(vol), Some(baseline), Some(ac), Some(pct)) = inputs
        else {
            return Signal::Hold;
        };

        //only fade declines in a calm, mean-reverting regime that has not
        //collapsed outright
        let calm = vol < baseline;
        let reverting = ac < 0.2;
        if z < ENTRY_ZSCORE && pct < 0.3 && calm && reverting && momentum > -0.25 {
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(close: f64) -> EnrichedBar {
        EnrichedBar::new(Bar::new_unchecked(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            close,
            close,
            close,
            close,
            1000.0,
            None,
        ))
    }

    #[test]
    fn deep_zscore_in_a_calm_regime_buys() {
        let mut strategy = StatArbStrategy::new();
        let position = PositionView {
            capital: 100_000.0,
            shares: 0,
            entry_price: 0.0,
            highest_close: None,
        };

        let mut current = bar(90.0);
        current.set("zscore", -2.4);
        current.set("long_momentum", -0.05);
        current.set("volatility", 0.01);
        current.set("vol_baseline", 0.02);
        current.set("autocorr", -0.3);
        current.set("percentile", 0.1);

        let signal = strategy.generate_signal(&current, &bar(91.0), &position);
        assert_eq!(signal, Signal::Buy);
    }

    #[test]
    fn elevated_volatility_blocks_the_entry() {
        let mut strategy = StatArbStrategy::new();
        let position = PositionView {
            capital: 100_000.0,
            shares: 0,
            entry_price: 0.0,
            highest_close: None,
        };

        let mut current = bar(90.0);
        current.set("zscore", -2.4);
        current.set("long_momentum", -0.05);
        current.set("volatility", 0.03);
        current.set("vol_baseline", 0.02);
        current.set("autocorr", -0.3);
        current.set("percentile", 0.1);

        let signal = strategy.generate_signal(&current, &bar(91.0), &position);
        assert_eq!(signal, Signal::Hold);
    }

    #[test]
    fn zscore_recovery_exits() {
        let mut strategy = StatArbStrategy::new();
        let position = PositionView {
            capital: 0.0,
            shares: 100,
            entry_price: 100.0,
            highest_close: Some(100.0),
        };

        let mut current = bar(101.0);
        current.set("zscore", 0.1);
        current.set("percentile", 0.5);

        let signal = strategy.generate_signal(&current, &bar(100.0), &position);
        assert_eq!(signal, Signal::Sell);
    }
}
