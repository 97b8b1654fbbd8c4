//volatility-targeted sizing: scale exposure so realized risk stays near
//a fixed annualized budget

use crate::data::{Bar, EnrichedBar};
use crate::engine::SizePolicy;
use crate::indicators::{atr, closes, pct_change, rolling_std_of, rsi, sma};
use crate::strategy::{PositionView, Signal, Strategy};

const TARGET_ANNUAL_VOL: f64 = 0.15;
const MAX_LEVERAGE: f64 = 2.0;
const MIN_POSITION_FRACTION: f64 = 0.1;
const TRADING_DAYS: f64 = 252.0;
const ATR_STOP_MULTIPLE: f64 = 2.0;

pub struct RiskParityStrategy {
    target_fraction: f64,
}

impl RiskParityStrategy {
    pub fn new() -> Self {
        RiskParityStrategy {
            target_fraction: MIN_POSITION_FRACTION,
        }
    }
}

impl Default for RiskParityStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for RiskParityStrategy {
    fn name(&self) -> &'static str {
        "risk-parity"
    }

    fn warmup_bars(&self) -> usize {
        25
    }

    fn enrich(&self, bars: &[Bar]) -> Vec<EnrichedBar> {
        let close = closes(bars);
        let returns = pct_change(&close, 1);
        let volatility = rolling_std_of(&returns, 20);
        let annualized: Vec<Option<f64>> = volatility
            .iter()
            .map(|v| v.map(|v| v * TRADING_DAYS.sqrt()))
            .collect();

        let mut series = crate::data::EnrichedSeries::new(bars);
        series
            .attach("annual_vol", &annualized)
            .attach("sma20", &sma(&close, 20))
            .attach("rsi", &rsi(&close, 14))
            .attach("atr", &atr(bars, 14));
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
            if let Some(a) = current.value("atr") {
                if price < position.entry_price - ATR_STOP_MULTIPLE * a {
                    return Signal::Sell;
                }
            }
            if let Some(ma) = current.value("sma20") {
                if price < ma {
                    return Signal::Sell;
                }
            }
            return Signal::Hold;
        }

        let inputs = (
            current.value("annual_vol"),
            current.value("sma20"),
            current.value("rsi"),
        );
        let (Some(vol), Some(ma), Some(r)) = inputs else {
            return Signal::Hold;
        };

        if price <= ma || vol <= 0.0 {
            return Signal::Hold;
        }

        let risk_scale = (TARGET_ANNUAL_VOL / vol).min(MAX_LEVERAGE);
        let sentiment = if r > 70.0 {
            0.5
        } else if r < 30.0 {
            1.5
        } else {
            1.0
        };
        let target = risk_scale * sentiment;

        if target < MIN_POSITION_FRACTION {
            return Signal::Hold;
        }

        //the engine clips nothing here: a target above the account's means
        //comes back as a rejection, not a resized fill
        self.target_fraction = target;
        Signal::Buy
    }

    fn entry_sizing(&self, _current: &EnrichedBar) -> SizePolicy {
        SizePolicy::CapitalFraction {
            fraction: self.target_fraction,
        }
    }
}
