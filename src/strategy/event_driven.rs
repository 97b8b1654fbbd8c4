//chase volume-and-price shock events while the move is still fresh

use crate::data::{Bar, EnrichedBar};
use crate::engine::SizePolicy;
use crate::indicators::moving_average::sma_of;
use crate::indicators::{closes, pct_change, rolling_std_of, rsi, volume_ratio};
use crate::strategy::{PositionView, Signal, Strategy};

const VOLUME_SPIKE: f64 = 3.0;
const PRICE_JUMP: f64 = 0.05;
const VOLATILITY_EXPANSION: f64 = 1.2;
const STOP_LOSS: f64 = 0.03;
const TAKE_PROFIT: f64 = 0.05;

pub struct EventDrivenStrategy;

impl EventDrivenStrategy {
    pub fn new() -> Self {
        EventDrivenStrategy
    }
}

impl Default for EventDrivenStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for EventDrivenStrategy {
    fn name(&self) -> &'static str {
        "event-driven"
    }

    fn warmup_bars(&self) -> usize {
        80
    }

    fn enrich(&self, bars: &[Bar]) -> Vec<EnrichedBar> {
        let close = closes(bars);
        let returns = pct_change(&close, 1);
        let volatility = rolling_std_of(&returns, 20);
        let vol_baseline = sma_of(&volatility, 60);

        let mut series = crate::data::EnrichedSeries::new(bars);
        series
            .attach("vol_ratio", &volume_ratio(bars, 20))
            .attach("daily_return", &returns)
            .attach("volatility", &volatility)
            .attach("vol_baseline", &vol_baseline)
            .attach("rsi", &rsi(&close, 14));
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

            //the event is over when the tape goes quiet or momentum flips
            if let (Some(vol), Some(day)) =
                (current.value("vol_ratio"), current.value("daily_return"))
            {
                if vol < 1.0 || day < -0.02 {
                    return Signal::Sell;
                }
            }
            return Signal::Hold;
        }

        let inputs = (
            current.value("vol_ratio"),
            current.value("daily_return"),
            current.value("volatility"),
            current.value("vol_baseline"),
            current.value("rsi"),
        );
        let (Some(vol), Some(day), Some(sigma), Some(baseline), Some(r)) = inputs else {
            return Signal::Hold;
        };

        let shock = vol > VOLUME_SPIKE && day > PRICE_JUMP;
        let expanding = sigma > baseline * VOLATILITY_EXPANSION;
        if shock && expanding && r > 30.0 && r < 70.0 {
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
