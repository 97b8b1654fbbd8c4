pub mod bollinger;
pub mod breakout;
pub mod dca;
pub mod dual_ma_volume;
pub mod event_driven;
pub mod hybrid;
pub mod kdj;
pub mod macd;
pub mod mean_reversion;
pub mod quality_rotation;
pub mod risk_parity;
pub mod stat_arb;
pub mod swing;
pub mod trend_following;
pub mod volume_price;

pub use bollinger::BollingerStrategy;
pub use breakout::BreakoutStrategy;
pub use dca::DcaStrategy;
pub use dual_ma_volume::DualMaVolumeStrategy;
pub use event_driven::EventDrivenStrategy;
pub use hybrid::HybridStrategy;
pub use kdj::KdjStrategy;
pub use macd::MacdStrategy;
pub use mean_reversion::MeanReversionStrategy;
pub use quality_rotation::QualityRotationStrategy;
pub use risk_parity::RiskParityStrategy;
pub use stat_arb::StatArbStrategy;
pub use swing::SwingStrategy;
pub use trend_following::TrendFollowingStrategy;
pub use volume_price::VolumePriceStrategy;

use crate::data::{Bar, EnrichedBar};
use crate::engine::SizePolicy;

//trading decision for one bar, produced after the bar closes and
//executed at that same close
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

//read-only snapshot of the account a strategy sees while deciding
//highest_close is the high-water mark as of the previous close: the engine
//folds the current close in only after the signal has been generated
#[derive(Debug, Clone)]
pub struct PositionView {
    pub capital: f64,
    pub shares: u64,
    pub entry_price: f64,
    pub highest_close: Option<f64>,
}

impl PositionView {
    pub fn in_position(&self) -> bool {
        self.shares > 0
    }

    //fractional gain over the entry price, zero while flat
    pub fn unrealized_return(&self, price: f64) -> f64 {
        if self.shares == 0 || self.entry_price == 0.0 {
            return 0.0;
        }
        price / self.entry_price - 1.0
    }
}

//a trading strategy: enriches the raw series with the indicators it needs,
//then emits one signal per bar from the current and previous enriched bars
//
//signals must come from closed bars only; an implementation may keep
//internal state (pacing counters, pending size adjustments) across bars
pub trait Strategy: Send {
    fn name(&self) -> &'static str;

    //bars consumed by the longest indicator warm-up; the runner refuses
    //series that are not strictly longer than this
    fn warmup_bars(&self) -> usize;

    fn enrich(&self, bars: &[Bar]) -> Vec<EnrichedBar>;

    fn generate_signal(
        &mut self,
        current: &EnrichedBar,
        previous: &EnrichedBar,
        position: &PositionView,
    ) -> Signal;

    //sizing for the entry the engine is about to fill
    fn entry_sizing(&self, _current: &EnrichedBar) -> SizePolicy {
        SizePolicy::CapitalFraction { fraction: 0.7 }
    }

    //fraction of the position to unwind on a sell signal
    fn exit_fraction(&self, _current: &EnrichedBar) -> f64 {
        1.0
    }

    //whether buy signals may add to an existing position
    fn allows_pyramiding(&self) -> bool {
        false
    }
}
