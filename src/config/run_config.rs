use crate::strategy::{
    BollingerStrategy, BreakoutStrategy, DcaStrategy, DualMaVolumeStrategy, EventDrivenStrategy,
    HybridStrategy, KdjStrategy, MacdStrategy, MeanReversionStrategy, QualityRotationStrategy,
    RiskParityStrategy, StatArbStrategy, Strategy, SwingStrategy, TrendFollowingStrategy,
    VolumePriceStrategy,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Initial capital must be positive, got {0}")]
    NonPositiveCapital(f64),
    #[error("Commission rate must be in [0, 1), got {0}")]
    InvalidCommissionRate(f64),
    #[error("Unknown strategy '{0}'")]
    UnknownStrategy(String),
}

//run-wide account settings, shared by every strategy in a run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub initial_capital: f64,
    pub commission_rate: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            initial_capital: 1_000_000.0,
            commission_rate: 0.0003,
        }
    }
}

impl RunConfig {
    pub fn new(initial_capital: f64, commission_rate: f64) -> Result<Self, ConfigError> {
        let config = RunConfig {
            initial_capital,
            commission_rate,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.initial_capital > 0.0 && self.initial_capital.is_finite()) {
            return Err(ConfigError::NonPositiveCapital(self.initial_capital));
        }
        if !(0.0..1.0).contains(&self.commission_rate) {
            return Err(ConfigError::InvalidCommissionRate(self.commission_rate));
        }
        Ok(())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: RunConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

//the strategy catalogue, one variant per shipped strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Hybrid,
    Macd,
    Kdj,
    Bollinger,
    DualMaVolume,
    MeanReversion,
    TrendFollowing,
    VolumePrice,
    StatArb,
    EventDriven,
    QualityRotation,
    RiskParity,
    Dca,
    Swing,
    Breakout,
}

impl StrategyKind {
    pub fn all() -> &'static [StrategyKind] {
        &[
            StrategyKind::Hybrid,
            StrategyKind::Macd,
            StrategyKind::Kdj,
            StrategyKind::Bollinger,
            StrategyKind::DualMaVolume,
            StrategyKind::MeanReversion,
            StrategyKind::TrendFollowing,
            StrategyKind::VolumePrice,
            StrategyKind::StatArb,
            StrategyKind::EventDriven,
            StrategyKind::QualityRotation,
            StrategyKind::RiskParity,
            StrategyKind::Dca,
            StrategyKind::Swing,
            StrategyKind::Breakout,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Hybrid => "hybrid",
            StrategyKind::Macd => "macd",
            StrategyKind::Kdj => "kdj",
            StrategyKind::Bollinger => "bollinger",
            StrategyKind::DualMaVolume => "dual-ma-volume",
            StrategyKind::MeanReversion => "mean-reversion",
            StrategyKind::TrendFollowing => "trend-following",
            StrategyKind::VolumePrice => "volume-price",
            StrategyKind::StatArb => "stat-arb",
            StrategyKind::EventDriven => "event-driven",
            StrategyKind::QualityRotation => "quality-rotation",
            StrategyKind::RiskParity => "risk-parity",
            StrategyKind::Dca => "dca",
            StrategyKind::Swing => "swing",
            StrategyKind::Breakout => "breakout",
        }
    }

    pub fn build(&self) -> Box<dyn Strategy> {
        match self {
            StrategyKind::Hybrid => Box::new(HybridStrategy::new()),
            StrategyKind::Macd => Box::new(MacdStrategy::new()),
            StrategyKind::Kdj => Box::new(KdjStrategy::new()),
            StrategyKind::Bollinger => Box::new(BollingerStrategy::new()),
            StrategyKind::DualMaVolume => Box::new(DualMaVolumeStrategy::new()),
            StrategyKind::MeanReversion => Box::new(MeanReversionStrategy::new()),
            StrategyKind::TrendFollowing => Box::new(TrendFollowingStrategy::new()),
            StrategyKind::VolumePrice => Box::new(VolumePriceStrategy::new()),
            StrategyKind::StatArb => Box::new(StatArbStrategy::new()),
            StrategyKind::EventDriven => Box::new(EventDrivenStrategy::new()),
            StrategyKind::QualityRotation => Box::new(QualityRotationStrategy::new()),
            StrategyKind::RiskParity => Box::new(RiskParityStrategy::new()),
            StrategyKind::Dca => Box::new(DcaStrategy::new()),
            StrategyKind::Swing => Box::new(SwingStrategy::new()),
            StrategyKind::Breakout => Box::new(BreakoutStrategy::new()),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyKind::all()
            .iter()
            .find(|kind| kind.as_str() == s)
            .copied()
            .ok_or_else(|| ConfigError::UnknownStrategy(s.to_string()))
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
