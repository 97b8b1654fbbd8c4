pub mod config;
pub mod data;
pub mod engine;
pub mod indicators;
pub mod metrics;
pub mod report;
pub mod strategy;

pub mod prelude {
    pub use crate::config::{ConfigError, RunConfig, StrategyKind};
    pub use crate::data::{load_csv, validate_series, Bar, DataError, EnrichedBar, EnrichedSeries};
    pub use crate::engine::{
        run_all, run_strategy, AccountState, BacktestError, BuyOutcome, EngineError,
        ExecutionEngine, RejectReason, Rejection, SizePolicy, StrategyRun, Trade, TradeSide,
    };
    pub use crate::metrics::{max_drawdown_over, PerformanceSummary};
    pub use crate::strategy::{PositionView, Signal, Strategy};
}
