pub mod account;
pub mod backtest;
pub mod execution;

pub use account::{AccountState, RejectReason, Rejection, Trade, TradeSide};
pub use backtest::{run_all, run_strategy, BacktestError, StrategyRun};
pub use execution::{BuyOutcome, EngineError, ExecutionEngine, SizePolicy};
