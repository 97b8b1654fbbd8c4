pub mod summary;

pub use summary::{max_drawdown_over, PerformanceSummary};
