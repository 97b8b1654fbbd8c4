use crate::config::RunConfig;
use crate::data::{validate_series, Bar, DataError};
use crate::engine::account::{Rejection, Trade};
use crate::engine::execution::{EngineError, ExecutionEngine};
use crate::metrics::PerformanceSummary;
use crate::strategy::{Signal, Strategy};
use rayon::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BacktestError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

//everything one strategy produced over one series
#[derive(Debug)]
pub struct StrategyRun {
    pub strategy_name: String,
    pub trades: Vec<Trade>,
    pub rejections: Vec<Rejection>,
    pub summary: PerformanceSummary,
}

//runs one strategy over the series: validate, enrich, then a single pass
//from the second bar emitting at most one fill decision per bar
//the book is forced flat at the final close so every run ends in cash
pub fn run_strategy(
    strategy: &mut dyn Strategy,
    bars: &[Bar],
    config: &RunConfig,
) -> Result<StrategyRun, BacktestError> {
    validate_series(bars)?;

    let warmup = strategy.warmup_bars();
    if bars.len() <= warmup {
        return Err(DataError::InsufficientHistory {
            strategy: strategy.name().to_string(),
            required: warmup,
            actual: bars.len(),
        }
        .into());
    }

    let enriched = strategy.enrich(bars);
    debug_assert_eq!(enriched.len(), bars.len());

    let mut engine = ExecutionEngine::new(config.initial_capital, config.commission_rate);
    let last = enriched.len() - 1;

    for i in 1..enriched.len() {
        let current = &enriched[i];
        let previous = &enriched[i - 1];

        let view = engine.position_view();
        let signal = strategy.generate_signal(current, previous, &view);

        match signal {
            Signal::Buy => {
                //a repeat entry without pyramiding is recorded as a rejection
                engine.buy(
                    current,
                    strategy.entry_sizing(current),
                    strategy.allows_pyramiding(),
                )?;
            }
            Signal::Sell => {
                //a sell with nothing to unwind is a silent no-op
                if view.in_position() {
                    engine.sell(current, strategy.exit_fraction(current))?;
                }
            }
            Signal::Hold => {}
        }

        if i == last && engine.account().position > 0 {
            engine.sell(current, 1.0)?;
        }

        engine.observe_close(current);
    }

    let (trades, rejections, _) = engine.into_records();
    let summary = PerformanceSummary::from_trades(&trades, config.initial_capital, bars[0].date);

    Ok(StrategyRun {
        strategy_name: strategy.name().to_string(),
        trades,
        rejections,
        summary,
    })
}

//runs every strategy over the same series in parallel
//each strategy is isolated: one failing run does not abort the others
pub fn run_all(
    strategies: Vec<Box<dyn Strategy>>,
    bars: &[Bar],
    config: &RunConfig,
) -> Vec<(String, Result<StrategyRun, BacktestError>)> {
    strategies
        .into_par_iter()
        .map(|mut strategy| {
            let name = strategy.name().to_string();
            (name, run_strategy(strategy.as_mut(), bars, config))
        })
        .collect()
}
