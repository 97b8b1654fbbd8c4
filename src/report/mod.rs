//run reporting: console tables and csv exports

use crate::engine::{StrategyRun, Trade};
use anyhow::{Context, Result};
use prettytable::{format, row, Table};
use std::path::Path;

//side-by-side comparison of every completed run, best profit first
pub fn comparison_table(runs: &[&StrategyRun]) -> Table {
    let mut sorted: Vec<&&StrategyRun> = runs.iter().collect();
    sorted.sort_by(|a, b| {
        b.summary
            .total_profit
            .partial_cmp(&a.summary.total_profit)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(row![
        "Strategy",
        "Trades",
        "Win Rate",
        "Total Profit",
        "Return",
        "Max Drawdown",
        "Final Capital"
    ]);

    for run in sorted {
        let s = &run.summary;
        table.add_row(row![
            run.strategy_name,
            s.total_trades,
            format!("{:.1}%", s.win_rate_pct),
            format!("{:.2}", s.total_profit),
            format!("{:.2}%", s.profit_rate_pct),
            format!("{:.2}%", s.max_drawdown_pct),
            format!("{:.2}", s.final_capital)
        ]);
    }

    table
}

//fill-by-fill ledger for a single run
pub fn trade_table(run: &StrategyRun) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(row![
        "Date",
        "Side",
        "Price",
        "Shares",
        "Amount",
        "Commission",
        "Capital After",
        "Position After"
    ]);

    for trade in &run.trades {
        table.add_row(row![
            trade.date,
            trade.side,
            format!("{:.2}", trade.price),
            trade.shares,
            format!("{:.2}", trade.amount),
            format!("{:.2}", trade.commission),
            format!("{:.2}", trade.capital_after),
            trade.position_after
        ]);
    }

    table
}

//writes a run's fills to csv, one row per fill
pub fn export_trades<P: AsRef<Path>>(trades: &[Trade], path: P) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .context(format!("Failed to create trade export: {:?}", path))?;

    writer.write_record([
        "date",
        "side",
        "price",
        "shares",
        "amount",
        "commission",
        "capital_after",
        "position_after",
    ])?;
    for trade in trades {
        writer.write_record([
            trade.date.to_string(),
            trade.side.to_string(),
            format!("{:.4}", trade.price),
            trade.shares.to_string(),
            format!("{:.4}", trade.amount),
            format!("{:.4}", trade.commission),
            format!("{:.4}", trade.capital_after),
            trade.position_after.to_string(),
        ])?;
    }
    writer.flush()?;

    Ok(())
}

//writes the per-strategy summaries to csv in comparison order
pub fn export_summaries<P: AsRef<Path>>(runs: &[&StrategyRun], path: P) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .context(format!("Failed to create summary export: {:?}", path))?;

    writer.write_record([
        "strategy",
        "total_trades",
        "winning_trades",
        "win_rate_pct",
        "avg_profit_per_trade",
        "total_profit",
        "profit_rate_pct",
        "max_drawdown_pct",
        "drawdown_start",
        "drawdown_end",
        "final_capital",
    ])?;
    for run in runs {
        let s = &run.summary;
        let (start, end) = match s.drawdown_window {
            Some((start, end)) => (start.to_string(), end.to_string()),
            None => (String::new(), String::new()),
        };
        writer.write_record([
            run.strategy_name.clone(),
            s.total_trades.to_string(),
            s.winning_trades.to_string(),
            format!("{:.4}", s.win_rate_pct),
            format!("{:.4}", s.avg_profit_per_trade),
            format!("{:.4}", s.total_profit),
            format!("{:.4}", s.profit_rate_pct),
            format!("{:.4}", s.max_drawdown_pct),
            start,
            end,
            format!("{:.4}", s.final_capital),
        ])?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::PerformanceSummary;
    use chrono::NaiveDate;

    fn run(name: &str, profit: f64) -> StrategyRun {
        StrategyRun {
            strategy_name: name.to_string(),
            trades: Vec::new(),
            rejections: Vec::new(),
            summary: PerformanceSummary {
                total_trades: 0,
                winning_trades: 0,
                win_rate_pct: 0.0,
                avg_profit_per_trade: 0.0,
                total_profit: profit,
                profit_rate_pct: profit / 1000.0,
                max_drawdown_pct: 0.0,
                drawdown_window: None,
                final_capital: 100_000.0 + profit,
            },
        }
    }

    #[test]
    fn comparison_sorts_by_profit() {
        let a = run("alpha", 100.0);
        let b = run("beta", 500.0);
        let table = comparison_table(&[&a, &b]);

        let rendered = table.to_string();
        let beta_at = rendered.find("beta").unwrap();
        let alpha_at = rendered.find("alpha").unwrap();
        assert!(beta_at < alpha_at);
    }

    #[test]
    fn summary_export_writes_a_row_per_run() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let a = run("alpha", 100.0);
        export_summaries(&[&a], file.path()).unwrap();

        let contents = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("alpha,"));
    }

    #[test]
    fn trade_export_round_trips_through_csv() {
        use crate::engine::TradeSide;

        let file = tempfile::NamedTempFile::new().unwrap();
        let trades = vec![Trade {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            side: TradeSide::Buy,
            price: 10.5,
            shares: 100,
            amount: 1050.0,
            commission: 0.315,
            capital_after: 98_949.685,
            position_after: 100,
        }];
        export_trades(&trades, file.path()).unwrap();

        let contents = std::fs::read_to_string(file.path()).unwrap();
        assert!(contents.contains("2024-01-02,BUY,10.5000,100"));
    }
}
