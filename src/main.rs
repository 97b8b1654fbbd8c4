use anyhow::{Context, Result};
use barback::config::{RunConfig, StrategyKind};
use barback::data::load_csv;
use barback::engine::run_all;
use barback::report::{comparison_table, export_summaries, export_trades, trade_table};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "barback", about = "Daily-bar strategy backtesting engine", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    //run one or every strategy over a csv bar series
    Run {
        //csv file with date, open, high, low, close, volume columns
        #[arg(long)]
        data: PathBuf,
        //strategy name; omit to run the whole catalogue
        #[arg(long)]
        strategy: Option<String>,
        //json file with initial_capital and commission_rate
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        capital: Option<f64>,
        #[arg(long)]
        commission: Option<f64>,
        //write per-fill ledgers next to this path, one file per strategy
        #[arg(long)]
        trades_out: Option<PathBuf>,
        //write the comparison summary as csv
        #[arg(long)]
        summary_out: Option<PathBuf>,
        //print the full fill ledger for each run
        #[arg(long, default_value_t = false)]
        verbose: bool,
    },
    //list the available strategies
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::List => {
            for kind in StrategyKind::all() {
                println!("{}", kind);
            }
            Ok(())
        }
        Command::Run {
            data,
            strategy,
            config,
            capital,
            commission,
            trades_out,
            summary_out,
            verbose,
        } => run(
            data,
            strategy,
            config,
            capital,
            commission,
            trades_out,
            summary_out,
            verbose,
        ),
    }
}

#[allow(clippy::too_many_arguments)]
fn run(
    data: PathBuf,
    strategy: Option<String>,
    config_path: Option<PathBuf>,
    capital: Option<f64>,
    commission: Option<f64>,
    trades_out: Option<PathBuf>,
    summary_out: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => RunConfig::from_file(&path)
            .context(format!("Failed to load config from {:?}", path))?,
        None => RunConfig::default(),
    };
    if let Some(capital) = capital {
        config.initial_capital = capital;
    }
    if let Some(commission) = commission {
        config.commission_rate = commission;
    }
    config.validate()?;

    let bars = load_csv(&data)?;
    println!(
        "Loaded {} bars from {:?} ({} to {})",
        bars.len(),
        data,
        bars.first().map(|b| b.date.to_string()).unwrap_or_default(),
        bars.last().map(|b| b.date.to_string()).unwrap_or_default()
    );

    let kinds: Vec<StrategyKind> = match strategy {
        Some(name) => vec![StrategyKind::from_str(&name)?],
        None => StrategyKind::all().to_vec(),
    };
    let strategies = kinds.iter().map(|kind| kind.build()).collect();

    let results = run_all(strategies, &bars, &config);

    let mut completed = Vec::new();
    for (name, result) in &results {
        match result {
            Ok(run) => completed.push(run),
            Err(err) => eprintln!("{}: {}", name, err),
        }
    }

    if completed.is_empty() {
        anyhow::bail!("No strategy completed");
    }

    let refs: Vec<&_> = completed.iter().copied().collect();
    comparison_table(&refs).printstd();

    for run in &completed {
        if !run.rejections.is_empty() {
            println!(
                "{}: {} order(s) rejected, first on {}",
                run.strategy_name,
                run.rejections.len(),
                run.rejections[0].date
            );
        }
        if verbose {
            println!("\n{} fills:", run.strategy_name);
            trade_table(run).printstd();
        }
    }

    if let Some(base) = trades_out {
        for run in &completed {
            let path = trades_path(&base, &run.strategy_name);
            export_trades(&run.trades, &path)?;
            println!("Wrote {:?}", path);
        }
    }
    if let Some(path) = summary_out {
        export_summaries(&refs, &path)?;
        println!("Wrote {:?}", path);
    }

    Ok(())
}

//one ledger file per strategy, derived from the base path's stem
fn trades_path(base: &PathBuf, strategy: &str) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "trades".to_string());
    let ext = base
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "csv".to_string());
    base.with_file_name(format!("{}_{}.{}", stem, strategy, ext))
}
