//! TrendScope CLI: indicator, signal, backtest, and batch commands.
//!
//! Commands:
//! - `indicators`: print the SMA and RSI series of a CSV as JSON
//! - `signals`: print SMA crossover signals as JSON
//! - `backtest`: run the long/cash backtest from a TOML config or a CSV
//! - `batch`: analyze every CSV in a directory in parallel
//!
//! Logs go to stderr (`RUST_LOG`, default `info`); stdout carries only
//! results.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use trendscope_core::indicators::{rsi_series, sma_series};
use trendscope_core::{generate_signals, StrategyParams};
use trendscope_runner::{
    load_bars, run_batch, run_from_config, save_artifacts, AnalysisReport, BacktestOutcome,
    CsvBarSource, RunConfig,
};

#[derive(Parser)]
#[command(
    name = "trendscope",
    about = "TrendScope CLI: SMA/RSI indicators, crossover signals and backtests"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the SMA and RSI series for a CSV file as JSON.
    Indicators {
        /// CSV file with a date,open,high,low,close,volume header.
        #[arg(long)]
        input: PathBuf,

        /// Symbol label. Defaults to the file stem.
        #[arg(long)]
        symbol: Option<String>,

        #[command(flatten)]
        strategy: StrategyArgs,
    },
    /// Print SMA crossover signals for a CSV file as JSON.
    Signals {
        /// CSV file with a date,open,high,low,close,volume header.
        #[arg(long)]
        input: PathBuf,

        /// Symbol label. Defaults to the file stem.
        #[arg(long)]
        symbol: Option<String>,

        #[command(flatten)]
        strategy: StrategyArgs,
    },
    /// Run the SMA crossover backtest from a TOML config or a CSV file.
    Backtest {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// CSV file (alternative to --config).
        #[arg(long)]
        input: Option<PathBuf>,

        /// Symbol label with --input. Defaults to the file stem.
        #[arg(long)]
        symbol: Option<String>,

        #[command(flatten)]
        strategy: StrategyArgs,

        /// Save artifacts here. Overrides the config's output dir.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Analyze every *.csv in a directory in parallel.
    Batch {
        /// Directory of <SYMBOL>.csv files.
        #[arg(long)]
        dir: PathBuf,

        #[command(flatten)]
        strategy: StrategyArgs,

        /// Save artifacts for every symbol here.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

/// Strategy overrides shared by every command.
#[derive(Args, Debug, Default)]
struct StrategyArgs {
    /// Short SMA window.
    #[arg(long)]
    short: Option<usize>,

    /// Long SMA window.
    #[arg(long)]
    long: Option<usize>,

    /// RSI window.
    #[arg(long)]
    rsi: Option<usize>,

    /// Initial capital.
    #[arg(long)]
    capital: Option<f64>,
}

impl StrategyArgs {
    fn apply(&self, params: &mut StrategyParams) {
        if let Some(v) = self.short {
            params.short_window = v;
        }
        if let Some(v) = self.long {
            params.long_window = v;
        }
        if let Some(v) = self.rsi {
            params.rsi_window = v;
        }
        if let Some(v) = self.capital {
            params.initial_capital = v;
        }
    }

    fn params(&self) -> Result<StrategyParams> {
        let mut params = StrategyParams::default();
        self.apply(&mut params);
        params.validate().context("invalid strategy parameters")?;
        Ok(params)
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Indicators {
            input,
            symbol,
            strategy,
        } => run_indicators(&input, symbol, &strategy),
        Commands::Signals {
            input,
            symbol,
            strategy,
        } => run_signals(&input, symbol, &strategy),
        Commands::Backtest {
            config,
            input,
            symbol,
            strategy,
            output_dir,
        } => run_backtest_cmd(config, input, symbol, &strategy, output_dir),
        Commands::Batch {
            dir,
            strategy,
            output_dir,
        } => run_batch_cmd(&dir, &strategy, output_dir),
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn symbol_for(input: &Path, symbol: Option<String>) -> Result<String> {
    if let Some(symbol) = symbol {
        return Ok(symbol);
    }
    match input.file_stem().and_then(|s| s.to_str()) {
        Some(stem) => Ok(stem.to_string()),
        None => bail!("cannot derive a symbol from {}; pass --symbol", input.display()),
    }
}

fn run_indicators(input: &Path, symbol: Option<String>, args: &StrategyArgs) -> Result<()> {
    let symbol = symbol_for(input, symbol)?;
    let params = args.params()?;
    let loaded = load_bars(&CsvBarSource::new(input), &symbol)?;

    let out = json!({
        "symbol": symbol,
        "short_sma": sma_series(&loaded.bars, params.short_window),
        "long_sma": sma_series(&loaded.bars, params.long_window),
        "rsi": rsi_series(&loaded.bars, params.rsi_window),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn run_signals(input: &Path, symbol: Option<String>, args: &StrategyArgs) -> Result<()> {
    let symbol = symbol_for(input, symbol)?;
    let params = args.params()?;
    let loaded = load_bars(&CsvBarSource::new(input), &symbol)?;

    let signals = generate_signals(&loaded.bars, &symbol, &params);
    println!("{}", serde_json::to_string_pretty(&signals)?);
    Ok(())
}

fn run_backtest_cmd(
    config_path: Option<PathBuf>,
    input: Option<PathBuf>,
    symbol: Option<String>,
    args: &StrategyArgs,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    // Validate mutually exclusive options
    let mut config = match (config_path, input) {
        (Some(_), Some(_)) => bail!("--config and --input are mutually exclusive"),
        (None, None) => bail!("one of --config or --input is required"),
        (Some(path), None) => RunConfig::from_file(&path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        (None, Some(path)) => RunConfig::new(symbol_for(&path, symbol)?, path),
    };
    args.apply(&mut config.strategy);
    if output_dir.is_some() {
        config.output.dir = output_dir;
    }

    let source = CsvBarSource::new(&config.data.path);
    let report = run_from_config(&config, &source)?;
    print_summary(&report);

    if let Some(dir) = &config.output.dir {
        let run_dir = save_artifacts(&report, dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn run_batch_cmd(dir: &Path, args: &StrategyArgs, output_dir: Option<PathBuf>) -> Result<()> {
    let params = args.params()?;
    let results = run_batch(dir, &params)?;
    if results.is_empty() {
        println!("No CSV files in {}", dir.display());
        return Ok(());
    }

    println!(
        "{:<8} {:>6} {:>8} {:>10} {:>8} {:>10}",
        "Symbol", "Bars", "Signals", "Return", "Sharpe", "Max DD"
    );
    println!("{}", "-".repeat(55));
    let mut failed = 0;
    for (symbol, result) in &results {
        match result {
            Ok(report) => {
                print_row(report);
                if let Some(dir) = &output_dir {
                    save_artifacts(report, dir)?;
                }
            }
            Err(e) => {
                failed += 1;
                println!("{symbol:<8} error: {e}");
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} symbols failed", results.len());
    }
    Ok(())
}

fn print_row(report: &AnalysisReport) {
    match &report.backtest {
        BacktestOutcome::Completed(r) => println!(
            "{:<8} {:>6} {:>8} {:>9.2}% {:>8.3} {:>9.2}%",
            report.symbol,
            report.bar_count,
            report.signals.len(),
            r.total_return * 100.0,
            r.sharpe_ratio,
            r.max_drawdown * 100.0
        ),
        BacktestOutcome::Failed { reason } => println!(
            "{:<8} {:>6} {:>8} {reason}",
            report.symbol,
            report.bar_count,
            report.signals.len()
        ),
    }
}

fn print_summary(report: &AnalysisReport) {
    println!();
    println!("=== Backtest Result ===");
    println!("Symbol:         {}", report.symbol);
    if let (Some(start), Some(end)) = (report.start_date, report.end_date) {
        println!("Period:         {start} to {end}");
    }
    println!("Bars:           {}", report.bar_count);
    println!(
        "Windows:        SMA {}/{}, RSI {}",
        report.params.short_window, report.params.long_window, report.params.rsi_window
    );
    println!("Signals:        {}", report.signals.len());
    if let Some(rsi) = report.latest_rsi {
        println!("Latest RSI:     {rsi:.2}");
    }
    println!();
    println!("--- Performance ---");
    match &report.backtest {
        BacktestOutcome::Completed(r) => {
            println!("Total Return:   {:.2}%", r.total_return * 100.0);
            println!("Annualized:     {:.2}%", r.annualized_return * 100.0);
            println!("Buy & Hold:     {:.2}%", r.benchmark_return * 100.0);
            println!("Sharpe:         {:.3}", r.sharpe_ratio);
            println!("Max Drawdown:   {:.2}%", r.max_drawdown * 100.0);
            println!("Final Value:    {:.2}", r.final_value);
            println!("Trades:         {}", r.trades.len());
        }
        BacktestOutcome::Failed { reason } => println!("Not run:        {reason}"),
    }
    for warn in &report.data_quality_warnings {
        println!("WARNING: {warn}");
    }
    println!();
}
