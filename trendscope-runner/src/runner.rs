//! Analysis runner: wires together loading, indicators, signals, and the
//! backtest.
//!
//! Three entry points:
//! - `analyze()`: takes pre-loaded bars. No I/O.
//! - `run_from_config()`: loads bars through a `BarSource`, then analyzes. Used by the CLI.
//! - `analyze_many()` / `run_batch()`: independent per-symbol analyses in parallel.

use std::path::Path;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use trendscope_core::domain::{Bar, Signal};
use trendscope_core::indicators::{rsi_series, sma_series, IndicatorSeries};
use trendscope_core::{generate_signals, run_backtest, BacktestResult, CoreError, StrategyParams};

use crate::config::{ConfigError, RunConfig, RunId};
use crate::data_loader::{
    dataset_hash, discover_symbols, load_bars, BarSource, CsvBarSource, LoadError,
};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("invalid parameters: {0}")]
    Params(#[from] CoreError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Backtest part of a report. A failed backtest does not void the rest of
/// the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BacktestOutcome {
    Completed(BacktestResult),
    Failed { reason: String },
}

impl BacktestOutcome {
    pub fn result(&self) -> Option<&BacktestResult> {
        match self {
            BacktestOutcome::Completed(result) => Some(result),
            BacktestOutcome::Failed { .. } => None,
        }
    }
}

/// Complete result of analyzing one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub symbol: String,
    /// BLAKE3 over symbol, parameters and dataset hash.
    pub run_id: RunId,
    /// Identity of the config file the run came from, if any.
    #[serde(default)]
    pub config_id: Option<RunId>,
    pub params: StrategyParams,
    pub dataset_hash: String,
    pub bar_count: usize,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub short_sma: IndicatorSeries,
    pub long_sma: IndicatorSeries,
    pub rsi: IndicatorSeries,
    /// Last defined RSI value.
    pub latest_rsi: Option<f64>,
    pub signals: Vec<Signal>,
    pub backtest: BacktestOutcome,
    #[serde(default)]
    pub data_quality_warnings: Vec<String>,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Run the indicator engine, the signal generator and the backtest over one
/// normalized bar series.
///
/// Only invalid parameters fail the call. Empty or short input produces a
/// report with no signals and a `Failed` backtest.
pub fn analyze(
    symbol: &str,
    bars: &[Bar],
    params: &StrategyParams,
) -> Result<AnalysisReport, RunError> {
    params.validate()?;

    let short_sma = sma_series(bars, params.short_window);
    let long_sma = sma_series(bars, params.long_window);
    let rsi = rsi_series(bars, params.rsi_window);
    let latest_rsi = rsi.latest();
    let signals = generate_signals(bars, symbol, params);

    let backtest = match run_backtest(bars, params) {
        Ok(mut result) => {
            for trade in &mut result.trades {
                trade.symbol = symbol.to_string();
            }
            BacktestOutcome::Completed(result)
        }
        Err(e) => {
            warn!(symbol, error = %e, "backtest skipped");
            BacktestOutcome::Failed {
                reason: e.to_string(),
            }
        }
    };

    let dataset_hash = dataset_hash(bars);
    let run_id = fingerprint(symbol, params, &dataset_hash);

    Ok(AnalysisReport {
        schema_version: SCHEMA_VERSION,
        symbol: symbol.to_string(),
        run_id,
        config_id: None,
        params: params.clone(),
        dataset_hash,
        bar_count: bars.len(),
        start_date: bars.first().map(|b| b.date),
        end_date: bars.last().map(|b| b.date),
        short_sma,
        long_sma,
        rsi,
        latest_rsi,
        signals,
        backtest,
        data_quality_warnings: Vec::new(),
    })
}

/// Load the configured symbol through `source` and analyze it.
pub fn run_from_config(
    config: &RunConfig,
    source: &dyn BarSource,
) -> Result<AnalysisReport, RunError> {
    config.validate()?;
    let symbol = &config.data.symbol;
    info!(symbol = %symbol, config_id = %config.run_id(), "starting run");

    let loaded = load_bars(source, symbol)?;
    let mut report = analyze(symbol, &loaded.bars, &config.strategy)?;
    report.config_id = Some(config.run_id());
    report.data_quality_warnings = loaded.warnings();

    info!(
        symbol = %symbol,
        bars = report.bar_count,
        signals = report.signals.len(),
        backtest = report.backtest.result().is_some(),
        "run finished"
    );
    Ok(report)
}

/// Analyze several pre-loaded series in parallel. Results keep input order.
pub fn analyze_many(
    inputs: &[(String, Vec<Bar>)],
    params: &StrategyParams,
) -> Vec<Result<AnalysisReport, RunError>> {
    inputs
        .par_iter()
        .map(|(symbol, bars)| analyze(symbol, bars, params))
        .collect()
}

/// Load and analyze every `*.csv` in `dir` in parallel, sorted by symbol.
///
/// Fails only if the directory cannot be listed; per-symbol failures are
/// returned alongside the symbol.
pub fn run_batch(
    dir: &Path,
    params: &StrategyParams,
) -> Result<Vec<(String, Result<AnalysisReport, RunError>)>, RunError> {
    let files = discover_symbols(dir)?;
    info!(dir = %dir.display(), symbols = files.len(), "starting batch");

    let results = files
        .par_iter()
        .map(|(symbol, path)| {
            let source = CsvBarSource::new(path);
            let report = load_bars(&source, symbol)
                .map_err(RunError::from)
                .and_then(|loaded| {
                    let mut report = analyze(symbol, &loaded.bars, params)?;
                    report.data_quality_warnings = loaded.warnings();
                    Ok(report)
                });
            if let Err(e) = &report {
                warn!(symbol = %symbol, error = %e, "analysis failed");
            }
            (symbol.clone(), report)
        })
        .collect();
    Ok(results)
}

/// Content-addressed identity of an analysis: same symbol, parameters and
/// bars give the same id.
fn fingerprint(symbol: &str, params: &StrategyParams, dataset_hash: &str) -> RunId {
    let mut hasher = blake3::Hasher::new();
    hasher.update(symbol.as_bytes());
    hasher.update(&[0]);
    for window in [params.short_window, params.long_window, params.rsi_window] {
        hasher.update(&(window as u64).to_le_bytes());
    }
    hasher.update(&params.initial_capital.to_le_bytes());
    hasher.update(dataset_hash.as_bytes());
    hasher.finalize().to_hex().to_string()
}
