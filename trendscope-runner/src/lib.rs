//! TrendScope Runner: run configuration, bar loading, orchestration, export.
//!
//! This crate builds on `trendscope-core` to provide:
//! - TOML run configuration with content-addressed run ids
//! - CSV bar loading behind a `BarSource` seam, with dataset fingerprinting
//! - Single-symbol and parallel multi-symbol analysis
//! - JSON, CSV and Markdown artifact export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;

pub use config::{ConfigError, DataConfig, OutputConfig, RunConfig, RunId};
pub use data_loader::{
    dataset_hash, discover_symbols, load_bars, load_csv, read_csv_bars, BarSource, CsvBarSource,
    LoadError, LoadedData,
};
pub use export::{
    export_equity_csv, export_json, export_signals_csv, generate_report, import_json,
    load_artifacts, save_artifacts,
};
pub use runner::{
    analyze, analyze_many, run_batch, run_from_config, AnalysisReport, BacktestOutcome, RunError,
    SCHEMA_VERSION,
};
