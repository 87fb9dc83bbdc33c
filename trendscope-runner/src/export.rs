//! Reporting and export: JSON, CSV, and Markdown artifact generation.
//!
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: signal list, trade log and equity curve for external tools
//! - **Markdown**: human-readable single-run report
//!
//! All persisted reports include a `schema_version` field. Newer versions
//! are rejected on load.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::info;
use trendscope_core::domain::Signal;
use trendscope_core::BacktestResult;

use crate::runner::{AnalysisReport, BacktestOutcome, SCHEMA_VERSION};

/// Length of the run-id prefix used in artifact directory names.
const RUN_ID_PREFIX_LEN: usize = 12;

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize an `AnalysisReport` to pretty JSON.
pub fn export_json(report: &AnalysisReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize AnalysisReport to JSON")
}

/// Deserialize an `AnalysisReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<AnalysisReport> {
    let report: AnalysisReport =
        serde_json::from_str(json).context("failed to deserialize AnalysisReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export a signal or trade list as CSV.
///
/// Columns: date, symbol, kind, price, strategy
pub fn export_signals_csv(signals: &[Signal]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "symbol", "kind", "price", "strategy"])?;
    for s in signals {
        wtr.write_record([
            &s.date.to_string(),
            &s.symbol,
            &s.kind.to_string(),
            &format!("{:.6}", s.price),
            &s.strategy,
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export an equity curve as CSV with date, multiplier and value columns.
/// `value` is the multiplier scaled by the initial capital.
pub fn export_equity_csv(result: &BacktestResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "equity", "value"])?;
    for (date, eq) in &result.equity_curve {
        wtr.write_record([
            &date.to_string(),
            &format!("{:.8}", eq),
            &format!("{:.2}", eq * result.initial_capital),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Directory name for a report's artifacts: `{symbol}_{run_id prefix}`.
pub fn artifact_dir_name(report: &AnalysisReport) -> String {
    let prefix: String = report.run_id.chars().take(RUN_ID_PREFIX_LEN).collect();
    format!("{}_{}", report.symbol, prefix)
}

/// Save the full artifact set for one analysis.
///
/// Creates `{symbol}_{run_id prefix}/` under `output_dir` containing:
/// - `report.json`: the full `AnalysisReport`
/// - `report.md`: Markdown summary
/// - `signals.csv`: crossover signals
/// - `trades.csv`: backtest position changes (header only if the backtest failed)
/// - `equity.csv`: dated equity curve (header only if the backtest failed)
///
/// Re-saving the same analysis overwrites the same directory. Returns the
/// path to the directory.
pub fn save_artifacts(report: &AnalysisReport, output_dir: &Path) -> Result<PathBuf> {
    let run_dir = output_dir.join(artifact_dir_name(report));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let write = |name: &str, contents: String| -> Result<()> {
        let path = run_dir.join(name);
        std::fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))
    };

    write("report.json", export_json(report)?)?;
    write("report.md", generate_report(report))?;
    write("signals.csv", export_signals_csv(&report.signals)?)?;

    let (trades, equity) = match report.backtest.result() {
        Some(result) => (
            export_signals_csv(&result.trades)?,
            export_equity_csv(result)?,
        ),
        None => (
            export_signals_csv(&[])?,
            "date,equity,value\n".to_string(),
        ),
    };
    write("trades.csv", trades)?;
    write("equity.csv", equity)?;

    info!(symbol = %report.symbol, dir = %run_dir.display(), "saved artifacts");
    Ok(run_dir)
}

/// Load an `AnalysisReport` from an artifact directory's report.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<AnalysisReport> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

// ─── Markdown report ────────────────────────────────────────────────

/// Generate a Markdown report for a single analysis.
pub fn generate_report(report: &AnalysisReport) -> String {
    let mut md = String::with_capacity(2048);
    let fmt_date = |d: Option<chrono::NaiveDate>| d.map_or_else(|| "-".to_string(), |d| d.to_string());

    md.push_str("# Analysis Report\n\n");

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    let _ = writeln!(md, "| Symbol | {} |", report.symbol);
    let _ = writeln!(
        md,
        "| Period | {} to {} |",
        fmt_date(report.start_date),
        fmt_date(report.end_date)
    );
    let _ = writeln!(md, "| Bars | {} |", report.bar_count);
    let _ = writeln!(
        md,
        "| Windows | SMA {} / {}, RSI {} |",
        report.params.short_window, report.params.long_window, report.params.rsi_window
    );
    let _ = writeln!(md, "| Initial Capital | ${:.0} |", report.params.initial_capital);
    let _ = writeln!(md, "| Run ID | {} |", report.run_id);
    let _ = writeln!(md, "| Dataset Hash | {} |", report.dataset_hash);
    md.push('\n');

    md.push_str("## Indicators\n\n");
    md.push_str("| Indicator | Latest |\n");
    md.push_str("| --- | ---: |\n");
    for series in [&report.short_sma, &report.long_sma, &report.rsi] {
        let latest = series
            .latest()
            .map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
        let _ = writeln!(md, "| {} | {} |", series.name, latest);
    }
    md.push('\n');

    let _ = writeln!(md, "## Signals ({})\n", report.signals.len());
    for s in &report.signals {
        let _ = writeln!(md, "- {} {} @ {:.2}", s.date, s.kind, s.price);
    }
    if !report.signals.is_empty() {
        md.push('\n');
    }

    md.push_str("## Performance Summary\n\n");
    match &report.backtest {
        BacktestOutcome::Completed(r) => {
            md.push_str("| Metric | Value |\n");
            md.push_str("| --- | --- |\n");
            let _ = writeln!(md, "| Total Return | {:.2}% |", r.total_return * 100.0);
            let _ = writeln!(md, "| Annualized Return | {:.2}% |", r.annualized_return * 100.0);
            let _ = writeln!(md, "| Buy & Hold | {:.2}% |", r.benchmark_return * 100.0);
            let _ = writeln!(md, "| Sharpe | {:.3} |", r.sharpe_ratio);
            let _ = writeln!(md, "| Max Drawdown | {:.2}% |", r.max_drawdown * 100.0);
            let _ = writeln!(md, "| Final Value | ${:.2} |", r.final_value);
            let _ = writeln!(md, "| Position Changes | {} |", r.trades.len());
        }
        BacktestOutcome::Failed { reason } => {
            let _ = writeln!(md, "Backtest not run: {reason}");
        }
    }
    md.push('\n');

    if !report.data_quality_warnings.is_empty() {
        md.push_str("## Data Quality\n\n");
        for warn in &report.data_quality_warnings {
            let _ = writeln!(md, "- {warn}");
        }
        md.push('\n');
    }

    md
}
