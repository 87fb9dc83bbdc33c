//! End-to-end runner tests: CSV on disk → config → analysis → artifacts.

use std::fmt::Write as _;
use std::path::Path;

use trendscope_core::domain::SignalKind;
use trendscope_core::StrategyParams;
use trendscope_runner::{
    load_artifacts, run_batch, run_from_config, save_artifacts, BacktestOutcome, CsvBarSource,
    LoadError, RunConfig, RunError,
};

/// Write `closes` as a daily CSV, newest row first to exercise sorting.
fn write_csv(path: &Path, closes: &[f64]) {
    let base = chrono::NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
    let mut rows: Vec<String> = closes
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let date = base + chrono::Duration::days(i as i64);
            format!("{date},{c},{},{},{c},{}", c + 1.0, c - 1.0, 1000 + i)
        })
        .collect();
    rows.reverse();
    let mut text = String::from("date,open,high,low,close,volume\n");
    for row in rows {
        let _ = writeln!(text, "{row}");
    }
    std::fs::write(path, text).unwrap();
}

fn rising(n: usize) -> Vec<f64> {
    (0..n).map(|i| 100.0 + i as f64).collect()
}

fn wave(n: usize) -> Vec<f64> {
    (0..n).map(|i| 100.0 + (i as f64 * 0.15).sin() * 12.0).collect()
}

#[test]
fn config_file_run_produces_full_report() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("SPY.csv");
    write_csv(&csv_path, &rising(300));

    let toml_path = dir.path().join("run.toml");
    std::fs::write(
        &toml_path,
        format!(
            "[data]\nsymbol = \"SPY\"\npath = {:?}\n\n[strategy]\nshort_window = 50\nlong_window = 200\n",
            dir.path().to_string_lossy()
        ),
    )
    .unwrap();

    let config = RunConfig::from_file(&toml_path).unwrap();
    let source = CsvBarSource::new(&config.data.path);
    let report = run_from_config(&config, &source).unwrap();

    assert_eq!(report.bar_count, 300);
    assert_eq!(report.config_id, Some(config.run_id()));
    assert!(report.signals.is_empty());
    let result = report.backtest.result().unwrap();
    assert_eq!(result.trades.len(), 1);
    assert_eq!(result.trades[0].kind, SignalKind::Buy);
    assert_eq!(result.trades[0].symbol, "SPY");
    assert!(result.total_return > 0.0);
    assert_eq!(result.max_drawdown, 0.0);
}

#[test]
fn explicit_file_path_and_rejected_rows() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("prices.csv");
    write_csv(&csv_path, &wave(120));
    let mut text = std::fs::read_to_string(&csv_path).unwrap();
    text.push_str("2030-01-01,1,2,0.5,,10\n");
    text.push_str("garbage,1,2,0.5,1,10\n");
    std::fs::write(&csv_path, text).unwrap();

    let mut config = RunConfig::new("WAVE", &csv_path);
    config.strategy = StrategyParams::new(5, 20);
    let report = run_from_config(&config, &CsvBarSource::new(&csv_path)).unwrap();

    assert_eq!(report.bar_count, 120);
    assert_eq!(report.data_quality_warnings.len(), 2);
    assert!(!report.signals.is_empty());
    assert!(report.signals.iter().all(|s| s.symbol == "WAVE"));
}

#[test]
fn missing_symbol_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig::new("NOPE", dir.path());
    let err = run_from_config(&config, &CsvBarSource::new(dir.path())).unwrap_err();
    assert!(matches!(err, RunError::Data(LoadError::NotFound { .. })));
}

#[test]
fn header_only_csv_gives_failed_backtest() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("EMPTY.csv");
    std::fs::write(&csv_path, "date,open,high,low,close,volume\n").unwrap();

    let config = RunConfig::new("EMPTY", dir.path());
    let report = run_from_config(&config, &CsvBarSource::new(dir.path())).unwrap();
    assert_eq!(report.bar_count, 0);
    assert!(report.signals.is_empty());
    assert!(matches!(report.backtest, BacktestOutcome::Failed { .. }));
}

#[test]
fn artifacts_roundtrip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    std::fs::create_dir(&data).unwrap();
    write_csv(&data.join("QQQ.csv"), &wave(150));

    let mut config = RunConfig::new("QQQ", &data);
    config.strategy = StrategyParams::new(5, 30);
    let report = run_from_config(&config, &CsvBarSource::new(&data)).unwrap();

    let out = dir.path().join("results");
    let run_dir = save_artifacts(&report, &out).unwrap();
    for name in ["report.json", "report.md", "signals.csv", "trades.csv", "equity.csv"] {
        assert!(run_dir.join(name).is_file(), "missing {name}");
    }
    assert!(run_dir
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("QQQ_"));

    let equity = std::fs::read_to_string(run_dir.join("equity.csv")).unwrap();
    assert_eq!(equity.lines().count(), 150);

    let loaded = load_artifacts(&run_dir).unwrap();
    assert_eq!(loaded.run_id, report.run_id);
    assert_eq!(loaded.signals.len(), report.signals.len());

    // Same analysis, same directory.
    assert_eq!(save_artifacts(&report, &out).unwrap(), run_dir);
}

#[test]
fn batch_analyzes_every_csv() {
    let dir = tempfile::tempdir().unwrap();
    write_csv(&dir.path().join("BBB.csv"), &wave(100));
    write_csv(&dir.path().join("AAA.csv"), &rising(100));
    write_csv(&dir.path().join("CCC.csv"), &rising(10));
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let results = run_batch(dir.path(), &StrategyParams::new(5, 20)).unwrap();
    let symbols: Vec<&str> = results.iter().map(|(s, _)| s.as_str()).collect();
    assert_eq!(symbols, vec!["AAA", "BBB", "CCC"]);

    let ccc = results[2].1.as_ref().unwrap();
    assert!(ccc.backtest.result().is_none());
    assert!(results[0].1.as_ref().unwrap().backtest.result().is_some());
}

#[test]
fn batch_on_missing_dir_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent");
    assert!(matches!(
        run_batch(&missing, &StrategyParams::default()),
        Err(RunError::Data(LoadError::Io { .. }))
    ));
}
