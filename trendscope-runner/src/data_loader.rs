//! Bar loading for the runner.
//!
//! A [`BarSource`] supplies raw bars for a symbol; [`load_bars`] normalizes
//! them and fingerprints the result. The shipped source reads CSV files with
//! a `date,open,high,low,close,volume` header. Cells that are empty or fail to
//! parse are read as missing, so the row is rejected by the normalizer instead
//! of failing the whole file.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};
use trendscope_core::data::{normalize, EmptyPolicy, Rejection};
use trendscope_core::domain::{Bar, RawBar};
use trendscope_core::CoreError;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no data for '{symbol}' at {path}")]
    NotFound { symbol: String, path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Supplier of raw bars for a symbol.
///
/// Implementations may return an empty list when they have nothing; the
/// runner records that as an empty-input backtest rather than failing.
pub trait BarSource: Send + Sync {
    fn name(&self) -> &str;

    fn fetch(&self, symbol: &str) -> Result<Vec<RawBar>, LoadError>;
}

/// Reads bars from CSV: either one explicit file, or `<SYMBOL>.csv` inside a
/// directory.
#[derive(Debug, Clone)]
pub struct CsvBarSource {
    root: PathBuf,
}

impl CsvBarSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The file that holds `symbol`'s bars.
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        if self.root.is_dir() {
            self.root.join(format!("{symbol}.csv"))
        } else {
            self.root.clone()
        }
    }
}

impl BarSource for CsvBarSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(&self, symbol: &str) -> Result<Vec<RawBar>, LoadError> {
        let path = self.path_for(symbol);
        if !path.is_file() {
            return Err(LoadError::NotFound {
                symbol: symbol.to_string(),
                path,
            });
        }
        load_csv(&path)
    }
}

/// One CSV row as written. Unparseable cells become `None`.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Date", default, deserialize_with = "csv::invalid_option")]
    date: Option<NaiveDate>,
    #[serde(alias = "Open", default, deserialize_with = "csv::invalid_option")]
    open: Option<f64>,
    #[serde(alias = "High", default, deserialize_with = "csv::invalid_option")]
    high: Option<f64>,
    #[serde(alias = "Low", default, deserialize_with = "csv::invalid_option")]
    low: Option<f64>,
    #[serde(alias = "Close", default, deserialize_with = "csv::invalid_option")]
    close: Option<f64>,
    #[serde(alias = "Volume", default, deserialize_with = "csv::invalid_option")]
    volume: Option<f64>,
}

impl From<CsvRow> for RawBar {
    fn from(row: CsvRow) -> Self {
        RawBar {
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            // Fractional volumes are rounded; negative or non-finite read as missing.
            volume: row
                .volume
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(|v| v.round() as u64),
        }
    }
}

/// Parse raw bars from CSV text with a header row.
pub fn read_csv_bars<R: Read>(reader: R) -> Result<Vec<RawBar>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    rdr.deserialize::<CsvRow>()
        .map(|row| row.map(RawBar::from))
        .collect()
}

/// Parse raw bars from a CSV file.
pub fn load_csv(path: &Path) -> Result<Vec<RawBar>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let bars = read_csv_bars(file).map_err(|source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), rows = bars.len(), "read CSV bars");
    Ok(bars)
}

/// Normalized bars for one symbol, with data-quality provenance.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub symbol: String,
    pub bars: Vec<Bar>,
    /// Rows the normalizer dropped.
    pub rejected: Vec<Rejection>,
    /// Dataset hash for fingerprinting (BLAKE3 over all bar data).
    pub dataset_hash: String,
    /// Name of the source the bars came from.
    pub source: String,
}

impl LoadedData {
    /// Human-readable data-quality warnings, one per rejected row.
    pub fn warnings(&self) -> Vec<String> {
        self.rejected
            .iter()
            .map(|r| match r.date {
                Some(date) => format!("row {} ({date}): {}", r.index, r.reason),
                None => format!("row {}: {}", r.index, r.reason),
            })
            .collect()
    }
}

/// Fetch, normalize and fingerprint the bars for `symbol`.
///
/// An empty fetch is not an error here; downstream consumers decide.
pub fn load_bars(source: &dyn BarSource, symbol: &str) -> Result<LoadedData, LoadError> {
    let raw = source.fetch(symbol)?;
    let received = raw.len();
    let normalized = normalize(raw, EmptyPolicy::Allow)?;
    let dataset_hash = dataset_hash(&normalized.bars);

    info!(
        symbol,
        source = source.name(),
        received,
        bars = normalized.bars.len(),
        rejected = normalized.rejected.len(),
        "loaded bars"
    );

    Ok(LoadedData {
        symbol: symbol.to_string(),
        bars: normalized.bars,
        rejected: normalized.rejected,
        dataset_hash,
        source: source.name().to_string(),
    })
}

/// Compute a deterministic BLAKE3 hash over all bar data.
pub fn dataset_hash(bars: &[Bar]) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        hasher.update(bar.date.to_string().as_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Every `*.csv` file in `dir` as `(symbol, path)`, sorted by symbol.
/// The symbol is the file stem.
pub fn discover_symbols(dir: &Path) -> Result<Vec<(String, PathBuf)>, LoadError> {
    let io_err = |source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if !is_csv || !path.is_file() {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            found.push((stem.to_string(), path.clone()));
        }
    }
    found.sort();
    Ok(found)
}
