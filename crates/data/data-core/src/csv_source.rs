//! CSV bar loader
//!
//! Reads `BTC-Hourly.csv`-shaped exports: an optional banner line, a header,
//! then one bar per row. Rows with a missing, unparsable, NaN or infinite
//! field are dropped; the rest are sorted by timestamp with duplicate
//! timestamps removed (the first row wins).

use std::fs::File;
use std::io::{BufRead, BufReader, Chain, Cursor, Read};
use std::path::{Path, PathBuf};

use data_api::CsvConfig;
use data_spi::{DataError, DataSource, LoadStats, Result};
use outlier_spi::{Record, Series};
use tracing::{debug, info, warn};

/// Dropped rows logged individually before switching to a summary.
const MAX_ROW_WARNINGS: usize = 5;

/// [`DataSource`] backed by a CSV file.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    config: CsvConfig,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>, config: CsvConfig) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }

    /// Source with the default column mapping.
    pub fn with_defaults(path: impl Into<PathBuf>) -> Self {
        Self::new(path, CsvConfig::default())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &CsvConfig {
        &self.config
    }

    /// Load a series from in-memory or streamed CSV.
    pub fn from_reader<R: Read>(reader: R, config: &CsvConfig) -> Result<Series> {
        read_series(reader, config).map(|(series, _)| series)
    }
}

impl DataSource for CsvSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn load_with_stats(&self) -> Result<(Series, LoadStats)> {
        let file = File::open(&self.path)
            .map_err(|e| DataError::Io(format!("{}: {}", self.path.display(), e)))?;
        let (series, stats) = read_series(file, &self.config)?;
        info!(
            path = %self.path.display(),
            rows = stats.rows_read,
            kept = series.len(),
            dropped = stats.dropped(),
            "loaded bars"
        );
        Ok((series, stats))
    }
}

/// Parse, cleanse, sort and deduplicate.
pub fn read_series<R: Read>(reader: R, config: &CsvConfig) -> Result<(Series, LoadStats)> {
    config.validate()?;
    let (input, skipped) = skip_banner(BufReader::new(reader), config)?;

    let mut csv = csv::ReaderBuilder::new()
        .delimiter(config.delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = csv
        .headers()
        .map_err(|e| DataError::Csv(e.to_string()))?
        .clone();
    let indices = column_indices(&headers, config)?;

    let mut stats = LoadStats::default();
    let mut records = Vec::new();
    for row in csv.records() {
        let row = row.map_err(|e| DataError::Csv(e.to_string()))?;
        stats.rows_read += 1;
        let line = row.position().map_or(0, |p| p.line()) + skipped;

        match parse_row(&row, &indices) {
            Ok(record) => records.push(record),
            Err(reason) if config.strict => return Err(DataError::InvalidRow { line, reason }),
            Err(reason) => {
                stats.dropped_invalid += 1;
                if stats.dropped_invalid <= MAX_ROW_WARNINGS {
                    warn!(line, %reason, "dropping row");
                }
            }
        }
    }
    if stats.dropped_invalid > MAX_ROW_WARNINGS {
        warn!(
            dropped = stats.dropped_invalid,
            "dropped rows with missing or non-finite fields"
        );
    }

    let parsed = records.len();
    let series = Series::from_unsorted(records)?;
    stats.dropped_duplicate = parsed - series.len();
    if stats.dropped_duplicate > 0 {
        warn!(dropped = stats.dropped_duplicate, "dropped rows with duplicate timestamps");
    }

    if series.is_empty() {
        return Err(DataError::NoData);
    }
    debug!(rows = stats.rows_read, kept = series.len(), "parsed csv");
    Ok((series, stats))
}

/// Drop a leading non-header line, then hand back the remaining stream and
/// the number of lines skipped.
fn skip_banner<R: BufRead>(
    mut reader: R,
    config: &CsvConfig,
) -> Result<(Chain<Cursor<Vec<u8>>, R>, u64)> {
    let mut first = String::new();
    reader
        .read_line(&mut first)
        .map_err(|e| DataError::Io(e.to_string()))?;

    if config.skip_banner && !first.trim().is_empty() && !is_header(&first, config) {
        debug!(banner = first.trim(), "skipping banner line");
        return Ok((Cursor::new(Vec::new()).chain(reader), 1));
    }
    Ok((Cursor::new(first.into_bytes()).chain(reader), 0))
}

fn is_header(line: &str, config: &CsvConfig) -> bool {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(config.delimiter)
        .trim(csv::Trim::All)
        .from_reader(line.as_bytes());
    match csv.records().next() {
        Some(Ok(fields)) => fields.iter().any(|f| f == config.timestamp_column),
        _ => false,
    }
}

/// Positions of timestamp, price, BTC volume and USD volume.
fn column_indices(headers: &csv::StringRecord, config: &CsvConfig) -> Result<[usize; 4]> {
    let mut indices = [0; 4];
    for (slot, name) in indices.iter_mut().zip(config.required_columns()) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))?;
    }
    Ok(indices)
}

fn parse_row(row: &csv::StringRecord, indices: &[usize; 4]) -> std::result::Result<Record, String> {
    let [ts, price, vol_btc, vol_usd] = *indices;
    Ok(Record::new(
        parse_timestamp(field(row, ts)?)?,
        parse_finite(field(row, price)?)?,
        parse_finite(field(row, vol_btc)?)?,
        parse_finite(field(row, vol_usd)?)?,
    ))
}

fn field(row: &csv::StringRecord, index: usize) -> std::result::Result<&str, String> {
    match row.get(index) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(format!("field {} is missing", index + 1)),
    }
}

/// Integer seconds; a float with no fractional part is accepted too.
fn parse_timestamp(raw: &str) -> std::result::Result<i64, String> {
    if let Ok(ts) = raw.parse::<i64>() {
        return Ok(ts);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(v as i64),
        _ => Err(format!("timestamp '{}' is not whole seconds", raw)),
    }
}

fn parse_finite(raw: &str) -> std::result::Result<f64, String> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        Ok(v) => Err(format!("value {} is not finite", v)),
        Err(_) => Err(format!("'{}' is not a number", raw)),
    }
}
