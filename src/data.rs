//! CSV loading and cleaning for the raw sensor log.
//!
//! The logger emits either comma- or semicolon-delimited files, with numbers
//! sometimes written in decimal-comma form and grouped with U+202F narrow
//! no-break spaces. Loading is best effort: malformed lines and cells that
//! refuse to parse are dropped without complaint, and only the surviving row
//! count is reported to the caller.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::NaiveDateTime;
use thiserror::Error;

/// Numeric columns coerced when present in the header.
pub const SENSOR_COLUMNS: [&str; 4] = ["do_mg_L", "voltage", "ph", "temperature"];

const TIMESTAMP_COLUMN: &str = "timestamp";
const SNIFF_BYTES: usize = 2048;

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d.%m.%Y %H:%M:%S",
];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {0}: {1}")]
    Open(String, #[source] std::io::Error),

    #[error("failed to read CSV header: {0}")]
    Header(String),

    #[error("column '{0}' not found")]
    MissingColumn(String),
}

/// Cleaned, time-sorted sensor readings in columnar form.
///
/// Every row is guaranteed to carry a timestamp and a target value; the other
/// recognized sensor columns keep per-cell gaps.
#[derive(Debug, Clone)]
pub struct SensorTable {
    pub timestamps: Vec<NaiveDateTime>,
    pub target: Vec<f64>,
    pub extras: BTreeMap<String, Vec<Option<f64>>>,
}

impl SensorTable {
    pub fn len(&self) -> usize {
        self.target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }
}

/// Load a sensor CSV, auto-detecting the delimiter and normalizing numbers.
///
/// Rows missing a parseable timestamp or target value are discarded, and the
/// remainder is sorted ascending by timestamp so downstream lagging never
/// looks into the future.
pub fn smart_read_csv(path: &Path, target: &str) -> Result<SensorTable, LoadError> {
    let delimiter = sniff_delimiter(path)?;

    let file =
        File::open(path).map_err(|e| LoadError::Open(path.display().to_string(), e))?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let headers = reader
        .headers()
        .map_err(|e| LoadError::Header(e.to_string()))?
        .clone();
    let ts_idx = headers
        .iter()
        .position(|h| h == TIMESTAMP_COLUMN)
        .ok_or_else(|| LoadError::MissingColumn(TIMESTAMP_COLUMN.to_string()))?;
    let target_idx = headers
        .iter()
        .position(|h| h == target)
        .ok_or_else(|| LoadError::MissingColumn(target.to_string()))?;

    // Other recognized sensor columns, kept as optional cells.
    let extra_cols: Vec<(String, usize)> = SENSOR_COLUMNS
        .iter()
        .filter(|&&c| c != target)
        .filter_map(|c| {
            headers
                .iter()
                .position(|h| h == *c)
                .map(|i| ((*c).to_string(), i))
        })
        .collect();

    let mut rows: Vec<(NaiveDateTime, f64, Vec<Option<f64>>)> = Vec::new();
    for record in reader.records() {
        // Malformed line, skip.
        let Ok(record) = record else { continue };

        let ts = record.get(ts_idx).and_then(parse_timestamp);
        let y = record.get(target_idx).and_then(coerce_numeric);
        let (Some(ts), Some(y)) = (ts, y) else { continue };

        let extras = extra_cols
            .iter()
            .map(|(_, idx)| record.get(*idx).and_then(coerce_numeric))
            .collect();
        rows.push((ts, y, extras));
    }

    rows.sort_by_key(|(ts, _, _)| *ts);

    let mut timestamps = Vec::with_capacity(rows.len());
    let mut target_values = Vec::with_capacity(rows.len());
    let mut extra_values: Vec<Vec<Option<f64>>> =
        extra_cols.iter().map(|_| Vec::with_capacity(rows.len())).collect();
    for (ts, y, extras) in rows {
        timestamps.push(ts);
        target_values.push(y);
        for (col, value) in extra_values.iter_mut().zip(extras) {
            col.push(value);
        }
    }

    Ok(SensorTable {
        timestamps,
        target: target_values,
        extras: extra_cols
            .into_iter()
            .map(|(name, _)| name)
            .zip(extra_values)
            .collect(),
    })
}

/// Pick the delimiter by counting candidates in the first couple of KiB.
fn sniff_delimiter(path: &Path) -> Result<u8, LoadError> {
    let file =
        File::open(path).map_err(|e| LoadError::Open(path.display().to_string(), e))?;
    let mut head = Vec::with_capacity(SNIFF_BYTES);
    file.take(SNIFF_BYTES as u64)
        .read_to_end(&mut head)
        .map_err(|e| LoadError::Open(path.display().to_string(), e))?;

    let semicolons = head.iter().filter(|b| **b == b';').count();
    let commas = head.iter().filter(|b| **b == b',').count();
    Ok(if semicolons > commas { b';' } else { b',' })
}

/// Normalize decimal commas and U+202F group separators, then parse.
fn coerce_numeric(cell: &str) -> Option<f64> {
    let cleaned = cell.trim().replace(',', ".").replace('\u{202f}', "");
    cleaned.parse::<f64>().ok()
}

fn parse_timestamp(cell: &str) -> Option<NaiveDateTime> {
    let cell = cell.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(cell) {
        return Some(dt.naive_utc());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(cell, fmt).ok())
}
