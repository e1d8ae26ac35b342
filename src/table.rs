//! Summary table persistence.
//!
//! One CSV per model and aggregation strategy: the nine metadata columns
//! followed by the strategy's statistics. Missing values - unset
//! parameters and NaN statistics - serialize as empty fields and parse
//! back as missing, the convention the downstream comparison layer
//! already speaks.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};

use crate::types::{Condition, GraphSummaryRow, MetadataKey, PairSummaryRow};

/// Metadata columns, in table order.
pub const PARAM_COLUMNS: [&str; 9] = [
    "condition",
    "alpha",
    "seed",
    "top_k",
    "bottom_k",
    "max_samples",
    "epochs",
    "batch_size",
    "lr",
];

/// Statistic columns of a graph-level table.
pub const GRAPH_STAT_COLUMNS: [&str; 5] = [
    "mse_mean",
    "mse_std",
    "rmse_mean",
    "rmse_std",
    "n_targets_used",
];

/// Statistic columns of a pair-level table.
pub const PAIR_STAT_COLUMNS: [&str; 1] = ["overall_mse"];

/// Write a graph-level summary table, creating parent directories.
pub fn write_graph_summary(path: &Path, rows: &[GraphSummaryRow]) -> Result<()> {
    let mut writer = open_writer(path)?;

    let mut header: Vec<&str> = PARAM_COLUMNS.to_vec();
    header.extend(GRAPH_STAT_COLUMNS);
    writer.write_record(&header)?;

    for row in rows {
        let mut record = key_fields(&row.key);
        record.push(fmt_f64(row.mse_mean));
        record.push(fmt_f64(row.mse_std));
        record.push(fmt_f64(row.rmse_mean));
        record.push(fmt_f64(row.rmse_std));
        record.push(row.n_targets_used.to_string());
        writer.write_record(&record)?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Write a pair-level summary table, creating parent directories.
pub fn write_pair_summary(path: &Path, rows: &[PairSummaryRow]) -> Result<()> {
    let mut writer = open_writer(path)?;

    let mut header: Vec<&str> = PARAM_COLUMNS.to_vec();
    header.extend(PAIR_STAT_COLUMNS);
    writer.write_record(&header)?;

    for row in rows {
        let mut record = key_fields(&row.key);
        record.push(fmt_f64(row.overall_mse));
        writer.write_record(&record)?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Read back a graph-level table written by [`write_graph_summary`].
pub fn read_graph_summary(path: &Path) -> Result<Vec<GraphSummaryRow>> {
    let mut reader = open_reader(path)?;
    let header = Header::from_reader(&mut reader)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("Malformed record in {}", path.display()))?;
        let key = read_key(&header, &record, path)?;
        rows.push(GraphSummaryRow {
            key,
            mse_mean: coerce_f64(header.field(&record, "mse_mean")),
            mse_std: coerce_f64(header.field(&record, "mse_std")),
            rmse_mean: coerce_f64(header.field(&record, "rmse_mean")),
            rmse_std: coerce_f64(header.field(&record, "rmse_std")),
            n_targets_used: header
                .field(&record, "n_targets_used")
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
        });
    }
    Ok(rows)
}

/// Read back a pair-level table written by [`write_pair_summary`].
pub fn read_pair_summary(path: &Path) -> Result<Vec<PairSummaryRow>> {
    let mut reader = open_reader(path)?;
    let header = Header::from_reader(&mut reader)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("Malformed record in {}", path.display()))?;
        let key = read_key(&header, &record, path)?;
        rows.push(PairSummaryRow {
            key,
            overall_mse: coerce_f64(header.field(&record, "overall_mse")),
        });
    }
    Ok(rows)
}

/// Header of a delimited table: column name -> position.
///
/// Lookups are by name so readers tolerate extra columns and reordered
/// tables from older runs.
pub struct Header {
    columns: Vec<String>,
}

impl Header {
    pub fn from_reader(reader: &mut csv::Reader<File>) -> Result<Self> {
        let columns = reader
            .headers()
            .context("Failed to read table header")?
            .iter()
            .map(str::to_string)
            .collect();
        Ok(Self { columns })
    }

    pub fn index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index(name).is_some()
    }

    /// Field of `record` under column `name`, if the column exists.
    pub fn field<'r>(&self, record: &'r csv::StringRecord, name: &str) -> Option<&'r str> {
        record.get(self.index(name)?)
    }
}

/// Empty or unparseable fields coerce to NaN (the `to_numeric` contract
/// the comparison layer expects).
pub fn coerce_f64(field: Option<&str>) -> f64 {
    parse_opt_f64(field).unwrap_or(f64::NAN)
}

/// Empty or unparseable fields are missing.
pub fn parse_opt_f64(field: Option<&str>) -> Option<f64> {
    let s = field?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse().ok()
}

/// Integer fields may have round-tripped through a float representation.
pub fn parse_opt_i64(field: Option<&str>) -> Option<i64> {
    let s = field?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<i64>().ok().or_else(|| {
        s.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

/// Finite values print plainly; NaN and infinities become empty fields.
pub fn fmt_f64(value: f64) -> String {
    if value.is_finite() {
        format!("{value}")
    } else {
        String::new()
    }
}

pub fn fmt_opt_f64(value: Option<f64>) -> String {
    value.map(fmt_f64).unwrap_or_default()
}

pub fn fmt_opt_i64(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn key_fields(key: &MetadataKey) -> Vec<String> {
    vec![
        key.condition.to_string(),
        fmt_opt_f64(key.alpha),
        fmt_opt_i64(key.seed),
        fmt_opt_i64(key.top_k),
        fmt_opt_i64(key.bottom_k),
        fmt_opt_i64(key.max_samples),
        fmt_opt_i64(key.epochs),
        fmt_opt_i64(key.batch_size),
        fmt_opt_f64(key.lr),
    ]
}

fn read_key(header: &Header, record: &csv::StringRecord, path: &Path) -> Result<MetadataKey> {
    let condition = header
        .field(record, "condition")
        .and_then(Condition::parse)
        .with_context(|| format!("Row without a valid condition in {}", path.display()))?;

    Ok(MetadataKey {
        condition,
        alpha: parse_opt_f64(header.field(record, "alpha")),
        seed: parse_opt_i64(header.field(record, "seed")),
        top_k: parse_opt_i64(header.field(record, "top_k")),
        bottom_k: parse_opt_i64(header.field(record, "bottom_k")),
        max_samples: parse_opt_i64(header.field(record, "max_samples")),
        epochs: parse_opt_i64(header.field(record, "epochs")),
        batch_size: parse_opt_i64(header.field(record, "batch_size")),
        lr: parse_opt_f64(header.field(record, "lr")),
    })
}

/// CSV writer with parent directories created.
pub(crate) fn open_writer(path: &Path) -> Result<csv::Writer<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    csv::Writer::from_path(path).with_context(|| format!("Failed to open {}", path.display()))
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>> {
    csv::ReaderBuilder::new()
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))
}
