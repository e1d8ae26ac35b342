//! One result artifact document -> one `ResultArtifact`.
//!
//! ## Document format
//!
//! ```json
//! {
//!   "metadata": {"condition": "topk", "alpha": 100, "seed": 3, ...},
//!   "results": [
//!     {"mse": 4.0, "test_samples": 10},
//!     {"mse": 16.0, "test_samples": 10}
//!   ]
//! }
//! ```
//!
//! A document is rejected (non-fatally) when it is not parseable JSON,
//! when the metadata object is absent or empty, when no usable condition
//! is declared, or when the results field is not sequence-shaped. The
//! metadata object may carry extra fields beyond the known parameter
//! keys; those are ignored.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::types::{Condition, MetadataKey, PerTargetMeasurement, ResultArtifact};

/// Why one artifact produced zero rows.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The file could not be read.
    Unreadable(String),
    /// The document is not parseable JSON of the expected shape.
    InvalidDocument(String),
    /// The metadata object is absent or empty.
    EmptyMetadata,
    /// The metadata carries no usable `condition` value.
    MissingCondition,
    /// The results field is absent, not a sequence, or holds an element
    /// that is not measurement-shaped.
    BadMeasurements(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unreadable(err) => write!(f, "unreadable file ({err})"),
            SkipReason::InvalidDocument(err) => write!(f, "invalid document ({err})"),
            SkipReason::EmptyMetadata => write!(f, "metadata object absent or empty"),
            SkipReason::MissingCondition => write!(f, "no usable condition in metadata"),
            SkipReason::BadMeasurements(err) => write!(f, "bad results field ({err})"),
        }
    }
}

/// A skipped artifact: which file, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactSkip {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Raw top-level document shape. Both fields are validated by hand so a
/// missing or mistyped field becomes a skip reason, not a serde error
/// string about the whole document.
#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
    #[serde(default)]
    results: Option<Value>,
}

/// Load one artifact. All failures are non-fatal skips; the caller
/// records them and continues with the remaining artifacts.
pub fn load_artifact(path: &Path) -> Result<ResultArtifact, ArtifactSkip> {
    let skip = |reason: SkipReason| ArtifactSkip {
        path: path.to_path_buf(),
        reason,
    };

    let text = std::fs::read_to_string(path)
        .map_err(|err| skip(SkipReason::Unreadable(err.to_string())))?;

    let doc: RawDocument = serde_json::from_str(&text)
        .map_err(|err| skip(SkipReason::InvalidDocument(err.to_string())))?;

    let metadata = match doc.metadata {
        Some(map) if !map.is_empty() => map,
        _ => return Err(skip(SkipReason::EmptyMetadata)),
    };

    let key = metadata_key(&metadata).map_err(skip)?;

    let measurements = match doc.results {
        Some(Value::Array(items)) => parse_measurements(items).map_err(skip)?,
        Some(_) => return Err(skip(SkipReason::BadMeasurements("not a sequence".into()))),
        None => return Err(skip(SkipReason::BadMeasurements("field missing".into()))),
    };

    Ok(ResultArtifact { key, measurements })
}

/// Extract the known parameter keys from a metadata object. Unknown keys
/// are ignored; absent or null parameters stay unset.
fn metadata_key(map: &Map<String, Value>) -> Result<MetadataKey, SkipReason> {
    let condition = map
        .get("condition")
        .and_then(Value::as_str)
        .and_then(Condition::parse)
        .ok_or(SkipReason::MissingCondition)?;

    Ok(MetadataKey {
        condition,
        alpha: real_param(map, "alpha"),
        seed: integer_param(map, "seed"),
        top_k: integer_param(map, "top_k"),
        bottom_k: integer_param(map, "bottom_k"),
        max_samples: integer_param(map, "max_samples"),
        epochs: integer_param(map, "epochs"),
        batch_size: integer_param(map, "batch_size"),
        lr: real_param(map, "lr"),
    })
}

fn real_param(map: &Map<String, Value>, name: &str) -> Option<f64> {
    map.get(name).and_then(Value::as_f64)
}

/// Integer parameters sometimes arrive as floats (a round-tripped 100.0);
/// integral floats are accepted, anything else stays unset.
fn integer_param(map: &Map<String, Value>, name: &str) -> Option<i64> {
    let value = map.get(name)?;
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

fn parse_measurements(items: Vec<Value>) -> Result<Vec<PerTargetMeasurement>, SkipReason> {
    items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item)
                .map_err(|err| SkipReason::BadMeasurements(err.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("runsum_test_parser");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_valid_artifact() {
        let path = write_temp(
            "valid.json",
            r#"{
                "metadata": {"condition": "topk", "alpha": 50, "seed": 1, "extra": "ignored"},
                "results": [{"mse": 4.0, "test_samples": 10}, {"mse": 16.0, "test_samples": 10}]
            }"#,
        );

        let artifact = load_artifact(&path).unwrap();
        assert_eq!(artifact.key.condition, Condition::Topk);
        assert_eq!(artifact.key.alpha, Some(50.0));
        assert_eq!(artifact.key.seed, Some(1));
        assert_eq!(artifact.key.top_k, None);
        assert_eq!(artifact.measurements.len(), 2);
        assert_eq!(artifact.measurements[0].mse, Some(4.0));
    }

    #[test]
    fn test_invalid_json_is_skip() {
        let path = write_temp("truncated.json", r#"{"metadata": {"cond"#);
        let skip = load_artifact(&path).unwrap_err();
        assert!(matches!(skip.reason, SkipReason::InvalidDocument(_)));
        assert_eq!(skip.path, path);
    }

    #[test]
    fn test_empty_metadata_is_skip() {
        let path = write_temp("empty_meta.json", r#"{"metadata": {}, "results": []}"#);
        let skip = load_artifact(&path).unwrap_err();
        assert_eq!(skip.reason, SkipReason::EmptyMetadata);

        let path = write_temp("no_meta.json", r#"{"results": []}"#);
        let skip = load_artifact(&path).unwrap_err();
        assert_eq!(skip.reason, SkipReason::EmptyMetadata);
    }

    #[test]
    fn test_unknown_condition_is_skip() {
        let path = write_temp(
            "bad_cond.json",
            r#"{"metadata": {"condition": "middlek", "seed": 1}, "results": []}"#,
        );
        let skip = load_artifact(&path).unwrap_err();
        assert_eq!(skip.reason, SkipReason::MissingCondition);
    }

    #[test]
    fn test_results_not_a_sequence_is_skip() {
        let path = write_temp(
            "bad_results.json",
            r#"{"metadata": {"condition": "all", "seed": 1}, "results": {"mse": 1.0}}"#,
        );
        let skip = load_artifact(&path).unwrap_err();
        assert!(matches!(skip.reason, SkipReason::BadMeasurements(_)));

        let path = write_temp(
            "no_results.json",
            r#"{"metadata": {"condition": "all", "seed": 1}}"#,
        );
        let skip = load_artifact(&path).unwrap_err();
        assert!(matches!(skip.reason, SkipReason::BadMeasurements(_)));
    }

    #[test]
    fn test_null_and_missing_measurement_fields() {
        let path = write_temp(
            "nulls.json",
            r#"{
                "metadata": {"condition": "all", "seed": 2},
                "results": [{"mse": null}, {}, {"mse": 9.0}]
            }"#,
        );
        let artifact = load_artifact(&path).unwrap();
        assert_eq!(artifact.measurements[0].mse, None);
        assert_eq!(artifact.measurements[1].mse, None);
        assert_eq!(artifact.measurements[2].mse, Some(9.0));
    }

    #[test]
    fn test_integral_float_params() {
        let path = write_temp(
            "float_ints.json",
            r#"{
                "metadata": {"condition": "topk", "alpha": 100.0, "seed": 3.0, "top_k": 100.0},
                "results": []
            }"#,
        );
        let artifact = load_artifact(&path).unwrap();
        assert_eq!(artifact.key.seed, Some(3));
        assert_eq!(artifact.key.top_k, Some(100));
        assert_eq!(artifact.key.alpha, Some(100.0));
    }

    #[test]
    fn test_missing_file_is_skip() {
        let skip = load_artifact(Path::new("/nonexistent/runsum/artifact.json")).unwrap_err();
        assert!(matches!(skip.reason, SkipReason::Unreadable(_)));
    }
}
