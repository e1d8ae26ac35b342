//! Batch configuration loading from runsum.toml.
//!
//! One file describes a whole aggregation batch: where each model's raw
//! results live and where the summary tables go.
//!
//! ## Example
//!
//! ```toml
//! output_dir = "outputs"
//!
//! [[models]]
//! name = "svr"
//! input_root = "results/svr/raw"
//!
//! [[models]]
//! name = "rf"
//! input_root = "results/rf/raw"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// One model to aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSpec {
    pub name: String,
    pub input_root: PathBuf,
}

/// A full batch configuration.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Source file for this config (for display).
    pub source: Option<PathBuf>,
    /// Directory summary tables are written to.
    pub output_dir: PathBuf,
    /// Models to aggregate, in order.
    pub models: Vec<ModelSpec>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            source: None,
            output_dir: PathBuf::from("outputs"),
            models: Vec::new(),
        }
    }
}

/// Raw config as deserialized from TOML.
#[derive(Debug, Deserialize, Default)]
struct RawConfig {
    output_dir: Option<String>,
    models: Option<Vec<RawModel>>,
}

#[derive(Debug, Deserialize)]
struct RawModel {
    name: String,
    input_root: String,
}

impl BatchConfig {
    /// Load a batch configuration. A missing or malformed file is fatal -
    /// a batch run without a model list has nothing to do.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let raw: RawConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(Self::from_raw(raw, path.to_path_buf()))
    }

    fn from_raw(raw: RawConfig, source: PathBuf) -> Self {
        let defaults = Self::default();
        Self {
            source: Some(source),
            output_dir: raw
                .output_dir
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            models: raw
                .models
                .unwrap_or_default()
                .into_iter()
                .map(|m| ModelSpec {
                    name: m.name,
                    input_root: PathBuf::from(m.input_root),
                })
                .collect(),
        }
    }

    /// Output path of one model's graph-level summary table.
    pub fn graph_summary_path(&self, model: &str) -> PathBuf {
        self.output_dir.join(format!("{model}_graph_summary.csv"))
    }

    /// Output path of one model's pair-level summary table.
    pub fn pair_summary_path(&self, model: &str) -> PathBuf {
        self.output_dir.join(format!("{model}_pair_summary.csv"))
    }

    /// Format config for display at the start of a batch run.
    pub fn display_summary(&self) -> String {
        let mut lines = Vec::new();

        if let Some(ref source) = self.source {
            lines.push(format!("   Config: {}", source.display()));
        } else {
            lines.push("   Config: (defaults)".to_string());
        }
        lines.push(format!("   Output dir: {}", self.output_dir.display()));

        let names: Vec<_> = self.models.iter().map(|m| m.name.as_str()).collect();
        lines.push(format!("   Models: {}", names.join(", ")));

        lines.join("\n")
    }
}
