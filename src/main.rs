//! runsum CLI - experiment result aggregation and comparison
//!
//! Three entry points:
//!
//! 1. `aggregate`: one model, one input root, one summary table.
//! 2. `batch`: every model listed in runsum.toml, continuing past
//!    per-model terminal conditions (missing roots, empty results).
//! 3. `compare`: combine summary tables across models, broadcast
//!    alpha-independent rows over the observed alpha axis, and print
//!    grouped statistics.
//!
//! Exit is nonzero only on fatal errors: unwritable output, bad CLI
//! arguments, bad config. Malformed artifacts, empty roots and unusable
//! summary tables are warnings.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use owo_colors::OwoColorize;

use runsum::aggregate::{aggregate_graph_results, aggregate_pair_results};
use runsum::compare::{SummaryKind, run_comparison};
use runsum::config::BatchConfig;

/// Aggregate experiment result artifacts into comparable summary tables
///
/// Examples:
///   runsum aggregate --mode graph --model svr --input results/svr/raw --output outputs/svr_graph_summary.csv
///   runsum batch --config runsum.toml
///   runsum compare --mode pair --summary SVR=outputs/svr_pair_summary.csv --summary RF=outputs/rf_pair_summary.csv
#[derive(Parser, Debug)]
#[command(name = "runsum")]
#[command(version)]
#[command(about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Aggregate one model's result artifacts into a summary table
    Aggregate {
        /// Aggregation strategy
        #[arg(long, value_enum)]
        mode: Mode,

        /// Model name (used for display and table tagging)
        #[arg(long)]
        model: String,

        /// Root directory holding result artifacts
        #[arg(long)]
        input: PathBuf,

        /// Output CSV path (parent directories are created)
        #[arg(long)]
        output: PathBuf,
    },

    /// Aggregate every model listed in the batch config
    Batch {
        /// Batch configuration file
        #[arg(long, default_value = "runsum.toml")]
        config: PathBuf,

        /// Which aggregation strategies to run
        #[arg(long, value_enum, default_value = "both")]
        mode: BatchMode,
    },

    /// Combine summary tables, broadcast alpha, print grouped statistics
    Compare {
        /// Kind of summary tables being compared
        #[arg(long, value_enum)]
        mode: Mode,

        /// Summary table as NAME=PATH; repeat per model
        #[arg(long = "summary", value_name = "NAME=PATH", required = true)]
        summaries: Vec<String>,

        /// Optional CSV path for the grouped statistics
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Unweighted statistics per artifact (each target counts equally)
    Graph,
    /// Sample-count-weighted overall error per artifact
    Pair,
}

impl Mode {
    fn summary_kind(self) -> SummaryKind {
        match self {
            Mode::Graph => SummaryKind::Graph,
            Mode::Pair => SummaryKind::Pair,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMode {
    Graph,
    Pair,
    Both,
}

impl BatchMode {
    fn runs_graph(self) -> bool {
        matches!(self, BatchMode::Graph | BatchMode::Both)
    }
    fn runs_pair(self) -> bool {
        matches!(self, BatchMode::Pair | BatchMode::Both)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Aggregate {
            mode,
            model,
            input,
            output,
        } => match mode {
            Mode::Graph => {
                aggregate_graph_results(&model, &input, &output)?;
            }
            Mode::Pair => {
                aggregate_pair_results(&model, &input, &output)?;
            }
        },

        Command::Batch { config, mode } => run_batch(&config, mode)?,

        Command::Compare {
            mode,
            summaries,
            output,
        } => {
            let sources = summaries
                .iter()
                .map(|spec| parse_summary_spec(spec))
                .collect::<Result<Vec<_>>>()?;
            run_comparison(mode.summary_kind(), &sources, output.as_deref())?;
        }
    }

    Ok(())
}

fn run_batch(config_path: &Path, mode: BatchMode) -> Result<()> {
    let config = BatchConfig::load(config_path)?;
    println!("{}", config.display_summary());
    println!();

    if config.models.is_empty() {
        bail!("No models configured in {}", config_path.display());
    }

    for model in &config.models {
        // A missing root is this model's terminal condition, not the
        // batch's: warn and keep going.
        if !model.input_root.exists() {
            eprintln!(
                "{} input root '{}' for model '{}' does not exist. Continuing.",
                "warning:".yellow().bold(),
                model.input_root.display(),
                model.name
            );
            continue;
        }

        if mode.runs_graph() {
            aggregate_graph_results(
                &model.name,
                &model.input_root,
                &config.graph_summary_path(&model.name),
            )?;
        }
        if mode.runs_pair() {
            aggregate_pair_results(
                &model.name,
                &model.input_root,
                &config.pair_summary_path(&model.name),
            )?;
        }
    }

    Ok(())
}

/// Parse a `NAME=PATH` summary source specification.
fn parse_summary_spec(spec: &str) -> Result<(String, PathBuf)> {
    let (name, path) = spec
        .split_once('=')
        .with_context(|| format!("Expected NAME=PATH, got '{spec}'"))?;
    if name.is_empty() || path.is_empty() {
        bail!("Expected NAME=PATH, got '{spec}'");
    }
    Ok((name.to_string(), PathBuf::from(path)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_aggregate() {
        let cli = Cli::parse_from([
            "runsum",
            "aggregate",
            "--mode",
            "graph",
            "--model",
            "svr",
            "--input",
            "results/svr/raw",
            "--output",
            "outputs/svr_graph_summary.csv",
        ]);
        match cli.command {
            Command::Aggregate {
                mode,
                model,
                input,
                output,
            } => {
                assert_eq!(mode, Mode::Graph);
                assert_eq!(model, "svr");
                assert_eq!(input, PathBuf::from("results/svr/raw"));
                assert_eq!(output, PathBuf::from("outputs/svr_graph_summary.csv"));
            }
            other => panic!("Unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_batch_defaults() {
        let cli = Cli::parse_from(["runsum", "batch"]);
        match cli.command {
            Command::Batch { config, mode } => {
                assert_eq!(config, PathBuf::from("runsum.toml"));
                assert_eq!(mode, BatchMode::Both);
            }
            other => panic!("Unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_compare_multiple_summaries() {
        let cli = Cli::parse_from([
            "runsum",
            "compare",
            "--mode",
            "pair",
            "--summary",
            "SVR=outputs/svr_pair_summary.csv",
            "--summary",
            "RF=outputs/rf_pair_summary.csv",
        ]);
        match cli.command {
            Command::Compare {
                mode, summaries, ..
            } => {
                assert_eq!(mode, Mode::Pair);
                assert_eq!(summaries.len(), 2);
            }
            other => panic!("Unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_summary_spec() {
        let (name, path) = parse_summary_spec("SVR=outputs/svr.csv").unwrap();
        assert_eq!(name, "SVR");
        assert_eq!(path, PathBuf::from("outputs/svr.csv"));

        assert!(parse_summary_spec("no-equals-sign").is_err());
        assert!(parse_summary_spec("=path").is_err());
        assert!(parse_summary_spec("name=").is_err());
    }
}
