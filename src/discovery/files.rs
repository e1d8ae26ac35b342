//! Recursive discovery of result artifacts under a root directory.
//!
//! Design rationale:
//! - The `ignore` crate's parallel walker is fast on deep result trees
//!   and battle-tested from ripgrep.
//! - Git-derived filters are disabled: result directories are routinely
//!   listed in .gitignore, and an artifact must never disappear from a
//!   summary because of version-control hygiene.
//! - Results are sorted so "last write wins" on key collisions depends on
//!   path order, not on filesystem enumeration order.

use std::path::{Path, PathBuf};

use anyhow::Result;
use ignore::WalkBuilder;

/// File extension of result artifacts.
pub const ARTIFACT_EXTENSION: &str = "json";

/// Find result artifacts under `root`, recursively.
///
/// Returns a sorted list of paths with the artifact extension. An empty
/// list is Ok, not an error: callers treat it as a terminal, reportable
/// condition for that root without halting a multi-model batch. A
/// nonexistent root is an error.
pub fn find_result_files(root: &Path) -> Result<Vec<PathBuf>> {
    // A single-file root is accepted if it looks like an artifact.
    if root.is_file() {
        if has_artifact_extension(root) {
            return Ok(vec![root.to_path_buf()]);
        }
        return Ok(vec![]);
    }

    if !root.is_dir() {
        anyhow::bail!("Input root does not exist: {}", root.display());
    }

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .require_git(false)
        .follow_links(false)
        .threads(0)
        .build_parallel();

    let files = std::sync::Mutex::new(Vec::new());

    walker.run(|| {
        Box::new(|entry_result| {
            match entry_result {
                Ok(entry) => {
                    let path = entry.path();

                    if !path.is_file() || !has_artifact_extension(path) {
                        return ignore::WalkState::Continue;
                    }

                    if let Ok(mut files) = files.lock() {
                        files.push(path.to_path_buf());
                    }

                    ignore::WalkState::Continue
                }
                // Unreadable entries (permissions, broken symlinks) are
                // skipped; a partial listing beats aborting the batch.
                Err(_) => ignore::WalkState::Continue,
            }
        })
    });

    let mut files = files
        .into_inner()
        .map_err(|_| anyhow::anyhow!("Failed to unwrap mutex"))?;

    files.sort();

    Ok(files)
}

fn has_artifact_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(ARTIFACT_EXTENSION))
        .unwrap_or(false)
}
