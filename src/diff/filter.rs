//! Select which files of a diff are sent for review.
//!
//! Deleted and binary files are always dropped. Exclusion patterns use
//! gitignore glob syntax, matched against the destination path.

use ignore::overrides::{Override, OverrideBuilder};
use tracing::debug;

use crate::models::diff::FileDiff;

use super::DiffError;

/// Split a comma-separated pattern list, dropping blank entries.
pub fn parse_patterns(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Compiled exclusion globs.
#[derive(Debug, Clone)]
pub struct PathFilter {
    excludes: Override,
}

impl PathFilter {
    /// Compile exclusion patterns.
    pub fn new(patterns: &[String]) -> Result<Self, DiffError> {
        let mut builder = OverrideBuilder::new(".");
        for pattern in patterns {
            builder
                .add(pattern)
                .map_err(|e| DiffError::InvalidPattern(format!("{pattern}: {e}")))?;
        }
        let excludes = builder
            .build()
            .map_err(|e| DiffError::InvalidPattern(e.to_string()))?;
        Ok(Self { excludes })
    }

    /// A filter that excludes nothing.
    pub fn empty() -> Self {
        Self {
            excludes: Override::empty(),
        }
    }

    /// Whether `path` matches any exclusion pattern.
    pub fn is_excluded(&self, path: &str) -> bool {
        // Override globs are whitelists, so a match on one means "excluded" here
        self.excludes.matched(path, false).is_whitelist()
    }
}

/// Keep the files that should be reviewed: not deleted, not binary, and
/// not excluded.
pub fn reviewable_files(files: Vec<FileDiff>, filter: &PathFilter) -> Vec<FileDiff> {
    files
        .into_iter()
        .filter(|file| match file.destination() {
            None => {
                debug!(path = %file.old_path, "skipping deleted file");
                false
            }
            Some(path) if file.is_binary => {
                debug!(path, "skipping binary file");
                false
            }
            Some(path) if filter.is_excluded(path) => {
                debug!(path, "skipping excluded file");
                false
            }
            Some(_) => true,
        })
        .collect()
}
