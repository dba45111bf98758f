//! Fan-in of per-file outcomes into one aggregated `paths` mapping.
//!
//! The fold is single-threaded and ordered: file order, then fragment order, then tag
//! order. A path supplied again later overwrites the earlier definition wholesale.

use crate::decoder::DecodedFragment;
use crate::error::Error;
use log::{debug, info};
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

/// Outcome of processing a single input file.
#[derive(Debug)]
pub struct FileResult {
    pub source_file: PathBuf,
    pub outcome: FileOutcome,
}

/// Either the decoded fragments of a file or the reason it contributed nothing.
#[derive(Debug)]
pub enum FileOutcome {
    Success(Vec<DecodedFragment>),
    Failure(Error),
}

impl FileResult {
    /// Classifies a file by its surviving fragments.
    ///
    /// Zero fragments is a failure: `reason` when given (typically the first decode
    /// error seen in the file), [`Error::NoAnnotations`] otherwise.
    pub fn from_fragments(
        source_file: PathBuf,
        fragments: Vec<DecodedFragment>,
        reason: Option<Error>,
    ) -> Self {
        if fragments.is_empty() {
            Self::failure(source_file, reason.unwrap_or(Error::NoAnnotations))
        } else {
            Self {
                source_file,
                outcome: FileOutcome::Success(fragments),
            }
        }
    }

    pub fn failure(source_file: PathBuf, error: Error) -> Self {
        Self {
            source_file,
            outcome: FileOutcome::Failure(error),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, FileOutcome::Success(_))
    }

    /// Decoded fragments, empty for failures.
    pub fn fragments(&self) -> &[DecodedFragment] {
        match &self.outcome {
            FileOutcome::Success(fragments) => fragments,
            FileOutcome::Failure(_) => &[],
        }
    }

    /// Failure reason, `None` for successes.
    pub fn error(&self) -> Option<&Error> {
        match &self.outcome {
            FileOutcome::Success(_) => None,
            FileOutcome::Failure(e) => Some(e),
        }
    }
}

/// Result of one pipeline run: the `paths` mapping plus the success/failure ledger.
#[derive(Debug, Default)]
pub struct AggregatedDocument {
    /// Endpoint path to definition, in first-insertion order
    pub paths: Mapping,
    pub successes: Vec<FileResult>,
    pub failures: Vec<FileResult>,
}

impl AggregatedDocument {
    /// True when no path was aggregated.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Looks up the definition aggregated for `path`.
    pub fn path(&self, path: &str) -> Option<&Value> {
        self.paths.get(path)
    }

    /// Serializable summary of the success/failure ledger.
    pub fn report(&self) -> BuildReport {
        BuildReport {
            succeeded: self
                .successes
                .iter()
                .map(|r| SucceededFile {
                    file: display_path(&r.source_file),
                    paths: r
                        .fragments()
                        .iter()
                        .flat_map(|f| f.tags.iter().map(|t| t.path.clone()))
                        .collect(),
                })
                .collect(),
            failed: self
                .failures
                .iter()
                .map(|r| FailedFile {
                    file: display_path(&r.source_file),
                    reason: r.error().map(ToString::to_string).unwrap_or_default(),
                })
                .collect(),
        }
    }
}

/// Diagnostics for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub succeeded: Vec<SucceededFile>,
    pub failed: Vec<FailedFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SucceededFile {
    pub file: String,
    /// Paths contributed by the file, in source order
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFile {
    pub file: String,
    pub reason: String,
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

/// Folds per-file results into an [`AggregatedDocument`].
///
/// Never fails: when every file failed the result has empty `paths` and the complete
/// failure ledger.
pub fn aggregate(results: Vec<FileResult>) -> AggregatedDocument {
    let mut document = AggregatedDocument::default();

    for result in results {
        if result.is_success() {
            document.successes.push(result);
        } else {
            document.failures.push(result);
        }
    }

    let entries = document
        .successes
        .iter()
        .flat_map(|r| r.fragments())
        .flat_map(|f| f.tags.iter());

    for entry in entries {
        let previous = document
            .paths
            .insert(Value::String(entry.path.clone()), entry.definition.clone());
        if previous.is_some() {
            debug!("path {} redefined, keeping the later definition", entry.path);
        }
    }

    info!(
        "Aggregated {} paths from {} files ({} failed)",
        document.paths.len(),
        document.successes.len(),
        document.failures.len()
    );

    document
}
