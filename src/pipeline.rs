//! Pipeline entry point: input normalization, concurrent per-file processing, fan-in.
//!
//! Every input file is read and decoded in its own tokio task. A semaphore caps how many
//! files are in flight at once. Each task owns exactly one [`FileResult`]; results are
//! collected in input order and folded by [`aggregate`] only after every task resolved.

use crate::aggregator::{aggregate, AggregatedDocument, FileResult};
use crate::decoder::{KeyPolicy, PayloadDecoder};
use crate::error::{Error, Result};
use crate::extractor::{AnnotationExtractor, DEFAULT_MARKER};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Default number of files processed concurrently.
pub const DEFAULT_MAX_CONCURRENCY: usize = 16;

/// The files to aggregate: a single path or a list of paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiEntries {
    One(String),
    Many(Vec<String>),
}

impl ApiEntries {
    /// Normalizes the entries into a list of paths.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if any entry is an empty string.
    pub fn into_paths(self) -> Result<Vec<PathBuf>> {
        let entries = match self {
            ApiEntries::One(entry) => vec![entry],
            ApiEntries::Many(entries) => entries,
        };

        if let Some(index) = entries.iter().position(|e| e.trim().is_empty()) {
            return Err(Error::Configuration(format!(
                "api entry #{} is an empty string",
                index
            )));
        }

        Ok(entries.into_iter().map(PathBuf::from).collect())
    }
}

impl From<&str> for ApiEntries {
    fn from(entry: &str) -> Self {
        ApiEntries::One(entry.to_string())
    }
}

impl From<String> for ApiEntries {
    fn from(entry: String) -> Self {
        ApiEntries::One(entry)
    }
}

impl From<Vec<String>> for ApiEntries {
    fn from(entries: Vec<String>) -> Self {
        ApiEntries::Many(entries)
    }
}

impl From<Vec<&str>> for ApiEntries {
    fn from(entries: Vec<&str>) -> Self {
        ApiEntries::Many(entries.into_iter().map(str::to_string).collect())
    }
}

impl From<&[PathBuf]> for ApiEntries {
    fn from(paths: &[PathBuf]) -> Self {
        ApiEntries::Many(paths.iter().map(|p| p.to_string_lossy().into_owned()).collect())
    }
}

impl From<Vec<PathBuf>> for ApiEntries {
    fn from(paths: Vec<PathBuf>) -> Self {
        ApiEntries::from(paths.as_slice())
    }
}

/// Type guard for untyped input such as a configuration value.
///
/// Accepts a string or an array of strings; anything else is a configuration error.
impl TryFrom<serde_json::Value> for ApiEntries {
    type Error = Error;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        use serde_json::Value;

        match value {
            Value::String(entry) => Ok(ApiEntries::One(entry)),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(entry) => Ok(entry),
                    other => Err(Error::Configuration(format!(
                        "api entries must be strings, found {}",
                        other
                    ))),
                })
                .collect::<Result<Vec<_>>>()
                .map(ApiEntries::Many),
            other => Err(Error::Configuration(format!(
                "you must supply a string or an array of strings, found {}",
                other
            ))),
        }
    }
}

/// Settings for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Tag name (without `@`) marking annotation comments
    pub marker: String,
    /// Upper bound on files read and decoded at the same time
    pub max_concurrency: usize,
    pub key_policy: KeyPolicy,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            key_policy: KeyPolicy::default(),
        }
    }
}

impl BuildConfig {
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn with_key_policy(mut self, key_policy: KeyPolicy) -> Self {
        self.key_policy = key_policy;
        self
    }

    /// Checks the settings before any file is touched.
    pub fn validate(&self) -> Result<()> {
        let marker_ok = !self.marker.is_empty()
            && self
                .marker
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
        if !marker_ok {
            return Err(Error::Configuration(format!(
                "marker must be a non-empty tag name, got {:?}",
                self.marker
            )));
        }

        if self.max_concurrency == 0 {
            return Err(Error::Configuration(
                "max concurrency must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Runs the full extraction pipeline over `entries`.
///
/// Only configuration problems are returned as errors, before any file is read. Every
/// per-file problem ends up in the failure ledger of the returned document.
///
/// # Example
///
/// ```no_run
/// use openapi_from_comments::pipeline::{build, BuildConfig};
///
/// # async fn run() -> openapi_from_comments::error::Result<()> {
/// let doc = build(vec!["api/controllers/UserController.js"], &BuildConfig::default()).await?;
/// for failure in &doc.failures {
///     eprintln!("{}: {:?}", failure.source_file.display(), failure.error());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn build(
    entries: impl Into<ApiEntries>,
    config: &BuildConfig,
) -> Result<AggregatedDocument> {
    let files = entries.into().into_paths()?;
    config.validate()?;

    info!(
        "Processing {} files (marker @{}, concurrency {})",
        files.len(),
        config.marker,
        config.max_concurrency
    );

    let extractor = Arc::new(AnnotationExtractor::new(config.marker.clone()));
    let decoder = PayloadDecoder::new(config.key_policy);
    let semaphore = Arc::new(Semaphore::new(config.max_concurrency));

    let handles: Vec<_> = files
        .iter()
        .cloned()
        .map(|path| {
            let extractor = Arc::clone(&extractor);
            let semaphore = Arc::clone(&semaphore);

            tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => return FileResult::failure(path, Error::Task(e.to_string())),
                };
                process_file(path, &extractor, &decoder).await
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (path, handle) in files.into_iter().zip(handles) {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => {
                warn!("{}: worker task failed: {}", path.display(), e);
                FileResult::failure(path, Error::Task(e.to_string()))
            }
        };
        results.push(result);
    }

    Ok(aggregate(results))
}

async fn process_file(
    path: PathBuf,
    extractor: &AnnotationExtractor,
    decoder: &PayloadDecoder,
) -> FileResult {
    debug!("Reading {}", path.display());

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("{}: {}", path.display(), e);
            return FileResult::failure(path, Error::FileRead(e));
        }
    };

    let content = String::from_utf8_lossy(&bytes);
    analyze_source(&path, &content, extractor, decoder)
}

/// Extracts and decodes the annotations of one already-read source file.
pub fn analyze_source(
    path: &Path,
    content: &str,
    extractor: &AnnotationExtractor,
    decoder: &PayloadDecoder,
) -> FileResult {
    let mut fragments = Vec::new();
    let mut first_error = None;

    for record in extractor.extract(path, content) {
        let (fragment, errors) = decoder.decode_record(&record);
        if first_error.is_none() {
            first_error = errors.into_iter().next();
        }
        fragments.extend(fragment);
    }

    let result = FileResult::from_fragments(path.to_path_buf(), fragments, first_error);
    match result.error() {
        None => debug!(
            "{}: {} annotated blocks",
            path.display(),
            result.fragments().len()
        ),
        Some(e) => debug!("{}: {}", path.display(), e),
    }
    result
}
