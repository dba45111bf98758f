//! Annotation extraction from raw source text.
//!
//! The extractor finds every `/** ... */` block in a source file, parses it as a
//! documentation comment and keeps only the tags named after the marker keyword
//! (`@swagger` by default). Blocks without a marker tag are dropped.

use crate::doc_comment::{self, DocTag};
use log::debug;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Non-greedy, multi-line match of a `/** ... */` block.
static RE_DOC_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*\*.*?\*/").unwrap());

/// Default marker keyword.
pub const DEFAULT_MARKER: &str = "swagger";

/// One comment block that carries at least one marker tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRecord {
    /// File the block was found in
    pub source_file: PathBuf,
    /// The complete comment block, delimiters included
    pub raw_text: String,
    /// The marker tags of the block, in source order
    pub tags: Vec<DocTag>,
}

/// Pulls marker-tagged comment blocks out of source text.
///
/// # Example
///
/// ```
/// use openapi_from_comments::extractor::AnnotationExtractor;
/// use std::path::Path;
///
/// let source = "/**\n * @swagger\n * /ping:\n *   get: {}\n */\nfunction ping() {}";
/// let extractor = AnnotationExtractor::new("swagger");
/// let records = extractor.extract(Path::new("ping.js"), source);
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].tags[0].description, "/ping:\n  get: {}");
/// ```
#[derive(Debug, Clone)]
pub struct AnnotationExtractor {
    marker: String,
}

impl AnnotationExtractor {
    /// Creates an extractor that keeps tags titled `marker` (without the `@`).
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// The marker keyword this extractor keeps.
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Extracts every marker-tagged comment block of `content`, in source order.
    pub fn extract(&self, source_file: &Path, content: &str) -> Vec<AnnotationRecord> {
        let mut records = Vec::new();
        let mut blocks = 0usize;

        for block in RE_DOC_BLOCK.find_iter(content) {
            blocks += 1;
            let comment = doc_comment::parse(block.as_str());

            let tags: Vec<DocTag> = comment
                .tags
                .into_iter()
                .filter(|tag| tag.title == self.marker)
                .collect();

            if tags.is_empty() {
                continue;
            }

            records.push(AnnotationRecord {
                source_file: source_file.to_path_buf(),
                raw_text: block.as_str().to_string(),
                tags,
            });
        }

        debug!(
            "{}: {} comment blocks, {} with @{}",
            source_file.display(),
            blocks,
            records.len(),
            self.marker
        );

        records
    }
}

impl Default for AnnotationExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTROLLER: &str = r#"
/**
 * Plain documentation, no marker.
 * @param req the request
 */
function helper(req) {}

/**
 * @swagger
 * /users:
 *   get:
 *     summary: List users
 */
function list(req, res) {}

/* not a doc block @swagger */

/**
 * @swagger
 * /users/{id}:
 *   get:
 *     summary: Get user
 * @swagger
 * /users/{id}:
 *   delete:
 *     summary: Delete user
 */
function one(req, res) {}
"#;

    #[test]
    fn test_extract_keeps_only_marker_blocks() {
        let extractor = AnnotationExtractor::default();
        let records = extractor.extract(Path::new("users.js"), CONTROLLER);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source_file, PathBuf::from("users.js"));
        assert_eq!(records[0].tags.len(), 1);
        assert!(records[0].raw_text.starts_with("/**"));
        assert!(records[0].raw_text.ends_with("*/"));
        assert_eq!(
            records[0].tags[0].description,
            "/users:\n  get:\n    summary: List users"
        );
    }

    #[test]
    fn test_extract_preserves_tag_order_within_block() {
        let extractor = AnnotationExtractor::default();
        let records = extractor.extract(Path::new("users.js"), CONTROLLER);

        let second = &records[1];
        assert_eq!(second.tags.len(), 2);
        assert!(second.tags[0].description.contains("Get user"));
        assert!(second.tags[1].description.contains("Delete user"));
    }

    #[test]
    fn test_extract_filters_other_tags() {
        let source = "/**\n * @param a\n * @swagger\n * /a: {}\n * @returns b\n */";
        let records = AnnotationExtractor::default().extract(Path::new("a.js"), source);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tags.len(), 1);
        assert_eq!(records[0].tags[0].title, "swagger");
        assert_eq!(records[0].tags[0].description, "/a: {}");
    }

    #[test]
    fn test_extract_custom_marker() {
        let source = "/**\n * @api\n * /a: {}\n */\n/**\n * @swagger\n * /b: {}\n */";
        let extractor = AnnotationExtractor::new("api");
        let records = extractor.extract(Path::new("a.js"), source);

        assert_eq!(extractor.marker(), "api");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tags[0].description, "/a: {}");
    }

    #[test]
    fn test_extract_marker_is_case_sensitive() {
        let source = "/**\n * @Swagger\n * /a: {}\n */";
        let records = AnnotationExtractor::default().extract(Path::new("a.js"), source);
        assert!(records.is_empty());
    }

    #[test]
    fn test_extract_no_comments() {
        let records =
            AnnotationExtractor::default().extract(Path::new("empty.js"), "module.exports = {};");
        assert!(records.is_empty());
    }

    #[test]
    fn test_extract_unterminated_block_is_ignored() {
        let source = "/**\n * @swagger\n * /a: {}\n";
        let records = AnnotationExtractor::default().extract(Path::new("a.js"), source);
        assert!(records.is_empty());
    }
}
