//! Serialization module for writing the generated document and build report.
//!
//! This module provides functions to serialize documents into YAML or JSON and write them
//! to files or return them as strings.

use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Serializes a value to YAML format.
///
/// # Errors
///
/// Returns an error if serialization fails, e.g. for mappings with keys YAML cannot
/// represent.
///
/// # Example
///
/// ```
/// use openapi_from_comments::document::SwaggerDocument;
/// use openapi_from_comments::serializer::serialize_yaml;
///
/// let yaml = serialize_yaml(&SwaggerDocument::default()).unwrap();
/// assert!(yaml.contains("swagger: '2.0'"));
/// ```
pub fn serialize_yaml<T: Serialize>(value: &T) -> Result<String> {
    debug!("Serializing document to YAML");
    serde_yaml::to_string(value).context("Failed to serialize document to YAML")
}

/// Serializes a value to JSON format with pretty printing.
///
/// # Errors
///
/// Returns an error if serialization fails, e.g. when a decoded annotation uses a
/// sequence or mapping as a key, which JSON cannot represent.
pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    debug!("Serializing document to JSON");
    serde_json::to_string_pretty(value).context("Failed to serialize document to JSON")
}

/// Writes string content to a file.
///
/// Creates the file if it doesn't exist, or overwrites it if it does. Missing parent
/// directories are created.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::AggregatedDocument;
    use crate::document::{DocumentBuilder, SwaggerDocument};
    use tempfile::TempDir;

    /// Helper function to create a document with one annotated path
    fn create_test_document() -> SwaggerDocument {
        let aggregated = AggregatedDocument {
            paths: serde_yaml::from_str(
                "/users/{id}:\n  get:\n    summary: Get user\n    responses:\n      200:\n        description: ok",
            )
            .unwrap(),
            ..Default::default()
        };
        DocumentBuilder::new().build(&aggregated)
    }

    #[test]
    fn test_serialize_yaml() {
        let yaml = serialize_yaml(&create_test_document()).unwrap();

        assert!(yaml.contains("swagger: '2.0'"));
        assert!(yaml.contains("info:"));
        assert!(yaml.contains("title: Sample spec"));
        assert!(yaml.contains("basePath: /"));
        assert!(yaml.contains("paths:"));
        assert!(yaml.contains("/users/{id}"));
        assert!(yaml.contains("summary: Get user"));
    }

    #[test]
    fn test_serialize_json() {
        let json = serialize_json(&create_test_document()).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["swagger"], "2.0");
        assert_eq!(parsed["info"]["title"], "Sample spec");
        assert_eq!(parsed["info"]["termsOfService"], "http://swagger.io/terms/");
        assert_eq!(parsed["paths"]["/users/{id}"]["get"]["summary"], "Get user");
        // integer response codes become string keys in JSON
        assert_eq!(
            parsed["paths"]["/users/{id}"]["get"]["responses"]["200"]["description"],
            "ok"
        );
    }

    #[test]
    fn test_serialize_json_pretty_format() {
        let json = serialize_json(&create_test_document()).unwrap();

        assert!(json.contains('\n'));
        assert!(json.contains("  "));
        assert!(json.lines().count() > 5, "Pretty printed JSON should have multiple lines");
    }

    #[test]
    fn test_serialize_json_rejects_complex_keys() {
        let aggregated = AggregatedDocument {
            paths: serde_yaml::from_str("/a:\n  ? [x, y]\n  : value").unwrap(),
            ..Default::default()
        };
        let doc = DocumentBuilder::new().build(&aggregated);

        assert!(serialize_json(&doc).is_err());
    }

    #[test]
    fn test_serialize_preserves_path_order() {
        let aggregated = AggregatedDocument {
            paths: serde_yaml::from_str("/zeta: {}\n/alpha: {}\n/mid: {}").unwrap(),
            ..Default::default()
        };
        let yaml = serialize_yaml(&aggregated.paths).unwrap();

        let zeta = yaml.find("/zeta").unwrap();
        let alpha = yaml.find("/alpha").unwrap();
        let mid = yaml.find("/mid").unwrap();
        assert!(zeta < alpha && alpha < mid);
    }

    #[test]
    fn test_write_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("swagger.yaml");

        write_to_file("test content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "test content");
    }

    #[test]
    fn test_write_to_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("subdir").join("nested").join("swagger.json");

        write_to_file("test content", &file_path).unwrap();

        assert!(file_path.exists());
    }

    #[test]
    fn test_write_to_file_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("swagger.yaml");

        write_to_file("initial content", &file_path).unwrap();
        write_to_file("new content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new content");
    }

    #[test]
    fn test_write_yaml_file_end_to_end() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("swagger.yaml");

        let yaml = serialize_yaml(&create_test_document()).unwrap();
        write_to_file(&yaml, &file_path).unwrap();

        let content = fs::read_to_string(&file_path).unwrap();
        let deserialized: SwaggerDocument = serde_yaml::from_str(&content).unwrap();
        assert_eq!(deserialized, create_test_document());
    }
}
