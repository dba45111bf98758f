//! Swagger 2.0 envelope around the aggregated paths, with per-file tags.

use crate::aggregator::AggregatedDocument;
use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;
use std::fs;
use std::path::{Path, PathBuf};

/// Swagger 2.0 document envelope.
///
/// Only `paths` is produced by the pipeline; everything else comes from the defaults or
/// from a base document supplied by the user and is never validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwaggerDocument {
    /// Swagger version
    pub swagger: String,
    /// API info
    pub info: Info,
    #[serde(rename = "basePath")]
    pub base_path: String,
    pub tags: Vec<Tag>,
    pub schemes: Vec<String>,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    /// Endpoint path -> path item, filled from the aggregated annotations
    pub paths: Mapping,
    pub definitions: Mapping,
    /// Any other top-level field of the base document, passed through
    #[serde(flatten)]
    pub extra: Mapping,
}

/// Swagger Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Info {
    pub version: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "termsOfService", skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,
}

/// Swagger Tag object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalDocs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub url: String,
}

impl Default for Info {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            title: "Sample spec".to_string(),
            description: Some("Sample spec for Swagger".to_string()),
            terms_of_service: Some("http://swagger.io/terms/".to_string()),
        }
    }
}

impl Default for SwaggerDocument {
    fn default() -> Self {
        Self {
            swagger: "2.0".to_string(),
            info: Info::default(),
            base_path: "/".to_string(),
            tags: Vec::new(),
            schemes: vec!["http".to_string()],
            consumes: vec!["application/json".to_string()],
            produces: vec!["application/json".to_string()],
            paths: Mapping::new(),
            definitions: Mapping::new(),
            extra: Mapping::new(),
        }
    }
}

/// Loads a base envelope from a YAML or JSON file. Missing fields take their defaults.
pub fn load_base(path: &Path) -> Result<SwaggerDocument> {
    debug!("Loading base document: {}", path.display());

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read base document: {}", path.display()))?;

    // JSON is a subset of YAML, so one parser covers both
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse base document: {}", path.display()))
}

/// Kind of source file a generated tag describes, derived from its parent directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Controller,
    Model,
    Hook,
    Other,
}

impl SourceKind {
    pub fn of(path: &Path) -> Self {
        let parent = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or_default();

        match parent {
            "controllers" => SourceKind::Controller,
            "models" => SourceKind::Model,
            "hooks" => SourceKind::Hook,
            _ => SourceKind::Other,
        }
    }

    fn label(self) -> &'static str {
        match self {
            SourceKind::Controller => "Controller",
            SourceKind::Model => "Model",
            SourceKind::Hook => "Hook",
            SourceKind::Other => "Other",
        }
    }

    /// Reference documentation for this kind of source file.
    pub fn docs_url(self) -> &'static str {
        match self {
            SourceKind::Controller => "https://sailsjs.com/documentation/concepts/controllers",
            SourceKind::Model => "https://sailsjs.com/documentation/concepts/models-and-orm/models",
            SourceKind::Hook => "https://sailsjs.com/documentation/concepts/extending-sails/hooks",
            SourceKind::Other => "https://sailsjs.com/documentation/concepts",
        }
    }
}

/// Builds the tag describing one annotated source file.
pub fn file_tag(path: &Path) -> Option<Tag> {
    let name = path.file_stem()?.to_str()?.to_string();
    let kind = SourceKind::of(path);
    let description = format!("API functionality related to the {} {}", name, kind.label());

    Some(Tag {
        name,
        description: Some(description),
        external_docs: Some(ExternalDocs {
            description: None,
            url: kind.docs_url().to_string(),
        }),
    })
}

/// Combines an envelope with the aggregated paths.
pub struct DocumentBuilder {
    base: SwaggerDocument,
    file_tags: Vec<PathBuf>,
}

impl DocumentBuilder {
    /// Create a new DocumentBuilder with the default envelope
    pub fn new() -> Self {
        debug!("Initializing DocumentBuilder");
        Self {
            base: SwaggerDocument::default(),
            file_tags: Vec::new(),
        }
    }

    /// Use `base` as the envelope instead of the defaults
    pub fn with_base(mut self, base: SwaggerDocument) -> Self {
        self.base = base;
        self
    }

    /// Generate one tag per file, appended after the envelope's own tags
    pub fn with_file_tags(mut self, files: &[PathBuf]) -> Self {
        self.file_tags = files.to_vec();
        self
    }

    /// Build the final document.
    ///
    /// The envelope's `paths` is replaced by the aggregated mapping. Generated tags whose
    /// name already exists in the envelope are skipped.
    pub fn build(&self, aggregated: &AggregatedDocument) -> SwaggerDocument {
        let mut document = self.base.clone();

        for tag in self.file_tags.iter().filter_map(|f| file_tag(f)) {
            if document.tags.iter().any(|t| t.name == tag.name) {
                debug!("Tag {} already defined, skipping", tag.name);
                continue;
            }
            document.tags.push(tag);
        }

        document.paths = aggregated.paths.clone();
        debug!("Document built with {} paths", document.paths.len());
        document
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
