//! openapi-from-comments - Swagger documentation aggregated from source comments.
//!
//! Source files document their endpoints in block comments tagged with a marker keyword
//! (`@swagger` by default) followed by a YAML fragment:
//!
//! ```text
//! /**
//!  * @swagger
//!  * /users:
//!  *   get:
//!  *     summary: List users
//!  */
//! ```
//!
//! This library collects those fragments from a list of files and merges them into a single
//! `paths` mapping, keyed by endpoint path.
//!
//! # Architecture
//!
//! The pipeline is a strict fan-out/fan-in:
//!
//! 1. [`extractor`] - finds marker-tagged doc comments in each file (using [`doc_comment`])
//! 2. [`decoder`] - decodes each tag body into a path entry
//! 3. [`aggregator`] - folds every file's entries into one mapping plus a success/failure ledger
//!
//! [`pipeline`] runs the first two stages concurrently per file and the last one once all
//! files are done. Around it:
//!
//! - [`scanner`] - enumerates source files in directories
//! - [`document`] - wraps the paths in a Swagger 2.0 envelope
//! - [`serializer`] - writes YAML or JSON
//!
//! # Example Usage
//!
//! ```no_run
//! use openapi_from_comments::{
//!     document::DocumentBuilder,
//!     pipeline::{build, BuildConfig},
//!     scanner::FileScanner,
//!     serializer::serialize_yaml,
//! };
//! use std::path::PathBuf;
//!
//! # async fn generate() -> anyhow::Result<()> {
//! let scan = FileScanner::new(PathBuf::from("./api/controllers")).scan()?;
//!
//! let aggregated = build(scan.files.clone(), &BuildConfig::default()).await?;
//! for failure in &aggregated.failures {
//!     eprintln!("skipped {}", failure.source_file.display());
//! }
//!
//! let document = DocumentBuilder::new()
//!     .with_file_tags(&scan.files)
//!     .build(&aggregated);
//! println!("{}", serialize_yaml(&document)?);
//! # Ok(())
//! # }
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod aggregator;
pub mod cli;
pub mod decoder;
pub mod doc_comment;
pub mod document;
pub mod error;
pub mod extractor;
pub mod pipeline;
pub mod scanner;
pub mod serializer;
