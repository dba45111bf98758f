//! Payload decoding: turns the free-text body of a marker tag into a path entry.
//!
//! A body is YAML and may hold several documents; the last one that is not empty or
//! falsy wins. The decoded value must be a mapping keyed by endpoint path, holding its
//! definition. The definition itself is opaque and passed through untouched.

use crate::error::{Error, Result};
use crate::extractor::AnnotationRecord;
use log::{debug, warn};
use serde::Deserialize;
use serde_yaml::Value;
use std::path::PathBuf;

/// How a decoded mapping with other than exactly one top-level key is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyPolicy {
    /// Zero or several top-level keys are a decode error
    Strict,
    /// An empty mapping contributes nothing; with several keys only the first is used
    #[default]
    FirstKey,
}

/// One endpoint path and its definition, as decoded from a single tag.
#[derive(Debug, Clone, PartialEq)]
pub struct PathEntry {
    /// Endpoint path, possibly with an embedded method selector
    pub path: String,
    /// Opaque operation definition
    pub definition: Value,
}

/// The decoded tags of one comment block.
///
/// Never empty: blocks whose tags all fail to decode produce no fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFragment {
    pub source_file: PathBuf,
    pub tags: Vec<PathEntry>,
}

/// Decodes marker tag bodies into [`PathEntry`] values.
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadDecoder {
    policy: KeyPolicy,
}

impl PayloadDecoder {
    pub fn new(policy: KeyPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> KeyPolicy {
        self.policy
    }

    /// Decodes a single tag body.
    ///
    /// Returns `Ok(None)` when the body holds nothing usable (empty, whitespace, or only
    /// falsy documents), and an [`Error::Decode`] when it is malformed or does not fit the
    /// one-path-per-tag shape.
    pub fn decode(&self, payload: &str) -> Result<Option<PathEntry>> {
        match load_last_truthy(payload)? {
            Some(value) => self.path_entry(value),
            None => Ok(None),
        }
    }

    /// Decodes every marker tag of `record`, in order.
    ///
    /// Tags that fail are dropped and their errors returned alongside the fragment. The
    /// fragment is `None` when no tag survived.
    pub fn decode_record(&self, record: &AnnotationRecord) -> (Option<DecodedFragment>, Vec<Error>) {
        let mut entries = Vec::with_capacity(record.tags.len());
        let mut errors = Vec::new();

        for tag in &record.tags {
            match self.decode(&tag.description) {
                Ok(Some(entry)) => {
                    debug!("{}: decoded path {}", record.source_file.display(), entry.path);
                    entries.push(entry);
                }
                Ok(None) => {
                    debug!(
                        "{}: skipping empty @{} annotation",
                        record.source_file.display(),
                        tag.title
                    );
                }
                Err(e) => {
                    warn!(
                        "{}: dropping @{} annotation: {}",
                        record.source_file.display(),
                        tag.title,
                        e
                    );
                    errors.push(e);
                }
            }
        }

        let fragment = (!entries.is_empty()).then(|| DecodedFragment {
            source_file: record.source_file.clone(),
            tags: entries,
        });

        (fragment, errors)
    }

    fn path_entry(&self, value: Value) -> Result<Option<PathEntry>> {
        let mapping = match value {
            Value::Mapping(mapping) => mapping,
            other => {
                return Err(Error::decode(format!(
                    "expected a mapping from path to definition, found {}",
                    kind(&other)
                )))
            }
        };

        let extra_keys = match (mapping.len(), self.policy) {
            (0, KeyPolicy::FirstKey) => return Ok(None),
            (0, KeyPolicy::Strict) => {
                return Err(Error::decode("mapping has no path key"));
            }
            (1, _) => 0,
            (n, KeyPolicy::Strict) => {
                return Err(Error::decode(format!(
                    "mapping has {} top-level keys, expected exactly one path",
                    n
                )));
            }
            (n, KeyPolicy::FirstKey) => n - 1,
        };

        let Some((key, definition)) = mapping.into_iter().next() else {
            return Ok(None);
        };

        let path = match (key, self.policy) {
            (Value::String(path), _) => path,
            (Value::Number(n), KeyPolicy::FirstKey) => n.to_string(),
            (Value::Bool(b), KeyPolicy::FirstKey) => b.to_string(),
            (other, _) => {
                return Err(Error::decode(format!(
                    "path key must be a string, found {}",
                    kind(&other)
                )))
            }
        };

        if extra_keys > 0 {
            warn!(
                "annotation for {} has {} more top-level key(s); only the first is used",
                path, extra_keys
            );
        }

        Ok(Some(PathEntry { path, definition }))
    }
}

/// Loads every YAML document of `payload` and keeps the last truthy one.
pub fn load_last_truthy(payload: &str) -> Result<Option<Value>> {
    let mut kept = None;

    for document in serde_yaml::Deserializer::from_str(payload) {
        let value = Value::deserialize(document).map_err(|e| Error::decode(e.to_string()))?;
        if is_truthy(&value) {
            kept = Some(value);
        }
    }

    Ok(kept)
}

/// Null, `false`, zero and the empty string are falsy; everything else is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => true,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc_comment::DocTag;

    fn tag(body: &str) -> DocTag {
        DocTag {
            title: "swagger".to_string(),
            description: body.to_string(),
        }
    }

    #[test]
    fn test_decode_single_path() {
        let decoder = PayloadDecoder::default();
        let entry = decoder
            .decode("/users:\n  get:\n    summary: List users")
            .unwrap()
            .unwrap();

        assert_eq!(entry.path, "/users");
        let expected: Value = serde_yaml::from_str("get:\n  summary: List users").unwrap();
        assert_eq!(entry.definition, expected);
    }

    #[test]
    fn test_decode_empty_and_whitespace_payloads() {
        let decoder = PayloadDecoder::default();
        assert!(decoder.decode("").unwrap().is_none());
        assert!(decoder.decode("   \n  \n").unwrap().is_none());
        assert!(decoder.decode("~").unwrap().is_none());
        assert!(decoder.decode("false").unwrap().is_none());
        assert!(decoder.decode("0").unwrap().is_none());
        assert!(decoder.decode("''").unwrap().is_none());
    }

    #[test]
    fn test_decode_malformed_yaml() {
        let decoder = PayloadDecoder::default();
        let err = decoder
            .decode("/users:\n  get: [unclosed\n  post: {")
            .unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_decode_non_mapping_payload() {
        let decoder = PayloadDecoder::default();
        let err = decoder.decode("just a sentence").unwrap_err();
        assert!(err.to_string().contains("a string"));

        let err = decoder.decode("- /a\n- /b").unwrap_err();
        assert!(err.to_string().contains("a sequence"));
    }

    #[test]
    fn test_decode_strict_rejects_multiple_keys() {
        let decoder = PayloadDecoder::new(KeyPolicy::Strict);
        let err = decoder.decode("/a:\n  get: {}\n/b:\n  get: {}").unwrap_err();
        assert!(err.is_decode());
        assert!(err.to_string().contains("2 top-level keys"));
    }

    #[test]
    fn test_decode_strict_rejects_empty_mapping() {
        let decoder = PayloadDecoder::new(KeyPolicy::Strict);
        let err = decoder.decode("{}").unwrap_err();
        assert!(err.to_string().contains("no path key"));
    }

    #[test]
    fn test_decode_first_key_policy() {
        let decoder = PayloadDecoder::new(KeyPolicy::FirstKey);
        assert_eq!(decoder.policy(), KeyPolicy::FirstKey);

        let entry = decoder
            .decode("/b:\n  get: {}\n/a:\n  post: {}")
            .unwrap()
            .unwrap();
        assert_eq!(entry.path, "/b");

        assert!(decoder.decode("{}").unwrap().is_none());
    }

    #[test]
    fn test_decode_default_policy_is_first_key() {
        let decoder = PayloadDecoder::default();
        assert_eq!(decoder.policy(), KeyPolicy::FirstKey);

        let entry = decoder
            .decode("/a:\n  get: {}\n/b:\n  get: {}")
            .unwrap()
            .unwrap();
        assert_eq!(entry.path, "/a");
    }

    #[test]
    fn test_decode_non_string_key() {
        let decoder = PayloadDecoder::new(KeyPolicy::Strict);
        let err = decoder.decode("404:\n  get: {}").unwrap_err();
        assert!(err.to_string().contains("must be a string"));
    }

    #[test]
    fn test_decode_first_key_stringifies_scalar_keys() {
        let decoder = PayloadDecoder::new(KeyPolicy::FirstKey);

        let entry = decoder.decode("404:\n  get: {}").unwrap().unwrap();
        assert_eq!(entry.path, "404");

        let entry = decoder.decode("true:\n  get: {}").unwrap().unwrap();
        assert_eq!(entry.path, "true");

        let err = decoder.decode("~:\n  get: {}").unwrap_err();
        assert!(err.to_string().contains("must be a string"));
    }

    #[test]
    fn test_decode_multi_document_keeps_last_truthy() {
        let decoder = PayloadDecoder::default();
        let entry = decoder
            .decode("/first:\n  get: {}\n---\n/second:\n  get: {}\n---\n~\n")
            .unwrap()
            .unwrap();
        assert_eq!(entry.path, "/second");
    }

    #[test]
    fn test_decode_record_drops_bad_tags() {
        let record = AnnotationRecord {
            source_file: PathBuf::from("users.js"),
            raw_text: String::new(),
            tags: vec![
                tag("/a:\n  get: {}"),
                tag("/b: [oops"),
                tag(""),
                tag("/c:\n  post: {}"),
            ],
        };

        let (fragment, errors) = PayloadDecoder::default().decode_record(&record);
        let fragment = fragment.unwrap();

        assert_eq!(fragment.source_file, PathBuf::from("users.js"));
        let paths: Vec<&str> = fragment.tags.iter().map(|t| t.path.as_str()).collect();
        assert_eq!(paths, vec!["/a", "/c"]);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].is_decode());
    }

    #[test]
    fn test_decode_record_without_survivors() {
        let record = AnnotationRecord {
            source_file: PathBuf::from("empty.js"),
            raw_text: String::new(),
            tags: vec![tag(""), tag("   ")],
        };

        let (fragment, errors) = PayloadDecoder::default().decode_record(&record);
        assert!(fragment.is_none());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_is_truthy() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&Value::Bool(false)));
        assert!(is_truthy(&Value::Bool(true)));
        assert!(is_truthy(&Value::String("x".into())));
        assert!(is_truthy(&Value::Sequence(vec![])));
        assert!(is_truthy(&Value::Mapping(Default::default())));
    }
}
