//! Library error type.

use thiserror::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library.
///
/// Only [`Error::Configuration`] is ever returned from [`crate::pipeline::build`];
/// every other variant is recorded per file in the failure ledger.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid input to the pipeline entry point or invalid build settings.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The source file could not be read.
    #[error("failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    /// An annotation payload is not usable structured text.
    #[error("failed to decode annotation payload: {message}")]
    Decode { message: String },

    /// The file produced no decodable annotations at all.
    #[error("no usable structured annotations")]
    NoAnnotations,

    /// The per-file worker task did not complete.
    #[error("file task failed: {0}")]
    Task(String),
}

impl Error {
    pub(crate) fn decode(message: impl Into<String>) -> Self {
        Error::Decode {
            message: message.into(),
        }
    }

    /// Returns true for failures caused by a malformed payload.
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_annotations_reason_is_fixed() {
        assert_eq!(
            Error::NoAnnotations.to_string(),
            "no usable structured annotations"
        );
    }

    #[test]
    fn test_decode_helper() {
        let err = Error::decode("bad indentation");
        assert!(err.is_decode());
        assert!(err.to_string().contains("bad indentation"));
        assert!(!Error::NoAnnotations.is_decode());
    }

    #[test]
    fn test_io_error_converts_to_file_read() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::FileRead(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
