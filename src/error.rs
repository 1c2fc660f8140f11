//! Centralized error types for mailnorm.
//!
//! Two layers: [`MessageError`] is fatal to one message only and ends up in
//! quarantine; [`Error`] is fatal to a whole list run and is surfaced to the
//! caller wrapped in a [`ListFailure`] that names the list.

use std::path::PathBuf;
use thiserror::Error;

/// Failures that stop normalization of a single message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    /// A continuation line appeared before any header field was started.
    #[error("Malformed header: continuation line before any field: '{line}'")]
    MalformedHeader { line: String },

    /// The message has no usable `Message-ID` header.
    #[error("Missing Message-ID header")]
    MissingIdentity,

    /// The body could not be decoded with its declared charset.
    #[error("Undecodable body (charset '{charset}')")]
    UndecodableBody { charset: String },
}

/// Errors that stop processing of a whole mailing list.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The persisted corpus could not be decoded or failed its integrity check.
    #[error("Corrupt or incompatible corpus '{path}': {reason}")]
    InvalidCorpus { path: PathBuf, reason: String },

    /// A message identity is present more than once in the corpus.
    #[error("Message-ID conflict in corpus: '{message_id}' present {count} times")]
    IdentityConflict { message_id: String, count: usize },

    /// The source directory of a list does not exist.
    #[error("Source directory not found: {0}")]
    SourceNotFound(PathBuf),

    /// The list filter matched no list of the archive.
    #[error("No mailing list selected under '{0}'")]
    NoListsSelected(PathBuf),

    /// The worker pool could not be created.
    #[error("Failed to create worker pool: {0}")]
    ThreadPool(String),

    /// A worker panicked while processing a list.
    #[error("Worker panicked: {0}")]
    WorkerPanicked(String),
}

/// Convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Attach the list name, producing the error reported to the caller.
    pub fn for_list(self, list: impl Into<String>) -> ListFailure {
        ListFailure {
            list: list.into(),
            source: self,
        }
    }
}

/// A list-level failure with the list name attached.
#[derive(Error, Debug)]
#[error("list '{list}': {source}")]
pub struct ListFailure {
    pub list: String,
    #[source]
    pub source: Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_failure_names_the_list() {
        let failure = Error::IdentityConflict {
            message_id: "<a@b>".into(),
            count: 2,
        }
        .for_list("linux-kernel");
        let text = failure.to_string();
        assert!(text.contains("linux-kernel"));
        assert!(text.contains("<a@b>"));
    }

    #[test]
    fn test_io_helper_keeps_path() {
        let err = Error::io(
            "/tmp/x",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("/tmp/x"));
    }
}
