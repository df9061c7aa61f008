//! Error types and handling for Peerstate
//!
//! Every failure is fatal for the run: there is no partial-success mode,
//! so errors are propagated to the binary and turned into exit status 1.

use std::path::PathBuf;
use thiserror::Error;

/// Main result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Peerstate
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Command line did not have the expected shape
    #[error("Invalid input parameters: {0}")]
    Usage(String),

    /// Input file could not be opened
    #[error("Input file not found! {}: {source}", path.display())]
    InputNotFound {
        /// Path given on the command line
        path: PathBuf,
        /// Underlying open failure
        source: std::io::Error,
    },

    /// An input line does not match the command grammar
    #[error("Malformed command on line {line}: {reason}")]
    MalformedCommand {
        /// 1-based input line number
        line: usize,
        /// What was wrong with it
        reason: String,
    },

    /// An entity was referenced that the registry does not hold
    #[error("Unknown entity during partitioned merge: {0}")]
    UnknownEntity(String),

    /// A merge worker failed to complete its stride
    #[error("Merge worker {worker} failed: {reason}")]
    Worker {
        /// Worker index
        worker: usize,
        /// Failure description
        reason: String,
    },

    /// I/O errors from std
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Prometheus metrics errors
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a usage error
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// Create a malformed command error
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedCommand {
            line,
            reason: reason.into(),
        }
    }

    /// Process exit status for this error. All failures are fatal and map to 1.
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// Check if this error came from the input rather than the environment
    pub fn is_input_error(&self) -> bool {
        matches!(self, Error::MalformedCommand { .. } | Error::Usage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_message_names_line() {
        let err = Error::malformed(7, "missing field `user`");
        assert_eq!(err.to_string(), "Malformed command on line 7: missing field `user`");
        assert!(err.is_input_error());
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_input_not_found_message() {
        let err = Error::InputNotFound {
            path: PathBuf::from("/nope/input.jsonl"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().starts_with("Input file not found!"));
        assert!(!err.is_input_error());
    }
}
