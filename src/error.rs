// WHY: callers need to tell a missing manuscript (skip and continue) apart from
// a malformed table or character map (propagate), so the library exposes typed errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading, segmenting, loading or merging manuscripts
#[derive(Error, Debug)]
pub enum VoicesError {
    /// File does not exist, or is a manuscript that cannot be opened or decoded
    #[error("File not found or unreadable: {}: {source}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other I/O failure on a character map, table or manifest
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Structured input could not be parsed or has the wrong shape
    #[error("Format error in {context}: {message}")]
    Format { context: String, message: String },

    /// A sentence record parsed but lacks a required field
    #[error("Sentence {id} is missing required field `{field}`")]
    MissingField { id: String, field: &'static str },

    /// Manifest or segmenter configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Strict merge found a character map id with no matching sentence
    #[error("Character {character:?} references unknown sentence id {id}")]
    UnknownSentenceId { character: String, id: u32 },
}

impl VoicesError {
    /// Map an I/O error on `path`, promoting `ErrorKind::NotFound` to [`VoicesError::NotFound`]
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            VoicesError::NotFound { path, source }
        } else {
            VoicesError::Io { path, source }
        }
    }

    /// Map any failure to open or decode an input manuscript to [`VoicesError::NotFound`]
    pub fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        VoicesError::NotFound {
            path: path.into(),
            source,
        }
    }

    pub fn format(context: impl Into<String>, message: impl ToString) -> Self {
        VoicesError::Format {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// True for conditions a batch run should skip rather than abort on
    pub fn is_not_found(&self) -> bool {
        matches!(self, VoicesError::NotFound { .. })
    }
}

/// Result type alias for voices operations
pub type Result<T> = std::result::Result<T, VoicesError>;
