use thiserror::Error;

/// Failures raised while addressing the record tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("Malformed path `{0}`")]
    Malformed(String),
    #[error("Unknown field `{0}`")]
    UnknownField(String),
    #[error("Index {index} out of range for `{path}` (length {len})")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },
    #[error("`{0}` addresses a collection, not a leaf")]
    NotALeaf(String),
    #[error("`{0}` does not address a collection")]
    NotACollection(String),
}

/// A fetched document did not have the shape of a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed record at `{path}`: {message}")]
pub struct DecodeError {
    pub path: String,
    pub message: String,
}

impl DecodeError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Failures reported by a [`crate::gateway::SyncGateway`].
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Remote collection unavailable: {0}")]
    Unavailable(String),
    #[error("Credential rejected by remote collection")]
    Unauthorized,
    #[error("Record rejected: {0}")]
    Rejected(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Errors surfaced while loading or saving [`crate::config::FormConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
