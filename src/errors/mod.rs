use thiserror::Error;

use crate::services::publish::ResultMode;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures of a preview or publish run
#[derive(Debug, Error)]
pub enum PublishError {
    /// The pasted text produced no records; nothing was read or written
    #[error("parsed 0 {0} records, check the input format")]
    EmptyBatch(ResultMode),

    #[error("invalid tournament tag `{0}` (use letters, digits, '-' or '_')")]
    InvalidTag(String),

    #[error("storage access failed for `{key}`")]
    Storage {
        key: String,
        #[source]
        source: BoxError,
    },

    #[error("stored state at `{key}` could not be decoded")]
    CorruptState {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to render report")]
    Render(#[source] BoxError),

    /// Raised after the state and report were written
    #[error("notification to {recipient} failed (results were already published)")]
    Notification {
        recipient: String,
        #[source]
        source: BoxError,
    },
}

impl PublishError {
    pub fn storage(key: &str, error: anyhow::Error) -> Self {
        PublishError::Storage {
            key: key.to_string(),
            source: error.into(),
        }
    }

    pub fn notification(recipient: &str, error: anyhow::Error) -> Self {
        PublishError::Notification {
            recipient: recipient.to_string(),
            source: error.into(),
        }
    }
}

/// Context message for store reads
pub fn read_context(key: &str) -> String {
    format!("Failed to read from store: {}", key)
}

/// Context message for store writes
pub fn write_context(key: &str) -> String {
    format!("Failed to write to store: {}", key)
}
