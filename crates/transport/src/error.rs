//! Error types for the transport layer.

use std::io;

/// Failures talking to the debugger backend.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The backend answered with a non-success status.
    #[error("{status_text} ({code} error)")]
    Status {
        code: u16,
        status_text: String,
        /// Human readable explanation supplied by the backend, if any.
        message: Option<String>,
    },

    /// An I/O error occurred while reading or writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl TransportError {
    /// A client error (400) with an explanation
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Status {
            code: 400,
            status_text: "BAD REQUEST".to_string(),
            message: Some(message.into()),
        }
    }

    /// Text for the status line: the backend's own message when it sent one
    pub fn status_message(&self) -> String {
        match self {
            Self::Status {
                message: Some(message),
                ..
            } => message.clone(),
            other => other.to_string(),
        }
    }
}
