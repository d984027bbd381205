//! Error types for the task client.
//!
//! # Design
//! Every resource call returns `Result<T, ApiError>`. The variants separate
//! "nothing came back" (`Transport`) from "the server answered and said no"
//! (`Rejected`, `Unauthorized`), so stores can pick the most specific
//! message to show without inspecting raw responses.

use thiserror::Error;

/// Failure to obtain any response from the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connection refused, DNS failure, reset, and the like.
    #[error("{0}")]
    Network(String),

    #[error("timeout of {0}ms exceeded")]
    Timeout(u64),
}

/// Errors returned by resource client parse methods and the API client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A response arrived but its status was non-2xx or its success flag was
    /// false or missing.
    #[error("request rejected with status {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { status: u16, message: Option<String> },

    /// The server returned 401; the session has already been torn down.
    #[error("unauthorized: {}", .message.as_deref().unwrap_or("no message"))]
    Unauthorized { message: Option<String> },

    /// The response body could not be decoded into the expected shape.
    #[error("deserialization failed: {0}")]
    Decode(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Encode(String),
}

impl ApiError {
    /// The message a user should see for this failure.
    ///
    /// Prefers the server's own message, then the generic status text for
    /// non-2xx answers, and finally `fallback` for a 2xx answer whose
    /// success flag was not set.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Transport(err) => err.to_string(),
            ApiError::Rejected {
                message: Some(message),
                ..
            }
            | ApiError::Unauthorized {
                message: Some(message),
            } => message.clone(),
            ApiError::Rejected {
                status,
                message: None,
            } if !(200..300).contains(status) => {
                format!("Request failed with status code {status}")
            }
            ApiError::Rejected { .. } => fallback.to_string(),
            ApiError::Unauthorized { message: None } => {
                "Request failed with status code 401".to_string()
            }
            ApiError::Decode(msg) | ApiError::Encode(msg) => msg.clone(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

/// Errors from the persistence service.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not encode value for key {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised while loading `ClientConfig`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}
