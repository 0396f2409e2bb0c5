//! Error types for lmstudio-rs

use std::{fmt, path::PathBuf};

use thiserror::Error;

/// Result type alias using [`VendorError`]
pub type Result<T> = std::result::Result<T, VendorError>;

/// Vendor operation an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Configure,
    ListModels,
    Send,
    SendStream,
    Complete,
    Embeddings,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configure => write!(f, "configure"),
            Self::ListModels => write!(f, "list models"),
            Self::Send => write!(f, "send"),
            Self::SendStream => write!(f, "send stream"),
            Self::Complete => write!(f, "complete"),
            Self::Embeddings => write!(f, "embeddings"),
        }
    }
}

/// Broad category of a [`VendorError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport could not be initialized or the endpoint is not set
    Configuration,
    /// Request could not be built or the network exchange failed
    Transport,
    /// Server answered with a non-200 status
    Protocol,
    /// Body is not JSON or not a JSON object
    Decode,
    /// A required field is absent or has the wrong type
    Schema,
    /// Operation is permanently unsupported by the vendor
    Capability,
    /// Valid response without any usable element
    EmptyResult,
}

/// Main error type for vendor adapters
#[derive(Debug, Error)]
pub enum VendorError {
    /// The configure routine failed to produce a transport
    #[error("{vendor}: failed to configure transport: {reason}")]
    Configuration { vendor: String, reason: String },

    /// A network operation was attempted before `configure()` succeeded
    #[error("{vendor}: {operation} called before the transport was configured")]
    NotConfigured { vendor: String, operation: Operation },

    /// Base URL is empty
    #[error("{vendor}: {operation} requires a base URL")]
    MissingBaseUrl { vendor: String, operation: Operation },

    /// Outgoing payload could not be serialized
    #[error("{operation}: failed to marshal payload: {source}")]
    Serialize {
        operation: Operation,
        #[source]
        source: serde_json::Error,
    },

    /// HTTP request could not be built
    #[error("{operation}: failed to create request: {source}")]
    Request {
        operation: Operation,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP exchange failed (connect, TLS, body read)
    #[error("{operation}: failed to send request: {source}")]
    Http {
        operation: Operation,
        #[source]
        source: reqwest::Error,
    },

    /// Request was cancelled or ran past its deadline
    #[error("{operation}: failed to send request: {reason}")]
    Transport { operation: Operation, reason: String },

    /// Server returned something other than 200 OK
    #[error("{operation}: unexpected status code: {status}")]
    Status { operation: Operation, status: u16 },

    /// Body is not valid JSON or not a JSON object
    #[error("{operation}: failed to decode response: {source}")]
    Decode {
        operation: Operation,
        #[source]
        source: serde_json::Error,
    },

    /// Required response field is absent or null
    #[error("{operation}: invalid response format: missing {field}")]
    MissingField {
        operation: Operation,
        field: &'static str,
    },

    /// Response field is present with the wrong type
    #[error("{operation}: invalid response format: {field} is not {expected}")]
    InvalidField {
        operation: Operation,
        field: &'static str,
        expected: &'static str,
    },

    /// `choices` decoded to an empty array
    #[error("{operation}: invalid response format: empty choices")]
    EmptyChoices { operation: Operation },

    /// Embeddings `data` decoded to an empty array
    #[error("{operation}: no embeddings returned")]
    NoEmbeddings { operation: Operation },

    /// Capability the vendor does not offer
    #[error("{capability} is not currently supported for {vendor}")]
    Unsupported {
        vendor: String,
        capability: &'static str,
    },

    /// Env file could not be parsed
    #[error("Failed to parse env file at {path}: {message}")]
    EnvFile { path: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VendorError {
    /// Category of this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. }
            | Self::NotConfigured { .. }
            | Self::MissingBaseUrl { .. }
            | Self::EnvFile { .. } => ErrorKind::Configuration,
            Self::Serialize { .. }
            | Self::Request { .. }
            | Self::Http { .. }
            | Self::Transport { .. }
            | Self::Io(_) => ErrorKind::Transport,
            Self::Status { .. } => ErrorKind::Protocol,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::MissingField { .. } | Self::InvalidField { .. } => ErrorKind::Schema,
            Self::EmptyChoices { .. } | Self::NoEmbeddings { .. } => ErrorKind::EmptyResult,
            Self::Unsupported { .. } => ErrorKind::Capability,
        }
    }

    /// Operation that produced the error, if any
    #[must_use]
    pub const fn operation(&self) -> Option<Operation> {
        match self {
            Self::NotConfigured { operation, .. }
            | Self::MissingBaseUrl { operation, .. }
            | Self::Serialize { operation, .. }
            | Self::Request { operation, .. }
            | Self::Http { operation, .. }
            | Self::Transport { operation, .. }
            | Self::Status { operation, .. }
            | Self::Decode { operation, .. }
            | Self::MissingField { operation, .. }
            | Self::InvalidField { operation, .. }
            | Self::EmptyChoices { operation }
            | Self::NoEmbeddings { operation } => Some(*operation),
            Self::Configuration { .. } => Some(Operation::Configure),
            Self::Unsupported { .. } => Some(Operation::SendStream),
            Self::EnvFile { .. } | Self::Io(_) => None,
        }
    }

    /// HTTP status code for protocol errors
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when retrying can never succeed against this vendor
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(self.kind(), ErrorKind::Capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_carries_code() {
        let err = VendorError::Status {
            operation: Operation::Send,
            status: 503,
        };
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert_eq!(err.status_code(), Some(503));
        assert_eq!(err.to_string(), "send: unexpected status code: 503");
    }

    #[test]
    fn test_missing_field_message() {
        let err = VendorError::MissingField {
            operation: Operation::Complete,
            field: "choices[0].text",
        };
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert_eq!(err.operation(), Some(Operation::Complete));
        assert!(err.to_string().contains("missing choices[0].text"));
    }

    #[test]
    fn test_unsupported_is_permanent() {
        let err = VendorError::Unsupported {
            vendor: "LM Studio".into(),
            capability: "streaming",
        };
        assert!(err.is_permanent());
        assert_eq!(
            err.to_string(),
            "streaming is not currently supported for LM Studio"
        );

        let transient = VendorError::Transport {
            operation: Operation::Send,
            reason: "connection refused".into(),
        };
        assert!(!transient.is_permanent());
    }

    #[test]
    fn test_no_status_code_outside_protocol_errors() {
        let err = VendorError::NoEmbeddings {
            operation: Operation::Embeddings,
        };
        assert_eq!(err.kind(), ErrorKind::EmptyResult);
        assert_eq!(err.status_code(), None);
    }
}
