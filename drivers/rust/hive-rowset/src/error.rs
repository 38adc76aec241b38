use crate::protocol::OperationState;
use thiserror::Error;

/// Boxed error returned by an [`OperationService`](crate::OperationService)
/// implementation when a call fails outright.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for rowset operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The RPC itself failed.
    #[error("{call} transport error: {source}")]
    Transport {
        call: &'static str,
        #[source]
        source: BoxError,
    },

    /// The RPC completed but the service did not acknowledge success.
    #[error("{call} call failed: {status}")]
    Service { call: &'static str, status: String },

    /// The service acknowledged success but left out the payload.
    #[error("{call} returned no error but {message}")]
    Protocol { call: &'static str, message: String },

    /// The operation reached a terminal state other than finished.
    #[error("query failed execution: {state}{}", .message.as_deref().map(|m| format!(" ({})", m)).unwrap_or_default())]
    Execution {
        state: OperationState,
        message: Option<String>,
    },

    /// A protocol row could not be converted into native values.
    #[error("row conversion error: {0}")]
    ColumnConversion(#[from] ConversionError),

    /// Scan was given the wrong number of destinations.
    #[error("can't scan into {actual} destinations with a row of width {expected}")]
    Arity { expected: usize, actual: usize },

    /// A destination can't hold the value in its column.
    #[error("can't scan value {value} into destination of type {destination}")]
    TypeMismatch {
        destination: &'static str,
        value: String,
    },

    /// Scan called before a successful `next()`.
    #[error("no row to scan, call next() first")]
    NoCurrentRow,

    /// The rowset was closed.
    #[error("rowset is closed")]
    Closed,

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Handle serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Handle text form decode error.
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Failure converting one protocol row.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// No value kind is set on the column.
    #[error("can't convert column {index}: no value kind is set")]
    UnsetColumn { index: usize },

    /// The row is not as wide as the result schema.
    #[error("returned row has {actual} values, but scan row has {expected}")]
    WidthMismatch { expected: usize, actual: usize },
}

impl Error {
    pub(crate) fn transport(call: &'static str, source: BoxError) -> Self {
        Error::Transport { call, source }
    }

    pub(crate) fn protocol(call: &'static str, message: impl Into<String>) -> Self {
        Error::Protocol {
            call,
            message: message.into(),
        }
    }

    /// True for the transport, service and protocol failures of a remote call.
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            Error::Transport { .. } | Error::Service { .. } | Error::Protocol { .. }
        )
    }
}
