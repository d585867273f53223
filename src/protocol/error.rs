//! Error types for dispatch operations

use thiserror::Error;

/// JSON-RPC error code for unknown method names.
pub const CODE_METHOD_NOT_FOUND: i32 = -32601;
/// JSON-RPC error code for invalid or missing parameters.
pub const CODE_INVALID_PARAMS: i32 = -32602;
/// JSON-RPC error code for internal and execution errors.
pub const CODE_INTERNAL_ERROR: i32 = -32603;
/// JSON-RPC error code for unparseable request bodies.
pub const CODE_PARSE_ERROR: i32 = -32700;

/// Main error type for the dispatcher
///
/// Fatal variants (`Config`, `Transport`) abort startup. All other variants
/// are per-request: they are caught at the protocol boundary and converted
/// to a JSON-RPC error object or an HTTP status, never crossing requests.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Configuration error (missing required fields, unreadable file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level error (port already bound, listener failure)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Validation error (malformed envelope, missing message, empty text)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown JSON-RPC method
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// The workflow engine failed or returned an unusable shape
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// Unknown task or route
    #[error("Not found: {0}")]
    NotFound(String),

    /// A configured deadline was exceeded
    #[error("Request timeout")]
    Timeout,

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DispatchError {
    /// Map this error to its JSON-RPC 2.0 error code.
    ///
    /// Validation failures map to `-32602` and unknown methods to `-32601`;
    /// everything else is an internal error (`-32603`).
    pub fn jsonrpc_code(&self) -> i32 {
        match self {
            DispatchError::Validation(_) | DispatchError::Serialization(_) => CODE_INVALID_PARAMS,
            DispatchError::MethodNotFound(_) => CODE_METHOD_NOT_FOUND,
            _ => CODE_INTERNAL_ERROR,
        }
    }

    /// Map this error to an HTTP status code for the REST surface.
    pub fn http_status(&self) -> u16 {
        match self {
            DispatchError::Validation(_) | DispatchError::Serialization(_) => 400,
            DispatchError::NotFound(_) | DispatchError::MethodNotFound(_) => 404,
            _ => 500,
        }
    }

    /// Short machine-readable label used in REST error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::Config(_) => "configuration_error",
            DispatchError::Transport(_) => "transport_error",
            DispatchError::Validation(_) => "validation_error",
            DispatchError::MethodNotFound(_) => "method_not_found",
            DispatchError::ExecutionFailed(_) => "execution_failed",
            DispatchError::NotFound(_) => "not_found",
            DispatchError::Timeout => "timeout",
            DispatchError::Serialization(_) => "serialization_error",
        }
    }

    /// True for errors that abort the process instead of a single request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DispatchError::Config(_) | DispatchError::Transport(_))
    }
}

/// Result type alias for dispatch operations
pub type DispatchResult<T> = Result<T, DispatchError>;

impl From<&str> for DispatchError {
    fn from(s: &str) -> Self {
        DispatchError::ExecutionFailed(s.to_string())
    }
}

impl From<String> for DispatchError {
    fn from(s: String) -> Self {
        DispatchError::ExecutionFailed(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jsonrpc_code_mapping() {
        assert_eq!(
            DispatchError::Validation("bad".into()).jsonrpc_code(),
            CODE_INVALID_PARAMS
        );
        assert_eq!(
            DispatchError::MethodNotFound("nope".into()).jsonrpc_code(),
            CODE_METHOD_NOT_FOUND
        );
        assert_eq!(
            DispatchError::ExecutionFailed("boom".into()).jsonrpc_code(),
            CODE_INTERNAL_ERROR
        );
        assert_eq!(DispatchError::Timeout.jsonrpc_code(), CODE_INTERNAL_ERROR);
        assert_eq!(
            DispatchError::NotFound("task-1".into()).jsonrpc_code(),
            CODE_INTERNAL_ERROR
        );
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(DispatchError::Validation("bad".into()).http_status(), 400);
        assert_eq!(DispatchError::NotFound("task-1".into()).http_status(), 404);
        assert_eq!(
            DispatchError::ExecutionFailed("boom".into()).http_status(),
            500
        );
        assert_eq!(DispatchError::Timeout.http_status(), 500);
    }

    #[test]
    fn test_fatal_errors() {
        assert!(DispatchError::Config("missing name".into()).is_fatal());
        assert!(DispatchError::Transport("port in use".into()).is_fatal());
        assert!(!DispatchError::Validation("bad".into()).is_fatal());
        assert!(!DispatchError::Timeout.is_fatal());
    }

    #[test]
    fn test_error_display() {
        let err = DispatchError::ExecutionFailed("engine exploded".into());
        assert_eq!(err.to_string(), "Execution failed: engine exploded");

        let err = DispatchError::Timeout;
        assert_eq!(err.to_string(), "Request timeout");
    }
}
