//! Query Engine Error Types
//!
//! Core error types shared by the parser, evaluator and query executor.

use std::error::Error;
use std::fmt;

/// Query engine error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed filter expression or field list
    InvalidQuery,
    /// Filter or projection references a property the schema does not define
    UnknownProperty,
    /// Comparison applied to operands that cannot be ordered
    EvaluationType,
    /// Parser, document or result tree nesting exceeded a configured bound
    DepthExceeded,
    /// Nested property document could not be parsed
    DocumentParse,
    /// Result tree manipulation that would break the tree structure
    InvalidTree,
    /// Resource provider failure
    Provider,
    /// Invalid engine configuration
    Configuration,
}

impl ErrorKind {
    /// Short label used in rendered messages
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::InvalidQuery => "Invalid query",
            ErrorKind::UnknownProperty => "Unknown property",
            ErrorKind::EvaluationType => "Evaluation type error",
            ErrorKind::DepthExceeded => "Depth limit exceeded",
            ErrorKind::DocumentParse => "Document parse error",
            ErrorKind::InvalidTree => "Invalid tree operation",
            ErrorKind::Provider => "Resource provider error",
            ErrorKind::Configuration => "Configuration error",
        }
    }
}

/// Main query engine error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResqError {
    pub kind: ErrorKind,
    pub message: String,
}

impl fmt::Display for ResqError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.message)
    }
}

impl Error for ResqError {}

/// Result type for query engine operations
pub type ResqResult<T> = Result<T, ResqError>;

impl ResqError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: String) -> Self {
        Self { kind, message }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the failure was caused by the client's request rather than the server.
    ///
    /// Malformed filters, unknown properties and oversized requests map to a
    /// 4xx-equivalent response; everything else is a server-side failure.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::InvalidQuery
                | ErrorKind::UnknownProperty
                | ErrorKind::DepthExceeded
                | ErrorKind::DocumentParse
        )
    }
}
