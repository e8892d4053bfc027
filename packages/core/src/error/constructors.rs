//! Error constructor functions
//!
//! Factory functions for creating query engine errors with consistent,
//! client-readable messages.

use std::fmt::Display;

use super::types::{ErrorKind, ResqError};

/// Creates an invalid filter expression error
///
/// # Arguments
/// * `expression` - The filter expression being parsed
/// * `reason` - Why the expression is invalid, naming the offending token
/// * `position` - Optional character position where the problem was found
///
/// # Examples
/// ```
/// use resq_core::error::invalid_query_error;
///
/// let error = invalid_query_error("a=1 AND", "missing operand after 'AND'", Some(4));
/// assert!(error.message.contains("position 4"));
/// ```
pub fn invalid_query_error(
    expression: &str,
    reason: impl Into<String>,
    position: Option<usize>,
) -> ResqError {
    let reason = reason.into();
    let message = match position {
        Some(pos) => format!("'{expression}': {reason} at position {pos}"),
        None => format!("'{expression}': {reason}"),
    };
    ResqError::new(ErrorKind::InvalidQuery, message)
}

/// Creates an error for a property the resource schema does not define
pub fn unknown_property_error(property: impl Display, resource_type: &str) -> ResqError {
    ResqError::new(
        ErrorKind::UnknownProperty,
        format!("'{property}' is not a property of resource type '{resource_type}'"),
    )
}

/// Creates an error for a comparison whose operands cannot be ordered
///
/// # Arguments
/// * `operator` - The comparison operator symbol (`<`, `>=`, ...)
/// * `value` - The property value found on the resource
/// * `operand` - The literal operand from the filter
pub fn evaluation_type_error(operator: &str, value: &str, operand: &str) -> ResqError {
    ResqError::new(
        ErrorKind::EvaluationType,
        format!(
            "cannot apply '{operator}' to '{value}' and '{operand}': operands must both be numeric or both be timestamps"
        ),
    )
}

/// Creates an error for nesting beyond a configured bound
pub fn depth_exceeded_error(what: &str, limit: usize) -> ResqError {
    ResqError::new(
        ErrorKind::DepthExceeded,
        format!("{what} exceeds the maximum depth of {limit}"),
    )
}

/// Creates a nested document parse error
pub fn document_parse_error(message: impl Into<String>) -> ResqError {
    ResqError::new(ErrorKind::DocumentParse, message.into())
}

/// Creates an error for a tree operation that would corrupt the tree
pub fn invalid_tree_error(message: impl Into<String>) -> ResqError {
    ResqError::new(ErrorKind::InvalidTree, message.into())
}

/// Creates a resource provider failure
pub fn provider_error(resource_type: &str, message: impl Display) -> ResqError {
    ResqError::new(
        ErrorKind::Provider,
        format!("provider failed for resource type '{resource_type}': {message}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_query_without_position() {
        let err = invalid_query_error("(a=1", "unmatched '('", None);
        assert_eq!(err.kind, ErrorKind::InvalidQuery);
        assert_eq!(err.message, "'(a=1': unmatched '('");
    }

    #[test]
    fn test_evaluation_type_error_names_operands() {
        let err = evaluation_type_error("<", "STARTED", "5");
        assert!(err.message.contains("'STARTED'"));
        assert!(err.message.contains("'5'"));
    }
}
