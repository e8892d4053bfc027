//! Engine configuration
//!
//! Limits that guard the parser, the document flattener and result tree
//! assembly against adversarial input. The configuration is built once and
//! passed explicitly; nothing in the engine reads global state.

use serde::Deserialize;

use crate::error::ResqResult;
use crate::parser::MAX_BASE_PRECEDENCE;

pub mod validation;

pub use validation::{ConfigResult, ConfigValidator, ConfigurationError, Validator};

/// Query engine limits
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum parenthesis nesting in a filter expression
    pub max_expression_depth: usize,
    /// Maximum object nesting in a flattened document
    pub max_document_depth: usize,
    /// Maximum sub-resource nesting while assembling result trees
    pub max_tree_depth: usize,
    /// Maximum filter expression length in characters
    pub max_filter_length: usize,
    /// Amount added to operator precedence inside each parenthesized group
    pub context_precedence_step: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_expression_depth: 32,
            max_document_depth: 64,
            max_tree_depth: 16,
            max_filter_length: 8 * 1024,
            context_precedence_step: 10,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON, filling omitted fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns a document parse error for malformed JSON and a configuration
    /// error when the resulting limits fail validation.
    pub fn from_json_str(json: &str) -> ResqResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_max_expression_depth(mut self, depth: usize) -> Self {
        self.max_expression_depth = depth;
        self
    }

    #[must_use]
    pub fn with_max_document_depth(mut self, depth: usize) -> Self {
        self.max_document_depth = depth;
        self
    }

    #[must_use]
    pub fn with_max_tree_depth(mut self, depth: usize) -> Self {
        self.max_tree_depth = depth;
        self
    }

    #[must_use]
    pub fn with_max_filter_length(mut self, length: usize) -> Self {
        self.max_filter_length = length;
        self
    }

    #[must_use]
    pub fn with_context_precedence_step(mut self, step: u32) -> Self {
        self.context_precedence_step = step;
        self
    }
}

impl Validator for EngineConfig {
    fn validate(&self) -> ConfigResult<()> {
        ConfigValidator::validate_depth(self.max_expression_depth, "max_expression_depth")?;
        ConfigValidator::validate_depth(self.max_document_depth, "max_document_depth")?;
        ConfigValidator::validate_depth(self.max_tree_depth, "max_tree_depth")?;
        ConfigValidator::validate_length(self.max_filter_length, "max_filter_length")?;
        ConfigValidator::validate_range(self.context_precedence_step, 1, 1000, "context_precedence_step")?;

        // Inner operators must outrank every outer operator regardless of kind.
        if self.context_precedence_step <= MAX_BASE_PRECEDENCE {
            return Err(ConfigurationError::Conflict(format!(
                "context_precedence_step ({}) must be greater than the highest operator precedence ({MAX_BASE_PRECEDENCE})",
                self.context_precedence_step
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json_str(r#"{"max_expression_depth": 4}"#).unwrap();
        assert_eq!(config.max_expression_depth, 4);
        assert_eq!(config.max_tree_depth, EngineConfig::default().max_tree_depth);
    }

    #[test]
    fn test_step_must_outrank_base_precedence() {
        let config = EngineConfig::default().with_context_precedence_step(2);
        assert!(matches!(config.validate(), Err(ConfigurationError::Conflict(_))));
    }

    #[test]
    fn test_invalid_json_config() {
        let err = EngineConfig::from_json_str(r#"{"max_tree_depth": 0}"#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);

        let err = EngineConfig::from_json_str("{not json").unwrap_err();
        assert_eq!(err.kind, ErrorKind::DocumentParse);
    }
}
