//! Configuration validation utilities
//!
//! Range checks shared by the engine configuration types.

/// Configuration validation result type
pub type ConfigResult<T> = Result<T, ConfigurationError>;

/// Configuration error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Invalid depth limit: {0}")]
    InvalidDepth(String),

    #[error("Invalid length limit: {0}")]
    InvalidLength(String),

    #[error("Invalid configuration parameter: {0}")]
    InvalidParameter(String),

    #[error("Configuration conflict: {0}")]
    Conflict(String),
}

/// Configuration validation trait
pub trait Validator {
    /// Validates the configuration settings
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` variant if any validation fails:
    /// - `InvalidDepth` - if a nesting bound is zero or exceeds the hard ceiling
    /// - `InvalidLength` - if the filter length limit is zero or too large
    /// - `InvalidParameter` - if parameters are outside valid ranges
    /// - `Conflict` - if settings contradict each other
    fn validate(&self) -> ConfigResult<()>;
}

/// Common configuration validation utilities
pub struct ConfigValidator;

impl ConfigValidator {
    /// Hard ceiling for any nesting bound; deeper recursion risks the stack.
    pub const MAX_DEPTH_CEILING: usize = 1024;

    /// Validate a nesting depth bound
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidDepth` if the depth is zero or
    /// exceeds [`Self::MAX_DEPTH_CEILING`].
    pub fn validate_depth(depth: usize, name: &str) -> ConfigResult<()> {
        if depth == 0 {
            return Err(ConfigurationError::InvalidDepth(format!(
                "{name} cannot be zero"
            )));
        }

        if depth > Self::MAX_DEPTH_CEILING {
            return Err(ConfigurationError::InvalidDepth(format!(
                "{name} cannot exceed {}",
                Self::MAX_DEPTH_CEILING
            )));
        }

        Ok(())
    }

    /// Validate a length limit
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidLength` if the length is zero or
    /// exceeds 1MB.
    pub fn validate_length(length: usize, name: &str) -> ConfigResult<()> {
        if length == 0 {
            return Err(ConfigurationError::InvalidLength(format!(
                "{name} cannot be zero"
            )));
        }

        if length > 1024 * 1024 {
            return Err(ConfigurationError::InvalidLength(format!(
                "{name} cannot exceed 1MB"
            )));
        }

        Ok(())
    }

    /// Validate numeric range
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidParameter` if the value is outside
    /// the specified range [min, max] (inclusive).
    pub fn validate_range<T>(value: T, min: T, max: T, name: &str) -> ConfigResult<()>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if value < min || value > max {
            return Err(ConfigurationError::InvalidParameter(format!(
                "{name} must be between {min} and {max}, got {value}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_depth() {
        assert!(ConfigValidator::validate_depth(8, "depth").is_ok());
        assert!(matches!(
            ConfigValidator::validate_depth(0, "depth"),
            Err(ConfigurationError::InvalidDepth(_))
        ));
        assert!(ConfigValidator::validate_depth(ConfigValidator::MAX_DEPTH_CEILING + 1, "depth").is_err());
    }

    #[test]
    fn test_validate_range_message() {
        let err = ConfigValidator::validate_range(0u32, 5, 100, "step").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration parameter: step must be between 5 and 100, got 0"
        );
    }
}
