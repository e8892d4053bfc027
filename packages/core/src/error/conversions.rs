//! Conversions from foreign error types

use super::types::{ErrorKind, ResqError};
use crate::config::ConfigurationError;

impl From<serde_json::Error> for ResqError {
    fn from(error: serde_json::Error) -> Self {
        // serde_json already renders "at line N column M"
        ResqError::new(ErrorKind::DocumentParse, error.to_string())
    }
}

impl From<ConfigurationError> for ResqError {
    fn from(error: ConfigurationError) -> Self {
        ResqError::new(ErrorKind::Configuration, error.to_string())
    }
}
