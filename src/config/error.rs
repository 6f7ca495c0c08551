//! Typed configuration errors

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("threshold `{key}` of rule `{rule}` must be a non-negative integer, got {value}")]
    InvalidThreshold {
        rule: String,
        key: String,
        value: String,
    },

    #[error("threshold `{key}` of rule `{rule}` must be a boolean, got {value}")]
    ExpectedBoolean {
        rule: String,
        key: String,
        value: String,
    },

    #[error("unknown severity `{value}` for rule `{rule}`")]
    InvalidSeverity { rule: String, value: String },
}
