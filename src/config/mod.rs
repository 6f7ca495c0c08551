//! Configuration module for ilcheck
//!
//! This module handles:
//! - The `Configuration` value object handed to every rule invocation
//! - Project-level configuration (ilcheck.toml)
//! - Rule enable/severity/threshold overrides
//! - CLI defaults

mod error;
mod project_config;
mod rule_config;

pub use error::ConfigError;
pub use project_config::{
    load_project_config, load_project_config_file, normalize_rule_name, CliDefaults,
    ProjectConfig, RuleConfigOverride, ThresholdValue,
};
pub use rule_config::Configuration;
