//! Thresholds shared by every rule invocation

use super::error::ConfigError;
use super::project_config::ProjectConfig;
use serde::{Deserialize, Serialize};

/// Rule that owns the size thresholds in project config files
const SIZE_RULE: &str = "avoid-long-methods";

/// Numeric thresholds read by the rules.
///
/// Built before a run and shared read-only for its duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Logical source lines allowed per method (debug-symbol path)
    pub max_source_line_count: u32,
    /// Instructions allowed per method (approximate path)
    pub max_instruction_count: u32,
    /// Instructions assumed per field assignment in a constructor
    pub assignment_ratio: u32,
    /// Weight of one array dimension in field accounting
    pub default_array_element_weight: u32,
    /// Use the instruction-count path even when symbols are available
    pub use_approximation: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            max_source_line_count: 40,
            max_instruction_count: 165,
            assignment_ratio: 7,
            default_array_element_weight: 13,
            use_approximation: false,
        }
    }
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply threshold overrides from a project config
    pub fn from_project(project: &ProjectConfig) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let count = |key: &str, default: u32| -> Result<u32, ConfigError> {
            Ok(project.get_threshold_u32(SIZE_RULE, key)?.unwrap_or(default))
        };

        Ok(Self {
            max_source_line_count: count("max_source_line_count", defaults.max_source_line_count)?,
            max_instruction_count: count("max_instruction_count", defaults.max_instruction_count)?,
            assignment_ratio: count("assignment_ratio", defaults.assignment_ratio)?,
            default_array_element_weight: count(
                "default_array_element_weight",
                defaults.default_array_element_weight,
            )?,
            use_approximation: project
                .get_threshold_bool(SIZE_RULE, "use_approximation")?
                .unwrap_or(defaults.use_approximation),
        })
    }

    pub fn with_max_source_line_count(mut self, max: u32) -> Self {
        self.max_source_line_count = max;
        self
    }

    pub fn with_max_instruction_count(mut self, max: u32) -> Self {
        self.max_instruction_count = max;
        self
    }

    pub fn with_assignment_ratio(mut self, ratio: u32) -> Self {
        self.assignment_ratio = ratio;
        self
    }

    pub fn with_default_array_element_weight(mut self, weight: u32) -> Self {
        self.default_array_element_weight = weight;
        self
    }

    pub fn with_approximation(mut self, force: bool) -> Self {
        self.use_approximation = force;
        self
    }
}
