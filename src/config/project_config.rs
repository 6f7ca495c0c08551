//! Project-level configuration support
//!
//! Loads configuration from `ilcheck.toml` or `.ilcheckrc.json` in a
//! directory, or from an explicit file path.
//!
//! # Configuration Format
//!
//! ```toml
//! # ilcheck.toml
//!
//! [rules.avoid-long-methods]
//! enabled = true
//! thresholds = { max_source_line_count = 60, max_instruction_count = 200 }
//!
//! [rules.consider-converting-method-to-property]
//! severity = "medium"  # Override default severity
//!
//! [defaults]
//! format = "text"
//! workers = 8
//! max_defects = 500
//! fail_on = "high"
//! ```

use super::error::ConfigError;
use crate::models::Severity;
use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

/// Project-level configuration loaded from ilcheck.toml or similar
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProjectConfig {
    /// Per-rule configuration overrides
    #[serde(default)]
    pub rules: HashMap<String, RuleConfigOverride>,

    /// Default CLI flags
    #[serde(default)]
    pub defaults: CliDefaults,
}

/// Configuration override for a specific rule
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RuleConfigOverride {
    /// Whether the rule is enabled (default: true)
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Override the default severity (critical, high, medium, low, audit)
    #[serde(default)]
    pub severity: Option<String>,

    /// Rule-specific threshold overrides
    #[serde(default)]
    pub thresholds: HashMap<String, ThresholdValue>,
}

/// A threshold value can be an integer, float, boolean or string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ThresholdValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
}

impl ThresholdValue {
    /// Get as i64 (returns None for non-integer types)
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ThresholdValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ThresholdValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for ThresholdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdValue::Integer(v) => write!(f, "{}", v),
            ThresholdValue::Float(v) => write!(f, "{}", v),
            ThresholdValue::Boolean(v) => write!(f, "{}", v),
            ThresholdValue::String(v) => write!(f, "\"{}\"", v),
        }
    }
}

/// Default CLI flags that can be set in project config
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CliDefaults {
    /// Default output format (text, json)
    #[serde(default)]
    pub format: Option<String>,

    /// Default number of workers
    #[serde(default)]
    pub workers: Option<usize>,

    /// Stop collecting defects after this many
    #[serde(default)]
    pub max_defects: Option<usize>,

    /// Skip rules by default
    #[serde(default)]
    pub skip_rules: Vec<String>,

    /// Fail-on severity threshold for CI
    #[serde(default)]
    pub fail_on: Option<String>,
}

/// Load project configuration from a directory.
///
/// Searches for configuration files in this order:
/// 1. `ilcheck.toml`
/// 2. `.ilcheckrc.json`
///
/// Returns default configuration if no config file is found or loading fails.
pub fn load_project_config(dir: &Path) -> ProjectConfig {
    for name in ["ilcheck.toml", ".ilcheckrc.json"] {
        let path = dir.join(name);
        if !path.exists() {
            continue;
        }
        match load_project_config_file(&path) {
            Ok(config) => {
                debug!("Loaded project config from {}", path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
            }
        }
    }

    debug!("No project config found, using defaults");
    ProjectConfig::default()
}

/// Load configuration from an explicit file; format is chosen by extension
pub fn load_project_config_file(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let config: ProjectConfig = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?
    } else {
        toml::from_str(&content).with_context(|| format!("Invalid TOML in {}", path.display()))?
    };
    Ok(config)
}

impl ProjectConfig {
    fn rule_override(&self, name: &str) -> Option<&RuleConfigOverride> {
        let normalized = normalize_rule_name(name);
        self.rules.get(&normalized).or_else(|| {
            self.rules
                .iter()
                .find(|(key, _)| normalize_rule_name(key) == normalized)
                .map(|(_, c)| c)
        })
    }

    /// Check if a rule is enabled (defaults to true if not specified)
    pub fn is_rule_enabled(&self, name: &str) -> bool {
        let normalized = normalize_rule_name(name);
        if self
            .defaults
            .skip_rules
            .iter()
            .any(|s| normalize_rule_name(s) == normalized)
        {
            return false;
        }
        self.rule_override(name)
            .and_then(|c| c.enabled)
            .unwrap_or(true)
    }

    /// Get severity override for a rule (if any)
    pub fn get_severity_override(&self, name: &str) -> Result<Option<Severity>, ConfigError> {
        let Some(raw) = self.rule_override(name).and_then(|c| c.severity.as_deref()) else {
            return Ok(None);
        };
        Severity::from_str(raw)
            .map(Some)
            .map_err(|_| ConfigError::InvalidSeverity {
                rule: normalize_rule_name(name),
                value: raw.to_string(),
            })
    }

    /// Get threshold value for a rule
    pub fn get_threshold(&self, rule_name: &str, threshold_name: &str) -> Option<&ThresholdValue> {
        self.rule_override(rule_name)
            .and_then(|c| c.thresholds.get(threshold_name))
    }

    /// Get threshold as a non-negative count, rejecting anything else
    pub fn get_threshold_u32(
        &self,
        rule_name: &str,
        threshold_name: &str,
    ) -> Result<Option<u32>, ConfigError> {
        let Some(value) = self.get_threshold(rule_name, threshold_name) else {
            return Ok(None);
        };
        value
            .as_i64()
            .and_then(|v| u32::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| ConfigError::InvalidThreshold {
                rule: normalize_rule_name(rule_name),
                key: threshold_name.to_string(),
                value: value.to_string(),
            })
    }

    /// Get threshold as bool, rejecting non-boolean values
    pub fn get_threshold_bool(
        &self,
        rule_name: &str,
        threshold_name: &str,
    ) -> Result<Option<bool>, ConfigError> {
        let Some(value) = self.get_threshold(rule_name, threshold_name) else {
            return Ok(None);
        };
        value
            .as_bool()
            .map(Some)
            .ok_or_else(|| ConfigError::ExpectedBoolean {
                rule: normalize_rule_name(rule_name),
                key: threshold_name.to_string(),
                value: value.to_string(),
            })
    }
}

/// Normalize rule name for config lookup
/// Converts various formats to kebab-case for matching
pub fn normalize_rule_name(name: &str) -> String {
    // AvoidLongMethodsRule -> avoid-long-methods
    // DisposableTypesShouldHaveFinalizerRule -> disposable-types-should-have-finalizer
    // avoid_long_methods -> avoid-long-methods

    let mut result = String::new();
    let chars: Vec<char> = name.chars().collect();

    for (i, c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            // Hyphen before a new word: aB -> a-b, and ABc -> a-bc (acronym end)
            let prev_is_lower = i > 0 && chars[i - 1].is_lowercase();
            let is_acronym_end = i > 0
                && chars[i - 1].is_uppercase()
                && i + 1 < chars.len()
                && chars[i + 1].is_lowercase();

            if prev_is_lower || is_acronym_end {
                result.push('-');
            }
            result.extend(c.to_lowercase());
        } else if *c == '_' {
            result.push('-');
        } else {
            result.push(*c);
        }
    }

    result.trim_end_matches("-rule").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_rule_name() {
        assert_eq!(normalize_rule_name("AvoidLongMethodsRule"), "avoid-long-methods");
        assert_eq!(normalize_rule_name("avoid_long_methods"), "avoid-long-methods");
        assert_eq!(normalize_rule_name("avoid-long-methods"), "avoid-long-methods");
        assert_eq!(
            normalize_rule_name("ConsiderConvertingMethodToPropertyRule"),
            "consider-converting-method-to-property"
        );
        assert_eq!(normalize_rule_name("IOStreamRule"), "io-stream");
    }

    #[test]
    fn test_threshold_value() {
        let int_val = ThresholdValue::Integer(42);
        assert_eq!(int_val.as_i64(), Some(42));
        assert_eq!(int_val.as_bool(), None);

        let float_val = ThresholdValue::Float(2.5);
        assert_eq!(float_val.as_i64(), None);

        let bool_val = ThresholdValue::Boolean(true);
        assert_eq!(bool_val.as_bool(), Some(true));
        assert_eq!(bool_val.as_i64(), None);
    }

    #[test]
    fn test_default_config() {
        let config = ProjectConfig::default();

        // All rules enabled by default
        assert!(config.is_rule_enabled("avoid-long-methods"));
        assert!(config.is_rule_enabled("AnyOtherRule"));

        // No severity overrides
        assert_eq!(config.get_severity_override("avoid-long-methods"), Ok(None));
    }

    #[test]
    fn test_parse_toml_config() {
        let toml_content = r#"
[rules.avoid-long-methods]
enabled = true
thresholds = { max_source_line_count = 60, use_approximation = true }

[rules.method-can-be-made-static]
severity = "high"
enabled = false

[defaults]
format = "json"
workers = 4
max_defects = 100
skip_rules = ["ConsiderConvertingMethodToPropertyRule"]
"#;

        let config: ProjectConfig = toml::from_str(toml_content).unwrap();

        assert!(config.is_rule_enabled("AvoidLongMethodsRule"));
        assert!(!config.is_rule_enabled("MethodCanBeMadeStaticRule"));
        assert!(!config.is_rule_enabled("consider-converting-method-to-property"));
        assert_eq!(
            config.get_severity_override("MethodCanBeMadeStaticRule"),
            Ok(Some(Severity::High))
        );
        assert_eq!(
            config.get_threshold_u32("AvoidLongMethodsRule", "max_source_line_count"),
            Ok(Some(60))
        );
        assert_eq!(
            config.get_threshold_bool("avoid-long-methods", "use_approximation"),
            Ok(Some(true))
        );
        assert_eq!(config.defaults.format, Some("json".to_string()));
        assert_eq!(config.defaults.workers, Some(4));
        assert_eq!(config.defaults.max_defects, Some(100));
    }

    #[test]
    fn test_invalid_thresholds() {
        let config: ProjectConfig = toml::from_str(
            r#"
[rules.avoid-long-methods]
severity = "severe"
thresholds = { max_source_line_count = -5, use_approximation = "yes", assignment_ratio = 1.5 }
"#,
        )
        .unwrap();

        assert!(matches!(
            config.get_threshold_u32("avoid-long-methods", "max_source_line_count"),
            Err(ConfigError::InvalidThreshold { .. })
        ));
        assert!(matches!(
            config.get_threshold_u32("avoid-long-methods", "assignment_ratio"),
            Err(ConfigError::InvalidThreshold { .. })
        ));
        assert!(matches!(
            config.get_threshold_bool("avoid-long-methods", "use_approximation"),
            Err(ConfigError::ExpectedBoolean { .. })
        ));
        assert_eq!(
            config.get_severity_override("avoid-long-methods"),
            Err(ConfigError::InvalidSeverity {
                rule: "avoid-long-methods".into(),
                value: "severe".into()
            })
        );
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_project_config(dir.path()).rules.is_empty());

        std::fs::write(
            dir.path().join(".ilcheckrc.json"),
            r#"{"rules": {"avoid-long-methods": {"thresholds": {"max_instruction_count": 300}}}}"#,
        )
        .unwrap();
        let config = load_project_config(dir.path());
        assert_eq!(
            config.get_threshold_u32("avoid-long-methods", "max_instruction_count"),
            Ok(Some(300))
        );

        // Broken TOML falls through to the JSON file
        std::fs::write(dir.path().join("ilcheck.toml"), "[rules\n").unwrap();
        let config = load_project_config(dir.path());
        assert!(config.rules.contains_key("avoid-long-methods"));
    }

    #[test]
    fn test_load_errors_name_the_failing_step() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("absent.toml");
        let err = load_project_config_file(&missing).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read"));

        let toml_path = dir.path().join("broken.toml");
        std::fs::write(&toml_path, "[rules\n").unwrap();
        let err = load_project_config_file(&toml_path).unwrap_err();
        assert!(err.to_string().starts_with("Invalid TOML in"));
        assert!(err.to_string().contains("broken.toml"));

        let json_path = dir.path().join("broken.json");
        std::fs::write(&json_path, "{").unwrap();
        let err = load_project_config_file(&json_path).unwrap_err();
        assert!(err.to_string().starts_with("Invalid JSON in"));
    }
}
