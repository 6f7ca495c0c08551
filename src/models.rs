//! Core data models for ilcheck
//!
//! These models are shared by rules, the engine and the reporters for
//! representing defect locations, emitted defects and run reports.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity levels for defects
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Audit,
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Audit => write!(f, "audit"),
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "audit" => Ok(Severity::Audit),
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(anyhow::anyhow!(
                "Unknown severity '{}'. Valid severities: audit, low, medium, high, critical",
                s
            )),
        }
    }
}

/// How sure a rule is that a defect is real
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    #[default]
    Normal,
    High,
    /// The defect follows syntactically from the metadata
    Total,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Low => write!(f, "low"),
            Confidence::Normal => write!(f, "normal"),
            Confidence::High => write!(f, "high"),
            Confidence::Total => write!(f, "total"),
        }
    }
}

/// Where a defect was found
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Location {
    Type { type_name: String },
    Method { type_name: String, method: String },
    Field { type_name: String, field: String },
}

impl Location {
    pub fn type_name(&self) -> &str {
        match self {
            Location::Type { type_name }
            | Location::Method { type_name, .. }
            | Location::Field { type_name, .. } => type_name,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Type { type_name } => write!(f, "{}", type_name),
            Location::Method { type_name, method } => write!(f, "{}::{}", type_name, method),
            Location::Field { type_name, field } => write!(f, "{}::{}", type_name, field),
        }
    }
}

/// A defect emitted by a rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defect {
    /// Name of the rule that emitted the defect
    pub rule: String,
    pub location: Location,
    pub severity: Severity,
    pub confidence: Confidence,
    /// Free-form detail, may be empty
    #[serde(default)]
    pub message: String,
}

/// Summary of defects by severity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefectSummary {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub audit: usize,
    pub total: usize,
}

impl DefectSummary {
    pub fn from_defects(defects: &[Defect]) -> Self {
        let mut summary = Self::default();
        for d in defects {
            match d.severity {
                Severity::Critical => summary.critical += 1,
                Severity::High => summary.high += 1,
                Severity::Medium => summary.medium += 1,
                Severity::Low => summary.low += 1,
                Severity::Audit => summary.audit += 1,
            }
            summary.total += 1;
        }
        summary
    }

    /// Number of defects at or above `severity`
    pub fn at_or_above(&self, severity: Severity) -> usize {
        let mut n = self.critical;
        if severity <= Severity::High {
            n += self.high;
        }
        if severity <= Severity::Medium {
            n += self.medium;
        }
        if severity <= Severity::Low {
            n += self.low;
        }
        if severity <= Severity::Audit {
            n += self.audit;
        }
        n
    }
}

/// Verdict counts for one rule over a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleStats {
    pub rule: String,
    pub not_applicable: usize,
    pub success: usize,
    pub failure: usize,
    /// Invocations that panicked and were reported as meta-defects
    pub errors: usize,
}

/// Full result of checking one assembly
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub assembly: String,
    pub defects: Vec<Defect>,
    pub summary: DefectSummary,
    pub rules: Vec<RuleStats>,
    pub types_checked: usize,
    pub methods_checked: usize,
    /// Defects discarded after the defect cutoff was reached
    pub defects_dropped: usize,
    pub duration_ms: u64,
}
