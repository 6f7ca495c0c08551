//! Base rule trait and types
//!
//! This module defines the core abstractions for defect checks:
//! - `Rule` trait that all rules implement
//! - `Verdict`, the outcome of one rule on one element
//! - `RuleContext` and `DefectSink` for emitting defects

use crate::config::Configuration;
use crate::metadata::{ElementModel, FieldDef, MethodRef, TypeDef};
use crate::models::{Confidence, Defect, Location, RuleStats, Severity};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Outcome of one rule invocation on one element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// A guard excluded the element before any metric was computed
    NotApplicable,
    Success,
    Failure,
}

/// Which kind of element a rule inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleTarget {
    Method,
    Type,
}

/// Receives emitted defects; must tolerate concurrent callers
pub trait DefectSink: Send + Sync {
    fn emit(&self, defect: Defect);
}

/// Append-only, thread-safe defect store with an optional cutoff
#[derive(Debug, Default)]
pub struct DefectCollector {
    defects: Mutex<Vec<Defect>>,
    limit: Option<usize>,
    dropped: AtomicUsize,
}

impl DefectCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `limit` defects; later ones are counted and discarded
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Consume the collector, returning defects in emission order
    pub fn into_defects(self) -> Vec<Defect> {
        self.defects
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Defect>> {
        self.defects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DefectSink for DefectCollector {
    fn emit(&self, defect: Defect) {
        let mut defects = self.lock();
        if self.limit.is_some_and(|limit| defects.len() >= limit) {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        }
        defects.push(defect);
    }
}

/// Everything a rule may read during one invocation, plus the defect sink
pub struct RuleContext<'a> {
    model: &'a dyn ElementModel,
    config: &'a Configuration,
    sink: &'a dyn DefectSink,
    rule: &'static str,
    severity_override: Option<Severity>,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        rule: &'static str,
        model: &'a dyn ElementModel,
        config: &'a Configuration,
        sink: &'a dyn DefectSink,
    ) -> Self {
        Self {
            model,
            config,
            sink,
            rule,
            severity_override: None,
        }
    }

    /// Replace the severity of every defect reported through this context
    pub fn with_severity_override(mut self, severity: Option<Severity>) -> Self {
        self.severity_override = severity;
        self
    }

    pub fn model(&self) -> &'a dyn ElementModel {
        self.model
    }

    pub fn config(&self) -> &'a Configuration {
        self.config
    }

    pub fn rule(&self) -> &'static str {
        self.rule
    }

    /// Emit a defect on behalf of the current rule
    pub fn report(
        &self,
        location: Location,
        severity: Severity,
        confidence: Confidence,
        message: impl Into<String>,
    ) {
        self.sink.emit(Defect {
            rule: self.rule.to_string(),
            location,
            severity: self.severity_override.unwrap_or(severity),
            confidence,
            message: message.into(),
        });
    }
}

/// Trait for all defect rules
///
/// A rule is a pure function of one element and the configuration. It
/// returns exactly one verdict per invocation and may emit any number of
/// defects through the context.
///
/// # Example Implementation
///
/// ```ignore
/// pub struct MyRule;
///
/// impl Rule for MyRule {
///     fn name(&self) -> &'static str {
///         "MyRule"
///     }
///
///     fn description(&self) -> &'static str {
///         "Detects my specific defect"
///     }
///
///     fn target(&self) -> RuleTarget {
///         RuleTarget::Method
///     }
///
///     fn check_method(&self, method: MethodRef<'_>, cx: &RuleContext<'_>) -> Verdict {
///         if !method.has_body() {
///             return Verdict::NotApplicable;
///         }
///         Verdict::Success
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Unique identifier for this rule (e.g., "AvoidLongMethodsRule")
    fn name(&self) -> &'static str;

    /// Human-readable description of what this rule finds
    fn description(&self) -> &'static str;

    /// Kind of element the rule inspects
    fn target(&self) -> RuleTarget;

    /// Category of defects this rule finds
    fn category(&self) -> &'static str {
        "design"
    }

    /// Check one method
    fn check_method(&self, _method: MethodRef<'_>, _cx: &RuleContext<'_>) -> Verdict {
        Verdict::NotApplicable
    }

    /// Check one type
    fn check_type(&self, _ty: &TypeDef, _cx: &RuleContext<'_>) -> Verdict {
        Verdict::NotApplicable
    }
}

pub fn type_location(ty: &TypeDef) -> Location {
    Location::Type {
        type_name: ty.full_name.clone(),
    }
}

pub fn method_location(method: MethodRef<'_>) -> Location {
    Location::Method {
        type_name: method.ty.full_name.clone(),
        method: method.short_signature(),
    }
}

pub fn field_location(ty: &TypeDef, field: &FieldDef) -> Location {
    Location::Field {
        type_name: ty.full_name.clone(),
        field: field.name.clone(),
    }
}

impl RuleStats {
    pub fn for_rule(rule: &str) -> Self {
        Self {
            rule: rule.to_string(),
            ..Self::default()
        }
    }

    pub fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::NotApplicable => self.not_applicable += 1,
            Verdict::Success => self.success += 1,
            Verdict::Failure => self.failure += 1,
        }
    }

    pub fn merge(&mut self, other: &RuleStats) {
        self.not_applicable += other.not_applicable;
        self.success += other.success;
        self.failure += other.failure;
        self.errors += other.errors;
    }

    pub fn invocations(&self) -> usize {
        self.not_applicable + self.success + self.failure + self.errors
    }
}
