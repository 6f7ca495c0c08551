//! Defect rules
//!
//! This module provides the rule framework and the built-in rules that
//! inspect assembly metadata.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        RuleEngine                           │
//! │  - Registers rules                                          │
//! │  - Fans out over types in parallel (rayon)                  │
//! │  - Isolates panicking rules as meta-defects                 │
//! │  - Merges defects and per-rule verdict counts               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Rule Trait                          │
//! │  - name(): Unique identifier                                │
//! │  - target(): Method or Type                                 │
//! │  - check_method / check_type: one verdict per element       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!              ┌───────────────┴───────────────┐
//!              ▼                               ▼
//! ┌──────────────────────────┐  ┌──────────────────────────────┐
//! │ Method rules             │  │ Type rules                   │
//! │ (AvoidLongMethods,       │  │ (DisposableTypesShould-      │
//! │  ConsiderConverting...,  │  │  HaveFinalizer)              │
//! │  MethodCanBeMadeStatic)  │  │                              │
//! └──────────────────────────┘  └──────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use ilcheck::rules::{default_rules, RuleEngineBuilder};
//!
//! let engine = RuleEngineBuilder::new()
//!     .workers(4)
//!     .rules(default_rules())
//!     .build();
//!
//! let report = engine.run(&assembly)?;
//! ```

mod base;
mod engine;

mod avoid_long_methods;
mod disposable_finalizer;
mod method_can_be_static;
mod property_candidate;

#[cfg(test)]
mod test_support;

pub use base::{
    field_location, method_location, type_location, DefectCollector, DefectSink, Rule,
    RuleContext, RuleTarget, Verdict,
};
pub use engine::{RuleEngine, RuleEngineBuilder, RULE_FAILURE};

pub use avoid_long_methods::AvoidLongMethodsRule;
pub use disposable_finalizer::DisposableTypesShouldHaveFinalizerRule;
pub use method_can_be_static::MethodCanBeMadeStaticRule;
pub use property_candidate::ConsiderConvertingMethodToPropertyRule;

use crate::config::{normalize_rule_name, Configuration, ProjectConfig};
use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

/// All built-in rules, in reporting order
pub fn default_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(AvoidLongMethodsRule::new()),
        Arc::new(ConsiderConvertingMethodToPropertyRule::new()),
        Arc::new(MethodCanBeMadeStaticRule::new()),
        Arc::new(DisposableTypesShouldHaveFinalizerRule::new()),
    ]
}

/// Find a built-in rule by name (any casing, with or without the `Rule` suffix)
pub fn find_rule(name: &str) -> Option<Arc<dyn Rule>> {
    let wanted = normalize_rule_name(name);
    default_rules()
        .into_iter()
        .find(|r| normalize_rule_name(r.name()) == wanted)
}

/// Create an engine with the built-in rules, filtered and tuned by a project config
pub fn create_default_engine(
    workers: usize,
    max_defects: usize,
    config: Configuration,
    project: &ProjectConfig,
) -> Result<RuleEngine> {
    let mut builder = RuleEngineBuilder::new()
        .workers(workers)
        .max_defects(max_defects)
        .config(config);

    for rule in default_rules() {
        if !project.is_rule_enabled(rule.name()) {
            debug!("Rule {} disabled by project config", rule.name());
            continue;
        }
        if let Some(severity) = project.get_severity_override(rule.name())? {
            builder = builder.severity_override(rule.name(), severity);
        }
        builder = builder.rule(rule);
    }

    Ok(builder.build())
}
