//! Rule execution engine with parallel support
//!
//! The RuleEngine evaluates every registered rule against every element of
//! an assembly:
//! - Types are checked in parallel using rayon
//! - Within one type, type rules run first, then method rules per method
//! - A panicking rule is isolated to its (rule, element) pair and reported
//!   as a meta-defect; the run continues
//! - Defects are merged in declaration order and capped at `max_defects`
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      RuleEngine                         │
//! ├─────────────────────────────────────────────────────────┤
//! │  1. Register rules                                      │
//! │  2. Fan out over types (rayon)                          │
//! │  3. Per type: type rules, then method rules             │
//! │  4. Merge defects in type order, apply cutoff           │
//! │  5. Return CheckReport                                  │
//! └─────────────────────────────────────────────────────────┘
//! ```

use crate::config::Configuration;
use crate::metadata::{ElementModel, TypeDef};
use crate::models::{CheckReport, Confidence, Defect, DefectSummary, Location, RuleStats, Severity};
use crate::rules::base::{
    method_location, type_location, DefectCollector, DefectSink, Rule, RuleContext, RuleTarget,
    Verdict,
};
use anyhow::Result;
use rayon::prelude::*;
use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Maximum defects to keep to prevent memory exhaustion
const MAX_DEFECTS_LIMIT: usize = 10_000;

/// Rule name attached to meta-defects for panicking rules
pub const RULE_FAILURE: &str = "RuleFailure";

/// Orchestrates rule evaluation across all registered rules
pub struct RuleEngine {
    rules: Vec<Arc<dyn Rule>>,
    /// Number of worker threads for parallel execution
    workers: usize,
    /// Maximum defects to keep
    max_defects: usize,
    config: Configuration,
    severity_overrides: HashMap<String, Severity>,
}

/// Per-type outcome, merged after the parallel phase
struct TypeOutcome {
    stats: Vec<RuleStats>,
    defects: Vec<Defect>,
}

impl RuleEngine {
    /// Create a new rule engine
    ///
    /// # Arguments
    /// * `workers` - Number of worker threads (0 = auto-detect)
    pub fn new(workers: usize) -> Self {
        let actual_workers = if workers == 0 {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
                .min(16) // Cap at 16 threads
        } else {
            workers
        };

        Self {
            rules: Vec::new(),
            workers: actual_workers,
            max_defects: MAX_DEFECTS_LIMIT,
            config: Configuration::default(),
            severity_overrides: HashMap::new(),
        }
    }

    /// Set the maximum number of defects to keep
    pub fn with_max_defects(mut self, max: usize) -> Self {
        self.max_defects = max;
        self
    }

    /// Set the thresholds passed to every rule
    pub fn with_config(mut self, config: Configuration) -> Self {
        self.config = config;
        self
    }

    /// Replace the severity of every defect a rule emits
    pub fn with_severity_override(mut self, rule: impl Into<String>, severity: Severity) -> Self {
        self.severity_overrides.insert(rule.into(), severity);
        self
    }

    pub fn register(&mut self, rule: Arc<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn register_all(&mut self, rules: impl IntoIterator<Item = Arc<dyn Rule>>) {
        self.rules.extend(rules);
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Run all rules over the model
    ///
    /// # Returns
    /// A report with defects sorted by severity (highest first). Defects of
    /// equal severity keep declaration order.
    pub fn run(&self, model: &dyn ElementModel) -> Result<CheckReport> {
        let start = Instant::now();
        let types = model.types();
        info!(
            "Checking {} ({} types) with {} rules on {} workers",
            model.name(),
            types.len(),
            self.rules.len(),
            self.workers
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()?;

        let outcomes: Vec<TypeOutcome> = pool.install(|| {
            types
                .par_iter()
                .map(|ty| self.check_single_type(ty, model))
                .collect()
        });

        let mut stats: Vec<RuleStats> = self
            .rules
            .iter()
            .map(|r| RuleStats::for_rule(r.name()))
            .collect();
        let collector = DefectCollector::with_limit(self.max_defects);
        for outcome in outcomes {
            for (total, partial) in stats.iter_mut().zip(&outcome.stats) {
                total.merge(partial);
            }
            for defect in outcome.defects {
                collector.emit(defect);
            }
        }

        let defects_dropped = collector.dropped();
        if defects_dropped > 0 {
            warn!(
                "Defect limit {} reached, dropped {} defects",
                self.max_defects, defects_dropped
            );
        }
        for s in stats.iter().filter(|s| s.errors > 0) {
            warn!("Rule {} failed on {} elements", s.rule, s.errors);
        }

        let mut defects = collector.into_defects();
        defects.sort_by(|a, b| b.severity.cmp(&a.severity));

        let duration = start.elapsed();
        info!(
            "Check complete: {} defects from {} rules in {:?}",
            defects.len(),
            self.rules.len(),
            duration
        );

        Ok(CheckReport {
            assembly: model.name().to_string(),
            summary: DefectSummary::from_defects(&defects),
            defects,
            rules: stats,
            types_checked: types.len(),
            methods_checked: types.iter().map(|t| t.methods.len()).sum(),
            defects_dropped,
            duration_ms: duration.as_millis() as u64,
        })
    }

    /// Evaluate every rule on one type and its methods
    fn check_single_type(&self, ty: &TypeDef, model: &dyn ElementModel) -> TypeOutcome {
        let sink = DefectCollector::new();
        let mut stats: Vec<RuleStats> = self
            .rules
            .iter()
            .map(|r| RuleStats::for_rule(r.name()))
            .collect();

        let contexts: Vec<RuleContext<'_>> = self
            .rules
            .iter()
            .map(|r| {
                RuleContext::new(r.name(), model, &self.config, &sink)
                    .with_severity_override(self.severity_overrides.get(r.name()).copied())
            })
            .collect();

        for (i, rule) in self.rules.iter().enumerate() {
            if rule.target() != RuleTarget::Type {
                continue;
            }
            let outcome = catch_unwind(AssertUnwindSafe(|| rule.check_type(ty, &contexts[i])));
            Self::record(&mut stats[i], rule.as_ref(), outcome, &sink, || {
                type_location(ty)
            });
        }

        for method in ty.method_refs() {
            for (i, rule) in self.rules.iter().enumerate() {
                if rule.target() != RuleTarget::Method {
                    continue;
                }
                let outcome =
                    catch_unwind(AssertUnwindSafe(|| rule.check_method(method, &contexts[i])));
                Self::record(&mut stats[i], rule.as_ref(), outcome, &sink, || {
                    method_location(method)
                });
            }
        }

        drop(contexts);
        TypeOutcome {
            stats,
            defects: sink.into_defects(),
        }
    }

    fn record(
        stats: &mut RuleStats,
        rule: &dyn Rule,
        outcome: std::thread::Result<Verdict>,
        sink: &dyn DefectSink,
        location: impl FnOnce() -> Location,
    ) {
        match outcome {
            Ok(verdict) => stats.record(verdict),
            Err(payload) => {
                stats.errors += 1;
                let location = location();
                let panic_msg = panic_message(payload.as_ref());
                error!("Rule {} panicked on {}: {}", rule.name(), location, panic_msg);
                sink.emit(Defect {
                    rule: RULE_FAILURE.to_string(),
                    location,
                    severity: Severity::Critical,
                    confidence: Confidence::Total,
                    message: format!("{} panicked: {}", rule.name(), panic_msg),
                });
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Builder for RuleEngine with fluent API
pub struct RuleEngineBuilder {
    workers: usize,
    max_defects: usize,
    config: Configuration,
    rules: Vec<Arc<dyn Rule>>,
    severity_overrides: Vec<(String, Severity)>,
}

impl RuleEngineBuilder {
    pub fn new() -> Self {
        Self {
            workers: 0,
            max_defects: MAX_DEFECTS_LIMIT,
            config: Configuration::default(),
            rules: Vec::new(),
            severity_overrides: Vec::new(),
        }
    }

    /// Set number of worker threads
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn max_defects(mut self, max: usize) -> Self {
        self.max_defects = max;
        self
    }

    pub fn config(mut self, config: Configuration) -> Self {
        self.config = config;
        self
    }

    pub fn rule(mut self, rule: Arc<dyn Rule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = Arc<dyn Rule>>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn severity_override(mut self, rule: impl Into<String>, severity: Severity) -> Self {
        self.severity_overrides.push((rule.into(), severity));
        self
    }

    /// Build the engine
    pub fn build(self) -> RuleEngine {
        let mut engine = RuleEngine::new(self.workers)
            .with_max_defects(self.max_defects)
            .with_config(self.config);
        for (rule, severity) in self.severity_overrides {
            engine = engine.with_severity_override(rule, severity);
        }
        engine.register_all(self.rules);
        debug!("Built engine with rules: {:?}", engine.rule_names());
        engine
    }
}

impl Default for RuleEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
