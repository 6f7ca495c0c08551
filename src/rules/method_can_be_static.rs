//! Static candidate rule
//!
//! An instance method that never loads its receiver does not depend on
//! instance state and can be made static.

use crate::metadata::{Instruction, MethodRef};
use crate::models::{Confidence, Severity};
use crate::rules::base::{method_location, Rule, RuleContext, RuleTarget, Verdict};
use tracing::debug;

pub struct MethodCanBeMadeStaticRule;

impl MethodCanBeMadeStaticRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MethodCanBeMadeStaticRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for MethodCanBeMadeStaticRule {
    fn name(&self) -> &'static str {
        "MethodCanBeMadeStaticRule"
    }

    fn description(&self) -> &'static str {
        "Detects instance methods that never use their receiver"
    }

    fn target(&self) -> RuleTarget {
        RuleTarget::Method
    }

    fn category(&self) -> &'static str {
        "performance"
    }

    fn check_method(&self, method: MethodRef<'_>, cx: &RuleContext<'_>) -> Verdict {
        if method.is_static
            || method.is_virtual
            || method.is_constructor()
            || cx.model().is_event_callback(method)
        {
            return Verdict::NotApplicable;
        }
        if !method.has_body() {
            return Verdict::NotApplicable;
        }
        if cx.model().is_generated(method) {
            return Verdict::NotApplicable;
        }

        if method.instructions().iter().any(Instruction::is_receiver_load) {
            return Verdict::Success;
        }

        debug!("{} never loads its receiver", method.full_signature());
        cx.report(
            method_location(method),
            Severity::Medium,
            Confidence::Total,
            "",
        );
        Verdict::Failure
    }
}
