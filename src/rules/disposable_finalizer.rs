//! Finalizer presence rule
//!
//! A disposable type that owns an unmanaged handle directly must also
//! have a finalizer, or the handle leaks when `Dispose` is never called.
//! One defect is reported per offending instance field.

use crate::metadata::{TypeDef, TypeKind};
use crate::models::{Confidence, Severity};
use crate::rules::base::{field_location, Rule, RuleContext, RuleTarget, Verdict};
use tracing::debug;

pub struct DisposableTypesShouldHaveFinalizerRule;

impl DisposableTypesShouldHaveFinalizerRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DisposableTypesShouldHaveFinalizerRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for DisposableTypesShouldHaveFinalizerRule {
    fn name(&self) -> &'static str {
        "DisposableTypesShouldHaveFinalizerRule"
    }

    fn description(&self) -> &'static str {
        "Detects disposable types holding native handles without a finalizer"
    }

    fn target(&self) -> RuleTarget {
        RuleTarget::Type
    }

    fn category(&self) -> &'static str {
        "correctness"
    }

    fn check_type(&self, ty: &TypeDef, cx: &RuleContext<'_>) -> Verdict {
        if matches!(ty.kind, TypeKind::Enum | TypeKind::Delegate) {
            return Verdict::NotApplicable;
        }
        let model = cx.model();
        if !model.implements_disposable(ty) {
            return Verdict::NotApplicable;
        }
        if ty.has_finalizer() {
            return Verdict::Success;
        }

        let mut found = 0usize;
        for field in ty.fields.iter().filter(|f| !f.is_type_level()) {
            if !model.is_native_handle(&field.field_type.underlying()) {
                continue;
            }
            cx.report(
                field_location(ty, field),
                Severity::High,
                Confidence::High,
                "",
            );
            found += 1;
        }

        if found == 0 {
            return Verdict::Success;
        }
        debug!("{} holds {} native handle(s) without a finalizer", ty.full_name, found);
        Verdict::Failure
    }
}
