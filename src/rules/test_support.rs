//! Helpers for driving a single rule against an in-memory assembly in tests

use crate::config::Configuration;
use crate::metadata::Assembly;
use crate::models::Defect;
use crate::rules::base::{DefectCollector, Rule, RuleContext, Verdict};

/// Run `rule` on the first method called `method` in `type_name`
pub fn run_method(
    rule: &dyn Rule,
    asm: &Assembly,
    type_name: &str,
    method: &str,
    config: &Configuration,
) -> (Verdict, Vec<Defect>) {
    let ty = asm.find_type(type_name).expect("type in model");
    let method = ty.find_method(method).expect("method in type");
    let sink = DefectCollector::new();
    let verdict = {
        let cx = RuleContext::new(rule.name(), asm, config, &sink);
        rule.check_method(method, &cx)
    };
    (verdict, sink.into_defects())
}

/// Run `rule` on the type called `type_name`
pub fn run_type(
    rule: &dyn Rule,
    asm: &Assembly,
    type_name: &str,
    config: &Configuration,
) -> (Verdict, Vec<Defect>) {
    let ty = asm.find_type(type_name).expect("type in model");
    let sink = DefectCollector::new();
    let verdict = {
        let cx = RuleContext::new(rule.name(), asm, config, &sink);
        rule.check_type(ty, &cx)
    };
    (verdict, sink.into_defects())
}
