//! Long method rule
//!
//! Flags methods whose size exceeds a configured maximum. Size is measured
//! two ways:
//! - with debug symbols, as logical source lines from line mappings
//! - without (or when approximation is forced), as an instruction count
//!
//! Constructors get a one-time allowance proportional to the fields they
//! initialise. Designer-generated initializers (`InitializeComponent`,
//! `Build`) are skipped.

use crate::metadata::MethodRef;
use crate::metrics::{field_weight, instruction_count, logical_line_count, FieldSelector};
use crate::models::{Confidence, Severity};
use crate::rules::base::{method_location, Rule, RuleContext, RuleTarget, Verdict};
use std::collections::HashMap;
use tracing::debug;

/// Base types whose UI designers emit one large parameterless initializer
const DESIGNER_INITIALIZERS: &[(&str, &str)] = &[
    ("System.Windows.Forms.Form", "InitializeComponent"),
    ("Gtk.Bin", "Build"),
    ("Gtk.Window", "Build"),
    ("Gtk.Dialog", "Build"),
];

/// Detects methods that are too long to read comfortably
pub struct AvoidLongMethodsRule {
    /// Base type full name -> generated initializer name
    initializers: HashMap<&'static str, &'static str>,
}

impl AvoidLongMethodsRule {
    pub fn new() -> Self {
        Self {
            initializers: DESIGNER_INITIALIZERS.iter().copied().collect(),
        }
    }

    /// Whether the method is a designer initializer for its direct base type
    fn is_designer_initializer(&self, method: MethodRef<'_>) -> bool {
        if !method.parameters.is_empty() {
            return false;
        }
        method
            .ty
            .base_type
            .as_ref()
            .and_then(|base| self.initializers.get(base.full_name.as_str()))
            .is_some_and(|expected| *expected == method.name)
    }

    fn constructor_weight(method: MethodRef<'_>, cx: &RuleContext<'_>) -> u32 {
        if !method.is_constructor() {
            return 0;
        }
        field_weight(
            method.ty,
            FieldSelector::for_static(method.is_static),
            cx.config().default_array_element_weight,
        )
    }

    fn check_source_lines(&self, method: MethodRef<'_>, cx: &RuleContext<'_>) -> Verdict {
        let lines = logical_line_count(method.instructions());
        let max = cx
            .config()
            .max_source_line_count
            .saturating_add(Self::constructor_weight(method, cx));

        if lines <= max {
            return Verdict::Success;
        }

        debug!(
            "{} has {} logical lines (max {})",
            method.full_signature(),
            lines,
            max
        );
        cx.report(
            method_location(method),
            Severity::High,
            Confidence::Normal,
            format!("Logical SLOC: {}. Maximum: {}", lines, max),
        );
        Verdict::Failure
    }

    fn check_instructions(&self, method: MethodRef<'_>, cx: &RuleContext<'_>) -> Verdict {
        let config = cx.config();
        let count = instruction_count(method.instructions());
        let bonus = Self::constructor_weight(method, cx).saturating_mul(config.assignment_ratio);
        let max = config.max_instruction_count.saturating_add(bonus);

        if count <= max {
            return Verdict::Success;
        }

        debug!(
            "{} has {} instructions (max {})",
            method.full_signature(),
            count,
            max
        );
        cx.report(
            method_location(method),
            Severity::High,
            Confidence::Normal,
            format!("Instructions: {}. Maximum: {}", count, max),
        );
        Verdict::Failure
    }
}

impl Default for AvoidLongMethodsRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for AvoidLongMethodsRule {
    fn name(&self) -> &'static str {
        "AvoidLongMethodsRule"
    }

    fn description(&self) -> &'static str {
        "Detects methods over the configured logical-line or instruction limit"
    }

    fn target(&self) -> RuleTarget {
        RuleTarget::Method
    }

    fn category(&self) -> &'static str {
        "maintainability"
    }

    fn check_method(&self, method: MethodRef<'_>, cx: &RuleContext<'_>) -> Verdict {
        if !method.has_body() {
            return Verdict::NotApplicable;
        }
        if cx.model().is_generated(method) {
            return Verdict::NotApplicable;
        }
        if self.is_designer_initializer(method) {
            return Verdict::NotApplicable;
        }

        if cx.model().has_debug_symbols() && !cx.config().use_approximation {
            self.check_source_lines(method, cx)
        } else {
            self.check_instructions(method, cx)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::metadata::{Assembly, FieldDef, Instruction, MethodDef, OpCode, TypeDef, TypeRef};
    use crate::rules::test_support::run_method;

    /// Body mapped to source lines 1..=n
    fn lines_body(n: u32) -> Vec<Instruction> {
        (1..=n)
            .map(|l| Instruction::new(OpCode::Nop).at_line(l))
            .collect()
    }

    /// Body of n counted instructions, no line mappings
    fn ops_body(n: usize) -> Vec<Instruction> {
        (0..n).map(|_| Instruction::new(OpCode::Ldarg0)).collect()
    }

    fn with_two_fields(method: MethodDef) -> Assembly {
        Assembly::new("T").with_symbols(true).with_type(
            TypeDef::class("Ns.Foo")
                .field(FieldDef::new("a", TypeRef::new("System.Int32")))
                .field(FieldDef::new("b", TypeRef::new("System.String")))
                .method(method),
        )
    }

    #[test]
    fn test_short_method_passes() {
        let asm = with_two_fields(MethodDef::new("Run").with_body(lines_body(40)));
        let (verdict, defects) = run_method(
            &AvoidLongMethodsRule::new(),
            &asm,
            "Ns.Foo",
            "Run",
            &Configuration::default(),
        );
        assert_eq!(verdict, Verdict::Success);
        assert!(defects.is_empty());
    }

    #[test]
    fn test_long_method_fails() {
        let asm = with_two_fields(MethodDef::new("Run").with_body(lines_body(41)));
        let (verdict, defects) = run_method(
            &AvoidLongMethodsRule::new(),
            &asm,
            "Ns.Foo",
            "Run",
            &Configuration::default(),
        );
        assert_eq!(verdict, Verdict::Failure);
        assert_eq!(defects.len(), 1);
        assert_eq!(defects[0].message, "Logical SLOC: 41. Maximum: 40");
        assert_eq!(defects[0].severity, Severity::High);
    }

    #[test]
    fn test_constructor_field_bonus() {
        let rule = AvoidLongMethodsRule::new();
        let config = Configuration::default();

        let asm = with_two_fields(MethodDef::ctor().with_body(lines_body(41)));
        let (verdict, _) = run_method(&rule, &asm, "Ns.Foo", ".ctor", &config);
        assert_eq!(verdict, Verdict::Success);

        let asm = with_two_fields(MethodDef::ctor().with_body(lines_body(43)));
        let (verdict, defects) = run_method(&rule, &asm, "Ns.Foo", ".ctor", &config);
        assert_eq!(verdict, Verdict::Failure);
        assert_eq!(defects[0].message, "Logical SLOC: 43. Maximum: 42");
    }

    #[test]
    fn test_static_constructor_counts_static_fields() {
        let asm = Assembly::new("T").with_symbols(true).with_type(
            TypeDef::class("Ns.Table")
                .field(FieldDef::new("inst", TypeRef::new("System.Int32")))
                .field(FieldDef::new("Lookup", TypeRef::array_of("System.Int32", 1)).as_static())
                .method(MethodDef::cctor().with_body(lines_body(53))),
        );
        let (verdict, _) = run_method(
            &AvoidLongMethodsRule::new(),
            &asm,
            "Ns.Table",
            ".cctor",
            &Configuration::default(),
        );
        // 40 + 13 for the static array; the instance field is ignored
        assert_eq!(verdict, Verdict::Success);
    }

    #[test]
    fn test_approximate_path_without_symbols() {
        let rule = AvoidLongMethodsRule::new();
        let config = Configuration::default();
        let mut asm = with_two_fields(MethodDef::new("Run").with_body(ops_body(166)));
        asm.has_debug_symbols = false;

        let (verdict, defects) = run_method(&rule, &asm, "Ns.Foo", "Run", &config);
        assert_eq!(verdict, Verdict::Failure);
        assert_eq!(defects[0].message, "Instructions: 166. Maximum: 165");

        // Constructor allowance: 2 fields * 7 = 14
        let mut asm = with_two_fields(MethodDef::ctor().with_body(ops_body(179)));
        asm.has_debug_symbols = false;
        let (verdict, _) = run_method(&rule, &asm, "Ns.Foo", ".ctor", &config);
        assert_eq!(verdict, Verdict::Success);
    }

    #[test]
    fn test_forced_approximation_ignores_lines() {
        // 100 mapped lines of nop: long by lines, empty by instruction count
        let asm = with_two_fields(MethodDef::new("Run").with_body(lines_body(100)));
        let config = Configuration::default().with_approximation(true);
        let rule = AvoidLongMethodsRule::new();

        let (verdict, _) = run_method(&rule, &asm, "Ns.Foo", "Run", &config);
        assert_eq!(verdict, Verdict::Success);

        let (verdict, _) = run_method(&rule, &asm, "Ns.Foo", "Run", &Configuration::default());
        assert_eq!(verdict, Verdict::Failure);
    }

    #[test]
    fn test_guards() {
        let rule = AvoidLongMethodsRule::new();
        let config = Configuration::default().with_max_source_line_count(0);

        let asm = with_two_fields(MethodDef::new("Abstract"));
        assert_eq!(
            run_method(&rule, &asm, "Ns.Foo", "Abstract", &config).0,
            Verdict::NotApplicable
        );

        let asm = with_two_fields(MethodDef::new("<Run>b__0").with_body(lines_body(5)));
        assert_eq!(
            run_method(&rule, &asm, "Ns.Foo", "<Run>b__0", &config).0,
            Verdict::NotApplicable
        );
    }

    #[test]
    fn test_designer_initializer_skipped() {
        let rule = AvoidLongMethodsRule::new();
        let config = Configuration::default();
        let asm = Assembly::new("T").with_symbols(true).with_type(
            TypeDef::class("App.MainForm")
                .extends("System.Windows.Forms.Form")
                .method(MethodDef::new("InitializeComponent").with_body(lines_body(300)))
                .method(MethodDef::new("Build").with_body(lines_body(300)))
                .method(
                    MethodDef::new("InitializeComponent")
                        .param("x", TypeRef::new("System.Int32"))
                        .with_body(lines_body(300)),
                ),
        );
        let ty = &asm.types[0];
        let sink = crate::rules::base::DefectCollector::new();
        let cx = RuleContext::new(rule.name(), &asm, &config, &sink);
        let verdicts: Vec<Verdict> = ty.method_refs().map(|m| rule.check_method(m, &cx)).collect();
        assert_eq!(
            verdicts,
            vec![Verdict::NotApplicable, Verdict::Failure, Verdict::Failure]
        );
    }

    #[test]
    fn test_unknown_base_type_is_checked() {
        let asm = Assembly::new("T").with_symbols(true).with_type(
            TypeDef::class("App.Window")
                .extends("Vendor.Unresolved")
                .method(MethodDef::new("Build").with_body(lines_body(41))),
        );
        let (verdict, _) = run_method(
            &AvoidLongMethodsRule::new(),
            &asm,
            "App.Window",
            "Build",
            &Configuration::default(),
        );
        assert_eq!(verdict, Verdict::Failure);
    }
}
