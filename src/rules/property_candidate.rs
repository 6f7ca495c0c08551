//! Property candidate rule
//!
//! Flags parameterless `GetX`/`IsX`/`HasX` methods that return a value and
//! would read better as properties. When a matching `SetX(T)` exists its
//! signature is included so both halves can be converted together.

use crate::metadata::MethodRef;
use crate::models::{Confidence, Severity};
use crate::rules::base::{method_location, Rule, RuleContext, RuleTarget, Verdict};
use tracing::debug;

/// Framework methods that keep their method form by convention
const WHITELIST: &[&str] = &[
    "GetEnumerator",
    "GetHashCode",
    "GetType",
    "GetTypeCode",
    "GetValue",
    "HasElementTypeImpl",
];

const PREFIXES: &[&str] = &["get", "is", "has"];

/// Case-insensitive accessor prefix of a method name
fn accessor_prefix(name: &str) -> Option<&'static str> {
    PREFIXES.iter().copied().find(|prefix| {
        name.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

pub struct ConsiderConvertingMethodToPropertyRule;

impl ConsiderConvertingMethodToPropertyRule {
    pub fn new() -> Self {
        Self
    }

    /// `Set<remainder>(T) -> void` on the getter's type, where T is the getter's return type
    fn find_setter<'a>(getter: MethodRef<'a>) -> Option<MethodRef<'a>> {
        let remainder = &getter.name[3..];
        let setter_name = format!("Set{}", remainder);
        getter.ty.method_refs().find(|m| {
            m.name == setter_name
                && m.parameters.len() == 1
                && m.parameters[0].param_type == getter.return_type
                && m.return_type.is_void()
        })
    }
}

impl Default for ConsiderConvertingMethodToPropertyRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for ConsiderConvertingMethodToPropertyRule {
    fn name(&self) -> &'static str {
        "ConsiderConvertingMethodToPropertyRule"
    }

    fn description(&self) -> &'static str {
        "Detects parameterless Get/Is/Has methods that should be properties"
    }

    fn target(&self) -> RuleTarget {
        RuleTarget::Method
    }

    fn check_method(&self, method: MethodRef<'_>, cx: &RuleContext<'_>) -> Verdict {
        if method.is_constructor() || method.is_special_name {
            return Verdict::NotApplicable;
        }
        // Report on the declaration that introduced the slot, not its overrides
        if method.is_override() {
            return Verdict::NotApplicable;
        }
        if method.return_type.is_array() {
            return Verdict::NotApplicable;
        }
        if cx.model().is_generated(method) {
            return Verdict::NotApplicable;
        }
        if WHITELIST.contains(&method.name.as_str()) {
            return Verdict::NotApplicable;
        }

        let Some(prefix) = accessor_prefix(&method.name) else {
            return Verdict::Success;
        };
        if !method.parameters.is_empty() || method.return_type.is_void() {
            return Verdict::Success;
        }

        let message = if prefix == "get" {
            Self::find_setter(method)
                .map(|setter| setter.full_signature())
                .unwrap_or_default()
        } else {
            String::new()
        };

        debug!("{} looks like a property getter", method.full_signature());
        cx.report(
            method_location(method),
            Severity::Low,
            Confidence::Normal,
            message,
        );
        Verdict::Failure
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::metadata::{Assembly, MethodDef, TypeDef, TypeRef};
    use crate::rules::test_support::run_method;

    fn int() -> TypeRef {
        TypeRef::new("System.Int32")
    }

    fn check(ty: TypeDef, method: &str) -> (Verdict, Vec<crate::models::Defect>) {
        let name = ty.full_name.clone();
        let asm = Assembly::new("T").with_type(ty);
        run_method(
            &ConsiderConvertingMethodToPropertyRule::new(),
            &asm,
            &name,
            method,
            &Configuration::default(),
        )
    }

    #[test]
    fn test_getter_with_setter() {
        let ty = TypeDef::class("Ns.Foo")
            .method(MethodDef::new("GetFoo").returns(int()))
            .method(MethodDef::new("SetFoo").param("value", int()));
        let (verdict, defects) = check(ty, "GetFoo");
        assert_eq!(verdict, Verdict::Failure);
        assert_eq!(defects.len(), 1);
        assert_eq!(defects[0].message, "System.Void Ns.Foo::SetFoo(System.Int32)");
        assert_eq!(defects[0].severity, Severity::Low);
    }

    #[test]
    fn test_getter_without_setter() {
        let ty = TypeDef::class("Ns.Foo")
            .method(MethodDef::new("GetFoo").returns(int()))
            // Wrong parameter type, not a matching setter
            .method(MethodDef::new("SetFoo").param("value", TypeRef::new("System.String")));
        let (verdict, defects) = check(ty, "GetFoo");
        assert_eq!(verdict, Verdict::Failure);
        assert_eq!(defects[0].message, "");
    }

    #[test]
    fn test_setter_returning_value_does_not_match() {
        let ty = TypeDef::class("Ns.Foo")
            .method(MethodDef::new("GetFoo").returns(int()))
            .method(MethodDef::new("SetFoo").param("value", int()).returns(int()));
        let (verdict, defects) = check(ty, "GetFoo");
        assert_eq!(verdict, Verdict::Failure);
        assert_eq!(defects[0].message, "");
    }

    #[test]
    fn test_setter_on_another_type_does_not_match() {
        let asm = Assembly::new("T")
            .with_type(TypeDef::class("Ns.Foo").method(MethodDef::new("GetFoo").returns(int())))
            .with_type(TypeDef::class("Ns.Bar").method(MethodDef::new("SetFoo").param("value", int())));
        let (verdict, defects) = run_method(
            &ConsiderConvertingMethodToPropertyRule::new(),
            &asm,
            "Ns.Foo",
            "GetFoo",
            &Configuration::default(),
        );
        assert_eq!(verdict, Verdict::Failure);
        assert_eq!(defects.len(), 1);
        assert_eq!(defects[0].message, "");
    }

    #[test]
    fn test_is_and_has_prefixes_case_insensitive() {
        let ty = TypeDef::class("Ns.Foo")
            .method(MethodDef::new("IsReady").returns(TypeRef::new("System.Boolean")))
            .method(MethodDef::new("hasItems").returns(TypeRef::new("System.Boolean")))
            .method(MethodDef::new("Island").returns(int()));
        assert_eq!(check(ty.clone(), "IsReady").0, Verdict::Failure);
        assert_eq!(check(ty.clone(), "hasItems").0, Verdict::Failure);
        // Prefix matching is purely lexical
        assert_eq!(check(ty, "Island").0, Verdict::Failure);
    }

    #[test]
    fn test_non_candidates_succeed() {
        let ty = TypeDef::class("Ns.Foo")
            .method(MethodDef::new("GetFoo").param("index", int()).returns(int()))
            .method(MethodDef::new("GetNothing"))
            .method(MethodDef::new("Compute").returns(int()));
        assert_eq!(check(ty.clone(), "GetFoo").0, Verdict::Success);
        assert_eq!(check(ty.clone(), "GetNothing").0, Verdict::Success);
        assert_eq!(check(ty, "Compute").0, Verdict::Success);
    }

    #[test]
    fn test_guards() {
        let ty = TypeDef::class("Ns.Foo")
            .method(MethodDef::new("get_Foo").as_special_name().returns(int()))
            .method(MethodDef::new("GetBase").as_virtual(false).returns(int()))
            .method(MethodDef::new("GetBytes").returns(TypeRef::array_of("System.Byte", 1)))
            .method(
                MethodDef::new("GetGenerated")
                    .attribute("System.Runtime.CompilerServices.CompilerGeneratedAttribute")
                    .returns(int()),
            )
            .method(MethodDef::new("GetHashCode").returns(int()));
        for name in ["get_Foo", "GetBase", "GetBytes", "GetGenerated", "GetHashCode"] {
            assert_eq!(check(ty.clone(), name).0, Verdict::NotApplicable, "{}", name);
        }
        let (_, defects) = check(ty, "GetBase");
        assert!(defects.is_empty());
    }

    #[test]
    fn test_new_slot_virtual_is_checked() {
        let ty = TypeDef::class("Ns.Foo")
            .method(MethodDef::new("GetFoo").as_virtual(true).returns(int()));
        assert_eq!(check(ty, "GetFoo").0, Verdict::Failure);
    }
}
