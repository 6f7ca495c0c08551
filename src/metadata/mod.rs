//! Program element model consumed by the rules
//!
//! Rules see an assembly only through the [`ElementModel`] trait, which
//! exposes the elements themselves plus the classification predicates the
//! metadata reader is responsible for. [`Assembly`] is the in-memory
//! implementation loaded from a JSON metadata dump.

mod loader;
mod model;
mod opcodes;

pub use loader::{load_assembly, parse_assembly};
pub use model::{
    Assembly, FieldDef, MethodBody, MethodDef, MethodRef, ParameterDef, TypeDef, TypeKind,
    TypeRef, OBJECT, VOID,
};
pub use opcodes::{Instruction, OpCategory, OpCode, SourceLine, HIDDEN_LINE};

const COMPILER_GENERATED: &str = "System.Runtime.CompilerServices.CompilerGeneratedAttribute";
const GENERATED_CODE: &str = "System.CodeDom.Compiler.GeneratedCodeAttribute";
const DISPOSABLE: &str = "System.IDisposable";
const EVENT_ARGS: &str = "System.EventArgs";
const EVENT_ARGS_SUFFIX: &str = "EventArgs";

/// Types that wrap an unmanaged resource handle
const NATIVE_HANDLE_TYPES: &[&str] = &[
    "System.IntPtr",
    "System.UIntPtr",
    "System.Runtime.InteropServices.HandleRef",
];

/// Guard against malformed inheritance cycles in the dump
const MAX_HIERARCHY_DEPTH: usize = 64;

/// Read-only view of an assembly plus the classifications rules rely on
pub trait ElementModel: Send + Sync {
    /// Display name of the assembly
    fn name(&self) -> &str;

    /// Types defined in the assembly, in declaration order
    fn types(&self) -> &[TypeDef];

    /// Whether line mappings from debug symbols are available
    fn has_debug_symbols(&self) -> bool;

    /// Resolve a type reference to its definition, if it lives in this model
    fn resolve(&self, ty: &TypeRef) -> Option<&TypeDef>;

    /// Whether a method was produced by a compiler or code generator
    fn is_generated(&self, method: MethodRef<'_>) -> bool;

    /// Whether a type is an unmanaged handle (after stripping array dimensions)
    fn is_native_handle(&self, ty: &TypeRef) -> bool;

    /// Whether a type implements `System.IDisposable`, directly or by inheritance
    fn implements_disposable(&self, ty: &TypeDef) -> bool;

    /// Whether the method has the `(object sender, EventArgs e)` handler shape
    fn is_event_callback(&self, method: MethodRef<'_>) -> bool {
        if method.parameters.len() != 2 || !method.return_type.is_void() {
            return false;
        }
        let sender = &method.parameters[0].param_type;
        if sender.is_array() || sender.full_name != OBJECT {
            return false;
        }
        let args = &method.parameters[1].param_type;
        !args.is_array() && self.is_event_args(args)
    }

    /// Whether `ty` derives from `System.EventArgs`.
    ///
    /// Framework argument types live outside the model; when the chain leaves
    /// it, the last known name decides.
    fn is_event_args(&self, ty: &TypeRef) -> bool {
        let mut current = ty.clone();
        for _ in 0..MAX_HIERARCHY_DEPTH {
            if current.full_name == EVENT_ARGS {
                return true;
            }
            let Some(def) = self.resolve(&current) else {
                return current.full_name.ends_with(EVENT_ARGS_SUFFIX);
            };
            match &def.base_type {
                Some(base) => current = base.clone(),
                None => return false,
            }
        }
        false
    }
}

fn has_generated_attribute(attributes: &[String]) -> bool {
    attributes
        .iter()
        .any(|a| a == COMPILER_GENERATED || a == GENERATED_CODE)
}

impl ElementModel for Assembly {
    fn name(&self) -> &str {
        &self.name
    }

    fn types(&self) -> &[TypeDef] {
        &self.types
    }

    fn has_debug_symbols(&self) -> bool {
        self.has_debug_symbols
    }

    fn resolve(&self, ty: &TypeRef) -> Option<&TypeDef> {
        if ty.is_array() {
            return None;
        }
        self.find_type(&ty.full_name)
    }

    fn is_generated(&self, method: MethodRef<'_>) -> bool {
        has_generated_attribute(&method.attributes)
            || has_generated_attribute(&method.ty.attributes)
            || method.name.contains('<')
            || method.ty.full_name.contains('<')
    }

    fn is_native_handle(&self, ty: &TypeRef) -> bool {
        NATIVE_HANDLE_TYPES.contains(&ty.full_name.as_str())
    }

    fn implements_disposable(&self, ty: &TypeDef) -> bool {
        let mut current = Some(ty);
        for _ in 0..MAX_HIERARCHY_DEPTH {
            let Some(def) = current else {
                return false;
            };
            if def.interfaces.iter().any(|i| i.full_name == DISPOSABLE) {
                return true;
            }
            current = def.base_type.as_ref().and_then(|b| self.resolve(b));
        }
        false
    }
}
