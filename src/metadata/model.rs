//! In-memory program element model
//!
//! A read-only view of the types, fields, methods and method bodies of one
//! assembly, as produced by an external metadata reader.

use super::opcodes::Instruction;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const VOID: &str = "System.Void";
pub const OBJECT: &str = "System.Object";

/// Reference to a type by full name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    pub full_name: String,
    /// Number of array dimensions, 0 for non-array types.
    ///
    /// Element counts are never known statically.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub array_rank: u32,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

impl TypeRef {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            array_rank: 0,
        }
    }

    pub fn array_of(full_name: impl Into<String>, rank: u32) -> Self {
        Self {
            full_name: full_name.into(),
            array_rank: rank,
        }
    }

    pub fn void() -> Self {
        Self::new(VOID)
    }

    pub fn is_array(&self) -> bool {
        self.array_rank > 0
    }

    pub fn is_void(&self) -> bool {
        !self.is_array() && self.full_name == VOID
    }

    /// The element type with array dimensions stripped
    pub fn underlying(&self) -> TypeRef {
        TypeRef::new(self.full_name.clone())
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name)?;
        if self.is_array() {
            let commas = ",".repeat(self.array_rank as usize - 1);
            write!(f, "[{}]", commas)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
    Struct,
    Enum,
    Delegate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub field_type: TypeRef,
    #[serde(default)]
    pub is_static: bool,
    /// Compile-time constant (`const`), stored with the type, not per instance
    #[serde(default)]
    pub is_literal: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, field_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            field_type,
            is_static: false,
            is_literal: false,
        }
    }

    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn as_literal(mut self) -> Self {
        self.is_literal = true;
        self
    }

    /// Static or constant: not part of any instance
    pub fn is_type_level(&self) -> bool {
        self.is_static || self.is_literal
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDef {
    #[serde(default)]
    pub name: String,
    pub param_type: TypeRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MethodBody {
    #[serde(default)]
    pub instructions: Vec<Instruction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: String,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_virtual: bool,
    /// `newslot`: a virtual method that introduces a new vtable slot
    #[serde(default)]
    pub is_new_slot: bool,
    /// Property accessors, event accessors, operators and constructors
    #[serde(default)]
    pub is_special_name: bool,
    #[serde(default)]
    pub parameters: Vec<ParameterDef>,
    #[serde(default = "TypeRef::void")]
    pub return_type: TypeRef,
    /// `None` for abstract, extern and runtime-implemented methods
    #[serde(default)]
    pub body: Option<MethodBody>,
    #[serde(default)]
    pub attributes: Vec<String>,
}

impl MethodDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_static: false,
            is_virtual: false,
            is_new_slot: false,
            is_special_name: false,
            parameters: Vec::new(),
            return_type: TypeRef::void(),
            body: None,
            attributes: Vec::new(),
        }
    }

    /// Instance constructor
    pub fn ctor() -> Self {
        let mut m = Self::new(".ctor");
        m.is_special_name = true;
        m
    }

    /// Static constructor
    pub fn cctor() -> Self {
        let mut m = Self::new(".cctor");
        m.is_special_name = true;
        m.is_static = true;
        m
    }

    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.return_type = ty;
        self
    }

    pub fn param(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.parameters.push(ParameterDef {
            name: name.into(),
            param_type: ty,
        });
        self
    }

    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn as_virtual(mut self, new_slot: bool) -> Self {
        self.is_virtual = true;
        self.is_new_slot = new_slot;
        self
    }

    pub fn as_special_name(mut self) -> Self {
        self.is_special_name = true;
        self
    }

    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.push(name.into());
        self
    }

    pub fn with_body(mut self, instructions: Vec<Instruction>) -> Self {
        self.body = Some(MethodBody { instructions });
        self
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    pub fn instructions(&self) -> &[Instruction] {
        self.body
            .as_ref()
            .map(|b| b.instructions.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_constructor(&self) -> bool {
        self.name == ".ctor" || self.name == ".cctor"
    }

    /// Virtual method that overrides an inherited slot
    pub fn is_override(&self) -> bool {
        self.is_virtual && !self.is_new_slot
    }

    /// `Finalize()` returning void
    pub fn is_finalizer(&self) -> bool {
        self.name == "Finalize" && self.parameters.is_empty() && self.return_type.is_void()
    }

    /// Short signature: `Name(ParamType, ...)`
    pub fn short_signature(&self) -> String {
        let params: Vec<String> = self
            .parameters
            .iter()
            .map(|p| p.param_type.to_string())
            .collect();
        format!("{}({})", self.name, params.join(","))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    pub full_name: String,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default)]
    pub base_type: Option<TypeRef>,
    #[serde(default)]
    pub interfaces: Vec<TypeRef>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub methods: Vec<MethodDef>,
    #[serde(default)]
    pub attributes: Vec<String>,
}

impl TypeDef {
    pub fn new(full_name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            full_name: full_name.into(),
            kind,
            base_type: match kind {
                TypeKind::Interface => None,
                TypeKind::Struct => Some(TypeRef::new("System.ValueType")),
                TypeKind::Enum => Some(TypeRef::new("System.Enum")),
                TypeKind::Delegate => Some(TypeRef::new("System.MulticastDelegate")),
                TypeKind::Class => Some(TypeRef::new(OBJECT)),
            },
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn class(full_name: impl Into<String>) -> Self {
        Self::new(full_name, TypeKind::Class)
    }

    pub fn extends(mut self, base: impl Into<String>) -> Self {
        self.base_type = Some(TypeRef::new(base));
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(TypeRef::new(interface));
        self
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    /// Name without the namespace
    pub fn name(&self) -> &str {
        self.full_name
            .rsplit_once('.')
            .map(|(_, n)| n)
            .unwrap_or(&self.full_name)
    }

    pub fn has_finalizer(&self) -> bool {
        self.methods.iter().any(MethodDef::is_finalizer)
    }

    /// Iterate methods as handles that know their declaring type
    pub fn method_refs(&self) -> impl Iterator<Item = MethodRef<'_>> {
        self.methods.iter().map(move |def| MethodRef { ty: self, def })
    }

    pub fn find_method(&self, name: &str) -> Option<MethodRef<'_>> {
        self.method_refs().find(|m| m.def.name == name)
    }
}

/// A method together with its declaring type
#[derive(Debug, Clone, Copy)]
pub struct MethodRef<'a> {
    pub ty: &'a TypeDef,
    pub def: &'a MethodDef,
}

impl<'a> MethodRef<'a> {
    /// Cecil-style full signature: `RetType Ns.Type::Name(ParamType,...)`
    pub fn full_signature(&self) -> String {
        format!(
            "{} {}::{}",
            self.def.return_type,
            self.ty.full_name,
            self.def.short_signature()
        )
    }
}

impl<'a> std::ops::Deref for MethodRef<'a> {
    type Target = MethodDef;

    fn deref(&self) -> &MethodDef {
        self.def
    }
}

/// One assembly's metadata, as dumped by the metadata reader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Assembly {
    #[serde(default)]
    pub name: String,
    /// Whether debug symbols (line mappings) were loaded for this assembly
    #[serde(default)]
    pub has_debug_symbols: bool,
    #[serde(default)]
    pub types: Vec<TypeDef>,
}

impl Assembly {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            has_debug_symbols: false,
            types: Vec::new(),
        }
    }

    pub fn with_symbols(mut self, has_symbols: bool) -> Self {
        self.has_debug_symbols = has_symbols;
        self
    }

    pub fn with_type(mut self, ty: TypeDef) -> Self {
        self.types.push(ty);
        self
    }

    pub fn find_type(&self, full_name: &str) -> Option<&TypeDef> {
        self.types.iter().find(|t| t.full_name == full_name)
    }

    pub fn method_count(&self) -> usize {
        self.types.iter().map(|t| t.methods.len()).sum()
    }
}
