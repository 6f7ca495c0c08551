//! Field weight accounting

use crate::metadata::TypeDef;

/// Which fields of a type to weigh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSelector {
    /// Static and constant fields
    Static,
    /// Per-instance fields
    Instance,
}

impl FieldSelector {
    pub fn for_static(is_static: bool) -> Self {
        if is_static {
            FieldSelector::Static
        } else {
            FieldSelector::Instance
        }
    }
}

/// Heuristic cost of initialising a type's fields.
///
/// Each selected field weighs 1, except arrays, which weigh
/// `array_element_weight` per dimension since their length is unknown.
pub fn field_weight(ty: &TypeDef, selector: FieldSelector, array_element_weight: u32) -> u32 {
    ty.fields
        .iter()
        .filter(|f| f.is_type_level() == (selector == FieldSelector::Static))
        .map(|f| {
            if f.field_type.is_array() {
                array_element_weight.saturating_mul(f.field_type.array_rank)
            } else {
                1
            }
        })
        .fold(0u32, u32::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{FieldDef, TypeRef};

    const WEIGHT: u32 = 13;

    #[test]
    fn test_plain_fields() {
        let ty = TypeDef::class("Ns.Foo")
            .field(FieldDef::new("a", TypeRef::new("System.Int32")))
            .field(FieldDef::new("b", TypeRef::new("System.String")));
        assert_eq!(field_weight(&ty, FieldSelector::Instance, WEIGHT), 2);
        assert_eq!(field_weight(&ty, FieldSelector::Static, WEIGHT), 0);
    }

    #[test]
    fn test_array_fields_use_default_weight() {
        let one = TypeDef::class("Ns.One").field(FieldDef::new(
            "buf",
            TypeRef::array_of("System.Byte", 1),
        ));
        assert_eq!(field_weight(&one, FieldSelector::Instance, WEIGHT), 13);

        let two = one
            .clone()
            .field(FieldDef::new("names", TypeRef::array_of("System.String", 1)));
        assert_eq!(field_weight(&two, FieldSelector::Instance, WEIGHT), 26);
    }

    #[test]
    fn test_array_weight_per_dimension() {
        let ty = TypeDef::class("Ns.Grid").field(FieldDef::new(
            "cells",
            TypeRef::array_of("System.Int32", 2),
        ));
        assert_eq!(field_weight(&ty, FieldSelector::Instance, WEIGHT), 26);
    }

    #[test]
    fn test_static_and_instance_kept_apart() {
        let ty = TypeDef::class("Ns.Mixed")
            .field(FieldDef::new("count", TypeRef::new("System.Int32")))
            .field(FieldDef::new("Cache", TypeRef::array_of("System.Int32", 1)).as_static())
            .field(FieldDef::new("Max", TypeRef::new("System.Int32")).as_literal());
        assert_eq!(field_weight(&ty, FieldSelector::Instance, WEIGHT), 1);
        assert_eq!(field_weight(&ty, FieldSelector::Static, WEIGHT), 14);
        assert_eq!(FieldSelector::for_static(true), FieldSelector::Static);
    }
}
