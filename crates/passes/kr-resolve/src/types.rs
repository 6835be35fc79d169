//! The closed type system
//!
//! The subset has no user-defined types: every value is one of the tags
//! below, and the C storage type for each tag comes from one exhaustive
//! translation table. Compatibility is exact equality; there is no
//! coercion of any kind.

use std::fmt;

/// Type tag for a declared symbol or an inferred expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    /// 32-bit signed integer (`int`)
    Int32,
    /// NUL-terminated byte string (`str`)
    Str,
    /// Boolean (`bool`)
    Bool,
    /// The absence of a value; only valid as a return type
    None,
    /// A callable with positional parameter types and a return type
    ///
    /// Parameter types are carried for completeness but are not checked at
    /// call sites; the return type drives call-expression inference.
    Function {
        params: Vec<TypeKind>,
        ret: Box<TypeKind>,
    },
    /// A bridge module; attribute access treats it as a nested scope
    Module,
}

impl TypeKind {
    /// Parse a source type annotation
    ///
    /// Returns `None` for annotations outside the closed set.
    pub fn from_annotation(annotation: &str) -> Option<Self> {
        match annotation {
            "int" => Some(Self::Int32),
            "str" => Some(Self::Str),
            "bool" => Some(Self::Bool),
            "None" => Some(Self::None),
            _ => None,
        }
    }

    /// The C storage type for this tag
    ///
    /// This is the single translation table: every symbol's target type
    /// comes from here, never from ad-hoc inference. Functions translate to
    /// their return type's storage (that is what a C signature needs);
    /// modules have no storage and map to `void`.
    pub fn c_type(&self) -> &'static str {
        match self {
            Self::Int32 => "int32_t",
            Self::Str => "char*",
            Self::Bool => "bool",
            Self::None => "void",
            Self::Function { ret, .. } => ret.c_type(),
            Self::Module => "void",
        }
    }

}

impl fmt::Display for TypeKind {
    /// Source-facing type name, used in diagnostics
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int32 => "int",
            Self::Str => "str",
            Self::Bool => "bool",
            Self::None => "None",
            Self::Function { .. } => "function",
            Self::Module => "module",
        };
        write!(formatter, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotation_parsing_covers_the_closed_set() {
        assert_eq!(TypeKind::from_annotation("int"), Some(TypeKind::Int32));
        assert_eq!(TypeKind::from_annotation("str"), Some(TypeKind::Str));
        assert_eq!(TypeKind::from_annotation("bool"), Some(TypeKind::Bool));
        assert_eq!(TypeKind::from_annotation("None"), Some(TypeKind::None));
        assert_eq!(TypeKind::from_annotation("float"), None);
        assert_eq!(TypeKind::from_annotation(""), None);
    }

    #[test]
    fn translation_table_is_total() {
        assert_eq!(TypeKind::Int32.c_type(), "int32_t");
        assert_eq!(TypeKind::Str.c_type(), "char*");
        assert_eq!(TypeKind::Bool.c_type(), "bool");
        assert_eq!(TypeKind::None.c_type(), "void");
        assert_eq!(TypeKind::Module.c_type(), "void");

        let func = TypeKind::Function {
            params: vec![TypeKind::Int32],
            ret: Box::new(TypeKind::Str),
        };
        assert_eq!(func.c_type(), "char*");
    }

    #[test]
    fn display_uses_source_names() {
        assert_eq!(TypeKind::Int32.to_string(), "int");
        assert_eq!(TypeKind::Str.to_string(), "str");
        assert_eq!(TypeKind::None.to_string(), "None");
    }
}
