use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural kind of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Class,
    AbstractClass,
    Interface,
}

impl TypeKind {
    /// Classes and abstract classes take part in the single-superclass tree.
    pub fn is_class(&self) -> bool {
        matches!(self, TypeKind::Class | TypeKind::AbstractClass)
    }

    pub fn is_interface(&self) -> bool {
        matches!(self, TypeKind::Interface)
    }

    /// Only concrete classes owe implementations for inherited abstract methods.
    pub fn is_concrete(&self) -> bool {
        matches!(self, TypeKind::Class)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::AbstractClass => "abstract class",
            TypeKind::Interface => "interface",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Method identity used for override matching: name plus ordered parameter types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodSignature {
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
}

impl MethodSignature {
    pub fn new(name: impl Into<String>, params: &[&str]) -> Self {
        Self {
            name: name.into(),
            params: params.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Signature with no parameters.
    pub fn nullary(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.params.join(", "))
    }
}

/// A method as declared on one type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodDecl {
    #[serde(flatten)]
    pub signature: MethodSignature,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
}

impl MethodDecl {
    pub fn concrete(name: impl Into<String>, params: &[&str]) -> Self {
        Self {
            signature: MethodSignature::new(name, params),
            is_abstract: false,
        }
    }

    pub fn abstract_method(name: impl Into<String>, params: &[&str]) -> Self {
        Self {
            signature: MethodSignature::new(name, params),
            is_abstract: true,
        }
    }
}

/// Typed edge of the hierarchy graph.
///
/// `Extends` and `Implements` point from subtype to supertype.
/// `Encloses` points from the outer type to the nested one and never
/// takes part in subtyping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    Extends,
    Implements,
    Encloses,
}

impl EdgeKind {
    pub fn is_inheritance(&self) -> bool {
        matches!(self, EdgeKind::Extends | EdgeKind::Implements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_predicates() {
        assert!(TypeKind::Class.is_class());
        assert!(TypeKind::AbstractClass.is_class());
        assert!(!TypeKind::Interface.is_class());

        assert!(TypeKind::Class.is_concrete());
        assert!(!TypeKind::AbstractClass.is_concrete());
        assert!(!TypeKind::Interface.is_concrete());
    }

    #[test]
    fn test_signature_display() {
        let sig = MethodSignature::new("format", &["String", "int"]);
        assert_eq!(sig.to_string(), "format(String, int)");
        assert_eq!(MethodSignature::nullary("print").to_string(), "print()");
    }

    #[test]
    fn test_signature_identity_includes_params() {
        let a = MethodSignature::new("run", &["int"]);
        let b = MethodSignature::new("run", &["long"]);
        let c = MethodSignature::new("run", &["int"]);

        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_method_decl_json_shape() {
        let json = r#"{"name":"initialize","params":[],"abstract":true}"#;
        let method: MethodDecl = serde_json::from_str(json).unwrap();
        assert!(method.is_abstract);
        assert_eq!(method.signature, MethodSignature::nullary("initialize"));

        // Missing fields default to a concrete, parameterless method
        let method: MethodDecl = serde_json::from_str(r#"{"name":"start"}"#).unwrap();
        assert!(!method.is_abstract);
        assert!(method.signature.params.is_empty());
    }

    #[test]
    fn test_edge_kind_inheritance() {
        assert!(EdgeKind::Extends.is_inheritance());
        assert!(EdgeKind::Implements.is_inheritance());
        assert!(!EdgeKind::Encloses.is_inheritance());
    }
}
