//! Error types for hierarchy resolution.
//!
//! Build-time errors are fatal: a failed build never exposes a partial graph.
//! Query errors are local to one lookup and leave the graph usable.

use thiserror::Error;

use crate::types::TypeKind;

/// Structural errors raised while constructing declarations or building a graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Malformed declaration '{name}': {reason}")]
    MalformedDeclaration { name: String, reason: String },

    #[error("Unresolved reference '{name}' in '{from}'")]
    UnresolvedReference { name: String, from: String },

    #[error("Duplicate declaration: {0}")]
    DuplicateDeclaration(String),

    #[error("Inheritance cycle: {}", format_cycle(.0))]
    InheritanceCycle(Vec<String>),

    #[error("Multiple class inheritance: {0} extends more than one class")]
    MultipleClassInheritance(String),

    #[error("'{name}' lists '{supertype}' where {expected} is required")]
    SupertypeKindMismatch {
        name: String,
        supertype: String,
        expected: ExpectedKind,
    },

    #[error("Enclosing cycle: {}", format_cycle(.0))]
    EnclosingCycle(Vec<String>),
}

impl ResolveError {
    pub fn malformed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDeclaration {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Names involved in the error, for reporting.
    pub fn type_names(&self) -> Vec<&str> {
        match self {
            Self::MalformedDeclaration { name, .. } => vec![name.as_str()],
            Self::UnresolvedReference { name, from } => vec![from.as_str(), name.as_str()],
            Self::DuplicateDeclaration(name) | Self::MultipleClassInheritance(name) => {
                vec![name.as_str()]
            }
            Self::InheritanceCycle(path) | Self::EnclosingCycle(path) => {
                path.iter().map(String::as_str).collect()
            }
            Self::SupertypeKindMismatch {
                name, supertype, ..
            } => vec![name.as_str(), supertype.as_str()],
        }
    }
}

/// The supertype role a reference was expected to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedKind {
    Class,
    Interface,
}

impl ExpectedKind {
    pub fn accepts(&self, kind: TypeKind) -> bool {
        match self {
            ExpectedKind::Class => kind.is_class(),
            ExpectedKind::Interface => kind.is_interface(),
        }
    }
}

impl std::fmt::Display for ExpectedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpectedKind::Class => f.write_str("a class"),
            ExpectedKind::Interface => f.write_str("an interface"),
        }
    }
}

/// Errors raised by queries against a built graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Unknown type: {0}")]
    UnknownType(String),
}

pub type ResolveResult<T> = Result<T, ResolveError>;
pub type QueryResult<T> = Result<T, QueryError>;

fn format_cycle(path: &[String]) -> String {
    match path.first() {
        Some(first) => format!("{} -> {first}", path.join(" -> ")),
        None => String::new(),
    }
}
