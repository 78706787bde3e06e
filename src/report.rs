//! Per-file analysis reports.
//!
//! A [`CheckReport`] is the outcome of building one declaration file: either a
//! summary of every declared type or the structural error that aborted the
//! build. Reports serialize to JSON and render as plain text.

use console::style;
use serde::Serialize;
use std::fmt::Write as _;

use crate::error::{QueryError, QueryResult, ResolveError};
use crate::graph::{NodeCategory, TypeGraph};
use crate::input::InputError;

/// Hierarchy facts for one declared type.
#[derive(Debug, Clone, Serialize)]
pub struct TypeReport {
    pub name: String,
    pub category: NodeCategory,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_final: bool,
    pub superclass: Option<String>,
    pub ancestors: Vec<String>,
    pub interfaces: Vec<String>,
    pub enclosing: Vec<String>,
    pub unresolved_abstracts: Vec<String>,
}

/// Summary of a successfully built graph.
#[derive(Debug, Clone, Serialize)]
pub struct GraphReport {
    pub types: Vec<TypeReport>,
    /// Concrete classes with at least one unresolved abstract method
    pub incomplete_classes: usize,
}

impl GraphReport {
    pub fn from_graph(graph: &TypeGraph) -> QueryResult<Self> {
        let mut types = Vec::new();
        for decl in graph.declarations() {
            let name = decl.name();
            let category = graph.node(name)?.category();
            types.push(TypeReport {
                name: name.to_string(),
                category,
                is_final: decl.is_final(),
                superclass: graph.superclass_of(name)?,
                ancestors: graph.ancestors_of(name)?,
                interfaces: graph.interfaces_of(name)?.into_iter().collect(),
                enclosing: graph.enclosing_chain_of(name)?,
                unresolved_abstracts: graph
                    .unresolved_abstracts(name)?
                    .iter()
                    .map(|sig| sig.to_string())
                    .collect(),
            });
        }

        Ok(Self {
            incomplete_classes: graph.incomplete_classes().count(),
            types,
        })
    }
}

/// Structural error in reportable form.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub kind: &'static str,
    pub message: String,
    pub types: Vec<String>,
}

impl From<&ResolveError> for ErrorReport {
    fn from(error: &ResolveError) -> Self {
        let kind = match error {
            ResolveError::MalformedDeclaration { .. } => "malformed_declaration",
            ResolveError::UnresolvedReference { .. } => "unresolved_reference",
            ResolveError::DuplicateDeclaration(_) => "duplicate_declaration",
            ResolveError::InheritanceCycle(_) => "inheritance_cycle",
            ResolveError::MultipleClassInheritance(_) => "multiple_class_inheritance",
            ResolveError::SupertypeKindMismatch { .. } => "supertype_kind_mismatch",
            ResolveError::EnclosingCycle(_) => "enclosing_cycle",
        };
        Self {
            kind,
            message: error.to_string(),
            types: error.type_names().into_iter().map(str::to_string).collect(),
        }
    }
}

impl From<&QueryError> for ErrorReport {
    fn from(error: &QueryError) -> Self {
        let QueryError::UnknownType(name) = error;
        Self {
            kind: "unknown_type",
            message: error.to_string(),
            types: vec![name.clone()],
        }
    }
}

impl From<&InputError> for ErrorReport {
    fn from(error: &InputError) -> Self {
        let kind = match error {
            InputError::Declaration(inner) => return Self::from(inner),
            InputError::Io { .. } => "io_error",
            InputError::Json(_) => "invalid_json",
        };
        Self {
            kind,
            message: error.to_string(),
            types: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    /// Graph built and every concrete class is complete
    Ok,
    /// Graph built but some concrete classes miss implementations
    Incomplete,
    /// Structural error, no graph
    Failed,
}

/// Outcome of analysing one declaration file.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub source: String,
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph: Option<GraphReport>,
}

impl CheckReport {
    pub fn built(source: impl Into<String>, graph: GraphReport) -> Self {
        let status = if graph.incomplete_classes == 0 {
            CheckStatus::Ok
        } else {
            CheckStatus::Incomplete
        };
        Self {
            source: source.into(),
            status,
            error: None,
            graph: Some(graph),
        }
    }

    pub fn failed(source: impl Into<String>, error: impl Into<ErrorReport>) -> Self {
        Self {
            source: source.into(),
            status: CheckStatus::Failed,
            error: Some(error.into()),
            graph: None,
        }
    }

    /// Plain-text rendering; `show_clean` includes types with nothing to flag.
    pub fn render_text(&self, show_clean: bool) -> String {
        let mut out = String::new();

        match self.status {
            CheckStatus::Ok => {
                let _ = writeln!(out, "{} {}", style("✓").green(), self.source);
            }
            CheckStatus::Incomplete => {
                let _ = writeln!(out, "{} {}", style("!").yellow(), self.source);
            }
            CheckStatus::Failed => {
                let _ = writeln!(out, "{} {}", style("✗").red(), self.source);
            }
        }

        if let Some(error) = &self.error {
            let _ = writeln!(out, "  error[{}]: {}", error.kind, error.message);
        }

        if let Some(graph) = &self.graph {
            for ty in &graph.types {
                let flagged = !ty.unresolved_abstracts.is_empty();
                if !flagged && !show_clean {
                    continue;
                }
                let _ = writeln!(out, "  {} ({})", ty.name, category_label(ty.category));
                if let Some(superclass) = &ty.superclass {
                    let _ = writeln!(out, "    extends: {superclass}");
                }
                if !ty.interfaces.is_empty() {
                    let _ = writeln!(out, "    interfaces: {}", ty.interfaces.join(", "));
                }
                if !ty.enclosing.is_empty() {
                    let _ = writeln!(out, "    enclosed by: {}", ty.enclosing.join(" < "));
                }
                if flagged {
                    let _ = writeln!(
                        out,
                        "    {} {}",
                        style("missing:").yellow(),
                        ty.unresolved_abstracts.join(", ")
                    );
                }
            }
        }

        out
    }
}

fn category_label(category: NodeCategory) -> &'static str {
    match category {
        NodeCategory::Class => "class",
        NodeCategory::AbstractClass => "abstract class",
        NodeCategory::Interface => "interface",
        NodeCategory::Root => "root",
        NodeCategory::External => "external",
    }
}
