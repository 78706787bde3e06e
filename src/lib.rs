//! Class and interface hierarchy resolution.
//!
//! Declarations go in, a validated [`TypeGraph`] comes out. The graph answers
//! subtype, ancestor, interface, enclosing-type and abstract-method queries
//! over a closed world of Java-like type declarations.

pub mod cli;
pub mod config;
pub mod declaration;
pub mod error;
pub mod graph;
pub mod input;
pub mod io;
pub mod logging;
pub mod report;
pub mod types;

pub use config::{ResolverConfig, Settings};
pub use declaration::{Declaration, DeclarationBuilder};
pub use error::{ExpectedKind, QueryError, QueryResult, ResolveError, ResolveResult};
pub use graph::{GraphBuilder, NodeCategory, TypeGraph, TypeNode};
pub use report::{CheckReport, CheckStatus, GraphReport};
pub use types::{EdgeKind, MethodDecl, MethodSignature, TypeKind};
