//! Type hierarchy graph.
//!
//! Building runs in fixed stages:
//! 1. [`GraphBuilder::link`] turns declarations into nodes and resolves every
//!    name into an `Extends`, `Implements` or `Encloses` edge
//! 2. [`validate::check`] rejects cycles and supertype conflicts
//! 3. [`obligations::compute`] derives unresolved abstract methods per concrete class
//!
//! Only a graph that passed every stage is handed out as a [`TypeGraph`].

pub mod builder;
pub mod obligations;
pub mod query;
pub mod validate;

pub use builder::GraphBuilder;
pub use query::TypeGraph;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::HashMap;

use crate::declaration::Declaration;
use crate::error::ExpectedKind;
use crate::types::{EdgeKind, TypeKind};

/// Payload of a graph node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeNode {
    /// A type from the input declaration set
    Declared(Declaration),
    /// The implicit superclass of every class without an explicit one
    Root { name: String },
    /// An opaque type outside the closed world; it carries no obligations
    External { name: String, role: ExpectedKind },
}

impl TypeNode {
    pub fn name(&self) -> &str {
        match self {
            TypeNode::Declared(decl) => decl.name(),
            TypeNode::Root { name } | TypeNode::External { name, .. } => name,
        }
    }

    pub fn declaration(&self) -> Option<&Declaration> {
        match self {
            TypeNode::Declared(decl) => Some(decl),
            _ => None,
        }
    }

    /// Declared kind; sentinels have none.
    pub fn kind(&self) -> Option<TypeKind> {
        self.declaration().map(Declaration::kind)
    }

    pub fn is_sentinel(&self) -> bool {
        !matches!(self, TypeNode::Declared(_))
    }

    /// Whether the node can stand where `expected` is required.
    ///
    /// External nodes accept either role; the root is a class.
    pub fn fits(&self, expected: ExpectedKind) -> bool {
        match self {
            TypeNode::Declared(decl) => expected.accepts(decl.kind()),
            TypeNode::Root { .. } => expected == ExpectedKind::Class,
            TypeNode::External { .. } => true,
        }
    }

    pub fn category(&self) -> NodeCategory {
        match self {
            TypeNode::Declared(decl) => match decl.kind() {
                TypeKind::Class => NodeCategory::Class,
                TypeKind::AbstractClass => NodeCategory::AbstractClass,
                TypeKind::Interface => NodeCategory::Interface,
            },
            TypeNode::Root { .. } => NodeCategory::Root,
            TypeNode::External { .. } => NodeCategory::External,
        }
    }
}

/// Flat classification of a node, used in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeCategory {
    Class,
    AbstractClass,
    Interface,
    Root,
    External,
}

/// Linked but not yet validated graph.
#[derive(Debug)]
pub(crate) struct LinkedGraph {
    pub(crate) graph: DiGraph<TypeNode, EdgeKind>,
    /// Every resolvable name, root aliases included
    pub(crate) node_map: HashMap<String, NodeIndex>,
    pub(crate) root: NodeIndex,
    /// Declared nodes in input order
    pub(crate) declared: Vec<NodeIndex>,
}

impl LinkedGraph {
    pub(crate) fn node(&self, idx: NodeIndex) -> &TypeNode {
        &self.graph[idx]
    }

    pub(crate) fn name(&self, idx: NodeIndex) -> &str {
        self.graph[idx].name()
    }

    /// Outgoing neighbours over `kind` edges, in the order the edges were added.
    pub(crate) fn targets(&self, idx: NodeIndex, kind: EdgeKind) -> Vec<NodeIndex> {
        self.neighbours(idx, kind, Direction::Outgoing)
    }

    /// Incoming neighbours over `kind` edges, in the order the edges were added.
    pub(crate) fn sources(&self, idx: NodeIndex, kind: EdgeKind) -> Vec<NodeIndex> {
        self.neighbours(idx, kind, Direction::Incoming)
    }

    /// Outgoing Extends and Implements neighbours, superclass first.
    pub(crate) fn supertypes(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .filter(|edge| edge.weight().is_inheritance())
            .map(|edge| (edge.id(), edge.target()))
            .collect();
        edges.sort_by_key(|(id, _)| *id);
        edges.into_iter().map(|(_, target)| target).collect()
    }

    pub(crate) fn superclass(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.targets(idx, EdgeKind::Extends).into_iter().next()
    }

    pub(crate) fn enclosing(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.sources(idx, EdgeKind::Encloses).into_iter().next()
    }

    fn neighbours(&self, idx: NodeIndex, kind: EdgeKind, direction: Direction) -> Vec<NodeIndex> {
        // petgraph walks adjacency lists newest-first; edge ids restore insertion order
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(idx, direction)
            .filter(|edge| *edge.weight() == kind)
            .map(|edge| {
                let other = match direction {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };
                (edge.id(), other)
            })
            .collect();
        edges.sort_by_key(|(id, _)| *id);
        edges.into_iter().map(|(_, other)| other).collect()
    }
}
