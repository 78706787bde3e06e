//! Read-only queries over a validated hierarchy.

use indexmap::IndexSet;
use petgraph::graph::NodeIndex;
use std::collections::{BTreeSet, HashSet, VecDeque};

use super::obligations::Obligations;
use super::{GraphBuilder, LinkedGraph, TypeNode};
use crate::config::ResolverConfig;
use crate::declaration::Declaration;
use crate::error::{QueryError, QueryResult, ResolveResult};
use crate::types::{EdgeKind, MethodSignature, TypeKind};

static NO_OBLIGATIONS: BTreeSet<MethodSignature> = BTreeSet::new();

/// A validated, immutable type hierarchy.
///
/// Every query takes fully-qualified names and fails with
/// [`QueryError::UnknownType`] for names not in the graph. Root aliases and
/// external sentinels are valid query targets.
#[derive(Debug)]
pub struct TypeGraph {
    linked: LinkedGraph,
    obligations: Obligations,
}

impl TypeGraph {
    pub(crate) fn new(linked: LinkedGraph, obligations: Obligations) -> Self {
        Self {
            linked,
            obligations,
        }
    }

    /// Build a graph from one closed world of declarations.
    pub fn build(
        declarations: Vec<Declaration>,
        config: &ResolverConfig,
    ) -> ResolveResult<TypeGraph> {
        GraphBuilder::new(config).build(declarations)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.linked.node_map.contains_key(name)
    }

    /// Name of the root sentinel.
    pub fn root_name(&self) -> &str {
        self.linked.name(self.linked.root)
    }

    /// Declared type names in input order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.linked.declared.iter().map(|&idx| self.linked.name(idx))
    }

    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.linked
            .declared
            .iter()
            .filter_map(|&idx| self.linked.node(idx).declaration())
    }

    pub fn node(&self, name: &str) -> QueryResult<&TypeNode> {
        self.index(name).map(|idx| self.linked.node(idx))
    }

    /// The declaration behind `name`, `None` for sentinels.
    pub fn declaration(&self, name: &str) -> QueryResult<Option<&Declaration>> {
        self.node(name).map(TypeNode::declaration)
    }

    /// Declared kind of `name`, `None` for sentinels.
    pub fn kind_of(&self, name: &str) -> QueryResult<Option<TypeKind>> {
        self.node(name).map(TypeNode::kind)
    }

    /// True if `b` is reachable from `a` over zero or more Extends/Implements edges.
    pub fn is_subtype_of(&self, a: &str, b: &str) -> QueryResult<bool> {
        let from = self.index(a)?;
        let to = self.index(b)?;

        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([from]);
        while let Some(idx) = queue.pop_front() {
            if idx == to {
                return Ok(true);
            }
            if seen.insert(idx) {
                queue.extend(self.linked.supertypes(idx));
            }
        }

        Ok(false)
    }

    /// Direct superclass; `None` for interfaces and the root.
    pub fn superclass_of(&self, name: &str) -> QueryResult<Option<String>> {
        let idx = self.index(name)?;
        Ok(self
            .linked
            .superclass(idx)
            .map(|parent| self.linked.name(parent).to_string()))
    }

    /// Classes reachable over Extends edges, nearest first.
    pub fn ancestors_of(&self, name: &str) -> QueryResult<Vec<String>> {
        let idx = self.index(name)?;
        Ok(self
            .ancestor_indices(idx)
            .into_iter()
            .map(|ancestor| self.linked.name(ancestor).to_string())
            .collect())
    }

    /// Interfaces reachable over Implements edges from `name` or any ancestor.
    ///
    /// Deduplicated, in discovery order: own interfaces first, then their
    /// super-interfaces, then those of each ancestor in turn.
    pub fn interfaces_of(&self, name: &str) -> QueryResult<IndexSet<String>> {
        let idx = self.index(name)?;

        let mut start = vec![idx];
        start.extend(self.ancestor_indices(idx));

        let mut found: IndexSet<NodeIndex> = IndexSet::new();
        for class in start {
            let mut queue: VecDeque<NodeIndex> =
                self.linked.targets(class, EdgeKind::Implements).into();
            while let Some(interface) = queue.pop_front() {
                if found.insert(interface) {
                    queue.extend(self.linked.targets(interface, EdgeKind::Implements));
                }
            }
        }

        Ok(found
            .into_iter()
            .map(|interface| self.linked.name(interface).to_string())
            .collect())
    }

    /// Outer types from innermost to outermost.
    pub fn enclosing_chain_of(&self, name: &str) -> QueryResult<Vec<String>> {
        let mut current = self.index(name)?;
        let mut chain = Vec::new();
        while let Some(outer) = self.linked.enclosing(current) {
            chain.push(self.linked.name(outer).to_string());
            current = outer;
        }
        Ok(chain)
    }

    /// Types that directly extend or implement `name`.
    pub fn subtypes_of(&self, name: &str) -> QueryResult<Vec<String>> {
        let idx = self.index(name)?;
        let subtypes: IndexSet<NodeIndex> = [EdgeKind::Extends, EdgeKind::Implements]
            .into_iter()
            .flat_map(|kind| self.linked.sources(idx, kind))
            .collect();
        Ok(subtypes
            .into_iter()
            .map(|sub| self.linked.name(sub).to_string())
            .collect())
    }

    /// Abstract signatures a concrete class inherits without implementing.
    ///
    /// Always empty for interfaces, abstract classes and sentinels.
    pub fn unresolved_abstracts(&self, name: &str) -> QueryResult<&BTreeSet<MethodSignature>> {
        let idx = self.index(name)?;
        Ok(self.obligations.get(&idx).unwrap_or(&NO_OBLIGATIONS))
    }

    /// Concrete classes with at least one unresolved abstract, in input order.
    pub fn incomplete_classes(
        &self,
    ) -> impl Iterator<Item = (&str, &BTreeSet<MethodSignature>)> {
        self.linked.declared.iter().filter_map(|idx| {
            self.obligations
                .get(idx)
                .filter(|set| !set.is_empty())
                .map(|set| (self.linked.name(*idx), set))
        })
    }

    fn ancestor_indices(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut ancestors = Vec::new();
        let mut current = idx;
        while let Some(parent) = self.linked.superclass(current) {
            ancestors.push(parent);
            current = parent;
        }
        ancestors
    }

    fn index(&self, name: &str) -> QueryResult<NodeIndex> {
        self.linked
            .node_map
            .get(name)
            .copied()
            .ok_or_else(|| QueryError::UnknownType(name.to_string()))
    }
}
