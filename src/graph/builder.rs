//! Graph builder: declarations in, linked graph out.
//!
//! All declarations become nodes before any reference is resolved, so a type
//! may name a supertype declared later in the input.
//!
//! Reference resolution order, first hit wins:
//! 1. Exact name of a declared type
//! 2. Member type of the referring type or one of its outer types (`Outer$Name`)
//! 3. Same-package type (`pkg.Name`)
//! 4. Root sentinel (`Object` and its aliases)
//! 5. External sentinel already created for the same name
//! 6. Configured external type or external package prefix
//! 7. `allow_unresolved` fallback, otherwise `UnresolvedReference`
//!
//! Declared types are always tried before sentinels, so the outcome does not
//! depend on declaration order.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::{LinkedGraph, TypeGraph, TypeNode, obligations, validate};
use crate::config::ResolverConfig;
use crate::declaration::Declaration;
use crate::error::{ExpectedKind, ResolveError, ResolveResult};
use crate::logging::Stage;
use crate::types::EdgeKind;

/// Builds a [`TypeGraph`] from one closed world of declarations.
///
/// Holds no state between builds; independent builds may run on separate
/// threads with their own declaration sets.
pub struct GraphBuilder<'a> {
    config: &'a ResolverConfig,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(config: &'a ResolverConfig) -> Self {
        Self { config }
    }

    /// Link, validate and annotate `declarations`.
    ///
    /// Fails on the first structural error; no partial graph is returned.
    pub fn build(&self, declarations: Vec<Declaration>) -> ResolveResult<TypeGraph> {
        let count = declarations.len();
        let linked = self.link(declarations)?;
        crate::debug_event!(Stage::Builder, "linked", "{count} declarations");

        validate::check(&linked)?;
        let obligations = obligations::compute(&linked);

        Ok(TypeGraph::new(linked, obligations))
    }

    /// Create nodes and resolve references into typed edges.
    pub(crate) fn link(&self, declarations: Vec<Declaration>) -> ResolveResult<LinkedGraph> {
        let mut graph: DiGraph<TypeNode, EdgeKind> = DiGraph::with_capacity(
            declarations.len() + 1,
            declarations.len() * 2,
        );
        let mut node_map: HashMap<String, NodeIndex> = HashMap::with_capacity(declarations.len());

        let root = graph.add_node(TypeNode::Root {
            name: self.config.root_type.clone(),
        });
        node_map.insert(self.config.root_type.clone(), root);
        for alias in &self.config.root_aliases {
            node_map.insert(alias.clone(), root);
        }

        // Pass 1: every declaration becomes a node
        let mut declared = Vec::with_capacity(declarations.len());
        for decl in declarations {
            if node_map.contains_key(decl.name()) {
                return Err(ResolveError::DuplicateDeclaration(decl.name().to_string()));
            }
            let name = decl.name().to_string();
            let idx = graph.add_node(TypeNode::Declared(decl));
            node_map.insert(name, idx);
            declared.push(idx);
        }

        let mut linker = Linker {
            config: self.config,
            graph,
            node_map,
            root,
        };

        // Pass 2: resolve deferred references
        for &idx in &declared {
            linker.link_declaration(idx)?;
        }

        Ok(LinkedGraph {
            graph: linker.graph,
            node_map: linker.node_map,
            root,
            declared,
        })
    }
}

struct Linker<'a> {
    config: &'a ResolverConfig,
    graph: DiGraph<TypeNode, EdgeKind>,
    node_map: HashMap<String, NodeIndex>,
    root: NodeIndex,
}

impl Linker<'_> {
    fn link_declaration(&mut self, idx: NodeIndex) -> ResolveResult<()> {
        let Some(decl) = self.graph[idx].declaration().cloned() else {
            return Ok(());
        };

        if decl.kind().is_class() {
            let superclass = match decl.superclass() {
                Some(reference) => self.resolve(&decl, reference, ExpectedKind::Class)?,
                None => self.root,
            };
            self.graph.add_edge(idx, superclass, EdgeKind::Extends);
        }

        for reference in decl.interfaces() {
            let target = self.resolve(&decl, reference, ExpectedKind::Interface)?;
            self.graph.add_edge(idx, target, EdgeKind::Implements);
        }

        if let Some(outer) = self.resolve_enclosing(&decl)? {
            self.graph.add_edge(outer, idx, EdgeKind::Encloses);
        }

        Ok(())
    }

    /// Explicit enclosing types must be declared; a `$`-implied one is used only if declared.
    fn resolve_enclosing(&self, decl: &Declaration) -> ResolveResult<Option<NodeIndex>> {
        match decl.enclosing_type() {
            Some(reference) => self
                .lookup_declared(decl, reference)
                .map(Some)
                .ok_or_else(|| ResolveError::UnresolvedReference {
                    name: reference.to_string(),
                    from: decl.name().to_string(),
                }),
            None => Ok(decl
                .implied_outer()
                .and_then(|outer| self.declared_index(outer))),
        }
    }

    fn resolve(
        &mut self,
        from: &Declaration,
        reference: &str,
        role: ExpectedKind,
    ) -> ResolveResult<NodeIndex> {
        // Declared types shadow sentinels, whatever order the input came in
        if let Some(idx) = self.lookup_declared(from, reference) {
            return Ok(idx);
        }

        if self.config.is_root(reference) {
            return Ok(self.root);
        }

        if let Some(&idx) = self.node_map.get(reference) {
            self.reuse_external(from, idx, role);
            return Ok(idx);
        }

        if self.config.is_external(reference) {
            debug!("[{}] '{reference}' resolved as external {role}", Stage::Builder);
            return Ok(self.add_external(reference, role));
        }

        if self.config.allow_unresolved {
            warn!(
                "[{}] unresolved reference '{reference}' in '{}' treated as external",
                Stage::Builder,
                from.name()
            );
            return Ok(self.add_external(reference, role));
        }

        Err(ResolveError::UnresolvedReference {
            name: reference.to_string(),
            from: from.name().to_string(),
        })
    }

    /// An external first seen as an interface may later be extended; it
    /// then joins the class tree under the root.
    fn reuse_external(&mut self, from: &Declaration, idx: NodeIndex, role: ExpectedKind) {
        let TypeNode::External { name, role: first } = &self.graph[idx] else {
            return;
        };
        if *first == role {
            return;
        }
        warn!(
            "[{}] external type '{name}' used as {role} by '{}' but first seen as {first}",
            Stage::Builder,
            from.name()
        );

        let has_superclass = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .any(|edge| *edge.weight() == EdgeKind::Extends);
        if role == ExpectedKind::Class && !has_superclass {
            self.graph.add_edge(idx, self.root, EdgeKind::Extends);
        }
    }

    /// Exact, member-type, then same-package lookup among declared types only.
    fn lookup_declared(&self, from: &Declaration, reference: &str) -> Option<NodeIndex> {
        if let Some(idx) = self.declared_index(reference) {
            return Some(idx);
        }

        // Member types of the referring type and each of its outer types
        let mut scope = Some(from.name().to_string());
        let mut hops = 0;
        while let Some(current) = scope {
            if let Some(idx) = self.declared_index(&format!("{current}${reference}")) {
                return Some(idx);
            }
            hops += 1;
            if hops > self.graph.node_count() {
                break;
            }
            scope = self.outer_name(&current);
        }

        if !reference.contains('.') {
            if let Some(package) = from.package() {
                if let Some(idx) = self.declared_index(&format!("{package}.{reference}")) {
                    return Some(idx);
                }
            }
        }

        None
    }

    fn outer_name(&self, name: &str) -> Option<String> {
        let explicit = self
            .declared_index(name)
            .and_then(|idx| self.graph[idx].declaration())
            .and_then(|decl| decl.enclosing_type().map(str::to_string));
        explicit.or_else(|| name.rsplit_once('$').map(|(outer, _)| outer.to_string()))
    }

    fn declared_index(&self, name: &str) -> Option<NodeIndex> {
        self.node_map
            .get(name)
            .copied()
            .filter(|&idx| !self.graph[idx].is_sentinel())
    }

    fn add_external(&mut self, name: &str, role: ExpectedKind) -> NodeIndex {
        let idx = self.graph.add_node(TypeNode::External {
            name: name.to_string(),
            role,
        });
        self.node_map.insert(name.to_string(), idx);
        if role == ExpectedKind::Class {
            // External classes still sit under the root
            self.graph.add_edge(idx, self.root, EdgeKind::Extends);
        }
        idx
    }
}
