//! Abstract-method obligations of concrete classes.
//!
//! For a concrete class `C` the superclass chain is walked from `C` upwards,
//! numbering each class by its distance from `C`. A signature declared
//! abstract somewhere in that chain is satisfied only by a concrete
//! declaration strictly closer to `C` than the closest abstract one. A
//! signature that is abstract only in interfaces is satisfied by any concrete
//! declaration reachable from `C`, in the chain or as an interface default.
//!
//! External and root nodes contribute nothing: they have no obligations and
//! are assumed to satisfy whatever they inherit.
//!
//! The per-class state is derived from the superclass state, so each class
//! is visited once no matter how deep the hierarchy is.

use petgraph::graph::NodeIndex;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use super::LinkedGraph;
use crate::logging::Stage;
use crate::types::{EdgeKind, MethodSignature};

pub(crate) type Obligations = HashMap<NodeIndex, BTreeSet<MethodSignature>>;

/// What a class inherits from itself and its superclass chain.
#[derive(Debug, Clone, Default)]
struct ChainState {
    /// Abstract in the chain with no closer concrete declaration
    pending: BTreeSet<MethodSignature>,
    /// Declared abstract anywhere in the chain
    abstract_seen: HashSet<MethodSignature>,
    /// Declared concrete anywhere in the chain
    concrete_seen: HashSet<MethodSignature>,
    /// Interfaces reachable from any class in the chain
    interfaces: HashSet<NodeIndex>,
}

impl ChainState {
    /// State of `class`, given the state of its superclass.
    fn extend(mut self, linked: &LinkedGraph, class: NodeIndex) -> Self {
        let Some(decl) = linked.node(class).declaration() else {
            return self;
        };

        for sig in decl.concrete_methods() {
            self.pending.remove(sig);
            self.concrete_seen.insert(sig.clone());
        }
        for sig in decl.abstract_methods() {
            self.pending.insert(sig.clone());
            self.abstract_seen.insert(sig.clone());
        }

        let mut queue: VecDeque<NodeIndex> = linked.targets(class, EdgeKind::Implements).into();
        while let Some(interface) = queue.pop_front() {
            if self.interfaces.insert(interface) {
                queue.extend(linked.targets(interface, EdgeKind::Implements));
            }
        }

        self
    }

    fn unresolved(&self, linked: &LinkedGraph) -> BTreeSet<MethodSignature> {
        let mut interface_abstract: BTreeSet<&MethodSignature> = BTreeSet::new();
        let mut interface_concrete: HashSet<&MethodSignature> = HashSet::new();
        for &idx in &self.interfaces {
            if let Some(decl) = linked.node(idx).declaration() {
                interface_abstract.extend(decl.abstract_methods());
                interface_concrete.extend(decl.concrete_methods());
            }
        }

        let mut unresolved = self.pending.clone();
        for sig in interface_abstract {
            if self.abstract_seen.contains(sig) {
                // Governed by the chain rule above
                continue;
            }
            if !self.concrete_seen.contains(sig) && !interface_concrete.contains(sig) {
                unresolved.insert(sig.clone());
            }
        }
        unresolved
    }
}

/// Unresolved abstract signatures for every concrete declared class.
pub(crate) fn compute(linked: &LinkedGraph) -> Obligations {
    let mut states: HashMap<NodeIndex, ChainState> = HashMap::new();
    let mut obligations = Obligations::new();

    for &idx in &linked.declared {
        let is_concrete = linked
            .node(idx)
            .kind()
            .is_some_and(|kind| kind.is_concrete());
        if !is_concrete {
            continue;
        }
        fill_chain(linked, idx, &mut states);
        if let Some(state) = states.get(&idx) {
            obligations.insert(idx, state.unresolved(linked));
        }
    }

    crate::debug_event!(
        Stage::Obligations,
        "computed",
        "{} of {} concrete classes incomplete, {} chain states",
        obligations.values().filter(|set| !set.is_empty()).count(),
        obligations.len(),
        states.len()
    );
    obligations
}

/// Compute states for `class` and any ancestors not yet visited, top-down.
fn fill_chain(linked: &LinkedGraph, class: NodeIndex, states: &mut HashMap<NodeIndex, ChainState>) {
    let mut missing = Vec::new();
    let mut current = Some(class);
    while let Some(idx) = current {
        if states.contains_key(&idx) || linked.node(idx).is_sentinel() {
            break;
        }
        // Cycles are rejected before this stage; stay finite regardless
        if missing.len() > linked.declared.len() {
            break;
        }
        missing.push(idx);
        current = linked.superclass(idx);
    }

    for idx in missing.into_iter().rev() {
        let inherited = linked
            .superclass(idx)
            .and_then(|parent| states.get(&parent))
            .cloned()
            .unwrap_or_default();
        let state = inherited.extend(linked, idx);
        states.insert(idx, state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverConfig;
    use crate::declaration::Declaration;
    use crate::graph::GraphBuilder;

    fn unresolved(declarations: Vec<Declaration>, class: &str) -> Vec<String> {
        let config = ResolverConfig::default();
        let linked = GraphBuilder::new(&config).link(declarations).unwrap();
        let obligations = compute(&linked);
        obligations[&linked.node_map[class]]
            .iter()
            .map(|sig| sig.to_string())
            .collect()
    }

    fn shape() -> Declaration {
        Declaration::abstract_class("Shape")
            .abstract_method("area", &[])
            .concrete("describe", &[])
            .build()
            .unwrap()
    }

    #[test]
    fn test_implemented_abstract_method() {
        let result = unresolved(
            vec![
                shape(),
                Declaration::class("Circle")
                    .extends("Shape")
                    .concrete("area", &[])
                    .build()
                    .unwrap(),
            ],
            "Circle",
        );
        assert!(result.is_empty(), "unexpected obligations: {result:?}");
    }

    #[test]
    fn test_missing_abstract_method() {
        let result = unresolved(
            vec![
                shape(),
                Declaration::class("Blob").extends("Shape").build().unwrap(),
            ],
            "Blob",
        );
        assert_eq!(result, vec!["area()"]);
    }

    #[test]
    fn test_overload_does_not_satisfy() {
        let result = unresolved(
            vec![
                shape(),
                Declaration::class("Square")
                    .extends("Shape")
                    .concrete("area", &["int"])
                    .build()
                    .unwrap(),
            ],
            "Square",
        );
        assert_eq!(result, vec!["area()"]);
    }

    #[test]
    fn test_reabstracted_method_needs_new_implementation() {
        let result = unresolved(
            vec![
                Declaration::class("Base").concrete("run", &[]).build().unwrap(),
                Declaration::abstract_class("Middle")
                    .extends("Base")
                    .abstract_method("run", &[])
                    .build()
                    .unwrap(),
                Declaration::class("Leaf").extends("Middle").build().unwrap(),
            ],
            "Leaf",
        );
        assert_eq!(result, vec!["run()"]);
    }

    #[test]
    fn test_implementation_in_intermediate_class() {
        let result = unresolved(
            vec![
                shape(),
                Declaration::abstract_class("Polygon")
                    .extends("Shape")
                    .concrete("area", &[])
                    .build()
                    .unwrap(),
                Declaration::class("Triangle").extends("Polygon").build().unwrap(),
            ],
            "Triangle",
        );
        assert!(result.is_empty());
    }

    #[test]
    fn test_interface_satisfied_by_inherited_superclass_method() {
        let result = unresolved(
            vec![
                Declaration::interface("Closeable2")
                    .abstract_method("close", &[])
                    .build()
                    .unwrap(),
                Declaration::class("Resource").concrete("close", &[]).build().unwrap(),
                Declaration::class("FileResource")
                    .extends("Resource")
                    .implements("Closeable2")
                    .build()
                    .unwrap(),
            ],
            "FileResource",
        );
        assert!(result.is_empty());
    }

    #[test]
    fn test_interface_default_method_satisfies() {
        let result = unresolved(
            vec![
                Declaration::interface("Greeter")
                    .abstract_method("greet", &[])
                    .build()
                    .unwrap(),
                Declaration::interface("PoliteGreeter")
                    .implements("Greeter")
                    .concrete("greet", &[])
                    .build()
                    .unwrap(),
                Declaration::class("Host").implements("PoliteGreeter").build().unwrap(),
            ],
            "Host",
        );
        assert!(result.is_empty());
    }

    #[test]
    fn test_interfaces_of_superclass_are_owed() {
        let result = unresolved(
            vec![
                Declaration::interface("Printable")
                    .abstract_method("print", &[])
                    .build()
                    .unwrap(),
                Declaration::abstract_class("Document")
                    .implements("Printable")
                    .build()
                    .unwrap(),
                Declaration::class("Letter").extends("Document").build().unwrap(),
            ],
            "Letter",
        );
        assert_eq!(result, vec!["print()"]);
    }

    #[test]
    fn test_external_supertypes_carry_no_obligations() {
        let result = unresolved(
            vec![
                Declaration::class("Task")
                    .extends("java.util.TimerTask")
                    .implements("Runnable")
                    .build()
                    .unwrap(),
            ],
            "Task",
        );
        assert!(result.is_empty());
    }

    #[test]
    fn test_abstract_types_have_no_entry() {
        let config = ResolverConfig::default();
        let linked = GraphBuilder::new(&config)
            .link(vec![
                shape(),
                Declaration::interface("Printable")
                    .abstract_method("print", &[])
                    .build()
                    .unwrap(),
            ])
            .unwrap();

        let obligations = compute(&linked);
        assert!(obligations.is_empty());
    }

    #[test]
    fn test_deep_chain_shares_ancestor_state() {
        let mut declarations = vec![
            Declaration::abstract_class("C0")
                .abstract_method("run", &[])
                .build()
                .unwrap(),
        ];
        for i in 1..2_000 {
            declarations.push(
                Declaration::class(format!("C{i}"))
                    .extends(format!("C{}", i - 1))
                    .build()
                    .unwrap(),
            );
        }
        declarations.push(
            Declaration::class("Leaf")
                .extends("C1999")
                .concrete("run", &[])
                .build()
                .unwrap(),
        );

        let config = ResolverConfig::default();
        let linked = GraphBuilder::new(&config).link(declarations).unwrap();
        let obligations = compute(&linked);

        let owed = |name: &str| obligations[&linked.node_map[name]].len();
        assert_eq!(owed("C1"), 1);
        assert_eq!(owed("C1999"), 1);
        assert_eq!(owed("Leaf"), 0);
    }
}
