//! Cycle and conflict detection over a linked graph.
//!
//! Checks run in order and stop at the first failure:
//! 1. Extends/Implements cycles (Encloses edges excluded)
//! 2. At most one class-extends-class edge per node
//! 3. Supertype kinds: classes extend classes, implements-lists name interfaces
//! 4. Enclosing chains are acyclic

use petgraph::graph::NodeIndex;
use std::collections::HashSet;

use super::LinkedGraph;
use crate::error::{ExpectedKind, ResolveError, ResolveResult};
use crate::logging::Stage;
use crate::types::EdgeKind;

/// Run every structural check against `linked`.
pub(crate) fn check(linked: &LinkedGraph) -> ResolveResult<()> {
    check_inheritance_cycles(linked)?;
    check_single_superclass(linked)?;
    check_supertype_kinds(linked)?;
    check_enclosing_cycles(linked)?;
    crate::debug_event!(Stage::Validate, "passed", "{} declared types", linked.declared.len());
    Ok(())
}

/// Node on the active DFS path and the supertypes still to visit.
struct Frame {
    node: NodeIndex,
    supertypes: Vec<NodeIndex>,
    next: usize,
}

impl Frame {
    fn new(linked: &LinkedGraph, node: NodeIndex) -> Self {
        Self {
            node,
            supertypes: linked.supertypes(node),
            next: 0,
        }
    }
}

/// Depth-first search tracking the active path.
///
/// Iterative so arbitrarily deep hierarchies cannot exhaust the call stack.
fn check_inheritance_cycles(linked: &LinkedGraph) -> ResolveResult<()> {
    let mut finished: HashSet<NodeIndex> = HashSet::new();
    let mut on_path: HashSet<NodeIndex> = HashSet::new();
    let mut stack: Vec<Frame> = Vec::new();

    for &start in &linked.declared {
        if finished.contains(&start) {
            continue;
        }
        on_path.insert(start);
        stack.push(Frame::new(linked, start));

        while let Some(frame) = stack.last_mut() {
            let Some(&next) = frame.supertypes.get(frame.next) else {
                let done = frame.node;
                stack.pop();
                on_path.remove(&done);
                finished.insert(done);
                continue;
            };
            frame.next += 1;

            if on_path.contains(&next) {
                let cycle = stack
                    .iter()
                    .skip_while(|frame| frame.node != next)
                    .map(|frame| linked.name(frame.node).to_string())
                    .collect();
                return Err(ResolveError::InheritanceCycle(cycle));
            }
            if !finished.contains(&next) {
                on_path.insert(next);
                stack.push(Frame::new(linked, next));
            }
        }
    }

    Ok(())
}

fn check_single_superclass(linked: &LinkedGraph) -> ResolveResult<()> {
    for idx in linked.graph.node_indices() {
        if linked.targets(idx, EdgeKind::Extends).len() > 1 {
            return Err(ResolveError::MultipleClassInheritance(
                linked.name(idx).to_string(),
            ));
        }
    }
    Ok(())
}

fn check_supertype_kinds(linked: &LinkedGraph) -> ResolveResult<()> {
    for &idx in &linked.declared {
        let expectations = [
            (EdgeKind::Extends, ExpectedKind::Class),
            (EdgeKind::Implements, ExpectedKind::Interface),
        ];
        for (edge, expected) in expectations {
            for target in linked.targets(idx, edge) {
                if !linked.node(target).fits(expected) {
                    return Err(ResolveError::SupertypeKindMismatch {
                        name: linked.name(idx).to_string(),
                        supertype: linked.name(target).to_string(),
                        expected,
                    });
                }
            }
        }
    }
    Ok(())
}

/// Follow each node's outer type until the chain ends or repeats.
fn check_enclosing_cycles(linked: &LinkedGraph) -> ResolveResult<()> {
    let mut cleared: HashSet<NodeIndex> = HashSet::new();

    for &start in &linked.declared {
        let mut chain = vec![start];
        let mut in_chain: HashSet<NodeIndex> = HashSet::from([start]);
        let mut current = start;

        while let Some(outer) = linked.enclosing(current) {
            if cleared.contains(&outer) {
                break;
            }
            if in_chain.contains(&outer) {
                let cycle = chain
                    .iter()
                    .skip_while(|&&idx| idx != outer)
                    .map(|&idx| linked.name(idx).to_string())
                    .collect();
                return Err(ResolveError::EnclosingCycle(cycle));
            }
            chain.push(outer);
            in_chain.insert(outer);
            current = outer;
        }

        cleared.extend(chain);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverConfig;
    use crate::declaration::Declaration;
    use crate::graph::GraphBuilder;

    fn check_decls(declarations: Vec<Declaration>) -> ResolveResult<()> {
        let config = ResolverConfig::default();
        let linked = GraphBuilder::new(&config).link(declarations)?;
        check(&linked)
    }

    #[test]
    fn test_two_class_cycle() {
        let err = check_decls(vec![
            Declaration::class("C1").extends("C2").build().unwrap(),
            Declaration::class("C2").extends("C1").build().unwrap(),
        ])
        .unwrap_err();

        match err {
            ResolveError::InheritanceCycle(path) => {
                assert_eq!(path, vec!["C1".to_string(), "C2".to_string()]);
            }
            other => panic!("expected InheritanceCycle, got {other:?}"),
        }
    }

    #[test]
    fn test_self_extension_cycle() {
        let err = check_decls(vec![Declaration::class("Narcissus")
            .extends("Narcissus")
            .build()
            .unwrap()])
        .unwrap_err();

        assert_eq!(
            err,
            ResolveError::InheritanceCycle(vec!["Narcissus".to_string()])
        );
    }

    #[test]
    fn test_interface_cycle_through_longer_path() {
        let err = check_decls(vec![
            Declaration::class("Entry").implements("A").build().unwrap(),
            Declaration::interface("A").implements("B").build().unwrap(),
            Declaration::interface("B").implements("C").build().unwrap(),
            Declaration::interface("C").implements("A").build().unwrap(),
        ])
        .unwrap_err();

        match err {
            ResolveError::InheritanceCycle(path) => {
                // Entry leads into the cycle but is not part of it
                assert_eq!(path, vec!["A", "B", "C"]);
            }
            other => panic!("expected InheritanceCycle, got {other:?}"),
        }
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        check_decls(vec![
            Declaration::interface("Base").build().unwrap(),
            Declaration::interface("Left").implements("Base").build().unwrap(),
            Declaration::interface("Right").implements("Base").build().unwrap(),
            Declaration::class("Both")
                .implements("Left")
                .implements("Right")
                .build()
                .unwrap(),
        ])
        .unwrap();
    }

    #[test]
    fn test_nested_class_extending_outer_is_not_a_cycle() {
        check_decls(vec![
            Declaration::class("com.example.multi.OuterClass")
                .build()
                .unwrap(),
            Declaration::class("com.example.multi.OuterClass$InnerClass")
                .extends("OuterClass")
                .build()
                .unwrap(),
        ])
        .unwrap();
    }

    #[test]
    fn test_multiple_class_inheritance_rechecked() {
        let config = ResolverConfig::default();
        let mut linked = GraphBuilder::new(&config)
            .link(vec![
                Declaration::class("A").build().unwrap(),
                Declaration::class("B").build().unwrap(),
                Declaration::class("C").extends("A").build().unwrap(),
            ])
            .unwrap();

        // Declarations cannot express this; forge the edge directly
        let c = linked.node_map["C"];
        let b = linked.node_map["B"];
        linked.graph.add_edge(c, b, EdgeKind::Extends);

        assert_eq!(
            check(&linked).unwrap_err(),
            ResolveError::MultipleClassInheritance("C".to_string())
        );
    }

    #[test]
    fn test_class_extending_interface() {
        let err = check_decls(vec![
            Declaration::interface("Runnable2").build().unwrap(),
            Declaration::class("Job").extends("Runnable2").build().unwrap(),
        ])
        .unwrap_err();

        assert_eq!(
            err,
            ResolveError::SupertypeKindMismatch {
                name: "Job".to_string(),
                supertype: "Runnable2".to_string(),
                expected: ExpectedKind::Class,
            }
        );
    }

    #[test]
    fn test_implementing_a_class() {
        let err = check_decls(vec![
            Declaration::class("Base").build().unwrap(),
            Declaration::class("Job").implements("Base").build().unwrap(),
        ])
        .unwrap_err();

        assert!(matches!(
            err,
            ResolveError::SupertypeKindMismatch {
                expected: ExpectedKind::Interface,
                ..
            }
        ));
    }

    #[test]
    fn test_implementing_root_is_mismatch() {
        let err = check_decls(vec![
            Declaration::class("Job").implements("Object").build().unwrap(),
        ])
        .unwrap_err();

        assert!(matches!(err, ResolveError::SupertypeKindMismatch { .. }));
    }

    #[test]
    fn test_enclosing_cycle() {
        let err = check_decls(vec![
            Declaration::class("A").enclosed_by("B").build().unwrap(),
            Declaration::class("B").enclosed_by("A").build().unwrap(),
        ])
        .unwrap_err();

        match err {
            ResolveError::EnclosingCycle(path) => {
                assert_eq!(path.len(), 2);
                assert!(path.contains(&"A".to_string()));
                assert!(path.contains(&"B".to_string()));
            }
            other => panic!("expected EnclosingCycle, got {other:?}"),
        }
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let mut declarations = vec![Declaration::class("C0").build().unwrap()];
        for i in 1..100_000 {
            declarations.push(
                Declaration::class(format!("C{i}"))
                    .extends(format!("C{}", i - 1))
                    .build()
                    .unwrap(),
            );
        }
        check_decls(declarations).unwrap();
    }

    #[test]
    fn test_cycle_at_end_of_deep_chain() {
        let mut declarations = vec![Declaration::class("C0").extends("C4999").build().unwrap()];
        for i in 1..5_000 {
            declarations.push(
                Declaration::class(format!("C{i}"))
                    .extends(format!("C{}", i - 1))
                    .build()
                    .unwrap(),
            );
        }

        match check_decls(declarations).unwrap_err() {
            ResolveError::InheritanceCycle(path) => {
                assert_eq!(path.len(), 5_000);
                assert_eq!(path[0], "C0");
                assert_eq!(path[1], "C4999");
            }
            other => panic!("expected InheritanceCycle, got {other:?}"),
        }
    }
}
