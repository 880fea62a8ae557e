use log::debug;

use crate::graph::{Graph, NodeId};
use crate::selector::Selection;

/// How many nodes each pruning step removed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PruneStats {
    pub smaller: usize,
    pub dead_ends: usize,
}

/// Trims the graph down to the nodes that can still lead to the chosen
/// candidate.
pub fn prune(graph: &mut Graph, selection: &Selection) -> PruneStats {
    let stats = PruneStats {
        smaller: prune_smaller(graph, selection),
        dead_ends: prune_dead_ends(graph, selection.chosen),
    };
    debug!(
        "pruned {} losing and {} dead end nodes, {} nodes left",
        stats.smaller,
        stats.dead_ends,
        graph.node_count()
    );
    stats
}

/// Removes losing candidates and walks up through any ancestor that is still
/// below the chosen value. A candidate with a direct link into the chosen node
/// is left in place.
pub fn prune_smaller(graph: &mut Graph, selection: &Selection) -> usize {
    let mut removed = 0;
    let mut pending: Vec<NodeId> = selection.rejected.iter().rev().copied().collect();

    while let Some(node) = pending.pop() {
        if node == selection.chosen || !graph.contains(node) {
            continue;
        }
        if graph.is_linked(node, selection.chosen) {
            continue;
        }

        let ancestors: Vec<NodeId> = graph
            .predecessors(node)
            .into_iter()
            .filter(|p| graph.value(*p).is_some_and(|v| v < selection.value))
            .collect();

        graph.remove_node(node);
        removed += 1;
        pending.extend(ancestors.into_iter().rev());
    }
    removed
}

/// Removes every node other than `keep` that has no way out, repeating until
/// nothing changes. Removing a node can strand its predecessors, so those are
/// re-checked as they lose their last outgoing edge.
pub fn prune_dead_ends(graph: &mut Graph, keep: NodeId) -> usize {
    let mut removed = 0;
    let mut pending: Vec<NodeId> = graph
        .nodes()
        .filter(|node| node.id != keep && graph.out_degree(node.id) == 0)
        .map(|node| node.id)
        .collect();

    while let Some(node) = pending.pop() {
        if node == keep || !graph.contains(node) || graph.out_degree(node) > 0 {
            continue;
        }
        let predecessors = graph.predecessors(node);
        graph.remove_node(node);
        removed += 1;
        pending.extend(predecessors);
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Generator;
    use crate::selector::select;

    fn build(quantity: i64, sizes: &[i64]) -> (Graph, NodeId, Selection) {
        let mut graph = Graph::new();
        let root = graph.create_node(quantity);
        let candidates = Generator::new(&mut graph).generate(root, sizes);
        let selection = select(&candidates).expect("candidates exist");
        (graph, root, selection)
    }

    #[test]
    fn test_prune_removes_losing_candidates() {
        let (mut graph, root, selection) = build(7, &[5, 3]);
        let stats = prune(&mut graph, &selection);

        assert_eq!(stats.smaller, 3);
        assert!(graph.contains(root));
        assert!(graph.contains(selection.chosen));
        let terminals: Vec<i64> = graph.nodes().map(|n| n.value).filter(|v| *v <= 0).collect();
        assert_eq!(terminals, vec![-1]);
    }

    #[test]
    fn test_every_remaining_node_reaches_the_candidate() {
        let (mut graph, root, selection) = build(508, &[757, 151, 53, 31, 23, 3]);
        let before = graph.node_count();
        prune(&mut graph, &selection);
        assert!(graph.node_count() < before);
        assert!(graph.contains(root));

        for node in graph.nodes() {
            if node.id == selection.chosen {
                assert_eq!(graph.out_degree(node.id), 0);
            } else {
                assert!(graph.out_degree(node.id) > 0, "dead end {}", node.value);
            }
        }
    }

    #[test]
    fn test_dead_ends_cascade() {
        let mut graph = Graph::new();
        let a = graph.create_node(9);
        let b = graph.create_node(6);
        let c = graph.create_node(3);
        let target = graph.create_node(0);
        graph.create_edge(a, b, 3);
        graph.create_edge(b, c, 3);
        graph.create_edge(a, target, 9);

        // c has no way out, b only led to c
        assert_eq!(prune_dead_ends(&mut graph, target), 2);
        assert!(graph.contains(a));
        assert!(graph.contains(target));
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_directly_linked_candidates_are_kept() {
        let mut graph = Graph::new();
        let root = graph.create_node(4);
        let chosen = graph.create_node(-1);
        let other = graph.create_node(-2);
        graph.create_edge(root, chosen, 5);
        graph.create_edge(root, other, 6);
        // an edge between two terminal states never comes out of the
        // generator, but the rule should still hold
        graph.create_edge(other, chosen, 1);

        let selection = Selection {
            chosen,
            value: -1,
            rejected: vec![other],
        };
        assert_eq!(prune_smaller(&mut graph, &selection), 0);
        assert!(graph.contains(other));
    }
}
