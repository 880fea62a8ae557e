use std::collections::{BTreeMap, HashSet};

use log::debug;

use crate::graph::{Graph, NodeId};

/// Terminal states (remaining quantity <= 0) keyed by their value.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Candidates(BTreeMap<i64, NodeId>);

impl Candidates {
    /// Registers a terminal node. Only the first arrival at a value counts.
    fn register(&mut self, value: i64, node: NodeId) {
        self.0.entry(value).or_insert(node);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, value: i64) -> Option<NodeId> {
        self.0.get(&value).copied()
    }

    /// Candidates from the smallest overage (value closest to zero) to the
    /// largest.
    pub fn by_overage(&self) -> impl Iterator<Item = (i64, NodeId)> + '_ {
        self.0.iter().rev().map(|(value, node)| (*value, *node))
    }
}

struct Frame {
    node: NodeId,
    value: i64,
    next: usize,
}

/// Expands the remaining-quantity states reachable from a root node.
///
/// Each pass walks depth first, subtracting every allowed size from the
/// current remainder. The walk runs on an explicit stack so that deep chains
/// (small packs, large quantities) cannot overflow the call stack.
///
/// A node is descended into once. Later passes only allow a prefix of the
/// sizes an earlier pass tried, so a node finished once has nothing left to
/// add and is skipped however it is reached again.
pub struct Generator<'g> {
    graph: &'g mut Graph,
    candidates: Candidates,
    expanded: HashSet<NodeId>,
    expansions: usize,
    // stop once the zero node has this many incoming edges
    exit_after_exact: Option<usize>,
}

impl<'g> Generator<'g> {
    pub fn new(graph: &'g mut Graph) -> Generator<'g> {
        Generator {
            graph,
            candidates: Candidates::default(),
            expanded: HashSet::new(),
            expansions: 0,
            exit_after_exact: None,
        }
    }

    /// Stop widening once `limit` distinct packs land exactly on zero.
    ///
    /// The overage stays minimal when this fires, but paths with fewer packs
    /// may never be generated.
    pub fn with_early_exit(mut self, limit: usize) -> Generator<'g> {
        self.exit_after_exact = Some(limit);
        self
    }

    /// Runs one pass per prefix of `sizes`, longest prefix first, and returns
    /// every terminal state found.
    ///
    /// `sizes` must be the same list, largest first, on every call.
    pub fn generate(&mut self, root: NodeId, sizes: &[i64]) -> Candidates {
        for len in (1..=sizes.len()).rev() {
            self.expand(root, &sizes[..len]);
        }
        debug!(
            "generated {} nodes, {} edges, {} candidates from {} expansions",
            self.graph.node_count(),
            self.graph.edge_count(),
            self.candidates.len(),
            self.expansions
        );
        self.candidates.clone()
    }

    /// Number of nodes whose children have been walked so far.
    pub fn expansions(&self) -> usize {
        self.expansions
    }

    fn expand(&mut self, root: NodeId, allowed: &[i64]) {
        let Some(value) = self.graph.value(root) else {
            return;
        };
        if value <= 0 {
            self.candidates.register(value, root);
            return;
        }
        if self.expanded.contains(&root) {
            return;
        }

        self.expansions += 1;
        let mut stack = vec![Frame {
            node: root,
            value,
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            if frame.next == allowed.len() {
                self.expanded.insert(frame.node);
                stack.pop();
                continue;
            }
            if self.exact_limit_reached() {
                return;
            }

            let size = allowed[frame.next];
            frame.next += 1;
            let (from, remaining) = (frame.node, frame.value - size);

            let to = self.graph.create_node(remaining);
            if !self.graph.create_edge(from, to, size) {
                // this subtraction has been explored from here already
                continue;
            }

            if remaining <= 0 {
                self.candidates.register(remaining, to);
                continue;
            }
            if self.expanded.contains(&to) {
                continue;
            }

            self.expansions += 1;
            stack.push(Frame {
                node: to,
                value: remaining,
                next: 0,
            });
        }
    }

    fn exact_limit_reached(&self) -> bool {
        let Some(limit) = self.exit_after_exact else {
            return false;
        };
        self.candidates
            .get(0)
            .is_some_and(|zero| self.graph.in_degree(zero) >= limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(quantity: i64, sizes: &[i64]) -> (Graph, NodeId, Candidates) {
        let mut graph = Graph::new();
        let root = graph.create_node(quantity);
        let candidates = Generator::new(&mut graph).generate(root, sizes);
        (graph, root, candidates)
    }

    #[test]
    fn test_single_size_is_a_chain() {
        // 10 -> 7 -> 4 -> 1 -> -2
        let (graph, root, candidates) = generate(10, &[3]);
        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.out_degree(root), 1);
        let found: Vec<i64> = candidates.by_overage().map(|(v, _)| v).collect();
        assert_eq!(found, vec![-2]);
    }

    #[test]
    fn test_permutations_collapse_to_one_node() {
        // 10-5-3 and 10-3-5 both reach 2
        let (graph, _, _) = generate(10, &[5, 3]);
        let two = graph.find(2).expect("2 is reachable");
        assert_eq!(graph.in_degree(two), 2);
        let values: Vec<i64> = graph.nodes().map(|n| n.value).collect();
        let mut deduped = values.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(values.len(), deduped.len());
    }

    #[test]
    fn test_every_positive_node_is_fully_expanded() {
        let sizes = [757, 151, 53, 31, 23, 3];
        let (graph, _, _) = generate(508, &sizes);
        for node in graph.nodes() {
            if node.value > 0 {
                assert_eq!(graph.out_degree(node.id), sizes.len(), "node {}", node.value);
            } else {
                assert_eq!(graph.out_degree(node.id), 0);
            }
        }
    }

    #[test]
    fn test_candidates_ranked_by_overage() {
        let (_, _, candidates) = generate(7, &[5, 3]);
        // 7-5-5=-3, 7-5-3=-1, 7-3-5=-1, 7-3-3-5=-4, 7-3-3-3=-2
        let found: Vec<i64> = candidates.by_overage().map(|(v, _)| v).collect();
        assert_eq!(found, vec![-1, -2, -3, -4]);
    }

    #[test]
    fn test_root_at_or_below_zero_is_its_own_candidate() {
        let (graph, root, candidates) = generate(0, &[5]);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(candidates.get(0), Some(root));
    }

    #[test]
    fn test_early_exit_stops_after_enough_exact_hits() {
        let mut graph = Graph::new();
        let root = graph.create_node(12);
        let candidates = Generator::new(&mut graph)
            .with_early_exit(2)
            .generate(root, &[6, 4, 3]);
        let zero = candidates.get(0).expect("12 is an exact multiple");
        assert_eq!(graph.in_degree(zero), 2);

        let mut full = Graph::new();
        let root = full.create_node(12);
        Generator::new(&mut full).generate(root, &[6, 4, 3]);
        assert!(graph.edge_count() < full.edge_count());
    }

    #[test]
    fn test_each_node_is_expanded_once() {
        let mut graph = Graph::new();
        let root = graph.create_node(508);
        let mut generator = Generator::new(&mut graph);
        generator.generate(root, &[757, 151, 53, 31, 23, 3]);
        let expansions = generator.expansions();
        let positive = graph.nodes().filter(|n| n.value > 0).count();
        assert_eq!(expansions, positive);
    }

    #[test]
    fn test_many_pack_sizes_stay_linear() {
        // every remainder from 5000 down reaches through up to 100 edges
        let sizes: Vec<i64> = (1..=100).rev().collect();
        let mut graph = Graph::new();
        let root = graph.create_node(5_000);
        let mut generator = Generator::new(&mut graph);
        let candidates = generator.generate(root, &sizes);
        assert_eq!(generator.expansions(), 5_000);
        assert_eq!(candidates.len(), 100);
        assert_eq!(graph.edge_count(), 5_000 * 100);
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let (graph, _, candidates) = generate(200_000, &[1]);
        assert_eq!(graph.node_count(), 200_001);
        assert!(candidates.get(0).is_some());
    }
}
