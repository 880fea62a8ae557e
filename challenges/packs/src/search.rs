//! Path searches over a pack graph.
//!
//! [`BreadthFirst`] counts hops and is what the solver uses: fewest edges
//! means fewest packs. [`Dijkstra`] weighs each edge by its pack size and is
//! kept for callers that need a weighted walk over the same graph.

use std::collections::{HashMap, VecDeque};

use petgraph::algo::dijkstra;
use petgraph::stable_graph::NodeIndex;

use crate::graph::{Edge, Graph, NodeId};

/// A single-source path search over a [`Graph`].
pub trait PathSearch {
    /// Edges from the search's start node to `target`, in walk order.
    /// `None` when `target` cannot be reached.
    fn edges_to(&self, graph: &Graph, target: NodeId) -> Option<Vec<Edge>>;

    /// Number of packs on the path to `target`.
    fn distance(&self, graph: &Graph, target: NodeId) -> Option<usize> {
        self.edges_to(graph, target).map(|edges| edges.len())
    }
}

/// Follows the recorded discovery edges back from `target` to `start`.
fn walk_back(
    discovered: &HashMap<NodeId, Edge>,
    start: NodeId,
    target: NodeId,
) -> Option<Vec<Edge>> {
    let mut path = Vec::new();
    let mut current = target;
    while current != start {
        let edge = discovered.get(&current)?;
        path.push(*edge);
        current = edge.from;
    }
    path.reverse();
    Some(path)
}

/// Level order search that ignores edge weights.
///
/// Every node keeps the edge it was first discovered through, so ties between
/// equally short paths go to whichever edge was inserted first.
#[derive(Debug, Clone, Copy)]
pub struct BreadthFirst {
    start: NodeId,
}

impl BreadthFirst {
    pub fn new(start: NodeId) -> BreadthFirst {
        BreadthFirst { start }
    }

    /// The first-discovery edge of every node reachable from the start node.
    /// The start node itself has no entry.
    pub fn edges_map(&self, graph: &Graph) -> HashMap<NodeId, Edge> {
        let mut discovered = HashMap::new();
        if !graph.contains(self.start) {
            return discovered;
        }

        let mut queue = VecDeque::from([self.start]);
        while let Some(current) = queue.pop_front() {
            for edge in graph.out_edges(current) {
                if edge.to == self.start || discovered.contains_key(&edge.to) {
                    continue;
                }
                discovered.insert(edge.to, edge);
                queue.push_back(edge.to);
            }
        }
        discovered
    }

    /// Hop count to every reachable node, including 0 for the start node.
    pub fn distance_map(&self, graph: &Graph) -> HashMap<NodeId, usize> {
        let discovered = self.edges_map(graph);
        let mut distances: HashMap<NodeId, usize> = HashMap::with_capacity(discovered.len() + 1);
        if graph.contains(self.start) {
            distances.insert(self.start, 0);
        }
        for node in discovered.keys() {
            if let Some(path) = walk_back(&discovered, self.start, *node) {
                distances.insert(*node, path.len());
            }
        }
        distances
    }
}

impl PathSearch for BreadthFirst {
    fn edges_to(&self, graph: &Graph, target: NodeId) -> Option<Vec<Edge>> {
        if !graph.contains(target) {
            return None;
        }
        walk_back(&self.edges_map(graph), self.start, target)
    }
}

/// Cheapest path by summed pack size. Pack sizes are validated positive, so
/// the non-negative weight requirement always holds.
#[derive(Debug, Clone, Copy)]
pub struct Dijkstra {
    start: NodeId,
}

impl Dijkstra {
    pub fn new(start: NodeId) -> Dijkstra {
        Dijkstra { start }
    }

    /// Cheapest total pack size to every node reachable from the start node.
    pub fn cost_map(&self, graph: &Graph) -> HashMap<NodeId, i64> {
        if !graph.contains(self.start) {
            return HashMap::new();
        }
        let costs = self.costs(graph, None);
        graph
            .nodes()
            .filter_map(|node| costs.get(&node.id.raw()).map(|cost| (node.id, *cost)))
            .collect()
    }

    fn costs(&self, graph: &Graph, goal: Option<NodeId>) -> HashMap<NodeIndex, i64> {
        dijkstra(graph.raw(), self.start.raw(), goal.map(|n| n.raw()), |edge| {
            *edge.weight()
        })
    }
}

impl PathSearch for Dijkstra {
    fn edges_to(&self, graph: &Graph, target: NodeId) -> Option<Vec<Edge>> {
        if !graph.contains(target) || !graph.contains(self.start) {
            return None;
        }
        let costs = self.costs(graph, Some(target));
        let mut remaining = *costs.get(&target.raw())?;

        // Every recorded cost came from a settled predecessor, so some edge
        // in always accounts for it exactly. Weights are positive, so the
        // walk only ever moves to cheaper nodes and ends at the start.
        let mut path = Vec::new();
        let mut current = target;
        while current != self.start {
            let edge = graph.in_edges(current).find(|edge| {
                costs
                    .get(&edge.from.raw())
                    .is_some_and(|cost| cost + edge.pack_size == remaining)
            })?;
            remaining -= edge.pack_size;
            current = edge.from;
            path.push(edge);
        }
        path.reverse();
        Some(path)
    }
}
