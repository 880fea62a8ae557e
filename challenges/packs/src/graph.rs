use std::collections::{HashMap, HashSet};

use petgraph::Direction::{self, Incoming, Outgoing};
use petgraph::stable_graph::{EdgeIndex, EdgeReference, NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};

/// Stable handle to a node in a [`Graph`]. Removing other nodes never moves
/// it. A handle to a removed node stops resolving until a later insert
/// reuses the slot; solves only remove once generation is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(NodeIndex);

/// Stable handle to an edge in a [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(EdgeIndex);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0.index()
    }

    pub(crate) fn raw(&self) -> NodeIndex {
        self.0
    }
}

impl EdgeId {
    pub fn index(&self) -> usize {
        self.0.index()
    }
}

/// A remaining quantity reached during a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub value: i64,
}

/// A pack subtracted from `from` to reach `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    pub pack_size: i64,
}

impl Edge {
    fn from_ref(edge: EdgeReference<'_, i64>) -> Edge {
        Edge {
            id: EdgeId(edge.id()),
            from: NodeId(edge.source()),
            to: NodeId(edge.target()),
            pack_size: *edge.weight(),
        }
    }
}

/// Directed graph of remaining quantities, owned by a single solve.
///
/// Node weights are remaining quantities and edge weights are pack sizes.
/// The stable graph keeps every other index valid across removals, which the
/// pruner relies on while it walks and deletes.
#[derive(Debug, Default)]
pub struct Graph {
    inner: StableDiGraph<i64, i64>,
    by_value: HashMap<i64, NodeIndex>,
    labels: HashSet<(NodeIndex, NodeIndex, i64)>,
}

impl Graph {
    pub fn new() -> Graph {
        Graph::default()
    }

    /// Returns the node holding `value`, creating it on first use.
    ///
    /// The value index is what collapses permutations of the same packs into a
    /// single state: however a remainder is reached, it maps to one node.
    pub fn create_node(&mut self, value: i64) -> NodeId {
        if let Some(index) = self.by_value.get(&value) {
            return NodeId(*index);
        }
        let index = self.inner.add_node(value);
        self.by_value.insert(value, index);
        NodeId(index)
    }

    pub fn find(&self, value: i64) -> Option<NodeId> {
        self.by_value.get(&value).copied().map(NodeId)
    }

    /// Links `from` to `to` with `pack_size`. Returns `false` without touching
    /// the graph when the same labelled edge already exists or either end has
    /// been removed.
    pub fn create_edge(&mut self, from: NodeId, to: NodeId, pack_size: i64) -> bool {
        if !self.contains(from) || !self.contains(to) {
            return false;
        }
        if !self.labels.insert((from.0, to.0, pack_size)) {
            return false;
        }
        self.inner.add_edge(from.0, to.0, pack_size);
        true
    }

    pub fn has_edge(&self, from: NodeId, to: NodeId, pack_size: i64) -> bool {
        self.labels.contains(&(from.0, to.0, pack_size))
    }

    /// True when any edge, whatever its pack size, leads from `from` to `to`.
    pub fn is_linked(&self, from: NodeId, to: NodeId) -> bool {
        self.contains(from) && self.inner.contains_edge(from.0, to.0)
    }

    /// Removes the node together with every edge touching it.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        if !self.contains(id) {
            return false;
        }
        let touching: Vec<(NodeIndex, NodeIndex, i64)> = self
            .inner
            .edges_directed(id.0, Outgoing)
            .chain(self.inner.edges_directed(id.0, Incoming))
            .map(|edge| (edge.source(), edge.target(), *edge.weight()))
            .collect();
        for label in &touching {
            self.labels.remove(label);
        }

        let Some(value) = self.inner.remove_node(id.0) else {
            return false;
        };
        if self.by_value.get(&value) == Some(&id.0) {
            self.by_value.remove(&value);
        }
        true
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.inner.contains_node(id.0)
    }

    pub fn value(&self, id: NodeId) -> Option<i64> {
        self.inner.node_weight(id.0).copied()
    }

    pub fn edge(&self, id: EdgeId) -> Option<Edge> {
        let (from, to) = self.inner.edge_endpoints(id.0)?;
        let pack_size = *self.inner.edge_weight(id.0)?;
        Some(Edge {
            id,
            from: NodeId(from),
            to: NodeId(to),
            pack_size,
        })
    }

    /// Outgoing edges in insertion order.
    pub fn out_edges(&self, id: NodeId) -> impl Iterator<Item = Edge> + '_ {
        self.directed(id, Outgoing).into_iter()
    }

    /// Incoming edges in insertion order.
    pub fn in_edges(&self, id: NodeId) -> impl Iterator<Item = Edge> + '_ {
        self.directed(id, Incoming).into_iter()
    }

    pub fn out_degree(&self, id: NodeId) -> usize {
        self.degree(id, Outgoing)
    }

    pub fn in_degree(&self, id: NodeId) -> usize {
        self.degree(id, Incoming)
    }

    /// Distinct nodes with an edge into `id`, in first-seen order.
    pub fn predecessors(&self, id: NodeId) -> Vec<NodeId> {
        let mut seen = Vec::new();
        for edge in self.in_edges(id) {
            if !seen.contains(&edge.from) {
                seen.push(edge.from);
            }
        }
        seen
    }

    /// Live nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = Node> + '_ {
        self.inner.node_indices().map(|index| Node {
            id: NodeId(index),
            value: self.inner[index],
        })
    }

    /// Live edges in creation order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.inner.edge_references().map(Edge::from_ref)
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    pub(crate) fn raw(&self) -> &StableDiGraph<i64, i64> {
        &self.inner
    }

    fn directed(&self, id: NodeId, dir: Direction) -> Vec<Edge> {
        if !self.contains(id) {
            return Vec::new();
        }
        // adjacency lists hand back the newest edge first
        let mut edges: Vec<Edge> = self
            .inner
            .edges_directed(id.0, dir)
            .map(Edge::from_ref)
            .collect();
        edges.reverse();
        edges
    }

    fn degree(&self, id: NodeId, dir: Direction) -> usize {
        if !self.contains(id) {
            return 0;
        }
        self.inner.edges_directed(id.0, dir).count()
    }
}
