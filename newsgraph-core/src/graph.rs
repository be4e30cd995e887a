//! The weighted co-occurrence graph.
//!
//! A thin wrapper over an undirected `petgraph` graph keyed by entity id.
//! The clique and centrality code only sees `nodes`, `neighbors`,
//! `edge_weight`, and `subgraph`, so it stays independent of the storage
//! library's API.

use std::collections::{BTreeSet, HashMap};

use petgraph::graph::{Graph, NodeIndex};
use petgraph::Undirected;
use uuid::Uuid;

use crate::link::Link;

/// Undirected weighted graph over entity ids.
#[derive(Debug, Clone, Default)]
pub struct CooccurGraph {
    graph: Graph<Uuid, f64, Undirected>,
    indices: HashMap<Uuid, NodeIndex>,
}

impl CooccurGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the analytics graph from the link table.
    ///
    /// Only links with `weight > weight_threshold` (strict) survive; the
    /// node set is exactly the endpoints of the surviving links, so
    /// entities without a heavy link never enter the graph.
    #[must_use]
    pub fn from_links(links: &[Link], weight_threshold: u64) -> Self {
        let mut graph = Self::new();
        for link in links {
            if link.weight > weight_threshold {
                graph.add_edge(link.from, link.to, link.weight as f64);
            }
        }
        graph
    }

    fn index_of(&mut self, id: Uuid) -> NodeIndex {
        match self.indices.get(&id) {
            Some(&idx) => idx,
            None => {
                let idx = self.graph.add_node(id);
                self.indices.insert(id, idx);
                idx
            }
        }
    }

    /// Insert an undirected weighted edge, creating endpoints as needed.
    /// Self-loops are invalid upstream and ignored here.
    pub fn add_edge(&mut self, a: Uuid, b: Uuid, weight: f64) {
        if a == b {
            return;
        }
        let ia = self.index_of(a);
        let ib = self.index_of(b);
        self.graph.update_edge(ia, ib, weight);
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// True when the graph has no edges (and therefore no nodes).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// True when `id` is a node of the graph.
    #[must_use]
    pub fn contains(&self, id: Uuid) -> bool {
        self.indices.contains_key(&id)
    }

    /// All node ids, sorted. The sort gives every traversal a fixed,
    /// reproducible starting order.
    #[must_use]
    pub fn nodes(&self) -> Vec<Uuid> {
        let mut nodes: Vec<Uuid> = self.indices.keys().copied().collect();
        nodes.sort_unstable();
        nodes
    }

    /// Neighbors of `id`, sorted. Empty when `id` is not a node.
    #[must_use]
    pub fn neighbors(&self, id: Uuid) -> Vec<Uuid> {
        let Some(&idx) = self.indices.get(&id) else {
            return Vec::new();
        };
        let mut neighbors: Vec<Uuid> = self
            .graph
            .neighbors(idx)
            .map(|n| self.graph[n])
            .collect();
        neighbors.sort_unstable();
        neighbors
    }

    /// Degree of `id`; 0 when `id` is not a node.
    #[must_use]
    pub fn degree(&self, id: Uuid) -> usize {
        self.indices
            .get(&id)
            .map_or(0, |&idx| self.graph.neighbors(idx).count())
    }

    /// Weight of the edge between `a` and `b`, if present.
    #[must_use]
    pub fn edge_weight(&self, a: Uuid, b: Uuid) -> Option<f64> {
        let ia = *self.indices.get(&a)?;
        let ib = *self.indices.get(&b)?;
        let edge = self.graph.find_edge(ia, ib)?;
        self.graph.edge_weight(edge).copied()
    }

    /// True when `a` and `b` are adjacent.
    #[must_use]
    pub fn has_edge(&self, a: Uuid, b: Uuid) -> bool {
        self.edge_weight(a, b).is_some()
    }

    /// Induced subgraph on `members`: their nodes and every edge whose
    /// endpoints are both members. Members absent from this graph become
    /// isolated nodes so the centrality scope still covers them.
    #[must_use]
    pub fn subgraph(&self, members: &BTreeSet<Uuid>) -> CooccurGraph {
        let mut sub = Self::new();
        for &id in members {
            sub.index_of(id);
        }
        for edge in self.graph.edge_indices() {
            let Some((ia, ib)) = self.graph.edge_endpoints(edge) else {
                continue;
            };
            let (a, b) = (self.graph[ia], self.graph[ib]);
            if members.contains(&a) && members.contains(&b) {
                if let Some(&w) = self.graph.edge_weight(edge) {
                    sub.add_edge(a, b, w);
                }
            }
        }
        sub
    }
}
