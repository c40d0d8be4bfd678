//! Undirected bridge graph stored as an adjacency arena.

use std::collections::VecDeque;

use crate::{NodeId, Result, TopologyError, MAX_VERTICES};

/// An undirected graph over dense bridge ids.
///
/// Neighbor lists keep insertion order, which is the order bridges address
/// their links in. Duplicate edges are ignored; self-loops are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Graph {
    adjacency: Vec<Vec<NodeId>>,
    edge_count: usize,
}

impl Graph {
    /// Create a graph with `vertex_count` isolated vertices.
    ///
    /// # Panics
    ///
    /// Panics if `vertex_count` exceeds [`MAX_VERTICES`]. Use
    /// [`Graph::with_vertices`] for untrusted counts.
    pub fn new(vertex_count: usize) -> Self {
        assert!(vertex_count <= MAX_VERTICES, "vertex count {vertex_count} exceeds the id space");
        Self {
            adjacency: vec![Vec::new(); vertex_count],
            edge_count: 0,
        }
    }

    /// Create a graph, rejecting counts the id space cannot address.
    pub fn with_vertices(vertex_count: usize) -> Result<Self> {
        if vertex_count > MAX_VERTICES {
            return Err(TopologyError::TooManyVertices(vertex_count));
        }
        Ok(Self::new(vertex_count))
    }

    /// Build a graph from raw id pairs.
    pub fn from_edges<I>(vertex_count: usize, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut graph = Self::with_vertices(vertex_count)?;
        for (u, v) in edges {
            graph.add_edge(NodeId(u), NodeId(v))?;
        }
        Ok(graph)
    }

    /// Validate a raw vertex id against this graph.
    pub fn vertex(&self, raw: u64) -> Result<NodeId> {
        if raw < self.adjacency.len() as u64 {
            Ok(NodeId(raw as u32))
        } else {
            Err(TopologyError::InvalidVertex {
                vertex: raw,
                vertex_count: self.adjacency.len(),
            })
        }
    }

    /// Add the undirected edge `u-v`.
    ///
    /// Returns `false` if the edge already existed.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId) -> Result<bool> {
        let u = self.vertex(u.0 as u64)?;
        let v = self.vertex(v.0 as u64)?;
        if u == v {
            return Err(TopologyError::SelfLoop(u));
        }
        if self.adjacency[u.index()].contains(&v) {
            return Ok(false);
        }
        self.adjacency[u.index()].push(v);
        self.adjacency[v.index()].push(u);
        self.edge_count += 1;
        Ok(true)
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// True if the graph has no vertices.
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// True if `id` is a vertex of this graph.
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.adjacency.len()
    }

    /// Neighbors of `id` in insertion order (empty for unknown ids).
    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        self.adjacency.get(id.index()).map_or(&[], Vec::as_slice)
    }

    /// Number of neighbors of `id`.
    pub fn degree(&self, id: NodeId) -> usize {
        self.neighbors(id).len()
    }

    /// Check whether `u-v` is an edge.
    pub fn has_edge(&self, u: NodeId, v: NodeId) -> bool {
        self.neighbors(u).contains(&v)
    }

    /// All vertex ids in increasing order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.adjacency.len() as u32).map(NodeId)
    }

    /// Every edge once, as `(smaller, larger)`.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.adjacency.iter().enumerate().flat_map(|(u, list)| {
            let u = NodeId(u as u32);
            list.iter().filter(move |&&v| u < v).map(move |&v| (u, v))
        })
    }

    /// Hop distances from `source`; `None` for unreachable vertices.
    pub fn bfs_distances(&self, source: NodeId) -> Vec<Option<u32>> {
        let mut distances = vec![None; self.adjacency.len()];
        if !self.contains(source) {
            return distances;
        }

        let mut queue = VecDeque::new();
        distances[source.index()] = Some(0);
        queue.push_back(source);

        while let Some(u) = queue.pop_front() {
            let next = distances[u.index()].map_or(0, |d| d + 1);
            for &v in self.neighbors(u) {
                if distances[v.index()].is_none() {
                    distances[v.index()] = Some(next);
                    queue.push_back(v);
                }
            }
        }
        distances
    }

    /// Connected components, labelled in order of their smallest member.
    pub fn components(&self) -> Components {
        let n = self.adjacency.len();
        let mut labels = vec![usize::MAX; n];
        let mut representatives = Vec::new();
        let mut sizes = Vec::new();
        let mut queue = VecDeque::new();

        for start in self.nodes() {
            if labels[start.index()] != usize::MAX {
                continue;
            }
            // Ids are visited in increasing order, so `start` is the minimum.
            let label = representatives.len();
            representatives.push(start);
            sizes.push(0);

            labels[start.index()] = label;
            queue.push_back(start);
            while let Some(u) = queue.pop_front() {
                sizes[label] += 1;
                for &v in self.neighbors(u) {
                    if labels[v.index()] == usize::MAX {
                        labels[v.index()] = label;
                        queue.push_back(v);
                    }
                }
            }
        }

        Components {
            labels,
            representatives,
            sizes,
        }
    }

    /// True if every vertex reaches every other (vacuously true when empty).
    pub fn is_connected(&self) -> bool {
        self.components().count() <= 1
    }
}

/// Connected components of a [`Graph`].
///
/// Each component is represented by its smallest id, which is also the root
/// the election must agree on inside that component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Components {
    labels: Vec<usize>,
    representatives: Vec<NodeId>,
    sizes: Vec<usize>,
}

impl Components {
    /// Number of components.
    pub fn count(&self) -> usize {
        self.representatives.len()
    }

    /// Component label of `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a vertex of the graph.
    pub fn component_of(&self, id: NodeId) -> usize {
        self.labels[id.index()]
    }

    /// Smallest id in the component containing `id`.
    pub fn representative(&self, id: NodeId) -> NodeId {
        self.representatives[self.component_of(id)]
    }

    /// Smallest id of every component, by label.
    pub fn representatives(&self) -> &[NodeId] {
        &self.representatives
    }

    /// Number of vertices in component `label`.
    pub fn size(&self, label: usize) -> usize {
        self.sizes.get(label).copied().unwrap_or(0)
    }

    /// Members of component `label` in increasing id order.
    pub fn members(&self, label: usize) -> impl Iterator<Item = NodeId> + '_ {
        self.labels
            .iter()
            .enumerate()
            .filter(move |(_, &l)| l == label)
            .map(|(i, _)| NodeId(i as u32))
    }

    /// True if `a` and `b` are in the same component.
    pub fn same_component(&self, a: NodeId, b: NodeId) -> bool {
        self.labels[a.index()] == self.labels[b.index()]
    }
}
