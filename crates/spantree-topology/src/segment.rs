//! Shared broadcast segments (LANs) between bridges.
//!
//! Instead of point-to-point links, bridges attach to segments. Every bridge
//! on a segment hears what the segment forwards, so two bridges are one hop
//! apart whenever they share a segment.

use crate::{Graph, NodeId, Result, TopologyError};

/// Bridges and the segments they attach to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentLayout {
    bridge_count: usize,
    segments: Vec<Vec<NodeId>>,
}

impl SegmentLayout {
    /// A layout with `bridge_count` bridges and no segments yet.
    pub fn new(bridge_count: usize) -> Self {
        Self {
            bridge_count,
            segments: Vec::new(),
        }
    }

    /// Add a segment attaching the given bridges; returns its index.
    ///
    /// Repeated attachments of the same bridge are collapsed.
    pub fn add_segment<I>(&mut self, bridges: I) -> Result<usize>
    where
        I: IntoIterator<Item = u32>,
    {
        let index = self.segments.len();
        let mut attached: Vec<NodeId> = Vec::new();
        for raw in bridges {
            if raw as usize >= self.bridge_count {
                return Err(TopologyError::InvalidVertex {
                    vertex: raw as u64,
                    vertex_count: self.bridge_count,
                });
            }
            let id = NodeId(raw);
            if !attached.contains(&id) {
                attached.push(id);
            }
        }
        if attached.is_empty() {
            return Err(TopologyError::EmptySegment(index));
        }
        self.segments.push(attached);
        Ok(index)
    }

    /// Builder form of [`SegmentLayout::add_segment`].
    pub fn with_segment<I>(mut self, bridges: I) -> Result<Self>
    where
        I: IntoIterator<Item = u32>,
    {
        self.add_segment(bridges)?;
        Ok(self)
    }

    /// Number of bridges.
    pub fn bridge_count(&self) -> usize {
        self.bridge_count
    }

    /// Number of segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Bridges attached to segment `index`.
    pub fn bridges_on(&self, index: usize) -> &[NodeId] {
        self.segments.get(index).map_or(&[], Vec::as_slice)
    }

    /// Segments `bridge` is attached to, in segment order.
    pub fn segments_of(&self, bridge: NodeId) -> impl Iterator<Item = usize> + '_ {
        self.segments
            .iter()
            .enumerate()
            .filter(move |(_, members)| members.contains(&bridge))
            .map(|(index, _)| index)
    }

    /// The equivalent point-to-point graph: bridges sharing a segment are
    /// neighbors.
    pub fn bridge_graph(&self) -> Graph {
        let mut graph = Graph::new(self.bridge_count);
        for members in &self.segments {
            for (i, &u) in members.iter().enumerate() {
                for &v in &members[i + 1..] {
                    // Members are validated and distinct.
                    let _ = graph.add_edge(u, v);
                }
            }
        }
        graph
    }
}
