//! Deterministic placement of visible nodes into four background regions.
//!
//! Region order is fixed: schema events at the origin, inferred events to their right, then
//! schema entities and inferred entities below the taller event region.

pub mod packing;
mod regions;

use crate::geom::{Point, Rect, Size, point, size};
use crate::model::{VisualEdge, VisualGraph, VisualNode};
use eratos_core::LayoutConfig;
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Measured node sizes keyed by node id.
pub type NodeSizes = HashMap<String, Size>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegionKind {
    SchemaEvents,
    InferredEvents,
    SchemaEntities,
    InferredEntities,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub kind: RegionKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    pub fn rect(&self) -> Rect {
        Rect::new(point(self.x, self.y), size(self.width, self.height))
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }
}

/// Top-left position and size of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedNode {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Position comes from a manual drag rather than the layout pass.
    pub dragged: bool,
}

impl PlacedNode {
    pub fn rect(&self) -> Rect {
        Rect::new(point(self.x, self.y), size(self.width, self.height))
    }
}

/// Sum of visible node extents and visible edge count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructuralHash {
    extent_bits: u64,
    edges: usize,
}

impl StructuralHash {
    pub fn of<I>(sizes: I, edges: usize) -> Self
    where
        I: IntoIterator<Item = Size>,
    {
        let total: f64 = sizes.into_iter().map(|s| s.width + s.height).sum();
        Self {
            extent_bits: total.to_bits(),
            edges,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedGraph {
    pub nodes: BTreeMap<String, PlacedNode>,
    /// Always four entries, in [`RegionKind`] order.
    pub regions: Vec<Region>,
    pub hash: StructuralHash,
}

impl PositionedGraph {
    pub fn node(&self, id: &str) -> Option<&PlacedNode> {
        self.nodes.get(id)
    }

    pub fn region(&self, kind: RegionKind) -> Option<&Region> {
        self.regions.iter().find(|r| r.kind == kind)
    }
}

/// Layout pass with hash-gated recomputation and persistent drag positions.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
    cached: Option<PositionedGraph>,
    drags: HashMap<String, Point>,
    passes: usize,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            cached: None,
            drags: HashMap::default(),
            passes: 0,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: LayoutConfig) {
        self.config = config;
        self.invalidate();
    }

    /// Number of full layout passes run so far.
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Forces the next [`LayoutEngine::layout`] call to recompute.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Pins `id` at a manual top-left position.
    pub fn drag(&mut self, id: impl Into<String>, x: f64, y: f64) {
        self.drags.insert(id.into(), point(x, y));
    }

    pub fn release(&mut self, id: &str) -> bool {
        self.drags.remove(id).is_some()
    }

    pub fn layout(
        &mut self,
        graph: &VisualGraph,
        hidden: &HashSet<String>,
        sizes: &NodeSizes,
    ) -> PositionedGraph {
        let default_size = size(
            self.config.default_node_size.width,
            self.config.default_node_size.height,
        );
        let size_of = |id: &str| sizes.get(id).copied().unwrap_or(default_size);

        let visible: Vec<&VisualNode> = graph
            .nodes
            .iter()
            .filter(|n| !hidden.contains(&n.id))
            .collect();
        let visible_ids: HashSet<&str> = visible.iter().map(|n| n.id.as_str()).collect();
        let edges: Vec<&VisualEdge> = graph
            .edges
            .iter()
            .filter(|e| {
                visible_ids.contains(e.source.as_str()) && visible_ids.contains(e.target.as_str())
            })
            .collect();
        let hash = StructuralHash::of(visible.iter().map(|n| size_of(&n.id)), edges.len());

        let all_ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        self.drags.retain(|id, _| all_ids.contains(id.as_str()));

        // A node missing from the cached pass is unplaced and forces a new pass.
        let reusable = self.cached.as_ref().is_some_and(|cached| {
            cached.hash == hash
                && cached.nodes.len() == visible.len()
                && visible.iter().all(|n| cached.nodes.contains_key(&n.id))
        });
        let base = match self.cached.take() {
            Some(cached) if reusable => {
                tracing::trace!("layout cache hit");
                cached
            }
            _ => {
                self.passes += 1;
                let out = regions::compute(&self.config, &visible, &edges, &size_of, hash);
                tracing::debug!(
                    nodes = out.nodes.len(),
                    edges = edges.len(),
                    pass = self.passes,
                    "computed layout"
                );
                out
            }
        };

        let mut out = base.clone();
        self.cached = Some(base);
        for (id, at) in &self.drags {
            if let Some(node) = out.nodes.get_mut(id) {
                node.x = at.x;
                node.y = at.y;
                node.dragged = true;
            }
        }
        out
    }
}
