use super::packing::{self, Cell, Packed};
use super::{PlacedNode, PositionedGraph, Region, RegionKind, StructuralHash};
use crate::geom::{Point, Size, point, size, vector};
use crate::model::{EdgeKind, Partition, VisualEdge, VisualNode};
use eratos_core::LayoutConfig;
use eratos_graphlib::{Graph, GraphOptions, alg};
use eratos_layered::{GraphLabel, NodeLabel, RankDir};
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use std::cmp::Reverse;
use std::collections::BTreeMap;

pub(super) fn compute(
    config: &LayoutConfig,
    nodes: &[&VisualNode],
    edges: &[&VisualEdge],
    size_of: &dyn Fn(&str) -> Size,
    hash: StructuralHash,
) -> PositionedGraph {
    let schema_events = pick(nodes, true, Partition::Schema);
    let inferred_events = pick(nodes, true, Partition::Inferred);
    let mut schema_entities = pick(nodes, false, Partition::Schema);
    let mut inferred_entities = pick(nodes, false, Partition::Inferred);

    let before = pairs(edges, EdgeKind::Before);
    let parent_child = pairs(edges, EdgeKind::ParentChild);

    let mut participant_counts: HashMap<&str, usize> = HashMap::default();
    for (_, target) in pairs(edges, EdgeKind::Participant) {
        *participant_counts.entry(target).or_default() += 1;
    }
    schema_entities.sort_by_key(|n| {
        Reverse(participant_counts.get(n.id.as_str()).copied().unwrap_or(0))
    });
    inferred_entities.sort_by_key(|n| n.category.priority());

    let blocks = [
        (
            RegionKind::SchemaEvents,
            schema_event_block(config, &schema_events, &before, &parent_child, size_of),
        ),
        (
            RegionKind::InferredEvents,
            inferred_event_block(config, &inferred_events, &before, size_of),
        ),
        (
            RegionKind::SchemaEntities,
            entity_block(config, &schema_entities, size_of),
        ),
        (
            RegionKind::InferredEntities,
            entity_block(config, &inferred_entities, size_of),
        ),
    ];

    let origin = point(config.origin.x, config.origin.y);
    let [se, ie, sn, _] = &blocks;
    let entity_y = origin.y + se.1.size.height.max(ie.1.size.height);
    let anchors = [
        origin,
        origin + vector(se.1.size.width, 0.0),
        point(origin.x, entity_y),
        point(origin.x + sn.1.size.width, entity_y),
    ];

    let mut placed: BTreeMap<String, PlacedNode> = BTreeMap::new();
    let mut regions: Vec<Region> = Vec::with_capacity(4);
    for ((kind, block), anchor) in blocks.into_iter().zip(anchors) {
        for (id, at) in block.positions {
            let s = size_of(&id);
            placed.insert(
                id,
                PlacedNode {
                    x: anchor.x + at.x,
                    y: anchor.y + at.y,
                    width: s.width,
                    height: s.height,
                    dragged: false,
                },
            );
        }
        regions.push(Region {
            kind,
            x: anchor.x,
            y: anchor.y,
            width: block.size.width,
            height: block.size.height,
        });
    }

    PositionedGraph {
        nodes: placed,
        regions,
        hash,
    }
}

fn pick<'a>(nodes: &[&'a VisualNode], event: bool, partition: Partition) -> Vec<&'a VisualNode> {
    nodes
        .iter()
        .copied()
        .filter(|n| n.is_event() == event && n.partition == partition)
        .collect()
}

fn pairs<'a>(edges: &[&'a VisualEdge], kind: EdgeKind) -> Vec<(&'a str, &'a str)> {
    edges
        .iter()
        .filter(|e| e.kind() == kind)
        .map(|e| (e.source.as_str(), e.target.as_str()))
        .collect()
}

/// Surrounds non-empty content with the region padding; empty content stays zero-sized.
fn padded(config: &LayoutConfig, mut packed: Packed) -> Packed {
    if packed.positions.is_empty() {
        return Packed::default();
    }
    let pad = config.region_padding;
    for (_, at) in &mut packed.positions {
        *at += vector(pad, pad);
    }
    packed.size = size(packed.size.width + 2.0 * pad, packed.size.height + 2.0 * pad);
    packed
}

fn schema_event_block(
    config: &LayoutConfig,
    events: &[&VisualNode],
    before: &[(&str, &str)],
    parent_child: &[(&str, &str)],
    size_of: &dyn Fn(&str) -> Size,
) -> Packed {
    if events.is_empty() {
        return Packed::default();
    }
    let members: HashSet<&str> = events.iter().map(|n| n.id.as_str()).collect();
    let inside = |(s, t): &(&str, &str)| members.contains(s) && members.contains(t);

    let mut temporal: Graph<(), (), ()> = Graph::new(GraphOptions::default());
    for n in events {
        temporal.set_node(n.id.as_str(), ());
    }
    for (s, t) in before.iter().filter(|p| inside(p)) {
        temporal.set_edge(*s, *t);
    }
    let order = alg::topsort_breaking_cycles(&temporal);
    let rank: HashMap<&str, usize> = order
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();

    let mut g = eratos_layered::new_graph();
    g.set_graph(GraphLabel {
        rankdir: RankDir::LR,
        nodesep: config.nodesep,
        ranksep: config.ranksep,
        ..Default::default()
    });
    for id in &order {
        let s = size_of(id);
        g.set_node(
            id.as_str(),
            NodeLabel {
                width: s.width,
                height: s.height,
                ..Default::default()
            },
        );
    }
    let mut links: Vec<(&str, &str)> = parent_child.iter().filter(|p| inside(p)).copied().collect();
    links.sort_by_key(|(s, t)| (rank.get(s).copied(), rank.get(t).copied()));
    for (s, t) in links {
        g.set_edge(s, t);
    }
    eratos_layered::layout(&mut g);

    let mut positions: Vec<(String, Point)> = Vec::with_capacity(order.len());
    for id in order {
        let Some(n) = g.node(&id) else {
            continue;
        };
        let x = n.x.unwrap_or(0.0) - n.width / 2.0;
        let y = n.y.unwrap_or(0.0) - n.height / 2.0;
        positions.push((id, point(x, y)));
    }
    let label = g.graph();
    padded(
        config,
        Packed {
            positions,
            size: size(label.width, label.height),
        },
    )
}

fn inferred_event_block(
    config: &LayoutConfig,
    events: &[&VisualNode],
    before: &[(&str, &str)],
    size_of: &dyn Fn(&str) -> Size,
) -> Packed {
    let members: HashSet<&str> = events.iter().map(|n| n.id.as_str()).collect();
    let temporal: Vec<(&str, &str)> = before
        .iter()
        .filter(|(s, t)| members.contains(s) && members.contains(t))
        .copied()
        .collect();

    let mut adjacency: Graph<(), (), ()> = Graph::new(GraphOptions::undirected());
    for n in events {
        adjacency.set_node(n.id.as_str(), ());
    }
    for (s, t) in &temporal {
        adjacency.set_edge(*s, *t);
    }
    let mut components = alg::components(&adjacency);
    components.sort_by_key(|c| Reverse(c.len()));

    let linearized: Vec<Vec<String>> = components
        .into_iter()
        .map(|component| {
            if component.len() < 2 {
                return component;
            }
            let inside: HashSet<&str> = component.iter().map(String::as_str).collect();
            let mut g: Graph<(), (), ()> = Graph::new(GraphOptions::default());
            for n in events.iter().filter(|n| inside.contains(n.id.as_str())) {
                g.set_node(n.id.as_str(), ());
            }
            for (s, t) in temporal.iter().filter(|(s, _)| inside.contains(s)) {
                g.set_edge(*s, *t);
            }
            alg::topsort_breaking_cycles(&g)
        })
        .collect();

    let cells: Vec<Cell> = packing::first_fit(&linearized, config.grid_columns)
        .into_iter()
        .map(|(id, row, col)| {
            let size = size_of(&id);
            Cell { id, row, col, size }
        })
        .collect();
    padded(config, packing::grid(&cells, config.cell_gap))
}

fn entity_block(
    config: &LayoutConfig,
    entities: &[&VisualNode],
    size_of: &dyn Fn(&str) -> Size,
) -> Packed {
    let available = config.viewport_width - 2.0 * config.region_padding;
    let columns = packing::greedy_columns(
        entities.iter().map(|n| size_of(&n.id).width),
        config.cell_gap,
        available,
    );
    let cells: Vec<Cell> = entities
        .iter()
        .zip(packing::row_major(entities.len(), columns))
        .map(|(n, (row, col))| Cell {
            id: n.id.clone(),
            row,
            col,
            size: size_of(&n.id),
        })
        .collect();
    padded(config, packing::grid(&cells, config.cell_gap))
}
