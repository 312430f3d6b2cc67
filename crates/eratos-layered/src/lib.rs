#![forbid(unsafe_code)]

//! Layered (Sugiyama-style) layout for directed graphs.
//!
//! The pipeline is deliberately small: cycle breaking, longest-path ranking, long-edge
//! splitting, barycenter ordering and a spacing-preserving coordinate pass. It is enough for
//! schema event graphs, where ranks come from temporal order and the widths are node cards.

pub use eratos_graphlib as graphlib;

pub mod acyclic;
pub mod coordinate_system;
pub mod model;
pub mod normalize;
pub mod order;
pub mod position;
pub mod rank;

pub use model::{DummyEdge, EdgeLabel, GraphLabel, LayoutGraph, NodeLabel, Point, RankDir};

use graphlib::GraphOptions;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A directed multigraph ready for [`layout`].
///
/// Cycle breaking keeps reversed edges apart from existing opposite edges only on multigraphs,
/// so callers should start from this constructor.
pub fn new_graph() -> LayoutGraph {
    LayoutGraph::new(GraphOptions {
        multigraph: true,
        directed: true,
    })
}

/// Lays out `g` in place.
///
/// On return every node has `x`/`y` (its center), every edge has `points` from the source
/// boundary to the target boundary, and the graph label carries the overall `width`/`height`.
pub fn layout(g: &mut LayoutGraph) {
    if g.node_count() == 0 {
        let label = g.graph_mut();
        label.width = 2.0 * label.marginx;
        label.height = 2.0 * label.marginy;
        return;
    }

    acyclic::run(g);
    rank::rank(g);
    normalize::run(g);
    order::order(g);
    coordinate_system::adjust(g);
    position::position(g);
    coordinate_system::undo(g);
    translate_graph(g);
    normalize::undo(g);
    assign_endpoints(g);
    acyclic::undo(g);
}

fn translate_graph(g: &mut LayoutGraph) {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for v in g.nodes() {
        let Some(n) = g.node(v) else {
            continue;
        };
        let (Some(x), Some(y)) = (n.x, n.y) else {
            continue;
        };
        min_x = min_x.min(x - n.width / 2.0);
        max_x = max_x.max(x + n.width / 2.0);
        min_y = min_y.min(y - n.height / 2.0);
        max_y = max_y.max(y + n.height / 2.0);
    }
    if !min_x.is_finite() {
        return;
    }

    let (marginx, marginy) = (g.graph().marginx, g.graph().marginy);
    let dx = marginx - min_x;
    let dy = marginy - min_y;
    g.for_each_node_mut(|_, n| {
        n.x = n.x.map(|x| x + dx);
        n.y = n.y.map(|y| y + dy);
    });
    g.for_each_edge_mut(|_, e| {
        for p in &mut e.points {
            p.x += dx;
            p.y += dy;
        }
    });

    let label = g.graph_mut();
    label.width = max_x - min_x + 2.0 * marginx;
    label.height = max_y - min_y + 2.0 * marginy;
}

fn center(g: &LayoutGraph, v: &str) -> Option<(Point, f64, f64)> {
    let n = g.node(v)?;
    Some((
        Point {
            x: n.x?,
            y: n.y?,
        },
        n.width,
        n.height,
    ))
}

/// Point where the segment from the node center toward `toward` leaves the node's box.
pub fn intersect_rect(center: Point, width: f64, height: f64, toward: Point) -> Point {
    let dx = toward.x - center.x;
    let dy = toward.y - center.y;
    let w = width / 2.0;
    let h = height / 2.0;
    if dx == 0.0 && dy == 0.0 {
        return center;
    }
    let (sx, sy) = if dy.abs() * w > dx.abs() * h {
        let h = if dy < 0.0 { -h } else { h };
        (h * dx / dy, h)
    } else {
        let w = if dx < 0.0 { -w } else { w };
        (w, w * dy / dx)
    };
    Point {
        x: center.x + sx,
        y: center.y + sy,
    }
}

fn assign_endpoints(g: &mut LayoutGraph) {
    for e in g.edge_keys() {
        let (Some((vc, vw, vh)), Some((wc, ww, wh))) = (center(g, &e.v), center(g, &e.w)) else {
            continue;
        };
        let Some(label) = g.edge_mut_by_key(&e) else {
            continue;
        };
        let first = label.points.first().copied().unwrap_or(wc);
        let last = label.points.last().copied().unwrap_or(vc);
        let start = intersect_rect(vc, vw, vh, first);
        let end = intersect_rect(wc, ww, wh, last);
        label.points.insert(0, start);
        label.points.push(end);
    }
}
