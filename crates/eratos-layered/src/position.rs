//! Coordinate assignment in the top-to-bottom frame.
//!
//! `y` follows the rank: each rank is as tall as its tallest node and ranks are `ranksep`
//! apart. `x` starts packed left to right by order and is then pulled toward the weighted
//! average of each node's neighbors in the adjacent ranks, alternating direction per pass.
//! Every pass keeps the order and the `nodesep` spacing intact.

use crate::model::LayoutGraph;
use std::collections::BTreeMap;

fn layers(g: &LayoutGraph) -> Vec<Vec<String>> {
    let mut ranks: BTreeMap<i32, Vec<(usize, String)>> = BTreeMap::new();
    for v in g.nodes() {
        let Some(n) = g.node(v) else {
            continue;
        };
        let Some(rank) = n.rank else {
            continue;
        };
        ranks
            .entry(rank)
            .or_default()
            .push((n.order.unwrap_or(usize::MAX), v.to_string()));
    }
    ranks
        .into_values()
        .map(|mut ids| {
            ids.sort();
            ids.into_iter().map(|(_, v)| v).collect()
        })
        .collect()
}

fn width(g: &LayoutGraph, v: &str) -> f64 {
    g.node(v).map(|n| n.width).unwrap_or(0.0)
}

fn x_of(g: &LayoutGraph, v: &str) -> f64 {
    g.node(v).and_then(|n| n.x).unwrap_or(0.0)
}

pub fn position(g: &mut LayoutGraph) {
    let layers = layers(g);
    position_y(g, &layers);
    position_x(g, &layers);
}

fn position_y(g: &mut LayoutGraph, layers: &[Vec<String>]) {
    let rank_sep = g.graph().ranksep;
    let mut prev_y: f64 = 0.0;
    for ids in layers {
        let max_h = ids
            .iter()
            .filter_map(|id| g.node(id).map(|n| n.height))
            .fold(0.0_f64, f64::max);
        for id in ids {
            if let Some(n) = g.node_mut(id) {
                n.y = Some(prev_y + max_h / 2.0);
            }
        }
        prev_y += max_h + rank_sep;
    }
}

fn position_x(g: &mut LayoutGraph, layers: &[Vec<String>]) {
    let node_sep = g.graph().nodesep;
    let passes = g.graph().position_passes;

    for ids in layers {
        let mut x_cursor: f64 = 0.0;
        for id in ids {
            let w = width(g, id);
            if let Some(n) = g.node_mut(id) {
                n.x = Some(x_cursor + w / 2.0);
            }
            x_cursor += w + node_sep;
        }
    }

    for pass in 0..passes {
        let downward = pass % 2 == 0;
        let order: Vec<&Vec<String>> = if downward {
            layers.iter().collect()
        } else {
            layers.iter().rev().collect()
        };
        for ids in order {
            let desired: Vec<f64> = ids
                .iter()
                .map(|v| {
                    let edges = if downward {
                        g.in_edges(v, None)
                    } else {
                        g.out_edges(v, None)
                    };
                    let mut sum = 0.0;
                    let mut weight = 0.0;
                    for e in &edges {
                        let other = if downward { &e.v } else { &e.w };
                        let w = g.edge_by_key(e).map(|l| l.weight).unwrap_or(1.0);
                        sum += w * x_of(g, other);
                        weight += w;
                    }
                    if weight > 0.0 {
                        sum / weight
                    } else {
                        x_of(g, v)
                    }
                })
                .collect();
            let xs = place_row(g, ids, &desired, node_sep);
            for (id, x) in ids.iter().zip(xs) {
                if let Some(n) = g.node_mut(id) {
                    n.x = Some(x);
                }
            }
        }
    }
}

/// Closest placement to `desired` that keeps order and spacing: the mean of the left-packed
/// and right-packed feasible solutions, which is itself feasible.
fn place_row(g: &LayoutGraph, ids: &[String], desired: &[f64], node_sep: f64) -> Vec<f64> {
    let n = ids.len();
    if n == 0 {
        return Vec::new();
    }
    let gap = |i: usize| (width(g, &ids[i]) + width(g, &ids[i + 1])) / 2.0 + node_sep;

    let mut left = desired.to_vec();
    for i in 1..n {
        left[i] = left[i].max(left[i - 1] + gap(i - 1));
    }
    let mut right = desired.to_vec();
    for i in (0..n - 1).rev() {
        right[i] = right[i].min(right[i + 1] - gap(i));
    }
    left.iter().zip(&right).map(|(l, r)| (l + r) / 2.0).collect()
}
