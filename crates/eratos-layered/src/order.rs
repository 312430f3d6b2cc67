//! Node ordering / crossing minimization.
//!
//! Initial order comes from a depth-first walk over ranks; it is then refined by alternating
//! down/up barycenter sweeps, keeping the layering with the fewest weighted crossings.

use crate::model::LayoutGraph;
use crate::rank::max_rank;
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

pub fn init_order(g: &LayoutGraph) -> Vec<Vec<String>> {
    let Some(max_rank) = max_rank(g) else {
        return Vec::new();
    };
    let mut layers: Vec<Vec<String>> = vec![Vec::new(); (max_rank + 1).max(0) as usize];

    fn dfs(g: &LayoutGraph, v: &str, visited: &mut HashSet<String>, layers: &mut [Vec<String>]) {
        if !visited.insert(v.to_string()) {
            return;
        }
        let Some(rank) = g.node(v).and_then(|n| n.rank) else {
            return;
        };
        if let Some(layer) = layers.get_mut(rank.max(0) as usize) {
            layer.push(v.to_string());
        }
        for w in g.successors(v) {
            dfs(g, w, visited, layers);
        }
    }

    // Stable on insertion order within a rank.
    let mut ordered: Vec<(i32, usize, String)> = g
        .nodes()
        .enumerate()
        .filter_map(|(i, v)| Some((g.node(v)?.rank?, i, v.to_string())))
        .collect();
    ordered.sort();

    let mut visited: HashSet<String> = HashSet::default();
    for (_, _, v) in ordered {
        dfs(g, &v, &mut visited, &mut layers);
    }
    layers
}

pub fn assign_order(g: &mut LayoutGraph, layering: &[Vec<String>]) {
    for layer in layering {
        for (i, v) in layer.iter().enumerate() {
            if let Some(n) = g.node_mut(v) {
                n.order = Some(i);
            }
        }
    }
}

/// Weighted number of edge crossings between consecutive layers.
pub fn cross_count(g: &LayoutGraph, layering: &[Vec<String>]) -> f64 {
    layering
        .windows(2)
        .map(|pair| two_layer_cross_count(g, &pair[0], &pair[1]))
        .sum()
}

fn two_layer_cross_count(g: &LayoutGraph, north: &[String], south: &[String]) -> f64 {
    if south.is_empty() {
        return 0.0;
    }
    let south_pos: HashMap<&str, usize> = south
        .iter()
        .enumerate()
        .map(|(i, v)| (v.as_str(), i))
        .collect();

    let mut entries: Vec<(usize, f64)> = Vec::new();
    for v in north {
        let mut out: Vec<(usize, f64)> = g
            .out_edges(v, None)
            .into_iter()
            .filter_map(|e| {
                let pos = *south_pos.get(e.w.as_str())?;
                let weight = g.edge_by_key(&e).map(|l| l.weight).unwrap_or(0.0);
                Some((pos, weight))
            })
            .collect();
        out.sort_by_key(|(pos, _)| *pos);
        entries.extend(out);
    }

    // Accumulator tree (Barth, Jünger & Mutzel).
    let mut first_index: usize = 1;
    while first_index < south.len() {
        first_index <<= 1;
    }
    let tree_size = 2 * first_index - 1;
    first_index -= 1;
    let mut tree: Vec<f64> = vec![0.0; tree_size];

    let mut cc: f64 = 0.0;
    for (pos, weight) in entries {
        let mut index = pos + first_index;
        tree[index] += weight;
        let mut weight_sum: f64 = 0.0;
        while index > 0 {
            if index % 2 == 1 {
                weight_sum += tree[index + 1];
            }
            index = (index - 1) >> 1;
            tree[index] += weight;
        }
        cc += weight * weight_sum;
    }
    cc
}

fn build_layer_matrix(g: &LayoutGraph, max_rank: i32) -> Vec<Vec<String>> {
    let mut layers: Vec<Vec<(usize, String)>> = vec![Vec::new(); (max_rank + 1).max(0) as usize];
    for v in g.nodes() {
        let Some(n) = g.node(v) else {
            continue;
        };
        let (Some(rank), Some(order)) = (n.rank, n.order) else {
            continue;
        };
        if let Some(layer) = layers.get_mut(rank.max(0) as usize) {
            layer.push((order, v.to_string()));
        }
    }
    layers
        .into_iter()
        .map(|mut layer| {
            layer.sort();
            layer.into_iter().map(|(_, v)| v).collect()
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sweep {
    /// Fix the layer above, order by predecessors.
    Down,
    /// Fix the layer below, order by successors.
    Up,
}

fn sweep_layer(g: &mut LayoutGraph, layer: &[String], sweep: Sweep, bias_right: bool) {
    struct Entry {
        v: String,
        index: usize,
        barycenter: Option<f64>,
    }

    let entries: Vec<Entry> = layer
        .iter()
        .enumerate()
        .map(|(index, v)| {
            let edges = match sweep {
                Sweep::Down => g.in_edges(v, None),
                Sweep::Up => g.out_edges(v, None),
            };
            let mut sum = 0.0;
            let mut weight = 0.0;
            for e in &edges {
                let other = match sweep {
                    Sweep::Down => &e.v,
                    Sweep::Up => &e.w,
                };
                let Some(order) = g.node(other).and_then(|n| n.order) else {
                    continue;
                };
                let w = g.edge_by_key(e).map(|l| l.weight).unwrap_or(1.0);
                sum += w * order as f64;
                weight += w;
            }
            Entry {
                v: v.clone(),
                index,
                barycenter: (weight > 0.0).then(|| sum / weight),
            }
        })
        .collect();

    let (mut sortable, unsortable): (Vec<Entry>, Vec<Entry>) =
        entries.into_iter().partition(|e| e.barycenter.is_some());
    sortable.sort_by(|a, b| {
        let (ba, bb) = (a.barycenter.unwrap_or(0.0), b.barycenter.unwrap_or(0.0));
        ba.total_cmp(&bb).then_with(|| {
            if bias_right {
                b.index.cmp(&a.index)
            } else {
                a.index.cmp(&b.index)
            }
        })
    });

    // Unsortable nodes keep their slot; sortable ones fill the remaining slots in order.
    let mut result: Vec<Option<String>> = vec![None; layer.len()];
    for e in &unsortable {
        result[e.index] = Some(e.v.clone());
    }
    let mut it = sortable.into_iter();
    for slot in result.iter_mut().filter(|s| s.is_none()) {
        if let Some(e) = it.next() {
            *slot = Some(e.v);
        }
    }

    for (i, v) in result.into_iter().flatten().enumerate() {
        if let Some(n) = g.node_mut(&v) {
            n.order = Some(i);
        }
    }
}

pub fn order(g: &mut LayoutGraph) {
    let Some(max_rank) = max_rank(g) else {
        return;
    };
    let patience = g.graph().order_patience;

    let layering = init_order(g);
    assign_order(g, &layering);

    let mut best_cc = cross_count(g, &layering);
    let mut best = layering;

    let mut i: usize = 0;
    let mut last_best: usize = 0;
    while last_best < patience && best_cc > 0.0 {
        let sweep = if i % 2 == 1 { Sweep::Down } else { Sweep::Up };
        let bias_right = i % 4 >= 2;
        let current = build_layer_matrix(g, max_rank);
        let ranks: Vec<usize> = match sweep {
            Sweep::Down => (1..current.len()).collect(),
            Sweep::Up => (0..current.len().saturating_sub(1)).rev().collect(),
        };
        for r in ranks {
            let layer = build_layer_matrix(g, max_rank).swap_remove(r);
            sweep_layer(g, &layer, sweep, bias_right);
        }

        let now = build_layer_matrix(g, max_rank);
        let cc = cross_count(g, &now);
        if cc < best_cc {
            best_cc = cc;
            best = now;
            last_best = 0;
        } else {
            last_best += 1;
        }
        i += 1;
    }

    assign_order(g, &best);
}
