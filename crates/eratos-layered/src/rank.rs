//! Rank assignment (longest path) and rank normalization.

use crate::model::LayoutGraph;
use rustc_hash::FxHashMap as HashMap;

/// Assigns ranks so that every edge `v -> w` satisfies `rank(w) - rank(v) >= minlen`.
///
/// Sinks are pulled up to rank 0 and everything else is placed as low as its successors allow,
/// which is the classic longest-path layering. Expects an acyclic graph.
pub fn longest_path(g: &mut LayoutGraph) {
    fn dfs(v: &str, g: &mut LayoutGraph, visited: &mut HashMap<String, i32>) -> i32 {
        if let Some(&rank) = visited.get(v) {
            return rank;
        }
        // Guards against cycles that slipped through: a node on the current path ranks 0.
        visited.insert(v.to_string(), 0);

        let mut rank: Option<i32> = None;
        for e in g.out_edges(v, None) {
            if e.is_self_loop() {
                continue;
            }
            let minlen: i32 = g.edge_by_key(&e).map(|l| l.minlen as i32).unwrap_or(1);
            let candidate = dfs(&e.w, g, visited) - minlen;
            rank = Some(match rank {
                Some(current) => current.min(candidate),
                None => candidate,
            });
        }

        let rank = rank.unwrap_or(0);
        if let Some(label) = g.node_mut(v) {
            label.rank = Some(rank);
        }
        visited.insert(v.to_string(), rank);
        rank
    }

    let mut visited: HashMap<String, i32> = HashMap::default();
    for v in g.node_ids() {
        dfs(&v, g, &mut visited);
    }
}

/// Shifts ranks so the smallest rank is 0.
pub fn normalize_ranks(g: &mut LayoutGraph) {
    let min = g
        .nodes()
        .filter_map(|v| g.node(v).and_then(|n| n.rank))
        .min()
        .unwrap_or(0);
    g.for_each_node_mut(|_, n| {
        if let Some(r) = n.rank {
            n.rank = Some(r - min);
        }
    });
}

pub fn max_rank(g: &LayoutGraph) -> Option<i32> {
    g.nodes().filter_map(|v| g.node(v).and_then(|n| n.rank)).max()
}

pub fn rank(g: &mut LayoutGraph) {
    longest_path(g);
    normalize_ranks(g);
}
