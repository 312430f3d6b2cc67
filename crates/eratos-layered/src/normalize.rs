//! Split long edges into chains of rank-adjacent edges through dummy nodes.

use crate::graphlib::EdgeKey;
use crate::model::{DummyEdge, EdgeLabel, LayoutGraph, NodeLabel, Point};

const DUMMY_PREFIX: &str = "_d";

fn add_dummy_node(g: &mut LayoutGraph, label: NodeLabel) -> String {
    let mut i = g.node_count();
    loop {
        let v = format!("{DUMMY_PREFIX}{i}");
        if !g.has_node(&v) {
            g.set_node(&v, label);
            return v;
        }
        i += 1;
    }
}

pub fn run(g: &mut LayoutGraph) {
    for e in g.edge_keys() {
        normalize_edge(g, e);
    }
}

fn normalize_edge(g: &mut LayoutGraph, e: EdgeKey) {
    let v_rank = g.node(&e.v).and_then(|n| n.rank).unwrap_or(0);
    let w_rank = g.node(&e.w).and_then(|n| n.rank).unwrap_or(0);
    if w_rank <= v_rank + 1 {
        return;
    }
    let Some(edge_label) = g.edge_by_key(&e).cloned() else {
        return;
    };
    let _ = g.remove_edge_key(&e);

    let origin = DummyEdge {
        v: e.v.clone(),
        w: e.w.clone(),
        name: e.name.clone(),
    };
    let multigraph = g.is_multigraph();
    let segment_name = |i: i32| multigraph.then(|| format!("{}#{i}", e.name.as_deref().unwrap_or("")));

    let mut prev = e.v.clone();
    for r in (v_rank + 1)..w_rank {
        let dummy = add_dummy_node(
            g,
            NodeLabel {
                rank: Some(r),
                dummy: Some(origin.clone()),
                ..Default::default()
            },
        );
        g.set_edge_named(
            prev,
            dummy.clone(),
            segment_name(r),
            Some(EdgeLabel {
                weight: edge_label.weight,
                ..Default::default()
            }),
        );
        prev = dummy;
    }
    g.set_edge_named(
        prev,
        e.w.clone(),
        segment_name(w_rank),
        Some(EdgeLabel {
            weight: edge_label.weight,
            ..Default::default()
        }),
    );

    // Park the original label on the first segment so `undo` can restore it.
    let first = g
        .out_edges(&e.v, None)
        .into_iter()
        .find(|k| g.node(&k.w).and_then(|n| n.dummy.as_ref()) == Some(&origin));
    if let Some(first) = first {
        if let Some(lbl) = g.edge_mut_by_key(&first) {
            lbl.minlen = edge_label.minlen;
            lbl.reversed = edge_label.reversed;
            lbl.forward_name = edge_label.forward_name.clone();
        }
    }
}

/// Removes dummy nodes, restoring each original edge with the dummy positions as its
/// intermediate points.
pub fn undo(g: &mut LayoutGraph) {
    let dummies: Vec<(String, DummyEdge)> = g
        .nodes()
        .filter_map(|v| {
            let d = g.node(v)?.dummy.clone()?;
            Some((v.to_string(), d))
        })
        .collect();
    if dummies.is_empty() {
        return;
    }

    // Chains keyed by their original edge, in the order the dummies were created.
    let mut chains: Vec<(DummyEdge, Vec<String>)> = Vec::new();
    for (id, origin) in dummies {
        match chains.iter_mut().find(|(o, _)| *o == origin) {
            Some((_, ids)) => ids.push(id),
            None => chains.push((origin, vec![id])),
        }
    }

    for (origin, ids) in chains {
        let mut label: Option<EdgeLabel> = None;
        if let Some(first) = ids.first() {
            label = g
                .in_edges(first, Some(&origin.v))
                .first()
                .and_then(|k| g.edge_by_key(k).cloned());
        }
        let mut label = label.unwrap_or_default();
        label.points = ids
            .iter()
            .filter_map(|id| {
                let n = g.node(id)?;
                Some(Point {
                    x: n.x?,
                    y: n.y?,
                })
            })
            .collect();
        for id in &ids {
            let _ = g.remove_node(id);
        }
        g.set_edge_named(origin.v, origin.w, origin.name, Some(label));
    }
}
