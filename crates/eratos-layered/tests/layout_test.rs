use eratos_layered::{EdgeLabel, GraphLabel, LayoutGraph, NodeLabel, Point, RankDir, layout, new_graph};
use std::collections::BTreeMap;

fn graph() -> LayoutGraph {
    let mut g = new_graph();
    g.set_graph(GraphLabel::default());
    g.set_default_edge_label(EdgeLabel::default);
    g
}

fn sized(width: f64, height: f64) -> NodeLabel {
    NodeLabel {
        width,
        height,
        ..Default::default()
    }
}

fn coords(g: &LayoutGraph) -> BTreeMap<String, (f64, f64)> {
    let mut out = BTreeMap::new();
    for id in g.nodes() {
        let n = g.node(id).unwrap();
        out.insert(id.to_string(), (n.x.unwrap(), n.y.unwrap()));
    }
    out
}

#[test]
fn layout_handles_an_empty_graph() {
    let mut g = graph();
    g.graph_mut().marginx = 10.0;
    layout(&mut g);
    assert_eq!(g.graph().width, 20.0);
    assert_eq!(g.graph().height, 0.0);
}

#[test]
fn layout_can_layout_a_single_node() {
    let mut g = graph();
    g.set_node("a", sized(50.0, 100.0));
    layout(&mut g);
    assert_eq!(coords(&g), [("a".to_string(), (25.0, 50.0))].into());
    assert_eq!(g.graph().width, 50.0);
    assert_eq!(g.graph().height, 100.0);
}

#[test]
fn layout_can_layout_two_nodes_on_the_same_rank() {
    let mut g = graph();
    g.graph_mut().nodesep = 200.0;
    g.set_node("a", sized(50.0, 100.0));
    g.set_node("b", sized(75.0, 200.0));
    layout(&mut g);
    assert_eq!(
        coords(&g),
        [
            ("a".to_string(), (25.0, 100.0)),
            ("b".to_string(), (287.5, 100.0)),
        ]
        .into()
    );
}

#[test]
fn layout_can_layout_two_nodes_connected_by_an_edge() {
    let mut g = graph();
    g.graph_mut().ranksep = 300.0;
    g.set_node("a", sized(50.0, 100.0));
    g.set_node("b", sized(75.0, 200.0));
    g.set_edge("a", "b");
    layout(&mut g);

    assert_eq!(
        coords(&g),
        [
            ("a".to_string(), (37.5, 50.0)),
            ("b".to_string(), (37.5, 500.0)),
        ]
        .into()
    );
    assert_eq!(
        g.edge("a", "b", None).unwrap().points,
        vec![Point { x: 37.5, y: 100.0 }, Point { x: 37.5, y: 400.0 }]
    );
    assert_eq!(g.graph().width, 75.0);
    assert_eq!(g.graph().height, 600.0);
}

#[test]
fn layout_honors_left_to_right_rank_direction() {
    let mut g = graph();
    g.graph_mut().rankdir = RankDir::LR;
    g.graph_mut().ranksep = 300.0;
    g.set_node("a", sized(50.0, 100.0));
    g.set_node("b", sized(75.0, 200.0));
    g.set_edge("a", "b");
    layout(&mut g);

    assert_eq!(
        coords(&g),
        [
            ("a".to_string(), (25.0, 100.0)),
            ("b".to_string(), (387.5, 100.0)),
        ]
        .into()
    );
    // Sizes are restored after the horizontal pass.
    assert_eq!(g.node("a").unwrap().width, 50.0);
    assert_eq!(g.node("b").unwrap().height, 200.0);
}

#[test]
fn layout_applies_margins() {
    let mut g = graph();
    g.graph_mut().marginx = 10.0;
    g.graph_mut().marginy = 20.0;
    g.set_node("a", sized(50.0, 100.0));
    layout(&mut g);
    assert_eq!(coords(&g), [("a".to_string(), (35.0, 70.0))].into());
    assert_eq!(g.graph().width, 70.0);
    assert_eq!(g.graph().height, 140.0);
}

#[test]
fn layout_keeps_cyclic_edges_in_their_original_direction() {
    let mut g = graph();
    g.set_node("a", sized(50.0, 50.0));
    g.set_node("b", sized(50.0, 50.0));
    g.set_edge("a", "b");
    g.set_edge("b", "a");
    layout(&mut g);

    assert!(g.has_edge("a", "b", None));
    assert!(g.has_edge("b", "a", None));
    assert_eq!(g.edge_count(), 2);

    let ay = g.node("a").unwrap().y.unwrap();
    let by = g.node("b").unwrap().y.unwrap();
    assert!(ay < by);

    let back = &g.edge("b", "a", None).unwrap().points;
    assert!(!g.edge("b", "a", None).unwrap().reversed);
    assert!(back.first().unwrap().y > back.last().unwrap().y);
}

#[test]
fn layout_routes_long_edges_through_intermediate_points() {
    let mut g = graph();
    for id in ["a", "b", "c"] {
        g.set_node(id, sized(40.0, 40.0));
    }
    g.set_path(&["a", "b", "c"]);
    g.set_edge("a", "c");
    layout(&mut g);

    assert_eq!(g.node_count(), 3);
    assert_eq!(g.edge_count(), 3);
    assert_eq!(g.edge("a", "c", None).unwrap().points.len(), 3);
    assert_eq!(g.edge("a", "b", None).unwrap().points.len(), 2);
    for id in g.nodes() {
        assert!(g.node(id).unwrap().dummy.is_none());
    }
}

#[test]
fn layout_keeps_nodes_on_a_rank_apart() {
    let mut g = graph();
    g.set_node("root", sized(40.0, 40.0));
    for id in ["x", "y", "z"] {
        g.set_node(id, sized(60.0, 40.0));
        g.set_edge("root", id);
    }
    layout(&mut g);

    let mut xs: Vec<f64> = ["x", "y", "z"]
        .iter()
        .map(|id| g.node(id).unwrap().x.unwrap())
        .collect();
    xs.sort_by(f64::total_cmp);
    for pair in xs.windows(2) {
        assert!(pair[1] - pair[0] >= 60.0 + 50.0 - 1e-9);
    }
}

#[test]
fn layout_is_deterministic() {
    let build = || {
        let mut g = graph();
        for (i, id) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            g.set_node(*id, sized(30.0 + i as f64 * 10.0, 20.0));
        }
        g.set_path(&["a", "b", "d"]);
        g.set_path(&["a", "c", "e"]);
        g.set_edge("b", "e");
        g.set_edge("c", "d");
        layout(&mut g);
        coords(&g)
    };
    assert_eq!(build(), build());
}
