use eratos_graphlib::{EdgeKey, Graph, GraphOptions};

type G = Graph<(), (), ()>;

#[test]
fn graph_keeps_nodes_in_insertion_order() {
    let mut g = G::default();
    g.set_node("c", ());
    g.set_node("a", ());
    g.set_node("b", ());
    assert_eq!(g.nodes().collect::<Vec<_>>(), vec!["c", "a", "b"]);
}

#[test]
fn set_edge_creates_missing_endpoints() {
    let mut g = G::default();
    g.set_edge("a", "b");
    assert!(g.has_node("a"));
    assert!(g.has_node("b"));
    assert_eq!(g.edge_count(), 1);
    assert_eq!(g.successors("a"), vec!["b"]);
    assert_eq!(g.predecessors("b"), vec!["a"]);
    assert!(g.successors("b").is_empty());
}

#[test]
fn edge_labels_can_be_replaced() {
    let mut g: Graph<(), usize, ()> = Graph::default();
    g.set_edge_with_label("a", "b", 1);
    g.set_edge_with_label("a", "b", 7);
    assert_eq!(g.edge_count(), 1);
    assert_eq!(g.edge("a", "b", None), Some(&7));
}

#[test]
fn multigraph_distinguishes_named_edges() {
    let mut g: Graph<(), usize, ()> = Graph::new(GraphOptions {
        multigraph: true,
        directed: true,
    });
    g.set_edge_named("a", "b", Some("x"), Some(1));
    g.set_edge_named("a", "b", Some("y"), Some(2));
    assert_eq!(g.edge_count(), 2);
    assert_eq!(g.edge("a", "b", Some("y")), Some(&2));
    assert_eq!(g.successors("a"), vec!["b"]);
}

#[test]
fn undirected_edges_are_stored_once() {
    let mut g = G::new(GraphOptions::undirected());
    g.set_edge("b", "a");
    g.set_edge("a", "b");
    assert_eq!(g.edge_count(), 1);
    assert!(g.has_edge("b", "a", None));
    assert_eq!(g.edges().next(), Some(&EdgeKey::new("a", "b", None::<String>)));
    assert_eq!(g.successors("a"), vec!["b"]);
    assert_eq!(g.successors("b"), vec!["a"]);
}

#[test]
fn remove_node_drops_incident_edges() {
    let mut g = G::default();
    g.set_path(&["a", "b", "c"]);
    g.set_edge("a", "c");
    assert!(g.remove_node("b"));
    assert_eq!(g.node_count(), 2);
    assert_eq!(g.edge_count(), 1);
    assert_eq!(g.successors("a"), vec!["c"]);
    assert_eq!(g.predecessors("c"), vec!["a"]);
    assert!(!g.remove_node("b"));
}

#[test]
fn sources_and_sinks_follow_edges() {
    let mut g = G::default();
    g.set_path(&["a", "b", "c"]);
    g.set_node("lonely", ());
    assert_eq!(g.sources(), vec!["a", "lonely"]);
    assert_eq!(g.sinks(), vec!["c", "lonely"]);
}
