use eratos_core::config::{Dimensions, Position};
use eratos_core::{Catalog, Document, LayoutConfig, SummaryIndex};
use eratos_render::geom::size;
use eratos_render::layout::packing;
use eratos_render::{Category, LayoutEngine, NodeSizes, RegionKind, VisualGraph, project};
use rustc_hash::FxHashSet;
use serde_json::json;

fn config() -> LayoutConfig {
    LayoutConfig {
        region_padding: 10.0,
        grid_columns: 2,
        cell_gap: 5.0,
        viewport_width: 300.0,
        origin: Position { x: 0.0, y: 0.0 },
        default_node_size: Dimensions {
            width: 100.0,
            height: 50.0,
        },
        ..LayoutConfig::default()
    }
}

fn graph(value: serde_json::Value) -> VisualGraph {
    let d = Document::from_json_value(value).unwrap();
    project(&d, &Catalog::new(), &SummaryIndex::new())
}

fn mixed() -> VisualGraph {
    graph(json!({
        "@id": "d",
        "events": [
            {"@id": "S", "name": "s", "participants": [
                {"@id": "s0", "roleName": "A0", "entity": "Y"},
                {"@id": "s1", "roleName": "A1", "entity": "Y"}
            ]},
            {"@id": "G1", "name": "g1", "privateData": {"graphG": true}},
            {"@id": "G2", "name": "g2", "privateData": {"graphG": true}},
            {"@id": "G3", "name": "g3", "privateData": {"graphG": true}}
        ],
        "entities": [
            {"@id": "X", "name": "x"},
            {"@id": "Y", "name": "y"},
            {"@id": "W", "name": "w", "privateData": {"graphG": true}}
        ],
        "relations": [
            {"@id": "r", "relationSubject": "G1", "relationObject": "G2",
             "wd_node": "wd:Q79030196"}
        ]
    }))
}

fn no_hidden() -> FxHashSet<String> {
    FxHashSet::default()
}

#[test]
fn regions_are_placed_left_to_right_then_below() {
    let g = mixed();
    let mut engine = LayoutEngine::new(config());
    let out = engine.layout(&g, &no_hidden(), &NodeSizes::default());

    let at = |id: &str| {
        let n = out.node(id).unwrap();
        (n.x, n.y)
    };
    assert_eq!(at("S"), (10.0, 10.0));
    assert_eq!(at("G1"), (130.0, 10.0));
    assert_eq!(at("G2"), (235.0, 10.0));
    assert_eq!(at("G3"), (130.0, 65.0));
    assert_eq!(at("Y"), (10.0, 135.0));
    assert_eq!(at("X"), (115.0, 135.0));
    assert_eq!(at("W"), (235.0, 135.0));

    let region = |kind| {
        let r = out.region(kind).unwrap();
        (r.x, r.y, r.width, r.height)
    };
    assert_eq!(region(RegionKind::SchemaEvents), (0.0, 0.0, 120.0, 70.0));
    assert_eq!(region(RegionKind::InferredEvents), (120.0, 0.0, 225.0, 125.0));
    assert_eq!(region(RegionKind::SchemaEntities), (0.0, 125.0, 225.0, 70.0));
    assert_eq!(region(RegionKind::InferredEntities), (225.0, 125.0, 120.0, 70.0));
}

#[test]
fn empty_regions_have_zero_size_at_their_anchor() {
    let g = graph(json!({"@id": "d", "events": [{"@id": "S", "name": "s"}]}));
    let mut engine = LayoutEngine::new(config());
    let out = engine.layout(&g, &no_hidden(), &NodeSizes::default());

    let inferred = out.region(RegionKind::InferredEvents).unwrap();
    assert!(inferred.is_empty());
    assert_eq!((inferred.x, inferred.y), (120.0, 0.0));
    let entities = out.region(RegionKind::SchemaEntities).unwrap();
    assert!(entities.is_empty());
    assert_eq!((entities.x, entities.y), (0.0, 70.0));
    assert_eq!(out.regions.len(), 4);
}

#[test]
fn schema_events_flow_left_to_right_along_child_links() {
    let g = graph(json!({
        "@id": "d",
        "events": [
            {"@id": "root", "name": "r", "children_gate": "and", "children": [{"child": "kid"}]},
            {"@id": "kid", "name": "k"}
        ]
    }));
    let mut engine = LayoutEngine::new(config());
    let out = engine.layout(&g, &no_hidden(), &NodeSizes::default());
    let root = out.node("root").unwrap();
    let kid = out.node("kid").unwrap();
    assert!(kid.x >= root.x + root.width);
    assert!((kid.y - root.y).abs() < 1e-9);
    let region = out.region(RegionKind::SchemaEvents).unwrap();
    assert!(region.rect().contains_rect(&kid.rect()));
    assert!(region.rect().contains_rect(&root.rect()));
}

#[test]
fn unchanged_input_reuses_the_cached_pass() {
    let g = mixed();
    let mut engine = LayoutEngine::new(config());
    let first = engine.layout(&g, &no_hidden(), &NodeSizes::default());
    let second = engine.layout(&g, &no_hidden(), &NodeSizes::default());
    assert_eq!(first, second);
    assert_eq!(first.hash, second.hash);
    assert_eq!(engine.passes(), 1);

    let mut sizes = NodeSizes::default();
    sizes.insert("S".to_string(), size(140.0, 50.0));
    let third = engine.layout(&g, &no_hidden(), &sizes);
    assert_eq!(engine.passes(), 2);
    assert_ne!(third.hash, first.hash);
    assert_eq!(third.node("S").unwrap().width, 140.0);

    engine.invalidate();
    engine.layout(&g, &no_hidden(), &sizes);
    assert_eq!(engine.passes(), 3);
}

#[test]
fn new_node_with_identical_hash_still_gets_placed() {
    let before = graph(json!({"@id": "d", "events": [{"@id": "A", "name": "a"}]}));
    let after = graph(json!({"@id": "d", "events": [{"@id": "B", "name": "b"}]}));
    let mut engine = LayoutEngine::new(config());
    let first = engine.layout(&before, &no_hidden(), &NodeSizes::default());
    let second = engine.layout(&after, &no_hidden(), &NodeSizes::default());
    assert_eq!(first.hash, second.hash);
    assert_eq!(engine.passes(), 2);
    assert!(second.node("B").is_some());
    assert!(second.node("A").is_none());
}

#[test]
fn hidden_nodes_are_not_placed() {
    let g = mixed();
    let mut hidden = no_hidden();
    hidden.insert("G2".to_string());
    let mut engine = LayoutEngine::new(config());
    let out = engine.layout(&g, &hidden, &NodeSizes::default());
    assert!(out.node("G2").is_none());
    assert_eq!(out.nodes.len(), 6);
}

#[test]
fn drags_survive_recomputation() {
    let g = mixed();
    let mut engine = LayoutEngine::new(config());
    engine.layout(&g, &no_hidden(), &NodeSizes::default());
    engine.drag("X", 500.0, 600.0);

    let out = engine.layout(&g, &no_hidden(), &NodeSizes::default());
    let x = out.node("X").unwrap();
    assert_eq!((x.x, x.y, x.dragged), (500.0, 600.0, true));
    assert!(!out.node("Y").unwrap().dragged);

    let mut sizes = NodeSizes::default();
    sizes.insert("Y".to_string(), size(120.0, 80.0));
    let out = engine.layout(&g, &no_hidden(), &sizes);
    assert_eq!(engine.passes(), 2);
    let x = out.node("X").unwrap();
    assert_eq!((x.x, x.y, x.dragged), (500.0, 600.0, true));

    assert!(engine.release("X"));
    let out = engine.layout(&g, &no_hidden(), &sizes);
    assert!(!out.node("X").unwrap().dragged);
}

#[test]
fn schema_entities_sort_by_participant_count_and_wrap() {
    let g = graph(json!({
        "@id": "d",
        "events": [{"@id": "S", "name": "s", "participants": [
            {"@id": "p1", "roleName": "A0", "entity": "c"},
            {"@id": "p2", "roleName": "A1", "entity": "c"},
            {"@id": "p3", "roleName": "A2", "entity": "b"}
        ]}],
        "entities": [
            {"@id": "a", "name": "a"},
            {"@id": "b", "name": "b"},
            {"@id": "c", "name": "c"}
        ]
    }));
    let mut engine = LayoutEngine::new(config());
    let out = engine.layout(&g, &no_hidden(), &NodeSizes::default());
    let at = |id: &str| {
        let n = out.node(id).unwrap();
        (n.x, n.y)
    };
    assert_eq!(at("c"), (10.0, 80.0));
    assert_eq!(at("b"), (115.0, 80.0));
    assert_eq!(at("a"), (10.0, 135.0));
}

#[test]
fn inferred_entities_sort_by_status_priority() {
    let mut g = graph(json!({
        "@id": "d",
        "entities": [
            {"@id": "given", "name": "given", "privateData": {"graphG": true}},
            {"@id": "idle", "name": "idle", "privateData": {"graphG": true}},
            {"@id": "seen", "name": "seen", "privateData": {"graphG": true}},
            {"@id": "guessed", "name": "guessed", "privateData": {"graphG": true}}
        ]
    }));
    for node in &mut g.nodes {
        node.category = match node.id.as_str() {
            "idle" => Category::NotPredicted,
            "seen" => Category::Matched,
            "guessed" => Category::Predicted,
            _ => Category::Graphg,
        };
    }
    let mut engine = LayoutEngine::new(config());
    let out = engine.layout(&g, &no_hidden(), &NodeSizes::default());
    let at = |id: &str| {
        let n = out.node(id).unwrap();
        (n.x, n.y)
    };
    assert_eq!(at("seen"), (10.0, 10.0));
    assert_eq!(at("guessed"), (115.0, 10.0));
    assert_eq!(at("idle"), (10.0, 65.0));
    assert_eq!(at("given"), (115.0, 65.0));
}

#[test]
fn first_fit_fills_earlier_rows_before_growing() {
    let comps: Vec<Vec<String>> = [vec!["a", "b", "c"], vec!["d", "e"], vec!["f"]]
        .into_iter()
        .map(|c| c.into_iter().map(str::to_string).collect())
        .collect();
    let cells = packing::first_fit(&comps, 4);
    let placed: Vec<(&str, usize, usize)> =
        cells.iter().map(|(id, r, c)| (id.as_str(), *r, *c)).collect();
    assert_eq!(
        placed,
        [
            ("a", 0, 0),
            ("b", 0, 1),
            ("c", 0, 2),
            ("d", 1, 0),
            ("e", 1, 1),
            ("f", 0, 3),
        ]
    );

    let long = vec![(0..5).map(|i| i.to_string()).collect::<Vec<_>>()];
    let rows: Vec<usize> = packing::first_fit(&long, 2).iter().map(|c| c.1).collect();
    assert_eq!(rows, [0, 0, 1, 1, 2]);
}

#[test]
fn greedy_columns_stop_before_overflow() {
    assert_eq!(packing::greedy_columns([100.0, 100.0, 100.0], 5.0, 280.0), 2);
    assert_eq!(packing::greedy_columns([100.0, 100.0, 100.0], 5.0, 310.0), 3);
    assert_eq!(packing::greedy_columns([500.0], 5.0, 280.0), 1);
    assert_eq!(packing::greedy_columns(std::iter::empty(), 5.0, 280.0), 1);
}
