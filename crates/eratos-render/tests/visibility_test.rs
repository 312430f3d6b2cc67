use eratos_core::{Catalog, Document, SummaryIndex};
use eratos_render::{UiStates, VisualGraph, edge_visible, project, resolve};
use serde_json::json;

fn graph() -> VisualGraph {
    let d = Document::from_json_value(json!({
        "@id": "d",
        "events": [
            {"@id": "root", "name": "root", "children_gate": "and",
             "children": [{"child": "mid"}, {"child": "guess"}]},
            {"@id": "mid", "name": "mid", "children_gate": "and",
             "children": [{"child": "leaf"}], "provenance": ["p"],
             "participants": [{"@id": "pm", "roleName": "A0", "entity": "X"}]},
            {"@id": "leaf", "name": "leaf", "provenance": ["p"]},
            {"@id": "guess", "name": "guess", "privateData": {"graphG": true}}
        ],
        "entities": [{"@id": "X", "name": "x"}],
        "relations": [
            {"@id": "r", "relationSubject": "mid", "relationObject": "guess",
             "wd_node": "wd:Q79030196"}
        ]
    }))
    .unwrap();
    project(&d, &Catalog::new(), &SummaryIndex::new())
}

fn visible(g: &VisualGraph, ui: &UiStates, id: &str) -> bool {
    edge_visible(g.edge(id).unwrap(), g, ui)
}

#[test]
fn default_visibility() {
    let g = graph();
    let ui = UiStates::new();
    assert!(visible(&g, &ui, "parent-child:root->mid"));
    assert!(visible(&g, &ui, "parent-child:mid->leaf"));
    assert!(!visible(&g, &ui, "parent-child:root->guess"));
    assert!(visible(&g, &ui, "before:mid->guess"));
    assert!(!visible(&g, &ui, "participant:mid->X"));
    assert!(!visible(&g, &ui, "coreference:leaf->mid"));
}

#[test]
fn hover_and_expand_reveal_edges() {
    let g = graph();
    let mut ui = UiStates::new();

    ui.set_hovered("mid", true);
    assert!(visible(&g, &ui, "participant:mid->X"));
    assert!(visible(&g, &ui, "coreference:leaf->mid"));
    ui.set_hovered("mid", false);
    assert!(!visible(&g, &ui, "participant:mid->X"));

    ui.set_expanded("guess", true);
    assert!(visible(&g, &ui, "parent-child:root->guess"));

    ui.set_expanded("X", true);
    assert!(visible(&g, &ui, "participant:mid->X"));
}

#[test]
fn hovering_parent_leaves_inferred_child_edge_hidden() {
    let g = graph();
    let mut ui = UiStates::new();
    ui.set_hovered("root", true);
    assert!(!visible(&g, &ui, "parent-child:root->guess"));
    assert!(visible(&g, &ui, "parent-child:root->mid"));

    ui.set_hovered("guess", true);
    assert!(visible(&g, &ui, "parent-child:root->guess"));
}

#[test]
fn hidden_endpoint_hides_every_edge_kind() {
    let g = graph();
    let mut ui = UiStates::new();
    ui.set_hovered("mid", true);
    ui.set_collapsed(&g, "root", true);

    assert!(ui.is_hidden("mid"));
    assert!(ui.is_hidden("leaf"));
    assert!(ui.is_hidden("guess"));
    assert!(!ui.is_hidden("root"));
    let shown = resolve(&g, &ui);
    assert!(shown.values().all(|v| !v), "{shown:?}");

    ui.set_collapsed(&g, "root", false);
    assert!(ui.hidden_nodes().is_empty());
    assert!(visible(&g, &ui, "participant:mid->X"));
}

#[test]
fn expanding_keeps_collapsed_subtrees_hidden() {
    let g = graph();
    let mut ui = UiStates::new();
    ui.set_collapsed(&g, "mid", true);
    assert!(ui.is_hidden("leaf"));

    ui.set_collapsed(&g, "root", true);
    ui.set_collapsed(&g, "root", false);
    assert!(!ui.is_hidden("mid"));
    assert!(ui.is_hidden("leaf"));
}

#[test]
fn collapse_terminates_on_cycles_and_is_idempotent() {
    let d = Document::from_json_value(json!({
        "@id": "d",
        "events": [
            {"@id": "a", "name": "a", "children_gate": "and", "children": [{"child": "b"}]},
            {"@id": "b", "name": "b", "children_gate": "and", "children": [{"child": "c"}]},
            {"@id": "c", "name": "c", "children_gate": "and", "children": [{"child": "a"}]}
        ]
    }))
    .unwrap();
    let g = project(&d, &Catalog::new(), &SummaryIndex::new());
    let mut ui = UiStates::new();
    ui.set_collapsed(&g, "a", true);
    assert!(ui.is_hidden("b"));
    assert!(ui.is_hidden("c"));
    assert!(!ui.is_hidden("a"));

    let before = ui.clone();
    ui.set_collapsed(&g, "a", true);
    assert_eq!(ui, before);
}
