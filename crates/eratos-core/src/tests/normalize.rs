use crate::model::*;
use crate::normalize::*;
use serde_json::json;

fn messy() -> Document {
    Document::from_json_value(json!({
        "@id": "d",
        "events": [
            {
                "@id": "a", "name": "A",
                "children": [{"child": "b", "importance": 0.12345}, {"child": "ghost"}, {"child": "a"}],
                "participants": [
                    {"@id": "p1", "roleName": "A0", "entity": "x"},
                    {"@id": "p2", "roleName": "A0", "entity": "x"},
                    {"@id": "p3", "roleName": "A1", "entity": "gone"},
                    {"@id": "p4", "roleName": "A1", "entity": "b"}
                ],
                "provenance": ["prov1"],
                "importance": 2.00049
            },
            {"@id": "b", "name": "B", "children": [], "children_gate": "or"},
            {"@id": "c", "name": "C", "children": [{"child": "ghost"}], "children_gate": "xor"},
            {"@id": "r", "name": "Ref", "wd_node": "cmu:Schema/Other"}
        ],
        "entities": [{"@id": "x", "name": "X"}],
        "relations": [
            {"@id": "r1", "relationSubject": "a", "relationObject": ["b", "x"]},
            {"@id": "r2", "relationSubject": "a", "relationObject": ["b", "nope"]},
            {"@id": "r3", "relationSubject": "nope", "relationObject": "b"}
        ],
        "provenanceData": [
            {"provenanceID": "prov1", "mediaType": "text/plain", "offset": 0, "length": 1},
            {"provenanceID": "prov2", "mediaType": "text/plain", "offset": 0, "length": 1}
        ]
    }))
    .unwrap()
}

#[test]
fn normalize_repairs_every_invariant() {
    let doc = messy();
    assert!(!validate(&doc).is_empty());

    let out = normalize(&doc);
    assert_eq!(validate(&out), vec![]);

    let a = out.event("a").unwrap();
    assert_eq!(a.children.len(), 1);
    assert_eq!(a.children[0].child, "b");
    assert_eq!(a.children[0].importance, Some(0.123));
    assert_eq!(a.importance, Some(2.0));
    assert_eq!(a.gate, Some(Gate::And));
    let pids: Vec<&str> = a.participants.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(pids, vec!["p1", "p4"]);

    assert_eq!(out.event("b").unwrap().gate, None);
    let c = out.event("c").unwrap();
    assert!(c.children.is_empty());
    assert_eq!(c.gate, None);

    let relations: Vec<&str> = out.relations.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(relations, vec!["r1"]);
    let provenance: Vec<&str> = out.provenance_data.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(provenance, vec!["prov1"]);

    assert_eq!(out.event("r").unwrap().wd_label.as_deref(), Some("Other"));
}

#[test]
fn normalize_is_idempotent() {
    let once = normalize(&messy());
    let twice = normalize(&once);
    assert_eq!(once, twice);
}

#[test]
fn normalize_does_not_touch_a_clean_document() {
    let clean = normalize(&messy());
    let mut again = clean.clone();
    normalize_in_place(&mut again);
    assert_eq!(again, clean);
}

#[test]
fn prediction_provenance_keeps_data_alive() {
    let doc = Document::from_json_value(json!({
        "@id": "d",
        "events": [{"@id": "e", "predictionProvenance": "p"}],
        "provenanceData": [{"provenanceID": "p", "mediaType": "text/plain"}]
    }))
    .unwrap();
    assert_eq!(normalize(&doc).provenance_data.len(), 1);
}

#[test]
fn round_importance_keeps_three_decimals() {
    assert_eq!(round_importance(0.1236), 0.124);
    assert_eq!(round_importance(1.0), 1.0);
    assert_eq!(round_importance(round_importance(0.3333333)), 0.333);
}

#[test]
fn round_importance_leaves_huge_values_alone() {
    assert_eq!(round_importance(1e306), 1e306);
    assert_eq!(round_importance(-f64::MAX), -f64::MAX);
}

#[test]
fn duplicate_ids_get_suffixes_and_references_follow() {
    let doc = Document::from_json_value(json!({
        "@id": "d",
        "events": [
            {"@id": "A", "name": "first", "children": [{"child": "B"}], "children_gate": "and"},
            {"@id": "A", "name": "second"},
            {"@id": "A", "name": "third"},
            {"@id": "B", "name": "b", "participants": [
                {"@id": "p", "roleName": "A0", "entity": "x"},
                {"@id": "p", "roleName": "A1", "entity": "x"}
            ]},
            {"@id": "P", "name": "p", "children": [{"child": "A"}], "children_gate": "and"}
        ],
        "entities": [{"@id": "x", "name": "x"}],
        "relations": [{"@id": "r", "relationSubject": "A", "relationObject": "B"}]
    }))
    .unwrap();
    assert_eq!(
        validate(&doc),
        vec![
            InvariantViolation::DuplicateId { id: "A".to_string() },
            InvariantViolation::DuplicateId { id: "A".to_string() },
            InvariantViolation::DuplicateId { id: "p".to_string() },
        ]
    );

    let out = normalize(&doc);
    assert_eq!(validate(&out), vec![]);
    let ids: Vec<&str> = out.events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["A", "A_1", "A_2", "B", "P"]);
    assert_eq!(out.event("A").unwrap().name, "first");
    assert_eq!(out.event("A_1").unwrap().name, "second");
    let b = out.event("B").unwrap();
    let pids: Vec<&str> = b.participants.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(pids, ["p", "p_1"]);

    assert_eq!(out.event("P").unwrap().children[0].child, "A_1");
    assert_eq!(out.relations[0].subject, "A_1");
    assert_eq!(out.event("A").unwrap().children[0].child, "B");
    assert_eq!(normalize(&out), out);
}

#[test]
fn suffixes_skip_ids_already_taken() {
    let doc = Document::from_json_value(json!({
        "@id": "d",
        "events": [{"@id": "A", "name": "a"}, {"@id": "A", "name": "b"}],
        "entities": [{"@id": "A_1", "name": "c"}]
    }))
    .unwrap();
    let out = normalize(&doc);
    assert_eq!(out.events[1].id, "A_1");
    assert_eq!(out.entities[0].id, "A_1_1");
}

#[test]
fn validate_names_each_violation() {
    let doc = Document::from_json_value(json!({
        "@id": "d",
        "events": [
            {"@id": "a", "children": [{"child": "b"}]},
            {"@id": "b", "children_gate": "and"}
        ]
    }))
    .unwrap();
    assert_eq!(
        validate(&doc),
        vec![
            InvariantViolation::ChildrenWithoutGate {
                event: "a".to_string()
            },
            InvariantViolation::GateWithoutChildren {
                event: "b".to_string()
            },
        ]
    );
}
