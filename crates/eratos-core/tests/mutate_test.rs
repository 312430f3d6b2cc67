use eratos_core::mutate::*;
use eratos_core::{Document, Error, Event, Gate, IdGenerator, TextField, validate};

fn base() -> Document {
    let mut doc = Document::new("d");
    doc.events.push(Event::new("A", "A"));
    doc.events.push(Event::new("B", "B"));
    doc
}

#[test]
fn add_parent_child_sets_and_gate_and_delete_event_prunes_it() {
    let doc = base();
    let doc = add_parent_child(&doc, "A", "B").unwrap();
    let a = doc.event("A").unwrap();
    assert_eq!(a.children.len(), 1);
    assert_eq!(a.children[0].child, "B");
    assert_eq!(a.gate, Some(Gate::And));

    let doc = delete_event(&doc, "B").unwrap();
    let a = doc.event("A").unwrap();
    assert!(a.children.is_empty());
    assert_eq!(a.gate, None);
}

#[test]
fn add_before_requires_both_endpoints() {
    let doc = base();
    let mut ids = IdGenerator::with_seed_keys(["k1", "k2"]);

    let (next, rel) = add_before(&doc, &mut ids, "A", "B").unwrap();
    assert_eq!(rel, "d/Relations/k1/before");
    let r = next.relation(&rel).unwrap();
    assert!(r.is_before());
    assert_eq!(r.subject, "A");
    assert_eq!(r.objects, vec!["B".to_string()]);

    let err = add_before(&doc, &mut ids, "A", "Missing").unwrap_err();
    assert_eq!(
        err,
        Error::InvalidReference {
            id: "Missing".to_string()
        }
    );
    assert_eq!(doc, base());
}

#[test]
fn add_before_rejects_duplicates_and_self_links() {
    let mut ids = IdGenerator::with_seed_keys(["k1"]);
    let (doc, _) = add_before(&base(), &mut ids, "A", "B").unwrap();
    assert!(matches!(
        add_before(&doc, &mut ids, "A", "B"),
        Err(Error::InvalidEdit { .. })
    ));
    assert!(matches!(
        add_before(&doc, &mut ids, "A", "A"),
        Err(Error::InvalidEdit { .. })
    ));
}

#[test]
fn remove_before_only_removes_precedence_relations() {
    let mut ids = IdGenerator::with_seed_keys(["k1"]);
    let (doc, rel) = add_before(&base(), &mut ids, "A", "B").unwrap();
    let doc = remove_before(&doc, &rel).unwrap();
    assert!(doc.relations.is_empty());
    assert!(matches!(
        remove_before(&doc, &rel),
        Err(Error::InvalidReference { .. })
    ));
}

#[test]
fn add_event_and_entity_generate_scoped_ids() {
    let mut ids = IdGenerator::with_seed_keys(["e1", "n1"]);
    let (doc, event) = add_event(&base(), &mut ids, "Bomb Attack", Some("wd:Q1")).unwrap();
    assert_eq!(event, "d/Events/e1/Bomb_Attack");
    assert_eq!(doc.event(&event).unwrap().wd_node.as_deref(), Some("wd:Q1"));

    let (doc, entity) = add_entity(&doc, &mut ids, "Bomber", None).unwrap();
    assert_eq!(entity, "d/Entities/n1/Bomber");
    assert_eq!(doc.entities.len(), 1);
}

#[test]
fn participants_are_unique_per_role_and_target() {
    let mut ids = IdGenerator::with_seed_keys(["x", "p1", "p2", "p3"]);
    let (doc, x) = add_entity(&base(), &mut ids, "X", None).unwrap();
    let (doc, p1) = add_participant(&doc, &mut ids, "A", "A0", &x).unwrap();
    assert_eq!(p1, "d/Participants/p1/A0");

    assert!(matches!(
        add_participant(&doc, &mut ids, "A", "A0", &x),
        Err(Error::InvalidEdit { .. })
    ));
    let (doc, _) = add_participant(&doc, &mut ids, "A", "A1", &x).unwrap();
    assert_eq!(doc.event("A").unwrap().participants.len(), 2);

    assert!(matches!(
        add_participant(&doc, &mut ids, "A", "A2", "nobody"),
        Err(Error::InvalidReference { .. })
    ));

    let doc = remove_participant(&doc, "A", &p1).unwrap();
    assert_eq!(doc.event("A").unwrap().participants.len(), 1);
}

#[test]
fn deleting_an_entity_drops_participants_and_relations() {
    let mut ids = IdGenerator::with_seed_keys(["x", "p", "r"]);
    let (doc, x) = add_entity(&base(), &mut ids, "X", None).unwrap();
    let (doc, _) = add_participant(&doc, &mut ids, "A", "A0", &x).unwrap();
    let (doc, _) = add_before(&doc, &mut ids, "A", &x).unwrap();

    let doc = delete_entity(&doc, &x).unwrap();
    assert!(doc.event("A").unwrap().participants.is_empty());
    assert!(doc.relations.is_empty());
    assert!(validate(&doc).is_empty());
}

#[test]
fn child_links_reject_duplicates_and_self_links() {
    let doc = add_child(&base(), "A", "B").unwrap();
    assert!(matches!(add_child(&doc, "A", "B"), Err(Error::InvalidEdit { .. })));
    assert!(matches!(add_child(&doc, "A", "A"), Err(Error::InvalidEdit { .. })));
    assert!(matches!(
        add_child(&doc, "A", "Z"),
        Err(Error::InvalidReference { .. })
    ));

    let doc = remove_child(&doc, "A", "B").unwrap();
    assert_eq!(doc.event("A").unwrap().gate, None);
    assert!(matches!(remove_child(&doc, "A", "B"), Err(Error::InvalidEdit { .. })));
}

#[test]
fn text_and_naming_edits() {
    let doc = rename(&base(), "A", "Alpha").unwrap();
    assert_eq!(doc.event("A").unwrap().name, "Alpha");

    let doc = retype(&doc, "A", "wd:Q42", Some("attack")).unwrap();
    let a = doc.event("A").unwrap();
    assert_eq!(a.wd_node.as_deref(), Some("wd:Q42"));
    assert_eq!(a.wd_label.as_deref(), Some("attack"));

    let doc = set_text(&doc, "A", TextField::Description, "something happens").unwrap();
    assert_eq!(
        doc.event("A").unwrap().description.as_deref(),
        Some("something happens")
    );
    let doc = set_text(&doc, "A", TextField::Explanation, "because").unwrap();
    let doc = set_text(&doc, "A", TextField::Description, "").unwrap();
    assert_eq!(doc.event("A").unwrap().description, None);
    assert_eq!(doc.event("A").unwrap().explanation.as_deref(), Some("because"));

    assert!(matches!(
        rename(&doc, "nope", "x"),
        Err(Error::InvalidReference { .. })
    ));
}

#[test]
fn importance_is_rounded_and_must_be_finite() {
    let doc = add_child(&base(), "A", "B").unwrap();
    let doc = set_importance(&doc, "A", "B", 0.45678).unwrap();
    assert_eq!(doc.event("A").unwrap().children[0].importance, Some(0.457));

    assert!(matches!(
        set_importance(&doc, "A", "B", f64::NAN),
        Err(Error::InvalidEdit { .. })
    ));
    assert!(matches!(
        set_importance(&doc, "B", "A", 1.0),
        Err(Error::InvalidReference { .. })
    ));
}

#[test]
fn gate_needs_children() {
    assert!(matches!(
        set_gate(&base(), "A", Gate::Or),
        Err(Error::InvalidEdit { .. })
    ));
    let doc = add_child(&base(), "A", "B").unwrap();
    let doc = set_gate(&doc, "A", Gate::Xor).unwrap();
    assert_eq!(doc.event("A").unwrap().gate, Some(Gate::Xor));
}

#[test]
fn schema_arg_marker_toggles() {
    let mut ids = IdGenerator::with_seed_keys(["x"]);
    let (doc, x) = add_entity(&base(), &mut ids, "X", None).unwrap();
    let doc = set_schema_arg(&doc, &x, true).unwrap();
    assert!(doc.entity(&x).unwrap().is_schema_arg());
    let doc = set_schema_arg(&doc, &x, false).unwrap();
    assert!(!doc.entity(&x).unwrap().is_schema_arg());
}

#[test]
fn invariants_hold_after_every_edit_in_many_sequences() {
    // Every rotation of a fixed edit script, so deletions land before and after the links that
    // depend on them.
    type Edit = fn(&Document, &mut IdGenerator) -> eratos_core::Result<Document>;
    let script: [Edit; 9] = [
        |d, _| add_child(d, "A", "B"),
        |d, _| add_child(d, "B", "C"),
        |d, ids| add_before(d, ids, "A", "C").map(|(d, _)| d),
        |d, ids| add_participant(d, ids, "C", "A0", "A").map(|(d, _)| d),
        |d, _| delete_event(d, "B"),
        |d, ids| add_event(d, ids, "B again", None).map(|(d, _)| d),
        |d, _| set_gate(d, "A", Gate::Or),
        |d, _| delete_event(d, "A"),
        |d, _| remove_child(d, "B", "C"),
    ];

    for start in 0..script.len() {
        let mut doc = base();
        doc.events.push(Event::new("C", "C"));
        let mut ids = IdGenerator::new();
        for step in 0..script.len() {
            let edit = script[(start + step) % script.len()];
            match edit(&doc, &mut ids) {
                Ok(next) => {
                    assert_eq!(validate(&next), vec![], "rotation {start}, step {step}");
                    doc = next;
                }
                Err(Error::InvalidReference { .. } | Error::InvalidEdit { .. }) => {}
                Err(other) => panic!("unexpected error {other:?}"),
            }
        }
    }
}
