//! The single normalization pass applied on load and after every edit.
//!
//! One pass is enough: an edit never creates a chain of dangling references, and every step
//! below is idempotent on its own.

use crate::model::{Document, Gate};
use rustc_hash::FxHashSet as HashSet;

pub fn normalize(doc: &Document) -> Document {
    let mut out = doc.clone();
    normalize_in_place(&mut out);
    out
}

pub fn normalize_in_place(doc: &mut Document) {
    let renamed_ids = ensure_unique_ids(doc);
    let event_ids: HashSet<String> = doc.events.iter().map(|e| e.id.clone()).collect();
    let node_ids: HashSet<String> = event_ids
        .iter()
        .cloned()
        .chain(doc.entities.iter().map(|e| e.id.clone()))
        .collect();

    let mut dropped_links = 0usize;
    for event in &mut doc.events {
        let before = event.children.len() + event.participants.len();

        let self_id = event.id.as_str();
        event
            .children
            .retain(|c| c.child != self_id && event_ids.contains(&c.child));

        event.participants.retain(|p| node_ids.contains(&p.entity));
        let mut seen: HashSet<(String, String)> = HashSet::default();
        event
            .participants
            .retain(|p| seen.insert((p.role_name.clone(), p.entity.clone())));

        dropped_links += before - event.children.len() - event.participants.len();

        if event.children.is_empty() {
            event.gate = None;
        } else if event.gate.is_none() {
            event.gate = Some(Gate::And);
        }

        event.importance = event.importance.map(round_importance);
        for child in &mut event.children {
            child.importance = child.importance.map(round_importance);
        }

        if event.is_reference() && event.wd_label.is_none() {
            event.wd_label = event
                .wd_node
                .as_deref()
                .and_then(|n| n.rsplit('/').next())
                .map(str::to_string);
        }
    }

    let relations_before = doc.relations.len();
    doc.relations.retain(|r| {
        node_ids.contains(&r.subject) && r.objects.iter().all(|o| node_ids.contains(o))
    });

    let cited: HashSet<&str> = doc.events.iter().flat_map(|e| e.provenance_ids()).collect();
    let provenance_before = doc.provenance_data.len();
    doc.provenance_data.retain(|p| cited.contains(p.id.as_str()));

    let dropped_relations = relations_before - doc.relations.len();
    let dropped_provenance = provenance_before - doc.provenance_data.len();
    if renamed_ids + dropped_links + dropped_relations + dropped_provenance > 0 {
        tracing::debug!(
            document = %doc.id,
            renamed_ids,
            dropped_links,
            dropped_relations,
            dropped_provenance,
            "normalized document"
        );
    }
}

/// Rounds to three decimal places. Values too large to scale are returned as is.
pub fn round_importance(value: f64) -> f64 {
    let scaled = value * 1000.0;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / 1000.0
}

/// Gives every repeated `@id` a `_1`, `_2`, ... suffix, walking the document in order.
///
/// The first holder of an id keeps it. Each rename rewrites the child, participant and
/// relation references still carrying the old id. Returns the number of renames.
fn ensure_unique_ids(doc: &mut Document) -> usize {
    let mut seen: HashSet<String> = HashSet::default();
    seen.insert(doc.id.clone());
    let mut renames: Vec<(String, String)> = Vec::new();

    for event in &mut doc.events {
        claim_id(&mut seen, &mut event.id, &mut renames);
        for p in &mut event.participants {
            claim_id(&mut seen, &mut p.id, &mut renames);
        }
    }
    for entity in &mut doc.entities {
        claim_id(&mut seen, &mut entity.id, &mut renames);
    }
    for relation in &mut doc.relations {
        claim_id(&mut seen, &mut relation.id, &mut renames);
    }

    for (old, new) in &renames {
        tracing::warn!(from = %old, to = %new, "renamed duplicate id");
        retarget(doc, old, new);
    }
    renames.len()
}

fn claim_id(seen: &mut HashSet<String>, id: &mut String, renames: &mut Vec<(String, String)>) {
    let mut candidate = id.clone();
    let mut i = 1;
    while seen.contains(&candidate) {
        candidate = format!("{id}_{i}");
        i += 1;
    }
    if candidate != *id {
        let old = std::mem::replace(id, candidate.clone());
        renames.push((old, candidate.clone()));
    }
    seen.insert(candidate);
}

fn retarget(doc: &mut Document, old: &str, new: &str) {
    let swap = |s: &mut String| {
        if s.as_str() == old {
            *s = new.to_string();
        }
    };
    for event in &mut doc.events {
        event.children.iter_mut().for_each(|c| swap(&mut c.child));
        event.participants.iter_mut().for_each(|p| swap(&mut p.entity));
    }
    for relation in &mut doc.relations {
        swap(&mut relation.subject);
        relation.objects.iter_mut().for_each(swap);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    DanglingChild { event: String, child: String },
    DanglingParticipant { event: String, target: String },
    GateWithoutChildren { event: String },
    ChildrenWithoutGate { event: String },
    DuplicateParticipant { event: String, role: String, target: String },
    OrphanProvenance { id: String },
    DanglingRelation { relation: String },
    DuplicateId { id: String },
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DanglingChild { event, child } => {
                write!(f, "{event}: child {child} does not resolve")
            }
            Self::DanglingParticipant { event, target } => {
                write!(f, "{event}: participant target {target} does not resolve")
            }
            Self::GateWithoutChildren { event } => write!(f, "{event}: gate without children"),
            Self::ChildrenWithoutGate { event } => write!(f, "{event}: children without gate"),
            Self::DuplicateParticipant {
                event,
                role,
                target,
            } => write!(f, "{event}: duplicate participant ({role}, {target})"),
            Self::OrphanProvenance { id } => write!(f, "provenance {id} is not cited"),
            Self::DanglingRelation { relation } => {
                write!(f, "relation {relation} has an unresolved endpoint")
            }
            Self::DuplicateId { id } => write!(f, "id {id} is used more than once"),
        }
    }
}

/// Reports every document invariant `doc` violates; empty for a normalized document.
pub fn validate(doc: &Document) -> Vec<InvariantViolation> {
    let event_ids = doc.event_ids();
    let node_ids = doc.node_ids();
    let mut out = Vec::new();

    let mut ids: HashSet<&str> = HashSet::default();
    ids.insert(doc.id.as_str());
    let all_ids = doc
        .events
        .iter()
        .flat_map(|e| {
            std::iter::once(e.id.as_str()).chain(e.participants.iter().map(|p| p.id.as_str()))
        })
        .chain(doc.entities.iter().map(|e| e.id.as_str()))
        .chain(doc.relations.iter().map(|r| r.id.as_str()));
    for id in all_ids {
        if !ids.insert(id) {
            out.push(InvariantViolation::DuplicateId { id: id.to_string() });
        }
    }

    for event in &doc.events {
        for c in &event.children {
            if !event_ids.contains(c.child.as_str()) || c.child == event.id {
                out.push(InvariantViolation::DanglingChild {
                    event: event.id.clone(),
                    child: c.child.clone(),
                });
            }
        }
        match (event.children.is_empty(), event.gate.is_some()) {
            (true, true) => out.push(InvariantViolation::GateWithoutChildren {
                event: event.id.clone(),
            }),
            (false, false) => out.push(InvariantViolation::ChildrenWithoutGate {
                event: event.id.clone(),
            }),
            _ => {}
        }
        let mut seen: HashSet<(&str, &str)> = HashSet::default();
        for p in &event.participants {
            if !node_ids.contains(p.entity.as_str()) {
                out.push(InvariantViolation::DanglingParticipant {
                    event: event.id.clone(),
                    target: p.entity.clone(),
                });
            }
            if !seen.insert((p.role_name.as_str(), p.entity.as_str())) {
                out.push(InvariantViolation::DuplicateParticipant {
                    event: event.id.clone(),
                    role: p.role_name.clone(),
                    target: p.entity.clone(),
                });
            }
        }
    }

    let cited: HashSet<&str> = doc.events.iter().flat_map(|e| e.provenance_ids()).collect();
    for p in &doc.provenance_data {
        if !cited.contains(p.id.as_str()) {
            out.push(InvariantViolation::OrphanProvenance { id: p.id.clone() });
        }
    }

    for r in &doc.relations {
        let resolved = node_ids.contains(r.subject.as_str())
            && r.objects.iter().all(|o| node_ids.contains(o.as_str()));
        if !resolved {
            out.push(InvariantViolation::DanglingRelation {
                relation: r.id.clone(),
            });
        }
    }

    out
}
