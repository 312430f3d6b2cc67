//! Document to visual graph projection.
//!
//! The projection is a pure function of its inputs: nodes follow document order (events, then
//! entities) and edges follow the order of the structures they come from.

use crate::model::{
    Category, EdgeData, NodeDetail, Partition, RoleSlot, SlotFiller, VisualEdge, VisualGraph,
    VisualNode, Warning,
};
use eratos_core::{Catalog, Document, Entity, Event, SummaryIndex};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use std::collections::BTreeMap;

/// Predictions at or below this confidence do not count as evidence.
pub const PREDICTION_THRESHOLD: f64 = 0.01;

pub fn project(doc: &Document, catalog: &Catalog, summaries: &SummaryIndex) -> VisualGraph {
    let mut event_status: HashMap<&str, Category> = HashMap::default();
    let mut nodes: Vec<VisualNode> = Vec::with_capacity(doc.events.len() + doc.entities.len());
    for event in &doc.events {
        let category = event_category(event);
        event_status.insert(event.id.as_str(), category);
        nodes.push(event_node(doc, event, category, catalog, summaries));
    }

    let entity_status = entity_categories(doc, &event_status);
    let duplicates = duplicate_entity_warnings(&doc.entities);
    for entity in &doc.entities {
        let category = entity_status
            .get(entity.id.as_str())
            .copied()
            .unwrap_or(Category::NotPredicted);
        let mut warnings: Vec<Warning> = Vec::new();
        if entity.wd_node.as_deref().is_none_or(str::is_empty) {
            warnings.push(Warning::UnknownType);
        }
        if let Some(extra) = duplicates.get(entity.id.as_str()) {
            warnings.extend(extra.iter().cloned());
        }
        nodes.push(VisualNode {
            id: entity.id.clone(),
            name: entity.name.clone(),
            type_label: entity.wd_label.clone(),
            category,
            partition: partition_of(entity.is_given()),
            warnings,
            detail: NodeDetail::Entity {
                is_schema_arg: entity.is_schema_arg(),
            },
        });
    }

    let edges = project_edges(doc);
    tracing::debug!(
        document = %doc.id,
        nodes = nodes.len(),
        edges = edges.len(),
        "projected document"
    );
    VisualGraph { nodes, edges }
}

fn partition_of(given: bool) -> Partition {
    if given {
        Partition::Inferred
    } else {
        Partition::Schema
    }
}

pub fn event_category(event: &Event) -> Category {
    if event.is_given() {
        Category::Graphg
    } else if !event.provenance.is_empty() {
        Category::Matched
    } else if !event.prediction_provenance.is_empty()
        && event.confidence.unwrap_or(0.0) > PREDICTION_THRESHOLD
    {
        Category::Predicted
    } else {
        Category::NotPredicted
    }
}

/// Best status among the events that reference each entity.
fn entity_categories<'a>(
    doc: &'a Document,
    event_status: &HashMap<&str, Category>,
) -> HashMap<&'a str, Category> {
    let mut out: HashMap<&str, Category> = HashMap::default();
    for entity in &doc.entities {
        let initial = if entity.is_given() {
            Category::Graphg
        } else {
            Category::NotPredicted
        };
        out.insert(entity.id.as_str(), initial);
    }
    for event in &doc.events {
        let status = event_status
            .get(event.id.as_str())
            .copied()
            .unwrap_or(Category::NotPredicted);
        if !matches!(status, Category::Matched | Category::Predicted) {
            continue;
        }
        for p in &event.participants {
            if let Some(current) = out.get_mut(p.entity.as_str()) {
                if *current != Category::Graphg && status < *current {
                    *current = status;
                }
            }
        }
    }
    out
}

fn event_node(
    doc: &Document,
    event: &Event,
    category: Category,
    catalog: &Catalog,
    summaries: &SummaryIndex,
) -> VisualNode {
    let is_reference = event.is_reference();
    let primitive = event.wd_node.as_deref().and_then(|t| catalog.get(t));
    let mut warnings: Vec<Warning> = Vec::new();

    match event.wd_node.as_deref() {
        None | Some("") => warnings.push(Warning::UnknownType),
        Some(target) if is_reference => {
            if target == doc.id {
                warnings.push(Warning::SelfReference);
            } else if !summaries.contains(target) {
                warnings.push(Warning::MissingReference {
                    target: target.to_string(),
                });
            }
        }
        Some(_) => {
            if primitive.is_none() && !catalog.is_empty() {
                warnings.push(Warning::UnknownType);
            }
        }
    }
    if !is_reference {
        if event.description.as_deref().is_none_or(|s| s.trim().is_empty()) {
            warnings.push(Warning::MissingDescription);
        }
        if event.explanation.as_deref().is_none_or(|s| s.trim().is_empty()) {
            warnings.push(Warning::MissingExplanation);
        }
    }

    let declared: Vec<&str> = primitive.map(|p| p.roles().collect()).unwrap_or_default();
    if primitive.is_some() {
        let mut reported: HashSet<&str> = HashSet::default();
        for p in &event.participants {
            if !declared.contains(&p.role_name.as_str()) && reported.insert(p.role_name.as_str()) {
                warnings.push(Warning::UnknownRole {
                    role: p.role_name.clone(),
                });
            }
        }
    }

    VisualNode {
        id: event.id.clone(),
        name: event.name.clone(),
        type_label: event.wd_label.clone(),
        category,
        partition: partition_of(event.is_given()),
        warnings,
        detail: NodeDetail::Event {
            role_slots: role_slots(event, &declared),
            gate: event.gate,
            is_reference,
            importance: event.importance,
        },
    }
}

/// Participants grouped by role, sorted by role name, with unfilled declared roles included.
pub fn role_slots(event: &Event, declared: &[&str]) -> Vec<RoleSlot> {
    let mut slots: BTreeMap<&str, Vec<SlotFiller>> = BTreeMap::new();
    for role in declared.iter().copied() {
        slots.entry(role).or_default();
    }
    for p in &event.participants {
        slots.entry(p.role_name.as_str()).or_default().push(SlotFiller {
            participant: p.id.clone(),
            target: p.entity.clone(),
        });
    }
    slots
        .into_iter()
        .map(|(role, fillers)| RoleSlot {
            role: role.to_string(),
            declared: declared.contains(&role),
            fillers,
        })
        .collect()
}

fn duplicate_entity_warnings(entities: &[Entity]) -> HashMap<&str, Vec<Warning>> {
    let mut by_type: IndexMap<&str, Vec<&str>> = IndexMap::new();
    let mut by_name: IndexMap<&str, Vec<&str>> = IndexMap::new();
    for entity in entities.iter().filter(|e| !e.is_given()) {
        if let Some(t) = entity.wd_node.as_deref().filter(|t| !t.is_empty()) {
            by_type.entry(t).or_default().push(&entity.id);
        }
        let name = entity.name.trim();
        if !name.is_empty() {
            by_name.entry(name).or_default().push(&entity.id);
        }
    }

    let mut out: HashMap<&str, Vec<Warning>> = HashMap::default();
    for (wd_node, ids) in by_type.iter().filter(|(_, ids)| ids.len() > 1) {
        for id in ids {
            out.entry(*id)
                .or_default()
                .push(Warning::DuplicateEntityType {
                    wd_node: wd_node.to_string(),
                });
        }
    }
    for (name, ids) in by_name.iter().filter(|(_, ids)| ids.len() > 1) {
        for id in ids {
            out.entry(*id)
                .or_default()
                .push(Warning::DuplicateEntityName {
                    name: name.to_string(),
                });
        }
    }
    out
}

#[derive(Default)]
struct EdgeIds {
    seen: HashMap<String, usize>,
}

impl EdgeIds {
    /// `kind:source->target`, suffixed with `#n` for the n-th repeat.
    fn next(&mut self, kind: &str, source: &str, target: &str) -> String {
        let base = format!("{kind}:{source}->{target}");
        let n = self.seen.entry(base.clone()).or_insert(0);
        let id = if *n == 0 {
            base
        } else {
            format!("{base}#{n}")
        };
        *n += 1;
        id
    }
}

fn project_edges(doc: &Document) -> Vec<VisualEdge> {
    let mut ids = EdgeIds::default();
    let mut edges: Vec<VisualEdge> = Vec::new();

    for event in &doc.events {
        for child in &event.children {
            let data = EdgeData::ParentChild {
                importance: child.importance,
            };
            edges.push(VisualEdge::new(
                ids.next(data.kind().as_str(), &event.id, &child.child),
                event.id.clone(),
                child.child.clone(),
                data,
            ));
        }
    }

    for event in &doc.events {
        for p in &event.participants {
            let data = EdgeData::Participant {
                role: p.role_name.clone(),
                participant: p.id.clone(),
            };
            edges.push(VisualEdge::new(
                ids.next(data.kind().as_str(), &event.id, &p.entity),
                event.id.clone(),
                p.entity.clone(),
                data,
            ));
        }
    }

    for relation in doc.before_relations() {
        for object in &relation.objects {
            let data = EdgeData::Before {
                relation: relation.id.clone(),
            };
            edges.push(VisualEdge::new(
                ids.next(data.kind().as_str(), &relation.subject, object),
                relation.subject.clone(),
                object.clone(),
                data,
            ));
        }
    }

    edges.extend(coreference_edges(doc, &mut ids));
    edges
}

/// One edge per unordered pair of events sharing a provenance id.
///
/// Pairs are oriented `(min, max)` by id, and a pair sharing several provenance ids is emitted
/// for the first one only.
fn coreference_edges(doc: &Document, ids: &mut EdgeIds) -> Vec<VisualEdge> {
    let mut citing: IndexMap<&str, Vec<&str>> = IndexMap::new();
    for event in &doc.events {
        for prov in event.provenance_ids() {
            let events = citing.entry(prov).or_default();
            if !events.contains(&event.id.as_str()) {
                events.push(&event.id);
            }
        }
    }

    let mut seen: HashSet<(&str, &str)> = HashSet::default();
    let mut out: Vec<VisualEdge> = Vec::new();
    for (prov, events) in &citing {
        for (i, a) in events.iter().enumerate() {
            for b in &events[i + 1..] {
                let pair = if a <= b { (*a, *b) } else { (*b, *a) };
                if !seen.insert(pair) {
                    continue;
                }
                let data = EdgeData::Coreference {
                    provenance: prov.to_string(),
                };
                out.push(VisualEdge::new(
                    ids.next(data.kind().as_str(), pair.0, pair.1),
                    pair.0.to_string(),
                    pair.1.to_string(),
                    data,
                ));
            }
        }
    }
    out
}
