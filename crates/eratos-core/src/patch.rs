//! Structural differences between two document snapshots.
//!
//! A patch stores element-level edits keyed by id for each collection, the collection's id order
//! on both sides when it changed, and the header fields when any of them changed. Both sides are
//! kept so a patch inverts without looking at a document.

use crate::model::{Document, Entity, Event, Keyed, ProvenanceDatum, Relation};
use indexmap::IndexMap;
use rustc_hash::FxHashSet as HashSet;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct ElementEdit<T> {
    pub id: String,
    pub before: Option<T>,
    pub after: Option<T>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CollectionPatch<T> {
    Elements {
        edits: Vec<ElementEdit<T>>,
        /// Id order before and after, present only when it changed.
        order: Option<(Vec<String>, Vec<String>)>,
    },
    /// Used when ids are not unique within the collection, so per-id edits would be ambiguous.
    Replace { before: Vec<T>, after: Vec<T> },
}

impl<T> Default for CollectionPatch<T> {
    fn default() -> Self {
        Self::Elements {
            edits: Vec::new(),
            order: None,
        }
    }
}

fn has_unique_keys<T: Keyed>(items: &[T]) -> bool {
    let mut seen: HashSet<&str> = HashSet::default();
    items.iter().all(|i| seen.insert(i.key()))
}

fn ids_of<T: Keyed>(items: &[T]) -> Vec<String> {
    items.iter().map(|i| i.key().to_string()).collect()
}

impl<T: Keyed + Clone + PartialEq> CollectionPatch<T> {
    pub fn between(a: &[T], b: &[T]) -> Self {
        if a == b {
            return Self::default();
        }
        if !has_unique_keys(a) || !has_unique_keys(b) {
            return Self::Replace {
                before: a.to_vec(),
                after: b.to_vec(),
            };
        }

        let a_by_id: IndexMap<&str, &T> = a.iter().map(|i| (i.key(), i)).collect();
        let b_by_id: IndexMap<&str, &T> = b.iter().map(|i| (i.key(), i)).collect();

        let mut edits = Vec::new();
        for (id, before) in &a_by_id {
            match b_by_id.get(id) {
                Some(after) if after == before => {}
                after => edits.push(ElementEdit {
                    id: id.to_string(),
                    before: Some((*before).clone()),
                    after: after.map(|t| (*t).clone()),
                }),
            }
        }
        for (id, after) in &b_by_id {
            if !a_by_id.contains_key(id) {
                edits.push(ElementEdit {
                    id: id.to_string(),
                    before: None,
                    after: Some((*after).clone()),
                });
            }
        }

        let (a_ids, b_ids) = (ids_of(a), ids_of(b));
        let order = (a_ids != b_ids).then_some((a_ids, b_ids));
        Self::Elements { edits, order }
    }

    pub fn invert(&self) -> Self {
        match self {
            Self::Elements { edits, order } => Self::Elements {
                edits: edits
                    .iter()
                    .map(|e| ElementEdit {
                        id: e.id.clone(),
                        before: e.after.clone(),
                        after: e.before.clone(),
                    })
                    .collect(),
                order: order.as_ref().map(|(a, b)| (b.clone(), a.clone())),
            },
            Self::Replace { before, after } => Self::Replace {
                before: after.clone(),
                after: before.clone(),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Elements { edits, order } => edits.is_empty() && order.is_none(),
            Self::Replace { before, after } => before == after,
        }
    }

    pub fn apply(&self, items: &[T]) -> Vec<T> {
        let (edits, order) = match self {
            Self::Replace { after, .. } => return after.clone(),
            Self::Elements { edits, order } => (edits, order),
        };
        if edits.is_empty() && order.is_none() {
            return items.to_vec();
        }

        let mut by_id: IndexMap<String, T> = items
            .iter()
            .map(|i| (i.key().to_string(), i.clone()))
            .collect();
        for edit in edits {
            match &edit.after {
                Some(after) => {
                    if let Some(slot) = by_id.get_mut(&edit.id) {
                        *slot = after.clone();
                    } else {
                        by_id.insert(edit.id.clone(), after.clone());
                    }
                }
                None => {
                    by_id.shift_remove(&edit.id);
                }
            }
        }

        let Some((_, target)) = order else {
            return by_id.into_values().collect();
        };
        let mut out = Vec::with_capacity(by_id.len());
        for id in target {
            if let Some(item) = by_id.shift_remove(id) {
                out.push(item);
            }
        }
        // Items the order does not mention (the snapshot diverged) keep their relative order.
        out.extend(by_id.into_values());
        out
    }
}

/// Document fields outside the four collections.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub context: Option<Value>,
    pub sdf_version: Option<String>,
    pub id: String,
    pub version: Option<String>,
    pub private_data: Option<Map<String, Value>>,
    pub extra: Map<String, Value>,
}

impl Header {
    fn of(doc: &Document) -> Self {
        Self {
            context: doc.context.clone(),
            sdf_version: doc.sdf_version.clone(),
            id: doc.id.clone(),
            version: doc.version.clone(),
            private_data: doc.private_data.clone(),
            extra: doc.extra.clone(),
        }
    }

    fn write_to(&self, doc: &mut Document) {
        doc.context = self.context.clone();
        doc.sdf_version = self.sdf_version.clone();
        doc.id = self.id.clone();
        doc.version = self.version.clone();
        doc.private_data = self.private_data.clone();
        doc.extra = self.extra.clone();
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    pub header: Option<(Header, Header)>,
    pub events: CollectionPatch<Event>,
    pub entities: CollectionPatch<Entity>,
    pub relations: CollectionPatch<Relation>,
    pub provenance: CollectionPatch<ProvenanceDatum>,
}

impl Patch {
    /// The patch that turns `a` into `b`.
    pub fn between(a: &Document, b: &Document) -> Self {
        let (ha, hb) = (Header::of(a), Header::of(b));
        Self {
            header: (ha != hb).then_some((ha, hb)),
            events: CollectionPatch::between(&a.events, &b.events),
            entities: CollectionPatch::between(&a.entities, &b.entities),
            relations: CollectionPatch::between(&a.relations, &b.relations),
            provenance: CollectionPatch::between(&a.provenance_data, &b.provenance_data),
        }
    }

    pub fn invert(&self) -> Self {
        Self {
            header: self.header.as_ref().map(|(a, b)| (b.clone(), a.clone())),
            events: self.events.invert(),
            entities: self.entities.invert(),
            relations: self.relations.invert(),
            provenance: self.provenance.invert(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_none()
            && self.events.is_empty()
            && self.entities.is_empty()
            && self.relations.is_empty()
            && self.provenance.is_empty()
    }

    pub fn apply(&self, doc: &Document) -> Document {
        let mut out = doc.clone();
        if let Some((_, after)) = &self.header {
            after.write_to(&mut out);
        }
        out.events = self.events.apply(&doc.events);
        out.entities = self.entities.apply(&doc.entities);
        out.relations = self.relations.apply(&doc.relations);
        out.provenance_data = self.provenance.apply(&doc.provenance_data);
        out
    }
}

/// A forward patch with its inverse: one undoable edit.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchPair {
    pub forward: Patch,
    pub backward: Patch,
}

impl PatchPair {
    pub fn between(before: &Document, after: &Document) -> Self {
        let forward = Patch::between(before, after);
        let backward = forward.invert();
        Self { forward, backward }
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}
