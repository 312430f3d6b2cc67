//! Structural edits.
//!
//! Every function takes a snapshot and returns a new, normalized one; the input is never
//! touched. Rejected edits return an error and produce nothing.

use crate::error::{Error, Result};
use crate::ids::{Category, IdGenerator};
use crate::model::{BEFORE_WD_NODE, Child, Document, Entity, Event, Gate, Participant, Relation};
use crate::normalize::{normalize_in_place, round_importance, validate};
use serde::{Deserialize, Serialize};

/// Free-text event fields editable through [`set_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextField {
    Description,
    Explanation,
}

fn finish(mut doc: Document, op: &'static str) -> Document {
    normalize_in_place(&mut doc);
    debug_assert!(validate(&doc).is_empty(), "{op} left invariant violations");
    tracing::debug!(op, document = %doc.id, "applied edit");
    doc
}

fn event_mut<'a>(doc: &'a mut Document, id: &str) -> Result<&'a mut Event> {
    doc.event_mut(id).ok_or_else(|| Error::invalid_reference(id))
}

fn entity_mut<'a>(doc: &'a mut Document, id: &str) -> Result<&'a mut Entity> {
    doc.entity_mut(id).ok_or_else(|| Error::invalid_reference(id))
}

fn require_event(doc: &Document, id: &str) -> Result<()> {
    if doc.has_event(id) {
        Ok(())
    } else {
        Err(Error::invalid_reference(id))
    }
}

fn require_node(doc: &Document, id: &str) -> Result<()> {
    if doc.has_node(id) {
        Ok(())
    } else {
        Err(Error::invalid_reference(id))
    }
}

pub fn add_event(
    doc: &Document,
    ids: &mut IdGenerator,
    name: &str,
    wd_node: Option<&str>,
) -> Result<(Document, String)> {
    let mut out = doc.clone();
    let id = ids.fresh_id(&doc.id, Category::Events, name, |id| doc.contains_id(id));
    let mut event = Event::new(id.clone(), name);
    event.wd_node = wd_node.map(str::to_string);
    out.events.push(event);
    Ok((finish(out, "add_event"), id))
}

/// Removes the event; links, participants and relations pointing at it go with it.
pub fn delete_event(doc: &Document, id: &str) -> Result<Document> {
    require_event(doc, id)?;
    let mut out = doc.clone();
    out.events.retain(|e| e.id != id);
    Ok(finish(out, "delete_event"))
}

pub fn add_entity(
    doc: &Document,
    ids: &mut IdGenerator,
    name: &str,
    wd_node: Option<&str>,
) -> Result<(Document, String)> {
    let mut out = doc.clone();
    let id = ids.fresh_id(&doc.id, Category::Entities, name, |id| doc.contains_id(id));
    let mut entity = Entity::new(id.clone(), name);
    entity.wd_node = wd_node.map(str::to_string);
    out.entities.push(entity);
    Ok((finish(out, "add_entity"), id))
}

pub fn delete_entity(doc: &Document, id: &str) -> Result<Document> {
    if doc.entity(id).is_none() {
        return Err(Error::invalid_reference(id));
    }
    let mut out = doc.clone();
    out.entities.retain(|e| e.id != id);
    Ok(finish(out, "delete_entity"))
}

/// Links `child` under `parent`. The first child sets the gate to `and`.
pub fn add_child(doc: &Document, parent: &str, child: &str) -> Result<Document> {
    require_event(doc, parent)?;
    require_event(doc, child)?;
    if parent == child {
        return Err(Error::invalid_edit(format!("{parent} cannot be its own child")));
    }
    let mut out = doc.clone();
    let event = event_mut(&mut out, parent)?;
    if event.has_child(child) {
        return Err(Error::invalid_edit(format!(
            "{child} is already a child of {parent}"
        )));
    }
    event.children.push(Child {
        child: child.to_string(),
        ..Default::default()
    });
    Ok(finish(out, "add_child"))
}

pub fn add_parent_child(doc: &Document, parent: &str, child: &str) -> Result<Document> {
    add_child(doc, parent, child)
}

pub fn remove_child(doc: &Document, parent: &str, child: &str) -> Result<Document> {
    require_event(doc, child)?;
    let mut out = doc.clone();
    let event = event_mut(&mut out, parent)?;
    if !event.has_child(child) {
        return Err(Error::invalid_edit(format!("{child} is not a child of {parent}")));
    }
    event.children.retain(|c| c.child != child);
    Ok(finish(out, "remove_child"))
}

pub fn add_participant(
    doc: &Document,
    ids: &mut IdGenerator,
    event: &str,
    role: &str,
    target: &str,
) -> Result<(Document, String)> {
    require_node(doc, target)?;
    if role.trim().is_empty() {
        return Err(Error::invalid_edit("participant role must not be empty"));
    }
    let id = ids.fresh_id(&doc.id, Category::Participants, role, |id| {
        doc.contains_id(id)
    });
    let mut out = doc.clone();
    let e = event_mut(&mut out, event)?;
    if e
        .participants
        .iter()
        .any(|p| p.role_name == role && p.entity == target)
    {
        return Err(Error::invalid_edit(format!(
            "{event} already has {target} as {role}"
        )));
    }
    e.participants.push(Participant {
        id: id.clone(),
        role_name: role.to_string(),
        entity: target.to_string(),
        ..Default::default()
    });
    Ok((finish(out, "add_participant"), id))
}

pub fn remove_participant(doc: &Document, event: &str, participant: &str) -> Result<Document> {
    let mut out = doc.clone();
    let e = event_mut(&mut out, event)?;
    let before = e.participants.len();
    e.participants.retain(|p| p.id != participant);
    if e.participants.len() == before {
        return Err(Error::invalid_reference(participant));
    }
    Ok(finish(out, "remove_participant"))
}

/// Records that `subject` happens before `object`.
pub fn add_before(
    doc: &Document,
    ids: &mut IdGenerator,
    subject: &str,
    object: &str,
) -> Result<(Document, String)> {
    require_node(doc, subject)?;
    require_node(doc, object)?;
    if subject == object {
        return Err(Error::invalid_edit(format!("{subject} cannot precede itself")));
    }
    if doc
        .before_relations()
        .any(|r| r.subject == subject && r.objects.iter().any(|o| o == object))
    {
        return Err(Error::invalid_edit(format!(
            "{subject} already precedes {object}"
        )));
    }
    let id = ids.fresh_id(&doc.id, Category::Relations, "before", |id| {
        doc.contains_id(id)
    });
    let mut out = doc.clone();
    out.relations.push(Relation {
        id: id.clone(),
        name: Some("before".to_string()),
        subject: subject.to_string(),
        objects: vec![object.to_string()],
        wd_node: Some(BEFORE_WD_NODE.to_string()),
        wd_label: Some("before".to_string()),
        ..Default::default()
    });
    Ok((finish(out, "add_before"), id))
}

pub fn remove_before(doc: &Document, relation: &str) -> Result<Document> {
    let Some(r) = doc.relation(relation) else {
        return Err(Error::invalid_reference(relation));
    };
    if !r.is_before() {
        return Err(Error::invalid_edit(format!(
            "{relation} is not a temporal precedence relation"
        )));
    }
    let mut out = doc.clone();
    out.relations.retain(|r| r.id != relation);
    Ok(finish(out, "remove_before"))
}

/// Renames an event or an entity.
pub fn rename(doc: &Document, id: &str, name: &str) -> Result<Document> {
    let mut out = doc.clone();
    if let Some(e) = out.event_mut(id) {
        e.name = name.to_string();
    } else {
        entity_mut(&mut out, id)?.name = name.to_string();
    }
    Ok(finish(out, "rename"))
}

/// Points an event or entity at another ontology type.
pub fn retype(doc: &Document, id: &str, wd_node: &str, label: Option<&str>) -> Result<Document> {
    let mut out = doc.clone();
    let wd_node = Some(wd_node.to_string());
    let label = label.map(str::to_string);
    if let Some(e) = out.event_mut(id) {
        e.wd_node = wd_node;
        e.wd_label = label;
        e.wd_description = None;
    } else {
        let e = entity_mut(&mut out, id)?;
        e.wd_node = wd_node;
        e.wd_label = label;
        e.wd_description = None;
    }
    Ok(finish(out, "retype"))
}

/// Sets a free-text field; an empty value clears it.
pub fn set_text(doc: &Document, id: &str, field: TextField, value: &str) -> Result<Document> {
    let mut out = doc.clone();
    let e = event_mut(&mut out, id)?;
    let value = (!value.is_empty()).then(|| value.to_string());
    match field {
        TextField::Description => e.description = value,
        TextField::Explanation => e.explanation = value,
    }
    Ok(finish(out, "set_text"))
}

pub fn set_importance(doc: &Document, parent: &str, child: &str, value: f64) -> Result<Document> {
    if !value.is_finite() {
        return Err(Error::invalid_edit(format!("importance must be finite, got {value}")));
    }
    let mut out = doc.clone();
    let e = event_mut(&mut out, parent)?;
    let Some(link) = e.children.iter_mut().find(|c| c.child == child) else {
        return Err(Error::invalid_reference(child));
    };
    link.importance = Some(round_importance(value));
    Ok(finish(out, "set_importance"))
}

pub fn set_gate(doc: &Document, event: &str, gate: Gate) -> Result<Document> {
    let mut out = doc.clone();
    let e = event_mut(&mut out, event)?;
    if e.children.is_empty() {
        return Err(Error::invalid_edit(format!(
            "{event} has no children to combine"
        )));
    }
    e.gate = Some(gate);
    Ok(finish(out, "set_gate"))
}

pub fn set_schema_arg(doc: &Document, entity: &str, value: bool) -> Result<Document> {
    let mut out = doc.clone();
    entity_mut(&mut out, entity)?.set_schema_arg(value);
    Ok(finish(out, "set_schema_arg"))
}
