//! SDF schema documents.
//!
//! Field names follow the SDF JSON-LD wire names. Lists accept either a bare value or an array
//! on input and are always written as arrays; empty lists are omitted on output.

mod provenance;
mod serde_helpers;

pub use provenance::{MediaSpan, ProvenanceDatum};

use crate::error::{Error, Result};
use rustc_hash::FxHashSet as HashSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_helpers::one_or_many;

/// Ontology value that marks a relation as temporal precedence ("before").
pub const BEFORE_WD_NODE: &str = "wd:Q79030196";

/// Prefix of `wd_node` values that point at another schema document.
pub const REFERENCE_PREFIX: &str = "cmu:";

/// Logical combinator over an event's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gate {
    #[default]
    And,
    Or,
    Xor,
}

impl Gate {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
        }
    }
}

impl std::fmt::Display for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    #[serde(rename = "sdfVersion", default, skip_serializing_if = "Option::is_none")]
    pub sdf_version: Option<String>,
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub events: Vec<Event>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub entities: Vec<Entity>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub relations: Vec<Relation>,
    #[serde(rename = "provenanceData", default, deserialize_with = "one_or_many")]
    pub provenance_data: Vec<ProvenanceDatum>,
    #[serde(rename = "privateData", default, skip_serializing_if = "Option::is_none")]
    pub private_data: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wd_node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wd_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wd_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "ta1explanation", default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Child>,
    #[serde(rename = "children_gate", default, skip_serializing_if = "Option::is_none")]
    pub gate: Option<Gate>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub participants: Vec<Participant>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub provenance: Vec<String>,
    #[serde(
        rename = "predictionProvenance",
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub prediction_provenance: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeatable: Option<bool>,
    #[serde(rename = "privateData", default, skip_serializing_if = "Option::is_none")]
    pub private_data: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub child: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeatable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "roleName")]
    pub role_name: String,
    /// Entity or event id.
    pub entity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wd_node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wd_label: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wd_node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wd_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wd_description: Option<String>,
    #[serde(rename = "privateData", default, skip_serializing_if = "Option::is_none")]
    pub private_data: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "relationSubject")]
    pub subject: String,
    #[serde(rename = "relationObject", deserialize_with = "one_or_many")]
    pub objects: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wd_node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wd_label: Option<String>,
    #[serde(rename = "privateData", default, skip_serializing_if = "Option::is_none")]
    pub private_data: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn private_flag(private_data: &Option<Map<String, Value>>, key: &str) -> bool {
    private_data
        .as_ref()
        .and_then(|m| m.get(key))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn set_private_flag(private_data: &mut Option<Map<String, Value>>, key: &str, value: bool) {
    private_data
        .get_or_insert_with(Map::new)
        .insert(key.to_string(), Value::Bool(value));
}

/// Common surface of the document's id-keyed collections.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Event {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Entity {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Relation {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for ProvenanceDatum {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Event {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Externally given (inferred partition).
    pub fn is_given(&self) -> bool {
        private_flag(&self.private_data, "graphG")
    }

    pub fn set_given(&mut self, given: bool) {
        set_private_flag(&mut self.private_data, "graphG", given);
    }

    /// The event stands for another schema document.
    pub fn is_reference(&self) -> bool {
        self.wd_node
            .as_deref()
            .is_some_and(|n| n.starts_with(REFERENCE_PREFIX))
    }

    pub fn has_child(&self, child: &str) -> bool {
        self.children.iter().any(|c| c.child == child)
    }

    /// Every provenance id this event cites, observed first.
    pub fn provenance_ids(&self) -> impl Iterator<Item = &str> {
        self.provenance
            .iter()
            .chain(&self.prediction_provenance)
            .map(String::as_str)
    }
}

impl Entity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is_given(&self) -> bool {
        private_flag(&self.private_data, "graphG")
    }

    pub fn set_given(&mut self, given: bool) {
        set_private_flag(&mut self.private_data, "graphG", given);
    }

    pub fn is_schema_arg(&self) -> bool {
        private_flag(&self.private_data, "isSchemaArg")
    }

    pub fn set_schema_arg(&mut self, value: bool) {
        set_private_flag(&mut self.private_data, "isSchemaArg", value);
    }
}

impl Relation {
    pub fn is_before(&self) -> bool {
        self.wd_node.as_deref() == Some(BEFORE_WD_NODE)
    }
}

impl Document {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            context: None,
            sdf_version: None,
            id: id.into(),
            version: None,
            events: Vec::new(),
            entities: Vec::new(),
            relations: Vec::new(),
            provenance_data: Vec::new(),
            private_data: None,
            extra: Map::new(),
        }
    }

    /// An empty schema named `name`, in the shape new schemas are created with.
    pub fn blank(name: &str) -> Self {
        let mut private = Map::new();
        private.insert("eratosthenes".to_string(), Value::Object(Map::new()));
        Self {
            version: Some("cmu-v0".to_string()),
            private_data: Some(private),
            ..Self::new(format!("{REFERENCE_PREFIX}Schema/{name}"))
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(malformed)
    }

    pub fn from_json_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(malformed)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        serde_json::from_reader(reader).map_err(malformed)
    }

    pub fn to_json_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(malformed)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(self).map_err(malformed)
    }

    pub fn to_json_string_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(malformed)
    }

    pub fn event(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn event_mut(&mut self, id: &str) -> Option<&mut Event> {
        self.events.iter_mut().find(|e| e.id == id)
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn entity_mut(&mut self, id: &str) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn relation(&self, id: &str) -> Option<&Relation> {
        self.relations.iter().find(|r| r.id == id)
    }

    pub fn has_event(&self, id: &str) -> bool {
        self.event(id).is_some()
    }

    /// True for any event or entity id.
    pub fn has_node(&self, id: &str) -> bool {
        self.has_event(id) || self.entity(id).is_some()
    }

    pub fn event_ids(&self) -> HashSet<&str> {
        self.events.iter().map(|e| e.id.as_str()).collect()
    }

    /// Event and entity ids.
    pub fn node_ids(&self) -> HashSet<&str> {
        self.events
            .iter()
            .map(|e| e.id.as_str())
            .chain(self.entities.iter().map(|e| e.id.as_str()))
            .collect()
    }

    /// Every id in use anywhere in the document, including participants.
    pub fn contains_id(&self, id: &str) -> bool {
        self.id == id
            || self.has_node(id)
            || self.relation(id).is_some()
            || self
                .events
                .iter()
                .any(|e| e.participants.iter().any(|p| p.id == id))
    }

    pub fn before_relations(&self) -> impl Iterator<Item = &Relation> {
        self.relations.iter().filter(|r| r.is_before())
    }
}

fn malformed(err: serde_json::Error) -> Error {
    Error::MalformedDocument {
        message: err.to_string(),
    }
}
