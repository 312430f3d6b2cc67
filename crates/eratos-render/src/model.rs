//! The visual graph handed to the rendering layer.

use eratos_core::Gate;
use rustc_hash::FxHashMap as HashMap;
use serde::{Deserialize, Serialize};

/// Evidence status of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Matched,
    Predicted,
    NotPredicted,
    Graphg,
}

impl Category {
    /// Sort key for inferred entities; lower sorts first.
    pub fn priority(self) -> u8 {
        match self {
            Self::Matched => 0,
            Self::Predicted => 1,
            Self::NotPredicted => 2,
            Self::Graphg => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::Predicted => "predicted",
            Self::NotPredicted => "not-predicted",
            Self::Graphg => "graphg",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Partition {
    /// Curated schema content.
    Schema,
    /// Externally given (predicted) content.
    Inferred,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "kebab-case")]
pub enum Warning {
    UnknownType,
    MissingDescription,
    MissingExplanation,
    UnknownRole { role: String },
    DuplicateEntityType { wd_node: String },
    DuplicateEntityName { name: String },
    MissingReference { target: String },
    SelfReference,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownType => f.write_str("type is not in the ontology"),
            Self::MissingDescription => f.write_str("description is empty"),
            Self::MissingExplanation => f.write_str("explanation is empty"),
            Self::UnknownRole { role } => write!(f, "role {role} is not declared by the type"),
            Self::DuplicateEntityType { wd_node } => {
                write!(f, "another entity has type {wd_node}")
            }
            Self::DuplicateEntityName { name } => write!(f, "another entity is named {name}"),
            Self::MissingReference { target } => write!(f, "referenced schema {target} not found"),
            Self::SelfReference => f.write_str("schema references itself"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotFiller {
    pub participant: String,
    pub target: String,
}

/// Participants of one role. Declared roles appear even when nothing fills them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleSlot {
    pub role: String,
    pub declared: bool,
    pub fillers: Vec<SlotFiller>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum NodeDetail {
    Event {
        role_slots: Vec<RoleSlot>,
        gate: Option<Gate>,
        is_reference: bool,
        importance: Option<f64>,
    },
    Entity {
        is_schema_arg: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualNode {
    pub id: String,
    pub name: String,
    pub type_label: Option<String>,
    pub category: Category,
    pub partition: Partition,
    pub warnings: Vec<Warning>,
    #[serde(flatten)]
    pub detail: NodeDetail,
}

impl VisualNode {
    pub fn is_event(&self) -> bool {
        matches!(self.detail, NodeDetail::Event { .. })
    }

    pub fn is_entity(&self) -> bool {
        matches!(self.detail, NodeDetail::Entity { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    ParentChild,
    Participant,
    Before,
    Coreference,
}

impl EdgeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ParentChild => "parent-child",
            Self::Participant => "participant",
            Self::Before => "before",
            Self::Coreference => "coreference",
        }
    }
}

/// Side of a node card an edge attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EdgeData {
    ParentChild { importance: Option<f64> },
    Participant { role: String, participant: String },
    Before { relation: String },
    Coreference { provenance: String },
}

impl EdgeData {
    pub fn kind(&self) -> EdgeKind {
        match self {
            Self::ParentChild { .. } => EdgeKind::ParentChild,
            Self::Participant { .. } => EdgeKind::Participant,
            Self::Before { .. } => EdgeKind::Before,
            Self::Coreference { .. } => EdgeKind::Coreference,
        }
    }

    fn handles(&self) -> (Option<Handle>, Option<Handle>) {
        match self.kind() {
            EdgeKind::ParentChild => (Some(Handle::Bottom), Some(Handle::Top)),
            EdgeKind::Participant | EdgeKind::Before => (Some(Handle::Right), Some(Handle::Left)),
            EdgeKind::Coreference => (None, None),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub source_handle: Option<Handle>,
    pub target_handle: Option<Handle>,
    #[serde(flatten)]
    pub data: EdgeData,
}

impl VisualEdge {
    pub fn new(id: String, source: String, target: String, data: EdgeData) -> Self {
        let (source_handle, target_handle) = data.handles();
        Self {
            id,
            source,
            target,
            source_handle,
            target_handle,
            data,
        }
    }

    pub fn kind(&self) -> EdgeKind {
        self.data.kind()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualGraph {
    pub nodes: Vec<VisualNode>,
    pub edges: Vec<VisualEdge>,
}

impl VisualGraph {
    pub fn node(&self, id: &str) -> Option<&VisualNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&VisualEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn edges_of_kind(&self, kind: EdgeKind) -> impl Iterator<Item = &VisualEdge> {
        self.edges.iter().filter(move |e| e.kind() == kind)
    }

    /// Parent-child adjacency, children in edge order.
    pub fn children_index(&self) -> HashMap<&str, Vec<&str>> {
        let mut out: HashMap<&str, Vec<&str>> = HashMap::default();
        for e in self.edges_of_kind(EdgeKind::ParentChild) {
            out.entry(e.source.as_str())
                .or_default()
                .push(e.target.as_str());
        }
        out
    }
}
