//! Read-only lookup data supplied by storage: ontology primitives and document summaries.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimitiveArg {
    /// Role name as used by participants.
    pub name: String,
    #[serde(rename = "fullName", default)]
    pub full_name: String,
}

/// An ontology type: an event primitive or another schema usable as a sub-schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Primitive {
    pub wd_node: String,
    #[serde(default)]
    pub wd_label: String,
    #[serde(default)]
    pub wd_description: String,
    #[serde(default)]
    pub args: Vec<PrimitiveArg>,
    #[serde(rename = "isSubschema", default)]
    pub is_subschema: bool,
}

impl Primitive {
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.args.iter().map(|a| a.name.as_str())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogWire {
    Map(IndexMap<String, Primitive>),
    List(Vec<Primitive>),
    Empty,
}

/// Primitives keyed by `wd_node`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    primitives: IndexMap<String, Primitive>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts either a `{wd_node: primitive}` object or a list of primitives.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let wire: CatalogWire = serde_json::from_str(text).map_err(|e| Error::MalformedDocument {
            message: format!("primitive catalog: {e}"),
        })?;
        Ok(match wire {
            CatalogWire::Map(map) => map.into_values().collect(),
            CatalogWire::List(list) => list.into_iter().collect(),
            CatalogWire::Empty => Self::default(),
        })
    }

    pub fn insert(&mut self, primitive: Primitive) {
        self.primitives.insert(primitive.wd_node.clone(), primitive);
    }

    pub fn get(&self, wd_node: &str) -> Option<&Primitive> {
        self.primitives.get(wd_node)
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Primitive> {
        self.primitives.values()
    }
}

impl FromIterator<Primitive> for Catalog {
    fn from_iter<I: IntoIterator<Item = Primitive>>(iter: I) -> Self {
        let mut out = Self::default();
        for p in iter {
            out.insert(p);
        }
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

/// Known documents by id, used to resolve cross-schema references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SummaryIndex {
    documents: BTreeMap<String, DocumentSummary>,
}

impl SummaryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::MalformedDocument {
            message: format!("summary index: {e}"),
        })
    }

    pub fn insert<I, S>(&mut self, id: impl Into<String>, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.documents.insert(
            id.into(),
            DocumentSummary {
                tags: tags.into_iter().map(Into::into).collect(),
            },
        );
    }

    pub fn contains(&self, id: &str) -> bool {
        self.documents.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&DocumentSummary> {
        self.documents.get(id)
    }
}
