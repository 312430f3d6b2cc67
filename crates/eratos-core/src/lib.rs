#![forbid(unsafe_code)]

//! SDF schema graph model and editing core (headless).
//!
//! Design goals:
//! - every edit is a pure function from snapshot to snapshot
//! - the document invariants hold after load and after every edit
//! - every edit is undoable through structural patches, not full copies

pub mod catalog;
pub mod config;
pub mod editor;
pub mod error;
pub mod history;
pub mod ids;
pub mod model;
pub mod mutate;
pub mod normalize;
pub mod patch;

pub use catalog::{Catalog, DocumentSummary, Primitive, PrimitiveArg, SummaryIndex};
pub use config::{EngineConfig, HistoryConfig, LayoutConfig};
pub use editor::{Command, EditState, Editor, EditorEvent};
pub use error::{Error, Result};
pub use history::History;
pub use ids::IdGenerator;
pub use model::{
    BEFORE_WD_NODE, Child, Document, Entity, Event, Gate, MediaSpan, Participant, ProvenanceDatum,
    Relation,
};
pub use mutate::TextField;
pub use normalize::{InvariantViolation, normalize, normalize_in_place, validate};
pub use patch::{Patch, PatchPair};

#[cfg(test)]
mod tests;
