//! The controller that owns the working copy.
//!
//! `Editor` holds the current snapshot, the edit state granted by the external lock owner, the
//! undo history and the observers that re-render on change. Edits run through the pure functions
//! in [`crate::mutate`]; the editor only decides whether they may run and records their patches.

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::history::History;
use crate::ids::IdGenerator;
use crate::model::{Document, Gate};
use crate::mutate::{self, TextField};
use crate::normalize::normalize_in_place;
use crate::patch::PatchPair;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Write access to the working copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditState {
    #[default]
    Readonly,
    AcquiringLock,
    Editable,
}

impl std::fmt::Display for EditState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Readonly => "readonly",
            Self::AcquiringLock => "acquiring-lock",
            Self::Editable => "editable",
        })
    }
}

/// One edit intent, as sent by the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    AddEvent {
        name: String,
        #[serde(default)]
        wd_node: Option<String>,
    },
    DeleteEvent {
        id: String,
    },
    AddEntity {
        name: String,
        #[serde(default)]
        wd_node: Option<String>,
    },
    DeleteEntity {
        id: String,
    },
    AddChild {
        parent: String,
        child: String,
    },
    RemoveChild {
        parent: String,
        child: String,
    },
    AddParticipant {
        event: String,
        role: String,
        target: String,
    },
    RemoveParticipant {
        event: String,
        participant: String,
    },
    AddBefore {
        subject: String,
        object: String,
    },
    RemoveBefore {
        relation: String,
    },
    Rename {
        id: String,
        name: String,
    },
    Retype {
        id: String,
        wd_node: String,
        #[serde(default)]
        label: Option<String>,
    },
    SetText {
        id: String,
        field: TextField,
        value: String,
    },
    SetImportance {
        parent: String,
        child: String,
        value: f64,
    },
    SetGate {
        event: String,
        gate: Gate,
    },
    SetSchemaArg {
        entity: String,
        value: bool,
    },
}

impl Command {
    /// Runs the edit against `doc`. Returns the new snapshot and the id of a created item.
    pub fn apply(&self, doc: &Document, ids: &mut IdGenerator) -> Result<(Document, Option<String>)> {
        let created = |(doc, id): (Document, String)| (doc, Some(id));
        let plain = |doc: Document| (doc, None);
        Ok(match self {
            Self::AddEvent { name, wd_node } => {
                created(mutate::add_event(doc, ids, name, wd_node.as_deref())?)
            }
            Self::DeleteEvent { id } => plain(mutate::delete_event(doc, id)?),
            Self::AddEntity { name, wd_node } => {
                created(mutate::add_entity(doc, ids, name, wd_node.as_deref())?)
            }
            Self::DeleteEntity { id } => plain(mutate::delete_entity(doc, id)?),
            Self::AddChild { parent, child } => plain(mutate::add_child(doc, parent, child)?),
            Self::RemoveChild { parent, child } => plain(mutate::remove_child(doc, parent, child)?),
            Self::AddParticipant {
                event,
                role,
                target,
            } => created(mutate::add_participant(doc, ids, event, role, target)?),
            Self::RemoveParticipant { event, participant } => {
                plain(mutate::remove_participant(doc, event, participant)?)
            }
            Self::AddBefore { subject, object } => {
                created(mutate::add_before(doc, ids, subject, object)?)
            }
            Self::RemoveBefore { relation } => plain(mutate::remove_before(doc, relation)?),
            Self::Rename { id, name } => plain(mutate::rename(doc, id, name)?),
            Self::Retype { id, wd_node, label } => {
                plain(mutate::retype(doc, id, wd_node, label.as_deref())?)
            }
            Self::SetText { id, field, value } => plain(mutate::set_text(doc, id, *field, value)?),
            Self::SetImportance {
                parent,
                child,
                value,
            } => plain(mutate::set_importance(doc, parent, child, *value)?),
            Self::SetGate { event, gate } => plain(mutate::set_gate(doc, event, *gate)?),
            Self::SetSchemaArg { entity, value } => {
                plain(mutate::set_schema_arg(doc, entity, *value)?)
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// A new working copy was installed.
    Loaded { revision: u64 },
    /// The working copy changed through an edit, undo or redo.
    Changed { revision: u64 },
    StateChanged { state: EditState },
}

type Observer = Box<dyn FnMut(&EditorEvent)>;

pub struct Editor {
    document: Arc<Document>,
    state: EditState,
    history: History,
    ids: IdGenerator,
    revision: u64,
    observers: Vec<Observer>,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("document", &self.document.id)
            .field("state", &self.state)
            .field("revision", &self.revision)
            .field("history", &self.history)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Editor {
    /// Installs `doc` (normalized) as the working copy, read-only.
    pub fn new(doc: Document) -> Self {
        Self::with_config(doc, &EngineConfig::default())
    }

    pub fn with_config(mut doc: Document, config: &EngineConfig) -> Self {
        normalize_in_place(&mut doc);
        Self {
            document: Arc::new(doc),
            state: EditState::Readonly,
            history: History::with_capacity_limit(config.history.capacity),
            ids: IdGenerator::new(),
            revision: 0,
            observers: Vec::new(),
        }
    }

    pub fn from_json_str(text: &str, config: &EngineConfig) -> Result<Self> {
        Ok(Self::with_config(Document::from_json_str(text)?, config))
    }

    pub fn with_id_generator(mut self, ids: IdGenerator) -> Self {
        self.ids = ids;
        self
    }

    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&EditorEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn notify(&mut self, event: EditorEvent) {
        for observer in &mut self.observers {
            observer(&event);
        }
    }

    fn set_state(&mut self, state: EditState) {
        if self.state == state {
            return;
        }
        tracing::debug!(from = %self.state, to = %state, "edit state changed");
        self.state = state;
        self.notify(EditorEvent::StateChanged { state });
    }

    fn require_editable(&self) -> Result<()> {
        if self.state == EditState::Editable {
            Ok(())
        } else {
            Err(Error::NotEditable { state: self.state })
        }
    }

    fn install(&mut self, doc: Document) {
        self.document = Arc::new(doc);
        self.revision += 1;
        let revision = self.revision;
        self.notify(EditorEvent::Changed { revision });
    }

    /// Parses, normalizes and installs a new working copy.
    ///
    /// On failure the current copy stays in place. A new copy starts read-only with an empty
    /// history, since the lock and the undo timeline belong to the previous document.
    pub fn load(&mut self, text: &str) -> Result<()> {
        let doc = Document::from_json_str(text).inspect_err(|err| {
            tracing::warn!(%err, "rejected document; keeping the current working copy");
        })?;
        self.load_document(doc);
        Ok(())
    }

    pub fn load_document(&mut self, mut doc: Document) {
        normalize_in_place(&mut doc);
        tracing::debug!(document = %doc.id, events = doc.events.len(), "loaded document");
        self.document = Arc::new(doc);
        self.history.clear();
        self.revision += 1;
        self.set_state(EditState::Readonly);
        let revision = self.revision;
        self.notify(EditorEvent::Loaded { revision });
    }

    pub fn begin_lock_acquire(&mut self) {
        if self.state == EditState::Readonly {
            self.set_state(EditState::AcquiringLock);
        }
    }

    pub fn lock_acquired(&mut self) {
        self.set_state(EditState::Editable);
    }

    /// The lease expired or was given up.
    pub fn lock_released(&mut self) {
        self.set_state(EditState::Readonly);
    }

    /// Applies one edit. Returns the id of the item it created, if any.
    pub fn apply(&mut self, command: Command) -> Result<Option<String>> {
        self.require_editable()?;
        let (doc, created) = command.apply(&self.document, &mut self.ids)?;
        let pair = PatchPair::between(&self.document, &doc);
        if pair.is_empty() {
            tracing::trace!(?command, "edit changed nothing");
            return Ok(created);
        }
        self.history.record(pair);
        self.install(doc);
        Ok(created)
    }

    pub fn undo(&mut self) -> Result<()> {
        self.require_editable()?;
        let doc = self.history.undo(&self.document).inspect_err(|err| {
            tracing::debug!(%err, "undo ignored");
        })?;
        self.install(doc);
        Ok(())
    }

    pub fn redo(&mut self) -> Result<()> {
        self.require_editable()?;
        let doc = self.history.redo(&self.document).inspect_err(|err| {
            tracing::debug!(%err, "redo ignored");
        })?;
        self.install(doc);
        Ok(())
    }
}
