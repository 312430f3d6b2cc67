use super::{Result, SessionError};
use eratos_core::{Catalog, Command, Editor, EngineConfig, SummaryIndex};
use eratos_render::geom::size;
use eratos_render::{LayoutEngine, NodeSizes, PositionedGraph, UiStates, VisualGraph};
use std::collections::BTreeMap;

/// Sequences edit, projection, visibility and layout for one working copy.
///
/// The visual graph is re-projected whenever the editor's revision moves. UI state and drag
/// positions are keyed by node id and survive re-projection for nodes that still exist.
#[derive(Debug)]
pub struct Session {
    editor: Editor,
    catalog: Catalog,
    summaries: SummaryIndex,
    ui: UiStates,
    engine: LayoutEngine,
    sizes: NodeSizes,
    graph: VisualGraph,
    projected: u64,
}

impl Session {
    pub fn new(editor: Editor, config: &EngineConfig) -> Self {
        let mut session = Self {
            editor,
            catalog: Catalog::new(),
            summaries: SummaryIndex::new(),
            ui: UiStates::new(),
            engine: LayoutEngine::new(config.layout.clone()),
            sizes: NodeSizes::default(),
            graph: VisualGraph::default(),
            projected: 0,
        };
        session.reproject();
        session
    }

    pub fn from_json_str(text: &str, config: &EngineConfig) -> Result<Self> {
        Ok(Self::new(Editor::from_json_str(text, config)?, config))
    }

    pub fn with_lookups(mut self, catalog: Catalog, summaries: SummaryIndex) -> Self {
        self.catalog = catalog;
        self.summaries = summaries;
        self.reproject();
        self
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn graph(&self) -> &VisualGraph {
        &self.graph
    }

    pub fn ui(&self) -> &UiStates {
        &self.ui
    }

    fn reproject(&mut self) {
        self.graph = eratos_render::project(self.editor.document(), &self.catalog, &self.summaries);
        self.ui.retain_nodes(&self.graph);
        self.ui.reapply_collapse(&self.graph);
        self.sizes
            .retain(|id, _| self.graph.nodes.iter().any(|n| &n.id == id));
        self.projected = self.editor.revision();
        tracing::trace!(revision = self.projected, "re-projected working copy");
    }

    fn sync(&mut self) {
        if self.projected != self.editor.revision() {
            self.reproject();
        }
    }

    pub fn load(&mut self, text: &str) -> Result<()> {
        self.editor.load(text)?;
        self.ui = UiStates::new();
        self.engine.invalidate();
        self.reproject();
        Ok(())
    }

    pub fn begin_lock_acquire(&mut self) {
        self.editor.begin_lock_acquire();
    }

    pub fn lock_acquired(&mut self) {
        self.editor.lock_acquired();
    }

    pub fn lock_released(&mut self) {
        self.editor.lock_released();
    }

    pub fn apply(&mut self, command: Command) -> Result<Option<String>> {
        let created = self.editor.apply(command)?;
        self.sync();
        Ok(created)
    }

    pub fn undo(&mut self) -> Result<()> {
        self.editor.undo()?;
        self.sync();
        Ok(())
    }

    pub fn redo(&mut self) -> Result<()> {
        self.editor.redo()?;
        self.sync();
        Ok(())
    }

    fn require_node(&self, id: &str) -> Result<()> {
        if self.graph.node(id).is_some() {
            Ok(())
        } else {
            Err(SessionError::Render(eratos_render::Error::UnknownNode {
                id: id.to_string(),
            }))
        }
    }

    pub fn hover(&mut self, id: &str, hovered: bool) -> Result<()> {
        self.require_node(id)?;
        self.ui.set_hovered(id, hovered);
        Ok(())
    }

    pub fn expand(&mut self, id: &str, expanded: bool) -> Result<()> {
        self.require_node(id)?;
        self.ui.set_expanded(id, expanded);
        Ok(())
    }

    pub fn collapse(&mut self, id: &str, collapsed: bool) -> Result<()> {
        self.require_node(id)?;
        self.ui.set_collapsed(&self.graph, id, collapsed);
        Ok(())
    }

    /// Current visibility of every edge, keyed by edge id.
    pub fn visibility(&self) -> BTreeMap<String, bool> {
        eratos_render::resolve(&self.graph, &self.ui)
    }

    /// Records the rendered size of a node; layout uses it from the next pass on.
    pub fn measure(&mut self, id: &str, width: f64, height: f64) -> Result<()> {
        self.require_node(id)?;
        if !(width.is_finite() && height.is_finite()) || width < 0.0 || height < 0.0 {
            return Err(SessionError::Render(eratos_render::Error::InvalidModel {
                message: format!("size of {id} must be finite and non-negative"),
            }));
        }
        self.sizes.insert(id.to_string(), size(width, height));
        Ok(())
    }

    pub fn drag(&mut self, id: &str, x: f64, y: f64) -> Result<()> {
        self.require_node(id)?;
        self.engine.drag(id, x, y);
        Ok(())
    }

    pub fn layout(&mut self) -> PositionedGraph {
        let hidden = self.ui.hidden_nodes();
        self.engine.layout(&self.graph, &hidden, &self.sizes)
    }

    pub fn layout_passes(&self) -> usize {
        self.engine.passes()
    }
}
