//! Per-node UI state and the edge visibility rules.

use crate::model::{EdgeKind, Partition, VisualEdge, VisualGraph};
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiState {
    pub hovered: bool,
    pub expanded: bool,
    /// Hidden because an ancestor is collapsed.
    pub hidden: bool,
    pub collapsed: bool,
}

impl UiState {
    pub fn is_active(&self) -> bool {
        self.hovered || self.expanded
    }
}

/// UI state keyed by node id. Nodes without an entry use [`UiState::default`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiStates {
    states: HashMap<String, UiState>,
}

impl UiStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> UiState {
        self.states.get(id).copied().unwrap_or_default()
    }

    fn entry(&mut self, id: &str) -> &mut UiState {
        self.states.entry(id.to_string()).or_default()
    }

    pub fn set_hovered(&mut self, id: &str, hovered: bool) {
        self.entry(id).hovered = hovered;
    }

    pub fn set_expanded(&mut self, id: &str, expanded: bool) {
        self.entry(id).expanded = expanded;
    }

    pub fn is_hidden(&self, id: &str) -> bool {
        self.get(id).hidden
    }

    pub fn hidden_nodes(&self) -> HashSet<String> {
        self.states
            .iter()
            .filter(|(_, s)| s.hidden)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Drops state for nodes that are no longer in `graph`.
    pub fn retain_nodes(&mut self, graph: &VisualGraph) {
        let live: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        self.states.retain(|id, _| live.contains(id.as_str()));
    }

    /// Collapses or expands `id`, hiding or revealing its descendants over child links.
    ///
    /// Revealing stops below descendants that are collapsed themselves. A descendant already
    /// in the requested state is not descended into, which also terminates on cycles.
    pub fn set_collapsed(&mut self, graph: &VisualGraph, id: &str, collapsed: bool) {
        self.entry(id).collapsed = collapsed;
        let children = graph.children_index();
        let mut visited: HashSet<&str> = HashSet::default();
        visited.insert(id);
        let start: Vec<&str> = children.get(id).cloned().unwrap_or_default();
        for child in start {
            self.set_hidden(&children, child, collapsed, &mut visited);
        }
        tracing::trace!(node = id, collapsed, "toggled collapse");
    }

    /// Recomputes `hidden` against `graph` from the nodes currently marked collapsed.
    ///
    /// Used after the graph changes shape, so nodes added under a collapsed node are hidden
    /// and nodes moved out from under one are shown again.
    pub fn reapply_collapse(&mut self, graph: &VisualGraph) {
        let children = graph.children_index();
        for state in self.states.values_mut() {
            state.hidden = false;
        }
        let collapsed: Vec<String> = self
            .states
            .iter()
            .filter(|(_, s)| s.collapsed)
            .map(|(id, _)| id.clone())
            .collect();
        for root in &collapsed {
            let mut visited: HashSet<&str> = HashSet::default();
            visited.insert(root.as_str());
            let mut stack: Vec<&str> = children.get(root.as_str()).cloned().unwrap_or_default();
            while let Some(id) = stack.pop() {
                if !visited.insert(id) {
                    continue;
                }
                self.entry(id).hidden = true;
                if let Some(next) = children.get(id) {
                    stack.extend(next.iter().copied());
                }
            }
        }
    }

    fn set_hidden<'a>(
        &mut self,
        children: &HashMap<&'a str, Vec<&'a str>>,
        id: &'a str,
        hidden: bool,
        visited: &mut HashSet<&'a str>,
    ) {
        if !visited.insert(id) {
            return;
        }
        let state = self.entry(id);
        if state.hidden == hidden {
            return;
        }
        state.hidden = hidden;
        if !hidden && state.collapsed {
            return;
        }
        if let Some(next) = children.get(id) {
            for child in next {
                self.set_hidden(children, *child, hidden, visited);
            }
        }
    }
}

pub fn edge_visible(edge: &VisualEdge, graph: &VisualGraph, ui: &UiStates) -> bool {
    let source = ui.get(&edge.source);
    let target = ui.get(&edge.target);
    if source.hidden || target.hidden {
        return false;
    }
    match edge.kind() {
        EdgeKind::Before => true,
        EdgeKind::ParentChild => {
            let inferred_child = graph
                .node(&edge.target)
                .is_some_and(|n| n.partition == Partition::Inferred);
            !inferred_child || target.is_active()
        }
        EdgeKind::Participant | EdgeKind::Coreference => {
            source.is_active() || target.is_active()
        }
    }
}

/// Visibility of every edge, keyed by edge id.
pub fn resolve(graph: &VisualGraph, ui: &UiStates) -> BTreeMap<String, bool> {
    graph
        .edges
        .iter()
        .map(|e| (e.id.clone(), edge_visible(e, graph, ui)))
        .collect()
}
