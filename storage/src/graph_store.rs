use argonath_core::error::{ArgonathError, ErrorCode};
use argonath_core::model::{non_blank, Edge, EdgeStrength, GraphSnapshot, Node, Position};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("node {0} is already on the map")]
    DuplicateNode(String),
}

impl ArgonathError for StoreError {
    fn error_code(&self) -> ErrorCode {
        match self {
            StoreError::DuplicateNode(_) => ErrorCode::AlreadyExists,
        }
    }
}

/// Endpoints captured by a drag-to-connect gesture. Either side may still be
/// missing while the gesture is in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingConnection {
    pub source: Option<String>,
    pub target: Option<String>,
}

impl PendingConnection {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            target: Some(target.into()),
        }
    }

    pub fn endpoints(&self) -> Option<(&str, &str)> {
        match (&self.source, &self.target) {
            (Some(source), Some(target)) => Some((source.as_str(), target.as_str())),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_none() && self.target.is_none()
    }
}

/// Modal fields for a node edit. `Some("")` for `description` clears it; a
/// blank `label` is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePatch {
    pub label: Option<String>,
    pub description: Option<String>,
}

/// Only strength and description are editable; endpoints are fixed at creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgePatch {
    pub strength: Option<EdgeStrength>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeDraft {
    pub strength: EdgeStrength,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeletedNode {
    pub node: Node,
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceReport {
    pub duplicate_nodes: usize,
    pub dangling_edges: usize,
    pub duplicate_edges: usize,
}

/// Canonical in-memory graph of one editing session plus its transient
/// selection state.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    selected_node: Option<String>,
    selected_edge: Option<String>,
    pending_connection: PendingConnection,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: GraphSnapshot) -> Self {
        let mut store = Self::new();
        store.replace_all(snapshot);
        store
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::new(self.nodes.clone(), self.edges.clone())
    }

    pub fn insert_node(&mut self, node: Node) -> Result<(), StoreError> {
        if self.contains_node(&node.id) {
            return Err(StoreError::DuplicateNode(node.id));
        }
        debug!(node_id = %node.id, kind = ?node.kind, "insert node");
        self.nodes.push(node);
        Ok(())
    }

    /// Returns `false` when no node has `id`.
    pub fn update_node(&mut self, id: &str, patch: NodePatch) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|node| node.id == id) else {
            return false;
        };
        if let Some(label) = patch.label {
            let trimmed = label.trim();
            if !trimmed.is_empty() {
                node.label = trimmed.to_string();
            }
        }
        if let Some(description) = patch.description {
            node.description = non_blank(Some(description));
        }
        true
    }

    pub fn move_node(&mut self, id: &str, position: Position) -> bool {
        match self.nodes.iter_mut().find(|node| node.id == id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    /// Removes the node and every edge touching it.
    pub fn delete_node(&mut self, id: &str) -> Option<DeletedNode> {
        let index = self.nodes.iter().position(|node| node.id == id)?;
        let node = self.nodes.remove(index);

        let (removed, kept): (Vec<Edge>, Vec<Edge>) = std::mem::take(&mut self.edges)
            .into_iter()
            .partition(|edge| edge.touches(id));
        self.edges = kept;

        if self.selected_node.as_deref() == Some(id) {
            self.selected_node = None;
        }
        if let Some(selected) = self.selected_edge.as_deref() {
            if removed.iter().any(|edge| edge.id == selected) {
                self.selected_edge = None;
            }
        }
        if self.pending_connection.source.as_deref() == Some(id)
            || self.pending_connection.target.as_deref() == Some(id)
        {
            self.pending_connection = PendingConnection::default();
        }

        debug!(node_id = %id, cascaded_edges = removed.len(), "delete node");
        Some(DeletedNode {
            node,
            edges: removed,
        })
    }

    pub fn pending_connection(&self) -> &PendingConnection {
        &self.pending_connection
    }

    pub fn set_pending_connection(&mut self, pending: PendingConnection) {
        self.pending_connection = pending;
    }

    pub fn clear_pending_connection(&mut self) {
        self.pending_connection = PendingConnection::default();
    }

    /// Builds an edge from the pending connection. Skipped, leaving the store
    /// untouched, unless both endpoints are set and exist.
    pub fn insert_edge(&mut self, draft: EdgeDraft) -> Option<String> {
        let Some((source, target)) = self.pending_connection.endpoints() else {
            debug!("insert edge skipped: incomplete pending connection");
            return None;
        };
        if !self.contains_node(source) || !self.contains_node(target) {
            warn!(%source, %target, "insert edge skipped: endpoint not on the map");
            return None;
        }

        let mut edge = Edge::new(source, target, draft.strength, draft.description);
        if self.edge(&edge.id).is_some() {
            let base = edge.id.clone();
            let mut suffix = 1;
            while self.edge(&edge.id).is_some() {
                edge.id = format!("{base}-{suffix}");
                suffix += 1;
            }
        }

        let id = edge.id.clone();
        debug!(edge_id = %id, strength = %edge.strength, "insert edge");
        self.edges.push(edge);
        self.pending_connection = PendingConnection::default();
        Some(id)
    }

    pub fn update_edge(&mut self, id: &str, patch: EdgePatch) -> bool {
        let Some(edge) = self.edges.iter_mut().find(|edge| edge.id == id) else {
            return false;
        };
        if let Some(strength) = patch.strength {
            edge.strength = strength;
        }
        if let Some(description) = patch.description {
            edge.description = non_blank(Some(description));
        }
        true
    }

    pub fn delete_edge(&mut self, id: &str) -> Option<Edge> {
        let index = self.edges.iter().position(|edge| edge.id == id)?;
        if self.selected_edge.as_deref() == Some(id) {
            self.selected_edge = None;
        }
        Some(self.edges.remove(index))
    }

    /// Swaps in a loaded or imported graph wholesale.
    ///
    /// Repeated node and edge ids keep their first occurrence and edges
    /// pointing at missing nodes are dropped, so hand-edited payloads still
    /// yield a consistent graph.
    pub fn replace_all(&mut self, snapshot: GraphSnapshot) -> ReplaceReport {
        let mut report = ReplaceReport::default();
        let mut seen = HashSet::new();
        let mut nodes = Vec::with_capacity(snapshot.nodes.len());
        for node in snapshot.nodes {
            if seen.insert(node.id.clone()) {
                nodes.push(node);
            } else {
                report.duplicate_nodes += 1;
            }
        }

        let mut seen_edges = HashSet::new();
        let mut edges: Vec<Edge> = Vec::with_capacity(snapshot.edges.len());
        for edge in snapshot.edges {
            if !(seen.contains(&edge.source) && seen.contains(&edge.target)) {
                report.dangling_edges += 1;
            } else if !seen_edges.insert(edge.id.clone()) {
                report.duplicate_edges += 1;
            } else {
                edges.push(edge);
            }
        }

        if report != ReplaceReport::default() {
            warn!(
                duplicate_nodes = report.duplicate_nodes,
                dangling_edges = report.dangling_edges,
                duplicate_edges = report.duplicate_edges,
                "replaced graph contained inconsistent entries"
            );
        }

        self.nodes = nodes;
        self.edges = edges;
        self.selected_node = None;
        self.selected_edge = None;
        self.pending_connection = PendingConnection::default();
        report
    }

    pub fn selected_node(&self) -> Option<&str> {
        self.selected_node.as_deref()
    }

    pub fn selected_edge(&self) -> Option<&str> {
        self.selected_edge.as_deref()
    }

    pub fn select_node(&mut self, id: &str) -> bool {
        if !self.contains_node(id) {
            return false;
        }
        self.selected_node = Some(id.to_string());
        self.selected_edge = None;
        true
    }

    pub fn select_edge(&mut self, id: &str) -> bool {
        if self.edge(id).is_none() {
            return false;
        }
        self.selected_edge = Some(id.to_string());
        self.selected_node = None;
        true
    }

    pub fn clear_selected_edge(&mut self) {
        self.selected_edge = None;
    }

    pub fn clear_selection(&mut self) {
        self.selected_node = None;
        self.selected_edge = None;
    }
}
