use crate::error::EditorError;
use argonath_core::model::{Edge, EdgeStrength};
use storage::{EdgeDraft, EdgePatch, GraphStore, PendingConnection};
use tracing::{debug, info};

/// Values of the relationship modal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionForm {
    pub strength: EdgeStrength,
    pub description: String,
}

impl ConnectionForm {
    pub fn new(strength: EdgeStrength, description: impl Into<String>) -> Self {
        Self {
            strength,
            description: description.into(),
        }
    }

    fn from_edge(edge: &Edge) -> Self {
        Self {
            strength: edge.strength,
            description: edge.description.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Idle,
    PendingNew { form: ConnectionForm },
    PendingEdit { edge_id: String, form: ConnectionForm },
}

/// Drives the "new relationship" / "edit relationship" modal against the
/// graph store. One form at most is open at a time.
#[derive(Debug, Clone, Default)]
pub struct ConnectionFlow {
    state: ConnectionState,
}

impl ConnectionFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != ConnectionState::Idle
    }

    /// Opens an empty form for a freshly dragged connection.
    pub fn begin_new(
        &mut self,
        store: &mut GraphStore,
        source: &str,
        target: &str,
    ) -> Result<(), EditorError> {
        if source == target {
            return Err(EditorError::Validation(
                "a node cannot be connected to itself".to_string(),
            ));
        }
        for id in [source, target] {
            if !store.contains_node(id) {
                return Err(EditorError::UnknownNode(id.to_string()));
            }
        }

        store.set_pending_connection(PendingConnection::new(source, target));
        store.clear_selected_edge();
        self.state = ConnectionState::PendingNew {
            form: ConnectionForm::default(),
        };
        debug!(%source, %target, "connection form opened");
        Ok(())
    }

    /// Opens the form pre-filled from an existing edge. An unknown edge leaves
    /// the flow idle.
    pub fn begin_edit(
        &mut self,
        store: &mut GraphStore,
        edge_id: &str,
    ) -> Result<ConnectionForm, EditorError> {
        let form = store
            .edge(edge_id)
            .map(ConnectionForm::from_edge)
            .ok_or_else(|| EditorError::UnknownEdge(edge_id.to_string()))?;

        store.clear_pending_connection();
        store.select_edge(edge_id);
        self.state = ConnectionState::PendingEdit {
            edge_id: edge_id.to_string(),
            form: form.clone(),
        };
        Ok(form)
    }

    /// Commits the open form and returns the affected edge id. `Ok(None)`
    /// means the pending connection had gone stale and nothing was written.
    pub fn submit(
        &mut self,
        store: &mut GraphStore,
        form: ConnectionForm,
    ) -> Result<Option<String>, EditorError> {
        match std::mem::take(&mut self.state) {
            ConnectionState::Idle => Err(EditorError::NoActiveForm),
            ConnectionState::PendingNew { .. } => {
                let created = store.insert_edge(EdgeDraft {
                    strength: form.strength,
                    description: Some(form.description),
                });
                if let Some(id) = &created {
                    info!(edge_id = %id, strength = %form.strength, "relationship created");
                }
                store.clear_pending_connection();
                Ok(created)
            }
            ConnectionState::PendingEdit { edge_id, .. } => {
                let patch = EdgePatch {
                    strength: Some(form.strength),
                    description: Some(form.description),
                };
                store.clear_selected_edge();
                if !store.update_edge(&edge_id, patch) {
                    return Err(EditorError::UnknownEdge(edge_id));
                }
                info!(%edge_id, strength = %form.strength, "relationship updated");
                Ok(Some(edge_id))
            }
        }
    }

    /// Deletes the edge being edited. Only valid while editing.
    pub fn delete(&mut self, store: &mut GraphStore) -> Result<Edge, EditorError> {
        let ConnectionState::PendingEdit { edge_id, .. } = &self.state else {
            return Err(EditorError::NoActiveForm);
        };
        let edge_id = edge_id.clone();
        self.state = ConnectionState::Idle;
        let removed = store
            .delete_edge(&edge_id)
            .ok_or(EditorError::UnknownEdge(edge_id))?;
        info!(edge_id = %removed.id, "relationship deleted");
        Ok(removed)
    }

    pub fn cancel(&mut self, store: &mut GraphStore) {
        if let ConnectionState::PendingEdit { .. } = self.state {
            store.clear_selected_edge();
        }
        store.clear_pending_connection();
        self.state = ConnectionState::Idle;
    }

    /// Drops an open form whose edge or endpoint disappeared.
    pub fn forget(&mut self, store: &GraphStore) {
        let stale = match &self.state {
            ConnectionState::Idle => false,
            ConnectionState::PendingNew { .. } => store.pending_connection().is_empty(),
            ConnectionState::PendingEdit { edge_id, .. } => store.edge(edge_id).is_none(),
        };
        if stale {
            self.state = ConnectionState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argonath_core::model::{Node, Position};

    fn store_with(ids: &[&str]) -> GraphStore {
        let mut store = GraphStore::new();
        for (i, id) in ids.iter().enumerate() {
            let mut node = Node::custom(*id, None, Position::new(i as f64 * 100.0, 0.0));
            node.id = id.to_string();
            store.insert_node(node).unwrap();
        }
        store
    }

    #[test]
    fn new_connection_creates_edge_and_returns_to_idle() {
        let mut store = store_with(&["a", "b"]);
        let mut flow = ConnectionFlow::new();

        flow.begin_new(&mut store, "a", "b").unwrap();
        assert_eq!(store.pending_connection(), &PendingConnection::new("a", "b"));

        let id = flow
            .submit(&mut store, ConnectionForm::new(EdgeStrength::Weak, "maybe"))
            .unwrap()
            .unwrap();
        let edge = store.edge(&id).unwrap();
        assert_eq!(edge.strength, EdgeStrength::Weak);
        assert_eq!(edge.description.as_deref(), Some("maybe"));
        assert!(store.pending_connection().is_empty());
        assert!(!flow.is_open());
    }

    #[test]
    fn self_connection_is_rejected() {
        let mut store = store_with(&["a"]);
        let mut flow = ConnectionFlow::new();
        let err = flow.begin_new(&mut store, "a", "a").unwrap_err();
        assert!(matches!(err, EditorError::Validation(_)));
        assert!(store.pending_connection().is_empty());
        assert!(!flow.is_open());
    }

    #[test]
    fn edit_prefills_and_updates_edge() {
        let mut store = store_with(&["a", "b"]);
        let mut flow = ConnectionFlow::new();
        flow.begin_new(&mut store, "a", "b").unwrap();
        let id = flow
            .submit(&mut store, ConnectionForm::new(EdgeStrength::Strong, "colleagues"))
            .unwrap()
            .unwrap();

        let form = flow.begin_edit(&mut store, &id).unwrap();
        assert_eq!(form, ConnectionForm::new(EdgeStrength::Strong, "colleagues"));
        assert_eq!(store.selected_edge(), Some(id.as_str()));

        flow.submit(&mut store, ConnectionForm::new(EdgeStrength::Weak, ""))
            .unwrap();
        let edge = store.edge(&id).unwrap();
        assert_eq!(edge.strength, EdgeStrength::Weak);
        assert_eq!(edge.description, None);
        assert_eq!(edge.source, "a");
        assert_eq!(edge.target, "b");
    }

    #[test]
    fn delete_requires_edit_mode() {
        let mut store = store_with(&["a", "b"]);
        let mut flow = ConnectionFlow::new();
        assert!(matches!(
            flow.delete(&mut store),
            Err(EditorError::NoActiveForm)
        ));

        flow.begin_new(&mut store, "a", "b").unwrap();
        assert!(matches!(
            flow.delete(&mut store),
            Err(EditorError::NoActiveForm)
        ));
        let id = flow
            .submit(&mut store, ConnectionForm::default())
            .unwrap()
            .unwrap();

        flow.begin_edit(&mut store, &id).unwrap();
        let removed = flow.delete(&mut store).unwrap();
        assert_eq!(removed.id, id);
        assert!(store.edges().is_empty());
        assert_eq!(store.selected_edge(), None);
    }

    #[test]
    fn cancel_discards_pending_connection() {
        let mut store = store_with(&["a", "b"]);
        let mut flow = ConnectionFlow::new();
        flow.begin_new(&mut store, "a", "b").unwrap();
        flow.cancel(&mut store);
        assert!(store.pending_connection().is_empty());
        assert!(store.edges().is_empty());
        assert!(matches!(
            flow.begin_edit(&mut store, "missing"),
            Err(EditorError::UnknownEdge(_))
        ));
        assert_eq!(flow.state(), &ConnectionState::Idle);
    }
}
