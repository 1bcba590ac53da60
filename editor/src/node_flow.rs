use crate::error::EditorError;
use argonath_core::config::SearchConfig;
use argonath_core::model::{Node, ProfileSummary};
use rand::Rng;
use storage::{DeletedNode, GraphStore, LayoutAssistant, NodePatch, ProfileDirectory};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomNodeForm {
    pub name: String,
    pub description: String,
}

impl CustomNodeForm {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Double-click edit modal. Endpoints, kind and position are not editable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeEditForm {
    pub label: String,
    pub description: String,
}

/// Adding nodes (custom or from the profile search) and the node edit modal.
#[derive(Debug, Clone, Default)]
pub struct NodeFlow {
    search: SearchConfig,
    query: String,
    results: Vec<ProfileSummary>,
    editing: Option<String>,
}

impl NodeFlow {
    pub fn new(search: SearchConfig) -> Self {
        Self {
            search,
            ..Self::default()
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[ProfileSummary] {
        &self.results
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn create_custom<R: Rng>(
        &mut self,
        store: &mut GraphStore,
        layout: &LayoutAssistant,
        form: CustomNodeForm,
        rng: &mut R,
    ) -> Result<String, EditorError> {
        let name = form.name.trim();
        if name.is_empty() {
            return Err(EditorError::Validation("a node name is required".to_string()));
        }

        let position = layout.compute_insertion_position(store.nodes(), rng);
        let node = Node::custom(name, Some(form.description), position);
        let id = node.id.clone();
        store.insert_node(node)?;
        info!(node_id = %id, "custom node added");
        Ok(id)
    }

    /// Live profile search. Short queries clear the results without asking the
    /// directory.
    pub async fn search(
        &mut self,
        directory: &dyn ProfileDirectory,
        query: &str,
    ) -> Result<&[ProfileSummary], EditorError> {
        self.query = query.to_string();
        let trimmed = query.trim();
        if trimmed.chars().count() < self.search.min_query_len {
            self.results.clear();
            return Ok(&self.results);
        }

        let mut found = directory.search(trimmed, self.search.max_results).await?;
        found.truncate(self.search.max_results);
        debug!(query = %trimmed, hits = found.len(), "profile search");
        self.results = found;
        Ok(&self.results)
    }

    pub fn clear_search(&mut self) {
        self.query.clear();
        self.results.clear();
    }

    /// Adds a profile-backed node. A profile already on the map is rejected
    /// with [`storage::StoreError::DuplicateNode`].
    pub fn add_profile<R: Rng>(
        &mut self,
        store: &mut GraphStore,
        layout: &LayoutAssistant,
        profile: &ProfileSummary,
        rng: &mut R,
    ) -> Result<String, EditorError> {
        let position = layout.compute_insertion_position(store.nodes(), rng);
        store.insert_node(Node::profile(profile, position))?;
        self.clear_search();
        info!(node_id = %profile.id, "profile node added");
        Ok(profile.id.clone())
    }

    pub fn begin_edit(
        &mut self,
        store: &mut GraphStore,
        node_id: &str,
    ) -> Result<NodeEditForm, EditorError> {
        let node = store
            .node(node_id)
            .ok_or_else(|| EditorError::UnknownNode(node_id.to_string()))?;
        let form = NodeEditForm {
            label: node.label.clone(),
            description: node.description.clone().unwrap_or_default(),
        };
        store.select_node(node_id);
        self.editing = Some(node_id.to_string());
        Ok(form)
    }

    pub fn submit_edit(
        &mut self,
        store: &mut GraphStore,
        form: NodeEditForm,
    ) -> Result<String, EditorError> {
        let id = self.editing.take().ok_or(EditorError::NoActiveForm)?;
        if form.label.trim().is_empty() {
            self.editing = Some(id);
            return Err(EditorError::Validation("a node name is required".to_string()));
        }

        let patch = NodePatch {
            label: Some(form.label),
            description: Some(form.description),
        };
        if !store.update_node(&id, patch) {
            return Err(EditorError::UnknownNode(id));
        }
        store.clear_selection();
        info!(node_id = %id, "node updated");
        Ok(id)
    }

    /// Deletes the node being edited together with its edges.
    pub fn delete(&mut self, store: &mut GraphStore) -> Result<DeletedNode, EditorError> {
        let id = self.editing.take().ok_or(EditorError::NoActiveForm)?;
        let deleted = store
            .delete_node(&id)
            .ok_or(EditorError::UnknownNode(id))?;
        info!(
            node_id = %deleted.node.id,
            cascaded_edges = deleted.edges.len(),
            "node deleted"
        );
        Ok(deleted)
    }

    pub fn cancel(&mut self, store: &mut GraphStore) {
        if self.editing.take().is_some() {
            store.clear_selection();
        }
    }

    pub fn reset(&mut self) {
        self.editing = None;
        self.clear_search();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argonath_core::model::{NodeKind, Position};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use storage::{InMemoryProfileDirectory, StoreError};

    fn layout() -> LayoutAssistant {
        LayoutAssistant::new(Position::new(600.0, 400.0), 150.0)
    }

    fn directory() -> InMemoryProfileDirectory {
        InMemoryProfileDirectory::new(
            (1..=8)
                .map(|i| ProfileSummary::new(format!("p{i}"), format!("Maria {i}")))
                .chain([ProfileSummary::new("p-x", "Xavier")
                    .with_description("Analyst")
                    .with_image_url("https://img.example/x.png")])
                .collect(),
        )
    }

    #[test]
    fn custom_node_requires_name_and_lands_at_center() {
        let mut store = GraphStore::new();
        let mut flow = NodeFlow::default();
        let mut rng = StdRng::seed_from_u64(7);

        let err = flow
            .create_custom(&mut store, &layout(), CustomNodeForm::new("   ", ""), &mut rng)
            .unwrap_err();
        assert!(matches!(err, EditorError::Validation(_)));
        assert!(store.is_empty());

        let id = flow
            .create_custom(&mut store, &layout(), CustomNodeForm::new(" Alpha ", ""), &mut rng)
            .unwrap();
        let node = store.node(&id).unwrap();
        assert!(id.starts_with("custom-"));
        assert_eq!(node.kind, NodeKind::Custom);
        assert_eq!(node.label, "Alpha");
        assert_eq!(node.position, Position::new(600.0, 400.0));
        assert_eq!(node.image_url, None);
        assert_eq!(node.description, None);
    }

    #[tokio::test]
    async fn short_queries_clear_results() {
        let mut flow = NodeFlow::new(SearchConfig::default());
        let directory = directory();

        let hits = flow.search(&directory, "mar").await.unwrap();
        assert_eq!(hits.len(), 5);

        let hits = flow.search(&directory, "m").await.unwrap();
        assert!(hits.is_empty());
        assert_eq!(flow.query(), "m");
    }

    #[tokio::test]
    async fn adding_profile_copies_fields_and_clears_search() {
        let mut store = GraphStore::new();
        let mut flow = NodeFlow::new(SearchConfig::default());
        let mut rng = StdRng::seed_from_u64(1);
        let directory = directory();

        let profile = flow.search(&directory, "xav").await.unwrap()[0].clone();
        let id = flow
            .add_profile(&mut store, &layout(), &profile, &mut rng)
            .unwrap();
        assert_eq!(id, "p-x");
        assert!(flow.results().is_empty());
        assert_eq!(flow.query(), "");

        let node = store.node("p-x").unwrap();
        assert_eq!(node.kind, NodeKind::Profile);
        assert_eq!(node.label, "Xavier");
        assert_eq!(node.description.as_deref(), Some("Analyst"));
        assert_eq!(node.image_url.as_deref(), Some("https://img.example/x.png"));

        let err = flow
            .add_profile(&mut store, &layout(), &profile, &mut rng)
            .unwrap_err();
        assert!(matches!(
            err,
            EditorError::Store(StoreError::DuplicateNode(ref id)) if id == "p-x"
        ));
        assert_eq!(store.nodes().len(), 1);
    }

    #[test]
    fn edit_then_delete_node() {
        let mut store = GraphStore::new();
        let mut flow = NodeFlow::default();
        let mut rng = StdRng::seed_from_u64(3);
        let id = flow
            .create_custom(&mut store, &layout(), CustomNodeForm::new("Alpha", "first"), &mut rng)
            .unwrap();

        let form = flow.begin_edit(&mut store, &id).unwrap();
        assert_eq!(form.description, "first");
        flow.submit_edit(
            &mut store,
            NodeEditForm {
                label: "Alpha prime".to_string(),
                description: String::new(),
            },
        )
        .unwrap();
        let node = store.node(&id).unwrap();
        assert_eq!(node.label, "Alpha prime");
        assert_eq!(node.description, None);

        assert!(matches!(
            flow.delete(&mut store),
            Err(EditorError::NoActiveForm)
        ));
        flow.begin_edit(&mut store, &id).unwrap();
        let deleted = flow.delete(&mut store).unwrap();
        assert_eq!(deleted.node.id, id);
        assert!(store.is_empty());
    }
}
