use crate::connection::{ConnectionFlow, ConnectionForm, ConnectionState};
use crate::error::{EditorError, Feature};
use crate::gateway::{PersistenceGateway, SaveRequest};
use crate::node_flow::{CustomNodeForm, NodeEditForm, NodeFlow};
use argonath_core::config::{AppConfig, ExportFormat, FeatureConfig};
use argonath_core::model::{MindMapRecord, Position, ProfileSummary};
use canvas::{Canvas, CanvasEvent, InteractionMode, Scene, Tooltip, Viewport};
use export::{EmbeddedTemplateSource, TemplateSource};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use storage::{GraphStore, LayoutAssistant, ProfileDirectory, ReplaceReport};
use tracing::debug;

/// What changed in a session, for hosts that re-render or persist on change.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    NodeAdded(String),
    NodeUpdated(String),
    NodeMoved { id: String, position: Position },
    NodeDeleted { id: String, cascaded_edges: usize },
    EdgeAdded(String),
    EdgeUpdated(String),
    EdgeDeleted(String),
    ConnectionFormOpened { source: String, target: String },
    EdgeEditOpened(String),
    NodeEditOpened(String),
    SelectionChanged,
    TooltipChanged(Option<Tooltip>),
    GraphReplaced { nodes: usize, edges: usize },
    Saved(String),
    SavedMapDeleted(String),
}

type Observer = Box<dyn FnMut(&SessionEvent) + Send>;

/// One editing session: the graph, its canvas and the authoring flows, wired
/// to an injected persistence gateway.
pub struct GraphEditingSession {
    store: GraphStore,
    canvas: Canvas,
    layout: LayoutAssistant,
    connections: ConnectionFlow,
    nodes: NodeFlow,
    gateway: PersistenceGateway,
    profiles: Option<Arc<dyn ProfileDirectory>>,
    templates: Arc<dyn TemplateSource>,
    features: FeatureConfig,
    rng: StdRng,
    observer: Option<Observer>,
}

impl GraphEditingSession {
    pub fn new(config: &AppConfig, gateway: PersistenceGateway) -> Self {
        Self {
            store: GraphStore::new(),
            canvas: Canvas::new(InteractionMode::Editable),
            layout: LayoutAssistant::from_config(&config.editor),
            connections: ConnectionFlow::new(),
            nodes: NodeFlow::new(config.search.clone()),
            gateway,
            profiles: None,
            templates: Arc::new(EmbeddedTemplateSource),
            features: config.features,
            rng: StdRng::from_entropy(),
            observer: None,
        }
    }

    pub fn with_profile_directory(mut self, directory: Arc<dyn ProfileDirectory>) -> Self {
        self.profiles = Some(directory);
        self
    }

    pub fn with_templates(mut self, templates: Arc<dyn TemplateSource>) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_observer(mut self, observer: impl FnMut(&SessionEvent) + Send + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn connection_flow(&self) -> &ConnectionFlow {
        &self.connections
    }

    pub fn node_flow(&self) -> &NodeFlow {
        &self.nodes
    }

    pub fn gateway(&self) -> &PersistenceGateway {
        &self.gateway
    }

    pub fn features(&self) -> FeatureConfig {
        self.features
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.canvas.set_viewport(viewport);
    }

    pub fn scene(&self) -> Scene {
        self.canvas.scene(
            self.store.nodes(),
            self.store.edges(),
            self.store.selected_node(),
            self.store.selected_edge(),
        )
    }

    // Pointer input

    pub fn pointer_down(&mut self, screen: Position) {
        self.canvas
            .pointer_down(screen, self.store.nodes(), self.store.edges());
    }

    pub fn pointer_move(&mut self, screen: Position) -> Result<(), EditorError> {
        match self.canvas.pointer_move(screen) {
            Some(event) => self.handle_canvas_event(event),
            None => Ok(()),
        }
    }

    pub fn pointer_up(&mut self, screen: Position) -> Result<(), EditorError> {
        match self.canvas.pointer_up(screen, self.store.nodes()) {
            Some(event) => self.handle_canvas_event(event),
            None => Ok(()),
        }
    }

    pub fn click(&mut self, screen: Position) -> Result<(), EditorError> {
        let events = self
            .canvas
            .click(screen, self.store.nodes(), self.store.edges());
        for event in events {
            self.handle_canvas_event(event)?;
        }
        Ok(())
    }

    pub fn double_click(&mut self, screen: Position) -> Result<(), EditorError> {
        match self
            .canvas
            .double_click(screen, self.store.nodes(), self.store.edges())
        {
            Some(event) => self.handle_canvas_event(event),
            None => Ok(()),
        }
    }

    /// Applies one canvas event to the store and flows.
    pub fn handle_canvas_event(&mut self, event: CanvasEvent) -> Result<(), EditorError> {
        debug!(?event, "canvas event");
        match event {
            CanvasEvent::NodeMoved { id, position } => {
                if self.store.move_node(&id, position) {
                    self.emit(SessionEvent::NodeMoved { id, position });
                }
            }
            CanvasEvent::ConnectRequested { source, target } => {
                self.connect(&source, &target)?;
            }
            CanvasEvent::NodeClicked(id) => {
                if self.store.select_node(&id) {
                    self.emit(SessionEvent::SelectionChanged);
                }
            }
            CanvasEvent::EdgeClicked(id) => {
                if self.store.select_edge(&id) {
                    self.emit(SessionEvent::SelectionChanged);
                }
            }
            CanvasEvent::BackgroundClicked => {
                self.store.clear_selection();
                self.emit(SessionEvent::SelectionChanged);
            }
            CanvasEvent::NodeDoubleClicked(id) => {
                self.begin_node_edit(&id)?;
            }
            CanvasEvent::EdgeDoubleClicked(id) => {
                self.begin_edge_edit(&id)?;
            }
            CanvasEvent::TooltipChanged(tooltip) => {
                self.emit(SessionEvent::TooltipChanged(tooltip));
            }
        }
        Ok(())
    }

    // Connection flow

    pub fn connect(&mut self, source: &str, target: &str) -> Result<(), EditorError> {
        self.connections.begin_new(&mut self.store, source, target)?;
        self.emit(SessionEvent::ConnectionFormOpened {
            source: source.to_string(),
            target: target.to_string(),
        });
        Ok(())
    }

    pub fn begin_edge_edit(&mut self, edge_id: &str) -> Result<ConnectionForm, EditorError> {
        let form = self.connections.begin_edit(&mut self.store, edge_id)?;
        self.emit(SessionEvent::EdgeEditOpened(edge_id.to_string()));
        Ok(form)
    }

    pub fn submit_connection(
        &mut self,
        form: ConnectionForm,
    ) -> Result<Option<String>, EditorError> {
        let editing = matches!(
            self.connections.state(),
            ConnectionState::PendingEdit { .. }
        );
        let edge_id = self.connections.submit(&mut self.store, form)?;
        if let Some(id) = &edge_id {
            self.emit(if editing {
                SessionEvent::EdgeUpdated(id.clone())
            } else {
                SessionEvent::EdgeAdded(id.clone())
            });
        }
        Ok(edge_id)
    }

    pub fn delete_edited_edge(&mut self) -> Result<(), EditorError> {
        let removed = self.connections.delete(&mut self.store)?;
        self.canvas.forget(&removed.id);
        self.emit(SessionEvent::EdgeDeleted(removed.id));
        Ok(())
    }

    pub fn cancel_connection(&mut self) {
        self.connections.cancel(&mut self.store);
    }

    // Node flow

    pub fn add_custom_node(&mut self, form: CustomNodeForm) -> Result<String, EditorError> {
        let id = self
            .nodes
            .create_custom(&mut self.store, &self.layout, form, &mut self.rng)?;
        self.emit(SessionEvent::NodeAdded(id.clone()));
        Ok(id)
    }

    pub async fn search_profiles(&mut self, query: &str) -> Result<&[ProfileSummary], EditorError> {
        self.require(Feature::ProfileSearch, self.features.profile_search)?;
        let directory = self
            .profiles
            .clone()
            .ok_or(EditorError::FeatureDisabled(Feature::ProfileSearch))?;
        self.nodes.search(directory.as_ref(), query).await
    }

    pub fn add_profile(&mut self, profile: &ProfileSummary) -> Result<String, EditorError> {
        self.require(Feature::ProfileSearch, self.features.profile_search)?;
        let id = self
            .nodes
            .add_profile(&mut self.store, &self.layout, profile, &mut self.rng)?;
        self.emit(SessionEvent::NodeAdded(id.clone()));
        Ok(id)
    }

    pub fn begin_node_edit(&mut self, node_id: &str) -> Result<NodeEditForm, EditorError> {
        let form = self.nodes.begin_edit(&mut self.store, node_id)?;
        self.emit(SessionEvent::NodeEditOpened(node_id.to_string()));
        Ok(form)
    }

    pub fn submit_node_edit(&mut self, form: NodeEditForm) -> Result<(), EditorError> {
        let id = self.nodes.submit_edit(&mut self.store, form)?;
        self.emit(SessionEvent::NodeUpdated(id));
        Ok(())
    }

    pub fn delete_edited_node(&mut self) -> Result<(), EditorError> {
        let deleted = self.nodes.delete(&mut self.store)?;
        self.canvas.forget(&deleted.node.id);
        for edge in &deleted.edges {
            self.canvas.forget(&edge.id);
        }
        self.connections.forget(&self.store);
        self.emit(SessionEvent::NodeDeleted {
            id: deleted.node.id,
            cascaded_edges: deleted.edges.len(),
        });
        Ok(())
    }

    pub fn cancel_node_edit(&mut self) {
        self.nodes.cancel(&mut self.store);
    }

    // Persistence

    pub async fn list_saved(&self) -> Result<Vec<MindMapRecord>, EditorError> {
        Ok(self.gateway.list_saved().await?)
    }

    pub async fn save(&mut self, request: SaveRequest) -> Result<MindMapRecord, EditorError> {
        let record = self.gateway.save(&self.store, request).await?;
        self.emit(SessionEvent::Saved(record.id.clone()));
        Ok(record)
    }

    pub async fn load(&mut self, id: &str) -> Result<MindMapRecord, EditorError> {
        let record = self.gateway.load(id, &mut self.store).await?;
        self.after_replace();
        Ok(record)
    }

    pub async fn delete_saved(&mut self, id: &str) -> Result<(), EditorError> {
        self.gateway.delete(id).await?;
        self.emit(SessionEvent::SavedMapDeleted(id.to_string()));
        Ok(())
    }

    // Export / import

    pub fn export_json(&self) -> Result<Vec<u8>, EditorError> {
        self.require(Feature::JsonExport, self.features.json_export)?;
        Ok(self.gateway.export_json(&self.store)?)
    }

    pub fn import_json(&mut self, bytes: &[u8]) -> Result<ReplaceReport, EditorError> {
        self.require(Feature::JsonExport, self.features.json_export)?;
        let report = self.gateway.import_json(bytes, &mut self.store)?;
        self.after_replace();
        Ok(report)
    }

    pub fn export_image(&self) -> Result<Vec<u8>, EditorError> {
        self.require(Feature::ImageExport, self.features.image_export)?;
        Ok(self.gateway.export_image(&self.store)?)
    }

    pub async fn export_static_site(&self) -> Result<Vec<u8>, EditorError> {
        self.require(Feature::StaticSiteExport, self.features.static_site_export)?;
        Ok(self
            .gateway
            .export_static_site(&self.store, self.templates.as_ref())
            .await?)
    }

    pub async fn export_standalone_html(&self) -> Result<String, EditorError> {
        self.require(Feature::HtmlExport, self.features.html_export)?;
        Ok(self
            .gateway
            .export_standalone_html(&self.store, self.templates.as_ref())
            .await?)
    }

    pub fn export_file_name(&self, format: ExportFormat) -> &str {
        self.gateway.export_config().file_name(format)
    }

    fn require(&self, feature: Feature, enabled: bool) -> Result<(), EditorError> {
        if enabled {
            Ok(())
        } else {
            Err(EditorError::FeatureDisabled(feature))
        }
    }

    fn after_replace(&mut self) {
        self.canvas.reset();
        self.connections = ConnectionFlow::new();
        self.nodes.reset();
        self.emit(SessionEvent::GraphReplaced {
            nodes: self.store.nodes().len(),
            edges: self.store.edges().len(),
        });
    }

    fn emit(&mut self, event: SessionEvent) {
        if let Some(observer) = self.observer.as_mut() {
            observer(&event);
        }
    }
}
