use crate::payload::{extract_embedded, parse_payload, ViewerError, ViewerPayload};
use argonath_core::config::{EditorConfig, ExportConfig};
use argonath_core::model::{Edge, GraphSnapshot, Node, Position};
use canvas::{Bounds, Canvas, CanvasEvent, InteractionMode, Scene, Tooltip, Viewport};
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerOptions {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl ViewerOptions {
    pub fn from_config(editor: &EditorConfig, export: &ExportConfig) -> Self {
        Self {
            width: editor.viewport_width,
            height: editor.viewport_height,
            padding: export.padding,
            min_zoom: export.min_zoom,
            max_zoom: export.max_zoom,
        }
    }
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default(), &ExportConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerState {
    Ready,
    /// The payload could not be read; hosts show `message` instead of a graph.
    Failed { message: String },
}

/// Offline, read-only rendition of an exported mind map.
#[derive(Debug, Clone)]
pub struct StaticViewer {
    state: ViewerState,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    canvas: Canvas,
}

impl StaticViewer {
    pub fn from_json(raw: &str) -> Self {
        Self::from_json_with(raw, &ViewerOptions::default())
    }

    pub fn from_json_with(raw: &str, options: &ViewerOptions) -> Self {
        match parse_payload(raw) {
            Ok(payload) => Self::ready(payload, options),
            Err(err) => Self::failed(err),
        }
    }

    /// Reads the graph embedded in an exported `index.html`.
    pub fn from_html(page: &str) -> Self {
        Self::from_html_with(page, &ViewerOptions::default())
    }

    pub fn from_html_with(page: &str, options: &ViewerOptions) -> Self {
        match extract_embedded(page) {
            Some(raw) => Self::from_json_with(raw, options),
            None => Self::failed(ViewerError::MissingPayload),
        }
    }

    fn ready(payload: ViewerPayload, options: &ViewerOptions) -> Self {
        let viewport = payload.viewport.unwrap_or_else(|| {
            Bounds::of_nodes(&payload.nodes)
                .map(|bounds| {
                    Viewport::fit(
                        &bounds,
                        options.width,
                        options.height,
                        options.padding,
                        options.min_zoom,
                        options.max_zoom,
                    )
                })
                .unwrap_or_default()
        });
        info!(
            nodes = payload.nodes.len(),
            edges = payload.edges.len(),
            zoom = viewport.zoom,
            "static viewer ready"
        );
        Self {
            state: ViewerState::Ready,
            nodes: payload.nodes,
            edges: payload.edges,
            canvas: Canvas::new(InteractionMode::ReadOnly).with_viewport(viewport),
        }
    }

    fn failed(err: ViewerError) -> Self {
        error!("static viewer failed to load: {}", err);
        Self {
            state: ViewerState::Failed {
                message: err.to_string(),
            },
            nodes: Vec::new(),
            edges: Vec::new(),
            canvas: Canvas::new(InteractionMode::ReadOnly),
        }
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ViewerState::Ready
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn viewport(&self) -> Viewport {
        self.canvas.viewport()
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.canvas.tooltip()
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::new(self.nodes.clone(), self.edges.clone())
    }

    pub fn scene(&self) -> Scene {
        self.canvas.scene(&self.nodes, &self.edges, None, None)
    }

    pub fn pointer_down(&mut self, screen: Position) {
        self.canvas.pointer_down(screen, &self.nodes, &self.edges);
    }

    /// Moves the dragged node. Positions are local to this page.
    pub fn pointer_move(&mut self, screen: Position) {
        if let Some(CanvasEvent::NodeMoved { id, position }) = self.canvas.pointer_move(screen) {
            if let Some(node) = self.nodes.iter_mut().find(|node| node.id == id) {
                node.position = position;
            }
        }
    }

    pub fn pointer_up(&mut self, screen: Position) {
        self.canvas.pointer_up(screen, &self.nodes);
    }

    /// Toggles the description tooltip of whatever was clicked.
    pub fn click(&mut self, screen: Position) -> Option<&Tooltip> {
        self.canvas.click(screen, &self.nodes, &self.edges);
        self.canvas.tooltip()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "nodes": [
            {"id": "a", "kind": "custom", "position": {"x": 0, "y": 0}, "label": "A", "description": "Lead"},
            {"id": "b", "kind": "custom", "position": {"x": 200, "y": 0}, "label": "B"}
        ],
        "edges": [
            {"id": "e", "source": "a", "target": "b", "strength": "weak", "description": "maybe"}
        ]
    }"#;

    fn identity_viewer() -> StaticViewer {
        let raw = PAYLOAD.replacen('{', r#"{"viewport": {"x": 0, "y": 0, "zoom": 1},"#, 1);
        StaticViewer::from_json(&raw)
    }

    #[test]
    fn unparseable_payload_fails_visibly() {
        let viewer = StaticViewer::from_json("{oops");
        assert!(matches!(viewer.state(), ViewerState::Failed { .. }));
        assert!(viewer.nodes().is_empty());

        let viewer = StaticViewer::from_html("<html><body></body></html>");
        assert_eq!(
            viewer.state(),
            &ViewerState::Failed {
                message: "page has no embedded mind map data".to_string()
            }
        );
    }

    #[test]
    fn fits_to_bounds_without_stored_viewport() {
        let viewer = StaticViewer::from_json(PAYLOAD);
        assert!(viewer.is_ready());
        let viewport = viewer.viewport();
        let center = viewport.to_screen(Position::new(100.0, 0.0));
        assert!((center.x - 600.0).abs() < 1e-6);
        assert!((center.y - 400.0).abs() < 1e-6);
        assert!(viewport.zoom <= 2.0 && viewport.zoom >= 0.1);
    }

    #[test]
    fn nodes_can_be_dragged() {
        let mut viewer = identity_viewer();
        viewer.pointer_down(Position::new(200.0, 0.0));
        viewer.pointer_move(Position::new(260.0, 50.0));
        viewer.pointer_up(Position::new(260.0, 50.0));
        assert_eq!(viewer.nodes()[1].position, Position::new(260.0, 50.0));
        assert_eq!(viewer.edges().len(), 1);
    }

    #[test]
    fn click_toggles_tooltip() {
        let mut viewer = identity_viewer();
        let text = viewer.click(Position::new(0.0, 0.0)).map(|t| t.text().to_string());
        assert_eq!(text.as_deref(), Some("Lead"));
        assert!(viewer.click(Position::new(0.0, 0.0)).is_none());

        let text = viewer
            .click(Position::new(100.0, 0.0))
            .map(|t| t.text().to_string());
        assert_eq!(text.as_deref(), Some("maybe"));
        assert!(viewer.click(Position::new(100.0, 300.0)).is_none());
    }

    #[test]
    fn handle_drag_moves_node_in_read_only_mode() {
        let mut viewer = identity_viewer();
        viewer.pointer_down(Position::new(28.0, 0.0));
        viewer.pointer_move(Position::new(200.0, 0.0));
        viewer.pointer_up(Position::new(200.0, 0.0));
        assert_eq!(viewer.edges().len(), 1);
        assert_eq!(viewer.nodes()[0].position, Position::new(172.0, 0.0));
    }
}
