use crate::geometry::{hit_test, Hit, Viewport};
use crate::scene::Scene;
use argonath_core::model::{Edge, Node, Position};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    Editable,
    /// Dragging and tooltips only; no connection gestures or edit requests.
    ReadOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tooltip {
    Node { id: String, text: String },
    Edge { id: String, text: String },
}

impl Tooltip {
    pub fn target_id(&self) -> &str {
        match self {
            Tooltip::Node { id, .. } | Tooltip::Edge { id, .. } => id,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Tooltip::Node { text, .. } | Tooltip::Edge { text, .. } => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    NodeMoved { id: String, position: Position },
    ConnectRequested { source: String, target: String },
    NodeClicked(String),
    EdgeClicked(String),
    BackgroundClicked,
    NodeDoubleClicked(String),
    EdgeDoubleClicked(String),
    TooltipChanged(Option<Tooltip>),
}

#[derive(Debug, Clone, PartialEq)]
enum DragState {
    Idle,
    Moving { id: String, grab_offset: Position },
    Connecting { source: String, cursor: Position },
}

/// Pointer state machine over a node/edge list it does not own. Hosts feed
/// screen-space pointer events and apply the returned [`CanvasEvent`]s.
#[derive(Debug, Clone)]
pub struct Canvas {
    mode: InteractionMode,
    viewport: Viewport,
    drag: DragState,
    tooltip: Option<Tooltip>,
}

impl Canvas {
    pub fn new(mode: InteractionMode) -> Self {
        Self {
            mode,
            viewport: Viewport::default(),
            drag: DragState::Idle,
            tooltip: None,
        }
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag != DragState::Idle
    }

    /// In-flight connection line, in world coordinates.
    pub fn connection_preview(&self, nodes: &[Node]) -> Option<(Position, Position)> {
        let DragState::Connecting { source, cursor } = &self.drag else {
            return None;
        };
        let from = nodes.iter().find(|node| &node.id == source)?.position;
        Some((from, *cursor))
    }

    pub fn scene(
        &self,
        nodes: &[Node],
        edges: &[Edge],
        selected_node: Option<&str>,
        selected_edge: Option<&str>,
    ) -> Scene {
        Scene::build(nodes, edges, &self.viewport, selected_node, selected_edge)
    }

    pub fn pointer_down(&mut self, screen: Position, nodes: &[Node], edges: &[Edge]) {
        let world = self.viewport.to_world(screen);
        self.drag = match hit_test(nodes, edges, world, self.viewport.zoom) {
            Some(Hit::Handle(id)) if self.mode == InteractionMode::Editable => {
                DragState::Connecting {
                    source: id,
                    cursor: world,
                }
            }
            Some(Hit::Handle(id)) | Some(Hit::Node(id)) => {
                let Some(node) = nodes.iter().find(|node| node.id == id) else {
                    return;
                };
                DragState::Moving {
                    grab_offset: Position::new(
                        world.x - node.position.x,
                        world.y - node.position.y,
                    ),
                    id,
                }
            }
            _ => DragState::Idle,
        };
        trace!(drag = ?self.drag, "pointer down");
    }

    pub fn pointer_move(&mut self, screen: Position) -> Option<CanvasEvent> {
        let world = self.viewport.to_world(screen);
        match &mut self.drag {
            DragState::Idle => None,
            DragState::Moving { id, grab_offset } => Some(CanvasEvent::NodeMoved {
                id: id.clone(),
                position: Position::new(world.x - grab_offset.x, world.y - grab_offset.y),
            }),
            DragState::Connecting { cursor, .. } => {
                *cursor = world;
                None
            }
        }
    }

    /// Finishes a drag. A connection gesture released over a different node
    /// yields [`CanvasEvent::ConnectRequested`]; anywhere else it is dropped.
    pub fn pointer_up(&mut self, screen: Position, nodes: &[Node]) -> Option<CanvasEvent> {
        let world = self.viewport.to_world(screen);
        let zoom = self.viewport.zoom;
        match std::mem::replace(&mut self.drag, DragState::Idle) {
            DragState::Connecting { source, .. } => match hit_test(nodes, &[], world, zoom) {
                Some(Hit::Node(target)) | Some(Hit::Handle(target)) if target != source => {
                    Some(CanvasEvent::ConnectRequested { source, target })
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// Single click: reports what was hit and toggles the description tooltip.
    pub fn click(&mut self, screen: Position, nodes: &[Node], edges: &[Edge]) -> Vec<CanvasEvent> {
        let world = self.viewport.to_world(screen);
        let (primary, next_tooltip) = match hit_test(nodes, edges, world, self.viewport.zoom) {
            Some(Hit::Node(id)) | Some(Hit::Handle(id)) => {
                let tooltip = nodes
                    .iter()
                    .find(|node| node.id == id)
                    .and_then(|node| node.description.clone())
                    .map(|text| Tooltip::Node {
                        id: id.clone(),
                        text,
                    });
                (CanvasEvent::NodeClicked(id), tooltip)
            }
            Some(Hit::Edge(id)) => {
                let tooltip = edges
                    .iter()
                    .find(|edge| edge.id == id)
                    .and_then(|edge| edge.description.clone())
                    .map(|text| Tooltip::Edge {
                        id: id.clone(),
                        text,
                    });
                (CanvasEvent::EdgeClicked(id), tooltip)
            }
            None => (CanvasEvent::BackgroundClicked, None),
        };

        let next_tooltip = match (&self.tooltip, next_tooltip) {
            (Some(current), Some(next)) if current.target_id() == next.target_id() => None,
            (_, next) => next,
        };

        let mut events = vec![primary];
        if next_tooltip != self.tooltip {
            self.tooltip = next_tooltip.clone();
            events.push(CanvasEvent::TooltipChanged(next_tooltip));
        }
        events
    }

    pub fn double_click(
        &mut self,
        screen: Position,
        nodes: &[Node],
        edges: &[Edge],
    ) -> Option<CanvasEvent> {
        if self.mode == InteractionMode::ReadOnly {
            return None;
        }
        let world = self.viewport.to_world(screen);
        match hit_test(nodes, edges, world, self.viewport.zoom)? {
            Hit::Node(id) | Hit::Handle(id) => Some(CanvasEvent::NodeDoubleClicked(id)),
            Hit::Edge(id) => Some(CanvasEvent::EdgeDoubleClicked(id)),
        }
    }

    /// Drops a tooltip whose target no longer exists.
    pub fn forget(&mut self, id: &str) {
        if self
            .tooltip
            .as_ref()
            .is_some_and(|tooltip| tooltip.target_id() == id)
        {
            self.tooltip = None;
        }
        let dragging_removed = match &self.drag {
            DragState::Moving { id: dragged, .. } => dragged == id,
            DragState::Connecting { source, .. } => source == id,
            DragState::Idle => false,
        };
        if dragging_removed {
            self.drag = DragState::Idle;
        }
    }

    pub fn reset(&mut self) {
        self.drag = DragState::Idle;
        self.tooltip = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::NODE_RADIUS;
    use argonath_core::model::{EdgeStrength, NodeKind};

    fn node_at(id: &str, x: f64, y: f64, description: Option<&str>) -> Node {
        Node {
            id: id.to_string(),
            kind: NodeKind::Custom,
            position: Position::new(x, y),
            label: id.to_string(),
            image_url: None,
            description: description.map(str::to_string),
        }
    }

    fn graph() -> (Vec<Node>, Vec<Edge>) {
        let nodes = vec![
            node_at("a", 0.0, 0.0, Some("first")),
            node_at("b", 200.0, 0.0, None),
        ];
        let edges = vec![Edge {
            id: "e".to_string(),
            source: "a".to_string(),
            target: "b".to_string(),
            strength: EdgeStrength::Weak,
            description: Some("maybe linked".to_string()),
        }];
        (nodes, edges)
    }

    #[test]
    fn dragging_node_body_moves_it() {
        let (nodes, edges) = graph();
        let mut canvas = Canvas::new(InteractionMode::Editable);

        canvas.pointer_down(Position::new(5.0, 5.0), &nodes, &edges);
        let event = canvas.pointer_move(Position::new(55.0, 25.0));
        assert_eq!(
            event,
            Some(CanvasEvent::NodeMoved {
                id: "a".to_string(),
                position: Position::new(50.0, 20.0),
            })
        );
        assert_eq!(canvas.pointer_up(Position::new(55.0, 25.0), &nodes), None);
        assert!(!canvas.is_dragging());
    }

    #[test]
    fn handle_drag_onto_other_node_requests_connection() {
        let (nodes, edges) = graph();
        let mut canvas = Canvas::new(InteractionMode::Editable);

        canvas.pointer_down(Position::new(NODE_RADIUS, 0.0), &nodes, &edges);
        canvas.pointer_move(Position::new(120.0, 0.0));
        assert_eq!(
            canvas.connection_preview(&nodes),
            Some((Position::new(0.0, 0.0), Position::new(120.0, 0.0)))
        );
        let event = canvas.pointer_up(Position::new(200.0, 0.0), &nodes);
        assert_eq!(
            event,
            Some(CanvasEvent::ConnectRequested {
                source: "a".to_string(),
                target: "b".to_string(),
            })
        );
    }

    #[test]
    fn handle_drag_released_on_source_or_background_is_dropped() {
        let (nodes, edges) = graph();
        let mut canvas = Canvas::new(InteractionMode::Editable);

        canvas.pointer_down(Position::new(NODE_RADIUS, 0.0), &nodes, &edges);
        assert_eq!(canvas.pointer_up(Position::new(0.0, 0.0), &nodes), None);

        canvas.pointer_down(Position::new(NODE_RADIUS, 0.0), &nodes, &edges);
        assert_eq!(canvas.pointer_up(Position::new(100.0, 300.0), &nodes), None);
    }

    #[test]
    fn read_only_mode_never_connects_or_edits() {
        let (nodes, edges) = graph();
        let mut canvas = Canvas::new(InteractionMode::ReadOnly);

        canvas.pointer_down(Position::new(NODE_RADIUS, 0.0), &nodes, &edges);
        assert!(matches!(
            canvas.pointer_move(Position::new(40.0, 0.0)),
            Some(CanvasEvent::NodeMoved { .. })
        ));
        assert_eq!(canvas.pointer_up(Position::new(200.0, 0.0), &nodes), None);
        assert_eq!(
            canvas.double_click(Position::new(0.0, 0.0), &nodes, &edges),
            None
        );
    }

    #[test]
    fn click_toggles_tooltip() {
        let (nodes, edges) = graph();
        let mut canvas = Canvas::new(InteractionMode::ReadOnly);

        let events = canvas.click(Position::new(100.0, 2.0), &nodes, &edges);
        assert_eq!(events[0], CanvasEvent::EdgeClicked("e".to_string()));
        assert_eq!(canvas.tooltip().map(Tooltip::text), Some("maybe linked"));

        let events = canvas.click(Position::new(100.0, 2.0), &nodes, &edges);
        assert_eq!(events[1], CanvasEvent::TooltipChanged(None));
        assert!(canvas.tooltip().is_none());

        canvas.click(Position::new(0.0, 0.0), &nodes, &edges);
        assert_eq!(canvas.tooltip().map(Tooltip::text), Some("first"));
        let events = canvas.click(Position::new(500.0, 500.0), &nodes, &edges);
        assert_eq!(events[0], CanvasEvent::BackgroundClicked);
        assert!(canvas.tooltip().is_none());
    }

    #[test]
    fn double_click_reports_edit_target() {
        let (nodes, edges) = graph();
        let mut canvas = Canvas::new(InteractionMode::Editable);

        assert_eq!(
            canvas.double_click(Position::new(100.0, 0.0), &nodes, &edges),
            Some(CanvasEvent::EdgeDoubleClicked("e".to_string()))
        );
        assert_eq!(
            canvas.double_click(Position::new(200.0, 0.0), &nodes, &edges),
            Some(CanvasEvent::NodeDoubleClicked("b".to_string()))
        );
    }
}
