use argonath_core::model::{Edge, EdgeStrength, Node, Position};
use serde::{Deserialize, Serialize};

pub const NODE_RADIUS: f64 = 28.0;
/// Width, in screen pixels, of the connection handle ring straddling a node's
/// outline.
pub const HANDLE_WIDTH: f64 = 8.0;
/// Screen pixels.
pub const EDGE_HIT_TOLERANCE: f64 = 6.0;
pub const WEAK_EDGE_DASH: [f64; 2] = [6.0, 4.0];

pub fn dash_pattern(strength: EdgeStrength) -> Option<[f64; 2]> {
    match strength {
        EdgeStrength::Strong => None,
        EdgeStrength::Weak => Some(WEAK_EDGE_DASH),
    }
}

/// World-space bounding box of node discs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn of_nodes(nodes: &[Node]) -> Option<Bounds> {
        let mut iter = nodes.iter();
        let first = iter.next()?;
        let mut bounds = Bounds::around(first.position);
        for node in iter {
            bounds = bounds.union(Bounds::around(node.position));
        }
        Some(bounds)
    }

    fn around(center: Position) -> Bounds {
        Bounds {
            min_x: center.x - NODE_RADIUS,
            min_y: center.y - NODE_RADIUS,
            max_x: center.x + NODE_RADIUS,
            max_y: center.y + NODE_RADIUS,
        }
    }

    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Position {
        Position::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

/// Pan/zoom transform: `screen = world * zoom + (x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    /// Centres `bounds` in a `width × height` surface, leaving `padding` (a
    /// fraction of the bounds) free, with zoom clamped to `[min_zoom, max_zoom]`.
    /// Reversed bounds are swapped and a NaN bound is ignored.
    pub fn fit(
        bounds: &Bounds,
        width: f64,
        height: f64,
        padding: f64,
        min_zoom: f64,
        max_zoom: f64,
    ) -> Viewport {
        let scale = 1.0 + padding.max(0.0) * 2.0;
        let zoom_x = width / (bounds.width() * scale).max(f64::EPSILON);
        let zoom_y = height / (bounds.height() * scale).max(f64::EPSILON);
        let (lower, upper) = (min_zoom.min(max_zoom), min_zoom.max(max_zoom));
        let zoom = zoom_x.min(zoom_y).max(lower).min(upper);

        let center = bounds.center();
        Viewport {
            x: width / 2.0 - center.x * zoom,
            y: height / 2.0 - center.y * zoom,
            zoom,
        }
    }

    pub fn to_screen(&self, world: Position) -> Position {
        Position::new(world.x * self.zoom + self.x, world.y * self.zoom + self.y)
    }

    pub fn to_world(&self, screen: Position) -> Position {
        Position::new(
            (screen.x - self.x) / self.zoom,
            (screen.y - self.y) / self.zoom,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hit {
    Node(String),
    /// Pointer is on the handle ring of a node.
    Handle(String),
    Edge(String),
}

pub fn distance_to_segment(point: Position, a: Position, b: Position) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return point.distance_to(a);
    }
    let t = (((point.x - a.x) * dx + (point.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    point.distance_to(Position::new(a.x + t * dx, a.y + t * dy))
}

/// Nodes are tested last-drawn first so the visually topmost node wins; edges
/// are only considered when no node is under the pointer.
///
/// `zoom` converts the screen-pixel tolerances into world units. The handle
/// ring never grows past half the node radius so node bodies stay draggable.
pub fn hit_test(nodes: &[Node], edges: &[Edge], world: Position, zoom: f64) -> Option<Hit> {
    let zoom = if zoom.is_finite() && zoom > 0.0 { zoom } else { 1.0 };
    let half_ring = (HANDLE_WIDTH / 2.0 / zoom).min(NODE_RADIUS / 2.0);
    let edge_tolerance = EDGE_HIT_TOLERANCE / zoom;

    for node in nodes.iter().rev() {
        let distance = world.distance_to(node.position);
        if distance <= NODE_RADIUS + half_ring {
            if distance >= NODE_RADIUS - half_ring {
                return Some(Hit::Handle(node.id.clone()));
            }
            return Some(Hit::Node(node.id.clone()));
        }
    }

    let position_of = |id: &str| {
        nodes
            .iter()
            .find(|node| node.id == id)
            .map(|node| node.position)
    };

    edges
        .iter()
        .filter_map(|edge| {
            let from = position_of(&edge.source)?;
            let to = position_of(&edge.target)?;
            let distance = distance_to_segment(world, from, to);
            (distance <= edge_tolerance).then_some((distance, edge))
        })
        .min_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, edge)| Hit::Edge(edge.id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use argonath_core::model::NodeKind;

    fn node_at(id: &str, x: f64, y: f64) -> Node {
        Node {
            id: id.to_string(),
            kind: NodeKind::Custom,
            position: Position::new(x, y),
            label: id.to_string(),
            image_url: None,
            description: None,
        }
    }

    fn edge(id: &str, source: &str, target: &str) -> Edge {
        Edge {
            id: id.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            strength: EdgeStrength::Strong,
            description: None,
        }
    }

    #[test]
    fn topmost_node_wins_and_ring_is_a_handle() {
        let nodes = vec![node_at("under", 0.0, 0.0), node_at("over", 10.0, 0.0)];

        assert_eq!(
            hit_test(&nodes, &[], Position::new(5.0, 0.0), 1.0),
            Some(Hit::Node("over".to_string()))
        );
        assert_eq!(
            hit_test(&nodes, &[], Position::new(10.0 + NODE_RADIUS, 0.0), 1.0),
            Some(Hit::Handle("over".to_string()))
        );
    }

    #[test]
    fn edges_hit_within_tolerance_only() {
        let nodes = vec![node_at("a", 0.0, 0.0), node_at("b", 200.0, 0.0)];
        let edges = vec![edge("e", "a", "b")];

        assert_eq!(
            hit_test(&nodes, &edges, Position::new(100.0, 4.0), 1.0),
            Some(Hit::Edge("e".to_string()))
        );
        assert_eq!(hit_test(&nodes, &edges, Position::new(100.0, 20.0), 1.0), None);
    }

    #[test]
    fn fit_centres_bounds_and_clamps_zoom() {
        let nodes = vec![node_at("a", 0.0, 0.0), node_at("b", 10_000.0, 0.0)];
        let bounds = Bounds::of_nodes(&nodes).unwrap();

        let viewport = Viewport::fit(&bounds, 1000.0, 500.0, 0.1, 0.5, 2.0);
        assert_eq!(viewport.zoom, 0.5);
        let center = viewport.to_screen(bounds.center());
        assert!((center.x - 500.0).abs() < 1e-9);
        assert!((center.y - 250.0).abs() < 1e-9);

        let single = Bounds::of_nodes(&nodes[..1]).unwrap();
        assert_eq!(Viewport::fit(&single, 1000.0, 500.0, 0.1, 0.1, 2.0).zoom, 2.0);
    }

    #[test]
    fn tolerances_follow_zoom() {
        let nodes = vec![node_at("a", 0.0, 0.0), node_at("b", 2000.0, 0.0)];
        let edges = vec![edge("e", "a", "b")];

        // 4 screen pixels off the line at 0.1 zoom.
        assert_eq!(
            hit_test(&nodes, &edges, Position::new(1000.0, 40.0), 0.1),
            Some(Hit::Edge("e".to_string()))
        );
        assert_eq!(hit_test(&nodes, &edges, Position::new(1000.0, 40.0), 1.0), None);
        assert_eq!(hit_test(&nodes, &edges, Position::new(1000.0, 4.0), 4.0), None);

        // Zoomed far out the centre of a node is still its body.
        assert_eq!(
            hit_test(&nodes, &[], Position::new(0.0, 0.0), 0.1),
            Some(Hit::Node("a".to_string()))
        );
        assert_eq!(
            hit_test(&nodes, &[], Position::new(NODE_RADIUS + 10.0, 0.0), 0.1),
            Some(Hit::Handle("a".to_string()))
        );
    }

    #[test]
    fn fit_tolerates_reversed_or_nan_zoom_bounds() {
        let bounds = Bounds::of_nodes(&[node_at("a", 0.0, 0.0)]).unwrap();

        let reversed = Viewport::fit(&bounds, 1000.0, 500.0, 0.1, 3.0, 2.0);
        assert_eq!(reversed.zoom, 3.0);

        let nan = Viewport::fit(&bounds, 1000.0, 500.0, 0.1, f64::NAN, 2.0);
        assert_eq!(nan.zoom, 2.0);
    }

    #[test]
    fn screen_world_round_trip() {
        let viewport = Viewport {
            x: 30.0,
            y: -12.0,
            zoom: 1.5,
        };
        let world = Position::new(4.0, 9.0);
        assert_eq!(viewport.to_world(viewport.to_screen(world)), world);
    }
}
