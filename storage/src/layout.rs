use argonath_core::config::EditorConfig;
use argonath_core::model::{Node, Position};
use rand::Rng;
use std::f64::consts::TAU;

/// Drops new nodes near the existing cluster.
///
/// Not a force layout: the point sits at a fixed distance from the centroid
/// at a random angle, so repeated inserts land in different places but may
/// still overlap other nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutAssistant {
    viewport_center: Position,
    radius: f64,
}

impl LayoutAssistant {
    pub fn new(viewport_center: Position, radius: f64) -> Self {
        Self {
            viewport_center,
            radius,
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(
            Position::new(config.viewport_width / 2.0, config.viewport_height / 2.0),
            config.insertion_radius,
        )
    }

    pub fn viewport_center(&self) -> Position {
        self.viewport_center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn compute_insertion_position<R: Rng>(
        &self,
        existing: &[Node],
        rng: &mut R,
    ) -> Position {
        let Some(center) = centroid(existing.iter().map(|node| node.position)) else {
            return self.viewport_center;
        };

        let angle = rng.gen_range(0.0..TAU);
        Position::new(
            center.x + self.radius * angle.cos(),
            center.y + self.radius * angle.sin(),
        )
    }
}

pub fn centroid(points: impl IntoIterator<Item = Position>) -> Option<Position> {
    let mut count = 0usize;
    let (mut sum_x, mut sum_y) = (0.0, 0.0);
    for point in points {
        sum_x += point.x;
        sum_y += point.y;
        count += 1;
    }
    (count > 0).then(|| Position::new(sum_x / count as f64, sum_y / count as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use argonath_core::model::NodeKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

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

    #[test]
    fn empty_graph_uses_viewport_center() {
        let layout = LayoutAssistant::from_config(&EditorConfig::default());
        let mut rng = StdRng::seed_from_u64(7);

        let position = layout.compute_insertion_position(&[], &mut rng);
        assert_eq!(position, Position::new(600.0, 400.0));
    }

    #[test]
    fn insertion_lies_on_circle_around_centroid() {
        let layout = LayoutAssistant::new(Position::default(), 150.0);
        let nodes = vec![
            node_at("a", 0.0, 0.0),
            node_at("b", 100.0, 0.0),
            node_at("c", 50.0, 90.0),
        ];
        let center = Position::new(50.0, 30.0);

        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..32 {
            let position = layout.compute_insertion_position(&nodes, &mut rng);
            assert!((position.distance_to(center) - 150.0).abs() < 1e-9);
        }
    }

    #[test]
    fn repeated_insertions_vary() {
        let layout = LayoutAssistant::new(Position::default(), 150.0);
        let nodes = vec![node_at("a", 10.0, 10.0)];
        let mut rng = StdRng::seed_from_u64(1);

        let first = layout.compute_insertion_position(&nodes, &mut rng);
        let second = layout.compute_insertion_position(&nodes, &mut rng);
        assert_ne!(first, second);
    }
}
