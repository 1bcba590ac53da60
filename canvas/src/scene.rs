use crate::geometry::{dash_pattern, Viewport, NODE_RADIUS};
use argonath_core::model::{Edge, Node, NodeKind, Position};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct NodeShape {
    pub id: String,
    pub kind: NodeKind,
    pub center: Position,
    pub radius: f64,
    pub label: String,
    pub image_url: Option<String>,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLine {
    pub id: String,
    pub from: Position,
    pub to: Position,
    pub dash: Option<[f64; 2]>,
    pub width: f64,
    pub selected: bool,
}

/// Screen-space draw list. Edges are drawn before nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    pub edges: Vec<EdgeLine>,
    pub nodes: Vec<NodeShape>,
}

impl Scene {
    pub fn build(
        nodes: &[Node],
        edges: &[Edge],
        viewport: &Viewport,
        selected_node: Option<&str>,
        selected_edge: Option<&str>,
    ) -> Scene {
        let centers: HashMap<&str, Position> = nodes
            .iter()
            .map(|node| (node.id.as_str(), viewport.to_screen(node.position)))
            .collect();

        let edges = edges
            .iter()
            .filter_map(|edge| {
                let from = *centers.get(edge.source.as_str())?;
                let to = *centers.get(edge.target.as_str())?;
                let selected = selected_edge == Some(edge.id.as_str());
                Some(EdgeLine {
                    id: edge.id.clone(),
                    from,
                    to,
                    dash: dash_pattern(edge.strength)
                        .map(|[on, off]| [on * viewport.zoom, off * viewport.zoom]),
                    width: (if selected { 3.0 } else { 2.0 }) * viewport.zoom,
                    selected,
                })
            })
            .collect();

        let nodes = nodes
            .iter()
            .map(|node| NodeShape {
                id: node.id.clone(),
                kind: node.kind,
                center: centers[node.id.as_str()],
                radius: NODE_RADIUS * viewport.zoom,
                label: node.label.clone(),
                image_url: node.image_url.clone(),
                selected: selected_node == Some(node.id.as_str()),
            })
            .collect();

        Scene { edges, nodes }
    }
}
