use argonath_core::error::{ArgonathError, ErrorCode};
use argonath_core::model::{Edge, Node};
use canvas::Viewport;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;
use tracing::warn;

/// `id` of the `<script type="application/json">` element carrying the graph.
pub const PAYLOAD_ELEMENT_ID: &str = "mindmap-data";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ViewerError {
    #[error("mind map data is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("page has no embedded mind map data")]
    MissingPayload,
}

impl ArgonathError for ViewerError {
    fn error_code(&self) -> ErrorCode {
        match self {
            ViewerError::InvalidJson(_) => ErrorCode::InvalidArgument,
            ViewerError::MissingPayload => ErrorCode::NotFound,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewerPayload {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub viewport: Option<Viewport>,
}

/// Lenient decode: only unparseable JSON is an error. Missing or non-array
/// `nodes`/`edges` read as empty, bad entries and repeated node ids are
/// skipped, and edges whose endpoints are absent are dropped.
pub fn parse_payload(raw: &str) -> Result<ViewerPayload, ViewerError> {
    let value: Value =
        serde_json::from_str(raw.trim()).map_err(|err| ViewerError::InvalidJson(err.to_string()))?;

    let mut seen = HashSet::new();
    let nodes: Vec<Node> = entries(value.get("nodes"), "node")
        .into_iter()
        .filter(|node: &Node| seen.insert(node.id.clone()))
        .collect();

    let edges: Vec<Edge> = entries(value.get("edges"), "edge");
    let total_edges = edges.len();
    let edges: Vec<Edge> = edges
        .into_iter()
        .filter(|edge| seen.contains(&edge.source) && seen.contains(&edge.target))
        .collect();
    if edges.len() < total_edges {
        warn!(
            dropped = total_edges - edges.len(),
            "dropped edges with missing endpoints"
        );
    }

    let viewport = value
        .get("viewport")
        .and_then(|raw| serde_json::from_value::<Viewport>(raw.clone()).ok())
        .filter(|viewport| {
            viewport.zoom.is_finite()
                && viewport.zoom > 0.0
                && viewport.x.is_finite()
                && viewport.y.is_finite()
        });

    Ok(ViewerPayload {
        nodes,
        edges,
        viewport,
    })
}

fn entries<T: DeserializeOwned>(value: Option<&Value>, kind: &str) -> Vec<T> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item.clone()) {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(%kind, index, "skipping malformed entry: {}", err);
                None
            }
        })
        .collect()
}

/// Text content of the payload `<script>` element, if the page has one.
pub fn extract_embedded(page: &str) -> Option<&str> {
    let marker = format!("id=\"{PAYLOAD_ELEMENT_ID}\"");
    let tag_start = page.find(&marker)?;
    let body_start = tag_start + page[tag_start..].find('>')? + 1;
    let body_end = body_start + page[body_start..].find("</script>")?;
    Some(&page[body_start..body_end])
}
