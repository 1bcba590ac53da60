use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Profile,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A vertex on the mind map canvas.
///
/// Profile-backed nodes reuse the profile identifier as `id`; custom nodes get
/// a generated `custom-<uuid>` token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub position: Position,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Node {
    pub fn custom(
        label: impl Into<String>,
        description: Option<String>,
        position: Position,
    ) -> Self {
        Self {
            id: format!("custom-{}", uuid::Uuid::new_v4()),
            kind: NodeKind::Custom,
            position,
            label: label.into(),
            image_url: None,
            description: non_blank(description),
        }
    }

    pub fn profile(profile: &ProfileSummary, position: Position) -> Self {
        Self {
            id: profile.id.clone(),
            kind: NodeKind::Profile,
            position,
            label: profile.name.clone(),
            image_url: profile.image_url.clone(),
            description: non_blank(profile.short_description.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EdgeStrength {
    #[default]
    Strong,
    Weak,
}

impl fmt::Display for EdgeStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeStrength::Strong => f.write_str("strong"),
            EdgeStrength::Weak => f.write_str("weak"),
        }
    }
}

/// An undirected relationship line. `source`/`target` only record which
/// handle the gesture started from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub strength: EdgeStrength,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Edge {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        strength: EdgeStrength,
        description: Option<String>,
    ) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: edge_id(&source, &target, Utc::now().timestamp_millis()),
            source,
            target,
            strength,
            description: non_blank(description),
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

pub fn edge_id(source: &str, target: &str, created_at_millis: i64) -> String {
    format!("edge-{source}-{target}-{created_at_millis}")
}

/// The `{ nodes, edges }` payload shared by JSON export, saved records and the
/// static viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    #[default]
    Unclassified,
    Restricted,
    Confidential,
    Secret,
}

impl Classification {
    pub const ALL: [Classification; 4] = [
        Classification::Unclassified,
        Classification::Restricted,
        Classification::Confidential,
        Classification::Secret,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Unclassified => "UNCLASSIFIED",
            Classification::Restricted => "RESTRICTED",
            Classification::Confidential => "CONFIDENTIAL",
            Classification::Secret => "SECRET",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown classification: {0}")]
pub struct ParseClassificationError(pub String);

impl FromStr for Classification {
    type Err = ParseClassificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace([' ', '-'], "_");
        Classification::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| ParseClassificationError(s.to_string()))
    }
}

/// A persisted mind map row as the hosted backend returns it.
///
/// `data` stays as raw JSON: rows written by other clients may not match the
/// snapshot shape, and that is only detected when a row is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindMapRecord {
    pub id: String,
    pub name: String,
    pub classification: Classification,
    pub creator: String,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMindMap {
    pub name: String,
    pub classification: Classification,
    pub creator: String,
    pub data: serde_json::Value,
}

/// Fields replaced by an overwrite. `name` is only present when the overwrite
/// policy takes the name from the save form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindMapUpdate {
    pub data: serde_json::Value,
    pub classification: Classification,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ProfileSummary {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            short_description: None,
            image_url: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.short_description = Some(description.into());
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}

/// Blank free text is stored as `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|text| {
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_serializes_camel_case_without_empty_optionals() {
        let node = Node {
            id: "p-1".to_string(),
            kind: NodeKind::Profile,
            position: Position::new(1.0, 2.0),
            label: "Ada".to_string(),
            image_url: Some("https://img/ada.png".to_string()),
            description: None,
        };

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["imageUrl"], "https://img/ada.png");
        assert_eq!(json["kind"], "profile");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn custom_nodes_get_unique_ids() {
        let a = Node::custom("Alpha", None, Position::default());
        let b = Node::custom("Alpha", None, Position::default());
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("custom-"));
    }

    #[test]
    fn edge_id_encodes_endpoints_and_timestamp() {
        assert_eq!(edge_id("a", "b", 42), "edge-a-b-42");
        let edge = Edge::new("a", "b", EdgeStrength::Weak, Some("  ".to_string()));
        assert!(edge.id.starts_with("edge-a-b-"));
        assert_eq!(edge.description, None);
    }

    #[test]
    fn edge_strength_defaults_to_strong_when_missing() {
        let edge: Edge =
            serde_json::from_str(r#"{"id":"e","source":"a","target":"b"}"#).unwrap();
        assert_eq!(edge.strength, EdgeStrength::Strong);
    }

    #[test]
    fn classification_parses_loose_spelling() {
        assert_eq!(
            "confidential".parse::<Classification>(),
            Ok(Classification::Confidential)
        );
        let err = "top secret".parse::<Classification>().unwrap_err();
        assert_eq!(err.to_string(), "unknown classification: top secret");
        let _: &dyn std::error::Error = &err;
    }
}
