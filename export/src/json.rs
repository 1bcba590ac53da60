use crate::error::ExportError;
use argonath_core::model::{Edge, GraphSnapshot, Node};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Pretty-printed `{ "nodes": [...], "edges": [...] }`, UTF-8, no envelope.
pub fn encode_snapshot(snapshot: &GraphSnapshot) -> Result<Vec<u8>, ExportError> {
    Ok(serde_json::to_vec_pretty(snapshot)?)
}

pub fn decode_snapshot(bytes: &[u8]) -> Result<GraphSnapshot, ExportError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|err| ExportError::InvalidJson(err.to_string()))?;
    decode_snapshot_value(value)
}

/// Strict decode: both keys must be arrays and every entry must be a valid
/// node/edge, otherwise nothing is returned.
pub fn decode_snapshot_value(value: Value) -> Result<GraphSnapshot, ExportError> {
    let Value::Object(mut object) = value else {
        return Err(ExportError::MissingGraphKeys);
    };
    let (Some(Value::Array(nodes)), Some(Value::Array(edges))) =
        (object.remove("nodes"), object.remove("edges"))
    else {
        return Err(ExportError::MissingGraphKeys);
    };

    Ok(GraphSnapshot::new(
        decode_entries::<Node>(nodes, "node")?,
        decode_entries::<Edge>(edges, "edge")?,
    ))
}

fn decode_entries<T: DeserializeOwned>(
    entries: Vec<Value>,
    kind: &'static str,
) -> Result<Vec<T>, ExportError> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value(entry).map_err(|err| ExportError::MalformedEntry {
                kind,
                index,
                reason: err.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_keys_are_rejected() {
        let err = decode_snapshot(br#"{"foo": 1}"#).unwrap_err();
        assert!(matches!(err, ExportError::MissingGraphKeys));

        let err = decode_snapshot(br#"{"nodes": [], "edges": {}}"#).unwrap_err();
        assert!(matches!(err, ExportError::MissingGraphKeys));

        let err = decode_snapshot(b"[1, 2]").unwrap_err();
        assert!(matches!(err, ExportError::MissingGraphKeys));
    }

    #[test]
    fn invalid_json_is_reported() {
        let err = decode_snapshot(b"{not json").unwrap_err();
        assert!(matches!(err, ExportError::InvalidJson(_)));
        assert!(err.is_malformed_payload());
    }

    #[test]
    fn malformed_entry_reports_index() {
        let value = json!({
            "nodes": [
                {"id": "a", "kind": "custom", "position": {"x": 0, "y": 0}, "label": "A"},
                {"id": "b"}
            ],
            "edges": []
        });
        let err = decode_snapshot_value(value).unwrap_err();
        assert!(matches!(
            err,
            ExportError::MalformedEntry {
                kind: "node",
                index: 1,
                ..
            }
        ));
    }

    #[test]
    fn empty_arrays_decode_to_empty_snapshot() {
        let snapshot = decode_snapshot(br#"{"nodes": [], "edges": []}"#).unwrap();
        assert!(snapshot.is_empty());
    }
}
