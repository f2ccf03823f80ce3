//! Node-data JSON for the Nextstrain `augur export --node-data` step.

use crate::mapper::{MappingOutcome, MappingTable};
use crate::summary::{SEGMENTS_CONFIDENCE_KEY, SEGMENTS_KEY, reassortment_confidence};
use serde_json::{Map, Value, json};

/// Branch label key shown by the visualization.
pub const BRANCH_LABEL: &str = "Reassorted Segments";

/// Builds node-data JSON from the mapped entries of `table`.
///
/// Each mapped target node gets a node attribute block and, if the event
/// names segments, a branch label like `2 (HA, NA)`. When several events land
/// on one target node, the later one in table order wins.
///
/// # Example
/// ```
/// use clademap::mapper::{MappingEntry, MappingOutcome, MappingTable, MatchKind};
/// use clademap::summary::node_data::build_node_data;
/// use serde_json::json;
///
/// let table = MappingTable::from_entries(vec![MappingEntry {
///     source_id: "TS_NODE_1".to_string(),
///     outcome: MappingOutcome::Mapped {
///         target_id: "NODE_0000003".to_string(),
///         target_vertex: 7,
///         kind: MatchKind::Exact,
///     },
///     payload: json!({"reassorted": "True", "reassorted confidence": {"True": 0.9871}, "segments": "HA,NA"}),
/// }]);
///
/// let data = build_node_data(&table);
/// assert_eq!(data["nodes"]["NODE_0000003"]["confidence"], json!("0.987"));
/// assert_eq!(
///     data["branches"]["NODE_0000003"]["labels"]["Reassorted Segments"],
///     json!("2 (HA, NA)")
/// );
/// ```
pub fn build_node_data(table: &MappingTable) -> Value {
    let mut nodes = Map::new();
    let mut branches = Map::new();

    for entry in table.entries() {
        let MappingOutcome::Mapped { target_id, .. } = &entry.outcome else {
            continue;
        };
        let data = &entry.payload;
        let segments = data.get(SEGMENTS_KEY).cloned().unwrap_or(Value::Null);

        nodes.insert(
            target_id.clone(),
            json!({
                "Reassorted": true,
                "confidence": format!("{:.3}", reassortment_confidence(data)),
                "reassortment_events": segments,
                "segments_confidence": data
                    .get(SEGMENTS_CONFIDENCE_KEY)
                    .cloned()
                    .unwrap_or_else(|| json!({})),
            }),
        );

        if let Some(label) = segments.as_str().and_then(branch_label_text) {
            branches.insert(
                target_id.clone(),
                json!({ "labels": { BRANCH_LABEL: label } }),
            );
        }
    }

    json!({
        "branch_attrs": { "labels": { "text": BRANCH_LABEL } },
        "nodes": nodes,
        "branches": branches,
    })
}

/// Formats a comma-separated segment list as `count (a, b, ...)`.
fn branch_label_text(segments: &str) -> Option<String> {
    if segments.is_empty() {
        return None;
    }
    let list: Vec<&str> = segments.split(',').map(str::trim).collect();
    Some(format!("{} ({})", list.len(), list.join(", ")))
}
