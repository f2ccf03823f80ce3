use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An annotation computed on the source tree.
///
/// `source_id` names a source node (internal label or taxon name); the
/// payload is carried through to the output untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub source_id: String,
    #[serde(default)]
    pub payload: Value,
}

impl EventRecord {
    pub fn new(source_id: impl Into<String>, payload: Value) -> Self {
        EventRecord {
            source_id: source_id.into(),
            payload,
        }
    }

    /// Creates a record without payload.
    pub fn bare(source_id: impl Into<String>) -> Self {
        Self::new(source_id, Value::Null)
    }
}
