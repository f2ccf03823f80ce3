//! Reassortment summaries.
//!
//! A summary is a JSON object keyed by source node id. Each entry states
//! whether reassortment was inferred on the branch above the node and how
//! confident the call is:
//!
//! ```json
//! {
//!   "TS_NODE_12": {
//!     "reassorted": "True",
//!     "reassorted confidence": {"True": 0.97, "False": 0.03},
//!     "segments": "HA, NA",
//!     "segments confidence": {"HA": 0.99, "NA": 0.96}
//!   }
//! }
//! ```
//!
//! Entries called reassorted with a confidence at or above a threshold become
//! [EventRecord]s, in file order, with the entry object as payload.

pub mod node_data;

use crate::mapper::EventRecord;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub(crate) const REASSORTED_KEY: &str = "reassorted";
pub(crate) const CONFIDENCE_KEY: &str = "reassorted confidence";
pub(crate) const TRUE_KEY: &str = "True";
pub(crate) const SEGMENTS_KEY: &str = "segments";
pub(crate) const SEGMENTS_CONFIDENCE_KEY: &str = "segments confidence";

/// Errors while reading a summary.
#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("failed to read summary {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid summary JSON")]
    Json(#[from] serde_json::Error),

    #[error("summary entry '{node}' is not a JSON object")]
    InvalidEntry { node: String },
}

/// Entries of a JSON object in document order.
struct OrderedEntries(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for OrderedEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = OrderedEntries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a JSON object keyed by source node id")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<OrderedEntries, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, Value>()? {
                    entries.push((key, value));
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Reads the summary at `path` and returns its events.
///
/// # Errors
/// [SummaryError] if the file cannot be read or is not a summary.
pub fn load_events<P: AsRef<Path>>(path: P, threshold: f64) -> Result<Vec<EventRecord>, SummaryError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| SummaryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    events_from_reader(BufReader::new(file), threshold)
}

/// Parses a summary from a string and returns its events.
///
/// # Example
/// ```
/// use clademap::summary::events_from_json;
///
/// let json = r#"{
///     "TS_NODE_3": {"reassorted": "True", "reassorted confidence": {"True": 0.99}, "segments": "HA"},
///     "TS_NODE_4": {"reassorted": "True", "reassorted confidence": {"True": 0.60}, "segments": "NA"},
///     "TS_NODE_5": {"reassorted": "False", "reassorted confidence": {"True": 0.01}}
/// }"#;
/// let events = events_from_json(json, 0.95).unwrap();
/// assert_eq!(events.len(), 1);
/// assert_eq!(events[0].source_id, "TS_NODE_3");
/// ```
pub fn events_from_json(json: &str, threshold: f64) -> Result<Vec<EventRecord>, SummaryError> {
    let entries: OrderedEntries = serde_json::from_str(json)?;
    select_events(entries, threshold)
}

/// Parses a summary from a reader and returns its events.
pub fn events_from_reader<R: Read>(reader: R, threshold: f64) -> Result<Vec<EventRecord>, SummaryError> {
    let entries: OrderedEntries = serde_json::from_reader(reader)?;
    select_events(entries, threshold)
}

fn select_events(entries: OrderedEntries, threshold: f64) -> Result<Vec<EventRecord>, SummaryError> {
    let total = entries.0.len();
    let mut events = Vec::new();
    for (node, entry) in entries.0 {
        if !entry.is_object() {
            return Err(SummaryError::InvalidEntry { node });
        }
        if is_reassorted(&entry) && reassortment_confidence(&entry) >= threshold {
            events.push(EventRecord::new(node, entry));
        }
    }
    info!(total, selected = events.len(), threshold, "selected reassortment events");
    Ok(events)
}

/// Returns whether an entry is called reassorted (`"True"` or `true`).
pub fn is_reassorted(entry: &Value) -> bool {
    match entry.get(REASSORTED_KEY) {
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        Some(Value::Bool(b)) => *b,
        _ => false,
    }
}

/// Returns the confidence of the reassortment call, 0 if absent.
pub fn reassortment_confidence(entry: &Value) -> f64 {
    entry
        .get(CONFIDENCE_KEY)
        .and_then(|c| c.get(TRUE_KEY))
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}
