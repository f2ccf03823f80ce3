//! Error types of the mapping engine.
//!
//! Only conditions that invalidate a whole run are errors. An event that
//! cannot be placed on the target tree is not an error: it is recorded as an
//! unmapped [MappingEntry](crate::mapper::MappingEntry) and counted in the
//! run summary.

use crate::model::VertexIndex;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type alias using [MappingError].
pub type Result<T> = std::result::Result<T, MappingError>;

/// Which of the two trees of a run something refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeRole {
    /// Tree the annotations were computed on.
    Source,
    /// Tree the annotations are transferred to.
    Target,
}

impl fmt::Display for TreeRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TreeRole::Source => write!(f, "source"),
            TreeRole::Target => write!(f, "target"),
        }
    }
}

/// Fatal errors of the mapping engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    /// Tree violates the structure the engine relies on, e.g. a taxon
    /// appearing at two leaves, which breaks the partition of leaf sets.
    #[error("malformed {role} tree: {reason}")]
    MalformedTree { role: TreeRole, reason: String },

    /// Two matching strategies disagreed, which the partition invariant rules
    /// out; indicates a bug or an inconsistent tree.
    #[error(
        "ambiguous match{}: ancestral walk found {walk:?}, brute force found {brute_force:?}",
        .source_id.as_deref().map(|id| format!(" for source node '{id}'")).unwrap_or_default()
    )]
    AmbiguousMatch {
        source_id: Option<String>,
        walk: Option<VertexIndex>,
        brute_force: Option<VertexIndex>,
    },
}

impl MappingError {
    /// Convenience constructor for MalformedTree
    pub fn malformed(role: TreeRole, reason: impl Into<String>) -> Self {
        MappingError::MalformedTree {
            role,
            reason: reason.into(),
        }
    }

    /// Attaches the id of the source node being mapped, if the error
    /// concerns a single event.
    pub fn with_source_id(self, id: &str) -> Self {
        match self {
            MappingError::AmbiguousMatch {
                walk, brute_force, ..
            } => MappingError::AmbiguousMatch {
                source_id: Some(id.to_string()),
                walk,
                brute_force,
            },
            other => other,
        }
    }
}
