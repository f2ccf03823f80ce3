//! Event mapping.
//!
//! An [EventMapper] resolves each [EventRecord] to its source node, looks up
//! the node's cladeset and asks a [CladeMatcher] for the minimal containing
//! node of the target tree. Every event yields one [MappingEntry], mapped or
//! not, so the resulting [MappingTable] has exactly one row per input event.

pub mod event;
pub mod mapping;

pub use event::EventRecord;
pub use mapping::{
    MappingEntry, MappingOutcome, MappingSummary, MappingTable, MatchKind, UnmappedReason,
};

use crate::error::{MappingError, Result, TreeRole};
use crate::index::IndexedTree;
use crate::matcher::{CladeMatcher, MatchStrategy};
use crate::model::LeafLabelMap;
use rayon::prelude::*;
use tracing::{debug, warn};

/// Maps events from a source tree onto a target tree.
///
/// Both trees must be indexed against the same `labels`. The mapper only
/// reads them, so events can be resolved in parallel.
#[derive(Debug, Clone, Copy)]
pub struct EventMapper<'a> {
    source: &'a IndexedTree,
    target: &'a IndexedTree,
    labels: &'a LeafLabelMap,
    strategy: MatchStrategy,
    parallel: bool,
}

impl<'a> EventMapper<'a> {
    pub fn new(
        source: &'a IndexedTree,
        target: &'a IndexedTree,
        labels: &'a LeafLabelMap,
        strategy: MatchStrategy,
    ) -> Self {
        EventMapper {
            source,
            target,
            labels,
            strategy,
            parallel: false,
        }
    }

    /// Resolve events on the rayon thread pool; the table is unchanged.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Maps a single event.
    ///
    /// # Errors
    /// [MappingError::AmbiguousMatch] if the verified strategy sees the two
    /// matchers disagree, [MappingError::MalformedTree] if the matched target
    /// node carries no id.
    pub fn map_event(&self, event: &EventRecord) -> Result<MappingEntry> {
        let outcome = self.resolve(&event.source_id)?;
        match &outcome {
            MappingOutcome::Mapped {
                target_id, kind, ..
            } => debug!(source_id = %event.source_id, %target_id, %kind, "mapped event"),
            MappingOutcome::Unmapped { reason } => {
                warn!(source_id = %event.source_id, %reason, "event not mapped")
            }
        }
        Ok(MappingEntry {
            source_id: event.source_id.clone(),
            outcome,
            payload: event.payload.clone(),
        })
    }

    /// Maps all events, keeping their order.
    pub fn map_events(&self, events: &[EventRecord]) -> Result<MappingTable> {
        let entries = if self.parallel {
            events
                .par_iter()
                .map(|event| self.map_event(event))
                .collect::<Result<Vec<_>>>()?
        } else {
            events
                .iter()
                .map(|event| self.map_event(event))
                .collect::<Result<Vec<_>>>()?
        };
        Ok(MappingTable::from_entries(entries))
    }

    fn resolve(&self, source_id: &str) -> Result<MappingOutcome> {
        let Some(source_vertex) = self.source.index().vertex_by_id(source_id) else {
            return Ok(unmapped(UnmappedReason::UnknownSourceNode));
        };
        let leaf_set = self.source.cladeset(source_vertex);
        if leaf_set.is_empty() {
            return Ok(unmapped(UnmappedReason::EmptyCladeset));
        }

        let found = self
            .strategy
            .find_minimal_containing_node(leaf_set, self.target)
            .map_err(|err| err.with_source_id(source_id))?;

        // Matchers only report that nothing contains the query. Whether the
        // trees share any of its taxa is rechecked here, and only on this
        // path, to pick the reason.
        let Some(target_vertex) = found else {
            let shares_leaf = leaf_set.iter().any(|label| self.target.index().has_leaf(label));
            let reason = if shares_leaf {
                UnmappedReason::NoContainingNode
            } else {
                UnmappedReason::NoSharedLeaves
            };
            return Ok(unmapped(reason));
        };

        let target_id = self
            .target
            .tree()
            .id_of(target_vertex, self.labels)
            .ok_or_else(|| {
                MappingError::malformed(
                    TreeRole::Target,
                    format!("vertex {target_vertex} has no id; label internal nodes first"),
                )
            })?;
        let kind = if self.target.cladeset(target_vertex) == leaf_set {
            MatchKind::Exact
        } else {
            MatchKind::Subclade
        };

        Ok(MappingOutcome::Mapped {
            target_id: target_id.to_string(),
            target_vertex,
            kind,
        })
    }
}

fn unmapped(reason: UnmappedReason) -> MappingOutcome {
    MappingOutcome::Unmapped { reason }
}
