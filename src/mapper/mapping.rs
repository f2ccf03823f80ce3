//! The mapping table produced by a run, and its JSON and TSV renditions.

use crate::model::VertexIndex;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};

/// Header line of the TSV rendition.
const TSV_HEADER: &str = "source_id\ttarget_id\tmatch_kind\treason";

/// How a mapped source node relates to its target node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// Both nodes have the same cladeset.
    Exact,
    /// The target node's cladeset strictly contains the source node's.
    Subclade,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MatchKind::Exact => write!(f, "exact"),
            MatchKind::Subclade => write!(f, "subclade"),
        }
    }
}

/// Why an event could not be placed on the target tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmappedReason {
    /// The event names no node of the source tree.
    UnknownSourceNode,
    /// The source node has no taxa below it.
    EmptyCladeset,
    /// None of the source node's taxa is a leaf of the target tree.
    NoSharedLeaves,
    /// Some taxa are missing from the target tree, so no node contains all.
    NoContainingNode,
}

impl fmt::Display for UnmappedReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            UnmappedReason::UnknownSourceNode => "unknown_source_node",
            UnmappedReason::EmptyCladeset => "empty_cladeset",
            UnmappedReason::NoSharedLeaves => "no_shared_leaves",
            UnmappedReason::NoContainingNode => "no_containing_node",
        };
        write!(f, "{s}")
    }
}

/// Result of mapping one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MappingOutcome {
    Mapped {
        target_id: String,
        #[serde(skip)]
        target_vertex: VertexIndex,
        kind: MatchKind,
    },
    Unmapped {
        reason: UnmappedReason,
    },
}

impl MappingOutcome {
    pub fn is_mapped(&self) -> bool {
        matches!(self, MappingOutcome::Mapped { .. })
    }

    /// Returns the target node id, if mapped.
    pub fn target_id(&self) -> Option<&str> {
        match self {
            MappingOutcome::Mapped { target_id, .. } => Some(target_id),
            MappingOutcome::Unmapped { .. } => None,
        }
    }

    /// Returns the match kind, if mapped.
    pub fn kind(&self) -> Option<MatchKind> {
        match self {
            MappingOutcome::Mapped { kind, .. } => Some(*kind),
            MappingOutcome::Unmapped { .. } => None,
        }
    }

    /// Returns the reason, if unmapped.
    pub fn reason(&self) -> Option<UnmappedReason> {
        match self {
            MappingOutcome::Mapped { .. } => None,
            MappingOutcome::Unmapped { reason } => Some(*reason),
        }
    }
}

/// One row of the mapping table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingEntry {
    pub source_id: String,
    #[serde(flatten)]
    pub outcome: MappingOutcome,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub payload: Value,
}

/// Counts of a [MappingTable].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MappingSummary {
    pub total: usize,
    pub exact: usize,
    pub subclade: usize,
    pub unmapped: usize,
}

impl MappingSummary {
    pub fn mapped(&self) -> usize {
        self.exact + self.subclade
    }
}

impl fmt::Display for MappingSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} events: {} exact, {} subclade, {} unmapped",
            self.total, self.exact, self.subclade, self.unmapped
        )
    }
}

// =#========================================================================#=
// MAPPING TABLE
// =#========================================================================#=
/// Source node id to target node (or unmapped), in event input order.
///
/// Several source nodes may map to the same target node; nothing is merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingTable {
    entries: Vec<MappingEntry>,
    by_source: HashMap<String, usize>,
}

impl MappingTable {
    /// Creates a table from entries in input order. If a source id occurs
    /// more than once, [MappingTable::get] returns its first entry.
    pub fn from_entries(entries: Vec<MappingEntry>) -> Self {
        let mut by_source = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            by_source.entry(entry.source_id.clone()).or_insert(position);
        }
        MappingTable { entries, by_source }
    }

    /// Returns the entry of the given source node.
    pub fn get(&self, source_id: &str) -> Option<&MappingEntry> {
        self.by_source.get(source_id).map(|&i| &self.entries[i])
    }

    /// Returns all entries in input order.
    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Counts exact, subclade and unmapped entries.
    pub fn summary(&self) -> MappingSummary {
        let mut summary = MappingSummary {
            total: self.entries.len(),
            ..MappingSummary::default()
        };
        for entry in &self.entries {
            match entry.outcome.kind() {
                Some(MatchKind::Exact) => summary.exact += 1,
                Some(MatchKind::Subclade) => summary.subclade += 1,
                None => summary.unmapped += 1,
            }
        }
        summary
    }

    /// Renders the entries as a pretty-printed JSON array.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.entries)
    }

    /// Writes the entries as tab-separated values with a header line.
    ///
    /// Mapped rows leave `reason` empty; unmapped rows leave `target_id`
    /// and `match_kind` empty.
    pub fn write_tsv<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writeln!(writer, "{TSV_HEADER}")?;
        for entry in &self.entries {
            let target_id = entry.outcome.target_id().unwrap_or_default();
            let kind = entry.outcome.kind().map(|k| k.to_string()).unwrap_or_default();
            let reason = entry.outcome.reason().map(|r| r.to_string()).unwrap_or_default();
            writeln!(writer, "{}\t{target_id}\t{kind}\t{reason}", entry.source_id)?;
        }
        writer.flush()
    }
}
