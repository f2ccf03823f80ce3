//! Clademap maps node annotations between two differently resolved rooted
//! trees over the same taxa.
//!
//! Annotations such as reassortment events are inferred on one tree (the
//! source) but should be shown on another (the target), which resolves
//! polytomies differently or collapses zero-length branches. A source node
//! corresponds to the smallest target node whose set of descendant taxa, its
//! cladeset, contains the source node's cladeset.
//!
//! Core functionality provided:
//! - Tree model: [PhyloTree](model::PhyloTree), an arena of multifurcating
//!   vertices whose leaves index into a [LeafLabelMap](model::LeafLabelMap)
//!   shared by both trees. See [crate::model].
//! - Leaf-set indexing: [IndexedTree](index::IndexedTree) stores the
//!   cladeset of every vertex as a dense bit vector, plus a reverse index
//!   from taxon to leaf. See [crate::index].
//! - Node labeling: [NodeLabeler](labeler::NodeLabeler) gives every internal
//!   node a deterministic id such as `NODE_0000042`.
//! - Matching: [CladeMatcher](matcher::CladeMatcher) implementations find the
//!   minimal containing node, either by walking up from a member leaf or by
//!   scanning all vertices. See [crate::matcher].
//! - Event mapping: [EventMapper](mapper::EventMapper) produces a
//!   [MappingTable](mapper::MappingTable) with one row per event.
//! - Collaborators: Newick reading and writing ([crate::newick]), summary
//!   JSON loading and node-data output ([crate::summary]), and complete runs
//!   from files ([crate::pipeline]).
//!
//! Limitations:
//! - Taxa missing from one of the trees are not reconciled; affected events
//!   are reported as unmapped
//! - Topology is never modified
//!
//! # Example
//! ```
//! use clademap::config::MapperConfig;
//! use clademap::mapper::{EventRecord, MatchKind};
//! use clademap::model::TaxonNormalization;
//! use clademap::newick::parse_pair;
//! use clademap::pipeline::map_trees;
//!
//! // The target collapses the source's (A,B) cherry into a polytomy
//! let pair = parse_pair(
//!     "(((A,B)TS_NODE_2,C)TS_NODE_1,D)TS_NODE_0;",
//!     "((A,B,C),D);",
//!     TaxonNormalization::Verbatim,
//! )
//! .unwrap();
//! let events = vec![EventRecord::bare("TS_NODE_2"), EventRecord::bare("TS_NODE_1")];
//!
//! let run = map_trees(&MapperConfig::default(), pair.source, pair.target, pair.labels, &events).unwrap();
//! let cherry = run.table.get("TS_NODE_2").unwrap();
//! assert_eq!(cherry.outcome.target_id(), Some("NODE_0000000"));
//! assert_eq!(cherry.outcome.kind(), Some(MatchKind::Subclade));
//! assert_eq!(run.table.get("TS_NODE_1").unwrap().outcome.kind(), Some(MatchKind::Exact));
//! ```

pub mod config;
pub mod error;
pub mod index;
pub mod labeler;
pub mod mapper;
pub mod matcher;
pub mod model;
pub mod newick;
pub mod parser;
pub mod pipeline;
pub mod summary;

pub use crate::error::{MappingError, Result, TreeRole};
