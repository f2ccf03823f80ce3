//! Data model for rooted, possibly multifurcating phylogenetic trees.
//!
//! # Tree representation
//! Trees are represented by [PhyloTree], which uses the arena pattern to store
//! [Vertex] nodes. Each vertex is either a `Root`, `Internal`, or `Leaf`,
//! referenced by [VertexIndex]. Root and internal vertices own an ordered list
//! of child indices and an optional node label; leaves hold a [LabelIndex].
//!
//! # Label handling
//! The source and target tree of a mapping run share one [LeafLabelMap], so a
//! [LabelIndex] names the same taxon in both trees. During parsing, labels
//! flow through a [LabelResolver], which applies the configured
//! [TaxonNormalization] before storing them.

pub mod label_resolver;
pub mod leaf_label_map;
pub mod tree;
pub mod vertex;

pub use label_resolver::{LabelResolver, TaxonNormalization};
pub use leaf_label_map::{LabelIndex, LeafLabelMap};
pub use tree::{PhyloTree, VertexIndex};
pub use vertex::{BranchLength, Vertex};
