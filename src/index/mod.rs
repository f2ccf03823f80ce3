//! Leaf-set indexing.
//!
//! Every vertex of a tree is assigned its cladeset, the set of taxa below it,
//! as a dense bit vector over the leaf universe of a [LeafLabelMap](crate::model::LeafLabelMap).
//! For every non-leaf vertex the cladeset is the disjoint union of its
//! children's cladesets, so cladesets of a tree are nested along every
//! root path.

pub mod clade_index;
pub mod cladeset;

pub use clade_index::{CladeIndex, IndexedTree};
pub use cladeset::Cladeset;
