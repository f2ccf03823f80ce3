//! Cladeset matching.
//!
//! Given a set of taxa, find the smallest vertex of a tree whose cladeset
//! contains it. Cladesets of one tree form a laminar family (any two are
//! nested or disjoint), so the containing vertices lie on a single root path
//! and the smallest one is unique up to unary vertices.
//!
//! Two strategies are provided:
//! * [AncestralWalkMatcher] (default) walks up from one member leaf and stops
//!   at the first containing vertex, O(height) per query.
//! * [BruteForceMatcher] scans every vertex, O(vertices) per query; kept as
//!   the reference the walk is checked against.
//!
//! [VerifyingMatcher] runs both and fails if they disagree.

mod ancestral_walk;
mod brute_force;
mod verifying;

pub use ancestral_walk::AncestralWalkMatcher;
pub use brute_force::BruteForceMatcher;
pub use verifying::VerifyingMatcher;

use crate::error::Result;
use crate::index::{Cladeset, IndexedTree};
use crate::model::VertexIndex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Finds the minimal vertex of a tree containing a set of taxa.
pub trait CladeMatcher {
    /// Returns the vertex `N` of `opposite` with `cladeset(N) ⊇ target_leaf_set`
    /// such that no other containing vertex has a smaller cladeset.
    ///
    /// Returns `Ok(None)` if no vertex contains the whole set, and for an
    /// empty set.
    ///
    /// # Errors
    /// Only [VerifyingMatcher] fails, with
    /// [MappingError::AmbiguousMatch](crate::error::MappingError::AmbiguousMatch).
    fn find_minimal_containing_node(
        &self,
        target_leaf_set: &Cladeset,
        opposite: &IndexedTree,
    ) -> Result<Option<VertexIndex>>;
}

/// Selects the [CladeMatcher] used by a run.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStrategy {
    /// Walk up from a member leaf.
    #[default]
    AncestralWalk,
    /// Scan all vertices.
    BruteForce,
    /// Run both and fail on disagreement.
    Verified,
}

impl CladeMatcher for MatchStrategy {
    fn find_minimal_containing_node(
        &self,
        target_leaf_set: &Cladeset,
        opposite: &IndexedTree,
    ) -> Result<Option<VertexIndex>> {
        match self {
            MatchStrategy::AncestralWalk => {
                AncestralWalkMatcher.find_minimal_containing_node(target_leaf_set, opposite)
            }
            MatchStrategy::BruteForce => {
                BruteForceMatcher.find_minimal_containing_node(target_leaf_set, opposite)
            }
            MatchStrategy::Verified => {
                VerifyingMatcher.find_minimal_containing_node(target_leaf_set, opposite)
            }
        }
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MatchStrategy::AncestralWalk => write!(f, "ancestral-walk"),
            MatchStrategy::BruteForce => write!(f, "brute-force"),
            MatchStrategy::Verified => write!(f, "verified"),
        }
    }
}
