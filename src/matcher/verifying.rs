use crate::error::{MappingError, Result};
use crate::index::{Cladeset, IndexedTree};
use crate::matcher::{AncestralWalkMatcher, BruteForceMatcher, CladeMatcher};
use crate::model::VertexIndex;

/// Runs the ancestral walk and the brute-force scan and checks that they
/// agree.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerifyingMatcher;

impl CladeMatcher for VerifyingMatcher {
    fn find_minimal_containing_node(
        &self,
        target_leaf_set: &Cladeset,
        opposite: &IndexedTree,
    ) -> Result<Option<VertexIndex>> {
        let walk = AncestralWalkMatcher.find_minimal_containing_node(target_leaf_set, opposite)?;
        let brute_force =
            BruteForceMatcher.find_minimal_containing_node(target_leaf_set, opposite)?;
        if walk != brute_force {
            return Err(MappingError::AmbiguousMatch {
                source_id: None,
                walk,
                brute_force,
            });
        }
        Ok(walk)
    }
}
