use crate::error::Result;
use crate::index::{Cladeset, IndexedTree};
use crate::matcher::CladeMatcher;
use crate::model::VertexIndex;

/// Walks from a member leaf up the parent chain and returns the first
/// vertex whose cladeset contains the query.
///
/// The start is the member with the smallest label index among those present
/// in the opposite tree, which makes runs deterministic. Since every
/// containing vertex is an ancestor of every member leaf, the first containing
/// vertex on the path is the minimal one. The path includes the leaf itself,
/// so a singleton query maps to its leaf.
#[derive(Debug, Clone, Copy, Default)]
pub struct AncestralWalkMatcher;

impl CladeMatcher for AncestralWalkMatcher {
    fn find_minimal_containing_node(
        &self,
        target_leaf_set: &Cladeset,
        opposite: &IndexedTree,
    ) -> Result<Option<VertexIndex>> {
        let index = opposite.index();
        let Some(start) = target_leaf_set
            .iter()
            .find_map(|label| index.leaf_vertex(label))
        else {
            return Ok(None);
        };

        let found = opposite
            .tree()
            .path_to_root(start)
            .map(|vertex| vertex.index())
            .find(|&vertex| index.cladeset(vertex).is_superset_of(target_leaf_set));
        Ok(found)
    }
}
