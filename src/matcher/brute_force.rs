use crate::error::Result;
use crate::index::{Cladeset, IndexedTree};
use crate::matcher::CladeMatcher;
use crate::model::VertexIndex;
use tracing::warn;

/// Scans all vertices and keeps the smallest containing one.
///
/// Vertices are scanned in post-order, so of two containing vertices with
/// equal cladesets (a unary vertex and its child) the lower one is kept, as
/// in an ancestral walk. Such a tie is logged as a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct BruteForceMatcher;

impl CladeMatcher for BruteForceMatcher {
    fn find_minimal_containing_node(
        &self,
        target_leaf_set: &Cladeset,
        opposite: &IndexedTree,
    ) -> Result<Option<VertexIndex>> {
        if target_leaf_set.is_empty() {
            return Ok(None);
        }

        let mut best: Option<(VertexIndex, usize)> = None;
        for vertex in opposite.tree().post_order_iter() {
            let candidate = opposite.cladeset(vertex.index());
            if !candidate.is_superset_of(target_leaf_set) {
                continue;
            }
            let size = candidate.len();
            match best {
                Some((_, best_size)) if size > best_size => {}
                Some((kept, best_size)) if size == best_size => {
                    warn!(
                        kept,
                        ignored = vertex.index(),
                        size,
                        "two containing vertices with equal cladesets"
                    );
                }
                _ => best = Some((vertex.index(), size)),
            }
        }

        Ok(best.map(|(vertex, _)| vertex))
    }
}
