//! Per-vertex cladesets and reverse lookups of one tree.

use crate::error::{MappingError, Result, TreeRole};
use crate::index::cladeset::Cladeset;
use crate::model::{LabelIndex, LeafLabelMap, PhyloTree, Vertex, VertexIndex};
use std::collections::HashMap;
use tracing::debug;

// =#========================================================================#=
// CLADE INDEX
// =#========================================================================#=
/// Leaf sets of all vertices of a [PhyloTree], computed once and read-only
/// afterwards.
///
/// Besides the cladesets (stored parallel to the tree's arena), the index
/// holds the reverse leaf index (taxon to leaf vertex) used to start ancestral
/// walks, and a lookup from node id (taxon name or internal label) to vertex.
#[derive(Debug, Clone)]
pub struct CladeIndex {
    role: TreeRole,
    cladesets: Vec<Cladeset>,
    leaf_vertices: Vec<Option<VertexIndex>>,
    ids: HashMap<String, VertexIndex>,
}

impl CladeIndex {
    /// Builds the index in a single post-order traversal of `tree`.
    ///
    /// `labels` must be the map the tree's leaves point into; its size is the
    /// leaf universe of all cladesets.
    ///
    /// # Errors
    /// [MappingError::MalformedTree] if the tree has no root, a taxon occurs at
    /// two leaves, a leaf label lies outside the universe, a non-leaf vertex
    /// has no children, two vertices share an id, or parent and child
    /// references disagree.
    pub fn build(tree: &PhyloTree, labels: &LeafLabelMap, role: TreeRole) -> Result<Self> {
        if !tree.is_root_set() {
            return Err(MappingError::malformed(role, "tree has no root"));
        }

        let universe = labels.num_labels();
        let mut cladesets = vec![Cladeset::empty(universe); tree.num_vertices()];
        let mut leaf_vertices: Vec<Option<VertexIndex>> = vec![None; universe];

        for vertex in tree.post_order_iter() {
            let index = vertex.index();
            match vertex {
                Vertex::Leaf { label_index, .. } => {
                    let label_index = *label_index;
                    if label_index >= universe {
                        return Err(MappingError::malformed(
                            role,
                            format!(
                                "leaf {index} refers to label {label_index}, but only {universe} taxa are known"
                            ),
                        ));
                    }
                    if let Some(previous) = leaf_vertices[label_index] {
                        return Err(MappingError::malformed(
                            role,
                            format!(
                                "taxon '{}' appears at leaves {previous} and {index}",
                                &labels[label_index]
                            ),
                        ));
                    }
                    leaf_vertices[label_index] = Some(index);
                    cladesets[index].insert(label_index);
                }
                Vertex::Root { children, .. } | Vertex::Internal { children, .. } => {
                    if children.is_empty() {
                        return Err(MappingError::malformed(
                            role,
                            format!("non-leaf vertex {index} has no children"),
                        ));
                    }
                    let mut set = Cladeset::empty(universe);
                    for &child in children {
                        set.union_with(&cladesets[child]);
                    }
                    cladesets[index] = set;
                }
            }
        }

        if !tree.is_valid() {
            return Err(MappingError::malformed(
                role,
                "parent and child references are inconsistent",
            ));
        }

        let mut ids = HashMap::with_capacity(tree.num_vertices());
        for vertex in tree.pre_order_iter() {
            let index = vertex.index();
            if let Some(id) = tree.id_of(index, labels) {
                if let Some(previous) = ids.insert(id.to_string(), index) {
                    return Err(MappingError::malformed(
                        role,
                        format!("node id '{id}' is used by vertices {previous} and {index}"),
                    ));
                }
            }
        }

        debug!(
            %role,
            vertices = tree.num_vertices(),
            leaves = leaf_vertices.iter().flatten().count(),
            universe,
            "built clade index"
        );

        Ok(CladeIndex {
            role,
            cladesets,
            leaf_vertices,
            ids,
        })
    }

    /// Returns the role of the indexed tree.
    pub fn role(&self) -> TreeRole {
        self.role
    }

    /// Returns the leaf set of the vertex at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn cladeset(&self, index: VertexIndex) -> &Cladeset {
        &self.cladesets[index]
    }

    /// Returns all cladesets, parallel to the tree's arena.
    pub fn cladesets(&self) -> &[Cladeset] {
        &self.cladesets
    }

    /// Returns the leaf vertex carrying `label`, if the taxon is in this tree.
    pub fn leaf_vertex(&self, label: LabelIndex) -> Option<VertexIndex> {
        self.leaf_vertices.get(label).copied().flatten()
    }

    /// Returns whether the taxon `label` is a leaf of this tree.
    pub fn has_leaf(&self, label: LabelIndex) -> bool {
        self.leaf_vertex(label).is_some()
    }

    /// Returns the vertex with the given node id.
    pub fn vertex_by_id(&self, id: &str) -> Option<VertexIndex> {
        self.ids.get(id).copied()
    }

    /// Returns the number of taxa in the shared universe.
    pub fn universe(&self) -> usize {
        self.leaf_vertices.len()
    }

    /// Returns the number of taxa of the universe present in this tree.
    pub fn num_present_leaves(&self) -> usize {
        self.leaf_vertices.iter().flatten().count()
    }
}

// =#========================================================================#=
// INDEXED TREE
// =#========================================================================#=
/// A tree together with its [CladeIndex].
///
/// Only shared references are handed out, so an indexed tree can be queried
/// from several threads at once.
#[derive(Debug, Clone)]
pub struct IndexedTree {
    tree: PhyloTree,
    index: CladeIndex,
}

impl IndexedTree {
    /// Indexes `tree`, taking ownership of it.
    ///
    /// # Errors
    /// See [CladeIndex::build].
    pub fn new(tree: PhyloTree, labels: &LeafLabelMap, role: TreeRole) -> Result<Self> {
        let index = CladeIndex::build(&tree, labels, role)?;
        Ok(IndexedTree { tree, index })
    }

    pub fn tree(&self) -> &PhyloTree {
        &self.tree
    }

    pub fn index(&self) -> &CladeIndex {
        &self.index
    }

    pub fn role(&self) -> TreeRole {
        self.index.role()
    }

    /// Returns the leaf set of the vertex at `index`.
    pub fn cladeset(&self, index: VertexIndex) -> &Cladeset {
        self.index.cladeset(index)
    }

    /// Gives the tree back, dropping the index.
    pub fn into_tree(self) -> PhyloTree {
        self.tree
    }
}
