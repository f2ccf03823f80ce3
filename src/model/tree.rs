//! Provides the rooted tree representation.
//!
//! Provides core data structures for representing phylogenetic trees:
//! * [PhyloTree] - Main tree structure using the arena pattern
//!   for efficient memory layout, with leaves pointing into a shared
//!   [LeafLabelMap].
//! * [VertexIndex] as type used to index vertices in tree

use crate::model::leaf_label_map::{LabelIndex, LeafLabelMap};
use crate::model::vertex::{BranchLength, Vertex};

/// Index of a vertex in a tree (arena).
pub type VertexIndex = usize;

/// *During construction only*, index for unset root.
const NO_ROOT_SET_INDEX: VertexIndex = usize::MAX;

// =$========================================================================$=
// TREE
// =$========================================================================$=
/// A rooted phylogenetic tree represented using the arena pattern
/// on [Vertex].
///
/// Vertices are stored in a contiguous vector and referenced by
/// [VertexIndex]. Aim is to avoid referencing troubles as well as to provide
/// efficient memory layout and cache locality for traversal operations.
/// A vertex owns nothing but indices; the parent index is the weak
/// back-reference used by ancestral walks.
///
/// # Structure
/// - All vertices (root, internal, and leaves) are stored in the arena.
/// - Index of root is maintained.
/// - No assumption on order of indices is maintained.
/// - Root and internal vertices may have any positive number of children.
/// - Leaves hold a [LabelIndex] into a [LeafLabelMap] shared with the
///   other tree of a mapping run.
///
/// # Construction
/// Add vertices bottom-up: leaves first, then internal vertices referencing
/// their children, finally the root. Test validity with [`PhyloTree::is_valid()`].
///
/// # Example
/// ```
/// use clademap::model::{LeafLabelMap, PhyloTree};
/// use clademap::model::vertex::BranchLength;
///
/// // Create a tree: ((A,B,C)x,D);
/// let mut tree = PhyloTree::new(4);
/// let mut labels = LeafLabelMap::new(4);
/// let a = tree.add_leaf(None, labels.get_or_insert("A"));
/// let b = tree.add_leaf(None, labels.get_or_insert("B"));
/// let c = tree.add_leaf(None, labels.get_or_insert("C"));
/// let d = tree.add_leaf(Some(BranchLength::new(0.5)), labels.get_or_insert("D"));
/// let x = tree.add_internal_vertex(vec![a, b, c], None, Some("x".to_string()));
/// tree.add_root(vec![x, d], None, None);
///
/// assert!(tree.is_valid());
/// assert_eq!(tree.num_leaves(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct PhyloTree {
    /// Vertices of this tree (arena pattern)
    vertices: Vec<Vertex>,

    /// Index of the root of this tree
    root_index: VertexIndex,
}

// ============================================================================
// New, Getters / Accessors, etc. (pub)
// ============================================================================
impl PhyloTree {
    /// Creates a new empty tree with capacity for a binary tree with `num_leaves` leaves.
    ///
    /// # Arguments
    /// `num_leaves` - Capacity hint; trees with polytomies need fewer vertices
    pub fn new(num_leaves: usize) -> Self {
        let capacity = (2 * num_leaves).saturating_sub(1);
        PhyloTree {
            root_index: NO_ROOT_SET_INDEX,
            vertices: Vec::with_capacity(capacity),
        }
    }

    /// Adds a root to the tree, assigning a unique index, which gets returned.
    ///
    /// # Arguments
    /// * `children` - Child indices
    /// * `branch_length` - Optional length of incoming edge (for special cases, non-negative)
    /// * `label` - Optional node id
    pub fn add_root(
        &mut self,
        children: Vec<VertexIndex>,
        branch_length: Option<BranchLength>,
        label: Option<String>,
    ) -> VertexIndex {
        let index = self.vertices.len();
        for &child in &children {
            self[child].set_parent(index);
        }
        self.vertices
            .push(Vertex::new_root(index, children, label, branch_length));
        self.root_index = index;

        index
    }

    /// Adds an internal vertex to the tree, assigning a unique index, which gets returned.
    ///
    /// # Arguments
    /// * `children` - Child indices
    /// * `branch_length` - Length of incoming branch, i.e. distance to parent (non-negative)
    /// * `label` - Optional node id
    pub fn add_internal_vertex(
        &mut self,
        children: Vec<VertexIndex>,
        branch_length: Option<BranchLength>,
        label: Option<String>,
    ) -> VertexIndex {
        let index = self.vertices.len();
        for &child in &children {
            self[child].set_parent(index);
        }
        self.vertices
            .push(Vertex::new_internal(index, children, label, branch_length));

        index
    }

    /// Adds a leaf to the tree, assigning a unique index, which gets returned.
    ///
    /// # Arguments
    /// * `branch_length` - Length of incoming branch, i.e. distance to parent (non-negative)
    /// * `label_index` - Taxon of this leaf in the shared [LeafLabelMap]
    pub fn add_leaf(&mut self, branch_length: Option<BranchLength>, label_index: LabelIndex) -> VertexIndex {
        let index = self.vertices.len();
        self.vertices
            .push(Vertex::new_leaf(index, branch_length, label_index));
        index
    }

    /// Returns whether root of tree has been set.
    pub fn is_root_set(&self) -> bool {
        self.root_index != NO_ROOT_SET_INDEX
    }

    /// Returns a reference to the root vertex.
    ///
    /// # Panics
    /// Panics if the root hasn't been set and thus tree hasn't been fully constructed yet.
    pub fn root(&self) -> &Vertex {
        &self[self.root_index]
    }

    /// Returns the index of the root.
    pub fn root_index(&self) -> VertexIndex {
        self.root_index
    }

    /// Returns a reference to the vertex at the given index.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn vertex(&self, index: VertexIndex) -> &Vertex {
        &self[index]
    }

    /// Returns a reference to all vertices, ordered by index.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Sets the node id of the root or internal vertex at `index`.
    ///
    /// Only the label changes; topology is never touched.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds or refers to a leaf.
    pub fn set_label(&mut self, index: VertexIndex, label: String) {
        self.vertices[index].set_label(label);
    }

    /// Returns the id of the vertex at `index`: the taxon name for a leaf,
    /// the node label otherwise (`None` if unlabeled).
    pub fn id_of<'a>(&'a self, index: VertexIndex, labels: &'a LeafLabelMap) -> Option<&'a str> {
        let vertex = &self[index];
        match vertex.label_index() {
            Some(label_index) => labels.get_label(label_index),
            None => vertex.label(),
        }
    }

    /// Returns the number of leaves in this tree.
    pub fn num_leaves(&self) -> usize {
        self.vertices.iter().filter(|&v| v.is_leaf()).count()
    }

    /// Returns the number of internal vertices in this tree (root excluded).
    pub fn num_internal(&self) -> usize {
        self.vertices.iter().filter(|&v| v.is_internal()).count()
    }

    /// Returns the number of vertices in this tree.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Checks if all non-root vertices have branch lengths set.
    pub fn vertices_have_branch_lengths(&self) -> bool {
        self.vertices
            .iter()
            .all(|vertex| vertex.is_root() || vertex.has_branch_length())
    }

    /// Validates the tree structure and all index references.
    ///
    /// Checks:
    /// - Root index is valid and points to a Root vertex
    /// - All vertex indices match their position in the arena
    /// - There is only one root
    /// - Non-leaf vertices have at least one child
    /// - All child indices are valid and point back to correct parent
    /// - All parent indices are valid and include this vertex as a child
    /// - Root vertex has no parent set, all others have valid parent set
    ///
    /// # Returns
    /// `true` if tree is valid, `false` otherwise
    pub fn is_valid(&self) -> bool {
        // Check root index is set and within bounds
        if self.root_index == NO_ROOT_SET_INDEX || self.root_index >= self.vertices.len() {
            return false;
        }

        // Check root is actually a Root variant
        if !self.vertices[self.root_index].is_root() {
            return false;
        }

        let mut found_root = false;

        for (index, vertex) in self.vertices.iter().enumerate() {
            // Check vertex index matches its arena position
            if vertex.index() != index {
                return false;
            }

            // Check that there is only one root
            if vertex.is_root() {
                if found_root {
                    return false;
                }
                found_root = true;
            }

            // Check children references
            if let Some(children) = vertex.children() {
                if children.is_empty() {
                    return false;
                }
                for &child in children {
                    if child >= self.vertices.len() || self.vertices[child].parent_index() != Some(index) {
                        return false;
                    }
                }
            }

            // Check parent references
            if !vertex.is_root() {
                match vertex.parent_index() {
                    None => return false, // Non-root without parent
                    Some(parent_index) => {
                        if parent_index >= self.vertices.len() {
                            return false;
                        }
                        let listed = self.vertices[parent_index]
                            .children()
                            .is_some_and(|children| children.contains(&index));
                        if !listed {
                            return false;
                        }
                    }
                }
            }
        }

        true
    }
}

impl std::ops::Index<VertexIndex> for PhyloTree {
    type Output = Vertex;

    fn index(&self, index: VertexIndex) -> &Self::Output {
        &self.vertices[index]
    }
}

impl std::ops::IndexMut<VertexIndex> for PhyloTree {
    fn index_mut(&mut self, index: VertexIndex) -> &mut Self::Output {
        &mut self.vertices[index]
    }
}

// =$========================================================================$=
// ITERATORS
// =$========================================================================$=
impl PhyloTree {
    /// Returns an iterator over the tree in post-order (children before parents).
    ///
    /// Post-order traversal visits each vertex's children before visiting the vertex itself.
    /// This is what the cladeset indexer needs to aggregate leaves upward.
    pub fn post_order_iter(&self) -> PostOrderIter<'_> {
        PostOrderIter::new(self)
    }

    /// Returns an iterator over the tree in pre-order (parents before children).
    pub fn pre_order_iter(&self) -> PreOrderIter<'_> {
        PreOrderIter::new(self)
    }

    /// Returns an iterator from the vertex at `start` (inclusive) up to the root.
    ///
    /// # Example
    /// ```
    /// use clademap::model::{LeafLabelMap, PhyloTree};
    ///
    /// let mut tree = PhyloTree::new(3);
    /// let mut labels = LeafLabelMap::new(3);
    /// let a = tree.add_leaf(None, labels.get_or_insert("A"));
    /// let b = tree.add_leaf(None, labels.get_or_insert("B"));
    /// let c = tree.add_leaf(None, labels.get_or_insert("C"));
    /// let ab = tree.add_internal_vertex(vec![a, b], None, None);
    /// let root = tree.add_root(vec![ab, c], None, None);
    ///
    /// let path: Vec<_> = tree.path_to_root(a).map(|v| v.index()).collect();
    /// assert_eq!(path, vec![a, ab, root]);
    /// ```
    pub fn path_to_root(&self, start: VertexIndex) -> AncestorIter<'_> {
        AncestorIter {
            tree: self,
            next: Some(start),
        }
    }
}

/// Iterator for post-order traversal (children before parents).
///
/// This iterator uses a stack-based approach to traverse the tree without recursion.
/// Each vertex is visited after all its descendants have been visited.
pub struct PostOrderIter<'a> {
    tree: &'a PhyloTree,
    stack: Vec<(VertexIndex, bool)>, // (index, children_visited)
}

impl<'a> PostOrderIter<'a> {
    fn new(tree: &'a PhyloTree) -> Self {
        let mut stack = Vec::new();
        if tree.is_root_set() {
            stack.push((tree.root_index, false));
        }
        PostOrderIter { tree, stack }
    }
}

impl<'a> Iterator for PostOrderIter<'a> {
    type Item = &'a Vertex;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((index, children_visited)) = self.stack.pop() {
            let vertex = &self.tree[index];

            if children_visited || vertex.is_leaf() {
                return Some(vertex);
            }

            self.stack.push((index, true));
            // Push children reversed, so first child is processed first
            if let Some(children) = vertex.children() {
                self.stack
                    .extend(children.iter().rev().map(|&child| (child, false)));
            }
        }
        None
    }
}

/// Iterator for pre-order traversal (parents before children).
///
/// This iterator uses a stack-based approach to traverse the tree without recursion.
/// Each vertex is visited before any of its descendants.
pub struct PreOrderIter<'a> {
    tree: &'a PhyloTree,
    stack: Vec<VertexIndex>,
}

impl<'a> PreOrderIter<'a> {
    fn new(tree: &'a PhyloTree) -> Self {
        let mut stack = Vec::new();
        if tree.is_root_set() {
            stack.push(tree.root_index);
        }
        PreOrderIter { tree, stack }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = &'a Vertex;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let vertex = &self.tree[index];

        if let Some(children) = vertex.children() {
            self.stack.extend(children.iter().rev());
        }

        Some(vertex)
    }
}

/// Iterator walking parent references from a vertex up to the root.
pub struct AncestorIter<'a> {
    tree: &'a PhyloTree,
    next: Option<VertexIndex>,
}

impl<'a> Iterator for AncestorIter<'a> {
    type Item = &'a Vertex;

    fn next(&mut self) -> Option<Self::Item> {
        let vertex = &self.tree[self.next?];
        self.next = vertex.parent_index();
        Some(vertex)
    }
}
