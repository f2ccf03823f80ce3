//! Newick writing of [PhyloTree]s.

use crate::model::{BranchLength, LeafLabelMap, PhyloTree, VertexIndex};
use crate::parser::utils::quote_label;
use std::fs::File;
use std::io::{self, BufWriter, Write};

/// Extra buffer in Newick string length/capacity estimate
const BUFFER_CHARS: usize = 10;

/// Style for serializing a tree to Newick format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NewickStyle {
    /// Leaf labels and, where set, labels of root and internal vertices
    #[default]
    Labeled,
    /// Leaf labels only
    LeavesOnly,
}

/// Writes a tree to a file in Newick format, followed by a newline.
///
/// # Errors
/// Returns an I/O error if writing fails.
pub fn write_newick_file(
    file: File,
    tree: &PhyloTree,
    leaf_label_map: &LeafLabelMap,
    style: NewickStyle,
) -> io::Result<()> {
    let mut writer = BufWriter::new(file);
    writer.write_all(to_newick(style, tree, leaf_label_map).as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}

/// Returns the Newick representation of this tree with closing semicolon.
///
/// Children keep their order, labels are quoted where necessary, and branch
/// lengths (including one on the root) are written when present.
///
/// # Example
/// ```
/// use clademap::model::{BranchLength, LeafLabelMap, PhyloTree};
/// use clademap::newick::{NewickStyle, to_newick};
///
/// let mut tree = PhyloTree::new(3);
/// let mut labels = LeafLabelMap::new(3);
/// let a = tree.add_leaf(Some(BranchLength::new(1.0)), labels.get_or_insert("A"));
/// let b = tree.add_leaf(Some(BranchLength::new(2.5)), labels.get_or_insert("B"));
/// let c = tree.add_leaf(None, labels.get_or_insert("C c"));
/// tree.add_root(vec![a, b, c], None, Some("NODE_0000000".to_string()));
///
/// assert_eq!(to_newick(NewickStyle::Labeled, &tree, &labels), "(A:1,B:2.5,'C c')NODE_0000000;");
/// assert_eq!(to_newick(NewickStyle::LeavesOnly, &tree, &labels), "(A:1,B:2.5,'C c');");
/// ```
pub fn to_newick(style: NewickStyle, tree: &PhyloTree, leaf_label_map: &LeafLabelMap) -> String {
    let mut newick = String::with_capacity(estimate_newick_len(tree, leaf_label_map));
    if tree.is_root_set() {
        build_newick(tree, &mut newick, tree.root_index(), style, leaf_label_map);
    }
    newick.push(';');
    newick
}

fn build_newick_branch_length(newick: &mut String, branch_length: Option<BranchLength>) {
    if let Some(branch_length) = branch_length {
        newick.push(':');
        newick.push_str(&(*branch_length).to_string());
    }
}

/// Pending work while writing a subtree.
enum Step {
    /// Write the vertex: a leaf directly, an internal vertex by scheduling its children
    Open(VertexIndex),
    /// Write `)`, label and branch length of an internal vertex
    Close(VertexIndex),
    Comma,
}

/// Writes the subtree at `index` using an explicit stack of [Step]s, so deep
/// trees do not grow the call stack.
fn build_newick(
    tree: &PhyloTree,
    newick: &mut String,
    index: VertexIndex,
    style: NewickStyle,
    leaf_label_map: &LeafLabelMap,
) {
    let mut steps = vec![Step::Open(index)];

    while let Some(step) = steps.pop() {
        match step {
            Step::Comma => newick.push(','),
            Step::Open(index) => {
                let vertex = &tree[index];
                match (vertex.label_index(), vertex.children()) {
                    (Some(label_index), _) => {
                        let label = leaf_label_map.get_label(label_index).unwrap_or_default();
                        newick.push_str(&quote_label(label));
                        build_newick_branch_length(newick, vertex.branch_length());
                    }
                    (None, Some(children)) => {
                        newick.push('(');
                        steps.push(Step::Close(index));
                        for (i, &child) in children.iter().enumerate().rev() {
                            steps.push(Step::Open(child));
                            if i > 0 {
                                steps.push(Step::Comma);
                            }
                        }
                    }
                    (None, None) => build_newick_branch_length(newick, vertex.branch_length()),
                }
            }
            Step::Close(index) => {
                let vertex = &tree[index];
                newick.push(')');
                if style == NewickStyle::Labeled {
                    if let Some(label) = vertex.label() {
                        newick.push_str(&quote_label(label));
                    }
                }
                build_newick_branch_length(newick, vertex.branch_length());
            }
        }
    }
}

/// Estimates the length of a Newick string for a given tree, to pre-allocate.
fn estimate_newick_len(tree: &PhyloTree, leaf_label_map: &LeafLabelMap) -> usize {
    // Per vertex: one of "(", ")" or "," plus a generated label
    const VERTEX_CHARS: usize = 14;
    // Branch lengths: ~20 chars each (e.g., ":0.009529961339106089")
    const BRANCH_LENGTH_CHARS: usize = 20;

    let label_capacity: usize = leaf_label_map.labels().iter().map(|s| s.len() + 2).sum();
    let branch_capacity = if tree.vertices_have_branch_lengths() {
        tree.num_vertices() * BRANCH_LENGTH_CHARS
    } else {
        0
    };

    tree.num_vertices() * VERTEX_CHARS + label_capacity + branch_capacity + BUFFER_CHARS
}
