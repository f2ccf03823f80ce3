//! Deterministic labels for internal nodes.
//!
//! Internal nodes serve as correspondence keys and as output labels, so every
//! one of them needs an id. A [NodeLabeler] assigns `{prefix}{counter}` labels
//! (zero-padded, e.g. `NODE_0000000`) in post-order to root and internal
//! vertices that lack one. Existing labels are kept unless
//! [NodeLabeler::with_overwrite] is set or they are not unique within the
//! tree (e.g. repeated support values like `100`), and a generated label
//! never collides with an id already present in the tree.

use crate::model::{LeafLabelMap, PhyloTree, VertexIndex};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

/// Default prefix of generated labels.
pub const DEFAULT_LABEL_PREFIX: &str = "NODE_";

/// Default number of digits of generated labels.
pub const DEFAULT_LABEL_WIDTH: usize = 7;

/// Assigns generated labels to unlabeled internal nodes.
///
/// The counter lives in the labeler, so one value labels the trees of one run
/// and a fresh labeler (or [NodeLabeler::reset]) reproduces the same labels.
///
/// # Example
/// ```
/// use clademap::labeler::NodeLabeler;
/// use clademap::model::{LeafLabelMap, PhyloTree};
///
/// let mut labels = LeafLabelMap::new(3);
/// let mut tree = PhyloTree::new(3);
/// let a = tree.add_leaf(None, labels.get_or_insert("A"));
/// let b = tree.add_leaf(None, labels.get_or_insert("B"));
/// let c = tree.add_leaf(None, labels.get_or_insert("C"));
/// let ab = tree.add_internal_vertex(vec![a, b], None, None);
/// let root = tree.add_root(vec![ab, c], None, None);
///
/// let mut labeler = NodeLabeler::new();
/// assert_eq!(labeler.label_tree(&mut tree, &labels), 2);
/// assert_eq!(tree.vertex(ab).label(), Some("NODE_0000000"));
/// assert_eq!(tree.vertex(root).label(), Some("NODE_0000001"));
/// ```
#[derive(Debug, Clone)]
pub struct NodeLabeler {
    prefix: String,
    width: usize,
    overwrite: bool,
    counter: usize,
}

impl Default for NodeLabeler {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeLabeler {
    /// Creates a labeler with prefix `NODE_`, width 7, counter at zero.
    pub fn new() -> Self {
        NodeLabeler {
            prefix: DEFAULT_LABEL_PREFIX.to_string(),
            width: DEFAULT_LABEL_WIDTH,
            overwrite: false,
            counter: 0,
        }
    }

    /// Sets the prefix of generated labels.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the minimum number of digits of generated labels.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Whether existing internal labels (e.g. support values) are replaced.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Returns the value the next generated label would use.
    pub fn counter(&self) -> usize {
        self.counter
    }

    /// Rewinds the counter to zero.
    pub fn reset(&mut self) {
        self.counter = 0;
    }

    /// Labels every root and internal vertex of `tree` lacking a label,
    /// visiting them in post-order. Returns the number of labels assigned.
    ///
    /// A non-leaf label that repeats another id of the tree (another internal
    /// label or a taxon name) is treated as missing, as are all labels when
    /// overwriting. Only labels change; topology and leaf sets are untouched.
    pub fn label_tree(&mut self, tree: &mut PhyloTree, labels: &LeafLabelMap) -> usize {
        let repeated = repeated_labels(tree, labels);
        if !self.overwrite {
            for (label, count) in &repeated {
                warn!(label = %label, count, "internal label is not unique, replacing it");
            }
        }

        let targets: Vec<VertexIndex> = tree
            .post_order_iter()
            .filter(|v| !v.is_leaf())
            .filter(|v| match v.label() {
                None => true,
                Some(label) => self.overwrite || repeated.contains_key(label),
            })
            .map(|v| v.index())
            .collect();

        // Ids that stay in the tree and must not be reused
        let relabeled: HashSet<VertexIndex> = targets.iter().copied().collect();
        let mut taken: HashSet<String> = tree
            .vertices()
            .iter()
            .filter(|v| !relabeled.contains(&v.index()))
            .filter_map(|v| tree.id_of(v.index(), labels))
            .map(str::to_string)
            .collect();

        for &index in &targets {
            let label = self.next_free_label(&taken);
            taken.insert(label.clone());
            tree.set_label(index, label);
        }

        debug!(assigned = targets.len(), next = self.counter, "labeled internal nodes");
        targets.len()
    }

    fn next_free_label(&mut self, taken: &HashSet<String>) -> String {
        loop {
            let label = format!("{}{:0width$}", self.prefix, self.counter, width = self.width);
            self.counter += 1;
            if !taken.contains(&label) {
                return label;
            }
        }
    }
}

/// Counts non-leaf labels that occur more than once among the ids of `tree`,
/// taxon names included.
fn repeated_labels(tree: &PhyloTree, labels: &LeafLabelMap) -> BTreeMap<String, usize> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for vertex in tree.vertices() {
        if let Some(label) = vertex.label() {
            *counts.entry(label).or_default() += 1;
        }
    }
    for vertex in tree.vertices().iter().filter(|v| v.is_leaf()) {
        if let Some(taxon) = tree.id_of(vertex.index(), labels) {
            if let Some(count) = counts.get_mut(taxon) {
                *count += 1;
            }
        }
    }
    counts
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|(label, count)| (label.to_string(), count))
        .collect()
}
