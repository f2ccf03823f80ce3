//! Property tests: cladeset matching on random trees.
//!
//! Source trees are random binary trees. Target trees are either independent
//! random trees over the same taxa or the source with random internal edges
//! collapsed into polytomies, the situation the mapper is built for.
//!
//! Trees with thousands of leaves are built directly through the
//! [PhyloTree] builders and run with few cases.

use clademap::error::TreeRole;
use clademap::index::{Cladeset, IndexedTree};
use clademap::labeler::NodeLabeler;
use clademap::mapper::{EventMapper, EventRecord, MatchKind};
use clademap::matcher::{AncestralWalkMatcher, BruteForceMatcher, CladeMatcher, MatchStrategy};
use clademap::model::{LeafLabelMap, PhyloTree, TaxonNormalization, VertexIndex};
use clademap::newick::parse_pair;
use proptest::prelude::*;
use std::collections::HashMap;
use std::mem;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Node {
    Leaf(usize),
    Inner(Vec<Node>),
}

/// Builds a random tree over taxa `0..num_taxa` by repeatedly joining two
/// subtrees picked by `merges`; whatever is left joins at the root.
fn random_tree(num_taxa: usize, merges: &[(usize, usize)]) -> Node {
    let mut nodes: Vec<Node> = (0..num_taxa).map(Node::Leaf).collect();
    for &(a, b) in merges {
        if nodes.len() <= 2 {
            break;
        }
        let first = nodes.swap_remove(a % nodes.len());
        let second = nodes.swap_remove(b % nodes.len());
        nodes.push(Node::Inner(vec![first, second]));
    }
    Node::Inner(nodes)
}

/// Writes `node` as Newick, naming the k-th internal vertex in pre-order
/// `s{k}` and splicing non-root vertices whose `collapse` flag is set into
/// their parent. Returns the names of collapsed vertices via `collapsed`.
fn write_newick(node: &Node, collapse: &[bool], named: bool, collapsed: &mut Vec<String>) -> String {
    let mut counter = 0;
    let body = write_node(node, collapse, named, &mut counter, collapsed);
    format!("{body};")
}

fn write_node(
    node: &Node,
    collapse: &[bool],
    named: bool,
    counter: &mut usize,
    collapsed: &mut Vec<String>,
) -> String {
    match node {
        Node::Leaf(taxon) => format!("t{taxon}"),
        Node::Inner(children) => {
            let name = format!("s{counter}");
            *counter += 1;
            let parts = write_children(children, collapse, named, counter, collapsed);
            let label = if named { name } else { String::new() };
            format!("({}){label}", parts.join(","))
        }
    }
}

fn write_children(
    children: &[Node],
    collapse: &[bool],
    named: bool,
    counter: &mut usize,
    collapsed: &mut Vec<String>,
) -> Vec<String> {
    let mut parts = Vec::new();
    for child in children {
        match child {
            Node::Inner(grandchildren) if collapse.get(*counter).copied().unwrap_or(false) => {
                collapsed.push(format!("s{counter}"));
                *counter += 1;
                parts.extend(write_children(grandchildren, collapse, named, counter, collapsed));
            }
            _ => parts.push(write_node(child, collapse, named, counter, collapsed)),
        }
    }
    parts
}

struct Pair {
    source: IndexedTree,
    target: IndexedTree,
    labels: LeafLabelMap,
}

fn index_pair(source: &str, target: &str) -> Pair {
    let mut pair = parse_pair(source, target, TaxonNormalization::Verbatim).unwrap();
    let mut labeler = NodeLabeler::new();
    labeler.label_tree(&mut pair.source, &pair.labels);
    labeler.reset();
    labeler.label_tree(&mut pair.target, &pair.labels);
    Pair {
        source: IndexedTree::new(pair.source, &pair.labels, TreeRole::Source).unwrap(),
        target: IndexedTree::new(pair.target, &pair.labels, TreeRole::Target).unwrap(),
        labels: pair.labels,
    }
}

/// Independent random source and target over the same taxa.
fn arb_independent_pair() -> impl Strategy<Value = (String, String, usize)> {
    (3usize..40).prop_flat_map(|num_taxa| {
        (
            prop::collection::vec((any::<usize>(), any::<usize>()), num_taxa),
            prop::collection::vec((any::<usize>(), any::<usize>()), num_taxa),
        )
            .prop_map(move |(source_merges, target_merges)| {
                let mut unused = Vec::new();
                let source = write_newick(&random_tree(num_taxa, &source_merges), &[], true, &mut unused);
                let target = write_newick(&random_tree(num_taxa, &target_merges), &[], false, &mut unused);
                (source, target, num_taxa)
            })
    })
}

/// Random source and the same tree with random edges collapsed; also
/// returns the names of source vertices lost in the target.
fn arb_collapsed_pair() -> impl Strategy<Value = (String, String, Vec<String>)> {
    (3usize..40).prop_flat_map(|num_taxa| {
        (
            prop::collection::vec((any::<usize>(), any::<usize>()), num_taxa),
            prop::collection::vec(prop::bool::weighted(0.4), num_taxa),
        )
            .prop_map(move |(merges, collapse)| {
                let tree = random_tree(num_taxa, &merges);
                let mut unused = Vec::new();
                let source = write_newick(&tree, &[], true, &mut unused);
                let mut collapsed = Vec::new();
                let target = write_newick(&tree, &collapse, true, &mut collapsed);
                (source, target, collapsed)
            })
    })
}

/// Random binary tree over taxa `t0..t{num_taxa}` built in memory; internal
/// vertices are named `s{k}` in creation order and the root `root`.
fn random_phylo_tree(num_taxa: usize, merges: &[(usize, usize)], labels: &mut LeafLabelMap) -> PhyloTree {
    let mut tree = PhyloTree::new(num_taxa);
    let mut tops: Vec<VertexIndex> = (0..num_taxa)
        .map(|i| tree.add_leaf(None, labels.get_or_insert(&format!("t{i}"))))
        .collect();
    for (counter, &(a, b)) in merges.iter().enumerate() {
        if tops.len() <= 2 {
            break;
        }
        let first = tops.swap_remove(a % tops.len());
        let second = tops.swap_remove(b % tops.len());
        tops.push(tree.add_internal_vertex(vec![first, second], None, Some(format!("s{counter}"))));
    }
    tree.add_root(tops, None, Some("root".to_string()));
    tree
}

/// `((((t0,t1)s1,t2)s2 ... ,t{n-1})root` built in memory.
fn ladder_phylo_tree(num_taxa: usize, labels: &mut LeafLabelMap) -> PhyloTree {
    let mut tree = PhyloTree::new(num_taxa);
    let mut spine = tree.add_leaf(None, labels.get_or_insert("t0"));
    for i in 1..num_taxa - 1 {
        let leaf = tree.add_leaf(None, labels.get_or_insert(&format!("t{i}")));
        spine = tree.add_internal_vertex(vec![spine, leaf], None, Some(format!("s{i}")));
    }
    let last = tree.add_leaf(None, labels.get_or_insert(&format!("t{}", num_taxa - 1)));
    tree.add_root(vec![spine, last], None, Some("root".to_string()));
    tree
}

/// Copy of `source` in which internal non-root vertices flagged in
/// `collapse` (by vertex index) are spliced into their parent. Kept vertices
/// keep their id.
fn collapsed_copy(source: &PhyloTree, collapse: &[bool]) -> PhyloTree {
    let mut target = PhyloTree::new(source.num_leaves());
    let mut parts: Vec<Vec<VertexIndex>> = vec![Vec::new(); source.num_vertices()];
    for vertex in source.post_order_iter() {
        let index = vertex.index();
        let Some(children) = vertex.children() else {
            let label_index = vertex.label_index().unwrap();
            parts[index] = vec![target.add_leaf(None, label_index)];
            continue;
        };
        let spliced: Vec<VertexIndex> = children
            .iter()
            .flat_map(|&child| mem::take(&mut parts[child]))
            .collect();
        let label = vertex.label().map(str::to_string);
        if vertex.is_root() {
            target.add_root(spliced, None, label);
        } else if collapse.get(index).copied().unwrap_or(false) {
            parts[index] = spliced;
        } else {
            parts[index] = vec![target.add_internal_vertex(spliced, None, label)];
        }
    }
    target
}

/// Taxon count, merge picks and collapse flags for a large tree.
fn arb_large_tree() -> impl Strategy<Value = (usize, Vec<(usize, usize)>, Vec<bool>)> {
    (1_000usize..10_000).prop_flat_map(|num_taxa| {
        (
            Just(num_taxa),
            prop::collection::vec((any::<usize>(), any::<usize>()), num_taxa),
            prop::collection::vec(prop::bool::weighted(0.4), 2 * num_taxa),
        )
    })
}

fn is_ancestor_or_self(tree: &IndexedTree, descendant: usize, ancestor: usize) -> bool {
    tree.tree()
        .path_to_root(descendant)
        .any(|vertex| vertex.index() == ancestor)
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Walking up and scanning all vertices find the same vertex for every
    /// source clade.
    #[test]
    fn strategies_agree_on_source_clades((source, target, _) in arb_independent_pair()) {
        let pair = index_pair(&source, &target);
        for vertex in pair.source.tree().vertices() {
            let query = pair.source.cladeset(vertex.index());
            let walk = AncestralWalkMatcher.find_minimal_containing_node(query, &pair.target).unwrap();
            let scan = BruteForceMatcher.find_minimal_containing_node(query, &pair.target).unwrap();
            prop_assert_eq!(walk, scan);
        }
    }

    /// Same for arbitrary taxon sets that need not be clades of any tree.
    #[test]
    fn strategies_agree_on_arbitrary_sets(
        (source, target, num_taxa) in arb_independent_pair(),
        members in prop::collection::vec(any::<usize>(), 1..8),
    ) {
        let pair = index_pair(&source, &target);
        let query = Cladeset::from_indices(
            pair.labels.num_labels(),
            members.iter().map(|m| pair.labels.get_index(&format!("t{}", m % num_taxa)).unwrap()),
        );
        let walk = AncestralWalkMatcher.find_minimal_containing_node(&query, &pair.target).unwrap();
        let scan = BruteForceMatcher.find_minimal_containing_node(&query, &pair.target).unwrap();
        prop_assert_eq!(walk, scan);
    }

    /// Children of every vertex partition its cladeset.
    #[test]
    fn children_partition_cladesets((source, target, _) in arb_independent_pair()) {
        let pair = index_pair(&source, &target);
        for tree in [&pair.source, &pair.target] {
            for vertex in tree.tree().vertices() {
                let Some(children) = vertex.children() else {
                    prop_assert_eq!(tree.cladeset(vertex.index()).len(), 1);
                    continue;
                };
                let parent = tree.cladeset(vertex.index());
                let mut union = Cladeset::empty(parent.universe());
                let mut total = 0;
                for &child in children {
                    union.union_with(tree.cladeset(child));
                    total += tree.cladeset(child).len();
                }
                prop_assert_eq!(&union, parent);
                prop_assert_eq!(total, parent.len());
            }
        }
    }

    /// The match contains the query and none of its children does.
    #[test]
    fn match_is_minimal(
        (source, target, num_taxa) in arb_independent_pair(),
        members in prop::collection::vec(any::<usize>(), 1..8),
    ) {
        let pair = index_pair(&source, &target);
        let query = Cladeset::from_indices(
            pair.labels.num_labels(),
            members.iter().map(|m| pair.labels.get_index(&format!("t{}", m % num_taxa)).unwrap()),
        );
        let found = AncestralWalkMatcher
            .find_minimal_containing_node(&query, &pair.target)
            .unwrap();
        prop_assert!(found.is_some());
        let found = found.unwrap();
        prop_assert!(pair.target.cladeset(found).is_superset_of(&query));
        if let Some(children) = pair.target.tree().vertex(found).children() {
            for &child in children {
                prop_assert!(!pair.target.cladeset(child).is_superset_of(&query));
            }
        }
    }

    /// On a collapsed copy of the source, surviving clades map exactly,
    /// collapsed ones map to a strictly larger clade, and nested source clades
    /// map to nested target vertices.
    #[test]
    fn collapsed_target_keeps_nesting((source, target, collapsed) in arb_collapsed_pair()) {
        let pair = index_pair(&source, &target);
        let events: Vec<EventRecord> = pair
            .source
            .tree()
            .vertices()
            .iter()
            .filter(|v| !v.is_leaf())
            .filter_map(|v| v.label())
            .map(EventRecord::bare)
            .collect();
        let table = EventMapper::new(&pair.source, &pair.target, &pair.labels, MatchStrategy::Verified)
            .map_events(&events)
            .unwrap();
        prop_assert_eq!(table.summary().unmapped, 0);

        let mut mapped: HashMap<usize, usize> = HashMap::new();
        for entry in table.entries() {
            let source_vertex = pair.source.index().vertex_by_id(&entry.source_id).unwrap();
            let target_vertex = pair.target.index().vertex_by_id(entry.outcome.target_id().unwrap()).unwrap();
            let expected = if collapsed.contains(&entry.source_id) {
                MatchKind::Subclade
            } else {
                MatchKind::Exact
            };
            prop_assert_eq!(entry.outcome.kind(), Some(expected));
            mapped.insert(source_vertex, target_vertex);
        }

        for (&inner, &inner_target) in &mapped {
            for ancestor in pair.source.tree().path_to_root(inner).skip(1) {
                let outer_target = mapped[&ancestor.index()];
                prop_assert!(is_ancestor_or_self(&pair.target, inner_target, outer_target));
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(4))]

    /// On thousands of leaves: both strategies agree, kept source vertices
    /// map exactly to the vertex with the same id, collapsed ones to a larger
    /// clade, and a vertex maps below or onto the match of its parent.
    #[test]
    fn large_collapsed_target_keeps_nesting(
        (num_taxa, merges, collapse) in arb_large_tree(),
        picks in prop::collection::vec(any::<usize>(), 40),
    ) {
        let mut labels = LeafLabelMap::new(num_taxa);
        let source = random_phylo_tree(num_taxa, &merges, &mut labels);
        let target = collapsed_copy(&source, &collapse);
        let source = IndexedTree::new(source, &labels, TreeRole::Source).unwrap();
        let target = IndexedTree::new(target, &labels, TreeRole::Target).unwrap();
        prop_assert_eq!(target.tree().num_leaves(), num_taxa);

        for pick in picks {
            let vertex = source.tree().vertex(pick % source.tree().num_vertices());
            let query = source.cladeset(vertex.index());
            let walk = AncestralWalkMatcher.find_minimal_containing_node(query, &target).unwrap();
            let scan = BruteForceMatcher.find_minimal_containing_node(query, &target).unwrap();
            prop_assert_eq!(walk, scan);
            let found = walk.unwrap();

            let was_collapsed = vertex.is_internal() && collapse[vertex.index()];
            if was_collapsed {
                prop_assert!(target.cladeset(found).len() > query.len());
            } else {
                prop_assert_eq!(target.cladeset(found), query);
                prop_assert_eq!(
                    target.tree().id_of(found, &labels),
                    source.tree().id_of(vertex.index(), &labels)
                );
            }

            if let Some(parent) = vertex.parent_index() {
                let outer = AncestralWalkMatcher
                    .find_minimal_containing_node(source.cladeset(parent), &target)
                    .unwrap()
                    .unwrap();
                prop_assert!(is_ancestor_or_self(&target, found, outer));
            }
        }
    }
}

/// Ten thousand leaves in a ladder, against a copy with every other spine
/// vertex collapsed; mapped through the parallel mapper.
#[test]
fn test_deep_ladder_maps_through_collapsed_copy() {
    let num_taxa = 10_000;
    let mut labels = LeafLabelMap::new(num_taxa);
    let source = ladder_phylo_tree(num_taxa, &mut labels);
    let collapse: Vec<bool> = (0..source.num_vertices()).map(|index| index % 4 == 2).collect();
    let target = collapsed_copy(&source, &collapse);

    let events: Vec<EventRecord> = source
        .vertices()
        .iter()
        .filter(|v| v.is_internal())
        .step_by(97)
        .filter_map(|v| v.label())
        .map(EventRecord::bare)
        .collect();
    let expected_subclades = source
        .vertices()
        .iter()
        .filter(|v| v.is_internal())
        .step_by(97)
        .filter(|v| collapse[v.index()])
        .count();

    let source = IndexedTree::new(source, &labels, TreeRole::Source).unwrap();
    let target = IndexedTree::new(target, &labels, TreeRole::Target).unwrap();
    let table = EventMapper::new(&source, &target, &labels, MatchStrategy::AncestralWalk)
        .with_parallel(true)
        .map_events(&events)
        .unwrap();

    let summary = table.summary();
    assert_eq!(summary.total, events.len());
    assert_eq!(summary.unmapped, 0);
    assert_eq!(summary.subclade, expected_subclades);
    assert!(expected_subclades > 0);

    // A collapsed spine vertex maps onto the next kept one above it
    for entry in table.entries() {
        if entry.outcome.kind() == Some(MatchKind::Subclade) {
            let source_vertex = source.index().vertex_by_id(&entry.source_id).unwrap();
            let parent = source.tree().vertex(source_vertex).parent_index().unwrap();
            assert_eq!(entry.outcome.target_id(), source.tree().id_of(parent, &labels));
        }
    }
}
