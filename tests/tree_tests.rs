use clademap::model::{BranchLength, LeafLabelMap, PhyloTree};

#[test]
fn test_building_tree() {
    let mut labels = LeafLabelMap::new(4);
    let mut tree = PhyloTree::new(4);
    let index_l1 = tree.add_leaf(Some(BranchLength::new(1.0)), labels.get_or_insert("Apteryx haastii"));
    let index_l2 = tree.add_leaf(Some(BranchLength::new(1.0)), labels.get_or_insert("Apteryx owenii"));
    let index_l3 = tree.add_leaf(Some(BranchLength::new(0.5)), labels.get_or_insert("Apteryx mantelli"));
    let index_l4 = tree.add_leaf(None, labels.get_or_insert("Apteryx australis"));
    let index_i1 = tree.add_internal_vertex(
        vec![index_l1, index_l2, index_l3],
        Some(BranchLength::new(1.5)),
        Some("kiwi".to_string()),
    );
    let index_root = tree.add_root(vec![index_i1, index_l4], None, None);

    // Counts
    assert_eq!(tree.num_leaves(), 4);
    assert_eq!(tree.num_internal(), 1);
    assert_eq!(tree.num_vertices(), 6);
    assert!(tree.is_valid());

    // Root
    let root = tree.root();
    assert_eq!(root.index(), index_root);
    assert!(root.is_root());
    assert!(!root.has_parent());

    // Leaf
    let l2 = &tree[index_l2];
    assert!(l2.is_leaf());
    assert_eq!(l2.label_index(), Some(1));
    assert_eq!(l2.parent_index(), Some(index_i1));
    assert_eq!(tree.id_of(index_l2, &labels), Some("Apteryx owenii"));

    // Internal
    let internal = &tree[index_i1];
    assert!(internal.is_internal());
    assert_eq!(internal.children().map(<[_]>::len), Some(3));
    assert_eq!(internal.branch_length(), Some(BranchLength::new(1.5)));
    assert_eq!(tree.id_of(index_i1, &labels), Some("kiwi"));
}

#[test]
fn test_path_to_root_and_relabel() {
    let mut labels = LeafLabelMap::new(3);
    let mut tree = PhyloTree::new(3);
    let a = tree.add_leaf(None, labels.get_or_insert("Porphyrio hochstetteri"));
    let b = tree.add_leaf(None, labels.get_or_insert("Porphyrio melanotus"));
    let c = tree.add_leaf(None, labels.get_or_insert("Gallirallus australis"));
    let ab = tree.add_internal_vertex(vec![a, b], None, None);
    let root = tree.add_root(vec![ab, c], None, Some("0.87".to_string()));

    let path: Vec<_> = tree.path_to_root(b).map(|v| v.index()).collect();
    assert_eq!(path, vec![b, ab, root]);
    assert_eq!(tree.path_to_root(root).count(), 1);

    tree.set_label(ab, "NODE_0000000".to_string());
    tree.set_label(root, "NODE_0000001".to_string());
    assert_eq!(tree.id_of(ab, &labels), Some("NODE_0000000"));
    assert_eq!(tree.root().label(), Some("NODE_0000001"));
}

#[test]
#[should_panic]
fn test_get_root_panics_on_empty_tree() {
    let tree = PhyloTree::new(2);
    tree.root(); // Should panic
}

// ============= Branch Length Tests =============
#[test]
fn test_branch_lengths() {
    assert_eq!(*BranchLength::new(1.234), 1.234);
    assert_eq!(BranchLength::try_new(0.0).map(|b| *b), Some(0.0));
    assert_eq!(BranchLength::try_new(-0.1), None);
    assert_eq!(BranchLength::try_new(f64::INFINITY), None);
}

#[test]
#[should_panic]
fn test_negative_branch_length() {
    let _ = BranchLength::new(-1.0);
}

// ============= LeafLabelMap Tests =============
#[test]
fn test_get_or_insert_new_label() {
    let mut map = LeafLabelMap::new(5);
    let index_wrybill = map.get_or_insert("Anarhynchus frontalis");
    assert_eq!(index_wrybill, 0);
    assert!(map.contains_label("Anarhynchus frontalis"));
}

#[test]
fn test_get_or_insert_returns_same_index_for_duplicate() {
    let mut map = LeafLabelMap::new(5);
    let index_kakapo = map.get_or_insert("Strigops habroptilus");
    let index_kea = map.get_or_insert("Nestor notabilis");
    let index_kaka = map.get_or_insert("Nestor meridionalis");
    let index_popoka = map.get_or_insert("Strigops habroptilus");

    assert_eq!(index_kakapo, index_popoka);
    assert_ne!(index_kakapo, index_kea);
    assert_ne!(index_kakapo, index_kaka);
    assert_eq!(map.num_labels(), 3);
    assert_eq!(map.get_index("Nestor notabilis"), Some(1));
}

#[test]
fn test_get_label() {
    let mut map = LeafLabelMap::new(5);
    let index_rock_wren = map.get_or_insert("Xenicus gilviventris");
    assert_eq!(map.get_label(index_rock_wren), Some("Xenicus gilviventris"));
    assert_eq!(&map[index_rock_wren], "Xenicus gilviventris");
    assert_eq!(map.get_label(7), None);
}
