use clademap::model::{LabelResolver, TaxonNormalization};
use clademap::newick::{NewickParser, NewickStyle, parse_file, parse_pair, parse_str, to_newick, write_newick_file};
use clademap::parser::byte_parser::ByteParser;
use clademap::parser::ParsingErrorType;
use std::io::Write;

// --- TESTS NEWICK STRING PARSING ---
#[test]
fn test_basic_tree() {
    let newick = "((A:1.0,B:2.0):3.0,C:4.0):0.5;";
    let (tree, leaf_map) = parse_str(newick).unwrap();

    // Test counts
    assert_eq!(tree.num_leaves(), 3);
    assert_eq!(tree.num_internal(), 1);
    assert_eq!(tree.num_vertices(), 5);
    assert_eq!(leaf_map.num_labels(), 3);

    // Test relationships
    // - Root has children (internal, C)
    let root = tree.root();
    let children = root.children().unwrap();
    assert_eq!(children.len(), 2);
    let internal = tree.vertex(children[0]);
    assert!(internal.is_internal());
    assert_eq!(internal.parent_index(), Some(root.index()));
    assert_eq!(*internal.branch_length().unwrap(), 3.0);

    // - Leaves resolved to labels
    let ab = internal.children().unwrap();
    assert_eq!(tree.id_of(ab[0], &leaf_map), Some("A"));
    assert_eq!(tree.id_of(ab[1], &leaf_map), Some("B"));
    assert_eq!(tree.id_of(children[1], &leaf_map), Some("C"));

    // - Root branch length kept
    assert_eq!(*root.branch_length().unwrap(), 0.5);
}

#[test]
fn test_multifurcation_with_internal_labels() {
    let newick = "((A,B,C,D)TS_NODE_2:0.1,(E,F)TS_NODE_3,G)TS_NODE_0;";
    let (tree, labels) = parse_str(newick).unwrap();

    assert_eq!(tree.num_leaves(), 7);
    assert_eq!(tree.num_internal(), 2);
    assert_eq!(tree.root().children().unwrap().len(), 3);
    assert_eq!(tree.root().label(), Some("TS_NODE_0"));

    let first = tree.vertex(tree.root().children().unwrap()[0]);
    assert_eq!(first.label(), Some("TS_NODE_2"));
    assert_eq!(first.children().unwrap().len(), 4);
    assert!(labels.contains_label("G"));
}

#[test]
fn test_comments_whitespace_and_quotes() {
    let newick = "[&R] ( 'Little Spotted Kiwi' [&height=1] : 1.0 ,\n\t'Baillon''s Crake':2e-1 ) 'root node' ;";
    let (tree, labels) = parse_str(newick).unwrap();

    assert!(labels.contains_label("Little Spotted Kiwi"));
    assert!(labels.contains_label("Baillon's Crake"));
    assert_eq!(tree.root().label(), Some("root node"));
    let second = tree.root().children().unwrap()[1];
    assert_eq!(*tree.vertex(second).branch_length().unwrap(), 0.2);
}

#[test]
fn test_invalid_newick_strings() {
    let cases = [
        ("A;", "single leaf"),
        ("(A,B;", "unclosed parenthesis"),
        ("(A,B)", "missing semicolon"),
        ("(A,B):x;", "bad branch length"),
        ("(A,B)[open;", "unclosed comment"),
        ("('A,B);", "unclosed quote"),
    ];
    for (newick, case) in cases {
        assert!(parse_str(newick).is_err(), "accepted {case}: {newick}");
    }
}

#[test]
fn test_error_reports_position() {
    let err = parse_str("((A,B),C;").unwrap_err();
    assert!(matches!(err.kind(), ParsingErrorType::InvalidNewickString(_)));
    assert_eq!(err.position(), 8);
}

#[test]
fn test_parse_all_shares_labels() {
    let mut newick_parser = NewickParser::new();
    let trees = newick_parser
        .parse_all(ByteParser::from_str("(A,(B,C));\n((A,B),C);\n"))
        .unwrap();
    let labels = newick_parser.into_leaf_label_map();
    assert_eq!(trees.len(), 2);
    assert_eq!(labels.num_labels(), 3);
}

#[test]
fn test_pair_with_strain_date_normalization() {
    let pair = parse_pair(
        "(('A/duck/1|2019-01-01|2019.0','A/duck/2|2019-02-01|2019.1')TS_NODE_1,A/duck/3|2019-03-01)TS_NODE_0;",
        "(A/duck/3|2019-03-01,(A/duck/2|2019-02-01,A/duck/1|2019-01-01));",
        TaxonNormalization::StrainDate,
    )
    .unwrap();
    assert_eq!(pair.labels.num_labels(), 3);
    assert_eq!(pair.source.num_leaves(), 3);
    assert_eq!(pair.target.num_leaves(), 3);
    assert!(pair.labels.contains_label("A/duck/1|2019-01-01"));
}

#[test]
fn test_resolver_continues_existing_map() {
    let (_, labels) = parse_str("(A,B);").unwrap();
    let mut newick_parser =
        NewickParser::new().with_resolver(LabelResolver::with_map(TaxonNormalization::Verbatim, labels));
    newick_parser.parse(&mut ByteParser::from_str("(B,C);")).unwrap();
    let labels = newick_parser.into_leaf_label_map();
    assert_eq!(labels.get_index("B"), Some(1));
    assert_eq!(labels.get_index("C"), Some(2));
}

// --- TESTS FILE PARSING & WRITING ---
#[test]
fn test_parse_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[tree from file]\n((A:1,B:1)x:1,(C:1,D:1)y:1)r;").unwrap();
    let (tree, labels) = parse_file(file.path()).unwrap();
    assert_eq!(tree.num_leaves(), 4);
    assert_eq!(labels.num_labels(), 4);
    assert_eq!(tree.root().label(), Some("r"));
}

#[test]
fn test_parse_missing_file() {
    let err = parse_file("does/not/exist.nwk").unwrap_err();
    assert!(matches!(err.kind(), ParsingErrorType::IoError(_)));
}

#[test]
fn test_write_then_parse_keeps_structure() {
    let newick = "(('Little Spotted Kiwi':1,B_b:0.25)n1:0.5,C:1.5,(D,E)'n 2')root;";
    let (tree, labels) = parse_str(newick).unwrap();
    let written = to_newick(NewickStyle::Labeled, &tree, &labels);
    assert_eq!(written, newick);

    let (reparsed, relabels) = parse_str(&written).unwrap();
    assert_eq!(to_newick(NewickStyle::Labeled, &reparsed, &relabels), written);
    assert_eq!(
        to_newick(NewickStyle::LeavesOnly, &tree, &labels),
        "(('Little Spotted Kiwi':1,B_b:0.25):0.5,C:1.5,(D,E));"
    );
}

#[test]
fn test_write_newick_file() {
    let (tree, labels) = parse_str("((A,B)x,C)y;").unwrap();
    let file = tempfile::NamedTempFile::new().unwrap();
    write_newick_file(std::fs::File::create(file.path()).unwrap(), &tree, &labels, NewickStyle::Labeled).unwrap();
    let content = std::fs::read_to_string(file.path()).unwrap();
    assert_eq!(content, "((A,B)x,C)y;\n");
}

/// `((((t0,t1)n1,t2)n2,t3)n3 ... ,t{n-1})root;`
fn ladder(n: usize) -> String {
    let mut newick = "(".repeat(n - 1);
    newick.push_str("t0");
    for i in 1..n - 1 {
        newick.push_str(&format!(",t{i})n{i}:0.5"));
    }
    newick.push_str(&format!(",t{})root;", n - 1));
    newick
}

#[test]
fn test_deep_ladder_round_trip() {
    let newick = ladder(10_000);
    let (tree, labels) = parse_str(&newick).unwrap();
    assert_eq!(tree.num_leaves(), 10_000);
    assert_eq!(tree.num_internal(), 9_998);
    assert_eq!(tree.root().label(), Some("root"));
    assert_eq!(labels.num_labels(), 10_000);

    assert_eq!(to_newick(NewickStyle::Labeled, &tree, &labels), newick);
}
