//! Newick format parser and writer for phylogenetic trees.
//!
//! This module provides [`NewickParser`] to parse Newick strings into
//! [`PhyloTree`]s and [`to_newick`] to write them back.
//!
//! # Quick API
//! * [`parse_str`] - parses a single string, returns tree + [`LeafLabelMap`]
//! * [`parse_file`] - parses a file holding one tree
//! * [`parse_pair`] - parses a source and a target tree against one shared
//!   [`LeafLabelMap`], as needed for mapping between them
//!
//! # Format
//! The accepted Newick grammar:
//! * `tree ::= internal_vertex ';'`
//! * `vertex ::= leaf | internal_vertex`
//! * `internal_vertex ::= '(' vertex (',' vertex)* ')' [label] [branch_length]`
//! * `leaf ::= label [branch_length]`
//! * `branch_length ::= ':' number`
//!
//! Furthermore:
//! * Whitespace can occur between elements,
//!   just not within an unquoted label or a branch_length
//! * Labels may be single-quoted, with `''` standing for a quote
//! * Comments are square brackets and can occur anywhere whitespace can;
//!   annotations like `[&height=0.5]` are treated as comments

mod defs;
mod parser;
pub mod writer;

pub use self::parser::NewickParser;
pub use self::writer::{NewickStyle, to_newick, write_newick_file};

use crate::model::{LabelResolver, LeafLabelMap, PhyloTree, TaxonNormalization};
use crate::parser::ParsingError;
use crate::parser::byte_parser::ByteParser;
use std::fs;
use std::path::Path;

/// A source and a target tree whose leaves index into one [LeafLabelMap].
#[derive(Debug, Clone)]
pub struct TreePair {
    pub source: PhyloTree,
    pub target: PhyloTree,
    pub labels: LeafLabelMap,
}

// ============================================================================
// QUICK PARSING API (pub)
// ============================================================================
/// Parses a single Newick string with verbatim labels.
///
/// # Example
/// ```
/// use clademap::newick::parse_str;
///
/// let (tree, labels) = parse_str("(Fratercula_cirrhata,(Fratercula_arctica,Fratercula_corniculata));").unwrap();
/// assert_eq!(tree.num_leaves(), 3);
/// assert!(labels.contains_label("Fratercula_arctica"));
/// ```
pub fn parse_str<S: AsRef<str>>(newick: S) -> Result<(PhyloTree, LeafLabelMap), ParsingError> {
    let mut newick_parser = NewickParser::new();
    let tree = newick_parser.parse_single(ByteParser::from_str(newick.as_ref()))?;
    Ok((tree, newick_parser.into_leaf_label_map()))
}

/// Parses a file holding a single Newick tree, with verbatim labels.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<(PhyloTree, LeafLabelMap), ParsingError> {
    let mut newick_parser = NewickParser::new();
    let tree = newick_parser.parse_single(ByteParser::from_bytes(fs::read(path)?))?;
    Ok((tree, newick_parser.into_leaf_label_map()))
}

/// Parses a source and a target Newick string against one shared
/// [LeafLabelMap], normalizing taxon names of both.
///
/// # Example
/// ```
/// use clademap::model::TaxonNormalization;
/// use clademap::newick::parse_pair;
///
/// let pair = parse_pair("((A,B)s1,C)s0;", "(A,(B,C));", TaxonNormalization::Verbatim).unwrap();
/// assert_eq!(pair.labels.num_labels(), 3);
/// ```
pub fn parse_pair(
    source: &str,
    target: &str,
    normalization: TaxonNormalization,
) -> Result<TreePair, ParsingError> {
    let mut newick_parser = NewickParser::new().with_resolver(LabelResolver::new(normalization));
    let source = newick_parser.parse_single(ByteParser::from_str(source))?;
    let target = newick_parser.parse_single(ByteParser::from_str(target))?;
    Ok(TreePair {
        source,
        target,
        labels: newick_parser.into_leaf_label_map(),
    })
}
