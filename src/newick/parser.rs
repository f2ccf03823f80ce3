use crate::model::{BranchLength, LabelResolver, LeafLabelMap, PhyloTree, VertexIndex};
use crate::newick::defs::{DEFAULT_NUM_LEAVES_GUESS, NEWICK_LABEL_DELIMITERS};
use crate::parser::byte_parser::ByteParser;
use crate::parser::byte_source::ByteSource;
use crate::parser::parsing_error::{ParsingError, ParsingErrorType};
use std::mem;

/// Parser (configuration) for rooted, possibly multifurcating Newick trees.
///
/// Leaf labels are normalized and resolved through a [LabelResolver], so all
/// trees parsed by one parser share one [LeafLabelMap]. Labels after a
/// closing parenthesis are kept as node ids of internal vertices.
///
/// # Configuration
/// * `with_num_leaves(num_leaves)` - Capacity hint, otherwise taken from the
///   previously parsed tree.
/// * `with_resolver(resolver)` - Resolver to continue, e.g. with a
///   normalization other than verbatim.
///
/// # Example
/// ```
/// use clademap::newick::NewickParser;
/// use clademap::parser::byte_parser::ByteParser;
///
/// let mut byte_parser = ByteParser::from_str("((A:1,B:1,C:1)x:0.5,D:2)root;");
/// let mut newick_parser = NewickParser::new();
/// let tree = newick_parser.parse(&mut byte_parser).unwrap();
/// let labels = newick_parser.into_leaf_label_map();
///
/// assert_eq!(tree.num_leaves(), 4);
/// assert_eq!(tree.root().label(), Some("root"));
/// assert_eq!(labels.num_labels(), 4);
/// ```
#[derive(Debug, Default)]
pub struct NewickParser {
    num_leaves: Option<usize>,
    resolver: LabelResolver,
}

impl NewickParser {
    /// Creates a new `NewickParser` with verbatim labels and unknown number of leaves.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the expected number of leaves per tree.
    pub fn with_num_leaves(mut self, num_leaves: usize) -> Self {
        self.num_leaves = Some(num_leaves);
        self
    }

    /// Sets the [LabelResolver] used for leaf labels.
    pub fn with_resolver(mut self, resolver: LabelResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Returns the labels resolved so far.
    pub fn leaf_label_map(&self) -> &LeafLabelMap {
        self.resolver.leaf_label_map()
    }

    /// Consumes the parser and returns the [LeafLabelMap] of all parsed trees.
    pub fn into_leaf_label_map(self) -> LeafLabelMap {
        self.resolver.into_leaf_label_map()
    }

    /// Parses a single Newick tree from the given [ByteParser], consuming
    /// its terminating `;`.
    ///
    /// # Errors
    /// Returns a [ParsingError] if the Newick string is invalid.
    pub fn parse<S: ByteSource>(
        &mut self,
        parser: &mut ByteParser<S>,
    ) -> Result<PhyloTree, ParsingError> {
        let mut tree = PhyloTree::new(self.num_leaves.unwrap_or(DEFAULT_NUM_LEAVES_GUESS));
        self.parse_root(parser, &mut tree)?;
        self.num_leaves = Some(tree.num_leaves());
        Ok(tree)
    }

    /// Parses all trees until EOF.
    pub fn parse_all<S: ByteSource>(
        &mut self,
        mut parser: ByteParser<S>,
    ) -> Result<Vec<PhyloTree>, ParsingError> {
        let mut trees = Vec::new();
        parser.skip_comment_and_whitespace()?;
        while !parser.is_eof() {
            trees.push(self.parse(&mut parser)?);
            parser.skip_comment_and_whitespace()?;
        }
        Ok(trees)
    }

    /// Parses exactly one tree; only comments and whitespace may follow it.
    pub fn parse_single<S: ByteSource>(
        &mut self,
        mut parser: ByteParser<S>,
    ) -> Result<PhyloTree, ParsingError> {
        let tree = self.parse(&mut parser)?;
        parser.skip_comment_and_whitespace()?;
        if !parser.is_eof() {
            return Err(ParsingError::invalid_newick_string(
                &parser,
                "Expected a single tree but found more input after ';'".to_string(),
            ));
        }
        Ok(tree)
    }

    /// Parses root of tree and adds it to tree:
    /// - `(children)[label][:branch_length];`
    fn parse_root<S: ByteSource>(
        &mut self,
        parser: &mut ByteParser<S>,
        tree: &mut PhyloTree,
    ) -> Result<(), ParsingError> {
        parser.skip_comment_and_whitespace()?;
        if !parser.peek_is(b'(') {
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!(
                    "Expected '(' at start of tree but found {:?}",
                    parser.peek().map(|b| b as char)
                ),
            ));
        }

        let children = self.parse_children(parser, tree)?;
        let label = self.parse_internal_label(parser)?;
        let branch_length = self.parse_branch_length(parser)?;

        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b';') {
            if parser.is_eof() {
                return Err(ParsingError::unexpected_eof(parser));
            }
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!(
                    "Expected ';' at end of tree but found {:?}",
                    parser.peek().map(|b| b as char)
                ),
            ));
        }

        tree.add_root(children, branch_length, label);
        Ok(())
    }

    /// Parses `(vertex, vertex, ...)` with all nested subtrees and returns the
    /// child indices of the outermost parentheses in order. Expects parser at
    /// opening `(`.
    ///
    /// Sibling lists of enclosing parentheses wait on an explicit stack, so
    /// nesting depth is bounded by memory rather than the call stack.
    /// Vertices are added in post-order.
    fn parse_children<S: ByteSource>(
        &mut self,
        parser: &mut ByteParser<S>,
        tree: &mut PhyloTree,
    ) -> Result<Vec<VertexIndex>, ParsingError> {
        parser.consume_if(b'(');
        let mut open: Vec<Vec<VertexIndex>> = Vec::new();
        let mut siblings: Vec<VertexIndex> = Vec::new();

        loop {
            // Descend to the next leaf
            parser.skip_comment_and_whitespace()?;
            while parser.consume_if(b'(') {
                open.push(mem::take(&mut siblings));
                parser.skip_comment_and_whitespace()?;
            }
            siblings.push(self.parse_leaf(parser, tree)?);

            // Close finished internal vertices until the next sibling starts
            loop {
                parser.skip_comment_and_whitespace()?;
                match parser.peek() {
                    Some(b',') => {
                        parser.next_byte();
                        break;
                    }
                    Some(b')') => {
                        parser.next_byte();
                        let children = mem::take(&mut siblings);
                        let Some(enclosing) = open.pop() else {
                            return Ok(children);
                        };
                        siblings = enclosing;
                        let label = self.parse_internal_label(parser)?;
                        let branch_length = self.parse_branch_length(parser)?;
                        siblings.push(tree.add_internal_vertex(children, branch_length, label));
                    }
                    Some(other) => {
                        return Err(ParsingError::invalid_newick_string(
                            parser,
                            format!("Expected ',' or ')' after child but found {:?}", other as char),
                        ));
                    }
                    None => return Err(ParsingError::unexpected_eof(parser)),
                }
            }
        }
    }

    /// Parses leaf `label[:branch_length]` and adds it to tree.
    fn parse_leaf<S: ByteSource>(
        &mut self,
        parser: &mut ByteParser<S>,
        tree: &mut PhyloTree,
    ) -> Result<VertexIndex, ParsingError> {
        let label = parser.parse_label(NEWICK_LABEL_DELIMITERS)?;
        if label.is_empty() {
            if parser.is_eof() {
                return Err(ParsingError::unexpected_eof(parser));
            }
            return Err(ParsingError::invalid_newick_string(
                parser,
                "Leaf without label".to_string(),
            ));
        }
        let label_index = self.resolver.resolve_label(&label);
        let branch_length = self.parse_branch_length(parser)?;
        Ok(tree.add_leaf(branch_length, label_index))
    }

    /// Parses the optional label following a closing parenthesis.
    fn parse_internal_label<S: ByteSource>(
        &mut self,
        parser: &mut ByteParser<S>,
    ) -> Result<Option<String>, ParsingError> {
        let label = parser.parse_label(NEWICK_LABEL_DELIMITERS)?;
        Ok((!label.is_empty()).then_some(label))
    }

    /// Parses optional branch length `[:number]`; supports scientific
    /// notation (e.g., `1.5e-10`).
    fn parse_branch_length<S: ByteSource>(
        &mut self,
        parser: &mut ByteParser<S>,
    ) -> Result<Option<BranchLength>, ParsingError> {
        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b':') {
            return Ok(None);
        }
        parser.skip_comment_and_whitespace()?;

        let mut branch_length_str = String::new();
        while let Some(b) = parser.peek() {
            if b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E') {
                branch_length_str.push(b as char);
                parser.next_byte();
            } else {
                break;
            }
        }

        let invalid = |parser: &ByteParser<S>| {
            ParsingError::from_parser(
                ParsingErrorType::InvalidBranchLength(branch_length_str.clone()),
                parser,
            )
        };
        let value: f64 = branch_length_str.parse().map_err(|_| invalid(parser))?;
        BranchLength::try_new(value)
            .map(Some)
            .ok_or_else(|| invalid(parser))
    }
}
