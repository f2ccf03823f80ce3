//! Constants for Newick parsing and writing.

/// Newick label delimiters: parentheses, comma, colon, semicolon, comment
/// brackets. Whitespace also ends an unquoted label.
pub(crate) const NEWICK_LABEL_DELIMITERS: &[u8] = b"(),:;[]";

/// Default guess for number of leaves, when unknown
pub(crate) const DEFAULT_NUM_LEAVES_GUESS: usize = 10;
