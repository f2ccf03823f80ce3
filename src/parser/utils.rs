//! Label quoting for writing Newick.

/// Characters that end an unquoted label.
const SPECIAL_CHARS: &[char] = &[' ', ',', ';', '\t', '\n', '\r', '(', ')', ':', '[', ']', '\''];

/// Checks whether a label has to be single-quoted to survive a round trip.
///
/// # Examples
/// ```
/// # use clademap::parser::utils::needs_quoting;
/// assert!(!needs_quoting("Pukeko"));
/// assert!(!needs_quoting("A/duck/Ohio/1|2019-02-01"));
/// assert!(needs_quoting("Pu[ke]ko"));
/// assert!(needs_quoting("Australasian Swamphen"));
/// assert!(needs_quoting(""));
/// ```
pub fn needs_quoting(label: &str) -> bool {
    label.is_empty() || label.contains(SPECIAL_CHARS)
}

/// Quotes a label for Newick if necessary.
///
/// Labels with special characters are wrapped in single quotes, doubling
/// internal single quotes. Others, including those with underscores, are
/// returned unchanged, so parsing the output yields the label again.
///
/// # Examples
/// ```
/// # use clademap::parser::utils::quote_label;
/// assert_eq!(quote_label("Pukeko"), "Pukeko");
/// assert_eq!(quote_label("Australasian_Swamphen"), "Australasian_Swamphen");
/// assert_eq!(quote_label("Australasian Swamphen"), "'Australasian Swamphen'");
/// assert_eq!(quote_label("Baillon's Crake"), "'Baillon''s Crake'");
/// ```
pub fn quote_label(label: &str) -> String {
    if needs_quoting(label) {
        format!("'{}'", label.replace('\'', "''"))
    } else {
        label.to_string()
    }
}
