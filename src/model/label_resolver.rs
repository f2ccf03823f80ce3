//! Resolution of parsed taxon strings to shared label indices.
//!
//! Trees handed to the mapper are often written by different tools, which
//! decorate taxon names differently (quotes, padding, extra `|date` fields).
//! A [LabelResolver] normalizes each parsed leaf label according to a
//! [TaxonNormalization] and stores it in the [LeafLabelMap] that all trees of
//! one run share.

use crate::model::leaf_label_map::{LabelIndex, LeafLabelMap};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Delimiter between fields of a taxon label, e.g. `A/duck/Ohio/1/2019|2019-03-02`.
const FIELD_DELIMITER: char = '|';

/// Number of leading fields kept by [TaxonNormalization::StrainDate].
const STRAIN_DATE_FIELDS: usize = 2;

// =#========================================================================#=
// TAXON NORMALIZATION
// =#========================================================================#=
/// How parsed leaf labels are normalized before lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TaxonNormalization {
    /// Use labels as parsed.
    #[default]
    Verbatim,
    /// Trim whitespace and stray quotes, then keep only the first two
    /// `|`-separated fields (`strain|date`).
    StrainDate,
}

impl TaxonNormalization {
    /// Applies this normalization to a single label.
    ///
    /// # Example
    /// ```
    /// use clademap::model::TaxonNormalization;
    ///
    /// let norm = TaxonNormalization::StrainDate;
    /// assert_eq!(norm.normalize(" 'A/swine/Iowa/A02|2021-01-04|2021' "), "A/swine/Iowa/A02|2021-01-04");
    /// assert_eq!(norm.normalize("A/swine/Iowa/A02"), "A/swine/Iowa/A02");
    /// assert_eq!(TaxonNormalization::Verbatim.normalize(" a|b|c "), " a|b|c ");
    /// ```
    pub fn normalize(&self, label: &str) -> String {
        match self {
            TaxonNormalization::Verbatim => label.to_string(),
            TaxonNormalization::StrainDate => {
                let clean = label.trim().trim_matches(|c| c == '\'' || c == '"');
                let fields: Vec<&str> = clean.splitn(STRAIN_DATE_FIELDS + 1, FIELD_DELIMITER).collect();
                if fields.len() >= STRAIN_DATE_FIELDS {
                    fields[..STRAIN_DATE_FIELDS].join("|")
                } else {
                    clean.to_string()
                }
            }
        }
    }
}

impl fmt::Display for TaxonNormalization {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TaxonNormalization::Verbatim => write!(f, "verbatim"),
            TaxonNormalization::StrainDate => write!(f, "strain-date"),
        }
    }
}

// =#========================================================================#=
// LABEL RESOLVER
// =#========================================================================#=
/// Resolves leaf labels to indices during Newick tree parsing,
/// building a [LeafLabelMap] shared by all trees parsed with it.
#[derive(Debug, Default)]
pub struct LabelResolver {
    normalization: TaxonNormalization,
    leaf_label_map: LeafLabelMap,
}

impl LabelResolver {
    /// Creates a resolver with the given normalization and an empty map.
    pub fn new(normalization: TaxonNormalization) -> Self {
        Self {
            normalization,
            leaf_label_map: LeafLabelMap::default(),
        }
    }

    /// Creates a resolver continuing an existing map.
    pub fn with_map(normalization: TaxonNormalization, leaf_label_map: LeafLabelMap) -> Self {
        Self {
            normalization,
            leaf_label_map,
        }
    }

    /// Returns the normalization applied by this resolver.
    pub fn normalization(&self) -> TaxonNormalization {
        self.normalization
    }

    /// Normalizes a parsed label and returns its index, inserting it if new.
    pub fn resolve_label(&mut self, parsed_label: &str) -> LabelIndex {
        let normalized = self.normalization.normalize(parsed_label);
        self.leaf_label_map.get_or_insert(&normalized)
    }

    /// Returns the map accumulated so far.
    pub fn leaf_label_map(&self) -> &LeafLabelMap {
        &self.leaf_label_map
    }

    /// Consumes the resolver and returns the accumulated [LeafLabelMap].
    pub fn into_leaf_label_map(self) -> LeafLabelMap {
        self.leaf_label_map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strain_date_merges_decorated_labels() {
        let mut resolver = LabelResolver::new(TaxonNormalization::StrainDate);
        let plain = resolver.resolve_label("A/mallard/Alberta/12|2019-08-01");
        let decorated = resolver.resolve_label("'A/mallard/Alberta/12|2019-08-01|2019.58'");
        assert_eq!(plain, decorated);
        assert_eq!(resolver.leaf_label_map().num_labels(), 1);
    }

    #[test]
    fn test_verbatim_keeps_labels_apart() {
        let mut resolver = LabelResolver::new(TaxonNormalization::Verbatim);
        let plain = resolver.resolve_label("x|1");
        let decorated = resolver.resolve_label("x|1|2");
        assert_ne!(plain, decorated);
    }
}
