//! Dense leaf sets.

use crate::model::{LabelIndex, LeafLabelMap};
use bitvec::prelude::*;

/// The set of taxa descending from a vertex, as a bit vector over the leaf
/// universe enumerated by a [LeafLabelMap].
///
/// All cladesets compared with each other must come from trees sharing one
/// [LeafLabelMap]. Subset tests and unions work word by word, so their cost
/// depends on the size of the universe, not on the number of members.
///
/// # Example
/// ```
/// use clademap::index::Cladeset;
///
/// let ab = Cladeset::from_indices(4, [0, 1]);
/// let abc = Cladeset::from_indices(4, [0, 1, 2]);
/// assert!(abc.is_superset_of(&ab));
/// assert!(!ab.is_superset_of(&abc));
/// assert_eq!(abc.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cladeset {
    bits: BitVec<u64, Lsb0>,
}

impl Cladeset {
    /// Creates an empty set over a universe of `universe` taxa.
    pub fn empty(universe: usize) -> Self {
        Cladeset {
            bits: BitVec::repeat(false, universe),
        }
    }

    /// Creates the set containing only `label`.
    ///
    /// # Panics
    /// Panics if `label` is outside the universe.
    pub fn singleton(universe: usize, label: LabelIndex) -> Self {
        let mut set = Self::empty(universe);
        set.insert(label);
        set
    }

    /// Creates a set from label indices.
    ///
    /// # Panics
    /// Panics if any index is outside the universe.
    pub fn from_indices<I: IntoIterator<Item = LabelIndex>>(universe: usize, labels: I) -> Self {
        let mut set = Self::empty(universe);
        for label in labels {
            set.insert(label);
        }
        set
    }

    /// Adds `label` to the set.
    ///
    /// # Panics
    /// Panics if `label` is outside the universe.
    pub fn insert(&mut self, label: LabelIndex) {
        self.bits.set(label, true);
    }

    /// Returns whether `label` is a member.
    pub fn contains(&self, label: LabelIndex) -> bool {
        self.bits.get(label).is_some_and(|bit| *bit)
    }

    /// Adds all members of `other` to this set.
    pub fn union_with(&mut self, other: &Cladeset) {
        debug_assert_eq!(self.universe(), other.universe());
        for (mine, theirs) in self
            .bits
            .as_raw_mut_slice()
            .iter_mut()
            .zip(other.bits.as_raw_slice())
        {
            *mine |= *theirs;
        }
    }

    /// Returns whether every member of `other` is also a member of this set
    /// ("this clade contains `other`").
    pub fn is_superset_of(&self, other: &Cladeset) -> bool {
        let mine = self.bits.as_raw_slice();
        other
            .bits
            .as_raw_slice()
            .iter()
            .enumerate()
            .all(|(i, theirs)| theirs & !mine.get(i).copied().unwrap_or(0) == 0)
    }

    /// Returns the number of members.
    pub fn len(&self) -> usize {
        self.bits.count_ones()
    }

    /// Returns whether the set has no members.
    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Returns the size of the universe this set lives in.
    pub fn universe(&self) -> usize {
        self.bits.len()
    }

    /// Iterates over the members in increasing label index order.
    pub fn iter(&self) -> impl Iterator<Item = LabelIndex> + '_ {
        self.bits.iter_ones()
    }

    /// Returns the member with the smallest label index.
    pub fn first(&self) -> Option<LabelIndex> {
        self.bits.first_one()
    }

    /// Returns the taxon names of the members, for diagnostics.
    pub fn labels<'a>(&self, leaf_label_map: &'a LeafLabelMap) -> Vec<&'a str> {
        self.iter()
            .filter_map(|label| leaf_label_map.get_label(label))
            .collect()
    }
}
