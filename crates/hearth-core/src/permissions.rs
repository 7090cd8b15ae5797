//! Permission bitsets
//!
//! Grain permissions are an ordered list of flags defined by each application. A
//! `permissionsHeld` requirement demands that the current set be a superset of the required
//! one; flags past the end of a set count as unset.

use serde::{Deserialize, Serialize};

/// Ordered set of permission flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(Vec<bool>);

impl PermissionSet {
    /// Build from explicit flags
    pub fn from_bits(bits: impl Into<Vec<bool>>) -> Self {
        Self(bits.into())
    }

    /// A set with only the given indices set
    pub fn with_indices(indices: &[usize]) -> Self {
        let len = indices.iter().max().map_or(0, |max| max + 1);
        let mut bits = vec![false; len];
        for &index in indices {
            bits[index] = true;
        }
        Self(bits)
    }

    /// Whether flag `index` is set
    pub fn contains(&self, index: usize) -> bool {
        self.0.get(index).copied().unwrap_or(false)
    }

    /// Every flag set in `required` is also set in `self`
    pub fn is_superset_of(&self, required: &PermissionSet) -> bool {
        required
            .0
            .iter()
            .enumerate()
            .all(|(index, &needed)| !needed || self.contains(index))
    }

    /// Raw flags
    pub fn bits(&self) -> &[bool] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_superset_ignores_unset_required_bits() {
        let held = PermissionSet::from_bits(vec![true, false]);
        let required = PermissionSet::from_bits(vec![true, false, false, false]);
        assert!(held.is_superset_of(&required));
    }

    #[test]
    fn test_missing_bits_count_as_unset() {
        let held = PermissionSet::from_bits(vec![true]);
        let required = PermissionSet::with_indices(&[2]);
        assert!(!held.is_superset_of(&required));
    }

    #[test]
    fn test_with_indices() {
        let set = PermissionSet::with_indices(&[0, 3]);
        assert_eq!(set.bits(), &[true, false, false, true]);
    }

    proptest! {
        #[test]
        fn superset_matches_pointwise_implication(
            held in proptest::collection::vec(any::<bool>(), 0..12),
            required in proptest::collection::vec(any::<bool>(), 0..12),
        ) {
            let expected = required
                .iter()
                .enumerate()
                .all(|(i, &r)| !r || held.get(i).copied().unwrap_or(false));
            let held = PermissionSet::from_bits(held);
            let required = PermissionSet::from_bits(required);
            prop_assert_eq!(held.is_superset_of(&required), expected);
        }

        #[test]
        fn every_set_is_superset_of_itself(bits in proptest::collection::vec(any::<bool>(), 0..12)) {
            let set = PermissionSet::from_bits(bits);
            prop_assert!(set.is_superset_of(&set));
            prop_assert!(set.is_superset_of(&PermissionSet::default()));
        }
    }
}
