//! Ordered per-parameter support store.
//!
//! Keys are rounded [`SupportKey`]s, so iteration order is the public
//! "i-th support" contract. Values are the non-empty label sets that
//! justify each point's presence; a point whose label set empties out is
//! removed rather than kept around.

use crate::label::{Label, LabelSelector};
use crate::value::SupportKey;
use std::collections::{BTreeMap, BTreeSet};

/// Ordered map from a rounded support value to its justifying labels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupportMap {
    points: BTreeMap<SupportKey, BTreeSet<Label>>,
}

/// What a strip-style removal did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Removal {
    /// Points deleted entirely (their whole label set was subsumed).
    pub removed_points: usize,
    /// Points that merely lost the stripped label.
    pub stripped_points: usize,
}

impl Removal {
    /// Whether any actual value disappeared from the store.
    pub fn values_changed(&self) -> bool {
        self.removed_points > 0
    }
}

impl SupportMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a point under `label`, merging label sets on collision.
    ///
    /// Returns `true` iff a new point was created.
    pub fn insert(&mut self, key: SupportKey, label: Label) -> bool {
        match self.points.entry(key) {
            std::collections::btree_map::Entry::Vacant(entry) => {
                entry.insert(BTreeSet::from([label]));
                true
            }
            std::collections::btree_map::Entry::Occupied(mut entry) => {
                entry.get_mut().insert(label);
                false
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of supports matched by `selector`.
    pub fn len_matching(&self, selector: LabelSelector) -> usize {
        self.points
            .values()
            .filter(|labels| selector.matches(labels))
            .count()
    }

    /// Whether at least one support matches `selector`.
    pub fn contains_matching(&self, selector: LabelSelector) -> bool {
        self.points.values().any(|labels| selector.matches(labels))
    }

    /// Ascending values of the supports matched by `selector`.
    pub fn values_matching(&self, selector: LabelSelector) -> Vec<f64> {
        self.points
            .iter()
            .filter(|(_, labels)| selector.matches(labels))
            .map(|(key, _)| key.value())
            .collect()
    }

    /// Ascending values of every point except those justified *only* by
    /// `label`. This is the base set generative derivation works from.
    pub fn values_excluding_exclusive(&self, label: Label) -> Vec<f64> {
        self.points
            .iter()
            .filter(|(_, labels)| !(labels.len() == 1 && labels.contains(&label)))
            .map(|(key, _)| key.value())
            .collect()
    }

    /// The label set of a stored point, if present.
    pub fn labels(&self, key: SupportKey) -> Option<&BTreeSet<Label>> {
        self.points.get(&key)
    }

    /// Strip every label matched by `selector`; drop points whose entire
    /// label set was subsumed.
    pub fn remove_matching(&mut self, selector: LabelSelector) -> Removal {
        let mut removal = Removal::default();
        self.points.retain(|_, labels| {
            let before = labels.len();
            labels.retain(|label| !selector.matches_label(*label));
            if labels.is_empty() {
                removal.removed_points += 1;
                false
            } else {
                if labels.len() != before {
                    removal.stripped_points += 1;
                }
                true
            }
        });
        removal
    }

    /// True iff at least one stored point carries an internal label.
    pub fn has_internal(&self) -> bool {
        self.points
            .values()
            .any(|labels| labels.iter().any(Label::is_internal))
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (SupportKey, &BTreeSet<Label>)> {
        self.points.iter().map(|(key, labels)| (*key, labels))
    }
}
