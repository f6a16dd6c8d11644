//! Support labels: why a point exists, and how to select points by that.
//!
//! Every stored support carries a non-empty set of labels recording its
//! provenance. Labels split into a *public* partition (shown to users by
//! default) and an *internal* partition (derived machinery such as
//! collocation nodes, hidden by default).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Provenance tag attached to a support.
///
/// A closed taxonomy: per-measure uniqueness is a fresh integer id inside
/// [`Label::Measure`], not a fresh type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    /// Explicitly supplied by the user.
    UserDefined,
    /// Produced by the uniform-grid generator.
    UniformGrid,
    /// Produced by a Monte-Carlo generator.
    MonteCarlo,
    /// Produced by a weighted-sample generator (distribution's own law).
    WeightedSample,
    /// Produced by the mixed per-sub-domain collection generator.
    Mixture,
    /// A bound of a measure's integration region.
    MeasureBound,
    /// Owned by one specific measure; the id is allocated by the model.
    Measure(u64),
    /// Derived generative point (e.g. a collocation node). Internal.
    Generative,
}

impl Label {
    /// Internal labels are hidden from default queries.
    pub fn is_internal(&self) -> bool {
        matches!(self, Label::Generative)
    }

    pub fn is_public(&self) -> bool {
        !self.is_internal()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::UserDefined => write!(f, "user_defined"),
            Label::UniformGrid => write!(f, "uniform_grid"),
            Label::MonteCarlo => write!(f, "monte_carlo"),
            Label::WeightedSample => write!(f, "weighted_sample"),
            Label::Mixture => write!(f, "mixture"),
            Label::MeasureBound => write!(f, "measure_bound"),
            Label::Measure(id) => write!(f, "measure({id})"),
            Label::Generative => write!(f, "generative"),
        }
    }
}

/// How a query selects supports by label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSelector {
    /// Every stored support regardless of label.
    All,
    /// Supports carrying at least one public label (the default view).
    #[default]
    Public,
    /// Supports whose label set contains this label.
    One(Label),
}

impl LabelSelector {
    /// Whether a support with this label set is selected.
    pub fn matches(&self, labels: &BTreeSet<Label>) -> bool {
        match self {
            LabelSelector::All => true,
            LabelSelector::Public => labels.iter().any(Label::is_public),
            LabelSelector::One(label) => labels.contains(label),
        }
    }

    /// Whether a single label is selected, for strip-style deletions.
    pub fn matches_label(&self, label: Label) -> bool {
        match self {
            LabelSelector::All => true,
            LabelSelector::Public => label.is_public(),
            LabelSelector::One(wanted) => *wanted == label,
        }
    }
}
