//! Generative supports: interior points derived from existing ones.
//!
//! Techniques such as orthogonal collocation need auxiliary evaluation
//! points *between* the supports a parameter already has. Those derived
//! points are second-class: they are stamped with an internal label,
//! torn down whenever the base support set changes, and lazily
//! regenerated just before they are needed.

use crate::error::SupportError;
use crate::label::Label;
use serde::{Deserialize, Serialize};

/// How (and whether) a parameter derives generative supports.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerativeInfo {
    /// No generative supports; derivation is a no-op.
    #[default]
    None,
    /// Fixed fractional offsets replicated into every consecutive
    /// support pair.
    UniformBasis(UniformBasis),
}

impl GenerativeInfo {
    pub fn is_none(&self) -> bool {
        matches!(self, GenerativeInfo::None)
    }

    /// The internal label stamped on derived points, if any.
    pub fn label(&self) -> Option<Label> {
        match self {
            GenerativeInfo::None => None,
            GenerativeInfo::UniformBasis(basis) => Some(basis.label()),
        }
    }

    /// Derive interior points from an ascending base support list.
    ///
    /// The `None` variant yields nothing. `UniformBasis` requires at
    /// least two base points and emits, for every consecutive pair
    /// `(lo, hi)`, one point per basis offset at `lo + b * (hi - lo)`,
    /// concatenated in ascending pair order.
    pub fn derive(&self, sorted_supports: &[f64]) -> Result<Vec<f64>, SupportError> {
        let GenerativeInfo::UniformBasis(basis) = self else {
            return Ok(Vec::new());
        };
        if sorted_supports.len() < 2 {
            return Err(SupportError::InsufficientSupports {
                found: sorted_supports.len(),
            });
        }
        let mut derived =
            Vec::with_capacity(basis.offsets.len() * (sorted_supports.len() - 1));
        for pair in sorted_supports.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            for offset in &basis.offsets {
                derived.push(lo + offset * (hi - lo));
            }
        }
        Ok(derived)
    }
}

/// A validated, `[0, 1]`-normalized basis of fractional offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniformBasis {
    offsets: Vec<f64>,
    label: Label,
}

impl UniformBasis {
    /// Validate a raw basis against caller-given bounds and renormalize
    /// it to `[0, 1]`.
    ///
    /// Fails when the basis is empty, an offset falls outside
    /// `[lower, upper]`, the bounds span nothing, or the stamp label is
    /// not internal.
    pub fn new(
        raw: &[f64],
        lower: f64,
        upper: f64,
        label: Label,
    ) -> Result<Self, SupportError> {
        if raw.is_empty() {
            return Err(SupportError::EmptyValues);
        }
        if !label.is_internal() {
            return Err(SupportError::NotInternalLabel { label });
        }
        if !(lower.is_finite() && upper.is_finite()) || upper <= lower {
            return Err(SupportError::DegenerateBasisBounds { lower, upper });
        }
        for value in raw {
            if *value < lower || *value > upper {
                return Err(SupportError::BasisOutOfBounds {
                    value: *value,
                    lower,
                    upper,
                });
            }
        }
        let span = upper - lower;
        let mut offsets: Vec<f64> = raw.iter().map(|value| (value - lower) / span).collect();
        offsets.sort_by(f64::total_cmp);
        Ok(Self { offsets, label })
    }

    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    pub fn label(&self) -> Label {
        self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basis(raw: &[f64]) -> GenerativeInfo {
        GenerativeInfo::UniformBasis(
            UniformBasis::new(raw, 0.0, 1.0, Label::Generative).unwrap(),
        )
    }

    #[test]
    fn midpoint_basis_covers_every_pair() {
        let derived = basis(&[0.5]).derive(&[0.0, 1.0, 2.0]).unwrap();
        assert_eq!(derived, vec![0.5, 1.5]);
    }

    #[test]
    fn multi_offset_basis_orders_within_pairs() {
        let derived = basis(&[0.75, 0.25]).derive(&[0.0, 2.0]).unwrap();
        assert_eq!(derived, vec![0.5, 1.5]);
    }

    #[test]
    fn none_variant_is_a_no_op() {
        assert_eq!(GenerativeInfo::None.derive(&[0.0]).unwrap(), Vec::<f64>::new());
        assert_eq!(GenerativeInfo::None.label(), None);
    }

    #[test]
    fn fewer_than_two_supports_fails() {
        let err = basis(&[0.5]).derive(&[1.0]).unwrap_err();
        assert!(matches!(err, SupportError::InsufficientSupports { found: 1 }));
    }

    #[test]
    fn raw_basis_renormalizes_against_bounds() {
        let basis = UniformBasis::new(&[-1.0, 0.0, 1.0], -1.0, 1.0, Label::Generative).unwrap();
        assert_eq!(basis.offsets(), &[0.0, 0.5, 1.0]);
    }

    #[test]
    fn out_of_bounds_offset_is_rejected() {
        let err = UniformBasis::new(&[1.5], 0.0, 1.0, Label::Generative).unwrap_err();
        assert!(matches!(err, SupportError::BasisOutOfBounds { .. }));
    }

    #[test]
    fn public_stamp_label_is_rejected() {
        let err = UniformBasis::new(&[0.5], 0.0, 1.0, Label::UserDefined).unwrap_err();
        assert!(matches!(err, SupportError::NotInternalLabel { .. }));
    }
}
