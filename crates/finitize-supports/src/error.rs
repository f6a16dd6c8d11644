//! Error types for support primitives.

use crate::domain::DomainKind;
use crate::generator::Method;
use crate::label::Label;

/// Errors arising from support storage, generation, or derivation.
#[derive(Debug, thiserror::Error)]
pub enum SupportError {
    /// A support value is NaN or infinite.
    #[error("support value {value} is not finite")]
    NonFiniteValue { value: f64 },

    /// A support value lies outside its parameter's domain.
    #[error("support {value} lies outside the domain {domain}")]
    OutOfBounds { value: f64, domain: String },

    /// A grid or Monte-Carlo generator was asked to cover an unbounded interval.
    #[error("cannot generate supports over the unbounded interval [{lower}, {upper}]")]
    UnboundedInterval { lower: f64, upper: f64 },

    /// Generative derivation needs at least two base supports.
    #[error("generative supports require at least 2 existing supports, found {found}")]
    InsufficientSupports { found: usize },

    /// A generative basis offset falls outside the caller-given bounds.
    #[error("generative basis value {value} lies outside [{lower}, {upper}]")]
    BasisOutOfBounds { value: f64, lower: f64, upper: f64 },

    /// Generative basis bounds span nothing.
    #[error("generative basis bounds [{lower}, {upper}] span an empty interval")]
    DegenerateBasisBounds { lower: f64, upper: f64 },

    /// The label stamped on derived points must be internal.
    #[error("label {label} cannot mark generative supports: it is not internal")]
    NotInternalLabel { label: Label },

    /// A request produced or supplied no values.
    #[error("no support values were supplied")]
    EmptyValues,

    /// A distribution's parameters are invalid for sampling.
    #[error("invalid distribution: {reason}")]
    InvalidDistribution { reason: String },

    /// The designed extension seam: register a generator for the pair.
    #[error(
        "no support generator is registered for {domain:?} domains with the {method:?} method"
    )]
    UnsupportedGenerator { domain: DomainKind, method: Method },
}
