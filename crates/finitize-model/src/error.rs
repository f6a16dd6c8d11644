//! Error types for model operations.

use crate::ids::{
    ConstraintId, DerivativeId, MeasureId, ParameterId, VariableId,
};
use finitize_supports::SupportError;

/// Errors arising from model mutation or query.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("unknown {0}")]
    UnknownParameter(ParameterId),

    #[error("unknown {0}")]
    UnknownVariable(VariableId),

    #[error("unknown {0}")]
    UnknownMeasure(MeasureId),

    #[error("unknown {0}")]
    UnknownConstraint(ConstraintId),

    #[error("unknown {0}")]
    UnknownDerivative(DerivativeId),

    /// `set` refuses to clobber existing supports without `force`.
    #[error("{parameter} already has supports; pass force to replace them")]
    ExistingSupports { parameter: ParameterId },

    /// A parameter was given a group (multi-dimensional) domain.
    #[error("{parameter_name} needs a scalar domain, got {domain}")]
    NonScalarDomain {
        parameter_name: String,
        domain: String,
    },

    /// Batched query with combinatorics disabled needs aligned counts.
    #[error(
        "{parameter} has {found} supports where {expected} are required for an aligned query"
    )]
    UnalignedSupports {
        parameter: ParameterId,
        expected: usize,
        found: usize,
    },

    /// Clearing all supports of a parameter something still depends on.
    #[error("cannot delete all supports of {parameter}: still referenced by {dependents}")]
    InvariantViolation {
        parameter: ParameterId,
        dependents: String,
    },

    /// A measure or derivative names a parameter its variable does not
    /// depend on.
    #[error("{variable} does not depend on {parameter}")]
    ParameterMismatch {
        variable: VariableId,
        parameter: ParameterId,
    },

    #[error(transparent)]
    Support(#[from] SupportError),
}
