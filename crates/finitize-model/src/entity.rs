//! Entity records owned by the model.

use crate::ids::{ParameterId, VariableId};
use finitize_supports::{
    DEFAULT_SIG_DIGITS, Domain, GenerativeInfo, SupportMap,
};
use serde::{Deserialize, Serialize};

/// How derivatives over a parameter are evaluated.
///
/// Carried as a tag: constructing the actual derivative approximation is
/// solver-side work. Orthogonal collocation is what makes a parameter
/// carry generative supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivativeMethod {
    FiniteDifference,
    OrthogonalCollocation { nodes: usize },
}

impl Default for DerivativeMethod {
    fn default() -> Self {
        DerivativeMethod::FiniteDifference
    }
}

/// A continuous parameter: domain, support store, precision, and
/// generative configuration.
///
/// Owned exclusively by the model; supports are mutated only through the
/// model's support store operations so invalidation never gets skipped.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub domain: Domain,
    pub sig_digits: u32,
    pub deriv_method: DerivativeMethod,
    pub generative: GenerativeInfo,
    pub(crate) supports: SupportMap,
    /// Whether generative points are currently materialized.
    pub(crate) has_generative: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, domain: Domain) -> Self {
        Self {
            name: name.into(),
            domain,
            sig_digits: DEFAULT_SIG_DIGITS,
            deriv_method: DerivativeMethod::default(),
            generative: GenerativeInfo::None,
            supports: SupportMap::new(),
            has_generative: false,
        }
    }

    /// True iff at least one stored support carries an internal label.
    pub fn has_internal_supports(&self) -> bool {
        self.supports.has_internal()
    }

    /// True iff generative points are currently materialized.
    pub fn has_generative_supports(&self) -> bool {
        self.has_generative
    }
}

/// A decision variable. An empty parameter list means the variable is
/// finite and transcribes to a single counterpart.
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub parameters: Vec<ParameterId>,
}

impl Variable {
    pub fn is_infinite(&self) -> bool {
        !self.parameters.is_empty()
    }
}

/// A measure: integrates a variable over a subset of its parameters.
///
/// `label_id` is the freshly allocated integer behind this measure's
/// unique support label.
#[derive(Debug, Clone)]
pub struct Measure {
    pub name: String,
    pub variable: VariableId,
    pub integrated: Vec<ParameterId>,
    pub label_id: u64,
}

/// A constraint over one or more variables. Its parameter dependencies
/// are the union of the referenced variables'.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub name: String,
    pub variables: Vec<VariableId>,
}

/// A derivative of a variable with respect to one parameter.
///
/// `materialized` tracks whether downstream derivative-constraint state
/// is current; support mutation on the parameter resets it.
#[derive(Debug, Clone)]
pub struct Derivative {
    pub variable: VariableId,
    pub parameter: ParameterId,
    pub(crate) materialized: bool,
}

impl Derivative {
    pub fn is_materialized(&self) -> bool {
        self.materialized
    }
}
