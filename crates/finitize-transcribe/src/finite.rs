//! The finite target model.
//!
//! Deliberately opaque: named variables and constraints with integer
//! identities, nothing else. Everything a solver would need beyond names
//! and counts lives in the transcription store, keyed by these ids.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a variable in the finite model.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct FiniteVar(pub(crate) usize);

/// Identity of a constraint in the finite model.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct FiniteCon(pub(crate) usize);

/// Identity of a reduced variable in the store's auxiliary list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ReducedVar(pub(crate) usize);

impl fmt::Display for FiniteVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "finite_var({})", self.0)
    }
}

impl fmt::Display for FiniteCon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "finite_con({})", self.0)
    }
}

impl fmt::Display for ReducedVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reduced_var({})", self.0)
    }
}

/// The finite counterpart model a transcription pass fills in.
#[derive(Debug, Clone, Default)]
pub struct FiniteModel {
    variables: Vec<String>,
    constraints: Vec<FiniteConstraint>,
}

#[derive(Debug, Clone)]
struct FiniteConstraint {
    name: String,
    variables: Vec<FiniteVar>,
}

impl FiniteModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_variable(&mut self, name: impl Into<String>) -> FiniteVar {
        let id = FiniteVar(self.variables.len());
        self.variables.push(name.into());
        id
    }

    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        variables: Vec<FiniteVar>,
    ) -> FiniteCon {
        let id = FiniteCon(self.constraints.len());
        self.constraints.push(FiniteConstraint {
            name: name.into(),
            variables,
        });
        id
    }

    pub fn variable_name(&self, id: FiniteVar) -> Option<&str> {
        self.variables.get(id.0).map(String::as_str)
    }

    pub fn constraint_name(&self, id: FiniteCon) -> Option<&str> {
        self.constraints.get(id.0).map(|c| c.name.as_str())
    }

    /// Finite variables a constraint references, in reference order.
    pub fn constraint_variables(&self, id: FiniteCon) -> Option<&[FiniteVar]> {
        self.constraints.get(id.0).map(|c| c.variables.as_slice())
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }
}
