//! # Finitize Model
//!
//! The pre-transcription model: continuous ("infinite") parameters with
//! their support stores, the entities indexed by them (variables,
//! measures, constraints, derivatives), and the mutation paths that keep
//! everything consistent.
//!
//! The model carries one explicit `ready` dirty bit. Every mutation that
//! changes actual support values for an in-use parameter clears it;
//! only a completed transcription build sets it again. Downstream code
//! reads the bit once before solving.

pub mod entity;
pub mod error;
pub mod ids;
pub mod model;

pub use entity::{
    Constraint, Derivative, DerivativeMethod, Measure, Parameter, Variable,
};
pub use error::ModelError;
pub use ids::{ConstraintId, DerivativeId, MeasureId, ParameterId, VariableId};
pub use model::{Model, cross_product};
