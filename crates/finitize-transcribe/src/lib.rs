//! # Finitize Transcribe
//!
//! The last layer: expand a model's infinite entities over the cross
//! product of their parameters' supports into a finite counterpart model
//! a numerical solver can consume.
//!
//! One call to [`transcribe`] produces two things:
//!
//! - a [`FiniteModel`]: opaque named variables and constraints;
//! - a [`TranscriptionStore`]: the per-entity mapping from support
//!   tuples to counterparts, plus the auxiliary reduced-variable list.
//!
//! The store is valid until the model mutates again; the model's ready
//! bit says which side of that line you are on.

pub mod engine;
pub mod error;
pub mod finite;
pub mod store;

pub use engine::{TranscribeOptions, transcribe};
pub use error::TranscriptionError;
pub use finite::{FiniteCon, FiniteModel, FiniteVar, ReducedVar};
pub use store::{
    EntityRef, ReducedRecord, SupportTuple, TranscriptionStore, VariableSlot,
};
