//! # Finitize Supports
//!
//! Leaf primitives for discretizing continuous ("infinite") parameters:
//! every entity indexed by such a parameter must eventually be evaluated at
//! a finite set of points — its **supports** — before a numerical solver
//! can see it.
//!
//! This crate owns the pieces that do not need a model:
//!
//! ```text
//! round_sig / SupportKey   ← rounded values, total-ordered map keys
//!     │
//! Label / LabelSelector    ← why a support exists, how to filter them
//!     │
//! SupportMap               ← ordered value → label-set store
//!     │
//! Domain                   ← interval / distribution / collection descriptors
//!     │
//! GeneratorRegistry        ← (domain kind, method) → support generator
//!     │
//! GenerativeInfo           ← interior points derived from existing ones
//! ```
//!
//! The model layer (`finitize-model`) stitches these into per-parameter
//! stores; the transcription layer expands entities across them.

pub mod domain;
pub mod error;
pub mod generative;
pub mod generator;
pub mod label;
pub mod map;
pub mod value;

pub use domain::{Domain, DomainKind, UnivariateDist};
pub use error::SupportError;
pub use generative::{GenerativeInfo, UniformBasis};
pub use generator::{Generated, GenerateRequest, Generator, GeneratorRegistry, Method};
pub use label::{Label, LabelSelector};
pub use map::SupportMap;
pub use value::{DEFAULT_SIG_DIGITS, DEFAULT_SUPPORT_COUNT, SupportKey, round_sig};
