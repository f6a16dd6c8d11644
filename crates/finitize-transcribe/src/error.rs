//! Error types for transcription.

use crate::finite::ReducedVar;
use crate::store::EntityRef;
use finitize_model::{ModelError, ParameterId};

/// Errors arising from a transcription pass or a store query.
#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    /// A parameter has no supports at all; nothing can be expanded over it.
    #[error("{0} has no supports; set or generate supports before transcribing")]
    MissingSupports(ParameterId),

    /// The entity (or the queried support tuple of it) was not produced
    /// by this build pass.
    #[error("{0} was not transcribed in this pass")]
    NotTranscribed(EntityRef),

    /// The entity kind has no registered transcription handling. New
    /// kinds hook in here rather than silently mapping to nothing.
    #[error("no transcription handling registered for {0}")]
    UnsupportedEntityKind(EntityRef),

    /// A reduced-variable reference whose owning record is gone.
    #[error("reduced variable {0} does not resolve to a transcribed record")]
    InvalidReducedReference(ReducedVar),

    #[error(transparent)]
    Model(#[from] ModelError),
}
