//! Debate run errors.

use thiserror::Error;

use super::persistence::PersistenceError;
use super::state::{DebatePhase, ParticipantRole};
use crate::generator::GeneratorError;

pub type DebateResult<T> = Result<T, DebateError>;

/// Everything that can stop a debate run.
///
/// Audit-log failures are absent on purpose: they are reported as warnings
/// and never end a run.
#[derive(Debug, Error)]
pub enum DebateError {
    /// The speaker does not own the current round. Scheduling bug.
    #[error("invalid turn: {speaker} tried to speak in round {round}")]
    TurnViolation { round: u32, speaker: ParticipantRole },

    #[error("{role} failed to generate an argument in round {round}: {source}")]
    GenerationFailure {
        role: ParticipantRole,
        round: u32,
        #[source]
        source: GeneratorError,
    },

    #[error("adjudication failed: {0}")]
    AdjudicationFailure(#[source] GeneratorError),

    #[error("invalid phase transition {from} → {to}")]
    InvalidPhase { from: DebatePhase, to: DebatePhase },

    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] PersistenceError),
}
