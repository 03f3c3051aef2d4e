//! Two-party debate: alternating turns and a judged verdict.
//!
//! # Debate Flow
//!
//! ```text
//! Intake → Scientist (round 1) → Philosopher (round 2) → … → round > max_rounds
//!                                                                 │
//!                                                                 ▼
//!                                                         Adjudicator → Verdict
//! ```
//!
//! The [`Moderator`] owns the turn state and the [`TranscriptStore`]; each
//! [`Participant`] only keeps its own past lines for the repetition guard.

pub mod adjudicator;
pub mod error;
pub mod moderator;
pub mod participant;
pub mod persistence;
pub mod state;
pub mod transcript;

pub use adjudicator::{Adjudicator, Verdict, JUDGE_MARKER};
pub use error::{DebateError, DebateResult};
pub use moderator::{DebateObserver, Moderator, NoopObserver};
pub use participant::{Participant, UtteranceLimits, SKIP_SENTINEL};
pub use persistence::{
    validate_checkpoint, DebateCheckpoint, IntegrityStatus, PersistenceError,
};
pub use state::{DebatePhase, ParticipantRole, TurnState};
pub use transcript::{MemorySlice, TranscriptStore, Utterance};
