//! Debate persistence: checkpoint and resume for interrupted runs.
//!
//! A checkpoint is written after every completed turn. It carries enough to
//! continue with the next turn: topic, turn state, transcript, and both
//! speakers' repetition memories.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::{ParticipantRole, TurnState};
use super::transcript::TranscriptStore;

/// A complete debate checkpoint for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateCheckpoint {
    /// Schema version for forward compatibility.
    pub version: u32,
    /// Identifier shared by every checkpoint of one run.
    pub run_id: String,
    pub topic: String,
    /// The turn that has not happened yet.
    pub turn: TurnState,
    pub transcript: TranscriptStore,
    pub scientist_memory: Vec<String>,
    pub philosopher_memory: Vec<String>,
    pub saved_at: DateTime<Utc>,
}

impl DebateCheckpoint {
    /// Current schema version.
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new(
        run_id: &str,
        topic: &str,
        turn: TurnState,
        transcript: &TranscriptStore,
        scientist_memory: &[String],
        philosopher_memory: &[String],
    ) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            run_id: run_id.to_string(),
            topic: topic.to_string(),
            turn,
            transcript: transcript.clone(),
            scientist_memory: scientist_memory.to_vec(),
            philosopher_memory: philosopher_memory.to_vec(),
            saved_at: Utc::now(),
        }
    }

    pub fn memory_for(&self, role: ParticipantRole) -> &[String] {
        match role {
            ParticipantRole::Scientist => &self.scientist_memory,
            ParticipantRole::Philosopher => &self.philosopher_memory,
        }
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, PersistenceError> {
        serde_json::to_string_pretty(self).map_err(|e| PersistenceError::SerializeFailed {
            reason: e.to_string(),
        })
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        let checkpoint: Self =
            serde_json::from_str(json).map_err(|e| PersistenceError::DeserializeFailed {
                reason: e.to_string(),
            })?;

        if checkpoint.version > Self::CURRENT_VERSION {
            return Err(PersistenceError::VersionMismatch {
                expected: Self::CURRENT_VERSION,
                found: checkpoint.version,
            });
        }

        Ok(checkpoint)
    }

    /// Write to `path`, replacing any previous checkpoint atomically.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let path = path.as_ref();
        let io_err = |e: std::io::Error| PersistenceError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, self.to_json()?).map_err(io_err)?;
        std::fs::rename(&tmp, path).map_err(io_err)?;
        Ok(())
    }

    /// Read and validate a checkpoint. Corrupted checkpoints are rejected.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| PersistenceError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let checkpoint = Self::from_json(&raw)?;

        if let IntegrityStatus::Corrupted { errors } = validate_checkpoint(&checkpoint) {
            return Err(PersistenceError::IntegrityCheckFailed {
                reason: errors.join("; "),
            });
        }
        Ok(checkpoint)
    }
}

/// Error during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// Serialization failed.
    SerializeFailed { reason: String },
    /// Deserialization failed.
    DeserializeFailed { reason: String },
    /// Schema version mismatch.
    VersionMismatch { expected: u32, found: u32 },
    /// Integrity check failed on restore.
    IntegrityCheckFailed { reason: String },
    /// Filesystem error.
    Io { path: PathBuf, reason: String },
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SerializeFailed { reason } => write!(f, "serialize failed: {}", reason),
            Self::DeserializeFailed { reason } => write!(f, "deserialize failed: {}", reason),
            Self::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "version mismatch: expected {}, found {}",
                    expected, found
                )
            }
            Self::IntegrityCheckFailed { reason } => {
                write!(f, "integrity check failed: {}", reason)
            }
            Self::Io { path, reason } => write!(f, "{}: {}", path.display(), reason),
        }
    }
}

impl std::error::Error for PersistenceError {}

/// Integrity check result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityStatus {
    /// Checkpoint is valid and can be resumed.
    Valid,
    /// Checkpoint has minor issues but is recoverable.
    Recoverable { warnings: Vec<String> },
    /// Checkpoint is corrupted and cannot be used.
    Corrupted { errors: Vec<String> },
}

impl IntegrityStatus {
    /// Whether resume is safe.
    pub fn can_resume(&self) -> bool {
        matches!(self, Self::Valid | Self::Recoverable { .. })
    }
}

/// Validate a checkpoint's integrity before resuming.
///
/// The pending turn's speaker is not checked here; the
/// moderator rejects a mismatched speaker before its first call.
pub fn validate_checkpoint(checkpoint: &DebateCheckpoint) -> IntegrityStatus {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    if checkpoint.version > DebateCheckpoint::CURRENT_VERSION {
        errors.push(format!(
            "version {} > current {}",
            checkpoint.version,
            DebateCheckpoint::CURRENT_VERSION
        ));
    }

    if checkpoint.topic.trim().is_empty() {
        errors.push("empty topic".to_string());
    }

    // Rounds must be 1, 2, 3, ... with parity-matched speakers.
    for (idx, entry) in checkpoint.transcript.entries().iter().enumerate() {
        let expected_round = idx as u32 + 1;
        if entry.round != expected_round {
            errors.push(format!(
                "transcript entry {} has round {}, expected {}",
                idx, entry.round, expected_round
            ));
        } else if entry.speaker != ParticipantRole::for_round(entry.round) {
            errors.push(format!(
                "round {} was spoken by {}",
                entry.round, entry.speaker
            ));
        }
    }

    let next_round = checkpoint.transcript.len() as u32 + 1;
    if checkpoint.turn.round != next_round {
        errors.push(format!(
            "pending round {} does not follow transcript of {} entries",
            checkpoint.turn.round,
            checkpoint.transcript.len()
        ));
    }

    for role in ParticipantRole::ALL {
        let spoken = checkpoint
            .transcript
            .entries()
            .iter()
            .filter(|e| e.speaker == role)
            .count();
        let remembered = checkpoint.memory_for(role).len();
        if spoken != remembered {
            warnings.push(format!(
                "{} spoke {} times but remembers {} lines",
                role, spoken, remembered
            ));
        }
    }

    if !errors.is_empty() {
        IntegrityStatus::Corrupted { errors }
    } else if !warnings.is_empty() {
        IntegrityStatus::Recoverable { warnings }
    } else {
        IntegrityStatus::Valid
    }
}
