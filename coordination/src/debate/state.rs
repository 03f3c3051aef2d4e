//! Roles, turn schedule, and run phases.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error::DebateError;

/// One of the two fixed debaters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticipantRole {
    /// Speaks on odd rounds.
    Scientist,
    /// Speaks on even rounds.
    Philosopher,
}

impl ParticipantRole {
    pub const ALL: [ParticipantRole; 2] = [Self::Scientist, Self::Philosopher];

    /// The role scheduled for `round` (odd → Scientist, even → Philosopher).
    pub fn for_round(round: u32) -> Self {
        if round % 2 == 1 {
            Self::Scientist
        } else {
            Self::Philosopher
        }
    }

    pub fn other(self) -> Self {
        match self {
            Self::Scientist => Self::Philosopher,
            Self::Philosopher => Self::Scientist,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Scientist => "Scientist",
            Self::Philosopher => "Philosopher",
        }
    }
}

impl std::fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Error parsing a role name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl std::str::FromStr for ParticipantRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned = s.trim().trim_matches(|c: char| !c.is_alphanumeric());
        match cleaned.to_lowercase().as_str() {
            "scientist" | "a" => Ok(Self::Scientist),
            "philosopher" | "b" => Ok(Self::Philosopher),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// Whose turn it is and which round it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    pub round: u32,
    pub speaker: ParticipantRole,
}

impl Default for TurnState {
    fn default() -> Self {
        Self {
            round: 1,
            speaker: ParticipantRole::Scientist,
        }
    }
}

impl TurnState {
    /// Fails when the speaker does not own the current round.
    pub fn validate(&self) -> Result<(), DebateError> {
        if self.round == 0 || ParticipantRole::for_round(self.round) != self.speaker {
            return Err(DebateError::TurnViolation {
                round: self.round,
                speaker: self.speaker,
            });
        }
        Ok(())
    }

    /// Hand the floor to the other role and move to the next round.
    pub fn advance(&mut self) {
        self.speaker = self.speaker.other();
        self.round += 1;
    }

    /// Whether another turn is allowed under `max_rounds`.
    pub fn has_turns_remaining(&self, max_rounds: u32) -> bool {
        self.round <= max_rounds
    }
}

/// Phase of a debate run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DebatePhase {
    /// Topic accepted, no turns yet.
    Intake,
    /// Participants are alternating.
    Turns,
    /// Rounds exhausted, waiting on the verdict.
    Judging,
    /// Verdict delivered.
    Finished,
}

impl DebatePhase {
    pub fn is_terminal(self) -> bool {
        self == Self::Finished
    }

    pub fn valid_transitions(self) -> &'static [DebatePhase] {
        match self {
            // Intake → Judging covers a resumed run whose rounds were already spent.
            Self::Intake => &[Self::Turns, Self::Judging],
            Self::Turns => &[Self::Turns, Self::Judging],
            Self::Judging => &[Self::Finished],
            Self::Finished => &[],
        }
    }

    pub fn can_transition_to(self, to: DebatePhase) -> bool {
        self.valid_transitions().contains(&to)
    }
}

impl std::fmt::Display for DebatePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Intake => write!(f, "intake"),
            Self::Turns => write!(f, "turns"),
            Self::Judging => write!(f, "judging"),
            Self::Finished => write!(f, "finished"),
        }
    }
}
