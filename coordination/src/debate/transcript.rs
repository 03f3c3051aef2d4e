//! Append-only transcript and the memory slices derived from it.

use serde::{Deserialize, Serialize};

use super::state::ParticipantRole;

/// One recorded turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    pub round: u32,
    pub speaker: ParticipantRole,
    pub text: String,
}

impl Utterance {
    /// `[Round N] Speaker: text`
    pub fn render(&self) -> String {
        format!("[Round {}] {}: {}", self.round, self.speaker, self.text)
    }
}

/// What a speaker gets to see before taking a turn: its own latest line
/// and the opponent's latest line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySlice {
    pub own_last: Option<String>,
    pub opponent_last: Option<String>,
}

/// Ordered log of utterances. Entries are never edited or removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptStore {
    entries: Vec<Utterance>,
}

impl TranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, speaker: ParticipantRole, text: impl Into<String>, round: u32) {
        self.entries.push(Utterance {
            round,
            speaker,
            text: text.into(),
        });
    }

    /// All entries, one `[Round N] Speaker: text` line each.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(Utterance::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Latest own and opponent lines for `speaker`, scanning newest first
    /// and stopping as soon as both are found.
    pub fn relevant_memory(&self, speaker: ParticipantRole) -> MemorySlice {
        let mut slice = MemorySlice::default();
        for entry in self.entries.iter().rev() {
            if entry.speaker == speaker {
                if slice.own_last.is_none() {
                    slice.own_last = Some(entry.text.clone());
                }
            } else if slice.opponent_last.is_none() {
                slice.opponent_last = Some(entry.text.clone());
            }
            if slice.own_last.is_some() && slice.opponent_last.is_some() {
                break;
            }
        }
        slice
    }

    pub fn entries(&self) -> &[Utterance] {
        &self.entries
    }

    pub fn last(&self) -> Option<&Utterance> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
