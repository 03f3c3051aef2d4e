//! A single debater: prompt construction, output shaping, and the
//! per-speaker repetition guard.

use std::sync::Arc;

use tracing::{debug, warn};

use super::error::{DebateError, DebateResult};
use super::state::ParticipantRole;
use super::transcript::MemorySlice;
use crate::config::DebateConfig;
use crate::generator::{GeneratorError, TextGenerator};
use crate::text::{similarity_ratio, truncate_words, wrap};

/// Replaces an utterance that repeats one of the speaker's earlier lines.
pub const SKIP_SENTINEL: &str = "(Skipped: could not generate unique point)";

/// Shown in the prompt when a memory slot is empty.
const ABSENT: &str = "N/A";

/// Output shaping knobs, taken from [`DebateConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtteranceLimits {
    pub max_words: usize,
    pub similarity_threshold: f64,
    pub wrap_width: usize,
}

impl Default for UtteranceLimits {
    fn default() -> Self {
        Self::from(&DebateConfig::default())
    }
}

impl From<&DebateConfig> for UtteranceLimits {
    fn from(config: &DebateConfig) -> Self {
        Self {
            max_words: config.max_words,
            similarity_threshold: config.similarity_threshold,
            wrap_width: config.wrap_width,
        }
    }
}

pub struct Participant {
    role: ParticipantRole,
    generator: Arc<dyn TextGenerator>,
    limits: UtteranceLimits,
    /// This speaker's own past lines, unwrapped.
    memory: Vec<String>,
}

impl Participant {
    pub fn new(
        role: ParticipantRole,
        generator: Arc<dyn TextGenerator>,
        limits: UtteranceLimits,
    ) -> Self {
        Self {
            role,
            generator,
            limits,
            memory: Vec::new(),
        }
    }

    /// Restore previously spoken lines (checkpoint resume).
    pub fn with_memory(mut self, memory: Vec<String>) -> Self {
        self.memory = memory;
        self
    }

    pub fn role(&self) -> ParticipantRole {
        self.role
    }

    pub fn memory(&self) -> &[String] {
        &self.memory
    }

    pub fn build_prompt(&self, topic: &str, round: u32, slice: &MemorySlice) -> String {
        format!(
            "You are the {role} in a friendly debate.\n\
             Topic: '{topic}'.\n\
             Round: {round}.\n\
             Your opponent just said: {opponent}.\n\
             Your previous point was: {own}.\n\n\
             Answer with exactly ONE new sentence of 15 to 18 words.\n\
             Use very simple, clear English that a school student would understand.\n\
             Avoid academic or difficult words.\n\
             Do not repeat any earlier point from you or your opponent.",
            role = self.role,
            topic = topic,
            round = round,
            opponent = slice.opponent_last.as_deref().unwrap_or(ABSENT),
            own = slice.own_last.as_deref().unwrap_or(ABSENT),
        )
    }

    /// Produce this speaker's line for `round`.
    ///
    /// The result is word-capped, replaced by [`SKIP_SENTINEL`] when it
    /// repeats an earlier line of this speaker, and wrapped for display.
    pub async fn generate(
        &mut self,
        topic: &str,
        round: u32,
        slice: &MemorySlice,
    ) -> DebateResult<String> {
        let prompt = self.build_prompt(topic, round, slice);
        let raw = self
            .generator
            .complete(&prompt)
            .await
            .map_err(|source| self.failure(round, source))?;

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(self.failure(round, GeneratorError::EmptyResponse));
        }

        let mut text = truncate_words(trimmed, self.limits.max_words);

        if let Some(ratio) = self.repeats_earlier_point(&text) {
            warn!(
                role = %self.role,
                round,
                similarity = ratio,
                "generated line repeats an earlier point, skipping"
            );
            text = SKIP_SENTINEL.to_string();
        }

        debug!(role = %self.role, round, words = text.split_whitespace().count(), "argument ready");
        let wrapped = wrap(&text, self.limits.wrap_width);
        self.memory.push(text);
        Ok(wrapped)
    }

    /// Similarity to the first earlier own line above the threshold.
    fn repeats_earlier_point(&self, text: &str) -> Option<f64> {
        self.memory
            .iter()
            .map(|prev| similarity_ratio(text, prev))
            .find(|ratio| *ratio > self.limits.similarity_threshold)
    }

    fn failure(&self, round: u32, source: GeneratorError) -> DebateError {
        DebateError::GenerationFailure {
            role: self.role,
            round,
            source,
        }
    }
}
