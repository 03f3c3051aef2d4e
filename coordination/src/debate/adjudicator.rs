//! Judge: asks the backend for a verdict and shapes the reply.
//!
//! The reply is kept verbatim (after spacing cleanup) as
//! [`Verdict::rendered`], which is what gets displayed and logged. Summary,
//! winner and reason are additionally parsed out when the backend followed
//! the requested layout; a reply that ignores it still yields a verdict.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::{DebateError, DebateResult};
use super::state::ParticipantRole;
use crate::generator::{GeneratorError, TextGenerator};
use crate::text::wrap;

/// Lines starting with this are section headers and are never re-wrapped.
pub const JUDGE_MARKER: &str = "[Judge]";

/// Final outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Two or three sentence recap (empty if the judge skipped it).
    pub summary: String,
    pub winner: Option<ParticipantRole>,
    /// One-sentence justification (empty if missing).
    pub reason: String,
    /// Cleaned, wrapped judge output as shown to the user.
    pub rendered: String,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.rendered)
    }
}

pub struct Adjudicator {
    generator: Arc<dyn TextGenerator>,
    wrap_width: usize,
}

impl Adjudicator {
    pub fn new(generator: Arc<dyn TextGenerator>, wrap_width: usize) -> Self {
        Self {
            generator,
            wrap_width,
        }
    }

    pub fn build_prompt(&self, topic: &str, transcript: &str) -> String {
        format!(
            "Debate topic: {topic}\n\
             Transcript:\n\
             {transcript}\n\n\
             Judge this debate. Reply in exactly this format:\n\n\
             {marker} Summary of debate:\n\
             (a summary of at most 2-3 sentences)\n\n\
             {marker} Winner: ({a} or {b})\n\n\
             Reason: (one sentence explaining why)\n",
            topic = topic,
            transcript = transcript,
            marker = JUDGE_MARKER,
            a = ParticipantRole::Scientist,
            b = ParticipantRole::Philosopher,
        )
    }

    /// Ask for a verdict on the rendered transcript. One attempt, no retry.
    pub async fn evaluate(&self, topic: &str, transcript: &str) -> DebateResult<Verdict> {
        let prompt = self.build_prompt(topic, transcript);
        let raw = self
            .generator
            .complete(&prompt)
            .await
            .map_err(DebateError::AdjudicationFailure)?;

        if raw.trim().is_empty() {
            return Err(DebateError::AdjudicationFailure(
                GeneratorError::EmptyResponse,
            ));
        }

        let verdict = parse_verdict(&raw, self.wrap_width);
        match verdict.winner {
            Some(winner) => info!(%winner, "verdict delivered"),
            None => warn!("judge reply did not name a recognizable winner"),
        }
        Ok(verdict)
    }
}

/// Trim every line, drop blank ones, and separate the rest by blank lines.
/// Lines other than `[Judge]` headers are wrapped to `width`.
pub fn format_verdict_text(raw: &str, width: usize) -> String {
    non_blank_lines(raw)
        .map(|line| {
            if line.starts_with(JUDGE_MARKER) {
                line.to_string()
            } else {
                wrap(line, width)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn non_blank_lines(raw: &str) -> impl Iterator<Item = &str> {
    raw.lines().map(str::trim).filter(|l| !l.is_empty())
}

/// Verdict line patterns
static WINNER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\[judge\]\s*winner\s*:\s*[*_\s]*(scientist|philosopher)\b").unwrap()
});

static SUMMARY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\[judge\]\s*summary[^:]*:\s*(.*)$").unwrap());

static REASON_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[*_]*reason[*_]*\s*:[*_]*\s*(.*)$").unwrap());

#[derive(Clone, Copy, PartialEq)]
enum Section {
    None,
    Summary,
    Reason,
}

/// Build a [`Verdict`] from a raw judge reply.
pub fn parse_verdict(raw: &str, width: usize) -> Verdict {
    let mut summary: Vec<&str> = Vec::new();
    let mut reason: Vec<&str> = Vec::new();
    let mut winner = None;
    let mut section = Section::None;

    for line in non_blank_lines(raw) {
        if let Some(caps) = SUMMARY_PATTERN.captures(line) {
            section = Section::Summary;
            if let Some(rest) = caps.get(1).filter(|m| !m.as_str().is_empty()) {
                summary.push(rest.as_str());
            }
        } else if let Some(caps) = WINNER_PATTERN.captures(line) {
            section = Section::None;
            winner = caps.get(1).and_then(|m| m.as_str().parse().ok());
        } else if let Some(caps) = REASON_PATTERN.captures(line) {
            section = Section::Reason;
            if let Some(rest) = caps.get(1).filter(|m| !m.as_str().is_empty()) {
                reason.push(rest.as_str());
            }
        } else if line.starts_with(JUDGE_MARKER) {
            section = Section::None;
        } else {
            match section {
                Section::Summary => summary.push(line),
                Section::Reason => reason.push(line),
                Section::None => {}
            }
        }
    }

    Verdict {
        summary: summary.join(" "),
        winner,
        reason: reason.join(" "),
        rendered: format_verdict_text(raw, width),
    }
}
