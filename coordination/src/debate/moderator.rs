//! Debate moderator: drives intake, alternating turns, and the verdict.
//!
//! ```text
//! Intake → Turns (round 1..=max_rounds, speaker by parity) → Judging → Finished
//! ```
//!
//! Every completed turn is appended to the transcript, reported to the
//! observer, written to the audit log, and optionally checkpointed. Audit
//! and checkpoint write failures are logged as warnings and never end a run.

use std::sync::Arc;

use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::adjudicator::{Adjudicator, Verdict};
use super::error::{DebateError, DebateResult};
use super::participant::{Participant, UtteranceLimits};
use super::persistence::{
    validate_checkpoint, DebateCheckpoint, IntegrityStatus, PersistenceError,
};
use super::state::{DebatePhase, ParticipantRole, TurnState};
use super::transcript::{TranscriptStore, Utterance};
use crate::audit_log::AuditLog;
use crate::config::DebateConfig;
use crate::generator::TextGenerator;

/// Hooks for presenting a run as it happens (console, UI, tests).
pub trait DebateObserver: Send {
    fn on_turn(&mut self, _utterance: &Utterance) {}
    fn on_verdict(&mut self, _verdict: &Verdict) {}
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl DebateObserver for NoopObserver {}

pub struct Moderator {
    config: DebateConfig,
    run_id: String,
    phase: DebatePhase,
    turn: TurnState,
    transcript: TranscriptStore,
    scientist: Participant,
    philosopher: Participant,
    adjudicator: Adjudicator,
    audit: AuditLog,
    observer: Box<dyn DebateObserver>,
}

impl Moderator {
    /// A fresh run starting at round 1 with the Scientist.
    pub fn new(config: DebateConfig, generator: Arc<dyn TextGenerator>) -> Self {
        Self::assemble(
            config,
            generator,
            Uuid::new_v4().to_string(),
            TurnState::default(),
            TranscriptStore::new(),
            Vec::new(),
            Vec::new(),
        )
    }

    /// Continue a run from a checkpoint. Run it with the checkpoint's topic.
    pub fn resume(
        config: DebateConfig,
        generator: Arc<dyn TextGenerator>,
        checkpoint: DebateCheckpoint,
    ) -> DebateResult<Self> {
        match validate_checkpoint(&checkpoint) {
            IntegrityStatus::Valid => {}
            IntegrityStatus::Recoverable { warnings } => {
                for w in &warnings {
                    warn!(run_id = %checkpoint.run_id, "checkpoint: {}", w);
                }
            }
            IntegrityStatus::Corrupted { errors } => {
                return Err(PersistenceError::IntegrityCheckFailed {
                    reason: errors.join("; "),
                }
                .into());
            }
        }

        info!(
            run_id = %checkpoint.run_id,
            round = checkpoint.turn.round,
            speaker = %checkpoint.turn.speaker,
            "resuming debate from checkpoint"
        );

        Ok(Self::assemble(
            config,
            generator,
            checkpoint.run_id,
            checkpoint.turn,
            checkpoint.transcript,
            checkpoint.scientist_memory,
            checkpoint.philosopher_memory,
        ))
    }

    fn assemble(
        config: DebateConfig,
        generator: Arc<dyn TextGenerator>,
        run_id: String,
        turn: TurnState,
        transcript: TranscriptStore,
        scientist_memory: Vec<String>,
        philosopher_memory: Vec<String>,
    ) -> Self {
        let limits = UtteranceLimits::from(&config);
        Self {
            run_id,
            phase: DebatePhase::Intake,
            turn,
            transcript,
            scientist: Participant::new(ParticipantRole::Scientist, generator.clone(), limits)
                .with_memory(scientist_memory),
            philosopher: Participant::new(ParticipantRole::Philosopher, generator.clone(), limits)
                .with_memory(philosopher_memory),
            adjudicator: Adjudicator::new(generator, config.wrap_width),
            audit: AuditLog::new(&config.log_path),
            observer: Box::new(NoopObserver),
            config,
        }
    }

    pub fn with_observer(mut self, observer: impl DebateObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Run every remaining turn, then adjudicate.
    ///
    /// Stops at the first generation failure or turn violation; nothing
    /// after that point is attempted.
    pub async fn run(&mut self, topic: &str) -> DebateResult<Verdict> {
        let span = info_span!("debate", run_id = %self.run_id);
        self.run_inner(topic).instrument(span).await
    }

    async fn run_inner(&mut self, topic: &str) -> DebateResult<Verdict> {
        self.intake(topic)?;
        while self.turn.has_turns_remaining(self.config.max_rounds) {
            self.take_turn(topic).await?;
        }
        self.adjudicate(topic).await
    }

    fn intake(&mut self, topic: &str) -> DebateResult<()> {
        if self.phase != DebatePhase::Intake {
            return Err(DebateError::InvalidPhase {
                from: self.phase,
                to: DebatePhase::Turns,
            });
        }

        if self.transcript.is_empty() {
            info!(topic, max_rounds = self.config.max_rounds, "debate started");
            self.audit(&format!("\n--- Debate on: {} ---", topic));
        } else {
            info!(topic, round = self.turn.round, "debate resumed");
            self.audit(&format!(
                "\n--- Resuming debate on: {} (round {}) ---",
                topic, self.turn.round
            ));
        }
        Ok(())
    }

    async fn take_turn(&mut self, topic: &str) -> DebateResult<()> {
        // Checked before anything is asked of the backend.
        self.turn.validate()?;
        self.enter(DebatePhase::Turns)?;

        let TurnState { round, speaker } = self.turn;
        let slice = self.transcript.relevant_memory(speaker);
        let participant = match speaker {
            ParticipantRole::Scientist => &mut self.scientist,
            ParticipantRole::Philosopher => &mut self.philosopher,
        };
        let text = participant.generate(topic, round, &slice).await?;

        self.transcript.append(speaker, text, round);
        if let Some(utterance) = self.transcript.last() {
            self.observer.on_turn(utterance);
        }
        info!(round, %speaker, entries = self.transcript.len(), "turn recorded");

        self.audit(&format!("Transition: {} spoke in Round {}", speaker, round));
        self.audit(&format!(
            "Memory after Round {}:\n{}\n",
            round,
            self.transcript.render()
        ));

        self.turn.advance();
        self.save_checkpoint(topic);
        Ok(())
    }

    async fn adjudicate(&mut self, topic: &str) -> DebateResult<Verdict> {
        self.enter(DebatePhase::Judging)?;

        let transcript = self.transcript.render();
        let verdict = self.adjudicator.evaluate(topic, &transcript).await?;
        self.observer.on_verdict(&verdict);

        self.audit("Transition: Debate finished → Judge node");
        self.audit(&format!("\n[Judge Verdict]\n{}", verdict.rendered));
        self.audit(&"-".repeat(50));

        self.enter(DebatePhase::Finished)?;
        info!(
            winner = verdict.winner.map(|w| w.name()).unwrap_or("undecided"),
            turns = self.transcript.len(),
            "debate finished"
        );
        Ok(verdict)
    }

    fn enter(&mut self, to: DebatePhase) -> DebateResult<()> {
        if !self.phase.can_transition_to(to) {
            return Err(DebateError::InvalidPhase {
                from: self.phase,
                to,
            });
        }
        if self.phase != to {
            debug!(from = %self.phase, %to, "phase transition");
        }
        self.phase = to;
        Ok(())
    }

    fn audit(&self, text: &str) {
        if let Err(e) = self.audit.append(text) {
            warn!(error = %e, "audit log write failed, continuing without it");
        }
    }

    fn save_checkpoint(&self, topic: &str) {
        let Some(path) = &self.config.checkpoint_path else {
            return;
        };
        match self.checkpoint(topic).save(path) {
            Ok(()) => debug!(path = %path.display(), round = self.turn.round, "checkpoint saved"),
            Err(e) => warn!(error = %e, "checkpoint save failed, continuing"),
        }
    }

    /// Snapshot of the run as it stands now.
    pub fn checkpoint(&self, topic: &str) -> DebateCheckpoint {
        DebateCheckpoint::new(
            &self.run_id,
            topic,
            self.turn,
            &self.transcript,
            self.scientist.memory(),
            self.philosopher.memory(),
        )
    }

    pub fn transcript(&self) -> &TranscriptStore {
        &self.transcript
    }

    pub fn turn(&self) -> TurnState {
        self.turn
    }

    pub fn phase(&self) -> DebatePhase {
        self.phase
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn config(&self) -> &DebateConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::ScriptedGenerator;
    use std::sync::Mutex;

    const VERDICT: &str = "[Judge] Summary of debate:\nA short debate.\n\
                           [Judge] Winner: Scientist\nReason: Clearer points.";

    fn config_in(dir: &tempfile::TempDir) -> DebateConfig {
        DebateConfig {
            log_path: dir.path().join("logs").join("debate_log.txt"),
            ..Default::default()
        }
    }

    const LINES: [&str; 8] = [
        "Atoms in a brain follow the same rules as atoms in a rock.",
        "A rock never wonders why it exists, but people do every day.",
        "Computers can already copy many things that brains do with signals.",
        "Copying a song is not the same as enjoying the music.",
        "Scientists measure feelings by watching brain activity on special scanners.",
        "A scanner shows lights, yet it cannot show what pain feels like.",
        "If machines report pain the same way, we should take them seriously.",
        "Words about pain can be faked, so we need more than words.",
    ];

    fn script(turns: usize) -> Vec<String> {
        let mut replies: Vec<String> = LINES[..turns].iter().map(|s| s.to_string()).collect();
        replies.push(VERDICT.to_string());
        replies
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl DebateObserver for Recorder {
        fn on_turn(&mut self, u: &Utterance) {
            self.0.lock().unwrap().push(format!("turn:{}:{}", u.round, u.speaker));
        }
        fn on_verdict(&mut self, v: &Verdict) {
            self.0
                .lock()
                .unwrap()
                .push(format!("verdict:{:?}", v.winner));
        }
    }

    #[tokio::test]
    async fn test_full_run_order_and_phase() {
        let dir = tempfile::tempdir().unwrap();
        let gen = Arc::new(ScriptedGenerator::new(script(8)));
        let recorder = Recorder::default();

        let mut moderator =
            Moderator::new(config_in(&dir), gen.clone()).with_observer(recorder.clone());
        let verdict = moderator.run("Is AI conscious?").await.unwrap();

        assert_eq!(verdict.winner, Some(ParticipantRole::Scientist));
        assert_eq!(moderator.phase(), DebatePhase::Finished);
        assert_eq!(moderator.turn().round, 9);
        assert_eq!(gen.calls(), 9);

        let events = recorder.0.lock().unwrap().clone();
        assert_eq!(events.len(), 9);
        assert_eq!(events[0], "turn:1:Scientist");
        assert_eq!(events[1], "turn:2:Philosopher");
        assert_eq!(events[8], "verdict:Some(Scientist)");
    }

    #[tokio::test]
    async fn test_audit_log_contents() {
        let dir = tempfile::tempdir().unwrap();
        let config = DebateConfig {
            max_rounds: 2,
            ..config_in(&dir)
        };
        let log_path = config.log_path.clone();
        let mut moderator = Moderator::new(config, Arc::new(ScriptedGenerator::new(script(2))));
        moderator.run("Tea or coffee?").await.unwrap();

        let log = std::fs::read_to_string(log_path).unwrap();
        assert!(log.starts_with("\n--- Debate on: Tea or coffee? ---\n"));
        assert!(log.contains("Transition: Scientist spoke in Round 1\n"));
        assert!(log.contains("Transition: Philosopher spoke in Round 2\n"));
        assert!(log.contains("Memory after Round 2:\n[Round 1] Scientist: Atoms in a brain"));
        assert!(log.contains("Transition: Debate finished → Judge node\n"));
        assert!(log.contains("\n[Judge Verdict]\n[Judge] Summary of debate:"));
        assert!(log.trim_end().ends_with(&"-".repeat(50)));
    }

    #[tokio::test]
    async fn test_second_run_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = DebateConfig {
            max_rounds: 1,
            ..config_in(&dir)
        };
        let gen = Arc::new(ScriptedGenerator::repeating(VERDICT));
        let mut moderator = Moderator::new(config, gen);
        moderator.run("t").await.unwrap();

        let err = moderator.run("t").await.unwrap_err();
        assert!(matches!(
            err,
            DebateError::InvalidPhase {
                from: DebatePhase::Finished,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_checkpoint_written_after_each_turn() {
        let dir = tempfile::tempdir().unwrap();
        let checkpoint_path = dir.path().join("checkpoint.json");
        let config = DebateConfig {
            max_rounds: 3,
            checkpoint_path: Some(checkpoint_path.clone()),
            ..config_in(&dir)
        };
        let mut moderator = Moderator::new(config, Arc::new(ScriptedGenerator::new(script(3))));
        moderator.run("t").await.unwrap();

        let cp = DebateCheckpoint::load(&checkpoint_path).unwrap();
        assert_eq!(cp.run_id, moderator.run_id());
        assert_eq!(cp.turn.round, 4);
        assert_eq!(cp.transcript.len(), 3);
        assert_eq!(cp.scientist_memory.len(), 2);
        assert_eq!(cp.philosopher_memory.len(), 1);
    }

    #[tokio::test]
    async fn test_resume_rejects_corrupted_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let mut cp = Moderator::new(
            config_in(&dir),
            Arc::new(ScriptedGenerator::new(Vec::<String>::new())),
        )
        .checkpoint("t");
        cp.turn.round = 4;

        let result = Moderator::resume(
            config_in(&dir),
            Arc::new(ScriptedGenerator::new(Vec::<String>::new())),
            cp,
        );
        assert!(matches!(result, Err(DebateError::Checkpoint(_))));
    }
}
