//! Debate coordination library
//!
//! Runs a fixed-length, turn-based debate between two LLM-backed
//! participants and asks a judge for the verdict.
//!
//! - [`debate`]: turn schedule, transcript, participants, adjudicator,
//!   moderator, and checkpoints
//! - [`generator`]: the `TextGenerator` boundary plus Gemini,
//!   chat-completions, and scripted implementations
//! - [`config`]: run parameters and generator settings
//! - [`audit_log`]: append-only plain-text debate log
//! - [`text`]: truncation, wrapping, and similarity helpers
//!
//! # Usage
//!
//! ```no_run
//! use debate_coordination::{build_generator, DebateConfig, Moderator};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = DebateConfig::from_env();
//! let generator = build_generator(&config.generator)?;
//! let mut moderator = Moderator::new(config, generator);
//! let verdict = moderator.run("Is AI conscious?").await?;
//! println!("{}", verdict);
//! # Ok(())
//! # }
//! ```

pub mod audit_log;
pub mod config;
pub mod debate;
pub mod generator;
pub mod text;

pub use audit_log::{AuditLog, AuditLogError};
pub use config::{ConfigError, DebateConfig, GeneratorConfig, Provider};
pub use debate::{
    DebateCheckpoint, DebateError, DebateObserver, DebatePhase, DebateResult, MemorySlice,
    Moderator, ParticipantRole, TranscriptStore, Utterance, Verdict,
};
pub use generator::{build_generator, GeneratorError, ScriptedGenerator, TextGenerator};
