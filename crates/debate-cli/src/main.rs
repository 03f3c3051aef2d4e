//! `debate`: run a Scientist vs Philosopher debate from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Ask for the topic interactively
//! debate
//!
//! # Topic on the command line, shorter debate, custom log
//! debate --topic "Is AI conscious?" --rounds 4 --log-file ./logs/ai.txt
//!
//! # Local OpenAI-compatible router instead of Gemini
//! DEBATE_PROVIDER=chat ROUTER_URL=http://localhost:8000/v1/chat/completions debate
//!
//! # Checkpoint every turn, then pick up where a failed run stopped
//! debate --topic "Tea or coffee?" --checkpoint ./run.json
//! debate --resume ./run.json
//! ```
//!
//! Settings come from `.env`, the environment, an optional `--config` TOML
//! file, and the flags below (flags win).

mod console;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use debate_coordination::{build_generator, DebateCheckpoint, DebateConfig, Moderator, Provider};
use tracing::info;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Debate topic; prompted for when omitted
    #[arg(long)]
    topic: Option<String>,

    /// Number of rounds (overrides DEBATE_MAX_ROUNDS)
    #[arg(long)]
    rounds: Option<u32>,

    /// Audit log file (overrides LOG_FILE)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Text generation backend: gemini or chat_completions (overrides DEBATE_PROVIDER)
    #[arg(long)]
    provider: Option<Provider>,

    /// Model identifier (overrides GEMINI_MODEL / ROUTER_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// TOML file with run settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a resumable checkpoint here after every turn
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// Resume the run saved in this checkpoint and keep saving to it
    #[arg(long, conflicts_with = "topic")]
    resume: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<DebateConfig> {
    let mut config = match &args.config {
        Some(path) => DebateConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => DebateConfig::default(),
    };

    // A provider flag decides which *_MODEL / *_API_KEY variables apply.
    let cli_provider = args.provider;
    if let Some(provider) = cli_provider {
        config.generator.provider = provider;
    }
    config.apply_env(|key| {
        if key == "DEBATE_PROVIDER" && cli_provider.is_some() {
            return None;
        }
        std::env::var(key).ok()
    });

    if let Some(rounds) = args.rounds {
        config.max_rounds = rounds;
    }
    if let Some(path) = &args.log_file {
        config.log_path = path.clone();
    }
    if let Some(model) = &args.model {
        config.generator.model = Some(model.clone());
    }
    if let Some(path) = &args.checkpoint {
        config.checkpoint_path = Some(path.clone());
    }
    // A resumed run keeps saving to the checkpoint it was loaded from.
    if let (None, Some(path)) = (&config.checkpoint_path, &args.resume) {
        config.checkpoint_path = Some(path.clone());
    }

    config.validate()?;
    Ok(config)
}

fn prompt_topic() -> Result<String> {
    print!("Enter topic for debate: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read topic from stdin")?;

    let topic = line.trim().to_string();
    if topic.is_empty() {
        bail!("No debate topic given");
    }
    Ok(topic)
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let generator =
        build_generator(&config.generator).context("Failed to set up text generator")?;
    info!(
        provider = %config.generator.provider,
        model = %config.generator.model(),
        rounds = config.max_rounds,
        log = %config.log_path.display(),
        "Debate configured"
    );

    let (moderator, topic, resumed_at) = match &args.resume {
        Some(path) => {
            let checkpoint = DebateCheckpoint::load(path)
                .with_context(|| format!("Failed to load checkpoint {}", path.display()))?;
            let topic = checkpoint.topic.clone();
            let round = checkpoint.turn.round;
            (Moderator::resume(config, generator, checkpoint)?, topic, Some(round))
        }
        None => {
            let topic = match args.topic.clone() {
                Some(topic) if !topic.trim().is_empty() => topic.trim().to_string(),
                Some(_) => bail!("Debate topic must not be empty"),
                None => prompt_topic()?,
            };
            (Moderator::new(config, generator), topic, None)
        }
    };

    console::print_banner(&topic, resumed_at);
    let mut moderator = moderator.with_observer(console::ConsoleObserver);
    moderator
        .run(&topic)
        .await
        .context("Debate did not complete")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_resume_conflicts_with_topic() {
        let result = Args::try_parse_from(["debate", "--topic", "x", "--resume", "cp.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::try_parse_from([
            "debate",
            "--rounds",
            "4",
            "--log-file",
            "/tmp/custom.txt",
            "--provider",
            "chat",
            "--model",
            "local-model",
        ])
        .unwrap();
        let config = load_config(&args).unwrap();
        assert_eq!(config.max_rounds, 4);
        assert_eq!(config.log_path, PathBuf::from("/tmp/custom.txt"));
        assert_eq!(config.generator.provider, Provider::ChatCompletions);
        assert_eq!(config.generator.model(), "local-model");
    }

    #[test]
    fn test_resume_keeps_checkpointing_to_same_file() {
        let args = Args::try_parse_from(["debate", "--resume", "x.json"]).unwrap();
        let config = load_config(&args).unwrap();
        if std::env::var("DEBATE_CHECKPOINT").is_err() {
            assert_eq!(config.checkpoint_path, Some(PathBuf::from("x.json")));
        }

        let args = Args::try_parse_from([
            "debate",
            "--resume",
            "x.json",
            "--checkpoint",
            "next.json",
        ])
        .unwrap();
        let config = load_config(&args).unwrap();
        assert_eq!(config.checkpoint_path, Some(PathBuf::from("next.json")));
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let args = Args::try_parse_from(["debate", "--rounds", "0"]).unwrap();
        assert!(load_config(&args).is_err());
    }
}
