//! Colored terminal output for a running debate.

use colored::Colorize;
use debate_coordination::{DebateObserver, ParticipantRole, Utterance, Verdict};

/// Prints each turn as it lands and the verdict at the end.
pub struct ConsoleObserver;

pub fn turn_line(utterance: &Utterance) -> String {
    format!(
        "[Round {}] {}: {}",
        utterance.round, utterance.speaker, utterance.text
    )
}

impl DebateObserver for ConsoleObserver {
    fn on_turn(&mut self, utterance: &Utterance) {
        let line = turn_line(utterance);
        match utterance.speaker {
            ParticipantRole::Scientist => println!("{}", line.blue()),
            ParticipantRole::Philosopher => println!("{}", line.green()),
        }
    }

    fn on_verdict(&mut self, verdict: &Verdict) {
        println!("\n{}", verdict.rendered.yellow());
    }
}

pub fn print_banner(topic: &str, resumed_at: Option<u32>) {
    println!("\n{} {}\n", "Debate topic:".bold(), topic);
    match resumed_at {
        Some(round) => {
            println!("Resuming debate between Scientist and Philosopher at round {round}...\n")
        }
        None => println!("Starting debate between Scientist and Philosopher...\n"),
    }
}
