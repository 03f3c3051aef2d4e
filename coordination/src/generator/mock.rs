//! Deterministic generator for tests and offline runs.
//!
//! Replies are served from a queue in call order; once the queue is empty
//! the optional fallback reply is repeated. Every prompt is recorded so
//! tests can assert on what was asked.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{GeneratorError, TextGenerator};

/// Scripted replies, in order.
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, GeneratorError>>>,
    fallback: Option<String>,
    prompts: Mutex<Vec<String>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedGenerator {
    /// Generator that returns `replies` one per call.
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            fallback: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Generator that answers every call with the same text.
    pub fn repeating(reply: impl Into<String>) -> Self {
        Self {
            fallback: Some(reply.into()),
            ..Default::default()
        }
    }

    /// Reply used after the scripted queue runs dry.
    pub fn with_fallback(mut self, reply: impl Into<String>) -> Self {
        self.fallback = Some(reply.into());
        self
    }

    /// Queue a failure as the next unconsumed reply.
    pub fn then_fail(self, error: GeneratorError) -> Self {
        lock(&self.replies).push_back(Err(error));
        self
    }

    /// Number of `complete` calls so far.
    pub fn calls(&self) -> usize {
        lock(&self.prompts).len()
    }

    /// Every prompt received, in order.
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, prompt: &str) -> Result<String, GeneratorError> {
        lock(&self.prompts).push(prompt.to_string());

        if let Some(reply) = lock(&self.replies).pop_front() {
            return reply;
        }
        match &self.fallback {
            Some(text) => Ok(text.clone()),
            None => Err(GeneratorError::RequestFailed(
                "scripted generator exhausted".to_string(),
            )),
        }
    }
}
