//! Scripted LLM provider — serves a fixed sequence of replies or failures.
//!
//! Clones share one script, so a provider handed to the oracle can be
//! inspected afterwards.  Once the script runs out every call fails.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::llm::{ChatMessage, ProviderError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    Reply(String),
    /// Transport-style failure.
    Fail(String),
    RateLimit,
}

#[derive(Debug, Default)]
struct Script {
    steps: VecDeque<ScriptStep>,
    prompts: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedProvider {
    script: Arc<Mutex<Script>>,
}

impl ScriptedProvider {
    pub fn new(steps: impl IntoIterator<Item = ScriptStep>) -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                steps: steps.into_iter().collect(),
                prompts: Vec::new(),
            })),
        }
    }

    pub fn from_replies<S: Into<String>>(replies: impl IntoIterator<Item = S>) -> Self {
        Self::new(replies.into_iter().map(|r| ScriptStep::Reply(r.into())))
    }

    /// Every prompt received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.script.lock().map(|s| s.prompts.clone()).unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().map(|s| s.steps.len()).unwrap_or(0)
    }

    pub async fn chat(&self, _history: &[ChatMessage], prompt: &str) -> Result<String, ProviderError> {
        let mut script = self
            .script
            .lock()
            .map_err(|_| ProviderError::Request("scripted provider lock poisoned".into()))?;
        script.prompts.push(prompt.to_string());
        match script.steps.pop_front() {
            Some(ScriptStep::Reply(text)) => Ok(text),
            Some(ScriptStep::Fail(msg)) => Err(ProviderError::Request(msg)),
            Some(ScriptStep::RateLimit) => Err(ProviderError::RateLimited("HTTP 429 Too Many Requests".into())),
            None => Err(ProviderError::Request("script exhausted".into())),
        }
    }
}
