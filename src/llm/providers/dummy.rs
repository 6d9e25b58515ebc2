//! Dummy LLM provider — echoes the prompt back prefixed with `[echo]`.
//! Used for running the whole consultation without a real API key.

use crate::llm::{ChatMessage, ProviderError};

#[derive(Debug, Clone)]
pub struct DummyProvider;

impl DummyProvider {
    pub async fn chat(&self, _history: &[ChatMessage], prompt: &str) -> Result<String, ProviderError> {
        Ok(format!("[echo] {prompt}"))
    }
}
