//! LLM provider abstraction.
//!
//! `LlmProvider` is an enum over concrete provider implementations.
//! Add a new variant + module in `providers/` for each additional backend.
//!
//! Provider instances are shared immutable capabilities — clone them freely.
//! Every provider answers one request at a time: the caller passes the
//! conversation so far and the next prompt, and gets the reply text back.

pub mod providers;

use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("provider request failed: {0}")]
    Request(String),
    /// HTTP 429 or an exhausted quota.  Not worth retrying right away.
    #[error("provider rate limited: {0}")]
    RateLimited(String),
}

impl ProviderError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::RateLimited(_))
    }
}

// ── Conversation ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// One prior message handed to a provider as context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available provider backends.
///
/// Enum dispatch avoids `dyn` trait objects and the `async-trait` dependency.
/// Adding a backend = new module + new variant + new `chat` arm.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    Dummy(providers::dummy::DummyProvider),
    Scripted(providers::scripted::ScriptedProvider),
    OpenAiCompatible(providers::openai_compatible::OpenAiCompatibleProvider),
    Gemini(providers::gemini::GeminiProvider),
}

impl LlmProvider {
    /// Send `prompt` after `history` and return the provider's text reply.
    pub async fn chat(&self, history: &[ChatMessage], prompt: &str) -> Result<String, ProviderError> {
        match self {
            LlmProvider::Dummy(p) => p.chat(history, prompt).await,
            LlmProvider::Scripted(p) => p.chat(history, prompt).await,
            LlmProvider::OpenAiCompatible(p) => p.chat(history, prompt).await,
            LlmProvider::Gemini(p) => p.chat(history, prompt).await,
        }
    }

    /// Short backend name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            LlmProvider::Dummy(_) => "dummy",
            LlmProvider::Scripted(_) => "scripted",
            LlmProvider::OpenAiCompatible(_) => "openai",
            LlmProvider::Gemini(_) => "gemini",
        }
    }

    /// `true` when the backend needs an API key to work at all.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, LlmProvider::OpenAiCompatible(_) | LlmProvider::Gemini(_))
    }

    pub(crate) fn has_api_key(&self) -> bool {
        match self {
            LlmProvider::OpenAiCompatible(p) => p.has_api_key(),
            LlmProvider::Gemini(p) => p.has_api_key(),
            LlmProvider::Dummy(_) | LlmProvider::Scripted(_) => false,
        }
    }
}
