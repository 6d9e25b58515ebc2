//! LLM provider implementations.
//!
//! `build(config, api_key)` is the factory — called at startup.
//! Adding a new backend = new module + new match arm.

pub mod dummy;
pub mod gemini;
pub mod openai_compatible;
pub mod scripted;

use reqwest::StatusCode;

use crate::config::LlmConfig;
use crate::llm::{LlmProvider, ProviderError};

/// Construct a `LlmProvider` from config and an optional API key.
///
/// `api_key` is sourced from the environment (never TOML) and is `None`
/// for keyless providers.
pub fn build(config: &LlmConfig, api_key: Option<String>) -> Result<LlmProvider, ProviderError> {
    match config.provider.as_str() {
        "dummy" => Ok(LlmProvider::Dummy(dummy::DummyProvider)),
        "scripted" => Ok(LlmProvider::Scripted(scripted::ScriptedProvider::from_replies(
            config.scripted_replies.iter().cloned(),
        ))),
        "openai" | "openai-compatible" => {
            let oai = &config.openai;
            let p = openai_compatible::OpenAiCompatibleProvider::new(
                oai.api_base_url.clone(),
                oai.model.clone(),
                oai.temperature,
                oai.timeout_seconds,
                api_key,
            )?;
            Ok(LlmProvider::OpenAiCompatible(p))
        }
        "gemini" => {
            let g = &config.gemini;
            let p = gemini::GeminiProvider::new(
                g.api_base_url.clone(),
                g.model.clone(),
                g.temperature,
                g.timeout_seconds,
                api_key,
            )?;
            Ok(LlmProvider::Gemini(p))
        }
        _ => Err(ProviderError::UnknownProvider(config.provider.clone())),
    }
}

/// Map a non-success HTTP status to a provider error.  429 and quota
/// exhaustion become [`ProviderError::RateLimited`].
pub(crate) fn classify_http_error(status: StatusCode, message: String) -> ProviderError {
    let lower = message.to_lowercase();
    if status == StatusCode::TOO_MANY_REQUESTS || lower.contains("quota") || lower.contains("resource_exhausted") {
        ProviderError::RateLimited(message)
    } else {
        ProviderError::Request(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn llm_config(provider: &str) -> LlmConfig {
        let mut cfg = Config::test_default(std::path::Path::new("/tmp")).llm;
        cfg.provider = provider.to_string();
        cfg
    }

    #[test]
    fn builds_each_known_provider() {
        for (name, expected) in [
            ("dummy", "dummy"),
            ("scripted", "scripted"),
            ("openai", "openai"),
            ("openai-compatible", "openai"),
            ("gemini", "gemini"),
        ] {
            let p = build(&llm_config(name), None).unwrap();
            assert_eq!(p.name(), expected);
        }
    }

    #[test]
    fn unknown_provider_errors() {
        let err = build(&llm_config("palm"), None).unwrap_err();
        assert!(matches!(err, ProviderError::UnknownProvider(ref n) if n == "palm"));
    }

    #[test]
    fn http_429_is_rate_limited() {
        assert!(classify_http_error(StatusCode::TOO_MANY_REQUESTS, "slow down".into()).is_rate_limited());
        assert!(classify_http_error(StatusCode::FORBIDDEN, "Quota exceeded".into()).is_rate_limited());
        assert!(!classify_http_error(StatusCode::INTERNAL_SERVER_ERROR, "oops".into()).is_rate_limited());
    }
}
