//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory
//! (or the file named by `FORTUNE_CONFIG`), then applies
//! `FORTUNE_EXPORT_DIR` and `FORTUNE_LOG_LEVEL` env overrides.

use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::error::AppError;

/// Settings shared by the hosted providers (`[llm.openai]`, `[llm.gemini]`).
#[derive(Debug, Clone)]
pub struct RemoteProviderConfig {
    /// Endpoint URL.  For Gemini this is the API root; the model path is
    /// appended per request.
    pub api_base_url: String,
    pub model: String,
    pub temperature: f32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// LLM subsystem configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active: `"dummy"`, `"scripted"`, `"openai"` or `"gemini"`.
    pub provider: String,
    pub openai: RemoteProviderConfig,
    pub gemini: RemoteProviderConfig,
    /// Canned replies for the `scripted` provider, served in order.
    pub scripted_replies: Vec<String>,
}

/// Dialogue policy and the oracle's retry loop.
#[derive(Debug, Clone)]
pub struct DialogueConfig {
    /// User turns after which the oracle is told to wrap up.
    pub wrap_up_after: usize,
    /// Hard cap on user turns; `None` leaves the dialogue open-ended.
    pub max_user_turns: Option<usize>,
    pub retry_attempts: u32,
    pub retry_backoff: Duration,
}

#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Directory the HTML report is written to (already expanded, no `~`).
    pub dir: PathBuf,
    pub file_name: String,
}

/// Fully-resolved application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    pub log_level: String,
    /// Directory holding the prompt templates.
    pub prompts_dir: PathBuf,
    pub llm: LlmConfig,
    pub dialogue: DialogueConfig,
    pub export: ExportConfig,
    /// API key from `LLM_API_KEY` (or `GEMINI_API_KEY`) — `None` for keyless
    /// providers.  Never sourced from TOML.
    pub llm_api_key: Option<String>,
}

/// Raw TOML shape — `serde` target before resolution.
#[derive(Deserialize)]
struct RawConfig {
    app: RawApp,
    #[serde(default)]
    llm: RawLlm,
    #[serde(default)]
    dialogue: RawDialogue,
    #[serde(default)]
    export: RawExport,
}

#[derive(Deserialize)]
struct RawApp {
    name: String,
    log_level: String,
    #[serde(default = "default_prompts_dir")]
    prompts_dir: String,
}

#[derive(Deserialize)]
struct RawLlm {
    /// Maps to `default = "..."` in `[llm]`.
    #[serde(rename = "default", default = "default_llm_provider")]
    provider: String,
    #[serde(default)]
    openai: RawRemoteProvider,
    #[serde(default)]
    gemini: RawRemoteProvider,
    #[serde(default)]
    scripted: RawScripted,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            openai: RawRemoteProvider::default(),
            gemini: RawRemoteProvider::default(),
            scripted: RawScripted::default(),
        }
    }
}

/// Unset keys resolve to per-provider defaults.
#[derive(Deserialize, Default)]
struct RawRemoteProvider {
    api_base_url: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    timeout_seconds: Option<u64>,
}

impl RawRemoteProvider {
    fn resolve(self, api_base_url: fn() -> String, model: fn() -> String) -> RemoteProviderConfig {
        RemoteProviderConfig {
            api_base_url: self.api_base_url.unwrap_or_else(api_base_url),
            model: self.model.unwrap_or_else(model),
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            timeout_seconds: self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

#[derive(Deserialize, Default)]
struct RawScripted {
    #[serde(default)]
    replies: Vec<String>,
}

#[derive(Deserialize)]
struct RawDialogue {
    #[serde(default = "default_wrap_up_after")]
    wrap_up_after: usize,
    #[serde(default)]
    max_user_turns: Option<usize>,
    #[serde(default = "default_retry_attempts")]
    retry_attempts: u32,
    #[serde(default = "default_retry_backoff_ms")]
    retry_backoff_ms: u64,
}

impl Default for RawDialogue {
    fn default() -> Self {
        Self {
            wrap_up_after: default_wrap_up_after(),
            max_user_turns: None,
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

#[derive(Deserialize)]
struct RawExport {
    #[serde(default = "default_export_dir")]
    dir: String,
    #[serde(default = "default_export_file_name")]
    file_name: String,
}

impl Default for RawExport {
    fn default() -> Self {
        Self { dir: default_export_dir(), file_name: default_export_file_name() }
    }
}

const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

fn default_prompts_dir() -> String { "config/prompts".to_string() }
fn default_llm_provider() -> String { "dummy".to_string() }
fn default_openai_api_base_url() -> String { "https://api.openai.com/v1/chat/completions".to_string() }
fn default_openai_model() -> String { "gpt-4o-mini".to_string() }
fn default_gemini_api_base_url() -> String { "https://generativelanguage.googleapis.com/v1beta".to_string() }
fn default_gemini_model() -> String { "gemini-2.5-flash".to_string() }
fn default_wrap_up_after() -> usize { 3 }
fn default_retry_attempts() -> u32 { 3 }
fn default_retry_backoff_ms() -> u64 { 2000 }
fn default_export_dir() -> String { "~/.fortune-career/exports".to_string() }
fn default_export_file_name() -> String { "fortune_result.html".to_string() }

/// Load config from `FORTUNE_CONFIG` or `config/default.toml`, then apply
/// env-var overrides.
pub fn load() -> Result<Config, AppError> {
    let path = env::var("FORTUNE_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    let export_dir_override = env::var("FORTUNE_EXPORT_DIR").ok();
    let log_level_override = env::var("FORTUNE_LOG_LEVEL").ok();
    load_from(
        Path::new(&path),
        export_dir_override.as_deref(),
        log_level_override.as_deref(),
    )
}

/// Internal loader — accepts an explicit path and optional overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(
    path: &Path,
    export_dir_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    if parsed.dialogue.retry_attempts == 0 {
        return Err(AppError::Config("dialogue.retry_attempts must be at least 1".into()));
    }

    let export_dir = expand_home(export_dir_override.unwrap_or(&parsed.export.dir));
    let log_level = log_level_override.unwrap_or(&parsed.app.log_level).to_string();
    crate::logger::parse_level(&log_level)?;

    Ok(Config {
        app_name: parsed.app.name,
        log_level,
        prompts_dir: expand_home(&parsed.app.prompts_dir),
        llm: LlmConfig {
            provider: parsed.llm.provider,
            openai: parsed.llm.openai.resolve(default_openai_api_base_url, default_openai_model),
            gemini: parsed.llm.gemini.resolve(default_gemini_api_base_url, default_gemini_model),
            scripted_replies: parsed.llm.scripted.replies,
        },
        dialogue: DialogueConfig {
            wrap_up_after: parsed.dialogue.wrap_up_after,
            max_user_turns: parsed.dialogue.max_user_turns,
            retry_attempts: parsed.dialogue.retry_attempts,
            retry_backoff: Duration::from_millis(parsed.dialogue.retry_backoff_ms),
        },
        export: ExportConfig {
            dir: export_dir,
            file_name: parsed.export.file_name,
        },
        llm_api_key: api_key_from_env(),
    })
}

fn api_key_from_env() -> Option<String> {
    ["LLM_API_KEY", "GEMINI_API_KEY"]
        .iter()
        .filter_map(|name| env::var(name).ok())
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

// ── test helpers ──────────────────────────────────────────────────────────────

/// Safe `Config` for tests — scripted LLM, no API keys, no external calls,
/// no retry sleeps.
impl Config {
    pub fn test_default(work_dir: &Path) -> Self {
        Self {
            app_name: "test".into(),
            log_level: "info".into(),
            prompts_dir: Path::new(env!("CARGO_MANIFEST_DIR")).join("config/prompts"),
            llm: LlmConfig {
                provider: "scripted".into(),
                openai: RemoteProviderConfig {
                    api_base_url: "http://localhost:0/v1/chat/completions".into(),
                    model: "test-model".into(),
                    temperature: 0.0,
                    timeout_seconds: 1,
                },
                gemini: RemoteProviderConfig {
                    api_base_url: "http://localhost:0/v1beta".into(),
                    model: "test-model".into(),
                    temperature: 0.0,
                    timeout_seconds: 1,
                },
                scripted_replies: Vec::new(),
            },
            dialogue: DialogueConfig {
                wrap_up_after: 3,
                max_user_turns: None,
                retry_attempts: 3,
                retry_backoff: Duration::ZERO,
            },
            export: ExportConfig {
                dir: work_dir.to_path_buf(),
                file_name: "fortune_result.html".into(),
            },
            llm_api_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL_TOML: &str = r#"
[app]
name = "fortune-test"
log_level = "info"
"#;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn parse_minimal_config_applies_defaults() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), None, None).unwrap();
        assert_eq!(cfg.app_name, "fortune-test");
        assert_eq!(cfg.llm.provider, "dummy");
        assert_eq!(cfg.llm.gemini.model, "gemini-2.5-flash");
        assert_eq!(cfg.dialogue.wrap_up_after, 3);
        assert_eq!(cfg.dialogue.retry_attempts, 3);
        assert_eq!(cfg.dialogue.retry_backoff, Duration::from_secs(2));
        assert!(cfg.dialogue.max_user_turns.is_none());
        assert_eq!(cfg.export.file_name, "fortune_result.html");
        assert_eq!(cfg.prompts_dir, PathBuf::from("config/prompts"));
    }

    #[test]
    fn parse_full_config() {
        let f = write_toml(
            r#"
[app]
name = "x"
log_level = "debug"
prompts_dir = "/srv/prompts"

[llm]
default = "gemini"

[llm.gemini]
model = "gemini-2.5-pro"
timeout_seconds = 30

[llm.scripted]
replies = ["one", "two"]

[dialogue]
wrap_up_after = 2
max_user_turns = 5
retry_attempts = 2
retry_backoff_ms = 10

[export]
dir = "/tmp/exports"
file_name = "card.html"
"#,
        );
        let cfg = load_from(f.path(), None, None).unwrap();
        assert_eq!(cfg.llm.provider, "gemini");
        assert_eq!(cfg.llm.gemini.model, "gemini-2.5-pro");
        assert_eq!(cfg.llm.gemini.timeout_seconds, 30);
        assert!(cfg.llm.gemini.api_base_url.contains("generativelanguage"));
        assert_eq!(cfg.llm.openai.model, "gpt-4o-mini");
        assert_eq!(cfg.llm.scripted_replies, ["one", "two"]);
        assert_eq!(cfg.dialogue.max_user_turns, Some(5));
        assert_eq!(cfg.dialogue.retry_backoff, Duration::from_millis(10));
        assert_eq!(cfg.export.dir, PathBuf::from("/tmp/exports"));
        assert_eq!(cfg.export.file_name, "card.html");
        assert_eq!(cfg.prompts_dir, PathBuf::from("/srv/prompts"));
    }

    #[test]
    fn zero_retry_attempts_rejected() {
        let f = write_toml(&format!("{MINIMAL_TOML}\n[dialogue]\nretry_attempts = 0\n"));
        let err = load_from(f.path(), None, None).unwrap_err();
        assert!(err.to_string().contains("retry_attempts"));
    }

    #[test]
    fn unknown_log_level_rejected() {
        let f = write_toml("[app]\nname = \"x\"\nlog_level = \"verbose\"\n");
        let msg = load_from(f.path(), None, None).unwrap_err().to_string();
        assert!(msg.contains("unrecognised log level"));

        let f = write_toml(MINIMAL_TOML);
        assert!(matches!(load_from(f.path(), None, Some("loud")), Err(AppError::Logger(_))));
    }

    #[test]
    fn missing_app_section_errors() {
        let f = write_toml("[llm]\ndefault = \"dummy\"\n");
        let msg = load_from(f.path(), None, None).unwrap_err().to_string();
        assert!(msg.contains("parse error"));
    }

    #[test]
    fn missing_file_errors() {
        let result = load_from(Path::new("/nonexistent/config.toml"), None, None);
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("config error"));
    }

    #[test]
    fn export_dir_override() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), Some("/tmp/test-override"), None).unwrap();
        assert_eq!(cfg.export.dir, PathBuf::from("/tmp/test-override"));
    }

    #[test]
    fn log_level_override() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), None, Some("debug")).unwrap();
        assert_eq!(cfg.log_level, "debug");
    }

    #[test]
    fn tilde_expands_to_home() {
        let home = dirs::home_dir().expect("home dir must exist in test env");
        let expanded = expand_home("~/.fortune-career");
        assert!(expanded.starts_with(&home));
        assert!(expanded.ends_with(".fortune-career"));
    }

    #[test]
    fn absolute_path_unchanged() {
        assert_eq!(expand_home("/absolute/path"), PathBuf::from("/absolute/path"));
    }
}
