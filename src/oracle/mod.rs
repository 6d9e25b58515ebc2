//! LLM-backed collaborators of the consultation: the scripted dialogue,
//! the result analysis and the closing advice.
//!
//! Nothing here returns an error to the caller.  Every call yields a
//! [`Delivery`]: `Live` when the provider answered, `Degraded` when the
//! oracle substituted an apology or a default payload.

pub mod analysis;
pub mod credential;
pub mod prompt;

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{Config, DialogueConfig};
use crate::llm::{ChatMessage, LlmProvider, ProviderError};
use crate::quiz::{Category, Classification, TypeProfile};
use crate::session::{Role, Turn};

use analysis::Analysis;
use prompt::PromptBuilder;

pub const BUSY_APOLOGY: &str = "申し訳ございません。現在、星々の声が届きにくくなっております（アクセス集中による制限）。\n少し時間を置いてから、もう一度お試しください。";
pub const LOST_APOLOGY: &str = "精霊との交信が途絶えました...";

const OPENING_FALLBACK: &str = "あなたは学生専門のキャリアコンサルタントです。ユーザーの属性は「{{lead}}」({{label}})です。神秘的な占い師の口調で、その才能を発揮した経験を尋ねてください。";
const FOLLOW_UP_FALLBACK: &str = "(※システム指示: 学生の具体的な経験をさらに深掘りしてください。)";
const WRAP_UP_FALLBACK: &str = "(※システム指示: ヒアリング終了です。これ以上質問せず、結果を見るよう伝えて会話を締めてください。)";
const ANALYSIS_FALLBACK: &str = "診断された基本タイプ: {{title}} ({{label}})\n会話履歴に基づき、JSONのみで出力してください: {\"skills\": [...], \"jobs\": [...], \"desc\": \"...\"}\n\n【会話履歴】\n{{transcript}}";
const ADVICE_FALLBACK: &str = "ユーザーの診断結果: {{title}}\nAI分析による適職: {{jobs}}\n上記を踏まえ、学生に向けたキャリアアドバイスを300文字程度で記述してください。";

/// Outcome of a collaborator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery<T> {
    Live(T),
    Degraded(T),
}

impl<T> Delivery<T> {
    pub fn into_inner(self) -> T {
        match self {
            Delivery::Live(v) | Delivery::Degraded(v) => v,
        }
    }

    pub fn get(&self) -> &T {
        match self {
            Delivery::Live(v) | Delivery::Degraded(v) => v,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Delivery::Degraded(_))
    }
}

/// Bounded retry loop for provider calls.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub attempts: u32,
    /// Fixed pause between attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { attempts: 3, backoff: Duration::from_secs(2) }
    }
}

/// How many user turns the dialogue runs.
#[derive(Debug, Clone, Copy)]
pub struct DialoguePolicy {
    /// From this user turn on, the oracle is told to close the conversation.
    pub wrap_up_after: usize,
    /// Further user input is refused once this many user turns exist.
    pub max_user_turns: Option<usize>,
}

impl Default for DialoguePolicy {
    fn default() -> Self {
        Self { wrap_up_after: 3, max_user_turns: None }
    }
}

impl From<&DialogueConfig> for RetryPolicy {
    fn from(cfg: &DialogueConfig) -> Self {
        Self { attempts: cfg.retry_attempts, backoff: cfg.retry_backoff }
    }
}

impl From<&DialogueConfig> for DialoguePolicy {
    fn from(cfg: &DialogueConfig) -> Self {
        Self { wrap_up_after: cfg.wrap_up_after, max_user_turns: cfg.max_user_turns }
    }
}

#[derive(Debug, Clone)]
pub struct Oracle {
    provider: LlmProvider,
    prompts_dir: PathBuf,
    retry: RetryPolicy,
    policy: DialoguePolicy,
}

impl Oracle {
    pub fn new(provider: LlmProvider, prompts_dir: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            prompts_dir: prompts_dir.into(),
            retry: RetryPolicy::default(),
            policy: DialoguePolicy::default(),
        }
    }

    pub fn from_config(provider: LlmProvider, config: &Config) -> Self {
        Self::new(provider, config.prompts_dir.clone())
            .with_retry((&config.dialogue).into())
            .with_policy((&config.dialogue).into())
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_policy(mut self, policy: DialoguePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn provider(&self) -> &LlmProvider {
        &self.provider
    }

    pub fn policy(&self) -> DialoguePolicy {
        self.policy
    }

    fn prompt(&self) -> PromptBuilder {
        PromptBuilder::new(&self.prompts_dir)
    }

    /// One provider call with the retry loop.  A rate limit ends the loop
    /// at once.
    async fn request(&self, history: &[ChatMessage], prompt: &str) -> Result<String, ProviderError> {
        let attempts = self.retry.attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.provider.chat(history, prompt).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_rate_limited() => {
                    warn!(provider = self.provider.name(), error = %e, "rate limited — not retrying");
                    return Err(e);
                }
                Err(e) if attempt < attempts => {
                    warn!(provider = self.provider.name(), attempt, error = %e, "provider call failed — retrying");
                    tokio::time::sleep(self.retry.backoff).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(provider = self.provider.name(), attempt, error = %e, "provider call failed — giving up");
                    return Err(e);
                }
            }
        }
    }

    /// Send `prompt` after `transcript`.  Failures come back as an apology.
    pub async fn converse(&self, transcript: &[Turn], prompt: &str) -> Delivery<String> {
        let history = to_history(transcript);
        match self.request(&history, prompt).await {
            Ok(text) => Delivery::Live(text),
            Err(e) if e.is_rate_limited() => Delivery::Degraded(BUSY_APOLOGY.to_string()),
            Err(e) => Delivery::Degraded(format!("{LOST_APOLOGY} (Error: {e})")),
        }
    }

    /// First oracle turn of the dialogue.
    pub async fn opening(&self, classification: Classification, lead: Category) -> Delivery<String> {
        let prompt = self
            .prompt()
            .layer_or("opening.md", OPENING_FALLBACK)
            .with_vars([("lead", lead.as_str()), ("label", classification.as_str())])
            .build();
        debug!(%classification, %lead, "requesting opening turn");
        self.converse(&[], &prompt).await
    }

    /// Reply to a user message.  `transcript` is the conversation before the
    /// message; the instruction suffix depends on how many user turns the
    /// message makes.
    pub async fn respond(&self, transcript: &[Turn], user_text: &str) -> Delivery<String> {
        let user_turn = transcript.iter().filter(|t| t.role == Role::User).count() + 1;
        let (file, fallback) = if user_turn >= self.policy.wrap_up_after {
            ("wrap_up.md", WRAP_UP_FALLBACK)
        } else {
            ("follow_up.md", FOLLOW_UP_FALLBACK)
        };
        let prompt = self.prompt().append(user_text).layer_or(file, fallback).build();
        debug!(user_turn, instruction = file, "requesting dialogue reply");
        self.converse(transcript, &prompt).await
    }

    /// Summarise the dialogue into `{skills, jobs, desc}`; the default
    /// payload replaces any failed or malformed reply.
    pub async fn analyze(&self, transcript: &[Turn], classification: Classification) -> Delivery<Analysis> {
        let profile = TypeProfile::for_classification(classification);
        let prompt = self
            .prompt()
            .layer_or("analysis.md", ANALYSIS_FALLBACK)
            .with_vars([
                ("title", profile.title),
                ("label", classification.as_str()),
                ("transcript", render_transcript(transcript).as_str()),
            ])
            .build();

        match self.request(&[], &prompt).await {
            Ok(reply) => match Analysis::parse(&reply) {
                Some(analysis) => {
                    info!(skills = analysis.skills.len(), jobs = analysis.jobs.len(), "analysis received");
                    Delivery::Live(analysis)
                }
                None => {
                    warn!(reply_len = reply.len(), "analysis reply did not match schema — using default");
                    Delivery::Degraded(Analysis::fallback())
                }
            },
            Err(e) => {
                warn!(error = %e, "analysis call failed — using default");
                Delivery::Degraded(Analysis::fallback())
            }
        }
    }

    /// Closing advice for the result page.
    pub async fn advise(&self, transcript: &[Turn], classification: Classification, analysis: &Analysis) -> Delivery<String> {
        let profile = TypeProfile::for_classification(classification);
        let jobs = analysis.jobs.join(",");
        let prompt = self
            .prompt()
            .layer_or("advice.md", ADVICE_FALLBACK)
            .with_vars([("title", profile.title), ("jobs", jobs.as_str())])
            .build();
        self.converse(transcript, &prompt).await
    }
}

fn to_history(transcript: &[Turn]) -> Vec<ChatMessage> {
    transcript
        .iter()
        .map(|t| match t.role {
            Role::User => ChatMessage::user(&t.text),
            Role::System => ChatMessage::assistant(&t.text),
        })
        .collect()
}

/// `role: text` lines, one per turn.
pub fn render_transcript(transcript: &[Turn]) -> String {
    transcript
        .iter()
        .map(|t| format!("{}: {}", t.role.as_str(), t.text))
        .collect::<Vec<_>>()
        .join("\n")
}
