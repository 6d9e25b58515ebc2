//! `{skills, jobs, desc}` payload returned by the result-analysis call.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub skills: Vec<String>,
    pub jobs: Vec<String>,
    pub desc: String,
}

impl Analysis {
    /// Payload used whenever the model's reply cannot be used.
    pub fn fallback() -> Self {
        Self {
            skills: vec!["コミュニケーション力".into(), "自己分析".into(), "情報収集力".into()],
            jobs: vec!["総合職".into(), "営業".into(), "企画".into()],
            desc: "あなたの可能性は無限大です。まずは色々な世界を見てみましょう。".into(),
        }
    }

    /// Parse a model reply, tolerating a Markdown code fence around the JSON.
    ///
    /// Returns `None` unless the reply is an object whose `skills` and `jobs`
    /// are non-empty string lists and whose `desc` is a string.
    pub fn parse(reply: &str) -> Option<Self> {
        let body = strip_code_fence(reply);
        let parsed: Analysis = serde_json::from_str(body).ok()?;
        if parsed.skills.is_empty() || parsed.jobs.is_empty() {
            return None;
        }
        Some(parsed)
    }
}

fn strip_code_fence(reply: &str) -> &str {
    let mut text = reply.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}
