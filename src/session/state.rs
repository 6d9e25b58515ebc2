//! Per-user session data.
//!
//! A [`SessionState`] is created with defaults, mutated only through the
//! [`FlowController`](super::flow::FlowController), and cleared by
//! [`reset`](super::flow::FlowController::reset).  There is one instance
//! per user; nothing in it is shared between sessions.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::oracle::analysis::Analysis;
use crate::quiz::AnswerSet;

/// Position in the four-stage flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    #[default]
    Intro = 0,
    Questionnaire = 1,
    Dialogue = 2,
    Result = 3,
}

impl Stage {
    pub fn index(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Intro => "intro",
            Stage::Questionnaire => "questionnaire",
            Stage::Dialogue => "dialogue",
            Stage::Result => "result",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    /// The oracle's side of the conversation.
    System,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::System => "system",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, text: text.into() }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self { role: Role::System, text: text.into() }
    }
}

/// Derived result kept once the Result stage has been computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultCache {
    pub analysis: Analysis,
    pub advice: String,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    /// Log correlation only; survives reset.
    pub id: Uuid,
    pub(crate) stage: Stage,
    pub(crate) answers: AnswerSet,
    pub(crate) transcript: Vec<Turn>,
    pub(crate) result: Option<ResultCache>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            stage: Stage::Intro,
            answers: AnswerSet::new(),
            transcript: Vec::new(),
            result: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn result(&self) -> Option<&ResultCache> {
        self.result.as_ref()
    }

    pub fn user_turns(&self) -> usize {
        self.transcript.iter().filter(|t| t.role == Role::User).count()
    }

    /// Restore every field except `id` to its initial value.
    pub(crate) fn clear(&mut self) {
        self.stage = Stage::Intro;
        self.answers.clear();
        self.transcript.clear();
        self.result = None;
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_has_defaults() {
        let s = SessionState::new();
        assert_eq!(s.stage(), Stage::Intro);
        assert_eq!(s.stage().index(), 0);
        assert!(s.answers().is_empty());
        assert!(s.transcript().is_empty());
        assert!(s.result().is_none());
    }

    #[test]
    fn sessions_get_distinct_ids() {
        assert_ne!(SessionState::new().id, SessionState::new().id);
    }

    #[test]
    fn user_turns_ignores_system_turns() {
        let mut s = SessionState::new();
        s.transcript.push(Turn::system("hello"));
        s.transcript.push(Turn::user("hi"));
        s.transcript.push(Turn::system("tell me more"));
        assert_eq!(s.user_turns(), 1);
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Turn::user("x")).unwrap();
        assert_eq!(json, r#"{"role":"user","text":"x"}"#);
    }
}
