//! [`AnswerSet`] — question id → selected option text.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::questions::Question;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSet {
    selections: BTreeMap<String, String>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `option` to `question_id`, replacing any earlier selection.
    pub fn select(&mut self, question_id: impl Into<String>, option: impl Into<String>) {
        self.selections.insert(question_id.into(), option.into());
    }

    pub fn get(&self, question_id: &str) -> Option<&str> {
        self.selections.get(question_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.selections.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn clear(&mut self) {
        self.selections.clear();
    }

    /// Number of `questions` without a legal selection.
    pub fn unanswered(&self, questions: &[Question]) -> usize {
        questions
            .iter()
            .filter(|q| {
                self.get(q.id)
                    .and_then(|text| q.category_of(text))
                    .is_none()
            })
            .count()
    }

    /// `true` when every question in `questions` has a legal selection.
    pub fn is_complete(&self, questions: &[Question]) -> bool {
        self.unanswered(questions) == 0
    }
}
