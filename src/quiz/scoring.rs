//! Tally and classification of a completed questionnaire.
//!
//! Both operations are pure: the same answers always give the same tally,
//! the same tally always gives the same [`Classification`].

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use super::answers::AnswerSet;
use super::questions::{self, Category, Question};

/// A first-place lead of at least this many answers yields a pure type.
pub const PURE_TYPE_GAP: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("incomplete answers: expected {expected}, found {found}")]
    IncompleteInput { expected: usize, found: usize },
    #[error("unknown option for {question}: {option:?}")]
    UnknownOption { question: String, option: String },
    #[error("cannot classify an empty tally")]
    EmptyTally,
}

/// Per-category answer counts.  All three categories are always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTally {
    pub fire: u32,
    pub water: u32,
    pub wind: u32,
}

impl CategoryTally {
    pub fn new(fire: u32, water: u32, wind: u32) -> Self {
        Self { fire, water, wind }
    }

    pub fn get(&self, category: Category) -> u32 {
        match category {
            Category::Fire => self.fire,
            Category::Water => self.water,
            Category::Wind => self.wind,
        }
    }

    fn bump(&mut self, category: Category) {
        match category {
            Category::Fire => self.fire += 1,
            Category::Water => self.water += 1,
            Category::Wind => self.wind += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.fire + self.water + self.wind
    }

    /// Categories ordered by count, highest first; ties keep precedence
    /// order (fire, water, wind).
    pub fn ranking(&self) -> [(Category, u32); 3] {
        let mut ranked = Category::ALL.map(|c| (c, self.get(c)));
        // stable: equal counts stay in precedence order
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// First-place category under [`ranking`](Self::ranking).
    pub fn leader(&self) -> Category {
        self.ranking()[0].0
    }
}

/// Final type label: a single category or a blend of the two leaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Pure(Category),
    /// Always stored in alphabetical order of the category names.
    Blend(Category, Category),
}

impl Classification {
    /// Blend of `a` and `b` in canonical (alphabetical) order.
    pub fn blend(a: Category, b: Category) -> Self {
        if a.as_str() <= b.as_str() {
            Classification::Blend(a, b)
        } else {
            Classification::Blend(b, a)
        }
    }

    pub fn as_str(&self) -> &'static str {
        use Category::*;
        match self {
            Classification::Pure(c) => c.as_str(),
            Classification::Blend(Fire, Water) | Classification::Blend(Water, Fire) => "fire-water",
            Classification::Blend(Fire, Wind) | Classification::Blend(Wind, Fire) => "fire-wind",
            Classification::Blend(Water, Wind) | Classification::Blend(Wind, Water) => "water-wind",
            Classification::Blend(c, _) => c.as_str(),
        }
    }

    /// Every label [`classify`] can produce.
    pub fn all() -> [Classification; 6] {
        use Category::*;
        [
            Classification::Pure(Fire),
            Classification::Pure(Water),
            Classification::Pure(Wind),
            Classification::blend(Fire, Water),
            Classification::blend(Fire, Wind),
            Classification::blend(Water, Wind),
        ]
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Count the category of every selected option.
pub fn compute_tally(answers: &AnswerSet, questions: &[Question]) -> Result<CategoryTally, ScoreError> {
    if answers.len() < questions.len() {
        return Err(ScoreError::IncompleteInput {
            expected: questions.len(),
            found: answers.len(),
        });
    }

    let mut tally = CategoryTally::default();
    for (id, text) in answers.iter() {
        let category = questions::find(questions, id)
            .and_then(|q| q.category_of(text))
            .ok_or_else(|| ScoreError::UnknownOption {
                question: id.to_string(),
                option: text.to_string(),
            })?;
        tally.bump(category);
    }
    Ok(tally)
}

/// Derive the type label from a tally.
///
/// Pure type when the leader is ahead of second place by at least
/// [`PURE_TYPE_GAP`]; otherwise the alphabetical blend of the top two, which
/// does not record which of the two was ahead.
pub fn classify(tally: &CategoryTally) -> Result<Classification, ScoreError> {
    if tally.total() == 0 {
        return Err(ScoreError::EmptyTally);
    }
    let [(first, first_count), (second, second_count), _] = tally.ranking();
    if first_count - second_count >= PURE_TYPE_GAP {
        Ok(Classification::Pure(first))
    } else {
        Ok(Classification::blend(first, second))
    }
}

/// Radar-chart axes derived from a tally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartValues {
    pub execution: f64,
    pub logic: f64,
    pub empathy: f64,
    pub creativity: f64,
    pub strategy: f64,
}

impl ChartValues {
    pub const LABELS: [&'static str; 5] = ["実行力", "論理力", "共感力", "創造性", "戦略性"];

    pub fn from_tally(tally: &CategoryTally) -> Self {
        let fire = f64::from(tally.fire);
        let water = f64::from(tally.water);
        let wind = f64::from(tally.wind);
        Self {
            execution: fire,
            logic: water,
            empathy: wind,
            creativity: (fire + wind) / 1.2,
            strategy: (fire + water) / 1.2,
        }
    }

    /// Values in [`LABELS`](Self::LABELS) order.
    pub fn values(&self) -> [f64; 5] {
        [self.execution, self.logic, self.empathy, self.creativity, self.strategy]
    }
}
