//! Questionnaire data and scoring.

pub mod answers;
pub mod profile;
pub mod questions;
pub mod scoring;

pub use answers::AnswerSet;
pub use profile::TypeProfile;
pub use questions::{Category, Question, QuizOption, QUESTIONS};
pub use scoring::{classify, compute_tally, CategoryTally, ChartValues, Classification, ScoreError};
