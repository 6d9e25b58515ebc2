//! Four-stage session flow: Intro → Questionnaire → Dialogue → Result.
//!
//! The controller holds no session data of its own; every operation takes
//! the caller's [`SessionState`].  Guard failures leave the session
//! untouched and are always recoverable.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::oracle::credential::CredentialCheck;
use crate::quiz::{self, Classification, CategoryTally, Question, ScoreError, QUESTIONS};

use super::state::{ResultCache, SessionState, Stage, Turn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{missing} question(s) still unanswered")]
    Unanswered { missing: usize },
    #[error("unknown question: {0}")]
    UnknownQuestion(String),
    #[error("{option:?} is not an option of {question}")]
    IllegalOption { question: String, option: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("no API credential configured")]
    MissingCredential,
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("operation requires stage {expected}, session is at {actual}")]
    WrongStage { expected: Stage, actual: Stage },
    #[error("dialogue turn limit of {max} reached")]
    TurnLimit { max: usize },
    #[error("scoring failed: {0}")]
    Score(#[from] ScoreError),
}

#[derive(Debug, Clone, Copy)]
pub struct FlowController<'q> {
    questions: &'q [Question],
}

impl Default for FlowController<'static> {
    fn default() -> Self {
        Self::new(&QUESTIONS)
    }
}

impl<'q> FlowController<'q> {
    pub fn new(questions: &'q [Question]) -> Self {
        Self { questions }
    }

    pub fn questions(&self) -> &'q [Question] {
        self.questions
    }

    /// Intro → Questionnaire, gated on a configured credential.
    ///
    /// Calling it again once in Questionnaire returns the same outcome
    /// without touching the session.
    pub fn start(&self, session: &mut SessionState, credentials: &dyn CredentialCheck) -> Result<Stage, FlowError> {
        if !credentials.has_credential() {
            warn!(session_id = %session.id, "start refused: no credential");
            return Err(FlowError::MissingCredential);
        }
        match session.stage {
            Stage::Intro => {
                session.stage = Stage::Questionnaire;
                info!(session_id = %session.id, "questionnaire started");
                Ok(Stage::Questionnaire)
            }
            Stage::Questionnaire => Ok(Stage::Questionnaire),
            actual => Err(FlowError::WrongStage { expected: Stage::Intro, actual }),
        }
    }

    /// Bind an answer during the Questionnaire stage.
    pub fn record_answer(&self, session: &mut SessionState, question_id: &str, option: &str) -> Result<(), FlowError> {
        expect_stage(session, Stage::Questionnaire)?;
        let question = quiz::questions::find(self.questions, question_id)
            .ok_or_else(|| ValidationError::UnknownQuestion(question_id.to_string()))?;
        if question.category_of(option).is_none() {
            return Err(ValidationError::IllegalOption {
                question: question_id.to_string(),
                option: option.to_string(),
            }
            .into());
        }
        session.answers.select(question_id, option);
        debug!(session_id = %session.id, question = question_id, answered = session.answers.len(), "answer recorded");
        Ok(())
    }

    /// Questionnaire → Dialogue, gated on a complete answer set.
    /// Partial answers are kept when the guard refuses.
    pub fn submit(&self, session: &mut SessionState) -> Result<Stage, FlowError> {
        expect_stage(session, Stage::Questionnaire)?;
        let missing = session.answers.unanswered(self.questions);
        if missing > 0 {
            debug!(session_id = %session.id, missing, "submit refused");
            return Err(ValidationError::Unanswered { missing }.into());
        }
        session.stage = Stage::Dialogue;
        info!(session_id = %session.id, "questionnaire submitted");
        Ok(Stage::Dialogue)
    }

    /// Append a dialogue turn verbatim.
    pub fn push_turn(&self, session: &mut SessionState, turn: Turn) -> Result<(), FlowError> {
        expect_stage(session, Stage::Dialogue)?;
        session.transcript.push(turn);
        Ok(())
    }

    /// Dialogue → Result.  No precondition on the transcript.
    pub fn finish(&self, session: &mut SessionState) -> Result<Stage, FlowError> {
        expect_stage(session, Stage::Dialogue)?;
        session.stage = Stage::Result;
        info!(session_id = %session.id, turns = session.transcript.len(), "dialogue finished");
        Ok(Stage::Result)
    }

    pub fn store_result(&self, session: &mut SessionState, result: ResultCache) -> Result<(), FlowError> {
        expect_stage(session, Stage::Result)?;
        session.result = Some(result);
        Ok(())
    }

    /// Back to Intro from any stage, clearing answers, transcript and result.
    pub fn reset(&self, session: &mut SessionState) -> Stage {
        session.clear();
        info!(session_id = %session.id, "session reset");
        Stage::Intro
    }

    pub fn tally(&self, session: &SessionState) -> Result<CategoryTally, FlowError> {
        Ok(quiz::compute_tally(&session.answers, self.questions)?)
    }

    /// Recompute the classification from the session's answers.
    pub fn classification(&self, session: &SessionState) -> Result<Classification, FlowError> {
        Ok(quiz::classify(&self.tally(session)?)?)
    }
}

fn expect_stage(session: &SessionState, expected: Stage) -> Result<(), FlowError> {
    if session.stage == expected {
        Ok(())
    } else {
        Err(FlowError::WrongStage { expected, actual: session.stage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::analysis::Analysis;
    use crate::oracle::credential::StaticCredential;
    use crate::quiz::Category;

    fn started() -> (FlowController<'static>, SessionState) {
        let flow = FlowController::default();
        let mut s = SessionState::new();
        flow.start(&mut s, &StaticCredential(true)).unwrap();
        (flow, s)
    }

    fn answer_all(flow: &FlowController<'_>, s: &mut SessionState, skip: Option<&str>) {
        for q in flow.questions() {
            if Some(q.id) == skip {
                continue;
            }
            flow.record_answer(s, q.id, q.options[0].text).unwrap();
        }
    }

    #[test]
    fn start_requires_credential() {
        let flow = FlowController::default();
        let mut s = SessionState::new();
        assert_eq!(flow.start(&mut s, &StaticCredential(false)), Err(FlowError::MissingCredential));
        assert_eq!(s.stage(), Stage::Intro);
    }

    #[test]
    fn start_is_idempotent() {
        let (flow, mut s) = started();
        let again = flow.start(&mut s, &StaticCredential(true));
        assert_eq!(again, Ok(Stage::Questionnaire));
        assert_eq!(s.stage(), Stage::Questionnaire);
        assert!(s.answers().is_empty());
    }

    #[test]
    fn record_answer_rejects_illegal_option() {
        let (flow, mut s) = started();
        let err = flow.record_answer(&mut s, "q1", "nope").unwrap_err();
        assert!(matches!(err, FlowError::Validation(ValidationError::IllegalOption { .. })));
        let err = flow.record_answer(&mut s, "q42", "nope").unwrap_err();
        assert!(matches!(err, FlowError::Validation(ValidationError::UnknownQuestion(_))));
        assert!(s.answers().is_empty());
    }

    #[test]
    fn record_answer_outside_questionnaire_rejected() {
        let flow = FlowController::default();
        let mut s = SessionState::new();
        let err = flow.record_answer(&mut s, "q1", QUESTIONS[0].options[0].text).unwrap_err();
        assert_eq!(err, FlowError::WrongStage { expected: Stage::Questionnaire, actual: Stage::Intro });
    }

    #[test]
    fn submit_incomplete_keeps_partial_answers() {
        let (flow, mut s) = started();
        answer_all(&flow, &mut s, Some("q7"));
        let err = flow.submit(&mut s).unwrap_err();
        assert_eq!(err, FlowError::Validation(ValidationError::Unanswered { missing: 1 }));
        assert_eq!(s.stage(), Stage::Questionnaire);
        assert_eq!(s.answers().len(), 9);

        // resume and complete
        flow.record_answer(&mut s, "q7", QUESTIONS[6].options[1].text).unwrap();
        assert_eq!(flow.submit(&mut s), Ok(Stage::Dialogue));
    }

    #[test]
    fn full_cycle_and_reset() {
        let (flow, mut s) = started();
        answer_all(&flow, &mut s, None);
        flow.submit(&mut s).unwrap();
        flow.push_turn(&mut s, Turn::system("welcome")).unwrap();
        flow.push_turn(&mut s, Turn::user("hi")).unwrap();
        assert_eq!(flow.finish(&mut s), Ok(Stage::Result));
        flow.store_result(&mut s, ResultCache { analysis: Analysis::fallback(), advice: "go".into() })
            .unwrap();
        assert!(s.result().is_some());

        let id = s.id;
        assert_eq!(flow.reset(&mut s), Stage::Intro);
        assert_eq!(s.stage(), Stage::Intro);
        assert!(s.answers().is_empty());
        assert!(s.transcript().is_empty());
        assert!(s.result().is_none());
        assert_eq!(s.id, id);
    }

    #[test]
    fn finish_with_empty_transcript_allowed() {
        let (flow, mut s) = started();
        answer_all(&flow, &mut s, None);
        flow.submit(&mut s).unwrap();
        assert_eq!(flow.finish(&mut s), Ok(Stage::Result));
    }

    #[test]
    fn stage_never_skips_ahead() {
        let (flow, mut s) = started();
        assert!(matches!(flow.finish(&mut s), Err(FlowError::WrongStage { .. })));
        assert!(matches!(flow.push_turn(&mut s, Turn::user("x")), Err(FlowError::WrongStage { .. })));
        assert_eq!(s.stage(), Stage::Questionnaire);
    }

    #[test]
    fn classification_recomputed_from_answers() {
        let (flow, mut s) = started();
        answer_all(&flow, &mut s, None);
        assert_eq!(flow.classification(&s), Ok(Classification::Pure(Category::Fire)));
        assert_eq!(flow.tally(&s).map(|t| t.total()), Ok(10));
    }

    #[test]
    fn classification_of_partial_answers_is_score_error() {
        let (flow, s) = started();
        assert!(matches!(flow.classification(&s), Err(FlowError::Score(ScoreError::IncompleteInput { .. }))));
    }
}
