//! One user's consultation: a [`SessionState`] plus the flow controller and
//! the oracle that act on it.
//!
//! Calls are processed one at a time; an `async` method finishes its
//! provider calls before returning, so the session is never mutated
//! concurrently.

use std::path::PathBuf;

use tracing::{info, info_span, Instrument};

use crate::config::ExportConfig;
use crate::error::AppError;
use crate::export::{self, Report};
use crate::oracle::credential::CredentialCheck;
use crate::oracle::{Delivery, Oracle};
use crate::quiz::{ChartValues, Question};
use crate::session::{FlowController, FlowError, ResultCache, SessionState, Stage, Turn};

pub struct Consultation {
    flow: FlowController<'static>,
    oracle: Oracle,
    session: SessionState,
}

impl Consultation {
    pub fn new(oracle: Oracle) -> Self {
        Self {
            flow: FlowController::default(),
            oracle,
            session: SessionState::new(),
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn stage(&self) -> Stage {
        self.session.stage()
    }

    pub fn questions(&self) -> &'static [Question] {
        self.flow.questions()
    }

    /// Leave the intro, checking the oracle's provider for a credential.
    pub fn begin(&mut self) -> Result<Stage, FlowError> {
        self.flow.start(&mut self.session, self.oracle.provider())
    }

    pub fn begin_with(&mut self, credentials: &dyn CredentialCheck) -> Result<Stage, FlowError> {
        self.flow.start(&mut self.session, credentials)
    }

    pub fn answer(&mut self, question_id: &str, option: &str) -> Result<(), FlowError> {
        self.flow.record_answer(&mut self.session, question_id, option)
    }

    /// Submit the questionnaire and fetch the oracle's opening turn.
    pub async fn submit(&mut self) -> Result<Delivery<String>, FlowError> {
        self.flow.submit(&mut self.session)?;
        let tally = self.flow.tally(&self.session)?;
        let classification = self.flow.classification(&self.session)?;
        let span = info_span!("opening", session_id = %self.session.id);
        let reply = self
            .oracle
            .opening(classification, tally.leader())
            .instrument(span)
            .await;
        self.flow.push_turn(&mut self.session, Turn::system(reply.get().clone()))?;
        Ok(reply)
    }

    /// Send a user message and store both it and the oracle's reply.
    pub async fn say(&mut self, text: &str) -> Result<Delivery<String>, FlowError> {
        if self.session.stage() != Stage::Dialogue {
            return Err(FlowError::WrongStage { expected: Stage::Dialogue, actual: self.session.stage() });
        }
        if let Some(max) = self.oracle.policy().max_user_turns {
            if self.session.user_turns() >= max {
                return Err(FlowError::TurnLimit { max });
            }
        }
        let span = info_span!("dialogue", session_id = %self.session.id, user_turn = self.session.user_turns() + 1);
        let reply = self
            .oracle
            .respond(self.session.transcript(), text)
            .instrument(span)
            .await;
        self.flow.push_turn(&mut self.session, Turn::user(text))?;
        self.flow.push_turn(&mut self.session, Turn::system(reply.get().clone()))?;
        Ok(reply)
    }

    /// Move to the result stage (if still in dialogue) and compute the
    /// analysis and advice once; later calls reuse the cached result.
    /// Any other stage is refused before the provider is called.
    pub async fn reveal(&mut self) -> Result<Report, FlowError> {
        match self.session.stage() {
            Stage::Dialogue => {
                self.flow.finish(&mut self.session)?;
            }
            Stage::Result => {}
            actual => return Err(FlowError::WrongStage { expected: Stage::Dialogue, actual }),
        }
        if self.session.result().is_none() {
            let classification = self.flow.classification(&self.session)?;
            let span = info_span!("result", session_id = %self.session.id, %classification);
            let cache = async {
                let analysis = self.oracle.analyze(self.session.transcript(), classification).await;
                if analysis.is_degraded() {
                    info!("using default analysis payload");
                }
                let analysis = analysis.into_inner();
                let advice = self
                    .oracle
                    .advise(self.session.transcript(), classification, &analysis)
                    .await
                    .into_inner();
                ResultCache { analysis, advice }
            }
            .instrument(span)
            .await;
            self.flow.store_result(&mut self.session, cache)?;
        }
        self.report()
    }

    /// The finished report; requires a computed result.
    pub fn report(&self) -> Result<Report, FlowError> {
        let cache = match (self.session.stage(), self.session.result()) {
            (Stage::Result, Some(cache)) => cache,
            (actual, _) => return Err(FlowError::WrongStage { expected: Stage::Result, actual }),
        };
        let tally = self.flow.tally(&self.session)?;
        let classification = self.flow.classification(&self.session)?;
        Ok(Report::new(
            classification,
            ChartValues::from_tally(&tally),
            cache.analysis.clone(),
            cache.advice.clone(),
        ))
    }

    /// Write the report card to the configured export location.
    pub async fn export_html(&self, config: &ExportConfig) -> Result<PathBuf, AppError> {
        let report = self.report()?;
        export::write_html(&report, &config.dir, &config.file_name).await
    }

    pub fn restart(&mut self) -> Stage {
        self.flow.reset(&mut self.session)
    }
}
