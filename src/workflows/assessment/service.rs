use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{CategoryId, FacilityInfo, Rating, RoundedScores};
use super::quadrant::Quadrant;
use super::report::{render_pdf, ReportContent, ReportDocument, ReportError};
use super::repository::{
    AssessmentRecord, AssessmentStore, MailerError, OutboundReport, ReportMailer, StoreError,
};
use super::session::{
    AssessmentOutcome, AssessmentPhase, AssessmentSession, SessionError, StepOutcome,
};

/// Orchestrates live assessment sessions over an injected store and mailer.
///
/// Persistence follows the offline-first policy: the placeholder write at
/// start and the full upsert at completion are both attempted under a
/// bounded time budget, and any failure is logged and swallowed. The
/// respondent always reaches their results; the worst case is "computed but
/// not saved remotely". Report generation and mail delivery are different:
/// their failures surface to the caller as retryable errors.
pub struct AssessmentService<S, M> {
    store: Arc<S>,
    mailer: Arc<M>,
    store_budget: Duration,
    sessions: Mutex<HashMap<String, AssessmentSession>>,
}

impl<S, M> AssessmentService<S, M>
where
    S: AssessmentStore + 'static,
    M: ReportMailer + 'static,
{
    pub fn new(store: Arc<S>, mailer: Arc<M>, store_budget: Duration) -> Self {
        Self {
            store,
            mailer,
            store_budget,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Start a session for the submitted facility. Validation failures
    /// block the transition; the placeholder persistence attempt does not.
    /// A second start from the same email replaces the in-flight session,
    /// mirroring the store's upsert semantics.
    pub async fn begin(
        &self,
        facility: FacilityInfo,
    ) -> Result<AssessmentStatusView, AssessmentServiceError> {
        let mut session = AssessmentSession::new();
        session.begin(facility.clone())?;
        let started_at = session.started_at().unwrap_or_else(Utc::now);

        let email = facility.email_key();
        let view = status_view(&email, &session);
        {
            let mut sessions = self.sessions.lock().expect("session mutex poisoned");
            sessions.insert(email.clone(), session);
        }

        let record = AssessmentRecord::placeholder(&facility, started_at);
        self.persist_best_effort(record, "start").await;

        Ok(view)
    }

    /// Record a rating for any category of the respondent's session.
    pub fn rate(
        &self,
        email: &str,
        category: CategoryId,
        rating: Rating,
    ) -> Result<AssessmentStatusView, AssessmentServiceError> {
        self.with_session(email, |key, session| {
            session.rate(category, rating)?;
            Ok(status_view(key, session))
        })
    }

    /// Forward step. When the final category is advanced past, the session
    /// completes: the outcome is computed, the full record upsert is
    /// attempted (offline-first), and the response carries the results.
    pub async fn advance(&self, email: &str) -> Result<StepView, AssessmentServiceError> {
        let (view, completion) = {
            let key = normalize(email);
            let mut sessions = self.sessions.lock().expect("session mutex poisoned");
            let session = sessions
                .get_mut(&key)
                .ok_or_else(|| AssessmentServiceError::UnknownSession(key.clone()))?;

            match session.advance()? {
                StepOutcome::Moved(_) => (
                    StepView {
                        status: status_view(&key, session),
                        outcome: None,
                    },
                    None,
                ),
                StepOutcome::Completed(outcome) => {
                    let record = completed_record(session, &outcome)?;
                    let view = StepView {
                        status: status_view(&key, session),
                        outcome: Some(outcome_view(&outcome)),
                    };
                    (view, Some(record))
                }
            }
        };

        if let Some(record) = completion {
            self.persist_best_effort(record, "complete").await;
        }

        Ok(view)
    }

    /// Backward step, clamped at the first category.
    pub fn retreat(&self, email: &str) -> Result<AssessmentStatusView, AssessmentServiceError> {
        self.with_session(email, |key, session| {
            session.retreat()?;
            Ok(status_view(key, session))
        })
    }

    /// Quick-nav jump to a category index, clamped into range.
    pub fn jump_to(
        &self,
        email: &str,
        index: usize,
    ) -> Result<AssessmentStatusView, AssessmentServiceError> {
        self.with_session(email, |key, session| {
            session.jump_to(index)?;
            Ok(status_view(key, session))
        })
    }

    /// Discard the session entirely. No persistence interaction: whatever
    /// the store holds for this email stays as-is.
    pub fn restart(&self, email: &str) -> Result<(), AssessmentServiceError> {
        let key = normalize(email);
        let mut sessions = self.sessions.lock().expect("session mutex poisoned");
        let mut session = sessions
            .remove(&key)
            .ok_or_else(|| AssessmentServiceError::UnknownSession(key.clone()))?;
        session.restart();
        info!(email = %key, "assessment session restarted");
        Ok(())
    }

    /// Computed results for a finished session. Always the session's own
    /// outcome; never read back from the store.
    pub fn results(&self, email: &str) -> Result<OutcomeView, AssessmentServiceError> {
        let key = normalize(email);
        let sessions = self.sessions.lock().expect("session mutex poisoned");
        let session = sessions
            .get(&key)
            .ok_or_else(|| AssessmentServiceError::UnknownSession(key.clone()))?;
        let outcome = session
            .outcome()
            .ok_or_else(|| AssessmentServiceError::ResultsNotReady(key.clone()))?;
        Ok(outcome_view(outcome))
    }

    /// Render the downloadable PDF for a finished session.
    pub fn report(&self, email: &str) -> Result<ReportDocument, AssessmentServiceError> {
        let content = self.report_content(email)?;
        let bytes = render_pdf(&content)?;
        Ok(ReportDocument {
            filename: content.filename(),
            bytes,
        })
    }

    /// Render the report and hand it to the mailer. Returns the provider
    /// message id.
    pub async fn email_report(&self, email: &str) -> Result<String, AssessmentServiceError> {
        let (content, recipient) = {
            let key = normalize(email);
            let sessions = self.sessions.lock().expect("session mutex poisoned");
            let session = sessions
                .get(&key)
                .ok_or_else(|| AssessmentServiceError::UnknownSession(key.clone()))?;
            let content = assemble_content(session, &key)?;
            let recipient = session
                .facility()
                .map(|facility| facility.email.trim().to_string())
                .unwrap_or(key);
            (content, recipient)
        };

        let bytes = render_pdf(&content)?;
        let report = OutboundReport {
            recipient: recipient.clone(),
            subject: format!("Facility Readiness Assessment - {}", content.facility_name),
            html_body: format!(
                "<p>Your readiness assessment for {} is attached.</p>",
                content.facility_name
            ),
            attachment_name: content.filename(),
            attachment: bytes,
        };

        let message_id = self.mailer.send(report).await?;
        info!(%recipient, %message_id, "assessment report mailed");
        Ok(message_id)
    }

    fn report_content(&self, email: &str) -> Result<ReportContent, AssessmentServiceError> {
        let key = normalize(email);
        let sessions = self.sessions.lock().expect("session mutex poisoned");
        let session = sessions
            .get(&key)
            .ok_or_else(|| AssessmentServiceError::UnknownSession(key.clone()))?;
        assemble_content(session, &key)
    }

    fn with_session<T>(
        &self,
        email: &str,
        operate: impl FnOnce(&str, &mut AssessmentSession) -> Result<T, SessionError>,
    ) -> Result<T, AssessmentServiceError> {
        let key = normalize(email);
        let mut sessions = self.sessions.lock().expect("session mutex poisoned");
        let session = sessions
            .get_mut(&key)
            .ok_or_else(|| AssessmentServiceError::UnknownSession(key.clone()))?;
        operate(&key, session).map_err(Into::into)
    }

    /// Offline-first write: bounded by the configured budget, logged on
    /// failure, never propagated.
    async fn persist_best_effort(&self, record: AssessmentRecord, stage: &'static str) {
        let email = record.email.clone();
        match tokio::time::timeout(self.store_budget, self.store.upsert(record)).await {
            Ok(Ok(())) => info!(%email, stage, "assessment record persisted"),
            Ok(Err(err)) => {
                warn!(%email, stage, error = %err, "assessment record not persisted")
            }
            Err(_) => {
                let err = StoreError::TimedOut(self.store_budget.as_millis() as u64);
                warn!(%email, stage, error = %err, "assessment record not persisted")
            }
        }
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn completed_record(
    session: &AssessmentSession,
    outcome: &AssessmentOutcome,
) -> Result<AssessmentRecord, AssessmentServiceError> {
    let facility = session
        .facility()
        .ok_or(AssessmentServiceError::Session(SessionError::NotStarted))?;
    Ok(AssessmentRecord::completed(
        facility,
        session.ratings().clone(),
        outcome,
        session.started_at().unwrap_or_else(Utc::now),
    ))
}

fn assemble_content(
    session: &AssessmentSession,
    key: &str,
) -> Result<ReportContent, AssessmentServiceError> {
    let outcome = session
        .outcome()
        .ok_or_else(|| AssessmentServiceError::ResultsNotReady(key.to_string()))?;
    let facility = session
        .facility()
        .ok_or(AssessmentServiceError::Session(SessionError::NotStarted))?;
    Ok(ReportContent::assemble(
        facility,
        session.catalog(),
        session.ratings(),
        outcome,
    ))
}

fn status_view(email: &str, session: &AssessmentSession) -> AssessmentStatusView {
    let (phase, category_index) = match session.phase() {
        AssessmentPhase::Intro => ("intro", None),
        AssessmentPhase::Assessing { category_index } => ("assessing", Some(category_index)),
        AssessmentPhase::Results => ("results", None),
    };

    AssessmentStatusView {
        email: email.to_string(),
        phase,
        category_index,
        category: session.current_category().map(|category| category.name),
        rated_categories: session.ratings().len(),
        total_categories: session.catalog().len(),
        can_advance: session.can_advance(),
    }
}

fn outcome_view(outcome: &AssessmentOutcome) -> OutcomeView {
    OutcomeView {
        scores: outcome.scores.rounded(),
        quadrant: QuadrantView {
            quadrant: outcome.quadrant,
            label: outcome.quadrant.label(),
            color: outcome.quadrant.color_token(),
            description: outcome.quadrant.description(),
            recommended_action: outcome.quadrant.recommended_action(),
        },
        completed_at: outcome.completed_at,
    }
}

/// Sanitized place-in-flow summary for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentStatusView {
    pub email: String,
    pub phase: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<&'static str>,
    pub rated_categories: usize,
    pub total_categories: usize,
    pub can_advance: bool,
}

/// Response to a forward step; `outcome` is present exactly when the step
/// completed the assessment.
#[derive(Debug, Clone, Serialize)]
pub struct StepView {
    pub status: AssessmentStatusView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<OutcomeView>,
}

/// Display form of a finished assessment.
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeView {
    pub scores: RoundedScores,
    pub quadrant: QuadrantView,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuadrantView {
    pub quadrant: Quadrant,
    pub label: &'static str,
    pub color: &'static str,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

/// Error raised by the assessment service. Store failures never appear
/// here; the offline-first policy converts them to log lines.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("no assessment in progress for '{0}'")]
    UnknownSession(String),
    #[error("assessment for '{0}' has not reached results")]
    ResultsNotReady(String),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Mail(#[from] MailerError),
}
